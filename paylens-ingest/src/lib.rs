//! paylens-ingest: upload candidates and the gate that decides which ones get analyzed.

pub mod gate;
pub mod types;

pub use gate::{InputSource, RejectReason, Rejection, UploadGate, Verdict};
pub use types::{
    declared_media_type, normalize_dropped_path, IngestError, UploadCandidate, PDF_MEDIA_TYPE,
};
