//! Upload gate: the single validation routine every input path goes through.
//!
//! Only one file with a declared type of `application/pdf` is accepted.
//! Rejection never changes session state; the caller shows the message inline.

use crate::types::UploadCandidate;
use serde::Serialize;
use thiserror::Error;

/// How the file reached us. Both paths validate identically; only the wording
/// of the rejection notice differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputSource {
    FilePicker,
    DragDrop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    NoFile,
    InvalidType { media_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}", self.reason_str())]
pub struct Rejection {
    pub reason: RejectReason,
    pub input: InputSource,
}

impl Rejection {
    /// Short machine-ish reason ("invalid file type").
    pub fn reason_str(&self) -> &'static str {
        match self.reason {
            RejectReason::NoFile => "no file selected",
            RejectReason::InvalidType { .. } => "invalid file type",
        }
    }

    /// Notice shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self.input {
            InputSource::FilePicker => "Please select a valid PDF file",
            InputSource::DragDrop => "Please drop a valid PDF file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(UploadCandidate),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

pub struct UploadGate;

impl UploadGate {
    pub fn submit(source: InputSource, candidate: Option<UploadCandidate>) -> Verdict {
        let Some(candidate) = candidate else {
            return Verdict::Rejected(Rejection {
                reason: RejectReason::NoFile,
                input: source,
            });
        };

        if !candidate.is_pdf() {
            tracing::info!(
                file = %candidate.file_name,
                media_type = %candidate.media_type,
                ?source,
                "rejected upload"
            );
            return Verdict::Rejected(Rejection {
                reason: RejectReason::InvalidType {
                    media_type: candidate.media_type,
                },
                input: source,
            });
        }

        tracing::debug!(file = %candidate.file_name, ?source, "accepted upload");
        Verdict::Accepted(candidate)
    }
}
