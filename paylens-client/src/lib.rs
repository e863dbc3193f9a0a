//! paylens-client: the analysis request client and the relay that fronts the backend.

pub mod client;
pub mod relay;

pub use client::{interpret_response, AnalysisClient, ClientError, FILE_FIELD};
pub use relay::{bind_relay, run_relay, RelayConfig, RELAY_ROUTE};
