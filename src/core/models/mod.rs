mod analysis;
mod capture_buffer;
mod credential;
mod history;

pub use analysis::AnalysisResult;
pub use capture_buffer::CaptureBuffer;
pub use credential::{resolve_credential, Credential, CredentialResolution};
pub use history::{CaptureHistory, HistoryEntry};
