/// Errors that can occur when serializing or parsing scan results.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The result could not be written or read as JSON.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}
