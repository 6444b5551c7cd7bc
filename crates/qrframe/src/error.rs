use qrframe_io::{capture::CaptureError, IoError};
use qrframe_qr::QrError;

/// Errors that abort a scan. Each one is reported as the failure shape of the result.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The image file is missing, unreadable or not a decodable image.
    #[error("Could not load image from {path}: {source}")]
    Load {
        /// The path that was requested.
        path: String,
        /// The underlying load error.
        source: IoError,
    },

    /// The camera is unavailable, failed, or the user cancelled the capture.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The detector configuration is invalid.
    #[error("Invalid detector configuration: {0}")]
    Config(#[source] QrError),

    /// The detector could not process the frame.
    #[error("QR detection failed: {0}")]
    Detect(#[from] QrError),
}
