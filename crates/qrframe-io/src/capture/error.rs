/// An error type for camera capture.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// The camera device could not be opened or configured.
    #[error("Could not open camera {device}: {source}")]
    DeviceUnavailable {
        /// Descriptor of the camera.
        device: String,
        /// The underlying device error.
        source: std::io::Error,
    },

    /// Grabbing a frame from the device failed.
    #[error("Failed to grab a frame: {0}")]
    GrabError(#[from] std::io::Error),

    /// A compressed frame could not be decoded.
    #[error("Failed to decode a frame: {0}")]
    FrameDecodeError(#[from] image::ImageError),

    /// The frame buffer does not match the negotiated frame size.
    #[error("Frame buffer of {len} bytes does not match a {width}x{height} frame")]
    FrameSizeMismatch {
        /// Length of the received buffer.
        len: usize,
        /// Negotiated frame width.
        width: u32,
        /// Negotiated frame height.
        height: u32,
    },

    /// The device only offers a pixel format without a grayscale conversion.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// This build has no camera backend.
    #[error("Camera capture is not available in this build: {0}")]
    Unsupported(String),

    /// The user quit the capture session without scanning.
    #[error("Scanning cancelled by user")]
    Cancelled,
}
