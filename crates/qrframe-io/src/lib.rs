#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for image loading.
///
/// Defines [`error::IoError`] variants for file access and decoding failures.
pub mod error;

/// High-level image reading functions.
///
/// See [`functional::read_image_gray8`] for automatic format detection.
pub mod functional;

/// Camera capture.
///
/// The [`capture::FrameSource`] trait, the interactive [`capture::run_session`] loop and,
/// behind the `v4l` feature on Linux, the Video4Linux2 camera backend.
pub mod capture;

pub use error::IoError;
