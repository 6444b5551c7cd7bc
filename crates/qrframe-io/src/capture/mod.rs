mod convert;
mod error;
mod session;

#[cfg(all(feature = "v4l", target_os = "linux"))]
mod v4l_camera;

pub use convert::{gray_from_mjpeg, gray_from_yuyv};
pub use error::CaptureError;
pub use session::{run_session, SessionCommand};

#[cfg(all(feature = "v4l", target_os = "linux"))]
pub use v4l_camera::V4lCamera;

use image::GrayImage;

/// A live source of grayscale frames, such as a camera.
///
/// The device handle is owned by the implementor and released when it is dropped, so a
/// source is released on every exit path of a capture session.
pub trait FrameSource {
    /// Grabs the next frame from the source, blocking until one is available.
    fn grab(&mut self) -> Result<GrayImage, CaptureError>;

    /// Describes the source, used as the `source` field of scan reports.
    fn descriptor(&self) -> String;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn grab(&mut self) -> Result<GrayImage, CaptureError> {
        (**self).grab()
    }

    fn descriptor(&self) -> String {
        (**self).descriptor()
    }
}

/// Image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels.
    pub width: usize,
    /// Height of the image in pixels.
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Camera pixel formats the capture backend can turn into grayscale frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// YUYV 4:2:2, uncompressed.
    Yuyv,
    /// Motion JPEG.
    #[default]
    Mjpg,
}

impl PixelFormat {
    /// The V4L2 FourCC code of the format.
    pub fn fourcc(&self) -> &'static [u8; 4] {
        match self {
            Self::Yuyv => b"YUYV",
            Self::Mjpg => b"MJPG",
        }
    }

    /// Parses a FourCC code, returning `None` for formats without a grayscale conversion.
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"YUYV" => Some(Self::Yuyv),
            b"MJPG" => Some(Self::Mjpg),
            _ => None,
        }
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yuyv" => Ok(Self::Yuyv),
            "mjpg" | "mjpeg" => Ok(Self::Mjpg),
            _ => Err(format!("unsupported pixel format: {s}")),
        }
    }
}

/// Configuration for camera capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Index of the camera, `N` in `/dev/videoN`.
    pub device_index: usize,
    /// The desired frame size.
    pub size: ImageSize,
    /// The desired pixel format.
    pub format: PixelFormat,
}

impl CameraConfig {
    /// Descriptor used as the scan source for frames of this camera.
    pub fn descriptor(&self) -> String {
        format!("camera:{}", self.device_index)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            size: ImageSize {
                width: 640,
                height: 480,
            },
            format: PixelFormat::default(),
        }
    }
}

/// Opens the camera described by `config`.
///
/// # Errors
///
/// Returns [`CaptureError::DeviceUnavailable`] when the device cannot be opened or
/// configured.
#[cfg(all(feature = "v4l", target_os = "linux"))]
pub fn open_camera(config: &CameraConfig) -> Result<Box<dyn FrameSource>, CaptureError> {
    Ok(Box::new(V4lCamera::open(config)?))
}

/// Opens the camera described by `config`.
///
/// # Errors
///
/// This build has no camera backend, so it always returns [`CaptureError::Unsupported`].
/// Enable the `v4l` feature on Linux for camera capture.
#[cfg(not(all(feature = "v4l", target_os = "linux")))]
pub fn open_camera(config: &CameraConfig) -> Result<Box<dyn FrameSource>, CaptureError> {
    Err(CaptureError::Unsupported(config.descriptor()))
}

#[cfg(test)]
mod tests {
    use super::{open_camera, CameraConfig, PixelFormat};

    #[test]
    fn pixel_format_fourcc() {
        assert_eq!(PixelFormat::from_fourcc(b"YUYV"), Some(PixelFormat::Yuyv));
        assert_eq!(PixelFormat::from_fourcc(PixelFormat::Mjpg.fourcc()), Some(PixelFormat::Mjpg));
        assert_eq!(PixelFormat::from_fourcc(b"NV12"), None);
    }

    #[test]
    fn pixel_format_from_str() {
        assert_eq!("MJPEG".parse::<PixelFormat>(), Ok(PixelFormat::Mjpg));
        assert_eq!("yuyv".parse::<PixelFormat>(), Ok(PixelFormat::Yuyv));
        assert!("rgb".parse::<PixelFormat>().is_err());
    }

    #[test]
    fn camera_descriptor() {
        let config = CameraConfig {
            device_index: 2,
            ..Default::default()
        };
        assert_eq!(config.descriptor(), "camera:2");
    }

    #[test]
    #[cfg(not(all(feature = "v4l", target_os = "linux")))]
    fn open_camera_without_backend() {
        let res = open_camera(&CameraConfig::default());
        assert!(matches!(res, Err(super::CaptureError::Unsupported(d)) if d == "camera:0"));
    }
}
