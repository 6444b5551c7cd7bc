use image::GrayImage;
use log::{info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::{gray_from_mjpeg, gray_from_yuyv, CameraConfig, CaptureError, FrameSource, PixelFormat};

/// Number of kernel buffers requested for the capture stream.
const NUM_BUFFERS: u32 = 4;

/// A Video4Linux2 camera producing grayscale frames.
///
/// The device is opened in [`V4lCamera::open`] and released when the camera is dropped.
pub struct V4lCamera {
    // NOTE: the stream must be dropped before the device
    stream: Stream<'static>,
    _device: Device,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    descriptor: String,
}

impl V4lCamera {
    /// Opens and configures the camera.
    ///
    /// The device may pick a different size or pixel format than requested; the negotiated
    /// values are used for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::DeviceUnavailable`] if the device cannot be opened or
    /// configured, or [`CaptureError::UnsupportedPixelFormat`] if it only offers a format
    /// without a grayscale conversion.
    pub fn open(config: &CameraConfig) -> Result<Self, CaptureError> {
        let descriptor = config.descriptor();
        let unavailable = |source: std::io::Error| CaptureError::DeviceUnavailable {
            device: descriptor.clone(),
            source,
        };

        let device = Device::new(config.device_index).map_err(unavailable)?;

        let mut format = device.format().map_err(unavailable)?;
        format.width = config.size.width as u32;
        format.height = config.size.height as u32;
        format.fourcc = FourCC::new(config.format.fourcc());

        let actual = device.set_format(&format).map_err(unavailable)?;
        let pixel_format = PixelFormat::from_fourcc(&actual.fourcc.repr)
            .ok_or_else(|| CaptureError::UnsupportedPixelFormat(actual.fourcc.to_string()))?;

        if pixel_format != config.format {
            warn!(
                "requested format {:?} not supported by {descriptor}, using {pixel_format:?}",
                config.format
            );
        }

        let stream =
            Stream::with_buffers(&device, Type::VideoCapture, NUM_BUFFERS).map_err(unavailable)?;

        info!(
            "opened {descriptor} at {}x{} ({pixel_format:?})",
            actual.width, actual.height
        );

        Ok(Self {
            stream,
            _device: device,
            width: actual.width,
            height: actual.height,
            pixel_format,
            descriptor,
        })
    }
}

impl FrameSource for V4lCamera {
    fn grab(&mut self) -> Result<GrayImage, CaptureError> {
        let (buffer, metadata) = self.stream.next()?;

        // only the used bytes carry the frame
        let used = (metadata.bytesused as usize).min(buffer.len());
        let data = if used > 0 { &buffer[..used] } else { buffer };

        match self.pixel_format {
            PixelFormat::Yuyv => gray_from_yuyv(data, self.width, self.height),
            PixelFormat::Mjpg => gray_from_mjpeg(data),
        }
    }

    fn descriptor(&self) -> String {
        self.descriptor.clone()
    }
}

impl Drop for V4lCamera {
    fn drop(&mut self) {
        info!("released {}", self.descriptor);
    }
}
