#![deny(missing_docs)]
//! QR code detection for qrframe.
//!
//! This crate puts the `rqrr` crate behind the [`QrDetector`] trait and normalizes its
//! raw grids into [`DetectedCode`] records: decoded text plus the corner points of the
//! symbol in pixel coordinates of the input image.

use image::{imageops, GrayImage};
use log::debug;
use rqrr::PreparedImage;
use thiserror::Error;

/// Error type for QR code detection.
#[derive(Error, Debug)]
pub enum QrError {
    /// The upscale factor must be at least 1.
    #[error("Invalid upscale factor: {0}")]
    InvalidUpscaleFactor(u32),

    /// The upscale factor is above [`MAX_UPSCALE_FACTOR`].
    #[error("Upscale factor {factor} is above the maximum of {max}")]
    UpscaleFactorTooLarge {
        /// Requested upscale factor.
        factor: u32,
        /// The largest accepted factor.
        max: u32,
    },

    /// The upscaled image would exceed [`MAX_UPSCALED_PIXELS`].
    #[error("Image of size {width}x{height} cannot be upscaled by {factor}")]
    ImageTooLarge {
        /// Width of the input image.
        width: u32,
        /// Height of the input image.
        height: u32,
        /// Requested upscale factor.
        factor: u32,
    },
}

/// Largest accepted upscale factor.
pub const MAX_UPSCALE_FACTOR: u32 = 8;

/// Largest number of pixels an upscaled frame may have, 128 megapixels.
pub const MAX_UPSCALED_PIXELS: u64 = 1 << 27;

/// A 2d point in pixel coordinates, as `[x, y]`.
pub type Point2 = [f32; 2];

/// One raw detection result.
///
/// `text` is empty when the detector located a symbol but could not decode it. `corners`
/// holds the points in the order the detector delivered them; a well-formed detection has
/// exactly four, see [`DetectedCode::quad`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedCode {
    /// The decoded content of the QR code.
    pub text: String,
    /// The corner points of the QR code in the image.
    pub corners: Vec<Point2>,
}

impl DetectedCode {
    /// Creates a new detection from its decoded text and corner points.
    pub fn new(text: impl Into<String>, corners: Vec<Point2>) -> Self {
        Self {
            text: text.into(),
            corners,
        }
    }

    /// Returns the four corners, or `None` when the detection does not carry exactly four.
    pub fn quad(&self) -> Option<[Point2; 4]> {
        <[Point2; 4]>::try_from(self.corners.as_slice()).ok()
    }

    /// Whether the detector managed to decode the payload.
    #[inline]
    pub fn is_decoded(&self) -> bool {
        !self.text.is_empty()
    }
}

/// A multi-code QR detector.
///
/// Implementors locate every QR-like symbol in a grayscale image and return one
/// [`DetectedCode`] per symbol, possibly none. The input image is never modified.
pub trait QrDetector {
    /// Detects and decodes all QR codes in the image.
    fn detect(&self, image: &GrayImage) -> Result<Vec<DetectedCode>, QrError>;
}

/// Configuration for [`RqrrDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Integer factor the image is upscaled by before detection. Corners are mapped back
    /// to the input image coordinates. Use values above 1 for low resolution frames, up to
    /// [`MAX_UPSCALE_FACTOR`].
    pub upscale_factor: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { upscale_factor: 1 }
    }
}

/// QR code detector backed by the `rqrr` crate.
#[derive(Debug, Clone, Default)]
pub struct RqrrDetector {
    config: DetectorConfig,
}

impl RqrrDetector {
    /// Creates a new detector with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidUpscaleFactor`] if the upscale factor is zero, or
    /// [`QrError::UpscaleFactorTooLarge`] if it is above [`MAX_UPSCALE_FACTOR`].
    pub fn new(config: DetectorConfig) -> Result<Self, QrError> {
        if config.upscale_factor == 0 {
            return Err(QrError::InvalidUpscaleFactor(config.upscale_factor));
        }
        if config.upscale_factor > MAX_UPSCALE_FACTOR {
            return Err(QrError::UpscaleFactorTooLarge {
                factor: config.upscale_factor,
                max: MAX_UPSCALE_FACTOR,
            });
        }
        Ok(Self { config })
    }

    /// Returns a reference to the detector configuration.
    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl QrDetector for RqrrDetector {
    fn detect(&self, image: &GrayImage) -> Result<Vec<DetectedCode>, QrError> {
        let factor = self.config.upscale_factor;

        let upscaled;
        let target = if factor > 1 {
            upscaled = upscale(image, factor)?;
            &upscaled
        } else {
            image
        };

        let mut prepared = PreparedImage::prepare_from_greyscale(
            target.width() as usize,
            target.height() as usize,
            |x, y| target.get_pixel(x as u32, y as u32)[0],
        );

        let grids = prepared.detect_grids();
        debug!("rqrr located {} grid(s)", grids.len());

        let scale = factor as f32;
        let detections = grids
            .iter()
            .map(|grid| {
                let corners = grid
                    .bounds
                    .iter()
                    .map(|p| [p.x as f32 / scale, p.y as f32 / scale])
                    .collect();

                // an undecodable grid is still a detection, just without text
                let text = match grid.decode() {
                    Ok((meta, content)) => {
                        debug!(
                            "decoded grid: version {}, ecc level {}, mask {}",
                            meta.version.0, meta.ecc_level, meta.mask
                        );
                        content
                    }
                    Err(e) => {
                        debug!("grid located but not decoded: {e}");
                        String::new()
                    }
                };

                DetectedCode { text, corners }
            })
            .collect();

        Ok(detections)
    }
}

/// Upscales a grayscale image by an integer factor with a cubic filter.
fn upscale(image: &GrayImage, factor: u32) -> Result<GrayImage, QrError> {
    let (width, height) = image.dimensions();
    let too_large = || QrError::ImageTooLarge {
        width,
        height,
        factor,
    };

    let new_width = width.checked_mul(factor).ok_or_else(too_large)?;
    let new_height = height.checked_mul(factor).ok_or_else(too_large)?;
    if new_width as u64 * new_height as u64 > MAX_UPSCALED_PIXELS {
        return Err(too_large());
    }

    Ok(imageops::resize(
        image,
        new_width,
        new_height,
        imageops::FilterType::CatmullRom,
    ))
}

/// Extension trait to run the default detector directly on an image.
pub trait QrDetectionExt {
    /// Detects and decodes QR codes in the image with a default [`RqrrDetector`].
    ///
    /// # Errors
    ///
    /// Returns an error if detection fails.
    fn detect_qr_codes(&self) -> Result<Vec<DetectedCode>, QrError>;
}

impl QrDetectionExt for GrayImage {
    fn detect_qr_codes(&self) -> Result<Vec<DetectedCode>, QrError> {
        RqrrDetector::default().detect(self)
    }
}

#[cfg(test)]
mod tests;
