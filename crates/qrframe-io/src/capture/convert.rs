use image::{GrayImage, ImageFormat};

use super::CaptureError;

/// Extracts the luma plane of a YUYV 4:2:2 frame.
///
/// Every pixel pair is packed as `Y0 U Y1 V`, so the grayscale image is every even byte.
///
/// # Errors
///
/// Returns [`CaptureError::FrameSizeMismatch`] if the buffer is shorter than
/// `width * height * 2` bytes.
pub fn gray_from_yuyv(data: &[u8], width: u32, height: u32) -> Result<GrayImage, CaptureError> {
    let mismatch = || CaptureError::FrameSizeMismatch {
        len: data.len(),
        width,
        height,
    };

    let num_pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(mismatch)?;
    if data.len() < num_pixels * 2 {
        return Err(mismatch());
    }

    let luma = data[..num_pixels * 2].iter().step_by(2).copied().collect();

    GrayImage::from_raw(width, height, luma).ok_or_else(mismatch)
}

/// Decodes a Motion JPEG frame to grayscale.
///
/// # Errors
///
/// Returns [`CaptureError::FrameDecodeError`] if the buffer is not a valid JPEG.
pub fn gray_from_mjpeg(data: &[u8]) -> Result<GrayImage, CaptureError> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    Ok(img.into_luma8())
}
