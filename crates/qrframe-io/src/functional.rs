use std::path::Path;

use image::GrayImage;

use crate::error::IoError;

/// Reads an image from the given file path as 8-bit grayscale.
///
/// The method tries to read from any image format supported by the image crate. Color
/// images are converted to luma.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A grayscale image containing the image data.
///
/// # Errors
///
/// Returns [`IoError::FileDoesNotExist`] when the path does not exist, and a file or
/// decoding error when the file cannot be read or is not a supported image.
pub fn read_image_gray8(file_path: impl AsRef<Path>) -> Result<GrayImage, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // open the file and map it to memory
    let file = std::fs::File::open(file_path)?;
    // SAFETY: the mapping is read-only and dropped before this function returns
    let mmap = unsafe { memmap2::Mmap::map(&file)? };

    decode_image_gray8(&mmap)
}

/// Decodes an in-memory encoded image (png, jpeg, bmp, tiff) as 8-bit grayscale.
///
/// # Errors
///
/// Returns [`IoError::ImageDecodeError`] if the format cannot be guessed or decoded.
pub fn decode_image_gray8(bytes: &[u8]) -> Result<GrayImage, IoError> {
    let img = image::load_from_memory(bytes)?;
    log::debug!(
        "decoded {}x{} image with color type {:?}",
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img.into_luma8())
}
