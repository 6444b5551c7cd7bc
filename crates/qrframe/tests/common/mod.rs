use image::{imageops, GrayImage, Luma};
use qrcode::{Color, QrCode};

/// Renders a QR symbol with a four module quiet zone, `module_px` pixels per module.
pub fn render_qr(text: &str, module_px: u32) -> GrayImage {
    let code = QrCode::new(text.as_bytes()).unwrap();
    let width = code.width() as u32;
    let colors = code.to_colors();
    let side = (width + 8) * module_px;

    GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module_px, y / module_px);
        if (4..4 + width).contains(&mx) && (4..4 + width).contains(&my) {
            let idx = ((my - 4) * width + (mx - 4)) as usize;
            if colors[idx] == Color::Dark {
                return Luma([0]);
            }
        }
        Luma([255])
    })
}

/// A white frame with the given payloads pasted at the given positions.
pub fn frame_with_codes(width: u32, height: u32, codes: &[(&str, i64, i64)], module_px: u32) -> GrayImage {
    let mut frame = GrayImage::from_pixel(width, height, Luma([255]));
    for (text, x, y) in codes {
        imageops::replace(&mut frame, &render_qr(text, module_px), *x, *y);
    }
    frame
}
