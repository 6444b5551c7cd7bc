use crate::{
    DetectedCode, DetectorConfig, QrDetectionExt, QrDetector, QrError, RqrrDetector,
    MAX_UPSCALE_FACTOR,
};
use image::{imageops, GrayImage, Luma};
use qrcode::{Color, QrCode};

const QUIET_ZONE: u32 = 4;

/// Renders a QR symbol with its quiet zone, `module_px` pixels per module.
fn render_qr(text: &str, module_px: u32) -> GrayImage {
    let code = QrCode::new(text.as_bytes()).unwrap();
    let width = code.width() as u32;
    let colors = code.to_colors();
    let side = (width + 2 * QUIET_ZONE) * module_px;

    GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module_px, y / module_px);
        let inside = (QUIET_ZONE..QUIET_ZONE + width).contains(&mx)
            && (QUIET_ZONE..QUIET_ZONE + width).contains(&my);
        if inside {
            let idx = ((my - QUIET_ZONE) * width + (mx - QUIET_ZONE)) as usize;
            if colors[idx] == Color::Dark {
                return Luma([0]);
            }
        }
        Luma([255])
    })
}

fn white_canvas(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

fn assert_corners_within(code: &DetectedCode, min: f32, max: f32) {
    assert_eq!(code.corners.len(), 4);
    for [x, y] in &code.corners {
        assert!(*x >= min && *x <= max, "x = {x} outside [{min}, {max}]");
        assert!(*y >= min && *y <= max, "y = {y} outside [{min}, {max}]");
    }
}

#[test]
fn detect_single_code() -> Result<(), QrError> {
    let qr = render_qr("DEVICE_001", 8);
    let detections = qr.detect_qr_codes()?;

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].text, "DEVICE_001");
    assert!(detections[0].is_decoded());
    assert_corners_within(&detections[0], 0.0, qr.width() as f32);

    Ok(())
}

#[test]
fn detect_multiple_codes() -> Result<(), QrError> {
    let left = render_qr("MODULE_001", 6);
    let right = render_qr(r#"{"device_id":"SENSOR_001","type":"temperature_sensor"}"#, 6);

    let mut canvas = white_canvas(left.width() + right.width() + 40, 400);
    imageops::replace(&mut canvas, &left, 10, 10);
    imageops::replace(&mut canvas, &right, (left.width() + 30) as i64, 10);

    let detections = RqrrDetector::default().detect(&canvas)?;

    let mut texts = detections
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>();
    texts.sort_unstable();
    assert_eq!(
        texts,
        vec![
            "MODULE_001",
            r#"{"device_id":"SENSOR_001","type":"temperature_sensor"}"#
        ]
    );
    for detection in &detections {
        assert!(detection.quad().is_some());
    }

    Ok(())
}

#[test]
fn detect_blank_image() -> Result<(), QrError> {
    let detections = white_canvas(320, 240).detect_qr_codes()?;
    assert!(detections.is_empty());
    Ok(())
}

#[test]
fn detect_with_upscale_maps_corners_back() -> Result<(), QrError> {
    let qr = render_qr("ACTUATOR_001", 3);
    let mut canvas = white_canvas(200, 200);
    imageops::replace(&mut canvas, &qr, 50, 50);

    let detector = RqrrDetector::new(DetectorConfig { upscale_factor: 2 })?;
    let detections = detector.detect(&canvas)?;

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].text, "ACTUATOR_001");
    // corners are expressed in the original 200x200 frame, around the pasted symbol
    assert_corners_within(&detections[0], 50.0, 50.0 + qr.width() as f32);

    Ok(())
}

#[test]
fn zero_upscale_factor_is_rejected() {
    let res = RqrrDetector::new(DetectorConfig { upscale_factor: 0 });
    assert!(matches!(res, Err(QrError::InvalidUpscaleFactor(0))));
}

#[test]
fn oversized_upscale_is_rejected() -> Result<(), QrError> {
    // 2048x1025 at 8x is just over 128 megapixels
    let detector = RqrrDetector::new(DetectorConfig {
        upscale_factor: MAX_UPSCALE_FACTOR,
    })?;
    let res = detector.detect(&white_canvas(2048, 1025));
    assert!(matches!(
        res,
        Err(QrError::ImageTooLarge {
            width: 2048,
            height: 1025,
            factor: MAX_UPSCALE_FACTOR,
        })
    ));
    Ok(())
}

#[test]
fn upscale_factor_above_maximum_is_rejected() {
    for factor in [MAX_UPSCALE_FACTOR + 1, 50, u32::MAX] {
        let res = RqrrDetector::new(DetectorConfig {
            upscale_factor: factor,
        });
        assert!(matches!(
            res,
            Err(QrError::UpscaleFactorTooLarge { factor: f, max: MAX_UPSCALE_FACTOR }) if f == factor
        ));
    }
    assert!(RqrrDetector::new(DetectorConfig {
        upscale_factor: MAX_UPSCALE_FACTOR,
    })
    .is_ok());
}

#[test]
fn quad_requires_four_corners() {
    let partial = DetectedCode::new("X", vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
    assert_eq!(partial.quad(), None);

    let full = DetectedCode::new("", vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    assert_eq!(
        full.quad(),
        Some([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
    );
    assert!(!full.is_decoded());
}
