use std::path::Path;
use std::sync::mpsc::Receiver;

use image::GrayImage;
use log::{info, warn};
use qrframe_io::{
    capture::{run_session, FrameSource, SessionCommand},
    functional::read_image_gray8,
};
use qrframe_qr::{DetectorConfig, QrDetector, RqrrDetector};
use qrframe_report::{assemble, FrameDimensions, ScanReport, ScanResult};

use crate::error::ScanError;

/// Runs frames through a [`QrDetector`] and assembles the scan results.
///
/// The scanner holds no state between scans: every scan is a function of one frame.
pub struct Scanner<D = RqrrDetector> {
    detector: D,
}

impl Scanner<RqrrDetector> {
    /// Creates a scanner backed by `rqrr` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the configuration is invalid.
    pub fn new(config: DetectorConfig) -> Result<Self, ScanError> {
        let detector = RqrrDetector::new(config).map_err(ScanError::Config)?;
        Ok(Self::with_detector(detector))
    }
}

impl Default for Scanner<RqrrDetector> {
    fn default() -> Self {
        Self::with_detector(RqrrDetector::default())
    }
}

impl<D: QrDetector> Scanner<D> {
    /// Creates a scanner with a custom detector.
    pub fn with_detector(detector: D) -> Self {
        Self { detector }
    }

    /// Returns a reference to the detector.
    #[inline]
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Scans an in-memory frame.
    ///
    /// # Arguments
    ///
    /// * `image` - The grayscale frame.
    /// * `source` - Where the frame came from, copied into the report.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Detect`] if the detector fails. Finding no codes is not an
    /// error.
    pub fn scan_image(&self, image: &GrayImage, source: &str) -> Result<ScanReport, ScanError> {
        let detections = self.detector.detect(image)?;
        let frame_dimensions = FrameDimensions {
            width: image.width(),
            height: image.height(),
        };

        let report = assemble(source, frame_dimensions, &detections);
        info!(
            "{source}: {} module(s) in a {}x{} frame",
            report.modules_detected(),
            frame_dimensions.width,
            frame_dimensions.height
        );

        Ok(report)
    }

    /// Loads an image file and scans it.
    ///
    /// A file that cannot be loaded yields the failure shape, never an empty report.
    pub fn scan_file(&self, path: impl AsRef<Path>) -> ScanResult {
        let path = path.as_ref();
        into_result(self.try_scan_file(path))
    }

    fn try_scan_file(&self, path: &Path) -> Result<ScanReport, ScanError> {
        let source = path.display().to_string();
        let image = read_image_gray8(path).map_err(|e| ScanError::Load {
            path: source.clone(),
            source: e,
        })?;
        self.scan_image(&image, &source)
    }

    /// Runs an interactive capture session on `source` and scans the frame the user picks.
    ///
    /// The source is consumed and released before this returns, whether the user scanned,
    /// quit, or the capture failed. See [`run_session`] for the session protocol.
    pub fn scan_live<S: FrameSource>(
        &self,
        mut source: S,
        commands: &Receiver<SessionCommand>,
    ) -> ScanResult {
        let descriptor = source.descriptor();
        let frame = run_session(&mut source, commands);
        drop(source);

        into_result(
            frame
                .map_err(ScanError::from)
                .and_then(|frame| self.scan_image(&frame, &descriptor)),
        )
    }
}

fn into_result(res: Result<ScanReport, ScanError>) -> ScanResult {
    match res {
        Ok(report) => report.into(),
        Err(e) => {
            warn!("scan failed: {e}");
            ScanResult::failure(e)
        }
    }
}
