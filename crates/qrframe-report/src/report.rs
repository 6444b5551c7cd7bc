use std::fmt::Display;

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use log::{debug, warn};
use qrframe_qr::{DetectedCode, Point2};
use serde::{de, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{
    error::ReportError,
    geometry::{resolve, Position},
    payload::DeviceInfo,
};

/// Size of the scanned frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDimensions {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// One detected module of the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Sequential id, starting at 1, in detection order.
    pub module_id: usize,
    /// Geometry of the module.
    pub position: Position,
    /// The decoded text, verbatim.
    pub qr_code_data: String,
    /// Device info parsed from the decoded text.
    pub device_info: DeviceInfo,
}

impl Module {
    /// Builds a module from its id, the four detected corners and the decoded text.
    pub fn new(module_id: usize, corners: &[Point2; 4], text: &str) -> Self {
        Self {
            module_id,
            position: resolve(corners),
            qr_code_data: text.to_string(),
            device_info: DeviceInfo::parse(text),
        }
    }
}

/// The report of a scan that could look at the frame, whether or not it found codes.
///
/// `modules_detected` is not stored: it is written as `modules.len()` and checked against
/// the modules when a report is read back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawScanReport")]
pub struct ScanReport {
    /// Local time of assembly, ISO-8601 with microseconds and UTC offset.
    pub timestamp: String,
    /// Where the frame came from: a file path or a camera descriptor.
    pub source: String,
    /// Size of the scanned frame.
    pub frame_dimensions: FrameDimensions,
    /// The detected modules, in detection order.
    pub modules: Vec<Module>,
}

impl ScanReport {
    /// Number of detected modules.
    #[inline]
    pub fn modules_detected(&self) -> usize {
        self.modules.len()
    }
}

impl Serialize for ScanReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScanReport", 5)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("frame_dimensions", &self.frame_dimensions)?;
        state.serialize_field("modules_detected", &self.modules_detected())?;
        state.serialize_field("modules", &self.modules)?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScanReport {
    timestamp: String,
    source: String,
    frame_dimensions: FrameDimensions,
    modules_detected: usize,
    modules: Vec<Module>,
}

impl TryFrom<RawScanReport> for ScanReport {
    type Error = String;

    fn try_from(raw: RawScanReport) -> Result<Self, Self::Error> {
        if raw.modules_detected != raw.modules.len() {
            return Err(format!(
                "modules_detected is {} but {} modules are listed",
                raw.modules_detected,
                raw.modules.len()
            ));
        }
        Ok(Self {
            timestamp: raw.timestamp,
            source: raw.source,
            frame_dimensions: raw.frame_dimensions,
            modules: raw.modules,
        })
    }
}

/// The failure shape: only an error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanFailure {
    /// Why the frame could not be scanned.
    pub error: String,
}

/// The result of a scan: either a full report or an error, never a mix of both.
///
/// A JSON object with an `error` key reads as the failure shape, any other object as a
/// report. Both shapes reject unknown fields, so a mix of the two does not parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanResult {
    /// The frame was scanned; zero modules is a valid report.
    Report(ScanReport),
    /// The frame could not be loaded, captured or scanned.
    Failure(ScanFailure),
}

impl ScanResult {
    /// Creates the failure shape from an error.
    pub fn failure(error: impl Display) -> Self {
        Self::Failure(ScanFailure {
            error: error.to_string(),
        })
    }

    /// Returns the report, if the scan succeeded.
    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failure(_) => None,
        }
    }

    /// Whether this is the failure shape.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Serializes the result as JSON, pretty-printed with two-space indentation if asked.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String, ReportError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Parses a result from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is neither of the two shapes.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<'de> Deserialize<'de> for ScanResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // numbers are kept verbatim, which buffered untagged matching cannot read back
        let value = Value::deserialize(deserializer)?;
        let is_failure = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("error"));

        if is_failure {
            serde_json::from_value(value)
                .map(Self::Failure)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Report)
                .map_err(de::Error::custom)
        }
    }
}

impl From<ScanReport> for ScanResult {
    fn from(report: ScanReport) -> Self {
        Self::Report(report)
    }
}

/// Assembles the report of a scan, timestamped now.
///
/// See [`assemble_at`].
pub fn assemble(
    source: &str,
    frame_dimensions: FrameDimensions,
    detections: &[DetectedCode],
) -> ScanReport {
    assemble_at(&Local::now(), source, frame_dimensions, detections)
}

/// Assembles the report of a scan with the given timestamp.
///
/// Modules keep the detector's order and are numbered from 1. Detections without exactly
/// four corners are dropped before numbering, so the ids are always `1..=N`. An empty
/// detection list yields a report with no modules.
pub fn assemble_at<Tz: TimeZone>(
    timestamp: &DateTime<Tz>,
    source: &str,
    frame_dimensions: FrameDimensions,
    detections: &[DetectedCode],
) -> ScanReport
where
    Tz::Offset: Display,
{
    let modules = detections
        .iter()
        .filter_map(|detection| {
            let quad = detection.quad();
            if quad.is_none() {
                warn!(
                    "dropping detection {:?} with {} corner(s)",
                    detection.text,
                    detection.corners.len()
                );
            }
            quad.map(|corners| (corners, detection.text.as_str()))
        })
        .enumerate()
        .map(|(i, (corners, text))| Module::new(i + 1, &corners, text))
        .collect::<Vec<_>>();

    debug!(
        "assembled {} module(s) from {} detection(s) of {source}",
        modules.len(),
        detections.len()
    );

    ScanReport {
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
        source: source.to_string(),
        frame_dimensions,
        modules,
    }
}
