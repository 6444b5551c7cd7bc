#![deny(missing_docs)]
//! # qrframe report
//!
//! Turns raw QR detections into the scan report: per-module geometry, parsed device
//! info, sequential module ids and the JSON/CSV renderings of the result.

/// Error types for report serialization.
pub mod error;

/// Center, bounding box and corners of a detected module.
pub mod geometry;

/// Device info parsed from the decoded QR payload.
pub mod payload;

/// Report assembly and the two JSON shapes of a scan result.
pub mod report;

/// CSV table export of a scan report.
pub mod export;

pub use error::ReportError;
pub use export::to_csv;
pub use geometry::{resolve, BoundingBox, Point, Position};
pub use payload::{parse, DeviceInfo};
pub use report::{assemble, assemble_at, FrameDimensions, Module, ScanFailure, ScanReport, ScanResult};
