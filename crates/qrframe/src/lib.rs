#![deny(missing_docs)]
//! # qrframe
//!
//! Scans a frame holding QR-tagged modules, from an image file or a camera, and reports
//! where each module sits and which device it identifies.
//!
//! ```no_run
//! use qrframe::Scanner;
//!
//! let scanner: Scanner = Scanner::default();
//! let result = scanner.scan_file("rack.png");
//! println!("{}", result.to_json(true).unwrap());
//! ```

/// Error types for a scan.
pub mod error;

/// The scan pipeline: load or capture, detect, assemble.
pub mod scanner;

#[doc(inline)]
pub use qrframe_io as io;

#[doc(inline)]
pub use qrframe_qr as qr;

#[doc(inline)]
pub use qrframe_report as report;

pub use error::ScanError;
pub use scanner::Scanner;
