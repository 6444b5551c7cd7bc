use argh::FromArgs;
use log::{error, info, warn};
use qrframe::{
    io::capture::{open_camera, CameraConfig, ImageSize, PixelFormat, SessionCommand},
    qr::DetectorConfig,
    report::{export::to_csv, ScanResult},
    ScanError, Scanner,
};
use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
    sync::mpsc::{self, Sender},
};

#[derive(FromArgs)]
/// Scan a frame of QR-tagged modules and print their positions and device info as JSON
struct Args {
    /// path to the image file to scan
    #[argh(option, short = 'i')]
    image: Option<PathBuf>,

    /// camera index for live scanning
    #[argh(option, short = 'c', default = "0")]
    camera: usize,

    /// use the live camera feed, the default when no image is given
    #[argh(switch, short = 'l')]
    live: bool,

    /// output JSON file path
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// also write the module table as CSV to this path
    #[argh(option)]
    csv: Option<PathBuf>,

    /// pretty print the JSON output
    #[argh(switch)]
    pretty: bool,

    /// upscale factor applied before detection, 1 to 8, for low resolution frames
    #[argh(option, short = 'u', default = "1")]
    upscale: u32,

    /// requested camera frame width
    #[argh(option, default = "640")]
    width: usize,

    /// requested camera frame height
    #[argh(option, default = "480")]
    height: usize,

    /// requested camera pixel format, mjpg or yuyv
    #[argh(option, default = "PixelFormat::Mjpg")]
    format: PixelFormat,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let result = match Scanner::new(DetectorConfig {
        upscale_factor: args.upscale,
    }) {
        Ok(scanner) => scan(&scanner, &args),
        Err(e) => {
            error!("{e}");
            ScanResult::failure(e)
        }
    };

    let json = result.to_json(args.pretty)?;
    write_output(&json, args.output.as_deref(), &mut std::io::stdout());

    if let Some(csv_path) = &args.csv {
        match result.report() {
            Some(report) => match std::fs::write(csv_path, to_csv(report)) {
                Ok(()) => info!("Module table saved to {}", csv_path.display()),
                Err(e) => error!("Error saving module table to {}: {e}", csv_path.display()),
            },
            None => warn!("scan failed, no module table written"),
        }
    }

    Ok(())
}

fn scan(scanner: &Scanner, args: &Args) -> ScanResult {
    match &args.image {
        Some(path) => {
            if args.live {
                warn!("both an image and --live given, scanning the image");
            }
            scanner.scan_file(path)
        }
        None => scan_camera(scanner, args),
    }
}

/// Opens the camera and runs the interactive session on stdin commands and Ctrl-C.
fn scan_camera(scanner: &Scanner, args: &Args) -> ScanResult {
    let config = CameraConfig {
        device_index: args.camera,
        size: ImageSize {
            width: args.width,
            height: args.height,
        },
        format: args.format,
    };

    let camera = match open_camera(&config) {
        Ok(camera) => camera,
        Err(e) => return ScanResult::failure(ScanError::from(e)),
    };

    let (tx, rx) = mpsc::channel();

    let handler = ctrlc::set_handler({
        let tx = tx.clone();
        move || {
            info!("Received Ctrl-C signal, quitting");
            let _ = tx.send(SessionCommand::Quit);
        }
    });
    if let Err(e) = handler {
        warn!("Ctrl-C handler not installed, use 'q' to quit: {e}");
    }

    std::thread::spawn(move || read_commands(tx));

    eprintln!("Camera opened. Enter 's' to scan the current frame, 'q' to quit");

    scanner.scan_live(camera, &rx)
}

/// Forwards the user's commands from stdin. Closing stdin quits the session.
fn read_commands(tx: Sender<SessionCommand>) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        match parse_command(&line) {
            Some(cmd) => {
                let _ = tx.send(cmd);
                return;
            }
            None => warn!("unknown command {:?}, use 's' or 'q'", line.trim()),
        }
    }
    let _ = tx.send(SessionCommand::Quit);
}

fn parse_command(line: &str) -> Option<SessionCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "scan" => Some(SessionCommand::Scan),
        "q" | "quit" => Some(SessionCommand::Quit),
        _ => None,
    }
}

/// Writes the JSON to `output`, or to `fallback` when there is no output file or the
/// write fails.
fn write_output(json: &str, output: Option<&Path>, fallback: &mut impl Write) {
    if let Some(path) = output {
        match std::fs::write(path, json) {
            Ok(()) => {
                info!("Results saved to {}", path.display());
                return;
            }
            Err(e) => error!("Error saving to {}: {e}", path.display()),
        }
    }
    if let Err(e) = writeln!(fallback, "{json}") {
        error!("Error writing results: {e}");
    }
}
