use std::sync::mpsc::{Receiver, TryRecvError};

use image::GrayImage;
use log::{debug, info};

use super::{CaptureError, FrameSource};

/// A user action in an interactive capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Scan the current frame and end the session.
    Scan,
    /// End the session without scanning.
    Quit,
}

/// Runs an interactive capture session.
///
/// Frames are grabbed continuously until a command arrives. On [`SessionCommand::Scan`]
/// the most recent frame is returned; on [`SessionCommand::Quit`], or when every command
/// sender is gone, the session ends with [`CaptureError::Cancelled`]. A failed grab ends
/// the session with that error. The session never times out.
///
/// # Arguments
///
/// * `source` - The frame source, released by its owner once the session returns.
/// * `commands` - The channel the user actions arrive on.
pub fn run_session<S: FrameSource + ?Sized>(
    source: &mut S,
    commands: &Receiver<SessionCommand>,
) -> Result<GrayImage, CaptureError> {
    info!("capture session started on {}", source.descriptor());

    let mut num_frames = 0usize;
    loop {
        let frame = source.grab()?;
        num_frames += 1;

        match commands.try_recv() {
            Ok(SessionCommand::Scan) => {
                info!(
                    "scanning frame {num_frames} ({}x{})",
                    frame.width(),
                    frame.height()
                );
                return Ok(frame);
            }
            Ok(SessionCommand::Quit) | Err(TryRecvError::Disconnected) => {
                info!("capture session cancelled after {num_frames} frame(s)");
                return Err(CaptureError::Cancelled);
            }
            Err(TryRecvError::Empty) => {
                debug!("grabbed frame {num_frames}");
            }
        }
    }
}
