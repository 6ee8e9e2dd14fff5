//! Frame sources.
//!
//! A `FrameSource` supplies decoded frames and a monotonically
//! non-decreasing per-camera clock. Sources shipped here:
//!
//! - `SyntheticSource` (`stub://` URLs): deterministic generated scene,
//!   the daemon's default and the demo input.
//! - `ScriptedSource`: plays back a prepared frame sequence, for tests
//!   and tools.
//!
//! Real decoders (ffmpeg, gstreamer, v4l2) are deliberately out of scope;
//! anything that can produce RGB24 frames behind this trait plugs in.

pub mod scripted;
pub mod synthetic;

pub use scripted::ScriptedSource;
pub use synthetic::{SyntheticConfig, SyntheticSource};

use crate::frame::Frame;

/// One camera's stream of decoded frames.
pub trait FrameSource {
    /// Next frame, or `None` on end-of-stream/read failure. `None` is
    /// terminal for the camera; sources are never retried.
    fn read(&mut self) -> Option<Frame>;

    /// Timestamp of the frame `read` would return next, in milliseconds.
    /// Non-decreasing within a source.
    fn current_timestamp_ms(&self) -> u64;

    /// Nominal frame rate of the stream.
    fn frame_rate(&self) -> f64;
}
