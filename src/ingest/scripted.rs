//! In-memory scripted frame source.
//!
//! Plays back a pre-built frame sequence; the workhorse behind the
//! pipeline tests, where each frame's content and timestamp must be
//! exact.

use std::collections::VecDeque;

use super::FrameSource;
use crate::frame::Frame;

pub struct ScriptedSource {
    frames: VecDeque<Frame>,
    fps: f64,
    last_timestamp_ms: u64,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Frame>, fps: f64) -> Self {
        Self {
            frames: frames.into(),
            fps,
            last_timestamp_ms: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ScriptedSource {
    fn read(&mut self) -> Option<Frame> {
        let frame = self.frames.pop_front()?;
        self.last_timestamp_ms = frame.timestamp_ms;
        Some(frame)
    }

    fn current_timestamp_ms(&self) -> u64 {
        // Timestamp of the next frame; once exhausted, the clock holds at
        // the last delivered frame.
        self.frames
            .front()
            .map(|f| f.timestamp_ms)
            .unwrap_or(self.last_timestamp_ms)
    }

    fn frame_rate(&self) -> f64 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelGrid;

    #[test]
    fn plays_frames_in_order_then_ends() {
        let frames = vec![
            Frame::new(PixelGrid::solid(2, 2, [1, 1, 1]), 0),
            Frame::new(PixelGrid::solid(2, 2, [2, 2, 2]), 100),
        ];
        let mut source = ScriptedSource::new(frames, 10.0);

        assert_eq!(source.current_timestamp_ms(), 0);
        assert_eq!(source.read().unwrap().timestamp_ms, 0);
        assert_eq!(source.current_timestamp_ms(), 100);
        assert_eq!(source.read().unwrap().timestamp_ms, 100);
        assert!(source.read().is_none());
        // Clock holds after exhaustion.
        assert_eq!(source.current_timestamp_ms(), 100);
    }
}
