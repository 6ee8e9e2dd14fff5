//! Incident clip buffer.
//!
//! Each camera owns one buffer with two regimes:
//!
//! - **idle-rolling**: a fixed-length sliding window of the most recent
//!   full-resolution frames, oldest evicted on overflow. This is the
//!   pre-incident history.
//! - **incident-open**: a flush deadline is armed and the buffer grows by
//!   plain append until the deadline (or the absolute duration cap)
//!   passes, at which point the whole sequence is handed off for
//!   persistence and the buffer resets to idle-rolling.
//!
//! The flush check runs before the current tick's append, so the frame
//! that trips the deadline starts the next rolling window instead of
//! landing at the tail of the clip.

use std::collections::VecDeque;

use crate::frame::Frame;

/// Rolling/growing frame history around one incident.
pub struct IncidentClipBuffer {
    frames: VecDeque<Frame>,
    rolling_cap: usize,
    max_clip_ms: u64,
    pre_incident_ms: u64,
    first_buffered_at: Option<u64>,
    flush_deadline: Option<u64>,
}

/// Frames retained while idle: `(pre_ms + post_ms) * fps / 1000`,
/// truncated.
pub fn rolling_capacity(pre_incident_ms: u64, post_incident_ms: u64, fps: f64) -> usize {
    (((pre_incident_ms + post_incident_ms) as f64 * fps) / 1000.0) as usize
}

impl IncidentClipBuffer {
    pub fn new(rolling_cap: usize, max_clip_ms: u64, pre_incident_ms: u64) -> Self {
        Self {
            frames: VecDeque::with_capacity(rolling_cap + 1),
            rolling_cap,
            max_clip_ms,
            pre_incident_ms,
            first_buffered_at: None,
            flush_deadline: None,
        }
    }

    /// True while a flush deadline is armed.
    pub fn is_open(&self) -> bool {
        self.flush_deadline.is_some()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Arm (or re-arm) the flush deadline. Re-arming while open extends
    /// the current clip rather than starting a new one.
    pub fn arm(&mut self, deadline_ms: u64) {
        self.flush_deadline = Some(deadline_ms);
    }

    /// Append the current tick's frame.
    ///
    /// Idle: slide the window and restamp `first_buffered_at` to the
    /// oldest retained frame. Open: grow without eviction.
    pub fn append(&mut self, frame: Frame) {
        self.frames.push_back(frame);
        if self.flush_deadline.is_some() {
            return;
        }
        while self.frames.len() > self.rolling_cap {
            self.frames.pop_front();
        }
        self.first_buffered_at = self.frames.front().map(|f| f.timestamp_ms);
    }

    /// Flush condition for an open incident.
    ///
    /// The second clause is the absolute duration cap: further incidents
    /// may keep extending the deadline, but the clip still ends
    /// `max_clip_ms - pre_incident_ms` after the rolling window began.
    pub fn should_flush(&self, now_ms: u64) -> bool {
        let Some(deadline) = self.flush_deadline else {
            return false;
        };
        if now_ms > deadline {
            return true;
        }
        match self.first_buffered_at {
            Some(first) => now_ms > first + self.max_clip_ms - self.pre_incident_ms,
            None => false,
        }
    }

    /// Hand off the accumulated clip and reset to idle-rolling.
    ///
    /// Returns `None` unless an incident is open: a camera that dies with
    /// only rolling history produces no clip.
    pub fn take_clip(&mut self) -> Option<Vec<Frame>> {
        self.flush_deadline.take()?;
        self.first_buffered_at = None;
        Some(self.frames.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelGrid;

    fn frame(ts: u64) -> Frame {
        Frame::new(PixelGrid::solid(4, 4, [0, 0, 0]), ts)
    }

    #[test]
    fn rolling_capacity_truncates() {
        assert_eq!(rolling_capacity(2000, 1000, 10.0), 30);
        assert_eq!(rolling_capacity(2000, 1000, 12.5), 37);
    }

    #[test]
    fn idle_window_never_exceeds_cap() {
        let mut buf = IncidentClipBuffer::new(5, 10_000, 2000);
        for i in 0..50u64 {
            buf.append(frame(i * 100));
            assert!(buf.len() <= 5);
        }
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn first_buffered_at_tracks_oldest_retained() {
        let mut buf = IncidentClipBuffer::new(3, 10_000, 2000);
        for ts in [0u64, 100, 200, 300, 400] {
            buf.append(frame(ts));
        }
        // Window holds 200/300/400; cap condition anchors at 200.
        assert!(!buf.should_flush(200));
        buf.arm(10_000_000);
        assert!(buf.should_flush(200 + 10_000 - 2000 + 1));
        assert!(!buf.should_flush(200 + 10_000 - 2000));
    }

    #[test]
    fn open_buffer_grows_without_eviction() {
        let mut buf = IncidentClipBuffer::new(3, 10_000, 2000);
        for ts in [0u64, 100, 200] {
            buf.append(frame(ts));
        }
        buf.arm(900);
        for ts in [300u64, 400, 500, 600] {
            buf.append(frame(ts));
        }
        assert_eq!(buf.len(), 7);
    }

    #[test]
    fn deadline_is_exclusive() {
        let mut buf = IncidentClipBuffer::new(3, 10_000, 0);
        buf.append(frame(0));
        buf.arm(500);
        assert!(!buf.should_flush(500));
        assert!(buf.should_flush(501));
    }

    #[test]
    fn take_clip_requires_open_incident() {
        let mut buf = IncidentClipBuffer::new(3, 10_000, 2000);
        buf.append(frame(0));
        assert!(buf.take_clip().is_none());
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn flush_happens_exactly_once_per_episode() {
        let mut buf = IncidentClipBuffer::new(3, 10_000, 2000);
        for ts in [0u64, 100, 200] {
            buf.append(frame(ts));
        }
        buf.arm(250);

        assert!(buf.should_flush(300));
        let clip = buf.take_clip().expect("open incident");
        assert_eq!(clip.len(), 3);

        // Reset: empty, closed, and the cap anchor is gone.
        assert!(buf.is_empty());
        assert!(!buf.is_open());
        assert!(!buf.should_flush(u64::MAX));
        assert!(buf.take_clip().is_none());
    }
}
