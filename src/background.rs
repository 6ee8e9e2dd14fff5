//! Rolling median background model.
//!
//! Keeps a bounded FIFO window of downsampled frames per camera and derives
//! a per-pixel, per-channel median image from it. The median is the scene
//! baseline that motion detection compares against; a median (rather than a
//! mean) is robust to transient foreground objects passing through the
//! window.

use std::collections::VecDeque;

use crate::frame::{Frame, PixelGrid, DOWNSAMPLE_HEIGHT, DOWNSAMPLE_WIDTH};

/// Per-camera background model.
pub struct BackgroundModel {
    window: VecDeque<PixelGrid>,
    median: Option<PixelGrid>,
    window_size: usize,
    update_delay_ms: u64,
    last_update_ms: Option<u64>,
}

impl BackgroundModel {
    pub fn new(window_size: usize, update_delay_ms: u64) -> Self {
        assert!(window_size > 0, "median window must hold at least one frame");
        Self {
            window: VecDeque::with_capacity(window_size),
            median: None,
            window_size,
            update_delay_ms,
            last_update_ms: None,
        }
    }

    /// Fold `frame` into the window and recompute the median.
    ///
    /// Once the window is full, updates closer together than the configured
    /// delay are skipped. The delay is not just a cost saving: without it a
    /// temporarily-stationary foreground object would be absorbed into the
    /// background within one window span and never be re-flagged.
    pub fn update(&mut self, frame: &Frame, timestamp_ms: u64) {
        if self.window.len() == self.window_size {
            if let Some(last) = self.last_update_ms {
                if timestamp_ms.saturating_sub(last) < self.update_delay_ms {
                    return;
                }
            }
        }

        self.last_update_ms = Some(timestamp_ms);
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(frame.pixels.downsample());
        self.median = Some(compute_median(&self.window));
    }

    /// The current median image, or `None` before the first update.
    pub fn median(&self) -> Option<&PixelGrid> {
        self.median.as_ref()
    }

    /// Number of frames currently in the window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    #[cfg(test)]
    fn window(&self) -> &VecDeque<PixelGrid> {
        &self.window
    }
}

/// Per-byte median across all grids in the window.
///
/// For an even-sized window the median byte is the floor of the mean of the
/// two middle values, matching integer truncation of the fractional median.
fn compute_median(window: &VecDeque<PixelGrid>) -> PixelGrid {
    let byte_len = window[0].data().len();
    let mut out = Vec::with_capacity(byte_len);
    let mut values: Vec<u8> = Vec::with_capacity(window.len());

    for idx in 0..byte_len {
        values.clear();
        values.extend(window.iter().map(|grid| grid.data()[idx]));
        values.sort_unstable();

        let mid = values.len() / 2;
        let median = if values.len() % 2 == 1 {
            values[mid]
        } else {
            ((u16::from(values[mid - 1]) + u16::from(values[mid])) / 2) as u8
        };
        out.push(median);
    }

    PixelGrid::from_rgb(DOWNSAMPLE_WIDTH, DOWNSAMPLE_HEIGHT, out)
}
