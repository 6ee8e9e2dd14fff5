//! Frame types and the fixed analysis downsample.
//!
//! - `PixelGrid`: packed RGB24 pixel storage, used for full frames, the
//!   downsampled analysis frames, and the derived median image.
//! - `Frame`: a `PixelGrid` plus its capture timestamp in milliseconds.
//!
//! Background/motion math never runs on full-resolution pixels: frames are
//! resampled to a fixed 192x108 grid first. Downsampled grids are analysis
//! scratch only and are never written to disk.

/// Width of the downsampled analysis grid.
pub const DOWNSAMPLE_WIDTH: u32 = 192;
/// Height of the downsampled analysis grid.
pub const DOWNSAMPLE_HEIGHT: u32 = 108;

/// Bytes per pixel (packed RGB24).
pub const CHANNELS: usize = 3;

/// A packed RGB24 image: `width * height * 3` bytes, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Wrap raw RGB24 bytes. Length must be exactly `width * height * 3`.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * CHANNELS,
            "pixel data length does not match {}x{} rgb24",
            width,
            height
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// A grid filled with a single color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (not bytes).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Overwrite the pixel at (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.data[idx..idx + CHANNELS].copy_from_slice(&rgb);
    }

    /// Fill an axis-aligned rectangle, clamped to the grid bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.set_pixel(px, py, rgb);
            }
        }
    }

    /// Nearest-neighbour resample to the fixed 192x108 analysis grid.
    ///
    /// A grid that is already 192x108 maps to an identical copy.
    pub fn downsample(&self) -> PixelGrid {
        let dw = DOWNSAMPLE_WIDTH as usize;
        let dh = DOWNSAMPLE_HEIGHT as usize;
        let sw = self.width as usize;
        let sh = self.height as usize;
        let mut data = Vec::with_capacity(dw * dh * CHANNELS);
        for dy in 0..dh {
            let sy = dy * sh / dh;
            let row = sy * sw;
            for dx in 0..dw {
                let sx = dx * sw / dw;
                let idx = (row + sx) * CHANNELS;
                data.extend_from_slice(&self.data[idx..idx + CHANNELS]);
            }
        }
        PixelGrid {
            width: DOWNSAMPLE_WIDTH,
            height: DOWNSAMPLE_HEIGHT,
            data,
        }
    }
}

/// A full-resolution frame as delivered by a `FrameSource`.
///
/// Timestamps within one camera are monotonically non-decreasing.
#[derive(Clone, Debug)]
pub struct Frame {
    pub pixels: PixelGrid,
    pub timestamp_ms: u64,
}

impl Frame {
    pub fn new(pixels: PixelGrid, timestamp_ms: u64) -> Self {
        Self {
            pixels,
            timestamp_ms,
        }
    }
}
