//! Synthetic `stub://` frame source.
//!
//! Generates a flat gray scene with an optional bright block during a
//! configured frame range, which is enough to exercise the whole
//! pipeline without camera hardware or codecs. Used as the daemon's
//! default source and by the demo configuration.

use anyhow::{anyhow, Result};

use super::FrameSource;
use crate::frame::{Frame, PixelGrid};

const BACKGROUND_LEVEL: u8 = 96;
const BLOCK_LEVEL: u8 = 230;

/// Settings parsed from a `stub://` URL.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Total frames before the source reports end-of-stream.
    pub frames: u64,
    /// First frame index carrying the moving block, if any.
    pub motion_at: Option<u64>,
    /// How many consecutive frames carry the block.
    pub motion_frames: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            name: "camera".to_string(),
            width: 640,
            height: 480,
            fps: 10.0,
            frames: 300,
            motion_at: None,
            motion_frames: 1,
        }
    }
}

impl SyntheticConfig {
    /// Parse `stub://name?fps=10&frames=300&width=640&height=480&
    /// motion_at=60&motion_frames=5`.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("stub://")
            .ok_or_else(|| anyhow!("synthetic sources require a stub:// url, got {url}"))?;

        let mut cfg = Self::default();
        let (name, query) = match rest.split_once('?') {
            Some((name, query)) => (name, Some(query)),
            None => (rest, None),
        };
        if !name.is_empty() {
            cfg.name = name.to_string();
        }

        if let Some(query) = query {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("malformed stub parameter '{pair}' in {url}"))?;
                match key {
                    "width" => cfg.width = parse_num(key, value)?,
                    "height" => cfg.height = parse_num(key, value)?,
                    "fps" => cfg.fps = parse_num(key, value)?,
                    "frames" => cfg.frames = parse_num(key, value)?,
                    "motion_at" => cfg.motion_at = Some(parse_num(key, value)?),
                    "motion_frames" => cfg.motion_frames = parse_num(key, value)?,
                    other => return Err(anyhow!("unknown stub parameter '{other}' in {url}")),
                }
            }
        }

        if cfg.fps <= 0.0 {
            return Err(anyhow!("stub fps must be positive"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(anyhow!("stub dimensions must be nonzero"));
        }
        Ok(cfg)
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("invalid value '{value}' for stub parameter '{key}'"))
}

/// Deterministic generated camera stream.
pub struct SyntheticSource {
    config: SyntheticConfig,
    next_frame: u64,
    frame_interval_ms: f64,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        let frame_interval_ms = 1000.0 / config.fps;
        Self {
            config,
            next_frame: 0,
            frame_interval_ms,
        }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        Ok(Self::new(SyntheticConfig::parse(url)?))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    fn has_motion(&self, frame_index: u64) -> bool {
        match self.config.motion_at {
            Some(start) => {
                frame_index >= start && frame_index < start + self.config.motion_frames
            }
            None => false,
        }
    }

    fn render(&self, frame_index: u64) -> PixelGrid {
        let mut pixels =
            PixelGrid::solid(self.config.width, self.config.height, [BACKGROUND_LEVEL; 3]);
        if self.has_motion(frame_index) {
            // Block covering ~10% of the area, drifting right each frame.
            let w = self.config.width / 3;
            let h = self.config.height * 3 / 10;
            let offset = frame_index.saturating_sub(self.config.motion_at.unwrap_or(0)) as u32;
            let x = (self.config.width / 4 + offset * 4).min(self.config.width - 1);
            pixels.fill_rect(x, self.config.height / 3, w, h, [BLOCK_LEVEL; 3]);
        }
        pixels
    }
}

impl FrameSource for SyntheticSource {
    fn read(&mut self) -> Option<Frame> {
        if self.next_frame >= self.config.frames {
            return None;
        }
        let ts = self.current_timestamp_ms();
        let pixels = self.render(self.next_frame);
        self.next_frame += 1;
        Some(Frame::new(pixels, ts))
    }

    fn current_timestamp_ms(&self) -> u64 {
        (self.next_frame as f64 * self.frame_interval_ms) as u64
    }

    fn frame_rate(&self) -> f64 {
        self.config.fps
    }
}
