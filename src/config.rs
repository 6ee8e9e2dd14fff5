use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_MEDIAN_WINDOW_SIZE: usize = 60;
const DEFAULT_MOVEMENT_THRESHOLD: u8 = 30;
const DEFAULT_MOVEMENT_BLOB_RATIO: f64 = 0.005;
const DEFAULT_MEDIAN_UPDATE_DELAY_MS: u64 = 1;
const DEFAULT_PRE_INCIDENT_MS: u64 = 2000;
const DEFAULT_POST_INCIDENT_MS: u64 = 1000;
const DEFAULT_MAX_CLIP_DURATION_MS: u64 = 10_000;
const DEFAULT_CAMERA: &str = "stub://camera?motion_at=120&motion_frames=5";

#[derive(Debug, Deserialize, Default)]
struct VigilConfigFile {
    median_window_size: Option<usize>,
    movement_threshold: Option<u8>,
    movement_blob_ratio: Option<f64>,
    median_update_delay_ms: Option<u64>,
    record_incidents: Option<bool>,
    pre_incident_ms: Option<u64>,
    post_incident_ms: Option<u64>,
    max_clip_duration_ms: Option<u64>,
    output_directory: Option<String>,
    cameras: Option<Vec<String>>,
}

/// Runtime configuration for the incident pipeline.
#[derive(Debug, Clone)]
pub struct VigilConfig {
    /// Frames kept for the background median.
    pub median_window_size: usize,
    /// Per-pixel intensity delta (0-255) that marks a pixel as moving.
    pub movement_threshold: u8,
    /// Fraction of moving pixels (0.0-1.0) that marks a frame as motion.
    pub movement_blob_ratio: f64,
    /// Minimum interval between median updates once the window is full.
    pub median_update_delay_ms: u64,
    /// Whether incident clips are buffered and written to disk.
    pub record_incidents: bool,
    pub pre_incident_ms: u64,
    pub post_incident_ms: u64,
    /// Absolute cap on one clip's duration, deadline extensions included.
    pub max_clip_duration_ms: u64,
    /// Output subdirectory name under `Out/`, if any.
    pub output_directory: Option<String>,
    /// Camera source URLs.
    pub cameras: Vec<String>,
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            median_window_size: DEFAULT_MEDIAN_WINDOW_SIZE,
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            movement_blob_ratio: DEFAULT_MOVEMENT_BLOB_RATIO,
            median_update_delay_ms: DEFAULT_MEDIAN_UPDATE_DELAY_MS,
            record_incidents: false,
            pre_incident_ms: DEFAULT_PRE_INCIDENT_MS,
            post_incident_ms: DEFAULT_POST_INCIDENT_MS,
            max_clip_duration_ms: DEFAULT_MAX_CLIP_DURATION_MS,
            output_directory: None,
            cameras: vec![DEFAULT_CAMERA.to_string()],
        }
    }
}

impl VigilConfig {
    /// Load configuration: file (explicit path or `VIGIL_CONFIG`), then
    /// env overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("VIGIL_CONFIG").ok();
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => match env_path.as_deref() {
                Some(path) => Some(read_config_file(Path::new(path))?),
                None => None,
            },
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: VigilConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            median_window_size: file.median_window_size.unwrap_or(defaults.median_window_size),
            movement_threshold: file.movement_threshold.unwrap_or(defaults.movement_threshold),
            movement_blob_ratio: file
                .movement_blob_ratio
                .unwrap_or(defaults.movement_blob_ratio),
            median_update_delay_ms: file
                .median_update_delay_ms
                .unwrap_or(defaults.median_update_delay_ms),
            record_incidents: file.record_incidents.unwrap_or(defaults.record_incidents),
            pre_incident_ms: file.pre_incident_ms.unwrap_or(defaults.pre_incident_ms),
            post_incident_ms: file.post_incident_ms.unwrap_or(defaults.post_incident_ms),
            max_clip_duration_ms: file
                .max_clip_duration_ms
                .unwrap_or(defaults.max_clip_duration_ms),
            output_directory: file.output_directory,
            cameras: file.cameras.unwrap_or(defaults.cameras),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(cameras) = std::env::var("VIGIL_CAMERAS") {
            let parsed = split_csv(&cameras);
            if !parsed.is_empty() {
                self.cameras = parsed;
            }
        }
        if let Ok(dir) = std::env::var("VIGIL_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_directory = Some(dir);
            }
        }
        if let Ok(record) = std::env::var("VIGIL_RECORD") {
            self.record_incidents = match record.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                other => return Err(anyhow!("VIGIL_RECORD must be a boolean, got '{other}'")),
            };
        }
        if let Ok(threshold) = std::env::var("VIGIL_MOVEMENT_THRESHOLD") {
            self.movement_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("VIGIL_MOVEMENT_THRESHOLD must be an integer 0-255"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.median_window_size == 0 {
            return Err(anyhow!("median_window_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.movement_blob_ratio) {
            return Err(anyhow!("movement_blob_ratio must be within 0.0..=1.0"));
        }
        if self.max_clip_duration_ms <= self.pre_incident_ms + self.post_incident_ms {
            return Err(anyhow!(
                "max_clip_duration_ms must exceed pre_incident_ms + post_incident_ms"
            ));
        }
        if self.cameras.is_empty() {
            return Err(anyhow!("at least one camera source is required"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<VigilConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}
