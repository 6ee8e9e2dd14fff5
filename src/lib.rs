//! vigil - per-camera motion incident pipeline.
//!
//! Flags frames containing motion relative to a slowly-adapting background
//! model and, when recording is enabled, retains a short pre/post video
//! clip around each detected event.
//!
//! # Architecture
//!
//! Per tick, for every active camera:
//!
//! 1. pull the next frame from its `FrameSource`
//! 2. fold it into the rolling-median `BackgroundModel`
//! 3. compare it against the median with the `MotionDetector`
//! 4. on motion, append to the `IncidentLog` and arm the camera's
//!    `IncidentClipBuffer` flush deadline
//! 5. run the clip buffer's rolling/flush bookkeeping
//!
//! The whole run is single-threaded and cooperative; a camera whose
//! stream ends is removed from the rotation and the run finishes once no
//! active cameras remain.
//!
//! # Module structure
//!
//! - `frame`: pixel storage and the fixed analysis downsample
//! - `background`: rolling median background model
//! - `detect`: threshold-difference motion detection
//! - `clip`: pre/post incident clip buffer
//! - `incident`: append-only incident log
//! - `store`: clip directory layout and MJPEG encoding
//! - `ingest`: frame sources (synthetic, scripted)
//! - `manager`: per-tick orchestration
//! - `config`: file + environment configuration

pub mod background;
pub mod clip;
pub mod config;
pub mod detect;
pub mod frame;
pub mod incident;
pub mod ingest;
pub mod manager;
pub mod store;

pub use background::BackgroundModel;
pub use clip::{rolling_capacity, IncidentClipBuffer};
pub use config::VigilConfig;
pub use detect::MotionDetector;
pub use frame::{Frame, PixelGrid, DOWNSAMPLE_HEIGHT, DOWNSAMPLE_WIDTH};
pub use incident::{IncidentLog, IncidentRecord};
pub use ingest::{FrameSource, ScriptedSource, SyntheticConfig, SyntheticSource};
pub use manager::{Camera, CameraStatus, IncidentManager, Recording, TickStatus};
pub use store::{ClipStorage, ClipWriter, MjpegClipWriter};
