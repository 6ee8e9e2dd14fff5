//! Per-tick orchestration across cameras.
//!
//! One tick processes every active camera in order: pull a frame, fold it
//! into the background model, check for motion against the just-updated
//! median, and run the clip buffer's bookkeeping. Everything is
//! single-threaded and synchronous; clip persistence happens inline when a
//! flush falls due, which may stall the tick on I/O.
//!
//! Cameras own their background model and clip buffer exclusively; nothing
//! is shared across cameras and no locking exists anywhere in the core.

use crate::background::BackgroundModel;
use crate::clip::{rolling_capacity, IncidentClipBuffer};
use crate::config::VigilConfig;
use crate::detect::MotionDetector;
use crate::incident::IncidentLog;
use crate::ingest::FrameSource;
use crate::store::{ClipStorage, ClipWriter};

/// Outcome of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    /// At least one camera is still active.
    Running,
    /// Every camera has gone inactive; nothing left to process.
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraStatus {
    Active,
    Inactive,
}

/// Clip persistence collaborators, injected once at startup. `None` means
/// recording is disabled and clip buffers stay inert.
pub struct Recording {
    pub storage: ClipStorage,
    pub writer: Box<dyn ClipWriter>,
}

/// One camera: its stream plus the per-camera pipeline state.
pub struct Camera {
    index: usize,
    source: Box<dyn FrameSource>,
    background: BackgroundModel,
    clip: IncidentClipBuffer,
    status: CameraStatus,
    frame_rate: f64,
}

impl Camera {
    fn new(index: usize, source: Box<dyn FrameSource>, cfg: &VigilConfig) -> Self {
        let frame_rate = source.frame_rate();
        let cap = rolling_capacity(cfg.pre_incident_ms, cfg.post_incident_ms, frame_rate);
        Self {
            index,
            source,
            background: BackgroundModel::new(cfg.median_window_size, cfg.median_update_delay_ms),
            clip: IncidentClipBuffer::new(cap, cfg.max_clip_duration_ms, cfg.pre_incident_ms),
            status: CameraStatus::Active,
            frame_rate,
        }
    }

    pub fn status(&self) -> CameraStatus {
        self.status
    }
}

/// Orchestrates background update, motion detection, incident logging and
/// clip flushes for all cameras.
pub struct IncidentManager {
    cameras: Vec<Camera>,
    detector: MotionDetector,
    log: IncidentLog,
    recording: Option<Recording>,
    post_incident_ms: u64,
}

impl IncidentManager {
    /// Build the camera registry from the configured sources. The log and
    /// the recording collaborators are injected rather than constructed
    /// here.
    pub fn new(
        cfg: &VigilConfig,
        sources: Vec<Box<dyn FrameSource>>,
        log: IncidentLog,
        recording: Option<Recording>,
    ) -> Self {
        let cameras = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| Camera::new(index, source, cfg))
            .collect();
        Self {
            cameras,
            detector: MotionDetector::new(cfg.movement_threshold, cfg.movement_blob_ratio),
            log,
            recording,
            post_incident_ms: cfg.post_incident_ms,
        }
    }

    pub fn incident_log(&self) -> &IncidentLog {
        &self.log
    }

    pub fn into_incident_log(self) -> IncidentLog {
        self.log
    }

    pub fn active_camera_count(&self) -> usize {
        self.cameras
            .iter()
            .filter(|c| c.status == CameraStatus::Active)
            .count()
    }

    /// Process one frame from every active camera.
    pub fn tick(&mut self) -> TickStatus {
        if self.active_camera_count() == 0 {
            return TickStatus::Exhausted;
        }

        let Self {
            cameras,
            detector,
            log,
            recording,
            post_incident_ms,
        } = self;

        let mut status_line = String::new();
        for camera in cameras.iter_mut() {
            if camera.status != CameraStatus::Active {
                continue;
            }

            let ts = camera.source.current_timestamp_ms();
            status_line.push_str(&format!("{}: {:.2}s || ", camera.index, ts as f64 / 1000.0));

            let Some(frame) = camera.source.read() else {
                // Terminal for this camera. An open incident is persisted
                // with whatever the buffer holds; rolling-only history is
                // dropped.
                if let Some(recording) = recording.as_mut() {
                    flush_clip(recording, camera);
                }
                log::warn!("camera {} has no input, removing from rotation", camera.index);
                camera.status = CameraStatus::Inactive;
                continue;
            };

            if let Some(recording) = recording.as_mut() {
                // Flush check precedes the append: a frame past the
                // deadline starts the next rolling window.
                if camera.clip.should_flush(ts) {
                    flush_clip(recording, camera);
                }
                camera.clip.append(frame.clone());
            }

            camera.background.update(&frame, ts);
            if detector.check_for_movement(&frame, camera.background.median()) {
                log.record(ts, camera.index);
                log::info!(
                    "camera {}: motion at {:.2}s",
                    camera.index,
                    ts as f64 / 1000.0
                );
                if recording.is_some() {
                    camera.clip.arm(ts + *post_incident_ms);
                }
            }
        }

        log::debug!("{}", status_line.trim_end_matches(" || "));
        TickStatus::Running
    }

    /// Persist every open incident; shutdown path so partially-recorded
    /// clips are not lost.
    pub fn force_flush_all(&mut self) {
        let Some(recording) = self.recording.as_mut() else {
            return;
        };
        for camera in self.cameras.iter_mut() {
            flush_clip(recording, camera);
        }
    }
}

/// Write an open incident's clip; a no-op for idle-rolling buffers.
/// Write failures are logged and do not stop the run.
fn flush_clip(recording: &mut Recording, camera: &mut Camera) {
    let Some(frames) = camera.clip.take_clip() else {
        return;
    };
    let path = match recording.storage.next_clip_path(camera.index) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("camera {}: cannot resolve clip path: {e:#}", camera.index);
            return;
        }
    };
    log::info!(
        "camera {}: writing {}-frame clip to {}",
        camera.index,
        frames.len(),
        path.display()
    );
    if let Err(e) = recording.writer.write(&path, &frames, camera.frame_rate) {
        log::warn!("camera {}: clip write failed: {e:#}", camera.index);
    }
}
