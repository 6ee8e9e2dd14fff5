//! Clip persistence: output directory layout and clip encoding.
//!
//! `ClipStorage` owns the on-disk layout — one subdirectory per camera,
//! clips named by the next unused sequential index. It is constructed once
//! at startup and injected into the orchestrator, so no core type creates
//! directories as a constructor side effect.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::frame::Frame;

/// Encodes an ordered frame sequence to a single clip file.
///
/// Success/failure is fire-and-forget from the orchestrator's point of
/// view: a failed write is logged and the run continues.
pub trait ClipWriter {
    fn write(&mut self, path: &Path, frames: &[Frame], frame_rate: f64) -> Result<()>;
}

/// MJPEG clip writer: each frame JPEG-encoded and appended to one file.
///
/// Container-less concatenated JPEG is deliberately simple; common players
/// and ffmpeg accept it as an MJPEG stream.
pub struct MjpegClipWriter {
    quality: u8,
}

impl MjpegClipWriter {
    pub fn new() -> Self {
        Self { quality: 85 }
    }
}

impl Default for MjpegClipWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipWriter for MjpegClipWriter {
    fn write(&mut self, path: &Path, frames: &[Frame], frame_rate: f64) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create clip file {}", path.display()))?;
        let mut out = BufWriter::new(file);

        for frame in frames {
            let encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
            encoder
                .write_image(
                    frame.pixels.data(),
                    frame.pixels.width(),
                    frame.pixels.height(),
                    ExtendedColorType::Rgb8,
                )
                .with_context(|| format!("jpeg encode failed for {}", path.display()))?;
        }
        out.flush()?;

        log::debug!(
            "wrote {} frames at {:.1} fps to {}",
            frames.len(),
            frame_rate,
            path.display()
        );
        Ok(())
    }
}

/// On-disk clip layout: `<root>/camera-<index>/<n>.mjpeg`.
pub struct ClipStorage {
    root: PathBuf,
}

impl ClipStorage {
    /// Resolve the output root from the configured directory name:
    /// `Out/<name>` when set, plain `Out/` otherwise.
    pub fn resolve_root(output_directory: Option<&str>) -> PathBuf {
        match output_directory {
            Some(name) => Path::new("Out").join(name),
            None => PathBuf::from("Out"),
        }
    }

    /// Create the root and one subdirectory per camera.
    pub fn create(root: impl Into<PathBuf>, camera_count: usize) -> Result<Self> {
        let root = root.into();
        for index in 0..camera_count {
            let dir = camera_dir(&root, index);
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create clip directory {}", dir.display()))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn camera_dir(&self, index: usize) -> PathBuf {
        camera_dir(&self.root, index)
    }

    /// Path for the next clip of a camera: the count of existing files in
    /// its directory is the next unused sequential index.
    pub fn next_clip_path(&self, index: usize) -> Result<PathBuf> {
        let dir = self.camera_dir(index);
        let existing = fs::read_dir(&dir)
            .with_context(|| format!("failed to read clip directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .count();
        Ok(dir.join(format!("{existing}.mjpeg")))
    }
}

fn camera_dir(root: &Path, index: usize) -> PathBuf {
    root.join(format!("camera-{index}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelGrid;

    #[test]
    fn resolve_root_honours_optional_name() {
        assert_eq!(
            ClipStorage::resolve_root(Some("warehouse")),
            Path::new("Out").join("warehouse")
        );
        assert_eq!(ClipStorage::resolve_root(None), PathBuf::from("Out"));
    }

    #[test]
    fn create_makes_one_directory_per_camera() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ClipStorage::create(tmp.path().join("out"), 3).unwrap();

        for index in 0..3 {
            assert!(storage.camera_dir(index).is_dir());
        }
    }

    #[test]
    fn clip_paths_use_sequential_indices() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = ClipStorage::create(tmp.path().join("out"), 1).unwrap();

        let first = storage.next_clip_path(0).unwrap();
        assert_eq!(first.file_name().unwrap(), "0.mjpeg");
        fs::write(&first, b"clip").unwrap();

        let second = storage.next_clip_path(0).unwrap();
        assert_eq!(second.file_name().unwrap(), "1.mjpeg");
    }

    #[test]
    fn mjpeg_writer_emits_one_jpeg_per_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clip.mjpeg");
        let frames = vec![
            Frame::new(PixelGrid::solid(16, 16, [10, 20, 30]), 0),
            Frame::new(PixelGrid::solid(16, 16, [40, 50, 60]), 100),
        ];

        MjpegClipWriter::new().write(&path, &frames, 10.0).unwrap();

        let bytes = fs::read(&path).unwrap();
        // SOI marker (0xFFD8) once per frame.
        let soi_count = bytes.windows(2).filter(|w| w == &[0xFF, 0xD8]).count();
        assert_eq!(soi_count, 2);
    }
}
