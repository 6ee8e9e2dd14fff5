//! Threshold-difference motion detection against the median background.

use crate::frame::{Frame, PixelGrid};

/// Stateless motion detector.
///
/// A downsampled pixel counts as "moving" when the mean absolute difference
/// of its three channels against the median image reaches the intensity
/// threshold. The frame counts as containing motion when the moving-pixel
/// fraction exceeds the blob ratio, which filters out per-pixel sensor
/// noise.
#[derive(Clone, Copy, Debug)]
pub struct MotionDetector {
    threshold: u8,
    blob_ratio: f64,
}

impl MotionDetector {
    pub fn new(threshold: u8, blob_ratio: f64) -> Self {
        Self {
            threshold,
            blob_ratio,
        }
    }

    /// Compare `frame` against the median image.
    ///
    /// `None` median (model has seen no frames yet) degrades to no motion
    /// rather than an error. Deterministic and idempotent for identical
    /// inputs.
    pub fn check_for_movement(&self, frame: &Frame, median: Option<&PixelGrid>) -> bool {
        let Some(median) = median else {
            return false;
        };

        let small = frame.pixels.downsample();
        // mean(|d0|,|d1|,|d2|) >= threshold, kept exact in integers as
        // sum >= 3 * threshold. Differences go through i16 to avoid
        // unsigned wraparound.
        let sum_threshold = u32::from(self.threshold) * 3;

        let mut moving = 0usize;
        for (px, bg) in small
            .data()
            .chunks_exact(3)
            .zip(median.data().chunks_exact(3))
        {
            let diff: u32 = px
                .iter()
                .zip(bg)
                .map(|(&a, &b)| u32::from((i16::from(a) - i16::from(b)).unsigned_abs()))
                .sum();
            if diff >= sum_threshold {
                moving += 1;
            }
        }

        moving as f64 > self.blob_ratio * small.pixel_count() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{DOWNSAMPLE_HEIGHT, DOWNSAMPLE_WIDTH};

    const GRAY: [u8; 3] = [96, 96, 96];

    fn gray_frame() -> Frame {
        Frame::new(
            PixelGrid::solid(DOWNSAMPLE_WIDTH, DOWNSAMPLE_HEIGHT, GRAY),
            0,
        )
    }

    /// Frame with exactly `count` pixels pushed past the threshold.
    fn frame_with_hot_pixels(count: usize) -> Frame {
        let mut pixels = PixelGrid::solid(DOWNSAMPLE_WIDTH, DOWNSAMPLE_HEIGHT, GRAY);
        for i in 0..count {
            let x = (i as u32) % DOWNSAMPLE_WIDTH;
            let y = (i as u32) / DOWNSAMPLE_WIDTH;
            pixels.set_pixel(x, y, [255, 255, 255]);
        }
        Frame::new(pixels, 0)
    }

    #[test]
    fn no_median_means_no_motion() {
        let detector = MotionDetector::new(30, 0.005);
        assert!(!detector.check_for_movement(&gray_frame(), None));
    }

    #[test]
    fn identical_frame_never_triggers() {
        let detector = MotionDetector::new(30, 0.005);
        let frame = gray_frame();
        let median = frame.pixels.clone();
        assert!(!detector.check_for_movement(&frame, Some(&median)));
    }

    #[test]
    fn blob_ratio_boundary_is_strict() {
        let detector = MotionDetector::new(30, 0.005);
        let median = gray_frame().pixels;
        let area = median.pixel_count() as f64;

        // floor(0.005 * 20736) = 103: the first count that exceeds the
        // ratio is 104.
        let boundary = (0.005 * area).floor() as usize;

        let below = frame_with_hot_pixels(boundary);
        assert!(!detector.check_for_movement(&below, Some(&median)));

        let above = frame_with_hot_pixels(boundary + 1);
        assert!(detector.check_for_movement(&above, Some(&median)));
    }

    #[test]
    fn per_pixel_threshold_is_inclusive() {
        // Every pixel differs by exactly the threshold.
        let detector = MotionDetector::new(30, 0.5);
        let median = gray_frame().pixels;
        let frame = Frame::new(
            PixelGrid::solid(DOWNSAMPLE_WIDTH, DOWNSAMPLE_HEIGHT, [126, 126, 126]),
            0,
        );
        assert!(detector.check_for_movement(&frame, Some(&median)));

        // One intensity step below the threshold on every pixel.
        let frame = Frame::new(
            PixelGrid::solid(DOWNSAMPLE_WIDTH, DOWNSAMPLE_HEIGHT, [125, 125, 125]),
            0,
        );
        assert!(!detector.check_for_movement(&frame, Some(&median)));
    }

    #[test]
    fn detection_is_idempotent() {
        let detector = MotionDetector::new(30, 0.005);
        let median = gray_frame().pixels;
        let frame = frame_with_hot_pixels(500);

        let first = detector.check_for_movement(&frame, Some(&median));
        let second = detector.check_for_movement(&frame, Some(&median));
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn darker_pixels_do_not_wrap() {
        // Frame darker than the median exercises the signed intermediate.
        let detector = MotionDetector::new(30, 0.5);
        let median = PixelGrid::solid(DOWNSAMPLE_WIDTH, DOWNSAMPLE_HEIGHT, [200, 200, 200]);
        let frame = Frame::new(
            PixelGrid::solid(DOWNSAMPLE_WIDTH, DOWNSAMPLE_HEIGHT, [10, 10, 10]),
            0,
        );
        assert!(detector.check_for_movement(&frame, Some(&median)));
    }
}
