//! Shoulder height to avatar position mapping.
//!
//! The usable shoulder range `[UPPER_LIMIT, LOWER_LIMIT]` (preview pixels) is
//! stretched over the whole avatar travel; anything outside it saturates.

use crate::{
    config::{LEFT_SHOULDER, LOWER_LIMIT, RIGHT_SHOULDER, UPPER_LIMIT},
    types::Pose,
};

pub fn normalize(y_pos: f32) -> f32 {
    normalize_between(y_pos, UPPER_LIMIT, LOWER_LIMIT)
}

pub fn normalize_between(y_pos: f32, upper: f32, lower: f32) -> f32 {
    if y_pos < upper {
        return 0.0;
    }
    if y_pos > lower {
        return 1.0;
    }
    (y_pos - upper) / (lower - upper)
}

/// Mean shoulder height in pixels of a frame `frame_height` tall.
pub fn shoulder_height(pose: &Pose, frame_height: u32) -> Option<f32> {
    let left = pose.landmark(LEFT_SHOULDER)?;
    let right = pose.landmark(RIGHT_SHOULDER)?;
    Some((left.y + right.y) / 2.0 * frame_height as f32)
}

/// Last-known-value hold for the control signal.
#[derive(Clone, Copy, Debug)]
pub struct ControlSignal {
    value: f32,
}

impl Default for ControlSignal {
    fn default() -> Self {
        Self { value: 0.5 }
    }
}

impl ControlSignal {
    /// Updates from a detection, or keeps the previous value on a miss.
    pub fn observe(&mut self, pose: Option<&Pose>, frame_height: u32) -> f32 {
        if let Some(height) = pose.and_then(|pose| shoulder_height(pose, frame_height)) {
            self.value = normalize(height);
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Landmark;

    fn pose_with_shoulders(left_y: f32, right_y: f32) -> Pose {
        let mut landmarks = vec![
            Landmark {
                x: 0.5,
                y: 0.5,
                z: 0.0,
                visibility: 1.0,
                presence: 1.0,
            };
            33
        ];
        landmarks[LEFT_SHOULDER].y = left_y;
        landmarks[RIGHT_SHOULDER].y = right_y;
        Pose { landmarks }
    }

    #[test]
    fn saturates_outside_limits() {
        for y in [-100.0, 0.0, 25.0, UPPER_LIMIT - 0.01] {
            assert_eq!(normalize(y), 0.0);
        }
        for y in [LOWER_LIMIT + 0.01, 400.0, 10_000.0] {
            assert_eq!(normalize(y), 1.0);
        }
    }

    #[test]
    fn linear_between_limits() {
        let mid = (UPPER_LIMIT + LOWER_LIMIT) / 2.0;
        assert!((normalize(mid) - 0.5).abs() < 1e-6);
        assert_eq!(normalize(UPPER_LIMIT), 0.0);
        assert_eq!(normalize(LOWER_LIMIT), 1.0);
        let quarter = UPPER_LIMIT + (LOWER_LIMIT - UPPER_LIMIT) / 4.0;
        assert!((normalize(quarter) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn averages_both_shoulders() {
        let pose = pose_with_shoulders(0.2, 0.4);
        let height = shoulder_height(&pose, 450).unwrap();
        assert!((height - 135.0).abs() < 1e-3);
    }

    #[test]
    fn holds_last_value_on_miss() {
        let mut signal = ControlSignal::default();
        assert_eq!(signal.observe(None, 450), 0.5);

        // 175 px is the midpoint of the usable range.
        let pose = pose_with_shoulders(175.0 / 450.0, 175.0 / 450.0);
        let value = signal.observe(Some(&pose), 450);
        assert!((value - 0.5).abs() < 1e-4);

        let low = pose_with_shoulders(0.9, 0.9);
        assert_eq!(signal.observe(Some(&low), 450), 1.0);
        assert_eq!(signal.observe(None, 450), 1.0);
    }

    #[test]
    fn short_landmark_list_is_a_miss() {
        let mut signal = ControlSignal::default();
        let pose = Pose { landmarks: Vec::new() };
        assert_eq!(signal.observe(Some(&pose), 450), 0.5);
    }
}
