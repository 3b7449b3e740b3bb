mod ort;

pub use self::ort::OrtPoseEngine;

use anyhow::{Result, anyhow};
use ndarray::Array4;

use super::preprocess::{self, CropTransform, POSE_INPUT_SIZE};
use crate::types::{Frame, Landmark, Pose};

/// Body landmarks in the model output; the trailing entries are auxiliary ROI points.
pub const NUM_BODY_LANDMARKS: usize = 33;
pub const VALUES_PER_LANDMARK: usize = 5;

const MIN_POSE_CONFIDENCE: f32 = 0.5;
const MIN_TRACKING_VISIBILITY: f32 = 0.5;
const ROI_SCALE: f32 = 1.5;
const MIN_ROI_SIDE: f32 = 64.0;
const SMOOTHING_TAU_MS: f32 = 60.0;
const SMOOTHING_RESET_MS: u64 = 500;

/// Raw landmark model output for one crop.
#[derive(Clone, Debug)]
pub struct RawPose {
    /// `[x, y, z, visibility, presence]` in model input pixels; the last two are logits.
    pub landmarks: Vec<[f32; VALUES_PER_LANDMARK]>,
    pub confidence: f32,
}

pub trait PoseEngine: Send + 'static {
    fn infer(&mut self, input: Array4<f32>) -> Result<RawPose>;
}

pub fn decode_landmarks(flat: &[f32]) -> Result<Vec<[f32; VALUES_PER_LANDMARK]>> {
    if flat.len() < NUM_BODY_LANDMARKS * VALUES_PER_LANDMARK {
        return Err(anyhow!(
            "unexpected landmarks length: got {}, need {}",
            flat.len(),
            NUM_BODY_LANDMARKS * VALUES_PER_LANDMARK
        ));
    }

    Ok(flat
        .chunks_exact(VALUES_PER_LANDMARK)
        .take(NUM_BODY_LANDMARKS)
        .map(|chunk| [chunk[0], chunk[1], chunk[2], chunk[3], chunk[4]])
        .collect())
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Pose detector in video mode: frames must arrive with increasing timestamps and
/// each detection seeds the crop and smoothing for the next one.
pub struct PoseDetector<E: PoseEngine> {
    engine: E,
    last_timestamp_ms: Option<u64>,
    track: Option<CropTransform>,
    smoothed: Option<Vec<Landmark>>,
}

impl<E: PoseEngine> PoseDetector<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            last_timestamp_ms: None,
            track: None,
            smoothed: None,
        }
    }

    /// Returns `Ok(None)` when no pose is found in the frame.
    pub fn detect_for_video(&mut self, frame: &Frame, timestamp_ms: u64) -> Result<Option<Pose>> {
        let timestamp_ms = self.monotonic(timestamp_ms);
        let elapsed_ms = self
            .last_timestamp_ms
            .map(|last| timestamp_ms.saturating_sub(last));
        self.last_timestamp_ms = Some(timestamp_ms);

        let transform = match self.track {
            Some(track) if track.orig_w == frame.width && track.orig_h == frame.height => track,
            _ => CropTransform::full_frame(frame, POSE_INPUT_SIZE),
        };

        let input = preprocess::prepare_crop(frame, &transform)?;
        let raw = match self.engine.infer(input) {
            Ok(raw) => raw,
            Err(err) => {
                self.reset();
                return Err(err);
            }
        };

        if raw.confidence < MIN_POSE_CONFIDENCE || raw.landmarks.len() < NUM_BODY_LANDMARKS {
            self.reset();
            return Ok(None);
        }

        let landmarks = project_landmarks(&raw.landmarks, &transform);
        let landmarks = self.smooth(landmarks, elapsed_ms);
        self.track = tracking_crop(&landmarks, frame);

        Ok(Some(Pose { landmarks }))
    }

    fn monotonic(&self, timestamp_ms: u64) -> u64 {
        match self.last_timestamp_ms {
            Some(last) if timestamp_ms <= last => {
                log::debug!("pose timestamp {timestamp_ms} not after {last}, bumping");
                last + 1
            }
            _ => timestamp_ms,
        }
    }

    fn smooth(&mut self, landmarks: Vec<Landmark>, elapsed_ms: Option<u64>) -> Vec<Landmark> {
        let alpha = match (elapsed_ms, &self.smoothed) {
            (Some(dt), Some(_)) if dt < SMOOTHING_RESET_MS => {
                1.0 - (-(dt as f32) / SMOOTHING_TAU_MS).exp()
            }
            _ => 1.0,
        };

        let blended: Vec<Landmark> = match &self.smoothed {
            Some(previous) if alpha < 1.0 && previous.len() == landmarks.len() => previous
                .iter()
                .zip(&landmarks)
                .map(|(prev, next)| Landmark {
                    x: prev.x + (next.x - prev.x) * alpha,
                    y: prev.y + (next.y - prev.y) * alpha,
                    z: prev.z + (next.z - prev.z) * alpha,
                    visibility: next.visibility,
                    presence: next.presence,
                })
                .collect(),
            _ => landmarks,
        };

        self.smoothed = Some(blended.clone());
        blended
    }

    fn reset(&mut self) {
        self.track = None;
        self.smoothed = None;
    }
}

/// Maps model-space landmarks to normalized frame coordinates.
pub fn project_landmarks(
    raw: &[[f32; VALUES_PER_LANDMARK]],
    transform: &CropTransform,
) -> Vec<Landmark> {
    let (w, h) = (transform.orig_w.max(1) as f32, transform.orig_h.max(1) as f32);
    let z_scale = transform.side / transform.output_size as f32;
    raw.iter()
        .map(|[x, y, z, visibility, presence]| {
            let (px, py) = transform.project(*x, *y);
            Landmark {
                x: px / w,
                y: py / h,
                z: z * z_scale / w,
                visibility: sigmoid(*visibility),
                presence: sigmoid(*presence),
            }
        })
        .collect()
}

/// Square crop around the visible landmarks, used for the next frame.
fn tracking_crop(landmarks: &[Landmark], frame: &Frame) -> Option<CropTransform> {
    let (w, h) = (frame.width as f32, frame.height as f32);
    let visible = landmarks
        .iter()
        .filter(|lm| lm.visibility >= MIN_TRACKING_VISIBILITY)
        .map(|lm| lm.to_pixels(frame.width, frame.height));

    let (mut x1, mut y1, mut x2, mut y2) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    let mut count = 0;
    for (x, y) in visible {
        x1 = x1.min(x);
        y1 = y1.min(y);
        x2 = x2.max(x);
        y2 = y2.max(y);
        count += 1;
    }
    if count < 2 {
        return None;
    }

    let side = ((x2 - x1).max(y2 - y1) * ROI_SCALE).max(MIN_ROI_SIDE);
    if side >= w.max(h) {
        return None;
    }

    Some(CropTransform {
        center: ((x1 + x2) / 2.0, (y1 + y2) / 2.0),
        side,
        output_size: POSE_INPUT_SIZE,
        orig_w: frame.width,
        orig_h: frame.height,
    })
}
