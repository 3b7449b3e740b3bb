use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    config::{CAMERA_WINDOW_HEIGHT, CAMERA_WINDOW_MARGIN, CAMERA_WINDOW_WIDTH},
    control::ControlSignal,
    error::GameError,
    types::Frame,
};

use super::{
    camera::FrameSource,
    pose::{PoseDetector, PoseEngine},
    preprocess, skeleton,
};

/// One loop iteration's worth of pose input.
#[derive(Debug)]
pub struct ControlFrame {
    pub signal: f32,
    pub preview: Frame,
}

pub struct PoseSource<E: PoseEngine> {
    camera: Box<dyn FrameSource>,
    detector: PoseDetector<E>,
    signal: ControlSignal,
    crop_margins: bool,
}

impl<E: PoseEngine> PoseSource<E> {
    pub fn new(camera: Box<dyn FrameSource>, engine: E, crop_margins: bool) -> Self {
        Self {
            camera,
            detector: PoseDetector::new(engine),
            signal: ControlSignal::default(),
            crop_margins,
        }
    }

    pub fn next_control_signal(&mut self) -> Result<ControlFrame, GameError> {
        let raw = self
            .camera
            .next_frame()
            .map_err(|err| GameError::EndOfStream(format!("{err:#}")))?;
        let mut frame = self
            .prepare(raw)
            .map_err(|err| GameError::EndOfStream(format!("{err:#}")))?;

        let pose = match self.detector.detect_for_video(&frame, epoch_millis()) {
            Ok(pose) => pose,
            Err(err) => {
                log::warn!("pose inference failed: {err:?}");
                None
            }
        };

        let signal = self.signal.observe(pose.as_ref(), frame.height);
        skeleton::draw_overlay(&mut frame, pose.as_ref());

        Ok(ControlFrame {
            signal,
            preview: frame,
        })
    }

    fn prepare(&self, mut frame: Frame) -> anyhow::Result<Frame> {
        preprocess::mirror_horizontal(&mut frame);
        let frame = preprocess::resize(&frame, CAMERA_WINDOW_WIDTH, CAMERA_WINDOW_HEIGHT)?;
        if self.crop_margins {
            preprocess::crop_side_margins(&frame, CAMERA_WINDOW_MARGIN)
        } else {
            Ok(frame)
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
