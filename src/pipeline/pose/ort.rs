use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ndarray::Array4;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{PoseEngine, RawPose, decode_landmarks};

/// Pose landmark model run through ONNX Runtime.
pub struct OrtPoseEngine {
    session: Session,
}

impl OrtPoseEngine {
    pub fn new(model_path: &Path) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load ORT session from {}", model_path.display()))?;

        log::info!("pose landmark model ready: {}", model_path.display());
        Ok(Self { session })
    }
}

impl PoseEngine for OrtPoseEngine {
    fn infer(&mut self, input: Array4<f32>) -> Result<RawPose> {
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run pose landmark session")?;

        if outputs.len() < 2 {
            return Err(anyhow!(
                "pose model returned {} outputs, expected at least 2",
                outputs.len()
            ));
        }

        let coords = outputs[0].try_extract_array::<f32>()?;
        let flattened: Vec<f32> = coords.iter().copied().collect();
        let landmarks = decode_landmarks(&flattened)?;

        let confidence = outputs[1]
            .try_extract_array::<f32>()
            .ok()
            .and_then(|arr| arr.iter().next().copied())
            .unwrap_or(0.0);

        Ok(RawPose {
            landmarks,
            confidence,
        })
    }
}
