pub mod camera;
pub mod pose;
pub mod pose_source;
pub mod preprocess;
#[cfg(feature = "camera-nokhwa")]
pub mod rgba_converter;
pub mod skeleton;

// Re-exports for convenience
pub use camera::open_camera;
pub use pose::{OrtPoseEngine, PoseEngine};
pub use pose_source::PoseSource;
