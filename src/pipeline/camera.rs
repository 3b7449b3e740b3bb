//! Synchronous camera capture.
//!
//! The game loop reads one frame per iteration; there is no capture thread.

use anyhow::Result;

use crate::types::Frame;

pub trait FrameSource {
    /// Blocks until the next frame is available.
    fn next_frame(&mut self) -> Result<Frame>;
}

#[cfg(feature = "camera-nokhwa")]
mod native {
    use anyhow::{Context, Result, anyhow};
    use nokhwa::{
        Camera,
        pixel_format::RgbFormat,
        utils::{CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType},
    };

    use super::FrameSource;
    use crate::{pipeline::rgba_converter, types::Frame};

    // Packed formats first; some built-in cameras advertise YUYV and then refuse it.
    const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
        FrameFormat::RAWRGB,
        FrameFormat::RAWBGR,
        FrameFormat::GRAY,
        FrameFormat::YUYV,
        FrameFormat::NV12,
        FrameFormat::MJPEG,
    ];

    fn requested_formats() -> [RequestedFormat<'static>; 3] {
        [
            RequestedFormat::with_formats(
                RequestedFormatType::AbsoluteHighestFrameRate,
                PREFERRED_PIXEL_FORMATS,
            ),
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
        ]
    }

    pub struct CameraCapture {
        camera: Camera,
    }

    impl CameraCapture {
        pub fn open(index: u32) -> Result<Self> {
            let index = CameraIndex::Index(index);
            let mut last_err = None;

            for requested in requested_formats() {
                match Camera::new(index.clone(), requested) {
                    Ok(mut camera) => match camera.open_stream() {
                        Ok(()) => {
                            log::info!(
                                "camera {} opened: {:?}",
                                camera.info().human_name(),
                                camera.camera_format()
                            );
                            return Ok(Self { camera });
                        }
                        Err(err) => last_err = Some(err.into()),
                    },
                    Err(err) => last_err = Some(err.into()),
                }
            }

            Err(last_err
                .unwrap_or_else(|| anyhow!("failed to open camera with any supported format")))
        }
    }

    impl FrameSource for CameraCapture {
        fn next_frame(&mut self) -> Result<Frame> {
            let buffer = self.camera.frame().context("camera frame read failed")?;
            rgba_converter::frame_from_camera(&buffer)
        }
    }

    impl Drop for CameraCapture {
        fn drop(&mut self) {
            if let Err(err) = self.camera.stop_stream() {
                log::warn!("failed to stop camera stream: {err:?}");
            }
        }
    }
}

#[cfg(feature = "camera-nokhwa")]
pub fn open_camera(index: u32) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(native::CameraCapture::open(index)?))
}

#[cfg(not(feature = "camera-nokhwa"))]
pub fn open_camera(_index: u32) -> Result<Box<dyn FrameSource>> {
    Err(anyhow::anyhow!(
        "built without camera support (enable the `camera-nokhwa` feature)"
    ))
}
