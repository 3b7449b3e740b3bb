use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use ndarray::Array4;
use rayon::prelude::*;

use crate::types::Frame;

pub const POSE_INPUT_SIZE: u32 = 256;

/// Square region of the frame fed to the landmark model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropTransform {
    pub center: (f32, f32),
    pub side: f32,
    pub output_size: u32,
    pub orig_w: u32,
    pub orig_h: u32,
}

impl CropTransform {
    /// Square covering the whole frame, letterboxed on the short axis.
    pub fn full_frame(frame: &Frame, output_size: u32) -> Self {
        Self {
            center: (frame.width as f32 / 2.0, frame.height as f32 / 2.0),
            side: frame.width.max(frame.height) as f32,
            output_size,
            orig_w: frame.width,
            orig_h: frame.height,
        }
    }

    /// Model input pixel to frame pixel.
    pub fn project(&self, x: f32, y: f32) -> (f32, f32) {
        let half = self.output_size as f32 / 2.0;
        let scale = self.side / self.output_size as f32;
        (
            self.center.0 + (x - half) * scale,
            self.center.1 + (y - half) * scale,
        )
    }
}

pub fn mirror_horizontal(frame: &mut Frame) {
    let stride = frame.width as usize * 4;
    if stride == 0 {
        return;
    }
    frame.rgba.par_chunks_exact_mut(stride).for_each(|row| {
        let pixels = row.len() / 4;
        for i in 0..pixels / 2 {
            let j = pixels - 1 - i;
            for c in 0..4 {
                row.swap(i * 4 + c, j * 4 + c);
            }
        }
    });
}

pub fn resize(frame: &Frame, width: u32, height: u32) -> Result<Frame> {
    if frame.width == width && frame.height == height {
        return Ok(frame.clone());
    }
    check_len(frame)?;

    let src_image = fir::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.rgba.clone(),
        fir::PixelType::U8x4,
    )?;
    let mut dst_image = fir::images::Image::new(width, height, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&resize_options))
        .context("fast resize failed")?;

    Ok(Frame {
        rgba: dst_image.into_vec(),
        width,
        height,
    })
}

/// Drops `margin` columns from both sides.
pub fn crop_side_margins(frame: &Frame, margin: u32) -> Result<Frame> {
    check_len(frame)?;
    if margin.saturating_mul(2) >= frame.width {
        return Err(anyhow!(
            "margin {margin} leaves nothing of a {} px wide frame",
            frame.width
        ));
    }

    let width = frame.width - 2 * margin;
    let src_stride = frame.width as usize * 4;
    let dst_stride = width as usize * 4;
    let offset = margin as usize * 4;

    let mut rgba = Vec::with_capacity(dst_stride * frame.height as usize);
    for row in frame.rgba.chunks_exact(src_stride) {
        rgba.extend_from_slice(&row[offset..offset + dst_stride]);
    }

    Ok(Frame {
        rgba,
        width,
        height: frame.height,
    })
}

/// Samples the crop region into an NHWC tensor with channels in 0..1.
pub fn prepare_crop(frame: &Frame, transform: &CropTransform) -> Result<Array4<f32>> {
    check_len(frame)?;

    let size = transform.output_size as usize;
    let data: Vec<f32> = (0..size * size)
        .into_par_iter()
        .flat_map_iter(|idx| {
            let (x, y) = ((idx % size) as f32 + 0.5, (idx / size) as f32 + 0.5);
            let (src_x, src_y) = transform.project(x, y);
            sample_rgb(frame, src_x - 0.5, src_y - 0.5)
        })
        .collect();

    Array4::<f32>::from_shape_vec((1, size, size, 3), data)
        .map_err(|err| anyhow!("failed to build pose input tensor: {err}"))
}

fn check_len(frame: &Frame) -> Result<()> {
    let expected_len = Frame::expected_len(frame.width, frame.height);
    if frame.rgba.len() != expected_len {
        return Err(anyhow!(
            "frame buffer size mismatch: got {}, expected {}",
            frame.rgba.len(),
            expected_len
        ));
    }
    Ok(())
}

fn sample_rgb(frame: &Frame, x: f32, y: f32) -> [f32; 3] {
    if x.is_nan() || y.is_nan() {
        return [0.0, 0.0, 0.0];
    }
    let x0 = x.floor();
    let y0 = y.floor();

    let (w, h) = (frame.width as i32, frame.height as i32);
    let fetch = |cx: f32, cy: f32| -> [f32; 3] {
        let (ix, iy) = (cx as i32, cy as i32);
        if ix < 0 || iy < 0 || ix >= w || iy >= h {
            return [0.0, 0.0, 0.0];
        }
        let idx = ((iy as u32 * frame.width + ix as u32) as usize) * 4;
        [
            frame.rgba[idx] as f32 / 255.0,
            frame.rgba[idx + 1] as f32 / 255.0,
            frame.rgba[idx + 2] as f32 / 255.0,
        ]
    };

    let fx = x - x0;
    let fy = y - y0;
    let c00 = fetch(x0, y0);
    let c10 = fetch(x0 + 1.0, y0);
    let c01 = fetch(x0, y0 + 1.0);
    let c11 = fetch(x0 + 1.0, y0 + 1.0);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    std::array::from_fn(|c| lerp(lerp(c00[c], c10[c], fx), lerp(c01[c], c11[c], fx), fy))
}
