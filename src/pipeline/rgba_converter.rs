use std::convert::TryFrom;

use anyhow::{Result, anyhow};
use rayon::prelude::*;
use yuv::{
    YuvBiPlanarImage, YuvConversionMode, YuvPackedImage, YuvRange, YuvStandardMatrix,
    yuv_nv12_to_rgba, yuyv422_to_rgba,
};
use zune_jpeg::{
    JpegDecoder,
    zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions},
};

use crate::types::Frame;

/// Byte layout of an uncompressed camera buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackedLayout {
    Rgb,
    Bgr,
    Gray,
}

impl PackedLayout {
    fn bytes_per_pixel(self) -> usize {
        match self {
            PackedLayout::Rgb | PackedLayout::Bgr => 3,
            PackedLayout::Gray => 1,
        }
    }
}

#[cfg(feature = "camera-nokhwa")]
pub fn frame_from_camera(buffer: &nokhwa::Buffer) -> Result<Frame> {
    use nokhwa::utils::FrameFormat;

    let resolution = buffer.resolution();
    let (width, height) = (resolution.width_x, resolution.height_y);
    let data = buffer.buffer();

    let rgba = match buffer.source_frame_format() {
        FrameFormat::NV12 => nv12_to_rgba(data, width, height)?,
        FrameFormat::YUYV => yuyv_to_rgba(data, width, height)?,
        FrameFormat::MJPEG => mjpeg_to_rgba(data, width, height)?,
        FrameFormat::RAWRGB => packed_to_rgba(data, width, height, PackedLayout::Rgb)?,
        FrameFormat::RAWBGR => packed_to_rgba(data, width, height, PackedLayout::Bgr)?,
        FrameFormat::GRAY => packed_to_rgba(data, width, height, PackedLayout::Gray)?,
    };

    Ok(Frame::new(rgba, width, height))
}

fn nv12_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let y_plane_len = width as usize * height as usize;
    let uv_plane_len = y_plane_len / 2;
    ensure_len("NV12", data, y_plane_len + uv_plane_len)?;

    let image = YuvBiPlanarImage {
        y_plane: &data[..y_plane_len],
        y_stride: width,
        uv_plane: &data[y_plane_len..y_plane_len + uv_plane_len],
        uv_stride: width,
        width,
        height,
    };

    let mut rgba = vec![0u8; Frame::expected_len(width, height)];
    yuv_nv12_to_rgba(
        &image,
        &mut rgba,
        width * 4,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
        YuvConversionMode::Balanced,
    )
    .map_err(|err| anyhow!("NV12 to RGBA failed: {err:?}"))?;

    Ok(rgba)
}

fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    ensure_len("YUYV", data, width as usize * height as usize * 2)?;

    let packed = YuvPackedImage {
        yuy: data,
        yuy_stride: width * 2,
        width,
        height,
    };

    let mut rgba = vec![0u8; Frame::expected_len(width, height)];
    yuyv422_to_rgba(
        &packed,
        &mut rgba,
        width * 4,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
    )
    .map_err(|err| anyhow!("YUYV422 to RGBA failed: {err:?}"))?;

    Ok(rgba)
}

fn mjpeg_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::RGBA);
    let mut decoder = JpegDecoder::new_with_options(ZCursor::new(data), options);
    let rgba = decoder
        .decode()
        .map_err(|err| anyhow!("MJPEG decode failed: {err:?}"))?;

    let expected = usize::try_from(width)
        .and_then(|w| usize::try_from(height).map(|h| w * h * 4))
        .map_err(|_| anyhow!("MJPEG dimensions do not fit usize"))?;
    ensure_len("MJPEG", &rgba, expected)?;

    Ok(rgba)
}

pub fn packed_to_rgba(data: &[u8], width: u32, height: u32, layout: PackedLayout) -> Result<Vec<u8>> {
    let pixels = width as usize * height as usize;
    let bpp = layout.bytes_per_pixel();
    ensure_len("packed", data, pixels * bpp)?;

    let mut rgba = vec![0u8; pixels * 4];
    rgba.par_chunks_mut(4)
        .zip(data.par_chunks_exact(bpp))
        .for_each(|(dst, src)| {
            let (r, g, b) = match layout {
                PackedLayout::Rgb => (src[0], src[1], src[2]),
                PackedLayout::Bgr => (src[2], src[1], src[0]),
                PackedLayout::Gray => (src[0], src[0], src[0]),
            };
            dst.copy_from_slice(&[r, g, b, 255]);
        });

    Ok(rgba)
}

fn ensure_len(label: &str, data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(anyhow!(
            "{label} buffer too small: got {}, expected {expected}",
            data.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgr_swaps_red_and_blue() {
        let bgr = [10u8, 20, 30, 40, 50, 60];
        let rgba = packed_to_rgba(&bgr, 2, 1, PackedLayout::Bgr).unwrap();
        assert_eq!(rgba, vec![30, 20, 10, 255, 60, 50, 40, 255]);
    }

    #[test]
    fn gray_expands_to_opaque_rgba() {
        let rgba = packed_to_rgba(&[7, 200], 1, 2, PackedLayout::Gray).unwrap();
        assert_eq!(rgba, vec![7, 7, 7, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = packed_to_rgba(&[1, 2, 3], 2, 1, PackedLayout::Rgb).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }
}
