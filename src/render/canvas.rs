use crate::{game::Rect, types::Frame};

use super::font::{GLYPH_ADVANCE, GLYPH_H, GLYPH_W, glyph};

/// 0RGB framebuffer in the layout `minifb` presents.
pub struct Canvas {
    width: usize,
    height: usize,
    buf: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buf: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buf
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    /// Fills the part of `rect` that lies on the canvas.
    pub fn fill_rect(&mut self, rect: &Rect, color: u32) {
        let x0 = rect.x.clamp(0, self.width as i32) as usize;
        let x1 = rect.right().clamp(0, self.width as i32) as usize;
        let y0 = rect.y.clamp(0, self.height as i32) as usize;
        let y1 = rect.bottom().clamp(0, self.height as i32) as usize;
        if x0 >= x1 {
            return;
        }
        for row in y0..y1 {
            let start = row * self.width;
            self.buf[start + x0..start + x1].fill(color);
        }
    }

    pub fn text_width(text: &str, scale: usize) -> usize {
        let chars = text.chars().count();
        if chars == 0 {
            return 0;
        }
        (chars * GLYPH_ADVANCE - 1) * scale
    }

    pub fn text_height(scale: usize) -> usize {
        GLYPH_H * scale
    }

    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: usize, color: u32) {
        let scale = scale.max(1) as i32;
        let mut cx = x;
        for ch in text.chars() {
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                        continue;
                    }
                    let px = Rect::new(
                        cx + col as i32 * scale,
                        y + row as i32 * scale,
                        scale,
                        scale,
                    );
                    self.fill_rect(&px, color);
                }
            }
            cx += GLYPH_ADVANCE as i32 * scale;
        }
    }

    /// Copies an RGBA frame to the top-left corner, dropping alpha.
    pub fn blit_rgba(&mut self, frame: &Frame) {
        let w = (frame.width as usize).min(self.width);
        let h = (frame.height as usize).min(self.height);
        let stride = frame.width as usize * 4;
        for row in 0..h {
            let src = &frame.rgba[row * stride..row * stride + w * 4];
            let dst = &mut self.buf[row * self.width..row * self.width + w];
            for (px, rgba) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *px = u32::from(rgba[0]) << 16 | u32::from(rgba[1]) << 8 | u32::from(rgba[2]);
            }
        }
    }
}
