//! In-memory RGB565 framebuffer.
//!
//! Stands in for the watch display when running on a desktop. It implements
//! embedded-graphics' `DrawTarget`, so the face renders into it exactly as it
//! would into a panel driver, and can dump itself as ASCII art for terminals.

use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    primitives::Rectangle,
};

/// Brightness ramp used by [`FrameBuffer::to_ascii`], darkest first.
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// RGB565 pixel buffer, row-major, top-left origin.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            let idx = self.index(x as u32, y as u32);
            self.pixels[idx] = color;
        }
    }

    /// Render as text, one character per `cell_w` x `cell_h` block.
    ///
    /// Each character reflects the mean brightness of its block.
    pub fn to_ascii(&self, cell_w: u32, cell_h: u32) -> String {
        let cell_w = cell_w.max(1);
        let cell_h = cell_h.max(1);
        let cols = self.width.div_ceil(cell_w);
        let rows = self.height.div_ceil(cell_h);
        let mut out = String::with_capacity(((cols + 1) * rows) as usize);

        for row in 0..rows {
            for col in 0..cols {
                let mut total = 0u32;
                let mut count = 0u32;
                for y in row * cell_h..((row + 1) * cell_h).min(self.height) {
                    for x in col * cell_w..((col + 1) * cell_w).min(self.width) {
                        total += luma(self.pixels[self.index(x, y)]);
                        count += 1;
                    }
                }
                let mean = total / count.max(1);
                let idx = (mean as usize * (ASCII_RAMP.len() - 1)) / 255;
                out.push(ASCII_RAMP[idx] as char);
            }
            out.push('\n');
        }

        out
    }
}

/// Perceived brightness in `0..=255`.
fn luma(color: Rgb565) -> u32 {
    let r = color.r() as u32 * 255 / Rgb565::MAX_R as u32;
    let g = color.g() as u32 * 255 / Rgb565::MAX_G as u32;
    let b = color.b() as u32 * 255 / Rgb565::MAX_B as u32;
    (r * 299 + g * 587 + b * 114) / 1000
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        for point in area.points() {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}
