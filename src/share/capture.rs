//! Rasterize the pyramid into an RGBA image and encode it as PNG.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

use super::ShareError;
use crate::pyramid::PyramidState;

// Logical layout, multiplied by the capture scale
const PADDING: u32 = 20;
const BLOCK_WIDTH: u32 = 112;
const BLOCK_HEIGHT: u32 = 52;
const GAP: u32 = 8;
const BORDER: u32 = 2;
const GLYPH: u32 = 8;

const BLOCK_FILL: [u8; 3] = [0xf7, 0xf5, 0xe8];
const BLOCK_BORDER: [u8; 3] = [0x1b, 0x5e, 0x31];
const POSITION_TEXT: [u8; 3] = [0x2d, 0x8b, 0x4e];
const LABEL_TEXT: [u8; 3] = [0x1f, 0x1f, 0x1f];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub scale: u32,
    pub background: [u8; 3],
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2,
            background: [0x2d, 0x8b, 0x4e],
        }
    }
}

/// An RGBA8 raster of the pyramid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PyramidImage {
    fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            rgba.extend_from_slice(&[background[0], background[1], background[2], 0xff]);
        }
        Self { width, height, rgba }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2]])
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                let i = ((py * self.width + px) * 4) as usize;
                self.rgba[i..i + 3].copy_from_slice(&color);
            }
        }
    }

    /// Draw `text` with 8x8 glyphs, each glyph pixel `scale` pixels wide
    fn draw_text(&mut self, x: u32, y: u32, text: &str, scale: u32, color: [u8; 3]) {
        for (n, c) in text.chars().enumerate() {
            let glyph = glyph(c);
            let gx = x + n as u32 * GLYPH * scale;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8u32 {
                    if bits & (1 << col) != 0 {
                        self.fill_rect(
                            gx + col * scale,
                            y + row as u32 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ShareError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.rgba)?;
            writer.finish()?;
        }
        Ok(out)
    }
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Shorten `text` to at most `max` characters, marking the cut with `.`
fn fit(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    let mut out = kept.trim_end().to_string();
    out.push('.');
    out
}

/// Pixel size of the capture for `rows` rows at `scale`
pub fn dimensions(rows: u32, scale: u32) -> (u32, u32) {
    let rows = rows.max(1);
    let width = PADDING * 2 + rows * BLOCK_WIDTH + (rows - 1) * GAP;
    let height = PADDING * 2 + rows * BLOCK_HEIGHT + (rows - 1) * GAP;
    (width * scale, height * scale)
}

/// Top-left corner of the block at 1-based `row`, 0-based `column`,
/// in logical units
fn block_origin(rows: u32, row: u32, column: u32) -> (u32, u32) {
    let full_row = rows * BLOCK_WIDTH + (rows - 1) * GAP;
    let this_row = row * BLOCK_WIDTH + (row - 1) * GAP;
    let x = PADDING + (full_row - this_row) / 2 + column * (BLOCK_WIDTH + GAP);
    let y = PADDING + (row - 1) * (BLOCK_HEIGHT + GAP);
    (x, y)
}

pub fn render(state: &PyramidState, options: &CaptureOptions) -> PyramidImage {
    let scale = options.scale.max(1);
    let rows = state.row_count.max(1) as u32;
    let (width, height) = dimensions(rows, scale);
    let mut image = PyramidImage::new(width, height, options.background);

    let max_chars = ((BLOCK_WIDTH - 4 * BORDER) / GLYPH) as usize;

    for (row_index, positions) in state.rows().enumerate() {
        let row = row_index as u32 + 1;
        for (column, position) in positions.enumerate() {
            let (x, y) = block_origin(rows, row, column as u32);
            let (x, y) = (x * scale, y * scale);

            image.fill_rect(x, y, BLOCK_WIDTH * scale, BLOCK_HEIGHT * scale, BLOCK_BORDER);
            image.fill_rect(
                x + BORDER * scale,
                y + BORDER * scale,
                (BLOCK_WIDTH - 2 * BORDER) * scale,
                (BLOCK_HEIGHT - 2 * BORDER) * scale,
                BLOCK_FILL,
            );

            let number = position.to_string();
            image.draw_text(
                x + 3 * BORDER * scale,
                y + 3 * BORDER * scale,
                &number,
                scale,
                POSITION_TEXT,
            );

            let label = fit(state.label(position).unwrap_or_default(), max_chars);
            let label_width = label.chars().count() as u32 * GLYPH;
            let label_x = x + (BLOCK_WIDTH.saturating_sub(label_width) / 2) * scale;
            let label_y = y + (BLOCK_HEIGHT - GLYPH - 4 * BORDER) * scale;
            image.draw_text(label_x, label_y, &label, scale, LABEL_TEXT);
        }
    }

    image
}
