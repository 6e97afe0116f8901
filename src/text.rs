use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};

/// Glyphs of one line positioned relative to the line's left edge, with
/// `y` on the baseline. Returns `(glyphs, advance_width)`.
pub fn layout_line(font: &FontArc, line: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(font_size);
    let mut glyphs = Vec::with_capacity(line.len());
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in line.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    (glyphs, cursor_x)
}

/// Size of the text element's box: widest line by `lines * line_height`.
/// Synthetic bold widens the box by the one-pixel smear.
pub fn measure_text(font: &FontArc, text: &str, font_size: f32, synthetic_bold: bool) -> (f32, f32) {
    let line_height = font.as_scaled(font_size).height();
    let mut width = 0.0f32;
    let mut lines = 0;
    for line in text.split('\n') {
        width = width.max(layout_line(font, line, font_size).1);
        lines += 1;
    }
    if synthetic_bold && width > 0.0 {
        width += 1.0;
    }
    (width, line_height * lines as f32)
}

/// Tinted RGBA raster of the text element. Pixel (0,0) is the top-left of
/// the element's box, so it can be placed directly at a drop position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterizedText {
    pub buf: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterizedText {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Straight-alpha RGBA at `(x, y)`; callers stay in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.buf[i], self.buf[i + 1], self.buf[i + 2], self.buf[i + 3]]
    }
}

/// Rasterize `text` (lines split on `'\n'`) into an element-sized buffer.
///
/// Coverage is accumulated per pixel with `max`, then turned into `color`
/// with alpha scaled by coverage. `synthetic_bold` smears each glyph one
/// pixel to the right for faces without a real bold variant.
pub fn rasterize_text(
    font: &FontArc,
    text: &str,
    font_size: f32,
    color: [u8; 4],
    synthetic_bold: bool,
) -> RasterizedText {
    let (box_w, box_h) = measure_text(font, text, font_size, synthetic_bold);
    let width = box_w.ceil() as u32;
    let height = box_h.ceil() as u32;
    if width == 0 || height == 0 {
        return RasterizedText::default();
    }

    let scaled = font.as_scaled(font_size);
    let ascent = scaled.ascent();
    let line_height = scaled.height();
    let mut coverage = vec![0.0f32; width as usize * height as usize];

    for (line_idx, line) in text.split('\n').enumerate() {
        let baseline = line_idx as f32 * line_height + ascent;
        let (glyphs, _) = layout_line(font, line, font_size);

        for (glyph_id, gx) in glyphs {
            let glyph = glyph_id.with_scale_and_position(font_size, point(gx, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else { continue };
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, cov| {
                let ix = bounds.min.x as i32 + px as i32;
                let iy = bounds.min.y as i32 + py as i32;
                if iy < 0 || iy >= height as i32 {
                    return;
                }
                let row = iy as usize * width as usize;
                let mut plot = |x: i32| {
                    if x >= 0 && x < width as i32 {
                        let idx = row + x as usize;
                        coverage[idx] = coverage[idx].max(cov);
                    }
                };
                plot(ix);
                if synthetic_bold {
                    plot(ix + 1);
                }
            });
        }
    }

    let mut buf = vec![0u8; coverage.len() * 4];
    for (i, &cov) in coverage.iter().enumerate() {
        if cov > 0.001 {
            let idx = i * 4;
            buf[idx] = color[0];
            buf[idx + 1] = color[1];
            buf[idx + 2] = color[2];
            buf[idx + 3] = (color[3] as f32 * cov.min(1.0)).round() as u8;
        }
    }

    RasterizedText { buf, width, height }
}
