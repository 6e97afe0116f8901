// ============================================================================
// COMPOSITE: render the preview (image + text) into a single raster
// ============================================================================

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::fonts::LoadedFont;
use crate::geometry::{ClampedPosition, FitMode, ViewportFit};
use crate::io::SourceImage;
use crate::style::TextStyle;
use crate::text::{RasterizedText, measure_text, rasterize_text};

/// Size of the text element for the given style; zero when no face loaded.
pub fn element_size(style: &TextStyle, font: Option<&LoadedFont>) -> (f32, f32) {
    match font {
        Some(f) => measure_text(&f.font, &style.text, style.font_size, f.synthetic_bold),
        None => (0.0, 0.0),
    }
}

/// Rasterize the overlay text at `scale` times the style's size.
pub fn rasterize_overlay(style: &TextStyle, font: &LoadedFont, scale: f32) -> RasterizedText {
    rasterize_text(
        &font.font,
        &style.text,
        style.font_size * scale,
        style.color,
        font.synthetic_bold,
    )
}

/// Composite the view exactly as previewed: the image at its fitted size
/// with the text at its clamped position. Without a font only the image is
/// rendered.
pub fn render_view(
    source: &SourceImage,
    fit: &ViewportFit,
    style: &TextStyle,
    position: ClampedPosition,
    font: Option<&LoadedFont>,
) -> RgbaImage {
    let (w, h) = fit.pixel_size();
    let mut canvas = if fit.fit_mode == FitMode::Natural && source.natural_size() == (w, h) {
        source.pixels.clone()
    } else {
        imageops::resize(&source.pixels, w, h, FilterType::Lanczos3)
    };

    if let Some(font) = font {
        let raster = rasterize_overlay(style, font, 1.0);
        blit_text(&mut canvas, &raster, position.x.round() as i64, position.y.round() as i64);
    }
    canvas
}

/// Composite at the source's natural resolution: text size and position are
/// scaled up from view space by the fit's inverse scale.
pub fn render_full_resolution(
    source: &SourceImage,
    fit: &ViewportFit,
    style: &TextStyle,
    position: ClampedPosition,
    font: Option<&LoadedFont>,
) -> RgbaImage {
    let (src_w, src_h) = source.natural_size();
    let (sx, sy) = fit.source_scale(src_w, src_h);
    let mut canvas = source.pixels.clone();

    if let Some(font) = font {
        let raster = rasterize_overlay(style, font, sx);
        let x = (position.x * sx).round() as i64;
        let y = (position.y * sy).round() as i64;
        blit_text(&mut canvas, &raster, x, y);
    }
    canvas
}

/// Source-over blend `text` into `canvas` with its top-left at `(x, y)`.
/// Parts outside the canvas are dropped.
pub fn blit_text(canvas: &mut RgbaImage, text: &RasterizedText, x: i64, y: i64) {
    if text.is_empty() {
        return;
    }
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);

    for ty in 0..text.height {
        let cy = y + ty as i64;
        if cy < 0 || cy >= ch {
            continue;
        }
        for tx in 0..text.width {
            let cx = x + tx as i64;
            if cx < 0 || cx >= cw {
                continue;
            }
            let top = text.pixel(tx, ty);
            if top[3] == 0 {
                continue;
            }
            let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
            *dst = blend_over(*dst, top);
        }
    }
}

fn blend_over(base: Rgba<u8>, top: [u8; 4]) -> Rgba<u8> {
    let ta = top[3] as f32 / 255.0;
    let ba = base[3] as f32 / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |t: u8, b: u8| {
        let v = (t as f32 * ta + b as f32 * ba * (1.0 - ta)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(top[0], base[0]),
        channel(top[1], base[1]),
        channel(top[2], base[2]),
        (out_a * 255.0).round() as u8,
    ])
}
