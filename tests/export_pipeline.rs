use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use iwt::compose::{blit_text, rasterize_overlay, render_full_resolution, render_view};
use iwt::fonts::bundled_font;
use iwt::geometry::{AvailableArea, Bounds, FitMode};
use iwt::io::{SaveFormat, encode_and_write, load_image};
use iwt::text::RasterizedText;
use iwt::{ClampedPosition, EditorSession, FontWeight, IwtError, TextStyle};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("iwt-test-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_gradient(path: &std::path::Path, w: u32, h: u32) {
    let img = RgbaImage::from_fn(w, h, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]));
    img.save(path).unwrap();
}

#[test]
fn upload_fit_and_export_as_png() {
    let dir = scratch_dir("png");
    let input = dir.join("photo.png");
    write_gradient(&input, 800, 600);

    let mut session = EditorSession::new(TextStyle::default());
    session.open_image(&input, AvailableArea::new(400.0, 400.0)).unwrap();
    assert_eq!(session.fit.fit_mode, FitMode::Contain);

    let image = session.image.as_ref().unwrap();
    let view = render_view(image, &session.fit, &session.style, session.position, None);
    assert_eq!(view.dimensions(), (400, 300));

    let output = dir.join("iwt-image.png");
    encode_and_write(&view, &output, SaveFormat::Png, 90).unwrap();
    let decoded = image::open(&output).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (400, 300));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn every_format_writes_a_decodable_image() {
    let dir = scratch_dir("formats");
    let img = RgbaImage::from_pixel(16, 8, Rgba([10, 200, 30, 255]));
    for format in SaveFormat::all() {
        let path = dir.join(format!("out.{}", format.extension()));
        encode_and_write(&img, &path, *format, 85).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back.natural_size(), (16, 8), "{:?}", format);
    }
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn undecodable_upload_leaves_session_untouched() {
    let dir = scratch_dir("garbage");
    let bogus = dir.join("not-an-image.png");
    std::fs::write(&bogus, b"definitely not a png").unwrap();

    let mut session = EditorSession::default();
    let err = session.open_image(&bogus, AvailableArea::new(100.0, 100.0)).unwrap_err();
    assert!(matches!(err, IwtError::Image(_)));
    assert!(!session.flags.selected);
    assert!(!session.has_image());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn dropped_text_lands_where_clamped() {
    let dir = scratch_dir("drop");
    let input = dir.join("white.png");
    RgbaImage::from_pixel(300, 200, Rgba([255, 255, 255, 255])).save(&input).unwrap();

    let mut session = EditorSession::default();
    session.open_image(&input, AvailableArea::new(1000.0, 1000.0)).unwrap();
    session.begin_drag();
    session.end_drag(
        (295.0, 195.0),
        Bounds::new(0.0, 0.0, 40.0, 20.0),
        Bounds::new(0.0, 0.0, 300.0, 200.0),
    );
    assert_eq!(session.position, ClampedPosition { x: 260.0, y: 180.0 });

    let mut view = render_view(session.image.as_ref().unwrap(), &session.fit, &session.style, session.position, None);
    let text = RasterizedText {
        buf: [255u8, 0, 0, 255].repeat(40 * 20),
        width: 40,
        height: 20,
    };
    blit_text(&mut view, &text, session.position.x as i64, session.position.y as i64);

    assert_eq!(*view.get_pixel(260, 180), Rgba([255, 0, 0, 255]));
    assert_eq!(*view.get_pixel(299, 199), Rgba([255, 0, 0, 255]));
    assert_eq!(*view.get_pixel(259, 180), Rgba([255, 255, 255, 255]));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn export_draws_the_previewed_raster_at_the_clamped_spot() {
    let dir = scratch_dir("same-raster");
    let input = dir.join("white.png");
    RgbaImage::from_pixel(300, 200, Rgba([255, 255, 255, 255])).save(&input).unwrap();

    let font = bundled_font(FontWeight::Bold).unwrap();
    let style = TextStyle::default().with_text("Hi").with_font_size(24.0).with_color([200, 0, 0, 255]);
    let mut session = EditorSession::new(style);
    session.open_image(&input, None).unwrap();

    // The preview texture is this raster; its size is the draggable box.
    let raster = rasterize_overlay(&session.style, &font, 1.0);
    assert!(!raster.is_empty());
    let (w, h) = (raster.width as f32, raster.height as f32);
    session.set_element_size(w, h);
    session.end_drag((299.0, 199.0), Bounds::new(0.0, 0.0, w, h), Bounds::new(0.0, 0.0, 300.0, 200.0));
    assert_eq!(session.position, ClampedPosition { x: 300.0 - w, y: 200.0 - h });

    let view = render_view(session.image.as_ref().unwrap(), &session.fit, &session.style, session.position, Some(&font));

    let mut expected = RgbaImage::from_pixel(300, 200, Rgba([255, 255, 255, 255]));
    blit_text(&mut expected, &raster, (300.0 - w) as i64, (200.0 - h) as i64);
    assert_eq!(view, expected);
    assert!(view.pixels().any(|p| *p != Rgba([255, 255, 255, 255])));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn full_resolution_export_keeps_source_size() {
    let dir = scratch_dir("fullres");
    let input = dir.join("big.png");
    write_gradient(&input, 640, 480);

    let mut session = EditorSession::default();
    session.open_image(&input, AvailableArea::new(320.0, 320.0)).unwrap();
    let out = render_full_resolution(
        session.image.as_ref().unwrap(),
        &session.fit,
        &session.style,
        session.position,
        None,
    );
    assert_eq!(out.dimensions(), (640, 480));

    let _ = std::fs::remove_dir_all(dir);
}
