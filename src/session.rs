use std::path::Path;

use crate::error::Result;
use crate::geometry::{AvailableArea, Bounds, ClampedPosition, ViewportFit, clamp_drop, fit_image, reclamp};
use crate::io::{SourceImage, load_image};
use crate::style::{SessionFlags, TextStyle};

/// In-memory state of one editing session: the picked image, how it is
/// fitted, where the text sits and how it looks. Nothing here is persisted.
#[derive(Clone, Debug, Default)]
pub struct EditorSession {
    pub image: Option<SourceImage>,
    pub fit: ViewportFit,
    pub position: ClampedPosition,
    pub flags: SessionFlags,
    pub style: TextStyle,
    /// Size of the text element as last measured, kept so the position can
    /// be re-clamped when the view or the text changes size.
    pub element_size: (f32, f32),
}

impl EditorSession {
    pub fn new(style: TextStyle) -> Self {
        Self { style, ..Default::default() }
    }

    /// Decode `path` and fit it into `area`. On failure the error is logged
    /// and the session is left exactly as it was.
    pub fn open_image(&mut self, path: &Path, area: Option<AvailableArea>) -> Result<()> {
        match load_image(path) {
            Ok(image) => {
                crate::log_info!(
                    "opened {} ({}x{})",
                    path.display(),
                    image.pixels.width(),
                    image.pixels.height()
                );
                self.set_image(image, area);
                Ok(())
            }
            Err(e) => {
                crate::log_err!("could not open {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Install an already-decoded image.
    pub fn set_image(&mut self, image: SourceImage, area: Option<AvailableArea>) {
        self.image = Some(image);
        self.flags.selected = true;
        self.relayout(area);
    }

    /// Recompute the fit for a new display area. Without an area (e.g. a
    /// collapsed window) the image is shown at natural size.
    pub fn relayout(&mut self, area: Option<AvailableArea>) {
        let Some(image) = &self.image else { return };
        let (w, h) = image.natural_size();
        self.fit = match area {
            Some(area) => fit_image(w, h, area),
            None => ViewportFit {
                render_width: w as f32,
                render_height: h as f32,
                fit_mode: crate::geometry::FitMode::Natural,
            },
        };
        self.clamp_position();
    }

    pub fn begin_drag(&mut self) {
        self.flags.dragging = true;
    }

    /// Finish a drag: place the element centred under `pointer`, kept inside
    /// `container`. Both are in the same absolute coordinate space.
    pub fn end_drag(&mut self, pointer: (f32, f32), element: Bounds, container: Bounds) {
        self.flags.dragging = false;
        self.element_size = (element.width, element.height);
        self.position = clamp_drop(pointer, element, container);
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
        self.clamp_position();
    }

    /// Record the element's measured size, e.g. after the text was
    /// re-rasterized, and keep the position inside the view.
    pub fn set_element_size(&mut self, width: f32, height: f32) {
        self.element_size = (width, height);
        self.clamp_position();
    }

    fn clamp_position(&mut self) {
        if self.image.is_none() {
            return;
        }
        let (w, h) = self.element_size;
        self.position = reclamp(self.position, w, h, self.fit.render_width, self.fit.render_height);
    }

    /// Start over: drop the image, flags, position and fit. The text style
    /// survives.
    pub fn reset(&mut self) {
        *self = Self::new(self.style.clone());
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FitMode;
    use image::RgbaImage;

    fn image(w: u32, h: u32) -> SourceImage {
        SourceImage::from_pixels(RgbaImage::new(w, h), "test.png")
    }

    #[test]
    fn set_image_selects_and_fits() {
        let mut session = EditorSession::default();
        session.set_image(image(800, 600), AvailableArea::new(400.0, 400.0));
        assert!(session.flags.selected);
        assert_eq!(session.fit.fit_mode, FitMode::Contain);
        assert_eq!(session.fit.render_width, 400.0);
        assert_eq!(session.fit.render_height, 300.0);
    }

    #[test]
    fn relayout_replaces_fit() {
        let mut session = EditorSession::default();
        session.set_image(image(800, 600), AvailableArea::new(400.0, 400.0));
        session.relayout(AvailableArea::new(1000.0, 1000.0));
        assert_eq!(session.fit.fit_mode, FitMode::Natural);
        assert_eq!(session.fit.render_width, 800.0);
    }

    #[test]
    fn missing_area_shows_natural_size() {
        let mut session = EditorSession::default();
        session.set_image(image(30, 20), None);
        assert_eq!(session.fit.fit_mode, FitMode::Natural);
        assert_eq!((session.fit.render_width, session.fit.render_height), (30.0, 20.0));
    }

    #[test]
    fn failed_open_keeps_previous_state() {
        let mut session = EditorSession::default();
        session.set_image(image(10, 10), None);
        session.position = ClampedPosition { x: 3.0, y: 4.0 };
        assert!(session.open_image(Path::new("/no/such/file.png"), None).is_err());
        assert!(session.flags.selected);
        assert_eq!(session.image.as_ref().map(|i| i.natural_size()), Some((10, 10)));
        assert_eq!(session.position, ClampedPosition { x: 3.0, y: 4.0 });
    }

    #[test]
    fn drag_toggles_flag_and_clamps() {
        let mut session = EditorSession::default();
        session.begin_drag();
        assert!(session.flags.dragging);
        session.end_drag(
            (295.0, 195.0),
            Bounds::new(0.0, 0.0, 40.0, 20.0),
            Bounds::new(0.0, 0.0, 300.0, 200.0),
        );
        assert!(!session.flags.dragging);
        assert_eq!(session.position, ClampedPosition { x: 260.0, y: 180.0 });
    }

    #[test]
    fn shrinking_view_pulls_text_back_inside() {
        let mut session = EditorSession::default();
        session.set_image(image(800, 600), AvailableArea::new(1000.0, 1000.0));
        session.end_drag(
            (790.0, 590.0),
            Bounds::new(0.0, 0.0, 40.0, 20.0),
            Bounds::new(0.0, 0.0, 800.0, 600.0),
        );
        assert_eq!(session.position, ClampedPosition { x: 760.0, y: 580.0 });

        session.relayout(AvailableArea::new(400.0, 400.0));
        assert_eq!((session.fit.render_width, session.fit.render_height), (400.0, 300.0));
        assert_eq!(session.position, ClampedPosition { x: 360.0, y: 280.0 });
    }

    #[test]
    fn growing_text_is_kept_inside() {
        let mut session = EditorSession::default();
        session.set_image(image(300, 200), None);
        session.end_drag(
            (295.0, 195.0),
            Bounds::new(0.0, 0.0, 40.0, 20.0),
            Bounds::new(0.0, 0.0, 300.0, 200.0),
        );
        session.set_element_size(100.0, 30.0);
        assert_eq!(session.position, ClampedPosition { x: 200.0, y: 170.0 });
    }

    #[test]
    fn reset_keeps_style_only() {
        let mut session = EditorSession::new(TextStyle::default().with_text("Keep me"));
        session.set_image(image(10, 10), None);
        session.begin_drag();
        session.position = ClampedPosition { x: 5.0, y: 5.0 };
        session.reset();
        assert!(!session.has_image());
        assert_eq!(session.flags, SessionFlags::default());
        assert_eq!(session.position, ClampedPosition::default());
        assert_eq!(session.fit, ViewportFit::default());
        assert_eq!(session.style.text, "Keep me");
    }
}
