// ============================================================================
// VIEW GEOMETRY: image fit-to-area and text drop clamping
// ============================================================================

/// How the rendered image relates to its natural size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Shown at natural pixel size.
    #[default]
    Natural,
    /// Uniformly scaled down to fit (letterboxed).
    Contain,
}

/// Size at which the source image is rendered in the preview.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ViewportFit {
    pub render_width: f32,
    pub render_height: f32,
    pub fit_mode: FitMode,
}

impl ViewportFit {
    /// Render size rounded to whole pixels, never below 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.render_width.round() as u32).max(1),
            (self.render_height.round() as u32).max(1),
        )
    }

    /// Ratio from render space back to the source's natural pixels.
    pub fn source_scale(&self, source_w: u32, source_h: u32) -> (f32, f32) {
        if self.render_width <= 0.0 || self.render_height <= 0.0 {
            return (1.0, 1.0);
        }
        (
            source_w as f32 / self.render_width,
            source_h as f32 / self.render_height,
        )
    }
}

/// Display area the image has to fit into. Only constructible from finite,
/// positive sizes so `compute_fit` never sees degenerate input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvailableArea {
    width: f32,
    height: f32,
}

impl AvailableArea {
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        (ok(width) && ok(height)).then_some(Self { width, height })
    }

    /// Window size minus the fixed chrome margins around the preview.
    pub fn from_window(window_w: f32, window_h: f32, margin_x: f32, margin_y: f32) -> Option<Self> {
        Self::new(window_w - margin_x, window_h - margin_y)
    }

    pub fn width(&self) -> f32 { self.width }

    pub fn height(&self) -> f32 { self.height }
}

/// Fit a source image into the available area.
///
/// Sources that already fit are returned unchanged in `Natural` mode. Anything
/// larger is scaled by the smaller of the two axis ratios so both dimensions
/// fit at once, preserving the aspect ratio (`Contain`).
///
/// All inputs must be finite and positive; use [`AvailableArea`] to reject
/// bad sizes before calling.
pub fn compute_fit(
    source_width: f32,
    source_height: f32,
    available_width: f32,
    available_height: f32,
) -> ViewportFit {
    if source_width <= available_width && source_height <= available_height {
        return ViewportFit {
            render_width: source_width,
            render_height: source_height,
            fit_mode: FitMode::Natural,
        };
    }

    let width_ratio = available_width / source_width;
    let height_ratio = available_height / source_height;

    // The limiting axis takes the available size exactly; the product can
    // round one step past it.
    let (render_width, render_height) = if width_ratio <= height_ratio {
        (available_width, (source_height * width_ratio).min(available_height))
    } else {
        ((source_width * height_ratio).min(available_width), available_height)
    };

    ViewportFit {
        render_width,
        render_height,
        fit_mode: FitMode::Contain,
    }
}

/// Convenience over [`compute_fit`] for integer image sizes.
pub fn fit_image(source_w: u32, source_h: u32, area: AvailableArea) -> ViewportFit {
    compute_fit(source_w as f32, source_h as f32, area.width, area.height)
}

/// Container-relative offset of the dragged text element.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ClampedPosition {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned box in absolute (screen) coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Place an element dropped at an absolute pointer position.
///
/// The element is centred under the pointer, converted to container-relative
/// coordinates, then clamped per axis to `[0, container - element]`. When the
/// element is larger than the container on an axis it is pinned to 0 there
/// and allowed to overflow.
pub fn compute_clamped_position(
    pointer_x: f32,
    pointer_y: f32,
    element_width: f32,
    element_height: f32,
    container_origin_x: f32,
    container_origin_y: f32,
    container_width: f32,
    container_height: f32,
) -> ClampedPosition {
    let x = pointer_x - container_origin_x - element_width / 2.0;
    let y = pointer_y - container_origin_y - element_height / 2.0;

    ClampedPosition {
        x: clamp_axis(x, container_width - element_width),
        y: clamp_axis(y, container_height - element_height),
    }
}

/// [`compute_clamped_position`] with the element and container as boxes.
/// Only the element's size matters; its current position is ignored.
pub fn clamp_drop(pointer: (f32, f32), element: Bounds, container: Bounds) -> ClampedPosition {
    compute_clamped_position(
        pointer.0,
        pointer.1,
        element.width,
        element.height,
        container.x,
        container.y,
        container.width,
        container.height,
    )
}

/// Re-apply the per-axis clamp to an existing position after the element or
/// the container changed size. Container-relative, so no origin is involved.
pub fn reclamp(
    position: ClampedPosition,
    element_width: f32,
    element_height: f32,
    container_width: f32,
    container_height: f32,
) -> ClampedPosition {
    ClampedPosition {
        x: clamp_axis(position.x, container_width - element_width),
        y: clamp_axis(position.y, container_height - element_height),
    }
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    // Oversized element: max < 0, pin to origin.
    if max <= 0.0 {
        return 0.0;
    }
    value.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_source_is_contained() {
        let fit = compute_fit(800.0, 600.0, 400.0, 400.0);
        assert_eq!(fit.fit_mode, FitMode::Contain);
        assert_eq!(fit.render_width, 400.0);
        assert_eq!(fit.render_height, 300.0);
    }

    #[test]
    fn limiting_axis_never_rounds_past_available() {
        for aw in [333.0f32, 777.0, 999.0, 1023.0, 1216.0] {
            for sw in 1..3000 {
                let sw = sw as f32;
                if sw <= aw {
                    continue;
                }
                let fit = compute_fit(sw, 1.0, aw, 10_000.0);
                assert_eq!(fit.render_width, aw, "sw={sw} aw={aw}");
                assert!(fit.render_height <= 10_000.0);
            }
        }
        // 583 * (333 / 583) lands one step above 333 in f32.
        assert_eq!(compute_fit(583.0, 1.0, 333.0, 10_000.0).render_width, 333.0);
    }

    #[test]
    fn reclamp_pulls_position_back_inside() {
        let p = ClampedPosition { x: 760.0, y: 580.0 };
        assert_eq!(reclamp(p, 40.0, 20.0, 400.0, 300.0), ClampedPosition { x: 360.0, y: 280.0 });
        assert_eq!(reclamp(p, 40.0, 20.0, 800.0, 600.0), p);
        assert_eq!(reclamp(p, 500.0, 20.0, 400.0, 300.0).x, 0.0);
    }

    #[test]
    fn small_source_stays_natural() {
        let fit = compute_fit(200.0, 100.0, 800.0, 600.0);
        assert_eq!(fit.fit_mode, FitMode::Natural);
        assert_eq!((fit.render_width, fit.render_height), (200.0, 100.0));
    }

    #[test]
    fn exact_fit_is_natural() {
        let fit = compute_fit(400.0, 300.0, 400.0, 300.0);
        assert_eq!(fit.fit_mode, FitMode::Natural);
    }

    #[test]
    fn tall_source_limited_by_height() {
        let fit = compute_fit(100.0, 1000.0, 500.0, 500.0);
        assert_eq!(fit.fit_mode, FitMode::Contain);
        assert_eq!(fit.render_height, 500.0);
        assert_eq!(fit.render_width, 50.0);
    }

    #[test]
    fn pixel_size_never_zero() {
        let fit = compute_fit(10_000.0, 1.0, 100.0, 100.0);
        assert_eq!(fit.pixel_size(), (100, 1));
        let tiny = ViewportFit { render_width: 0.2, render_height: 0.2, fit_mode: FitMode::Contain };
        assert_eq!(tiny.pixel_size(), (1, 1));
    }

    #[test]
    fn available_area_rejects_degenerate_sizes() {
        assert!(AvailableArea::new(0.0, 10.0).is_none());
        assert!(AvailableArea::new(10.0, -1.0).is_none());
        assert!(AvailableArea::new(f32::NAN, 10.0).is_none());
        assert!(AvailableArea::new(f32::INFINITY, 10.0).is_none());
        assert!(AvailableArea::from_window(60.0, 800.0, 64.0, 176.0).is_none());
        let area = AvailableArea::from_window(1280.0, 720.0, 64.0, 176.0).unwrap();
        assert_eq!((area.width(), area.height()), (1216.0, 544.0));
    }

    #[test]
    fn drop_inside_container() {
        let p = compute_clamped_position(50.0, 50.0, 40.0, 20.0, 0.0, 0.0, 300.0, 200.0);
        assert_eq!(p, ClampedPosition { x: 30.0, y: 40.0 });
    }

    #[test]
    fn drop_near_origin_clamps_to_zero() {
        let p = compute_clamped_position(5.0, 5.0, 40.0, 20.0, 0.0, 0.0, 300.0, 200.0);
        assert_eq!(p, ClampedPosition { x: 0.0, y: 0.0 });
    }

    #[test]
    fn drop_near_far_corner_clamps_to_max() {
        let p = compute_clamped_position(295.0, 195.0, 40.0, 20.0, 0.0, 0.0, 300.0, 200.0);
        assert_eq!(p, ClampedPosition { x: 260.0, y: 180.0 });
    }

    #[test]
    fn container_origin_is_subtracted() {
        let p = compute_clamped_position(150.0, 250.0, 40.0, 20.0, 100.0, 200.0, 300.0, 200.0);
        assert_eq!(p, ClampedPosition { x: 30.0, y: 40.0 });
    }

    #[test]
    fn oversized_element_pins_to_origin() {
        let p = compute_clamped_position(200.0, 10.0, 400.0, 20.0, 0.0, 0.0, 300.0, 200.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn clamp_drop_matches_flat_form() {
        let element = Bounds::new(999.0, 999.0, 40.0, 20.0);
        let container = Bounds::new(10.0, 20.0, 300.0, 200.0);
        assert_eq!(
            clamp_drop((60.0, 70.0), element, container),
            compute_clamped_position(60.0, 70.0, 40.0, 20.0, 10.0, 20.0, 300.0, 200.0)
        );
    }
}
