//! Mapping between the preview canvas (client pixels) and the real screen
//! (logical pixels).
//!
//! One uniform scale is used for both axes so the preview never distorts:
//! `scale = min(canvas_w / screen_w, canvas_h / screen_h)`. Nothing here
//! caches the scale; callers recompute it from the current canvas and screen.

use serde::{Deserialize, Serialize};

use crate::data_loaders::config::LayoutSettings;

use super::placement::{AspectRatio, WidgetPlacement};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered canvas in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasGeometry {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_usable(&self) -> bool {
        usable(self.width) && usable(self.height)
    }
}

fn usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// `None` when either side is degenerate; rendering and pointer handling
/// are skipped until the host reports a real canvas.
pub fn compute_scale(canvas: &CanvasGeometry, screen: &ScreenSize) -> Option<f64> {
    if !usable(canvas.width) || !usable(canvas.height) || !screen.is_usable() {
        return None;
    }
    let scale = (canvas.width / screen.width).min(canvas.height / screen.height);
    usable(scale).then_some(scale)
}

/// A widget's rectangle on the preview canvas, relative to the canvas origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRect {
    pub index: usize,
    pub id: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Preview of one placement. The position is pulled back inside the canvas
/// so a widget left outside by a window shrink stays reachable; the stored
/// coordinates are untouched.
pub fn preview_for(
    index: usize,
    placement: &WidgetPlacement,
    canvas: &CanvasGeometry,
    scale: f64,
    settings: &LayoutSettings,
) -> PreviewRect {
    let real_w = placement.width.unwrap_or(settings.default_width) as f64;
    let real_h = placement.height.unwrap_or(settings.default_height) as f64;

    let width = (real_w * scale).round().max(settings.min_preview_px);
    let height = (real_h * scale).round().max(settings.min_preview_px);
    let left = clamp_axis((placement.x as f64 * scale).round(), canvas.width - width);
    let top = clamp_axis((placement.y as f64 * scale).round(), canvas.height - height);

    PreviewRect {
        index,
        id: placement.id.clone(),
        left,
        top,
        width,
        height,
    }
}

/// Previews for every enabled placement, in list order.
pub fn render_previews(
    placements: &[WidgetPlacement],
    canvas: &CanvasGeometry,
    screen: &ScreenSize,
    settings: &LayoutSettings,
) -> Vec<PreviewRect> {
    let Some(scale) = compute_scale(canvas, screen) else {
        return Vec::new();
    };

    placements
        .iter()
        .enumerate()
        .filter(|(_, p)| p.enabled)
        .map(|(index, p)| preview_for(index, p, canvas, scale, settings))
        .collect()
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    value.min(max.max(0.0)).max(0.0)
}

fn to_real(value: f64, scale: f64) -> i32 {
    (value / scale).round() as i32
}

/// Real-screen top-left for a drag whose pointer is at `client`.
pub fn drag_to(
    client: Point,
    offset: Point,
    preview: &PreviewRect,
    canvas: &CanvasGeometry,
    scale: f64,
) -> (i32, i32) {
    let left = clamp_axis(client.x - canvas.left - offset.x, canvas.width - preview.width);
    let top = clamp_axis(client.y - canvas.top - offset.y, canvas.height - preview.height);
    (to_real(left, scale), to_real(top, scale))
}

/// Real-screen size after moving the resize handle by `delta` preview pixels.
///
/// Width leads; a fixed ratio derives the height from it. The stored height
/// is derived from the stored width as well so rounding never drifts the
/// ratio by more than one unit.
pub fn resize_by(
    delta: Point,
    preview: &PreviewRect,
    aspect: AspectRatio,
    canvas: &CanvasGeometry,
    scale: f64,
    settings: &LayoutSettings,
) -> (i32, i32) {
    let min = settings.min_resize_px;
    let max_w = (canvas.width - preview.left).max(0.0);
    let max_h = (canvas.height - preview.top).max(0.0);

    let mut width = (preview.width + delta.x).max(min);
    let mut height = (preview.height + delta.y).max(min);

    match aspect.ratio() {
        Some(ratio) => {
            width = width.min(max_w);
            height = (width / ratio).round();
            if height > max_h {
                height = max_h;
                width = (height * ratio).round().min(max_w);
            }

            let real_w = to_real(width, scale).max(1);
            let real_h = ((real_w as f64 / ratio).round() as i32).max(1);
            (real_w, real_h)
        }
        None => {
            width = width.min(max_w);
            height = height.min(max_h);
            (to_real(width, scale).max(1), to_real(height, scale).max(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_scale_canvas() -> (CanvasGeometry, ScreenSize) {
        (CanvasGeometry::new(0.0, 0.0, 960.0, 540.0), ScreenSize::new(1920.0, 1080.0))
    }

    fn enabled(id: &str, x: i32, y: i32, w: i32, h: i32) -> WidgetPlacement {
        WidgetPlacement {
            enabled: true,
            x,
            y,
            width: Some(w),
            height: Some(h),
            ..WidgetPlacement::new(id)
        }
    }

    #[test]
    fn scale_takes_the_tighter_axis() {
        let screen = ScreenSize::new(1920.0, 1080.0);
        let wide = CanvasGeometry::new(0.0, 0.0, 1200.0, 540.0);
        assert_eq!(compute_scale(&wide, &screen), Some(0.5));

        let tall = CanvasGeometry::new(0.0, 0.0, 480.0, 900.0);
        assert_eq!(compute_scale(&tall, &screen), Some(0.25));

        let collapsed = CanvasGeometry::new(0.0, 0.0, 0.0, 540.0);
        assert_eq!(compute_scale(&collapsed, &screen), None);
    }

    #[test]
    fn render_scales_and_skips_disabled() {
        let (canvas, screen) = half_scale_canvas();
        let mut hidden = enabled("quote", 0, 0, 400, 200);
        hidden.enabled = false;
        let placements = vec![enabled("clock", 200, 100, 400, 200), hidden];

        let previews = render_previews(&placements, &canvas, &screen, &LayoutSettings::default());

        assert_eq!(previews.len(), 1);
        let clock = &previews[0];
        assert_eq!((clock.left, clock.top), (100.0, 50.0));
        assert_eq!((clock.width, clock.height), (200.0, 100.0));
    }

    #[test]
    fn render_applies_minimum_and_default_sizes() {
        let (canvas, screen) = half_scale_canvas();
        let tiny = enabled("dot", 0, 0, 10, 10);
        let bare = WidgetPlacement {
            enabled: true,
            ..WidgetPlacement::new("bare")
        };

        let previews = render_previews(&[tiny, bare], &canvas, &screen, &LayoutSettings::default());

        assert_eq!((previews[0].width, previews[0].height), (20.0, 20.0));
        assert_eq!((previews[1].width, previews[1].height), (50.0, 25.0));
    }

    #[test]
    fn render_pulls_stray_widgets_back_inside() {
        let (canvas, screen) = half_scale_canvas();
        let stray = enabled("clock", 1900, 1070, 400, 200);

        let previews = render_previews(&[stray], &canvas, &screen, &LayoutSettings::default());

        assert_eq!((previews[0].left, previews[0].top), (760.0, 440.0));
    }

    #[test]
    fn drag_lands_in_real_coordinates() {
        let (canvas, screen) = half_scale_canvas();
        let scale = compute_scale(&canvas, &screen).unwrap();
        let preview = preview_for(0, &enabled("clock", 200, 100, 200, 100), &canvas, scale, &LayoutSettings::default());

        let real = drag_to(Point::new(300.0, 150.0), Point::default(), &preview, &canvas, scale);

        assert_eq!(real, (600, 300));
    }

    #[test]
    fn drag_is_clamped_to_the_canvas() {
        let canvas = CanvasGeometry::new(50.0, 30.0, 960.0, 540.0);
        let preview = PreviewRect {
            index: 0,
            id: "clock".into(),
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 50.0,
        };

        assert_eq!(drag_to(Point::new(-500.0, -500.0), Point::default(), &preview, &canvas, 0.5), (0, 0));
        assert_eq!(
            drag_to(Point::new(5000.0, 5000.0), Point::new(10.0, 10.0), &preview, &canvas, 0.5),
            (1720, 980)
        );
    }

    #[test]
    fn fixed_ratio_resize_follows_width() {
        let canvas = CanvasGeometry::new(0.0, 0.0, 1920.0, 1080.0);
        let preview = PreviewRect {
            index: 0,
            id: "clock".into(),
            left: 0.0,
            top: 0.0,
            width: 200.0,
            height: 100.0,
        };

        let size = resize_by(
            Point::new(40.0, 10.0),
            &preview,
            AspectRatio::Fixed(2.0),
            &canvas,
            1.0,
            &LayoutSettings::default(),
        );

        assert_eq!(size, (240, 120));
    }

    #[test]
    fn flex_resize_moves_each_axis_and_respects_minimum() {
        let canvas = CanvasGeometry::new(0.0, 0.0, 960.0, 540.0);
        let preview = PreviewRect {
            index: 0,
            id: "status".into(),
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 60.0,
        };

        let grown = resize_by(Point::new(20.0, -50.0), &preview, AspectRatio::Flex, &canvas, 0.5, &LayoutSettings::default());
        assert_eq!(grown, (240, 80));
    }

    #[test]
    fn resize_stops_at_the_canvas_edge_and_keeps_ratio() {
        let canvas = CanvasGeometry::new(0.0, 0.0, 400.0, 300.0);
        let preview = PreviewRect {
            index: 0,
            id: "clock".into(),
            left: 100.0,
            top: 200.0,
            width: 120.0,
            height: 60.0,
        };

        let (w, h) = resize_by(Point::new(500.0, 0.0), &preview, AspectRatio::Fixed(2.0), &canvas, 1.0, &LayoutSettings::default());

        assert!(w as f64 <= canvas.width - preview.left);
        assert!(h as f64 <= canvas.height - preview.top);
        assert!((h as f64 - w as f64 / 2.0).abs() <= 1.0);
        assert_eq!((w, h), (200, 100));
    }
}
