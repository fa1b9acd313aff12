//! Coordinate re-projection
//!
//! Samples carry no viewport metadata, so the screen that produced them is
//! estimated from the samples' own extent. The form panel is assumed to sit
//! at a fixed fraction of that screen; the linear map between that estimated
//! panel and the reference panel on the canvas places each sample.
//!
//! Sessions whose layout differs from the assumed placement are misprojected.
//! The fractions are configuration, not measurements.

use crate::heatmap::surface::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Panel placement as fractions of its container. The panel is centered horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelFractions {
    pub width: f64,
    pub top: f64,
    pub height: f64,
}

impl Default for PanelFractions {
    fn default() -> Self {
        Self {
            width: 1.0,
            top: 0.0,
            height: 1.0,
        }
    }
}

impl PanelFractions {
    pub const fn new(width: f64, top: f64, height: f64) -> Self {
        Self { width, top, height }
    }

    /// Panel rectangle inside a `container_width` x `container_height` area.
    pub fn rect_in(&self, container_width: f64, container_height: f64) -> Rect {
        let width = container_width * self.width;
        Rect::new(
            (container_width - width) / 2.0,
            container_height * self.top,
            width,
            container_height * self.height,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionConfig {
    /// Reference panel on the canvas
    pub canvas_panel: PanelFractions,
    /// Assumed panel placement on the recording screen
    pub screen_panel: PanelFractions,
    /// Screen size assumed when the samples give no usable extent
    pub default_viewport_width: f64,
    pub default_viewport_height: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            canvas_panel: PanelFractions::new(0.65, 0.0, 1.0),
            screen_panel: PanelFractions::new(0.6, 0.1, 0.85),
            default_viewport_width: 1920.0,
            default_viewport_height: 1080.0,
        }
    }
}

/// Linear map from estimated screen coordinates onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub screen_panel: Rect,
    pub canvas_panel: Rect,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Projection {
    /// Build the projection for samples whose largest coordinates are `max_x`/`max_y`.
    pub fn estimate(
        config: &ProjectionConfig,
        max_x: f64,
        max_y: f64,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        let screen_width = if max_x > 0.0 { max_x } else { config.default_viewport_width };
        let screen_height = if max_y > 0.0 { max_y } else { config.default_viewport_height };

        let screen_panel = config.screen_panel.rect_in(screen_width, screen_height);
        let canvas_panel = config.canvas_panel.rect_in(canvas_width, canvas_height);

        Self {
            screen_panel,
            canvas_panel,
            scale_x: ratio(canvas_panel.width, screen_panel.width),
            scale_y: ratio(canvas_panel.height, screen_panel.height),
        }
    }

    /// Build the projection from the samples' own extent.
    pub fn for_points(
        config: &ProjectionConfig,
        points: &[Point],
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        let (max_x, max_y) = points
            .iter()
            .fold((0.0_f64, 0.0_f64), |(mx, my), p| (mx.max(p.x), my.max(p.y)));
        Self::estimate(config, max_x, max_y, canvas_width, canvas_height)
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.screen_panel.x) * self.scale_x + self.canvas_panel.x,
            (point.y - self.screen_panel.y) * self.scale_y + self.canvas_panel.y,
        )
    }
}

fn ratio(target: f64, source: f64) -> f64 {
    if source > 0.0 {
        target / source
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_panel_rect_is_centered() {
        let rect = PanelFractions::new(0.6, 0.1, 0.85).rect_in(1000.0, 1000.0);
        assert!(approx(rect.x, 200.0));
        assert!(approx(rect.y, 100.0));
        assert!(approx(rect.width, 600.0));
        assert!(approx(rect.height, 850.0));
    }

    #[test]
    fn test_panel_corners_map_onto_canvas_panel() {
        let config = ProjectionConfig::default();
        let projection = Projection::estimate(&config, 1000.0, 1000.0, 800.0, 600.0);

        let top_left = projection.apply(Point::new(200.0, 100.0));
        assert!(approx(top_left.x, projection.canvas_panel.x));
        assert!(approx(top_left.y, 0.0));

        let bottom_right = projection.apply(Point::new(800.0, 950.0));
        assert!(approx(bottom_right.x, projection.canvas_panel.right()));
        assert!(approx(bottom_right.y, 600.0));
    }

    #[test]
    fn test_scale_factors() {
        let config = ProjectionConfig::default();
        let projection = Projection::estimate(&config, 1000.0, 1000.0, 800.0, 600.0);
        assert!(approx(projection.scale_x, 800.0 * 0.65 / 600.0));
        assert!(approx(projection.scale_y, 600.0 / 850.0));
    }

    #[test]
    fn test_default_viewport_when_extent_missing() {
        let config = ProjectionConfig::default();
        let projection = Projection::estimate(&config, 0.0, -5.0, 800.0, 600.0);
        assert!(approx(projection.screen_panel.width, 1920.0 * 0.6));
        assert!(approx(projection.screen_panel.y, 108.0));
    }

    #[test]
    fn test_for_points_uses_maxima() {
        let config = ProjectionConfig::default();
        let points = [Point::new(100.0, 900.0), Point::new(1000.0, 50.0)];
        assert_eq!(
            Projection::for_points(&config, &points, 800.0, 600.0),
            Projection::estimate(&config, 1000.0, 900.0, 800.0, 600.0)
        );
    }

    #[test]
    fn test_degenerate_screen_panel_keeps_unit_scale() {
        let config = ProjectionConfig {
            screen_panel: PanelFractions::new(0.0, 0.0, 0.0),
            ..ProjectionConfig::default()
        };
        let projection = Projection::estimate(&config, 1000.0, 1000.0, 800.0, 600.0);
        assert_eq!(projection.scale_x, 1.0);
        assert_eq!(projection.scale_y, 1.0);
    }
}
