//! Heatmap reconstruction pipeline
//!
//! Renders cursor samples gathered on many differently-sized screens onto a
//! single reference canvas:
//!
//! 1. reference backdrop and mock form panel
//! 2. filter malformed samples and cap the count (prefix, no random sampling)
//! 3. estimate the recording screen from the samples' extent
//! 4. project every sample onto the canvas panel, dropping points outside the canvas
//! 5. bin into density cells and draw one graded circle per cell
//! 6. optionally overlay a strided subset of the projected points

use crate::config::HeatmapConfig;
use crate::heatmap::density::{cell_radius, heat_color, DensityGrid};
use crate::heatmap::layout::{draw_backdrop, draw_reference_panel, ReferenceLayout};
use crate::heatmap::projection::Projection;
use crate::heatmap::surface::{DrawSurface, Point, Rgba};
use crate::transport::RawSample;
use serde::Serialize;

const DETAIL_DOT_RADIUS: f64 = 1.5;
const DETAIL_DOT_COLOR: Rgba = Rgba::white(0.2);
const CELL_OUTLINE_ALPHA: f64 = 0.8;

/// Counters describing what a render drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    pub samples_received: usize,
    /// Valid samples kept after the prefix cap
    pub samples_accepted: usize,
    /// Projected samples that landed on the canvas
    pub points_in_bounds: usize,
    pub cells_drawn: usize,
    pub max_density: u32,
    pub detail_dots: usize,
}

/// A drawing surface dedicated to heatmap renders.
///
/// `render` borrows the canvas mutably, so only one render can be in flight per canvas.
pub struct HeatmapCanvas<S: DrawSurface> {
    surface: S,
    config: HeatmapConfig,
    layout: ReferenceLayout,
}

impl<S: DrawSurface> HeatmapCanvas<S> {
    pub fn new(surface: S, config: HeatmapConfig) -> Self {
        Self {
            surface,
            config,
            layout: ReferenceLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: ReferenceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Draw the backdrop and the reference panel only.
    pub fn render_background(&mut self) {
        let (width, height) = (self.surface.width(), self.surface.height());
        draw_backdrop(&mut self.surface);
        let panel = self.config.projection.canvas_panel.rect_in(width, height);
        draw_reference_panel(&mut self.surface, panel, &self.layout);
    }

    /// Render the background and the heatmap for `samples`.
    ///
    /// Malformed samples are skipped. A zero-sized surface draws nothing.
    pub fn render(&mut self, samples: &[RawSample]) -> RenderReport {
        let mut report = RenderReport {
            samples_received: samples.len(),
            ..RenderReport::default()
        };

        let (width, height) = (self.surface.width(), self.surface.height());
        if !(width > 0.0 && height > 0.0) {
            tracing::debug!("Skipping heatmap render on empty surface");
            return report;
        }

        self.render_background();

        let points = accepted_points(samples, self.config.max_samples);
        report.samples_accepted = points.len();
        if points.is_empty() {
            return report;
        }

        let projection = Projection::for_points(&self.config.projection, &points, width, height);
        let projected: Vec<Option<Point>> = points
            .iter()
            .map(|p| {
                let q = projection.apply(*p);
                in_bounds(q, width, height).then_some(q)
            })
            .collect();

        let mut grid = DensityGrid::new(self.config.cell_size);
        grid.extend(projected.iter().flatten().copied());
        report.points_in_bounds = projected.iter().flatten().count();
        report.max_density = grid.max_count();

        for cell in grid.cells() {
            let color = heat_color(cell.intensity);
            let radius = cell_radius(cell.intensity);
            self.surface.fill_circle(cell.center, radius, color);
            self.surface
                .stroke_circle(cell.center, radius, color.with_alpha(CELL_OUTLINE_ALPHA), 1.0);
            report.cells_drawn += 1;
        }

        if self.config.draw_detail_dots && self.config.max_detail_dots > 0 {
            let sample_size = projected.len().min(self.config.max_detail_dots);
            let step = (projected.len() / sample_size).max(1);
            for point in projected.iter().step_by(step).flatten() {
                self.surface
                    .fill_circle(*point, DETAIL_DOT_RADIUS, DETAIL_DOT_COLOR);
                report.detail_dots += 1;
            }
        }

        tracing::debug!(
            "Heatmap rendered: {} of {} samples accepted, {} on canvas, {} cells (max density {})",
            report.samples_accepted,
            report.samples_received,
            report.points_in_bounds,
            report.cells_drawn,
            report.max_density
        );

        report
    }
}

/// Samples with defined, finite, positive coordinates, capped to the first `cap`.
pub fn accepted_points(samples: &[RawSample], cap: usize) -> Vec<Point> {
    samples
        .iter()
        .filter_map(|s| match (s.x, s.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0 => {
                Some(Point::new(x, y))
            }
            _ => None,
        })
        .take(cap)
        .collect()
}

fn in_bounds(point: Point, width: f64, height: f64) -> bool {
    point.x >= 0.0 && point.x <= width && point.y >= 0.0 && point.y <= height
}
