//! Density grid and heat color ramp

use crate::heatmap::surface::{Point, Rgba};
use std::collections::BTreeMap;

pub const MIN_CELL_RADIUS: f64 = 8.0;
pub const CELL_RADIUS_RANGE: f64 = 20.0;

/// Sample counts per fixed-size grid cell.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    cell_size: f64,
    // Keyed (row, column) so iteration runs top-to-bottom, left-to-right
    counts: BTreeMap<(i64, i64), u32>,
    max_count: u32,
}

/// A non-empty grid cell with its normalized density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityCell {
    pub column: i64,
    pub row: i64,
    pub count: u32,
    pub center: Point,
    /// `count / max_count`, in `(0, 1]`
    pub intensity: f64,
}

impl DensityGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
            counts: BTreeMap::new(),
            max_count: 0,
        }
    }

    pub fn add(&mut self, point: Point) {
        let column = (point.x / self.cell_size).floor() as i64;
        let row = (point.y / self.cell_size).floor() as i64;
        let count = self.counts.entry((row, column)).or_insert(0);
        *count += 1;
        self.max_count = self.max_count.max(*count);
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = DensityCell> + '_ {
        let half = self.cell_size / 2.0;
        let max = self.max_count.max(1) as f64;
        self.counts.iter().map(move |(&(row, column), &count)| DensityCell {
            column,
            row,
            count,
            center: Point::new(
                column as f64 * self.cell_size + half,
                row as f64 * self.cell_size + half,
            ),
            intensity: (count as f64 / max).min(1.0),
        })
    }
}

impl Extend<Point> for DensityGrid {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        for point in iter {
            self.add(point);
        }
    }
}

/// Blue → green → red ramp; alpha rises with intensity.
pub fn heat_color(intensity: f64) -> Rgba {
    let intensity = intensity.clamp(0.0, 1.0);
    if intensity < 0.5 {
        let t = intensity * 2.0;
        Rgba::new(0, channel(t), channel(1.0 - t), 0.4 + t * 0.3)
    } else {
        let t = (intensity - 0.5) * 2.0;
        Rgba::new(channel(t), channel(1.0 - t), 0, 0.7 + t * 0.3)
    }
}

pub fn cell_radius(intensity: f64) -> f64 {
    MIN_CELL_RADIUS + intensity.clamp(0.0, 1.0) * CELL_RADIUS_RANGE
}

fn channel(t: f64) -> u8 {
    (255.0 * t).floor() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binning_and_max() {
        let mut grid = DensityGrid::new(15.0);
        grid.extend([
            Point::new(1.0, 1.0),
            Point::new(14.9, 14.9),
            Point::new(15.0, 1.0),
        ]);

        assert_eq!(grid.len(), 2);
        assert_eq!(grid.max_count(), 2);

        let cells: Vec<DensityCell> = grid.cells().collect();
        assert_eq!(cells[0].column, 0);
        assert_eq!(cells[0].count, 2);
        assert_eq!(cells[0].center, Point::new(7.5, 7.5));
        assert_eq!(cells[0].intensity, 1.0);
        assert_eq!(cells[1].column, 1);
        assert_eq!(cells[1].intensity, 0.5);
    }

    #[test]
    fn test_color_stops() {
        assert_eq!(heat_color(0.0), Rgba::new(0, 0, 255, 0.4));
        assert_eq!(heat_color(0.5), Rgba::new(0, 255, 0, 0.7));
        let hot = heat_color(1.0);
        assert_eq!((hot.r, hot.g, hot.b), (255, 0, 0));
        assert!((hot.a - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_midpoints() {
        let low = heat_color(0.25);
        assert_eq!((low.r, low.g, low.b), (0, 127, 127));
        assert!((low.a - 0.55).abs() < 1e-9);

        let high = heat_color(0.75);
        assert_eq!((high.r, high.g, high.b), (127, 127, 0));
        assert!((high.a - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_radius_grows_with_intensity() {
        assert_eq!(cell_radius(0.0), 8.0);
        assert_eq!(cell_radius(0.5), 18.0);
        assert_eq!(cell_radius(1.0), 28.0);
        assert!(cell_radius(0.3) < cell_radius(0.6));
    }
}
