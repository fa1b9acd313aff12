//! Cursor heatmap reconstruction
//!
//! Projects cursor samples recorded on heterogeneous viewports onto a fixed
//! reference layout and renders a density heatmap through [`DrawSurface`].

pub mod density;
pub mod layout;
pub mod projection;
pub mod renderer;
pub mod surface;
pub mod svg;

pub use layout::ReferenceLayout;
pub use projection::{PanelFractions, Projection, ProjectionConfig};
pub use renderer::{HeatmapCanvas, RenderReport};
pub use surface::{DrawCommand, DrawSurface, Point, Rect, RecordingSurface, Rgba, TextAlign, TextStyle};
pub use svg::SvgSurface;
