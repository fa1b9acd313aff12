//! Drawing primitives
//!
//! The reconstructor only needs rectangles, text, circles and lines, so any
//! 2D backend can host it by implementing [`DrawSurface`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// RGB color with alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white(a: f64) -> Self {
        Self::new(255, 255, 255, a)
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` notation.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub align: TextAlign,
    pub color: Rgba,
}

impl TextStyle {
    pub fn new(size: f64, align: TextAlign, color: Rgba) -> Self {
        Self {
            size,
            bold: false,
            align,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// A 2D target of caller-supplied pixel size.
pub trait DrawSurface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64);
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);
    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, line_width: f64);
    fn line(&mut self, from: Point, to: Point, color: Rgba, line_width: f64);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Rgba },
    StrokeRect { rect: Rect, color: Rgba, line_width: f64 },
    Text { text: String, at: Point, style: TextStyle },
    FillCircle { center: Point, radius: f64, color: Rgba },
    StrokeCircle { center: Point, radius: f64, color: Rgba, line_width: f64 },
    Line { from: Point, to: Point, color: Rgba, line_width: f64 },
}

/// Surface that records every call, for replay onto another backend or inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Replay the recorded calls onto `target`.
    pub fn replay<S: DrawSurface>(&self, target: &mut S) {
        for command in &self.commands {
            match command {
                DrawCommand::FillRect { rect, color } => target.fill_rect(*rect, *color),
                DrawCommand::StrokeRect { rect, color, line_width } => {
                    target.stroke_rect(*rect, *color, *line_width)
                }
                DrawCommand::Text { text, at, style } => target.fill_text(text, *at, style),
                DrawCommand::FillCircle { center, radius, color } => {
                    target.fill_circle(*center, *radius, *color)
                }
                DrawCommand::StrokeCircle { center, radius, color, line_width } => {
                    target.stroke_circle(*center, *radius, *color, *line_width)
                }
                DrawCommand::Line { from, to, color, line_width } => {
                    target.line(*from, *to, *color, *line_width)
                }
            }
        }
    }

    pub fn filled_circles(&self) -> impl Iterator<Item = (Point, f64, Rgba)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillCircle { center, radius, color } => Some((*center, *radius, *color)),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect { rect, color, line_width });
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            style: style.clone(),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, line_width: f64) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            line_width,
        });
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba, line_width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            line_width,
        });
    }
}
