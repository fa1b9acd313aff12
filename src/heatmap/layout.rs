//! Reference background
//!
//! A proportional mock of the lead form, drawn behind the heatmap for
//! orientation. Purely cosmetic: nothing here is derived from the samples.

use crate::heatmap::surface::{DrawSurface, Point, Rect, Rgba, TextAlign, TextStyle};
use serde::{Deserialize, Serialize};

const BACKGROUND_TOP: Rgba = Rgba::new(15, 23, 42, 1.0);
const BACKGROUND_BOTTOM: Rgba = Rgba::new(30, 27, 75, 1.0);
const GRADIENT_BANDS: usize = 16;

const ACCENT: Rgba = Rgba::new(99, 102, 241, 1.0);

const FIELD_HEIGHT: f64 = 32.0;
const FIELD_SPACING: f64 = 14.0;
const FIELD_INSET: f64 = 15.0;
const LABEL_INSET: f64 = 25.0;
const TOGGLE_WIDTH: f64 = 70.0;
const TOGGLE_HEIGHT: f64 = 28.0;

/// Texts shown on the mock form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLayout {
    pub title: String,
    pub subtitle: String,
    pub submit_label: String,
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self {
            title: "Autéllo".to_string(),
            subtitle: "Leave a request and we will get back to you".to_string(),
            submit_label: "Send request".to_string(),
        }
    }
}

/// Fill the whole surface with a vertical two-color gradient, approximated by bands.
pub fn draw_backdrop<S: DrawSurface>(surface: &mut S) {
    let width = surface.width();
    let band_height = surface.height() / GRADIENT_BANDS as f64;

    for band in 0..GRADIENT_BANDS {
        let t = band as f64 / (GRADIENT_BANDS - 1) as f64;
        surface.fill_rect(
            Rect::new(0.0, band as f64 * band_height, width, band_height),
            mix(BACKGROUND_TOP, BACKGROUND_BOTTOM, t),
        );
    }
}

/// Draw the mock form inside `panel`.
pub fn draw_reference_panel<S: DrawSurface>(surface: &mut S, panel: Rect, layout: &ReferenceLayout) {
    surface.fill_rect(panel, Rgba::white(0.05));
    surface.stroke_rect(panel, Rgba::white(0.1), 2.0);

    let center_x = panel.x + panel.width / 2.0;
    surface.fill_text(
        &layout.title,
        Point::new(center_x, panel.y + 30.0),
        &TextStyle::new(20.0, TextAlign::Center, Rgba::white(0.3)).bold(),
    );
    surface.fill_text(
        &layout.subtitle,
        Point::new(center_x, panel.y + 55.0),
        &TextStyle::new(14.0, TextAlign::Center, Rgba::white(0.3)),
    );

    let full_width = panel.width - 2.0 * FIELD_INSET;
    let half_width = (panel.width - 45.0) / 2.0;
    let left = panel.x + FIELD_INSET;
    let right = panel.x + LABEL_INSET + half_width;
    let mut y = panel.y + 75.0;

    field(surface, Rect::new(left, y, full_width, FIELD_HEIGHT), "Choose a service");
    y += FIELD_HEIGHT + FIELD_SPACING;

    field(surface, Rect::new(left, y, half_width, FIELD_HEIGHT), "First name");
    field(surface, Rect::new(right, y, half_width, FIELD_HEIGHT), "Last name");
    y += FIELD_HEIGHT + FIELD_SPACING;

    // Phone / email toggle, phone selected
    let toggle_style = TextStyle::new(11.0, TextAlign::Center, Rgba::white(0.9));
    let phone = Rect::new(left, y, TOGGLE_WIDTH, TOGGLE_HEIGHT);
    surface.fill_rect(phone, ACCENT.with_alpha(0.4));
    surface.stroke_rect(phone, ACCENT.with_alpha(0.6), 2.0);
    surface.fill_text("Phone", Point::new(phone.x + TOGGLE_WIDTH / 2.0, y + 18.0), &toggle_style);

    let email = Rect::new(left + TOGGLE_WIDTH + 5.0, y, TOGGLE_WIDTH, TOGGLE_HEIGHT);
    surface.fill_rect(email, Rgba::white(0.1));
    surface.stroke_rect(email, Rgba::white(0.2), 2.0);
    surface.fill_text(
        "Email",
        Point::new(email.x + TOGGLE_WIDTH / 2.0, y + 18.0),
        &TextStyle {
            color: Rgba::white(0.6),
            ..toggle_style
        },
    );
    y += TOGGLE_HEIGHT + 8.0;

    field(surface, Rect::new(left, y, full_width, FIELD_HEIGHT), "+1 (555) 123-45-67");
    y += FIELD_HEIGHT + FIELD_SPACING;

    field(surface, Rect::new(left, y, full_width, FIELD_HEIGHT * 1.5), "Additional information");
    y += FIELD_HEIGHT * 1.5 + FIELD_SPACING + 8.0;

    surface.line(
        Point::new(left, y),
        Point::new(panel.right() - FIELD_INSET, y),
        Rgba::white(0.1),
        1.0,
    );
    y += 12.0;
    surface.fill_text(
        "Project details",
        Point::new(left, y),
        &TextStyle::new(13.0, TextAlign::Left, Rgba::white(0.4)).bold(),
    );
    y += 20.0;

    field(surface, Rect::new(left, y, full_width, FIELD_HEIGHT), "Business niche");
    y += FIELD_HEIGHT + FIELD_SPACING;

    field(surface, Rect::new(left, y, half_width, FIELD_HEIGHT), "Company size");
    field(surface, Rect::new(right, y, half_width, FIELD_HEIGHT), "Project scope");
    y += FIELD_HEIGHT + FIELD_SPACING;

    field(surface, Rect::new(left, y, half_width, FIELD_HEIGHT), "Your role");
    field(surface, Rect::new(right, y, half_width, FIELD_HEIGHT), "Deadline");
    y += FIELD_HEIGHT + FIELD_SPACING;

    field(surface, Rect::new(left, y, full_width, FIELD_HEIGHT), "Estimated budget");
    y += FIELD_HEIGHT + FIELD_SPACING + 8.0;

    let submit = Rect::new(left, y, full_width, FIELD_HEIGHT);
    surface.fill_rect(submit, ACCENT.with_alpha(0.3));
    surface.stroke_rect(submit, ACCENT.with_alpha(0.5), 2.0);
    surface.fill_text(
        &layout.submit_label,
        Point::new(center_x, y + 22.0),
        &TextStyle::new(14.0, TextAlign::Center, Rgba::white(0.8)).bold(),
    );
    y += FIELD_HEIGHT + 8.0;

    surface.fill_text(
        "By submitting you agree to the processing of personal data",
        Point::new(center_x, y + 10.0),
        &TextStyle::new(9.0, TextAlign::Center, Rgba::white(0.3)),
    );
}

fn field<S: DrawSurface>(surface: &mut S, rect: Rect, placeholder: &str) {
    surface.fill_rect(rect, Rgba::white(0.1));
    surface.stroke_rect(rect, Rgba::white(0.2), 2.0);
    surface.fill_text(
        placeholder,
        Point::new(rect.x + LABEL_INSET - FIELD_INSET, rect.y + 20.0),
        &TextStyle::new(12.0, TextAlign::Left, Rgba::white(0.5)),
    );
}

fn mix(from: Rgba, to: Rgba, t: f64) -> Rgba {
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgba::new(
        lerp(from.r, to.r),
        lerp(from.g, to.g),
        lerp(from.b, to.b),
        from.a + (to.a - from.a) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn test_backdrop_covers_surface() {
        let mut surface = RecordingSurface::new(400.0, 320.0);
        draw_backdrop(&mut surface);

        let rects: Vec<Rect> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();

        assert_eq!(rects.len(), GRADIENT_BANDS);
        assert_eq!(rects[0].y, 0.0);
        assert!((rects.last().unwrap().bottom() - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_panel_draws_no_circles() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        draw_reference_panel(
            &mut surface,
            Rect::new(140.0, 0.0, 520.0, 600.0),
            &ReferenceLayout::default(),
        );

        assert_eq!(surface.filled_circles().count(), 0);
        assert!(surface.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == "Autéllo"
        )));
    }

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(mix(BACKGROUND_TOP, BACKGROUND_BOTTOM, 0.0), BACKGROUND_TOP);
        assert_eq!(mix(BACKGROUND_TOP, BACKGROUND_BOTTOM, 1.0), BACKGROUND_BOTTOM);
    }
}
