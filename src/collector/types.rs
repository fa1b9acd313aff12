use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cursor position captured on a sampling tick (viewport-relative pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    /// Unix time in milliseconds
    pub timestamp: i64,
}

/// Click counts keyed by resolved button label.
pub type ButtonClickTally = BTreeMap<String, u32>;

/// Scroll geometry read from the host page on a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            document_height,
            viewport_height,
        }
    }

    /// Fraction of the scrollable height reached, clamped to `[0, 1]`.
    ///
    /// A document that cannot scroll has been seen in full, so it reports 1.0.
    /// Returns `None` when the inputs produce NaN.
    pub fn depth_ratio(&self) -> Option<f64> {
        let scrollable = self.document_height - self.viewport_height;
        let ratio = if scrollable <= 0.0 {
            1.0
        } else {
            self.scroll_top / scrollable
        };

        if ratio.is_nan() {
            None
        } else {
            Some(ratio.clamp(0.0, 1.0))
        }
    }
}

/// Page visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Engagement summary for one tracking session at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub application_id: Option<i64>,
    pub time_on_page_seconds: f64,
    pub buttons_clicked: ButtonClickTally,
    pub cursor_positions: Vec<Sample>,
    pub return_frequency: u32,
    pub page_views: u32,
    pub scroll_depth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_ratio_midway() {
        let metrics = ScrollMetrics::new(500.0, 2000.0, 1000.0);
        assert_eq!(metrics.depth_ratio(), Some(0.5));
    }

    #[test]
    fn test_depth_ratio_clamps_overscroll() {
        // Elastic overscroll can push scroll_top past the scrollable range
        let metrics = ScrollMetrics::new(1200.0, 2000.0, 1000.0);
        assert_eq!(metrics.depth_ratio(), Some(1.0));

        let metrics = ScrollMetrics::new(-40.0, 2000.0, 1000.0);
        assert_eq!(metrics.depth_ratio(), Some(0.0));
    }

    #[test]
    fn test_depth_ratio_short_document() {
        let metrics = ScrollMetrics::new(0.0, 800.0, 1000.0);
        assert_eq!(metrics.depth_ratio(), Some(1.0));
    }

    #[test]
    fn test_depth_ratio_nan() {
        let metrics = ScrollMetrics::new(f64::NAN, 2000.0, 1000.0);
        assert_eq!(metrics.depth_ratio(), None);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = MetricsSnapshot {
            application_id: Some(7),
            time_on_page_seconds: 1.5,
            buttons_clicked: ButtonClickTally::new(),
            cursor_positions: vec![],
            return_frequency: 0,
            page_views: 1,
            scroll_depth: 0.0,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["applicationId"], 7);
        assert_eq!(json["timeOnPageSeconds"], 1.5);
        assert_eq!(json["pageViews"], 1);
    }
}
