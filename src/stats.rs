//! Aggregate engagement statistics
//!
//! `AggregateStatistics` is the summary returned by the backend's statistics
//! endpoint and the input to heatmap rendering. `summarize` builds the same
//! summary locally from stored records.

use crate::transport::{RawSample, StoredMetrics};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateStatistics {
    /// Average time on page in seconds over the last day
    pub avg_time_day: f64,
    pub avg_time_week: f64,
    pub avg_time_month: f64,
    pub all_cursor_positions: Vec<RawSample>,
}

/// Summarize stored records relative to `now`.
///
/// Records without a creation time still contribute cursor samples but not
/// averages. Records whose cursor column fails to parse are skipped for samples.
pub fn summarize(records: &[StoredMetrics], now: DateTime<Utc>) -> AggregateStatistics {
    let mut all_cursor_positions = Vec::new();
    for record in records {
        match record.cursor_samples() {
            Ok(samples) => all_cursor_positions.extend(samples),
            Err(e) => tracing::warn!("Skipping cursor samples of record {}: {}", record.id, e),
        }
    }

    AggregateStatistics {
        avg_time_day: average_since(records, now - Duration::days(1)),
        avg_time_week: average_since(records, now - Duration::days(7)),
        avg_time_month: average_since(records, now - Duration::days(30)),
        all_cursor_positions,
    }
}

fn average_since(records: &[StoredMetrics], since: DateTime<Utc>) -> f64 {
    let (total, count) = records
        .iter()
        .filter(|r| r.created_at.is_some_and(|at| at >= since))
        .fold((0.0, 0usize), |(total, count), r| (total + r.time_on_page, count + 1));

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Human-readable duration: `"2 min 5 sec"`, `"42 sec"`, `"0 sec"`.
pub fn format_duration(seconds: f64) -> String {
    if !(seconds > 0.0) {
        return "0 sec".to_string();
    }
    let whole = seconds.floor() as u64;
    let (mins, secs) = (whole / 60, whole % 60);
    if mins > 0 {
        format!("{} min {} sec", mins, secs)
    } else {
        format!("{} sec", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, time_on_page: f64, created_at: Option<DateTime<Utc>>, cursor: Option<&str>) -> StoredMetrics {
        StoredMetrics {
            id,
            application_id: Some(id),
            time_on_page,
            buttons_clicked: None,
            cursor_positions: cursor.map(str::to_string),
            return_frequency: 0,
            page_views: 1,
            scroll_depth: 0.5,
            created_at,
            updated_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_windows_only_count_recent_records() {
        let records = vec![
            record(1, 30.0, Some(now() - Duration::hours(2)), None),
            record(2, 90.0, Some(now() - Duration::days(3)), None),
            record(3, 300.0, Some(now() - Duration::days(20)), None),
            record(4, 999.0, Some(now() - Duration::days(60)), None),
            record(5, 500.0, None, None),
        ];

        let stats = summarize(&records, now());
        assert_eq!(stats.avg_time_day, 30.0);
        assert_eq!(stats.avg_time_week, 60.0);
        assert_eq!(stats.avg_time_month, 140.0);
    }

    #[test]
    fn test_empty_windows_average_zero() {
        let stats = summarize(&[], now());
        assert_eq!(stats, AggregateStatistics::default());
    }

    #[test]
    fn test_cursor_samples_are_concatenated() {
        let records = vec![
            record(1, 1.0, None, Some(r#"[{"x":1,"y":2,"timestamp":3}]"#)),
            record(2, 1.0, None, Some("broken")),
            record(3, 1.0, None, Some(r#"[{"x":4,"y":5,"timestamp":6},{"x":7}]"#)),
        ];

        let stats = summarize(&records, now());
        assert_eq!(stats.all_cursor_positions.len(), 3);
        assert_eq!(stats.all_cursor_positions[1].x, Some(4.0));
    }

    #[test]
    fn test_summary_response_parses() {
        let json = r#"{
            "avg_time_day": 12.5,
            "avg_time_week": 20,
            "avg_time_month": 31.25,
            "all_cursor_positions": [{"x": 100, "y": 200, "timestamp": 1}, {"x": null, "y": 5}]
        }"#;

        let stats: AggregateStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.avg_time_week, 20.0);
        assert_eq!(stats.all_cursor_positions.len(), 2);
        assert_eq!(stats.all_cursor_positions[1].x, None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0 sec");
        assert_eq!(format_duration(f64::NAN), "0 sec");
        assert_eq!(format_duration(42.9), "42 sec");
        assert_eq!(format_duration(125.0), "2 min 5 sec");
        assert_eq!(format_duration(3600.0), "60 min 0 sec");
    }
}
