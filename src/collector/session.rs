//! Tracking session state
//!
//! `TrackingSession` owns every counter and buffer for one page view. It is a
//! plain synchronous state machine; `BehaviorTracker` wires it to timers and a
//! transport.

use crate::collector::target::{resolve_button_label, UiElement};
use crate::collector::types::{ButtonClickTally, MetricsSnapshot, Sample, ScrollMetrics, Visibility};
use crate::config::TrackerConfig;
use std::collections::VecDeque;
use uuid::Uuid;

/// Source of Unix time in milliseconds.
pub type Clock = fn() -> i64;

pub fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct TrackingSession {
    id: Uuid,
    clock: Clock,
    capacity: usize,
    started_at_ms: i64,
    application_id: Option<i64>,
    scroll_depth: f64,
    buttons_clicked: ButtonClickTally,
    cursor_positions: VecDeque<Sample>,
    last_pointer: (f64, f64),
    visibility: Visibility,
    page_views: u32,
    return_frequency: u32,
    stopped: bool,
}

impl TrackingSession {
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_clock(config, system_clock)
    }

    pub fn with_clock(config: &TrackerConfig, clock: Clock) -> Self {
        let capacity = config.sample_capacity.max(1);
        Self {
            id: Uuid::new_v4(),
            clock,
            capacity,
            started_at_ms: clock(),
            application_id: None,
            scroll_depth: 0.0,
            buttons_clicked: ButtonClickTally::new(),
            cursor_positions: VecDeque::with_capacity(capacity),
            last_pointer: (0.0, 0.0),
            visibility: Visibility::Visible,
            page_views: 1,
            return_frequency: 0,
            stopped: false,
        }
    }

    /// Restart the session: new start time, one page view, empty tally and sample buffer.
    ///
    /// The bound application id and the last pointer position survive a restart.
    pub fn start(&mut self) {
        self.id = Uuid::new_v4();
        self.started_at_ms = (self.clock)();
        self.scroll_depth = 0.0;
        self.buttons_clicked.clear();
        self.cursor_positions.clear();
        self.visibility = Visibility::Visible;
        self.page_views = 1;
        self.return_frequency = 0;
        self.stopped = false;

        tracing::debug!("Tracking session {} started", self.id);
    }

    /// Bind the application this page view belongs to. 0 is the wire's "unbound" value and clears the binding.
    pub fn bind_application_id(&mut self, id: i64) {
        self.application_id = (id != 0).then_some(id);
    }

    pub fn record_scroll(&mut self, metrics: ScrollMetrics) {
        if self.stopped {
            return;
        }
        if let Some(ratio) = metrics.depth_ratio() {
            self.scroll_depth = self.scroll_depth.max(ratio);
        }
    }

    /// Count a click if it landed on or inside a control. Returns the tallied label.
    pub fn record_click<E: UiElement>(&mut self, target: &E) -> Option<String> {
        if self.stopped {
            return None;
        }
        let label = resolve_button_label(target)?;
        *self.buttons_clicked.entry(label.clone()).or_insert(0) += 1;
        Some(label)
    }

    pub fn record_pointer_move(&mut self, x: f64, y: f64) {
        if self.stopped {
            return;
        }
        self.last_pointer = (x, y);
    }

    /// Append the last known pointer position to the ring buffer.
    pub fn sample_tick(&mut self) {
        if self.stopped {
            return;
        }
        if self.cursor_positions.len() == self.capacity {
            self.cursor_positions.pop_front();
        }
        let (x, y) = self.last_pointer;
        self.cursor_positions.push_back(Sample {
            x,
            y,
            timestamp: (self.clock)(),
        });
    }

    /// Apply a visibility change. Returns true when the page just became hidden.
    pub fn record_visibility(&mut self, visibility: Visibility) -> bool {
        if self.stopped {
            return false;
        }
        let previous = std::mem::replace(&mut self.visibility, visibility);
        match (previous, visibility) {
            (Visibility::Hidden, Visibility::Visible) => {
                self.page_views += 1;
                self.return_frequency += 1;
                false
            }
            (Visibility::Visible, Visibility::Hidden) => true,
            _ => false,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let elapsed_ms = ((self.clock)() - self.started_at_ms).max(0);
        MetricsSnapshot {
            application_id: self.application_id,
            time_on_page_seconds: elapsed_ms as f64 / 1000.0,
            buttons_clicked: self.buttons_clicked.clone(),
            cursor_positions: self.cursor_positions.iter().copied().collect(),
            return_frequency: self.return_frequency,
            page_views: self.page_views,
            scroll_depth: self.scroll_depth,
        }
    }

    /// Tear the session down and return its final snapshot.
    ///
    /// Further `record_*` calls are ignored until the next `start`.
    pub fn stop(&mut self) -> MetricsSnapshot {
        self.stopped = true;
        tracing::debug!(
            "Tracking session {} stopped (samples={}, labels={})",
            self.id,
            self.cursor_positions.len(),
            self.buttons_clicked.len()
        );
        self.snapshot()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn application_id(&self) -> Option<i64> {
        self.application_id
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn page_views(&self) -> u32 {
        self.page_views
    }

    pub fn scroll_depth(&self) -> f64 {
        self.scroll_depth
    }

    pub fn sample_count(&self) -> usize {
        self.cursor_positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::target::Element;
    use std::sync::atomic::{AtomicI64, Ordering};

    // Each test that reads time owns a dedicated clock so tests can run in parallel.
    static DWELL_CLOCK: AtomicI64 = AtomicI64::new(1_700_000_000_000);

    fn dwell_clock() -> i64 {
        DWELL_CLOCK.load(Ordering::SeqCst)
    }

    fn fixed_clock() -> i64 {
        1_700_000_000_000
    }

    fn session() -> TrackingSession {
        TrackingSession::with_clock(&TrackerConfig::default(), fixed_clock)
    }

    fn click(session: &mut TrackingSession, label: &str) {
        session.record_click(&Element::button(label));
    }

    #[test]
    fn test_new_session_defaults() {
        let snapshot = session().snapshot();
        assert_eq!(snapshot.page_views, 1);
        assert_eq!(snapshot.return_frequency, 0);
        assert_eq!(snapshot.scroll_depth, 0.0);
        assert!(snapshot.buttons_clicked.is_empty());
        assert!(snapshot.cursor_positions.is_empty());
        assert_eq!(snapshot.application_id, None);
    }

    #[test]
    fn test_binding_zero_leaves_session_unbound() {
        let mut session = session();
        session.bind_application_id(42);
        assert_eq!(session.application_id(), Some(42));

        session.bind_application_id(0);
        assert_eq!(session.application_id(), None);
        assert_eq!(session.snapshot().application_id, None);
    }

    #[test]
    fn test_click_tally() {
        let mut session = session();
        click(&mut session, "A");
        click(&mut session, "B");
        click(&mut session, "A");

        let tally = session.snapshot().buttons_clicked;
        assert_eq!(tally.len(), 2);
        assert_eq!(tally["A"], 2);
        assert_eq!(tally["B"], 1);
    }

    #[test]
    fn test_click_outside_controls_is_not_counted() {
        let mut session = session();
        let label = session.record_click(&Element::new().with_text("body"));
        assert_eq!(label, None);
        assert!(session.snapshot().buttons_clicked.is_empty());
    }

    #[test]
    fn test_scroll_depth_keeps_maximum() {
        let mut session = session();
        session.record_scroll(ScrollMetrics::new(300.0, 2000.0, 1000.0));
        session.record_scroll(ScrollMetrics::new(800.0, 2000.0, 1000.0));
        session.record_scroll(ScrollMetrics::new(100.0, 2000.0, 1000.0));

        assert_eq!(session.scroll_depth(), 0.8);
    }

    #[test]
    fn test_visibility_transitions() {
        let mut session = session();

        assert!(session.record_visibility(Visibility::Hidden));
        assert_eq!(session.page_views(), 1);

        assert!(!session.record_visibility(Visibility::Visible));
        assert_eq!(session.page_views(), 2);

        // Repeated visible reports are not transitions
        session.record_visibility(Visibility::Visible);
        assert_eq!(session.page_views(), 2);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.return_frequency, 1);
    }

    #[test]
    fn test_sampling_with_constant_pointer() {
        let mut session = session();
        session.record_pointer_move(320.0, 240.0);
        for _ in 0..5 {
            session.sample_tick();
        }

        let samples = session.snapshot().cursor_positions;
        assert_eq!(samples.len(), 5);
        assert!(samples.iter().all(|s| s.x == 320.0 && s.y == 240.0));
    }

    #[test]
    fn test_ring_buffer_keeps_newest() {
        let config = TrackerConfig {
            sample_capacity: 3,
            ..TrackerConfig::default()
        };
        let mut session = TrackingSession::with_clock(&config, fixed_clock);

        for i in 0..5 {
            session.record_pointer_move(i as f64, 0.0);
            session.sample_tick();
        }

        let xs: Vec<f64> = session.snapshot().cursor_positions.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_start_resets_session() {
        let mut session = session();
        session.bind_application_id(42);
        click(&mut session, "Send");
        session.sample_tick();
        session.record_scroll(ScrollMetrics::new(500.0, 2000.0, 1000.0));
        session.record_visibility(Visibility::Hidden);
        session.record_visibility(Visibility::Visible);
        let previous_id = session.id();

        session.start();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.page_views, 1);
        assert_eq!(snapshot.return_frequency, 0);
        assert_eq!(snapshot.scroll_depth, 0.0);
        assert!(snapshot.buttons_clicked.is_empty());
        assert!(snapshot.cursor_positions.is_empty());
        assert_eq!(snapshot.application_id, Some(42));
        assert_ne!(session.id(), previous_id);
    }

    #[test]
    fn test_time_on_page() {
        let mut session = TrackingSession::with_clock(&TrackerConfig::default(), dwell_clock);
        session.start();
        DWELL_CLOCK.fetch_add(2_500, Ordering::SeqCst);

        assert_eq!(session.snapshot().time_on_page_seconds, 2.5);
    }

    #[test]
    fn test_stopped_session_ignores_events() {
        let mut session = session();
        session.record_pointer_move(10.0, 10.0);
        session.sample_tick();

        let final_snapshot = session.stop();
        assert_eq!(final_snapshot.cursor_positions.len(), 1);

        session.sample_tick();
        click(&mut session, "Late");
        session.record_visibility(Visibility::Hidden);

        assert!(session.is_stopped());
        assert_eq!(session.snapshot(), final_snapshot);
    }
}
