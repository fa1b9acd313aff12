//! Engagement collection
//!
//! Tracks one page view: cursor samples on a fixed cadence, maximum scroll
//! depth, button clicks, dwell time and returns to the tab. Snapshots are
//! handed to a [`crate::transport::SnapshotTransport`].

pub mod channel;
pub mod session;
pub mod target;
pub mod types;

pub use channel::BehaviorTracker;
pub use session::TrackingSession;
pub use target::{Element, UiElement};
pub use types::{ButtonClickTally, MetricsSnapshot, Sample, ScrollMetrics, Visibility};
