//! Behavior metrics - engagement tracking and cursor heatmaps for lead forms.
//!
//! The collector samples one page view (cursor, scroll depth, button clicks,
//! dwell time, tab returns) and hands periodic snapshots to a transport. The
//! heatmap module reconstructs where attention concentrated from cursor
//! samples gathered across many viewports.

pub mod collector;
pub mod config;
pub mod heatmap;
pub mod stats;
pub mod transport;

pub use collector::{BehaviorTracker, MetricsSnapshot, TrackingSession};
pub use config::Settings;
pub use heatmap::{HeatmapCanvas, RenderReport};
pub use stats::AggregateStatistics;
pub use transport::{SnapshotTransport, TransportError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
///
/// Honors `RUST_LOG`; defaults to debug output for this crate.
pub fn init_tracing() {
    // try_init: a host may already have installed a subscriber
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "behavior_metrics=debug,behavior_heatmap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
