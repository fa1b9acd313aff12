use crate::collector::session::{Clock, TrackingSession};
use crate::collector::target::UiElement;
use crate::collector::types::{MetricsSnapshot, ScrollMetrics, Visibility};
use crate::config::TrackerConfig;
use crate::transport::{SnapshotTransport, WireSnapshot};
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Runs a `TrackingSession` against a transport.
///
/// Host event handlers call the `on_*` methods; the tracker owns the sampling
/// timer, the optional flush timer, and the final flush on teardown.
/// `start` must be called from within a tokio runtime.
pub struct BehaviorTracker {
    config: TrackerConfig,
    session: Arc<ParkingMutex<TrackingSession>>,
    transport: Arc<dyn SnapshotTransport>,
    is_tracking: Arc<AtomicBool>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl BehaviorTracker {
    pub fn new(config: TrackerConfig, transport: Arc<dyn SnapshotTransport>) -> Self {
        let session = TrackingSession::new(&config);
        Self::with_session(config, transport, session)
    }

    pub fn with_clock(
        config: TrackerConfig,
        transport: Arc<dyn SnapshotTransport>,
        clock: Clock,
    ) -> Self {
        let session = TrackingSession::with_clock(&config, clock);
        Self::with_session(config, transport, session)
    }

    fn with_session(
        config: TrackerConfig,
        transport: Arc<dyn SnapshotTransport>,
        session: TrackingSession,
    ) -> Self {
        Self {
            config,
            session: Arc::new(ParkingMutex::new(session)),
            transport,
            is_tracking: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Start (or restart) tracking.
    ///
    /// A restart resets the session counters but keeps the running timers.
    pub fn start(&mut self) {
        self.session.lock().start();

        if self.is_tracking.load(Ordering::SeqCst) {
            tracing::info!("Behavior tracking restarted");
            return;
        }

        self.cancel = CancellationToken::new();

        self.tasks.push(tokio::spawn(sampling_loop(
            self.session.clone(),
            self.config.sample_interval(),
            self.cancel.clone(),
        )));

        if let Some(period) = self.config.flush_interval() {
            self.tasks.push(tokio::spawn(flush_loop(
                self.session.clone(),
                self.transport.clone(),
                period,
                self.config.flush_without_application_id,
                self.cancel.clone(),
            )));
        }

        self.is_tracking.store(true, Ordering::SeqCst);

        tracing::info!(
            "Behavior tracking started (sample_interval={:?}, flush_interval={:?}, capacity={})",
            self.config.sample_interval(),
            self.config.flush_interval(),
            self.config.sample_capacity
        );
    }

    pub fn bind_application_id(&self, id: i64) {
        self.session.lock().bind_application_id(id);
        tracing::debug!("Behavior metrics bound to application {}", id);
    }

    pub fn on_scroll(&self, metrics: ScrollMetrics) {
        self.session.lock().record_scroll(metrics);
    }

    pub fn on_click<E: UiElement>(&self, target: &E) -> Option<String> {
        self.session.lock().record_click(target)
    }

    pub fn on_pointer_move(&self, x: f64, y: f64) {
        self.session.lock().record_pointer_move(x, y);
    }

    /// Apply a visibility change; the page becoming hidden triggers a flush.
    pub async fn on_visibility_change(&self, visibility: Visibility) {
        let became_hidden = self.session.lock().record_visibility(visibility);
        if became_hidden {
            self.flush().await;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.session.lock().snapshot()
    }

    /// Deliver the current snapshot. Returns whether the transport accepted it.
    pub async fn flush(&self) -> bool {
        let snapshot = self.session.lock().snapshot();
        deliver(
            self.transport.as_ref(),
            snapshot,
            self.config.flush_without_application_id,
        )
        .await
    }

    /// Cancel the timers, wait for them to exit, then send the final snapshot.
    pub async fn stop(&mut self) {
        if !self.is_tracking.swap(false, Ordering::SeqCst) {
            return;
        }

        self.cancel.cancel();
        for handle in self.tasks.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("Behavior tracking task ended abnormally: {}", e);
            }
        }

        let snapshot = self.session.lock().stop();
        let samples = snapshot.cursor_positions.len();
        deliver(
            self.transport.as_ref(),
            snapshot,
            self.config.flush_without_application_id,
        )
        .await;

        tracing::info!("Behavior tracking stopped (samples={})", samples);
    }

    pub fn is_tracking(&self) -> bool {
        self.is_tracking.load(Ordering::SeqCst)
    }
}

impl Drop for BehaviorTracker {
    /// A tracker dropped while running still hands its final snapshot to the transport.
    fn drop(&mut self) {
        self.cancel.cancel();
        if !self.is_tracking.swap(false, Ordering::SeqCst) {
            return;
        }

        let snapshot = self.session.lock().stop();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let transport = self.transport.clone();
                let allow_unbound = self.config.flush_without_application_id;
                handle.spawn(async move {
                    deliver(transport.as_ref(), snapshot, allow_unbound).await;
                });
                tracing::info!("Behavior tracker dropped while running; final snapshot scheduled");
            }
            Err(_) => {
                tracing::warn!("Behavior tracker dropped outside a tokio runtime; final snapshot lost");
            }
        }
    }
}

async fn sampling_loop(
    session: Arc<ParkingMutex<TrackingSession>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => session.lock().sample_tick(),
        }
    }
}

async fn flush_loop(
    session: Arc<ParkingMutex<TrackingSession>>,
    transport: Arc<dyn SnapshotTransport>,
    period: Duration,
    allow_unbound: bool,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let snapshot = session.lock().snapshot();
                deliver(transport.as_ref(), snapshot, allow_unbound).await;
            }
        }
    }
}

/// Encode and hand a snapshot to the transport. Failures are logged, never returned.
async fn deliver(
    transport: &dyn SnapshotTransport,
    snapshot: MetricsSnapshot,
    allow_unbound: bool,
) -> bool {
    if snapshot.application_id.is_none() && !allow_unbound {
        tracing::debug!("Skipping behavior metrics flush: no application id bound");
        return false;
    }

    let payload = match WireSnapshot::encode(&snapshot) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Failed to encode behavior metrics: {}", e);
            return false;
        }
    };

    match transport.deliver(&payload).await {
        Ok(()) => {
            tracing::debug!(
                "Behavior metrics delivered (application_id={}, samples={}, page_views={})",
                payload.application_id,
                snapshot.cursor_positions.len(),
                payload.page_views
            );
            true
        }
        Err(e) => {
            tracing::warn!("Failed to send behavior metrics: {}", e);
            false
        }
    }
}
