use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free counters shared by the accept loop and every session task.
#[derive(Debug, Clone)]
pub struct ServerStats {
    inner: Arc<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    connections_accepted: AtomicU64,
    sessions_started: AtomicU64,
    sessions_completed: AtomicU64,
    sessions_aborted: AtomicU64,
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatsInner::default()),
        }
    }

    pub fn record_connection(&self) {
        self.inner
            .connections_accepted
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a new session and returns its zero-based ordinal.
    pub fn record_session_start(&self) -> u64 {
        let ordinal = self.inner.sessions_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(sessions_started = ordinal + 1, "session count increased");
        ordinal
    }

    pub fn record_session_complete(&self) {
        self.inner.sessions_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_abort(&self) {
        self.inner.sessions_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connections_accepted: self.inner.connections_accepted.load(Ordering::Relaxed),
            sessions_started: self.inner.sessions_started.load(Ordering::Relaxed),
            sessions_completed: self.inner.sessions_completed.load(Ordering::Relaxed),
            sessions_aborted: self.inner.sessions_aborted.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            connections_accepted = snapshot.connections_accepted,
            sessions_started = snapshot.sessions_started,
            sessions_completed = snapshot.sessions_completed,
            sessions_aborted = snapshot.sessions_aborted,
            "server stats"
        );
    }
}

/// Counters at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub connections_accepted: u64,
    pub sessions_started: u64,
    pub sessions_completed: u64,
    pub sessions_aborted: u64,
}

impl StatsSnapshot {
    /// Sessions that have started but not yet finished either way.
    pub fn sessions_active(&self) -> u64 {
        self.sessions_started
            .saturating_sub(self.sessions_completed + self.sessions_aborted)
    }
}
