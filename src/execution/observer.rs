use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::processing::StageKind;

/// Events emitted by the [`super::QueryEngine`] while running a catalog query.
#[derive(Debug, Clone)]
pub enum QueryEvent {
    RunStarted {
        query: String,
    },
    StageFinished {
        query: &'static str,
        stage: StageKind,
        output_len: usize,
    },
    RunFinished {
        query: &'static str,
        elapsed: Duration,
        output_len: usize,
    },
    RunFailed {
        query: &'static str,
        elapsed: Duration,
        message: String,
    },
}

/// Observer hook for query events.
pub trait QueryObserver: Send + Sync {
    fn on_event(&self, event: &QueryEvent);
}

/// A simple stderr logger for query events.
#[derive(Debug, Default)]
pub struct StdErrQueryObserver;

impl QueryObserver for StdErrQueryObserver {
    fn on_event(&self, event: &QueryEvent) {
        match event {
            QueryEvent::RunStarted { query } => eprintln!("[query][start] {query}"),
            QueryEvent::StageFinished {
                query,
                stage,
                output_len,
            } => eprintln!("[query][stage] {query} {stage} -> {output_len}"),
            QueryEvent::RunFinished {
                query,
                elapsed,
                output_len,
            } => eprintln!(
                "[query][ok] {query} - execution time: {} ms, rows={output_len}",
                elapsed.as_millis()
            ),
            QueryEvent::RunFailed {
                query,
                elapsed,
                message,
            } => eprintln!(
                "[query][fail] {query} - execution time: {} ms, err={message}",
                elapsed.as_millis()
            ),
        }
    }
}

/// Fans events out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn QueryObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn QueryObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl QueryObserver for CompositeObserver {
    fn on_event(&self, event: &QueryEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Cumulative counters across all runs of one engine.
pub struct QueryMetrics {
    runs_started: AtomicU64,
    runs_finished: AtomicU64,
    runs_failed: AtomicU64,
    rows_emitted: AtomicU64,
    last_elapsed_ns: AtomicU64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_finished: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            rows_emitted: AtomicU64::new(0),
            last_elapsed_ns: AtomicU64::new(0),
        }
    }

    pub fn on_run_start(&self) {
        let _ = self.runs_started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_run_finish(&self, elapsed: Duration, rows: usize) {
        let _ = self.runs_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self.rows_emitted.fetch_add(rows as u64, Ordering::SeqCst);
        self.last_elapsed_ns.store(as_nanos(elapsed), Ordering::SeqCst);
    }

    pub fn on_run_fail(&self, elapsed: Duration) {
        let _ = self.runs_failed.fetch_add(1, Ordering::SeqCst);
        self.last_elapsed_ns.store(as_nanos(elapsed), Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> QueryMetricsSnapshot {
        let elapsed_ns = self.last_elapsed_ns.load(Ordering::SeqCst);
        QueryMetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::SeqCst),
            runs_finished: self.runs_finished.load(Ordering::SeqCst),
            runs_failed: self.runs_failed.load(Ordering::SeqCst),
            rows_emitted: self.rows_emitted.load(Ordering::SeqCst),
            last_elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
        }
    }
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn as_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u64::MAX as u128) as u64
}

/// Immutable snapshot of [`QueryMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMetricsSnapshot {
    pub runs_started: u64,
    pub runs_finished: u64,
    pub runs_failed: u64,
    pub rows_emitted: u64,
    pub last_elapsed: Option<Duration>,
}

impl fmt::Display for QueryMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "runs={}/{} failed={} rows_emitted={} last_elapsed={:?}",
            self.runs_finished, self.runs_started, self.runs_failed, self.rows_emitted, self.last_elapsed
        )
    }
}
