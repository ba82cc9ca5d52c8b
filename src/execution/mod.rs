//! Execution engine for running catalog queries against a repository.
//!
//! This module sits "above" [`crate::catalog`] and provides:
//!
//! - Per-run timing (the "execution time" of each query)
//! - Observer hooks for logging run and stage events
//! - Cumulative metrics across runs
//!
//! Queries run one at a time, synchronously, on the caller's thread.

mod observer;

use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{CatalogQuery, QueryOutput};
use crate::error::QueryResult;
use crate::repository::Repository;

pub use observer::{
    CompositeObserver, QueryEvent, QueryMetrics, QueryMetricsSnapshot, QueryObserver,
    StdErrQueryObserver,
};

/// Configuration for the [`QueryEngine`].
#[derive(Clone)]
pub struct EngineOptions {
    /// Optional observer for logging.
    pub observer: Option<Arc<dyn QueryObserver>>,
    /// Emit a [`QueryEvent::StageFinished`] per pipeline stage (in addition to run events).
    pub emit_stage_events: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            observer: None,
            emit_stage_events: true,
        }
    }
}

/// Runs [`CatalogQuery`] values against a [`Repository`].
pub struct QueryEngine<R> {
    repo: R,
    opts: EngineOptions,
    metrics: Arc<QueryMetrics>,
}

impl<R: Repository> QueryEngine<R> {
    /// Create an engine over `repo` with default options.
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, EngineOptions::default())
    }

    /// Create an engine over `repo` with the given options.
    pub fn with_options(repo: R, opts: EngineOptions) -> Self {
        Self {
            repo,
            opts,
            metrics: Arc::new(QueryMetrics::new()),
        }
    }

    /// Attach an observer for query events.
    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.opts.observer = Some(observer);
        self
    }

    /// The repository queries run against.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Get a handle to cumulative metrics.
    pub fn metrics(&self) -> Arc<QueryMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one query.
    pub fn run(&self, query: &CatalogQuery) -> QueryResult<QueryOutput> {
        let name = query.name();
        let start = Instant::now();
        self.metrics.on_run_start();
        self.emit(QueryEvent::RunStarted {
            query: query.to_string(),
        });

        let eval = match query.evaluate(&self.repo) {
            Ok(eval) => eval,
            Err(e) => {
                let elapsed = start.elapsed();
                self.metrics.on_run_fail(elapsed);
                self.emit(QueryEvent::RunFailed {
                    query: name,
                    elapsed,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };
        let elapsed = start.elapsed();

        if self.opts.emit_stage_events {
            for t in &eval.trace {
                self.emit(QueryEvent::StageFinished {
                    query: name,
                    stage: t.kind,
                    output_len: t.output_len,
                });
            }
        }

        let output_len = eval.output.len();
        self.metrics.on_run_finish(elapsed, output_len);
        self.emit(QueryEvent::RunFinished {
            query: name,
            elapsed,
            output_len,
        });
        Ok(eval.output)
    }

    /// Run queries in order, stopping at the first failure.
    pub fn run_all(&self, queries: &[CatalogQuery]) -> QueryResult<Vec<QueryOutput>> {
        queries.iter().map(|q| self.run(q)).collect()
    }

    fn emit(&self, event: QueryEvent) {
        if let Some(obs) = &self.opts.observer {
            obs.on_event(&event);
        }
    }
}
