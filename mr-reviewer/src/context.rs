//! Per-invocation context.
//!
//! Each invocation gets its own [`InvocationContext`] carrying a request id,
//! the start instant and a [`DiagnosticSink`]. Diagnostics are recorded in the
//! sink and mirrored to `tracing`, so tests can inspect what a run reported
//! without installing a global subscriber.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use chrono::Utc;
use tracing::{Level, debug, error, info, warn};

/// Pipeline stage a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classify,
    Credentials,
    DiffFetch,
    Completion,
    Format,
    Respond,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Classify => "classify",
            Stage::Credentials => "credentials",
            Stage::DiffFetch => "diff_fetch",
            Stage::Completion => "completion",
            Stage::Format => "format",
            Stage::Respond => "respond",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub level: Level,
    pub message: String,
}

/// Ordered record of what one invocation reported.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.stage == stage)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.level == Level::ERROR)
    }

    fn push(&mut self, request_id: &str, stage: Stage, level: Level, message: String) {
        match level {
            Level::ERROR => error!(request_id, %stage, "{message}"),
            Level::WARN => warn!(request_id, %stage, "{message}"),
            Level::INFO => info!(request_id, %stage, "{message}"),
            _ => debug!(request_id, %stage, "{message}"),
        }
        self.entries.push(Diagnostic {
            stage,
            level,
            message,
        });
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// State owned by one invocation and dropped with it.
#[derive(Debug)]
pub struct InvocationContext {
    request_id: String,
    started: Instant,
    sink: DiagnosticSink,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            started: Instant::now(),
            sink: DiagnosticSink::default(),
        }
    }

    /// Context with a locally unique id (`inv-<unix micros>-<seq>`).
    pub fn generate() -> Self {
        let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self::new(format!("inv-{}-{seq}", Utc::now().timestamp_micros()))
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    pub fn record(&mut self, stage: Stage, level: Level, message: impl Into<String>) {
        self.sink
            .push(&self.request_id, stage, level, message.into());
    }

    pub fn debug(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, Level::DEBUG, message);
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, Level::INFO, message);
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, Level::WARN, message);
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(stage, Level::ERROR, message);
    }
}
