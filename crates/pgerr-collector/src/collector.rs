//! The error-log collector.
//!
//! A [`Pipeline`] turns one raw line into at most one counter increment.
//! [`ErrorLogs`] owns the lifecycle: a single consumer task draining the
//! [`LogsReceiver`] until it is cancelled.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use prometheus::Registry;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::continuation::is_continuation_line;
use crate::error::{CollectorError, CollectorResult, ParseError};
use crate::metrics::{ErrorMetrics, ErrorSink};
use crate::normalize::normalize;
use crate::parsers;
use crate::receiver::LogsReceiver;
use crate::types::{LineFormat, LineOutcome, LogEntry, ParseOutcome, ParsedEvent, SkipReason};

pub const COLLECTOR_NAME: &str = "error_logs";

/// Bytes of an offending line kept in warning logs.
const PREVIEW_LEN: usize = 100;

// ── Pipeline ──────────────────────────────────────────────────

/// Normalize → drop continuations → parse → classify → record.
pub struct Pipeline {
    format: LineFormat,
    instance_key: String,
    system_id: String,
    sink: Arc<dyn ErrorSink>,
}

impl Pipeline {
    pub fn new(
        format: LineFormat,
        instance_key: impl Into<String>,
        system_id: impl Into<String>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            format,
            instance_key: instance_key.into(),
            system_id: system_id.into(),
            sink,
        }
    }

    pub fn format(&self) -> LineFormat {
        self.format
    }

    /// Process one raw line.
    ///
    /// Structural failures are recorded on the sink before being returned;
    /// skips record nothing.
    pub fn process_line(&self, raw: &str) -> Result<LineOutcome, ParseError> {
        let line = normalize(raw);

        if is_continuation_line(&line) {
            return Ok(LineOutcome::Skipped(SkipReason::Continuation));
        }

        match parsers::parse_line(&line, self.format) {
            Ok(ParseOutcome::Parsed(parsed)) => {
                let event = ParsedEvent::new(&parsed, &self.instance_key, &self.system_id);
                self.sink.record(&event);
                Ok(LineOutcome::Recorded)
            }
            Ok(ParseOutcome::Skipped(reason)) => Ok(LineOutcome::Skipped(reason)),
            Err(e) => {
                self.sink.record_parse_failure();
                Err(e)
            }
        }
    }

    fn handle(&self, entry: &LogEntry) {
        match self.process_line(&entry.line) {
            Ok(LineOutcome::Recorded) => {}
            Ok(LineOutcome::Skipped(reason)) => {
                tracing::trace!(reason = %reason, "log line skipped");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    received_at = %entry.timestamp.to_rfc3339(),
                    line_preview = %truncate_preview(&entry.line, PREVIEW_LEN),
                    "failed to process log line"
                );
            }
        }
    }
}

/// Cut `s` to at most `max` bytes on a char boundary, marking the cut.
pub(crate) fn truncate_preview(s: &str, max: usize) -> Cow<'_, str> {
    if s.len() <= max {
        return Cow::Borrowed(s);
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &s[..end]))
}

// ── Collector ─────────────────────────────────────────────────

/// Construction arguments for [`ErrorLogs`].
pub struct ErrorLogsArguments {
    pub receiver: LogsReceiver,
    pub instance_key: String,
    /// Server identifier label; empty when unknown.
    pub system_id: String,
    pub format: LineFormat,
    /// Registry the counters are exported through. `None` keeps them private.
    pub registry: Option<Registry>,
}

/// Lifecycle state. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Created,
    Running,
    Stopped,
}

/// Consumes PostgreSQL error-log lines and counts the errors in them.
pub struct ErrorLogs {
    pipeline: Arc<Pipeline>,
    metrics: ErrorMetrics,
    receiver: LogsReceiver,
    state: Mutex<CollectorState>,
    task: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    /// Cancelled once no consumer task is, or ever will be, running.
    finished: CancellationToken,
}

impl ErrorLogs {
    pub fn new(args: ErrorLogsArguments) -> CollectorResult<Self> {
        let metrics = ErrorMetrics::new(args.registry.as_ref())?;
        let pipeline = Pipeline::new(
            args.format,
            args.instance_key,
            args.system_id,
            Arc::new(metrics.clone()),
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            metrics,
            receiver: args.receiver,
            state: Mutex::new(CollectorState::Created),
            task: Mutex::new(None),
            cancel: CancellationToken::new(),
            finished: CancellationToken::new(),
        })
    }

    pub fn name(&self) -> &'static str {
        COLLECTOR_NAME
    }

    /// Where log shippers forward lines.
    pub fn receiver(&self) -> &LogsReceiver {
        &self.receiver
    }

    pub fn sender(&self) -> mpsc::Sender<LogEntry> {
        self.receiver.sender()
    }

    pub fn metrics(&self) -> &ErrorMetrics {
        &self.metrics
    }

    pub fn state(&self) -> CollectorState {
        *self.lock_state()
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == CollectorState::Stopped
    }

    /// Spawn the consumer task on the current tokio runtime.
    ///
    /// Only valid from `Created`; a stopped collector cannot be restarted.
    pub fn start(&self) -> CollectorResult<()> {
        let mut state = self.lock_state();
        match *state {
            CollectorState::Created => {}
            CollectorState::Running => return Err(CollectorError::AlreadyStarted),
            CollectorState::Stopped => return Err(CollectorError::Stopped),
        }

        let runtime = tokio::runtime::Handle::try_current()?;
        let rx = self.receiver.take().ok_or(CollectorError::ReceiverTaken)?;

        let span = tracing::debug_span!(
            "collector",
            collector = COLLECTOR_NAME,
            format = %self.pipeline.format(),
        );
        let handle = runtime.spawn(
            run(
                self.pipeline.clone(),
                rx,
                self.cancel.clone(),
                self.finished.clone(),
            )
            .instrument(span),
        );

        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        *state = CollectorState::Running;
        tracing::debug!(collector = COLLECTOR_NAME, "collector started");
        Ok(())
    }

    /// Cancel the consumer task and wait for it to exit.
    ///
    /// Idempotent, and safe before `start` (the collector simply becomes
    /// stopped). Every caller returns only once no task is running.
    pub async fn stop(&self) {
        let handle = {
            let mut state = self.lock_state();
            if *state == CollectorState::Created {
                self.finished.cancel();
            }
            *state = CollectorState::Stopped;
            self.task
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
        };

        self.cancel.cancel();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, collector = COLLECTOR_NAME, "consumer task failed");
            }
        }
        self.finished.cancelled().await;
    }

    fn lock_state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ErrorLogs {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    pipeline: Arc<Pipeline>,
    mut rx: mpsc::Receiver<LogEntry>,
    cancel: CancellationToken,
    finished: CancellationToken,
) {
    let _finished = finished.drop_guard();
    tracing::debug!("collector running, waiting for log entries");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("collector stopping");
                return;
            }
            entry = rx.recv() => match entry {
                Some(entry) => pipeline.handle(&entry),
                None => {
                    tracing::debug!("log receiver closed, waiting for stop");
                    cancel.cancelled().await;
                    return;
                }
            },
        }
    }
}
