//! Shared test harness for E2E integration tests.
//!
//! Runs a real `ErrorLogs` collector against a per-test Prometheus
//! registry, feeding lines through its channel and reading counters back
//! through `Registry::gather()` or the agent's `/metrics` route.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use prometheus::Registry;
use tower::ServiceExt;

use pgerr_agent::routes::build_router;
use pgerr_collector::metrics::{ERRORS_BY_SQLSTATE_TOTAL, ERRORS_TOTAL};
use pgerr_collector::{ErrorLogs, ErrorLogsArguments, LineFormat, LogEntry, LogsReceiver};

/// User/database of drain sentinel events; filtered out of every sample.
const DRAIN_USER: &str = "__drain__";
const PIPE_SENTINEL: &str =
    "ts|__drain__|__drain__|[local]|0|0|XX000|s|0/0|0|c|idle|0|harness|0|ERROR:  drain";
const RDS_SENTINEL: &str =
    "ts:10.0.0.1:5432:__drain__@__drain__:[0]:0:XX000:s:0/0:0:c::harnessERROR:  drain";

/// Label set of one counter, plus its value.
#[derive(Debug, Clone)]
pub struct Sample {
    pub labels: HashMap<String, String>,
    pub value: f64,
}

/// End-to-end harness: running collector + its registry.
pub struct TestHarness {
    pub registry: Registry,
    pub collector: ErrorLogs,
    format: LineFormat,
    drains: AtomicU64,
}

impl TestHarness {
    /// Start a pipe-layout collector labelled `test-instance` / `test-system`.
    pub fn pipe() -> Self {
        Self::start(LineFormat::Pipe, "test-instance", "test-system")
    }

    /// Start an RDS-layout collector labelled `test-instance` / `test-system`.
    pub fn rds() -> Self {
        Self::start(LineFormat::Rds, "test-instance", "test-system")
    }

    pub fn start(format: LineFormat, instance_key: &str, system_id: &str) -> Self {
        let registry = Registry::new();
        let collector = ErrorLogs::new(ErrorLogsArguments {
            receiver: LogsReceiver::new(100),
            instance_key: instance_key.to_string(),
            system_id: system_id.to_string(),
            format,
            registry: Some(registry.clone()),
        })
        .unwrap();
        collector.start().unwrap();
        Self {
            registry,
            collector,
            format,
            drains: AtomicU64::new(0),
        }
    }

    /// Forward one raw line to the collector.
    pub async fn send(&self, line: &str) {
        self.collector
            .receiver()
            .send(LogEntry::new(line))
            .await
            .unwrap();
    }

    /// Forward `lines` and wait until all of them have been processed.
    pub async fn send_and_drain(&self, lines: &[&str]) {
        for line in lines {
            self.send(line).await;
        }
        self.drain().await;
    }

    /// Wait until everything sent so far has been processed.
    ///
    /// Lines are handled in order, so once the sentinel event is counted
    /// every line before it is done.
    pub async fn drain(&self) {
        let sentinel = match self.format {
            LineFormat::Pipe => PIPE_SENTINEL,
            LineFormat::Rds => RDS_SENTINEL,
        };
        let target = self.drains.fetch_add(1, Ordering::SeqCst) as f64 + 1.0;
        self.send(sentinel).await;
        self.wait_until(|| self.drain_count() >= target).await;
    }

    fn drain_count(&self) -> f64 {
        self.all_samples(ERRORS_BY_SQLSTATE_TOTAL)
            .into_iter()
            .chain(self.all_samples(ERRORS_TOTAL))
            .filter(|s| s.labels.get("user").map(String::as_str) == Some(DRAIN_USER))
            .map(|s| s.value)
            .sum()
    }

    pub async fn wait_until(&self, mut cond: impl FnMut() -> bool) {
        for _ in 0..400 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within 2s");
    }

    pub fn parse_failures(&self) -> u64 {
        self.collector.metrics().parse_failures()
    }

    /// Samples of `family`, without drain sentinels.
    pub fn samples(&self, family: &str) -> Vec<Sample> {
        self.all_samples(family)
            .into_iter()
            .filter(|s| s.labels.get("user").map(String::as_str) != Some(DRAIN_USER))
            .collect()
    }

    fn all_samples(&self, family: &str) -> Vec<Sample> {
        self.registry
            .gather()
            .into_iter()
            .filter(|mf| mf.get_name() == family)
            .flat_map(|mf| mf.get_metric().to_vec())
            .map(|m| Sample {
                labels: m
                    .get_label()
                    .iter()
                    .map(|l| (l.get_name().to_string(), l.get_value().to_string()))
                    .collect(),
                value: m.get_counter().get_value(),
            })
            .collect()
    }

    pub fn sqlstate_samples(&self) -> Vec<Sample> {
        self.samples(ERRORS_BY_SQLSTATE_TOTAL)
    }

    pub fn basic_samples(&self) -> Vec<Sample> {
        self.samples(ERRORS_TOTAL)
    }

    /// Sum over both event families.
    pub fn total_events(&self) -> f64 {
        self.sqlstate_samples()
            .iter()
            .chain(self.basic_samples().iter())
            .map(|s| s.value)
            .sum()
    }

    /// GET /metrics through the agent router.
    pub async fn scrape(&self) -> (StatusCode, String) {
        let response = build_router(self.registry.clone())
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn stop(&self) {
        self.collector.stop().await;
    }
}
