//! Error counters.
//!
//! [`ErrorSink`] is the seam between the pipeline and wherever counts end
//! up; [`ErrorMetrics`] is the Prometheus implementation.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::error::CollectorResult;
use crate::types::ParsedEvent;

pub const ERRORS_TOTAL: &str = "postgres_errors_total";
pub const ERRORS_BY_SQLSTATE_TOTAL: &str = "postgres_errors_by_sqlstate_query_user_total";
pub const PARSE_FAILURES_TOTAL: &str = "postgres_error_log_parse_failures_total";

const ERRORS_LABELS: [&str; 5] = ["severity", "database", "user", "instance", "server_id"];
const ERRORS_BY_SQLSTATE_LABELS: [&str; 10] = [
    "sqlstate",
    "error_name",
    "sqlstate_class",
    "error_category",
    "severity",
    "database",
    "user",
    "queryid",
    "instance",
    "server_id",
];

/// Destination for classified events and parse failures.
///
/// Every accepted event is recorded exactly once; every structurally
/// malformed line is a single `record_parse_failure`.
pub trait ErrorSink: Send + Sync {
    fn record(&self, event: &ParsedEvent);

    fn record_parse_failure(&self);
}

/// Prometheus counters for one collector.
///
/// Events carrying a SQLSTATE go to `postgres_errors_by_sqlstate_query_user_total`,
/// events without one to `postgres_errors_total`, so each event lands on
/// exactly one label tuple.
#[derive(Clone)]
pub struct ErrorMetrics {
    errors_total: IntCounterVec,
    errors_by_sqlstate: IntCounterVec,
    parse_failures: IntCounter,
}

impl ErrorMetrics {
    /// Build the counters and register them with `registry`, if any.
    ///
    /// Without a registry the counters still count but nothing exports them.
    pub fn new(registry: Option<&Registry>) -> CollectorResult<Self> {
        let errors_total = IntCounterVec::new(
            Opts::new(
                ERRORS_TOTAL,
                "PostgreSQL errors by severity with database, user, and instance tracking",
            ),
            &ERRORS_LABELS,
        )?;
        let errors_by_sqlstate = IntCounterVec::new(
            Opts::new(
                ERRORS_BY_SQLSTATE_TOTAL,
                "PostgreSQL errors by SQLSTATE code with query id and user tracking",
            ),
            &ERRORS_BY_SQLSTATE_LABELS,
        )?;
        let parse_failures = IntCounter::new(PARSE_FAILURES_TOTAL, "Failed to parse log lines")?;

        match registry {
            Some(registry) => {
                registry.register(Box::new(errors_total.clone()))?;
                registry.register(Box::new(errors_by_sqlstate.clone()))?;
                registry.register(Box::new(parse_failures.clone()))?;
            }
            None => {
                tracing::warn!("no Prometheus registry provided, metrics will not be exposed");
            }
        }

        Ok(Self {
            errors_total,
            errors_by_sqlstate,
            parse_failures,
        })
    }

    /// Current parse-failure count.
    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.get()
    }

    /// Current count for `event`'s label tuple.
    pub fn count(&self, event: &ParsedEvent) -> u64 {
        match &event.sql_state {
            Some(_) => self
                .errors_by_sqlstate
                .with_label_values(&sqlstate_labels(event).each_ref().map(String::as_str))
                .get(),
            None => self
                .errors_total
                .with_label_values(&basic_labels(event))
                .get(),
        }
    }
}

impl ErrorSink for ErrorMetrics {
    fn record(&self, event: &ParsedEvent) {
        match &event.sql_state {
            Some(_) => {
                let labels = sqlstate_labels(event);
                self.errors_by_sqlstate
                    .with_label_values(&labels.each_ref().map(String::as_str))
                    .inc();
            }
            None => self.errors_total.with_label_values(&basic_labels(event)).inc(),
        }
    }

    fn record_parse_failure(&self) {
        self.parse_failures.inc();
    }
}

fn basic_labels(event: &ParsedEvent) -> [&str; 5] {
    [
        event.severity.as_str(),
        &event.database,
        &event.user,
        &event.instance_key,
        &event.system_id,
    ]
}

fn sqlstate_labels(event: &ParsedEvent) -> [String; 10] {
    let (code, name, class, category) = match &event.sql_state {
        Some(s) => (s.code.as_str(), s.name, s.class.as_str(), s.category),
        None => ("", "", "", ""),
    };
    [
        code.to_string(),
        name.to_string(),
        class.to_string(),
        category.to_string(),
        event.severity.as_str().to_string(),
        event.database.clone(),
        event.user.clone(),
        event.query_id_label(),
        event.instance_key.clone(),
        event.system_id.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::severity::Severity;
    use crate::types::ParsedLine;

    fn event(sql_state: Option<&str>, query_id: i64) -> ParsedEvent {
        ParsedEvent::new(
            &ParsedLine {
                severity: Severity::Error,
                user: "app-user",
                database: "books_store",
                sql_state,
                query_id,
            },
            "orders_db",
            "sys-1",
        )
    }

    fn labels_of(registry: &Registry, family: &str) -> Vec<HashMap<String, String>> {
        registry
            .gather()
            .into_iter()
            .filter(|mf| mf.get_name() == family)
            .flat_map(|mf| mf.get_metric().to_vec())
            .map(|m| {
                m.get_label()
                    .iter()
                    .map(|l| (l.get_name().to_string(), l.get_value().to_string()))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn sqlstate_event_goes_to_rich_family() {
        let registry = Registry::new();
        let metrics = ErrorMetrics::new(Some(&registry)).unwrap();
        metrics.record(&event(Some("57014"), 5457019535816659310));

        let labels = labels_of(&registry, ERRORS_BY_SQLSTATE_TOTAL);
        assert_eq!(labels.len(), 1);
        let l = &labels[0];
        assert_eq!(l["sqlstate"], "57014");
        assert_eq!(l["error_name"], "query_canceled");
        assert_eq!(l["sqlstate_class"], "57");
        assert_eq!(l["error_category"], "Operator Intervention");
        assert_eq!(l["severity"], "ERROR");
        assert_eq!(l["queryid"], "5457019535816659310");
        assert_eq!(l["instance"], "orders_db");
        assert_eq!(l["server_id"], "sys-1");

        assert!(labels_of(&registry, ERRORS_TOTAL).is_empty());
    }

    #[test]
    fn event_without_sqlstate_goes_to_basic_family() {
        let registry = Registry::new();
        let metrics = ErrorMetrics::new(Some(&registry)).unwrap();
        metrics.record(&event(None, 0));

        let labels = labels_of(&registry, ERRORS_TOTAL);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0]["user"], "app-user");
        assert_eq!(labels[0]["database"], "books_store");
        assert!(labels_of(&registry, ERRORS_BY_SQLSTATE_TOTAL).is_empty());
    }

    #[test]
    fn zero_query_id_is_empty_label() {
        let registry = Registry::new();
        let metrics = ErrorMetrics::new(Some(&registry)).unwrap();
        metrics.record(&event(Some("40P01"), 0));

        let labels = labels_of(&registry, ERRORS_BY_SQLSTATE_TOTAL);
        assert_eq!(labels[0]["queryid"], "");
    }

    #[test]
    fn same_tuple_accumulates() {
        let metrics = ErrorMetrics::new(Some(&Registry::new())).unwrap();
        let e = event(Some("40P01"), 3188095831510673590);
        for _ in 0..3 {
            metrics.record(&e);
        }
        assert_eq!(metrics.count(&e), 3);
        assert_eq!(metrics.count(&event(Some("40P01"), 1)), 0);
    }

    #[test]
    fn parse_failures_count() {
        let registry = Registry::new();
        let metrics = ErrorMetrics::new(Some(&registry)).unwrap();
        metrics.record_parse_failure();
        metrics.record_parse_failure();
        assert_eq!(metrics.parse_failures(), 2);

        let value = registry
            .gather()
            .into_iter()
            .find(|mf| mf.get_name() == PARSE_FAILURES_TOTAL)
            .map(|mf| mf.get_metric()[0].get_counter().get_value())
            .unwrap();
        assert_eq!(value, 2.0);
    }

    #[test]
    fn works_without_registry() {
        let metrics = ErrorMetrics::new(None).unwrap();
        metrics.record_parse_failure();
        assert_eq!(metrics.parse_failures(), 1);
    }

    #[test]
    fn double_registration_fails() {
        let registry = Registry::new();
        ErrorMetrics::new(Some(&registry)).unwrap();
        assert!(ErrorMetrics::new(Some(&registry)).is_err());
    }
}
