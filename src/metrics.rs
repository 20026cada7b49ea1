//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;
use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Database Metrics
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("taskboard_db_queries_total", "Total number of database queries"),
        &["operation", "table", "outcome"]
    ).expect("metric can be created");
    pub static ref DB_QUERY_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "taskboard_db_query_duration_seconds",
            "Database query duration in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["operation", "table"]
    ).expect("metric can be created");

    // Account Metrics
    pub static ref USERS_REGISTERED_TOTAL: IntCounter = IntCounter::new(
        "taskboard_users_registered_total",
        "Total number of successful registrations"
    ).expect("metric can be created");
    pub static ref LOGINS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("taskboard_logins_total", "Total number of login attempts"),
        &["outcome"]
    ).expect("metric can be created");

    // Task Metrics
    pub static ref TASKS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "taskboard_tasks_created_total",
        "Total number of tasks created"
    ).expect("metric can be created");
    pub static ref TASKS_COMPLETED_TOTAL: IntCounter = IntCounter::new(
        "taskboard_tasks_completed_total",
        "Total number of tasks marked completed"
    ).expect("metric can be created");
    pub static ref TASKS_DELETED_TOTAL: IntCounter = IntCounter::new(
        "taskboard_tasks_deleted_total",
        "Total number of tasks deleted"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("taskboard_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Record one store round trip.
pub fn observe_db_query(operation: &str, table: &str, outcome: &str, elapsed: Duration) {
    DB_QUERIES_TOTAL
        .with_label_values(&[operation, table, outcome])
        .inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(elapsed.as_secs_f64());
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Instruments are registered on the first call; later calls do nothing.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(DB_QUERIES_TOTAL.clone()))
            .expect("DB_QUERIES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
            .expect("DB_QUERY_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(USERS_REGISTERED_TOTAL.clone()))
            .expect("USERS_REGISTERED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(LOGINS_TOTAL.clone()))
            .expect("LOGINS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(TASKS_CREATED_TOTAL.clone()))
            .expect("TASKS_CREATED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(TASKS_COMPLETED_TOTAL.clone()))
            .expect("TASKS_COMPLETED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(TASKS_DELETED_TOTAL.clone()))
            .expect("TASKS_DELETED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_metrics_can_be_called_again() {
        init_metrics();
        init_metrics();

        USERS_REGISTERED_TOTAL.inc();
        let names: Vec<String> = REGISTRY
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"taskboard_users_registered_total".to_string()));
        assert!(names.contains(&"taskboard_tasks_completed_total".to_string()));
    }
}
