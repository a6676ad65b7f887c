//! Logging utilities for regrid.
//!
//! The numeric core never logs through a global facade directly. Builders
//! receive an [`InterpolationObserver`] and report construction and reuse
//! through it. [`TracingObserver`] turns those reports into structured
//! `tracing` events; [`NullObserver`] drops them.

use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::interpolation::Method;

/// Receives notifications about interpolator construction and reuse
pub trait InterpolationObserver: Send + Sync {
    /// Index or weight construction is about to start
    fn build_started(&self, method: Method, n_targets: usize, n_source: usize);

    /// Index or weight construction finished
    fn build_finished(&self, method: Method, n_targets: usize, elapsed: Duration);

    /// A previously built interpolator was reused for a new request
    fn reused(&self, method: Method, shape: (usize, usize));
}

/// Observer emitting structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl InterpolationObserver for TracingObserver {
    fn build_started(&self, method: Method, n_targets: usize, n_source: usize) {
        info!(
            operation = "interpolator_build",
            method = %method,
            n_targets = n_targets,
            n_source = n_source,
            "Building interpolator"
        );
    }

    fn build_finished(&self, method: Method, n_targets: usize, elapsed: Duration) {
        debug!(
            operation = "interpolator_build",
            method = %method,
            n_targets = n_targets,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "Interpolator built"
        );
    }

    fn reused(&self, method: Method, shape: (usize, usize)) {
        info!(
            operation = "interpolator_reuse",
            method = %method,
            nx = shape.0,
            ny = shape.1,
            "Reusing interpolator, grid shape and first point unchanged"
        );
    }
}

/// Observer that discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl InterpolationObserver for NullObserver {
    fn build_started(&self, _method: Method, _n_targets: usize, _n_source: usize) {}

    fn build_finished(&self, _method: Method, _n_targets: usize, _elapsed: Duration) {}

    fn reused(&self, _method: Method, _shape: (usize, usize)) {}
}

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let operation_id = Uuid::new_v4();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        operation_id = %operation_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log an error with context
pub fn log_error(error: &crate::error::RegridError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}
