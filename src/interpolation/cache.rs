//! Reuse of built interpolators across requests.
//!
//! Building an interpolator is the expensive step; applying it is linear in
//! the number of target points. [`InterpolatorCache`] keeps the last built
//! interpolator and rebuilds only when a request no longer fits it.

use ndarray::{Array1, ArrayView2};

use super::{BuildOptions, Interpolator, Method};
use crate::error::Result;
use crate::grid::{Grid, Points};
use crate::logging::{InterpolationObserver, TracingObserver};

/// Holds at most one interpolator and rebuilds it when it goes stale
pub struct InterpolatorCache {
    options: BuildOptions,
    observer: Box<dyn InterpolationObserver>,
    current: Option<Interpolator>,
}

impl InterpolatorCache {
    /// Create an empty cache reporting through `tracing`
    pub fn new(options: BuildOptions) -> Self {
        Self::with_observer(options, Box::new(TracingObserver))
    }

    /// Create an empty cache reporting through `observer`
    pub fn with_observer(options: BuildOptions, observer: Box<dyn InterpolationObserver>) -> Self {
        Self {
            options,
            observer,
            current: None,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The interpolator currently held, if any
    pub fn current(&self) -> Option<&Interpolator> {
        self.current.as_ref()
    }

    /// Drop the held interpolator
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Return an interpolator for this request, building one if needed.
    ///
    /// The held interpolator is reused when it has the requested method,
    /// the same number of targets, and passes `interpolator_ok` for `grid`.
    /// A failed build leaves the cache empty.
    pub fn get_or_build(
        &mut self,
        method: Method,
        targets: &Points,
        grid: &Grid,
    ) -> Result<&Interpolator> {
        let interpolator = match self.current.take() {
            Some(existing) if is_reusable(&existing, method, targets, grid) => {
                self.observer.reused(method, grid.shape());
                existing
            }
            _ => Interpolator::build(method, targets, grid, &self.options, self.observer.as_ref())?,
        };
        let interpolator: &Interpolator = self.current.insert(interpolator);
        Ok(interpolator)
    }

    /// Resample `values` from `grid` onto `targets`, reusing when possible
    pub fn interpolate(
        &mut self,
        method: Method,
        targets: &Points,
        grid: &Grid,
        values: ArrayView2<f64>,
    ) -> Result<Array1<f64>> {
        self.get_or_build(method, targets, grid)?.interpolate(values)
    }
}

fn is_reusable(existing: &Interpolator, method: Method, targets: &Points, grid: &Grid) -> bool {
    existing.method() == method
        && existing.n_targets() == targets.len()
        && existing.interpolator_ok(grid)
}
