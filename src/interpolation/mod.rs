//! Interpolation from a source grid onto target points.
//!
//! An [`Interpolator`] is built once per (source grid, target set) pair and
//! then applied to any number of value fields defined on that grid. The
//! [`InterpolatorCache`] decides when a built interpolator may be reused.

pub mod cache;
pub mod common;
pub mod linear;
pub mod nearest;
pub mod triangulation;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{RegridError, Result};
use crate::grid::{Grid, Points};
use crate::logging::InterpolationObserver;

pub use cache::InterpolatorCache;
pub use linear::Linear;
pub use nearest::NearestNeighbour;

/// Default multiple of the reference spacing a nearest neighbour may be away
pub const DEFAULT_MAX_DISTANCE_FACTOR: f64 = 1.5;

/// Interpolation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Value of the closest source cell
    Nearest,
    /// Barycentric weights on the Delaunay triangulation
    Linear,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Nearest => "nearest",
            Method::Linear => "linear",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RegridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Method::Nearest),
            "linear" => Ok(Method::Linear),
            _ => Err(RegridError::InvalidParameter {
                param: "interpolation".to_string(),
                message: format!("Unknown interpolation method: {}", s),
            }),
        }
    }
}

/// What the linear method does with targets outside the source convex hull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutsideHullPolicy {
    /// Fail the build
    #[default]
    Reject,
    /// Use the value of the nearest source point
    Nearest,
    /// Extend the affine weights of the nearest triangle
    Extrapolate,
}

impl FromStr for OutsideHullPolicy {
    type Err = RegridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(OutsideHullPolicy::Reject),
            "nearest" => Ok(OutsideHullPolicy::Nearest),
            "extrapolate" => Ok(OutsideHullPolicy::Extrapolate),
            _ => Err(RegridError::InvalidParameter {
                param: "outside_hull".to_string(),
                message: format!("Unknown outside-hull policy: {}", s),
            }),
        }
    }
}

/// Tuning knobs shared by both builders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Nearest neighbour sanity limit, in multiples of the reference spacing
    pub max_distance_factor: f64,
    /// Linear method handling of targets outside the convex hull
    pub outside_hull: OutsideHullPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_distance_factor: DEFAULT_MAX_DISTANCE_FACTOR,
            outside_hull: OutsideHullPolicy::default(),
        }
    }
}

/// A built interpolator of either method
#[derive(Debug, Clone)]
pub enum Interpolator {
    Nearest(NearestNeighbour),
    Linear(Linear),
}

impl Interpolator {
    /// Build an interpolator of `method` from `grid` onto `targets`
    pub fn build(
        method: Method,
        targets: &Points,
        grid: &Grid,
        options: &BuildOptions,
        observer: &dyn InterpolationObserver,
    ) -> Result<Self> {
        match method {
            Method::Nearest => {
                NearestNeighbour::new(targets, grid, options, observer).map(Interpolator::Nearest)
            }
            Method::Linear => Linear::new(targets, grid, options, observer).map(Interpolator::Linear),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Interpolator::Nearest(_) => Method::Nearest,
            Interpolator::Linear(_) => Method::Linear,
        }
    }

    /// Same shape and bitwise identical first coordinate as the build grid
    pub fn interpolator_ok(&self, grid: &Grid) -> bool {
        match self {
            Interpolator::Nearest(nn) => nn.interpolator_ok(grid),
            Interpolator::Linear(linear) => linear.interpolator_ok(grid),
        }
    }

    /// Apply to a value field defined on the source grid
    pub fn interpolate(&self, values: ArrayView2<f64>) -> Result<Array1<f64>> {
        match self {
            Interpolator::Nearest(nn) => nn.interpolate(values),
            Interpolator::Linear(linear) => linear.interpolate(values),
        }
    }

    pub fn n_targets(&self) -> usize {
        match self {
            Interpolator::Nearest(nn) => nn.n_targets(),
            Interpolator::Linear(linear) => linear.n_targets(),
        }
    }

    /// Source grid shape recorded at construction
    pub fn grid_shape(&self) -> (usize, usize) {
        match self {
            Interpolator::Nearest(nn) => nn.signature().shape(),
            Interpolator::Linear(linear) => linear.signature().shape(),
        }
    }
}
