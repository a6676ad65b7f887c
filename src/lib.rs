//! # regrid
//!
//! Reusable resampling of scalar fields between two geospatial point sets.
//!
//! A source grid (regular or curvilinear, given as 2-D longitude/latitude
//! arrays) is mapped once onto a set of target points. The resulting index
//! or weight set is then applied to any number of value fields defined on
//! that grid without being recomputed.
//!
//! ## Key Features
//!
//! - **Nearest neighbour**: R-tree lookup with a great-circle sanity check
//! - **Linear**: barycentric weights on a Delaunay triangulation
//! - **Reuse**: a cheap staleness check decides when to rebuild
//! - **Grid rotation**: local angle between a curvilinear grid and true north
//!
//! ## Example
//!
//! ```
//! use ndarray::array;
//! use regrid::{BuildOptions, Grid, InterpolatorCache, Method, Points};
//!
//! let grid = Grid::regular(&[0.0, 1.0], &[0.0, 1.0]);
//! let targets = Points::new(array![0.5], array![0.5]).unwrap();
//! let values = array![[0.0, 1.0], [1.0, 2.0]];
//!
//! let mut cache = InterpolatorCache::new(BuildOptions::default());
//! let result = cache
//!     .interpolate(Method::Linear, &targets, &grid, values.view())
//!     .unwrap();
//! assert!((result[0] - 1.0).abs() < 1e-12);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod geo;
pub mod grid;
pub mod interpolation;
pub mod logging;

pub use batch::{RegridRequest, RegridResponse};
pub use config::Config;
pub use error::{RegridError, Result};
pub use geo::{great_circle_distance, great_circle_distance_array, grid_rotation};
pub use grid::{Grid, Points};
pub use interpolation::{
    BuildOptions, Interpolator, InterpolatorCache, Linear, Method, NearestNeighbour,
    OutsideHullPolicy,
};
pub use logging::{
    init_tracing, log_error, log_timed_operation, InterpolationObserver, NullObserver,
    TracingObserver,
};
