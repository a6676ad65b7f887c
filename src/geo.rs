//! Spherical geometry helpers.
//!
//! Great-circle distances back the sanity checks of the interpolators, and
//! [`grid_rotation`] estimates how far a curvilinear grid is turned away
//! from true north.

use ndarray::{Array, Array2, ArrayView, Dimension, Zip};

use crate::error::{RegridError, Result};
use crate::grid::Grid;
use crate::logging::log_timed_operation;

/// Earth radius used by the haversine formula, in meters
pub const EARTH_RADIUS_M: f64 = 6.367e6;

/// Great-circle distance in meters between two (lon, lat) points in degrees.
///
/// Uses the haversine formula. NaN inputs produce NaN.
pub fn great_circle_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlon = lon2.to_radians() - lon1.to_radians();
    let dlat = lat2 - lat1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_M
}

/// Element-wise great-circle distance over arrays of equal shape
pub fn great_circle_distance_array<D: Dimension>(
    lon1: ArrayView<f64, D>,
    lat1: ArrayView<f64, D>,
    lon2: ArrayView<f64, D>,
    lat2: ArrayView<f64, D>,
) -> Result<Array<f64, D>> {
    for other in [lat1.shape(), lon2.shape(), lat2.shape()] {
        if other != lon1.shape() {
            return Err(RegridError::ShapeMismatch {
                expected: lon1.shape().to_vec(),
                actual: other.to_vec(),
            });
        }
    }

    Ok(Zip::from(&lon1)
        .and(&lat1)
        .and(&lon2)
        .and(&lat2)
        .map_collect(|&a, &b, &c, &d| great_circle_distance(a, b, c, d)))
}

/// Estimate the local grid rotation angle in degrees for every cell.
///
/// For each cell the zonal and meridional distance to the next cell along
/// the first axis are measured; the last row reuses its previous neighbour.
/// The angle is `atan2(zonal, meridional)` in degrees, minus 90.
pub fn grid_rotation(grid: &Grid) -> Array2<f64> {
    log_timed_operation("grid_rotation", || {
        let (nx, _) = grid.shape();
        let lons = grid.lons();
        let lats = grid.lats();

        Array2::from_shape_fn(grid.shape(), |(i, j)| {
            let (i1, i2) = if nx < 2 {
                (i, i)
            } else if i + 1 == nx {
                (i - 1, i)
            } else {
                (i, i + 1)
            };

            let lon = lons[[i1, j]];
            let lat = lats[[i1, j]];
            let zonal = great_circle_distance(lon, lat, lons[[i2, j]], lat);
            let meridional = great_circle_distance(lon, lat, lon, lats[[i2, j]]);

            zonal.atan2(meridional).to_degrees() - 90.0
        })
    })
}
