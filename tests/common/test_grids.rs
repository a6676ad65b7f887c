//! Test grid generation utilities.
//!
//! Builders for source grids, target sets and value fields with known
//! patterns, so interpolated results can be checked analytically.

#![allow(dead_code)]

use ndarray::Array2;
use regrid::{Grid, Points};

/// Evenly spaced axis of `n` values starting at `start`
pub fn axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Regular lon/lat grid over a mid-latitude domain
pub fn regular_grid(nx: usize, ny: usize, step: f64) -> Grid {
    Grid::regular(&axis(5.0, step, nx), &axis(55.0, step, ny))
}

/// Curvilinear grid: a regular grid sheared and slightly rotated
pub fn curvilinear_grid(nx: usize, ny: usize) -> Grid {
    let (angle_sin, angle_cos) = 0.2_f64.sin_cos();
    let lons = Array2::from_shape_fn((nx, ny), |(i, j)| {
        let (x, y) = (0.1 * i as f64, 0.1 * j as f64);
        10.0 + x * angle_cos - y * angle_sin + 0.002 * (i * j) as f64
    });
    let lats = Array2::from_shape_fn((nx, ny), |(i, j)| {
        let (x, y) = (0.1 * i as f64, 0.1 * j as f64);
        60.0 + x * angle_sin + y * angle_cos
    });
    Grid::new(lons, lats).expect("coordinate arrays share a shape")
}

/// Field that is linear in lon and lat, reproduced exactly by barycentric weights
pub fn plane_field(grid: &Grid) -> Array2<f64> {
    grid.lons().mapv(|lon| 3.0 * lon) + grid.lats().mapv(|lat| -2.0 * lat) + 7.0
}

/// Value of [`plane_field`] at one point
pub fn plane_value(lon: f64, lat: f64) -> f64 {
    3.0 * lon - 2.0 * lat + 7.0
}

/// Scattered targets strictly inside the bounding box of a regular grid
pub fn interior_points(grid: &Grid, n: usize) -> Points {
    let (nx, ny) = grid.shape();
    let lon0 = grid.lons()[[0, 0]];
    let lon1 = grid.lons()[[nx - 1, 0]];
    let lat0 = grid.lats()[[0, 0]];
    let lat1 = grid.lats()[[0, ny - 1]];

    // Deterministic low-discrepancy sequence
    let mut lons = Vec::with_capacity(n);
    let mut lats = Vec::with_capacity(n);
    for k in 0..n {
        let u = (0.5 + k as f64 * 0.618_033_988_75).fract();
        let v = (0.5 + k as f64 * 0.754_877_666_25).fract();
        lons.push(lon0 + (0.02 + 0.96 * u) * (lon1 - lon0));
        lats.push(lat0 + (0.02 + 0.96 * v) * (lat1 - lat0));
    }
    Points::new(lons.into(), lats.into()).expect("equal lengths")
}
