//! Source grids and target point sets.
//!
//! A [`Grid`] is a structured, possibly curvilinear mesh given as two 2-D
//! coordinate arrays of identical shape. [`Points`] is an arbitrary set of
//! query locations. All coordinates are in degrees.

use ndarray::{Array1, Array2};
use serde::Deserialize;

use crate::error::{RegridError, Result};

/// A structured source grid of shape (nx, ny)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    lons: Array2<f64>,
    lats: Array2<f64>,
}

#[derive(Deserialize)]
struct RawGrid {
    lons: Vec<Vec<f64>>,
    lats: Vec<Vec<f64>>,
}

impl Grid {
    /// Create a grid, checking that both coordinate arrays share a shape
    pub fn new(lons: Array2<f64>, lats: Array2<f64>) -> Result<Self> {
        if lons.shape() != lats.shape() {
            return Err(RegridError::ShapeMismatch {
                expected: lons.shape().to_vec(),
                actual: lats.shape().to_vec(),
            });
        }
        Ok(Self { lons, lats })
    }

    /// Build a regular grid from 1-D longitude and latitude axes.
    ///
    /// The first axis of the result follows `lons`, the second `lats`.
    pub fn regular(lon_axis: &[f64], lat_axis: &[f64]) -> Self {
        let shape = (lon_axis.len(), lat_axis.len());
        let lons = Array2::from_shape_fn(shape, |(i, _)| lon_axis[i]);
        let lats = Array2::from_shape_fn(shape, |(_, j)| lat_axis[j]);
        Self { lons, lats }
    }

    pub fn lons(&self) -> &Array2<f64> {
        &self.lons
    }

    pub fn lats(&self) -> &Array2<f64> {
        &self.lats
    }

    /// Grid shape as (nx, ny)
    pub fn shape(&self) -> (usize, usize) {
        self.lons.dim()
    }

    /// Total number of grid cells
    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    /// The (lon, lat) pair at position [0, 0], if any
    pub fn first_point(&self) -> Option<(f64, f64)> {
        self.lons.first().copied().zip(self.lats.first().copied())
    }

    /// The (lon, lat) pair at row-major flat index `k`, if `k` is in range
    pub fn point(&self, k: usize) -> Option<(f64, f64)> {
        if k >= self.len() {
            return None;
        }
        let (row, col) = self.unflatten(k);
        Some((self.lons[[row, col]], self.lats[[row, col]]))
    }

    /// Map a row-major flat index to (row, col)
    pub fn unflatten(&self, k: usize) -> (usize, usize) {
        let (_, ny) = self.shape();
        (k / ny, k % ny)
    }

    /// All grid points flattened in row-major order
    pub fn flat_points(&self) -> Vec<[f64; 2]> {
        self.lons
            .iter()
            .zip(self.lats.iter())
            .map(|(&lon, &lat)| [lon, lat])
            .collect()
    }
}

impl TryFrom<RawGrid> for Grid {
    type Error = RegridError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        let lons = nested_to_array(raw.lons, "lons")?;
        let lats = nested_to_array(raw.lats, "lats")?;
        Grid::new(lons, lats)
    }
}

/// Convert a nested row list to a 2-D array, rejecting ragged rows
pub(crate) fn nested_to_array(rows: Vec<Vec<f64>>, name: &str) -> Result<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != ncols) {
        return Err(RegridError::InvalidParameter {
            param: name.to_string(),
            message: format!(
                "ragged rows: expected {} columns, found a row with {}",
                ncols,
                bad.len()
            ),
        });
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|e| RegridError::InvalidParameter {
        param: name.to_string(),
        message: e.to_string(),
    })
}

/// A set of target locations
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPoints")]
pub struct Points {
    lons: Array1<f64>,
    lats: Array1<f64>,
}

#[derive(Deserialize)]
struct RawPoints {
    lons: Vec<f64>,
    lats: Vec<f64>,
}

impl Points {
    /// Create a point set, checking that both arrays have the same length
    pub fn new(lons: Array1<f64>, lats: Array1<f64>) -> Result<Self> {
        if lons.len() != lats.len() {
            return Err(RegridError::ShapeMismatch {
                expected: vec![lons.len()],
                actual: vec![lats.len()],
            });
        }
        Ok(Self { lons, lats })
    }

    /// Flatten a grid into a point set in row-major order
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            lons: grid.lons().iter().copied().collect(),
            lats: grid.lats().iter().copied().collect(),
        }
    }

    pub fn lons(&self) -> &Array1<f64> {
        &self.lons
    }

    pub fn lats(&self) -> &Array1<f64> {
        &self.lats
    }

    pub fn len(&self) -> usize {
        self.lons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    /// Iterate over (lon, lat) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lons.iter().copied().zip(self.lats.iter().copied())
    }
}

impl TryFrom<RawPoints> for Points {
    type Error = RegridError;

    fn try_from(raw: RawPoints) -> Result<Self> {
        Points::new(Array1::from(raw.lons), Array1::from(raw.lats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_grid_shape_mismatch() {
        let lons = Array2::zeros((2, 3));
        let lats = Array2::zeros((3, 2));
        let result = Grid::new(lons, lats);
        assert!(matches!(result, Err(RegridError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_regular_grid_layout() {
        let grid = Grid::regular(&[0.0, 1.0, 2.0], &[10.0, 11.0]);
        assert_eq!(grid.shape(), (3, 2));
        assert_eq!(grid.first_point(), Some((0.0, 10.0)));
        // Row-major: k = 3 -> row 1, col 1
        assert_eq!(grid.unflatten(3), (1, 1));
        assert_eq!(grid.point(3), Some((1.0, 11.0)));
        assert_eq!(grid.point(6), None);
        assert_eq!(grid.flat_points()[5], [2.0, 11.0]);
    }

    #[test]
    fn test_point_on_empty_grid() {
        let grid = Grid::regular(&[], &[1.0, 2.0]);
        assert!(grid.is_empty());
        assert_eq!(grid.first_point(), None);
        assert_eq!(grid.point(0), None);
    }

    #[test]
    fn test_points_from_grid() {
        let grid = Grid::regular(&[0.0, 1.0], &[5.0, 6.0]);
        let points = Points::from_grid(&grid);
        assert_eq!(points.len(), 4);
        assert_eq!(points.lons(), &array![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(points.lats(), &array![5.0, 6.0, 5.0, 6.0]);
    }

    #[test]
    fn test_points_length_mismatch() {
        let result = Points::new(array![0.0, 1.0], array![0.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_grid_from_json() {
        let grid: Grid =
            serde_json::from_str(r#"{"lons": [[0, 1], [0, 1]], "lats": [[5, 5], [6, 6]]}"#)
                .unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.point(2), Some((0.0, 6.0)));

        let ragged: std::result::Result<Grid, _> =
            serde_json::from_str(r#"{"lons": [[0, 1], [0]], "lats": [[5, 5], [6, 6]]}"#);
        assert!(ragged.is_err());
    }
}
