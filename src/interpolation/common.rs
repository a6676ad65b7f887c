//! Common utilities for interpolation algorithms.
//!
//! This module provides shared functionality used by both interpolation
//! methods: the staleness signature, an R-tree over labelled source points,
//! and input validation.

use ndarray::ArrayView2;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::{RegridError, Result};
use crate::grid::{Grid, Points};

/// Cheap fingerprint of the source grid an interpolator was built for.
///
/// Two grids match when they have the same shape and bitwise identical
/// first coordinates. This is a heuristic, not a full equality check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSignature {
    shape: (usize, usize),
    first_point: (f64, f64),
}

impl GridSignature {
    pub fn of(grid: &Grid) -> Self {
        Self {
            shape: grid.shape(),
            first_point: grid.first_point().unwrap_or((f64::NAN, f64::NAN)),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Whether `grid` plausibly is the grid this signature was taken from
    pub fn matches(&self, grid: &Grid) -> bool {
        if grid.shape() != self.shape {
            return false;
        }
        match grid.first_point() {
            Some((lon, lat)) => {
                lon.to_bits() == self.first_point.0.to_bits()
                    && lat.to_bits() == self.first_point.1.to_bits()
            }
            None => false,
        }
    }

    /// Fail unless `values` has the recorded grid shape
    pub fn check_values(&self, values: &ArrayView2<f64>) -> Result<()> {
        if values.dim() != self.shape {
            return Err(RegridError::ShapeMismatch {
                expected: vec![self.shape.0, self.shape.1],
                actual: values.shape().to_vec(),
            });
        }
        Ok(())
    }
}

/// A source point labelled with its row-major flat index
pub type LabelledPoint = GeomWithData<[f64; 2], usize>;

/// Nearest-point index over labelled source points, planar in (lon, lat)
pub struct PointIndex {
    tree: RTree<LabelledPoint>,
}

impl PointIndex {
    /// Bulk-load an index over `points`, labelling each with its position.
    ///
    /// Points with a NaN or infinite coordinate (masked cells) are left out
    /// and can never be returned as a nearest neighbour.
    pub fn build(points: &[[f64; 2]]) -> Self {
        let labelled = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p[0].is_finite() && p[1].is_finite())
            .map(|(k, &p)| LabelledPoint::new(p, k))
            .collect();
        Self {
            tree: RTree::bulk_load(labelled),
        }
    }

    /// Flat index of the source point nearest to `point`
    pub fn nearest(&self, point: [f64; 2]) -> Option<usize> {
        self.tree.nearest_neighbor(&point).map(|p| p.data)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Reject target sets containing NaN or infinite coordinates
pub fn check_targets_finite(targets: &Points) -> Result<()> {
    match targets
        .iter()
        .position(|(lon, lat)| !lon.is_finite() || !lat.is_finite())
    {
        Some(index) => Err(RegridError::InvalidParameter {
            param: "targets".to_string(),
            message: format!("non-finite coordinate at target point {}", index),
        }),
        None => Ok(()),
    }
}
