//! Nearest neighbour interpolation.
//!
//! Every target point is mapped once to the (row, col) position of the
//! closest source grid cell. Applying the interpolator is then a plain
//! gather. Construction rejects targets that fall far outside the source
//! domain.

use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2};

use super::common::{check_targets_finite, GridSignature, PointIndex};
use super::{BuildOptions, Method};
use crate::error::{RegridError, Result};
use crate::geo::great_circle_distance;
use crate::grid::{Grid, Points};
use crate::logging::InterpolationObserver;

/// Nearest neighbour interpolator
#[derive(Debug, Clone)]
pub struct NearestNeighbour {
    index: Array2<usize>,
    signature: GridSignature,
}

impl NearestNeighbour {
    /// Build the N×2 (row, col) index from `targets` into `grid`
    pub fn new(
        targets: &Points,
        grid: &Grid,
        options: &BuildOptions,
        observer: &dyn InterpolationObserver,
    ) -> Result<Self> {
        let start = Instant::now();
        observer.build_started(Method::Nearest, targets.len(), grid.len());

        let index = create_index(targets, grid, options.max_distance_factor)?;

        observer.build_finished(Method::Nearest, targets.len(), start.elapsed());
        Ok(Self {
            index,
            signature: GridSignature::of(grid),
        })
    }

    /// Whether this interpolator can be reused for `grid`
    pub fn interpolator_ok(&self, grid: &Grid) -> bool {
        self.signature.matches(grid)
    }

    /// Pick the nearest source value for every target point
    pub fn interpolate(&self, values: ArrayView2<f64>) -> Result<Array1<f64>> {
        self.signature.check_values(&values)?;
        Ok(self
            .index
            .outer_iter()
            .map(|rc| values[[rc[0], rc[1]]])
            .collect())
    }

    /// The (row, col) position chosen for each target point
    pub fn index(&self) -> &Array2<usize> {
        &self.index
    }

    pub fn n_targets(&self) -> usize {
        self.index.nrows()
    }

    pub fn signature(&self) -> &GridSignature {
        &self.signature
    }
}

fn create_index(targets: &Points, grid: &Grid, max_distance_factor: f64) -> Result<Array2<usize>> {
    if grid.len() < 2 {
        return Err(RegridError::DegenerateInput {
            message: format!(
                "You only have {} point(s) in your input field",
                grid.len()
            ),
        });
    }
    check_targets_finite(targets)?;

    let points = grid.flat_points();

    // Spacing between the first two source points sets the sanity limit
    let reference = great_circle_distance(points[0][0], points[0][1], points[1][0], points[1][1]);
    if reference.is_nan() || reference <= 0.0 {
        return Err(RegridError::DegenerateInput {
            message: "the first two source points coincide or are masked; no reference spacing"
                .to_string(),
        });
    }
    let max_distance = max_distance_factor * reference;

    let tree = PointIndex::build(&points);
    let mut index = Array2::zeros((targets.len(), 2));
    let mut worst = 0.0_f64;

    for (n, (lon, lat)) in targets.iter().enumerate() {
        let k = tree
            .nearest([lon, lat])
            .ok_or_else(|| RegridError::DegenerateInput {
                message: "source grid has no finite points".to_string(),
            })?;
        let (row, col) = grid.unflatten(k);
        index[[n, 0]] = row;
        index[[n, 1]] = col;

        worst = worst.max(great_circle_distance(lon, lat, points[k][0], points[k][1]));
    }

    if worst > max_distance {
        return Err(RegridError::OutOfRange {
            distance: worst,
            max_distance,
        });
    }

    Ok(index)
}
