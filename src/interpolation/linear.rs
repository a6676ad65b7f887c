//! Linear interpolation on a Delaunay triangulation.
//!
//! The flattened source grid is triangulated once; each target point is
//! located in a triangle and assigned the three vertex indices and
//! barycentric weights of that triangle. Applying the interpolator is a
//! three-term weighted sum per target point.

use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2};

use super::common::{check_targets_finite, GridSignature, PointIndex};
use super::triangulation::Triangulation;
use super::{BuildOptions, Method, OutsideHullPolicy};
use crate::error::{RegridError, Result};
use crate::grid::{Grid, Points};
use crate::logging::InterpolationObserver;

/// Linear (barycentric) interpolator
#[derive(Debug, Clone)]
pub struct Linear {
    vertices: Array2<usize>,
    weights: Array2<f64>,
    outside_hull: usize,
    signature: GridSignature,
}

impl Linear {
    /// Triangulate `grid` and set up weights for every target point
    pub fn new(
        targets: &Points,
        grid: &Grid,
        options: &BuildOptions,
        observer: &dyn InterpolationObserver,
    ) -> Result<Self> {
        let start = Instant::now();
        observer.build_started(Method::Linear, targets.len(), grid.len());

        check_targets_finite(targets)?;
        let points = grid.flat_points();
        let triangulation = Triangulation::new(&points)?;

        let n = targets.len();
        let mut vertices = Array2::zeros((n, 3));
        let mut weights = Array2::zeros((n, 3));
        let mut nearest: Option<PointIndex> = None;
        let mut outside_hull = 0;

        for (i, (lon, lat)) in targets.iter().enumerate() {
            let p = [lon, lat];
            let (vtx, wts) = match triangulation.find_simplex(p) {
                Some(simplex) => (
                    triangulation.simplices()[simplex],
                    triangulation.barycentric(simplex, p),
                ),
                None => {
                    outside_hull += 1;
                    match options.outside_hull {
                        OutsideHullPolicy::Reject => {
                            return Err(RegridError::OutsideHull {
                                index: i,
                                lon,
                                lat,
                            });
                        }
                        OutsideHullPolicy::Nearest => {
                            let index = nearest.get_or_insert_with(|| PointIndex::build(&points));
                            let k = index.nearest(p).ok_or_else(|| {
                                RegridError::DegenerateInput {
                                    message: "empty source point index".to_string(),
                                }
                            })?;
                            ([k, k, k], [1.0, 0.0, 0.0])
                        }
                        OutsideHullPolicy::Extrapolate => {
                            let simplex = triangulation.nearest_simplex(p).ok_or_else(|| {
                                RegridError::DegenerateInput {
                                    message: "triangulation has no simplices".to_string(),
                                }
                            })?;
                            (
                                triangulation.simplices()[simplex],
                                triangulation.barycentric(simplex, p),
                            )
                        }
                    }
                }
            };

            for j in 0..3 {
                vertices[[i, j]] = vtx[j];
                weights[[i, j]] = wts[j];
            }
        }

        observer.build_finished(Method::Linear, n, start.elapsed());
        Ok(Self {
            vertices,
            weights,
            outside_hull,
            signature: GridSignature::of(grid),
        })
    }

    /// Whether this interpolator can be reused for `grid`
    pub fn interpolator_ok(&self, grid: &Grid) -> bool {
        self.signature.matches(grid)
    }

    /// Weighted sum of the three enclosing source values per target point
    pub fn interpolate(&self, values: ArrayView2<f64>) -> Result<Array1<f64>> {
        self.signature.check_values(&values)?;
        match values.as_slice() {
            Some(flat) => Ok(self.weighted_sum(|k| flat[k])),
            None => {
                let (_, ny) = self.signature.shape();
                Ok(self.weighted_sum(|k| values[[k / ny, k % ny]]))
            }
        }
    }

    fn weighted_sum(&self, value_at: impl Fn(usize) -> f64) -> Array1<f64> {
        self.vertices
            .outer_iter()
            .zip(self.weights.outer_iter())
            .map(|(vtx, wts)| {
                vtx.iter()
                    .zip(wts.iter())
                    .map(|(&k, &w)| value_at(k) * w)
                    .sum::<f64>()
            })
            .collect()
    }

    /// Flat source indices of the enclosing triangle, N×3
    pub fn vertices(&self) -> &Array2<usize> {
        &self.vertices
    }

    /// Barycentric weights matching [`Linear::vertices`], N×3
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Number of target points that fell outside the convex hull
    pub fn outside_hull(&self) -> usize {
        self.outside_hull
    }

    pub fn n_targets(&self) -> usize {
        self.vertices.nrows()
    }

    pub fn signature(&self) -> &GridSignature {
        &self.signature
    }
}
