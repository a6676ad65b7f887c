//! Batch resampling of several fields that share one source grid.
//!
//! A [`RegridRequest`] carries the source grid, the target points and any
//! number of named value fields. All fields go through the same
//! [`InterpolatorCache`], so the index or weights are built once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::grid_rotation;
use crate::grid::{nested_to_array, Grid, Points};
use crate::interpolation::{InterpolatorCache, Method};

/// Input of a batch run
#[derive(Debug, Clone, Deserialize)]
pub struct RegridRequest {
    /// Source grid coordinates
    pub source: Grid,
    /// Target locations
    pub targets: Points,
    /// Value fields on the source grid, keyed by name
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<Vec<f64>>>,
}

/// Output of a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegridResponse {
    /// Interpolation method used
    pub method: Method,
    /// Resampled fields, one value per target point
    pub fields: BTreeMap<String, Vec<f64>>,
    /// Grid rotation angle of the source grid in degrees, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec<Vec<f64>>>,
}

impl RegridRequest {
    /// Parse a request from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resample every field through `cache`
    pub fn run(
        &self,
        cache: &mut InterpolatorCache,
        method: Method,
        with_rotation: bool,
    ) -> Result<RegridResponse> {
        let mut fields = BTreeMap::new();
        for (name, rows) in &self.fields {
            let values = nested_to_array(rows.clone(), name)?;
            let resampled = cache.interpolate(method, &self.targets, &self.source, values.view())?;
            fields.insert(name.clone(), resampled.to_vec());
        }

        let rotation = with_rotation.then(|| {
            grid_rotation(&self.source)
                .outer_iter()
                .map(|row| row.to_vec())
                .collect()
        });

        Ok(RegridResponse {
            method,
            fields,
            rotation,
        })
    }
}
