//! Configuration surface and the end-to-end resampling driver.
//!
//! [`ResampleConfig`] gathers every recognized option of the pipeline in one
//! serde-friendly struct, so runs can be described in JSON and validated
//! before any work starts. [`resample`] wires the stages together for the
//! common case: stack an oriented cloud, dart-throw an initial subset, then
//! optionally relax it.

use crate::Result;
use crate::cloud::PointCloud;
use crate::errors::InvalidInput;
use crate::locator::{LocatorParams, Strategy};
use crate::na::DVector;
use crate::sampling::{DartThrowing, EnergyMinimization};
use crate::stacking::{Stacker, stack_points_and_normals};
use serde::{Deserialize, Serialize};

/// All recognized options of the resampling pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Minimum allowed distance between accepted samples, in the stacked
    /// position/feature metric.
    pub conflict_radius: f64,

    /// Consecutive-failure budget for dart throwing.
    pub max_attempts: usize,

    /// Seed for the per-run random source; fixing it makes the whole
    /// pipeline deterministic end to end.
    pub seed: u64,

    /// Kernel bandwidth σ for the relaxation stage.
    pub sigma: f64,

    /// Gradient descent step size; stable values are a small fraction of σ².
    pub step_size: f64,

    /// Neighbor search cutoff for the relaxation stage.
    pub max_search_radius: f64,

    /// Relaxation iteration count; 0 skips relaxation entirely.
    pub iterations: usize,

    /// Weight on the position channel of the stacked metric.
    pub position_weight: f64,

    /// Weight on the feature (normal) channel of the stacked metric.
    pub feature_weight: f64,

    /// Locator strategy used by both stages.
    pub strategy: Strategy,

    /// Grid cell edge for the hashed-grid strategy. When absent, each stage
    /// uses its own query radius as the cell size.
    pub cell_size: Option<f64>,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        let sigma = 0.03;
        Self {
            conflict_radius: 0.01,
            max_attempts: 100_000,
            seed: 0,
            sigma,
            step_size: 0.03 * sigma * sigma,
            max_search_radius: 2.576 * sigma,
            iterations: 0,
            position_weight: 1.0,
            feature_weight: 0.05,
            strategy: Strategy::HashGrid,
            cell_size: None,
        }
    }
}

impl ResampleConfig {
    /// Parse a configuration from JSON and validate it. Unspecified fields
    /// take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every numeric option against its documented range.
    pub fn validate(&self) -> Result<()> {
        if !(self.conflict_radius > 0.0 && self.conflict_radius.is_finite()) {
            return Err(InvalidInput::BadParameter("conflict_radius must be > 0").into());
        }
        if self.max_attempts == 0 {
            return Err(InvalidInput::BadParameter("max_attempts must be >= 1").into());
        }
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(InvalidInput::BadParameter("sigma must be > 0").into());
        }
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(InvalidInput::BadParameter("step_size must be > 0").into());
        }
        if !(self.max_search_radius >= self.conflict_radius && self.max_search_radius.is_finite())
        {
            return Err(InvalidInput::BadParameter(
                "max_search_radius must be >= conflict_radius",
            )
            .into());
        }
        if !(self.position_weight.is_finite() && self.feature_weight.is_finite()) {
            return Err(InvalidInput::BadParameter("weights must be finite").into());
        }
        if let Some(cell) = self.cell_size {
            if !(cell > 0.0 && cell.is_finite()) {
                return Err(InvalidInput::BadParameter("cell_size must be > 0").into());
            }
        }
        Ok(())
    }

    /// Locator parameters for a stage whose queries use `radius`.
    fn locator_params(&self, radius: f64) -> LocatorParams {
        LocatorParams::new(self.strategy, self.cell_size.unwrap_or(radius))
    }

    fn stacker(&self) -> Stacker {
        Stacker::new(self.position_weight, self.feature_weight)
    }
}

/// Run the full pipeline over an oriented cloud: stack positions and normals
/// into composite candidate vectors, select a blue-noise subset by dart
/// throwing, then relax it for the configured number of iterations.
///
/// The returned cloud contains the accepted point/normal pairs; when
/// relaxation ran, positions are the relaxed ones. Relaxation here is
/// unconstrained (free-space); callers that need domain clamping or surface
/// re-snapping should drive [`EnergyMinimization`] directly with their own
/// constraint function.
pub fn resample(cloud: &PointCloud, config: &ResampleConfig) -> Result<PointCloud> {
    config.validate()?;
    if cloud.is_empty() {
        return Err(InvalidInput::EmptyInput.into());
    }

    let candidates = match cloud.normals() {
        Some(normals) => stack_points_and_normals(
            cloud.points(),
            normals,
            config.position_weight,
            config.feature_weight,
        )?,
        None => {
            let stacker = config.stacker();
            let none = DVector::zeros(0);
            cloud
                .positions_dyn()
                .iter()
                .map(|p| stacker.stack(p, &none))
                .collect()
        }
    };

    let mut thrower = DartThrowing::new(config.conflict_radius, config.max_attempts, config.seed);
    thrower.locator = config.locator_params(config.conflict_radius);
    let thrown = thrower.resample(&candidates)?;
    let selected = cloud.select(&thrown.indices)?;

    if config.iterations == 0 {
        return Ok(selected);
    }

    let positions = selected.positions_dyn();
    let features = selected
        .normals_dyn()
        .unwrap_or_else(|| vec![DVector::zeros(0); selected.len()]);

    let mut minimizer = EnergyMinimization::new(config.sigma, config.iterations);
    minimizer.step_size = config.step_size;
    minimizer.max_search_radius = config.max_search_radius;
    minimizer.stacker = config.stacker();
    minimizer.locator = config.locator_params(config.max_search_radius);
    let relaxed = minimizer.minimize(&positions, &features, |_, _| {})?;

    let points = relaxed
        .positions
        .iter()
        .map(|p| crate::Point3::new(p[0], p[1], p[2]))
        .collect();
    let normals = selected.normals().map(|n| n.to_vec());
    PointCloud::try_new(points, normals)
}
