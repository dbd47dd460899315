use crate::Result;
use crate::errors::InvalidInput;
use crate::locator::{Locator, LocatorParams, Strategy};
use crate::na::DVector;
use crate::stacking::Stacker;
use itertools::izip;
use rayon::prelude::*;

/// Output of [`EnergyMinimization::minimize`].
#[derive(Debug, Clone)]
pub struct RelaxationResult {
    /// Relaxed positions, same length and order as the input sequence.
    pub positions: Vec<DVector<f64>>,

    /// Feature vectors carried through the relaxation. Unchanged unless the
    /// constraint function rewrote them.
    pub features: Vec<DVector<f64>>,

    /// Total pairwise energy at each iteration, in iteration order. Expected
    /// to decrease, though the constraint step can reinject energy.
    pub energy: Vec<f64>,
}

/// Gradient-descent relaxation of a sample set against a Gaussian repulsion
/// kernel ("energy minimization").
///
/// Each sample is pushed away from its neighbors along the negative gradient
/// of a sum of Gaussian bumps centered at every other sample, which spreads
/// out residual clusters that greedy dart throwing leaves behind and improves
/// the high-frequency uniformity of the distribution.
///
/// Neighborhoods are measured in the stacked position/feature space, but the
/// descent step moves only the positional sub-vector; features ride along
/// unchanged except for whatever the caller's constraint function does.
#[derive(Debug, Clone)]
pub struct EnergyMinimization {
    /// Bandwidth σ of the Gaussian kernel; controls the interaction range.
    pub sigma: f64,

    /// Descent rate α; stable values are a small fraction of σ².
    pub step_size: f64,

    /// Neighbor search cutoff. Pairs farther apart than this are treated as
    /// non-interacting.
    pub max_search_radius: f64,

    /// Number of relaxation iterations; 0 is a valid no-op.
    pub iterations: usize,

    /// Weights used to stack positions and features for neighbor queries.
    pub stacker: Stacker,

    /// Parameters for the locator rebuilt at every iteration.
    pub locator: LocatorParams,
}

impl EnergyMinimization {
    /// Create a minimizer with the given kernel bandwidth and iteration
    /// count. Step size and search radius default relative to σ: the step to
    /// 0.03·σ² and the cutoff to 2.576·σ, past which the kernel's weight is
    /// negligible.
    pub fn new(sigma: f64, iterations: usize) -> Self {
        Self {
            sigma,
            step_size: 0.03 * sigma * sigma,
            max_search_radius: 2.576 * sigma,
            iterations,
            stacker: Stacker::default(),
            locator: LocatorParams::new(Strategy::HashGrid, 2.576 * sigma),
        }
    }

    /// Relax `positions` over the configured number of iterations.
    ///
    /// `features` must parallel `positions` (zero-length vectors are fine for
    /// a position-only metric). `constrain` is applied to every new
    /// (position, feature) pair after the unconstrained gradient step; use it
    /// to clamp to a domain, snap back onto a source surface, or renormalize
    /// a feature channel.
    ///
    /// The sample state is double-buffered: every iteration reads the
    /// generation the previous iteration wrote, so gradients never observe
    /// half-updated neighbors.
    pub fn minimize<F>(
        &self,
        positions: &[DVector<f64>],
        features: &[DVector<f64>],
        mut constrain: F,
    ) -> Result<RelaxationResult>
    where
        F: FnMut(&mut DVector<f64>, &mut DVector<f64>),
    {
        if positions.is_empty() {
            return Err(InvalidInput::EmptyInput.into());
        }
        if positions.len() != features.len() {
            return Err(InvalidInput::LengthMismatch.into());
        }

        let pos_dims = positions[0].len();
        let mut cur_positions = positions.to_vec();
        let mut cur_features = features.to_vec();
        let mut next_positions = positions.to_vec();
        let mut next_features = features.to_vec();
        let mut energy_history = Vec::with_capacity(self.iterations);

        let mut loc = self.locator.build();
        for iter in 0..self.iterations {
            // The dataset moves every iteration, so a stale index would hand
            // back wrong neighbor sets; rebuild from scratch.
            loc.reset();
            for (p, f) in cur_positions.iter().zip(&cur_features) {
                loc.add(&self.stacker.stack(p, f));
            }

            // Read-only gather against the frozen locator. The ordered
            // collect and the sequential sum below keep the output and the
            // reported energy deterministic.
            let gathered: Vec<(f64, DVector<f64>)> = (0..cur_positions.len())
                .into_par_iter()
                .map(|i| self.sample_energy(i, loc.as_ref()))
                .collect();

            let mut total = 0.0;
            for (next_p, next_f, cur_p, cur_f, sample) in izip!(
                &mut next_positions,
                &mut next_features,
                &cur_positions,
                &cur_features,
                &gathered
            ) {
                let (energy, gradient) = sample;
                total += energy;
                *next_p = cur_p - gradient.rows(0, pos_dims) * self.step_size;
                *next_f = cur_f.clone();
                constrain(next_p, next_f);
            }
            energy_history.push(total);
            log::debug!(
                "energy minimization: iteration {} of {}, total energy {:.4}",
                iter + 1,
                self.iterations,
                total
            );

            std::mem::swap(&mut cur_positions, &mut next_positions);
            std::mem::swap(&mut cur_features, &mut next_features);
        }

        Ok(RelaxationResult {
            positions: cur_positions,
            features: cur_features,
            energy: energy_history,
        })
    }

    /// Energy and gradient contributed by the neighbors of the stored sample
    /// at `index`. The gradient lives in the stacked space; only its
    /// positional rows are applied by the caller.
    fn sample_energy(&self, index: usize, loc: &dyn Locator) -> (f64, DVector<f64>) {
        let query = loc.get(index);
        let mut gradient = DVector::zeros(query.len());
        let mut energy = 0.0;

        let inv_sigma2 = 1.0 / (self.sigma * self.sigma);
        for (j, d2) in loc.find_all_within_radius(query, self.max_search_radius) {
            if j == index {
                continue;
            }
            let w = (-d2 * 0.5 * inv_sigma2).exp();
            energy += w;
            gradient += (loc.get(j) - query) * (inv_sigma2 * w);
        }

        (energy, gradient)
    }
}
