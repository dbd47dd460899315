//! The two resampling stages: greedy dart throwing and energy-minimization
//! relaxation.
//!
//! Dart throwing builds an initial blue-noise subset by randomized sequential
//! acceptance against a conflict radius; energy minimization then improves the
//! spectral quality of that subset by repelling samples that sit too close in
//! a Gaussian-weighted energy field. Each stage constructs and owns its own
//! [`crate::locator::Locator`] and discards it when the stage ends.

mod dart_throwing;
mod energy;

pub use dart_throwing::{DartResult, DartThrowing};
pub use energy::{EnergyMinimization, RelaxationResult};
