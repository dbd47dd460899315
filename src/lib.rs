//! Blue-noise resampling of oriented point clouds.
//!
//! This crate resamples a point cloud (positions plus unit normals, optionally
//! additional feature channels) into a spatially well distributed subset with
//! blue-noise statistics: samples are neither clustered nor gridded, and no two
//! accepted samples lie closer than a configured conflict radius in a combined
//! position/feature metric.
//!
//! The work is split across three core pieces:
//!
//! - [`locator`]: incremental spatial indices over n-dimensional vectors with
//!   radius-bounded proximity queries, available in brute-force and hashed-grid
//!   flavors behind a single trait.
//! - [`sampling::DartThrowing`]: randomized greedy acceptance which builds an
//!   initial subset under a minimum-distance constraint.
//! - [`sampling::EnergyMinimization`]: gradient-descent relaxation of an
//!   existing sample set against a Gaussian pairwise repulsion kernel.
//!
//! Around the core, [`stacking`] performs the weighted concatenation of
//! position and feature vectors into one composite vector, [`normalize`]
//! provides PCA reorientation and unit-box rescaling of a cloud, [`io`] reads
//! and writes XYZ text files, and [`config`] exposes the full configuration
//! surface together with a [`config::resample`] driver wiring the stages
//! together.

use std::error::Error;

pub mod cloud;
pub mod config;
pub mod errors;
pub mod io;
pub mod locator;
pub mod normalize;
pub mod sampling;
pub mod stacking;

pub use parry3d_f64::na;

pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

pub type Point3 = na::Point3<f64>;
pub type Vector3 = na::Vector3<f64>;
pub type UnitVec3 = na::Unit<Vector3>;
pub type Iso3 = na::Isometry3<f64>;

pub use cloud::PointCloud;
pub use config::ResampleConfig;
pub use locator::{BruteForceLocator, HashGridLocator, Locator, LocatorParams};
pub use sampling::{DartResult, DartThrowing, EnergyMinimization, RelaxationResult};
pub use stacking::Stacker;
