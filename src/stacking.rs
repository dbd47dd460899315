//! Weighted stacking of position and feature vectors into composite vectors.
//!
//! Both resampling stages measure proximity with a single L2 metric. To let a
//! feature channel (a normal, a scalar attribute) influence that metric, the
//! position vector and the feature vector are concatenated into one composite
//! vector, each side scaled by its own weight. A pure position metric falls
//! out of a zero-length feature vector or a zero feature weight.

use crate::errors::InvalidInput;
use crate::na::DVector;
use crate::{Point3, Result, UnitVec3};
use serde::{Deserialize, Serialize};

/// Stacks a position vector and a feature vector into one composite vector
/// `[p·wp | f·wf]`, so that distances in the stacked space blend spatial and
/// feature separation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stacker {
    pub position_weight: f64,
    pub feature_weight: f64,
}

impl Default for Stacker {
    fn default() -> Self {
        Self {
            position_weight: 1.0,
            feature_weight: 0.05,
        }
    }
}

impl Stacker {
    pub fn new(position_weight: f64, feature_weight: f64) -> Self {
        Self {
            position_weight,
            feature_weight,
        }
    }

    /// Stack a single position/feature pair. Either side may be zero-length.
    pub fn stack(&self, position: &DVector<f64>, feature: &DVector<f64>) -> DVector<f64> {
        let np = position.len();
        let nf = feature.len();
        let mut out = DVector::zeros(np + nf);
        out.rows_mut(0, np)
            .copy_from(&(position * self.position_weight));
        out.rows_mut(np, nf)
            .copy_from(&(feature * self.feature_weight));
        out
    }

    /// Stack parallel position and feature sequences element by element.
    pub fn stack_all(
        &self,
        positions: &[DVector<f64>],
        features: &[DVector<f64>],
    ) -> Result<Vec<DVector<f64>>> {
        if positions.len() != features.len() {
            return Err(InvalidInput::LengthMismatch.into());
        }
        Ok(positions
            .iter()
            .zip(features)
            .map(|(p, f)| self.stack(p, f))
            .collect())
    }
}

/// Stack the points and unit normals of an oriented cloud into 6-dimensional
/// composite vectors, weighting the two channels separately. This is the
/// bilateral form of the conflict metric: samples must differ in position or
/// in orientation (or both) to coexist.
pub fn stack_points_and_normals(
    points: &[Point3],
    normals: &[UnitVec3],
    position_weight: f64,
    normal_weight: f64,
) -> Result<Vec<DVector<f64>>> {
    if points.is_empty() {
        return Err(InvalidInput::EmptyInput.into());
    }
    if points.len() != normals.len() {
        return Err(InvalidInput::LengthMismatch.into());
    }

    let stacker = Stacker::new(position_weight, normal_weight);
    Ok(points
        .iter()
        .zip(normals)
        .map(|(p, n)| {
            let position = DVector::from_column_slice(p.coords.as_slice());
            let feature = DVector::from_column_slice(n.as_slice());
            stacker.stack(&position, &feature)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;
    use approx::assert_relative_eq;

    #[test]
    fn stack_applies_weights() {
        let s = Stacker::new(2.0, 0.5);
        let p = DVector::from_vec(vec![1.0, -1.0]);
        let f = DVector::from_vec(vec![4.0]);
        let out = s.stack(&p, &f);
        assert_eq!(out.len(), 3);
        assert_relative_eq!(out[0], 2.0);
        assert_relative_eq!(out[1], -2.0);
        assert_relative_eq!(out[2], 2.0);
    }

    #[test]
    fn empty_feature_is_a_position_metric() {
        let s = Stacker::new(1.0, 10.0);
        let p = DVector::from_vec(vec![0.5, 0.25, 0.125]);
        let out = s.stack(&p, &DVector::zeros(0));
        assert_eq!(out, p);
    }

    #[test]
    fn stacked_distance_blends_channels() {
        let s = Stacker::new(1.0, 0.5);
        let a = s.stack(
            &DVector::from_vec(vec![0.0, 0.0]),
            &DVector::from_vec(vec![0.0]),
        );
        let b = s.stack(
            &DVector::from_vec(vec![3.0, 0.0]),
            &DVector::from_vec(vec![8.0]),
        );
        // sqrt(3² + (0.5·8)²) = 5
        assert_relative_eq!((b - a).norm(), 5.0);
    }

    #[test]
    fn stack_all_rejects_mismatched_lengths() {
        let s = Stacker::default();
        let p = vec![DVector::zeros(3), DVector::zeros(3)];
        let f = vec![DVector::zeros(1)];
        assert!(s.stack_all(&p, &f).is_err());
    }

    #[test]
    fn points_and_normals_roundtrip() {
        let points = vec![Point3::new(1.0, 2.0, 3.0)];
        let normals = vec![UnitVec3::new_normalize(Vector3::new(0.0, 0.0, 1.0))];
        let stacked = stack_points_and_normals(&points, &normals, 1.0, 0.25).unwrap();
        assert_eq!(stacked.len(), 1);
        let v = &stacked[0];
        assert_eq!(v.len(), 6);
        assert_relative_eq!(v[0], 1.0);
        assert_relative_eq!(v[1], 2.0);
        assert_relative_eq!(v[2], 3.0);
        assert_relative_eq!(v[5], 0.25);
    }

    #[test]
    fn points_and_normals_reject_bad_shapes() {
        let points = vec![Point3::origin()];
        assert!(stack_points_and_normals(&[], &[], 1.0, 1.0).is_err());
        assert!(stack_points_and_normals(&points, &[], 1.0, 1.0).is_err());
    }
}
