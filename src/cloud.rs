//! An oriented point cloud: positions with optional unit normals.

use crate::na::DVector;
use crate::{Point3, Result, UnitVec3};
use parry3d_f64::bounding_volume::Aabb;

/// A 3D point cloud with optional per-point unit normals. The two sequences
/// are parallel: normal `i` belongs to point `i`.
///
/// This is the boundary type between file I/O / normalization and the
/// n-dimensional resampling core; the core itself only ever sees flat vector
/// sequences produced by [`crate::stacking`].
#[derive(Debug, Clone)]
pub struct PointCloud {
    points: Vec<Point3>,
    normals: Option<Vec<UnitVec3>>,
}

impl PointCloud {
    /// Create a new cloud from points and, optionally, normals. If normals
    /// are provided their count must match the point count.
    pub fn try_new(points: Vec<Point3>, normals: Option<Vec<UnitVec3>>) -> Result<Self> {
        if let Some(normals) = &normals {
            if normals.len() != points.len() {
                return Err("normals must have the same length as points".into());
            }
        }
        Ok(Self { points, normals })
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn normals(&self) -> Option<&[UnitVec3]> {
        self.normals.as_deref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }

    /// Create a sub-cloud from a set of source indices, preserving their
    /// order. This is how a dart throwing result is turned back into a cloud:
    /// the accepted indices select the surviving point/normal pairs.
    pub fn select(&self, indices: &[usize]) -> Result<PointCloud> {
        if indices.iter().any(|&i| i >= self.len()) {
            return Err("selection index out of bounds".into());
        }

        let points = indices.iter().map(|&i| self.points[i]).collect();
        let normals = self
            .normals
            .as_ref()
            .map(|n| indices.iter().map(|&i| n[i]).collect());
        PointCloud::try_new(points, normals)
    }

    /// Positions as dynamic vectors for the resampling core.
    pub fn positions_dyn(&self) -> Vec<DVector<f64>> {
        self.points
            .iter()
            .map(|p| DVector::from_column_slice(p.coords.as_slice()))
            .collect()
    }

    /// Unit normals as dynamic vectors, when the cloud has them.
    pub fn normals_dyn(&self) -> Option<Vec<DVector<f64>>> {
        self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|n| DVector::from_column_slice(n.as_slice()))
                .collect()
        })
    }
}

impl From<&[Point3]> for PointCloud {
    fn from(points: &[Point3]) -> Self {
        Self {
            points: points.to_vec(),
            normals: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;
    use approx::assert_relative_eq;

    fn unit_z() -> UnitVec3 {
        UnitVec3::new_normalize(Vector3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn mismatched_normals_are_rejected() {
        let points = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert!(PointCloud::try_new(points, Some(vec![unit_z()])).is_err());
    }

    #[test]
    fn select_preserves_pairing_and_order() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let normals = vec![
            UnitVec3::new_normalize(Vector3::new(1.0, 0.0, 0.0)),
            UnitVec3::new_normalize(Vector3::new(0.0, 1.0, 0.0)),
            UnitVec3::new_normalize(Vector3::new(0.0, 0.0, 1.0)),
        ];
        let cloud = PointCloud::try_new(points, Some(normals)).unwrap();

        let sub = cloud.select(&[2, 0]).unwrap();
        assert_eq!(sub.len(), 2);
        assert_relative_eq!(sub.points()[0], Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(sub.normals().unwrap()[0].z, 1.0);
        assert_relative_eq!(sub.points()[1], Point3::origin());
        assert_relative_eq!(sub.normals().unwrap()[1].x, 1.0);
    }

    #[test]
    fn select_rejects_out_of_bounds() {
        let cloud = PointCloud::from(&[Point3::origin()][..]);
        assert!(cloud.select(&[1]).is_err());
    }

    #[test]
    fn positions_dyn_matches_points() {
        let cloud = PointCloud::from(&[Point3::new(1.0, 2.0, 3.0)][..]);
        let dyns = cloud.positions_dyn();
        assert_eq!(dyns.len(), 1);
        assert_relative_eq!(dyns[0][0], 1.0);
        assert_relative_eq!(dyns[0][2], 3.0);
        assert!(cloud.normals_dyn().is_none());
    }
}
