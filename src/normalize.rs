//! Rigid and scale normalization of oriented point clouds.
//!
//! Resampling parameters like the conflict radius are easiest to choose when
//! every input lives in a canonical frame. The passes here reorient a cloud so
//! its principal axes align with the world axes and its centroid sits at the
//! origin, then rescale it uniformly so the longest side of its bounding box
//! has unit length. Each pass hands back the inverse transform so resampled
//! output can be restored into the source frame.

use crate::cloud::PointCloud;
use crate::errors::InvalidInput;
use crate::na::{DMatrix, Matrix3, Rotation3, Translation3, UnitQuaternion};
use crate::{Iso3, Point3, Result};

/// Inverse transform returned by [`normalize_cloud`], mapping the normalized
/// frame back into the source frame.
#[derive(Debug, Clone, Copy)]
pub struct RestoreTransform {
    /// Undoes the PCA reorientation and centering.
    pub iso: Iso3,

    /// Undoes the unit-box rescale (the original longest AABB side).
    pub scale: f64,
}

impl RestoreTransform {
    pub fn identity() -> Self {
        Self {
            iso: Iso3::identity(),
            scale: 1.0,
        }
    }

    /// Map a normalized-frame cloud back into the source frame: inverse scale
    /// first, then the inverse rigid motion. Normals only rotate.
    pub fn restore(&self, cloud: &PointCloud) -> Result<PointCloud> {
        let points = cloud
            .points()
            .iter()
            .map(|p| self.iso * Point3::from(p.coords * self.scale))
            .collect();
        let normals = cloud
            .normals()
            .map(|normals| normals.iter().map(|n| self.iso * *n).collect());
        PointCloud::try_new(points, normals)
    }
}

/// Rigidly move a cloud into its PCA frame: the centroid goes to the origin
/// and the principal axes (most significant first) align with X, Y, Z.
/// Normals rotate with the points. Returns the normalized cloud and the
/// inverse isometry.
pub fn normalize_orientation(cloud: &PointCloud) -> Result<(PointCloud, Iso3)> {
    if cloud.is_empty() {
        return Err(InvalidInput::EmptyInput.into());
    }

    let (basis, center) = principal_basis(cloud.points());
    let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis));
    let iso = Iso3::from_parts(Translation3::from(-(rot * center.coords)), rot);

    let points = cloud.points().iter().map(|p| iso * p).collect();
    let normals = cloud
        .normals()
        .map(|normals| normals.iter().map(|n| iso * *n).collect());

    Ok((PointCloud::try_new(points, normals)?, iso.inverse()))
}

/// Uniformly rescale a cloud so the longest side of its AABB becomes unit
/// length. Normals are unaffected by uniform scaling. Returns the scaled
/// cloud and the inverse scale factor (the original longest side).
pub fn scale_to_unit_box(cloud: &PointCloud) -> Result<(PointCloud, f64)> {
    if cloud.is_empty() {
        return Err(InvalidInput::EmptyInput.into());
    }

    let longest = cloud.aabb().extents().max();
    if longest <= 0.0 {
        return Err("cloud has no spatial extent to scale".into());
    }

    let s = 1.0 / longest;
    let points = cloud
        .points()
        .iter()
        .map(|p| Point3::from(p.coords * s))
        .collect();
    let normals = cloud.normals().map(|n| n.to_vec());

    Ok((PointCloud::try_new(points, normals)?, longest))
}

/// Full normalization pass: orientation, then unit-box scaling.
pub fn normalize_cloud(cloud: &PointCloud) -> Result<(PointCloud, RestoreTransform)> {
    let (oriented, iso) = normalize_orientation(cloud)?;
    let (scaled, scale) = scale_to_unit_box(&oriented)?;
    Ok((scaled, RestoreTransform { iso, scale }))
}

/// Principal axes of a point set by SVD of the centered coordinate matrix,
/// rows sorted most significant first, together with the centroid. The last
/// axis is flipped when needed so the basis is right-handed and can serve as
/// a rotation.
fn principal_basis(points: &[Point3]) -> (Matrix3<f64>, Point3) {
    let mut center = Point3::origin();
    for p in points {
        center.coords += p.coords;
    }
    center.coords /= points.len() as f64;

    let mut matrix = DMatrix::zeros(points.len(), 3);
    for (i, p) in points.iter().enumerate() {
        let v = p - center;
        for j in 0..3 {
            matrix[(i, j)] = v[j];
        }
    }

    let svd = matrix.svd(false, true);
    let v_t = svd.v_t.unwrap();

    let mut basis = Matrix3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            basis[(i, j)] = v_t[(i, j)];
        }
    }
    if basis.determinant() < 0.0 {
        for j in 0..3 {
            basis[(2, j)] = -basis[(2, j)];
        }
    }

    (basis, center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UnitVec3, Vector3};
    use approx::assert_relative_eq;

    /// An elongated box of points: spread 4 along one diagonal direction,
    /// 1 across it, 0.25 vertically, offset away from the origin.
    fn slanted_cloud() -> PointCloud {
        let dir_a = Vector3::new(1.0, 1.0, 0.0).normalize();
        let dir_b = Vector3::new(-1.0, 1.0, 0.0).normalize();
        let dir_c = Vector3::new(0.0, 0.0, 1.0);

        let mut points = Vec::new();
        let mut normals = Vec::new();
        for i in 0..9 {
            for j in 0..5 {
                for k in 0..3 {
                    let a = (i as f64 / 8.0 - 0.5) * 4.0;
                    let b = (j as f64 / 4.0 - 0.5) * 1.0;
                    let c = (k as f64 / 2.0 - 0.5) * 0.25;
                    let p = Point3::new(10.0, -3.0, 2.0) + dir_a * a + dir_b * b + dir_c * c;
                    points.push(p);
                    normals.push(UnitVec3::new_normalize(dir_c));
                }
            }
        }
        PointCloud::try_new(points, Some(normals)).unwrap()
    }

    #[test]
    fn orientation_centers_and_aligns() {
        let cloud = slanted_cloud();
        let (normalized, _) = normalize_orientation(&cloud).unwrap();

        let mut centroid = Vector3::zeros();
        for p in normalized.points() {
            centroid += p.coords;
        }
        centroid /= normalized.len() as f64;
        assert_relative_eq!(centroid.norm(), 0.0, epsilon = 1e-9);

        // The long direction of the box must land on the X axis.
        let aabb = normalized.aabb();
        let extents = aabb.extents();
        assert!(extents.x > extents.y);
        assert!(extents.y > extents.z);

        // Normals followed the rotation: they were vertical in the slanted
        // frame's dir_c, which maps onto the least significant axis.
        for n in normalized.normals().unwrap() {
            assert_relative_eq!(n.z.abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn unit_box_scaling_hits_unit_length() {
        let cloud = slanted_cloud();
        let (oriented, _) = normalize_orientation(&cloud).unwrap();
        let (scaled, inv_scale) = scale_to_unit_box(&oriented).unwrap();

        let extents = scaled.aabb().extents();
        assert_relative_eq!(extents.max(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(
            inv_scale,
            oriented.aabb().extents().max(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn restore_roundtrips_to_source_frame() {
        let cloud = slanted_cloud();
        let (normalized, restore) = normalize_cloud(&cloud).unwrap();
        let restored = restore.restore(&normalized).unwrap();

        for (a, b) in cloud.points().iter().zip(restored.points()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-8);
        }
        for (a, b) in cloud
            .normals()
            .unwrap()
            .iter()
            .zip(restored.normals().unwrap())
        {
            assert_relative_eq!(*a.as_ref(), *b.as_ref(), epsilon = 1e-8);
        }
    }

    #[test]
    fn empty_cloud_is_rejected() {
        let empty = PointCloud::try_new(Vec::new(), None).unwrap();
        assert!(normalize_orientation(&empty).is_err());
        assert!(scale_to_unit_box(&empty).is_err());
    }

    #[test]
    fn degenerate_extent_is_rejected() {
        let cloud = PointCloud::from(&[Point3::origin(), Point3::origin()][..]);
        assert!(scale_to_unit_box(&cloud).is_err());
    }
}
