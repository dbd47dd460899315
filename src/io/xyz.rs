//! Whitespace-separated XYZ text I/O.
//!
//! Each row describes one point as `x y z` or one point/normal pair as
//! `x y z nx ny nz`. Blank lines and lines starting with `#` are skipped.
//! Normals are renormalized to unit length on load, so files produced by
//! other tools with slightly denormalized normals read cleanly.

use crate::cloud::PointCloud;
use crate::{Point3, Result, UnitVec3, Vector3};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Load an oriented point cloud from an XYZ text file. Every data row must
/// have either 3 or 6 fields, and all rows must agree on which.
pub fn load_xyz(path: &Path) -> Result<PointCloud> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut points = Vec::new();
    let mut normals = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = trimmed
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| format!("line {}: malformed number", line_no + 1))?;

        match fields.len() {
            3 => points.push(Point3::new(fields[0], fields[1], fields[2])),
            6 => {
                points.push(Point3::new(fields[0], fields[1], fields[2]));
                normals.push(UnitVec3::new_normalize(Vector3::new(
                    fields[3], fields[4], fields[5],
                )));
            }
            n => {
                return Err(
                    format!("line {}: expected 3 or 6 fields, found {}", line_no + 1, n).into(),
                );
            }
        }
    }

    let normals = if normals.is_empty() {
        None
    } else if normals.len() == points.len() {
        Some(normals)
    } else {
        return Err("file mixes rows with and without normals".into());
    };

    PointCloud::try_new(points, normals)
}

/// Save an oriented point cloud as an XYZ text file, one row per point, with
/// normals appended when the cloud carries them.
pub fn save_xyz(path: &Path, cloud: &PointCloud) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for (i, p) in cloud.points().iter().enumerate() {
        match cloud.normals() {
            Some(normals) => {
                let n = &normals[i];
                writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, n.x, n.y, n.z)?;
            }
            None => writeln!(writer, "{} {} {}", p.x, p.y, p.z)?,
        }
    }

    Ok(())
}
