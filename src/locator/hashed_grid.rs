use super::Locator;
use crate::na::DVector;
use std::collections::HashMap;

/// Locator backed by a uniform grid hashed into buckets.
///
/// Each stored vector is binned into the axis-aligned cell containing it,
/// keyed by the integer coordinates `floor(x_i / cell_size)` per axis. A
/// radius query visits only the cells overlapped by the query ball: the
/// inclusive bucket range covering `query ± radius` is walked in
/// lexicographic order, each candidate cell is pruned with a sphere/box
/// overlap test against its world-space bounds, and the points of the
/// surviving cells are scanned exactly. For well distributed data this keeps
/// per-query cost near the local density instead of O(N), at the price of the
/// hash structure's memory and a full rebuild (reset + re-add) whenever the
/// underlying point set changes.
#[derive(Debug, Clone)]
pub struct HashGridLocator {
    cell_size: f64,
    inv_cell_size: f64,
    points: Vec<DVector<f64>>,
    buckets: HashMap<Vec<i32>, Vec<usize>>,
}

impl HashGridLocator {
    /// Create an empty locator with the given cell edge length.
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "grid cell size must be a positive finite number"
        );
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            points: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Integer cell coordinates of the cell containing `point`.
    fn bucket_of(&self, point: &DVector<f64>) -> Vec<i32> {
        point
            .iter()
            .map(|c| (c * self.inv_cell_size).floor() as i32)
            .collect()
    }

    /// Inclusive bucket range overlapped by the ball around `query`.
    fn ball_range(&self, query: &DVector<f64>, radius: f64) -> (Vec<i32>, Vec<i32>) {
        let lo = query
            .iter()
            .map(|c| ((c - radius) * self.inv_cell_size).floor() as i32)
            .collect();
        let hi = query
            .iter()
            .map(|c| ((c + radius) * self.inv_cell_size).floor() as i32)
            .collect();
        (lo, hi)
    }

    /// Squared distance from `query` to the closest point of the cell with
    /// integer coordinates `bucket`. Zero when the query lies inside the cell
    /// on every axis, since the per-axis gap to the nearest face is then zero.
    fn cell_gap_squared(&self, query: &DVector<f64>, bucket: &[i32]) -> f64 {
        let mut d2 = 0.0;
        for (b, q) in bucket.iter().zip(query.iter()) {
            let lo = *b as f64 * self.cell_size;
            let hi = lo + self.cell_size;
            let gap = (lo - q).max(0.0) + (q - hi).max(0.0);
            d2 += gap * gap;
        }
        d2
    }
}

impl Locator for HashGridLocator {
    fn reset(&mut self) {
        self.points.clear();
        self.buckets.clear();
    }

    fn add(&mut self, point: &DVector<f64>) {
        if let Some(first) = self.points.first() {
            assert_eq!(
                first.len(),
                point.len(),
                "all vectors in a locator must share one dimensionality"
            );
        }
        let index = self.points.len();
        let bucket = self.bucket_of(point);
        self.points.push(point.clone());
        self.buckets.entry(bucket).or_default().push(index);
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn get(&self, index: usize) -> &DVector<f64> {
        &self.points[index]
    }

    fn find_any_within_radius(&self, query: &DVector<f64>, radius: f64) -> Option<(usize, f64)> {
        let r2 = radius * radius;
        let (lo, hi) = self.ball_range(query, radius);
        for bucket in BucketRange::new(lo, hi) {
            if self.cell_gap_squared(query, &bucket) > r2 {
                continue;
            }
            if let Some(ids) = self.buckets.get(&bucket) {
                for &i in ids {
                    let d2 = (query - &self.points[i]).norm_squared();
                    if d2 <= r2 {
                        return Some((i, d2));
                    }
                }
            }
        }
        None
    }

    fn find_all_within_radius(&self, query: &DVector<f64>, radius: f64) -> Vec<(usize, f64)> {
        let r2 = radius * radius;
        let mut hits = Vec::new();
        let (lo, hi) = self.ball_range(query, radius);
        for bucket in BucketRange::new(lo, hi) {
            if self.cell_gap_squared(query, &bucket) > r2 {
                continue;
            }
            if let Some(ids) = self.buckets.get(&bucket) {
                for &i in ids {
                    let d2 = (query - &self.points[i]).norm_squared();
                    if d2 <= r2 {
                        hits.push((i, d2));
                    }
                }
            }
        }
        hits
    }

    fn find_closest_within_radius(
        &self,
        query: &DVector<f64>,
        radius: f64,
    ) -> Option<(usize, f64)> {
        let r2 = radius * radius;
        let mut best: Option<(usize, f64)> = None;
        let (lo, hi) = self.ball_range(query, radius);
        for bucket in BucketRange::new(lo, hi) {
            if self.cell_gap_squared(query, &bucket) > r2 {
                continue;
            }
            if let Some(ids) = self.buckets.get(&bucket) {
                for &i in ids {
                    let d2 = (query - &self.points[i]).norm_squared();
                    if d2 <= r2 && best.is_none_or(|(_, b)| d2 < b) {
                        best = Some((i, d2));
                    }
                }
            }
        }
        best
    }
}

/// Lexicographic iterator over an inclusive n-dimensional integer range,
/// odometer-style: the last axis varies fastest.
struct BucketRange {
    lo: Vec<i32>,
    hi: Vec<i32>,
    current: Vec<i32>,
    done: bool,
}

impl BucketRange {
    fn new(lo: Vec<i32>, hi: Vec<i32>) -> Self {
        let done = lo.is_empty() || lo.iter().zip(&hi).any(|(a, b)| a > b);
        Self {
            current: lo.clone(),
            lo,
            hi,
            done,
        }
    }
}

impl Iterator for BucketRange {
    type Item = Vec<i32>;

    fn next(&mut self) -> Option<Vec<i32>> {
        if self.done {
            return None;
        }
        let out = self.current.clone();
        let mut axis = self.current.len();
        loop {
            if axis == 0 {
                self.done = true;
                break;
            }
            axis -= 1;
            if self.current[axis] < self.hi[axis] {
                self.current[axis] += 1;
                for a in axis + 1..self.current.len() {
                    self.current[a] = self.lo[a];
                }
                break;
            }
        }
        Some(out)
    }
}
