use super::Locator;
use crate::na::DVector;

/// Locator backed by an exhaustive linear scan.
///
/// Every query walks the full list of stored vectors, computing squared L2
/// distances as it goes. O(N) per query, no auxiliary structure, no tuning
/// parameters. Serves as the correctness baseline for the hashed-grid
/// strategy and is competitive for small point counts.
#[derive(Debug, Clone, Default)]
pub struct BruteForceLocator {
    points: Vec<DVector<f64>>,
}

impl BruteForceLocator {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }
}

impl Locator for BruteForceLocator {
    fn reset(&mut self) {
        self.points.clear();
    }

    fn add(&mut self, point: &DVector<f64>) {
        if let Some(first) = self.points.first() {
            assert_eq!(
                first.len(),
                point.len(),
                "all vectors in a locator must share one dimensionality"
            );
        }
        self.points.push(point.clone());
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn get(&self, index: usize) -> &DVector<f64> {
        &self.points[index]
    }

    fn find_any_within_radius(&self, query: &DVector<f64>, radius: f64) -> Option<(usize, f64)> {
        let r2 = radius * radius;
        for (i, p) in self.points.iter().enumerate() {
            let d2 = (query - p).norm_squared();
            if d2 <= r2 {
                return Some((i, d2));
            }
        }
        None
    }

    fn find_all_within_radius(&self, query: &DVector<f64>, radius: f64) -> Vec<(usize, f64)> {
        let r2 = radius * radius;
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let d2 = (query - p).norm_squared();
                if d2 <= r2 { Some((i, d2)) } else { None }
            })
            .collect()
    }

    fn find_closest_within_radius(
        &self,
        query: &DVector<f64>,
        radius: f64,
    ) -> Option<(usize, f64)> {
        let r2 = radius * radius;
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let d2 = (query - p).norm_squared();
            if d2 <= r2 && best.is_none_or(|(_, b)| d2 < b) {
                best = Some((i, d2));
            }
        }
        best
    }
}
