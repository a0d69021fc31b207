use serde::{Deserialize, Serialize};

/// Pairwise travel distances (meters) and durations (seconds) between a set
/// of points. Stored as flat row-major vectors.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TravelMatrices {
    num_points: usize,
    distances: Vec<f64>,
    durations: Vec<f64>,
}

impl TravelMatrices {
    pub fn new(num_points: usize, distances: Vec<f64>, durations: Vec<f64>) -> Self {
        assert_eq!(distances.len(), num_points * num_points);
        assert_eq!(durations.len(), num_points * num_points);

        TravelMatrices {
            num_points,
            distances,
            durations,
        }
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn distance_meters(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.num_points + to]
    }

    pub fn duration_seconds(&self, from: usize, to: usize) -> f64 {
        self.durations[from * self.num_points + to]
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }
}

impl std::hash::Hash for TravelMatrices {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.num_points);
        for d in &self.distances {
            state.write_u64(d.to_bits());
        }
        for t in &self.durations {
            state.write_u64(t.to_bits());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing() {
        let matrices = TravelMatrices::new(
            2,
            vec![0.0, 10.0, 12.0, 0.0],
            vec![0.0, 60.0, 72.0, 0.0],
        );

        assert_eq!(matrices.distance_meters(0, 1), 10.0);
        assert_eq!(matrices.distance_meters(1, 0), 12.0);
        assert_eq!(matrices.duration_seconds(0, 1), 60.0);
        assert_eq!(matrices.duration_seconds(1, 1), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_mismatched_lengths() {
        TravelMatrices::new(2, vec![0.0; 3], vec![0.0; 4]);
    }
}
