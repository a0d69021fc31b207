use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The objective a job optimizes for. A closed set: new goals extend the
/// enum and its weighting, nothing else.
#[derive(Serialize, Deserialize, JsonSchema, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    MinimizeDistance,
    MinimizeTime,
    MinimizeCost,
    Balance,
}

impl OptimizationGoal {
    /// Relative weights applied to the normalized (distance, time, cost)
    /// components of the raw objective.
    pub fn objective_weights(&self) -> (f64, f64, f64) {
        match self {
            OptimizationGoal::MinimizeDistance => (1.0, 0.0, 0.0),
            OptimizationGoal::MinimizeTime => (0.0, 1.0, 0.0),
            OptimizationGoal::MinimizeCost => (0.0, 0.0, 1.0),
            OptimizationGoal::Balance => (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_wire_format() {
        let goal: OptimizationGoal = serde_json::from_str("\"minimize_distance\"").unwrap();
        assert_eq!(goal, OptimizationGoal::MinimizeDistance);

        assert!(serde_json::from_str::<OptimizationGoal>("\"fastest\"").is_err());
    }

    #[test]
    fn test_weights_sum_to_one() {
        for goal in [
            OptimizationGoal::MinimizeDistance,
            OptimizationGoal::MinimizeTime,
            OptimizationGoal::MinimizeCost,
            OptimizationGoal::Balance,
        ] {
            let (d, t, c) = goal.objective_weights();
            assert!((d + t + c - 1.0).abs() < 1e-9);
        }
    }
}
