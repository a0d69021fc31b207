use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, JsonSchema, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Magnitude: kilograms over the vehicle's maximum.
    OverWeight,
    /// Magnitude: cubic meters over the vehicle's maximum.
    OverVolume,
    /// Magnitude: packages over the vehicle's maximum.
    OverPackages,
    /// Magnitude: minutes past the stop's latest permitted arrival.
    LateArrival,
    /// Magnitude: minutes the route runs past the driver's shift end.
    ShiftExceeded,
    /// Magnitude: minutes over the driver's daily working limit.
    WorkingHoursExceeded,
    /// Magnitude: minutes over the job's maximum route duration.
    MaxDurationExceeded,
    /// Magnitude: kilometers beyond the electric vehicle's range.
    RangeExceeded,
    /// Magnitude: stops over the job's per-route limit.
    TooManyStops,
}

/// One constraint breach with its magnitude in the unit documented on the
/// kind. Violations are data, never errors: they feed both fitness and the
/// final result.
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub magnitude: f64,
    pub stop_id: Option<String>,
}

impl Violation {
    pub fn route_level(kind: ViolationKind, magnitude: f64) -> Self {
        Violation {
            kind,
            magnitude,
            stop_id: None,
        }
    }

    pub fn at_stop(kind: ViolationKind, magnitude: f64, stop_id: String) -> Self {
        Violation {
            kind,
            magnitude,
            stop_id: Some(stop_id),
        }
    }

    /// Contribution to the fitness hard score. Magnitudes are already in
    /// comparable units (minutes, kilograms, kilometers); per-kind factors
    /// keep a one-unit breach of any kind in the same order of magnitude.
    pub fn penalty(&self) -> f64 {
        let factor = match self.kind {
            ViolationKind::OverWeight => 1.0,
            ViolationKind::OverVolume => 10.0,
            ViolationKind::OverPackages => 1.0,
            ViolationKind::LateArrival => 1.0,
            ViolationKind::ShiftExceeded => 1.0,
            ViolationKind::WorkingHoursExceeded => 1.0,
            ViolationKind::MaxDurationExceeded => 1.0,
            ViolationKind::RangeExceeded => 1.0,
            ViolationKind::TooManyStops => 10.0,
        };

        factor * self.magnitude
    }
}

#[derive(Default, Clone, Debug)]
pub struct ViolationReport {
    violations: Vec<Violation>,
}

impl ViolationReport {
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn penalty(&self) -> f64 {
        self.violations.iter().map(Violation::penalty).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_is_positive_and_proportional() {
        let small = Violation::route_level(ViolationKind::LateArrival, 5.0);
        let large = Violation::route_level(ViolationKind::LateArrival, 50.0);

        assert!(small.penalty() > 0.0);
        assert!(large.penalty() > small.penalty());
        assert!((large.penalty() - 10.0 * small.penalty()).abs() < 1e-9);
    }

    #[test]
    fn test_report_aggregation() {
        let mut report = ViolationReport::default();
        assert!(report.is_feasible());

        report.push(Violation::route_level(ViolationKind::OverWeight, 12.0));
        report.push(Violation::at_stop(
            ViolationKind::LateArrival,
            30.0,
            "stop-1".to_owned(),
        ));

        assert!(!report.is_feasible());
        assert_eq!(report.len(), 2);
        assert_eq!(report.penalty(), 42.0);
    }
}
