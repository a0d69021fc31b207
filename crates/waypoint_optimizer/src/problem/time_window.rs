use std::cmp;

use jiff::{SignedDuration, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Permitted arrival interval at a stop. Either bound may be open.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct TimeWindow {
    earliest: Option<Timestamp>,
    latest: Option<Timestamp>,
}

impl TimeWindow {
    pub fn new(earliest: Option<Timestamp>, latest: Option<Timestamp>) -> Self {
        TimeWindow { earliest, latest }
    }

    pub fn earliest(&self) -> Option<Timestamp> {
        self.earliest
    }

    pub fn latest(&self) -> Option<Timestamp> {
        self.latest
    }

    pub fn is_empty(&self) -> bool {
        self.earliest.is_none() && self.latest.is_none()
    }

    pub fn is_inverted(&self) -> bool {
        match (self.earliest, self.latest) {
            (Some(earliest), Some(latest)) => earliest > latest,
            _ => false,
        }
    }

    /// Seconds past the latest permitted arrival. Zero when on time or the
    /// window is open-ended.
    pub fn lateness_secs(&self, arrival: Timestamp) -> i64 {
        match self.latest {
            Some(latest) => cmp::max(arrival.as_second() - latest.as_second(), 0),
            None => 0,
        }
    }

    /// Time to wait before service may start. Arriving early is a wait, not
    /// a violation.
    pub fn wait_before(&self, arrival: Timestamp) -> SignedDuration {
        match self.earliest {
            Some(earliest) if earliest > arrival => earliest.duration_since(arrival),
            _ => SignedDuration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(earliest: &str, latest: &str) -> TimeWindow {
        TimeWindow::new(Some(earliest.parse().unwrap()), Some(latest.parse().unwrap()))
    }

    #[test]
    fn test_lateness() {
        let tw = window("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z");

        let on_time: Timestamp = "2026-03-02T09:30:00Z".parse().unwrap();
        assert_eq!(tw.lateness_secs(on_time), 0);

        let late: Timestamp = "2026-03-02T10:30:00Z".parse().unwrap();
        assert_eq!(tw.lateness_secs(late), 30 * 60);
    }

    #[test]
    fn test_wait_before() {
        let tw = window("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z");

        let early: Timestamp = "2026-03-02T08:45:00Z".parse().unwrap();
        assert_eq!(tw.wait_before(early), SignedDuration::from_mins(15));

        let after_open: Timestamp = "2026-03-02T09:05:00Z".parse().unwrap();
        assert_eq!(tw.wait_before(after_open), SignedDuration::ZERO);
    }

    #[test]
    fn test_open_ended() {
        let tw = TimeWindow::new(None, None);
        assert!(tw.is_empty());
        assert_eq!(tw.lateness_secs("2026-03-02T23:00:00Z".parse().unwrap()), 0);
    }

    #[test]
    fn test_inverted() {
        let tw = window("2026-03-02T10:00:00Z", "2026-03-02T09:00:00Z");
        assert!(tw.is_inverted());
    }
}
