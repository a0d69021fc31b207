use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::OptimizationResult;

use super::request::OptimizeRequest;

/// Job lifecycle. Transitions only move forward; the four right-most
/// states are terminal.
#[derive(Serialize, Deserialize, JsonSchema, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Infeasible,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Infeasible | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match self {
            JobStatus::Pending => next != JobStatus::Pending,
            JobStatus::Running => next.is_terminal(),
            _ => false,
        }
    }
}

/// One optimization job record, owned by the job manager for its whole
/// lifecycle. The input is immutable once the job starts; the result is
/// attached exactly once, on the terminal transition.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OptimizationJob {
    pub id: Uuid,
    pub tenant: String,
    pub name: String,
    pub request: OptimizeRequest,

    pub status: JobStatus,
    pub error: Option<String>,
    pub result: Option<OptimizationResult>,

    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

impl OptimizationJob {
    pub fn new(tenant: String, request: OptimizeRequest) -> Self {
        OptimizationJob {
            id: Uuid::new_v4(),
            tenant,
            name: request.name.clone(),
            request,
            status: JobStatus::Pending,
            error: None,
            result: None,
            created_at: Timestamp::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Applies a forward transition, stamping the matching timestamp.
    /// Returns false (and leaves the record untouched) on a regression.
    pub fn transition_to(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }

        self.status = next;
        match next {
            JobStatus::Running => self.started_at = Some(Timestamp::now()),
            status if status.is_terminal() => self.finished_at = Some(Timestamp::now()),
            _ => {}
        }

        true
    }
}
