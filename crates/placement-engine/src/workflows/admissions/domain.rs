use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::matching::domain::{CandidateId, InstitutionId, OfferingId};

/// Reason recorded on applications voided by multi-offer reconciliation.
pub const ACCEPTED_ELSEWHERE: &str = "accepted elsewhere";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of an application from submission to a final outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Waitlisted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Waitlisted => "waitlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Counts toward the per-institution application cap.
    pub const fn is_active(self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Approved)
    }

    /// Holds one of the offering's seats.
    pub const fn holds_seat(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Accepted)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Waitlisted)
                | (Pending, Withdrawn)
                | (Waitlisted, Approved)
                | (Waitlisted, Rejected)
                | (Waitlisted, Withdrawn)
                | (Approved, Accepted)
                | (Approved, Rejected)
                | (Approved, Withdrawn)
        )
    }
}

/// Stored application together with its optimistic-concurrency version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub offering_id: OfferingId,
    pub institution_id: InstitutionId,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Incremented by the store on every committed write.
    pub version: u64,
}

impl ApplicationRecord {
    /// Copy of the record moved to `status`, stamped at `now`.
    pub fn transitioned(
        &self,
        status: ApplicationStatus,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            status_reason: reason.map(str::to_string),
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application_id.clone(),
            offering_id: self.offering_id.clone(),
            status: self.status.label(),
            reason: self.status_reason.clone(),
        }
    }
}

/// Place in an offering's waitlist. Positions start at 1 and have no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub offering_id: OfferingId,
    pub candidate_id: CandidateId,
    pub application_id: ApplicationId,
    pub position: u32,
}

/// Reviewer verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
    Waitlist,
}

/// Waitlisted application moved into a freed seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub offering_id: OfferingId,
}

/// Committed state change produced by accepting an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceOutcome {
    pub accepted: ApplicationId,
    pub rejected: Vec<ApplicationId>,
    pub withdrawn_from_waitlists: Vec<ApplicationId>,
    pub promoted: Vec<Promotion>,
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub offering_id: OfferingId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
