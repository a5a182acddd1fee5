//! Application lifecycle rules: per-institution caps, duplicate prevention, multi-offer
//! reconciliation, and waitlist promotion.
//!
//! Every state change is planned against a snapshot of the store and committed as one
//! [`AdmissionTransaction`](crate::workflows::repository::AdmissionTransaction). When the
//! store reports a conflict the plan is rebuilt from fresh reads.

pub mod domain;
pub(crate) mod rules;
pub mod service;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::workflows::matching::domain::{CandidateId, InstitutionId, OfferingId};
use crate::workflows::repository::RepositoryError;

pub use domain::{
    AcceptanceOutcome, ApplicationId, ApplicationRecord, ApplicationStatus,
    ApplicationStatusView, Promotion, ReviewDecision, WaitlistEntry, ACCEPTED_ELSEWHERE,
};
pub use rules::is_contiguous;
pub use service::{AdmissionRuleEnforcer, WithdrawalOutcome};

pub const DEFAULT_APPLICATION_CAP: usize = 2;
pub const DEFAULT_COMMIT_ATTEMPTS: u32 = 3;

/// Limits applied by [`AdmissionRuleEnforcer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Pending or approved applications a candidate may hold at one institution.
    pub max_active_per_institution: usize,
    /// Plan-and-commit attempts before a conflicting operation gives up.
    pub max_commit_attempts: u32,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_active_per_institution: DEFAULT_APPLICATION_CAP,
            max_commit_attempts: DEFAULT_COMMIT_ATTEMPTS,
        }
    }
}

impl AdmissionPolicy {
    pub(crate) fn sanitized(self) -> Self {
        Self {
            max_active_per_institution: self.max_active_per_institution.max(1),
            max_commit_attempts: self.max_commit_attempts.max(1),
        }
    }
}

/// Error raised by the admission rule enforcer.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("candidate {candidate_id} already holds {limit} active applications at {institution_id}")]
    CapExceeded {
        candidate_id: CandidateId,
        institution_id: InstitutionId,
        limit: usize,
    },
    #[error("candidate {candidate_id} already applied to {offering_id}")]
    Duplicate {
        candidate_id: CandidateId,
        offering_id: OfferingId,
    },
    #[error("offering {0} not found")]
    OfferingNotFound(OfferingId),
    #[error("offering {0} is not accepting applications")]
    OfferingClosed(OfferingId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("application {application_id} cannot move from {} to {}", from.label(), to.label())]
    InvalidTransition {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("candidate {candidate_id} already accepted {application_id}")]
    AlreadyAccepted {
        candidate_id: CandidateId,
        application_id: ApplicationId,
    },
    #[error("candidate {candidate_id} already holds a place at {institution_id}")]
    AlreadyAdmittedAtInstitution {
        candidate_id: CandidateId,
        institution_id: InstitutionId,
    },
    #[error("{operation} kept conflicting after {attempts} attempts")]
    CommitConflict {
        operation: &'static str,
        attempts: u32,
    },
    #[error("inconsistent admission state: {0}")]
    Inconsistent(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
