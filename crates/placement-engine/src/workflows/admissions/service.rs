use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    AcceptanceOutcome, ApplicationId, ApplicationRecord, ApplicationStatus, Promotion,
    ReviewDecision, ACCEPTED_ELSEWHERE,
};
use super::rules::{
    active_at_institution, ensure_admissible, ensure_not_duplicate, ensure_transition,
    ensure_under_cap, stage_transition, with_staged, WaitlistPlan,
};
use super::{AdmissionError, AdmissionPolicy};
use crate::workflows::matching::domain::{CandidateId, OfferingId};
use crate::workflows::repository::{
    AdmissionTransaction, ApplicationStore, OfferingStore, Precondition, RecordWrite,
    RepositoryError,
};

const OFFERING_FULL: &str = "offering full";
const PROMOTED_FROM_WAITLIST: &str = "promoted from waitlist";
const ADMITTED_AT_INSTITUTION: &str = "already admitted at institution";
const CAP_REACHED: &str = "application cap reached";

/// Result of a withdrawal, including the waitlisted application that took the seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalOutcome {
    pub withdrawn: ApplicationId,
    pub promoted: Option<Promotion>,
}

/// Enforces application caps, duplicate prevention, offer reconciliation, and waitlist
/// promotion on top of a transactional [`ApplicationStore`].
pub struct AdmissionRuleEnforcer<A, O> {
    applications: Arc<A>,
    offerings: Arc<O>,
    policy: AdmissionPolicy,
}

impl<A, O> AdmissionRuleEnforcer<A, O>
where
    A: ApplicationStore + 'static,
    O: OfferingStore + 'static,
{
    pub fn new(applications: Arc<A>, offerings: Arc<O>, policy: AdmissionPolicy) -> Self {
        Self {
            applications,
            offerings,
            policy: policy.sanitized(),
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Submit a new pending application for `offering_id`.
    pub fn create_application(
        &self,
        candidate_id: &CandidateId,
        offering_id: &OfferingId,
    ) -> Result<ApplicationRecord, AdmissionError> {
        self.commit_with_retries("create_application", || {
            let offering = self
                .offerings
                .offering(offering_id)?
                .ok_or_else(|| AdmissionError::OfferingNotFound(offering_id.clone()))?;
            if !offering.is_open() {
                return Err(AdmissionError::OfferingClosed(offering_id.clone()));
            }

            let existing = self.applications.for_candidate(candidate_id)?;
            ensure_not_duplicate(&existing, candidate_id, offering_id)?;

            let active = active_at_institution(&existing, &offering.institution_id);
            if let Err(error) = ensure_under_cap(
                active,
                self.policy.max_active_per_institution,
                candidate_id,
                &offering.institution_id,
            ) {
                info!(
                    candidate = %candidate_id,
                    institution = %offering.institution_id,
                    active,
                    "application cap reached"
                );
                return Err(error);
            }

            let now = Utc::now();
            let record = ApplicationRecord {
                application_id: self.applications.allocate_id()?,
                candidate_id: candidate_id.clone(),
                offering_id: offering_id.clone(),
                institution_id: offering.institution_id.clone(),
                status: ApplicationStatus::Pending,
                status_reason: None,
                submitted_at: now,
                updated_at: now,
                version: 1,
            };

            let mut transaction = AdmissionTransaction::default();
            transaction.require(Precondition::NoApplicationFor {
                candidate_id: candidate_id.clone(),
                offering_id: offering_id.clone(),
            });
            transaction.require(Precondition::ActiveApplications {
                candidate_id: candidate_id.clone(),
                institution_id: offering.institution_id.clone(),
                count: active,
            });
            transaction.write(RecordWrite::InsertApplication(record.clone()));

            Ok((transaction, record))
        })
    }

    /// Apply a reviewer's decision to a pending application.
    ///
    /// Approving into a full offering places the application on the waitlist instead.
    pub fn review(
        &self,
        application_id: &ApplicationId,
        decision: ReviewDecision,
    ) -> Result<ApplicationRecord, AdmissionError> {
        self.commit_with_retries("review", || {
            let record = self.load(application_id)?;
            if record.status != ApplicationStatus::Pending {
                let to = match decision {
                    ReviewDecision::Approve => ApplicationStatus::Approved,
                    ReviewDecision::Reject => ApplicationStatus::Rejected,
                    ReviewDecision::Waitlist => ApplicationStatus::Waitlisted,
                };
                return Err(AdmissionError::InvalidTransition {
                    application_id: record.application_id.clone(),
                    from: record.status,
                    to,
                });
            }

            let now = Utc::now();
            let mut transaction = AdmissionTransaction::default();

            let updated = match decision {
                ReviewDecision::Reject => stage_transition(
                    &mut transaction,
                    &record,
                    ApplicationStatus::Rejected,
                    None,
                    now,
                ),
                ReviewDecision::Waitlist => {
                    self.stage_waitlisting(&mut transaction, &record, None, now)?
                }
                ReviewDecision::Approve => {
                    self.ensure_may_be_admitted(&record)?;

                    let offering = self.offerings.offering(&record.offering_id)?.ok_or_else(
                        || AdmissionError::OfferingNotFound(record.offering_id.clone()),
                    )?;
                    let seats_taken = self.seats_taken(&record.offering_id)?;
                    transaction.require(Precondition::SeatsTaken {
                        offering_id: record.offering_id.clone(),
                        count: seats_taken,
                    });

                    if seats_taken >= offering.capacity {
                        self.stage_waitlisting(
                            &mut transaction,
                            &record,
                            Some(OFFERING_FULL),
                            now,
                        )?
                    } else {
                        stage_transition(
                            &mut transaction,
                            &record,
                            ApplicationStatus::Approved,
                            None,
                            now,
                        )
                    }
                }
            };

            Ok((transaction, updated))
        })
    }

    /// Accept an approved offer, voiding the candidate's other offers and promoting from
    /// each freed offering's waitlist in the same transaction.
    pub fn accept_offer(
        &self,
        application_id: &ApplicationId,
    ) -> Result<AcceptanceOutcome, AdmissionError> {
        self.commit_with_retries("accept_offer", || {
            let record = self.load(application_id)?;
            ensure_transition(&record, ApplicationStatus::Accepted)?;

            let held = self.applications.for_candidate(&record.candidate_id)?;
            if let Some(accepted) = held
                .iter()
                .find(|other| other.status == ApplicationStatus::Accepted)
            {
                return Err(AdmissionError::AlreadyAccepted {
                    candidate_id: record.candidate_id.clone(),
                    application_id: accepted.application_id.clone(),
                });
            }

            let now = Utc::now();
            let mut transaction = AdmissionTransaction::default();
            let mut waitlists: BTreeMap<OfferingId, WaitlistPlan> = BTreeMap::new();

            stage_transition(
                &mut transaction,
                &record,
                ApplicationStatus::Accepted,
                None,
                now,
            );

            let mut outcome = AcceptanceOutcome {
                accepted: record.application_id.clone(),
                rejected: Vec::new(),
                withdrawn_from_waitlists: Vec::new(),
                promoted: Vec::new(),
            };

            for other in held
                .iter()
                .filter(|other| other.application_id != record.application_id)
            {
                match other.status {
                    ApplicationStatus::Approved => {
                        stage_transition(
                            &mut transaction,
                            other,
                            ApplicationStatus::Rejected,
                            Some(ACCEPTED_ELSEWHERE),
                            now,
                        );
                        outcome.rejected.push(other.application_id.clone());

                        let plan = self.waitlist_plan(&mut waitlists, &other.offering_id)?;
                        if let Some(promotion) =
                            self.stage_promotion(&mut transaction, plan, now)?
                        {
                            outcome.promoted.push(promotion);
                        }
                    }
                    ApplicationStatus::Waitlisted => {
                        stage_transition(
                            &mut transaction,
                            other,
                            ApplicationStatus::Rejected,
                            Some(ACCEPTED_ELSEWHERE),
                            now,
                        );
                        let plan = self.waitlist_plan(&mut waitlists, &other.offering_id)?;
                        plan.remove(&other.application_id);
                        outcome
                            .withdrawn_from_waitlists
                            .push(other.application_id.clone());
                    }
                    _ => {}
                }
            }

            for plan in waitlists.into_values() {
                plan.stage(&mut transaction);
            }

            Ok((transaction, outcome))
        })
    }

    /// Withdraw a pending, approved, or waitlisted application.
    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
    ) -> Result<WithdrawalOutcome, AdmissionError> {
        self.commit_with_retries("withdraw", || {
            let record = self.load(application_id)?;
            ensure_transition(&record, ApplicationStatus::Withdrawn)?;

            let now = Utc::now();
            let mut transaction = AdmissionTransaction::default();
            stage_transition(
                &mut transaction,
                &record,
                ApplicationStatus::Withdrawn,
                None,
                now,
            );

            let mut promoted = None;
            match record.status {
                ApplicationStatus::Approved => {
                    let mut plan = WaitlistPlan::new(
                        record.offering_id.clone(),
                        self.applications.waitlist(&record.offering_id)?,
                    );
                    promoted = self.stage_promotion(&mut transaction, &mut plan, now)?;
                    plan.stage(&mut transaction);
                }
                ApplicationStatus::Waitlisted => {
                    let mut plan = WaitlistPlan::new(
                        record.offering_id.clone(),
                        self.applications.waitlist(&record.offering_id)?,
                    );
                    plan.remove(&record.application_id);
                    plan.stage(&mut transaction);
                }
                _ => {}
            }

            let outcome = WithdrawalOutcome {
                withdrawn: record.application_id.clone(),
                promoted,
            };
            Ok((transaction, outcome))
        })
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<ApplicationRecord, AdmissionError> {
        self.load(application_id)
    }

    /// Candidate's applications, oldest first.
    pub fn applications_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, AdmissionError> {
        let mut records = self.applications.for_candidate(candidate_id)?;
        records.sort_by(|left, right| {
            left.submitted_at
                .cmp(&right.submitted_at)
                .then_with(|| left.application_id.cmp(&right.application_id))
        });
        Ok(records)
    }

    /// Seats held by approved and accepted applications.
    pub fn seats_taken(&self, offering_id: &OfferingId) -> Result<u32, AdmissionError> {
        let taken = self
            .applications
            .for_offering(offering_id)?
            .iter()
            .filter(|record| record.status.holds_seat())
            .count();
        Ok(taken as u32)
    }

    fn load(&self, application_id: &ApplicationId) -> Result<ApplicationRecord, AdmissionError> {
        self.applications
            .fetch(application_id)?
            .ok_or_else(|| AdmissionError::ApplicationNotFound(application_id.clone()))
    }

    fn ensure_may_be_admitted(&self, record: &ApplicationRecord) -> Result<(), AdmissionError> {
        let held = self.applications.for_candidate(&record.candidate_id)?;
        ensure_admissible(record, &held)
    }

    fn stage_waitlisting(
        &self,
        transaction: &mut AdmissionTransaction,
        record: &ApplicationRecord,
        reason: Option<&str>,
        now: chrono::DateTime<Utc>,
    ) -> Result<ApplicationRecord, AdmissionError> {
        let mut plan = WaitlistPlan::new(
            record.offering_id.clone(),
            self.applications.waitlist(&record.offering_id)?,
        );
        let position = plan.enqueue(record.candidate_id.clone(), record.application_id.clone());
        let updated = stage_transition(
            transaction,
            record,
            ApplicationStatus::Waitlisted,
            reason,
            now,
        );
        plan.stage(transaction);

        info!(
            application = %record.application_id,
            offering = %record.offering_id,
            position,
            "application waitlisted"
        );
        Ok(updated)
    }

    fn waitlist_plan<'p>(
        &self,
        plans: &'p mut BTreeMap<OfferingId, WaitlistPlan>,
        offering_id: &OfferingId,
    ) -> Result<&'p mut WaitlistPlan, AdmissionError> {
        if !plans.contains_key(offering_id) {
            let snapshot = self.applications.waitlist(offering_id)?;
            plans.insert(
                offering_id.clone(),
                WaitlistPlan::new(offering_id.clone(), snapshot),
            );
        }
        plans
            .get_mut(offering_id)
            .ok_or_else(|| AdmissionError::Inconsistent(format!("waitlist plan for {offering_id}")))
    }

    /// Move the first eligible waitlisted application in `plan` into the freed seat.
    ///
    /// Heads whose candidate accepted elsewhere, already holds a seat at the institution, or
    /// sits at the application cap there are rejected and dropped from the queue.
    fn stage_promotion(
        &self,
        transaction: &mut AdmissionTransaction,
        plan: &mut WaitlistPlan,
        now: chrono::DateTime<Utc>,
    ) -> Result<Option<Promotion>, AdmissionError> {
        while let Some(head) = plan.head().cloned() {
            let waitlisted = self.load(&head.application_id)?;
            if waitlisted.status != ApplicationStatus::Waitlisted {
                return Err(AdmissionError::Inconsistent(format!(
                    "waitlist head {} has status {}",
                    head.application_id,
                    waitlisted.status.label()
                )));
            }

            let stored = self.applications.for_candidate(&waitlisted.candidate_id)?;
            let active = active_at_institution(&stored, &waitlisted.institution_id);
            let held = with_staged(transaction, &waitlisted.candidate_id, stored);

            let blocked = match ensure_admissible(&waitlisted, &held) {
                Err(AdmissionError::AlreadyAccepted { .. }) => Some(ACCEPTED_ELSEWHERE),
                Err(_) => Some(ADMITTED_AT_INSTITUTION),
                Ok(())
                    if active_at_institution(&held, &waitlisted.institution_id)
                        >= self.policy.max_active_per_institution =>
                {
                    Some(CAP_REACHED)
                }
                Ok(()) => None,
            };
            plan.remove(&head.application_id);

            if let Some(reason) = blocked {
                info!(
                    application = %head.application_id,
                    offering = %head.offering_id,
                    reason,
                    "waitlist head skipped"
                );
                stage_transition(
                    transaction,
                    &waitlisted,
                    ApplicationStatus::Rejected,
                    Some(reason),
                    now,
                );
                continue;
            }

            transaction.require(Precondition::ActiveApplications {
                candidate_id: waitlisted.candidate_id.clone(),
                institution_id: waitlisted.institution_id.clone(),
                count: active,
            });
            stage_transition(
                transaction,
                &waitlisted,
                ApplicationStatus::Approved,
                Some(PROMOTED_FROM_WAITLIST),
                now,
            );

            return Ok(Some(Promotion {
                application_id: head.application_id,
                candidate_id: head.candidate_id,
                offering_id: head.offering_id,
            }));
        }
        Ok(None)
    }

    /// Plan and commit a transaction, re-planning from fresh reads after a conflict.
    fn commit_with_retries<T, F>(
        &self,
        operation: &'static str,
        mut plan: F,
    ) -> Result<T, AdmissionError>
    where
        F: FnMut() -> Result<(AdmissionTransaction, T), AdmissionError>,
    {
        let attempts = self.policy.max_commit_attempts;
        for attempt in 1..=attempts {
            let (transaction, value) = plan()?;
            if transaction.is_empty() {
                return Ok(value);
            }

            let writes = transaction.writes.len();
            match self.applications.commit(transaction) {
                Ok(()) => {
                    info!(operation, attempt, writes, "admission transaction committed");
                    return Ok(value);
                }
                Err(RepositoryError::Conflict(detail)) => {
                    warn!(operation, attempt, %detail, "admission transaction conflicted");
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(AdmissionError::CommitConflict {
            operation,
            attempts,
        })
    }
}
