use chrono::{DateTime, Utc};

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, WaitlistEntry};
use super::AdmissionError;
use crate::workflows::matching::domain::{CandidateId, InstitutionId, OfferingId};
use crate::workflows::repository::{
    AdmissionTransaction, Precondition, RecordWrite, WaitlistSnapshot,
};

/// Active applications the candidate holds at `institution`.
pub(crate) fn active_at_institution(
    existing: &[ApplicationRecord],
    institution: &InstitutionId,
) -> usize {
    existing
        .iter()
        .filter(|record| &record.institution_id == institution && record.status.is_active())
        .count()
}

pub(crate) fn ensure_not_duplicate(
    existing: &[ApplicationRecord],
    candidate: &CandidateId,
    offering: &OfferingId,
) -> Result<(), AdmissionError> {
    if existing.iter().any(|record| &record.offering_id == offering) {
        return Err(AdmissionError::Duplicate {
            candidate_id: candidate.clone(),
            offering_id: offering.clone(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_under_cap(
    active: usize,
    limit: usize,
    candidate: &CandidateId,
    institution: &InstitutionId,
) -> Result<(), AdmissionError> {
    if active >= limit {
        return Err(AdmissionError::CapExceeded {
            candidate_id: candidate.clone(),
            institution_id: institution.clone(),
            limit,
        });
    }
    Ok(())
}

/// Refuse a seat to a candidate who accepted an offer or already holds a seat at the
/// record's institution.
pub(crate) fn ensure_admissible(
    record: &ApplicationRecord,
    held: &[ApplicationRecord],
) -> Result<(), AdmissionError> {
    for other in held
        .iter()
        .filter(|other| other.application_id != record.application_id)
    {
        if other.status == ApplicationStatus::Accepted {
            return Err(AdmissionError::AlreadyAccepted {
                candidate_id: record.candidate_id.clone(),
                application_id: other.application_id.clone(),
            });
        }
        if other.status.holds_seat() && other.institution_id == record.institution_id {
            return Err(AdmissionError::AlreadyAdmittedAtInstitution {
                candidate_id: record.candidate_id.clone(),
                institution_id: record.institution_id.clone(),
            });
        }
    }
    Ok(())
}

/// The candidate's stored applications with any rewrites already staged in `transaction`.
pub(crate) fn with_staged(
    transaction: &AdmissionTransaction,
    candidate: &CandidateId,
    mut held: Vec<ApplicationRecord>,
) -> Vec<ApplicationRecord> {
    for write in &transaction.writes {
        let staged = match write {
            RecordWrite::InsertApplication(record) | RecordWrite::UpdateApplication(record)
                if &record.candidate_id == candidate =>
            {
                record
            }
            _ => continue,
        };
        match held
            .iter_mut()
            .find(|record| record.application_id == staged.application_id)
        {
            Some(slot) => *slot = staged.clone(),
            None => held.push(staged.clone()),
        }
    }
    held
}

pub(crate) fn ensure_transition(
    record: &ApplicationRecord,
    next: ApplicationStatus,
) -> Result<(), AdmissionError> {
    if record.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(AdmissionError::InvalidTransition {
            application_id: record.application_id.clone(),
            from: record.status,
            to: next,
        })
    }
}

/// Stage a status change, pinned to the version that was read.
pub(crate) fn stage_transition(
    transaction: &mut AdmissionTransaction,
    record: &ApplicationRecord,
    status: ApplicationStatus,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> ApplicationRecord {
    transaction.require(Precondition::RecordVersion {
        application_id: record.application_id.clone(),
        version: record.version,
    });
    let updated = record.transitioned(status, reason, now);
    transaction.write(RecordWrite::UpdateApplication(updated.clone()));
    updated
}

/// Working copy of one offering's waitlist while a transaction is planned.
///
/// Removals compact the queue; [`WaitlistPlan::stage`] emits the dequeue and reposition
/// writes needed to move the stored queue to the planned one.
#[derive(Debug, Clone)]
pub(crate) struct WaitlistPlan {
    offering_id: OfferingId,
    revision: u64,
    original: Vec<WaitlistEntry>,
    queue: Vec<WaitlistEntry>,
    enqueued: Vec<WaitlistEntry>,
}

impl WaitlistPlan {
    pub(crate) fn new(offering_id: OfferingId, snapshot: WaitlistSnapshot) -> Self {
        let mut original = snapshot.entries;
        original.sort_by_key(|entry| entry.position);
        Self {
            offering_id,
            revision: snapshot.revision,
            queue: original.clone(),
            original,
            enqueued: Vec::new(),
        }
    }

    pub(crate) fn head(&self) -> Option<&WaitlistEntry> {
        self.queue.first()
    }

    pub(crate) fn remove(&mut self, application_id: &ApplicationId) -> Option<WaitlistEntry> {
        let index = self
            .queue
            .iter()
            .position(|entry| &entry.application_id == application_id)?;
        let removed = self.queue.remove(index);
        for (offset, entry) in self.queue.iter_mut().enumerate() {
            entry.position = offset as u32 + 1;
        }
        Some(removed)
    }

    pub(crate) fn enqueue(
        &mut self,
        candidate_id: CandidateId,
        application_id: ApplicationId,
    ) -> u32 {
        let position = self.queue.len() as u32 + 1;
        let entry = WaitlistEntry {
            offering_id: self.offering_id.clone(),
            candidate_id,
            application_id,
            position,
        };
        self.queue.push(entry.clone());
        self.enqueued.push(entry);
        position
    }

    pub(crate) fn stage(self, transaction: &mut AdmissionTransaction) {
        let changed = self.queue != self.original;
        if !changed {
            return;
        }

        transaction.require(Precondition::WaitlistRevision {
            offering_id: self.offering_id.clone(),
            revision: self.revision,
        });

        for entry in &self.original {
            let still_queued = self
                .queue
                .iter()
                .find(|planned| planned.application_id == entry.application_id);
            match still_queued {
                None => transaction.write(RecordWrite::Dequeue {
                    offering_id: self.offering_id.clone(),
                    application_id: entry.application_id.clone(),
                }),
                Some(planned) if planned.position != entry.position => {
                    transaction.write(RecordWrite::Reposition {
                        offering_id: self.offering_id.clone(),
                        application_id: entry.application_id.clone(),
                        position: planned.position,
                    })
                }
                Some(_) => {}
            }
        }

        for entry in self.enqueued {
            if let Some(planned) = self
                .queue
                .iter()
                .find(|planned| planned.application_id == entry.application_id)
            {
                transaction.write(RecordWrite::Enqueue(planned.clone()));
            }
        }
    }
}

/// True when positions run 1..=n without gaps or duplicates.
pub fn is_contiguous(entries: &[WaitlistEntry]) -> bool {
    let mut positions: Vec<u32> = entries.iter().map(|entry| entry.position).collect();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position as usize == index + 1)
}
