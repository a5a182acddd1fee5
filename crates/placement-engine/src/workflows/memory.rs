//! In-memory store implementations used by the CLI and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, RwLock};

use super::admissions::domain::{ApplicationId, ApplicationRecord, WaitlistEntry};
use super::matching::domain::{
    CandidateId, CandidateProfile, Institution, InstitutionId, Offering, OfferingId,
};
use super::repository::{
    AdmissionTransaction, ApplicationStore, CandidateStore, OfferingStore, Precondition,
    RecordWrite, RepositoryError, WaitlistSnapshot,
};

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("store lock poisoned".to_string())
}

/// Candidates, offerings, and institutions held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    candidates: RwLock<BTreeMap<CandidateId, CandidateProfile>>,
    offerings: RwLock<BTreeMap<OfferingId, Offering>>,
    institutions: RwLock<BTreeMap<InstitutionId, Institution>>,
}

impl InMemoryCatalog {
    pub fn upsert_candidate(&self, profile: CandidateProfile) -> Result<(), RepositoryError> {
        let mut guard = self.candidates.write().map_err(|_| poisoned())?;
        guard.insert(profile.candidate_id.clone(), profile);
        Ok(())
    }

    pub fn upsert_offering(&self, offering: Offering) -> Result<(), RepositoryError> {
        let mut guard = self.offerings.write().map_err(|_| poisoned())?;
        guard.insert(offering.offering_id.clone(), offering);
        Ok(())
    }

    pub fn upsert_institution(&self, institution: Institution) -> Result<(), RepositoryError> {
        let mut guard = self.institutions.write().map_err(|_| poisoned())?;
        guard.insert(institution.institution_id.clone(), institution);
        Ok(())
    }

    pub fn remove_institution(&self, id: &InstitutionId) -> Result<bool, RepositoryError> {
        let mut guard = self.institutions.write().map_err(|_| poisoned())?;
        Ok(guard.remove(id).is_some())
    }
}

impl CandidateStore for InMemoryCatalog {
    fn profile(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        let guard = self.candidates.read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn verified_candidates(&self) -> Result<Vec<CandidateProfile>, RepositoryError> {
        let guard = self.candidates.read().map_err(|_| poisoned())?;
        Ok(guard
            .values()
            .filter(|profile| profile.verified)
            .cloned()
            .collect())
    }
}

impl OfferingStore for InMemoryCatalog {
    fn open_offerings(&self) -> Result<Vec<Offering>, RepositoryError> {
        let guard = self.offerings.read().map_err(|_| poisoned())?;
        Ok(guard
            .values()
            .filter(|offering| offering.is_open())
            .cloned()
            .collect())
    }

    fn offering(&self, id: &OfferingId) -> Result<Option<Offering>, RepositoryError> {
        let guard = self.offerings.read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn institution(&self, id: &InstitutionId) -> Result<Option<Institution>, RepositoryError> {
        let guard = self.institutions.read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
struct AdmissionState {
    applications: BTreeMap<ApplicationId, ApplicationRecord>,
    waitlists: HashMap<OfferingId, Vec<WaitlistEntry>>,
    revisions: HashMap<OfferingId, u64>,
    allocated: u64,
}

impl AdmissionState {
    fn check(&self, precondition: &Precondition) -> Result<(), RepositoryError> {
        let holds = match precondition {
            Precondition::RecordVersion {
                application_id,
                version,
            } => self
                .applications
                .get(application_id)
                .map(|record| record.version == *version)
                .unwrap_or(false),
            Precondition::ActiveApplications {
                candidate_id,
                institution_id,
                count,
            } => {
                self.applications
                    .values()
                    .filter(|record| {
                        &record.candidate_id == candidate_id
                            && &record.institution_id == institution_id
                            && record.status.is_active()
                    })
                    .count()
                    == *count
            }
            Precondition::NoApplicationFor {
                candidate_id,
                offering_id,
            } => !self.applications.values().any(|record| {
                &record.candidate_id == candidate_id && &record.offering_id == offering_id
            }),
            Precondition::SeatsTaken { offering_id, count } => {
                self.applications
                    .values()
                    .filter(|record| {
                        &record.offering_id == offering_id && record.status.holds_seat()
                    })
                    .count() as u32
                    == *count
            }
            Precondition::WaitlistRevision {
                offering_id,
                revision,
            } => self.revisions.get(offering_id).copied().unwrap_or(0) == *revision,
        };

        if holds {
            Ok(())
        } else {
            Err(RepositoryError::Conflict(format!("{precondition:?}")))
        }
    }

    fn apply(
        &mut self,
        write: RecordWrite,
        touched: &mut BTreeSet<OfferingId>,
    ) -> Result<(), RepositoryError> {
        match write {
            RecordWrite::InsertApplication(mut record) => {
                if self.applications.contains_key(&record.application_id) {
                    return Err(RepositoryError::Conflict(format!(
                        "application {} already exists",
                        record.application_id
                    )));
                }
                record.version = 1;
                self.applications.insert(record.application_id.clone(), record);
            }
            RecordWrite::UpdateApplication(mut record) => {
                let stored = self
                    .applications
                    .get(&record.application_id)
                    .ok_or(RepositoryError::NotFound)?;
                record.version = stored.version + 1;
                self.applications.insert(record.application_id.clone(), record);
            }
            RecordWrite::Enqueue(entry) => {
                touched.insert(entry.offering_id.clone());
                self.waitlists
                    .entry(entry.offering_id.clone())
                    .or_default()
                    .push(entry);
            }
            RecordWrite::Dequeue {
                offering_id,
                application_id,
            } => {
                let queue = self.waitlists.entry(offering_id.clone()).or_default();
                let before = queue.len();
                queue.retain(|entry| entry.application_id != application_id);
                if queue.len() == before {
                    return Err(RepositoryError::NotFound);
                }
                touched.insert(offering_id);
            }
            RecordWrite::Reposition {
                offering_id,
                application_id,
                position,
            } => {
                let entry = self
                    .waitlists
                    .get_mut(&offering_id)
                    .and_then(|queue| {
                        queue
                            .iter_mut()
                            .find(|entry| entry.application_id == application_id)
                    })
                    .ok_or(RepositoryError::NotFound)?;
                entry.position = position;
                touched.insert(offering_id);
            }
        }
        Ok(())
    }

    fn seal_waitlist(&mut self, offering_id: &OfferingId) -> Result<(), RepositoryError> {
        let queue = self.waitlists.entry(offering_id.clone()).or_default();
        queue.sort_by_key(|entry| entry.position);
        let contiguous = queue
            .iter()
            .enumerate()
            .all(|(index, entry)| entry.position as usize == index + 1);
        if !contiguous {
            return Err(RepositoryError::Conflict(format!(
                "waitlist for {offering_id} would not be contiguous"
            )));
        }
        *self.revisions.entry(offering_id.clone()).or_insert(0) += 1;
        Ok(())
    }
}

/// Applications and waitlists guarded by a single lock, committed copy-on-write.
#[derive(Debug, Default)]
pub struct InMemoryAdmissionStore {
    state: Mutex<AdmissionState>,
}

impl InMemoryAdmissionStore {
    pub fn all_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.state.lock().map_err(|_| poisoned())?;
        Ok(guard.applications.values().cloned().collect())
    }
}

impl ApplicationStore for InMemoryAdmissionStore {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.state.lock().map_err(|_| poisoned())?;
        Ok(guard.applications.get(id).cloned())
    }

    fn for_candidate(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.state.lock().map_err(|_| poisoned())?;
        Ok(guard
            .applications
            .values()
            .filter(|record| &record.candidate_id == candidate)
            .cloned()
            .collect())
    }

    fn for_offering(
        &self,
        offering: &OfferingId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.state.lock().map_err(|_| poisoned())?;
        Ok(guard
            .applications
            .values()
            .filter(|record| &record.offering_id == offering)
            .cloned()
            .collect())
    }

    fn waitlist(&self, offering: &OfferingId) -> Result<WaitlistSnapshot, RepositoryError> {
        let guard = self.state.lock().map_err(|_| poisoned())?;
        let mut entries = guard.waitlists.get(offering).cloned().unwrap_or_default();
        entries.sort_by_key(|entry| entry.position);
        Ok(WaitlistSnapshot {
            revision: guard.revisions.get(offering).copied().unwrap_or(0),
            entries,
        })
    }

    fn allocate_id(&self) -> Result<ApplicationId, RepositoryError> {
        let mut guard = self.state.lock().map_err(|_| poisoned())?;
        loop {
            guard.allocated += 1;
            let id = ApplicationId(format!("app-{:06}", guard.allocated));
            if !guard.applications.contains_key(&id) {
                return Ok(id);
            }
        }
    }

    fn commit(&self, transaction: AdmissionTransaction) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().map_err(|_| poisoned())?;

        for precondition in &transaction.preconditions {
            guard.check(precondition)?;
        }

        let mut staged = (*guard).clone();
        let mut touched = BTreeSet::new();
        for write in transaction.writes {
            staged.apply(write, &mut touched)?;
        }
        for offering_id in &touched {
            staged.seal_waitlist(offering_id)?;
        }

        *guard = staged;
        Ok(())
    }
}
