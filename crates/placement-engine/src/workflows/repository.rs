//! Storage seams injected into the matching and admission workflows.

use super::admissions::domain::{ApplicationId, ApplicationRecord, WaitlistEntry};
use super::matching::domain::{
    CandidateId, CandidateProfile, Institution, InstitutionId, Offering, OfferingId,
};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A precondition no longer holds; the caller should re-read and retry.
    #[error("record changed concurrently: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read access to raw candidate profiles.
pub trait CandidateStore: Send + Sync {
    fn profile(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError>;
    fn verified_candidates(&self) -> Result<Vec<CandidateProfile>, RepositoryError>;
}

/// Read access to offerings and the institutions that own them.
pub trait OfferingStore: Send + Sync {
    fn open_offerings(&self) -> Result<Vec<Offering>, RepositoryError>;
    fn offering(&self, id: &OfferingId) -> Result<Option<Offering>, RepositoryError>;
    fn institution(&self, id: &InstitutionId) -> Result<Option<Institution>, RepositoryError>;
}

/// Transactional access to applications and waitlists.
///
/// `commit` must apply every write in a transaction or none of them, and must reject the
/// transaction with [`RepositoryError::Conflict`] when any precondition fails.
pub trait ApplicationStore: Send + Sync {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn for_candidate(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn for_offering(&self, offering: &OfferingId)
        -> Result<Vec<ApplicationRecord>, RepositoryError>;
    /// Waitlist ordered by position, with the revision used for optimistic locking.
    fn waitlist(&self, offering: &OfferingId) -> Result<WaitlistSnapshot, RepositoryError>;
    /// Reserve an identifier that no stored application uses and that is never handed out
    /// twice, including across processes sharing the same backing store.
    fn allocate_id(&self) -> Result<ApplicationId, RepositoryError>;
    fn commit(&self, transaction: AdmissionTransaction) -> Result<(), RepositoryError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitlistSnapshot {
    pub revision: u64,
    pub entries: Vec<WaitlistEntry>,
}

/// Condition checked by the store, under its own lock, before any write is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    RecordVersion {
        application_id: ApplicationId,
        version: u64,
    },
    ActiveApplications {
        candidate_id: CandidateId,
        institution_id: InstitutionId,
        count: usize,
    },
    NoApplicationFor {
        candidate_id: CandidateId,
        offering_id: OfferingId,
    },
    SeatsTaken {
        offering_id: OfferingId,
        count: u32,
    },
    WaitlistRevision {
        offering_id: OfferingId,
        revision: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    InsertApplication(ApplicationRecord),
    /// Replace the stored record; the store bumps its version.
    UpdateApplication(ApplicationRecord),
    Enqueue(WaitlistEntry),
    Dequeue {
        offering_id: OfferingId,
        application_id: ApplicationId,
    },
    Reposition {
        offering_id: OfferingId,
        application_id: ApplicationId,
        position: u32,
    },
}

/// All-or-nothing unit of admission writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionTransaction {
    pub preconditions: Vec<Precondition>,
    pub writes: Vec<RecordWrite>,
}

impl AdmissionTransaction {
    pub fn require(&mut self, precondition: Precondition) {
        if !self.preconditions.contains(&precondition) {
            self.preconditions.push(precondition);
        }
    }

    pub fn write(&mut self, write: RecordWrite) {
        self.writes.push(write);
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
