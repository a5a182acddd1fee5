use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use crate::workflows::admissions::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ReviewDecision, WaitlistEntry,
};
use crate::workflows::admissions::{AdmissionPolicy, AdmissionRuleEnforcer};
use crate::workflows::matching::domain::{
    CandidateId, Institution, InstitutionId, Offering, OfferingId, OfferingKind, OfferingStatus,
    RequirementSet,
};
use crate::workflows::memory::{InMemoryAdmissionStore, InMemoryCatalog};
use crate::workflows::repository::{
    AdmissionTransaction, ApplicationStore, RepositoryError, WaitlistSnapshot,
};

pub(super) type MemoryEnforcer = AdmissionRuleEnforcer<InMemoryAdmissionStore, InMemoryCatalog>;

pub(super) fn candidate(id: &str) -> CandidateId {
    CandidateId(id.to_string())
}

pub(super) fn offering_id(id: &str) -> OfferingId {
    OfferingId(id.to_string())
}

fn offering(id: &str, institution: &str, capacity: u32) -> Offering {
    let offering_id = offering_id(id);
    Offering {
        requirements: RequirementSet {
            offering_id: offering_id.clone(),
            subjects: BTreeMap::new(),
            min_education: None,
            min_experience: None,
            skills: BTreeSet::new(),
            performance_tier: None,
            display_text: String::new(),
        },
        offering_id,
        institution_id: InstitutionId(institution.to_string()),
        kind: OfferingKind::Course,
        title: id.to_string(),
        capacity,
        status: OfferingStatus::Open,
        created_at: Utc
            .with_ymd_and_hms(2025, 2, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
        revision: 1,
    }
}

/// Two institutions. `north-cs` and `south-law` have a single seat each.
pub(super) fn catalog() -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::default();
    for id in ["uni-north", "uni-south"] {
        catalog
            .upsert_institution(Institution {
                institution_id: InstitutionId(id.to_string()),
                name: id.to_string(),
            })
            .expect("institution stored");
    }
    let mut closed = offering("north-archive", "uni-north", 10);
    closed.status = OfferingStatus::Closed;
    for target in [
        offering("north-cs", "uni-north", 1),
        offering("north-math", "uni-north", 5),
        offering("north-bio", "uni-north", 5),
        offering("south-law", "uni-south", 1),
        offering("south-med", "uni-south", 5),
        closed,
    ] {
        catalog.upsert_offering(target).expect("offering stored");
    }
    Arc::new(catalog)
}

pub(super) fn enforcer() -> (Arc<InMemoryAdmissionStore>, MemoryEnforcer) {
    let store = Arc::new(InMemoryAdmissionStore::default());
    let enforcer = AdmissionRuleEnforcer::new(store.clone(), catalog(), AdmissionPolicy::default());
    (store, enforcer)
}

pub(super) fn apply<A>(
    enforcer: &AdmissionRuleEnforcer<A, InMemoryCatalog>,
    who: &str,
    target: &str,
) -> ApplicationRecord
where
    A: ApplicationStore + 'static,
{
    enforcer
        .create_application(&candidate(who), &offering_id(target))
        .expect("application created")
}

pub(super) fn review<A>(
    enforcer: &AdmissionRuleEnforcer<A, InMemoryCatalog>,
    application: &ApplicationId,
    decision: ReviewDecision,
) -> ApplicationRecord
where
    A: ApplicationStore + 'static,
{
    enforcer
        .review(application, decision)
        .expect("review committed")
}

pub(super) fn approved<A>(
    enforcer: &AdmissionRuleEnforcer<A, InMemoryCatalog>,
    who: &str,
    target: &str,
) -> ApplicationRecord
where
    A: ApplicationStore + 'static,
{
    let record = apply(enforcer, who, target);
    review(enforcer, &record.application_id, ReviewDecision::Approve)
}

pub(super) fn status_of<S: ApplicationStore>(store: &S, id: &ApplicationId) -> ApplicationStatus {
    store
        .fetch(id)
        .expect("fetch succeeds")
        .expect("record present")
        .status
}

pub(super) fn queue<S: ApplicationStore>(store: &S, target: &str) -> Vec<(String, u32)> {
    store
        .waitlist(&offering_id(target))
        .expect("waitlist readable")
        .entries
        .into_iter()
        .map(|entry| (entry.candidate_id.0, entry.position))
        .collect()
}

pub(super) fn entries<S: ApplicationStore>(store: &S, target: &str) -> Vec<WaitlistEntry> {
    store
        .waitlist(&offering_id(target))
        .expect("waitlist readable")
        .entries
}

type Interleaving = Box<dyn FnOnce() + Send>;

/// Store wrapper that can fail upcoming commits or run another writer just before one.
#[derive(Default)]
pub(super) struct ScriptedStore {
    inner: Arc<InMemoryAdmissionStore>,
    failures: Mutex<VecDeque<RepositoryError>>,
    interleavings: Mutex<VecDeque<Interleaving>>,
    commits: AtomicUsize,
}

impl ScriptedStore {
    pub(super) fn inner(&self) -> Arc<InMemoryAdmissionStore> {
        self.inner.clone()
    }

    pub(super) fn fail_next(&self, errors: impl IntoIterator<Item = RepositoryError>) {
        self.failures
            .lock()
            .expect("failures lock")
            .extend(errors);
    }

    pub(super) fn interleave(&self, writer: impl FnOnce() + Send + 'static) {
        self.interleavings
            .lock()
            .expect("interleavings lock")
            .push_back(Box::new(writer));
    }

    pub(super) fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl ApplicationStore for ScriptedStore {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn for_candidate(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.for_candidate(candidate)
    }

    fn for_offering(
        &self,
        offering: &OfferingId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.for_offering(offering)
    }

    fn waitlist(&self, offering: &OfferingId) -> Result<WaitlistSnapshot, RepositoryError> {
        self.inner.waitlist(offering)
    }

    fn allocate_id(&self) -> Result<ApplicationId, RepositoryError> {
        self.inner.allocate_id()
    }

    fn commit(&self, transaction: AdmissionTransaction) -> Result<(), RepositoryError> {
        self.commits.fetch_add(1, Ordering::SeqCst);

        let failure = self.failures.lock().expect("failures lock").pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        let writer = self
            .interleavings
            .lock()
            .expect("interleavings lock")
            .pop_front();
        if let Some(writer) = writer {
            writer();
        }

        self.inner.commit(transaction)
    }
}

pub(super) fn scripted() -> (
    Arc<ScriptedStore>,
    AdmissionRuleEnforcer<ScriptedStore, InMemoryCatalog>,
) {
    let store = Arc::new(ScriptedStore::default());
    let enforcer = AdmissionRuleEnforcer::new(store.clone(), catalog(), AdmissionPolicy::default());
    (store, enforcer)
}

/// Enforcer writing straight to the store behind `scripted`, for use inside interleavings.
pub(super) fn direct(store: Arc<InMemoryAdmissionStore>) -> MemoryEnforcer {
    AdmissionRuleEnforcer::new(store, catalog(), AdmissionPolicy::default())
}
