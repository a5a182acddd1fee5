use super::common::*;
use crate::workflows::admissions::domain::{ApplicationId, ApplicationStatus, ReviewDecision};
use crate::workflows::admissions::AdmissionError;

#[test]
fn approval_within_capacity_takes_a_seat() {
    let (_store, enforcer) = enforcer();

    let record = approved(&enforcer, "cand-a", "north-math");

    assert_eq!(record.status, ApplicationStatus::Approved);
    assert_eq!(
        enforcer
            .seats_taken(&offering_id("north-math"))
            .expect("seats readable"),
        1
    );
}

#[test]
fn approval_on_full_offering_joins_the_waitlist_in_order() {
    let (store, enforcer) = enforcer();
    approved(&enforcer, "cand-a", "north-cs");

    let second = approved(&enforcer, "cand-b", "north-cs");
    let third = approved(&enforcer, "cand-c", "north-cs");

    assert_eq!(second.status, ApplicationStatus::Waitlisted);
    assert_eq!(second.status_reason.as_deref(), Some("offering full"));
    assert_eq!(third.status, ApplicationStatus::Waitlisted);
    assert_eq!(
        queue(&*store, "north-cs"),
        vec![("cand-b".to_string(), 1), ("cand-c".to_string(), 2)]
    );
    assert_eq!(
        enforcer
            .seats_taken(&offering_id("north-cs"))
            .expect("seats readable"),
        1
    );
}

#[test]
fn explicit_waitlist_decision_queues_without_a_reason() {
    let (store, enforcer) = enforcer();
    let record = apply(&enforcer, "cand-a", "north-math");

    let waitlisted = review(&enforcer, &record.application_id, ReviewDecision::Waitlist);

    assert_eq!(waitlisted.status, ApplicationStatus::Waitlisted);
    assert_eq!(waitlisted.status_reason, None);
    assert_eq!(queue(&*store, "north-math"), vec![("cand-a".to_string(), 1)]);
}

#[test]
fn only_pending_applications_can_be_reviewed() {
    let (_store, enforcer) = enforcer();
    let record = apply(&enforcer, "cand-a", "north-math");
    let rejected = review(&enforcer, &record.application_id, ReviewDecision::Reject);
    assert_eq!(rejected.status, ApplicationStatus::Rejected);

    match enforcer.review(&record.application_id, ReviewDecision::Approve) {
        Err(AdmissionError::InvalidTransition { from, to, .. }) => {
            assert_eq!(from, ApplicationStatus::Rejected);
            assert_eq!(to, ApplicationStatus::Approved);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn second_place_at_the_same_institution_is_refused() {
    let (_store, enforcer) = enforcer();
    approved(&enforcer, "cand-a", "north-math");
    let bio = apply(&enforcer, "cand-a", "north-bio");

    match enforcer.review(&bio.application_id, ReviewDecision::Approve) {
        Err(AdmissionError::AlreadyAdmittedAtInstitution {
            candidate_id,
            institution_id,
        }) => {
            assert_eq!(candidate_id.0, "cand-a");
            assert_eq!(institution_id.0, "uni-north");
        }
        other => panic!("expected institution conflict, got {other:?}"),
    }

    let other_institution = approved(&enforcer, "cand-a", "south-med");
    assert_eq!(other_institution.status, ApplicationStatus::Approved);
}

#[test]
fn candidates_who_accepted_cannot_be_approved_again() {
    let (_store, enforcer) = enforcer();
    let law = approved(&enforcer, "cand-a", "south-law");
    let math = apply(&enforcer, "cand-a", "north-math");
    enforcer
        .accept_offer(&law.application_id)
        .expect("acceptance commits");

    match enforcer.review(&math.application_id, ReviewDecision::Approve) {
        Err(AdmissionError::AlreadyAccepted { application_id, .. }) => {
            assert_eq!(application_id, law.application_id);
        }
        other => panic!("expected prior acceptance, got {other:?}"),
    }
}

#[test]
fn reviewing_unknown_application_fails() {
    let (_store, enforcer) = enforcer();

    assert!(matches!(
        enforcer.review(&ApplicationId("app-missing".to_string()), ReviewDecision::Approve),
        Err(AdmissionError::ApplicationNotFound(_))
    ));
}
