/// Identity tests
///
/// Identifiers are write-once; equality and hashing require a stable,
/// non-transient identity.
/// Run with: cargo test --test entity_identity_tests
mod common;

use std::collections::HashSet;

use aggroot::prelude::dx::*;
use aggroot::DomainError;

use common::Person;

#[test]
fn test_identifier_is_write_once() {
    let mut person = Person::adult("Ada", 30).unwrap();
    assert!(person.is_transient());

    person.set_id(Identifier::new()).unwrap();
    assert!(!person.is_transient());

    let result = person.set_id(Identifier::new());
    assert!(matches!(result, Err(DomainError::IdentityViolation(_))));
}

#[test]
fn test_nil_identifier_is_rejected() {
    let mut person = Person::adult("Ada", 30).unwrap();
    let result = person.set_id(Identifier::nil());
    assert!(matches!(result, Err(DomainError::IdentityViolation(_))));
    assert!(person.is_transient());
}

#[test]
fn test_transient_entity_has_no_key() {
    let person = Person::adult("Ada", 30).unwrap();
    assert!(matches!(
        person.key(),
        Err(DomainError::TransientIdentity(_))
    ));
}

#[test]
fn test_key_is_hashable_once_identified() {
    let mut person = Person::adult("Ada", 30).unwrap();
    let id = Identifier::new();
    person.set_id(id).unwrap();

    let key = person.key().unwrap();
    assert_eq!(key.id(), id);

    let mut keys = HashSet::new();
    assert!(keys.insert(key));
    assert!(!keys.insert(person.key().unwrap()));
}

#[test]
fn test_same_identity_requires_matching_non_transient_ids() {
    let id = Identifier::new();

    let mut a = Person::adult("Ada", 30).unwrap();
    let mut b = Person::adult("Ada", 30).unwrap();

    // Two transients are never equal, even with identical state
    assert!(!a.same_identity(&b));

    a.set_id(id).unwrap();
    b.set_id(id).unwrap();
    assert!(a.same_identity(&b));

    let mut c = Person::adult("Grace", 40).unwrap();
    c.set_id(Identifier::new()).unwrap();
    assert!(!a.same_identity(&c));
}

#[test]
fn test_identity_assigned_in_failed_transaction_is_rolled_back() {
    let mut person = Person::new().unwrap();

    let report = person
        .track_changes(|p| {
            p.set_id(Identifier::new())?;
            p.set_property("name", "Ada")?;
            p.set_property("age", 5i64)
        })
        .unwrap();

    assert!(!report.is_valid());
    assert!(person.is_transient());
}

#[test]
fn test_identity_assigned_in_committed_transaction_sticks() {
    let mut person = Person::new().unwrap();
    let id = Identifier::new();

    let report = person
        .track_changes(|p| {
            p.set_id(id)?;
            p.set_property("name", "Ada")?;
            p.set_property("age", 30i64)
        })
        .unwrap();

    assert!(report.is_valid());
    assert_eq!(person.id(), id);
}
