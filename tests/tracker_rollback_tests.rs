/// Rollback tests
///
/// Every transaction that does not end valid must leave the entity exactly
/// as it was before the call, across scalar and collection writes alike.
/// Run with: cargo test --test tracker_rollback_tests
mod common;

use aggroot::prelude::dx::*;
use aggroot::DomainError;

use common::Person;

#[test]
fn test_invalid_transaction_rolls_back_scalars() {
    let mut person = Person::new().unwrap();

    let report = person
        .track_changes(|p| {
            p.set_property("name", "A")?;
            p.set_property("age", 5i64)
        })
        .unwrap();

    assert!(!report.is_valid());
    assert_eq!(person.name(), "");
    assert_eq!(person.age(), 0);
}

#[test]
fn test_invalid_transaction_rolls_back_mixed_writes() {
    let mut person = Person::adult("Ada", 30).unwrap();
    let report = person
        .track_changes(|p| {
            let mut nicknames = p.collection("nicknames")?;
            nicknames.add("countess")?;
            nicknames.add("augusta")?;
            Ok(())
        })
        .unwrap();
    assert!(report.is_valid());

    let report = person
        .track_changes(|p| {
            p.set_property("name", "Grace")?;
            let mut nicknames = p.collection("nicknames")?;
            nicknames.add("lady")?;
            nicknames.sort()?;
            nicknames.remove_at(0)?;
            nicknames.set(0, "amazing")?;
            nicknames.clear();
            p.set_property("age", 5i64)
        })
        .unwrap();

    assert!(!report.is_valid());
    assert_eq!(person.name(), "Ada");
    assert_eq!(person.age(), 30);
    let nicknames = person.items("nicknames").unwrap();
    assert_eq!(nicknames.len(), 2);
    assert_eq!(nicknames[0].as_str(), Some("countess"));
    assert_eq!(nicknames[1].as_str(), Some("augusta"));
}

#[test]
fn test_fault_in_update_rolls_back_and_propagates() {
    let mut person = Person::adult("Ada", 30).unwrap();

    let result = person.track_changes(|p| {
        p.set_property("name", "Grace")?;
        let mut nicknames = p.collection("nicknames")?;
        nicknames.add(Value::Null)
    });

    assert!(matches!(result, Err(DomainError::NullElement(_))));
    assert_eq!(person.name(), "Ada");
    assert!(person.items("nicknames").unwrap().is_empty());
}

#[test]
fn test_armed_mode_write_validates_immediately() {
    let mut person = Person::adult("Ada", 30).unwrap();

    let result = person.set_property("age", 10i64);
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(person.age(), 30);

    person.set_property("age", 41i64).unwrap();
    assert_eq!(person.age(), 41);
}

#[test]
fn test_unknown_property_is_rejected() {
    let mut person = Person::adult("Ada", 30).unwrap();

    let result = person.set_property("shoe_size", 38i64);
    assert!(matches!(result, Err(DomainError::UnknownProperty(_, _))));
}

#[test]
fn test_kind_mismatch_is_rejected_before_any_write() {
    let mut person = Person::adult("Ada", 30).unwrap();

    let result = person.track_changes(|p| p.set_property("age", "very old"));
    assert!(matches!(result, Err(DomainError::TypeMismatch(_))));
    assert_eq!(person.age(), 30);
}

#[test]
fn test_reentrant_transaction_is_rejected() {
    let mut person = Person::adult("Ada", 30).unwrap();

    let result = person.track_changes(|p| {
        p.set_property("name", "Grace")?;
        p.track_changes(|inner| inner.set_property("age", 44i64))
            .map(|_| ())
    });

    assert!(matches!(result, Err(DomainError::TransactionState(_))));
    assert_eq!(person.name(), "Ada");
    assert_eq!(person.age(), 30);
}

#[test]
fn test_collection_mutation_requires_open_transaction() {
    let mut person = Person::adult("Ada", 30).unwrap();

    let result = person.collection("nicknames");
    assert!(matches!(result, Err(DomainError::TransactionState(_))));
}

#[test]
fn test_warnings_do_not_block_commit() {
    struct Widget {
        state: EntityState,
    }

    impl Entity for Widget {
        fn define_schema() -> SchemaBuilder {
            EntitySchema::define("Widget").property(
                PropertyDef::new("weight", 0i64).rule(rule::custom(|name, value| {
                    match value.as_i64() {
                        Some(w) if w > 100 => Some(ValidationMessage::warning(
                            name,
                            "unusually heavy",
                        )),
                        _ => None,
                    }
                })),
            )
        }

        fn state(&self) -> &EntityState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EntityState {
            &mut self.state
        }
    }

    let mut widget = Widget {
        state: EntityState::transient::<Widget>().unwrap(),
    };

    let report = widget
        .track_changes(|w| w.set_property("weight", 500i64))
        .unwrap();

    assert!(report.is_valid());
    assert_eq!(report.messages().len(), 1);
    assert_eq!(report.messages()[0].severity, Severity::Warning);
    assert_eq!(widget.get("weight").unwrap().as_i64(), Some(500));
}
