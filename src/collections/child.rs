use crate::core::{DomainError, Result, Value};
use crate::schema::PropertyId;
use crate::tracker::CompensatingAction;

/// Borrow-scoped mutator over a child collection.
///
/// Every mutating call performs the structural change immediately against
/// the backing sequence and, in the same call, pushes the matching
/// compensating action to the open transaction. Null elements are rejected
/// eagerly, independent of the transaction outcome.
///
/// During initialization the journal is absent and edits seed the baseline
/// contents without undo records.
pub struct ChildCollection<'a> {
    name: String,
    slot: PropertyId,
    items: &'a mut Vec<Value>,
    journal: Option<&'a mut Vec<CompensatingAction>>,
}

impl<'a> ChildCollection<'a> {
    pub(crate) fn new(
        name: impl Into<String>,
        slot: PropertyId,
        items: &'a mut Vec<Value>,
        journal: Option<&'a mut Vec<CompensatingAction>>,
    ) -> Self {
        Self {
            name: name.into(),
            slot,
            items,
            journal,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[Value] {
        self.items
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    fn reject_null(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Err(DomainError::NullElement(format!(
                "collection '{}' does not accept null elements",
                self.name
            )));
        }
        Ok(())
    }

    fn record(&mut self, action: CompensatingAction) {
        if let Some(journal) = self.journal.as_deref_mut() {
            journal.push(action);
        }
    }

    /// Indexer write: replace the element at `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.reject_null(&value)?;
        if index >= self.items.len() {
            return Err(DomainError::OutOfBounds(index, self.name.to_string()));
        }
        let prior = std::mem::replace(&mut self.items[index], value);
        let slot = self.slot;
        self.record(CompensatingAction::UndoIndexSet { slot, index, prior });
        Ok(())
    }

    pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.reject_null(&value)?;
        self.items.push(value);
        let action = CompensatingAction::UndoInsert {
            slot: self.slot,
            index: self.items.len() - 1,
        };
        self.record(action);
        Ok(())
    }

    pub fn add_range<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for value in values {
            self.add(value)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.reject_null(&value)?;
        if index > self.items.len() {
            return Err(DomainError::OutOfBounds(index, self.name.to_string()));
        }
        self.items.insert(index, value);
        let slot = self.slot;
        self.record(CompensatingAction::UndoInsert { slot, index });
        Ok(())
    }

    /// Remove the first element equal to `value`; `Ok(false)` when absent.
    pub fn remove(&mut self, value: &Value) -> Result<bool> {
        let Some(index) = self.items.iter().position(|item| item == value) else {
            return Ok(false);
        };
        let removed = self.items.remove(index);
        let slot = self.slot;
        self.record(CompensatingAction::UndoRemoveAt {
            slot,
            index,
            removed,
        });
        Ok(true)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Value> {
        if index >= self.items.len() {
            return Err(DomainError::OutOfBounds(index, self.name.to_string()));
        }
        let removed = self.items.remove(index);
        let slot = self.slot;
        self.record(CompensatingAction::UndoRemoveAt {
            slot,
            index,
            removed: removed.clone(),
        });
        Ok(removed)
    }

    /// Sort ascending. Elements must share one orderable kind.
    pub fn sort(&mut self) -> Result<()> {
        if let Some(first) = self.items.first() {
            for item in self.items.iter() {
                if item.kind() != first.kind() {
                    return Err(DomainError::TypeMismatch(format!(
                        "collection '{}' holds mixed types ({} and {}) and cannot be sorted",
                        self.name,
                        first.type_name(),
                        item.type_name()
                    )));
                }
            }
            match first.kind() {
                Some(kind) if !kind.is_orderable() => {
                    return Err(DomainError::TypeMismatch(format!(
                        "collection '{}' holds {} values, which have no ordering",
                        self.name,
                        first.type_name()
                    )));
                }
                _ => {}
            }
        }
        let prior = self.items.clone();
        self.items
            .sort_by(|a, b| a.compare(b).unwrap_or(std::cmp::Ordering::Equal));
        let slot = self.slot;
        self.record(CompensatingAction::UndoSort { slot, prior });
        Ok(())
    }

    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let prior = std::mem::take(self.items);
        let slot = self.slot;
        self.record(CompensatingAction::UndoClear { slot, prior });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection<'a>(
        items: &'a mut Vec<Value>,
        journal: &'a mut Vec<CompensatingAction>,
    ) -> ChildCollection<'a> {
        ChildCollection::new("numbers", 0, items, Some(journal))
    }

    #[test]
    fn test_add_logs_undo_insert() {
        let mut items = Vec::new();
        let mut journal = Vec::new();
        let mut numbers = collection(&mut items, &mut journal);

        numbers.add(17i64).unwrap();
        assert_eq!(items, vec![Value::Integer(17)]);
        assert!(matches!(
            journal[0],
            CompensatingAction::UndoInsert { slot: 0, index: 0 }
        ));
    }

    #[test]
    fn test_null_elements_rejected_eagerly() {
        let mut items = Vec::new();
        let mut journal = Vec::new();
        let mut numbers = collection(&mut items, &mut journal);

        assert!(matches!(
            numbers.add(Value::Null),
            Err(DomainError::NullElement(_))
        ));
        assert!(items.is_empty());
        assert!(journal.is_empty());
    }

    #[test]
    fn test_remove_logs_removed_value() {
        let mut items = vec![Value::Integer(1), Value::Integer(2)];
        let mut journal = Vec::new();
        let mut numbers = collection(&mut items, &mut journal);

        assert!(numbers.remove(&Value::Integer(1)).unwrap());
        assert!(!numbers.remove(&Value::Integer(9)).unwrap());
        assert_eq!(journal.len(), 1);
        assert!(matches!(
            &journal[0],
            CompensatingAction::UndoRemoveAt { index: 0, .. }
        ));
    }

    #[test]
    fn test_sort_rejects_mixed_types() {
        let mut items = vec![Value::Integer(2), Value::from("a")];
        let mut journal = Vec::new();
        let mut numbers = collection(&mut items, &mut journal);

        assert!(matches!(
            numbers.sort(),
            Err(DomainError::TypeMismatch(_))
        ));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_sort_logs_prior_order() {
        let mut items = vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)];
        let mut journal = Vec::new();
        let mut numbers = collection(&mut items, &mut journal);

        numbers.sort().unwrap();
        assert_eq!(
            items,
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
        match &journal[0] {
            CompensatingAction::UndoSort { prior, .. } => {
                assert_eq!(prior[0], Value::Integer(3));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_clear_on_empty_logs_nothing() {
        let mut items = Vec::new();
        let mut journal = Vec::new();
        let mut numbers = collection(&mut items, &mut journal);

        numbers.clear();
        assert!(journal.is_empty());
    }
}
