use std::collections::HashMap;
use std::fmt;

use crate::core::{DomainError, Result, Value, ValueKind};
use crate::validate::rule;
use crate::validate::{Rule, ValidationReport};

/// Index of a slot in an entity's property store.
///
/// Assigned once per type in schema declaration order; the name-to-slot map
/// is kept on the schema for diagnostics.
pub type PropertyId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Generally mutable ordered list, edited through [`ChildCollection`].
    ///
    /// [`ChildCollection`]: crate::collections::ChildCollection
    Child,
    /// Read-only public view; membership changes only through the owning
    /// aggregate root's recording helpers.
    ValueObject,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Child => write!(f, "child"),
            CollectionKind::ValueObject => write!(f, "value-object"),
        }
    }
}

/// Declared scalar property: default value, inferred kind, ordered rule
/// evaluators. The required rule, when declared, always runs first.
pub struct PropertyDef {
    name: String,
    default: Value,
    kind: Option<ValueKind>,
    required: bool,
    rules: Vec<Rule>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        let default = default.into();
        let kind = default.kind();
        Self {
            name: name.into(),
            default,
            kind,
            required: false,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the inferred kind; needed when the default is `Null`.
    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn value_kind(&self) -> Option<ValueKind> {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) fn check_kind(&self, value: &Value) -> Result<()> {
        match self.kind {
            Some(kind) if !kind.is_compatible(value) => Err(DomainError::TypeMismatch(format!(
                "Property '{}' expects {}, got {}",
                self.name,
                kind,
                value.type_name()
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn validate_value(&self, value: &Value, report: &mut ValidationReport) {
        for rule in &self.rules {
            if let Some(message) = rule(&self.name, value) {
                report.push(message);
            }
        }
    }
}

impl fmt::Debug for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CollectionDef {
    name: String,
    kind: CollectionKind,
}

impl CollectionDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }
}

#[derive(Debug)]
pub enum SlotDef {
    Scalar(PropertyDef),
    Collection(CollectionDef),
}

impl SlotDef {
    pub fn name(&self) -> &str {
        match self {
            SlotDef::Scalar(def) => def.name(),
            SlotDef::Collection(def) => def.name(),
        }
    }
}

/// Immutable, per-type schema: one slot per declared property or collection.
/// Built once through [`EntitySchema::define`] and shared by every instance
/// of the type via the process-wide registry.
pub struct EntitySchema {
    type_name: String,
    slots: Vec<SlotDef>,
    index: HashMap<String, PropertyId>,
}

impl EntitySchema {
    pub fn define(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            slots: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn slot_of(&self, name: &str) -> Option<PropertyId> {
        self.index.get(name).copied()
    }

    pub fn slots(&self) -> &[SlotDef] {
        &self.slots
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        match self.slot_of(name).map(|id| &self.slots[id]) {
            Some(SlotDef::Scalar(def)) => Some(def),
            _ => None,
        }
    }
}

impl fmt::Debug for EntitySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("type_name", &self.type_name)
            .field("slots", &self.slots)
            .finish()
    }
}

pub struct SchemaBuilder {
    type_name: String,
    slots: Vec<SlotDef>,
}

impl SchemaBuilder {
    pub fn property(mut self, def: PropertyDef) -> Self {
        self.slots.push(SlotDef::Scalar(def));
        self
    }

    pub fn child_collection(mut self, name: impl Into<String>) -> Self {
        self.slots.push(SlotDef::Collection(CollectionDef {
            name: name.into(),
            kind: CollectionKind::Child,
        }));
        self
    }

    pub fn value_object_collection(mut self, name: impl Into<String>) -> Self {
        self.slots.push(SlotDef::Collection(CollectionDef {
            name: name.into(),
            kind: CollectionKind::ValueObject,
        }));
        self
    }

    /// Finalize the schema. A duplicate or empty property name is a
    /// malformed schema and fails here, at first use of the type.
    pub fn build(mut self) -> Result<EntitySchema> {
        let mut index = HashMap::with_capacity(self.slots.len());
        for (id, slot) in self.slots.iter().enumerate() {
            let name = slot.name();
            if name.is_empty() {
                return Err(DomainError::SchemaError(format!(
                    "type '{}' declares a property with an empty name",
                    self.type_name
                )));
            }
            if index.insert(name.to_string(), id).is_some() {
                return Err(DomainError::SchemaError(format!(
                    "type '{}' declares property '{}' more than once",
                    self.type_name, name
                )));
            }
        }

        // The mandatory rule always evaluates before the declared rules.
        for slot in &mut self.slots {
            if let SlotDef::Scalar(def) = slot {
                if def.required {
                    def.rules.insert(0, rule::required());
                }
            }
        }

        Ok(EntitySchema {
            type_name: self.type_name,
            slots: self.slots,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_property_is_a_schema_error() {
        let result = EntitySchema::define("Broken")
            .property(PropertyDef::new("name", ""))
            .property(PropertyDef::new("name", ""))
            .build();
        assert!(matches!(result, Err(DomainError::SchemaError(_))));
    }

    #[test]
    fn test_slot_assignment_follows_declaration_order() {
        let schema = EntitySchema::define("Person")
            .property(PropertyDef::new("name", ""))
            .property(PropertyDef::new("age", 0i64))
            .child_collection("tags")
            .build()
            .unwrap();

        assert_eq!(schema.slot_of("name"), Some(0));
        assert_eq!(schema.slot_of("age"), Some(1));
        assert_eq!(schema.slot_of("tags"), Some(2));
        assert_eq!(schema.slot_of("missing"), None);
    }

    #[test]
    fn test_required_rule_runs_first() {
        let schema = EntitySchema::define("Person")
            .property(
                PropertyDef::new("age", 0i64)
                    .required()
                    .rule(rule::min_integer(18)),
            )
            .build()
            .unwrap();

        let def = schema.property("age").unwrap();
        let mut report = ValidationReport::new();
        def.validate_value(&Value::Null, &mut report);
        assert_eq!(report.messages()[0].message, "is required");
    }

    #[test]
    fn test_kind_is_inferred_from_default() {
        let def = PropertyDef::new("age", 0i64);
        assert_eq!(def.value_kind(), Some(ValueKind::Integer));
        assert!(def.check_kind(&Value::Integer(5)).is_ok());
        assert!(def.check_kind(&Value::from("five")).is_err());
    }
}
