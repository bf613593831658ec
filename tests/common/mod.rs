//! Shared fixtures: a validated entity and an event-sourced aggregate.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use aggroot::prelude::dx::*;
use aggroot::DomainError;

// ============================================================================
// Person - plain entity with property rules
// ============================================================================

pub struct Person {
    state: EntityState,
}

impl Person {
    pub fn new() -> Result<Self> {
        Ok(Self {
            state: EntityState::transient::<Self>()?,
        })
    }

    /// A person with a committed, valid baseline.
    pub fn adult(name: &str, age: i64) -> Result<Self> {
        let mut person = Self::new()?;
        let report = person.track_changes(|p| {
            p.set_property("name", name)?;
            p.set_property("age", age)
        })?;
        assert!(report.is_valid(), "baseline must be valid: {}", report);
        Ok(person)
    }

    pub fn name(&self) -> String {
        self.get("name")
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn age(&self) -> i64 {
        self.get("age").ok().and_then(|v| v.as_i64()).unwrap_or(0)
    }
}

impl Entity for Person {
    fn define_schema() -> SchemaBuilder {
        EntitySchema::define("Person")
            .property(PropertyDef::new("name", "").required())
            .property(PropertyDef::new("age", 0i64).rule(rule::min_integer(18)))
            .child_collection("nicknames")
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

// ============================================================================
// Order - aggregate root with an event stream
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    Created { id: Identifier, customer: String },
    LineAdded { sku: String, qty: i64, price: f64 },
    LineRemoved { sku: String },
    TagAdded { tag: String },
    Closed,
    /// Retired variant kept on the wire; current aggregates no longer
    /// handle it.
    Legacy,
}

pub struct Order {
    state: AggregateState<OrderEvent>,
}

impl Order {
    pub fn new() -> Result<Self> {
        Ok(Self {
            state: AggregateState::transient::<Self>()?,
        })
    }

    pub fn customer(&self) -> String {
        self.get("customer")
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn status(&self) -> String {
        self.get("status")
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn line_count(&self) -> usize {
        self.items("lines").map(|lines| lines.len()).unwrap_or(0)
    }

    pub fn total(&self) -> f64 {
        self.items("lines")
            .map(|lines| {
                lines
                    .iter()
                    .map(|line| {
                        let qty = line.field("qty").and_then(Value::as_f64).unwrap_or(0.0);
                        let price = line.field("price").and_then(Value::as_f64).unwrap_or(0.0);
                        qty * price
                    })
                    .sum()
            })
            .unwrap_or(0.0)
    }

    pub fn tags(&self) -> Vec<String> {
        self.items("tags")
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Entity for Order {
    fn define_schema() -> SchemaBuilder {
        EntitySchema::define("Order")
            .property(PropertyDef::new("customer", "").required())
            .property(PropertyDef::new("status", "open"))
            .child_collection("lines")
            .value_object_collection("tags")
    }

    fn state(&self) -> &EntityState {
        self.state.entity()
    }

    fn state_mut(&mut self) -> &mut EntityState {
        self.state.entity_mut()
    }
}

impl AggregateRoot for Order {
    type Event = OrderEvent;

    fn aggregate_state(&self) -> &AggregateState<OrderEvent> {
        &self.state
    }

    fn aggregate_state_mut(&mut self) -> &mut AggregateState<OrderEvent> {
        &mut self.state
    }

    fn transient() -> Result<Self> {
        Self::new()
    }

    fn apply(&mut self, event: &OrderEvent) -> Result<()> {
        match event {
            OrderEvent::Created { id, customer } => {
                self.set_id(*id)?;
                self.set_property("customer", customer.as_str())
            }
            OrderEvent::LineAdded { sku, qty, price } => {
                let line = Value::record([
                    ("sku", Value::from(sku.as_str())),
                    ("qty", Value::from(*qty)),
                    ("price", Value::from(*price)),
                ]);
                self.collection("lines")?.add(line)
            }
            OrderEvent::LineRemoved { sku } => {
                let index = self.items("lines")?.iter().position(|line| {
                    line.field("sku").and_then(Value::as_str) == Some(sku.as_str())
                });
                if let Some(index) = index {
                    self.collection("lines")?.remove_at(index)?;
                }
                Ok(())
            }
            OrderEvent::TagAdded { tag } => self.record_added("tags", tag.as_str()),
            OrderEvent::Closed => self.set_property("status", "closed"),
            OrderEvent::Legacy => Err(DomainError::UnsupportedEvent(
                "Order does not handle Legacy events".to_string(),
            )),
        }
    }
}

pub fn created(id: Identifier, customer: &str) -> OrderEvent {
    OrderEvent::Created {
        id,
        customer: customer.to_string(),
    }
}

pub fn line_added(sku: &str, qty: i64, price: f64) -> OrderEvent {
    OrderEvent::LineAdded {
        sku: sku.to_string(),
        qty,
        price,
    }
}
