#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use animals_catalog_sdk::CatalogError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::infra::graphql::{Operation, QueryExecutor};

struct Scripted {
    result: Result<Value, CatalogError>,
    gate: Option<Arc<Notify>>,
}

/// In-memory gateway answering from per-operation queues of scripted results.
#[derive(Default)]
pub struct FakeExecutor {
    script: Mutex<HashMap<Operation, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(Operation, Value)>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, operation: Operation, data: Value) {
        self.push(operation, Ok(data), None);
    }

    pub fn push_err(&self, operation: Operation, err: CatalogError) {
        self.push(operation, Err(err), None);
    }

    /// Queue a result that is only delivered after the returned gate is
    /// notified.
    pub fn push_gated(&self, operation: Operation, data: Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(operation, Ok(data), Some(gate.clone()));
        gate
    }

    pub fn calls(&self) -> Vec<(Operation, Value)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls.lock().iter().filter(|(op, _)| *op == operation).count()
    }

    fn push(&self, operation: Operation, result: Result<Value, CatalogError>, gate: Option<Arc<Notify>>) {
        self.script
            .lock()
            .entry(operation)
            .or_default()
            .push_back(Scripted { result, gate });
    }
}

#[async_trait]
impl QueryExecutor for FakeExecutor {
    async fn execute(&self, operation: Operation, variables: Value) -> Result<Value, CatalogError> {
        self.calls.lock().push((operation, variables));
        let next = self
            .script
            .lock()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        let Some(scripted) = next else {
            return Err(CatalogError::transport(format!(
                "no scripted response for {operation}"
            )));
        };
        if let Some(gate) = scripted.gate {
            gate.notified().await;
        }
        scripted.result
    }
}

pub fn animal_born(id: i64, name: &str, species: &str, weight: u32, born: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "dateOfBirth": born,
        "species": species,
        "breed": "Mixed",
        "color": "8B4513",
        "weight": weight,
    })
}

pub fn animal_json(id: i64, name: &str, species: &str, weight: u32) -> Value {
    animal_born(id, name, species, weight, "2018-05-10")
}

pub fn person_json(id: i64, first_name: &str, last_name: &str, animals: i64) -> Value {
    let animals: Vec<Value> = (0..animals)
        .map(|n| animal_json(id * 100 + n, &format!("Pet{n}"), "Cat", 4_000))
        .collect();
    json!({
        "id": id,
        "firstName": first_name,
        "lastName": last_name,
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "phoneNumber": "0612345678",
        "animals": animals,
    })
}

pub fn page_json(items: Vec<Value>, total: u64, has_more: bool) -> Value {
    json!({ "items": items, "total": total, "hasMore": has_more })
}
