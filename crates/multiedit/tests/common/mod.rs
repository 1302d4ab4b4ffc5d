//! Shared store double for the session suites.

#![allow(dead_code)]

use serde_json::{Map, Value};

use multiedit::{Entity, EntityId, MemoryStore, PatchStore, StoreError};
use multiedit_core::{Patch, MULTIPLE_PLACEHOLDER};

/// A [`MemoryStore`] wrapper that records every call it sees and can be
/// told to reject writes for chosen ids. Every recorded patch is checked
/// for placeholder leaks on the way through.
pub struct RecordingStore {
    inner: MemoryStore,
    pub patches: Vec<(EntityId, Value)>,
    pub creates: Vec<Value>,
    pub reject: Vec<EntityId>,
    pub reject_creates: bool,
}

impl RecordingStore {
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> RecordingStore {
        RecordingStore {
            inner: MemoryStore::with_entities(entities),
            patches: Vec::new(),
            creates: Vec::new(),
            reject: Vec::new(),
            reject_creates: false,
        }
    }

    pub fn rejecting(mut self, id: EntityId) -> RecordingStore {
        self.reject.push(id);
        self
    }

    pub fn rejecting_creates(mut self) -> RecordingStore {
        self.reject_creates = true;
        self
    }

    pub fn heal(&mut self) {
        self.reject.clear();
        self.reject_creates = false;
    }

    pub fn store_calls(&self) -> usize {
        self.patches.len() + self.creates.len()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl PatchStore for RecordingStore {
    fn apply_patch(&mut self, id: &EntityId, patch: &Patch) -> Result<Entity, StoreError> {
        let serialized = patch.to_value();
        assert!(
            !serialized.to_string().contains(MULTIPLE_PLACEHOLDER),
            "patch for {id} leaked the placeholder: {serialized}"
        );
        self.patches.push((id.clone(), serialized));
        if self.reject.contains(id) {
            return Err(StoreError::Rejected {
                reason: "injected rejection".to_string(),
            });
        }
        self.inner.apply_patch(id, patch)
    }

    fn create(&mut self, fields: &Map<String, Value>) -> Result<Entity, StoreError> {
        self.creates.push(Value::Object(fields.clone()));
        if self.reject_creates {
            return Err(StoreError::Unavailable {
                reason: "injected outage".to_string(),
            });
        }
        self.inner.create(fields)
    }
}

pub fn record(value: Value) -> Map<String, Value> {
    value
        .as_object()
        .cloned()
        .expect("fixture must be a JSON object")
}
