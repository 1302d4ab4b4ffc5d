//! The persistence boundary: a store applies per-entity patches and returns
//! the authoritative record that resulted. Transport, retries, and auth are
//! the embedding application's business; a session only sees `Result`.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use multiedit_core::{merge_into, Patch};

use crate::entity::{Entity, EntityId};

/// One write target. Every call stands alone; there is no batch transaction.
pub trait PatchStore {
    /// Applies `patch` to the stored entity and returns the updated record
    /// as the store now holds it.
    fn apply_patch(&mut self, id: &EntityId, patch: &Patch) -> Result<Entity, StoreError>;

    /// Creates a new entity from whole fields and returns it, id assigned.
    fn create(&mut self, fields: &Map<String, Value>) -> Result<Entity, StoreError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("entity {id} not found")]
    NotFound { id: EntityId },
    #[error("write rejected: {reason}")]
    Rejected { reason: String },
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// In-memory reference store. Patches merge with the same semantics the
/// session uses to predict results, so a round trip through this store
/// matches the session's expectation exactly.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entities: IndexMap<EntityId, Map<String, Value>>,
    next_id: i64,
}

impl Default for MemoryStore {
    fn default() -> MemoryStore {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            entities: IndexMap::new(),
            next_id: 1,
        }
    }

    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> MemoryStore {
        let mut store = MemoryStore::new();
        for entity in entities {
            store.insert(entity);
        }
        store
    }

    pub fn insert(&mut self, entity: Entity) {
        if let EntityId::Int(n) = entity.id {
            self.next_id = self.next_id.max(n + 1);
        }
        self.entities.insert(entity.id, entity.fields);
    }

    pub fn get(&self, id: &EntityId) -> Option<&Map<String, Value>> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.keys()
    }
}

impl PatchStore for MemoryStore {
    fn apply_patch(&mut self, id: &EntityId, patch: &Patch) -> Result<Entity, StoreError> {
        let fields = self
            .entities
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        merge_into(fields, patch);
        Ok(Entity::new(id.clone(), fields.clone()))
    }

    fn create(&mut self, fields: &Map<String, Value>) -> Result<Entity, StoreError> {
        let id = EntityId::Int(self.next_id);
        self.next_id += 1;
        self.entities.insert(id.clone(), fields.clone());
        Ok(Entity::new(id, fields.clone()))
    }
}
