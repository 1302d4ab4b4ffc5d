//! Field-level patches: the partial updates produced by diffing and consumed
//! by merging and by entity stores.
//!
//! [`Patch`] is sentinel-free by construction and safe to hand to a store.
//! [`MultiPatch`] is the same shape but may carry the multi-state sentinel,
//! which is what a diff of two folded trees naturally produces; narrowing it
//! with [`MultiPatch::concrete`] or [`MultiPatch::concrete_strict`] is the
//! only way the engine turns one into a [`Patch`].
//!
//! Neither form can express key removal. Clearing a field is an explicit
//! `Set(null)`, which keeps entity shapes stable across edits.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::pointer::format_pointer;

// ── Concrete patches ────────────────────────────────────────────────────────

/// A partial update: field name to new value or nested patch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Patch {
    entries: IndexMap<String, PatchValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    /// Replace the field with this exact value.
    Set(Value),
    /// Update some fields of a nested record, leaving its siblings alone.
    Nested(Patch),
}

impl Patch {
    pub fn new() -> Patch {
        Patch::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&PatchValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PatchValue) {
        self.entries.insert(key.into(), value);
    }

    /// Chainable [`Patch::insert`] of a `Set` entry.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Patch {
        self.insert(key, PatchValue::Set(value));
        self
    }

    /// Chainable [`Patch::insert`] of a `Nested` entry.
    pub fn with_nested(mut self, key: impl Into<String>, nested: Patch) -> Patch {
        self.insert(key, PatchValue::Nested(nested));
        self
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, PatchValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Reads a patch from its JSON body. Every nested object literal is
    /// taken as a nested partial update, so a whole-record replacement must
    /// be built through [`Patch::with`] instead.
    pub fn from_value(value: &Value) -> Result<Patch, PatchParseError> {
        match value {
            Value::Object(obj) => Ok(Self::from_object(obj)),
            _ => Err(PatchParseError::NotAnObject),
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Patch {
        let mut patch = Patch::new();
        for (key, value) in obj {
            let entry = match value {
                Value::Object(inner) => PatchValue::Nested(Self::from_object(inner)),
                other => PatchValue::Set(other.clone()),
            };
            patch.insert(key.clone(), entry);
        }
        patch
    }

    /// The JSON body a store receives. Nested updates and whole-object sets
    /// render identically; the distinction only matters engine-side.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        for (key, entry) in &self.entries {
            let value = match entry {
                PatchValue::Set(v) => v.clone(),
                PatchValue::Nested(p) => p.to_value(),
            };
            out.insert(key.clone(), value);
        }
        Value::Object(out)
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = (&'a String, &'a PatchValue);
    type IntoIter = indexmap::map::Iter<'a, String, PatchValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── Patches over folded trees ───────────────────────────────────────────────

/// A partial update between two folded trees. Unlike [`Patch`] it can record
/// that a field moved into the multi state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPatch {
    entries: IndexMap<String, MultiPatchValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MultiPatchValue {
    Set(Value),
    /// The updated tree is in the multi state here.
    Multiple,
    Nested(MultiPatch),
}

impl MultiPatch {
    pub fn new() -> MultiPatch {
        MultiPatch::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&MultiPatchValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MultiPatchValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, MultiPatchValue> {
        self.entries.iter()
    }

    /// Narrows to a sentinel-free patch by dropping every entry that is (or
    /// contains only) the multi state. `None` when nothing concrete remains.
    pub fn concrete(&self) -> Option<Patch> {
        let patch = self.concrete_entries();
        if patch.is_empty() {
            None
        } else {
            Some(patch)
        }
    }

    fn concrete_entries(&self) -> Patch {
        let mut patch = Patch::new();
        for (key, entry) in &self.entries {
            match entry {
                MultiPatchValue::Set(v) => patch.insert(key.clone(), PatchValue::Set(v.clone())),
                MultiPatchValue::Multiple => {}
                MultiPatchValue::Nested(nested) => {
                    let inner = nested.concrete_entries();
                    if !inner.is_empty() {
                        patch.insert(key.clone(), PatchValue::Nested(inner));
                    }
                }
            }
        }
        patch
    }

    /// Narrows to a sentinel-free patch, failing on the first sentinel met
    /// instead of dropping it. For callers that treat a leaked sentinel as a
    /// bug rather than an expected state.
    pub fn concrete_strict(&self) -> Result<Option<Patch>, SentinelError> {
        let mut path = Vec::new();
        let patch = self.concrete_strict_at(&mut path)?;
        if patch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(patch))
        }
    }

    fn concrete_strict_at(&self, path: &mut Vec<String>) -> Result<Patch, SentinelError> {
        let mut patch = Patch::new();
        for (key, entry) in &self.entries {
            match entry {
                MultiPatchValue::Set(v) => patch.insert(key.clone(), PatchValue::Set(v.clone())),
                MultiPatchValue::Multiple => {
                    path.push(key.clone());
                    return Err(SentinelError {
                        path: format_pointer(path),
                    });
                }
                MultiPatchValue::Nested(nested) => {
                    path.push(key.clone());
                    let inner = nested.concrete_strict_at(path)?;
                    path.pop();
                    patch.insert(key.clone(), PatchValue::Nested(inner));
                }
            }
        }
        Ok(patch)
    }
}

impl<'a> IntoIterator for &'a MultiPatch {
    type Item = (&'a String, &'a MultiPatchValue);
    type IntoIter = indexmap::map::Iter<'a, String, MultiPatchValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchParseError {
    #[error("patch body must be a JSON object")]
    NotAnObject,
}

/// A multi-state sentinel reached a place that only accepts concrete values.
/// `path` is an RFC 6901 pointer to the offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("multi-state sentinel at {path}")]
pub struct SentinelError {
    pub path: String,
}
