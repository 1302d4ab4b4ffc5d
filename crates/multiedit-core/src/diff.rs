//! Diffing entity trees into patches.
//!
//! All three diffs walk the union of the two sides' keys, treat a missing
//! key as null, and compare leaves with the entity equality policy. Arrays
//! always diff as whole values; a changed array is a single set of the new
//! array. An unchanged input pair yields `None`, never an empty patch.

use serde_json::{Map, Value};

use multiedit_equal::deep_equal;

use crate::multi::{multi_equal, MultiObject, MultiValue, CONCRETE_NULL};
use crate::patch::{MultiPatch, MultiPatchValue, Patch, PatchValue};

/// Deep diff of two entities. Changes inside nested records come back as
/// nested patches touching only the changed fields.
pub fn diff(base: &Map<String, Value>, updated: &Map<String, Value>) -> Option<Patch> {
    let patch = diff_objects(base, updated);
    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

/// One-level diff: any changed top-level field becomes a whole-value set,
/// nested records included. For stores that replace fields wholesale.
pub fn shallow_diff(base: &Map<String, Value>, updated: &Map<String, Value>) -> Option<Patch> {
    let mut patch = Patch::new();
    for (key, before) in base {
        let after = updated.get(key).unwrap_or(&Value::Null);
        if !deep_equal(before, after) {
            patch.insert(key.clone(), PatchValue::Set(after.clone()));
        }
    }
    for (key, after) in updated {
        if !base.contains_key(key) && !deep_equal(&Value::Null, after) {
            patch.insert(key.clone(), PatchValue::Set(after.clone()));
        }
    }
    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

fn diff_objects(base: &Map<String, Value>, updated: &Map<String, Value>) -> Patch {
    let mut patch = Patch::new();
    for (key, before) in base {
        let after = updated.get(key).unwrap_or(&Value::Null);
        if deep_equal(before, after) {
            continue;
        }
        let entry = match (before, after) {
            (Value::Object(b), Value::Object(a)) => {
                let nested = diff_objects(b, a);
                if nested.is_empty() {
                    continue;
                }
                PatchValue::Nested(nested)
            }
            _ => PatchValue::Set(after.clone()),
        };
        patch.insert(key.clone(), entry);
    }
    for (key, after) in updated {
        if base.contains_key(key) || deep_equal(&Value::Null, after) {
            continue;
        }
        // Base had null here, so even an object value materializes whole.
        patch.insert(key.clone(), PatchValue::Set(after.clone()));
    }
    patch
}

/// Deep diff of two folded trees, typically the saved and edited sides of a
/// session. Fields the user moved out of the multi state come back as sets;
/// fields that moved (or stayed) in the multi state come back as
/// [`MultiPatchValue::Multiple`] and are for the caller to drop or reject.
pub fn multi_diff(base: &MultiObject, updated: &MultiObject) -> Option<MultiPatch> {
    let patch = multi_diff_objects(base, updated);
    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

fn multi_diff_objects(base: &MultiObject, updated: &MultiObject) -> MultiPatch {
    let mut patch = MultiPatch::new();
    for (key, before) in base {
        let after = updated.get(key).unwrap_or(&CONCRETE_NULL);
        if multi_equal(before, after) {
            continue;
        }
        let entry = match (before, after) {
            (MultiValue::Object(b), MultiValue::Object(a)) => {
                let nested = multi_diff_objects(b, a);
                if nested.is_empty() {
                    continue;
                }
                MultiPatchValue::Nested(nested)
            }
            _ => materialize(after),
        };
        patch.insert(key.clone(), entry);
    }
    for (key, after) in updated {
        if base.contains_key(key) || multi_equal(&CONCRETE_NULL, after) {
            continue;
        }
        patch.insert(key.clone(), materialize(after));
    }
    patch
}

/// The patch entry that replaces a node with `value` wholesale.
fn materialize(value: &MultiValue) -> MultiPatchValue {
    match value {
        MultiValue::Multiple => MultiPatchValue::Multiple,
        MultiValue::Concrete(v) => MultiPatchValue::Set(v.clone()),
        MultiValue::Object(map) => {
            let mut nested = MultiPatch::new();
            for (key, entry) in map {
                nested.insert(key.clone(), materialize(entry));
            }
            MultiPatchValue::Nested(nested)
        }
        MultiValue::Elements(_) => match value.concrete() {
            Some(v) => MultiPatchValue::Set(v),
            None => MultiPatchValue::Multiple,
        },
    }
}
