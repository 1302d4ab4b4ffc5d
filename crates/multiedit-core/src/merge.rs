//! Applying patches: to plain entities when confirming what a store write
//! will produce, and to folded trees when a user edits the shared view.
//!
//! Merging never removes keys. A set entry always wins over whatever the
//! target held, and a nested entry recurses only while the target actually
//! has an object there; against anything else the nested patch materializes
//! as a fresh record, since there are no sibling fields left to preserve.

use serde_json::{Map, Value};

use crate::multi::{MultiObject, MultiValue};
use crate::patch::{Patch, PatchValue};

/// Applies `patch` to a copy of `entity` and returns it.
pub fn merge(entity: &Map<String, Value>, patch: &Patch) -> Map<String, Value> {
    let mut out = entity.clone();
    merge_into(&mut out, patch);
    out
}

/// In-place form of [`merge`].
pub fn merge_into(entity: &mut Map<String, Value>, patch: &Patch) {
    for (key, entry) in patch {
        match entry {
            PatchValue::Set(value) => {
                entity.insert(key.clone(), value.clone());
            }
            PatchValue::Nested(nested) => match entity.get_mut(key) {
                Some(Value::Object(record)) => merge_into(record, nested),
                _ => {
                    entity.insert(key.clone(), Value::Object(materialize(nested)));
                }
            },
        }
    }
}

/// Applies a user edit to a folded tree and returns the edited tree.
///
/// Set values are lifted with [`MultiValue::from_value`], so editing a field
/// always moves it out of the multi state; a nested edit under a collapsed
/// or non-object node regrows that record from the patch alone.
pub fn apply_changes(tree: &MultiObject, changes: &Patch) -> MultiObject {
    let mut out = tree.clone();
    apply_into(&mut out, changes);
    out
}

fn apply_into(tree: &mut MultiObject, changes: &Patch) {
    for (key, entry) in changes {
        match entry {
            PatchValue::Set(value) => {
                tree.insert(key.clone(), MultiValue::from_value(value));
            }
            PatchValue::Nested(nested) => match tree.get_mut(key) {
                Some(MultiValue::Object(record)) => apply_into(record, nested),
                _ => {
                    let record = Value::Object(materialize(nested));
                    tree.insert(key.clone(), MultiValue::from_value(&record));
                }
            },
        }
    }
}

/// Flattens a patch into the plain record it builds when applied to nothing.
fn materialize(patch: &Patch) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, entry) in patch {
        let value = match entry {
            PatchValue::Set(v) => v.clone(),
            PatchValue::Nested(nested) => Value::Object(materialize(nested)),
        };
        out.insert(key.clone(), value);
    }
    out
}
