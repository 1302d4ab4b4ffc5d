//! Multi-state tree: the shape shared by a set of entities, with a sentinel
//! marking every point where they disagree.
//!
//! A [`MultiValue`] mirrors a JSON value except that any node may be
//! [`MultiValue::Multiple`], meaning "the folded entities hold different
//! values here". Trees are kept in a canonical form so that comparisons and
//! diffs never have to consider two spellings of the same state:
//!
//! * [`MultiValue::Concrete`] never wraps a JSON object. Objects are always
//!   represented structurally as [`MultiValue::Object`] so the sentinel can
//!   appear at any depth.
//! * [`MultiValue::Elements`] (per-position array state) only exists while it
//!   carries at least one sentinel somewhere inside. An array on which all
//!   entities agree is a plain `Concrete` array.

use indexmap::IndexMap;
use multiedit_equal::deep_equal;
use serde_json::{Map, Value};

/// Placeholder string a form layer renders for a field in the multi state.
pub const MULTIPLE_PLACEHOLDER: &str = "(Multiple)";

/// Top-level shape of a folded entity set: field name to multi-state value.
pub type MultiObject = IndexMap<String, MultiValue>;

pub(crate) const CONCRETE_NULL: MultiValue = MultiValue::Concrete(Value::Null);

/// One node of a multi-state tree.
///
/// Derived `PartialEq` is structural identity and treats a missing object key
/// and an explicit null as different; use [`multi_equal`] for the
/// normalizing comparison the engine itself runs on.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiValue {
    /// The folded entities disagree below this point.
    Multiple,
    /// All folded entities agree on this exact value. Never a JSON object.
    Concrete(Value),
    /// An object whose fields are folded independently.
    Object(MultiObject),
    /// Same-length arrays folded position by position.
    Elements(Vec<MultiValue>),
}

impl MultiValue {
    /// Lifts a plain JSON value into a (sentinel-free) multi-state tree.
    ///
    /// Objects become [`MultiValue::Object`] recursively; everything else,
    /// arrays included, becomes a single `Concrete` leaf.
    pub fn from_value(value: &Value) -> MultiValue {
        match value {
            Value::Object(obj) => MultiValue::Object(object_from_entity(obj)),
            other => MultiValue::Concrete(other.clone()),
        }
    }

    /// True for the sentinel node itself.
    pub fn is_multiple(&self) -> bool {
        matches!(self, MultiValue::Multiple)
    }

    /// True if the sentinel occurs anywhere in this subtree.
    pub fn contains_multiple(&self) -> bool {
        match self {
            MultiValue::Multiple => true,
            MultiValue::Concrete(_) => false,
            MultiValue::Object(map) => map.values().any(MultiValue::contains_multiple),
            MultiValue::Elements(items) => items.iter().any(MultiValue::contains_multiple),
        }
    }

    /// Rebuilds the plain JSON value, or `None` if any part of the subtree
    /// is in the multi state.
    pub fn concrete(&self) -> Option<Value> {
        match self {
            MultiValue::Multiple => None,
            MultiValue::Concrete(value) => Some(value.clone()),
            MultiValue::Object(map) => concrete_object(map).map(Value::Object),
            MultiValue::Elements(items) => items
                .iter()
                .map(MultiValue::concrete)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
        }
    }

}

/// Lifts a whole entity (its field map) into a sentinel-free multi-state tree.
pub fn object_from_entity(fields: &Map<String, Value>) -> MultiObject {
    let mut map = MultiObject::with_capacity(fields.len());
    for (key, value) in fields {
        map.insert(key.clone(), MultiValue::from_value(value));
    }
    map
}

/// Rebuilds a plain field map, or `None` if any field is in the multi state.
pub fn concrete_object(tree: &MultiObject) -> Option<Map<String, Value>> {
    let mut out = Map::new();
    for (key, value) in tree {
        out.insert(key.clone(), value.concrete()?);
    }
    Some(out)
}

/// Normalizing equality over multi-state trees.
///
/// Concrete leaves compare with the entity equality policy (strict numbers,
/// whole-value arrays), object nodes compare over the union of their keys
/// with a missing key standing in for null, and the sentinel only equals
/// itself.
pub fn multi_equal(a: &MultiValue, b: &MultiValue) -> bool {
    match (a, b) {
        (MultiValue::Multiple, MultiValue::Multiple) => true,
        (MultiValue::Concrete(a), MultiValue::Concrete(b)) => deep_equal(a, b),
        (MultiValue::Object(a), MultiValue::Object(b)) => multi_object_equal(a, b),
        (MultiValue::Elements(a), MultiValue::Elements(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| multi_equal(x, y))
        }
        _ => false,
    }
}

/// [`multi_equal`] over whole field maps.
pub fn multi_object_equal(a: &MultiObject, b: &MultiObject) -> bool {
    for (key, val_a) in a {
        let val_b = b.get(key).unwrap_or(&CONCRETE_NULL);
        if !multi_equal(val_a, val_b) {
            return false;
        }
    }
    for (key, val_b) in b {
        if !a.contains_key(key) && !multi_equal(&CONCRETE_NULL, val_b) {
            return false;
        }
    }
    true
}

/// Renders a folded tree for display, substituting [`MULTIPLE_PLACEHOLDER`]
/// for every sentinel. Lossy by design: a field whose real value is the
/// literal placeholder string is indistinguishable in the output.
pub fn placeholder_view(tree: &MultiObject) -> Value {
    let mut out = Map::new();
    for (key, value) in tree {
        out.insert(key.clone(), placeholder_value(value));
    }
    Value::Object(out)
}

fn placeholder_value(value: &MultiValue) -> Value {
    match value {
        MultiValue::Multiple => Value::String(MULTIPLE_PLACEHOLDER.to_string()),
        MultiValue::Concrete(v) => v.clone(),
        MultiValue::Object(map) => placeholder_view(map),
        MultiValue::Elements(items) => {
            Value::Array(items.iter().map(placeholder_value).collect())
        }
    }
}
