//! Folding a set of entities into one multi-state tree.
//!
//! The fold visits the union of the entities' keys, keeping each value where
//! every entity agrees under the equality policy and collapsing to
//! [`MultiValue::Multiple`] where any two disagree. A key an entity lacks is
//! folded as if it held null, so the result does not depend on the order the
//! entities arrive in. Once a node has collapsed it stays collapsed; pushing
//! further entities can only move more nodes into the multi state.

use serde_json::{Map, Value};

use multiedit_equal::deep_equal;

use crate::multi::{object_from_entity, MultiObject, MultiValue};

/// Knobs for the fold. The default compares arrays as whole values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldOptions {
    /// Fold same-length arrays position by position instead of collapsing
    /// the whole array on any mismatch. Useful for fixed-shape rosters where
    /// slot `i` means the same thing in every entity. Arrays of differing
    /// length still collapse whole.
    pub fold_arrays_elementwise: bool,
}

/// Incremental fold accumulator.
///
/// Distinguishes "no entities pushed yet" from "pushed entities happened to
/// be empty", which a bare tree cannot: the first push seeds the tree, every
/// later push combines into it.
#[derive(Debug, Clone, Default)]
pub struct Fold {
    options: FoldOptions,
    state: Option<MultiObject>,
}

impl Fold {
    pub fn new() -> Fold {
        Fold::default()
    }

    pub fn with_options(options: FoldOptions) -> Fold {
        Fold {
            options,
            state: None,
        }
    }

    pub fn push(&mut self, entity: &Map<String, Value>) {
        match &mut self.state {
            Some(acc) => fold_into(acc, entity, self.options),
            None => self.state = Some(object_from_entity(entity)),
        }
    }

    /// The folded tree; empty when nothing was pushed.
    pub fn finish(self) -> MultiObject {
        self.state.unwrap_or_default()
    }
}

/// Folds every entity in `entities` with default options.
pub fn fold_entities<'a, I>(entities: I) -> MultiObject
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    fold_entities_with(entities, FoldOptions::default())
}

/// Folds every entity in `entities`.
pub fn fold_entities_with<'a, I>(entities: I, options: FoldOptions) -> MultiObject
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut fold = Fold::with_options(options);
    for entity in entities {
        fold.push(entity);
    }
    fold.finish()
}

/// Combines one more entity into an already-seeded tree.
///
/// `acc` must be the fold of at least one entity (seed it with
/// [`object_from_entity`], or use [`Fold`] which does). An empty `acc` means
/// "entities with no fields so far", not "no entities", so every field of
/// `entity` is compared against null rather than adopted.
pub fn fold_into(acc: &mut MultiObject, entity: &Map<String, Value>, options: FoldOptions) {
    let seeded = std::mem::take(acc);
    *acc = combine_objects(seeded, entity, options);
}

fn combine_objects(
    mut acc: MultiObject,
    entity: &Map<String, Value>,
    options: FoldOptions,
) -> MultiObject {
    for (key, value) in entity {
        if let Some(state) = acc.get_mut(key) {
            let current = std::mem::replace(state, MultiValue::Multiple);
            *state = combine(current, value, options);
        } else {
            // Key unseen until now: the earlier entities implicitly held null.
            let state = combine(MultiValue::Concrete(Value::Null), value, options);
            acc.insert(key.clone(), state);
        }
    }
    for (key, state) in acc.iter_mut() {
        if !entity.contains_key(key) {
            let current = std::mem::replace(state, MultiValue::Multiple);
            *state = combine(current, &Value::Null, options);
        }
    }
    acc
}

fn combine(state: MultiValue, value: &Value, options: FoldOptions) -> MultiValue {
    match state {
        MultiValue::Multiple => MultiValue::Multiple,
        MultiValue::Object(map) => match value {
            Value::Object(entity) => MultiValue::Object(combine_objects(map, entity, options)),
            _ => MultiValue::Multiple,
        },
        MultiValue::Elements(items) => match value {
            Value::Array(values) if values.len() == items.len() => MultiValue::Elements(
                items
                    .into_iter()
                    .zip(values)
                    .map(|(item, v)| combine(item, v, options))
                    .collect(),
            ),
            _ => MultiValue::Multiple,
        },
        MultiValue::Concrete(agreed) => {
            if deep_equal(&agreed, value) {
                return MultiValue::Concrete(agreed);
            }
            match (&agreed, value) {
                (Value::Array(ours), Value::Array(theirs))
                    if options.fold_arrays_elementwise && ours.len() == theirs.len() =>
                {
                    MultiValue::Elements(
                        ours.iter()
                            .zip(theirs)
                            .map(|(a, b)| combine(MultiValue::from_value(a), b, options))
                            .collect(),
                    )
                }
                _ => MultiValue::Multiple,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value
            .as_object()
            .cloned()
            .expect("fixture must be a JSON object")
    }

    #[test]
    fn folding_nothing_gives_an_empty_tree() {
        let tree = fold_entities(std::iter::empty::<&Map<String, Value>>());
        assert!(tree.is_empty());
    }

    #[test]
    fn single_entity_folds_to_itself() {
        let a = fields(json!({"title": "a", "meta": {"n": 1}}));
        let tree = fold_entities([&a]);
        assert_eq!(tree["title"], MultiValue::Concrete(json!("a")));
        let MultiValue::Object(meta) = &tree["meta"] else {
            panic!("nested object must stay structural");
        };
        assert_eq!(meta["n"], MultiValue::Concrete(json!(1)));
    }

    #[test]
    fn agreement_keeps_values_divergence_collapses() {
        let a = fields(json!({"status": "open", "owner": "ann"}));
        let b = fields(json!({"status": "open", "owner": "bo"}));
        let tree = fold_entities(vec![&a, &b]);
        assert_eq!(tree["status"], MultiValue::Concrete(json!("open")));
        assert_eq!(tree["owner"], MultiValue::Multiple);
    }

    #[test]
    fn missing_key_folds_like_null() {
        let a = fields(json!({"x": 1}));
        let b = fields(json!({}));
        let forward = fold_entities(vec![&a, &b]);
        let backward = fold_entities(vec![&b, &a]);
        assert_eq!(forward["x"], MultiValue::Multiple);
        assert_eq!(backward["x"], MultiValue::Multiple);

        let c = fields(json!({"x": null}));
        let d = fields(json!({}));
        let agreed = fold_entities(vec![&c, &d]);
        assert_eq!(agreed["x"], MultiValue::Concrete(Value::Null));
    }

    #[test]
    fn fold_is_order_independent() {
        let a = fields(json!({"s": "x", "n": 1, "meta": {"k": true}}));
        let b = fields(json!({"s": "x", "n": 2, "meta": {"k": true}}));
        let c = fields(json!({"s": "y", "n": 1}));
        let orders: [[&Map<String, Value>; 3]; 3] = [[&a, &b, &c], [&c, &b, &a], [&b, &c, &a]];
        let folded: Vec<MultiObject> = orders
            .iter()
            .map(|order| fold_entities(order.iter().copied()))
            .collect();
        assert!(crate::multi::multi_object_equal(&folded[0], &folded[1]));
        assert!(crate::multi::multi_object_equal(&folded[1], &folded[2]));
        assert_eq!(folded[0]["s"], MultiValue::Multiple);
        assert_eq!(folded[0]["n"], MultiValue::Multiple);
        assert_eq!(folded[0]["meta"], MultiValue::Multiple);
    }

    #[test]
    fn nested_divergence_stays_local() {
        let a = fields(json!({"resolution": {"status": "draft", "by": "ann"}}));
        let b = fields(json!({"resolution": {"status": "final", "by": "ann"}}));
        let tree = fold_entities(vec![&a, &b]);
        let MultiValue::Object(res) = &tree["resolution"] else {
            panic!("matching object shapes must fold structurally");
        };
        assert_eq!(res["status"], MultiValue::Multiple);
        assert_eq!(res["by"], MultiValue::Concrete(json!("ann")));
    }

    #[test]
    fn type_conflict_collapses_the_whole_node() {
        let a = fields(json!({"resolution": {"status": "draft"}}));
        let b = fields(json!({"resolution": "n/a"}));
        let tree = fold_entities(vec![&a, &b]);
        assert_eq!(tree["resolution"], MultiValue::Multiple);
    }

    #[test]
    fn whole_value_arrays_collapse_on_any_difference() {
        let a = fields(json!({"tags": [1, 2, 3]}));
        let b = fields(json!({"tags": [1, 2, 4]}));
        let tree = fold_entities(vec![&a, &b]);
        assert_eq!(tree["tags"], MultiValue::Multiple);
    }

    #[test]
    fn elementwise_option_folds_positions_independently() {
        let options = FoldOptions {
            fold_arrays_elementwise: true,
        };
        let a = fields(json!({"slots": ["ann", "bo", "cyd"]}));
        let b = fields(json!({"slots": ["ann", "max", "cyd"]}));
        let tree = fold_entities_with(vec![&a, &b], options);
        let MultiValue::Elements(slots) = &tree["slots"] else {
            panic!("same-length arrays must fold per position");
        };
        assert_eq!(slots[0], MultiValue::Concrete(json!("ann")));
        assert_eq!(slots[1], MultiValue::Multiple);
        assert_eq!(slots[2], MultiValue::Concrete(json!("cyd")));
    }

    #[test]
    fn elementwise_still_collapses_length_mismatch() {
        let options = FoldOptions {
            fold_arrays_elementwise: true,
        };
        let a = fields(json!({"slots": ["ann", "bo"]}));
        let b = fields(json!({"slots": ["ann"]}));
        let tree = fold_entities_with(vec![&a, &b], options);
        assert_eq!(tree["slots"], MultiValue::Multiple);
    }

    #[test]
    fn collapsed_nodes_stay_collapsed() {
        let a = fields(json!({"owner": "ann"}));
        let b = fields(json!({"owner": "bo"}));
        let c = fields(json!({"owner": "ann"}));
        let mut fold = Fold::new();
        fold.push(&a);
        fold.push(&b);
        fold.push(&c);
        let tree = fold.finish();
        assert_eq!(tree["owner"], MultiValue::Multiple);
    }

    #[test]
    fn fold_into_treats_empty_accumulator_as_empty_entities() {
        let mut acc = MultiObject::new();
        let entity = fields(json!({"x": 5}));
        fold_into(&mut acc, &entity, FoldOptions::default());
        // The empty tree stands for entities with no fields, i.e. x = null.
        assert_eq!(acc["x"], MultiValue::Multiple);
    }

    #[test]
    fn strict_number_representations_diverge() {
        let a = fields(json!({"n": 1}));
        let b = fields(json!({"n": 1.0}));
        let tree = fold_entities(vec![&a, &b]);
        assert_eq!(tree["n"], MultiValue::Multiple);
    }
}
