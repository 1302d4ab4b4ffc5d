use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde_json::{json, Map, Value};

use multiedit_core::{diff, fold_entities, merge, multi_diff, shallow_diff};
use multiedit_equal::object_equal;
use multiedit_random::{ballot, comment, webex_account};

fn record(value: Value) -> Map<String, Value> {
    value
        .as_object()
        .cloned()
        .expect("fixture must be a JSON object")
}

#[test]
fn diff_of_identical_records_is_none_for_generated_records() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0xd1ff);
    for template in [ballot(), comment(), webex_account()] {
        for _ in 0..8 {
            let a = template.generate(&mut rng);
            assert!(
                diff(&a, &a).is_none(),
                "a record must never diff against itself"
            );
            assert!(shallow_diff(&a, &a).is_none());
        }
    }

    let records = ballot().generate_set(&mut rng, 4, &["status"]);
    let folded = fold_entities(records.iter());
    assert!(multi_diff(&folded, &folded).is_none());
}

#[test]
fn merge_recovers_the_target_for_generated_pairs() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x4007);
    for template in [ballot(), comment()] {
        for _ in 0..10 {
            let a = template.generate(&mut rng);
            let b = template.generate(&mut rng);

            match diff(&a, &b) {
                Some(patch) => {
                    let merged = merge(&a, &patch);
                    assert!(
                        object_equal(&merged, &b),
                        "deep patch must land on the target\nfrom: {a:?}\nto:   {b:?}"
                    );
                }
                None => assert!(object_equal(&a, &b), "empty diff must mean equal records"),
            }

            match shallow_diff(&a, &b) {
                Some(patch) => {
                    let merged = merge(&a, &patch);
                    assert!(
                        object_equal(&merged, &b),
                        "shallow patch must land on the target\nfrom: {a:?}\nto:   {b:?}"
                    );
                }
                None => assert!(object_equal(&a, &b)),
            }
        }
    }
}

#[test]
fn cleared_and_missing_fields_round_trip_through_null() {
    let a = record(json!({"status": "open", "note": "draft wording"}));
    let b = record(json!({"status": "open"}));

    let patch = diff(&a, &b).expect("dropped key must produce a patch");
    assert_eq!(patch.to_value(), json!({"note": null}));

    let merged = merge(&a, &patch);
    assert!(
        object_equal(&merged, &b),
        "explicit null must equal the missing key"
    );
    assert!(diff(&merged, &b).is_none());

    // The reverse direction: a key that only the target carries.
    let patch = diff(&b, &a).expect("added key must produce a patch");
    assert_eq!(patch.to_value(), json!({"note": "draft wording"}));
    assert!(object_equal(&merge(&b, &patch), &a));
}

#[test]
fn nested_record_edits_round_trip_at_both_depths() {
    let a = record(json!({
        "status": "open",
        "resolution": {"state": "pending", "recorded_by": "ann"}
    }));
    let b = record(json!({
        "status": "open",
        "resolution": {"state": "adopted", "recorded_by": "ann"}
    }));

    let deep = diff(&a, &b).expect("nested change must diff");
    assert_eq!(deep.to_value(), json!({"resolution": {"state": "adopted"}}));
    assert!(object_equal(&merge(&a, &deep), &b));

    let shallow = shallow_diff(&a, &b).expect("nested change must diff");
    assert_eq!(
        shallow.to_value(),
        json!({"resolution": {"state": "adopted", "recorded_by": "ann"}})
    );
    assert!(object_equal(&merge(&a, &shallow), &b));
}

#[test]
fn type_changes_replace_the_value_wholesale() {
    let a = record(json!({"attachments": ["a.txt"], "count": 1}));
    let b = record(json!({"attachments": {"primary": "a.txt"}, "count": 1.0}));

    let patch = diff(&a, &b).expect("type changes must diff");
    // Numbers are representation-strict, so 1 -> 1.0 is a real change.
    assert_eq!(
        patch.to_value(),
        json!({"attachments": {"primary": "a.txt"}, "count": 1.0})
    );
    assert!(object_equal(&merge(&a, &patch), &b));
}
