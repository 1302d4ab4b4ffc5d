//! multiedit-equal - Deep equality for JSON entity trees.
//!
//! The single equality primitive behind the fold/diff/merge engine. Every
//! place the engine asks "did this field change?" routes through
//! [`deep_equal`] (or [`object_equal`] at the record root), so the
//! normalization policy is decided once, here:
//!
//! - Types never coerce: a number is never equal to a string, `0` is never
//!   equal to `false`, `null` is never equal to `""`.
//! - Numbers compare by their `serde_json::Number` representation: `1` and
//!   `1.0` are different JSON encodings and unequal.
//! - Objects compare over the union of their keys; a key missing on one
//!   side compares as if it were `null`, so `{"a": null}` equals `{}`.
//! - The empty string is a distinct concrete value, never equal to `null`
//!   or to a missing key.
//! - Arrays compare by length, then element-wise.

mod deep_equal;

pub use deep_equal::{deep_equal, object_equal};
