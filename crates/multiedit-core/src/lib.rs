//! Core engine for bulk edits across many entities at once.
//!
//! The pipeline has three legs, each a pure function over JSON-shaped data:
//!
//! * [`fold`]: collapse a set of entities into one [`MultiObject`] whose
//!   disagreeing fields hold the [`MultiValue::Multiple`] sentinel.
//! * [`diff`]: compare trees (plain or folded) into field-level patches.
//! * [`merge`]: apply patches back, to folded trees while the user edits and
//!   to plain entities when a write is sent to a store.
//!
//! Everything compares with one equality policy, defined in
//! `multiedit-equal`: a missing object key equals an explicit null, numbers
//! are representation-strict, arrays compare as whole values.

pub mod diff;
pub mod fold;
pub mod merge;
pub mod multi;
pub mod patch;
pub mod pointer;

pub use diff::{diff, multi_diff, shallow_diff};
pub use fold::{fold_entities, fold_entities_with, fold_into, Fold, FoldOptions};
pub use merge::{apply_changes, merge, merge_into};
pub use multi::{
    concrete_object, multi_equal, multi_object_equal, object_from_entity, placeholder_view,
    MultiObject, MultiValue, MULTIPLE_PLACEHOLDER,
};
pub use patch::{
    MultiPatch, MultiPatchValue, Patch, PatchParseError, PatchValue, SentinelError,
};
