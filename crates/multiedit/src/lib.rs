//! Edit-session controller over the bulk-edit engine.
//!
//! `multiedit-core` supplies the pure transforms (fold, diff, merge); this
//! crate supplies the stateful shell a host application talks to:
//!
//! * [`EditSession`]: one Saved/Edited pair over a selection of
//!   [`Entity`] values, with pointer-identity dirty tracking, guarded
//!   reload, an add branch for create-new flows, and per-entity submit
//!   through a [`PatchStore`].
//! * [`Autosave`]: a wrapper that submits the session after a quiet
//!   period, with explicit-`Instant` scheduling and structural
//!   flush-before-discard guarantees.
//! * [`MemoryStore`]: the in-crate reference store, used by the tests and
//!   by hosts that keep entities in process.
//!
//! The engine's sentinel never crosses the store boundary; the patch types
//! a store receives cannot express it.

pub mod autosave;
pub mod entity;
pub mod hooks;
pub mod session;
pub mod store;

pub use autosave::{Autosave, DebounceOptions};
pub use entity::{Entity, EntityError, EntityId};
pub use hooks::{AcceptAll, Confirm, DeclineAll, ExpandPatch, IdentityExpand};
pub use session::{
    DiffDepth, EditSession, SessionError, SessionOptions, SessionState, SubmitReport,
    DISCARD_PROMPT,
};
pub use store::{MemoryStore, PatchStore, StoreError};
