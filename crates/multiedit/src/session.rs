//! The edit session: one Saved/Edited pair over a selection of entities,
//! from load to submit or cancel.
//!
//! Saved is the fold of the selection as last observed from the store;
//! Edited starts as the same `Arc` and is replaced on each edit. Dirtiness
//! is therefore pointer identity, not a diff: an edit that lands back on the
//! saved values snaps Edited to the saved `Arc` again, so "changed and
//! changed back" costs nothing and needs no undo bookkeeping.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use multiedit_core::{
    apply_changes, concrete_object, diff, fold_entities, merge, multi_diff, multi_object_equal,
    object_from_entity, shallow_diff, MultiObject, Patch,
};

use crate::entity::{Entity, EntityError, EntityId};
use crate::hooks::{Confirm, ExpandPatch, IdentityExpand};
use crate::store::{PatchStore, StoreError};

/// Message shown before a dirty session is replaced by a new selection.
pub const DISCARD_PROMPT: &str = "Discard unsaved changes?";

/// How per-entity patches are cut before they reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffDepth {
    /// Nested records produce nested patches touching only changed fields.
    #[default]
    Deep,
    /// Changed top-level fields are sent whole, nested records included.
    Shallow,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub depth: DiffDepth,
    /// Field raw JSON records carry their identifier under.
    pub id_field: String,
}

impl Default for SessionOptions {
    fn default() -> SessionOptions {
        SessionOptions {
            depth: DiffDepth::Deep,
            id_field: "id".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No selection.
    Idle,
    /// A selection is loaded and unedited.
    Loaded,
    /// The edited tree differs from the saved tree.
    Editing,
    /// A submit is running.
    Saving,
    /// Building one new entity instead of editing a selection.
    Adding,
}

/// Per-entity outcome of one submit. Entities whose cut patch came out
/// empty are skipped without a store call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReport {
    pub applied: Vec<EntityId>,
    pub skipped: Vec<EntityId>,
    pub failed: Vec<(EntityId, StoreError)>,
}

impl SubmitReport {
    /// True when the submit touched no store at all.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }

    pub fn fully_applied(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Guards hosts that layer async scheduling over the session. The
    /// built-in flow completes every submit before returning, so the
    /// saving state is never observable through this API.
    #[error("a submit is already in progress")]
    SubmitInProgress,
    /// Guards hosts that construct an edited tree themselves. A draft
    /// assembled through [`EditSession::begin_add`] and
    /// [`EditSession::edit`] is concrete by construction.
    #[error("edited values still contain the multi-state sentinel")]
    EditedNotConcrete,
    #[error("create failed: {0}")]
    Create(#[from] StoreError),
}

/// The controller. One instance per feature; the feature's shape comes in
/// through [`SessionOptions`] and an [`ExpandPatch`] hook, not through a
/// per-feature subclass.
pub struct EditSession {
    options: SessionOptions,
    expand: Box<dyn ExpandPatch>,
    originals: Vec<Entity>,
    saved: Arc<MultiObject>,
    edited: Arc<MultiObject>,
    state: SessionState,
}

impl EditSession {
    pub fn new(options: SessionOptions) -> EditSession {
        let saved = Arc::new(MultiObject::new());
        EditSession {
            options,
            expand: Box::new(IdentityExpand),
            originals: Vec::new(),
            edited: Arc::clone(&saved),
            saved,
            state: SessionState::Idle,
        }
    }

    /// Installs a per-entity patch expansion hook.
    pub fn with_expand(mut self, expand: Box<dyn ExpandPatch>) -> EditSession {
        self.expand = expand;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The fold of the selection as last observed from the store.
    pub fn saved(&self) -> &MultiObject {
        &self.saved
    }

    /// The tree the form renders and edits.
    pub fn edited(&self) -> &MultiObject {
        &self.edited
    }

    /// The selected entities, updated in place as submits succeed.
    pub fn originals(&self) -> &[Entity] {
        &self.originals
    }

    pub fn is_dirty(&self) -> bool {
        !Arc::ptr_eq(&self.saved, &self.edited)
    }

    /// Replaces the selection. Any previous Saved/Edited pair is dropped;
    /// an empty selection leaves the session idle.
    pub fn load(&mut self, entities: Vec<Entity>) {
        let folded = fold_entities(entities.iter().map(|entity| &entity.fields));
        self.saved = Arc::new(folded);
        self.edited = Arc::clone(&self.saved);
        self.state = if entities.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Loaded
        };
        self.originals = entities;
    }

    /// [`EditSession::load`] from raw JSON records, extracting ids via
    /// `SessionOptions::id_field`.
    pub fn load_values(&mut self, values: &[Value]) -> Result<(), EntityError> {
        let mut entities = Vec::with_capacity(values.len());
        for value in values {
            entities.push(Entity::from_value(value, &self.options.id_field)?);
        }
        self.load(entities);
        Ok(())
    }

    /// [`EditSession::load`] that prompts before discarding unsaved edits.
    /// Returns false, leaving the session untouched, when the prompt is
    /// declined.
    pub fn load_guarded(&mut self, entities: Vec<Entity>, confirm: &mut dyn Confirm) -> bool {
        if self.is_dirty() && !confirm.confirm(DISCARD_PROMPT) {
            return false;
        }
        self.load(entities);
        true
    }

    /// Enters the create-new flow over a template of default field values.
    /// The template counts as unsaved content; submit will `create`.
    pub fn begin_add(&mut self, template: Map<String, Value>) {
        self.originals = Vec::new();
        self.saved = Arc::new(MultiObject::new());
        self.edited = if template.is_empty() {
            Arc::clone(&self.saved)
        } else {
            Arc::new(object_from_entity(&template))
        };
        self.state = SessionState::Adding;
    }

    /// Applies concrete user edits to the edited tree. An edit that makes
    /// Edited equal to Saved again snaps it back to the saved `Arc`, so
    /// dirtiness clears without an explicit undo.
    pub fn edit(&mut self, changes: &Patch) {
        if changes.is_empty() || self.state == SessionState::Idle {
            return;
        }
        let next = apply_changes(&self.edited, changes);
        if multi_object_equal(&next, &self.saved) {
            self.edited = Arc::clone(&self.saved);
            if self.state == SessionState::Editing {
                self.state = SessionState::Loaded;
            }
        } else {
            self.edited = Arc::new(next);
            if self.state == SessionState::Loaded {
                self.state = SessionState::Editing;
            }
        }
    }

    /// Drops all unsaved edits. In the add flow this abandons the draft
    /// entirely and returns the session to idle.
    pub fn cancel(&mut self) {
        if self.state == SessionState::Adding {
            self.load(Vec::new());
            return;
        }
        self.edited = Arc::clone(&self.saved);
        if self.state == SessionState::Editing {
            self.state = SessionState::Loaded;
        }
    }

    /// Sends the current edits to the store, one patch per entity that
    /// actually changes. Successes replace the session's originals with the
    /// store's canonical records and fold into a fresh Saved; failures keep
    /// their original, so the still-dirty session is the retry baseline and
    /// a second submit touches only the entities that failed.
    pub fn submit(&mut self, store: &mut dyn PatchStore) -> Result<SubmitReport, SessionError> {
        if self.state == SessionState::Saving {
            return Err(SessionError::SubmitInProgress);
        }
        if !self.is_dirty() {
            return Ok(SubmitReport::default());
        }
        if self.state == SessionState::Adding {
            return self.submit_add(store);
        }
        self.state = SessionState::Saving;
        let report = self.submit_patches(store);
        self.state = if self.is_dirty() {
            SessionState::Editing
        } else {
            SessionState::Loaded
        };
        Ok(report)
    }

    fn submit_patches(&mut self, store: &mut dyn PatchStore) -> SubmitReport {
        let mut report = SubmitReport::default();
        let Some(multi) = multi_diff(&self.saved, &self.edited) else {
            // Equal content behind distinct pointers; re-establish identity.
            self.edited = Arc::clone(&self.saved);
            return report;
        };
        let Some(patch) = multi.concrete() else {
            // Only sentinel transitions remain; nothing concrete to send.
            return report;
        };

        let mut originals = std::mem::take(&mut self.originals);
        for entity in &mut originals {
            let expanded = self.expand.expand(entity, patch.clone());
            let updated = merge(&entity.fields, &expanded);
            let entity_patch = match self.options.depth {
                DiffDepth::Deep => diff(&entity.fields, &updated),
                DiffDepth::Shallow => shallow_diff(&entity.fields, &updated),
            };
            let Some(entity_patch) = entity_patch else {
                report.skipped.push(entity.id.clone());
                continue;
            };
            match store.apply_patch(&entity.id, &entity_patch) {
                Ok(canonical) => {
                    report.applied.push(entity.id.clone());
                    *entity = canonical;
                }
                Err(err) => report.failed.push((entity.id.clone(), err)),
            }
        }
        self.originals = originals;

        let folded = fold_entities(self.originals.iter().map(|entity| &entity.fields));
        self.saved = Arc::new(folded);
        // Full success: the whole delta landed, so the authoritative fold is
        // the new truth even where a store stamped extra fields. Any failure
        // keeps Edited as the retry baseline; the failed entity's old value
        // re-appears in the next diff on its own.
        if report.failed.is_empty() || multi_object_equal(&self.saved, &self.edited) {
            self.edited = Arc::clone(&self.saved);
        }
        report
    }

    fn submit_add(&mut self, store: &mut dyn PatchStore) -> Result<SubmitReport, SessionError> {
        let fields = concrete_object(&self.edited).ok_or(SessionError::EditedNotConcrete)?;
        self.state = SessionState::Saving;
        match store.create(&fields) {
            Ok(entity) => {
                let mut report = SubmitReport::default();
                report.applied.push(entity.id.clone());
                self.load(vec![entity]);
                Ok(report)
            }
            Err(err) => {
                // The draft stays; the user can retry or cancel.
                self.state = SessionState::Adding;
                Err(SessionError::Create(err))
            }
        }
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.state)
            .field("entities", &self.originals.len())
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value
            .as_object()
            .cloned()
            .expect("fixture must be a JSON object")
    }

    fn three_ballots() -> Vec<Entity> {
        vec![
            Entity::new(1.into(), fields(json!({"status": "open", "stage": "initial"}))),
            Entity::new(2.into(), fields(json!({"status": "open", "stage": "recirc"}))),
            Entity::new(3.into(), fields(json!({"status": "closed", "stage": "initial"}))),
        ]
    }

    #[test]
    fn load_folds_and_starts_clean() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(three_ballots());
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(!session.is_dirty());
        assert!(session.saved()["status"].is_multiple());
        assert!(!session.saved()["stage"].is_multiple());
    }

    #[test]
    fn empty_selection_is_idle() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(Vec::new());
        assert_eq!(session.state(), SessionState::Idle);
        session.edit(&Patch::new().with("status", json!("x")));
        assert!(!session.is_dirty());
    }

    #[test]
    fn edit_away_and_back_clears_dirty_by_identity() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(three_ballots());
        session.edit(&Patch::new().with("stage", json!("recirc")));
        assert!(session.is_dirty());
        assert_eq!(session.state(), SessionState::Editing);

        // "stage" disagreed across the selection, so restoring the multi
        // state is impossible by typing; restoring a uniform field is.
        session.load(vec![
            Entity::new(1.into(), fields(json!({"stage": "initial"}))),
            Entity::new(2.into(), fields(json!({"stage": "initial"}))),
        ]);
        session.edit(&Patch::new().with("stage", json!("recirc")));
        assert!(session.is_dirty());
        session.edit(&Patch::new().with("stage", json!("initial")));
        assert!(!session.is_dirty());
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn cancel_restores_saved_exactly() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(three_ballots());
        session.edit(&Patch::new().with("status", json!("closed")));
        session.edit(&Patch::new().with("stage", json!("recirc")));
        session.cancel();
        assert!(!session.is_dirty());
        assert!(session.edited()["status"].is_multiple());
    }

    #[test]
    fn guarded_load_respects_the_prompt() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(three_ballots());
        session.edit(&Patch::new().with("status", json!("closed")));

        let mut declined = |_: &str| false;
        assert!(!session.load_guarded(Vec::new(), &mut declined));
        assert!(session.is_dirty());

        let mut accepted = |_: &str| true;
        assert!(session.load_guarded(Vec::new(), &mut accepted));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn submit_patches_only_entities_that_change() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(three_ballots());
        let mut store = MemoryStore::with_entities(three_ballots());

        // Everyone becomes "open": entity 3 changes, 1 and 2 are skipped.
        session.edit(&Patch::new().with("status", json!("open")));
        let report = session.submit(&mut store).expect("submit runs");
        assert_eq!(report.applied, vec![EntityId::Int(3)]);
        assert_eq!(report.skipped, vec![EntityId::Int(1), EntityId::Int(2)]);
        assert!(report.fully_applied());
        assert!(!session.is_dirty());
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(
            store.get(&EntityId::Int(3)).and_then(|f| f.get("status")),
            Some(&json!("open"))
        );
    }

    #[test]
    fn clean_submit_is_a_no_op() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(three_ballots());
        let mut store = MemoryStore::with_entities(three_ballots());
        let report = session.submit(&mut store).expect("no-op submit");
        assert!(report.is_empty());
    }

    #[test]
    fn untouched_multi_fields_never_reach_the_store() {
        let mut session = EditSession::new(SessionOptions::default());
        session.load(three_ballots());
        let mut store = MemoryStore::with_entities(three_ballots());

        session.edit(&Patch::new().with("stage", json!("final")));
        session.submit(&mut store).expect("submit runs");
        // "status" stayed multiple; each entity keeps its own value.
        assert_eq!(store.get(&EntityId::Int(1)).unwrap()["status"], "open");
        assert_eq!(store.get(&EntityId::Int(3)).unwrap()["status"], "closed");
        assert_eq!(store.get(&EntityId::Int(1)).unwrap()["stage"], "final");
        assert_eq!(store.get(&EntityId::Int(3)).unwrap()["stage"], "final");
    }

    #[test]
    fn expand_hook_runs_per_entity_and_still_diffs() {
        let hook = |entity: &Entity, patch: Patch| {
            // Stamp a field only on entities that were still open.
            if entity.fields.get("status") == Some(&json!("open")) {
                patch.with("renotify", json!(true))
            } else {
                patch
            }
        };
        let mut session =
            EditSession::new(SessionOptions::default()).with_expand(Box::new(hook));
        session.load(three_ballots());
        let mut store = MemoryStore::with_entities(three_ballots());

        session.edit(&Patch::new().with("stage", json!("final")));
        session.submit(&mut store).expect("submit runs");
        assert_eq!(store.get(&EntityId::Int(1)).unwrap()["renotify"], true);
        assert_eq!(store.get(&EntityId::Int(3)).unwrap().get("renotify"), None);
    }

    #[test]
    fn add_flow_creates_and_becomes_loaded() {
        let mut session = EditSession::new(SessionOptions::default());
        session.begin_add(fields(json!({"status": "draft", "stage": "initial"})));
        assert_eq!(session.state(), SessionState::Adding);
        assert!(session.is_dirty());

        session.edit(&Patch::new().with("status", json!("open")));
        let mut store = MemoryStore::new();
        let report = session.submit(&mut store).expect("create succeeds");
        assert_eq!(report.applied, vec![EntityId::Int(1)]);
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(!session.is_dirty());
        assert_eq!(store.get(&EntityId::Int(1)).unwrap()["status"], "open");
    }

    #[test]
    fn add_cancel_abandons_the_draft() {
        let mut session = EditSession::new(SessionOptions::default());
        session.begin_add(fields(json!({"status": "draft"})));
        session.cancel();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.is_dirty());
    }

    #[test]
    fn load_values_uses_the_configured_id_field() {
        let mut session = EditSession::new(SessionOptions {
            id_field: "BallotID".to_string(),
            ..SessionOptions::default()
        });
        session
            .load_values(&[
                json!({"BallotID": "LB-1", "status": "open"}),
                json!({"BallotID": "LB-2", "status": "open"}),
            ])
            .expect("records carry BallotID");
        assert_eq!(session.originals()[0].id, EntityId::from("LB-1"));
        assert!(!session.saved()["status"].is_multiple());

        let err = session
            .load_values(&[json!({"id": 1})])
            .expect_err("missing BallotID must fail");
        assert_eq!(
            err,
            EntityError::MissingId {
                field: "BallotID".to_string()
            }
        );
    }

    #[test]
    fn shallow_depth_sends_nested_records_whole() {
        let mut session = EditSession::new(SessionOptions {
            depth: DiffDepth::Shallow,
            ..SessionOptions::default()
        });
        let entities = vec![Entity::new(
            1.into(),
            fields(json!({"resolution": {"state": "pending", "by": "ann"}})),
        )];
        session.load(entities.clone());
        let mut store = MemoryStore::with_entities(entities);

        session.edit(&Patch::new().with_nested(
            "resolution",
            Patch::new().with("state", json!("adopted")),
        ));
        session.submit(&mut store).expect("submit runs");
        // Whole-record set: the sibling survives because the edited tree
        // still carried it when the record was cut at depth one.
        assert_eq!(
            store.get(&EntityId::Int(1)).unwrap()["resolution"],
            json!({"state": "adopted", "by": "ann"})
        );
    }
}
