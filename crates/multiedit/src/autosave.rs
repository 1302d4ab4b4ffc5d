//! Debounced auto-submission around an [`EditSession`].
//!
//! The wrapper owns the session and a quiet-period timer. Time is passed in
//! explicitly as `Instant`, never read from a clock, so the schedule is
//! deterministic and testable without sleeping. The host calls
//! [`Autosave::poll`] from its loop; edits made right before unmount or a
//! selection change are flushed by [`Autosave::teardown`] and
//! [`Autosave::load`] rather than relying on the timer having fired.

use std::time::{Duration, Instant};

use serde_json::{Map, Value};

use multiedit_core::Patch;

use crate::entity::Entity;
use crate::session::{EditSession, SessionError, SessionState, SubmitReport};
use crate::store::PatchStore;

const DEFAULT_QUIET_MS: u64 = 400;

#[derive(Debug, Clone, Copy)]
pub struct DebounceOptions {
    /// Quiet period after the last edit before a submit fires.
    pub quiet: Duration,
    /// Upper bound on how long a dirty session may wait while edits keep
    /// arriving. `None` lets a steady typist defer the submit indefinitely.
    pub max_wait: Option<Duration>,
}

impl Default for DebounceOptions {
    fn default() -> DebounceOptions {
        DebounceOptions {
            quiet: Duration::from_millis(DEFAULT_QUIET_MS),
            max_wait: None,
        }
    }
}

/// Quiet-period timer state. Armed by edits, cleared by any submit attempt.
#[derive(Debug, Default)]
struct Debounce {
    last_edit: Option<Instant>,
    dirty_since: Option<Instant>,
}

impl Debounce {
    fn note_edit(&mut self, now: Instant) {
        self.last_edit = Some(now);
        self.dirty_since.get_or_insert(now);
    }

    fn clear(&mut self) {
        self.last_edit = None;
        self.dirty_since = None;
    }

    fn deadline(&self, options: &DebounceOptions) -> Option<Instant> {
        let last_edit = self.last_edit?;
        let quiet_deadline = last_edit + options.quiet;
        match (options.max_wait, self.dirty_since) {
            (Some(max_wait), Some(dirty_since)) => {
                Some(quiet_deadline.min(dirty_since + max_wait))
            }
            _ => Some(quiet_deadline),
        }
    }

    fn is_due(&self, now: Instant, options: &DebounceOptions) -> bool {
        self.deadline(options).is_some_and(|deadline| now >= deadline)
    }
}

/// An [`EditSession`] that submits itself after a quiet period.
pub struct Autosave {
    session: EditSession,
    options: DebounceOptions,
    debounce: Debounce,
}

impl Autosave {
    pub fn new(session: EditSession, options: DebounceOptions) -> Autosave {
        Autosave {
            session,
            options,
            debounce: Debounce::default(),
        }
    }

    /// Read access to the wrapped session. Mutation goes through the
    /// wrapper so the timer stays in step with dirtiness.
    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// When the next automatic submit is scheduled, if any.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debounce.deadline(&self.options)
    }

    /// Applies edits and re-arms the quiet period. An edit that snaps the
    /// session back to clean disarms the timer instead; there is nothing
    /// left to save.
    pub fn edit(&mut self, changes: &Patch, now: Instant) {
        self.session.edit(changes);
        if self.session.is_dirty() {
            self.debounce.note_edit(now);
        } else {
            self.debounce.clear();
        }
    }

    /// Submits if the quiet period has elapsed. Call from the host loop;
    /// returns `Ok(None)` when the deadline has not arrived.
    pub fn poll(
        &mut self,
        now: Instant,
        store: &mut dyn PatchStore,
    ) -> Result<Option<SubmitReport>, SessionError> {
        if self.debounce.is_due(now, &self.options) {
            self.flush(store)
        } else {
            Ok(None)
        }
    }

    /// Submits any unsaved edits immediately, due or not. A failed flush
    /// does not re-arm the timer on its own; the next edit does.
    pub fn flush(&mut self, store: &mut dyn PatchStore) -> Result<Option<SubmitReport>, SessionError> {
        self.debounce.clear();
        if !self.session.is_dirty() {
            return Ok(None);
        }
        self.session.submit(store).map(Some)
    }

    /// Replaces the selection, flushing unsaved edits first. The new
    /// selection applies only when the flush fully lands: on error, or when
    /// per-entity failures leave the session dirty, the old selection stays
    /// so no edit is silently discarded.
    pub fn load(
        &mut self,
        entities: Vec<Entity>,
        store: &mut dyn PatchStore,
    ) -> Result<Option<SubmitReport>, SessionError> {
        let report = self.flush(store)?;
        if self.session.is_dirty() {
            return Ok(report);
        }
        self.session.load(entities);
        Ok(report)
    }

    /// Enters the create-new flow, flushing unsaved edits first under the
    /// same rules as [`Autosave::load`]. The draft itself does not arm the
    /// timer; the first edit does.
    pub fn begin_add(
        &mut self,
        template: Map<String, Value>,
        store: &mut dyn PatchStore,
    ) -> Result<Option<SubmitReport>, SessionError> {
        let report = self.flush(store)?;
        if self.session.is_dirty() {
            return Ok(report);
        }
        self.session.begin_add(template);
        Ok(report)
    }

    /// Drops unsaved edits and disarms the timer.
    pub fn cancel(&mut self) {
        self.session.cancel();
        self.debounce.clear();
    }

    /// Consumes the wrapper, flushing unsaved edits. The returned session
    /// no longer autosaves. An `Err` here means the final flush failed and
    /// there is no session left to retry with; hosts that need retry call
    /// [`Autosave::flush`] themselves before tearing down.
    pub fn teardown(
        mut self,
        store: &mut dyn PatchStore,
    ) -> Result<(EditSession, Option<SubmitReport>), SessionError> {
        let report = self.flush(store)?;
        Ok((self.session, report))
    }
}
