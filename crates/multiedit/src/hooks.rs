//! Host-supplied hooks: confirmation prompts and per-entity patch expansion.

use multiedit_core::Patch;

use crate::entity::Entity;

/// Asks the user before a destructive step, such as discarding a dirty
/// session. Closures `FnMut(&str) -> bool` implement this directly.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Accepts every prompt. For non-interactive hosts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Confirm for AcceptAll {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

/// Declines every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineAll;

impl Confirm for DeclineAll {
    fn confirm(&mut self, _message: &str) -> bool {
        false
    }
}

/// Turns the session-level patch into the patch one entity should receive.
///
/// A feature hangs its side effects here: marking a record as needing
/// renotification when its schedule changed, stamping an editor field, and
/// so on. The expanded patch still goes through the per-entity diff, so
/// additions that match the entity's current values are not sent.
pub trait ExpandPatch {
    fn expand(&mut self, entity: &Entity, patch: Patch) -> Patch;
}

impl<F: FnMut(&Entity, Patch) -> Patch> ExpandPatch for F {
    fn expand(&mut self, entity: &Entity, patch: Patch) -> Patch {
        self(entity, patch)
    }
}

/// Default hook: every entity receives the session patch unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExpand;

impl ExpandPatch for IdentityExpand {
    fn expand(&mut self, _entity: &Entity, patch: Patch) -> Patch {
        patch
    }
}
