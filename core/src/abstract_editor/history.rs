//! Undo/redo command log.
//!
//! [`EditActionHistory`] is a single linear log of applied actions. Recording
//! a new action after undoing drops the redo branch, the same
//! truncate-on-branch rule the layer history follows.

use std::collections::VecDeque;
use std::fmt;

use super::action::{EditAction, EditActionResult, Editable};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Undo/redo log of editor actions.
///
/// The undo stack is a bounded [`VecDeque`]; past `max_undo` entries the
/// oldest one is dropped. The redo stack can never outgrow what the undo
/// stack held, so it is a plain [`Vec`].
///
/// Undoing or redoing with nothing on the relevant stack is a no-op that
/// reports `Ok(false)`. An action whose `undo`/`apply` fails goes back onto
/// the stack it was taken from, so a failure never reorders the log.
pub struct EditActionHistory<T: Editable> {
    undo_stack: VecDeque<Box<dyn EditAction<T>>>,
    redo_stack: Vec<Box<dyn EditAction<T>>>,
    max_undo: usize,
    /// Content-modifying steps between the current state and the last save.
    ///
    /// - `Some(0)`: current state matches the last save.
    /// - `Some(n)`, `n > 0`: `n` undos reach the saved state.
    /// - `Some(n)`, `n < 0`: `|n|` redos reach the saved state.
    /// - `None`: the saved state is unreachable (dropped by capacity or
    ///   discarded with a redo branch).
    save_distance: Option<i64>,
}

impl<T: Editable> EditActionHistory<T> {
    /// Creates an empty log keeping at most `max_undo` undo steps.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
            save_distance: Some(0),
        }
    }

    /// Applies `action` to `target` and records it if it is
    /// [recorded](EditAction::is_recorded).
    ///
    /// Recording clears the redo stack. Non-recorded actions touch neither
    /// stack. An action that fails to apply is dropped and the log is left
    /// exactly as it was.
    pub fn execute(&mut self, mut action: Box<dyn EditAction<T>>, target: &mut T) -> EditActionResult {
        action.apply(target)?;

        if !action.is_recorded() {
            return Ok(());
        }

        self.redo_stack.clear();
        if let Some(d) = self.save_distance
            && d < 0
        {
            self.save_distance = None;
        }

        if action.modifies_content()
            && let Some(d) = &mut self.save_distance
        {
            *d += 1;
        }

        self.undo_stack.push_back(action);
        self.enforce_capacity();
        Ok(())
    }

    /// Undoes the most recent recorded action.
    ///
    /// Returns `Ok(false)` if there was nothing to undo.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(e) = action.undo(target) {
            self.undo_stack.push_back(action);
            return Err(e);
        }
        if action.modifies_content()
            && let Some(d) = &mut self.save_distance
        {
            *d -= 1;
        }
        self.redo_stack.push(action);
        Ok(true)
    }

    /// Re-applies the most recently undone action.
    ///
    /// Returns `Ok(false)` if there was nothing to redo.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = action.apply(target) {
            self.redo_stack.push(action);
            return Err(e);
        }
        if action.modifies_content()
            && let Some(d) = &mut self.save_distance
        {
            *d += 1;
        }
        self.undo_stack.push_back(action);
        self.enforce_capacity();
        Ok(true)
    }

    fn enforce_capacity(&mut self) {
        while self.undo_stack.len() > self.max_undo {
            if let Some(dropped) = self.undo_stack.pop_front() {
                log::trace!("Undo log full, dropping {}", dropped.description());
            }
        }
        let reachable = self
            .undo_stack
            .iter()
            .filter(|action| action.modifies_content())
            .count() as i64;
        if let Some(d) = self.save_distance
            && d > reachable
        {
            self.save_distance = None;
        }
    }

    /// Returns `true` if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Redo descriptions, next-to-redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
    }

    /// Returns `true` if content changed since the last
    /// [`mark_saved`](Self::mark_saved), or the saved state is unreachable.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }

    /// Clears both stacks.
    ///
    /// Being at the saved state survives the clear; any other save point
    /// becomes unreachable.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
    }
}

impl<T: Editable> fmt::Debug for EditActionHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("save_distance", &self.save_distance)
            .finish()
    }
}
