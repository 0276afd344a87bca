//! Abstract editor framework for reversible, frame-deferred editing.
//!
//! This module holds the pieces of the editing-state machine that do not
//! care what is being edited. The concrete session, documents and command
//! set live in `strata-editor`.
//!
//! - [`Editable`]: marker trait for edit targets
//! - [`EditAction`]: one unit of mutation (Command pattern)
//! - [`EditActionHistory`]: the undo/redo log
//! - [`ActionQueue`]: commands dispatched during a draw pass, drained after it
//! - [`Deferred`]: a queue entry: an action, or an undo/redo request
//!
//! # Recorded vs non-recorded actions
//!
//! Actions are **recorded** in the undo/redo log by default. Session
//! operations such as opening a file or moving through the layer history
//! override [`EditAction::is_recorded`] to return `false`: they run exactly
//! once and are then dropped.
//!
//! Recorded actions can return `false` from [`EditAction::modifies_content`]
//! when they only change editor state (the selection, for instance). They
//! stay undoable but never count as unsaved document changes.

mod action;
mod action_queue;
mod history;

pub use action::{AsAny, EditAction, EditActionError, EditActionResult, Editable};
pub use action_queue::{ActionQueue, Deferred};
pub use history::{DEFAULT_MAX_UNDO, EditActionHistory};
