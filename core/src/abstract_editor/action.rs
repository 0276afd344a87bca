//! Edit targets and reversible editor actions.
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`EditAction`]: a unit of mutation, optionally reversible
//! - [`EditActionError`] / [`EditActionResult`]: failure reporting
//!
//! An action owns the arguments captured when it was dispatched and, once
//! applied, whatever it needs to reverse itself (removed subtrees, previous
//! names and so on).

use std::any::Any;
use std::fmt;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Implemented for every `'static` type. Tests and history panels use it to
/// inspect a `&dyn EditAction<T>`.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for types that actions operate on.
pub trait Editable: 'static {}

/// Error type for action execution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditActionError {
    /// The object the action refers to does not exist.
    TargetNotFound(String),
    /// The target is in a state where the action cannot run
    /// (no current stage, path already taken, ...).
    InvalidState(String),
    /// Any other failure, with a description.
    Custom(String),
}

impl fmt::Display for EditActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(msg) => write!(f, "target not found: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EditActionError {}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A unit of mutation applied to an [`Editable`] target (Command pattern).
///
/// Actions are constructed when dispatched, wait in an
/// [`ActionQueue`](super::ActionQueue) until the current frame has been
/// drawn, and are then applied exactly once through
/// [`EditActionHistory::execute`](super::EditActionHistory::execute).
///
/// The trait is dyn-compatible so that every command kind can share one
/// queue and one undo stack as `Box<dyn EditAction<T>>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct Rename {
///     path: PrimPath,
///     new_name: String,
///     old_name: Option<String>,
/// }
///
/// impl EditAction<EditSession> for Rename {
///     fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
///         self.old_name = Some(session.rename(&self.path, &self.new_name)?);
///         Ok(())
///     }
///
///     fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
///         /* rename back */
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Rename prim"
///     }
/// }
/// ```
pub trait EditAction<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the action to the target (forward / redo direction).
    fn apply(&mut self, target: &mut T) -> EditActionResult;

    /// Reverses the action.
    ///
    /// Must restore the target to the state it had before
    /// [`apply`](Self::apply). Never called for non-recorded actions.
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// A short, human-readable description for the edit menu.
    fn description(&self) -> &str;

    /// Whether this action is kept in the undo/redo log.
    ///
    /// Default: `true`.
    fn is_recorded(&self) -> bool {
        true
    }

    /// Whether this action changes document content.
    ///
    /// Recorded actions returning `false` are undoable but ignored by
    /// [`EditActionHistory::has_unsaved_changes`](super::EditActionHistory::has_unsaved_changes).
    ///
    /// Default: `true`.
    fn modifies_content(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: i32,
    }

    impl Editable for Counter {}

    #[derive(Debug)]
    struct Add {
        amount: i32,
    }

    impl EditAction<Counter> for Add {
        fn apply(&mut self, target: &mut Counter) -> EditActionResult {
            target.value += self.amount;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> EditActionResult {
            target.value -= self.amount;
            Ok(())
        }

        fn description(&self) -> &str {
            "Add"
        }
    }

    #[derive(Debug)]
    struct OpenFile;

    impl EditAction<Counter> for OpenFile {
        fn apply(&mut self, _target: &mut Counter) -> EditActionResult {
            Ok(())
        }

        fn undo(&mut self, _target: &mut Counter) -> EditActionResult {
            unreachable!("non-recorded actions are never undone");
        }

        fn description(&self) -> &str {
            "Open file"
        }

        fn is_recorded(&self) -> bool {
            false
        }
    }

    #[test]
    fn undo_reverses_apply() {
        let mut counter = Counter { value: 0 };
        let mut action = Add { amount: 5 };
        action.apply(&mut counter).unwrap();
        assert_eq!(counter.value, 5);
        action.undo(&mut counter).unwrap();
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn defaults_are_recorded_content_edits() {
        let action = Add { amount: 1 };
        assert!(action.is_recorded());
        assert!(action.modifies_content());
        assert!(!OpenFile.is_recorded());
    }

    #[test]
    fn action_error_display() {
        assert_eq!(
            EditActionError::TargetNotFound("/World/Cube".into()).to_string(),
            "target not found: /World/Cube"
        );
        assert_eq!(
            EditActionError::InvalidState("no current stage".into()).to_string(),
            "invalid state: no current stage"
        );
        assert_eq!(EditActionError::Custom("boom".into()).to_string(), "boom");
    }

    #[test]
    fn action_downcasts_through_as_any() {
        let boxed: Box<dyn EditAction<Counter>> = Box::new(Add { amount: 3 });
        let add = (*boxed).as_any().downcast_ref::<Add>().unwrap();
        assert_eq!(add.amount, 3);
        assert!((*boxed).as_any().downcast_ref::<OpenFile>().is_none());
    }
}
