//! Frame-deferred command queue.
//!
//! Widgets read document state while a frame is being drawn, so nothing may
//! mutate that state until the draw pass is over. [`ActionQueue`] collects
//! everything dispatched during the pass; the owner drains it once the frame
//! has been drawn and runs each entry through
//! [`EditActionHistory`](super::EditActionHistory).

use std::fmt;

use parking_lot::Mutex;

use super::action::{EditAction, Editable};

/// One entry of the deferred queue.
///
/// Undo and redo are queued like any other command so that they obey the
/// same frame boundary and the same per-entry failure isolation.
pub enum Deferred<T: Editable> {
    /// Apply an action (and record it, if it is recorded).
    Action(Box<dyn EditAction<T>>),
    /// Reverse the most recent recorded action.
    Undo,
    /// Re-apply the most recently undone action.
    Redo,
}

impl<T: Editable> Deferred<T> {
    /// Short description, used when reporting failures.
    pub fn description(&self) -> &str {
        match self {
            Deferred::Action(action) => action.description(),
            Deferred::Undo => "Undo",
            Deferred::Redo => "Redo",
        }
    }
}

impl<T: Editable> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Deferred::Undo => f.write_str("Undo"),
            Deferred::Redo => f.write_str("Redo"),
        }
    }
}

/// FIFO queue of [`Deferred`] entries that can be filled through `&self`.
///
/// The draw pass only holds shared references to the editor, so
/// [`push`](Self::push) relies on interior mutability. Draining hands the
/// entries back in dispatch order and leaves the queue empty; anything pushed
/// while the drained entries run lands in the next drain.
pub struct ActionQueue<T: Editable> {
    queue: Mutex<Vec<Deferred<T>>>,
}

impl<T: Editable> ActionQueue<T> {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Enqueues an action.
    pub fn push(&self, action: Box<dyn EditAction<T>>) {
        self.queue.lock().push(Deferred::Action(action));
    }

    /// Enqueues an undo request.
    pub fn push_undo(&self) {
        self.queue.lock().push(Deferred::Undo);
    }

    /// Enqueues a redo request.
    pub fn push_redo(&self) {
        self.queue.lock().push(Deferred::Redo);
    }

    /// Takes every queued entry, in dispatch order.
    pub fn drain(&self) -> Vec<Deferred<T>> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Number of entries waiting for the next drain.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl<T: Editable> Default for ActionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for ActionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_editor::action::EditActionResult;

    #[derive(Default)]
    struct Log {
        entries: Vec<&'static str>,
    }
    impl Editable for Log {}

    #[derive(Debug)]
    struct Append(&'static str);

    impl EditAction<Log> for Append {
        fn apply(&mut self, target: &mut Log) -> EditActionResult {
            target.entries.push(self.0);
            Ok(())
        }

        fn undo(&mut self, target: &mut Log) -> EditActionResult {
            target.entries.pop();
            Ok(())
        }

        fn description(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn drain_preserves_dispatch_order() {
        let queue = ActionQueue::<Log>::new();
        queue.push(Box::new(Append("x")));
        queue.push(Box::new(Append("y")));
        queue.push(Box::new(Append("z")));

        let mut log = Log::default();
        for entry in queue.drain() {
            if let Deferred::Action(mut action) = entry {
                action.apply(&mut log).unwrap();
            }
        }
        assert_eq!(log.entries, ["x", "y", "z"]);
    }

    #[test]
    fn push_does_not_run_anything() {
        let queue = ActionQueue::<Log>::new();
        let log = Log::default();
        queue.push(Box::new(Append("x")));
        assert!(log.entries.is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drain_empties_queue() {
        let queue = ActionQueue::<Log>::new();
        queue.push(Box::new(Append("x")));
        queue.push_undo();
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn undo_and_redo_keep_their_slot() {
        let queue = ActionQueue::<Log>::new();
        queue.push(Box::new(Append("x")));
        queue.push_undo();
        queue.push_redo();

        let descriptions: Vec<String> = queue
            .drain()
            .iter()
            .map(|entry| entry.description().to_owned())
            .collect();
        assert_eq!(descriptions, ["x", "Undo", "Redo"]);
    }

    #[test]
    fn debug_impl() {
        let queue = ActionQueue::<Log>::new();
        queue.push_redo();
        let debug = format!("{queue:?}");
        assert!(debug.contains("ActionQueue"));
        assert!(debug.contains("pending: 1"));
    }
}
