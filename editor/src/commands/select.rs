use strata_core::abstract_editor::{EditAction, EditActionResult};
use strata_doc::PrimPath;

use super::not_applied;
use crate::EditSession;

/// Replace the prim selection.
///
/// Undoable, but it never marks documents as modified.
#[derive(Debug)]
pub struct EditorSelectPrimPath {
    paths: Vec<PrimPath>,
    previous: Option<Vec<PrimPath>>,
}

impl EditorSelectPrimPath {
    pub fn new(paths: impl IntoIterator<Item = PrimPath>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            previous: None,
        }
    }
}

impl EditAction<EditSession> for EditorSelectPrimPath {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        let previous = session.selection_mut().replace(self.paths.iter().cloned());
        self.previous = Some(previous);
        Ok(())
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        let previous = self.previous.take().ok_or_else(not_applied)?;
        session.selection_mut().replace(previous);
        Ok(())
    }

    fn description(&self) -> &str {
        "Select"
    }

    fn modifies_content(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PrimPath {
        PrimPath::parse(s).unwrap()
    }

    #[test]
    fn select_and_undo() {
        let mut session = EditSession::new();
        let mut first = EditorSelectPrimPath::new([p("/A")]);
        first.apply(&mut session).unwrap();

        let mut second = EditorSelectPrimPath::new([p("/B"), p("/C")]);
        second.apply(&mut session).unwrap();
        assert_eq!(session.selection().paths(), [p("/B"), p("/C")]);

        second.undo(&mut session).unwrap();
        assert_eq!(session.selection().paths(), [p("/A")]);
        assert!(!second.modifies_content());
    }
}
