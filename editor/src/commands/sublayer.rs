use strata_core::abstract_editor::{EditAction, EditActionError, EditActionResult};
use strata_doc::{LayerHandle, StageHandle};

use super::{document_error, not_applied};
use crate::EditSession;

/// Edit targets moved to a root layer when a sublayer left a stack.
type Retargeted = Vec<(StageHandle, LayerHandle)>;

/// Insert a sublayer path into a layer's sublayer list.
#[derive(Debug)]
pub struct LayerInsertSubLayer {
    layer: LayerHandle,
    sublayer: String,
    index: usize,
    retargeted: Retargeted,
}

impl LayerInsertSubLayer {
    /// `index` past the end appends.
    pub fn new(layer: LayerHandle, sublayer: impl Into<String>, index: usize) -> Self {
        Self {
            layer,
            sublayer: sublayer.into(),
            index,
            retargeted: Vec::new(),
        }
    }
}

impl EditAction<EditSession> for LayerInsertSubLayer {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session
            .registry_mut()
            .edit(&self.layer, |c| c.insert_sublayer(self.index, &self.sublayer))
            .map_err(document_error)?;
        session.refresh_layer_stacks();
        session.restore_edit_targets(std::mem::take(&mut self.retargeted));
        Ok(())
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        session
            .registry_mut()
            .edit(&self.layer, |c| c.remove_sublayer(&self.sublayer))
            .map_err(document_error)?;
        self.retargeted = session.refresh_layer_stacks();
        Ok(())
    }

    fn description(&self) -> &str {
        "Insert sublayer"
    }
}

/// Remove a sublayer path from a layer's sublayer list.
///
/// A stage that was editing the removed sublayer edits its root layer
/// afterwards; undo gives it the old edit target back.
#[derive(Debug)]
pub struct LayerRemoveSubLayer {
    layer: LayerHandle,
    sublayer: String,
    removed_from: Option<usize>,
    retargeted: Retargeted,
}

impl LayerRemoveSubLayer {
    pub fn new(layer: LayerHandle, sublayer: impl Into<String>) -> Self {
        Self {
            layer,
            sublayer: sublayer.into(),
            removed_from: None,
            retargeted: Vec::new(),
        }
    }
}

impl EditAction<EditSession> for LayerRemoveSubLayer {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        let index = session
            .registry_mut()
            .edit(&self.layer, |c| c.remove_sublayer(&self.sublayer))
            .map_err(document_error)?;
        self.removed_from = Some(index);
        self.retargeted = session.refresh_layer_stacks();
        Ok(())
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        let index = self.removed_from.ok_or_else(not_applied)?;
        session
            .registry_mut()
            .edit(&self.layer, |c| c.insert_sublayer(index, &self.sublayer))
            .map_err(document_error)?;
        session.refresh_layer_stacks();
        session.restore_edit_targets(std::mem::take(&mut self.retargeted));
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove sublayer"
    }
}

/// Move a sublayer one slot up (stronger) or down (weaker).
///
/// Fails if the sublayer is already at that end of the list.
#[derive(Debug)]
pub struct LayerMoveSubLayer {
    layer: LayerHandle,
    sublayer: String,
    up: bool,
}

impl LayerMoveSubLayer {
    pub fn new(layer: LayerHandle, sublayer: impl Into<String>, up: bool) -> Self {
        Self {
            layer,
            sublayer: sublayer.into(),
            up,
        }
    }

    fn shift(&self, session: &mut EditSession, up: bool) -> EditActionResult {
        let moved = session
            .registry_mut()
            .edit(&self.layer, |c| c.move_sublayer(&self.sublayer, up))
            .map_err(document_error)?;
        if !moved {
            return Err(EditActionError::InvalidState(format!(
                "{} cannot move further {}",
                self.sublayer,
                if up { "up" } else { "down" }
            )));
        }
        session.refresh_layer_stacks();
        Ok(())
    }
}

impl EditAction<EditSession> for LayerMoveSubLayer {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        self.shift(session, self.up)
    }

    fn undo(&mut self, session: &mut EditSession) -> EditActionResult {
        self.shift(session, !self.up)
    }

    fn description(&self) -> &str {
        if self.up {
            "Move sublayer up"
        } else {
            "Move sublayer down"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sublayers(layer: &LayerHandle) -> Vec<String> {
        layer.read(|c| c.sublayers.clone())
    }

    #[test]
    fn insert_and_remove_round_trip_positions() {
        let mut session = EditSession::new();
        let layer = session.registry_mut().anonymous("root");

        LayerInsertSubLayer::new(Arc::clone(&layer), "a.strata", 0)
            .apply(&mut session)
            .unwrap();
        let mut insert = LayerInsertSubLayer::new(Arc::clone(&layer), "b.strata", 99);
        insert.apply(&mut session).unwrap();
        assert_eq!(sublayers(&layer), ["a.strata", "b.strata"]);

        let mut remove = LayerRemoveSubLayer::new(Arc::clone(&layer), "a.strata");
        remove.apply(&mut session).unwrap();
        assert_eq!(sublayers(&layer), ["b.strata"]);
        remove.undo(&mut session).unwrap();
        assert_eq!(sublayers(&layer), ["a.strata", "b.strata"]);

        insert.undo(&mut session).unwrap();
        assert_eq!(sublayers(&layer), ["a.strata"]);
    }

    #[test]
    fn move_fails_at_the_ends() {
        let mut session = EditSession::new();
        let layer = session.registry_mut().anonymous("root");
        session
            .registry_mut()
            .edit(&layer, |c| {
                c.insert_sublayer(0, "a.strata")?;
                c.insert_sublayer(1, "b.strata")
            })
            .unwrap();

        let mut up = LayerMoveSubLayer::new(Arc::clone(&layer), "b.strata", true);
        up.apply(&mut session).unwrap();
        assert_eq!(sublayers(&layer), ["b.strata", "a.strata"]);
        assert!(up.apply(&mut session).is_err());

        up.undo(&mut session).unwrap();
        assert_eq!(sublayers(&layer), ["a.strata", "b.strata"]);
    }

    #[test]
    fn removing_the_edit_target_falls_back_to_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = EditSession::new();
        session.create_layer(&dir.path().join("sub.strata"));
        let sub = Arc::clone(session.current_layer().unwrap());
        session.create_stage(&dir.path().join("shot.strata"));
        let root = Arc::clone(session.current_stage().unwrap().root_layer());

        LayerInsertSubLayer::new(Arc::clone(&root), "sub.strata", 0)
            .apply(&mut session)
            .unwrap();
        session.set_current_edit_target(&sub);
        assert_eq!(session.edit_target().unwrap().id(), sub.id());

        let mut remove = LayerRemoveSubLayer::new(Arc::clone(&root), "sub.strata");
        remove.apply(&mut session).unwrap();
        assert_eq!(session.edit_target().unwrap().id(), root.id());
        assert_eq!(session.current_stage().unwrap().layer_stack().len(), 1);

        remove.undo(&mut session).unwrap();
        assert_eq!(session.current_stage().unwrap().layer_stack().len(), 2);
        assert_eq!(session.edit_target().unwrap().id(), sub.id());

        remove.apply(&mut session).unwrap();
        assert_eq!(session.edit_target().unwrap().id(), root.id());
    }

    #[test]
    fn undoing_an_insert_restores_the_edit_target_on_redo() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = EditSession::new();
        session.create_layer(&dir.path().join("sub.strata"));
        let sub = Arc::clone(session.current_layer().unwrap());
        session.create_stage(&dir.path().join("shot.strata"));
        let root = Arc::clone(session.current_stage().unwrap().root_layer());

        let mut insert = LayerInsertSubLayer::new(Arc::clone(&root), "sub.strata", 0);
        insert.apply(&mut session).unwrap();
        session.set_current_edit_target(&sub);

        insert.undo(&mut session).unwrap();
        assert_eq!(session.edit_target().unwrap().id(), root.id());
        insert.apply(&mut session).unwrap();
        assert_eq!(session.edit_target().unwrap().id(), sub.id());
    }
}
