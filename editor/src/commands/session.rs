//! Session commands: opening, creating, saving and navigating documents.
//!
//! These run once when the queue is drained and are not recorded. They
//! never fail; problems are logged by the session and leave it unchanged.

use std::path::PathBuf;

use strata_core::abstract_editor::{EditAction, EditActionResult};
use strata_doc::LayerHandle;

use crate::{EditSession, StageId};

#[derive(Debug)]
pub struct OpenDocument {
    pub path: PathBuf,
    pub as_stage: bool,
}

impl EditAction<EditSession> for OpenDocument {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session.open_document(&self.path, self.as_stage);
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Open document"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct CreateDocument {
    pub path: PathBuf,
    pub as_stage: bool,
}

impl EditAction<EditSession> for CreateDocument {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session.create_document(&self.path, self.as_stage);
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Create document"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct SaveCurrentLayerAs {
    pub path: PathBuf,
}

impl EditAction<EditSession> for SaveCurrentLayerAs {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session.save_current_layer_as(&self.path);
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Save layer as"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct SaveCurrentLayer;

impl EditAction<EditSession> for SaveCurrentLayer {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session.save_current_layer();
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Save layer"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

/// Make a cached stage current. `None` clears the current stage.
#[derive(Debug)]
pub struct SelectStage {
    pub id: Option<StageId>,
}

impl EditAction<EditSession> for SelectStage {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        match self.id {
            Some(id) => session.set_current_stage_by_id(id),
            None => session.set_current_stage(None),
        }
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Select stage"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct SelectLayer {
    pub layer: LayerHandle,
}

impl EditAction<EditSession> for SelectLayer {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session.set_current_layer(Some(self.layer.clone()));
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Select layer"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Previous,
    Next,
}

/// Move back or forward in the layer history.
#[derive(Debug)]
pub struct NavigateLayerHistory {
    pub direction: HistoryDirection,
}

impl EditAction<EditSession> for NavigateLayerHistory {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        match self.direction {
            HistoryDirection::Previous => session.select_previous_layer(),
            HistoryDirection::Next => session.select_next_layer(),
        }
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        match self.direction {
            HistoryDirection::Previous => "Previous layer",
            HistoryDirection::Next => "Next layer",
        }
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct SetEditTarget {
    pub layer: LayerHandle,
}

impl EditAction<EditSession> for SetEditTarget {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session.set_current_edit_target(&self.layer);
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Set edit target"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}

/// Files dropped onto the editor window.
#[derive(Debug)]
pub struct DropFiles {
    pub paths: Vec<PathBuf>,
}

impl EditAction<EditSession> for DropFiles {
    fn apply(&mut self, session: &mut EditSession) -> EditActionResult {
        session.handle_file_drop(&self.paths);
        Ok(())
    }

    fn undo(&mut self, _session: &mut EditSession) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Drop files"
    }

    fn is_recorded(&self) -> bool {
        false
    }
}
