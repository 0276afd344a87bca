//! Concrete commands applied to an [`EditSession`].
//!
//! Recorded commands edit documents or the selection and can be undone:
//!
//! - prims: [`PrimNew`], [`PrimRemove`], [`PrimChangeName`],
//!   [`PrimChangeSpecifier`], [`PrimAddReference`]
//! - sublayers: [`LayerInsertSubLayer`], [`LayerRemoveSubLayer`],
//!   [`LayerMoveSubLayer`]
//! - selection: [`EditorSelectPrimPath`]
//!
//! Session commands ([`OpenDocument`], [`SelectLayer`], ...) run once and
//! are not kept in the undo log.
//!
//! Prim commands write to the edit target of the current stage and fail
//! without one. The layer they wrote to is captured on first apply, so undo
//! and redo touch the same layer even if the edit target changes later.

mod prim;
mod select;
mod session;
mod sublayer;

pub use prim::{PrimAddReference, PrimChangeName, PrimChangeSpecifier, PrimNew, PrimRemove};
pub use select::EditorSelectPrimPath;
pub use session::{
    CreateDocument, DropFiles, HistoryDirection, NavigateLayerHistory, OpenDocument,
    SaveCurrentLayer, SaveCurrentLayerAs, SelectLayer, SelectStage, SetEditTarget,
};
pub use sublayer::{LayerInsertSubLayer, LayerMoveSubLayer, LayerRemoveSubLayer};

use std::sync::Arc;

use strata_core::abstract_editor::{EditActionError, EditActionResult};
use strata_doc::{DocumentError, LayerHandle};

use crate::EditSession;

/// Map a document failure onto the action error kinds.
pub(crate) fn document_error(err: DocumentError) -> EditActionError {
    let message = err.to_string();
    match err {
        DocumentError::NotFound(_)
        | DocumentError::PrimNotFound(_)
        | DocumentError::SubLayerNotFound(_) => EditActionError::TargetNotFound(message),
        DocumentError::AlreadyExists(_)
        | DocumentError::PrimExists(_)
        | DocumentError::SubLayerExists(_)
        | DocumentError::NotInLayerStack(_)
        | DocumentError::ForeignLayer(_) => EditActionError::InvalidState(message),
        _ => EditActionError::Custom(message),
    }
}

fn not_applied() -> EditActionError {
    EditActionError::InvalidState("command was never applied".into())
}

/// The layer a prim command writes to.
#[derive(Debug, Default)]
pub(crate) struct TargetLayer(Option<LayerHandle>);

impl TargetLayer {
    /// The captured layer, or the current edit target on first use.
    pub(crate) fn resolve(&mut self, session: &EditSession) -> EditActionResult<LayerHandle> {
        if let Some(layer) = &self.0 {
            return Ok(Arc::clone(layer));
        }
        let layer = session
            .edit_target()
            .ok_or_else(|| EditActionError::InvalidState("no current stage".into()))?;
        self.0 = Some(Arc::clone(&layer));
        Ok(layer)
    }

    pub(crate) fn applied(&self) -> EditActionResult<&LayerHandle> {
        self.0.as_ref().ok_or_else(not_applied)
    }
}
