//! # Strata Editor
//!
//! Editing session controller for layered scene documents.
//!
//! An [`Editor`] owns one [`EditSession`] together with the undo log and
//! the deferred command queue. The UI draws each frame through
//! [`Editor::frame`], reading the session and dispatching commands through
//! a [`FrameContext`]. Once the frame has been drawn the commands run in
//! dispatch order:
//!
//! ```ignore
//! let mut editor = Editor::new();
//! let report = editor.frame(|ctx| {
//!     ctx.open_document("shots/a.strata", true);
//!     ctx.dispatch(PrimNew::new(PrimPath::root(), "World", Specifier::Def));
//! });
//! assert!(report.is_ok());
//! ```

pub mod commands;
mod editor;
mod layer_history;
mod layer_set;
pub mod log_capture;
pub mod project;
mod selection;
mod session;
mod stage_cache;

pub use editor::{CommandFailure, Editor, FrameContext, FrameReport};
pub use layer_history::LayerHistory;
pub use layer_set::LayerSet;
pub use selection::Selection;
pub use session::{EditSession, PanelVisibility, StageView};
pub use stage_cache::{StageCache, StageId};
