use std::path::{Path, PathBuf};

use strata_core::abstract_editor::{
    ActionQueue, DEFAULT_MAX_UNDO, Deferred, EditAction, EditActionError, EditActionHistory,
};
use strata_doc::{LayerHandle, PrimPath};

use crate::EditSession;
use crate::commands::{
    CreateDocument, DropFiles, EditorSelectPrimPath, HistoryDirection, NavigateLayerHistory,
    OpenDocument, SaveCurrentLayer, SaveCurrentLayerAs, SelectLayer, SelectStage, SetEditTarget,
};
use crate::project::EditorSettings;
use crate::stage_cache::StageId;

/// A queued command that failed when the queue was drained.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    pub description: String,
    pub error: EditActionError,
}

/// Outcome of one queue drain.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Entries taken from the queue, failed ones included.
    pub processed: usize,
    pub failures: Vec<CommandFailure>,
}

impl FrameReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What the UI sees while drawing a frame.
///
/// The session is read-only here; every change goes through the queue and
/// runs once the frame has been drawn. Document writes, file access and
/// layer stack resolution all need `&mut EditSession`, so they cannot
/// happen from the draw pass.
pub struct FrameContext<'a> {
    session: &'a EditSession,
    history: &'a EditActionHistory<EditSession>,
    queue: &'a ActionQueue<EditSession>,
}

impl<'a> FrameContext<'a> {
    pub fn session(&self) -> &'a EditSession {
        self.session
    }

    pub fn history(&self) -> &'a EditActionHistory<EditSession> {
        self.history
    }

    /// Queue a command to run after the draw pass.
    pub fn dispatch(&self, action: impl EditAction<EditSession>) {
        self.queue.push(Box::new(action));
    }

    pub fn dispatch_boxed(&self, action: Box<dyn EditAction<EditSession>>) {
        self.queue.push(action);
    }

    pub fn undo(&self) {
        self.queue.push_undo();
    }

    pub fn redo(&self) {
        self.queue.push_redo();
    }

    pub fn open_document(&self, path: impl Into<PathBuf>, as_stage: bool) {
        self.dispatch(OpenDocument {
            path: path.into(),
            as_stage,
        });
    }

    pub fn create_document(&self, path: impl Into<PathBuf>, as_stage: bool) {
        self.dispatch(CreateDocument {
            path: path.into(),
            as_stage,
        });
    }

    pub fn save_current_layer_as(&self, path: impl Into<PathBuf>) {
        self.dispatch(SaveCurrentLayerAs { path: path.into() });
    }

    pub fn save_current_layer(&self) {
        self.dispatch(SaveCurrentLayer);
    }

    pub fn select_stage(&self, id: Option<StageId>) {
        self.dispatch(SelectStage { id });
    }

    pub fn select_layer(&self, layer: LayerHandle) {
        self.dispatch(SelectLayer { layer });
    }

    pub fn previous_layer(&self) {
        self.dispatch(NavigateLayerHistory {
            direction: HistoryDirection::Previous,
        });
    }

    pub fn next_layer(&self) {
        self.dispatch(NavigateLayerHistory {
            direction: HistoryDirection::Next,
        });
    }

    pub fn set_edit_target(&self, layer: LayerHandle) {
        self.dispatch(SetEditTarget { layer });
    }

    pub fn select_prims(&self, paths: impl IntoIterator<Item = PrimPath>) {
        self.dispatch(EditorSelectPrimPath::new(paths));
    }

    pub fn drop_files<I>(&self, paths: I)
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        self.dispatch(DropFiles {
            paths: paths
                .into_iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
        });
    }
}

/// Drives an [`EditSession`] one frame at a time.
///
/// Each frame the UI draws against a read-only session and dispatches
/// commands; the queue is then drained in dispatch order through the undo
/// log.
pub struct Editor {
    session: EditSession,
    history: EditActionHistory<EditSession>,
    queue: ActionQueue<EditSession>,
    frame_index: u64,
}

impl Editor {
    pub fn new() -> Self {
        Self::with_session(EditSession::new(), DEFAULT_MAX_UNDO)
    }

    pub fn with_settings(settings: &EditorSettings) -> Self {
        Self::with_session(EditSession::new(), settings.max_undo)
    }

    pub fn with_session(session: EditSession, max_undo: usize) -> Self {
        Self {
            session,
            history: EditActionHistory::new(max_undo),
            queue: ActionQueue::new(),
            frame_index: 0,
        }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Mutable access between frames, for setup such as attaching views.
    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn history(&self) -> &EditActionHistory<EditSession> {
        &self.history
    }

    /// Number of frames drawn so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// `true` if an open layer has edits that are not on disk, or document
    /// edits were made or undone since the last save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes() || !self.session.dirty_layers().is_empty()
    }

    /// Draw one frame, then run everything it dispatched.
    pub fn frame<F>(&mut self, draw: F) -> FrameReport
    where
        F: FnOnce(&FrameContext<'_>),
    {
        let ctx = FrameContext {
            session: &self.session,
            history: &self.history,
            queue: &self.queue,
        };
        draw(&ctx);
        self.frame_index += 1;
        self.process_commands()
    }

    /// Run every queued command in dispatch order.
    ///
    /// A failing command is logged and reported; the remaining ones still
    /// run. Layer stacks are resolved again once the commands have run, so
    /// sublayer files that appeared since are picked up here and never
    /// during a draw.
    pub fn process_commands(&mut self) -> FrameReport {
        let mut report = FrameReport::default();
        for entry in self.queue.drain() {
            report.processed += 1;
            let description = entry.description().to_owned();
            let result = match entry {
                Deferred::Action(action) => self.history.execute(action, &mut self.session),
                Deferred::Undo => self.history.undo(&mut self.session).map(|undone| {
                    if !undone {
                        log::debug!("Nothing to undo");
                    }
                }),
                Deferred::Redo => self.history.redo(&mut self.session).map(|redone| {
                    if !redone {
                        log::debug!("Nothing to redo");
                    }
                }),
            };
            if self.session.take_saved() && self.session.dirty_layers().is_empty() {
                self.history.mark_saved();
            }
            if let Err(error) = result {
                log::warn!("{description} failed: {error}");
                report.failures.push(CommandFailure { description, error });
            }
        }
        if report.processed > 0 {
            self.session.refresh_layer_stacks();
        }
        report
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::PrimNew;
    use strata_doc::Specifier;

    #[test]
    fn nothing_runs_during_the_draw_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = Editor::new();
        let path = dir.path().join("a.strata");

        editor.frame(|ctx| {
            ctx.create_document(&path, true);
            assert!(ctx.session().current_stage().is_none());
            assert_eq!(ctx.session().stage_cache().len(), 0);
        });
        assert!(editor.session().current_stage().is_some());
        assert_eq!(editor.pending_commands(), 0);
        assert_eq!(editor.frame_index(), 1);
    }

    #[test]
    fn failures_are_reported_and_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = Editor::new();
        let path = dir.path().join("a.strata");

        let report = editor.frame(|ctx| {
            ctx.dispatch(PrimNew::new(PrimPath::root(), "Early", Specifier::Def));
            ctx.create_document(&path, true);
            ctx.dispatch(PrimNew::new(PrimPath::root(), "World", Specifier::Def));
        });

        assert_eq!(report.processed, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].description, "New prim");
        assert!(matches!(
            report.failures[0].error,
            EditActionError::InvalidState(_)
        ));
        assert_eq!(editor.history().undo_count(), 1);
    }

    #[test]
    fn saving_clears_unsaved_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = Editor::new();
        let path = dir.path().join("a.strata");
        editor.frame(|ctx| ctx.create_document(&path, true));
        editor.frame(|ctx| {
            ctx.dispatch(PrimNew::new(PrimPath::root(), "World", Specifier::Def))
        });
        assert!(editor.has_unsaved_changes());

        // the new stage's root layer is the current layer
        let report = editor.frame(|ctx| ctx.save_current_layer());
        assert!(report.is_ok());
        assert!(!editor.has_unsaved_changes());
        assert!(path.exists());
    }

    #[test]
    fn save_as_keeps_the_unsaved_root_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = Editor::new();
        let path = dir.path().join("shot.strata");
        editor.frame(|ctx| ctx.create_document(&path, true));
        editor.frame(|ctx| {
            ctx.dispatch(PrimNew::new(PrimPath::root(), "World", Specifier::Def))
        });

        let report = editor.frame(|ctx| ctx.save_current_layer_as(dir.path().join("copy.strata")));
        assert!(report.is_ok());
        let root = editor.session().current_stage().unwrap().root_layer();
        assert!(root.is_dirty());
        assert!(!path.exists());
        assert!(editor.has_unsaved_changes());
        assert!(editor.history().has_unsaved_changes());
    }
}
