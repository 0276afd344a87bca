//! The editing session: which documents are open, which one is current, and
//! where new opinions go.
//!
//! Every operation here is forgiving. Opening a missing file, creating over
//! a loaded layer or saving with nothing selected logs the reason and leaves
//! the session exactly as it was. Undoable document edits are not done here
//! but through [`commands`](crate::commands).
//!
//! Anything that writes a document or reads a file needs `&mut EditSession`,
//! which the draw pass never gets.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use strata_core::abstract_editor::Editable;
use strata_doc::{LayerHandle, LayerRegistry, Stage, StageHandle};

use crate::{LayerHistory, LayerSet, Selection, StageCache, StageId};

/// Which panels the UI should reveal.
///
/// The session raises these flags when a document becomes current; the UI
/// lowers them when the user closes a panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelVisibility {
    pub content_browser: bool,
    pub layer_editor: bool,
    pub viewport: bool,
}

/// A view that displays the current stage (a viewport, an outliner...).
///
/// All attached views share the session's current stage.
pub trait StageView {
    fn set_stage(&mut self, stage: Option<&StageHandle>);
}

/// State of one editing session.
///
/// The session owns the stage cache, the layer set, the layer history and
/// the prim selection, and knows the current stage. The current layer is
/// whatever the layer history points at.
pub struct EditSession {
    registry: LayerRegistry,
    stage_cache: StageCache,
    layer_set: LayerSet,
    layer_history: LayerHistory,
    selection: Selection,
    current_stage: Option<StageHandle>,
    panels: PanelVisibility,
    views: Vec<Box<dyn StageView>>,
    /// Set when a layer was written to disk, cleared by [`take_saved`](Self::take_saved).
    saved: bool,
}

impl Editable for EditSession {}

impl EditSession {
    pub fn new() -> Self {
        Self::with_registry(LayerRegistry::new())
    }

    pub fn with_registry(registry: LayerRegistry) -> Self {
        Self {
            registry,
            stage_cache: StageCache::new(),
            layer_set: LayerSet::new(),
            layer_history: LayerHistory::new(),
            selection: Selection::new(),
            current_stage: None,
            panels: PanelVisibility::default(),
            views: Vec::new(),
            saved: false,
        }
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Write access to the documents. Command implementations and setup
    /// code go through this.
    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        &mut self.registry
    }

    pub fn stage_cache(&self) -> &StageCache {
        &self.stage_cache
    }

    pub fn layer_set(&self) -> &LayerSet {
        &self.layer_set
    }

    pub fn layer_history(&self) -> &LayerHistory {
        &self.layer_history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn panels(&self) -> PanelVisibility {
        self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelVisibility {
        &mut self.panels
    }

    pub fn current_stage(&self) -> Option<&StageHandle> {
        self.current_stage.as_ref()
    }

    pub fn current_stage_id(&self) -> Option<StageId> {
        self.current_stage
            .as_ref()
            .and_then(|stage| self.stage_cache.id_of(stage))
    }

    pub fn current_layer(&self) -> Option<&LayerHandle> {
        self.layer_history.current()
    }

    /// The edit target of the current stage.
    pub fn edit_target(&self) -> Option<LayerHandle> {
        self.current_stage.as_ref().map(|stage| stage.edit_target())
    }

    /// Attach a view and show it the current stage.
    pub fn attach_view(&mut self, mut view: Box<dyn StageView>) {
        view.set_stage(self.current_stage.as_ref());
        self.views.push(view);
    }

    /// Make `stage` current (`None` clears it) and show it in every view.
    ///
    /// With no current layer, the stage's root layer becomes current.
    pub fn set_current_stage(&mut self, stage: Option<StageHandle>) {
        if let Some(stage) = &stage
            && self.current_layer().is_none()
        {
            self.layer_history
                .set_current(Some(Arc::clone(stage.root_layer())));
        }
        self.current_stage = stage;
        for view in &mut self.views {
            view.set_stage(self.current_stage.as_ref());
        }
    }

    /// Make the cached stage `id` current. An unknown id clears the current
    /// stage.
    pub fn set_current_stage_by_id(&mut self, id: StageId) {
        let stage = self.stage_cache.find(id);
        if stage.is_none() {
            log::debug!("No cached stage {id}");
        }
        self.set_current_stage(stage);
    }

    /// Select `layer` in the layer history. `None` is ignored.
    pub fn set_current_layer(&mut self, layer: Option<LayerHandle>) {
        self.layer_history.set_current(layer);
    }

    pub fn select_previous_layer(&mut self) {
        self.layer_history.previous();
    }

    pub fn select_next_layer(&mut self) {
        self.layer_history.next();
    }

    /// Send new opinions of the current stage to `layer`.
    ///
    /// Ignored without a current stage, or if `layer` is not in the stage's
    /// layer stack.
    pub fn set_current_edit_target(&mut self, layer: &LayerHandle) {
        let Some(stage) = &self.current_stage else {
            log::debug!("No current stage, ignoring edit target {}", layer.identifier());
            return;
        };
        if let Err(e) = self.registry.set_edit_target(stage, layer) {
            log::debug!("Edit target unchanged: {e}");
        }
    }

    /// Add `layer` to the layer set, make it current and reveal the panels
    /// that show it.
    pub fn use_layer(&mut self, layer: LayerHandle) {
        self.layer_set.insert(Arc::clone(&layer));
        self.set_current_layer(Some(layer));
        self.panels.content_browser = true;
        self.panels.layer_editor = true;
    }

    fn use_stage(&mut self, stage: StageHandle) {
        let id = self.stage_cache.insert(Arc::clone(&stage));
        log::info!("Using stage {} ({id})", stage.display_name());
        self.set_current_stage(Some(stage));
        self.panels.content_browser = true;
        self.panels.viewport = true;
    }

    /// Create a new stage whose root layer will be saved at `path`.
    pub fn create_stage(&mut self, path: &Path) {
        let stage = self
            .registry
            .new_in_memory(path)
            .and_then(|root| Stage::open_with_root(&mut self.registry, root));
        match stage {
            Ok(stage) => self.use_stage(stage),
            Err(e) => log::warn!("Could not create stage {}: {e}", path.display()),
        }
    }

    /// Open the stage whose root layer is stored at `path`.
    pub fn import_stage(&mut self, path: &Path) {
        match Stage::open(&mut self.registry, path) {
            Ok(stage) => self.use_stage(stage),
            Err(e) => log::warn!("Could not open stage {}: {e}", path.display()),
        }
    }

    /// Create a new, empty layer file at `path` and make it current.
    pub fn create_layer(&mut self, path: &Path) {
        match self.registry.create_new(path) {
            Ok(layer) => self.use_layer(layer),
            Err(e) => log::warn!("Could not create layer {}: {e}", path.display()),
        }
    }

    /// Open the layer stored at `path` and make it current.
    pub fn import_layer(&mut self, path: &Path) {
        match self.registry.find_or_open(path) {
            Ok(layer) => self.use_layer(layer),
            Err(e) => log::warn!("Could not open layer {}: {e}", path.display()),
        }
    }

    /// Copy the current layer into a new file at `path` and switch to it.
    ///
    /// Nothing is created when there is no current layer.
    pub fn save_current_layer_as(&mut self, path: &Path) {
        let Some(current) = self.current_layer().cloned() else {
            log::debug!("No current layer to save as {}", path.display());
            return;
        };
        let layer = match self.registry.create_new(path) {
            Ok(layer) => layer,
            Err(e) => {
                log::warn!("Could not save {} as {}: {e}", current.identifier(), path.display());
                return;
            }
        };
        let written = self
            .registry
            .transfer_content(&layer, &current)
            .and_then(|()| self.registry.save(&layer));
        match written {
            Ok(()) => self.saved = true,
            Err(e) => log::warn!("Could not write {}: {e}", layer.identifier()),
        }
        self.use_layer(layer);
    }

    /// Write the current layer to its file.
    pub fn save_current_layer(&mut self) {
        let Some(current) = self.current_layer().cloned() else {
            log::debug!("No current layer to save");
            return;
        };
        match self.registry.save(&current) {
            Ok(()) => self.saved = true,
            Err(e) => log::warn!("Could not save {}: {e}", current.identifier()),
        }
    }

    /// Open or create documents from files dropped onto the window.
    ///
    /// An empty file becomes a new stage; anything else, including a path
    /// that does not exist, is imported as a layer.
    pub fn handle_file_drop<I>(&mut self, paths: I)
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        for path in paths {
            let path = path.as_ref();
            let empty = std::fs::metadata(path).is_ok_and(|meta| meta.len() == 0);
            if empty {
                self.create_stage(path);
            } else {
                self.import_layer(path);
            }
        }
    }

    /// Open `path` as a stage or as a single layer. An empty path is ignored.
    pub fn open_document(&mut self, path: &Path, as_stage: bool) {
        if path.as_os_str().is_empty() {
            return;
        }
        if as_stage {
            self.import_stage(path);
        } else {
            self.import_layer(path);
        }
    }

    /// Create `path` as a stage or as a single layer. An empty path is ignored.
    pub fn create_document(&mut self, path: &Path, as_stage: bool) {
        if path.as_os_str().is_empty() {
            return;
        }
        if as_stage {
            self.create_stage(path);
        } else {
            self.create_layer(path);
        }
    }

    /// Every layer the session can reach: the layer set, the current layer
    /// and the layer stacks of cached stages.
    pub fn open_layers(&self) -> Vec<LayerHandle> {
        let mut seen = HashSet::new();
        let stacks = self
            .stages()
            .into_iter()
            .flat_map(|stage| stage.layer_stack());
        self.layer_set
            .iter()
            .cloned()
            .chain(self.current_layer().cloned())
            .chain(stacks)
            .filter(|layer| seen.insert(layer.id()))
            .collect()
    }

    /// Open layers with edits that are not on disk yet.
    pub fn dirty_layers(&self) -> Vec<LayerHandle> {
        self.open_layers()
            .into_iter()
            .filter(|layer| layer.is_dirty())
            .collect()
    }

    /// Resolve the layer stack of every open stage again.
    ///
    /// A stage whose edit target dropped out of its stack edits its root
    /// layer afterwards. Those stages are returned with the edit target they
    /// had, so the change can be reverted.
    pub(crate) fn refresh_layer_stacks(&mut self) -> Vec<(StageHandle, LayerHandle)> {
        let mut retargeted = Vec::new();
        for stage in self.stages() {
            if let Err(e) = self.registry.resolve_layer_stack(&stage) {
                log::warn!("Could not resolve {}: {e}", stage.display_name());
                continue;
            }
            let target = stage.edit_target();
            if stage.contains_layer(&target) {
                continue;
            }
            log::debug!(
                "{} left the layer stack of {}, editing the root layer",
                target.identifier(),
                stage.display_name()
            );
            match self.registry.set_edit_target(&stage, stage.root_layer()) {
                Ok(()) => retargeted.push((stage, target)),
                Err(e) => log::warn!("Could not reset edit target: {e}"),
            }
        }
        retargeted
    }

    /// Put back edit targets returned by
    /// [`refresh_layer_stacks`](Self::refresh_layer_stacks).
    pub(crate) fn restore_edit_targets(&mut self, retargeted: Vec<(StageHandle, LayerHandle)>) {
        for (stage, target) in retargeted {
            if let Err(e) = self.registry.set_edit_target(&stage, &target) {
                log::debug!("Edit target of {} not restored: {e}", stage.display_name());
            }
        }
    }

    fn stages(&self) -> Vec<StageHandle> {
        let mut stages: Vec<StageHandle> = self
            .stage_cache
            .all_stages()
            .map(|(_, stage)| Arc::clone(stage))
            .collect();
        if let Some(current) = &self.current_stage
            && !stages.iter().any(|stage| Arc::ptr_eq(stage, current))
        {
            stages.push(Arc::clone(current));
        }
        stages
    }

    /// Returns `true` once after a layer was written to disk.
    pub(crate) fn take_saved(&mut self) -> bool {
        std::mem::take(&mut self.saved)
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
