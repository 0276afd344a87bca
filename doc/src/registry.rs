use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use crate::layer::RegistryId;
use crate::{DocumentError, DocumentResult, Layer, LayerContent, LayerHandle, Stage, format};

/// The set of loaded layers, keyed by identifier.
///
/// Opening a file that is already loaded returns the same layer instead of
/// reading it again. The registry holds weak references only: once every
/// handle is dropped the layer is gone and the next open reads the file anew.
///
/// Everything that touches the disk or changes a document takes
/// `&mut self`. Holders of a shared reference can look layers up and read
/// them, nothing more. Writes to a layer or stage loaded by another registry
/// fail with [`DocumentError::ForeignLayer`].
pub struct LayerRegistry {
    id: RegistryId,
    layers: HashMap<String, Weak<Layer>>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self {
            id: RegistryId::next(),
            layers: HashMap::new(),
        }
    }

    /// The loaded layer for `path`, if any.
    pub fn find(&self, path: &Path) -> Option<LayerHandle> {
        let key = identifier_for(path);
        self.layers.get(&key).and_then(Weak::upgrade)
    }

    /// Return the loaded layer for `path`, or read it from disk.
    pub fn find_or_open(&mut self, path: &Path) -> DocumentResult<LayerHandle> {
        if let Some(layer) = self.find(path) {
            return Ok(layer);
        }
        let content = format::read_layer(path)?;
        let layer = Layer::with_path(self.id, absolute(path), content, false);
        let layer = self.register(layer);
        log::debug!("Opened layer {}", layer.identifier());
        Ok(layer)
    }

    /// Create a new, empty layer at `path` and write it to disk.
    ///
    /// Fails if a layer with that identifier is loaded, the file already
    /// exists, or it cannot be written.
    pub fn create_new(&mut self, path: &Path) -> DocumentResult<LayerHandle> {
        self.check_new(path)?;
        if path.exists() {
            return Err(DocumentError::AlreadyExists(path.display().to_string()));
        }
        let content = LayerContent::default();
        format::write_layer(path, &content)?;
        let layer = Layer::with_path(self.id, absolute(path), content, false);
        let layer = self.register(layer);
        log::debug!("Created layer {}", layer.identifier());
        Ok(layer)
    }

    /// Create a new, empty layer that will be saved to `path`, without
    /// touching the disk.
    ///
    /// The path must have a layer extension and its directory must exist.
    pub fn new_in_memory(&mut self, path: &Path) -> DocumentResult<LayerHandle> {
        self.check_new(path)?;
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.is_dir()
        {
            return Err(DocumentError::InvalidPath(format!(
                "directory does not exist: {}",
                dir.display()
            )));
        }
        let layer = Layer::with_path(self.id, absolute(path), LayerContent::default(), true);
        let layer = self.register(layer);
        log::debug!("Created in-memory layer {}", layer.identifier());
        Ok(layer)
    }

    /// Create a layer with no backing file.
    pub fn anonymous(&mut self, tag: &str) -> LayerHandle {
        let layer = Layer::anonymous(self.id, tag);
        self.register(layer)
    }

    /// Every layer that is still alive, sorted by identifier.
    pub fn loaded_layers(&self) -> Vec<LayerHandle> {
        let mut alive: Vec<LayerHandle> = self.layers.values().filter_map(Weak::upgrade).collect();
        alive.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        alive
    }

    /// Run a fallible edit on `layer`'s content.
    ///
    /// The layer is marked dirty only if `f` succeeds; `f` must leave the
    /// content untouched when it fails.
    pub fn edit<R>(
        &mut self,
        layer: &Layer,
        f: impl FnOnce(&mut LayerContent) -> DocumentResult<R>,
    ) -> DocumentResult<R> {
        self.check_owned(layer)?;
        layer.edit(f)
    }

    /// Replace `dest`'s content with a copy of `source`'s.
    pub fn transfer_content(&mut self, dest: &Layer, source: &Layer) -> DocumentResult<()> {
        self.check_owned(dest)?;
        dest.transfer_content(source);
        Ok(())
    }

    /// Write `layer` to its file and clear its dirty flag.
    pub fn save(&mut self, layer: &Layer) -> DocumentResult<()> {
        self.check_owned(layer)?;
        layer.save()
    }

    /// Resolve `stage`'s layer stack from the current sublayer lists, loading
    /// sublayers as needed, and cache it on the stage.
    ///
    /// Sublayers that fail to load are skipped with a warning. A layer that
    /// appears twice (including cycles) is only visited once.
    pub fn resolve_layer_stack(&mut self, stage: &Stage) -> DocumentResult<()> {
        self.check_owned(stage.root_layer())?;
        let mut stack = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![Arc::clone(stage.root_layer())];

        while let Some(layer) = pending.pop() {
            if !visited.insert(layer.id()) {
                continue;
            }
            let sublayers = layer.read(|content| content.sublayers.clone());
            // Reverse so the strongest sublayer is popped first.
            for asset in sublayers.iter().rev() {
                let path = layer.resolve_asset_path(asset);
                match self.find_or_open(&path) {
                    Ok(sublayer) => pending.push(sublayer),
                    Err(e) => log::warn!(
                        "Skipping sublayer {asset} of {}: {e}",
                        layer.identifier()
                    ),
                }
            }
            stack.push(layer);
        }

        stage.replace_layer_stack(stack);
        Ok(())
    }

    /// Redirect new opinions of `stage` to `layer`.
    ///
    /// Fails with [`DocumentError::NotInLayerStack`] if `layer` is not in the
    /// stage's resolved layer stack.
    pub fn set_edit_target(&mut self, stage: &Stage, layer: &LayerHandle) -> DocumentResult<()> {
        self.check_owned(stage.root_layer())?;
        stage.set_edit_target(layer)
    }

    fn check_owned(&self, layer: &Layer) -> DocumentResult<()> {
        if layer.owner() != self.id {
            return Err(DocumentError::ForeignLayer(layer.identifier().to_owned()));
        }
        Ok(())
    }

    fn check_new(&self, path: &Path) -> DocumentResult<()> {
        if path.as_os_str().is_empty() {
            return Err(DocumentError::InvalidPath("empty path".into()));
        }
        format::ensure_layer_path(path)?;
        if self.find(path).is_some() {
            return Err(DocumentError::AlreadyExists(path.display().to_string()));
        }
        Ok(())
    }

    fn register(&mut self, layer: Layer) -> LayerHandle {
        let layer = Arc::new(layer);
        self.layers.retain(|_, weak| weak.strong_count() > 0);
        self.layers
            .insert(layer.identifier().to_owned(), Arc::downgrade(&layer));
        layer
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("entries", &self.layers.len())
            .finish()
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn identifier_for(path: &Path) -> String {
    absolute(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimPath, Specifier};

    #[test]
    fn find_or_open_shares_loaded_layers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.strata");
        format::write_layer(&path, &LayerContent::default()).unwrap();

        let mut registry = LayerRegistry::new();
        let a = registry.find_or_open(&path).unwrap();
        let b = registry.find_or_open(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.loaded_layers().len(), 1);
    }

    #[test]
    fn released_layers_are_reopened_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.strata");
        format::write_layer(&path, &LayerContent::default()).unwrap();

        let mut registry = LayerRegistry::new();
        let first_id = registry.find_or_open(&path).unwrap().id();
        assert!(registry.find(&path).is_none());
        assert!(registry.loaded_layers().is_empty());

        let second = registry.find_or_open(&path).unwrap();
        assert_ne!(second.id(), first_id);
    }

    #[test]
    fn create_new_writes_an_empty_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.strata");

        let mut registry = LayerRegistry::new();
        let layer = registry.create_new(&path).unwrap();
        assert!(path.exists());
        assert!(!layer.is_dirty());
        assert!(matches!(
            registry.create_new(&path),
            Err(DocumentError::AlreadyExists(_))
        ));
    }

    #[test]
    fn create_new_rejects_bad_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = LayerRegistry::new();

        assert!(matches!(
            registry.create_new(&dir.path().join("notes.txt")),
            Err(DocumentError::UnsupportedFormat(_))
        ));
        assert!(registry.create_new(&dir.path().join("missing/new.strata")).is_err());
        assert!(registry.create_new(Path::new("")).is_err());
    }

    #[test]
    fn in_memory_layers_stay_off_disk_until_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.strata");
        let mut registry = LayerRegistry::new();

        let layer = registry.new_in_memory(&path).unwrap();
        assert!(!path.exists());
        registry
            .edit(&layer, |c| c.create_prim(&PrimPath::root(), "World", Specifier::Def))
            .unwrap();
        registry.save(&layer).unwrap();
        assert!(path.exists());

        assert!(matches!(
            registry.new_in_memory(&dir.path().join("no/such/dir/scene.strata")),
            Err(DocumentError::InvalidPath(_))
        ));
    }

    #[test]
    fn missing_and_malformed_files_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = LayerRegistry::new();
        assert!(matches!(
            registry.find_or_open(&dir.path().join("missing.strata")),
            Err(DocumentError::NotFound(_))
        ));

        let garbage = dir.path().join("garbage.strata");
        std::fs::write(&garbage, "this is not a layer").unwrap();
        assert!(matches!(
            registry.find_or_open(&garbage),
            Err(DocumentError::Parse { .. })
        ));
        assert!(registry.loaded_layers().is_empty());
    }

    #[test]
    fn layers_of_another_registry_cannot_be_written() {
        let mut mine = LayerRegistry::new();
        let mut other = LayerRegistry::new();
        let layer = mine.anonymous("scene");

        let result = other.edit(&layer, |c| c.create_prim(&PrimPath::root(), "World", Specifier::Def));
        assert!(matches!(result, Err(DocumentError::ForeignLayer(_))));
        assert!(!layer.is_dirty());
        assert!(matches!(
            other.transfer_content(&layer, &layer),
            Err(DocumentError::ForeignLayer(_))
        ));

        mine.edit(&layer, |c| c.create_prim(&PrimPath::root(), "World", Specifier::Def))
            .unwrap();
        assert!(layer.is_dirty());
    }

    #[test]
    fn a_default_registry_owns_what_it_creates() {
        let mut registry = LayerRegistry::default();
        let layer = registry.anonymous("scene");
        registry
            .edit(&layer, |c| c.create_prim(&PrimPath::root(), "World", Specifier::Def))
            .unwrap();
    }
}
