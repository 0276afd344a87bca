use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::{DocumentError, DocumentResult, LayerContent, format};

/// Shared handle to a loaded layer.
///
/// Handles compare by layer identity ([`LayerId`]), never by content.
pub type LayerHandle = Arc<Layer>;

/// Process-wide unique token of a layer.
///
/// Two layers opened from the same file at different times (after the first
/// one was released) get different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        LayerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Token of the [`LayerRegistry`](crate::LayerRegistry) a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegistryId(u64);

impl RegistryId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        RegistryId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct LayerState {
    content: LayerContent,
    dirty: bool,
}

/// A single raw document.
///
/// A layer is identified by its identifier (the file path it was opened
/// from or will be saved to, or `anon:<id>:<tag>` for anonymous layers) and
/// by its [`LayerId`]. Its content sits behind a lock so that the handle can
/// be shared by the session's collections and in-flight commands.
///
/// Anyone holding a handle can read the content. Writes go through the
/// owning [`LayerRegistry`](crate::LayerRegistry) and need `&mut` access to it.
pub struct Layer {
    id: LayerId,
    owner: RegistryId,
    identifier: String,
    real_path: Option<PathBuf>,
    state: RwLock<LayerState>,
}

impl Layer {
    pub(crate) fn with_path(
        owner: RegistryId,
        path: PathBuf,
        content: LayerContent,
        dirty: bool,
    ) -> Self {
        Self {
            id: LayerId::next(),
            owner,
            identifier: path.display().to_string(),
            real_path: Some(path),
            state: RwLock::new(LayerState { content, dirty }),
        }
    }

    pub(crate) fn anonymous(owner: RegistryId, tag: &str) -> Self {
        let id = LayerId::next();
        Self {
            id,
            owner,
            identifier: format!("anon:{}:{tag}", id.0),
            real_path: None,
            state: RwLock::new(LayerState {
                content: LayerContent::default(),
                dirty: false,
            }),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub(crate) fn owner(&self) -> RegistryId {
        self.owner
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The file backing this layer; `None` for anonymous layers.
    pub fn real_path(&self) -> Option<&Path> {
        self.real_path.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.real_path.is_none()
    }

    /// File name for file-backed layers, the identifier otherwise.
    pub fn display_name(&self) -> &str {
        self.real_path
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(&self.identifier)
    }

    /// `true` if the content changed since it was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Run `f` with read access to the content.
    pub fn read<R>(&self, f: impl FnOnce(&LayerContent) -> R) -> R {
        f(&self.state.read().content)
    }

    /// Run a fallible edit on the content.
    ///
    /// The layer is marked dirty only if `f` succeeds; `f` must leave the
    /// content untouched when it fails.
    pub(crate) fn edit<R>(
        &self,
        f: impl FnOnce(&mut LayerContent) -> DocumentResult<R>,
    ) -> DocumentResult<R> {
        let mut state = self.state.write();
        let result = f(&mut state.content)?;
        state.dirty = true;
        Ok(result)
    }

    /// Replace this layer's content with a copy of `source`'s.
    pub(crate) fn transfer_content(&self, source: &Layer) {
        if self.id == source.id {
            return;
        }
        let content = source.read(LayerContent::clone);
        let mut state = self.state.write();
        state.content = content;
        state.dirty = true;
    }

    /// Write the content to the layer's file and clear the dirty flag.
    pub(crate) fn save(&self) -> DocumentResult<()> {
        let path = self
            .real_path
            .as_deref()
            .ok_or_else(|| DocumentError::InvalidPath(format!("{} has no file", self.identifier)))?;
        let mut state = self.state.write();
        format::write_layer(path, &state.content)?;
        state.dirty = false;
        log::info!("Saved layer {}", self.identifier);
        Ok(())
    }

    /// Resolve a sublayer or reference asset path against this layer's
    /// directory.
    pub fn resolve_asset_path(&self, asset: &str) -> PathBuf {
        let asset_path = Path::new(asset);
        if asset_path.is_absolute() {
            return asset_path.to_path_buf();
        }
        match self.real_path.as_deref().and_then(Path::parent) {
            Some(dir) => dir.join(asset_path),
            None => asset_path.to_path_buf(),
        }
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Layer {}

impl Hash for Layer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimPath, Specifier};

    fn with_world(layer: &Layer) {
        layer
            .edit(|c| c.create_prim(&PrimPath::root(), "World", Specifier::Def))
            .unwrap();
    }

    #[test]
    fn ids_are_unique_and_define_equality() {
        let owner = RegistryId::next();
        let a = Layer::anonymous(owner, "a");
        let b = Layer::anonymous(owner, "a");
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert!(a.identifier().starts_with("anon:"));
        assert!(a.is_anonymous());
    }

    #[test]
    fn successful_edit_marks_dirty() {
        let layer = Layer::anonymous(RegistryId::next(), "edit");
        assert!(!layer.is_dirty());

        let failed = layer.edit(|c| c.create_prim(&PrimPath::parse("/Missing").unwrap(), "A", Specifier::Def));
        assert!(failed.is_err());
        assert!(!layer.is_dirty());

        with_world(&layer);
        assert!(layer.is_dirty());
    }

    #[test]
    fn transfer_copies_content() {
        let owner = RegistryId::next();
        let source = Layer::anonymous(owner, "src");
        with_world(&source);
        let dest = Layer::anonymous(owner, "dst");

        dest.transfer_content(&source);
        assert!(dest.read(|c| c.has_prim(&PrimPath::parse("/World").unwrap())));
        assert!(dest.is_dirty());

        // self-transfer is a no-op rather than a deadlock
        dest.transfer_content(&dest);
    }

    #[test]
    fn save_writes_file_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.strata");
        let layer = Layer::with_path(RegistryId::next(), path.clone(), LayerContent::default(), true);
        with_world(&layer);

        layer.save().unwrap();
        assert!(!layer.is_dirty());
        assert_eq!(layer.display_name(), "layer.strata");
        let on_disk = format::read_layer(&path).unwrap();
        assert!(on_disk.has_prim(&PrimPath::parse("/World").unwrap()));
    }

    #[test]
    fn anonymous_layers_cannot_be_saved() {
        let layer = Layer::anonymous(RegistryId::next(), "scratch");
        assert!(matches!(layer.save(), Err(DocumentError::InvalidPath(_))));
    }

    #[test]
    fn asset_paths_resolve_next_to_the_layer() {
        let layer = Layer::with_path(
            RegistryId::next(),
            PathBuf::from("/shots/a/shot.strata"),
            LayerContent::default(),
            false,
        );
        assert_eq!(
            layer.resolve_asset_path("anim.strata"),
            PathBuf::from("/shots/a/anim.strata")
        );
        assert_eq!(
            layer.resolve_asset_path("/lib/set.strata"),
            PathBuf::from("/lib/set.strata")
        );
    }
}
