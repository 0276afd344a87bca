use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{DocumentError, DocumentResult, LayerHandle, LayerRegistry, PrimPath};

/// Shared handle to a composed stage.
pub type StageHandle = Arc<Stage>;

/// A composed view over a root layer and its sublayer stack.
///
/// The stack is the root layer followed by its sublayers, depth first,
/// strongest first. Sublayer paths are resolved relative to the layer that
/// lists them.
///
/// The stack is resolved by [`LayerRegistry::resolve_layer_stack`] and
/// cached here; the queries on this type only read that cache and never
/// touch the disk. A sublayer list edited since the last resolve is not
/// reflected until the stack is resolved again.
///
/// New opinions go to the edit target, which is always a member of the
/// stack.
pub struct Stage {
    root: LayerHandle,
    edit_target: RwLock<LayerHandle>,
    /// Keeps resolved sublayers loaded for as long as the stage lives.
    layer_stack: RwLock<Vec<LayerHandle>>,
}

impl Stage {
    /// Open the stage whose root layer is stored at `path`.
    pub fn open(registry: &mut LayerRegistry, path: &Path) -> DocumentResult<StageHandle> {
        let root = registry.find_or_open(path)?;
        Self::open_with_root(registry, root)
    }

    /// Build a stage on a root layer loaded by `registry`.
    pub fn open_with_root(
        registry: &mut LayerRegistry,
        root: LayerHandle,
    ) -> DocumentResult<StageHandle> {
        let stage = Arc::new(Stage {
            edit_target: RwLock::new(Arc::clone(&root)),
            layer_stack: RwLock::new(vec![Arc::clone(&root)]),
            root,
        });
        registry.resolve_layer_stack(&stage)?;
        log::debug!("Opened stage on {}", stage.root.identifier());
        Ok(stage)
    }

    pub fn root_layer(&self) -> &LayerHandle {
        &self.root
    }

    /// Display name of the root layer.
    pub fn display_name(&self) -> &str {
        self.root.display_name()
    }

    /// The layer stack as of the last resolve, root layer first.
    pub fn layer_stack(&self) -> Vec<LayerHandle> {
        self.layer_stack.read().clone()
    }

    pub fn contains_layer(&self, layer: &LayerHandle) -> bool {
        self.layer_stack.read().iter().any(|l| l.id() == layer.id())
    }

    pub(crate) fn replace_layer_stack(&self, stack: Vec<LayerHandle>) {
        *self.layer_stack.write() = stack;
    }

    /// The layer that currently receives new opinions.
    pub fn edit_target(&self) -> LayerHandle {
        Arc::clone(&self.edit_target.read())
    }

    pub(crate) fn set_edit_target(&self, layer: &LayerHandle) -> DocumentResult<()> {
        if !self.contains_layer(layer) {
            return Err(DocumentError::NotInLayerStack(layer.identifier().to_owned()));
        }
        *self.edit_target.write() = Arc::clone(layer);
        Ok(())
    }

    /// Every prim path with a spec in any layer of the stack.
    pub fn prim_paths(&self) -> BTreeSet<PrimPath> {
        self.layer_stack
            .read()
            .iter()
            .flat_map(|layer| layer.read(|content| content.prims.keys().cloned().collect::<Vec<_>>()))
            .collect()
    }

    pub fn has_prim(&self, path: &PrimPath) -> bool {
        self.layer_stack
            .read()
            .iter()
            .any(|layer| layer.read(|content| content.has_prim(path)))
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("root", &self.root.identifier())
            .field("edit_target", &self.edit_target.read().identifier())
            .finish()
    }
}
