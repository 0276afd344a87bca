use std::collections::HashSet;
use std::fmt;

use strata_doc::{LayerHandle, LayerId};

/// Raw layers the user has opened or created in this session.
///
/// Layers are only ever added. The content browser lists them by display
/// name.
#[derive(Default)]
pub struct LayerSet {
    layers: Vec<LayerHandle>,
    ids: HashSet<LayerId>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `layer` unless it is already present. Returns `true` if it was new.
    pub fn insert(&mut self, layer: LayerHandle) -> bool {
        if !self.ids.insert(layer.id()) {
            return false;
        }
        self.layers.push(layer);
        true
    }

    pub fn contains(&self, layer: &LayerHandle) -> bool {
        self.ids.contains(&layer.id())
    }

    /// Layers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerHandle> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn sorted_by_display_name(&self) -> Vec<&LayerHandle> {
        let mut sorted: Vec<_> = self.layers.iter().collect();
        sorted.sort_by(|a, b| {
            a.display_name()
                .cmp(b.display_name())
                .then_with(|| a.identifier().cmp(b.identifier()))
        });
        sorted
    }

    /// Layers whose display name contains `pattern`, ignoring case, sorted
    /// by display name. An empty pattern matches everything.
    pub fn filtered(&self, pattern: &str) -> Vec<&LayerHandle> {
        let pattern = pattern.to_lowercase();
        self.sorted_by_display_name()
            .into_iter()
            .filter(|layer| layer.display_name().to_lowercase().contains(&pattern))
            .collect()
    }
}

impl fmt::Debug for LayerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|l| l.identifier()))
            .finish()
    }
}
