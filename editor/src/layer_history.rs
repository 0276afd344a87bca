use strata_doc::LayerHandle;

/// Back/forward list of current-layer selections, like a browser history.
///
/// Either empty, or `pointer` indexes the current entry. Selecting a layer
/// other than the current one drops every entry after the pointer and
/// appends; moving back and forth never changes the list.
#[derive(Debug, Default)]
pub struct LayerHistory {
    entries: Vec<LayerHandle>,
    pointer: usize,
}

impl LayerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `layer` the current layer. `None` is ignored.
    pub fn set_current(&mut self, layer: Option<LayerHandle>) {
        let Some(layer) = layer else {
            return;
        };
        if self.current().is_some_and(|current| current.id() == layer.id()) {
            return;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.pointer + 1);
        }
        self.entries.push(layer);
        self.pointer = self.entries.len() - 1;
    }

    pub fn current(&self) -> Option<&LayerHandle> {
        self.entries.get(self.pointer)
    }

    /// Step back one entry; no-op at the start.
    pub fn previous(&mut self) {
        if self.can_go_previous() {
            self.pointer -= 1;
        }
    }

    /// Step forward one entry; no-op at the end.
    pub fn next(&mut self) {
        if self.can_go_next() {
            self.pointer += 1;
        }
    }

    pub fn can_go_previous(&self) -> bool {
        !self.entries.is_empty() && self.pointer > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry, `None` while empty.
    pub fn pointer(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.pointer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerHandle> {
        self.entries.iter()
    }
}
