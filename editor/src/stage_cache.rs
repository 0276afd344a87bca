use std::fmt;
use std::sync::Arc;

use strata_doc::StageHandle;

/// Opaque key of a stage in the [`StageCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(u64);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage:{}", self.0)
    }
}

/// Every stage opened or created during the session.
///
/// The cache holds a shared handle to each stage and never evicts: stages
/// stay alive until the session is dropped.
#[derive(Default)]
pub struct StageCache {
    entries: Vec<(StageId, StageHandle)>,
    next_id: u64,
}

impl StageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `stage` and return its id.
    ///
    /// Inserting a stage that is already cached returns its existing id.
    pub fn insert(&mut self, stage: StageHandle) -> StageId {
        if let Some(id) = self.id_of(&stage) {
            return id;
        }
        self.next_id += 1;
        let id = StageId(self.next_id);
        log::debug!("Caching {} as {id}", stage.display_name());
        self.entries.push((id, stage));
        id
    }

    pub fn find(&self, id: StageId) -> Option<StageHandle> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, stage)| Arc::clone(stage))
    }

    pub fn id_of(&self, stage: &StageHandle) -> Option<StageId> {
        self.entries
            .iter()
            .find(|(_, cached)| Arc::ptr_eq(cached, stage))
            .map(|(id, _)| *id)
    }

    /// All cached stages in insertion order.
    pub fn all_stages(&self) -> impl Iterator<Item = (StageId, &StageHandle)> {
        self.entries.iter().map(|(id, stage)| (*id, stage))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for StageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, stage)| (id, stage.display_name())))
            .finish()
    }
}
