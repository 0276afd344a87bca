use strata_doc::PrimPath;

/// Ordered set of highlighted prim paths.
///
/// Owned by the session and only changed through the selection command, so
/// every change can be undone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<PrimPath>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[PrimPath] {
        &self.paths
    }

    pub fn contains(&self, path: &PrimPath) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Replace the selection, dropping duplicates but keeping first-seen
    /// order. Returns the previous paths.
    pub(crate) fn replace(&mut self, paths: impl IntoIterator<Item = PrimPath>) -> Vec<PrimPath> {
        let mut next = Vec::new();
        for path in paths {
            if !next.contains(&path) {
                next.push(path);
            }
        }
        std::mem::replace(&mut self.paths, next)
    }

    /// Re-point selected paths at or under `old` to live under `new`.
    ///
    /// A moved path that lands on one already selected keeps the earlier
    /// position only.
    pub(crate) fn repoint(&mut self, old: &PrimPath, new: &PrimPath) {
        let moved: Vec<_> = self
            .paths
            .drain(..)
            .map(|path| path.replace_prefix(old, new).unwrap_or(path))
            .collect();
        self.replace(moved);
    }
}
