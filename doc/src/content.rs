//! Authored opinions held by a single layer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DocumentError, DocumentResult, PrimPath};

/// How a prim spec contributes to composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Specifier {
    /// Defines the prim.
    #[default]
    Def,
    /// Overrides opinions of a prim defined elsewhere.
    Over,
    /// An abstract prim meant to be inherited from.
    Class,
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Specifier::Def => "def",
            Specifier::Over => "over",
            Specifier::Class => "class",
        };
        f.write_str(keyword)
    }
}

/// One prim's opinions within a layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrimSpec {
    pub specifier: Specifier,
    #[serde(default)]
    pub type_name: Option<String>,
    /// Referenced asset paths, weakest last.
    #[serde(default)]
    pub references: Vec<String>,
}

impl PrimSpec {
    pub fn new(specifier: Specifier) -> Self {
        Self {
            specifier,
            ..Default::default()
        }
    }
}

/// Everything a layer authors: its sublayer list and prim specs.
///
/// Prim specs are keyed by absolute path. A spec may only exist under the
/// pseudo-root or under another spec of the same layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerContent {
    #[serde(default)]
    pub default_prim: Option<String>,
    /// Sublayer asset paths, strongest first.
    #[serde(default)]
    pub sublayers: Vec<String>,
    #[serde(default)]
    pub prims: BTreeMap<PrimPath, PrimSpec>,
}

impl LayerContent {
    pub fn prim(&self, path: &PrimPath) -> Option<&PrimSpec> {
        self.prims.get(path)
    }

    pub fn has_prim(&self, path: &PrimPath) -> bool {
        self.prims.contains_key(path)
    }

    /// Direct children of `path` that have a spec in this layer.
    pub fn children<'a>(&'a self, path: &'a PrimPath) -> impl Iterator<Item = &'a PrimPath> + 'a {
        self.prims
            .keys()
            .filter(move |p| p.parent().as_ref() == Some(path))
    }

    /// Author a new prim spec `name` under `parent`.
    pub fn create_prim(
        &mut self,
        parent: &PrimPath,
        name: &str,
        specifier: Specifier,
    ) -> DocumentResult<PrimPath> {
        if !parent.is_root() && !self.has_prim(parent) {
            return Err(DocumentError::PrimNotFound(parent.clone()));
        }
        let path = parent.child(name)?;
        if self.has_prim(&path) {
            return Err(DocumentError::PrimExists(path));
        }
        self.prims.insert(path.clone(), PrimSpec::new(specifier));
        Ok(path)
    }

    /// Remove the spec at `path` together with every spec underneath it.
    ///
    /// Returns the removed entries so they can be put back with
    /// [`restore_prims`](Self::restore_prims).
    pub fn remove_prim(&mut self, path: &PrimPath) -> DocumentResult<Vec<(PrimPath, PrimSpec)>> {
        if path.is_root() || !self.has_prim(path) {
            return Err(DocumentError::PrimNotFound(path.clone()));
        }
        let doomed: Vec<PrimPath> = self
            .prims
            .keys()
            .filter(|p| p.has_prefix(path))
            .cloned()
            .collect();
        let removed = doomed
            .into_iter()
            .filter_map(|p| self.prims.remove(&p).map(|spec| (p, spec)))
            .collect();
        Ok(removed)
    }

    /// Re-insert entries returned by [`remove_prim`](Self::remove_prim).
    pub fn restore_prims(&mut self, entries: impl IntoIterator<Item = (PrimPath, PrimSpec)>) {
        self.prims.extend(entries);
    }

    /// Rename the prim at `path`, moving its whole subtree.
    ///
    /// Returns the new path of the prim.
    pub fn rename_prim(&mut self, path: &PrimPath, new_name: &str) -> DocumentResult<PrimPath> {
        let parent = path
            .parent()
            .ok_or_else(|| DocumentError::InvalidPath("the pseudo-root has no name".into()))?;
        let new_path = parent.child(new_name)?;
        if new_path == *path {
            return Ok(new_path);
        }
        if self.has_prim(&new_path) {
            return Err(DocumentError::PrimExists(new_path));
        }
        let moved = self.remove_prim(path)?;
        self.prims.extend(moved.into_iter().filter_map(|(p, spec)| {
            p.replace_prefix(path, &new_path).map(|p| (p, spec))
        }));
        if self.default_prim.as_deref() == Some(path.as_str().trim_start_matches('/')) {
            self.default_prim = Some(new_name.to_owned());
        }
        Ok(new_path)
    }

    /// Change the specifier of `path`, returning the previous one.
    pub fn set_specifier(&mut self, path: &PrimPath, specifier: Specifier) -> DocumentResult<Specifier> {
        let spec = self
            .prims
            .get_mut(path)
            .ok_or_else(|| DocumentError::PrimNotFound(path.clone()))?;
        Ok(std::mem::replace(&mut spec.specifier, specifier))
    }

    /// Append a reference to `asset` on the prim at `path`.
    pub fn add_reference(&mut self, path: &PrimPath, asset: &str) -> DocumentResult<()> {
        let spec = self
            .prims
            .get_mut(path)
            .ok_or_else(|| DocumentError::PrimNotFound(path.clone()))?;
        spec.references.push(asset.to_owned());
        Ok(())
    }

    /// Remove the last reference to `asset` on the prim at `path`.
    pub fn remove_reference(&mut self, path: &PrimPath, asset: &str) -> DocumentResult<()> {
        let spec = self
            .prims
            .get_mut(path)
            .ok_or_else(|| DocumentError::PrimNotFound(path.clone()))?;
        let index = spec
            .references
            .iter()
            .rposition(|r| r == asset)
            .ok_or_else(|| DocumentError::NotFound(asset.to_owned()))?;
        spec.references.remove(index);
        Ok(())
    }

    /// Insert `sublayer` at `index` (clamped to the end of the list).
    ///
    /// Returns the index it landed at.
    pub fn insert_sublayer(&mut self, index: usize, sublayer: &str) -> DocumentResult<usize> {
        if self.sublayers.iter().any(|s| s == sublayer) {
            return Err(DocumentError::SubLayerExists(sublayer.to_owned()));
        }
        let index = index.min(self.sublayers.len());
        self.sublayers.insert(index, sublayer.to_owned());
        Ok(index)
    }

    /// Remove `sublayer`, returning the index it had.
    pub fn remove_sublayer(&mut self, sublayer: &str) -> DocumentResult<usize> {
        let index = self.sublayer_index(sublayer)?;
        self.sublayers.remove(index);
        Ok(index)
    }

    /// Move `sublayer` one slot towards the front (`up`) or the back.
    ///
    /// Returns `false` if it was already at that end.
    pub fn move_sublayer(&mut self, sublayer: &str, up: bool) -> DocumentResult<bool> {
        let index = self.sublayer_index(sublayer)?;
        let target = if up {
            match index.checked_sub(1) {
                Some(target) => target,
                None => return Ok(false),
            }
        } else {
            if index + 1 >= self.sublayers.len() {
                return Ok(false);
            }
            index + 1
        };
        self.sublayers.swap(index, target);
        Ok(true)
    }

    fn sublayer_index(&self, sublayer: &str) -> DocumentResult<usize> {
        self.sublayers
            .iter()
            .position(|s| s == sublayer)
            .ok_or_else(|| DocumentError::SubLayerNotFound(sublayer.to_owned()))
    }
}
