//! Prim paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DocumentError;

/// An absolute path to a prim, such as `/World/Geom/Cube`.
///
/// `/` on its own is the pseudo-root: it has no spec of its own and every
/// top-level prim is its child. Each segment is an identifier (ASCII letter
/// or `_`, followed by letters, digits or `_`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrimPath(String);

impl PrimPath {
    /// The pseudo-root path `/`.
    pub fn root() -> Self {
        PrimPath("/".into())
    }

    /// Parse and validate an absolute prim path.
    ///
    /// Redundant separators are collapsed and a trailing slash is dropped;
    /// relative paths, `.`/`..` segments and non-identifier names are
    /// rejected.
    pub fn parse(path: &str) -> Result<Self, DocumentError> {
        if !path.starts_with('/') {
            return Err(DocumentError::InvalidPath(format!(
                "prim path must be absolute: {path:?}"
            )));
        }
        let mut segments = Vec::new();
        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }
            if !is_identifier(segment) {
                return Err(DocumentError::InvalidPath(format!(
                    "{segment:?} is not a valid prim name"
                )));
            }
            segments.push(segment);
        }
        Ok(PrimPath(format!("/{}", segments.join("/"))))
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The last segment, or an empty string for the pseudo-root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The parent path; `None` for the pseudo-root.
    pub fn parent(&self) -> Option<PrimPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(PrimPath::root()),
            Some(pos) => Some(PrimPath(self.0[..pos].to_owned())),
        }
    }

    /// Append a child segment.
    pub fn child(&self, name: &str) -> Result<PrimPath, DocumentError> {
        if !is_identifier(name) {
            return Err(DocumentError::InvalidPath(format!(
                "{name:?} is not a valid prim name"
            )));
        }
        if self.is_root() {
            Ok(PrimPath(format!("/{name}")))
        } else {
            Ok(PrimPath(format!("{}/{name}", self.0)))
        }
    }

    /// Number of segments (`0` for the pseudo-root).
    pub fn depth(&self) -> usize {
        self.0.split('/').filter(|s| !s.is_empty()).count()
    }

    /// `true` if `self` is `prefix` or lies underneath it.
    pub fn has_prefix(&self, prefix: &PrimPath) -> bool {
        if prefix.is_root() || self == prefix {
            return true;
        }
        self.0
            .strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Re-root `self` from `old` to `new`, e.g. `/A/B` with `/A` → `/C`
    /// gives `/C/B`. Returns `None` when `self` is not under `old`.
    pub fn replace_prefix(&self, old: &PrimPath, new: &PrimPath) -> Option<PrimPath> {
        if !self.has_prefix(old) {
            return None;
        }
        let rest = if old.is_root() {
            &self.0[..]
        } else {
            &self.0[old.0.len()..]
        };
        if rest.is_empty() || rest == "/" {
            return Some(new.clone());
        }
        if new.is_root() {
            Some(PrimPath(rest.to_owned()))
        } else {
            Some(PrimPath(format!("{}{rest}", new.0)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `true` if `name` can be used as a prim name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimPath({})", self.0)
    }
}

impl TryFrom<String> for PrimPath {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PrimPath::parse(&value)
    }
}

impl From<PrimPath> for String {
    fn from(path: PrimPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PrimPath {
        PrimPath::parse(s).unwrap()
    }

    #[test]
    fn parse_normalizes_separators() {
        assert_eq!(p("/World//Cube/").as_str(), "/World/Cube");
        assert_eq!(p("/").as_str(), "/");
        assert!(p("///").is_root());
    }

    #[test]
    fn parse_rejects_relative_and_bad_names() {
        assert!(PrimPath::parse("World").is_err());
        assert!(PrimPath::parse("").is_err());
        assert!(PrimPath::parse("/World/../Cube").is_err());
        assert!(PrimPath::parse("/1Cube").is_err());
        assert!(PrimPath::parse("/Cube Mesh").is_err());
    }

    #[test]
    fn name_and_parent() {
        let cube = p("/World/Cube");
        assert_eq!(cube.name(), "Cube");
        assert_eq!(cube.parent(), Some(p("/World")));
        assert_eq!(p("/World").parent(), Some(PrimPath::root()));
        assert_eq!(PrimPath::root().parent(), None);
        assert_eq!(PrimPath::root().name(), "");
    }

    #[test]
    fn child_validates_name() {
        assert_eq!(PrimPath::root().child("World").unwrap(), p("/World"));
        assert_eq!(p("/World").child("_a1").unwrap(), p("/World/_a1"));
        assert!(p("/World").child("a/b").is_err());
    }

    #[test]
    fn prefix_matching_respects_segments() {
        assert!(p("/World/Cube").has_prefix(&p("/World")));
        assert!(p("/World").has_prefix(&p("/World")));
        assert!(p("/World").has_prefix(&PrimPath::root()));
        assert!(!p("/WorldX").has_prefix(&p("/World")));
    }

    #[test]
    fn replace_prefix_moves_subtrees() {
        assert_eq!(
            p("/World/Cube/Mesh").replace_prefix(&p("/World/Cube"), &p("/World/Box")),
            Some(p("/World/Box/Mesh"))
        );
        assert_eq!(
            p("/World").replace_prefix(&p("/World"), &p("/Scene")),
            Some(p("/Scene"))
        );
        assert_eq!(p("/Other").replace_prefix(&p("/World"), &p("/Scene")), None);
    }

    #[test]
    fn depth_counts_segments() {
        assert_eq!(PrimPath::root().depth(), 0);
        assert_eq!(p("/A/B/C").depth(), 3);
    }
}
