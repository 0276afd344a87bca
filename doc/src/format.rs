//! On-disk layer format.
//!
//! A layer file is its [`LayerContent`] serialized as RON. Only paths with
//! one of [`LAYER_EXTENSIONS`] are treated as layers.

use std::path::Path;

use ron::ser::PrettyConfig;

use crate::{DocumentError, DocumentResult, LayerContent};

/// File extensions recognized as layer documents, without the dot.
pub const LAYER_EXTENSIONS: &[&str] = &["strata", "ron"];

/// `true` if `path` has a layer file extension.
pub fn is_layer_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            LAYER_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Extensions prefixed with a dot, as file dialogs expect them.
pub fn dotted_extensions() -> Vec<String> {
    LAYER_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect()
}

/// Fail with [`DocumentError::UnsupportedFormat`] unless `path` is a layer path.
pub fn ensure_layer_path(path: &Path) -> DocumentResult<()> {
    if is_layer_path(path) {
        Ok(())
    } else {
        Err(DocumentError::UnsupportedFormat(path.display().to_string()))
    }
}

/// Read and parse the layer stored at `path`.
pub fn read_layer(path: &Path) -> DocumentResult<LayerContent> {
    ensure_layer_path(path)?;
    let text = std::fs::read_to_string(path)?;
    ron::from_str(&text).map_err(|e| DocumentError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Serialize `content` to `path`, replacing any existing file.
pub fn write_layer(path: &Path, content: &LayerContent) -> DocumentResult<()> {
    ensure_layer_path(path)?;
    let text = ron::ser::to_string_pretty(content, PrettyConfig::default()).map_err(|e| {
        DocumentError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    })?;
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimPath, Specifier};

    #[test]
    fn extensions_are_case_insensitive() {
        assert!(is_layer_path(Path::new("shot.strata")));
        assert!(is_layer_path(Path::new("dir/shot.RON")));
        assert!(!is_layer_path(Path::new("shot.txt")));
        assert!(!is_layer_path(Path::new("shot")));
        assert_eq!(dotted_extensions(), [".strata", ".ron"]);
    }

    #[test]
    fn written_layer_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.strata");

        let mut content = LayerContent::default();
        content
            .create_prim(&PrimPath::root(), "World", Specifier::Def)
            .unwrap();
        content.sublayers.push("anim.strata".into());
        write_layer(&path, &content).unwrap();

        assert_eq!(read_layer(&path).unwrap(), content);
    }

    #[test]
    fn empty_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.strata");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(read_layer(&path), Err(DocumentError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.strata");
        assert!(matches!(read_layer(&path), Err(DocumentError::NotFound(_))));
    }
}
