use thiserror::Error;

use crate::path::PrimPath;

/// Errors reported by the document library.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Nothing readable exists at the path.
    #[error("not found: {0}")]
    NotFound(String),
    /// A layer with this identifier is already loaded.
    #[error("layer already exists: {0}")]
    AlreadyExists(String),
    /// The file extension is not a layer format.
    #[error("unsupported layer format: {0}")]
    UnsupportedFormat(String),
    /// The path cannot name a layer or a prim.
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// The file exists but is not a valid layer.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
    /// The layer or stage was loaded by a different registry.
    #[error("layer belongs to another registry: {0}")]
    ForeignLayer(String),
    /// The layer is not part of the stage's layer stack.
    #[error("layer is not in the stage's layer stack: {0}")]
    NotInLayerStack(String),
    #[error("no prim spec at {0}")]
    PrimNotFound(PrimPath),
    #[error("a prim spec already exists at {0}")]
    PrimExists(PrimPath),
    #[error("sublayer not found: {0}")]
    SubLayerNotFound(String),
    #[error("sublayer already present: {0}")]
    SubLayerExists(String),
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            DocumentError::NotFound(err.to_string())
        } else {
            DocumentError::Io(err)
        }
    }
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err: DocumentError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert!(matches!(err, DocumentError::NotFound(_)));

        let err: DocumentError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert!(matches!(err, DocumentError::Io(_)));
    }

    #[test]
    fn display_names_the_prim() {
        let path = PrimPath::parse("/World/Cube").unwrap();
        assert_eq!(
            DocumentError::PrimExists(path).to_string(),
            "a prim spec already exists at /World/Cube"
        );
    }
}
