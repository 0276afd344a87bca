//! Layered scene documents for the Strata editor.
//!
//! This crate is the document-graph library the editing session sits on.
//! It offers what the editing session needs:
//!
//! - [`PrimPath`]: absolute, `/`-separated paths to prims
//! - [`LayerContent`] / [`PrimSpec`]: the opinions authored in one layer
//! - [`Layer`] / [`LayerHandle`]: a shared, reference-counted raw document
//! - [`LayerRegistry`]: the set of loaded layers, keyed by identifier
//! - [`Stage`] / [`StageHandle`]: a composed view over a root layer and its
//!   sublayer stack, with an edit target
//!
//! # Ownership
//!
//! Layers and stages are handed out as [`Arc`](std::sync::Arc) handles. The
//! registry only keeps weak references, so a layer is released when the
//! last collection holding it (stage cache, layer set, history, edit target,
//! an in-flight command) drops its handle.
//!
//! # Writes
//!
//! Reading a layer or querying a stage only needs a handle. Editing,
//! saving, loading and resolving layer stacks go through `&mut`
//! [`LayerRegistry`], so code that only holds shared references cannot
//! change documents or hit the disk.
//!
//! # Files
//!
//! Layers are stored as RON documents with a `.strata` or `.ron` extension,
//! see [`format`].

mod content;
mod error;
pub mod format;
mod layer;
pub mod path;
mod registry;
mod stage;

pub use content::{LayerContent, PrimSpec, Specifier};
pub use error::{DocumentError, DocumentResult};
pub use layer::{Layer, LayerHandle, LayerId};
pub use path::PrimPath;
pub use registry::LayerRegistry;
pub use stage::{Stage, StageHandle};
