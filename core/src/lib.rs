//! # Strata Core
//!
//! Target-agnostic editing framework shared by the Strata crates: reversible
//! commands, the frame-deferred command queue and the undo/redo log.

pub mod abstract_editor;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
