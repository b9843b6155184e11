//! Filesystem layer for the runfolder organiser
//!
//! Provides glob expansion, slash-normalized paths, format-agnostic config
//! loading and the replace-in-place link/copy primitives the engine uses.

pub mod config;
pub mod error;
pub mod glob;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use glob::GlobExpansion;
pub use io::Placement;
pub use path::NormalizedPath;
