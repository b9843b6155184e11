//! Shared test fixtures for the runfolder organiser workspace.
//!
//! Dev-dependency only. Builds realistic sequencing runfolders in a
//! temporary directory:
//!
//! - [`runfolder`] — [`TestRunfolder`] builder plus filesystem assertions

pub mod runfolder;

pub use runfolder::{RUNFOLDER_NAME, RUNFOLDER_RULES, TestRunfolder};
