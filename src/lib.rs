//! toolbench library
//!
//! A categorized catalog of external tools that can be launched from the
//! command line, plus a folder of RTF notes.
//!
//! - [`catalog`]: the tools.json category tree, its edits and its views
//! - [`launch`]: turning a catalog entry into an OS process
//! - [`notebook`]: one .rtf file per note, with a small RTF codec
//! - [`config`]: the data directory layout and user settings

pub mod catalog;
pub mod config;
pub mod launch;
pub mod notebook;
