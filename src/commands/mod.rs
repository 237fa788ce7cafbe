//! CLI commands

pub mod browse;
pub mod category;
pub mod notes;
pub mod run;
pub mod tool;
pub mod undo;
pub mod utils;
