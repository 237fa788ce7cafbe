//! Tool catalog: the category tree persisted in tools.json

pub mod model;
pub mod store;
pub mod view;

pub use model::{Catalog, Category, LaunchMode, Tool, ToolId};
pub use store::{CategoryPath, ToolPatch};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid category name '{0}': '/' separates path segments")]
    InvalidName(String),

    #[error("invalid category path '{0}'")]
    InvalidPath(String),

    #[error("category '{0}' not found")]
    CategoryNotFound(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("tool #{0} not found")]
    ToolNotFound(ToolId),

    #[error("no tool ids left above #{0}")]
    IdsExhausted(ToolId),

    #[error("no earlier version of the catalog to go back to")]
    NothingToUndo,
}
