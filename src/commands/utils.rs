//! Shared utilities for commands

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use toolbench::catalog::Catalog;
use toolbench::config::{self, Settings};
use toolbench::notebook::Notebook;

/// The resolved data directory and accessors for what lives in it
pub struct Home {
    pub dir: PathBuf,
}

impl Home {
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self> {
        let dir = config::home_dir(override_dir)?;
        Ok(Self { dir })
    }

    pub fn catalog_path(&self) -> PathBuf {
        config::catalog_path(&self.dir)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.catalog_path()).context("Failed to load tool catalog")
    }

    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        catalog
            .save(&self.catalog_path())
            .context("Failed to save tool catalog")
    }

    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.dir)
    }

    pub fn notebook(&self) -> Result<Notebook> {
        Notebook::open(config::notebook_dir(&self.dir)).context("Failed to open notebook")
    }
}

/// Ask a y/N question on stdin; anything but "y" is a no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/N) ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Local timestamp for listings, "-" when unknown
pub fn format_time(time: Option<SystemTime>) -> String {
    time.map(|t| {
        let dt: chrono::DateTime<chrono::Local> = t.into();
        dt.format("%Y-%m-%d %H:%M").to_string()
    })
    .unwrap_or_else(|| "-".to_string())
}
