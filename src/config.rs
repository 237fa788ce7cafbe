//! Data directory layout and user settings

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "TOOLBENCH_HOME";

pub const CATALOG_FILE: &str = "tools.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const NOTEBOOK_DIR: &str = "Notebooks";

/// Resolve the toolbench data directory
///
/// Precedence: explicit override (`--home`), then `TOOLBENCH_HOME`, then the
/// platform data directory:
/// - macOS: ~/Library/Application Support/toolbench/
/// - Linux: ~/.local/share/toolbench/
/// - Windows: %APPDATA%/toolbench/
pub fn home_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let data = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data.join("toolbench"))
}

/// Path of the tool catalog (tools.json)
pub fn catalog_path(home: &Path) -> PathBuf {
    home.join(CATALOG_FILE)
}

/// Directory holding one .rtf file per note
pub fn notebook_dir(home: &Path) -> PathBuf {
    home.join(NOTEBOOK_DIR)
}

/// Path of the optional settings file
pub fn settings_path(home: &Path) -> PathBuf {
    home.join(SETTINGS_FILE)
}

/// User settings read from settings.json
///
/// Every field is optional; platform defaults fill the gaps.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Settings {
    /// Program and leading arguments used to run command-mode tools,
    /// e.g. `["cmd.exe", "/k"]`. The command text is appended last.
    #[serde(default)]
    pub terminal: Option<Vec<String>>,

    /// Program used to reveal a tool folder
    #[serde(default)]
    pub opener: Option<String>,

    /// Program used by `notes edit`
    #[serde(default)]
    pub editor: Option<String>,
}

impl Settings {
    /// Load settings.json from the data directory (defaults if absent)
    pub fn load(home: &Path) -> Result<Self> {
        let path = settings_path(home);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse: {}", path.display()))
    }

    /// Terminal program followed by its argument prefix
    pub fn terminal_command(&self) -> (String, Vec<String>) {
        if let Some((program, args)) = self
            .terminal
            .as_deref()
            .and_then(|parts| parts.split_first())
        {
            return (program.clone(), args.to_vec());
        }

        #[cfg(windows)]
        {
            ("cmd.exe".to_string(), vec!["/k".to_string()])
        }

        #[cfg(not(windows))]
        {
            ("sh".to_string(), vec!["-c".to_string()])
        }
    }

    /// Program that opens a directory in the desktop file manager
    pub fn opener(&self) -> String {
        if let Some(opener) = &self.opener {
            return opener.clone();
        }

        #[cfg(target_os = "windows")]
        {
            "explorer".to_string()
        }

        #[cfg(target_os = "macos")]
        {
            "open".to_string()
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            "xdg-open".to_string()
        }
    }

    /// Editor for notes: settings, then $VISUAL / $EDITOR, then a platform default
    pub fn editor(&self) -> String {
        if let Some(editor) = &self.editor {
            return editor.clone();
        }

        for var in ["VISUAL", "EDITOR"] {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    return value;
                }
            }
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else {
            "vi".to_string()
        }
    }
}
