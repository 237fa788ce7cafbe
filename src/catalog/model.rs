//! On-disk shape of tools.json
//!
//! Key names follow the existing file format (`categories`, `SubCategories`,
//! `ToolPath`, `RUN`, `Commond`, ...) so catalogs written by earlier versions
//! of the launcher load unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Root of tools.json
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
}

/// A folder in the category tree
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_categories: Vec<Category>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<Tool>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_categories: Vec::new(),
            tools: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sub_categories.is_empty() && self.tools.is_empty()
    }
}

/// Tool ids are signed 32-bit integers in tools.json
pub type ToolId = i32;

/// How a tool is started
///
/// An entry without a `Cmd` key is in command mode, the same as `Cmd: 0`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LaunchMode {
    /// Run one of the tool's commands in a terminal inside `ToolPath` (`Cmd: 0`)
    #[default]
    Command,
    /// Start `ToolPath/RUN` (`Cmd: 1`)
    Executable,
}

impl TryFrom<u8> for LaunchMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Command),
            1 => Ok(Self::Executable),
            other => Err(format!("unknown launch mode {} (expected 0 or 1)", other)),
        }
    }
}

impl From<LaunchMode> for u8 {
    fn from(mode: LaunchMode) -> Self {
        match mode {
            LaunchMode::Command => 0,
            LaunchMode::Executable => 1,
        }
    }
}

impl LaunchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cmd" | "command" | "0" => Some(Self::Command),
            "exe" | "executable" | "1" => Some(Self::Executable),
            _ => None,
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Executable => write!(f, "executable"),
        }
    }
}

/// A launchable entry
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "Id", default)]
    pub id: ToolId,

    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(rename = "Description", default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(rename = "Cmd", default)]
    pub mode: LaunchMode,

    /// Folder the tool lives in; also the working directory when launched
    #[serde(rename = "ToolPath", default, deserialize_with = "null_as_default")]
    pub tool_path: String,

    /// Executable file name relative to `tool_path`
    #[serde(rename = "RUN", default, deserialize_with = "null_as_default")]
    pub run: String,

    /// `;`-separated command lines for command mode
    #[serde(rename = "Commond", default, deserialize_with = "null_as_default")]
    pub commands: String,
}

impl Tool {
    /// The individual command lines, trimmed, blanks dropped
    pub fn command_list(&self) -> Vec<&str> {
        self.commands
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
