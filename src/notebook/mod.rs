//! Notebook: one RTF file per note in a single directory

pub mod rtf;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

pub use rtf::RtfError;

/// File extension of note files
pub const NOTE_EXTENSION: &str = "rtf";

/// Characters that cannot appear in a file name on Windows
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("note name must not be empty")]
    EmptyName,

    #[error("invalid note name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("note '{0}' not found")]
    NotFound(String),

    #[error("note '{0}' already exists")]
    AlreadyExists(String),

    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        source: std::io::Error,
    },

    #[error("note '{name}' is not readable RTF: {source}")]
    Rtf { name: String, source: RtfError },
}

type Result<T> = std::result::Result<T, NoteError>;

/// A note as listed in the notebook
#[derive(Debug, Clone)]
pub struct NoteEntry {
    pub name: String,
    pub modified: Option<SystemTime>,
    pub size_bytes: u64,
}

/// The notes directory
#[derive(Debug, Clone)]
pub struct Notebook {
    dir: PathBuf,
}

impl Notebook {
    /// Open the notebook, creating its directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(io_err("Failed to create", &dir))?;
            info!(dir = %dir.display(), "created notebook directory");
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a note name: the existing file, whatever the case of its
    /// extension, or `<name>.rtf` for a new note
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        let name = validate_name(name)?;
        Ok(self.resolve(&name).unwrap_or_else(|| self.file_for(&name)))
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, NOTE_EXTENSION))
    }

    /// The file of an existing note; `Alpha.RTF` is found as note `Alpha`
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let exact = self.file_for(name);
        if exact.is_file() {
            return Some(exact);
        }

        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .find(|path| is_note_file(path) && path.file_stem().is_some_and(|stem| stem == name))
    }

    pub fn exists(&self, name: &str) -> bool {
        validate_name(name)
            .map(|name| self.resolve(&name).is_some())
            .unwrap_or(false)
    }

    /// Notes sorted by name, ignoring case
    pub fn list(&self) -> Result<Vec<NoteEntry>> {
        let mut notes = Vec::new();

        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| NoteError::Io {
                action: "Failed to read",
                path: self.dir.display().to_string(),
                source: e.into(),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !is_note_file(path) {
                continue;
            }

            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let metadata = entry.metadata().ok();

            notes.push(NoteEntry {
                name,
                modified: metadata.as_ref().and_then(|m| m.modified().ok()),
                size_bytes: metadata.map(|m| m.len()).unwrap_or(0),
            });
        }

        notes.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(notes)
    }

    /// Create an empty note; returns the normalized name
    pub fn create(&self, name: &str) -> Result<String> {
        let name = validate_name(name)?;
        if self.resolve(&name).is_some() {
            return Err(NoteError::AlreadyExists(name));
        }
        let path = self.file_for(&name);

        fs::write(&path, rtf::encode("")).map_err(io_err("Failed to write", &path))?;
        debug!(note = %name, "created note");
        Ok(name)
    }

    /// Raw RTF content
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.existing(name)?;
        let bytes = fs::read(&path).map_err(io_err("Failed to read", &path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Plain text content
    pub fn read_text(&self, name: &str) -> Result<String> {
        let content = self.read(name)?;
        rtf::decode(&content).map_err(|source| NoteError::Rtf {
            name: name.trim().to_string(),
            source,
        })
    }

    /// Whether the note carries formatting that [`Notebook::save_text`]
    /// would drop
    pub fn has_formatting(&self, name: &str) -> Result<bool> {
        Ok(rtf::has_formatting(&self.read(name)?))
    }

    /// Replace a note's content with `text`
    pub fn save_text(&self, name: &str, text: &str) -> Result<()> {
        let path = self.existing(name)?;
        fs::write(&path, rtf::encode(text)).map_err(io_err("Failed to write", &path))?;
        debug!(note = %name.trim(), bytes = text.len(), "saved note");
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.existing(name)?;
        fs::remove_file(&path).map_err(io_err("Failed to delete", &path))?;
        info!(note = %name.trim(), "deleted note");
        Ok(())
    }

    /// Rename a note; renaming to the same name does nothing
    pub fn rename(&self, old: &str, new: &str) -> Result<String> {
        let old_path = self.existing(old)?;
        let new_name = validate_name(new)?;
        if new_name == old.trim() {
            return Ok(new_name);
        }

        if let Some(taken) = self.resolve(&new_name) {
            if !same_file_ignoring_case(&old_path, &taken) {
                return Err(NoteError::AlreadyExists(new_name));
            }
        }
        let new_path = self.file_for(&new_name);

        fs::rename(&old_path, &new_path).map_err(io_err("Failed to rename", &old_path))?;
        info!(from = %old.trim(), to = %new_name, "renamed note");
        Ok(new_name)
    }

    fn existing(&self, name: &str) -> Result<PathBuf> {
        let name = validate_name(name)?;
        self.resolve(&name).ok_or(NoteError::NotFound(name))
    }
}

/// Trim and check a note name
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NoteError::EmptyName);
    }

    let invalid = |reason| NoteError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name == "." || name == ".." {
        return Err(invalid("reserved name"));
    }
    if name.contains(FORBIDDEN_CHARS) {
        return Err(invalid("contains one of < > : \" / \\ | ? *"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("contains control characters"));
    }
    if name.ends_with('.') {
        return Err(invalid("must not end with '.'"));
    }
    Ok(name.to_string())
}

fn is_note_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION))
}

/// On case-insensitive file systems a case-only rename points at the same file
fn same_file_ignoring_case(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn io_err<'a>(
    action: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> NoteError + 'a {
    move |source| NoteError::Io {
        action,
        path: path.display().to_string(),
        source,
    }
}
