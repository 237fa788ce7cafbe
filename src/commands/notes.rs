//! Notes commands - manage the RTF notebook

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::fs;
use std::io::{self, Read};
use std::process::Command;

use super::utils::{self, Home};
use toolbench::notebook::Notebook;

/// Table of notes with size and modification time
pub fn list(home: &Home) -> Result<String> {
    let notebook = home.notebook()?;
    let notes = notebook.list()?;

    if notes.is_empty() {
        return Ok("No notes yet. Create one with `toolbench notes new <NAME>`.".to_string());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Note"), Cell::new("Size"), Cell::new("Modified")]);

    for note in &notes {
        table.add_row(vec![
            Cell::new(&note.name),
            Cell::new(utils::format_size(note.size_bytes)),
            Cell::new(utils::format_time(note.modified)),
        ]);
    }

    Ok(format!("{}\n\n{} note(s)", table, notes.len()))
}

pub fn create(home: &Home, name: &str) -> Result<()> {
    let notebook = home.notebook()?;
    let name = notebook.create(name)?;
    println!("{} {}", "Created:".green(), name);
    Ok(())
}

/// Plain text of a note, or its RTF source with `raw`
pub fn show(home: &Home, name: &str, raw: bool) -> Result<String> {
    let notebook = home.notebook()?;
    if raw {
        Ok(notebook.read(name)?)
    } else {
        Ok(notebook.read_text(name)?)
    }
}

/// Refuse to rewrite a formatted note as plain text unless forced
fn ensure_plain(notebook: &Notebook, name: &str, force: bool) -> Result<()> {
    if !notebook.has_formatting(name)? {
        return Ok(());
    }
    if !force {
        bail!(
            "Note '{}' has rich-text formatting that saving as plain text would drop. \
             Use --force to overwrite it anyway",
            name.trim()
        );
    }
    println!(
        "{} formatting of '{}' will be dropped",
        "Warning:".yellow(),
        name.trim()
    );
    Ok(())
}

/// Replace a note's content with text read from stdin
pub fn write(home: &Home, name: &str, force: bool) -> Result<()> {
    let notebook = home.notebook()?;
    ensure_plain(&notebook, name, force)?;

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read note text from stdin")?;

    notebook.save_text(name, &text)?;
    println!("{} {}", "Saved:".green(), name.trim());
    Ok(())
}

/// Edit a note's text in an external editor
///
/// The text is written to a temporary file, the editor runs to completion,
/// and the note is saved only if the text changed.
pub fn edit(home: &Home, name: &str, force: bool) -> Result<()> {
    let notebook = home.notebook()?;
    let settings = home.settings()?;
    ensure_plain(&notebook, name, force)?;

    let before = notebook.read_text(name)?;

    let temp = tempfile::Builder::new()
        .prefix("toolbench-note-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temp file")?;
    fs::write(temp.path(), &before)
        .with_context(|| format!("Failed to write: {}", temp.path().display()))?;

    let editor = settings.editor();
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("No editor configured");
    };

    let status = Command::new(program)
        .args(parts)
        .arg(temp.path())
        .status()
        .with_context(|| format!("Failed to start editor '{}'", editor))?;
    if !status.success() {
        bail!("Editor exited with {}; note left unchanged", status);
    }

    let edited = fs::read_to_string(temp.path())
        .with_context(|| format!("Failed to read: {}", temp.path().display()))?;

    if edited == before {
        println!("No changes.");
        return Ok(());
    }

    notebook.save_text(name, &edited)?;
    println!("{} {}", "Saved:".green(), name.trim());
    Ok(())
}

pub fn rename(home: &Home, old: &str, new: &str) -> Result<()> {
    let notebook = home.notebook()?;
    let new_name = notebook.rename(old, new)?;
    println!("{} {} -> {}", "Renamed:".green(), old.trim(), new_name);
    Ok(())
}

pub fn delete(home: &Home, name: &str, yes: bool) -> Result<()> {
    let notebook = home.notebook()?;
    if !notebook.exists(name) {
        bail!("Note '{}' not found", name.trim());
    }

    if !yes {
        let prompt = format!(
            "Delete note '{}'? This cannot be undone.",
            name.trim()
        );
        if !utils::confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    notebook.delete(name)?;
    println!("{} {}", "Deleted:".green(), name.trim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_and_show() {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();

        assert!(list(&home).unwrap().starts_with("No notes yet"));

        create(&home, "journal").unwrap();
        home.notebook()
            .unwrap()
            .save_text("journal", "day one")
            .unwrap();

        let table = list(&home).unwrap();
        assert!(table.contains("journal"));
        assert!(table.contains("1 note(s)"));

        assert_eq!(show(&home, "journal", false).unwrap(), "day one");
        assert!(show(&home, "journal", true).unwrap().starts_with("{\\rtf1"));
    }

    #[test]
    fn test_rename_and_delete() {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();

        create(&home, "a").unwrap();
        rename(&home, "a", "b").unwrap();
        delete(&home, "b", true).unwrap();
        assert!(delete(&home, "b", true).is_err());
    }

    #[test]
    fn test_formatted_note_needs_force() {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();
        let notebook = home.notebook().unwrap();
        fs::write(
            notebook.dir().join("report.rtf"),
            r"{\rtf1\ansi\pard\i draft\i0\par}",
        )
        .unwrap();
        notebook.create("plain").unwrap();

        assert!(ensure_plain(&notebook, "report", false).is_err());
        assert!(ensure_plain(&notebook, "report", true).is_ok());
        assert!(ensure_plain(&notebook, "plain", false).is_ok());
        assert!(edit(&home, "report", false).is_err());
    }
}
