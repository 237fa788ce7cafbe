//! Undo command - go back to the catalog as it was before the last change

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;

use super::utils::{self, Home};
use toolbench::catalog::store::previous_path;
use toolbench::catalog::Catalog;

/// Swap tools.json with the copy kept by the last save
///
/// Running it again redoes the change.
pub fn execute(home: &Home, yes: bool) -> Result<()> {
    let current_path = home.catalog_path();
    let previous = previous_path(&current_path);
    if !previous.is_file() {
        bail!("Nothing to undo: the catalog has not been changed yet");
    }

    let current = home.load_catalog()?;
    let earlier = Catalog::load(&previous).context("The saved previous catalog is unreadable")?;

    println!("Reverting the catalog:");
    println!(
        "  Now: {} categories, {} tools",
        current.categories.len(),
        current.all_tools().len()
    );
    println!(
        "  Before the last change: {} categories, {} tools",
        earlier.categories.len(),
        earlier.all_tools().len()
    );
    println!();

    if !yes && !utils::confirm("Revert to the earlier catalog?")? {
        println!("Aborted.");
        return Ok(());
    }

    Catalog::revert(&current_path).context("Failed to revert tool catalog")?;
    println!("{} run `toolbench undo` again to redo", "Reverted:".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_undo_reverts_last_change() {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();

        assert!(execute(&home, true).is_err());

        let mut catalog = Catalog::default();
        catalog.add_category(None, "Web").unwrap();
        home.save_catalog(&catalog).unwrap();
        catalog.add_category(None, "Misc").unwrap();
        home.save_catalog(&catalog).unwrap();

        execute(&home, true).unwrap();
        assert_eq!(home.load_catalog().unwrap().categories.len(), 1);

        execute(&home, true).unwrap();
        assert_eq!(home.load_catalog().unwrap().categories.len(), 2);
    }
}
