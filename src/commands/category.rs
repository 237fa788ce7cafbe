//! Category commands - add, remove and rename folders in the catalog

use anyhow::{bail, Result};
use owo_colors::OwoColorize;

use super::utils::{self, Home};
use toolbench::catalog::store::count_tools;
use toolbench::catalog::CategoryPath;

/// Create a category; `A/B/New` creates `New` under the existing `A/B`
pub fn add(home: &Home, path: &str) -> Result<()> {
    let path = CategoryPath::parse(path)?;
    let mut catalog = home.load_catalog()?;

    let created = catalog.add_category(path.parent().as_ref(), path.name())?;
    home.save_catalog(&catalog)?;

    println!("{} {}", "Created:".green(), created);
    Ok(())
}

/// Remove a category and everything inside it
pub fn remove(home: &Home, path: &str, yes: bool) -> Result<()> {
    let path = CategoryPath::parse(path)?;
    let mut catalog = home.load_catalog()?;

    let Some(category) = catalog.category(&path) else {
        bail!("Category '{}' not found", path);
    };

    if !yes && !category.is_empty() {
        let prompt = format!(
            "Delete '{}' with {} subfolder(s) and {} tool(s)?",
            path,
            category.sub_categories.len(),
            count_tools(category)
        );
        if !utils::confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    catalog.remove_category(&path)?;
    home.save_catalog(&catalog)?;

    println!("{} {}", "Deleted:".green(), path);
    Ok(())
}

pub fn rename(home: &Home, path: &str, new_name: &str) -> Result<()> {
    let path = CategoryPath::parse(path)?;
    let mut catalog = home.load_catalog()?;

    let renamed = catalog.rename_category(&path, new_name)?;
    home.save_catalog(&catalog)?;

    println!("{} {} -> {}", "Renamed:".green(), path, renamed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_nested_and_rename() {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();

        add(&home, "Web").unwrap();
        add(&home, "Web/Scanners").unwrap();
        assert!(add(&home, "Missing/Child").is_err());
        assert!(add(&home, "Web").is_err());

        rename(&home, "Web/Scanners", "Recon").unwrap();
        let catalog = home.load_catalog().unwrap();
        assert!(catalog
            .category(&CategoryPath::parse("Web/Recon").unwrap())
            .is_some());
    }

    #[test]
    fn test_remove_empty_category_without_prompt() {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();

        add(&home, "Temp").unwrap();
        remove(&home, "Temp", false).unwrap();
        assert!(home.load_catalog().unwrap().categories.is_empty());
        assert!(remove(&home, "Temp", true).is_err());
    }
}
