//! Tool commands - add, edit, move and remove catalog entries

use anyhow::{bail, Result};
use owo_colors::OwoColorize;

use super::utils::{self, Home};
use toolbench::catalog::{CategoryPath, ToolId, ToolPatch};

/// Add a tool to a category and print its id
pub fn add(home: &Home, category: &str, patch: ToolPatch) -> Result<ToolId> {
    let category = CategoryPath::parse(category)?;
    let mut catalog = home.load_catalog()?;

    let id = catalog.add_tool(&category, patch)?;
    home.save_catalog(&catalog)?;

    if let Some((tool, _)) = catalog.find_tool(id) {
        println!("{} #{} {} in {}", "Added:".green(), id, tool.name, category);
    }
    Ok(id)
}

pub fn edit(home: &Home, id: ToolId, patch: ToolPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change. Pass at least one field, e.g. --name or --path");
    }

    let mut catalog = home.load_catalog()?;
    let name = catalog.update_tool(id, patch)?.name.clone();
    home.save_catalog(&catalog)?;

    println!("{} #{} {}", "Updated:".green(), id, name);
    Ok(())
}

pub fn move_to(home: &Home, id: ToolId, category: &str) -> Result<()> {
    let category = CategoryPath::parse(category)?;
    let mut catalog = home.load_catalog()?;

    catalog.move_tool(id, &category)?;
    home.save_catalog(&catalog)?;

    println!("{} #{} -> {}", "Moved:".green(), id, category);
    Ok(())
}

pub fn remove(home: &Home, id: ToolId, yes: bool) -> Result<()> {
    let mut catalog = home.load_catalog()?;

    let Some((tool, category)) = catalog.find_tool(id) else {
        bail!("Tool #{} not found", id);
    };

    if !yes {
        let prompt = format!("Delete tool #{} '{}' from {}?", id, tool.name, category);
        if !utils::confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = catalog.remove_tool(id)?;
    home.save_catalog(&catalog)?;

    println!("{} #{} {}", "Deleted:".green(), id, removed.name);
    Ok(())
}
