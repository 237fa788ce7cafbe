//! Browse commands - tree view, card grid, search and tool details

use anyhow::{bail, Result};

use super::utils::Home;
use toolbench::catalog::view::{self, Card};
use toolbench::catalog::{Catalog, CategoryPath, ToolId};

const EMPTY_HINT: &str =
    "No categories yet. Create one with `toolbench category add <NAME>`.";

/// Folder tree of the whole catalog
pub fn tree(home: &Home) -> Result<String> {
    let catalog = home.load_catalog()?;
    if catalog.categories.is_empty() {
        return Ok(EMPTY_HINT.to_string());
    }
    Ok(view::render_tree(&catalog))
}

/// Card grid of a category's contents, or of every tool when no category is given
pub fn list(home: &Home, category: Option<&str>, columns: usize) -> Result<String> {
    let catalog = home.load_catalog()?;

    match category {
        Some(raw) => {
            let path = CategoryPath::parse(raw)?;
            let Some(category) = catalog.category(&path) else {
                bail!("Category '{}' not found", path);
            };

            let cards = view::category_cards(category);
            Ok(with_footer(
                view::render_cards(&cards, columns),
                &format!("{} is empty", path),
                &summary(&cards),
            ))
        }
        None => {
            if catalog.categories.is_empty() {
                return Ok(EMPTY_HINT.to_string());
            }
            all_tools(&catalog, columns)
        }
    }
}

/// Tool cards whose names match `text`
pub fn search(home: &Home, text: &str, columns: usize) -> Result<String> {
    let catalog = home.load_catalog()?;
    if text.is_empty() {
        return all_tools(&catalog, columns);
    }

    let hits = catalog.search(text);
    let cards = view::tool_cards(&hits);
    Ok(with_footer(
        view::render_cards(&cards, columns),
        &format!("No tools match '{}'", text),
        &format!("{} match(es)", hits.len()),
    ))
}

/// Detail page for one tool
pub fn show(home: &Home, id: ToolId) -> Result<String> {
    let catalog = home.load_catalog()?;
    let Some((tool, category)) = catalog.find_tool(id) else {
        bail!("Tool #{} not found", id);
    };
    Ok(view::render_tool_details(tool, &category))
}

fn all_tools(catalog: &Catalog, columns: usize) -> Result<String> {
    let tools = catalog.all_tools();
    let cards = view::tool_cards(&tools);
    Ok(with_footer(
        view::render_cards(&cards, columns),
        "No tools yet. Add one with `toolbench tool add <CATEGORY>`.",
        &format!("{} tool(s)", tools.len()),
    ))
}

fn summary(cards: &[Card<'_>]) -> String {
    let folders = cards
        .iter()
        .filter(|c| matches!(c, Card::Folder(_)))
        .count();
    format!("{} folder(s), {} tool(s)", folders, cards.len() - folders)
}

fn with_footer(grid: String, empty: &str, footer: &str) -> String {
    if grid.is_empty() {
        empty.to_string()
    } else {
        format!("{}\n\n{}", grid, footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use toolbench::catalog::ToolPatch;

    fn home_with_tools() -> (tempfile::TempDir, Home) {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();

        let mut catalog = Catalog::default();
        let web = catalog.add_category(None, "Web").unwrap();
        let scanners = catalog.add_category(Some(&web), "Scanners").unwrap();
        catalog
            .add_tool(
                &scanners,
                ToolPatch {
                    name: Some("nmap".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        home.save_catalog(&catalog).unwrap();

        (dir, home)
    }

    #[test]
    fn test_empty_catalog_hint() {
        let dir = tempdir().unwrap();
        let home = Home::resolve(Some(dir.path())).unwrap();
        assert_eq!(tree(&home).unwrap(), EMPTY_HINT);
        assert_eq!(list(&home, None, 4).unwrap(), EMPTY_HINT);
    }

    #[test]
    fn test_list_category_and_missing_category() {
        let (_dir, home) = home_with_tools();
        let out = list(&home, Some("Web"), 4).unwrap();
        assert!(out.contains("Scanners"));
        assert!(out.contains("1 folder(s), 0 tool(s)"));

        assert!(list(&home, Some("Nope"), 4).is_err());
    }

    #[test]
    fn test_search_and_show() {
        let (_dir, home) = home_with_tools();
        assert!(search(&home, "NM", 4).unwrap().contains("nmap  #1"));
        assert_eq!(search(&home, "zzz", 4).unwrap(), "No tools match 'zzz'");
        assert!(show(&home, 1).unwrap().contains("Category: Web/Scanners"));
        assert!(show(&home, 2).is_err());
    }
}
