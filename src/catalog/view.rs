//! Terminal renderings of the catalog: folder tree, card grid, tool details

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use super::model::{Catalog, Category, LaunchMode, Tool};
use super::store::{count_tools, CategoryPath};

const FOLDER_ICON: &str = "📁";
const TOOL_ICON: &str = "🛠";

/// Cards per row in the grid view
pub const GRID_COLUMNS: usize = 4;

/// Maximum description length shown on a tool card
const CARD_DESCRIPTION_LEN: usize = 40;

/// One tile in the grid view
#[derive(Debug, Clone, Copy)]
pub enum Card<'a> {
    Folder(&'a Category),
    Tool(&'a Tool),
}

impl Card<'_> {
    fn render(&self) -> String {
        match self {
            Card::Folder(category) => {
                let count = count_tools(category);
                format!(
                    "{} {}\n{} tool{}",
                    FOLDER_ICON,
                    category.name,
                    count,
                    if count == 1 { "" } else { "s" }
                )
            }
            Card::Tool(tool) => {
                let mut text = format!("{} {}  #{}", TOOL_ICON, tool.name, tool.id);
                if !tool.description.is_empty() {
                    text.push('\n');
                    text.push_str(&truncate(&tool.description, CARD_DESCRIPTION_LEN));
                }
                text
            }
        }
    }
}

/// Contents of a category as shown when it is selected: subfolders first, then tools
pub fn category_cards(category: &Category) -> Vec<Card<'_>> {
    category
        .sub_categories
        .iter()
        .map(Card::Folder)
        .chain(category.tools.iter().map(Card::Tool))
        .collect()
}

pub fn tool_cards<'a>(tools: &[&'a Tool]) -> Vec<Card<'a>> {
    tools.iter().map(|&t| Card::Tool(t)).collect()
}

/// Lay cards out in rows of `columns`
pub fn render_cards(cards: &[Card<'_>], columns: usize) -> String {
    if cards.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for row in cards.chunks(columns.max(1)) {
        table.add_row(row.iter().map(|card| Cell::new(card.render())));
    }

    table.to_string()
}

/// Folder tree with box-drawing connectors
///
/// Within a folder, subfolders are listed before tools.
pub fn render_tree(catalog: &Catalog) -> String {
    let mut lines = Vec::new();
    let count = catalog.categories.len();
    for (i, category) in catalog.categories.iter().enumerate() {
        tree_lines(category, "", i + 1 == count, &mut lines);
    }
    lines.join("\n")
}

fn tree_lines(category: &Category, prefix: &str, is_last: bool, out: &mut Vec<String>) {
    let connector = if is_last {
        "\u{2514}\u{2500}\u{2500} "
    } else {
        "\u{251c}\u{2500}\u{2500} "
    };
    out.push(format!(
        "{}{}{} {}",
        prefix, connector, FOLDER_ICON, category.name
    ));

    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}\u{2502}   ", prefix)
    };

    let total = category.sub_categories.len() + category.tools.len();
    let mut index = 0;

    for sub in &category.sub_categories {
        index += 1;
        tree_lines(sub, &child_prefix, index == total, out);
    }

    for tool in &category.tools {
        index += 1;
        let connector = if index == total {
            "\u{2514}\u{2500}\u{2500} "
        } else {
            "\u{251c}\u{2500}\u{2500} "
        };
        out.push(format!(
            "{}{}{} {}  #{}",
            child_prefix, connector, TOOL_ICON, tool.name, tool.id
        ));
    }
}

/// Detail page for a single tool
pub fn render_tool_details(tool: &Tool, category: &CategoryPath) -> String {
    let mut lines = vec![];

    lines.push(format!("{} {}  #{}", TOOL_ICON, tool.name, tool.id));
    if tool.description.is_empty() {
        lines.push("No description".to_string());
    } else {
        lines.push(tool.description.clone());
    }
    lines.push(String::new());

    lines.push(format!("Category: {}", category));
    lines.push(format!("Mode: {}", tool.mode));
    lines.push(format!("Folder: {}", or_unset(&tool.tool_path)));

    match tool.mode {
        LaunchMode::Executable => {
            lines.push(format!("Executable: {}", or_unset(&tool.run)));
        }
        LaunchMode::Command => {
            let commands = tool.command_list();
            if commands.is_empty() {
                lines.push("Commands: (none)".to_string());
            } else {
                lines.push("Commands:".to_string());
                for (i, cmd) in commands.iter().enumerate() {
                    lines.push(format!("  {}. {}", i + 1, cmd));
                }
            }
        }
    }

    lines.join("\n")
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

pub fn truncate(text: &str, max_len: usize) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    if single_line.chars().count() > max_len {
        let truncated: String = single_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        single_line
    }
}
