//! Loading, saving and editing the category tree

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::model::{Catalog, Category, LaunchMode, Tool, ToolId};
use super::CatalogError;

type Result<T> = std::result::Result<T, CatalogError>;

/// Name given to tools added without one
pub const DEFAULT_TOOL_NAME: &str = "New tool";

/// Address of a category: its name and the names of its ancestors
///
/// Written as `Parent/Child/Grandchild`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPath(Vec<String>);

impl CategoryPath {
    pub fn parse(s: &str) -> Result<Self> {
        let segments: Vec<String> = s.split('/').map(|seg| seg.trim().to_string()).collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(CatalogError::InvalidPath(s.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<Self> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(Self(self.0[..n - 1].to_vec())),
        }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    fn root(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Field updates for a tool; `None` leaves the field unchanged
#[derive(Debug, Default, Clone)]
pub struct ToolPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mode: Option<LaunchMode>,
    pub tool_path: Option<String>,
    pub run: Option<String>,
    pub commands: Option<String>,
}

impl ToolPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.mode.is_none()
            && self.tool_path.is_none()
            && self.run.is_none()
            && self.commands.is_none()
    }

    fn apply(self, tool: &mut Tool) -> Result<()> {
        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            tool.name = name.to_string();
        }
        if let Some(description) = self.description {
            tool.description = description;
        }
        if let Some(mode) = self.mode {
            tool.mode = mode;
        }
        if let Some(tool_path) = self.tool_path {
            tool.tool_path = tool_path.trim().to_string();
        }
        if let Some(run) = self.run {
            tool.run = run.trim().to_string();
        }
        if let Some(commands) = self.commands {
            tool.commands = join_command_lines(&commands);
        }
        Ok(())
    }
}

impl Catalog {
    /// Read tools.json; a missing file is an empty catalog
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "catalog file not found, starting empty");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let catalog: Self =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        debug!(
            path = %path.display(),
            categories = catalog.categories.len(),
            tools = catalog.all_tools().len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Overwrite tools.json with the current tree
    ///
    /// The file being replaced is kept at [`previous_path`] for [`Catalog::revert`].
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        let write_err = |source| CatalogError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        if path.is_file() {
            fs::copy(path, previous_path(path)).map_err(write_err)?;
        }
        fs::write(path, json).map_err(write_err)?;

        debug!(path = %path.display(), "saved catalog");
        Ok(())
    }

    /// Swap tools.json with the version the last save replaced
    ///
    /// Reverting twice returns to where it started. Returns the catalog that
    /// is now current.
    pub fn revert(path: &Path) -> Result<Self> {
        let previous = previous_path(path);
        if !previous.is_file() {
            return Err(CatalogError::NothingToUndo);
        }
        let restored = Self::load(&previous)?;

        let write_err = |source| CatalogError::Write {
            path: path.display().to_string(),
            source,
        };
        if path.is_file() {
            let swap = path.with_extension("json.swap");
            fs::rename(path, &swap).map_err(write_err)?;
            fs::rename(&previous, path).map_err(write_err)?;
            fs::rename(&swap, &previous).map_err(write_err)?;
        } else {
            fs::rename(&previous, path).map_err(write_err)?;
        }

        info!(path = %path.display(), "reverted catalog to previous version");
        Ok(restored)
    }

    /// Every tool in the tree, depth first: a category's own tools come
    /// before those of its subcategories
    pub fn all_tools(&self) -> Vec<&Tool> {
        let mut tools = Vec::new();
        collect_tools(&self.categories, &mut tools);
        tools
    }

    /// Tools whose name contains `text`, ignoring case; empty text matches all
    pub fn search(&self, text: &str) -> Vec<&Tool> {
        let needle = text.to_lowercase();
        self.all_tools()
            .into_iter()
            .filter(|t| needle.is_empty() || t.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Highest tool id plus one
    pub fn next_id(&self) -> Result<ToolId> {
        let max = self.all_tools().iter().map(|t| t.id).max().unwrap_or(0);
        max.checked_add(1).ok_or(CatalogError::IdsExhausted(max))
    }

    pub fn category(&self, path: &CategoryPath) -> Option<&Category> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.categories.iter().find(|c| &c.name == first)?;
        for name in rest {
            current = current.sub_categories.iter().find(|c| &c.name == name)?;
        }
        Some(current)
    }

    fn category_mut(&mut self, path: &CategoryPath) -> Result<&mut Category> {
        let not_found = || CatalogError::CategoryNotFound(path.to_string());
        let (first, rest) = path.segments().split_first().ok_or_else(not_found)?;
        let mut current = self
            .categories
            .iter_mut()
            .find(|c| &c.name == first)
            .ok_or_else(not_found)?;
        for name in rest {
            current = current
                .sub_categories
                .iter_mut()
                .find(|c| &c.name == name)
                .ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// The list a category at `path` lives in
    fn siblings_mut(&mut self, parent: Option<&CategoryPath>) -> Result<&mut Vec<Category>> {
        match parent {
            Some(parent) => Ok(&mut self.category_mut(parent)?.sub_categories),
            None => Ok(&mut self.categories),
        }
    }

    /// Create an empty category at the top level or under `parent`
    pub fn add_category(
        &mut self,
        parent: Option<&CategoryPath>,
        name: &str,
    ) -> Result<CategoryPath> {
        let name = validate_category_name(name)?;
        let path = match parent {
            Some(parent) => parent.child(&name),
            None => CategoryPath::root(&name),
        };

        let siblings = self.siblings_mut(parent)?;
        if siblings.iter().any(|c| c.name == name) {
            return Err(CatalogError::DuplicateCategory(path.to_string()));
        }
        siblings.push(Category::new(name));

        debug!(category = %path, "added category");
        Ok(path)
    }

    /// Remove a category together with everything below it
    pub fn remove_category(&mut self, path: &CategoryPath) -> Result<Category> {
        let parent = path.parent();
        let siblings = self.siblings_mut(parent.as_ref())?;
        let index = siblings
            .iter()
            .position(|c| c.name == path.name())
            .ok_or_else(|| CatalogError::CategoryNotFound(path.to_string()))?;

        debug!(category = %path, "removed category");
        Ok(siblings.remove(index))
    }

    pub fn rename_category(&mut self, path: &CategoryPath, new_name: &str) -> Result<CategoryPath> {
        let new_name = validate_category_name(new_name)?;
        let parent = path.parent();
        let new_path = match &parent {
            Some(parent) => parent.child(&new_name),
            None => CategoryPath::root(&new_name),
        };

        if new_name == path.name() {
            self.category_mut(path)?;
            return Ok(new_path);
        }

        let siblings = self.siblings_mut(parent.as_ref())?;
        if siblings.iter().any(|c| c.name == new_name) {
            return Err(CatalogError::DuplicateCategory(new_path.to_string()));
        }
        let category = siblings
            .iter_mut()
            .find(|c| c.name == path.name())
            .ok_or_else(|| CatalogError::CategoryNotFound(path.to_string()))?;
        category.name = new_name;

        debug!(from = %path, to = %new_path, "renamed category");
        Ok(new_path)
    }

    /// Append a tool to a category, assigning the next free id
    pub fn add_tool(&mut self, category: &CategoryPath, patch: ToolPatch) -> Result<ToolId> {
        let mut tool = Tool {
            id: self.next_id()?,
            name: DEFAULT_TOOL_NAME.to_string(),
            mode: LaunchMode::Executable,
            ..Default::default()
        };
        patch.apply(&mut tool)?;

        let id = tool.id;
        self.category_mut(category)?.tools.push(tool);

        debug!(id, category = %category, "added tool");
        Ok(id)
    }

    /// Locate a tool and the category holding it
    pub fn find_tool(&self, id: ToolId) -> Option<(&Tool, CategoryPath)> {
        find_tool_in(&self.categories, id, &mut Vec::new())
    }

    pub fn update_tool(&mut self, id: ToolId, patch: ToolPatch) -> Result<&Tool> {
        let tool = find_tool_mut(&mut self.categories, id).ok_or(CatalogError::ToolNotFound(id))?;
        patch.apply(tool)?;
        debug!(id, "updated tool");
        Ok(tool)
    }

    pub fn remove_tool(&mut self, id: ToolId) -> Result<Tool> {
        let (tool, path) = take_tool(&mut self.categories, id, &mut Vec::new())
            .ok_or(CatalogError::ToolNotFound(id))?;
        debug!(id, category = %path, "removed tool");
        Ok(tool)
    }

    /// Move a tool to the end of another category
    pub fn move_tool(&mut self, id: ToolId, destination: &CategoryPath) -> Result<()> {
        if self.category(destination).is_none() {
            return Err(CatalogError::CategoryNotFound(destination.to_string()));
        }
        let tool = self.remove_tool(id)?;
        self.category_mut(destination)?.tools.push(tool);
        Ok(())
    }
}

/// Number of tools in a category and all of its subcategories
pub fn count_tools(category: &Category) -> usize {
    category.tools.len()
        + category
            .sub_categories
            .iter()
            .map(count_tools)
            .sum::<usize>()
}

fn collect_tools<'a>(categories: &'a [Category], out: &mut Vec<&'a Tool>) {
    for category in categories {
        out.extend(category.tools.iter());
        collect_tools(&category.sub_categories, out);
    }
}

/// Tools are found by id in the tree itself, never through their category
/// path: tools.json may hold sibling categories with the same name.
fn find_tool_in<'a>(
    categories: &'a [Category],
    id: ToolId,
    prefix: &mut Vec<String>,
) -> Option<(&'a Tool, CategoryPath)> {
    for category in categories {
        prefix.push(category.name.clone());
        if let Some(tool) = category.tools.iter().find(|t| t.id == id) {
            return Some((tool, CategoryPath(prefix.clone())));
        }
        if let Some(found) = find_tool_in(&category.sub_categories, id, prefix) {
            return Some(found);
        }
        prefix.pop();
    }
    None
}

fn find_tool_mut(categories: &mut [Category], id: ToolId) -> Option<&mut Tool> {
    for category in categories {
        if let Some(index) = category.tools.iter().position(|t| t.id == id) {
            return category.tools.get_mut(index);
        }
        if let Some(tool) = find_tool_mut(&mut category.sub_categories, id) {
            return Some(tool);
        }
    }
    None
}

fn take_tool(
    categories: &mut [Category],
    id: ToolId,
    prefix: &mut Vec<String>,
) -> Option<(Tool, CategoryPath)> {
    for category in categories {
        prefix.push(category.name.clone());
        if let Some(index) = category.tools.iter().position(|t| t.id == id) {
            return Some((category.tools.remove(index), CategoryPath(prefix.clone())));
        }
        if let Some(found) = take_tool(&mut category.sub_categories, id, prefix) {
            return Some(found);
        }
        prefix.pop();
    }
    None
}

/// `Commond` holds `;`-separated commands; newlines are accepted as separators
fn join_command_lines(commands: &str) -> String {
    if !commands.contains(['\n', '\r']) {
        return commands.to_string();
    }
    commands
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

/// Where [`Catalog::save`] keeps the file it replaces: `tools.json.bak`
pub fn previous_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

fn validate_category_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyName);
    }
    if name.contains('/') {
        return Err(CatalogError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}
