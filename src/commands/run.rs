//! Run and open commands - start a tool or reveal its folder

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;

use super::utils::Home;
use toolbench::catalog::ToolId;
use toolbench::launch::{self, CommandChoice};

/// Options for the run command
pub struct RunOptions {
    /// Free-text command line (command-mode tools)
    pub command: Option<String>,
    /// 1-based index into the tool's command list
    pub pick: Option<usize>,
    /// Print the process instead of starting it
    pub dry_run: bool,
    /// Wait for the process and fail on a non-zero exit
    pub wait: bool,
}

impl RunOptions {
    fn choice(&self) -> CommandChoice {
        match (&self.command, self.pick) {
            (Some(text), _) => CommandChoice::Text(text.clone()),
            (None, Some(index)) => CommandChoice::Index(index),
            (None, None) => CommandChoice::First,
        }
    }
}

/// Execute the run command
pub fn execute(home: &Home, id: ToolId, options: &RunOptions) -> Result<()> {
    let catalog = home.load_catalog()?;
    let settings = home.settings()?;

    let Some((tool, _)) = catalog.find_tool(id) else {
        bail!("Tool #{} not found", id);
    };

    let command = launch::plan(tool, &options.choice(), &settings)
        .with_context(|| format!("Cannot start '{}'", tool.name))?;

    if options.dry_run {
        println!("{} {}", "[DRY-RUN]".blue(), launch::describe(&command));
        return Ok(());
    }

    let mut child = launch::spawn(command)?;
    println!("{} {} (pid {})", "Started:".green(), tool.name, child.id());

    if options.wait {
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for '{}'", tool.name))?;
        if !status.success() {
            bail!("'{}' exited with {}", tool.name, status);
        }
    }

    Ok(())
}

/// Execute the open command
pub fn open(home: &Home, id: ToolId, dry_run: bool) -> Result<()> {
    let catalog = home.load_catalog()?;
    let settings = home.settings()?;

    let Some((tool, _)) = catalog.find_tool(id) else {
        bail!("Tool #{} not found", id);
    };

    let command = launch::plan_open_folder(tool, &settings)
        .with_context(|| format!("Cannot open the folder of '{}'", tool.name))?;

    if dry_run {
        println!("{} {}", "[DRY-RUN]".blue(), launch::describe(&command));
        return Ok(());
    }

    launch::spawn(command)?;
    println!("{} {}", "Opened:".green(), tool.tool_path);
    Ok(())
}
