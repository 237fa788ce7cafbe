//! toolbench: launch your tools from a categorized catalog and keep notes
//! next to them.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use toolbench::catalog::view::GRID_COLUMNS;
use toolbench::catalog::{LaunchMode, ToolId, ToolPatch};

mod commands;

use commands::utils::Home;

/// Environment variable holding the log filter, e.g. `toolbench=debug`
const LOG_ENV: &str = "TOOLBENCH_LOG";

#[derive(Parser)]
#[command(name = "toolbench")]
#[command(about = "Launch tools from a categorized catalog and keep RTF notes", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory holding tools.json and Notebooks/ (default: TOOLBENCH_HOME or the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the whole catalog as a folder tree
    Tree,

    /// Show the contents of a category as cards (all tools if omitted)
    Ls {
        /// Category path, e.g. "Web/Scanners"
        category: Option<String>,

        /// Cards per row
        #[arg(long, default_value_t = GRID_COLUMNS, value_parser = parse_columns)]
        columns: usize,
    },

    /// Find tools whose name contains TEXT (case-insensitive)
    Search {
        text: String,

        /// Cards per row
        #[arg(long, default_value_t = GRID_COLUMNS, value_parser = parse_columns)]
        columns: usize,
    },

    /// Show the details of a tool
    Show {
        /// Tool id
        #[arg(allow_negative_numbers = true)]
        id: ToolId,
    },

    /// Start a tool
    Run {
        /// Tool id
        #[arg(allow_negative_numbers = true)]
        id: ToolId,

        /// Command line to run instead of the tool's saved commands
        #[arg(short, long, conflicts_with = "pick")]
        command: Option<String>,

        /// Run the Nth saved command (1-based)
        #[arg(short, long)]
        pick: Option<usize>,

        /// Show what would be started without starting it
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Wait for the process and fail if it exits with an error
        #[arg(short, long)]
        wait: bool,
    },

    /// Open a tool's folder in the file manager
    Open {
        /// Tool id
        #[arg(allow_negative_numbers = true)]
        id: ToolId,

        /// Show what would be started without starting it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Manage tools
    #[command(subcommand)]
    Tool(ToolCommand),

    /// Manage notes
    #[command(subcommand)]
    Notes(NotesCommand),

    /// Revert the catalog to how it was before the last change
    Undo {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// Create a category; "A/B" creates B inside the existing A
    Add { path: String },

    /// Delete a category with all its subfolders and tools
    Remove {
        path: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename a category in place
    Rename { path: String, new_name: String },
}

#[derive(Subcommand)]
enum ToolCommand {
    /// Add a tool to a category
    Add {
        /// Category path
        category: String,

        #[command(flatten)]
        fields: ToolFields,
    },

    /// Change fields of a tool
    Edit {
        /// Tool id
        #[arg(allow_negative_numbers = true)]
        id: ToolId,

        #[command(flatten)]
        fields: ToolFields,
    },

    /// Move a tool to another category
    Move {
        /// Tool id
        #[arg(allow_negative_numbers = true)]
        id: ToolId,

        /// Destination category path
        category: String,
    },

    /// Delete a tool
    Remove {
        /// Tool id
        #[arg(allow_negative_numbers = true)]
        id: ToolId,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct ToolFields {
    /// Display name
    #[arg(long)]
    name: Option<String>,

    /// Free-text description
    #[arg(long)]
    description: Option<String>,

    /// Launch mode: cmd or exe
    #[arg(long, value_parser = parse_mode)]
    mode: Option<LaunchMode>,

    /// Working folder of the tool
    #[arg(long, value_name = "DIR")]
    path: Option<String>,

    /// Executable file name, relative to --path (exe mode)
    #[arg(long, value_name = "FILE")]
    run: Option<String>,

    /// Command lines separated by ';' or newlines (cmd mode)
    #[arg(long)]
    commands: Option<String>,
}

impl From<ToolFields> for ToolPatch {
    fn from(fields: ToolFields) -> Self {
        ToolPatch {
            name: fields.name,
            description: fields.description,
            mode: fields.mode,
            tool_path: fields.path,
            run: fields.run,
            commands: fields.commands,
        }
    }
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List notes
    List,

    /// Create an empty note
    New { name: String },

    /// Print a note as plain text
    Show {
        name: String,

        /// Print the RTF source instead
        #[arg(long)]
        raw: bool,
    },

    /// Replace a note's text with stdin
    Write {
        name: String,

        /// Overwrite a note that has rich-text formatting
        #[arg(short, long)]
        force: bool,
    },

    /// Edit a note in $EDITOR (or the editor from settings.json)
    Edit {
        name: String,

        /// Edit a note that has rich-text formatting, dropping the formatting
        #[arg(short, long)]
        force: bool,
    },

    /// Rename a note
    Rename { name: String, new_name: String },

    /// Delete a note
    Delete {
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_mode(s: &str) -> Result<LaunchMode, String> {
    LaunchMode::parse(s).ok_or_else(|| format!("unknown mode '{}', expected cmd or exe", s))
}

fn parse_columns(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{}' is not a positive number", s)),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let home = Home::resolve(cli.home.as_deref())?;
    tracing::debug!(home = %home.dir.display(), "using data directory");

    match cli.command {
        Commands::Tree => {
            println!("{}", commands::browse::tree(&home)?);
        }

        Commands::Ls { category, columns } => {
            let output = commands::browse::list(&home, category.as_deref(), columns)?;
            println!("{}", output);
        }

        Commands::Search { text, columns } => {
            println!("{}", commands::browse::search(&home, &text, columns)?);
        }

        Commands::Show { id } => {
            println!("{}", commands::browse::show(&home, id)?);
        }

        Commands::Run {
            id,
            command,
            pick,
            dry_run,
            wait,
        } => {
            let options = commands::run::RunOptions {
                command,
                pick,
                dry_run,
                wait,
            };
            commands::run::execute(&home, id, &options)?;
        }

        Commands::Open { id, dry_run } => {
            commands::run::open(&home, id, dry_run)?;
        }

        Commands::Category(cmd) => match cmd {
            CategoryCommand::Add { path } => commands::category::add(&home, &path)?,
            CategoryCommand::Remove { path, yes } => commands::category::remove(&home, &path, yes)?,
            CategoryCommand::Rename { path, new_name } => {
                commands::category::rename(&home, &path, &new_name)?
            }
        },

        Commands::Tool(cmd) => match cmd {
            ToolCommand::Add { category, fields } => {
                commands::tool::add(&home, &category, fields.into())?;
            }
            ToolCommand::Edit { id, fields } => commands::tool::edit(&home, id, fields.into())?,
            ToolCommand::Move { id, category } => commands::tool::move_to(&home, id, &category)?,
            ToolCommand::Remove { id, yes } => commands::tool::remove(&home, id, yes)?,
        },

        Commands::Notes(cmd) => match cmd {
            NotesCommand::List => println!("{}", commands::notes::list(&home)?),
            NotesCommand::New { name } => commands::notes::create(&home, &name)?,
            NotesCommand::Show { name, raw } => {
                println!("{}", commands::notes::show(&home, &name, raw)?);
            }
            NotesCommand::Write { name, force } => commands::notes::write(&home, &name, force)?,
            NotesCommand::Edit { name, force } => commands::notes::edit(&home, &name, force)?,
            NotesCommand::Rename { name, new_name } => {
                commands::notes::rename(&home, &name, &new_name)?
            }
            NotesCommand::Delete { name, yes } => commands::notes::delete(&home, &name, yes)?,
        },

        Commands::Undo { yes } => {
            commands::undo::execute(&home, yes)?;
        }
    }

    Ok(())
}
