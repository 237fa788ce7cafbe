//! Starting tools as OS processes
//!
//! Launching is split into planning, which validates the tool and builds a
//! [`Command`], and spawning. Planning never touches the process table, so
//! `--dry-run` and the tests can inspect exactly what would run.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use thiserror::Error;
use tracing::info;

use crate::catalog::{LaunchMode, Tool};
use crate::config::Settings;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("tool '{0}' has no folder set")]
    MissingToolPath(String),

    #[error("no command given and tool '{0}' has no commands configured")]
    NoCommand(String),

    #[error("command #{index} does not exist (tool has {count})")]
    CommandOutOfRange { index: usize, count: usize },

    #[error("tool '{0}' has no executable set")]
    MissingExecutable(String),

    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("folder does not exist: {0}")]
    InvalidFolder(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

type Result<T> = std::result::Result<T, LaunchError>;

/// Which command line a command-mode tool should run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandChoice {
    /// The first configured command
    #[default]
    First,
    /// 1-based position in the tool's command list
    Index(usize),
    /// Free text typed by the user
    Text(String),
}

/// Build the process that starts `tool`
pub fn plan(tool: &Tool, choice: &CommandChoice, settings: &Settings) -> Result<Command> {
    if tool.tool_path.trim().is_empty() {
        return Err(LaunchError::MissingToolPath(tool.name.clone()));
    }
    let workdir = Path::new(&tool.tool_path);

    match tool.mode {
        LaunchMode::Command => {
            let text = resolve_command(tool, choice)?;
            let (program, prefix) = settings.terminal_command();

            let mut command = Command::new(&program);
            command.args(&prefix).current_dir(workdir);
            push_command_text(&mut command, &text);
            new_console(&mut command);
            Ok(command)
        }
        LaunchMode::Executable => {
            if tool.run.trim().is_empty() {
                return Err(LaunchError::MissingExecutable(tool.name.clone()));
            }

            let exe = workdir.join(&tool.run);
            if !exe.is_file() {
                return Err(LaunchError::ExecutableNotFound(exe.display().to_string()));
            }

            let mut command = if runs_directly(&exe) {
                Command::new(exe)
            } else {
                open_with_association(&exe, settings)
            };
            command.current_dir(workdir);
            Ok(command)
        }
    }
}

/// Build the process that reveals the tool's folder in the file manager
pub fn plan_open_folder(tool: &Tool, settings: &Settings) -> Result<Command> {
    let folder = PathBuf::from(&tool.tool_path);
    if tool.tool_path.trim().is_empty() || !folder.is_dir() {
        return Err(LaunchError::InvalidFolder(tool.tool_path.clone()));
    }

    let mut command = Command::new(settings.opener());
    command.arg(folder);
    Ok(command)
}

/// Start a planned process without waiting for it
pub fn spawn(mut command: Command) -> Result<Child> {
    let program = command.get_program().to_string_lossy().to_string();
    let child = command
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;

    info!(program = %program, pid = child.id(), "started process");
    Ok(child)
}

/// Human-readable form of a planned command, for dry runs
pub fn describe(command: &Command) -> String {
    let mut parts = vec![quote(command.get_program())];
    parts.extend(command.get_args().map(quote));

    let mut line = parts.join(" ");
    if let Some(dir) = command.get_current_dir() {
        line.push_str(&format!("  (in {})", dir.display()));
    }
    line
}

fn resolve_command(tool: &Tool, choice: &CommandChoice) -> Result<String> {
    let commands = tool.command_list();
    let text = match choice {
        CommandChoice::Text(text) => text.trim().to_string(),
        CommandChoice::First => commands.first().map(|c| c.to_string()).unwrap_or_default(),
        CommandChoice::Index(index) => commands
            .get(index.wrapping_sub(1))
            .map(|c| c.to_string())
            .ok_or(LaunchError::CommandOutOfRange {
                index: *index,
                count: commands.len(),
            })?,
    };

    if text.is_empty() {
        return Err(LaunchError::NoCommand(tool.name.clone()));
    }
    Ok(text)
}

/// cmd.exe parses its own command line, so the text goes through verbatim in quotes
#[cfg(windows)]
fn push_command_text(command: &mut Command, text: &str) {
    use std::os::windows::process::CommandExt;
    command.raw_arg(format!("\"{}\"", text));
}

#[cfg(not(windows))]
fn push_command_text(command: &mut Command, text: &str) {
    command.arg(text);
}

/// Programs the OS can start without a file association
#[cfg(windows)]
fn runs_directly(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            ["exe", "com", "bat", "cmd"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(unix)]
fn runs_directly(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(any(windows, unix)))]
fn runs_directly(_path: &Path) -> bool {
    true
}

/// Documents, shortcuts and scripts open with the program associated with them
#[cfg(windows)]
fn open_with_association(path: &Path, _settings: &Settings) -> Command {
    use std::os::windows::process::CommandExt;
    let mut command = Command::new("cmd");
    command
        .arg("/c")
        .raw_arg(format!("start \"\" \"{}\"", path.display()));
    command
}

#[cfg(not(windows))]
fn open_with_association(path: &Path, settings: &Settings) -> Command {
    let mut command = Command::new(settings.opener());
    command.arg(path);
    command
}

#[cfg(windows)]
fn new_console(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
    command.creation_flags(CREATE_NEW_CONSOLE);
}

#[cfg(not(windows))]
fn new_console(_command: &mut Command) {}

fn quote(arg: &OsStr) -> String {
    let s = arg.to_string_lossy();
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn settings() -> Settings {
        Settings {
            terminal: Some(vec!["sh".into(), "-c".into()]),
            opener: Some("xdg-open".into()),
            editor: None,
        }
    }

    fn command_tool(dir: &Path) -> Tool {
        Tool {
            id: 1,
            name: "sqlmap".into(),
            mode: LaunchMode::Command,
            tool_path: dir.display().to_string(),
            commands: "python sqlmap.py -h;python sqlmap.py --wizard".into(),
            ..Default::default()
        }
    }

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_missing_tool_path() {
        let tool = Tool {
            name: "x".into(),
            ..Default::default()
        };
        let err = plan(&tool, &CommandChoice::First, &settings()).unwrap_err();
        assert!(matches!(err, LaunchError::MissingToolPath(_)));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_command_mode_runs_first_command_in_folder() {
        let dir = tempdir().unwrap();
        let tool = command_tool(dir.path());

        let command = plan(&tool, &CommandChoice::First, &settings()).unwrap();
        assert_eq!(command.get_program(), "sh");
        assert_eq!(args(&command), vec!["-c", "python sqlmap.py -h"]);
        assert_eq!(command.get_current_dir(), Some(dir.path()));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_command_mode_pick_and_custom_text() {
        let dir = tempdir().unwrap();
        let tool = command_tool(dir.path());

        let picked = plan(&tool, &CommandChoice::Index(2), &settings()).unwrap();
        assert_eq!(args(&picked)[1], "python sqlmap.py --wizard");

        let custom = plan(&tool, &CommandChoice::Text("  ls -la ".into()), &settings()).unwrap();
        assert_eq!(args(&custom)[1], "ls -la");
    }

    #[test]
    fn test_command_mode_index_out_of_range() {
        let dir = tempdir().unwrap();
        let tool = command_tool(dir.path());

        for index in [0, 3] {
            let err = plan(&tool, &CommandChoice::Index(index), &settings()).unwrap_err();
            assert!(matches!(
                err,
                LaunchError::CommandOutOfRange { count: 2, .. }
            ));
        }
    }

    #[test]
    fn test_command_mode_requires_a_command() {
        let dir = tempdir().unwrap();
        let mut tool = command_tool(dir.path());
        tool.commands = " ; ".into();

        let err = plan(&tool, &CommandChoice::First, &settings()).unwrap_err();
        assert!(matches!(err, LaunchError::NoCommand(_)));

        let err = plan(&tool, &CommandChoice::Text("   ".into()), &settings()).unwrap_err();
        assert!(matches!(err, LaunchError::NoCommand(_)));
    }

    fn write_program(path: &Path) {
        fs::write(path, b"").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_executable_mode() {
        let dir = tempdir().unwrap();
        write_program(&dir.path().join("burp.exe"));

        let mut tool = Tool {
            name: "burp".into(),
            mode: LaunchMode::Executable,
            tool_path: dir.path().display().to_string(),
            ..Default::default()
        };

        let err = plan(&tool, &CommandChoice::First, &settings()).unwrap_err();
        assert!(matches!(err, LaunchError::MissingExecutable(_)));

        tool.run = "missing.exe".into();
        let err = plan(&tool, &CommandChoice::First, &settings()).unwrap_err();
        assert!(matches!(err, LaunchError::ExecutableNotFound(p) if p.ends_with("missing.exe")));

        tool.run = "burp.exe".into();
        let command = plan(&tool, &CommandChoice::First, &settings()).unwrap();
        assert_eq!(command.get_program(), dir.path().join("burp.exe").as_os_str());
        assert_eq!(command.get_current_dir(), Some(dir.path()));
        assert!(args(&command).is_empty());
    }

    #[test]
    fn test_executable_mode_opens_other_files_by_association() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("burpsuite.jar");
        fs::write(&target, b"").unwrap();

        let tool = Tool {
            name: "burp".into(),
            mode: LaunchMode::Executable,
            tool_path: dir.path().display().to_string(),
            run: "burpsuite.jar".into(),
            ..Default::default()
        };
        let command = plan(&tool, &CommandChoice::First, &settings()).unwrap();
        assert_eq!(command.get_current_dir(), Some(dir.path()));

        #[cfg(windows)]
        {
            assert_eq!(command.get_program(), "cmd");
        }
        #[cfg(not(windows))]
        {
            assert_eq!(command.get_program(), "xdg-open");
            assert_eq!(args(&command), vec![target.display().to_string()]);
        }
    }

    #[test]
    fn test_open_folder() {
        let dir = tempdir().unwrap();
        let mut tool = Tool {
            tool_path: dir.path().display().to_string(),
            ..Default::default()
        };

        let command = plan_open_folder(&tool, &settings()).unwrap();
        assert_eq!(command.get_program(), "xdg-open");
        assert_eq!(args(&command), vec![dir.path().display().to_string()]);

        tool.tool_path = dir.path().join("gone").display().to_string();
        assert!(matches!(
            plan_open_folder(&tool, &settings()),
            Err(LaunchError::InvalidFolder(_))
        ));

        tool.tool_path = String::new();
        assert!(plan_open_folder(&tool, &settings()).is_err());
    }

    #[test]
    fn test_describe_quotes_spaced_args() {
        let mut command = Command::new("sh");
        command.args(["-c", "nmap -h"]).current_dir("/opt/nmap");
        assert_eq!(describe(&command), "sh -c \"nmap -h\"  (in /opt/nmap)");
    }
}
