use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn toolbench(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("toolbench").unwrap();
    cmd.arg("--home").arg(home).env_remove("TOOLBENCH_LOG");
    cmd
}

fn write_settings(home: &Path, json: &str) {
    fs::create_dir_all(home).unwrap();
    fs::write(home.join("settings.json"), json).unwrap();
}

/// A home with Web/Scanners holding one command-mode tool (#1)
fn seeded_home(home: &Path) {
    write_settings(home, r#"{ "terminal": ["sh", "-c"] }"#);

    toolbench(home).args(["category", "add", "Web"]).assert().success();
    toolbench(home)
        .args(["category", "add", "Web/Scanners"])
        .assert()
        .success();
    toolbench(home)
        .args([
            "tool",
            "add",
            "Web/Scanners",
            "--name",
            "nmap",
            "--description",
            "Network mapper",
            "--mode",
            "cmd",
            "--path",
        ])
        .arg(home)
        .args(["--commands", "nmap -h;nmap -sV localhost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 nmap in Web/Scanners"));
}

#[test]
fn tree_on_empty_home_shows_hint() {
    let dir = tempdir().unwrap();
    toolbench(dir.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("No categories yet"));
}

#[test]
fn catalog_is_written_with_legacy_keys() {
    let dir = tempdir().unwrap();
    seeded_home(dir.path());

    let raw = fs::read_to_string(dir.path().join("tools.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let tool = &json["categories"][0]["SubCategories"][0]["Tools"][0];
    assert_eq!(tool["Id"], 1);
    assert_eq!(tool["Name"], "nmap");
    assert_eq!(tool["Cmd"], 0);
    assert_eq!(tool["Commond"], "nmap -h;nmap -sV localhost");
}

#[test]
fn tree_search_and_show() {
    let dir = tempdir().unwrap();
    seeded_home(dir.path());

    let tree = toolbench(dir.path()).arg("tree").assert().success();
    let out = String::from_utf8(tree.get_output().stdout.clone()).unwrap();
    let web = out.find("Web").unwrap();
    let scanners = out.find("Scanners").unwrap();
    let nmap = out.find("nmap").unwrap();
    assert!(web < scanners && scanners < nmap, "unexpected tree:\n{out}");

    toolbench(dir.path())
        .args(["search", "NMAP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 match(es)"));

    toolbench(dir.path())
        .args(["search", "burp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tools match 'burp'"));

    toolbench(dir.path())
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category: Web/Scanners"))
        .stdout(predicate::str::contains("nmap -sV localhost"));
}

#[test]
fn run_dry_run_picks_command() {
    let dir = tempdir().unwrap();
    seeded_home(dir.path());

    toolbench(dir.path())
        .args(["run", "1", "--dry-run", "--pick", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN]"))
        .stdout(predicate::str::contains("\"nmap -sV localhost\""));

    toolbench(dir.path())
        .args(["run", "1", "--dry-run", "--pick", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("command #3 does not exist"));
}

#[cfg(unix)]
#[test]
fn run_wait_reports_exit_status() {
    let dir = tempdir().unwrap();
    seeded_home(dir.path());

    toolbench(dir.path())
        .args(["run", "1", "--wait", "--command", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started:"));

    toolbench(dir.path())
        .args(["run", "1", "--wait", "--command", "exit 3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exited with"));
}

#[test]
fn missing_tool_is_an_error() {
    let dir = tempdir().unwrap();
    seeded_home(dir.path());

    toolbench(dir.path())
        .args(["show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool #42 not found"));
}

#[test]
fn tool_edit_move_and_remove() {
    let dir = tempdir().unwrap();
    seeded_home(dir.path());

    toolbench(dir.path())
        .args(["category", "add", "Misc"])
        .assert()
        .success();
    toolbench(dir.path())
        .args(["tool", "edit", "1", "--name", "nmap7"])
        .assert()
        .success();
    toolbench(dir.path())
        .args(["tool", "move", "1", "Misc"])
        .assert()
        .success();
    toolbench(dir.path())
        .args(["ls", "Misc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nmap7"));

    toolbench(dir.path())
        .args(["tool", "remove", "1", "--yes"])
        .assert()
        .success();
    toolbench(dir.path())
        .args(["ls", "Misc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Misc is empty"));
}

#[test]
fn invalid_mode_is_rejected_by_the_parser() {
    let dir = tempdir().unwrap();
    toolbench(dir.path())
        .args(["tool", "add", "Web", "--mode", "shell"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected cmd or exe"));
}

#[test]
fn notes_lifecycle() {
    let dir = tempdir().unwrap();

    toolbench(dir.path())
        .args(["notes", "new", "Recon"])
        .assert()
        .success();
    assert!(dir.path().join("Notebooks").join("Recon.rtf").is_file());

    toolbench(dir.path())
        .args(["notes", "new", "Recon"])
        .assert()
        .failure();

    toolbench(dir.path())
        .args(["notes", "write", "Recon"])
        .write_stdin("hosts: 10.0.0.0/24\n{scope} café")
        .assert()
        .success();

    toolbench(dir.path())
        .args(["notes", "show", "Recon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hosts: 10.0.0.0/24\n{scope} café"));

    toolbench(dir.path())
        .args(["notes", "show", "Recon", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\\rtf1"))
        .stdout(predicate::str::contains("\\{scope\\}"));

    toolbench(dir.path())
        .args(["notes", "rename", "Recon", "Targets"])
        .assert()
        .success();

    toolbench(dir.path())
        .args(["notes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Targets"))
        .stdout(predicate::str::contains("1 note(s)"));

    toolbench(dir.path())
        .args(["notes", "delete", "Targets", "--yes"])
        .assert()
        .success();
    assert!(!dir.path().join("Notebooks").join("Targets.rtf").exists());
}

#[test]
fn note_names_with_path_characters_are_rejected() {
    let dir = tempdir().unwrap();
    toolbench(dir.path())
        .args(["notes", "new", "../escape"])
        .assert()
        .failure();
    assert!(!dir.path().join("escape.rtf").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn notes_edit_runs_configured_editor() {
    let dir = tempdir().unwrap();
    write_settings(dir.path(), r#"{ "editor": "sed -i s/draft/final/" }"#);

    toolbench(dir.path())
        .args(["notes", "new", "plan"])
        .assert()
        .success();
    toolbench(dir.path())
        .args(["notes", "write", "plan"])
        .write_stdin("draft")
        .assert()
        .success();
    toolbench(dir.path())
        .args(["notes", "edit", "plan"])
        .assert()
        .success();

    toolbench(dir.path())
        .args(["notes", "show", "plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("final"));
}

#[test]
fn commands_given_on_separate_lines_are_stored_with_semicolons() {
    let dir = tempdir().unwrap();
    seeded_home(dir.path());

    toolbench(dir.path())
        .args(["tool", "edit", "1", "--commands", "nmap -h\nnmap -p- localhost\n"])
        .assert()
        .success();

    let raw = fs::read_to_string(dir.path().join("tools.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let tool = &json["categories"][0]["SubCategories"][0]["Tools"][0];
    assert_eq!(tool["Commond"], "nmap -h;nmap -p- localhost");

    toolbench(dir.path())
        .args(["run", "1", "--dry-run", "--pick", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nmap -p- localhost\""));
}

#[test]
fn formatted_note_is_only_overwritten_with_force() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("Notebooks");
    fs::create_dir_all(&notes).unwrap();
    fs::write(notes.join("Report.rtf"), r"{\rtf1\ansi\pard\b findings\b0\par}").unwrap();

    toolbench(dir.path())
        .args(["notes", "write", "Report"])
        .write_stdin("plain")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert!(fs::read_to_string(notes.join("Report.rtf"))
        .unwrap()
        .contains("\\b findings"));

    toolbench(dir.path())
        .args(["notes", "write", "Report", "--force"])
        .write_stdin("plain")
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning:"));
    toolbench(dir.path())
        .args(["notes", "show", "Report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plain"));
}

#[test]
fn undo_reverts_and_redoes_the_last_change() {
    let dir = tempdir().unwrap();

    toolbench(dir.path())
        .args(["undo", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to undo"));

    seeded_home(dir.path());
    toolbench(dir.path())
        .args(["tool", "remove", "1", "--yes"])
        .assert()
        .success();

    toolbench(dir.path())
        .args(["undo", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reverted:"));
    toolbench(dir.path())
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nmap"));

    toolbench(dir.path())
        .args(["undo", "--yes"])
        .assert()
        .success();
    toolbench(dir.path())
        .args(["show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool #1 not found"));
}
