//! End-to-end dispatch through the built binary.
//!
//! Every test points PRYBAR_HOME at its own temp directory, so tests are
//! independent and never touch the real ~/.prybar.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GREET_PACKAGE: &str = r#"
[package]
name = "greet-tools"

[[command]]
names = ["greet run"]
about = "Print a greeting from an extension"
program = "echo"
args = ["hello from extension"]

[[command.flag]]
names = ["--port", "-p"]
takes_value = true
help = "Port to greet on"
"#;

fn prybar(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_prybar"));
    cmd.env("PRYBAR_HOME", home.path());
    cmd
}

fn home() -> TempDir {
    TempDir::new().expect("create temp home")
}

fn install_greet_package(home: &TempDir) {
    let extensions = home.path().join("extensions");
    fs::create_dir_all(&extensions).expect("create extensions dir");
    fs::write(extensions.join("greet.toml"), GREET_PACKAGE).expect("write package");
}

#[test]
fn test_version_prints_the_tool_version() {
    let home = home();
    prybar(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("prybar"));
}

#[test]
fn test_no_arguments_prints_usage() {
    let home = home();
    prybar(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("extension install"))
        .stdout(predicate::str::contains("--base"));
}

#[test]
fn test_help_flag_without_a_command_prints_usage() {
    let home = home();
    prybar(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: prybar"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_help_command_prints_usage() {
    let home = home();
    prybar(&home)
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extension uninstall"));
}

#[test]
fn test_unknown_command_fails_with_usage_hint() {
    let home = home();
    prybar(&home)
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown command 'frobnicate'"))
        .stderr(predicate::str::contains("prybar help"));
}

#[test]
fn test_flags_before_the_command_are_reordered() {
    let home = home();
    prybar(&home)
        .args(["--quiet", "extension", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No extension packages installed"));
}

#[test]
fn test_install_then_dispatch_declared_command() {
    let staging = home();
    let home = home();
    let package = staging.path().join("greet.toml");
    fs::write(&package, GREET_PACKAGE).expect("write package");

    prybar(&home)
        .args(["extension", "install"])
        .arg(&package)
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed"));

    prybar(&home)
        .args(["extension", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greet-tools"))
        .stdout(predicate::str::contains("greet run"));

    prybar(&home)
        .args(["greet", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from extension"));
}

#[test]
fn test_install_rejects_a_broken_package() {
    let staging = home();
    let home = home();
    let package = staging.path().join("broken.toml");
    fs::write(&package, "[[command]]\nabout = \"nameless\"\n").expect("write package");

    prybar(&home)
        .args(["extension", "install"])
        .arg(&package)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid extension package"));
}

#[test]
fn test_dangling_valued_flag_is_rejected_by_the_binder() {
    let home = home();
    install_greet_package(&home);

    prybar(&home)
        .args(["greet", "run", "--port"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("expects a value"));
}

#[test]
fn test_declared_flag_interleaved_with_command_words() {
    let home = home();
    install_greet_package(&home);

    // Valued flag and its value sort to the tail; command words collapse.
    prybar(&home)
        .args(["--port", "8080", "greet", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from extension"));
}

#[test]
fn test_metadata_less_package_aborts_every_dispatch() {
    let home = home();
    let extensions = home.path().join("extensions");
    fs::create_dir_all(&extensions).expect("create extensions dir");
    fs::write(
        extensions.join("bad.toml"),
        "[[command]]\nprogram = \"echo\"\n",
    )
    .expect("write package");

    prybar(&home)
        .arg("version")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("declares no command names"));
}

#[test]
fn test_unparseable_package_is_skipped_with_a_warning() {
    let home = home();
    let extensions = home.path().join("extensions");
    fs::create_dir_all(&extensions).expect("create extensions dir");
    fs::write(extensions.join("mangled.toml"), "not toml [").expect("write package");

    prybar(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("prybar"));
}

#[test]
fn test_uninstall_removes_an_installed_package() {
    let home = home();
    install_greet_package(&home);

    prybar(&home)
        .args(["extension", "uninstall", "greet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    prybar(&home)
        .args(["extension", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No extension packages installed"));
}

#[test]
fn test_uninstall_unknown_package_fails() {
    let home = home();
    prybar(&home)
        .args(["extension", "uninstall", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no extension package named 'nope'"));
}

#[test]
fn test_failing_declared_command_forwards_its_exit_code() {
    let home = home();
    let extensions = home.path().join("extensions");
    fs::create_dir_all(&extensions).expect("create extensions dir");
    fs::write(
        extensions.join("sad.toml"),
        "[[command]]\nnames = [\"sad run\"]\nprogram = \"false\"\n",
    )
    .expect("write package");

    prybar(&home)
        .args(["sad", "run"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed"));
}

#[test]
fn test_command_help_lists_its_flags() {
    let home = home();
    install_greet_package(&home);

    prybar(&home)
        .args(["greet", "run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--quiet"));
}

#[test]
fn test_extension_list_json_output() {
    let home = home();
    install_greet_package(&home);

    prybar(&home)
        .args(["extension", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"package\""))
        .stdout(predicate::str::contains("greet-tools"));
}
