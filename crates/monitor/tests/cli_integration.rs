//! Integration tests for the minicomp CLI.

use crossterm as _;
use env_logger as _;
use log as _;
use minicomp_core as _;
use monitor as _;
use proptest as _;
use rstest as _;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use test_log as _;
use thiserror as _;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_minicomp"))
}

fn create_temp_file(dir: &std::path::Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_with_stdin(args: &[&str], input: &str) -> std::process::Output {
    let mut child = Command::new(binary_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run minicomp");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn help_flag_prints_usage() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run minicomp");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Usage: minicomp"));
}

#[test]
fn unknown_flag_fails() {
    let output = Command::new(binary_path())
        .arg("--fast")
        .output()
        .expect("failed to run minicomp");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown argument: --fast"));
}

#[test]
fn stdin_session_runs_the_echo_firmware() {
    let output = run_with_stdin(&[], "step 12\n\n; comment\nshowkbd\nfrobnicate\n");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Hel\nlo, World!!!\nE: Unknown command\n"
    );
}

#[test]
fn script_flag_runs_non_interactively() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script = create_temp_file(
        temp_dir.path(),
        "session.txt",
        b"read 0xe000\nwrite 0xe000 1\ndump 0 4\n",
    );

    let output = run_with_stdin(&["--script", script.to_str().unwrap()], "read 0\n");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "..>read 0xe000\nad\n..>write 0xe000 1\nE: cannot write to ROM\n..>dump 0 4\n0000  00 00 00 00\n"
    );
}

#[test]
fn rom_flag_loads_firmware() {
    let temp_dir = tempfile::tempdir().unwrap();
    // LDA #'k' ; STA $0400
    let rom = create_temp_file(temp_dir.path(), "ok.bin", &[0xA9, b'k', 0x8D, 0x00, 0x04]);

    let output = run_with_stdin(&["-r", rom.to_str().unwrap()], "step 2\nread 0xe001\n");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "k\n6b\n");
}

#[test]
fn missing_rom_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.bin");

    let output = run_with_stdin(&["--rom", missing.to_str().unwrap()], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn oversized_rom_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rom = create_temp_file(temp_dir.path(), "big.bin", &[0xEA; 0x2001]);

    let output = run_with_stdin(&["--rom", rom.to_str().unwrap()], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds rom capacity"));
}
