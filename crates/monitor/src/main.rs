//! CLI entry point for the minicomp monitor binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use crossterm::style::{style, Color, Stylize};
use minicomp_core::{Machine, MachineConfig, ECHO_FIRMWARE};
use monitor::dispatcher::SCRIPT_ECHO;
use monitor::{InternalFault, MemoryTable, MonitorConfig, Reply, Session};
use thiserror as _;
#[cfg(test)]
use {proptest as _, rstest as _, tempfile as _, test_log as _};

const USAGE_TEXT: &str = "\
Usage: minicomp [options]

Options:
  -r, --rom <file>     Firmware image loaded at 0xe000 (default: built-in echo loop)
  -s, --script <file>  Run monitor commands from <file> and exit
  -h, --help           Show this help message

Without --script, commands are read from standard input until EOF.
";

const PROMPT: &str = ">>> ";

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    rom: Option<PathBuf>,
    script: Option<PathBuf>,
}

#[derive(Debug)]
enum ParseResult {
    Run(Options),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--rom" || arg == "-r" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --rom".to_string())?;
            options.rom = Some(PathBuf::from(value));
            continue;
        }

        if arg == "--script" || arg == "-s" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --script".to_string())?;
            options.script = Some(PathBuf::from(value));
            continue;
        }

        return Err(format!("unknown argument: {}", arg.to_string_lossy()));
    }

    Ok(ParseResult::Run(options))
}

fn report_fault(fault: &InternalFault) -> i32 {
    eprintln!("{fault}");
    2
}

fn render_table(table: &MemoryTable) -> String {
    table
        .rows
        .iter()
        .map(|row| {
            let cells = row
                .cells
                .iter()
                .map(|cell| {
                    if cell.emphasis {
                        style(cell.text.as_str()).with(Color::Green).to_string()
                    } else {
                        cell.text.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}  {cells}", row.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain text unless `color` is set, in which case device cells are green.
fn render(reply: &Reply, color: bool) -> String {
    match reply {
        Reply::Table(table) if color => render_table(table),
        Reply::Script(entries) if color => entries
            .iter()
            .map(|entry| {
                if entry.reply.is_empty() {
                    format!("{SCRIPT_ECHO}{}", entry.line)
                } else {
                    format!("{SCRIPT_ECHO}{}\n{}", entry.line, render(&entry.reply, color))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn print_reply(reply: &Reply, color: bool) {
    if !reply.is_empty() {
        println!("{}", render(reply, color));
    }
}

fn repl(session: &mut Session, color: bool) -> Result<(), i32> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("{PROMPT}");
            stdout.flush().map_err(|e| {
                eprintln!("error: failed to flush stdout: {e}");
                1
            })?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| {
            eprintln!("error: failed to read stdin: {e}");
            1
        })?;
        let reply = session.execute(&line).map_err(|f| report_fault(&f))?;
        print_reply(&reply, color);
    }

    Ok(())
}

fn run(options: &Options) -> Result<(), i32> {
    let firmware = match &options.rom {
        Some(path) => fs::read(path).map_err(|e| {
            eprintln!("error: failed to read {}: {e}", path.display());
            1
        })?,
        None => ECHO_FIRMWARE.to_vec(),
    };
    let machine = Machine::boot(MachineConfig::default(), &firmware).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    let mut session =
        Session::new(MonitorConfig::default(), machine).map_err(|f| report_fault(&f))?;
    let color = io::stdout().is_terminal();

    if let Some(path) = &options.script {
        let script = fs::read_to_string(path).map_err(|e| {
            eprintln!("error: failed to read {}: {e}", path.display());
            1
        })?;
        log::debug!("running script {}", path.display());
        let reply = session
            .run_script(script.lines().map(str::to_owned).collect())
            .map_err(|f| report_fault(&f))?;
        print_reply(&reply, color);
        return Ok(());
    }

    repl(&mut session, color)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(options)) => match run(&options) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor::{MemoryRow, RenderCell, RowLabel, ScriptEntry};
    use std::ffi::OsString;

    fn os(args: &[&str]) -> impl Iterator<Item = OsString> {
        args.iter().map(OsString::from).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_rom_and_script() {
        let result = parse_args(os(&["--rom", "fw.bin", "-s", "run.txt"]))
            .expect("valid args should parse");
        let ParseResult::Run(options) = result else {
            panic!("expected run options");
        };
        assert_eq!(
            options,
            Options {
                rom: Some(PathBuf::from("fw.bin")),
                script: Some(PathBuf::from("run.txt")),
            }
        );
    }

    #[test]
    fn no_args_runs_with_defaults() {
        let result = parse_args(std::iter::empty()).expect("empty args should parse");
        assert!(matches!(result, ParseResult::Run(options) if options == Options::default()));
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os(&["-h"])).expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        let error = parse_args(os(&["--rom"])).expect_err("missing value should fail");
        assert!(error.contains("missing value for --rom"));
        let error = parse_args(os(&["--fast"])).expect_err("unknown flag should fail");
        assert!(error.contains("unknown argument"));
    }

    #[test]
    fn uncolored_render_matches_display() {
        let table = MemoryTable {
            rows: vec![MemoryRow {
                label: RowLabel::Address(0x0400),
                cells: vec![
                    RenderCell {
                        text: "00".to_owned(),
                        emphasis: true,
                    },
                    RenderCell {
                        text: " H".to_owned(),
                        emphasis: false,
                    },
                ],
            }],
        };
        let reply = Reply::Table(table.clone());
        assert_eq!(render(&reply, false), "0400  00  H");
        assert_eq!(render_table(&table).lines().count(), 1);
        assert!(render(&reply, true).contains(" H"));
    }

    #[test]
    fn colored_script_keeps_echo_lines() {
        let reply = Reply::Script(vec![
            ScriptEntry {
                line: "; hi".to_owned(),
                reply: Reply::Empty,
            },
            ScriptEntry {
                line: "read 0".to_owned(),
                reply: Reply::text("00"),
            },
        ]);
        assert_eq!(render(&reply, true), "..>; hi\n..>read 0\n00");
    }
}
