//! The monitor's command set and the session that ties it to a machine.

use std::path::Path;

use minicomp_core::{
    to_domain, AccessError, Machine, MachineError, Processor, FLAG_C, FLAG_N, FLAG_Z,
};

use crate::config::MonitorConfig;
use crate::convert::{file_accessible, int_value, substitute_pc};
use crate::dispatcher::{CommandDispatcher, Effect, Reply};
use crate::errors::{InternalFault, RuleError};
use crate::pipeline::{Env, ParamSpec, Rules};
use crate::render::{self, CellFormat};

const NOT_A_NUMBER: &str = "E: not a number";
const MISSING_ARGUMENT: &str = "E: missing argument";
const MISSING_ADDRESS: &str = "E: missing address";
const MISSING_FILENAME: &str = "E: missing filename";
const IMPOSSIBLE_ADDRESS: &str = "E: impossible address";
const IMPOSSIBLE_VALUE: &str = "E: impossible value";
const CANNOT_READ_FILE: &str = "E: cannot read file";
const FIRMWARE_TOO_LARGE: &str = "E: firmware too large";
const UNKNOWN_VALUE: &str = "E: unknown value";

/// State the command handlers operate on.
#[derive(Debug)]
pub struct Monitor {
    /// Machine under inspection.
    pub machine: Machine,
}

/// A dispatcher with the full command set bound to one machine.
pub struct Session {
    dispatcher: CommandDispatcher<Monitor>,
    monitor: Monitor,
}

impl Session {
    /// Registers every command and takes ownership of `machine`.
    ///
    /// # Errors
    ///
    /// [`InternalFault::Rule`] when a command declaration is malformed.
    pub fn new(config: MonitorConfig, machine: Machine) -> Result<Self, InternalFault> {
        let mut dispatcher = CommandDispatcher::new(config.history_capacity, config.script_depth);
        register_commands(&mut dispatcher, &config)?;
        Ok(Self {
            dispatcher,
            monitor: Monitor { machine },
        })
    }

    /// Processes one operator line.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::execute`].
    pub fn execute(&mut self, line: &str) -> Result<Reply, InternalFault> {
        self.dispatcher.execute(&mut self.monitor, line)
    }

    /// Runs `lines` in script mode.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::run_script`].
    pub fn run_script(&mut self, lines: Vec<String>) -> Result<Reply, InternalFault> {
        self.dispatcher.run_script(&mut self.monitor, lines)
    }

    /// Machine under inspection.
    #[must_use]
    pub const fn machine(&self) -> &Machine {
        &self.monitor.machine
    }

    /// Command table and history.
    #[must_use]
    pub const fn dispatcher(&self) -> &CommandDispatcher<Monitor> {
        &self.dispatcher
    }

    /// Command table and history, for cursor navigation.
    pub const fn dispatcher_mut(&mut self) -> &mut CommandDispatcher<Monitor> {
        &mut self.dispatcher
    }
}

/// Registers the monitor commands on `dispatcher`.
///
/// # Errors
///
/// The first [`RuleError`] among the declarations.
pub fn register_commands(
    dispatcher: &mut CommandDispatcher<Monitor>,
    config: &MonitorConfig,
) -> Result<(), RuleError> {
    let limit = config.step_limit;
    dispatcher.register(
        "step",
        "Execute one (default) or more instructions",
        Rules::new(vec![ParamSpec::optional("numstep", 1_i64)])
            .transform("numstep", |_, v| int_value(v), "E: invalid number of steps")
            .check(
                "numstep",
                move |env| env.int("numstep").is_some_and(|n| n < limit),
                "E: too many steps",
            )
            .check(
                "numstep",
                |env| env.int("numstep").is_some_and(|n| n > 0),
                "E: cannot make less than one step",
            ),
        step,
    )?;
    dispatcher.register(
        "read",
        "Read memory from /addr/",
        address_rules(vec![ParamSpec::required("addr")], MISSING_ADDRESS).invariant(
            "addr",
            |env| in_domain(env, "addr"),
            "IE: address escaped validation",
        ),
        read,
    )?;
    dispatcher.register(
        "write",
        "Write to /addr/ a /value/",
        address_rules(
            vec![ParamSpec::required("addr"), ParamSpec::required("val")],
            MISSING_ARGUMENT,
        )
        .transform("val", |_, v| int_value(v), NOT_A_NUMBER)
        .check("val", |env| is_byte(env, "val"), IMPOSSIBLE_VALUE),
        write,
    )?;
    dispatcher.register(
        "dump",
        "Dump memory from /lo/ to /hi/ /as hex/ or /as ascii/",
        Rules::new(vec![
            ParamSpec::required("lo"),
            ParamSpec::required("hi"),
            ParamSpec::optional("mod1", "as"),
            ParamSpec::optional("mod2", "hex"),
        ])
        .require("E: not enough arguments")
        .transform(
            "lo",
            |m: &Monitor, v| Ok(substitute_pc(m.machine.pc(), v)),
            "IE: should never result in error",
        )
        .transform(
            "hi",
            |m: &Monitor, v| Ok(substitute_pc(m.machine.pc(), v)),
            "IE: should never result in error",
        )
        .transform("lo", |_, v| int_value(v), NOT_A_NUMBER)
        .transform("hi", |_, v| int_value(v), NOT_A_NUMBER)
        .check("lo", |env| in_domain(env, "lo"), "E: impossible loaddr")
        .check("hi", |env| in_domain(env, "hi"), "E: impossible hiaddr")
        .check(
            "hi",
            |env| env.int("lo") <= env.int("hi"),
            "E: loaddr > hiaddr",
        ),
        dump,
    )?;
    dispatcher.register(
        "ctxt",
        "Show memory surrounding /addr/ /as hex/ or /as ascii/",
        address_rules(
            vec![
                ParamSpec::required("addr"),
                ParamSpec::optional("mod1", "as"),
                ParamSpec::optional("mod2", "hex"),
            ],
            MISSING_ADDRESS,
        ),
        ctxt,
    )?;
    dispatcher.register(
        "signed",
        "Convert hex /value/ to signed byte",
        Rules::new(vec![ParamSpec::required("val")])
            .require(MISSING_ARGUMENT)
            .transform("val", |_, v| int_value(v), NOT_A_NUMBER)
            .check("val", |env| is_byte(env, "val"), IMPOSSIBLE_VALUE),
        signed,
    )?;
    dispatcher.register(
        "ascii",
        "Display ASCII, dec, hex, oct and bin data about /val/",
        Rules::new(vec![ParamSpec::required("val")]).require(MISSING_ARGUMENT),
        ascii,
    )?;
    dispatcher.register_verbatim(
        "addinpt",
        "Add everything that follows verbatim to keyboard device",
        Rules::new(vec![ParamSpec::optional("text", "")]),
        addinpt,
    )?;
    dispatcher.register(
        "showkbd",
        "Show keyboard buffer",
        Rules::new(Vec::new()).variadic(),
        showkbd,
    )?;
    dispatcher.register(
        "clrkbd",
        "Clean keyboard buffer",
        Rules::new(Vec::new()).variadic(),
        clrkbd,
    )?;
    dispatcher.register(
        "exefile",
        "Execute commands from /file/",
        file_rules(),
        exefile,
    )?;
    dispatcher.register(
        "reload",
        "Reload ROM from /file/ and reset CPU",
        file_rules(),
        reload,
    )?;
    dispatcher.register(
        "reset",
        "Reset the computer",
        Rules::new(Vec::new()).variadic(),
        reset,
    )?;
    dispatcher.register(
        "patch",
        "Update ROM from /file/ without resetting CPU state",
        file_rules(),
        patch,
    )?;
    dispatcher.register(
        "regs",
        "Show processor registers and cycle count",
        Rules::new(Vec::new()).variadic(),
        regs,
    )?;
    dispatcher.register(
        "help",
        "Show help for /command/",
        Rules::new(vec![ParamSpec::optional("command", "")]).variadic(),
        help,
    )
}

fn in_domain(env: &Env, name: &str) -> bool {
    env.int(name).and_then(to_domain).is_some()
}

fn is_byte(env: &Env, name: &str) -> bool {
    env.int(name).is_some_and(|v| (0..=0xff).contains(&v))
}

/// `addr` first; pc substitution, conversion and a domain check.
fn address_rules(params: Vec<ParamSpec>, missing: &'static str) -> Rules<Monitor> {
    Rules::new(params)
        .require(missing)
        .transform(
            "addr",
            |m: &Monitor, v| Ok(substitute_pc(m.machine.pc(), v)),
            "IE: cannot have an error at this point",
        )
        .transform("addr", |_, v| int_value(v), NOT_A_NUMBER)
        .check("addr", |env| in_domain(env, "addr"), IMPOSSIBLE_ADDRESS)
}

fn file_rules() -> Rules<Monitor> {
    Rules::new(vec![ParamSpec::required("fname")])
        .require(MISSING_FILENAME)
        .check(
            "fname",
            |env| env.text("fname").is_some_and(|f| file_accessible(Path::new(f))),
            CANNOT_READ_FILE,
        )
}

fn byte(env: &Env, name: &'static str) -> Result<u8, InternalFault> {
    u8::try_from(env.require_int(name)?).map_err(|_| InternalFault::MissingValue(name))
}

fn text(text: impl Into<String>) -> Effect {
    Effect::Reply(Reply::text(text))
}

fn step(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let count = env.require_int("numstep")?;
    let outcome = (1..=count).try_for_each(|index| monitor.machine.step(index == count).map(drop));
    let mut output = monitor.machine.take_screen_output();
    if let Err(fault) = outcome {
        log::debug!("step stopped: {fault}");
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output = format!("{output}E: {fault}");
    }
    Ok(text(output))
}

fn read(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let addr = env.require_address("addr")?;
    match monitor.machine.space_mut().read(addr) {
        Ok(value) => Ok(text(format!("{value:02x}"))),
        Err(_) => Ok(text(render::NOT_MAPPED_CELL)),
    }
}

fn write(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let addr = env.require_address("addr")?;
    let value = byte(env, "val")?;
    match monitor.machine.space_mut().write(addr, value, true) {
        Ok(()) => Ok(text(monitor.machine.take_screen_output())),
        Err(AccessError::ReadOnly { .. }) => Ok(text("E: cannot write to ROM")),
        Err(AccessError::NotMapped { .. }) => Ok(text("E: address not mapped")),
    }
}

fn cell_format(env: &Env) -> Result<CellFormat, InternalFault> {
    Ok(CellFormat::from_modifiers(
        env.require_text("mod1")?,
        env.require_text("mod2")?,
    ))
}

fn dump(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let lo = env.require_address("lo")?;
    let hi = env.require_address("hi")?;
    let table = render::dump(monitor.machine.space(), lo, hi, cell_format(env)?)?;
    Ok(Effect::Reply(Reply::Table(table)))
}

fn ctxt(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let addr = env.require_address("addr")?;
    let table = render::context(monitor.machine.space(), addr, cell_format(env)?);
    Ok(Effect::Reply(Reply::Table(table)))
}

fn signed(_: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let value = i8::from_ne_bytes([byte(env, "val")?]);
    Ok(text(value.to_string()))
}

/// Character code named by a decimal (below 127), a single character, or
/// `0x` followed by two hex digits.
fn ascii_code(value: &str) -> Option<u8> {
    if !value.is_empty() && value.len() <= 3 && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse::<u8>().ok().filter(|code| *code < 127);
    }
    let mut chars = value.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return u8::try_from(c).ok().filter(u8::is_ascii);
    }
    let digits = value.strip_prefix("0x")?;
    if digits.len() == 2 {
        u8::from_str_radix(digits, 16).ok()
    } else {
        None
    }
}

fn ascii(_: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let Some(code) = ascii_code(env.require_text("val")?) else {
        return Ok(text(UNKNOWN_VALUE));
    };
    Ok(text(format!(
        "{} {code} {code:#x} {code:#o} {code:#b}",
        char::from(code)
    )))
}

fn addinpt(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let input = env.require_text("text")?.replace("\\n", "\n");
    monitor.machine.keyboard_mut().extend(&input);
    Ok(Effect::Reply(Reply::Empty))
}

#[allow(clippy::unnecessary_wraps)]
fn showkbd(monitor: &mut Monitor, _: &Env) -> Result<Effect, InternalFault> {
    let pending = monitor.machine.keyboard().pending().map(char::from).collect::<String>();
    Ok(text(pending))
}

#[allow(clippy::unnecessary_wraps)]
fn clrkbd(monitor: &mut Monitor, _: &Env) -> Result<Effect, InternalFault> {
    monitor.machine.keyboard_mut().clear();
    Ok(Effect::Reply(Reply::Empty))
}

fn exefile(_: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    match std::fs::read_to_string(env.require_text("fname")?) {
        Ok(script) => Ok(Effect::RunScript(
            script.lines().map(str::to_owned).collect(),
        )),
        Err(err) => {
            log::debug!("script unreadable: {err}");
            Ok(text(CANNOT_READ_FILE))
        }
    }
}

fn firmware_error(err: MachineError) -> Result<Effect, InternalFault> {
    match err {
        MachineError::FirmwareTooLarge { .. } => Ok(text(FIRMWARE_TOO_LARGE)),
        other => Err(other.into()),
    }
}

fn reload(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let image = match std::fs::read(env.require_text("fname")?) {
        Ok(image) => image,
        Err(err) => {
            log::debug!("firmware unreadable: {err}");
            return Ok(text(CANNOT_READ_FILE));
        }
    };
    match monitor.machine.reload(image) {
        Ok(()) => Ok(Effect::Reply(Reply::Empty)),
        Err(err) => firmware_error(err),
    }
}

fn reset(monitor: &mut Monitor, _: &Env) -> Result<Effect, InternalFault> {
    monitor.machine.reset()?;
    Ok(Effect::Reply(Reply::Empty))
}

fn patch(monitor: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    let image = match std::fs::read(env.require_text("fname")?) {
        Ok(image) => image,
        Err(err) => {
            log::debug!("patch unreadable: {err}");
            return Ok(text(CANNOT_READ_FILE));
        }
    };
    match monitor.machine.patch(&image) {
        Ok(()) => Ok(Effect::Reply(Reply::Empty)),
        Err(err) => firmware_error(err),
    }
}

#[allow(clippy::unnecessary_wraps)]
fn regs(monitor: &mut Monitor, _: &Env) -> Result<Effect, InternalFault> {
    let processor = monitor.machine.processor();
    let regs = processor.registers();
    Ok(text(format!(
        "PC {:04x} SP {:02x} A {:02x} X {:02x} Y {:02x} N {} Z {} C {} cycles {}",
        regs.pc(),
        regs.sp(),
        regs.a(),
        regs.x(),
        regs.y(),
        u8::from(regs.flag_is_set(FLAG_N)),
        u8::from(regs.flag_is_set(FLAG_Z)),
        u8::from(regs.flag_is_set(FLAG_C)),
        processor.cycles(),
    )))
}

fn help(_: &mut Monitor, env: &Env) -> Result<Effect, InternalFault> {
    Ok(Effect::Help(env.require_text("command")?.to_owned()))
}
