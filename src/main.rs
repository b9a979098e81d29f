//! Terminal front end for the CHIP-8 virtual machine.
//!
//! ```bash
//! chip8vm roms/ibm-logo.ch8 --clock-speed 500
//! ```
//!
//! Keys `1234 qwer asdf zxcv` map onto the hex keypad, Escape quits. Set
//! `RUST_LOG=debug` (and redirect stderr) to see what the machine is doing.

use std::{fs, path::PathBuf};

use anyhow::Context;
use chip8vm_core::{
    Chip8Interpreter, DumpOptions, RunError, DEFAULT_CLOCK_SPEED, DEFAULT_FRAME_RATE,
};
use clap::Parser;
use log::info;

mod terminal;

use terminal::{TerminalBell, TerminalDisplay, TerminalKeyboard, TerminalSession};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the ROM image to run
    rom: PathBuf,

    #[arg(short, long, default_value_t = DEFAULT_CLOCK_SPEED, help = "Cycles per second")]
    clock_speed: u32,

    #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE, help = "Maximum frames per second")]
    frame_rate: u32,

    #[arg(long, help = "Include memory in the dump printed on a fault")]
    dump_memory: bool,

    #[arg(long, help = "Include registers in the dump printed on a fault")]
    dump_registers: bool,

    #[arg(long, help = "Include the call stack in the dump printed on a fault")]
    dump_stack: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("could not read ROM {}", args.rom.display()))?;
    info!("read {} ({} bytes)", args.rom.display(), rom.len());

    let session = TerminalSession::enter().context("could not set up the terminal")?;

    let mut interpreter = Chip8Interpreter::new(
        TerminalDisplay::new(),
        TerminalKeyboard::new(),
        TerminalBell::new(),
    );
    interpreter.max_clock_speed = args.clock_speed;
    interpreter.frame_rate = args.frame_rate;

    let (state, result) = interpreter.run_program(&rom);
    drop(session);

    if let Err(RunError::Fault(_)) = &result {
        let options = DumpOptions {
            memory: args.dump_memory,
            registers: args.dump_registers,
            stack: args.dump_stack,
        };
        eprint!("{}", state.dump(options));
    }

    result.context("machine stopped")
}
