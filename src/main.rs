//! Synacor program runner.
//!
//! Loads a binary program image and runs it with stdin and stdout as the
//! character channels.
//!
//! # Usage
//! ```text
//! synacor <program.bin> [OPTIONS]
//! ```
//!
//! # Options
//! - `--trace`: Log every executed instruction to stderr
//! - `--input <file>`: Feed the file's contents before reading stdin
//! - `--on-eof <fault|suspend>`: What `IN` does once input runs out
//! - `--max-steps <n>`: Stop after executing `n` instructions
//! - `--no-timestamps`: Omit timestamps from log lines
//!
//! # Exit codes
//! `0` on halt, `1` on fault or bad arguments, `2` when the step limit is
//! reached, `3` when the program is left waiting for input.

use std::env;
use std::fs;
use std::process;
use std::sync::atomic::Ordering;

use synacor::utils::log::SHOW_TIMESTAMP;
use synacor::virtual_machine::io::StreamIo;
use synacor::virtual_machine::program::Program;
use synacor::virtual_machine::vm::{InputPolicy, Termination, VM, VmConfig};
use synacor::{error, info, warn};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let program_path = &args[1];
    let mut config = VmConfig::default();
    let mut script_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--trace" => config = config.with_trace(true),
            "--no-timestamps" => SHOW_TIMESTAMP.store(false, Ordering::Relaxed),
            k @ ("--input" | "--on-eof" | "--max-steps") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                let value = args[i].as_str();
                match k {
                    "--input" => script_path = Some(value.to_string()),
                    "--on-eof" => {
                        let policy = match value {
                            "fault" => InputPolicy::Fault,
                            "suspend" => InputPolicy::Suspend,
                            other => {
                                error!("Invalid --on-eof value: '{}' (expected fault or suspend)", other);
                                process::exit(1);
                            }
                        };
                        config = config.with_input_policy(policy);
                    }
                    _ => {
                        let limit = value.parse::<u64>().unwrap_or_else(|_| {
                            error!("Invalid step limit: '{}' is not a valid number", value);
                            process::exit(1);
                        });
                        if limit == 0 {
                            error!("Step limit must be greater than 0");
                            process::exit(1);
                        }
                        config = config.with_step_limit(limit);
                    }
                }
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let program = Program::from_file(program_path).unwrap_or_else(|e| {
        error!("Failed to load program: {e}");
        process::exit(1)
    });

    let script = match &script_path {
        Some(path) => fs::read(path).unwrap_or_else(|e| {
            error!("Failed to read input file {}: {}", path, e);
            process::exit(1)
        }),
        None => Vec::new(),
    };

    let mut vm = VM::with_config(&program, config).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1)
    });
    let mut io = StreamIo::stdio().with_script(&script);

    info!("Loaded {} ({} words)", program_path, program.len());

    let termination = vm.run(&mut io);
    if let Err(e) = io.flush() {
        warn!("Failed to flush output: {e}");
    }

    let code = match termination {
        Termination::Halted => {
            info!("Halted at {:04x} after {} steps", vm.ip(), vm.steps());
            0
        }
        Termination::Faulted(e) => {
            error!("Fault at {:04x}: {}", vm.ip(), e);
            1
        }
        Termination::StepLimitReached => {
            warn!("Step limit reached at {:04x} after {} steps", vm.ip(), vm.steps());
            2
        }
        Termination::AwaitingInput => {
            warn!("Input exhausted; program is waiting at {:04x}", vm.ip());
            3
        }
    };
    process::exit(code);
}

const USAGE: &str = "\
Synacor Virtual Machine

USAGE:
    {program} <program.bin> [OPTIONS]

ARGS:
    <program.bin>    Little-endian 16-bit program image

OPTIONS:
    --trace                     Log every executed instruction
    --input <file>              Feed the file's contents before stdin
    --on-eof <fault|suspend>    Behavior of IN once input runs out (default: fault)
    --max-steps <n>             Stop after n instructions
    --no-timestamps             Omit timestamps from log lines
    -h, --help                  Print this help message

EXAMPLES:
    # Run interactively
    {program} challenge.bin

    # Replay a walkthrough, then continue from the keyboard
    {program} challenge.bin --input moves.txt

    # Trace the first thousand instructions
    {program} challenge.bin --trace --max-steps 1000
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
