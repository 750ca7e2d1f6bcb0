//! Program image disassembler CLI.
//!
//! # Usage
//! ```text
//! synacor-disasm <program.bin> [-o <file>]
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use synacor::virtual_machine::disasm::disassemble;
use synacor::virtual_machine::program::Program;
use synacor::{error, info};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--output" | "-o") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                output_path = Some(args[i].clone());
                i += 1;
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let program = Program::from_file(input_path).unwrap_or_else(|e| {
        error!("Failed to load program: {e}");
        process::exit(1)
    });

    let listing = disassemble(program.words()).to_string();

    match output_path {
        Some(path) => {
            if let Some(parent) = Path::new(&path).parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                error!("Output directory does not exist: {}", parent.display());
                process::exit(1);
            }
            if let Err(e) = fs::write(&path, listing.as_bytes()) {
                error!("Failed to write output file: {}", e);
                process::exit(1);
            }
            info!("Disassembled {} -> {} ({} words)", input_path, path, program.len());
        }
        None => print!("{listing}"),
    }
}

const USAGE: &str = "\
Synacor Disassembler

USAGE:
    {program} <program.bin> [OPTIONS]

ARGS:
    <program.bin>    Little-endian 16-bit program image

OPTIONS:
    -o, --output <file>    Write the listing to a file instead of stdout
    -h, --help             Print this help message
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
