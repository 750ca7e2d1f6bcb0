//! Synacor virtual machine library.
//!
//! Provides a 15-bit word interpreter with its program loader, character I/O
//! channels, a disassembler, and the logging utilities shared by the binaries.

pub mod utils;
pub mod virtual_machine;
