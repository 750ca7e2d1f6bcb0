//! Interpreter for the 15-bit word virtual machine.
//!
//! # Architecture
//!
//! - **Memory**: 32768 words addressed `0..=32767`, zero-filled, program loaded at 0
//! - **Registers**: 8 words, addressed through the alias range `32768..=32775`
//! - **Stack**: unbounded LIFO of words used by `PUSH`/`POP`/`CALL`/`RET`
//! - **Instruction format**: `[opcode, operand...]`, 1 to 4 words
//! - **Arithmetic**: modulo 32768
//!
//! # Modules
//!
//! - [`disasm`]: Instruction rendering for traces and listings
//! - [`errors`]: Load and execution faults
//! - [`io`]: Character channels consumed by `OUT`/`IN`
//! - [`isa`]: Instruction set table and opcode decoding
//! - [`operand`]: Literal/register operand decoding
//! - [`program`]: Program image loading
//! - [`vm`]: Address space, stack and the fetch-decode-execute loop

pub mod disasm;
pub mod errors;
pub mod io;
pub mod isa;
pub mod operand;
pub mod program;
pub mod vm;

/// Native data unit. Valid words are `0..=32767`; the 16-bit slot also
/// carries register aliases inside instruction operands.
pub type Word = u16;

/// Number of words in memory.
pub const MEMORY_SIZE: usize = 32768;
/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 8;
/// Largest literal value, also the 15-bit mask.
pub const MAX_LITERAL: Word = 32767;
/// Operand value aliasing register 0.
pub const REGISTER_BASE: Word = 32768;
/// Operand value aliasing register 7.
pub const MAX_REGISTER: Word = 32775;
/// Arithmetic results are reduced modulo this value.
pub const WORD_MODULUS: u32 = 32768;
