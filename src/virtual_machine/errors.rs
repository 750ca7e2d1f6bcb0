use crate::virtual_machine::Word;
use synacor_derive::Error;

/// Faults raised while loading or executing a program.
///
/// Every variant is fatal to the running VM. The address of the faulting
/// instruction stays in [`VM::ip`](super::vm::VM::ip).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum VMError {
    /// An operand read through `resolve` was above the register alias range.
    #[error("invalid operand {value}: not a literal or register alias")]
    InvalidOperand { value: Word },
    /// A store target was above the register alias range, or a memory
    /// address taken from a register was outside memory.
    #[error("invalid store address {address}")]
    InvalidAddress { address: Word },
    /// The word at ip is not one of the 22 defined opcodes.
    #[error("illegal opcode {opcode}")]
    IllegalOpcode { opcode: Word },
    /// POP on an empty stack.
    #[error("stack underflow")]
    StackUnderflow,
    /// MOD with a zero divisor.
    #[error("division by zero")]
    DivideByZero,
    /// Jump, call or return target, or natural advance, outside memory.
    #[error("instruction pointer {target} out of range")]
    IpOutOfRange { target: usize },
    /// Program image holds more words than memory.
    #[error("program of {words} words exceeds memory of {max} words")]
    ProgramTooLarge { words: usize, max: usize },
    /// Program image bytes cannot be split into little-endian words.
    #[error("malformed program image: {reason}")]
    MalformedImage { reason: String },
    /// IN executed with no input left and the fault policy selected.
    #[error("input exhausted")]
    InputExhausted,
    /// Host I/O failure from an I/O channel or image file.
    #[error("io error: {reason}")]
    Io { reason: String },
}

impl From<std::io::Error> for VMError {
    fn from(err: std::io::Error) -> Self {
        VMError::Io {
            reason: err.to_string(),
        }
    }
}
