//! Disassembler.
//!
//! Renders instructions in an assembly-like text form, one per line:
//!
//! ```text
//! 0000: SET r0 3
//! 0003: ADD 32767 r0 r1
//! 000a: OUT 'A'
//! ```
//!
//! Used by the interpreter's trace output and the `synacor-disasm` binary.

use crate::virtual_machine::Word;
use crate::virtual_machine::isa::{Instruction, OperandRole};
use crate::virtual_machine::operand::Operand;
use std::fmt;

/// Renders one raw operand word.
fn operand_text(raw: Word) -> String {
    match Operand::decode(raw) {
        Some(op) => op.to_string(),
        None => format!("<invalid {}>", raw),
    }
}

/// Renders the `OUT` operand as a character literal when it is a printable
/// ASCII literal.
fn out_operand_text(raw: Word) -> String {
    match raw {
        0x20..=0x7e if raw != b'\'' as Word && raw != b'\\' as Word => {
            format!("'{}'", raw as u8 as char)
        }
        10 => "'\\n'".to_string(),
        _ => operand_text(raw),
    }
}

/// Disassembles the instruction starting at `addr`.
///
/// Returns the rendered text and the number of words consumed. Words that
/// are not opcodes render as `DATA <n>`; instructions cut off by the end of
/// `words` render the operands that exist followed by `<truncated>`.
pub fn disassemble_at(words: &[Word], addr: usize) -> (String, usize) {
    let Some(&opcode) = words.get(addr) else {
        return (String::new(), 0);
    };
    let Ok(instr) = Instruction::try_from(opcode) else {
        return (format!("DATA {}", opcode), 1);
    };

    let mut text = instr.mnemonic().to_string();
    let mut consumed = 1;
    for role in instr.operand_roles() {
        let Some(&raw) = words.get(addr + consumed) else {
            text.push_str(" <truncated>");
            return (text, consumed);
        };
        let rendered = match (instr, role) {
            (Instruction::Out, OperandRole::Src) => out_operand_text(raw),
            _ => operand_text(raw),
        };
        text.push(' ');
        text.push_str(&rendered);
        consumed += 1;
    }
    (text, consumed)
}

/// One disassembled instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingLine {
    pub addr: usize,
    pub text: String,
}

impl fmt::Display for ListingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}: {}", self.addr, self.text)
    }
}

/// Linear disassembly of a whole image.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Listing {
    pub lines: Vec<ListingLine>,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Disassembles `words` front to back.
///
/// This is a linear sweep: data embedded between instructions is decoded
/// as if it were code wherever it happens to look like an opcode.
pub fn disassemble(words: &[Word]) -> Listing {
    let mut lines = Vec::new();
    let mut addr = 0;
    while addr < words.len() {
        let (text, width) = disassemble_at(words, addr);
        lines.push(ListingLine { addr, text });
        addr += width;
    }
    Listing { lines }
}
