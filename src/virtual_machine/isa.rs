//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical instruction table and invokes a callback macro for code
//! generation, so the decoder, the disassembler and the tests share one list.
//!
//! This module generates:
//! - The [`Instruction`] enum with opcode mappings
//! - `TryFrom<Word>` for decoding opcodes
//! - Mnemonics and per-operand roles
//!
//! # Encoding
//!
//! An instruction is its opcode word followed by 0 to 3 operand words.
//! Operands in `0..=32767` are literals, `32768..=32775` alias registers.

use crate::virtual_machine::Word;
use crate::virtual_machine::errors::VMError;

/// How an instruction uses one of its operands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperandRole {
    /// Store target, used raw: a memory address or a register alias.
    Dst,
    /// Value, read through `resolve`.
    Src,
}

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Machine control
            // =========================
            /// HALT ; stop execution
            Halt = 0, "HALT" => [],
            /// NOOP ; no effect
            Noop = 21, "NOOP" => [],
            // =========================
            // Data movement and stack
            // =========================
            /// SET a, b ; a = b
            Set = 1, "SET" => [Dst, Src],
            /// PUSH a ; push a onto the stack
            Push = 2, "PUSH" => [Src],
            /// POP a ; a = pop (fault on empty stack)
            Pop = 3, "POP" => [Dst],
            /// RMEM a, b ; a = mem[b]
            Rmem = 15, "RMEM" => [Dst, Src],
            /// WMEM a, b ; mem[a] = b
            Wmem = 16, "WMEM" => [Src, Src],
            // =========================
            // Comparison and arithmetic
            // =========================
            /// EQ a, b, c ; a = (b == c)
            Eq = 4, "EQ" => [Dst, Src, Src],
            /// GT a, b, c ; a = (b > c)
            Gt = 5, "GT" => [Dst, Src, Src],
            /// ADD a, b, c ; a = (b + c) mod 32768
            Add = 9, "ADD" => [Dst, Src, Src],
            /// MULT a, b, c ; a = (b * c) mod 32768
            Mult = 10, "MULT" => [Dst, Src, Src],
            /// MOD a, b, c ; a = b mod c (fault on zero divisor)
            Mod = 11, "MOD" => [Dst, Src, Src],
            /// AND a, b, c ; a = b & c
            And = 12, "AND" => [Dst, Src, Src],
            /// OR a, b, c ; a = b | c
            Or = 13, "OR" => [Dst, Src, Src],
            /// NOT a, b ; a = 15-bit inverse of b
            Not = 14, "NOT" => [Dst, Src],
            // =========================
            // Control flow
            // =========================
            /// JMP a ; ip = a
            Jmp = 6, "JMP" => [Src],
            /// JT a, b ; if a != 0 then ip = b
            Jt = 7, "JT" => [Src, Src],
            /// JF a, b ; if a == 0 then ip = b
            Jf = 8, "JF" => [Src, Src],
            /// CALL a ; push address of next instruction, ip = a
            Call = 17, "CALL" => [Src],
            /// RET ; ip = pop, halt on empty stack
            Ret = 18, "RET" => [],
            // =========================
            // I/O
            // =========================
            /// OUT a ; write character a
            Out = 19, "OUT" => [Src],
            /// IN a ; a = next input character
            In = 20, "IN" => [Dst],
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [ $( $role:ident ),* $(,)? ]
        ),* $(,)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        #[repr(u16)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<Word> for Instruction {
            type Error = VMError;

            fn try_from(value: Word) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Instruction::$name), )*
                    _ => Err(VMError::IllegalOpcode { opcode: value }),
                }
            }
        }

        impl Instruction {
            /// Every instruction, in table order.
            pub const ALL: &'static [Instruction] = &[ $( Instruction::$name, )* ];

            /// Returns the assembly mnemonic for this instruction.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Instruction::$name => $mnemonic, )*
                }
            }

            /// Returns how each operand is used, in encoding order.
            pub const fn operand_roles(&self) -> &'static [OperandRole] {
                match self {
                    $( Instruction::$name => &[ $( OperandRole::$role ),* ], )*
                }
            }
        }
    };
}

for_each_instruction!(define_instructions);

impl Instruction {
    /// Number of operand words following the opcode.
    pub const fn operand_count(&self) -> usize {
        self.operand_roles().len()
    }

    /// Encoded length in words, opcode included.
    pub const fn width(&self) -> usize {
        1 + self.operand_count()
    }

    pub const fn opcode(&self) -> Word {
        *self as Word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_COUNTS: [(Word, usize); 22] = [
        (0, 0),
        (1, 2),
        (2, 1),
        (3, 1),
        (4, 3),
        (5, 3),
        (6, 1),
        (7, 2),
        (8, 2),
        (9, 3),
        (10, 3),
        (11, 3),
        (12, 3),
        (13, 3),
        (14, 2),
        (15, 2),
        (16, 2),
        (17, 1),
        (18, 0),
        (19, 1),
        (20, 1),
        (21, 0),
    ];

    #[test]
    fn every_opcode_decodes_with_documented_arity() {
        for (opcode, count) in EXPECTED_COUNTS {
            let instr = Instruction::try_from(opcode).unwrap();
            assert_eq!(instr.opcode(), opcode);
            assert_eq!(instr.operand_count(), count, "{}", instr.mnemonic());
        }
        assert_eq!(Instruction::ALL.len(), EXPECTED_COUNTS.len());
    }

    #[test]
    fn values_past_the_table_are_illegal() {
        for opcode in [22, 23, 255, 32767, 32768, u16::MAX] {
            assert_eq!(
                Instruction::try_from(opcode),
                Err(VMError::IllegalOpcode { opcode })
            );
        }
    }

    #[test]
    fn store_instructions_lead_with_a_destination() {
        for instr in [
            Instruction::Set,
            Instruction::Pop,
            Instruction::Eq,
            Instruction::Gt,
            Instruction::Add,
            Instruction::Mult,
            Instruction::Mod,
            Instruction::And,
            Instruction::Or,
            Instruction::Not,
            Instruction::Rmem,
            Instruction::In,
        ] {
            assert_eq!(instr.operand_roles()[0], OperandRole::Dst);
        }
        assert!(
            Instruction::Wmem
                .operand_roles()
                .iter()
                .all(|role| *role == OperandRole::Src)
        );
    }

    #[test]
    fn mnemonics() {
        assert_eq!(Instruction::Mult.mnemonic(), "MULT");
        assert_eq!(Instruction::Noop.width(), 1);
        assert_eq!(Instruction::Add.width(), 4);
    }
}
