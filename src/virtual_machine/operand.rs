//! Operand decoding.
//!
//! Instruction operands are raw words in `0..=32775`. They are decoded once
//! into a tagged [`Operand`] so the literal/register boundary is checked in a
//! single place instead of in every handler.

use crate::virtual_machine::{MAX_LITERAL, MAX_REGISTER, REGISTER_BASE, REGISTER_COUNT, Word};
use std::fmt;

/// Index of one of the eight registers.
///
/// Only constructible for indices below [`REGISTER_COUNT`], so register
/// file lookups never go out of bounds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Register(u8);

impl Register {
    /// Returns the register with the given index, or `None` above 7.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(Register(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the operand value that aliases this register.
    pub const fn alias(self) -> Word {
        REGISTER_BASE + self.0 as Word
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A decoded address-space value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
    /// Literal word, or a memory address when used as a store target.
    Literal(Word),
    /// Register alias.
    Register(Register),
}

impl Operand {
    /// Decodes a raw operand word. Returns `None` for values above 32775.
    pub const fn decode(raw: Word) -> Option<Self> {
        if raw <= MAX_LITERAL {
            Some(Operand::Literal(raw))
        } else if raw <= MAX_REGISTER {
            Some(Operand::Register(Register((raw - REGISTER_BASE) as u8)))
        } else {
            None
        }
    }

    /// Returns the raw word this operand was decoded from.
    pub const fn encode(self) -> Word {
        match self {
            Operand::Literal(value) => value,
            Operand::Register(reg) => reg.alias(),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Register(reg) => write!(f, "{}", reg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(Operand::decode(0), Some(Operand::Literal(0)));
        assert_eq!(Operand::decode(32767), Some(Operand::Literal(32767)));
        assert_eq!(
            Operand::decode(32768),
            Some(Operand::Register(Register::new(0).unwrap()))
        );
        assert_eq!(
            Operand::decode(32775),
            Some(Operand::Register(Register::new(7).unwrap()))
        );
        assert_eq!(Operand::decode(32776), None);
        assert_eq!(Operand::decode(u16::MAX), None);
    }

    #[test]
    fn decode_encode_agree() {
        for raw in [0, 1, 12345, 32767, 32768, 32771, 32775] {
            assert_eq!(Operand::decode(raw).unwrap().encode(), raw);
        }
    }

    #[test]
    fn register_index_bound() {
        assert!(Register::new(7).is_some());
        assert!(Register::new(8).is_none());
    }

    #[test]
    fn display() {
        assert_eq!(Operand::decode(32770).unwrap().to_string(), "r2");
        assert_eq!(Operand::decode(42).unwrap().to_string(), "42");
    }
}
