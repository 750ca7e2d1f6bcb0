use crate::virtual_machine::operand::Register;
use crate::virtual_machine::{REGISTER_COUNT, Word};

/// Register file holding the eight general purpose registers.
///
/// Registers start at zero. Indexing goes through [`Register`], which cannot
/// name a register outside the file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Registers {
    regs: [Word; REGISTER_COUNT],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value held in `reg`.
    pub fn get(&self, reg: Register) -> Word {
        self.regs[reg.index()]
    }

    /// Stores `value` into `reg`.
    pub fn set(&mut self, reg: Register, value: Word) {
        self.regs[reg.index()] = value;
    }

    /// Returns all register values, `r0` first.
    pub fn as_slice(&self) -> &[Word] {
        &self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        assert_eq!(Registers::new().as_slice(), &[0; REGISTER_COUNT]);
    }

    #[test]
    fn set_then_get() {
        let mut regs = Registers::new();
        let r5 = Register::new(5).unwrap();
        regs.set(r5, 1234);
        assert_eq!(regs.get(r5), 1234);
        assert_eq!(regs.get(Register::new(4).unwrap()), 0);
    }
}
