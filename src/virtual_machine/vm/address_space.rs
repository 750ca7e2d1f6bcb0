use super::memory::Memory;
use super::registers::Registers;
use crate::virtual_machine::Word;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::operand::{Operand, Register};

/// Memory and registers behind one resolution scheme.
///
/// Operand values `0..=32767` are literals (or memory addresses when used as
/// a store target) and `32768..=32775` alias registers 0 to 7.
#[derive(Clone, Debug)]
pub struct AddressSpace {
    memory: Memory,
    registers: Registers,
}

impl AddressSpace {
    /// Creates zeroed registers and memory holding `program` from address 0.
    pub fn new(program: &[Word]) -> Result<Self, VMError> {
        Ok(Self {
            memory: Memory::with_program(program)?,
            registers: Registers::new(),
        })
    }

    /// Turns an operand value into a word: literals unchanged, register
    /// aliases to the register's current contents.
    ///
    /// Returns [`VMError::InvalidOperand`] above 32775.
    pub fn resolve(&self, value: Word) -> Result<Word, VMError> {
        match Operand::decode(value) {
            Some(Operand::Literal(word)) => Ok(word),
            Some(Operand::Register(reg)) => Ok(self.registers.get(reg)),
            None => Err(VMError::InvalidOperand { value }),
        }
    }

    /// Stores `value` into memory or a register, depending on the raw
    /// target `addr`. The target itself is never resolved.
    ///
    /// Returns [`VMError::InvalidAddress`] above 32775.
    pub fn store(&mut self, addr: Word, value: Word) -> Result<(), VMError> {
        match Operand::decode(addr) {
            Some(Operand::Literal(addr)) => self.memory.write(addr, value),
            Some(Operand::Register(reg)) => {
                self.registers.set(reg, value);
                Ok(())
            }
            None => Err(VMError::InvalidAddress { address: addr }),
        }
    }

    /// Reads memory at an already resolved address.
    pub fn read_memory(&self, addr: Word) -> Result<Word, VMError> {
        self.memory.load(addr)
    }

    /// Writes memory at an already resolved address.
    pub fn write_memory(&mut self, addr: Word, value: Word) -> Result<(), VMError> {
        self.memory.write(addr, value)
    }

    pub fn register(&self, reg: Register) -> Word {
        self.registers.get(reg)
    }

    pub fn set_register(&mut self, reg: Register, value: Word) {
        self.registers.set(reg, value);
    }

    pub fn registers(&self) -> &[Word] {
        self.registers.as_slice()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }
}
