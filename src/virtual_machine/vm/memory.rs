use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::{MAX_LITERAL, MEMORY_SIZE, Word};
use std::ops::Index;

/// Fixed-size word memory.
///
/// Always exactly [`MEMORY_SIZE`] words, zero-filled at construction and
/// never resized. Reads through [`Index`] take a `Word` and panic only for
/// addresses above 32767; fallible access goes through [`Memory::load`] and
/// [`Memory::write`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
    words: Box<[Word]>,
}

impl Memory {
    /// Creates zeroed memory with `program` copied to address 0.
    ///
    /// Returns [`VMError::ProgramTooLarge`] if `program` does not fit.
    pub fn with_program(program: &[Word]) -> Result<Self, VMError> {
        if program.len() > MEMORY_SIZE {
            return Err(VMError::ProgramTooLarge {
                words: program.len(),
                max: MEMORY_SIZE,
            });
        }
        let mut words = vec![0; MEMORY_SIZE].into_boxed_slice();
        words[..program.len()].copy_from_slice(program);
        Ok(Self { words })
    }

    /// Reads the word at `addr`.
    ///
    /// Returns [`VMError::InvalidAddress`] if `addr` is above 32767.
    pub fn load(&self, addr: Word) -> Result<Word, VMError> {
        self.words
            .get(addr as usize)
            .copied()
            .ok_or(VMError::InvalidAddress { address: addr })
    }

    /// Writes `value` at `addr`.
    ///
    /// Returns [`VMError::InvalidAddress`] if `addr` is above 32767.
    pub fn write(&mut self, addr: Word, value: Word) -> Result<(), VMError> {
        if addr > MAX_LITERAL {
            return Err(VMError::InvalidAddress { address: addr });
        }
        self.words[addr as usize] = value;
        Ok(())
    }

    /// Returns the word at `addr`, or `None` past the end of memory.
    pub fn get(&self, addr: usize) -> Option<Word> {
        self.words.get(addr).copied()
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }
}

impl Index<Word> for Memory {
    type Output = Word;

    fn index(&self, addr: Word) -> &Word {
        &self.words[addr as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_is_copied_and_rest_zeroed() {
        let mem = Memory::with_program(&[9, 8, 7]).unwrap();
        assert_eq!(mem.as_slice().len(), MEMORY_SIZE);
        assert_eq!(&mem.as_slice()[..4], &[9, 8, 7, 0]);
        assert_eq!(mem[MAX_LITERAL], 0);
    }

    #[test]
    fn full_size_program_fits() {
        let program = vec![1; MEMORY_SIZE];
        assert!(Memory::with_program(&program).is_ok());
    }

    #[test]
    fn oversized_program_is_rejected() {
        let program = vec![0; MEMORY_SIZE + 1];
        assert_eq!(
            Memory::with_program(&program),
            Err(VMError::ProgramTooLarge {
                words: MEMORY_SIZE + 1,
                max: MEMORY_SIZE
            })
        );
    }

    #[test]
    fn out_of_range_access() {
        let mut mem = Memory::with_program(&[]).unwrap();
        assert_eq!(
            mem.load(32768),
            Err(VMError::InvalidAddress { address: 32768 })
        );
        assert_eq!(
            mem.write(40000, 1),
            Err(VMError::InvalidAddress { address: 40000 })
        );
        mem.write(MAX_LITERAL, 5).unwrap();
        assert_eq!(mem.load(MAX_LITERAL), Ok(5));
    }
}
