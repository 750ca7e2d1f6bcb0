//! Program images.
//!
//! An image is a flat sequence of little-endian 16-bit words with no header,
//! loaded contiguously into memory from address 0.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::{MEMORY_SIZE, Word};
use std::fs;
use std::path::Path;

/// A validated program image.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    words: Vec<Word>,
}

impl Program {
    /// Wraps raw words.
    ///
    /// Returns [`VMError::ProgramTooLarge`] beyond 32768 words.
    pub fn from_words(words: Vec<Word>) -> Result<Self, VMError> {
        if words.len() > MEMORY_SIZE {
            return Err(VMError::ProgramTooLarge {
                words: words.len(),
                max: MEMORY_SIZE,
            });
        }
        Ok(Self { words })
    }

    /// Decodes an image from its on-disk byte form.
    ///
    /// Rejects odd byte counts, since the last word would be missing its
    /// high byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VMError> {
        if bytes.len() % 2 != 0 {
            return Err(VMError::MalformedImage {
                reason: format!("odd length of {} bytes", bytes.len()),
            });
        }
        let words = bytes
            .chunks_exact(2)
            .map(|pair| Word::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::from_words(words)
    }

    /// Reads and decodes an image file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VMError> {
        let bytes = fs::read(path.as_ref()).map_err(|e| VMError::Io {
            reason: format!("{}: {}", path.as_ref().display(), e),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Encodes the image to its on-disk byte form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
