use crate::virtual_machine::Word;

/// Unbounded LIFO of words.
///
/// Emptiness is reported rather than raised: `POP` treats it as a fault,
/// `RET` as normal termination.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack {
    items: Vec<Word>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Word) {
        self.items.push(value);
    }

    /// Removes and returns the top value, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<Word> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the contents, bottom first.
    pub fn as_slice(&self) -> &[Word] {
        &self.items
    }
}
