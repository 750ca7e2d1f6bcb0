//! Character channels for `OUT` and `IN`.
//!
//! The [`IoChannel`] trait is the only way the interpreter talks to the
//! outside world. [`BufferedIo`] keeps everything in memory for tests and
//! embedding hosts; [`StreamIo`] wraps a reader and writer (stdin/stdout for
//! the command line runner).

use crate::virtual_machine::Word;
use crate::virtual_machine::errors::VMError;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Stdin, Stdout, Write};

/// Character I/O consumed by the interpreter.
///
/// One `write` per executed `OUT`, one `read` per executed `IN`.
pub trait IoChannel {
    /// Emits one character code. Codes above 255 are passed through.
    fn write(&mut self, code: Word) -> Result<(), VMError>;
    /// Returns the next character code, waiting for input if the source can
    /// still produce some. `None` means the source is exhausted.
    fn read(&mut self) -> Result<Option<Word>, VMError>;
}

/// Renders a character code for display, using U+FFFD for codes that are
/// not scalar values.
pub fn render(code: Word) -> char {
    char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// In-memory channel: queued input, captured output.
#[derive(Clone, Debug, Default)]
pub struct BufferedIo {
    input: VecDeque<Word>,
    output: Vec<Word>,
}

impl BufferedIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel with `input` already queued.
    pub fn with_input(input: &str) -> Self {
        let mut io = Self::new();
        io.push_input(input);
        io
    }

    /// Appends `input` to the pending input, one code per byte.
    pub fn push_input(&mut self, input: &str) {
        self.input.extend(input.bytes().map(Word::from));
    }

    /// Number of input codes not yet consumed.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Every code written so far.
    pub fn output(&self) -> &[Word] {
        &self.output
    }

    pub fn output_string(&self) -> String {
        self.output.iter().map(|code| render(*code)).collect()
    }

    /// Drains and returns the captured output.
    pub fn take_output(&mut self) -> Vec<Word> {
        std::mem::take(&mut self.output)
    }
}

impl IoChannel for BufferedIo {
    fn write(&mut self, code: Word) -> Result<(), VMError> {
        self.output.push(code);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Word>, VMError> {
        Ok(self.input.pop_front())
    }
}

/// Line-buffered channel over a reader and a writer.
///
/// Input is read a whole line at a time and handed out one character per
/// `IN`. Output is flushed at every newline and before blocking on input,
/// so prompts appear before the program waits.
pub struct StreamIo<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<u8>,
    exhausted: bool,
}

impl StreamIo<BufReader<Stdin>, Stdout> {
    /// Channel over the process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> StreamIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Queues scripted input served before anything from the reader.
    pub fn with_script(mut self, script: &[u8]) -> Self {
        self.pending.extend(script);
        self
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Flushes buffered output.
    pub fn flush(&mut self) -> Result<(), VMError> {
        self.writer.flush()?;
        Ok(())
    }

    fn fill(&mut self) -> Result<(), VMError> {
        self.writer.flush()?;
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            self.exhausted = true;
        }
        self.pending.extend(line);
        Ok(())
    }
}

impl<R: BufRead, W: Write> IoChannel for StreamIo<R, W> {
    fn write(&mut self, code: Word) -> Result<(), VMError> {
        let ch = render(code);
        let mut buf = [0u8; 4];
        self.writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
        if ch == '\n' {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Word>, VMError> {
        if self.pending.is_empty() && !self.exhausted {
            self.fill()?;
        }
        Ok(self.pending.pop_front().map(Word::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn buffered_round_trip() {
        let mut io = BufferedIo::with_input("hi");
        assert_eq!(io.read(), Ok(Some(b'h' as Word)));
        assert_eq!(io.read(), Ok(Some(b'i' as Word)));
        assert_eq!(io.read(), Ok(None));
        io.push_input("\n");
        assert_eq!(io.pending_input(), 1);
        assert_eq!(io.read(), Ok(Some(10)));

        io.write(b'o' as Word).unwrap();
        io.write(b'k' as Word).unwrap();
        assert_eq!(io.output_string(), "ok");
        assert_eq!(io.take_output(), vec![111, 107]);
        assert!(io.output().is_empty());
    }

    #[test]
    fn stream_reads_lines_then_reports_exhaustion() {
        let mut io = StreamIo::new(Cursor::new(b"ab\nc".to_vec()), Vec::new());
        let mut read = Vec::new();
        while let Some(code) = io.read().unwrap() {
            read.push(code as u8);
        }
        assert_eq!(read, b"ab\nc");
        assert_eq!(io.read(), Ok(None));
    }

    #[test]
    fn script_is_served_before_reader() {
        let mut io =
            StreamIo::new(Cursor::new(b"tail\n".to_vec()), Vec::new()).with_script(b"go\n");
        let first: Vec<_> = (0..3).map(|_| io.read().unwrap().unwrap() as u8).collect();
        assert_eq!(first, b"go\n");
        assert_eq!(io.read(), Ok(Some(b't' as Word)));
    }

    #[test]
    fn stream_writes_utf8() {
        let mut io = StreamIo::new(Cursor::new(Vec::new()), Vec::new());
        for code in [b'A' as Word, 0xE9, 10] {
            io.write(code).unwrap();
        }
        assert_eq!(io.writer().as_slice(), "Aé\n".as_bytes());
    }

    #[test]
    fn render_out_of_range_codes() {
        assert_eq!(render(65), 'A');
        assert_eq!(render(0xD800), char::REPLACEMENT_CHARACTER);
    }
}
