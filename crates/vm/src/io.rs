//! Input and output streams used by READ, WRITE, DPRINT and BREAK.

use std::io::{BufRead, Write};

use log::warn;

/// Line-oriented source of input for READ.
pub trait InputSource {
    /// Next line without its trailing newline, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// [`InputSource`] over any buffered reader.
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
            Err(err) => {
                warn!("input read failed, treating as end of input: {err}");
                None
            }
        }
    }
}

/// The streams a running program talks to.
pub struct Streams<'a> {
    /// Source for READ.
    pub input: &'a mut dyn InputSource,
    /// Destination for WRITE.
    pub output: &'a mut dyn Write,
    /// Destination for DPRINT and BREAK.
    pub diagnostics: &'a mut dyn Write,
}
