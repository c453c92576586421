// src/front/input.rs
// Line buffer over the specification text.

use std::io::BufRead;

use crate::error::{LexError, Result};

pub struct Input<R> {
    reader: R,
    /// Current line; always ends with `\n` once read.
    pub line: Vec<char>,
    pub index: usize,
    pub line_number: usize,
    pub eof_reached: bool,
    pushback: bool,
}

fn is_blank(line: &[char]) -> bool {
    line.iter().all(|c| c.is_whitespace())
}

impl<R: BufRead> Input<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            index: 0,
            line_number: 0,
            eof_reached: false,
            pushback: false,
        }
    }

    /// Reads the next physical line, blank or not. Returns `false` at end
    /// of input.
    pub fn next_raw_line(&mut self) -> Result<bool> {
        self.index = 0;
        if self.pushback {
            self.pushback = false;
            return Ok(true);
        }
        if self.eof_reached {
            return Ok(false);
        }
        let mut buf = String::new();
        let n = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| LexError::from(e).at(self.line_number))?;
        if n == 0 {
            self.eof_reached = true;
            self.line.clear();
            return Ok(false);
        }
        self.line_number += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        self.line = buf.chars().collect();
        self.line.push('\n');
        Ok(true)
    }

    /// Like `next_raw_line` but skips blank lines.
    pub fn next_line(&mut self) -> Result<bool> {
        while self.next_raw_line()? {
            if !is_blank(&self.line) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Makes the next read return the current line again.
    pub fn push_back(&mut self) {
        self.pushback = true;
    }

    pub fn at_end_of_line(&self) -> bool {
        self.index >= self.line.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.line.get(self.index).copied()
    }

    pub fn peek_at(&self, off: usize) -> Option<char> {
        self.line.get(self.index + off).copied()
    }

    pub fn starts_with(&self, s: &str) -> bool {
        let mut i = self.index;
        for c in s.chars() {
            if self.line.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.index += 1;
        }
    }

    /// The current line without its terminator, from `from` on.
    pub fn text_from(&self, from: usize) -> String {
        let end = self.line.len().saturating_sub(1);
        if from >= end {
            return String::new();
        }
        self.line[from..end].iter().collect()
    }

    /// Reads the leading `%word` of the line.
    pub fn directive(&mut self) -> String {
        let start = self.index;
        while self.peek().is_some_and(|c| !c.is_whitespace()) {
            self.index += 1;
        }
        self.line[start..self.index].iter().collect()
    }

    /// Replaces `line[from..to]` with `text`, leaving the cursor at `from`.
    pub fn splice(&mut self, from: usize, to: usize, text: &str) {
        self.line.splice(from..to, text.chars());
        self.index = from;
    }

    pub fn err(&self, kind: crate::error::ErrorKind) -> LexError {
        LexError::new(kind, self.line_number)
    }
}
