// src/front/rules.rs
// Rule headers (`<s1, s2>`) and action bodies.

use std::io::BufRead;

use super::Gen;
use crate::{
    error::{ErrorKind, Result},
    spec::CodeBlock,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Str,
    Chr,
    LineComment,
    BlockComment,
}

impl<R: BufRead> Gen<R> {
    /// Reads an optional `<...>` header before the next rule and returns
    /// the lexical states the rule belongs to (all of them without a
    /// header). `None` at end of input.
    pub(crate) fn get_states(&mut self) -> Result<Option<Vec<usize>>> {
        loop {
            self.input.skip_whitespace();
            if !self.input.at_end_of_line() {
                break;
            }
            if !self.input.next_line()? {
                return Ok(None);
            }
        }

        if self.input.peek() != Some('<') {
            self.advance_stop = true;
            return Ok(Some((0..self.spec.states.len()).collect()));
        }

        self.input.index += 1;
        let mut states = Vec::new();
        loop {
            // Separators may span lines.
            loop {
                match self.input.peek() {
                    Some(c) if c.is_whitespace() || c == ',' => self.input.index += 1,
                    Some(_) => break,
                    None => {
                        if !self.input.next_line()? {
                            return Err(self.error(ErrorKind::UnexpectedEof));
                        }
                    }
                }
            }
            if self.input.peek() == Some('>') {
                self.input.index += 1;
                break;
            }
            let start = self.input.index;
            while self
                .input
                .peek()
                .is_some_and(|c| !c.is_whitespace() && c != ',' && c != '>')
            {
                self.input.index += 1;
            }
            let name: String = self.input.line[start..self.input.index].iter().collect();
            match self.spec.state(&name) {
                Some(s) if !states.contains(&s) => states.push(s),
                Some(_) => {}
                None => return Err(self.error(ErrorKind::UnknownState(name))),
            }
        }
        self.advance_stop = !self.input.at_end_of_line();
        Ok(Some(states))
    }

    /// Reads the `{...}` action blocks of a rule, one per variant. Only the
    /// first is mandatory.
    pub(crate) fn read_action(&mut self) -> Result<Vec<CodeBlock>> {
        let variants = self.spec.options.variants;
        let mut blocks = Vec::with_capacity(variants);
        while blocks.len() < variants {
            loop {
                self.input.skip_whitespace();
                if !self.input.at_end_of_line() {
                    break;
                }
                if !self.input.next_line()? {
                    if blocks.is_empty() {
                        return Err(self.error(ErrorKind::UnexpectedEof));
                    }
                    return Ok(blocks);
                }
            }
            if self.input.peek() != Some('{') {
                if blocks.is_empty() {
                    return Err(self.error(ErrorKind::MissingBrace));
                }
                break;
            }
            blocks.push(self.read_block()?);
        }
        Ok(blocks)
    }

    // Cursor is on the opening brace. Braces inside string and character
    // literals and comments do not count.
    fn read_block(&mut self) -> Result<CodeBlock> {
        let first_line = self.input.line_number;
        let mut lines = Vec::new();
        let mut cur = String::new();
        let mut mode = Mode::Code;
        let mut escaped = false;
        let mut depth = 0usize;

        loop {
            let Some(c) = self.input.peek() else {
                return Err(self.error(ErrorKind::Impossible("read past end of line".into())));
            };
            self.input.index += 1;
            if c == '\n' {
                lines.push(std::mem::take(&mut cur));
            } else {
                cur.push(c);
            }

            let next = self.input.peek();
            match mode {
                Mode::Code => match c {
                    '"' => mode = Mode::Str,
                    '\'' => mode = Mode::Chr,
                    '/' if next == Some('/') => mode = Mode::LineComment,
                    '/' if next == Some('*') => {
                        cur.push('*');
                        self.input.index += 1;
                        mode = Mode::BlockComment;
                    }
                    '{' => depth += 1,
                    '}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                },
                Mode::Str | Mode::Chr => {
                    let quote = if mode == Mode::Str { '"' } else { '\'' };
                    if c == '\n' {
                        return Err(self.error(ErrorKind::NewlineInLiteral));
                    }
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote {
                        mode = Mode::Code;
                    }
                }
                Mode::LineComment => {
                    if c == '\n' {
                        mode = Mode::Code;
                    }
                }
                Mode::BlockComment => {
                    if c == '*' && next == Some('/') {
                        cur.push('/');
                        self.input.index += 1;
                        mode = Mode::Code;
                    }
                }
            }

            if self.input.at_end_of_line() && !self.input.next_line()? {
                return Err(self.error(ErrorKind::UnexpectedEof));
            }
        }

        if !cur.is_empty() {
            lines.push(cur);
        }
        Ok(CodeBlock {
            lines,
            first_line,
            last_line: self.input.line_number,
        })
    }
}
