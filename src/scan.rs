// src/scan.rs
// Table-driven scanner used as a correctness oracle for generated tables.
// It follows the generated driver step by step: BOL is fed at a token
// start after a line break, EOF is fed without consuming input, the
// longest match wins and end-anchored matches give back their line
// terminator unless that would leave them empty.

use thiserror::Error;

use crate::{
    spec::Anchor,
    tables::{Accepting, Tables},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub rule: u32,
    /// Offsets in chars.
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("no rule matches the input at offset {0}")]
    NoMatch(usize),
    #[error("lexical state {0} has no rules")]
    NoRules(usize),
    #[error("unknown lexical state `{0}`")]
    UnknownState(String),
    #[error("lexical state stack is empty")]
    EmptyStack,
}

pub struct Scanner<'t> {
    tables: &'t Tables,
    text: Vec<char>,
    pos: usize,
    at_bol: bool,
    state: usize,
    stack: Vec<usize>,
}

// Only `\r` and `\n` start a new line for `^`.
fn is_line_end(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

impl<'t> Scanner<'t> {
    pub fn new(tables: &'t Tables, text: &str) -> Self {
        Self {
            tables,
            text: text.chars().collect(),
            pos: 0,
            at_bol: true,
            state: 0,
            stack: Vec::new(),
        }
    }

    pub fn lexical_state(&self) -> usize {
        self.state
    }

    pub fn begin(&mut self, state: usize) {
        self.state = state;
    }

    pub fn begin_named(&mut self, name: &str) -> Result<(), ScanError> {
        let s = self
            .tables
            .states
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ScanError::UnknownState(name.to_string()))?;
        self.begin(s);
        Ok(())
    }

    pub fn push_state(&mut self, state: usize) {
        self.stack.push(self.state);
        self.state = state;
    }

    pub fn pop_state(&mut self) -> Result<(), ScanError> {
        self.state = self.stack.pop().ok_or(ScanError::EmptyStack)?;
        Ok(())
    }

    /// Text of a match.
    pub fn text(&self, m: &Match) -> String {
        self.text[m.start..m.start + m.len].iter().collect()
    }

    /// Next match, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Match>, ScanError> {
        let t = self.tables;
        loop {
            let start_state = t
                .start_state(self.state)
                .ok_or(ScanError::NoRules(self.state))?;
            let start = self.pos;
            let mut state = start_state;
            let mut pos = start;
            let mut initial = true;
            // (accepting state, end offset)
            let mut last = t.accepting(state).map(|_| (state, pos));

            let (accepted, mut end) = loop {
                let symbol = if initial && self.at_bol {
                    t.bol
                } else if let Some(&c) = self.text.get(pos) {
                    pos += 1;
                    c as u32
                } else {
                    t.eof
                };
                if symbol == t.eof && initial {
                    return Ok(None);
                }
                match t.next_state(state, symbol) {
                    Some(s) => {
                        state = s;
                        initial = false;
                        if t.accepting(s).is_some() {
                            last = Some((s, pos));
                        }
                    }
                    None => break last.ok_or(ScanError::NoMatch(start))?,
                }
            };

            if t.anchor_of(accepted).contains(Anchor::END) {
                let full = end;
                for terminator in ['\n', '\r'] {
                    if end > start && self.text[end - 1] == terminator {
                        end -= 1;
                    }
                }
                if end == start {
                    end = full;
                }
            }
            self.pos = end;
            self.at_bol = end > start && is_line_end(self.text[end - 1]);

            match t.accepting(accepted) {
                Some(Accepting::Rule(rule)) => {
                    return Ok(Some(Match {
                        rule,
                        start,
                        len: end - start,
                    }));
                }
                Some(Accepting::Pseudo) => continue,
                None => return Err(ScanError::NoMatch(start)),
            }
        }
    }

    /// Drains the input into a list of matches.
    pub fn tokenize(&mut self) -> Result<Vec<Match>, ScanError> {
        let mut out = Vec::new();
        while let Some(m) = self.next_token()? {
            out.push(m);
        }
        Ok(out)
    }
}
