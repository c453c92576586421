// src/front/token.rs
// Regex tokenizer: macro expansion, quoting, escapes and character classes.

use std::io::BufRead;

use super::{Gen, Token};
use crate::error::{ErrorKind, Result};

// Guards against a macro that (indirectly) expands to itself.
const MAX_EXPANSIONS: usize = 256;

fn char_token(c: char) -> Token {
    match c {
        '$' => Token::AtEol,
        '(' => Token::OpenParen,
        ')' => Token::CloseParen,
        '*' => Token::Closure,
        '+' => Token::PlusClose,
        '-' => Token::Dash,
        '.' => Token::Any,
        '?' => Token::Optional,
        '[' => Token::CclStart,
        ']' => Token::CclEnd,
        '^' => Token::AtBol,
        '{' => Token::OpenCurly,
        '|' => Token::Or,
        '}' => Token::CloseCurly,
        _ => Token::Letter,
    }
}

impl<R: BufRead> Gen<R> {
    /// Moves to the next token. After `Eos` the next call starts on a new
    /// line, unless the rule header left the pattern on the current one.
    pub(crate) fn advance(&mut self) -> Result<Token> {
        self.next_token()?;
        Ok(self.token)
    }

    fn set(&mut self, token: Token, lexeme: u32) {
        self.token = token;
        self.lexeme = lexeme;
    }

    fn next_token(&mut self) -> Result<()> {
        if self.input.eof_reached {
            self.set(Token::EndOfInput, 0);
            return Ok(());
        }

        if self.token == Token::Eos || self.input.at_end_of_line() {
            if self.in_quote {
                return Err(self.error(ErrorKind::Syntax("unterminated quoted string".into())));
            }
            loop {
                if !self.advance_stop || self.input.at_end_of_line() {
                    if !self.input.next_line()? {
                        self.set(Token::EndOfInput, 0);
                        return Ok(());
                    }
                    self.expansions = 0;
                } else {
                    self.advance_stop = false;
                }
                self.input.skip_whitespace();
                if !self.input.at_end_of_line() {
                    break;
                }
            }
        }

        while let Some(c) = self.input.peek() {
            self.input.index += 1;

            if !self.in_quote && !self.in_ccl && c == '{' {
                self.input.index -= 1;
                self.expand_macro()?;
                continue;
            }

            if c == '\\' {
                let v = self.escape()?;
                self.set(Token::Letter, v);
                return Ok(());
            }

            if self.in_quote {
                match c {
                    '"' => {
                        self.in_quote = false;
                        continue;
                    }
                    '\n' => {
                        return Err(
                            self.error(ErrorKind::Syntax("unterminated quoted string".into()))
                        );
                    }
                    _ => {
                        self.set(Token::Letter, c as u32);
                        return Ok(());
                    }
                }
            }

            if self.in_ccl {
                let token = match c {
                    '-' => Token::Dash,
                    ']' => {
                        self.in_ccl = false;
                        Token::CclEnd
                    }
                    '^' => Token::AtBol,
                    '[' if self.input.peek() == Some(':') => {
                        self.read_class_name()?;
                        Token::CharClass
                    }
                    _ => Token::Letter,
                };
                self.set(token, c as u32);
                return Ok(());
            }

            if c == '"' {
                self.in_quote = true;
                continue;
            }
            if c.is_whitespace() {
                self.set(Token::Eos, 0);
                return Ok(());
            }

            let token = char_token(c);
            if token == Token::CclStart {
                self.in_ccl = true;
            }
            self.set(token, c as u32);
            return Ok(());
        }

        self.set(Token::Eos, 0);
        Ok(())
    }

    // Cursor is just past `[`, on the `:` of `[:name:]`.
    fn read_class_name(&mut self) -> Result<()> {
        self.input.index += 1;
        let start = self.input.index;
        while self.input.peek().is_some_and(|c| c != ':' && c != '\n') {
            self.input.index += 1;
        }
        if self.input.peek() != Some(':') || self.input.peek_at(1) != Some(']') {
            return Err(self.error(ErrorKind::Syntax("unterminated `[:class:]`".into())));
        }
        self.class_name = self.input.line[start..self.input.index].iter().collect();
        self.input.index += 2;
        Ok(())
    }

    // Cursor is on `{`. Replaces `{name}` in the line with the definition.
    fn expand_macro(&mut self) -> Result<()> {
        let open = self.input.index;
        let mut close = open + 1;
        while self.input.line.get(close).is_some_and(|&c| c != '}' && c != '\n') {
            close += 1;
        }
        if self.input.line.get(close) != Some(&'}') {
            return Err(self.error(ErrorKind::Syntax("unterminated macro name".into())));
        }
        let name: String = self.input.line[open + 1..close].iter().collect();
        if name.is_empty() {
            return Err(self.error(ErrorKind::Syntax("empty macro name".into())));
        }
        let Some(def) = self.spec.macros.get(&name).cloned() else {
            return Err(self.error(ErrorKind::UndefinedMacro(name)));
        };

        self.expansions += 1;
        if self.expansions > MAX_EXPANSIONS {
            return Err(self.error(ErrorKind::Syntax(format!(
                "macro `{name}` expands recursively"
            ))));
        }
        self.input.splice(open, close + 1, &def);
        Ok(())
    }

    // Cursor is just past the backslash. Escape letters are case-insensitive.
    fn escape(&mut self) -> Result<u32> {
        let Some(c) = self.input.peek() else {
            return Err(self.error(ErrorKind::Syntax("dangling `\\`".into())));
        };
        self.input.index += 1;
        let v = match c.to_ascii_lowercase() {
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'n' => b'\n' as u32,
            'r' => b'\r' as u32,
            't' => b'\t' as u32,
            'v' => 0x0b,
            'x' => self.digits(16, 2, 0),
            '0'..='7' => self.digits(8, 2, c as u32 - '0' as u32),
            _ => c as u32,
        };
        Ok(v)
    }

    // Reads up to `max` more digits in `radix`, accumulating onto `acc`.
    fn digits(&mut self, radix: u32, max: usize, mut acc: u32) -> u32 {
        for _ in 0..max {
            match self.input.peek().and_then(|c| c.to_digit(radix)) {
                Some(d) => {
                    acc = acc * radix + d;
                    self.input.index += 1;
                }
                None => break,
            }
        }
        acc
    }
}
