// src/front/declare.rs
// Second section: directives, code blocks, lexical states and macros.

use std::io::BufRead;

use super::Gen;
use crate::error::{ErrorKind, Result};

// Which code list a `%xxx{ ... %xxx}` block feeds.
#[derive(Clone, Copy)]
enum CodeSection {
    Class,
    Init,
    Ctor,
    Eof,
}

impl<R: BufRead> Gen<R> {
    pub(crate) fn user_declare(&mut self) -> Result<()> {
        loop {
            if !self.input.next_line()? {
                return Err(self.error(ErrorKind::UnexpectedEof));
            }
            if self.input.starts_with("%%") {
                // A rule may follow the marker on the same line.
                self.input.splice(0, 2, "");
                if self.input.line.iter().any(|c| !c.is_whitespace()) {
                    self.input.push_back();
                }
                self.input.index = self.input.line.len();
                return Ok(());
            }
            if self.input.peek() == Some('%') {
                self.directive()?;
            } else {
                self.save_macro()?;
            }
        }
    }

    fn directive(&mut self) -> Result<()> {
        let name = self.input.directive();
        match name.as_str() {
            "%{" => self.pack_code("%}", CodeSection::Class)?,
            "%init{" => self.pack_code("%init}", CodeSection::Init)?,
            "%ctor{" => self.pack_code("%ctor}", CodeSection::Ctor)?,
            "%eof{" => self.pack_code("%eof}", CodeSection::Eof)?,
            "%char" => self.spec.options.count_chars = true,
            "%line" => self.spec.options.count_lines = true,
            "%column" => self.spec.options.count_columns = true,
            "%full" => self.spec.options.charset_size = 256,
            "%unicode" => self.spec.options.charset_size = 65536,
            "%integer" => self.spec.options.integer_type = true,
            "%ignorecase" => self.spec.options.ignore_case = true,
            "%yyeof" => self.spec.options.yyeof = true,
            "%class" => self.spec.options.lexer_name = self.get_name()?,
            "%type" => self.spec.options.token_type = self.get_name()?,
            "%function" => self.spec.options.function_name = self.get_name()?,
            "%namespace" => self.spec.options.namespace = self.get_name()?,
            "%eofval" => self.spec.options.eof_token = Some(self.get_name()?),
            "%errorval" => self.spec.options.error_token = Some(self.get_name()?),
            "%charmap" => self.spec.options.char_map = Some(self.get_name()?),
            "%implements" => self.spec.options.implements = Some(self.get_name()?),
            "%attributes" => self.spec.options.attributes = Some(self.get_name()?),
            "%valuetype" => self.spec.options.value_type = Some(self.get_name()?),
            "%state" | "%s" | "%x" => self.save_states(),
            "%version" => {
                let text = self.get_name()?;
                self.spec.options.version = text
                    .trim()
                    .parse()
                    .map_err(|_| self.error(ErrorKind::InvalidVersion))?;
            }
            "%variants" => {
                let text = self.get_name()?;
                match text.trim().parse::<usize>() {
                    Ok(n) if n >= 1 => self.spec.options.variants = n,
                    _ => return Err(self.error(ErrorKind::InvalidVariants)),
                }
            }
            _ => return Err(self.error(ErrorKind::Directive)),
        }
        Ok(())
    }

    /// Rest of the directive line, surrounding whitespace removed.
    fn get_name(&mut self) -> Result<String> {
        self.input.skip_whitespace();
        let start = self.input.index;
        let name = self.input.text_from(start).trim_end().to_string();
        self.input.index = self.input.line.len();
        if name.is_empty() {
            return Err(self.error(ErrorKind::Directive));
        }
        Ok(name)
    }

    // Collects lines up to the closing directive; text after the opening
    // directive on its own line is kept.
    fn pack_code(&mut self, end: &str, section: CodeSection) -> Result<()> {
        let mut lines = Vec::new();
        let rest = self.input.text_from(self.input.index);
        if !rest.trim().is_empty() {
            lines.push(rest);
        }
        loop {
            if !self.input.next_line()? {
                return Err(self.error(ErrorKind::UnexpectedEof));
            }
            let text = self.input.text_from(0);
            if text.trim() == end {
                break;
            }
            lines.push(text);
        }
        let target = match section {
            CodeSection::Class => &mut self.spec.class_code,
            CodeSection::Init => &mut self.spec.init_code,
            CodeSection::Ctor => &mut self.spec.ctor_code,
            CodeSection::Eof => &mut self.spec.eof_code,
        };
        target.extend(lines);
        self.input.index = self.input.line.len();
        Ok(())
    }

    // State names separated by whitespace or commas.
    fn save_states(&mut self) {
        loop {
            while self
                .input
                .peek()
                .is_some_and(|c| c.is_whitespace() || c == ',')
            {
                self.input.index += 1;
            }
            let start = self.input.index;
            while self
                .input
                .peek()
                .is_some_and(|c| !c.is_whitespace() && c != ',')
            {
                self.input.index += 1;
            }
            if start == self.input.index {
                return;
            }
            let name: String = self.input.line[start..self.input.index].iter().collect();
            self.spec.add_state(&name);
        }
    }

    // `name = pattern` or `name pattern`. The pattern runs to the first
    // whitespace outside quotes and brackets.
    fn save_macro(&mut self) -> Result<()> {
        let bad = |g: &Self| g.error(ErrorKind::MacroDefinition);

        self.input.skip_whitespace();
        let name_start = self.input.index;
        while self
            .input
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != '=')
        {
            self.input.index += 1;
        }
        let name: String = self.input.line[name_start..self.input.index]
            .iter()
            .collect();
        if name.is_empty() {
            return Err(bad(self));
        }

        self.input.skip_whitespace();
        if self.input.peek() == Some('=') {
            self.input.index += 1;
        }
        self.input.skip_whitespace();
        if self.input.at_end_of_line() {
            return Err(bad(self));
        }

        let def_start = self.input.index;
        let (mut in_quote, mut in_ccl, mut escaped) = (false, false, false);
        while let Some(c) = self.input.peek() {
            if c.is_whitespace() && !in_quote && !in_ccl && !escaped {
                break;
            }
            if !escaped && !in_ccl && c == '"' {
                in_quote = !in_quote;
            }
            let was_escaped = escaped;
            escaped = !escaped && c == '\\';
            if !was_escaped && !escaped && !in_quote {
                if c == '[' && !in_ccl {
                    in_ccl = true;
                } else if c == ']' && in_ccl {
                    in_ccl = false;
                }
            }
            self.input.index += 1;
        }
        let def: String = self.input.line[def_start..self.input.index]
            .iter()
            .collect::<String>()
            .trim_end()
            .to_string();
        if def.is_empty() {
            return Err(bad(self));
        }
        if self.spec.macros.contains_key(&name) {
            return Err(self.error(ErrorKind::DuplicateMacro(name)));
        }
        log::trace!("[gen] macro {name} = {def}");
        self.spec.macros.insert(name, format!("({def})"));
        Ok(())
    }
}
