// src/front/mod.rs
//! Front end: reads the three sections of a specification (user code,
//! declarations, rules) into a `Spec`, building the NFA as rules are read.

pub mod declare;
mod input;
pub mod rules;
pub mod token;

use std::io::BufRead;

pub use input::Input;

use crate::{
    Phase,
    error::{ErrorKind, LexError, Result},
    spec::{Options, Spec},
};

/// Regex tokens. Characters with no special meaning come back as `Letter`
/// with the codepoint in `Gen::lexeme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    AtBol,
    AtEol,
    Any,
    CclEnd,
    CclStart,
    CharClass,
    CloseCurly,
    CloseParen,
    Closure,
    Dash,
    EndOfInput,
    Eos,
    Letter,
    OpenCurly,
    OpenParen,
    Optional,
    Or,
    PlusClose,
}

pub struct Gen<R> {
    pub(crate) input: Input<R>,
    pub(crate) spec: Spec,
    pub(crate) token: Token,
    pub(crate) lexeme: u32,
    pub(crate) in_quote: bool,
    pub(crate) in_ccl: bool,
    /// Name inside the last `[:name:]`.
    pub(crate) class_name: String,
    /// Set when the rule header left the pattern on the current line.
    pub(crate) advance_stop: bool,
    pub(crate) expansions: usize,
}

impl<R: BufRead> Gen<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, Options::default())
    }

    /// Starts from `options` (e.g. a version given on the command line);
    /// directives in the file still override them.
    pub fn with_options(reader: R, options: Options) -> Self {
        let mut spec = Spec::new();
        spec.options = options;
        Self {
            input: Input::new(reader),
            spec,
            token: Token::Eos,
            lexeme: 0,
            in_quote: false,
            in_ccl: false,
            class_name: String::new(),
            advance_stop: false,
            expansions: 0,
        }
    }

    /// Runs the front end and NFA construction.
    pub fn parse(mut self) -> Result<Spec> {
        Phase::ParsingUserCode.enter();
        self.user_code()?;

        Phase::ParsingDeclarations.enter();
        self.user_declare()?;
        self.allocate_bol_eof();

        Phase::ParsingRules.enter();
        self.create_machine()?;
        log::debug!(
            "[nfa] {} nodes, {} rules, {} lexical states",
            self.spec.nfa_states.len(),
            self.spec.rule_count,
            self.spec.states.len()
        );
        Ok(self.spec)
    }

    fn user_code(&mut self) -> Result<()> {
        let mut code = String::new();
        loop {
            if !self.input.next_raw_line()? {
                return Err(self.error(ErrorKind::UnexpectedEof));
            }
            if self.input.starts_with("%%") {
                break;
            }
            code.extend(self.input.line.iter());
        }
        self.spec.user_code = code;
        self.input.index = self.input.line.len();
        Ok(())
    }

    // BOL and EOF take the two symbols right after the real alphabet.
    fn allocate_bol_eof(&mut self) {
        self.spec.bol = self.spec.options.charset_size;
        self.spec.eof = self.spec.bol + 1;
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> LexError {
        self.input.err(kind)
    }
}
