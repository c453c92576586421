// src/error.rs
//! Fatal diagnostics. The first error aborts the compilation; nothing is
//! recovered or accumulated.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unrecognized or malformed directive")]
    Directive,
    #[error("undeclared lexical state `{0}`")]
    UnknownState(String),
    #[error("undefined macro `{0}`")]
    UndefinedMacro(String),
    #[error("malformed macro definition")]
    MacroDefinition,
    #[error("macro `{0}` is already defined")]
    DuplicateMacro(String),
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("missing `{{` at start of action")]
    MissingBrace,
    #[error("newline inside string or character literal")]
    NewlineInLiteral,
    #[error("rule can match the empty string")]
    ZeroLengthRule,
    #[error("`^` is only allowed at the start of a rule")]
    MisplacedBol,
    #[error("closure operator has nothing to repeat")]
    DanglingClosure,
    #[error("unmatched `[` or misplaced `]`")]
    UnmatchedBracket,
    #[error("unmatched parenthesis")]
    UnmatchedParen,
    #[error("unknown character class `[:{0}:]`")]
    UnknownCharClass(String),
    #[error("character U+{0:04X} is outside the alphabet")]
    CharOutOfRange(u32),
    #[error("%version expects an integer")]
    InvalidVersion,
    #[error("%variants expects a positive integer")]
    InvalidVariants,
    #[error("internal error (compiler bug): {0}")]
    Impossible(String),
    #[error("i/o error: {0}")]
    Io(String),
}

fn line_prefix(line: &usize) -> String {
    match *line {
        0 => String::new(),
        n => format!("line {n}: "),
    }
}

/// `line` is the 1-based input line, or 0 when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{kind}", line_prefix(.line))]
pub struct LexError {
    pub kind: ErrorKind,
    pub line: usize,
}

impl LexError {
    pub fn new(kind: ErrorKind, line: usize) -> Self {
        Self { kind, line }
    }

    /// Attaches a line number unless one is already set.
    pub fn at(mut self, line: usize) -> Self {
        if self.line == 0 {
            self.line = line;
        }
        self
    }

    pub fn impossible(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Impossible(detail.into()), 0)
    }
}

impl From<ErrorKind> for LexError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, 0)
    }
}

impl From<std::io::Error> for LexError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(e.to_string()), 0)
    }
}

pub type Result<T> = std::result::Result<T, LexError>;
