// src/lib.rs
//! Lexical-analyzer generator. A specification (user code, declarations,
//! rules) is compiled into a minimized DFA transition table:
//!
//! ```text
//! front (rules -> Thompson NFA) -> nfa::simplify (alphabet compression)
//!   -> dfa::subset (subset construction) -> dfa::minimize -> tables
//! ```

pub mod bitset;
pub mod charset;
pub mod dfa;
pub mod error;
pub mod front;
pub mod nfa;
pub mod scan;
pub mod spec;
pub mod tables;

use std::{fmt, io::BufRead};

pub use error::{ErrorKind, LexError};
pub use spec::{Options, Spec};
pub use tables::Tables;

/// Compiler phases, strictly in this order. Rules are turned into NFA
/// fragments as they are read, so `ParsingRules` also covers building the
/// NFA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ParsingUserCode,
    ParsingDeclarations,
    ParsingRules,
    CompressingAlphabet,
    BuildingDfa,
    Minimizing,
    Emitting,
    Done,
}

impl Phase {
    pub fn enter(self) {
        log::info!("{self}");
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::ParsingUserCode => "[gen] processing user code",
            Phase::ParsingDeclarations => "[gen] processing declarations",
            Phase::ParsingRules => "[nfa] reading rules and building the NFA",
            Phase::CompressingAlphabet => "[nfa] compressing the alphabet",
            Phase::BuildingDfa => "[dfa] building the transition table",
            Phase::Minimizing => "[min] minimizing the transition table",
            Phase::Emitting => "[gen] emitting tables",
            Phase::Done => "[gen] done",
        })
    }
}

/// Reads a specification and builds its NFA.
pub fn build_nfa<R: BufRead>(reader: R, options: Options) -> error::Result<Spec> {
    front::Gen::with_options(reader, options).parse()
}

/// Turns the NFA of `spec` into the minimized, packed table.
pub fn build_dfa(spec: &mut Spec) {
    Phase::CompressingAlphabet.enter();
    nfa::simplify::simplify(spec);
    Phase::BuildingDfa.enter();
    dfa::subset::make_dfa(spec);
    Phase::Minimizing.enter();
    dfa::minimize::min_dfa(spec);
}

pub fn compile<R: BufRead>(reader: R) -> error::Result<Spec> {
    let mut spec = build_nfa(reader, Options::default())?;
    build_dfa(&mut spec);
    Ok(spec)
}

pub fn compile_str(src: &str) -> error::Result<Spec> {
    compile(src.as_bytes())
}
