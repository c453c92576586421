// src/spec.rs
//! The compilation context. One `Spec` is threaded by `&mut` through every
//! stage: the front end fills the options, code sections and NFA arena,
//! the alphabet compressor rewrites the edges, the subset construction
//! fills the DFA lists and the minimizer leaves the packed table behind.

use std::ops::{BitOr, BitOrAssign};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    bitset::BitSet,
    dfa::{DTrans, Dfa},
    nfa::Nfa,
};

/// Index into `Spec::nfa_states`; doubles as the node label.
pub type NfaId = usize;
/// Index into `Spec::accepts`. Accepts are compared by this id, never by
/// their code.
pub type AcceptId = usize;

pub const INITIAL_STATE: &str = "YYINITIAL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Anchor(pub u8);

impl Anchor {
    pub const NONE: Anchor = Anchor(0);
    /// Match must begin at the start of a line.
    pub const START: Anchor = Anchor(1);
    /// Match must be followed by a line terminator or end of input.
    pub const END: Anchor = Anchor(2);

    pub fn contains(self, other: Anchor) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Anchor {
    type Output = Anchor;
    fn bitor(self, rhs: Anchor) -> Anchor {
        Anchor(self.0 | rhs.0)
    }
}

impl BitOrAssign for Anchor {
    fn bitor_assign(&mut self, rhs: Anchor) {
        self.0 |= rhs.0;
    }
}

/// One `{...}` action body, braces included, split into lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub lines: Vec<String>,
    pub first_line: usize,
    pub last_line: usize,
}

/// A rule's action: one block per variant (possibly fewer; emitters reuse
/// the last one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accept {
    /// Rule index in declaration order; `None` for the BOL/EOF pseudo-rule.
    pub rule: Option<usize>,
    pub blocks: Vec<CodeBlock>,
    pub line: usize,
}

impl Accept {
    pub fn is_pseudo(&self) -> bool {
        self.rule.is_none()
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub lexer_name: String,
    pub function_name: String,
    pub token_type: String,
    pub namespace: String,
    pub eof_token: Option<String>,
    pub error_token: Option<String>,
    pub char_map: Option<String>,
    pub implements: Option<String>,
    pub attributes: Option<String>,
    pub value_type: Option<String>,
    pub version: i32,
    pub variants: usize,
    /// Number of real codepoints; BOL and EOF take the two columns after.
    pub charset_size: u32,
    pub integer_type: bool,
    pub yyeof: bool,
    pub ignore_case: bool,
    pub count_chars: bool,
    pub count_lines: bool,
    pub count_columns: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            lexer_name: "Yylex".into(),
            function_name: "yylex".into(),
            token_type: "Yytoken".into(),
            namespace: "Lex".into(),
            eof_token: None,
            error_token: None,
            char_map: None,
            implements: None,
            attributes: None,
            value_type: None,
            version: 1,
            variants: 1,
            charset_size: 128,
            integer_type: false,
            yyeof: false,
            ignore_case: false,
            count_chars: false,
            count_lines: false,
            count_columns: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Spec {
    pub options: Options,

    // Code copied through to the emitter.
    pub user_code: String,
    pub class_code: Vec<String>,
    pub init_code: Vec<String>,
    pub ctor_code: Vec<String>,
    pub eof_code: Vec<String>,

    /// Macro name -> parenthesized pattern text.
    pub macros: HashMap<String, String>,
    pub states: Vec<String>,
    state_index: HashMap<String, usize>,

    /// Pseudo symbols, valid after the declarations are read.
    pub bol: u32,
    pub eof: u32,

    // NFA
    pub nfa_states: Vec<Nfa>,
    pub nfa_start: Option<NfaId>,
    /// Per lexical state, the start node of every rule active in it.
    pub state_rules: Vec<Vec<NfaId>>,
    pub accepts: Vec<Accept>,
    pub rule_count: usize,

    // Alphabet compression: codepoint (incl. BOL/EOF) -> column.
    pub ccls_map: Vec<u32>,
    pub dtrans_ncols: usize,

    // DFA
    pub dfa_states: Vec<Dfa>,
    pub dfa_sets: HashMap<BitSet, usize>,
    pub dtrans_list: Vec<DTrans>,
    /// Lexical state -> start DFA state (`None` when the state has no rules).
    pub state_dtrans: Vec<Option<usize>>,

    // Minimized table. `rows` holds the distinct rows over the distinct
    // columns; `row_map[state]` and `col_map[column]` index into it.
    pub row_map: Vec<usize>,
    pub col_map: Vec<usize>,
    pub rows: Vec<Vec<Option<usize>>>,
    pub packed_ncols: usize,
    pub accept_list: Vec<Option<AcceptId>>,
    pub anchor_array: Vec<Anchor>,
}

impl Spec {
    pub fn new() -> Self {
        let mut spec = Self::default();
        spec.add_state(INITIAL_STATE);
        spec
    }

    /// Registers a lexical state; re-declaring one is a no-op.
    pub fn add_state(&mut self, name: &str) -> usize {
        if let Some(&i) = self.state_index.get(name) {
            return i;
        }
        let i = self.states.len();
        self.states.push(name.to_string());
        self.state_index.insert(name.to_string(), i);
        i
    }

    pub fn state(&self, name: &str) -> Option<usize> {
        self.state_index.get(name).copied()
    }

    pub fn add_nfa(&mut self, nfa: Nfa) -> NfaId {
        self.nfa_states.push(nfa);
        self.nfa_states.len() - 1
    }

    pub fn add_accept(&mut self, accept: Accept) -> AcceptId {
        self.accepts.push(accept);
        self.accepts.len() - 1
    }

    /// Rule index of an accept, or `None` for the pseudo-rule.
    pub fn rule_of(&self, accept: AcceptId) -> Option<usize> {
        self.accepts.get(accept).and_then(|a| a.rule)
    }

    /// Alphabet size including the BOL and EOF pseudo symbols.
    pub fn total_symbols(&self) -> usize {
        self.options.charset_size as usize + 2
    }
}
