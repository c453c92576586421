// src/tables/mod.rs
//! Integer-only view of a finished `Spec`, as consumed by emitters and by
//! the reference scanner.

pub mod emit;
pub mod io;

pub use emit::{Emit, JsonEmitter};
pub use io::{
    load_tables_bin_bytes, load_tables_json_bytes, save_tables_bin, save_tables_json,
    write_tables_bin,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{LexError, Result},
    spec::{Anchor, CodeBlock, Options, Spec},
};

/// What a DFA state accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accepting {
    Rule(u32),
    /// BOL/EOF bookkeeping; a scanner drops the (empty) match.
    Pseudo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    pub line: usize,
    pub blocks: Vec<CodeBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    /// Lexical state names; index = state number.
    pub states: Vec<String>,
    /// Lexical state -> start DFA state.
    pub state_dtrans: Vec<Option<u32>>,
    /// Per DFA state.
    pub accept: Vec<Option<Accepting>>,
    pub anchor: Vec<Anchor>,
    /// Raw symbol (codepoint, then BOL, then EOF) -> packed column.
    pub col_map: Vec<u32>,
    /// DFA state -> packed row.
    pub row_map: Vec<u32>,
    /// Packed rows, row-major, `ncols` entries each.
    pub next: Vec<Option<u32>>,
    pub ncols: u32,
    pub bol: u32,
    pub eof: u32,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    #[serde(default)]
    pub user_code: String,
    #[serde(default)]
    pub class_code: Vec<String>,
    #[serde(default)]
    pub init_code: Vec<String>,
    #[serde(default)]
    pub ctor_code: Vec<String>,
    #[serde(default)]
    pub eof_code: Vec<String>,
}

impl Tables {
    /// Flattens a minimized `Spec`.
    pub fn from_spec(spec: &Spec) -> Result<Tables> {
        if spec.dtrans_ncols == 0
            || spec.row_map.len() != spec.dtrans_list.len()
            || spec.col_map.len() != spec.dtrans_ncols
        {
            return Err(LexError::impossible("tables requested before minimization"));
        }

        let col_map = spec
            .ccls_map
            .iter()
            .map(|&c| spec.col_map[c as usize] as u32)
            .collect();

        let mut next = Vec::with_capacity(spec.rows.len() * spec.packed_ncols);
        for row in &spec.rows {
            next.extend(row.iter().map(|t| t.map(|t| t as u32)));
        }

        let accept = spec
            .accept_list
            .iter()
            .map(|a| {
                a.map(|a| match spec.rule_of(a) {
                    Some(r) => Accepting::Rule(r as u32),
                    None => Accepting::Pseudo,
                })
            })
            .collect();

        let actions = spec
            .accepts
            .iter()
            .filter(|a| !a.is_pseudo())
            .map(|a| RuleAction {
                line: a.line,
                blocks: a.blocks.clone(),
            })
            .collect();

        Ok(Tables {
            states: spec.states.clone(),
            state_dtrans: spec
                .state_dtrans
                .iter()
                .map(|s| s.map(|s| s as u32))
                .collect(),
            accept,
            anchor: spec.anchor_array.clone(),
            col_map,
            row_map: spec.row_map.iter().map(|&r| r as u32).collect(),
            next,
            ncols: spec.packed_ncols as u32,
            bol: spec.bol,
            eof: spec.eof,
            options: spec.options.clone(),
            actions,
            user_code: spec.user_code.clone(),
            class_code: spec.class_code.clone(),
            init_code: spec.init_code.clone(),
            ctor_code: spec.ctor_code.clone(),
            eof_code: spec.eof_code.clone(),
        })
    }

    pub fn state_count(&self) -> usize {
        self.row_map.len()
    }

    pub fn start_state(&self, lexical_state: usize) -> Option<usize> {
        self.state_dtrans
            .get(lexical_state)
            .copied()
            .flatten()
            .map(|s| s as usize)
    }

    /// Transition from DFA `state` on raw `symbol`; `None` is the error
    /// transition (also for symbols outside the alphabet).
    #[inline]
    pub fn next_state(&self, state: usize, symbol: u32) -> Option<usize> {
        let col = *self.col_map.get(symbol as usize)? as usize;
        let row = *self.row_map.get(state)? as usize;
        self.next
            .get(row * self.ncols as usize + col)
            .copied()
            .flatten()
            .map(|s| s as usize)
    }

    pub fn accepting(&self, state: usize) -> Option<Accepting> {
        self.accept.get(state).copied().flatten()
    }

    pub fn anchor_of(&self, state: usize) -> Anchor {
        self.anchor.get(state).copied().unwrap_or_default()
    }
}
