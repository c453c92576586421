// src/dfa/mod.rs
//! Subset construction and minimization over the compressed alphabet.

pub mod minimize;
pub mod subset;

use std::fmt::Write;

use crate::{
    bitset::BitSet,
    nfa::printable,
    spec::{AcceptId, Anchor, NfaId, Spec},
};

/// A DFA state: the epsilon-closed set of NFA nodes it stands for.
#[derive(Debug, Clone)]
pub struct Dfa {
    /// Sorted by label.
    pub nfa_set: Vec<NfaId>,
    pub nfa_bit: BitSet,
    pub accept: Option<AcceptId>,
    pub anchor: Anchor,
    /// Outgoing transitions computed.
    pub mark: bool,
}

/// One transition row over compressed columns; `None` is the error
/// transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DTrans {
    pub row: Vec<Option<usize>>,
    pub accept: Option<AcceptId>,
    pub anchor: Anchor,
}

fn anchor_text(a: Anchor) -> String {
    let mut s = String::new();
    if a.contains(Anchor::START) {
        s.push_str("start ");
    }
    if a.contains(Anchor::END) {
        s.push_str("end ");
    }
    s
}

/// Lexical states with their entry rows, then every row of `dtrans_list`
/// with its accept and outgoing transitions grouped by target. Symbols are
/// listed by raw codepoint.
pub fn dump_dfa(spec: &Spec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/*---------------------- DFA -----------------------");
    for (i, name) in spec.states.iter().enumerate() {
        let _ = writeln!(out, "State \"{name}\" has identifying index {i}.");
        match spec.state_dtrans.get(i).copied().flatten() {
            Some(d) => {
                let _ = writeln!(out, "\tStart index in transition table: {d}");
            }
            None => {
                let _ = writeln!(out, "\tNo associated transition states.");
            }
        }
    }

    // column -> raw symbols that map to it
    let mut symbols: Vec<Vec<u32>> = vec![Vec::new(); spec.dtrans_ncols];
    for (sym, &col) in spec.ccls_map.iter().enumerate() {
        if let Some(v) = symbols.get_mut(col as usize) {
            v.push(sym as u32);
        }
    }

    for (i, d) in spec.dtrans_list.iter().enumerate() {
        match d.accept {
            None => {
                let _ = write!(out, " * State {i} [nonaccepting]");
            }
            Some(a) => {
                let what = match spec.rule_of(a) {
                    Some(r) => format!("rule {r}"),
                    None => "pseudo".to_string(),
                };
                let _ = write!(out, " * State {i} [accepting, <{what}>]");
                if !d.anchor.is_none() {
                    let _ = write!(out, " Anchor: {}", anchor_text(d.anchor));
                }
            }
        }
        let mut targets: Vec<(usize, Vec<u32>)> = Vec::new();
        for (col, t) in d.row.iter().enumerate() {
            let Some(t) = *t else { continue };
            let syms = symbols.get(col).cloned().unwrap_or_default();
            match targets.iter_mut().find(|(x, _)| *x == t) {
                Some((_, v)) => v.extend(syms),
                None => targets.push((t, syms)),
            }
        }
        for (t, mut syms) in targets {
            syms.sort_unstable();
            let _ = write!(out, "\n *    goto {t} on ");
            for s in syms {
                out.push_str(&printable(s, spec));
            }
        }
        out.push('\n');
    }
    let _ = writeln!(out, "*/");
    out
}
