// src/nfa/mod.rs
//! Thompson NFA kept in an arena (`Spec::nfa_states`). Nodes have at most
//! two successors: `next`, reached over `edge`, and `sibling`, which is
//! only followed for epsilon nodes.

pub mod build;
pub mod simplify;

use std::fmt::Write;

use crate::{
    charset::CharSet,
    spec::{AcceptId, Anchor, NfaId, Spec},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Epsilon,
    Char(u32),
    Ccl(CharSet),
}

impl Edge {
    #[inline]
    pub fn matches(&self, c: u32) -> bool {
        match self {
            Edge::Epsilon => false,
            Edge::Char(e) => *e == c,
            Edge::Ccl(set) => set.contains(c),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Nfa {
    pub edge: Edge,
    pub next: Option<NfaId>,
    pub sibling: Option<NfaId>,
    pub accept: Option<AcceptId>,
    pub anchor: Anchor,
}

impl Default for Nfa {
    fn default() -> Self {
        Self {
            edge: Edge::Epsilon,
            next: None,
            sibling: None,
            accept: None,
            anchor: Anchor::NONE,
        }
    }
}

pub(crate) fn printable(c: u32, spec: &Spec) -> String {
    if c == spec.bol && spec.bol != 0 {
        return "BOL".into();
    }
    if c == spec.eof && spec.eof != 0 {
        return "EOF".into();
    }
    match char::from_u32(c) {
        Some('\u{8}') => "\\b".into(),
        Some('\t') => "\\t".into(),
        Some('\n') => "\\n".into(),
        Some('\u{c}') => "\\f".into(),
        Some('\r') => "\\r".into(),
        Some(' ') => "\\ ".into(),
        Some(ch) if !ch.is_control() => ch.to_string(),
        _ => format!("\\u{{{c:x}}}"),
    }
}

fn label(id: Option<NfaId>) -> String {
    id.map_or_else(|| "--".to_string(), |i| i.to_string())
}

/// Human-readable listing of the NFA arena, one node per line, followed by
/// the rule start nodes of every lexical state.
pub fn dump_nfa(spec: &Spec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--------------------- NFA -----------------------");
    for (i, nfa) in spec.nfa_states.iter().enumerate() {
        let _ = write!(out, "Nfa state {i}: ");
        if nfa.next.is_none() {
            out.push_str("(TERMINAL)");
        } else {
            let _ = write!(out, "--> {} --> {}", label(nfa.next), label(nfa.sibling));
            match &nfa.edge {
                Edge::Epsilon => out.push_str(" EPSILON "),
                Edge::Char(c) => {
                    let _ = write!(out, " {}", printable(*c, spec));
                }
                Edge::Ccl(set) => {
                    out.push_str(" [");
                    for c in 0..spec.total_symbols() as u32 {
                        if set.contains(c) {
                            out.push_str(&printable(c, spec));
                        }
                    }
                    out.push(']');
                }
            }
        }
        if Some(i) == spec.nfa_start {
            out.push_str(" (START STATE)");
        }
        if let Some(a) = nfa.accept {
            let start = if nfa.anchor.contains(Anchor::START) { "^" } else { "" };
            let end = if nfa.anchor.contains(Anchor::END) { "$" } else { "" };
            match spec.rule_of(a) {
                Some(r) => {
                    let _ = write!(out, " accepting {start}<rule {r}>{end}");
                }
                None => out.push_str(" accepting <pseudo>"),
            }
        }
        out.push('\n');
    }
    for (s, rules) in spec.state_rules.iter().enumerate() {
        let name = spec.states.get(s).map(String::as_str).unwrap_or("?");
        let ids: Vec<String> = rules.iter().map(|r| r.to_string()).collect();
        let _ = writeln!(out, "{name}: {}", ids.join(" "));
    }
    let _ = writeln!(out, "-------------------- NFA ----------------------");
    out
}
