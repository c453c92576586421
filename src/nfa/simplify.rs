// src/nfa/simplify.rs
//! Alphabet compression. Two symbols share a column iff no edge in the
//! machine tells them apart; edges are then rewritten over columns.

use hashbrown::HashMap;

use super::Edge;
use crate::spec::Spec;

/// Splits the symbol space by every edge and rewrites the NFA in terms of
/// the resulting columns. Sets `ccls_map` and `dtrans_ncols`.
pub fn simplify(spec: &mut Spec) {
    let nsym = spec.total_symbols();
    let mut ccls = vec![0u32; nsym];
    let mut next_cls = 1u32;

    for nfa in &spec.nfa_states {
        match &nfa.edge {
            Edge::Epsilon => {}
            Edge::Char(c) => split(&mut ccls, &mut next_cls, |i| i as u32 == *c),
            Edge::Ccl(set) => split(&mut ccls, &mut next_cls, |i| set.contains(i as u32)),
        }
    }

    for nfa in &mut spec.nfa_states {
        nfa.edge = match &nfa.edge {
            Edge::Epsilon => Edge::Epsilon,
            Edge::Char(c) => Edge::Char(ccls[*c as usize]),
            Edge::Ccl(set) => Edge::Ccl(set.map(&ccls)),
        };
    }

    log::debug!("[nfa] {nsym} symbols compressed to {next_cls} columns");
    spec.ccls_map = ccls;
    spec.dtrans_ncols = next_cls as usize;
}

// Gives the members of `edge` a fresh id in every class the edge cuts.
fn split(ccls: &mut [u32], next_cls: &mut u32, edge: impl Fn(usize) -> bool) {
    // class -> (has a member inside, has a member outside)
    let mut seen: HashMap<u32, (bool, bool)> = HashMap::new();
    for (i, &cls) in ccls.iter().enumerate() {
        let e = seen.entry(cls).or_default();
        if edge(i) {
            e.0 = true;
        } else {
            e.1 = true;
        }
    }

    let mut fresh: HashMap<u32, u32> = HashMap::new();
    for (i, cls) in ccls.iter_mut().enumerate() {
        if !edge(i) || seen.get(cls) != Some(&(true, true)) {
            continue;
        }
        *cls = *fresh.entry(*cls).or_insert_with(|| {
            let id = *next_cls;
            *next_cls += 1;
            id
        });
    }
}
