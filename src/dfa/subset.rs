// src/dfa/subset.rs
//! NFA -> DFA by subset construction.
//!
//! A DFA state is identified by the label set of its NFA nodes, kept in
//! `Spec::dfa_sets`. When several accepting nodes meet in one state the
//! lowest label wins; labels follow rule order, so the earliest rule does.

use crate::{
    bitset::BitSet,
    dfa::{DTrans, Dfa},
    nfa::Edge,
    spec::{AcceptId, Anchor, NfaId, Spec},
};

/// Working form of a DFA state while it is being computed.
#[derive(Debug, Default)]
struct Bunch {
    nfa_set: Vec<NfaId>,
    nfa_bit: BitSet,
    accept: Option<AcceptId>,
    anchor: Anchor,
    accept_index: Option<NfaId>,
}

impl Bunch {
    fn seeded(seeds: impl IntoIterator<Item = NfaId>) -> Self {
        let nfa_bit: BitSet = seeds.into_iter().collect();
        Bunch {
            nfa_set: nfa_bit.iter().collect(),
            nfa_bit,
            ..Bunch::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.nfa_set.is_empty()
    }
}

fn e_closure(spec: &Spec, bunch: &mut Bunch) {
    let mut stack = bunch.nfa_set.clone();
    while let Some(id) = stack.pop() {
        let node = &spec.nfa_states[id];
        if let Some(a) = node.accept {
            if bunch.accept_index.is_none_or(|best| id < best) {
                bunch.accept_index = Some(id);
                bunch.accept = Some(a);
                bunch.anchor = node.anchor;
            }
        }
        if node.edge != Edge::Epsilon {
            continue;
        }
        for succ in [node.next, node.sibling].into_iter().flatten() {
            if !bunch.nfa_bit.get(succ) {
                bunch.nfa_bit.set(succ);
                stack.push(succ);
            }
        }
    }
    bunch.nfa_set = bunch.nfa_bit.iter().collect();
}

// Unclosed set of nodes reachable from `dfa` over column `col`.
fn move_on(spec: &Spec, dfa: &Dfa, col: u32) -> Bunch {
    Bunch::seeded(dfa.nfa_set.iter().filter_map(|&id| {
        let node = &spec.nfa_states[id];
        if node.edge.matches(col) {
            node.next
        } else {
            None
        }
    }))
}

// Index of the DFA state for `bunch`, registering a new one if needed.
fn add_to_dstates(spec: &mut Spec, bunch: Bunch) -> usize {
    if let Some(&i) = spec.dfa_sets.get(&bunch.nfa_bit) {
        return i;
    }
    let i = spec.dfa_states.len();
    spec.dfa_sets.insert(bunch.nfa_bit.clone(), i);
    spec.dfa_states.push(Dfa {
        nfa_set: bunch.nfa_set,
        nfa_bit: bunch.nfa_bit,
        accept: bunch.accept,
        anchor: bunch.anchor,
        mark: false,
    });
    i
}

/// Builds `dfa_states`, `dtrans_list` (row i belongs to DFA state i) and
/// the per-lexical-state entry points `state_dtrans`.
pub fn make_dfa(spec: &mut Spec) {
    spec.dfa_states.clear();
    spec.dfa_sets.clear();
    spec.dtrans_list.clear();
    spec.state_dtrans = vec![None; spec.states.len()];

    for s in 0..spec.states.len() {
        if spec.state_rules[s].is_empty() {
            continue;
        }
        let mut bunch = Bunch::seeded(spec.state_rules[s].iter().copied());
        e_closure(spec, &mut bunch);
        let start = add_to_dstates(spec, bunch);
        spec.state_dtrans[s] = Some(start);
    }

    let ncols = spec.dtrans_ncols;
    let mut cursor = 0;
    while cursor < spec.dfa_states.len() {
        spec.dfa_states[cursor].mark = true;
        let mut row = vec![None; ncols];
        for (col, slot) in row.iter_mut().enumerate() {
            let mut bunch = move_on(spec, &spec.dfa_states[cursor], col as u32);
            if bunch.is_empty() {
                continue;
            }
            e_closure(spec, &mut bunch);
            *slot = Some(add_to_dstates(spec, bunch));
        }
        let d = &spec.dfa_states[cursor];
        let dtrans = DTrans {
            row,
            accept: d.accept,
            anchor: d.anchor,
        };
        spec.dtrans_list.push(dtrans);
        log::trace!("[dfa] state {cursor}: {:?}", spec.dfa_states[cursor].nfa_bit);
        cursor += 1;
    }

    log::debug!(
        "[dfa] {} states over {} columns",
        spec.dfa_states.len(),
        ncols
    );
}
