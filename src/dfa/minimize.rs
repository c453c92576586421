// src/dfa/minimize.rs
//! DFA minimization.
//!
//! States start out grouped by accept id and groups are split until every
//! member of a group moves to the same groups on every column. Groups are
//! numbered by their lowest original state, so minimizing an already
//! minimal table is the identity. `reduce` then packs identical columns
//! and rows into `rows` via `col_map`/`row_map`.

use hashbrown::HashMap;

use crate::{dfa::DTrans, spec::Spec};

fn initial_groups(spec: &Spec) -> Vec<usize> {
    let mut ids = HashMap::new();
    spec.dtrans_list
        .iter()
        .map(|d| {
            let next = ids.len();
            *ids.entry(d.accept).or_insert(next)
        })
        .collect()
}

// One refinement pass. Returns the new group of each state and the group
// count.
fn refine(spec: &Spec, group: &[usize]) -> (Vec<usize>, usize) {
    let mut ids: HashMap<(usize, Vec<Option<usize>>), usize> = HashMap::new();
    let next = spec
        .dtrans_list
        .iter()
        .enumerate()
        .map(|(s, d)| {
            let sig: Vec<Option<usize>> = d.row.iter().map(|t| t.map(|t| group[t])).collect();
            let n = ids.len();
            *ids.entry((group[s], sig)).or_insert(n)
        })
        .collect();
    (next, ids.len())
}

/// Merges equivalent states in place, then packs the table.
pub fn min_dfa(spec: &mut Spec) {
    let before = spec.dtrans_list.len();
    let mut group = initial_groups(spec);
    let mut count = group.iter().max().map_or(0, |&g| g + 1);
    loop {
        let (next, n) = refine(spec, &group);
        group = next;
        if n == count {
            break;
        }
        count = n;
    }

    // Representative of each group: its lowest state, which is the first
    // one seen in state order.
    let mut rep = vec![usize::MAX; count];
    for (s, &g) in group.iter().enumerate() {
        if rep[g] == usize::MAX {
            rep[g] = s;
        }
    }
    let dtrans: Vec<DTrans> = rep
        .iter()
        .map(|&s| {
            let d = &spec.dtrans_list[s];
            DTrans {
                row: d.row.iter().map(|t| t.map(|t| group[t])).collect(),
                accept: d.accept,
                anchor: d.anchor,
            }
        })
        .collect();
    spec.dtrans_list = dtrans;
    for start in spec.state_dtrans.iter_mut().flatten() {
        *start = group[*start];
    }
    log::debug!("[min] {before} states merged into {count}");

    reduce(spec);
}

/// Packs identical columns, then identical rows, numbering both by first
/// occurrence. Splits accept and anchor out into side arrays.
pub fn reduce(spec: &mut Spec) {
    let ncols = spec.dtrans_ncols;

    let mut col_ids: HashMap<Vec<Option<usize>>, usize> = HashMap::new();
    let mut kept_cols = Vec::new();
    spec.col_map = (0..ncols)
        .map(|c| {
            let column: Vec<Option<usize>> = spec.dtrans_list.iter().map(|d| d.row[c]).collect();
            let n = col_ids.len();
            *col_ids.entry(column).or_insert_with(|| {
                kept_cols.push(c);
                n
            })
        })
        .collect();

    let mut row_ids: HashMap<Vec<Option<usize>>, usize> = HashMap::new();
    let mut rows = Vec::new();
    spec.row_map = spec
        .dtrans_list
        .iter()
        .map(|d| {
            let packed: Vec<Option<usize>> = kept_cols.iter().map(|&c| d.row[c]).collect();
            let n = row_ids.len();
            *row_ids.entry(packed.clone()).or_insert_with(|| {
                rows.push(packed);
                n
            })
        })
        .collect();

    spec.packed_ncols = kept_cols.len();
    spec.rows = rows;
    spec.accept_list = spec.dtrans_list.iter().map(|d| d.accept).collect();
    spec.anchor_array = spec.dtrans_list.iter().map(|d| d.anchor).collect();
    log::debug!(
        "[min] packed to {} rows x {} columns (from {} x {})",
        spec.rows.len(),
        spec.packed_ncols,
        spec.dtrans_list.len(),
        ncols
    );
}
