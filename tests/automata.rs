//! NFA -> DFA -> minimized table: rule priority, longest match, anchors,
//! classes, and equivalence of the three automata on random rule sets.

use cslex::{
    Options, Spec, build_nfa, compile_str,
    dfa::{DTrans, minimize::min_dfa, subset::make_dfa},
    nfa::{Nfa, simplify::simplify},
    scan::Scanner,
    tables::{Accepting, Tables},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn tables(src: &str) -> Tables {
    let spec = compile_str(src).expect("spec should compile");
    Tables::from_spec(&spec).expect("tables")
}

fn rules(body: &str) -> String {
    format!("%%\n%%\n{body}")
}

/// (rule, start, len) of every match.
fn scan(t: &Tables, text: &str) -> Vec<(u32, usize, usize)> {
    let mut s = Scanner::new(t, text);
    s.tokenize()
        .expect("input should scan")
        .into_iter()
        .map(|m| (m.rule, m.start, m.len))
        .collect()
}

#[test]
fn earliest_rule_wins_ties_and_longest_match_wins_overall() {
    let t = tables(&rules("\"if\" { }\n[a-z]+ { }\n\" \" { }\n"));
    assert_eq!(
        scan(&t, "if iff i"),
        vec![(0, 0, 2), (2, 2, 1), (1, 3, 3), (2, 6, 1), (1, 7, 1)]
    );

    let t = tables(&rules("\"ab\" { }\na { }\n. { }\n\\n { }\n"));
    assert_eq!(scan(&t, "ab"), vec![(0, 0, 2)]);
    assert_eq!(scan(&t, "ac\n"), vec![(1, 0, 1), (2, 1, 1), (3, 2, 1)]);
}

#[test]
fn dot_excludes_line_terminators() {
    let t = tables(&rules(". { }\n\\n { }\n\\r { }\n"));
    assert_eq!(
        scan(&t, "a\r\nb"),
        vec![(0, 0, 1), (2, 1, 1), (1, 2, 1), (0, 3, 1)]
    );
}

#[test]
fn ignorecase_folds_literals_and_classes() {
    let src = "%%\n%ignorecase\n%%\n[a-cX] { }\n\"if\" { }\n";
    let t = tables(src);
    assert_eq!(
        scan(&t, "aBxX"),
        vec![(0, 0, 1), (0, 1, 1), (0, 2, 1), (0, 3, 1)]
    );
    assert_eq!(scan(&t, "IfiF"), vec![(1, 0, 2), (1, 2, 2)]);

    let t = tables(&rules("[a-cX] { }\n"));
    let mut s = Scanner::new(&t, "B");
    assert_eq!(s.next_token(), Err(cslex::scan::ScanError::NoMatch(0)));
}

#[test]
fn empty_and_full_classes() {
    let t = tables(&rules("[] { }\na { }\n"));
    assert_eq!(scan(&t, "aa"), vec![(1, 0, 1), (1, 1, 1)]);

    let t = tables(&rules("[^] { }\n"));
    assert_eq!(scan(&t, "a\nb"), vec![(0, 0, 1), (0, 1, 1), (0, 2, 1)]);

    let t = tables(&rules("[^a-] { }\n[-a] { }\n"));
    assert_eq!(scan(&t, "-za"), vec![(1, 0, 1), (0, 1, 1), (1, 2, 1)]);
}

#[test]
fn named_classes_in_rules() {
    let t = tables(&rules("[[:alpha:]_][[:alnum:]_]* { }\n[[:space:]]+ { }\n[[:digit:]]+ { }\n"));
    assert_eq!(
        scan(&t, "x_1  42"),
        vec![(0, 0, 3), (1, 3, 2), (2, 5, 2)]
    );
}

#[test]
fn escapes() {
    let t = tables(&rules("\\x41 { }\n\\102 { }\n\\t { }\n\\\" { }\n\\T { }\n"));
    // `\T` is `\t` again and never wins over the earlier rule.
    assert_eq!(
        scan(&t, "AB\t\""),
        vec![(0, 0, 1), (1, 1, 1), (2, 2, 1), (3, 3, 1)]
    );
}

#[test]
fn start_and_end_anchors() {
    let t = tables(&rules("^foo$ { }\n[a-z]+ { }\n\\r|\\n { }\n"));

    // End anchor gives the terminator back.
    assert_eq!(scan(&t, "foo\n"), vec![(0, 0, 3), (2, 3, 1)]);
    assert_eq!(scan(&t, "foo\r\n"), vec![(0, 0, 3), (2, 3, 1), (2, 4, 1)]);
    // End of input also satisfies `$`.
    assert_eq!(scan(&t, "foo"), vec![(0, 0, 3)]);

    assert_eq!(scan(&t, "foobar\n"), vec![(1, 0, 6), (2, 6, 1)]);
    // Not at the start of a line.
    assert_eq!(scan(&t, "xfoo\n"), vec![(1, 0, 4), (2, 4, 1)]);
    // Start of the second line.
    assert_eq!(
        scan(&t, "a\nfoo\n"),
        vec![(1, 0, 1), (2, 1, 1), (0, 2, 3), (2, 5, 1)]
    );
}

#[test]
fn start_anchor_alone() {
    let t = tables(&rules("^# { }\n# { }\n[a-z ]+ { }\n\\n { }\n"));
    assert_eq!(
        scan(&t, "# a # b\n#"),
        vec![(0, 0, 1), (2, 1, 3), (1, 4, 1), (2, 5, 2), (3, 7, 1), (0, 8, 1)]
    );
}

#[test]
fn empty_input_has_no_tokens() {
    let t = tables(&rules("a { }\n"));
    assert_eq!(scan(&t, ""), vec![]);
}

#[test]
fn compilation_is_deterministic() {
    let src = rules("\"while\" { }\n[a-z]+ { }\n[0-9]+(\\.[0-9]+)? { }\n^#.*$ { }\n(\" \"|\\t)+ { }\n");
    let a = compile_str(&src).unwrap();
    let b = compile_str(&src).unwrap();
    assert_eq!(a.ccls_map, b.ccls_map);
    assert_eq!(a.dtrans_list, b.dtrans_list);
    assert_eq!(a.rows, b.rows);
    assert_eq!(Tables::from_spec(&a).unwrap(), Tables::from_spec(&b).unwrap());
}

#[test]
fn minimizing_twice_changes_nothing() {
    let src = rules("(a|b)*abb { }\n[ab] { }\n(ab|ba)+c { }\n\\n { }\n");
    let mut spec = compile_str(&src).unwrap();
    let dtrans: Vec<DTrans> = spec.dtrans_list.clone();
    let starts = spec.state_dtrans.clone();
    let rows = spec.rows.clone();
    min_dfa(&mut spec);
    assert_eq!(spec.dtrans_list, dtrans);
    assert_eq!(spec.state_dtrans, starts);
    assert_eq!(spec.rows, rows);
}

#[test]
fn equivalent_states_are_merged() {
    // Subset construction yields: start, after `a`, after `c`, after `ab`,
    // after `cb` and the pseudo-rule state. The two middle states and the
    // two accepting ones collapse.
    let spec = compile_str(&rules("ab|cb { }\n")).unwrap();
    assert_eq!(spec.dfa_states.len(), 6);
    assert_eq!(spec.dtrans_list.len(), 4);
    let t = Tables::from_spec(&spec).unwrap();
    assert_eq!(scan(&t, "abcb"), vec![(0, 0, 2), (0, 2, 2)]);
}

#[test]
fn tables_before_minimization_are_rejected() {
    let spec = build_nfa(rules("a { }\n").as_bytes(), Options::default()).unwrap();
    let err = Tables::from_spec(&spec).unwrap_err();
    assert!(matches!(err.kind, cslex::ErrorKind::Impossible(_)));
}

// ---------------------------------------------------------------------------
// Random rule sets: NFA simulation, raw DFA and minimized table must agree on
// the accepting rule after every prefix.

fn gen_regex(rng: &mut StdRng, depth: u32) -> String {
    let leaf = depth == 0 || rng.random_bool(0.3);
    if leaf {
        return match rng.random_range(0..5) {
            0 => "a".into(),
            1 => "b".into(),
            2 => "c".into(),
            3 => "[ab]".into(),
            _ => "[^a]".into(),
        };
    }
    let inner = gen_regex(rng, depth - 1);
    match rng.random_range(0..5) {
        0 => format!("{inner}{}", gen_regex(rng, depth - 1)),
        1 => format!("({inner}|{})", gen_regex(rng, depth - 1)),
        2 => format!("({inner})*"),
        3 => format!("({inner})+"),
        _ => format!("({inner})?"),
    }
}

// Accepting NFA node with the lowest label in the epsilon closure.
fn nfa_accept(nfa: &[Nfa], set: &mut Vec<usize>) -> Option<usize> {
    let mut seen = vec![false; nfa.len()];
    let mut stack = std::mem::take(set);
    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut seen[id], true) {
            continue;
        }
        set.push(id);
        let n = &nfa[id];
        if n.edge == cslex::nfa::Edge::Epsilon {
            stack.extend(n.next);
            stack.extend(n.sibling);
        }
    }
    set.sort_unstable();
    set.iter().find_map(|&id| nfa[id].accept)
}

fn label(spec: &Spec, accept: Option<usize>) -> Option<Accepting> {
    accept.map(|a| match spec.rule_of(a) {
        Some(r) => Accepting::Rule(r as u32),
        None => Accepting::Pseudo,
    })
}

#[test]
fn nfa_dfa_and_minimized_table_agree() {
    let mut rng = StdRng::seed_from_u64(0xdfa);
    for _ in 0..60 {
        let n_rules = rng.random_range(1..=4);
        let mut body = String::new();
        for _ in 0..n_rules {
            // A leading literal keeps every rule non-nullable.
            let lead = ["a", "b", "c"][rng.random_range(0..3)];
            body.push_str(&format!("{lead}{} {{ }}\n", gen_regex(&mut rng, 3)));
        }
        let src = rules(&body);

        let mut spec = build_nfa(src.as_bytes(), Options::default()).unwrap();
        simplify(&mut spec);
        make_dfa(&mut spec);
        let nfa = spec.nfa_states.clone();
        let seeds = spec.state_rules[0].clone();
        let raw = spec.dtrans_list.clone();
        let raw_accept: Vec<Option<Accepting>> =
            raw.iter().map(|d| label(&spec, d.accept)).collect();
        let raw_start = spec.state_dtrans[0].unwrap();
        let ccls = spec.ccls_map.clone();
        min_dfa(&mut spec);
        assert!(spec.dtrans_list.len() <= raw.len(), "{src}");
        let t = Tables::from_spec(&spec).unwrap();
        let min_start = t.start_state(0).unwrap();

        for _ in 0..40 {
            let len = rng.random_range(0..10);
            let word: Vec<char> = (0..len)
                .map(|_| ['a', 'b', 'c', 'd', '\n'][rng.random_range(0..5)])
                .collect();

            let mut set = seeds.clone();
            let mut raw_state = Some(raw_start);
            let mut min_state = Some(min_start);
            let first = label(&spec, nfa_accept(&nfa, &mut set));
            assert_eq!(first, None);

            for (i, &c) in word.iter().enumerate() {
                let col = ccls[c as usize];
                set = set
                    .iter()
                    .filter(|&&id| nfa[id].edge.matches(col))
                    .filter_map(|&id| nfa[id].next)
                    .collect();
                let from_nfa = label(&spec, nfa_accept(&nfa, &mut set));

                raw_state = raw_state.and_then(|s| raw[s].row[col as usize]);
                min_state = min_state.and_then(|s| t.next_state(s, c as u32));
                assert_eq!(
                    raw_state.is_none(),
                    set.is_empty(),
                    "{src} {word:?} @{i}"
                );
                assert_eq!(raw_state.is_none(), min_state.is_none(), "{src} {word:?} @{i}");
                let (Some(r), Some(m)) = (raw_state, min_state) else {
                    break;
                };
                assert_eq!(raw_accept[r], from_nfa, "{src} {word:?} @{i}");
                assert_eq!(t.accepting(m), from_nfa, "{src} {word:?} @{i}");
            }
        }
    }
}
