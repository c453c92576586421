//! Table serialization: JSON and the compact binary layout, plus the shape
//! checks that guard loading.

use cslex::{
    compile_str,
    scan::Scanner,
    tables::{
        Accepting, Emit, JsonEmitter, Tables, load_tables_bin_bytes, load_tables_json_bytes,
        save_tables_bin, save_tables_json, write_tables_bin,
    },
};

const SRC: &str = "\
namespace Demo;
%%
%class Demo
%eofval return null;
%state STR
%{
  int n;
%}
%%
<YYINITIAL> \\\" { yybegin(STR); }
[a-z]+ { return Id(); }
^#.*$ { }
\\n { }
<STR> [^\"\\n]+ { }
<STR> \\\" { yybegin(YYINITIAL); }
";

fn sample() -> Tables {
    Tables::from_spec(&compile_str(SRC).expect("spec should compile")).expect("tables")
}

fn matches(t: &Tables, text: &str) -> Vec<(u32, usize, usize)> {
    let mut s = Scanner::new(t, text);
    s.tokenize()
        .unwrap()
        .iter()
        .map(|m| (m.rule, m.start, m.len))
        .collect()
}

#[test]
fn tables_carry_code_and_actions() {
    let t = sample();
    assert_eq!(t.states, vec!["YYINITIAL", "STR"]);
    assert_eq!(t.user_code, "namespace Demo;\n");
    assert_eq!(t.class_code, vec!["  int n;"]);
    assert_eq!(t.options.lexer_name, "Demo");
    assert_eq!(t.actions.len(), 6);
    assert_eq!(t.actions[1].blocks[0].lines, vec!["{ return Id(); }"]);
    assert_eq!(t.actions[1].line, 11);
    assert_eq!(t.bol, 128);
    assert_eq!(t.eof, 129);
    assert_eq!(t.col_map.len(), 130);
    assert!(t.accept.contains(&Some(Accepting::Pseudo)));
    assert_eq!(t.next.len() % t.ncols as usize, 0);
}

#[test]
fn json_round_trip() {
    let t = sample();
    let text = serde_json::to_vec(&t).unwrap();
    let back = load_tables_json_bytes(&text).unwrap();
    assert_eq!(back, t);

    let spec = compile_str(SRC).unwrap();
    let emitted = JsonEmitter { pretty: true }.emit(&spec).unwrap();
    assert_eq!(load_tables_json_bytes(emitted.as_bytes()).unwrap(), t);
    // Unset optional names are left out.
    assert!(!emitted.contains("error_token"));
    assert!(emitted.contains("\"eof_token\": \"return null;\""));
}

#[test]
fn binary_round_trip_keeps_the_automaton() {
    let t = sample();
    let mut buf = Vec::new();
    write_tables_bin(&mut buf, &t).unwrap();
    assert_eq!(&buf[..8], b"CSLEXT01");

    let back = load_tables_bin_bytes(&buf).unwrap();
    assert_eq!(back.states, t.states);
    assert_eq!(back.state_dtrans, t.state_dtrans);
    assert_eq!(back.accept, t.accept);
    assert_eq!(back.anchor, t.anchor);
    assert_eq!(back.col_map, t.col_map);
    assert_eq!(back.row_map, t.row_map);
    assert_eq!(back.next, t.next);
    assert_eq!((back.ncols, back.bol, back.eof), (t.ncols, t.bol, t.eof));
    assert!(back.actions.is_empty());

    let text = "ifx\n# note\n\"y\n";
    assert_eq!(matches(&back, text), matches(&t, text));
}

#[test]
fn scanning_with_the_sample() {
    let t = sample();
    let mut s = Scanner::new(&t, "ab\"c d\"\n# x\n");
    let mut got = Vec::new();
    while let Some(m) = s.next_token().unwrap() {
        match m.rule {
            0 => s.begin(1),
            5 => s.begin(0),
            _ => {}
        }
        got.push((m.rule, s.text(&m)));
    }
    let want: Vec<(u32, String)> = [
        (1, "ab"),
        (0, "\""),
        (4, "c d"),
        (5, "\""),
        (3, "\n"),
        (2, "# x"),
        (3, "\n"),
    ]
    .into_iter()
    .map(|(r, s)| (r, s.to_string()))
    .collect();
    assert_eq!(got, want);
}

#[test]
fn corrupt_binary_is_rejected() {
    let t = sample();
    let mut buf = Vec::new();
    write_tables_bin(&mut buf, &t).unwrap();

    let mut bad = buf.clone();
    bad[0] = b'X';
    let err = load_tables_bin_bytes(&bad).unwrap_err();
    assert!(err.contains("magic"), "{err}");

    let err = load_tables_bin_bytes(&buf[..buf.len() - 1]).unwrap_err();
    assert!(err.contains("truncated"), "{err}");

    assert!(load_tables_bin_bytes(&buf[..4]).is_err());
}

#[test]
fn inconsistent_json_is_rejected() {
    let mut t = sample();
    t.row_map[0] = 9999;
    let err = load_tables_json_bytes(&serde_json::to_vec(&t).unwrap()).unwrap_err();
    assert!(err.contains("row_map"), "{err}");

    let mut t = sample();
    t.accept.pop();
    let err = load_tables_json_bytes(&serde_json::to_vec(&t).unwrap()).unwrap_err();
    assert!(err.contains("per-state"), "{err}");

    assert!(load_tables_json_bytes(b"{").is_err());
}

#[test]
fn save_to_files() {
    let t = sample();
    let dir = std::env::temp_dir();
    let json = dir.join(format!("cslex-{}.tables.json", std::process::id()));
    let bin = dir.join(format!("cslex-{}.tables.bin", std::process::id()));

    save_tables_json(&json, &t).unwrap();
    save_tables_bin(&bin, &t).unwrap();
    let from_json = load_tables_json_bytes(&std::fs::read(&json).unwrap()).unwrap();
    let from_bin = load_tables_bin_bytes(&std::fs::read(&bin).unwrap()).unwrap();
    assert_eq!(from_json, t);
    assert_eq!(from_bin.next, t.next);

    let _ = std::fs::remove_file(json);
    let _ = std::fs::remove_file(bin);
}
