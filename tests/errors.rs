//! Every malformed specification aborts with one error carrying its kind
//! and the offending line.

use cslex::{ErrorKind, LexError, compile_str};

fn fail(src: &str) -> LexError {
    match compile_str(src) {
        Ok(_) => panic!("expected an error for {src:?}"),
        Err(e) => e,
    }
}

fn kind(src: &str) -> ErrorKind {
    fail(src).kind
}

fn rule(pattern: &str) -> ErrorKind {
    kind(&format!("%%\n%%\n{pattern} {{ }}\n"))
}

#[test]
fn missing_section_markers() {
    assert_eq!(kind("int x;\n"), ErrorKind::UnexpectedEof);
    assert_eq!(kind("%%\n%class X\n"), ErrorKind::UnexpectedEof);
    assert_eq!(kind(""), ErrorKind::UnexpectedEof);
}

#[test]
fn bad_directives() {
    let e = fail("%%\n%bogus\n%%\n");
    assert_eq!(e.kind, ErrorKind::Directive);
    assert_eq!(e.line, 2);

    assert_eq!(kind("%%\n%class\n%%\na { }\n"), ErrorKind::Directive);
    assert_eq!(kind("%%\n%version abc\n%%\na { }\n"), ErrorKind::InvalidVersion);
    assert_eq!(kind("%%\n%variants 0\n%%\na { }\n"), ErrorKind::InvalidVariants);
    assert_eq!(kind("%%\n%variants -2\n%%\na { }\n"), ErrorKind::InvalidVariants);
    assert_eq!(kind("%%\n%{\nint x;\n"), ErrorKind::UnexpectedEof);
}

#[test]
fn bad_macros() {
    assert_eq!(kind("%%\nD =\n%%\na { }\n"), ErrorKind::MacroDefinition);
    assert_eq!(kind("%%\n=[0-9]\n%%\na { }\n"), ErrorKind::MacroDefinition);

    let e = fail("%%\nD [0-9]\nD [a-z]\n%%\na { }\n");
    assert_eq!(e.kind, ErrorKind::DuplicateMacro("D".into()));
    assert_eq!(e.line, 3);

    let e = fail("%%\n%%\na { }\n{X}+ { }\n");
    assert_eq!(e.kind, ErrorKind::UndefinedMacro("X".into()));
    assert_eq!(e.line, 4);
    assert_eq!(e.to_string(), "line 4: undefined macro `X`");

    assert!(matches!(
        kind("%%\nA {A}x\n%%\n{A} { }\n"),
        ErrorKind::Syntax(_)
    ));
    assert!(matches!(kind("%%\n%%\n{X\n"), ErrorKind::Syntax(_)));
}

#[test]
fn unknown_state_in_header() {
    let e = fail("%%\n%state A\n%%\n<A> a { }\n<A,B> b { }\n");
    assert_eq!(e.kind, ErrorKind::UnknownState("B".into()));
    assert_eq!(e.line, 5);
}

#[test]
fn bad_actions() {
    assert_eq!(kind("%%\n%%\na x\n"), ErrorKind::MissingBrace);
    assert_eq!(kind("%%\n%%\na\n"), ErrorKind::UnexpectedEof);
    assert_eq!(kind("%%\n%%\na { x\n"), ErrorKind::UnexpectedEof);

    let e = fail("%%\n%%\na { s = \"abc\n\"; }\n");
    assert_eq!(e.kind, ErrorKind::NewlineInLiteral);
    assert_eq!(e.line, 3);
    assert_eq!(
        kind("%%\n%%\na { c = '\n'; }\n"),
        ErrorKind::NewlineInLiteral
    );
}

#[test]
fn rules_matching_the_empty_string() {
    for pattern in ["a*", "a?", "(a|b)*", "(a|)", "()", "^a*", "(a*)(b?)"] {
        assert_eq!(rule(pattern), ErrorKind::ZeroLengthRule, "{pattern}");
    }
    // A trailing `$` always consumes a line terminator or EOF.
    assert!(compile_str("%%\n%%\na*$ { }\n").is_ok());
}

#[test]
fn misplaced_operators() {
    assert_eq!(rule("a^b"), ErrorKind::MisplacedBol);
    assert_eq!(rule("*a"), ErrorKind::DanglingClosure);
    assert_eq!(rule("a|+b"), ErrorKind::DanglingClosure);
    assert_eq!(rule("]a"), ErrorKind::UnmatchedBracket);
    assert_eq!(rule("[abc"), ErrorKind::UnmatchedBracket);
    assert_eq!(rule("(ab"), ErrorKind::UnmatchedParen);
    assert_eq!(rule("ab)"), ErrorKind::UnmatchedParen);
    assert!(matches!(rule("a$b"), ErrorKind::Syntax(_)));
    assert!(matches!(rule("\"ab"), ErrorKind::Syntax(_)));
}

#[test]
fn character_classes() {
    assert_eq!(
        rule("[[:greek:]]"),
        ErrorKind::UnknownCharClass("greek".into())
    );
    assert!(matches!(rule("[[:alpha]"), ErrorKind::Syntax(_)));
    assert!(compile_str("%%\n%%\n[[:alpha:][:digit:]_]+ { }\n").is_ok());
}

#[test]
fn characters_outside_the_alphabet() {
    assert_eq!(rule("\\x80"), ErrorKind::CharOutOfRange(0x80));
    assert_eq!(rule("é"), ErrorKind::CharOutOfRange(0xe9));
    assert!(compile_str("%%\n%full\n%%\n\\xff { }\n").is_ok());
    // Class members past the alphabet are dropped, not rejected.
    assert!(compile_str("%%\n%%\n[a-é] { }\n").is_ok());
}

#[test]
fn error_display() {
    let e = LexError::new(ErrorKind::ZeroLengthRule, 7);
    assert_eq!(e.to_string(), "line 7: rule can match the empty string");
    let e = LexError::from(ErrorKind::MissingBrace);
    assert_eq!(e.to_string(), "missing `{` at start of action");
    assert_eq!(e.at(3).line, 3);
    assert_eq!(LexError::new(ErrorKind::Directive, 2).at(9).line, 2);
}
