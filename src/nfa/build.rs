// src/nfa/build.rs
//! Recursive-descent regex parser producing Thompson fragments.
//!
//! ```text
//! rule     ::= ['^'] expr ['$']
//! expr     ::= cat_expr ('|' cat_expr)*
//! cat_expr ::= factor factor*
//! factor   ::= term ['*' | '+' | '?']
//! term     ::= char | '.' | '[' ['^'] class ']' | '(' expr ')'
//! ```
//!
//! Every production returns a `(start, end)` pair whose `end` node is an
//! epsilon node with no successors yet; the caller wires it up.

use std::io::BufRead;

use super::{Edge, Nfa};
use crate::{
    charset::{CharSet, NamedClass},
    error::{ErrorKind, Result},
    front::{Gen, Token},
    spec::{Accept, Anchor, NfaId},
};

type Frag = (NfaId, NfaId);

const LINE_SEPARATOR: u32 = 0x2028;
const PARAGRAPH_SEPARATOR: u32 = 0x2029;

impl<R: BufRead> Gen<R> {
    fn node(&mut self, edge: Edge) -> NfaId {
        self.spec.add_nfa(Nfa {
            edge,
            ..Nfa::default()
        })
    }

    fn link(&mut self, from: NfaId, next: NfaId) {
        self.spec.nfa_states[from].next = Some(next);
    }

    /// Reads every rule, threading their start nodes off `nfa_start` and
    /// registering them with their lexical states, then appends the
    /// BOL/EOF pseudo-rule to every state that has rules. A state without
    /// rules keeps an empty list and gets no DFA start state.
    pub(crate) fn create_machine(&mut self) -> Result<()> {
        self.spec.state_rules = vec![Vec::new(); self.spec.states.len()];
        let start = self.node(Edge::Epsilon);
        self.spec.nfa_start = Some(start);
        let mut tail = start;
        let mut first = true;

        loop {
            let Some(states) = self.get_states()? else {
                break;
            };
            self.token = Token::Eos;
            if self.advance()? == Token::EndOfInput {
                break;
            }
            let rule = self.rule()?;
            tail = self.chain(tail, rule, first);
            first = false;
            for s in states {
                self.spec.state_rules[s].push(rule);
            }
        }

        let pseudo = self.pseudo_rule();
        self.chain(tail, pseudo, first);
        for rules in self.spec.state_rules.iter_mut().filter(|r| !r.is_empty()) {
            rules.push(pseudo);
        }
        Ok(())
    }

    // Hangs `rule` off the sibling chain that starts at `nfa_start`.
    fn chain(&mut self, tail: NfaId, rule: NfaId, first: bool) -> NfaId {
        if first {
            self.link(tail, rule);
            return tail;
        }
        let link = self.node(Edge::Epsilon);
        self.link(link, rule);
        self.spec.nfa_states[tail].sibling = Some(link);
        link
    }

    // Lets a scanner consume a BOL or EOF symbol at a token start without
    // matching any rule. Built last, so every real rule outranks it.
    fn pseudo_rule(&mut self) -> NfaId {
        let accept = self.spec.add_accept(Accept {
            rule: None,
            blocks: Vec::new(),
            line: 0,
        });
        let end = self.node(Edge::Epsilon);
        self.spec.nfa_states[end].accept = Some(accept);
        let mut set = CharSet::new();
        set.add(self.spec.bol);
        set.add(self.spec.eof);
        let start = self.node(Edge::Ccl(set));
        self.link(start, end);
        start
    }

    fn rule(&mut self) -> Result<NfaId> {
        let line = self.input.line_number;
        let mut anchor = Anchor::NONE;

        let at_bol = self.token == Token::AtBol;
        if at_bol {
            anchor |= Anchor::START;
            self.advance()?;
        }
        let (body_start, body_end) = self.expr()?;
        let nullable = self.reaches_by_epsilon(body_start, body_end);

        let start = if at_bol {
            let bol = self.node(Edge::Char(self.spec.bol));
            self.link(bol, body_start);
            bol
        } else {
            body_start
        };

        let mut end = body_end;
        if self.token == Token::AtEol {
            anchor |= Anchor::END;
            self.advance()?;
            // Either a line terminator or the EOF symbol.
            let (nl_start, nl_end) = self.new_nl_pair();
            let eof = self.node(Edge::Char(self.spec.eof));
            self.link(eof, nl_end);
            let branch = self.node(Edge::Epsilon);
            self.link(branch, nl_start);
            self.spec.nfa_states[branch].sibling = Some(eof);
            self.link(end, branch);
            end = nl_end;
        }

        match self.token {
            Token::Eos => {}
            Token::CloseParen => return Err(self.error(ErrorKind::UnmatchedParen)),
            _ => {
                return Err(self.error(ErrorKind::Syntax(
                    "unexpected character after pattern".into(),
                )));
            }
        }
        if nullable && !anchor.contains(Anchor::END) {
            return Err(self.error(ErrorKind::ZeroLengthRule));
        }

        let blocks = self.read_action()?;
        let rule = self.spec.rule_count;
        self.spec.rule_count += 1;
        let accept = self.spec.add_accept(Accept {
            rule: Some(rule),
            blocks,
            line,
        });
        let node = &mut self.spec.nfa_states[end];
        node.accept = Some(accept);
        node.anchor = anchor;
        log::trace!("[nfa] rule {rule} (line {line}) starts at node {start}");
        Ok(start)
    }

    // Can `to` be reached from `from` without consuming a symbol?
    fn reaches_by_epsilon(&self, from: NfaId, to: NfaId) -> bool {
        let mut seen = vec![false; self.spec.nfa_states.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if std::mem::replace(&mut seen[id], true) {
                continue;
            }
            let n = &self.spec.nfa_states[id];
            if n.edge == Edge::Epsilon {
                stack.extend(n.next);
                stack.extend(n.sibling);
            }
        }
        false
    }

    // `\n`, `\r`, `\r\n`, and the Unicode line/paragraph separators when
    // the alphabet has them.
    fn new_nl_pair(&mut self) -> Frag {
        let end = self.node(Edge::Epsilon);

        let lf = self.node(Edge::Char('\n' as u32));
        self.link(lf, end);

        let crlf_tail = self.node(Edge::Char('\n' as u32));
        self.link(crlf_tail, end);
        let after_cr = self.node(Edge::Epsilon);
        self.link(after_cr, crlf_tail);
        self.spec.nfa_states[after_cr].sibling = Some(end);
        let cr = self.node(Edge::Char('\r' as u32));
        self.link(cr, after_cr);

        let mut alt = self.node(Edge::Epsilon);
        self.link(alt, cr);
        if self.spec.options.charset_size > PARAGRAPH_SEPARATOR {
            let mut set = CharSet::new();
            set.add(LINE_SEPARATOR);
            set.add(PARAGRAPH_SEPARATOR);
            let sep = self.node(Edge::Ccl(set));
            self.link(sep, end);
            let fork = self.node(Edge::Epsilon);
            self.link(fork, sep);
            self.spec.nfa_states[fork].sibling = Some(alt);
            alt = fork;
        }

        let start = self.node(Edge::Epsilon);
        self.link(start, lf);
        self.spec.nfa_states[start].sibling = Some(alt);
        (start, end)
    }

    fn expr(&mut self) -> Result<Frag> {
        let (mut start, mut end) = self.cat_expr()?;
        while self.token == Token::Or {
            self.advance()?;
            let (s2, e2) = self.cat_expr()?;
            let fork = self.node(Edge::Epsilon);
            self.link(fork, start);
            self.spec.nfa_states[fork].sibling = Some(s2);
            let join = self.node(Edge::Epsilon);
            self.link(end, join);
            self.link(e2, join);
            start = fork;
            end = join;
        }
        Ok((start, end))
    }

    fn cat_expr(&mut self) -> Result<Frag> {
        if !self.first_in_cat()? {
            return Err(self.error(ErrorKind::ZeroLengthRule));
        }
        let (start, mut end) = self.factor()?;
        while self.first_in_cat()? {
            let (s, e) = self.factor()?;
            self.link(end, s);
            end = e;
        }
        Ok((start, end))
    }

    // Whether the current token can begin a factor.
    fn first_in_cat(&self) -> Result<bool> {
        let kind = match self.token {
            Token::CloseParen | Token::AtEol | Token::Or | Token::Eos => return Ok(false),
            Token::Closure | Token::PlusClose | Token::Optional => ErrorKind::DanglingClosure,
            Token::CclEnd => ErrorKind::UnmatchedBracket,
            Token::AtBol => ErrorKind::MisplacedBol,
            Token::EndOfInput => ErrorKind::UnexpectedEof,
            _ => return Ok(true),
        };
        Err(self.error(kind))
    }

    fn factor(&mut self) -> Result<Frag> {
        let (start, end) = self.term()?;
        let op = self.token;
        if !matches!(op, Token::Closure | Token::PlusClose | Token::Optional) {
            return Ok((start, end));
        }
        let new_start = self.node(Edge::Epsilon);
        let new_end = self.node(Edge::Epsilon);
        self.link(new_start, start);
        self.link(end, new_end);
        if matches!(op, Token::Closure | Token::Optional) {
            self.spec.nfa_states[new_start].sibling = Some(new_end);
        }
        if matches!(op, Token::Closure | Token::PlusClose) {
            self.spec.nfa_states[end].sibling = Some(start);
        }
        self.advance()?;
        Ok((new_start, new_end))
    }

    fn term(&mut self) -> Result<Frag> {
        if self.token == Token::OpenParen {
            self.advance()?;
            let frag = self.expr()?;
            if self.token != Token::CloseParen {
                return Err(self.error(ErrorKind::UnmatchedParen));
            }
            self.advance()?;
            return Ok(frag);
        }

        let edge = match self.token {
            Token::Any => {
                let mut set = CharSet::new();
                for c in ['\n' as u32, '\r' as u32, self.spec.bol, self.spec.eof] {
                    set.add(c);
                }
                set.complement();
                Edge::Ccl(set)
            }
            Token::CclStart => self.class()?,
            _ => {
                let c = self.lexeme;
                if c >= self.spec.options.charset_size {
                    return Err(self.error(ErrorKind::CharOutOfRange(c)));
                }
                if self.spec.options.ignore_case {
                    let mut set = CharSet::new();
                    set.add_ncase(c);
                    set.retain_below(self.spec.options.charset_size);
                    if set.members().len() > 1 {
                        Edge::Ccl(set)
                    } else {
                        Edge::Char(c)
                    }
                } else {
                    Edge::Char(c)
                }
            }
        };
        self.advance()?;

        let start = self.node(edge);
        let end = self.node(Edge::Epsilon);
        self.link(start, end);
        Ok((start, end))
    }

    // Cursor token is `[`; leaves the closing `]` as the current token.
    fn class(&mut self) -> Result<Edge> {
        self.advance()?;
        let negated = self.token == Token::AtBol;
        if negated {
            self.advance()?;
        }
        let mut set = CharSet::new();
        if self.token != Token::CclEnd {
            self.dodash(&mut set)?;
        }
        if self.token != Token::CclEnd {
            return Err(self.error(ErrorKind::UnmatchedBracket));
        }
        set.retain_below(self.spec.options.charset_size);
        if negated {
            set.add(self.spec.bol);
            set.add(self.spec.eof);
            set.complement();
        }
        Ok(Edge::Ccl(set))
    }

    fn add_member(&self, set: &mut CharSet, c: u32) {
        if c >= self.spec.options.charset_size {
            return;
        }
        if self.spec.options.ignore_case {
            set.add_ncase(c);
        } else {
            set.add(c);
        }
    }

    // Class body: single characters, `a-z` ranges and `[:name:]` classes.
    // A leading or trailing `-` is literal.
    fn dodash(&mut self, set: &mut CharSet) -> Result<()> {
        let mut first: Option<u32> = None;
        while self.token != Token::Eos && self.token != Token::CclEnd {
            match (self.token, first) {
                (Token::Dash, Some(lo)) => {
                    self.advance()?;
                    match self.token {
                        Token::CclEnd => {
                            self.add_member(set, '-' as u32);
                            break;
                        }
                        Token::Eos => break,
                        Token::CharClass => {
                            return Err(self.error(ErrorKind::Syntax(
                                "character class used as a range bound".into(),
                            )));
                        }
                        _ => {}
                    }
                    let hi = self
                        .lexeme
                        .min(self.spec.options.charset_size.saturating_sub(1));
                    for c in lo..=hi {
                        self.add_member(set, c);
                    }
                    first = None;
                }
                (Token::CharClass, _) => {
                    let class: NamedClass = self.class_name.parse().map_err(|_| {
                        self.error(ErrorKind::UnknownCharClass(self.class_name.clone()))
                    })?;
                    set.add_class(
                        class,
                        self.spec.options.charset_size,
                        self.spec.options.ignore_case,
                    );
                    first = None;
                }
                _ => {
                    first = Some(self.lexeme);
                    self.add_member(set, self.lexeme);
                }
            }
            self.advance()?;
        }
        Ok(())
    }
}
