//! The Symbol model shared by every stage of the pipeline: the scanner
//! emits terminals, the translation grammar references terminals,
//! non-terminals and special markers by name, and the output generator
//! dispatches on the name of whatever the translator hands it.

use std::fmt;

/// Terminal name vocabulary. A terminal's `name` is drawn from this
/// closed set; the scanner only ever produces the variants that come
/// straight out of REON source text, while a handful of variants
/// (`Re`, `Ref`, `NRef`, `Lit`) appear only on a grammar rule's output
/// side.
///
/// `set`, `repeat`, `comment` and `named group` each name *one* terminal
/// used on both sides of the grammar: the scanner emits it as a keyword
/// token, and a rule's `attribute_map` threads that same token's attribute
/// straight through to an output terminal of the identical name (the
/// output generator's dispatch table keys on the name, not on which side
/// produced it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    String,
    Number,
    True,
    False,
    Null,
    Repeat,
    NonGreedyRepeat,
    Set,
    NSet,
    Alternatives,
    Group,
    NamedGroup,
    MatchGroup,
    Comment,
    Lookahead,
    NLookahead,
    Lookbehind,
    NLookbehind,
    If,
    Then,
    Else,
    /// Output-only: the `re` terminal, holding escaped-on-emit regex text.
    Re,
    /// Output-only: a named backreference `(?P=name)`.
    Ref,
    /// Output-only: a numbered backreference `\N`.
    NRef,
    /// A fixed snippet of target text carried verbatim by a grammar rule
    /// (e.g. `"(?:"`, `")"`, `"|"`). Never produced by the scanner; the
    /// output generator's dispatch falls through to its literal case
    /// for these, writing the text unchanged.
    Lit(&'static str),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::LBracket => write!(f, "["),
            Term::RBracket => write!(f, "]"),
            Term::LBrace => write!(f, "{{"),
            Term::RBrace => write!(f, "}}"),
            Term::Comma => write!(f, ","),
            Term::Colon => write!(f, ":"),
            Term::String => write!(f, "string"),
            Term::Number => write!(f, "number"),
            Term::True => write!(f, "true"),
            Term::False => write!(f, "false"),
            Term::Null => write!(f, "null"),
            Term::Repeat => write!(f, "repeat"),
            Term::NonGreedyRepeat => write!(f, "non-greedy repeat"),
            Term::Set => write!(f, "set"),
            Term::NSet => write!(f, "!set"),
            Term::Alternatives => write!(f, "alternatives"),
            Term::Group => write!(f, "group"),
            Term::NamedGroup => write!(f, "named group"),
            Term::MatchGroup => write!(f, "match group"),
            Term::Comment => write!(f, "comment"),
            Term::Lookahead => write!(f, "lookahead"),
            Term::NLookahead => write!(f, "!lookahead"),
            Term::Lookbehind => write!(f, "lookbehind"),
            Term::NLookbehind => write!(f, "!lookbehind"),
            Term::If => write!(f, "if"),
            Term::Then => write!(f, "then"),
            Term::Else => write!(f, "else"),
            Term::Re => write!(f, "re"),
            Term::Ref => write!(f, "ref"),
            Term::NRef => write!(f, "nref"),
            Term::Lit(text) => write!(f, "{:?}", text),
        }
    }
}

/// Non-terminal name vocabulary, one variant per left-hand side in
/// [`crate::grammar::reon_grammar`]. `E` is the grammar's start symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerm {
    E,
    Re,
    ReFull,
    Obj,
    Ref,
    IfRef,
    Else,
    ReListE,
    ReList,
    ReListComma,
    ReAlistE,
    ReAlist,
    ReAlistComma,
}

impl fmt::Display for NonTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NonTerm::E => "E",
            NonTerm::Re => "RE",
            NonTerm::ReFull => "REFULL",
            NonTerm::Obj => "OBJ",
            NonTerm::Ref => "Ref",
            NonTerm::IfRef => "IfRef",
            NonTerm::Else => "Else",
            NonTerm::ReListE => "RE-listE",
            NonTerm::ReList => "RE-list",
            NonTerm::ReListComma => "RE-list-comma",
            NonTerm::ReAlistE => "RE-AlistE",
            NonTerm::ReAlist => "RE-Alist",
            NonTerm::ReAlistComma => "RE-Alist-comma",
        };
        write!(f, "{}", name)
    }
}

/// Special markers, injected only on a rule's output side. Each triggers
/// a generator action rather than writing text, except `Variable`
/// which does write text: the configured output variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    Group,
    FixedLengthCheck,
    EndCheck,
    Variable,
}

impl fmt::Display for Special {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Special::Group => "group",
            Special::FixedLengthCheck => "fixed_length_check",
            Special::EndCheck => "end_check",
            Special::Variable => "variable",
        };
        write!(f, "{}", name)
    }
}

/// The pipeline's universal currency: every stage passes these around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Terminal(Term, String),
    NonTerminal(NonTerm),
    Special(Special),
    Eof,
}

impl Symbol {
    /// A terminal with no lexeme payload (structural tokens, keywords with
    /// no attribute, and every output-side literal).
    pub fn terminal(term: Term) -> Self {
        Symbol::Terminal(term, String::new())
    }

    /// A terminal carrying the given attribute string.
    pub fn with_attribute(term: Term, attribute: impl Into<String>) -> Self {
        Symbol::Terminal(term, attribute.into())
    }

    /// The terminal name, if this is a terminal.
    pub fn term(&self) -> Option<Term> {
        match self {
            Symbol::Terminal(t, _) => Some(*t),
            _ => None,
        }
    }

    /// The attribute string; empty for anything that is not a terminal or
    /// for a terminal that was never given one.
    pub fn attribute(&self) -> &str {
        match self {
            Symbol::Terminal(_, attribute) => attribute,
            _ => "",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Terminal(t, _) => write!(f, "{}", t),
            Symbol::NonTerminal(n) => write!(f, "{}", n),
            Symbol::Special(s) => write!(f, "{}", s),
            Symbol::Eof => write!(f, "<eof>"),
        }
    }
}

/// A terminal emitted by the scanner. An alias rather than a distinct
/// type, since every scanner token is just a `Symbol::Terminal` (or
/// `Symbol::Eof` once the source is exhausted).
pub type Token = Symbol;
