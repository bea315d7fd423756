//! A hand-written scanner. REON's token vocabulary is small and
//! irregular enough (keyword disambiguation depends on a trailing `:`,
//! numbers follow the JSON grammar, strings carry a `\u` escape that
//! decodes to raw bytes) that a table-driven matcher buys nothing; this
//! walks the byte buffer by hand instead.

use std::fmt;

use crate::error::Error;
use crate::symbols::{Symbol, Term, Token};

/// A human-friendly source position, one-based in both dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Default for Location {
    fn default() -> Self {
        Location { row: 1, col: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, dest: &mut fmt::Formatter) -> fmt::Result {
        write!(dest, "{}:{}", self.row, self.col)
    }
}

/// The shape a `repeat`/`non-greedy repeat` attribute's tail takes, used
/// to decide which terminal the keyword ultimately becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepeatShape {
    /// `*`, `+` or `?`.
    Atomic,
    /// A bare count with no dash: `"4"`.
    Count,
    /// A dash is present, bound(s) on either side optional: `"2-4"`,
    /// `"2-"`, `"-4"`.
    Range,
    Invalid,
}

fn classify_repeat_tail(tail: &str) -> RepeatShape {
    if tail == "*" || tail == "+" || tail == "?" {
        return RepeatShape::Atomic;
    }
    let bytes = tail.as_bytes();
    if bytes.is_empty() {
        return RepeatShape::Invalid;
    }
    let mut i = 0;
    let leading_dash = bytes[0] == b'-';
    if leading_dash {
        i = 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let had_leading_digits = i > digits_start;
    if leading_dash {
        return if had_leading_digits && i == bytes.len() {
            RepeatShape::Range
        } else {
            RepeatShape::Invalid
        };
    }
    if !had_leading_digits {
        return RepeatShape::Invalid;
    }
    if i == bytes.len() {
        return RepeatShape::Count;
    }
    if bytes[i] != b'-' {
        return RepeatShape::Invalid;
    }
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == bytes.len() {
        RepeatShape::Range
    } else {
        RepeatShape::Invalid
    }
}

/// Decide the keyword a `"repeat "`/`"non-greedy repeat "` prefixed string
/// resolves to, given its tail (the text after the prefix). Returns the
/// terminal and the attribute it should carry.
fn classify_repeat(non_greedy: bool, tail: &str) -> (Term, String) {
    match classify_repeat_tail(tail) {
        RepeatShape::Invalid => {
            let prefix = if non_greedy {
                "non-greedy repeat "
            } else {
                "repeat "
            };
            (Term::String, format!("{}{}", prefix, tail))
        }
        RepeatShape::Count if non_greedy => {
            // Non-greedy is meaningless on an exact count: reclassify down
            // to a plain repeat.
            (Term::Repeat, tail.to_string())
        }
        _ if non_greedy => (Term::NonGreedyRepeat, tail.to_string()),
        _ => (Term::Repeat, tail.to_string()),
    }
}

/// Resolve a scanned string's keyword class, against REON's closed
/// keyword vocabulary. A string token is only ever reclassified when it
/// is immediately followed by `:` in the source (checked by the
/// caller); this function only interprets the string's own text.
fn classify_keyword(text: &str) -> Token {
    if let Some(tail) = text.strip_prefix("repeat ") {
        let (term, attribute) = classify_repeat(false, tail);
        return Symbol::with_attribute(term, attribute);
    }
    if let Some(tail) = text.strip_prefix("non-greedy repeat ") {
        let (term, attribute) = classify_repeat(true, tail);
        return Symbol::with_attribute(term, attribute);
    }
    if let Some(name) = text.strip_prefix("group ") {
        return Symbol::with_attribute(Term::NamedGroup, name);
    }
    let term = match text {
        "set" => Some(Term::Set),
        "!set" | "negated set" => Some(Term::NSet),
        "alternatives" => Some(Term::Alternatives),
        "group" => Some(Term::Group),
        "match group" => Some(Term::MatchGroup),
        "comment" => Some(Term::Comment),
        "lookahead" => Some(Term::Lookahead),
        "!lookahead" | "negative lookahead" => Some(Term::NLookahead),
        "lookbehind" => Some(Term::Lookbehind),
        "!lookbehind" | "negative lookbehind" => Some(Term::NLookbehind),
        "if" => Some(Term::If),
        "then" => Some(Term::Then),
        "else" => Some(Term::Else),
        _ => None,
    };
    match term {
        Some(term) => Symbol::terminal(term),
        None => Symbol::with_attribute(Term::String, text),
    }
}

/// Walks a REON document byte by byte, producing the token stream the
/// translator drives itself with.
pub struct Scanner {
    buffer: Vec<u8>,
    position: usize,
    row: usize,
    col: usize,
    done: bool,
    last_location: Location,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            buffer: source.as_bytes().to_vec(),
            position: 0,
            row: 1,
            col: 1,
            done: false,
            last_location: Location::default(),
        }
    }

    /// The position at which the most recently returned token started.
    /// Used by the translator to attach a location to a `SyntaxError`.
    pub fn last_location(&self) -> Location {
        self.last_location
    }

    fn peek(&self) -> Option<u8> {
        self.buffer.get(self.position).copied()
    }

    fn location(&self) -> Location {
        Location {
            row: self.row,
            col: self.col,
        }
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        if byte == b'\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Produces the next token. Idempotent once the buffer is exhausted:
    /// every subsequent call keeps returning `Symbol::Eof`.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        if self.done {
            return Ok(Symbol::Eof);
        }
        self.skip_whitespace();
        let location = self.location();
        self.last_location = location;
        let Some(byte) = self.peek() else {
            self.done = true;
            return Ok(Symbol::Eof);
        };
        match byte {
            b'[' => {
                self.advance();
                Ok(Symbol::terminal(Term::LBracket))
            }
            b']' => {
                self.advance();
                Ok(Symbol::terminal(Term::RBracket))
            }
            b'{' => {
                self.advance();
                Ok(Symbol::terminal(Term::LBrace))
            }
            b'}' => {
                self.advance();
                Ok(Symbol::terminal(Term::RBrace))
            }
            b',' => {
                self.advance();
                Ok(Symbol::terminal(Term::Comma))
            }
            b':' => {
                self.advance();
                Ok(Symbol::terminal(Term::Colon))
            }
            b'"' => self.scan_string(location),
            b'-' | b'0'..=b'9' => self.scan_number(location),
            b't' => self.scan_word("true", Term::True, location),
            b'f' => self.scan_word("false", Term::False, location),
            b'n' => self.scan_word("null", Term::Null, location),
            other => Err(Error::lexical(
                location,
                format!("unexpected byte {:?}", other as char),
            )),
        }
    }

    fn scan_word(&mut self, word: &str, term: Term, location: Location) -> Result<Token, Error> {
        for expect in word.bytes() {
            match self.advance() {
                Some(b) if b == expect => {}
                _ => {
                    return Err(Error::lexical(
                        location,
                        format!("expected literal {:?}", word),
                    ))
                }
            }
        }
        Ok(Symbol::terminal(term))
    }

    fn scan_string(&mut self, location: Location) -> Result<Token, Error> {
        self.advance(); // opening quote
        let mut bytes = Vec::new();
        loop {
            let Some(b) = self.advance() else {
                return Err(Error::lexical(location, "unterminated string"));
            };
            match b {
                b'"' => break,
                b'\\' => {
                    let Some(escape) = self.advance() else {
                        return Err(Error::lexical(location, "unterminated escape sequence"));
                    };
                    match escape {
                        b'"' => bytes.push(b'"'),
                        b'u' => self.scan_unicode_escape(location, &mut bytes)?,
                        other => {
                            bytes.push(b'\\');
                            bytes.push(other);
                        }
                    }
                }
                b if b < 0x20 => {
                    return Err(Error::lexical(
                        location,
                        "control byte inside string literal",
                    ))
                }
                b => bytes.push(b),
            }
        }
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::lexical(location, "string literal is not valid UTF-8"))?;
        // Keyword disambiguation only fires when a `:` follows the string
        // (skipping whitespace); otherwise this is a plain string value.
        let mut lookahead = self.position;
        while matches!(
            self.buffer.get(lookahead),
            Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')
        ) {
            lookahead += 1;
        }
        if self.buffer.get(lookahead) == Some(&b':') {
            Ok(classify_keyword(&text))
        } else {
            Ok(Symbol::with_attribute(Term::String, text))
        }
    }

    fn scan_unicode_escape(&mut self, location: Location, bytes: &mut Vec<u8>) -> Result<(), Error> {
        let mut value: u32 = 0;
        for _ in 0..4 {
            let Some(b) = self.advance() else {
                return Err(Error::lexical(location, "truncated \\u escape"));
            };
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| Error::lexical(location, "invalid hex digit in \\u escape"))?;
            value = value * 16 + digit;
        }
        if value > 0xFF {
            bytes.push((value >> 8) as u8);
        }
        bytes.push((value & 0xFF) as u8);
        Ok(())
    }

    fn scan_number(&mut self, location: Location) -> Result<Token, Error> {
        let start = self.position;
        if self.peek() == Some(b'-') {
            self.advance();
        }
        match self.peek() {
            Some(b'0') => {
                self.advance();
            }
            Some(b'1'..=b'9') => {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.advance();
                }
            }
            _ => return Err(Error::lexical(location, "expected a digit")),
        }
        if self.peek() == Some(b'.') {
            self.advance();
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(Error::lexical(location, "expected a digit after '.'"));
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            self.advance();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(Error::lexical(location, "expected a digit in exponent"));
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.buffer[start..self.position])
            .expect("number lexeme is ASCII by construction")
            .to_string();
        Ok(Symbol::with_attribute(Term::Number, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token().expect("scan should succeed");
            let done = token == Symbol::Eof;
            out.push(token);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_structural_tokens() {
        let toks = tokens("[ ] { } , :");
        assert_eq!(
            toks,
            vec![
                Symbol::terminal(Term::LBracket),
                Symbol::terminal(Term::RBracket),
                Symbol::terminal(Term::LBrace),
                Symbol::terminal(Term::RBrace),
                Symbol::terminal(Term::Comma),
                Symbol::terminal(Term::Colon),
                Symbol::Eof,
            ]
        );
    }

    #[test]
    fn scans_literals() {
        let toks = tokens("true false null");
        assert_eq!(
            toks,
            vec![
                Symbol::terminal(Term::True),
                Symbol::terminal(Term::False),
                Symbol::terminal(Term::Null),
                Symbol::Eof,
            ]
        );
    }

    #[test]
    fn scans_numbers_per_json_grammar() {
        let toks = tokens("0 -12 3.5 2e10 -1.5e-3");
        let expected: Vec<&str> = vec!["0", "-12", "3.5", "2e10", "-1.5e-3"];
        for (token, text) in toks.iter().zip(expected.iter()) {
            assert_eq!(token.attribute(), *text);
        }
    }

    #[test]
    fn plain_string_is_not_reclassified() {
        let toks = tokens("\"set\"");
        assert_eq!(toks[0], Symbol::with_attribute(Term::String, "set"));
    }

    #[test]
    fn keyword_string_before_colon_is_reclassified() {
        let toks = tokens("\"set\":");
        assert_eq!(toks[0], Symbol::terminal(Term::Set));
    }

    #[test]
    fn repeat_with_range_stays_repeat() {
        let toks = tokens("\"repeat 2-4\":");
        assert_eq!(toks[0], Symbol::with_attribute(Term::Repeat, "2-4"));
    }

    #[test]
    fn non_greedy_repeat_with_fixed_count_reclassifies_to_repeat() {
        let toks = tokens("\"non-greedy repeat 4\":");
        assert_eq!(toks[0], Symbol::with_attribute(Term::Repeat, "4"));
    }

    #[test]
    fn non_greedy_repeat_with_range_stays_non_greedy() {
        let toks = tokens("\"non-greedy repeat 2-4\":");
        assert_eq!(toks[0], Symbol::with_attribute(Term::NonGreedyRepeat, "2-4"));
    }

    #[test]
    fn non_greedy_repeat_with_atomic_stays_non_greedy() {
        let toks = tokens("\"non-greedy repeat *\":");
        assert_eq!(toks[0], Symbol::with_attribute(Term::NonGreedyRepeat, "*"));
    }

    #[test]
    fn invalid_repeat_spec_falls_back_to_string() {
        let toks = tokens("\"repeat abc\":");
        assert_eq!(
            toks[0],
            Symbol::with_attribute(Term::String, "repeat abc")
        );
    }

    #[test]
    fn named_group_keyword_carries_name_as_attribute() {
        let toks = tokens("\"group name\":");
        assert_eq!(toks[0], Symbol::with_attribute(Term::NamedGroup, "name"));
    }

    #[test]
    fn unicode_escape_above_0xff_emits_two_bytes() {
        // U+0101 (0x0101) decodes to bytes 0x01, 0x01 per the raw-byte
        // decoding rule, not a UTF-8 re-encoding of the codepoint.
        let mut scanner = Scanner::new("\"\\u0101\"");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.attribute().as_bytes(), &[0x01, 0x01]);
    }

    #[test]
    fn unicode_escape_at_or_below_0xff_emits_one_byte() {
        let mut scanner = Scanner::new("\"\\u0041\"");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.attribute(), "A");
    }

    #[test]
    fn eof_is_idempotent() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.next_token().unwrap(), Symbol::Eof);
        assert_eq!(scanner.next_token().unwrap(), Symbol::Eof);
    }

    #[test]
    fn control_byte_in_string_is_lexical_error() {
        let mut scanner = Scanner::new("\"a\u{0}b\"");
        assert!(scanner.next_token().is_err());
    }

    #[test]
    fn leading_zero_number_does_not_consume_trailing_digits() {
        let mut scanner = Scanner::new("01");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.attribute(), "0");
    }
}
