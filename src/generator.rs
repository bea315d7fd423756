//! Output generation and semantic analysis. Consumes the translator's
//! output-symbol stream and writes target regex text,
//! validating each construct as it goes (group references resolve,
//! character ranges are well-formed, lookbehind bodies are fixed-length,
//! repeat bounds are consistent).

use std::collections::HashSet;

use crate::error::Error;
use crate::symbols::{Special, Symbol, Term};

/// Per-translation session state: known group names, how many groups
/// have been seen, and the stack of active fixed-length checks (one
/// entry per currently-open lookbehind).
#[derive(Debug, Default)]
pub struct OutputState {
    known_groups: HashSet<String>,
    group_count: u64,
    /// One entry per nested `fixed_length_check` currently active. A
    /// depth counter rather than a stack of closures, since the one
    /// check REON has captures no per-lookbehind state.
    semantic_checks: Vec<()>,
}

impl OutputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears session state. Called once per [`crate::driver::translate`]
    /// invocation rather than in response to a literal `Eof` symbol
    /// reaching the generator.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn group_count(&self) -> u64 {
        self.group_count
    }

    pub fn known_groups(&self) -> &HashSet<String> {
        &self.known_groups
    }

    /// Writes `symbols` as target regex text into a fresh `String`,
    /// running every symbol through the active semantic checks before
    /// dispatching it by name.
    pub fn generate(&mut self, symbols: &[Symbol], variable: &str) -> Result<String, Error> {
        let mut out = String::new();
        for symbol in symbols {
            for _ in 0..self.semantic_checks.len() {
                fixed_length_check(symbol)?;
            }
            self.dispatch(&mut out, symbol, variable)?;
        }
        Ok(out)
    }

    fn dispatch(&mut self, out: &mut String, symbol: &Symbol, variable: &str) -> Result<(), Error> {
        match symbol {
            Symbol::Special(Special::Group) => {
                self.group_count += 1;
                Ok(())
            }
            Symbol::Special(Special::FixedLengthCheck) => {
                self.semantic_checks.push(());
                Ok(())
            }
            Symbol::Special(Special::EndCheck) => {
                self.semantic_checks.pop();
                Ok(())
            }
            Symbol::Special(Special::Variable) => {
                out.push_str(variable);
                Ok(())
            }
            Symbol::Terminal(Term::Re, attribute) => write_re(out, attribute),
            Symbol::Terminal(Term::Set, attribute) => write_set(out, attribute),
            Symbol::Terminal(Term::Ref, attribute) => self.write_ref(out, attribute),
            Symbol::Terminal(Term::NRef, attribute) => self.write_nref(out, attribute),
            Symbol::Terminal(Term::Comment, attribute) => {
                write_comment(out, attribute);
                Ok(())
            }
            Symbol::Terminal(Term::Repeat, attribute) => write_repeat(out, attribute),
            Symbol::Terminal(Term::NamedGroup, attribute) => self.write_named_group(out, attribute),
            Symbol::Terminal(Term::Lit(text), _) => {
                out.push_str(text);
                Ok(())
            }
            // Every other terminal name is not a handler: its display
            // name is written verbatim. None of REON's grammar rules
            // actually place one of these on the output side, but the
            // fallback keeps dispatch total rather than partial.
            Symbol::Terminal(term, _) => {
                out.push_str(&term.to_string());
                Ok(())
            }
            Symbol::NonTerminal(nt) => {
                unreachable!("the translator never leaves a non-terminal {} unresolved", nt)
            }
            Symbol::Eof => Ok(()),
        }
    }

    fn write_ref(&self, out: &mut String, name: &str) -> Result<(), Error> {
        if !self.known_groups.contains(name) {
            return Err(Error::semantic(format!(
                "no group named {} is known at this point",
                name
            )));
        }
        out.push_str(name);
        Ok(())
    }

    fn write_nref(&self, out: &mut String, attribute: &str) -> Result<(), Error> {
        let value: u64 = attribute.parse().map_err(|_| {
            Error::semantic("only positive integers are permitted as references")
        })?;
        if value < 1 {
            return Err(Error::semantic(
                "only positive integers are permitted as references",
            ));
        }
        if value > self.group_count {
            return Err(Error::semantic(format!("no group with number {}", attribute)));
        }
        out.push_str(attribute);
        Ok(())
    }

    fn write_named_group(&mut self, out: &mut String, name: &str) -> Result<(), Error> {
        let mut chars = name.chars();
        let first = chars.next().ok_or_else(|| {
            Error::semantic("identifier of a named group cannot have a length of 0")
        })?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(Error::semantic(format!(
                "identifier of a named group cannot start with {:?}",
                first
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::semantic(format!(
                "identifier of a named group cannot contain an invalid character: {:?}",
                name
            )));
        }
        if self.known_groups.contains(name) {
            return Err(Error::semantic(format!(
                "multiple definitions of a group with name {}",
                name
            )));
        }
        self.group_count += 1;
        self.known_groups.insert(name.to_string());
        out.push_str(name);
        Ok(())
    }
}

/// Active only while inside a `lookbehind`/`!lookbehind` body's
/// `fixed_length_check`..`end_check` bracket: rejects constructs whose
/// match length could vary.
fn fixed_length_check(symbol: &Symbol) -> Result<(), Error> {
    match symbol {
        Symbol::Terminal(Term::Repeat, attribute) => {
            if attribute.chars().any(|c| !c.is_ascii_digit()) {
                return Err(Error::semantic(
                    "RE of non-constant length within a lookbehind assertion",
                ));
            }
            Ok(())
        }
        Symbol::Terminal(Term::Ref, _) | Symbol::Terminal(Term::NRef, _) => Err(Error::semantic(
            "REON does not support group references within lookbehind assertions",
        )),
        Symbol::Terminal(Term::Lit("|"), _) => Err(Error::semantic(
            "REON does not support alternatives within lookbehind assertions",
        )),
        _ => Ok(()),
    }
}

/// Escapes a `re` terminal's attribute into target regex text.
fn write_re(out: &mut String, attribute: &str) -> Result<(), Error> {
    let mut chars = attribute.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' | '+' | '?' | '{' | '}' | '[' | ']' | '|' | '(' | ')' | '$' | '^' | '.' => {
                out.push('\\');
                out.push(c);
            }
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| Error::semantic("dangling escape at end of string"))?;
                match escaped {
                    'A' | 'b' | 'B' | 'd' | 'D' | 'f' | 'n' | 'r' | 's' | 'S' | 't' | 'v' | 'w'
                    | 'W' | 'Z' | '\\' => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    '.' => out.push('.'),
                    '^' => out.push_str("\\A"),
                    '$' => out.push_str("\\Z"),
                    other => {
                        return Err(Error::semantic(format!(
                            "unknown escaped sequence \\{}",
                            other
                        )))
                    }
                }
            }
            other => out.push(other),
        }
    }
    Ok(())
}

/// Escapes a `set`/`!set` terminal's attribute into a character-class
/// body.
fn write_set(out: &mut String, attribute: &str) -> Result<(), Error> {
    let mut escape = false;
    let mut range = false;
    let mut last: Option<char> = None;
    for c in attribute.chars() {
        if escape {
            escape = false;
            out.push('\\');
            out.push(c);
            continue;
        }
        if range {
            range = false;
            if let Some(low) = last {
                if low >= c {
                    return Err(Error::semantic(format!("invalid char range {}-{}", low, c)));
                }
            }
            out.push('-');
        }
        if c != '-' {
            last = Some(c);
        }
        match c {
            '\\' => escape = true,
            '-' => range = true,
            ']' | '^' | '"' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    if range {
        out.push('-');
    }
    Ok(())
}

fn write_comment(out: &mut String, attribute: &str) {
    for c in attribute.chars() {
        if c == ')' {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Writes a `repeat`/`non-greedy repeat` terminal's attribute as a
/// quantifier. REON spells a range with a dash (`2-4`, `2-`, `-4`);
/// Python's `re` wants a comma (`{2,4}`, `{2,}`, `{,4}`), so the bound(s)
/// are parsed back out and re-joined rather than echoed verbatim.
/// Validates `m < n` when both bounds are given.
fn write_repeat(out: &mut String, attribute: &str) -> Result<(), Error> {
    if attribute.len() == 1 && matches!(attribute, "*" | "+" | "?") {
        out.push_str(attribute);
        return Ok(());
    }
    match attribute.split_once('-') {
        None => {
            // A bare count: "4" -> "{4}".
            out.push('{');
            out.push_str(attribute);
            out.push('}');
        }
        Some((low, high)) => {
            if !low.is_empty() && !high.is_empty() {
                let first: u64 = low
                    .parse()
                    .expect("repeat attributes are scanner-validated digits and a dash");
                let second: u64 = high
                    .parse()
                    .expect("repeat attributes are scanner-validated digits and a dash");
                if first >= second {
                    return Err(Error::semantic(
                        "maximum repeats are larger than minimum repeats",
                    ));
                }
            }
            out.push('{');
            out.push_str(low);
            out.push(',');
            out.push_str(high);
            out.push('}');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(symbols: Vec<Symbol>) -> Result<String, Error> {
        OutputState::new().generate(&symbols, "re")
    }

    #[test]
    fn set_escapes_bracket_caret_and_quote() {
        let out = write_set_helper("]^\"a");
        assert_eq!(out, "\\]\\^\\\"a");
    }

    fn write_set_helper(attribute: &str) -> String {
        let mut out = String::new();
        write_set(&mut out, attribute).unwrap();
        out
    }

    #[test]
    fn set_validates_ascending_ranges() {
        let mut out = String::new();
        let err = write_set(&mut out, "z-a").unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn set_allows_trailing_dash_as_literal() {
        assert_eq!(write_set_helper("a-"), "a-");
    }

    #[test]
    fn re_escapes_metacharacters_and_translates_anchors() {
        let mut out = String::new();
        write_re(&mut out, "a.b\\^c\\$").unwrap();
        assert_eq!(out, "a\\.b\\Ac\\Z");
    }

    #[test]
    fn re_rejects_unknown_escape() {
        let mut out = String::new();
        let err = write_re(&mut out, "\\q").unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn repeat_passes_through_atomic_quantifiers() {
        let mut out = String::new();
        write_repeat(&mut out, "*").unwrap();
        assert_eq!(out, "*");
    }

    #[test]
    fn repeat_rejects_min_greater_than_max() {
        let mut out = String::new();
        let err = write_repeat(&mut out, "4-2").unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn repeat_allows_open_ended_range() {
        let mut out = String::new();
        write_repeat(&mut out, "2-").unwrap();
        assert_eq!(out, "{2,}");
    }

    #[test]
    fn repeat_range_uses_comma_not_dash() {
        let mut out = String::new();
        write_repeat(&mut out, "2-4").unwrap();
        assert_eq!(out, "{2,4}");
    }

    #[test]
    fn group_accounting_tracks_named_and_anonymous_groups() {
        let mut state = OutputState::new();
        let out = state
            .generate(
                &[
                    Symbol::with_attribute(Term::NamedGroup, "foo"),
                    Symbol::Special(Special::Group),
                ],
                "re",
            )
            .unwrap();
        assert_eq!(out, "foo");
        assert_eq!(state.group_count(), 2);
        assert!(state.known_groups().contains("foo"));
    }

    #[test]
    fn ref_to_unknown_group_is_semantic_error() {
        let err = generate(vec![Symbol::with_attribute(Term::Ref, "missing")]).unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn nref_beyond_group_count_is_semantic_error() {
        let err = generate(vec![Symbol::with_attribute(Term::NRef, "1")]).unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn fixed_length_check_rejects_variable_repeat() {
        let mut state = OutputState::new();
        let err = state
            .generate(
                &[
                    Symbol::Special(Special::FixedLengthCheck),
                    Symbol::with_attribute(Term::Repeat, "2-4"),
                    Symbol::Special(Special::EndCheck),
                ],
                "re",
            )
            .unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn fixed_length_check_rejects_alternation() {
        let mut state = OutputState::new();
        let err = state
            .generate(
                &[
                    Symbol::Special(Special::FixedLengthCheck),
                    Symbol::with_attribute(Term::Lit("|"), ""),
                    Symbol::Special(Special::EndCheck),
                ],
                "re",
            )
            .unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn fixed_length_check_allows_fixed_repeat_and_clears_on_end_check() {
        let mut state = OutputState::new();
        let out = state
            .generate(
                &[
                    Symbol::Special(Special::FixedLengthCheck),
                    Symbol::with_attribute(Term::Repeat, "3"),
                    Symbol::Special(Special::EndCheck),
                    Symbol::with_attribute(Term::Repeat, "2-4"),
                ],
                "re",
            )
            .unwrap();
        assert_eq!(out, "{3}{2,4}");
    }

    #[test]
    fn reset_clears_known_groups_and_checks() {
        let mut state = OutputState::new();
        state
            .generate(&[Symbol::with_attribute(Term::NamedGroup, "foo")], "re")
            .unwrap();
        assert_eq!(state.group_count(), 1);
        state.reset();
        assert_eq!(state.group_count(), 0);
        assert!(state.known_groups().is_empty());
    }
}
