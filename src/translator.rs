//! The LL(1) dual-stack translator. Drives the scanner, consults the
//! parse table built in [`crate::ll_table`], and produces the
//! output-symbol stream the generator (`crate::generator`) consumes —
//! in strict left-to-right derivation order.

use crate::error::{Error, Found};
use crate::grammar::{GrammarRule, InputSymbol, OutputSymbol, TranslationGrammar};
use crate::ll_table::{LlTables, Lookahead};
use crate::scanner::Scanner;
use crate::symbols::{NonTerm, Special, Symbol, Term};

/// A symbol on the input parse stack: the REON-source side of the
/// transducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackSymbol {
    Eof,
    Terminal(Term),
    NonTerminal(NonTerm),
}

/// One still-open rule application. Mirrors the nesting of non-terminal
/// expansions on the input stack 1:1: each `Frame` holds the current
/// rule's output template with terminal slots either empty or filled,
/// plus a cursor onto its still-unresolved non-terminal children.
///
/// Every rule in this grammar preserves the left-to-right order of its
/// non-terminal occurrences between the input and output sides (verified
/// for all 41 productions in `grammar.rs`), so a child's resolved content
/// always belongs at the next not-yet-filled non-terminal slot in
/// `child_positions`, in order — no index bookkeeping beyond a cursor is
/// needed to splice it into the right place.
struct Frame {
    output: Vec<OutputSymbol>,
    /// Positions in `output` holding a `OutputSymbol::NonTerminal`, in
    /// left-to-right order.
    child_positions: Vec<usize>,
    next_child: usize,
    /// Resolved symbols for the child at `child_positions[i]`, once known.
    children: Vec<Option<Vec<Symbol>>>,
    /// Attribute text carried by each `OutputSymbol::Terminal` slot;
    /// starts empty, filled in when the matching input terminal (if any)
    /// is consumed.
    attrs: Vec<String>,
    attribute_map: Vec<Vec<usize>>,
    next_input_terminal: usize,
    /// Input-stack depth once this rule's RHS has been fully consumed.
    base_depth: usize,
}

impl Frame {
    fn new(rule: &GrammarRule, base_depth: usize) -> Self {
        let child_positions = rule
            .output
            .iter()
            .enumerate()
            .filter_map(|(i, sym)| matches!(sym, OutputSymbol::NonTerminal(_)).then_some(i))
            .collect::<Vec<_>>();
        let slot_count = rule.output.len();
        Frame {
            output: rule.output.clone(),
            children: vec![None; child_positions.len()],
            child_positions,
            next_child: 0,
            attrs: vec![String::new(); slot_count],
            attribute_map: rule.attribute_map.clone(),
            next_input_terminal: 0,
            base_depth,
        }
    }

    /// Record the attribute of the `next_input_terminal`-th input terminal
    /// of this rule, propagating it to every output slot named in
    /// `attribute_map` for that position.
    fn record_terminal_attribute(&mut self, attribute: &str) {
        let index = self.next_input_terminal;
        self.next_input_terminal += 1;
        if let Some(targets) = self.attribute_map.get(index) {
            for &pos in targets {
                self.attrs[pos] = attribute.to_string();
            }
        }
    }

    /// Fill the next pending non-terminal slot with a child's resolved
    /// output.
    fn fill_next_child(&mut self, resolved: Vec<Symbol>) {
        let slot = self.next_child;
        self.next_child += 1;
        self.children[slot] = Some(resolved);
    }

    /// Flatten this frame's output template into the final symbol
    /// sequence, substituting each non-terminal slot with its (by now
    /// fully resolved) child content.
    fn resolve(self) -> Vec<Symbol> {
        let mut child_iter = self.children.into_iter();
        let mut child_positions = self.child_positions.into_iter().peekable();
        let mut out = Vec::with_capacity(self.output.len());
        for (i, sym) in self.output.into_iter().enumerate() {
            if child_positions.peek() == Some(&i) {
                child_positions.next();
                let resolved = child_iter
                    .next()
                    .flatten()
                    .expect("a frame only resolves once every child has been filled");
                out.extend(resolved);
                continue;
            }
            match sym {
                OutputSymbol::Terminal(term) => out.push(Symbol::with_attribute(term, self.attrs[i].clone())),
                OutputSymbol::Special(special) => out.push(Symbol::Special(special)),
                OutputSymbol::NonTerminal(_) => unreachable!("covered by child_positions above"),
            }
        }
        out
    }
}

fn to_stack_symbol(sym: &InputSymbol) -> StackSymbol {
    match sym {
        InputSymbol::Terminal(t) => StackSymbol::Terminal(*t),
        InputSymbol::NonTerminal(nt) => StackSymbol::NonTerminal(*nt),
    }
}

fn current_lookahead(token: &Symbol) -> Lookahead {
    match token {
        Symbol::Eof => Lookahead::End,
        Symbol::Terminal(term, _) => Lookahead::Term(*term),
        _ => unreachable!("the scanner only ever produces terminals or Eof"),
    }
}

fn found_of(token: &Symbol) -> Found {
    match token {
        Symbol::Eof => Found::Eof,
        Symbol::Terminal(term, _) => Found::Term(*term),
        _ => unreachable!("the scanner only ever produces terminals or Eof"),
    }
}

/// Runs the scanner through the LL(1) table and returns the fully
/// resolved output-symbol stream. The stream does not include a trailing
/// `Symbol::Eof` marker itself — callers that need one (the generator's
/// session-reset hook) append it at the driver level.
pub fn translate(
    grammar: &TranslationGrammar,
    tables: &LlTables,
    scanner: &mut Scanner,
) -> Result<Vec<Symbol>, Error> {
    let mut input_stack = vec![StackSymbol::Eof, StackSymbol::NonTerminal(grammar.start)];
    let mut frame_stack: Vec<Frame> = Vec::new();
    let mut result: Option<Vec<Symbol>> = None;
    let mut current_token = scanner.next_token()?;

    loop {
        match *input_stack
            .last()
            .expect("input stack always holds at least the Eof sentinel")
        {
            StackSymbol::Eof => {
                if matches!(current_token, Symbol::Eof) {
                    return Ok(result.expect("the start symbol's frame always resolves by here"));
                }
                return Err(Error::syntax(
                    scanner.last_location(),
                    found_of(&current_token),
                    Vec::new(),
                ));
            }
            StackSymbol::NonTerminal(non_terminal) => {
                let lookahead = current_lookahead(&current_token);
                let rule_index = tables.action(non_terminal, lookahead).ok_or_else(|| {
                    Error::syntax(
                        scanner.last_location(),
                        found_of(&current_token),
                        tables.first_terms(non_terminal),
                    )
                })?;
                let rule = &grammar.rules[rule_index];

                input_stack.pop();
                let base_depth = input_stack.len();
                for sym in rule.input.iter().rev() {
                    input_stack.push(to_stack_symbol(sym));
                }
                frame_stack.push(Frame::new(rule, base_depth));
                complete_ready_frames(&mut frame_stack, &input_stack, &mut result);
            }
            StackSymbol::Terminal(expected) => match &current_token {
                Symbol::Terminal(found, attribute) if *found == expected => {
                    let attribute = attribute.clone();
                    if let Some(frame) = frame_stack.last_mut() {
                        frame.record_terminal_attribute(&attribute);
                    }
                    input_stack.pop();
                    current_token = scanner.next_token()?;
                    complete_ready_frames(&mut frame_stack, &input_stack, &mut result);
                }
                _ => {
                    return Err(Error::syntax(
                        scanner.last_location(),
                        found_of(&current_token),
                        vec![expected],
                    ))
                }
            },
        }
    }
}

/// After every push or pop of the input stack, finalize any frame whose
/// entire RHS has now been consumed: splice its resolved output into its
/// parent (or, for the start symbol's frame, record it as the final
/// result).
fn complete_ready_frames(
    frame_stack: &mut Vec<Frame>,
    input_stack: &[StackSymbol],
    result: &mut Option<Vec<Symbol>>,
) {
    while let Some(frame) = frame_stack.last() {
        if input_stack.len() != frame.base_depth {
            break;
        }
        let frame = frame_stack.pop().unwrap();
        let resolved = frame.resolve();
        match frame_stack.last_mut() {
            Some(parent) => parent.fill_next_child(resolved),
            None => *result = Some(resolved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::reon_grammar;
    use std::sync::OnceLock;

    fn tables() -> &'static LlTables {
        static TABLES: OnceLock<LlTables> = OnceLock::new();
        TABLES.get_or_init(|| LlTables::build(reon_grammar()).unwrap())
    }

    fn run(source: &str) -> Vec<Symbol> {
        let mut scanner = Scanner::new(source);
        translate(reon_grammar(), tables(), &mut scanner).expect("translation should succeed")
    }

    #[test]
    fn empty_document_emits_variable_and_two_literal_fragments() {
        let out = run("");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], Symbol::Special(Special::Variable));
        assert_eq!(out[1], Symbol::with_attribute(Term::Lit(" = r\"(?m)"), ""));
        assert_eq!(out[2], Symbol::with_attribute(Term::Lit("\"\n"), ""));
    }

    #[test]
    fn string_only_document_carries_its_attribute_into_re() {
        let out = run("\"abc\"");
        let re = out
            .iter()
            .find(|s| matches!(s, Symbol::Terminal(Term::Re, _)))
            .unwrap();
        assert_eq!(re.attribute(), "abc");
    }

    #[test]
    fn set_attribute_flows_from_string_to_set_terminal() {
        let out = run("{\"set\": \"a-z\"}");
        let set = out
            .iter()
            .find(|s| matches!(s, Symbol::Terminal(Term::Set, _)))
            .unwrap();
        assert_eq!(set.attribute(), "a-z");
    }

    #[test]
    fn named_group_and_match_group_share_the_identifier_attribute() {
        let out = run("[{\"group foo\": \"bar\"}, {\"match group\": \"foo\"}]");
        let named = out
            .iter()
            .find(|s| matches!(s, Symbol::Terminal(Term::NamedGroup, _)))
            .unwrap();
        assert_eq!(named.attribute(), "foo");
        let reference = out
            .iter()
            .find(|s| matches!(s, Symbol::Terminal(Term::Ref, _)))
            .unwrap();
        assert_eq!(reference.attribute(), "foo");
    }

    #[test]
    fn unexpected_token_is_a_syntax_error() {
        let mut scanner = Scanner::new("}");
        let err = translate(reon_grammar(), tables(), &mut scanner).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn trailing_garbage_after_a_complete_document_is_a_syntax_error() {
        let mut scanner = Scanner::new("\"a\" \"b\"");
        let err = translate(reon_grammar(), tables(), &mut scanner).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn output_symbol_count_matches_fired_rules_leaf_slots() {
        // The final flattened stream's length equals the sum, over every
        // fired rule, of the non-non-terminal slots in that rule's
        // output template.
        let out = run("{\"set\": \"a-z\"}");
        assert_eq!(out.len(), 1 /* variable */ + 1 /* " = r\"(?m)" */ + 3 /* [ set ] */ + 1 /* "\"\n" */);
    }
}
