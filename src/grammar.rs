//! The translation grammar data model and the fixed REON grammar table
//! itself. The table is transcribed rule-for-rule from the grammar that
//! drives REON's reference translator — renaming non-terminals to valid
//! Rust identifiers is the only liberty taken; the productions, their
//! output templates and their attribute maps are otherwise exactly as
//! specified there.

use crate::symbols::{NonTerm, Special, Term};

/// A symbol occurring in a rule's input (left-to-right, matched against
/// the token stream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSymbol {
    Terminal(Term),
    NonTerminal(NonTerm),
}

/// A symbol occurring in a rule's output template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSymbol {
    Terminal(Term),
    NonTerminal(NonTerm),
    Special(Special),
}

fn t(term: Term) -> InputSymbol {
    InputSymbol::Terminal(term)
}

fn n(non_terminal: NonTerm) -> InputSymbol {
    InputSymbol::NonTerminal(non_terminal)
}

fn ot(term: Term) -> OutputSymbol {
    OutputSymbol::Terminal(term)
}

fn on(non_terminal: NonTerm) -> OutputSymbol {
    OutputSymbol::NonTerminal(non_terminal)
}

fn os(special: Special) -> OutputSymbol {
    OutputSymbol::Special(special)
}

/// One production. `attribute_map[i]` lists the zero-based `output`
/// indices that inherit the attribute of the `i`-th terminal encountered
/// in `input` (left to right); an input terminal with no entry, or whose
/// entry is empty, hands its attribute to nobody.
#[derive(Debug, Clone)]
pub struct GrammarRule {
    pub lhs: NonTerm,
    pub input: Vec<InputSymbol>,
    pub output: Vec<OutputSymbol>,
    pub attribute_map: Vec<Vec<usize>>,
}

impl GrammarRule {
    pub(crate) fn new(
        lhs: NonTerm,
        input: Vec<InputSymbol>,
        output: Vec<OutputSymbol>,
        attribute_map: Vec<Vec<usize>>,
    ) -> Self {
        let input_terminal_count = input
            .iter()
            .filter(|s| matches!(s, InputSymbol::Terminal(_)))
            .count();
        debug_assert_eq!(
            attribute_map.len(),
            input_terminal_count,
            "attribute_map must have one entry per input terminal, in order"
        );
        Self {
            lhs,
            input,
            output,
            attribute_map,
        }
    }

    /// Convenience for the (common) rule with no attribute propagation at
    /// all — every input terminal's slot in `attribute_map` is empty.
    pub(crate) fn passthrough(
        lhs: NonTerm,
        input: Vec<InputSymbol>,
        output: Vec<OutputSymbol>,
    ) -> Self {
        let input_terminal_count = input
            .iter()
            .filter(|s| matches!(s, InputSymbol::Terminal(_)))
            .count();
        let attribute_map = vec![Vec::new(); input_terminal_count];
        Self::new(lhs, input, output, attribute_map)
    }
}

/// An ordered rule set plus its start symbol. The LL(1) tables derived
/// from this (FIRST/FOLLOW/PREDICT, the parse table) live in
/// [`crate::ll_table`] and are computed once from a `&TranslationGrammar`.
#[derive(Debug, Clone)]
pub struct TranslationGrammar {
    pub start: NonTerm,
    pub rules: Vec<GrammarRule>,
}

impl TranslationGrammar {
    pub fn rules_for(&self, lhs: NonTerm) -> impl Iterator<Item = (usize, &GrammarRule)> {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, rule)| rule.lhs == lhs)
    }
}

// `Term` and `NonTerm` both have `Re`/`Ref`/`Else` variants, so a glob
// `use` of both would make those names ambiguous; every symbol below is
// qualified through these two short aliases instead.
use NonTerm as Nt;
use Term as Tm;

fn build_reon_grammar() -> TranslationGrammar {
    let rules = vec![
        // E -> RE ;  <var> = r"(?m)<RE>"\n
        GrammarRule::passthrough(
            Nt::E,
            vec![n(Nt::Re)],
            vec![
                os(Special::Variable),
                ot(Tm::Lit(" = r\"(?m)")),
                on(Nt::Re),
                ot(Tm::Lit("\"\n")),
            ],
        ),
        // RE -> epsilon
        GrammarRule::passthrough(Nt::Re, vec![], vec![]),
        // RE -> REFULL
        GrammarRule::passthrough(Nt::Re, vec![n(Nt::ReFull)], vec![on(Nt::ReFull)]),
        // REFULL -> true  (match-empty: emits an empty `re` fragment)
        GrammarRule::passthrough(Nt::ReFull, vec![t(Tm::True)], vec![ot(Tm::Re)]),
        // REFULL -> false (never matches)
        GrammarRule::passthrough(Nt::ReFull, vec![t(Tm::False)], vec![ot(Tm::Lit("(?!)"))]),
        // REFULL -> null (never matches, same as false)
        GrammarRule::passthrough(Nt::ReFull, vec![t(Tm::Null)], vec![ot(Tm::Lit("(?!)"))]),
        // REFULL -> string ; re <- string's attribute
        GrammarRule::new(
            Nt::ReFull,
            vec![t(Tm::String)],
            vec![ot(Tm::Re)],
            vec![vec![0]],
        ),
        // REFULL -> [ RE-listE ]
        GrammarRule::passthrough(
            Nt::ReFull,
            vec![t(Tm::LBracket), n(Nt::ReListE), t(Tm::RBracket)],
            vec![on(Nt::ReListE)],
        ),
        // REFULL -> { OBJ }
        GrammarRule::passthrough(
            Nt::ReFull,
            vec![t(Tm::LBrace), n(Nt::Obj), t(Tm::RBrace)],
            vec![on(Nt::Obj)],
        ),
        // OBJ -> repeat : RE
        GrammarRule::new(
            Nt::Obj,
            vec![t(Tm::Repeat), t(Tm::Colon), n(Nt::Re)],
            vec![
                ot(Tm::Lit("(?:")),
                on(Nt::Re),
                ot(Tm::Lit(")")),
                ot(Tm::Repeat),
            ],
            vec![vec![3], vec![]],
        ),
        // OBJ -> non-greedy repeat : RE
        GrammarRule::new(
            Nt::Obj,
            vec![t(Tm::NonGreedyRepeat), t(Tm::Colon), n(Nt::Re)],
            vec![
                ot(Tm::Lit("(?:")),
                on(Nt::Re),
                ot(Tm::Lit(")")),
                ot(Tm::Repeat),
                ot(Tm::Lit("?")),
            ],
            vec![vec![3], vec![]],
        ),
        // OBJ -> set : string
        GrammarRule::new(
            Nt::Obj,
            vec![t(Tm::Set), t(Tm::Colon), t(Tm::String)],
            vec![ot(Tm::Lit("[")), ot(Tm::Set), ot(Tm::Lit("]"))],
            vec![vec![], vec![], vec![1]],
        ),
        // OBJ -> !set : string
        GrammarRule::new(
            Nt::Obj,
            vec![t(Tm::NSet), t(Tm::Colon), t(Tm::String)],
            vec![ot(Tm::Lit("[^")), ot(Tm::Set), ot(Tm::Lit("]"))],
            vec![vec![], vec![], vec![1]],
        ),
        // OBJ -> alternatives : [ RE-AlistE ]
        GrammarRule::passthrough(
            Nt::Obj,
            vec![
                t(Tm::Alternatives),
                t(Tm::Colon),
                t(Tm::LBracket),
                n(Nt::ReAlistE),
                t(Tm::RBracket),
            ],
            vec![on(Nt::ReAlistE)],
        ),
        // OBJ -> group : RE
        GrammarRule::passthrough(
            Nt::Obj,
            vec![t(Tm::Group), t(Tm::Colon), n(Nt::Re)],
            vec![
                ot(Tm::Lit("(")),
                os(Special::Group),
                on(Nt::Re),
                ot(Tm::Lit(")")),
            ],
        ),
        // OBJ -> named group : RE
        GrammarRule::new(
            Nt::Obj,
            vec![t(Tm::NamedGroup), t(Tm::Colon), n(Nt::Re)],
            vec![
                ot(Tm::Lit("(?P<")),
                ot(Tm::NamedGroup),
                ot(Tm::Lit(">")),
                on(Nt::Re),
                ot(Tm::Lit(")")),
            ],
            vec![vec![1], vec![]],
        ),
        // OBJ -> match group : Ref
        GrammarRule::passthrough(
            Nt::Obj,
            vec![t(Tm::MatchGroup), t(Tm::Colon), n(Nt::Ref)],
            vec![on(Nt::Ref)],
        ),
        // OBJ -> comment : string
        GrammarRule::new(
            Nt::Obj,
            vec![t(Tm::Comment), t(Tm::Colon), t(Tm::String)],
            vec![ot(Tm::Lit("(?#")), ot(Tm::Comment), ot(Tm::Lit(")"))],
            vec![vec![], vec![], vec![1]],
        ),
        // OBJ -> lookahead : RE
        GrammarRule::passthrough(
            Nt::Obj,
            vec![t(Tm::Lookahead), t(Tm::Colon), n(Nt::Re)],
            vec![ot(Tm::Lit("(?=")), on(Nt::Re), ot(Tm::Lit(")"))],
        ),
        // OBJ -> !lookahead : RE
        GrammarRule::passthrough(
            Nt::Obj,
            vec![t(Tm::NLookahead), t(Tm::Colon), n(Nt::Re)],
            vec![ot(Tm::Lit("(?!")), on(Nt::Re), ot(Tm::Lit(")"))],
        ),
        // OBJ -> lookbehind : RE
        GrammarRule::passthrough(
            Nt::Obj,
            vec![t(Tm::Lookbehind), t(Tm::Colon), n(Nt::Re)],
            vec![
                ot(Tm::Lit("(?<=")),
                os(Special::FixedLengthCheck),
                on(Nt::Re),
                os(Special::EndCheck),
                ot(Tm::Lit(")")),
            ],
        ),
        // OBJ -> !lookbehind : RE
        GrammarRule::passthrough(
            Nt::Obj,
            vec![t(Tm::NLookbehind), t(Tm::Colon), n(Nt::Re)],
            vec![ot(Tm::Lit("(?<!")), on(Nt::Re), ot(Tm::Lit(")"))],
        ),
        // OBJ -> if : IfRef , then : RE Else
        GrammarRule::passthrough(
            Nt::Obj,
            vec![
                t(Tm::If),
                t(Tm::Colon),
                n(Nt::IfRef),
                t(Tm::Comma),
                t(Tm::Then),
                t(Tm::Colon),
                n(Nt::Re),
                n(Nt::Else),
            ],
            vec![
                ot(Tm::Lit("(?(")),
                on(Nt::IfRef),
                ot(Tm::Lit(")")),
                on(Nt::Re),
                on(Nt::Else),
                ot(Tm::Lit(")")),
            ],
        ),
        // Ref -> number  (numbered backreference)
        GrammarRule::new(
            Nt::Ref,
            vec![t(Tm::Number)],
            vec![ot(Tm::Lit("\\")), ot(Tm::NRef)],
            vec![vec![1]],
        ),
        // Ref -> string  (named backreference)
        GrammarRule::new(
            Nt::Ref,
            vec![t(Tm::String)],
            vec![ot(Tm::Lit("(?P=")), ot(Tm::Ref), ot(Tm::Lit(")"))],
            vec![vec![1]],
        ),
        // IfRef -> number
        GrammarRule::new(
            Nt::IfRef,
            vec![t(Tm::Number)],
            vec![ot(Tm::NRef)],
            vec![vec![0]],
        ),
        // IfRef -> string
        GrammarRule::new(
            Nt::IfRef,
            vec![t(Tm::String)],
            vec![ot(Tm::Ref)],
            vec![vec![0]],
        ),
        // Else -> epsilon
        GrammarRule::passthrough(Nt::Else, vec![], vec![]),
        // Else -> , else : RE
        GrammarRule::passthrough(
            Nt::Else,
            vec![t(Tm::Comma), t(Tm::Else), t(Tm::Colon), n(Nt::Re)],
            vec![ot(Tm::Lit("|")), on(Nt::Re)],
        ),
        // RE-listE -> epsilon
        GrammarRule::passthrough(Nt::ReListE, vec![], vec![]),
        // RE-listE -> REFULL RE-list
        GrammarRule::passthrough(
            Nt::ReListE,
            vec![n(Nt::ReFull), n(Nt::ReList)],
            vec![on(Nt::ReFull), on(Nt::ReList)],
        ),
        // RE-list -> epsilon
        GrammarRule::passthrough(Nt::ReList, vec![], vec![]),
        // RE-list -> , RE-list-comma
        GrammarRule::passthrough(
            Nt::ReList,
            vec![t(Tm::Comma), n(Nt::ReListComma)],
            vec![on(Nt::ReListComma)],
        ),
        // RE-list-comma -> epsilon
        GrammarRule::passthrough(Nt::ReListComma, vec![], vec![]),
        // RE-list-comma -> REFULL RE-list
        GrammarRule::passthrough(
            Nt::ReListComma,
            vec![n(Nt::ReFull), n(Nt::ReList)],
            vec![on(Nt::ReFull), on(Nt::ReList)],
        ),
        // RE-AlistE -> epsilon
        GrammarRule::passthrough(Nt::ReAlistE, vec![], vec![]),
        // RE-AlistE -> REFULL RE-Alist
        GrammarRule::passthrough(
            Nt::ReAlistE,
            vec![n(Nt::ReFull), n(Nt::ReAlist)],
            vec![
                ot(Tm::Lit("(?:")),
                on(Nt::ReFull),
                on(Nt::ReAlist),
                ot(Tm::Lit(")")),
            ],
        ),
        // RE-Alist -> epsilon
        GrammarRule::passthrough(Nt::ReAlist, vec![], vec![]),
        // RE-Alist -> , RE-Alist-comma
        GrammarRule::passthrough(
            Nt::ReAlist,
            vec![t(Tm::Comma), n(Nt::ReAlistComma)],
            vec![on(Nt::ReAlistComma)],
        ),
        // RE-Alist-comma -> epsilon
        GrammarRule::passthrough(Nt::ReAlistComma, vec![], vec![]),
        // RE-Alist-comma -> REFULL RE-Alist
        GrammarRule::passthrough(
            Nt::ReAlistComma,
            vec![n(Nt::ReFull), n(Nt::ReAlist)],
            vec![ot(Tm::Lit("|")), on(Nt::ReFull), on(Nt::ReAlist)],
        ),
    ];

    TranslationGrammar {
        start: Nt::E,
        rules,
    }
}

lazy_static! {
    static ref REON_GRAMMAR: TranslationGrammar = build_reon_grammar();
}

/// The fixed REON translation grammar, built once.
pub fn reon_grammar() -> &'static TranslationGrammar {
    &REON_GRAMMAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_has_the_expected_production_count() {
        assert_eq!(reon_grammar().rules.len(), 41);
    }

    #[test]
    fn start_symbol_is_e() {
        assert_eq!(reon_grammar().start, NonTerm::E);
    }

    #[test]
    fn every_rule_has_one_attribute_map_entry_per_input_terminal() {
        for rule in &reon_grammar().rules {
            let input_terminal_count = rule
                .input
                .iter()
                .filter(|s| matches!(s, InputSymbol::Terminal(_)))
                .count();
            assert_eq!(rule.attribute_map.len(), input_terminal_count);
        }
    }

    #[test]
    fn obj_has_one_production_per_keyword() {
        let count = reon_grammar().rules_for(NonTerm::Obj).count();
        assert_eq!(count, 14);
    }
}
