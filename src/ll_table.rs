//! FIRST/FOLLOW/PREDICT and the LL(1) parse table. Computed once from a
//! [`TranslationGrammar`] and cached behind the `lazy_static!` in
//! [`crate::driver`]; kept as a free-standing construction function here
//! so the conflict-detection path can be exercised directly by a test
//! without going through the `lazy_static!`.

use std::collections::{HashMap, HashSet};

use crate::error::Error;
use crate::grammar::{InputSymbol, TranslationGrammar};
use crate::symbols::{NonTerm, Term};

/// A lookahead symbol: either a terminal, or the end-of-input sentinel
/// that follows the start symbol. Needed because `Term` alone can't name
/// "nothing follows" the way `Follow(start)` can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookahead {
    Term(Term),
    End,
}

/// The tables a predictive parser needs: `nullable`, `first`, `follow`
/// and the `parse_table` itself, a `(non_terminal, lookahead) ->
/// rule_index` mapping.
#[derive(Debug, Clone)]
pub struct LlTables {
    pub nullable: HashMap<NonTerm, bool>,
    pub first: HashMap<NonTerm, HashSet<Term>>,
    pub follow: HashMap<NonTerm, HashSet<Lookahead>>,
    pub parse_table: HashMap<(NonTerm, Lookahead), usize>,
}

impl LlTables {
    /// Look up the rule to fire when `non_terminal` is on top of the
    /// input stack and `lookahead` is the current token.
    pub fn action(&self, non_terminal: NonTerm, lookahead: Lookahead) -> Option<usize> {
        self.parse_table.get(&(non_terminal, lookahead)).copied()
    }

    /// `FIRST(non_terminal)`, for building a parse-table-miss error
    /// message's expected-set.
    pub fn first_terms(&self, non_terminal: NonTerm) -> Vec<Term> {
        let mut terms: Vec<Term> = self
            .first
            .get(&non_terminal)
            .into_iter()
            .flatten()
            .copied()
            .collect();
        terms.sort_by_key(|t| format!("{}", t));
        terms
    }

    pub fn is_nullable(&self, non_terminal: NonTerm) -> bool {
        self.nullable.get(&non_terminal).copied().unwrap_or(false)
    }

    pub fn follows_end(&self, non_terminal: NonTerm) -> bool {
        self.follow
            .get(&non_terminal)
            .map(|set| set.contains(&Lookahead::End))
            .unwrap_or(false)
    }

    /// Build the tables for `grammar`, failing with `Error::Grammar` if
    /// any `(non_terminal, lookahead)` cell would be claimed by more than
    /// one rule — the grammar would not be LL(1).
    pub fn build(grammar: &TranslationGrammar) -> Result<Self, Error> {
        let non_terminals: Vec<NonTerm> = {
            let mut seen = Vec::new();
            for rule in &grammar.rules {
                if !seen.contains(&rule.lhs) {
                    seen.push(rule.lhs);
                }
            }
            seen
        };

        let nullable = compute_nullable(grammar, &non_terminals);
        let first = compute_first(grammar, &non_terminals, &nullable);
        let follow = compute_follow(grammar, &non_terminals, &nullable, &first);

        let mut parse_table = HashMap::new();
        for (rule_index, rule) in grammar.rules.iter().enumerate() {
            let (rule_first, rule_nullable) = seq_first(&rule.input, &first, &nullable);
            let mut predict: HashSet<Lookahead> =
                rule_first.into_iter().map(Lookahead::Term).collect();
            if rule_nullable {
                if let Some(follow_set) = follow.get(&rule.lhs) {
                    predict.extend(follow_set.iter().copied());
                }
            }
            for lookahead in predict {
                let key = (rule.lhs, lookahead);
                if let Some(&existing) = parse_table.get(&key) {
                    return Err(Error::grammar(format!(
                        "LL(1) conflict on ({}, {:?}): rules {} and {} both predict",
                        rule.lhs, lookahead, existing, rule_index
                    )));
                }
                parse_table.insert(key, rule_index);
            }
        }

        Ok(LlTables {
            nullable,
            first,
            follow,
            parse_table,
        })
    }
}

fn compute_nullable(
    grammar: &TranslationGrammar,
    non_terminals: &[NonTerm],
) -> HashMap<NonTerm, bool> {
    let mut nullable: HashMap<NonTerm, bool> = non_terminals.iter().map(|&nt| (nt, false)).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for rule in &grammar.rules {
            if nullable[&rule.lhs] {
                continue;
            }
            let is_nullable = rule.input.iter().all(|sym| match sym {
                InputSymbol::Terminal(_) => false,
                InputSymbol::NonTerminal(nt) => nullable[nt],
            });
            if is_nullable {
                nullable.insert(rule.lhs, true);
                changed = true;
            }
        }
    }
    nullable
}

/// FIRST of a symbol sequence: the terminals that can begin it, plus
/// whether the whole sequence can derive the empty string.
fn seq_first(
    symbols: &[InputSymbol],
    first: &HashMap<NonTerm, HashSet<Term>>,
    nullable: &HashMap<NonTerm, bool>,
) -> (HashSet<Term>, bool) {
    let mut result = HashSet::new();
    for sym in symbols {
        match sym {
            InputSymbol::Terminal(t) => {
                result.insert(*t);
                return (result, false);
            }
            InputSymbol::NonTerminal(nt) => {
                result.extend(first.get(nt).into_iter().flatten().copied());
                if !nullable[nt] {
                    return (result, false);
                }
            }
        }
    }
    (result, true)
}

fn compute_first(
    grammar: &TranslationGrammar,
    non_terminals: &[NonTerm],
    nullable: &HashMap<NonTerm, bool>,
) -> HashMap<NonTerm, HashSet<Term>> {
    let mut first: HashMap<NonTerm, HashSet<Term>> =
        non_terminals.iter().map(|&nt| (nt, HashSet::new())).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for rule in &grammar.rules {
            let (rule_first, _) = seq_first(&rule.input, &first, nullable);
            let entry = first.get_mut(&rule.lhs).unwrap();
            let before = entry.len();
            entry.extend(rule_first);
            if entry.len() != before {
                changed = true;
            }
        }
    }
    first
}

fn compute_follow(
    grammar: &TranslationGrammar,
    non_terminals: &[NonTerm],
    nullable: &HashMap<NonTerm, bool>,
    first: &HashMap<NonTerm, HashSet<Term>>,
) -> HashMap<NonTerm, HashSet<Lookahead>> {
    let mut follow: HashMap<NonTerm, HashSet<Lookahead>> =
        non_terminals.iter().map(|&nt| (nt, HashSet::new())).collect();
    follow.get_mut(&grammar.start).unwrap().insert(Lookahead::End);

    let mut changed = true;
    while changed {
        changed = false;
        for rule in &grammar.rules {
            for (i, sym) in rule.input.iter().enumerate() {
                let InputSymbol::NonTerminal(nt) = sym else {
                    continue;
                };
                let rest = &rule.input[i + 1..];
                let (rest_first, rest_nullable) = seq_first(rest, first, nullable);
                let entry = follow.get_mut(nt).unwrap();
                let before = entry.len();
                entry.extend(rest_first.into_iter().map(Lookahead::Term));
                if rest_nullable {
                    let lhs_follow: Vec<Lookahead> =
                        follow.get(&rule.lhs).into_iter().flatten().copied().collect();
                    follow.get_mut(nt).unwrap().extend(lhs_follow);
                }
                if follow[nt].len() != before {
                    changed = true;
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::reon_grammar;

    #[test]
    fn reon_grammar_is_ll1() {
        LlTables::build(reon_grammar()).expect("REON's grammar must be conflict-free");
    }

    #[test]
    fn re_is_nullable() {
        let tables = LlTables::build(reon_grammar()).unwrap();
        assert!(tables.is_nullable(NonTerm::Re));
        assert!(!tables.is_nullable(NonTerm::ReFull));
    }

    #[test]
    fn start_symbol_predicts_every_re_full_opener() {
        let tables = LlTables::build(reon_grammar()).unwrap();
        for term in [Term::True, Term::False, Term::Null, Term::String, Term::LBracket, Term::LBrace] {
            assert!(
                tables.action(NonTerm::E, Lookahead::Term(term)).is_some(),
                "E should predict on {:?}",
                term
            );
        }
        // RE is nullable, so E also predicts on End (an empty document).
        assert!(tables.action(NonTerm::E, Lookahead::End).is_some());
    }

    #[test]
    fn detects_conflicting_grammar() {
        use crate::grammar::{GrammarRule, TranslationGrammar};

        let broken = TranslationGrammar {
            start: NonTerm::E,
            rules: vec![
                GrammarRule::passthrough(
                    NonTerm::E,
                    vec![InputSymbol::Terminal(Term::String)],
                    vec![],
                ),
                GrammarRule::passthrough(
                    NonTerm::E,
                    vec![InputSymbol::Terminal(Term::String)],
                    vec![],
                ),
            ],
        };
        let err = LlTables::build(&broken).unwrap_err();
        assert!(err.is_grammar());
    }
}
