//! Composes the three pipeline stages into the one entry point the rest
//! of the crate (and `main`) calls: scan, translate against the fixed
//! grammar's LL(1) tables, then generate target text.

use crate::error::Error;
use crate::generator::OutputState;
use crate::grammar::reon_grammar;
use crate::ll_table::LlTables;
use crate::scanner::Scanner;
use crate::translator;

use lazy_static::lazy_static;

lazy_static! {
    static ref TABLES: LlTables =
        LlTables::build(reon_grammar()).expect("REON's fixed grammar must be LL(1)");
}

/// Translate a REON document into a Python `re`-flavored pattern
/// assignment, bound to `variable` (`"re"` unless the caller overrides
/// it). Returns the full `name = r"(?m)..."` line, newline included.
pub fn translate(source: &str, variable: &str) -> Result<String, Error> {
    let mut scanner = Scanner::new(source);
    let symbols = translator::translate(reon_grammar(), &TABLES, &mut scanner)?;
    OutputState::new().generate(&symbols, variable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_compiles_to_an_always_matching_pattern() {
        assert_eq!(translate("", "re").unwrap(), "re = r\"(?m)\"\n");
    }

    #[test]
    fn plain_string_passes_through() {
        assert_eq!(translate("\"abc\"", "re").unwrap(), "re = r\"(?m)abc\"\n");
    }

    #[test]
    fn true_compiles_to_an_empty_always_matching_fragment() {
        assert_eq!(translate("true", "re").unwrap(), "re = r\"(?m)\"\n");
    }

    #[test]
    fn false_and_null_both_compile_to_never_matching() {
        assert_eq!(translate("false", "re").unwrap(), "re = r\"(?m)(?!)\"\n");
        assert_eq!(translate("null", "re").unwrap(), "re = r\"(?m)(?!)\"\n");
    }

    #[test]
    fn set_compiles_to_a_character_class() {
        assert_eq!(
            translate("{\"set\": \"a-z\"}", "re").unwrap(),
            "re = r\"(?m)[a-z]\"\n"
        );
    }

    #[test]
    fn negated_set_compiles_to_a_negated_character_class() {
        assert_eq!(
            translate("{\"!set\": \"abc\"}", "re").unwrap(),
            "re = r\"(?m)[^abc]\"\n"
        );
    }

    #[test]
    fn repeat_range_compiles_to_a_python_quantifier() {
        assert_eq!(
            translate("{\"repeat 2-4\": \"x\"}", "re").unwrap(),
            "re = r\"(?m)(?:x){2,4}\"\n"
        );
    }

    #[test]
    fn alternatives_compile_to_a_non_capturing_alternation() {
        assert_eq!(
            translate("{\"alternatives\": [\"a\", \"b\", \"c\"]}", "re").unwrap(),
            "re = r\"(?m)(?:a|b|c)\"\n"
        );
    }

    #[test]
    fn named_group_and_its_reference_compile_together() {
        assert_eq!(
            translate(
                "[{\"group foo\": \"bar\"}, {\"match group\": \"foo\"}]",
                "re"
            )
            .unwrap(),
            "re = r\"(?m)(?P<foo>bar)(?P=foo)\"\n"
        );
    }

    #[test]
    fn lookbehind_around_a_variable_length_repeat_is_a_semantic_error() {
        let err = translate("{\"lookbehind\": {\"repeat\": \"x\"}}", "re").unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn reference_to_an_unknown_group_is_a_semantic_error() {
        let err = translate("{\"match group\": \"missing\"}", "re").unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn variable_name_is_configurable() {
        assert_eq!(
            translate("\"a\"", "pattern").unwrap(),
            "pattern = r\"(?m)a\"\n"
        );
    }

    #[test]
    fn malformed_document_is_a_syntax_error() {
        let err = translate("}", "re").unwrap_err();
        assert!(err.is_syntax());
    }
}
