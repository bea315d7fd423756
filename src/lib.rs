//! REON: a JSON-structured surface syntax for authoring regular
//! expressions, translated to Python 3 `re` text.
//!
//! The crate is a three-stage transducer: a hand-written [`scanner`]
//! resolves REON's token vocabulary, an LL(1) [`translator`] drives a
//! fixed [`grammar`] to produce an output-symbol stream, and the
//! [`generator`] validates each construct and writes target regex
//! text. [`driver::translate`] composes all three; that is the one
//! entry point most callers need.

#[macro_use]
extern crate lazy_static;

pub mod driver;
pub mod error;
pub mod generator;
pub mod grammar;
pub mod ll_table;
pub mod scanner;
pub mod symbols;
pub mod translator;

pub use driver::translate;
pub use error::Error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_level_entry_point_translates_an_empty_document() {
        assert_eq!(translate("", "re").unwrap(), "re = r\"(?m)\"\n");
    }
}
