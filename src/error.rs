//! The unified error type for every stage of the pipeline. Each stage
//! raises its own variant; the driver never needs to wrap or translate
//! between stages, and `main` maps each variant straight onto an exit
//! code.

use std::fmt;

use crate::scanner::Location;
use crate::symbols::Term;

/// What the translator actually saw at a syntax-error site: either a
/// terminal, or the end of input (which has no `Term` of its own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Term(Term),
    Eof,
}

impl fmt::Display for Found {
    fn fmt(&self, dest: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Found::Term(term) => write!(dest, "{}", term),
            Found::Eof => write!(dest, "end of input"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Error {
    Lexical {
        location: Location,
        message: String,
    },
    Syntax {
        location: Location,
        found: Found,
        expected: Vec<Term>,
    },
    Semantic {
        message: String,
    },
    Grammar {
        message: String,
    },
    Io {
        message: String,
    },
}

impl Error {
    pub fn lexical(location: Location, message: impl Into<String>) -> Self {
        Error::Lexical {
            location,
            message: message.into(),
        }
    }

    pub fn syntax(location: Location, found: Found, expected: Vec<Term>) -> Self {
        Error::Syntax {
            location,
            found,
            expected,
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Error::Semantic {
            message: message.into(),
        }
    }

    pub fn grammar(message: impl Into<String>) -> Self {
        Error::Grammar {
            message: message.into(),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Error::Lexical { .. })
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, Error::Semantic { .. })
    }

    pub fn is_grammar(&self) -> bool {
        matches!(self, Error::Grammar { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}

fn format_expected(dest: &mut fmt::Formatter, expected: &[Term]) -> fmt::Result {
    if expected.is_empty() {
        return write!(dest, "end of input");
    }
    let last = expected.len().saturating_sub(1);
    for (i, term) in expected.iter().enumerate() {
        if i > 0 {
            write!(dest, "{}", if i == last { " or " } else { ", " })?;
        }
        write!(dest, "{}", term)?;
    }
    Ok(())
}

impl fmt::Display for Error {
    fn fmt(&self, dest: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lexical { location, message } => {
                write!(dest, "Lexical error at {}: {}", location, message)
            }
            Error::Syntax {
                location,
                found,
                expected,
            } => {
                write!(dest, "Syntax error at {}: expected ", location)?;
                format_expected(dest, expected)?;
                write!(dest, " but found {}", found)
            }
            Error::Semantic { message } => write!(dest, "Semantic error: {}", message),
            Error::Grammar { message } => write!(dest, "Grammar error: {}", message),
            Error::Io { message } => write!(dest, "I/O error: {}", message),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_formats_alternatives_with_or() {
        let err = Error::syntax(
            Location::default(),
            Found::Term(Term::Colon),
            vec![Term::RBracket, Term::Comma],
        );
        assert_eq!(
            err.to_string(),
            "Syntax error at 1:1: expected ] or , but found :"
        );
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(err.is_io());
    }
}
