//! The `reon` CLI: opens the configured input/output, hands the source
//! text to [`reon::translate`], and maps the result onto an exit code.
//! All translation logic lives in the library; this binary is
//! deliberately thin.

use std::{
    fs,
    io::{self, Read, Write},
    panic,
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;

use reon::Error;

#[derive(Debug, Parser)]
#[command(
    name = "reon",
    version,
    about = "Translate a REON regular-expression document into Python `re` source text"
)]
struct CliOptions {
    /// Path of the REON source document (reads stdin when omitted).
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    input: Option<PathBuf>,

    /// Path to write the translated `<var> = r"..."` assignment to
    /// (writes stdout when omitted).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Name of the variable the generated assignment binds to.
    #[arg(short = 'v', long = "variable", value_name = "NAME", default_value = "re")]
    variable: String,
}

/// Process exit codes, one per pipeline-error variant plus success,
/// argument, and internal-panic cases.
mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const RUNTIME_ERROR: u8 = 1;
    pub const BAD_ARGUMENT: u8 = 2;
    pub const ENGINE_INTERNAL_ERROR: u8 = 3;
    pub const LEXICAL_ERROR: u8 = 5;
    pub const SYNTAX_ERROR: u8 = 6;
    pub const SEMANTIC_ERROR: u8 = 7;
    pub const UNKNOWN: u8 = 666;
}

fn validate_variable_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("variable name must not be empty".to_string());
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "variable name {:?} must contain only alphabetic characters",
            name
        ));
    }
    Ok(())
}

fn read_source(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn write_output(path: Option<&PathBuf>, text: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, text),
        None => io::stdout().write_all(text.as_bytes()),
    }
}

fn main() -> ExitCode {
    let options = CliOptions::parse();

    if let Err(message) = validate_variable_name(&options.variable) {
        eprintln!("invalid argument: {}", message);
        return ExitCode::from(exit_code::BAD_ARGUMENT);
    }

    let source = match read_source(options.input.as_ref()) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error reading input: {}", error);
            return ExitCode::from(exit_code::BAD_ARGUMENT);
        }
    };

    let result = panic::catch_unwind(|| reon::translate(&source, &options.variable));

    let translated = match result {
        Ok(Ok(translated)) => translated,
        Ok(Err(error)) => return report_translation_error(error),
        Err(_) => {
            eprintln!("internal error: the translator panicked");
            return ExitCode::from(exit_code::UNKNOWN);
        }
    };

    if let Err(error) = write_output(options.output.as_ref(), &translated) {
        eprintln!("error writing output: {}", error);
        return ExitCode::from(exit_code::RUNTIME_ERROR);
    }

    ExitCode::from(exit_code::SUCCESS)
}

fn report_translation_error(error: Error) -> ExitCode {
    eprintln!("{}", error);
    let code = match error {
        Error::Lexical { .. } => exit_code::LEXICAL_ERROR,
        Error::Syntax { .. } => exit_code::SYNTAX_ERROR,
        Error::Semantic { .. } => exit_code::SEMANTIC_ERROR,
        Error::Grammar { .. } => exit_code::ENGINE_INTERNAL_ERROR,
        Error::Io { .. } => exit_code::RUNTIME_ERROR,
    };
    ExitCode::from(code)
}
