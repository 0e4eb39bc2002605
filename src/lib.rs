pub mod ast;
pub mod lexer;
pub mod parser;
pub mod translator;

pub use parser::{parse, ParseError};
pub use translator::{command::Command, TranslateError, Translator};

/// Extension of source files.
pub const SOURCE_EXTENSION: &str = "dpl";
/// Extension of the generated command files.
pub const OUTPUT_EXTENSION: &str = "mcfunction";
/// Commands in an output file are separated by this.
pub const LINE_SEPARATOR: &str = "\r\n";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
}

/// Parse and translate a whole program with fresh naming state.
pub fn compile(source: &str) -> Result<Vec<Command>, CompileError> {
    let program = parse(source)?;
    Ok(Translator::new().translate_block(&program)?)
}

/// Join commands into the contents of an output file.
pub fn render(commands: &[Command]) -> String {
    commands
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}
