//! Error type for collection compilation and script generation

use script_core::{CodeError, ExpressionError, FunctionError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error(transparent)]
    Function(#[from] FunctionError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Code(#[from] CodeError),

    #[error("Failed to compile script: {name}\n{source}")]
    CompileScript {
        name: String,
        #[source]
        source: Box<ScriptError>,
    },

    #[error("script \"{0}\" defines both \"code\" and \"call\"")]
    BothCodeAndCall(String),

    #[error("script \"{0}\" defines neither \"code\" nor \"call\"")]
    NoCode(String),

    #[error("script \"{0}\" has revert code but no code")]
    RevertWithoutCode(String),

    #[error("category \"{0}\" has no children")]
    EmptyCategory(String),

    #[error("duplicate script id \"{0}\"")]
    DuplicateScript(String),

    #[error("script \"{0}\" is not part of the collection")]
    UnknownScript(String),

    #[error("Reverted script lacks revert code.")]
    MissingRevertCode,

    #[error("invalid code position: start line ({start}) must be before end line ({end})")]
    InvalidPosition { start: usize, end: usize },

    #[error(
        "Out of range script end line: {} (total code lines: {total}).",
        quoted_lines(.end_lines)
    )]
    PositionOutOfRange { end_lines: Vec<usize>, total: usize },

    #[error("Unknown script: Position could not be found for the script")]
    UnknownScriptPosition,
}

impl ScriptError {
    pub fn in_script(self, name: &str) -> Self {
        ScriptError::CompileScript {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

fn quoted_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(|line| format!("\"{}\"", line))
        .collect::<Vec<_>>()
        .join(", ")
}
