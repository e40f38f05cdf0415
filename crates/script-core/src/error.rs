//! Error types for the compilation pipeline

use thiserror::Error;

/// Render names as `"a", "b"`.
pub(crate) fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while locating or evaluating `{{ ... }}` expressions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("invalid expression position: no length (start = end = {0})")]
    EmptyPosition(usize),

    #[error("invalid expression position: start ({start}) is after end ({end})")]
    StartAfterEnd { start: usize, end: usize },

    #[error("invalid expression syntax at {position}: \"{text}\"")]
    Malformed { position: usize, text: String },

    #[error("unclosed expression at {0}, missing `}}}}`")]
    Unclosed(usize),

    #[error("Context variable before `with` statement.")]
    ContextVariableOutsideWith { position: usize },

    #[error("Redundant `end` statement, missing `with`?")]
    RedundantEnd { position: usize },

    #[error("Missing `end` statement, forgot `{{{{ end }}}}`?")]
    MissingEnd { position: usize },

    #[error("Expressions out of range: {0}")]
    OutOfRange(String),

    #[error("Instructions at same position: {0}")]
    SamePosition(String),

    #[error("Instructions intersecting unexpectedly: {0}")]
    Intersecting(String),

    #[error("argument value(s) missing for required parameter(s): {}", quote_list(.0))]
    MissingRequiredArguments(Vec<String>),

    #[error("parameter value(s) not provided for: {} but used in code", quote_list(.0))]
    ParametersNotProvided(Vec<String>),

    #[error("expressions still present after {0} compilation passes")]
    TooManyPasses(usize),

    #[error("missing value")]
    MissingPipelineValue,

    #[error("missing pipeline")]
    MissingPipeline,

    #[error("pipeline does not start with pipe")]
    PipelineWithoutPipe,

    #[error("missing pipes")]
    MissingPipes,

    #[error("Unknown pipe: \"{0}\"")]
    UnknownPipe(String),

    #[error("Pipe name must be unique: \"{0}\"")]
    DuplicatePipe(String),

    #[error("Pipe name should be camelCase: \"{0}\"")]
    InvalidPipeName(String),

    #[error("pipe \"{0}\" does not accept an argument")]
    UnexpectedPipeArgument(String),

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Errors raised by parameter and argument construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("missing parameter name")]
    MissingName,

    #[error("parameter name must be alphanumeric but it was \"{0}\"")]
    InvalidName(String),

    #[error("duplicate parameter name: \"{0}\"")]
    DuplicateParameter(String),

    #[error("Missing argument value for the parameter \"{0}\".")]
    EmptyArgumentValue(String),

    #[error("argument value for parameter {0} is already given")]
    DuplicateArgument(String),

    #[error("parameter does not exist: {0}")]
    UnknownArgument(String),
}

/// Errors raised by [`crate::ScriptCode`] construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("missing code")]
    MissingCode,

    #[error("(revert): Code itself and its reverting code cannot be the same")]
    RevertSameAsCode,
}

/// Errors raised while parsing, validating or resolving shared functions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FunctionError {
    #[error("missing function name")]
    MissingFunctionName,

    #[error("undefined code in function \"{0}\"")]
    MissingCode(String),

    #[error("missing call sequence in function \"{0}\"")]
    MissingCallSequence(String),

    #[error("function with name {0} already exists")]
    DuplicateFunction(String),

    #[error("called function is not defined \"{0}\"")]
    UndefinedFunction(String),

    #[error("called function(s) must be an object or array")]
    InvalidCallShape,

    #[error("missing function calls")]
    NoCalls,

    #[error("missing function name in function call")]
    MissingCallName,

    #[error("function call has unexpected key \"{0}\", expected \"function\" or \"parameters\"")]
    UnexpectedCallKey(String),

    #[error("parameters of function call \"{0}\" must be an object")]
    InvalidCallParameters(String),

    #[error("argument \"{0}\" must be a text value")]
    InvalidArgumentValue(String),

    #[error("some function(s) are unnamed")]
    UnnamedFunctions,

    #[error("duplicate function name: {}", quote_list(.0))]
    DuplicateFunctionNames(Vec<String>),

    #[error("both \"code\" and \"call\" are defined in function(s): {}", quote_list(.0))]
    BothCodeAndCall(Vec<String>),

    #[error("neither \"code\" or \"call\" is defined in function(s): {}", quote_list(.0))]
    NeitherCodeNorCall(Vec<String>),

    #[error("duplicate \"code\" in functions: {}", quote_list(.0))]
    DuplicateCode(Vec<String>),

    #[error("duplicate \"revertCode\" in functions: {}", quote_list(.0))]
    DuplicateRevertCode(Vec<String>),

    #[error(
        "Function \"{function}\" has unexpected parameter(s) provided: {}. Expected parameter(s): {}",
        quote_list(.unexpected),
        expected_list(.expected)
    )]
    UnexpectedParameters {
        function: String,
        unexpected: Vec<String>,
        expected: Vec<String>,
    },

    #[error("Compilation resulted in empty value for required parameter: \"{0}\"")]
    EmptyRequiredArgument(String),

    #[error("Circular function call detected: {0}")]
    CircularCall(String),

    #[error("function calls nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("Error when compiling argument for \"{parameter}\": {source}")]
    Argument {
        parameter: String,
        #[source]
        source: ExpressionError,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<FunctionError>,
    },

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Code(#[from] CodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FunctionError {
    /// Prefix an error with the function it was raised for.
    pub fn in_function(self, name: &str) -> Self {
        FunctionError::Context {
            context: format!("failed to use function \"{}\"", name),
            source: Box::new(self),
        }
    }
}

fn expected_list(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        quote_list(names)
    }
}

/// Errors raised by code validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing rules")]
    MissingRules,

    #[error("Duplicate rules are not allowed. Duplicates found: {0}")]
    DuplicateRules(String),

    #[error("{0}")]
    InvalidCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_provided_message_lists_names() {
        let err = ExpressionError::ParametersNotProvided(vec!["p1".into(), "p2".into()]);
        assert_eq!(
            err.to_string(),
            r#"parameter value(s) not provided for: "p1", "p2" but used in code"#
        );
    }

    #[test]
    fn test_unexpected_parameters_without_expected() {
        let err = FunctionError::UnexpectedParameters {
            function: "f".into(),
            unexpected: vec!["a".into(), "b".into()],
            expected: vec![],
        };
        assert_eq!(
            err.to_string(),
            r#"Function "f" has unexpected parameter(s) provided: "a", "b". Expected parameter(s): none"#
        );
    }

    #[test]
    fn test_missing_end_message_keeps_braces() {
        let err = ExpressionError::MissingEnd { position: 0 };
        assert_eq!(err.to_string(), "Missing `end` statement, forgot `{{ end }}`?");
    }
}
