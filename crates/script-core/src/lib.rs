//! script-core: compilation pipeline behind catalog-driven script generation
//!
//! This crate turns catalog definitions into validated script code with NO I/O:
//! - `{{ $param | pipe }}` placeholders and `{{ with $param }}` blocks
//! - Pipeline compiler and the built-in pipes
//! - Shared functions, function calls and nested call resolution
//! - Line-based code validation rules per scripting language
//!
//! Loading catalogs from disk and assembling the final script live in the
//! `scriptforge` crate.

pub mod code;
pub mod error;
pub mod expressions;
pub mod functions;
pub mod text;
pub mod validation;

pub use code::ScriptCode;
pub use error::{CodeError, ExpressionError, FunctionError, ParameterError, ValidationError};
pub use expressions::{
    CompositeExpressionParser, Expression, ExpressionParser, ExpressionPosition,
    ExpressionsCompiler, Pipe, PipeRegistry, PipelineCompiler,
};
pub use functions::{
    parse_function_calls, parse_shared_functions, resolve_function_calls, FunctionBody,
    FunctionCall, FunctionCallArgument, FunctionCallArgumentCollection, FunctionData,
    FunctionParameter, ParameterCollection, ParameterDefinitionData, SharedFunction,
    SharedFunctionCollection, SharedFunctionResolver,
};
pub use validation::{
    create_validation_analyzers, validate_code, validate_code_with, CodeLine,
    CodeValidationRule, InvalidCodeLine, LanguageSyntax, ScriptLanguage,
};
