//! Template expressions: parsing, pipes and compilation

pub mod compiler;
pub mod expression;
pub mod parser;
pub mod pipes;
pub mod position;

pub use compiler::{ExpressionsCompiler, MAX_COMPILE_PASSES};
pub use expression::{ContextVariable, Evaluator, Expression};
pub use parser::{
    CompositeExpressionParser, ExpressionParser, ParameterSubstitutionParser, WithParser,
};
pub use pipes::{EscapeDoubleQuotes, InlinePowerShell, Pipe, PipeRegistry, PipelineCompiler};
pub use position::ExpressionPosition;
