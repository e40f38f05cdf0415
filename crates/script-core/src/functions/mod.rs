//! Shared functions, calls and call resolution

pub mod argument;
pub mod call;
pub mod parameter;
pub mod resolver;
pub mod shared;

pub use argument::{FunctionCallArgument, FunctionCallArgumentCollection};
pub use call::{parse_function_calls, FunctionCall};
pub use parameter::{FunctionParameter, ParameterCollection};
pub use resolver::{resolve_function_calls, SharedFunctionResolver, MAX_CALL_DEPTH};
pub use shared::{
    parse_shared_functions, FunctionBody, FunctionData, ParameterDefinitionData, SharedFunction,
    SharedFunctionCollection,
};
