//! Resolves function calls into script code
//!
//! Inline-code functions compile their templates with the call arguments.
//! Call-sequence functions compile each nested call's argument values against
//! the caller's arguments, resolve the nested calls recursively and join the
//! results line by line.

use tracing::debug;

use crate::code::ScriptCode;
use crate::error::FunctionError;
use crate::expressions::ExpressionsCompiler;
use crate::functions::argument::{FunctionCallArgument, FunctionCallArgumentCollection};
use crate::functions::call::FunctionCall;
use crate::functions::shared::{FunctionBody, SharedFunction, SharedFunctionCollection};

/// Maximum nesting of call-sequence functions.
pub const MAX_CALL_DEPTH: usize = 64;

/// Code produced by one call, possibly empty.
#[derive(Debug, Default)]
struct CompiledCode {
    execute: String,
    revert: String,
}

pub struct SharedFunctionResolver<'a> {
    functions: &'a SharedFunctionCollection,
    compiler: &'a ExpressionsCompiler,
}

impl<'a> SharedFunctionResolver<'a> {
    pub fn new(functions: &'a SharedFunctionCollection, compiler: &'a ExpressionsCompiler) -> Self {
        Self {
            functions,
            compiler,
        }
    }

    /// Resolve a call sequence into a single [`ScriptCode`].
    pub fn resolve(&self, calls: &[FunctionCall]) -> Result<ScriptCode, FunctionError> {
        if calls.is_empty() {
            return Err(FunctionError::NoCalls);
        }
        let mut chain = Vec::new();
        let segments = calls
            .iter()
            .map(|call| self.compile_call(call, &mut chain))
            .collect::<Result<Vec<_>, _>>()?;
        let merged = merge(segments);
        debug!(calls = calls.len(), lines = merged.execute.lines().count(), "resolved function calls");
        Ok(ScriptCode::new(merged.execute, Some(merged.revert))?)
    }

    fn compile_call(
        &self,
        call: &FunctionCall,
        chain: &mut Vec<String>,
    ) -> Result<CompiledCode, FunctionError> {
        let function = self.functions.get(call.function_name())?;
        ensure_expected_parameters(function, call.args())?;

        if chain.iter().any(|name| name.eq_ignore_ascii_case(function.name())) {
            let mut cycle = chain.clone();
            cycle.push(function.name().to_string());
            return Err(FunctionError::CircularCall(cycle.join(" -> ")));
        }
        if chain.len() >= MAX_CALL_DEPTH {
            return Err(FunctionError::TooDeep(MAX_CALL_DEPTH));
        }

        chain.push(function.name().to_string());
        let compiled = self.compile_body(function, call.args(), chain);
        chain.pop();
        compiled
    }

    fn compile_body(
        &self,
        function: &SharedFunction,
        args: &FunctionCallArgumentCollection,
        chain: &mut Vec<String>,
    ) -> Result<CompiledCode, FunctionError> {
        match function.body() {
            FunctionBody::Code { execute, revert } => Ok(CompiledCode {
                execute: self.compiler.compile_expressions(execute, args)?,
                revert: match revert {
                    Some(revert) => self.compiler.compile_expressions(revert, args)?,
                    None => String::new(),
                },
            }),
            FunctionBody::Calls(calls) => {
                let mut segments = Vec::with_capacity(calls.len());
                for nested in calls {
                    let nested = self.compile_nested_call(nested, args)?;
                    segments.push(self.compile_call(&nested, chain)?);
                }
                Ok(merge(segments))
            }
        }
    }

    /// Compile the nested call's argument values with the caller's arguments.
    /// Parameters the nested call leaves out take the caller's argument of the
    /// same name, if any.
    fn compile_nested_call(
        &self,
        nested: &FunctionCall,
        parent_args: &FunctionCallArgumentCollection,
    ) -> Result<FunctionCall, FunctionError> {
        let callee = self.functions.get(nested.function_name())?;
        let mut args = FunctionCallArgumentCollection::new();

        for argument in nested.args().iter() {
            let name = argument.parameter_name();
            let value = self
                .compiler
                .compile_expressions(argument.value(), parent_args)
                .map_err(|source| FunctionError::Argument {
                    parameter: name.to_string(),
                    source,
                })?;
            if value.is_empty() {
                let required = callee
                    .parameters()
                    .get(name)
                    .is_some_and(|p| !p.is_optional());
                if required {
                    return Err(FunctionError::EmptyRequiredArgument(name.to_string()));
                }
                continue;
            }
            args.add(FunctionCallArgument::new(name, value)?)?;
        }

        for name in callee.parameters().names() {
            if nested.args().has(name) {
                continue;
            }
            if let Some(value) = parent_args.value(name) {
                args.add(FunctionCallArgument::new(name, value)?)?;
            }
        }

        FunctionCall::new(nested.function_name(), args)
    }
}

/// Provided arguments must all be declared by the function.
fn ensure_expected_parameters(
    function: &SharedFunction,
    args: &FunctionCallArgumentCollection,
) -> Result<(), FunctionError> {
    let unexpected: Vec<String> = args
        .names()
        .filter(|name| !function.parameters().contains(name))
        .map(str::to_string)
        .collect();
    if unexpected.is_empty() {
        return Ok(());
    }
    Err(FunctionError::UnexpectedParameters {
        function: function.name().to_string(),
        unexpected,
        expected: function.parameters().names().map(str::to_string).collect(),
    })
}

/// Join non-empty segments with `\n`, keeping call order for both codes.
fn merge(segments: Vec<CompiledCode>) -> CompiledCode {
    let join = |parts: Vec<&str>| {
        parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    };
    CompiledCode {
        execute: join(segments.iter().map(|s| s.execute.as_str()).collect()),
        revert: join(segments.iter().map(|s| s.revert.as_str()).collect()),
    }
}

/// Resolve `calls` against `functions` with the default compiler.
pub fn resolve_function_calls(
    calls: &[FunctionCall],
    functions: &SharedFunctionCollection,
) -> Result<ScriptCode, FunctionError> {
    let compiler = ExpressionsCompiler::default();
    SharedFunctionResolver::new(functions, &compiler).resolve(calls)
}
