//! Function calls and their YAML form
//!
//! A call is written either as a single object or as a list of objects:
//!
//! ```yaml
//! call:
//!   - function: DisableService
//!     parameters:
//!       serviceName: DiagTrack
//!   - function: ClearLogs
//! ```

use serde_yaml::{Mapping, Value};

use crate::error::FunctionError;
use crate::functions::argument::{FunctionCallArgument, FunctionCallArgumentCollection};

const FUNCTION_KEY: &str = "function";
const PARAMETERS_KEY: &str = "parameters";

/// A call to a shared function with bound arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    function_name: String,
    args: FunctionCallArgumentCollection,
}

impl FunctionCall {
    pub fn new(
        function_name: impl Into<String>,
        args: FunctionCallArgumentCollection,
    ) -> Result<Self, FunctionError> {
        let function_name = function_name.into();
        if function_name.trim().is_empty() {
            return Err(FunctionError::MissingCallName);
        }
        Ok(Self {
            function_name,
            args,
        })
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn args(&self) -> &FunctionCallArgumentCollection {
        &self.args
    }
}

/// Parse the `call` value of a script or function, keeping call order.
pub fn parse_function_calls(raw: &Value) -> Result<Vec<FunctionCall>, FunctionError> {
    match raw {
        Value::Mapping(call) => Ok(vec![parse_call(call)?]),
        Value::Sequence(calls) => calls
            .iter()
            .map(|call| match call {
                Value::Mapping(call) => parse_call(call),
                _ => Err(FunctionError::InvalidCallShape),
            })
            .collect(),
        _ => Err(FunctionError::InvalidCallShape),
    }
}

fn parse_call(call: &Mapping) -> Result<FunctionCall, FunctionError> {
    for key in call.keys() {
        match key.as_str() {
            Some(FUNCTION_KEY) | Some(PARAMETERS_KEY) => {}
            _ => return Err(FunctionError::UnexpectedCallKey(scalar_text(key))),
        }
    }
    let name = call
        .get(FUNCTION_KEY)
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or(FunctionError::MissingCallName)?;

    let args = match call.get(PARAMETERS_KEY) {
        None | Some(Value::Null) => FunctionCallArgumentCollection::new(),
        Some(Value::Mapping(parameters)) => parse_arguments(parameters)?,
        Some(_) => return Err(FunctionError::InvalidCallParameters(name.to_string())),
    };
    FunctionCall::new(name, args)
}

fn parse_arguments(parameters: &Mapping) -> Result<FunctionCallArgumentCollection, FunctionError> {
    let mut args = FunctionCallArgumentCollection::new();
    for (key, value) in parameters {
        let name = scalar_text(key);
        let value = match value {
            Value::String(text) => text.clone(),
            Value::Number(_) | Value::Bool(_) => scalar_text(value),
            Value::Null => String::new(),
            _ => return Err(FunctionError::InvalidArgumentValue(name)),
        };
        args.add(FunctionCallArgument::new(name, value)?)?;
    }
    Ok(args)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}
