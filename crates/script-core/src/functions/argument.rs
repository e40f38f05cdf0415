//! Arguments passed to function calls

use crate::error::ParameterError;
use crate::functions::parameter::{ensure_valid_parameter_name, ParameterCollection};

/// A value bound to a parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCallArgument {
    parameter_name: String,
    argument_value: String,
}

impl FunctionCallArgument {
    pub fn new(
        parameter_name: impl Into<String>,
        argument_value: impl Into<String>,
    ) -> Result<Self, ParameterError> {
        let parameter_name = parameter_name.into();
        ensure_valid_parameter_name(&parameter_name)?;
        let argument_value = argument_value.into();
        if argument_value.is_empty() {
            return Err(ParameterError::EmptyArgumentValue(parameter_name));
        }
        Ok(Self {
            parameter_name,
            argument_value,
        })
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    pub fn value(&self) -> &str {
        &self.argument_value
    }
}

/// Arguments keyed by parameter name, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionCallArgumentCollection {
    arguments: Vec<FunctionCallArgument>,
}

impl FunctionCallArgumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, argument: FunctionCallArgument) -> Result<(), ParameterError> {
        if self.has(argument.parameter_name()) {
            return Err(ParameterError::DuplicateArgument(
                argument.parameter_name.clone(),
            ));
        }
        self.arguments.push(argument);
        Ok(())
    }

    pub fn has(&self, parameter_name: &str) -> bool {
        self.arguments
            .iter()
            .any(|a| a.parameter_name == parameter_name)
    }

    pub fn get(&self, parameter_name: &str) -> Result<&FunctionCallArgument, ParameterError> {
        self.arguments
            .iter()
            .find(|a| a.parameter_name == parameter_name)
            .ok_or_else(|| ParameterError::UnknownArgument(parameter_name.to_string()))
    }

    /// Value for a parameter, if one was given.
    pub fn value(&self, parameter_name: &str) -> Option<&str> {
        self.get(parameter_name).ok().map(FunctionCallArgument::value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|a| a.parameter_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionCallArgument> {
        self.arguments.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Only the arguments whose names appear in `parameters`.
    pub fn restricted_to(&self, parameters: &ParameterCollection) -> Self {
        Self {
            arguments: self
                .arguments
                .iter()
                .filter(|a| parameters.contains(&a.parameter_name))
                .cloned()
                .collect(),
        }
    }

    /// Build from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ParameterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut collection = Self::new();
        for (name, value) in pairs {
            collection.add(FunctionCallArgument::new(name, value)?)?;
        }
        Ok(collection)
    }
}
