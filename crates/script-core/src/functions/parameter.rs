//! Function parameters

use crate::error::ParameterError;

/// A named parameter declared by a shared function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParameter {
    name: String,
    is_optional: bool,
}

impl FunctionParameter {
    pub fn new(name: impl Into<String>, is_optional: bool) -> Result<Self, ParameterError> {
        let name = name.into();
        ensure_valid_parameter_name(&name)?;
        Ok(Self { name, is_optional })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }
}

/// Names must be non-empty and alphanumeric.
pub(crate) fn ensure_valid_parameter_name(name: &str) -> Result<(), ParameterError> {
    if name.is_empty() {
        return Err(ParameterError::MissingName);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ParameterError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Parameters keyed by unique name, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterCollection {
    parameters: Vec<FunctionParameter>,
}

impl ParameterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, parameter: FunctionParameter) -> Result<(), ParameterError> {
        if self.contains(parameter.name()) {
            return Err(ParameterError::DuplicateParameter(parameter.name.clone()));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionParameter> {
        self.parameters.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    pub fn required(&self) -> impl Iterator<Item = &FunctionParameter> {
        self.parameters.iter().filter(|p| !p.is_optional)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }
}

impl TryFrom<Vec<FunctionParameter>> for ParameterCollection {
    type Error = ParameterError;

    fn try_from(parameters: Vec<FunctionParameter>) -> Result<Self, Self::Error> {
        let mut collection = Self::new();
        for parameter in parameters {
            collection.add(parameter)?;
        }
        Ok(collection)
    }
}
