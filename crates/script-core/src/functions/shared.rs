//! Shared functions and the collection they are looked up from

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FunctionError;
use crate::functions::call::{parse_function_calls, FunctionCall};
use crate::functions::parameter::{FunctionParameter, ParameterCollection};
use crate::validation::{validate_code, CodeValidationRule, ScriptLanguage};

// =============================================================================
// CATALOG DATA
// =============================================================================

/// A function as written in a collection file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionData {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterDefinitionData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinitionData {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
}

// =============================================================================
// SHARED FUNCTION
// =============================================================================

/// What a function does when called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionBody {
    /// Inline code templates.
    Code {
        execute: String,
        revert: Option<String>,
    },
    /// Calls to other functions, in order.
    Calls(Vec<FunctionCall>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFunction {
    name: String,
    parameters: ParameterCollection,
    body: FunctionBody,
}

impl SharedFunction {
    pub fn with_code(
        name: impl Into<String>,
        parameters: ParameterCollection,
        execute: impl Into<String>,
        revert: Option<String>,
    ) -> Result<Self, FunctionError> {
        let name = ensure_name(name.into())?;
        let execute = execute.into();
        if execute.is_empty() {
            return Err(FunctionError::MissingCode(name));
        }
        Ok(Self {
            name,
            parameters,
            body: FunctionBody::Code {
                execute,
                revert: revert.filter(|code| !code.is_empty()),
            },
        })
    }

    pub fn with_calls(
        name: impl Into<String>,
        parameters: ParameterCollection,
        calls: Vec<FunctionCall>,
    ) -> Result<Self, FunctionError> {
        let name = ensure_name(name.into())?;
        if calls.is_empty() {
            return Err(FunctionError::MissingCallSequence(name));
        }
        Ok(Self {
            name,
            parameters,
            body: FunctionBody::Calls(calls),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &ParameterCollection {
        &self.parameters
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }
}

fn ensure_name(name: String) -> Result<String, FunctionError> {
    if name.trim().is_empty() {
        return Err(FunctionError::MissingFunctionName);
    }
    Ok(name)
}

/// Functions by name; lookups and duplicate checks ignore ASCII case.
#[derive(Debug, Clone, Default)]
pub struct SharedFunctionCollection {
    functions: Vec<SharedFunction>,
}

impl SharedFunctionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, function: SharedFunction) -> Result<(), FunctionError> {
        if self.find(function.name()).is_some() {
            return Err(FunctionError::DuplicateFunction(function.name));
        }
        self.functions.push(function);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&SharedFunction, FunctionError> {
        if name.trim().is_empty() {
            return Err(FunctionError::MissingFunctionName);
        }
        self.find(name)
            .ok_or_else(|| FunctionError::UndefinedFunction(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedFunction> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn find(&self, name: &str) -> Option<&SharedFunction> {
        self.functions
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Build the function collection of a catalog, checking the definitions as a
/// whole before any function is constructed.
pub fn parse_shared_functions(
    functions: &[FunctionData],
    language: ScriptLanguage,
) -> Result<SharedFunctionCollection, FunctionError> {
    let mut collection = SharedFunctionCollection::new();
    if functions.is_empty() {
        return Ok(collection);
    }
    ensure_valid_functions(functions)?;
    for data in functions {
        let function = parse_function(data, language).map_err(|e| e.in_function(&data.name))?;
        collection.add(function)?;
    }
    debug!(count = collection.len(), "parsed shared functions");
    Ok(collection)
}

fn parse_function(
    data: &FunctionData,
    language: ScriptLanguage,
) -> Result<SharedFunction, FunctionError> {
    let parameters = parse_parameters(data)?;
    match (&data.code, &data.call) {
        (Some(code), _) => {
            for text in [Some(code), data.revert_code.as_ref()].into_iter().flatten() {
                validate_code(
                    text,
                    language,
                    &[
                        CodeValidationRule::NoEmptyLines,
                        CodeValidationRule::NoDuplicatedLines,
                    ],
                )?;
            }
            SharedFunction::with_code(&data.name, parameters, code, data.revert_code.clone())
        }
        (None, Some(call)) => {
            SharedFunction::with_calls(&data.name, parameters, parse_function_calls(call)?)
        }
        (None, None) => Err(FunctionError::NeitherCodeNorCall(vec![data.name.clone()])),
    }
}

fn parse_parameters(data: &FunctionData) -> Result<ParameterCollection, FunctionError> {
    let mut parameters = ParameterCollection::new();
    for definition in data.parameters.iter().flatten() {
        let parameter = FunctionParameter::new(&definition.name, definition.optional)
            .map_err(|e| FunctionError::Context {
                context: format!(
                    "Failed to create parameter: {} for function \"{}\"",
                    definition.name, data.name
                ),
                source: Box::new(e.into()),
            })?;
        parameters.add(parameter)?;
    }
    Ok(parameters)
}

fn ensure_valid_functions(functions: &[FunctionData]) -> Result<(), FunctionError> {
    if functions.iter().any(|f| f.name.trim().is_empty()) {
        return Err(FunctionError::UnnamedFunctions);
    }

    let duplicate_names = duplicates(functions.iter().map(|f| f.name.to_lowercase()));
    if !duplicate_names.is_empty() {
        return Err(FunctionError::DuplicateFunctionNames(duplicate_names));
    }

    let both: Vec<String> = functions
        .iter()
        .filter(|f| f.code.is_some() && f.call.is_some())
        .map(|f| f.name.clone())
        .collect();
    if !both.is_empty() {
        return Err(FunctionError::BothCodeAndCall(both));
    }
    let neither: Vec<String> = functions
        .iter()
        .filter(|f| f.code.is_none() && f.call.is_none())
        .map(|f| f.name.clone())
        .collect();
    if !neither.is_empty() {
        return Err(FunctionError::NeitherCodeNorCall(neither));
    }

    let duplicate_code = duplicates(functions.iter().filter_map(|f| f.code.clone()));
    if !duplicate_code.is_empty() {
        return Err(FunctionError::DuplicateCode(duplicate_code));
    }
    let duplicate_revert = duplicates(
        functions
            .iter()
            .filter_map(|f| f.revert_code.clone())
            .filter(|code| !code.is_empty()),
    );
    if !duplicate_revert.is_empty() {
        return Err(FunctionError::DuplicateRevertCode(duplicate_revert));
    }
    Ok(())
}

/// Values seen more than once, each reported once in first-seen order.
fn duplicates(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for value in values {
        if !seen.insert(value.clone()) && !repeated.contains(&value) {
            repeated.push(value);
        }
    }
    repeated
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn functions(yaml: &str) -> Vec<FunctionData> {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn parse(yaml: &str) -> Result<SharedFunctionCollection, FunctionError> {
        parse_shared_functions(&functions(yaml), ScriptLanguage::Batchfile)
    }

    #[test]
    fn test_parses_code_and_call_functions() {
        let collection = parse(
            r#"
- name: Echo
  parameters:
    - name: text
    - name: suffix
      optional: true
  code: echo {{ $text }}
  revertCode: echo undo
- name: EchoTwice
  call:
    - function: Echo
      parameters: { text: one }
    - function: Echo
      parameters: { text: two }
"#,
        )
        .unwrap();
        assert_eq!(collection.len(), 2);
        let echo = collection.get("echo").unwrap();
        assert_eq!(echo.parameters().len(), 2);
        assert!(echo.parameters().get("suffix").unwrap().is_optional());
        match collection.get("EchoTwice").unwrap().body() {
            FunctionBody::Calls(calls) => assert_eq!(calls.len(), 2),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_empty_list_gives_empty_collection() {
        assert!(parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_unnamed_function_rejected() {
        assert_eq!(
            parse("- code: echo").unwrap_err(),
            FunctionError::UnnamedFunctions
        );
    }

    #[test]
    fn test_duplicate_names_ignore_case() {
        let err = parse("- name: A\n  code: a\n- name: a\n  code: b").unwrap_err();
        assert_eq!(err, FunctionError::DuplicateFunctionNames(vec!["a".into()]));
    }

    #[test]
    fn test_code_and_call_are_exclusive() {
        let err = parse("- name: A\n  code: a\n  call: { function: B }").unwrap_err();
        assert_eq!(err, FunctionError::BothCodeAndCall(vec!["A".into()]));
        let err = parse("- name: A").unwrap_err();
        assert_eq!(err, FunctionError::NeitherCodeNorCall(vec!["A".into()]));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let err = parse("- name: A\n  code: same\n- name: B\n  code: same").unwrap_err();
        assert_eq!(err.to_string(), "duplicate \"code\" in functions: \"same\"");
        let err = parse(
            "- name: A\n  code: a\n  revertCode: r\n- name: B\n  code: b\n  revertCode: r",
        )
        .unwrap_err();
        assert_eq!(err, FunctionError::DuplicateRevertCode(vec!["r".into()]));
    }

    #[test]
    fn test_invalid_code_rejected() {
        let err = parse("- name: A\n  code: \"a\\n\\nb\"").unwrap_err();
        assert!(err.to_string().contains("Empty line"), "{}", err);
    }

    #[test]
    fn test_invalid_parameter_name_has_context() {
        let err = parse("- name: A\n  parameters: [{ name: bad-name }]\n  code: a").unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to create parameter: bad-name for function \"A\""));
    }

    #[test]
    fn test_collection_lookup() {
        let mut collection = SharedFunctionCollection::new();
        let function =
            SharedFunction::with_code("Run", ParameterCollection::new(), "run", None).unwrap();
        collection.add(function.clone()).unwrap();
        assert_eq!(
            collection.add(function).unwrap_err().to_string(),
            "function with name Run already exists"
        );
        assert_eq!(
            collection.get("Missing").unwrap_err().to_string(),
            "called function is not defined \"Missing\""
        );
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            SharedFunction::with_code(" ", ParameterCollection::new(), "x", None).unwrap_err(),
            FunctionError::MissingFunctionName
        );
        assert_eq!(
            SharedFunction::with_code("F", ParameterCollection::new(), "", None)
                .unwrap_err()
                .to_string(),
            "undefined code in function \"F\""
        );
        assert_eq!(
            SharedFunction::with_calls("F", ParameterCollection::new(), vec![])
                .unwrap_err()
                .to_string(),
            "missing call sequence in function \"F\""
        );
    }
}
