//! Compiled script code

use serde::Serialize;

use crate::error::CodeError;

/// Executable code plus its optional revert code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptCode {
    execute: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    revert: Option<String>,
}

impl ScriptCode {
    /// Empty revert code is treated as absent.
    pub fn new(
        execute: impl Into<String>,
        revert: Option<impl Into<String>>,
    ) -> Result<Self, CodeError> {
        let execute = execute.into();
        if execute.is_empty() {
            return Err(CodeError::MissingCode);
        }
        let revert = revert.map(Into::into).filter(|code: &String| !code.is_empty());
        if revert.as_deref() == Some(execute.as_str()) {
            return Err(CodeError::RevertSameAsCode);
        }
        Ok(Self { execute, revert })
    }

    pub fn execute(&self) -> &str {
        &self.execute
    }

    pub fn revert(&self) -> Option<&str> {
        self.revert.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_with_revert() {
        let code = ScriptCode::new("enable", Some("disable")).unwrap();
        assert_eq!(code.execute(), "enable");
        assert_eq!(code.revert(), Some("disable"));
    }

    #[test]
    fn test_empty_code_rejected() {
        assert_eq!(
            ScriptCode::new("", None::<String>).unwrap_err(),
            CodeError::MissingCode
        );
    }

    #[test]
    fn test_revert_same_as_code_rejected() {
        let err = ScriptCode::new("same", Some("same")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "(revert): Code itself and its reverting code cannot be the same"
        );
    }

    #[test]
    fn test_empty_revert_is_absent() {
        let code = ScriptCode::new("run", Some("")).unwrap();
        assert_eq!(code.revert(), None);
    }
}
