//! Scripting languages and their line syntax

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target scripting language of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    Batchfile,
    Shellscript,
}

impl ScriptLanguage {
    /// Longest line the interpreter accepts.
    pub fn max_line_length(self) -> usize {
        match self {
            ScriptLanguage::Batchfile => 8191,
            ScriptLanguage::Shellscript => 1_048_576,
        }
    }

    pub fn syntax(self) -> LanguageSyntax {
        LanguageSyntax::for_language(self)
    }
}

impl fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptLanguage::Batchfile => write!(f, "batchfile"),
            ScriptLanguage::Shellscript => write!(f, "shellscript"),
        }
    }
}

/// Comment markers and the tokens that may legitimately repeat on their own line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSyntax {
    pub comment_delimiters: Vec<String>,
    pub common_code_parts: Vec<String>,
}

impl LanguageSyntax {
    pub fn new<D, P>(comment_delimiters: D, common_code_parts: P) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            comment_delimiters: comment_delimiters.into_iter().map(Into::into).collect(),
            common_code_parts: common_code_parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn for_language(language: ScriptLanguage) -> Self {
        match language {
            ScriptLanguage::Batchfile => Self::new(["REM", "::"], ["(", ")", "else", "||"]),
            ScriptLanguage::Shellscript => {
                Self::new(["#"], ["(", ")", "else", "fi", "done"])
            }
        }
    }

    /// Leading whitespace is ignored and delimiters match regardless of case.
    pub fn is_comment_line(&self, line: &str) -> bool {
        let line = line.trim_start().to_lowercase();
        self.comment_delimiters
            .iter()
            .any(|delimiter| line.starts_with(&delimiter.to_lowercase()))
    }

    /// True when every space-separated token is a common code part.
    pub fn is_common_code_only(&self, line: &str) -> bool {
        let line = line.trim().to_lowercase();
        line.split(' ').all(|part| {
            self.common_code_parts
                .iter()
                .any(|common| common.to_lowercase() == part)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_names_round_trip_through_yaml() {
        let language: ScriptLanguage = serde_yaml::from_str("batchfile").unwrap();
        assert_eq!(language, ScriptLanguage::Batchfile);
        assert_eq!(ScriptLanguage::Shellscript.to_string(), "shellscript");
    }

    #[test]
    fn test_comment_lines() {
        let batch = ScriptLanguage::Batchfile.syntax();
        assert!(batch.is_comment_line("REM note"));
        assert!(batch.is_comment_line("  rem lower case"));
        assert!(batch.is_comment_line(":: label comment"));
        assert!(!batch.is_comment_line("echo REM"));

        let shell = ScriptLanguage::Shellscript.syntax();
        assert!(shell.is_comment_line("# comment"));
        assert!(!shell.is_comment_line("echo # not at start"));
    }

    #[test]
    fn test_common_code_only() {
        let shell = ScriptLanguage::Shellscript.syntax();
        assert!(shell.is_common_code_only("fi"));
        assert!(shell.is_common_code_only("  ) else ( "));
        assert!(!shell.is_common_code_only("fi; echo"));
    }
}
