//! Line-based code validation

pub mod analyzers;
pub mod syntax;
pub mod validator;

pub use analyzers::{AnalysisContext, CodeAnalyzer, CodeLine, InvalidCodeLine};
pub use syntax::{LanguageSyntax, ScriptLanguage};
pub use validator::{
    create_validation_analyzers, validate_code, validate_code_with, CodeValidationRule,
};
