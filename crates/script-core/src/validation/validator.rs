//! Code validation against a set of rules

use std::fmt;

use crate::error::ValidationError;
use crate::text::split_lines;
use crate::validation::analyzers::{
    analyze_comment_only_code, analyze_duplicate_lines, analyze_empty_lines,
    analyze_too_long_lines, AnalysisContext, CodeAnalyzer, CodeLine, InvalidCodeLine,
};
use crate::validation::syntax::{LanguageSyntax, ScriptLanguage};

/// A named validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodeValidationRule {
    NoEmptyLines,
    NoDuplicatedLines,
    NoTooLongLines,
    NoCommentOnlyLines,
}

impl fmt::Display for CodeValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodeValidationRule::NoEmptyLines => "NoEmptyLines",
            CodeValidationRule::NoDuplicatedLines => "NoDuplicatedLines",
            CodeValidationRule::NoTooLongLines => "NoTooLongLines",
            CodeValidationRule::NoCommentOnlyLines => "NoCommentOnlyLines",
        };
        f.write_str(name)
    }
}

impl CodeValidationRule {
    fn analyzer(self) -> Box<dyn CodeAnalyzer> {
        match self {
            CodeValidationRule::NoEmptyLines => Box::new(analyze_empty_lines),
            CodeValidationRule::NoDuplicatedLines => Box::new(analyze_duplicate_lines),
            CodeValidationRule::NoTooLongLines => Box::new(analyze_too_long_lines),
            CodeValidationRule::NoCommentOnlyLines => Box::new(analyze_comment_only_code),
        }
    }
}

/// One analyzer per rule. Rejects an empty or repeating rule list.
pub fn create_validation_analyzers(
    rules: &[CodeValidationRule],
) -> Result<Vec<Box<dyn CodeAnalyzer>>, ValidationError> {
    if rules.is_empty() {
        return Err(ValidationError::MissingRules);
    }
    let mut counted: Vec<(CodeValidationRule, usize)> = Vec::new();
    for rule in rules {
        match counted.iter_mut().find(|(seen, _)| seen == rule) {
            Some((_, count)) => *count += 1,
            None => counted.push((*rule, 1)),
        }
    }
    let duplicates: Vec<String> = counted
        .iter()
        .filter(|(_, count)| *count > 1)
        .map(|(rule, count)| format!("{} ({} times)", rule, count))
        .collect();
    if !duplicates.is_empty() {
        return Err(ValidationError::DuplicateRules(duplicates.join(", ")));
    }
    Ok(rules.iter().map(|rule| rule.analyzer()).collect())
}

/// Validate `code` with the built-in analyzers for `rules`.
pub fn validate_code(
    code: &str,
    language: ScriptLanguage,
    rules: &[CodeValidationRule],
) -> Result<(), ValidationError> {
    validate_code_with(
        code,
        language,
        &language.syntax(),
        rules,
        create_validation_analyzers,
    )
}

/// Validate with a custom syntax and analyzer factory. Empty code is valid.
pub fn validate_code_with<F>(
    code: &str,
    language: ScriptLanguage,
    syntax: &LanguageSyntax,
    rules: &[CodeValidationRule],
    create_analyzers: F,
) -> Result<(), ValidationError>
where
    F: FnOnce(&[CodeValidationRule]) -> Result<Vec<Box<dyn CodeAnalyzer>>, ValidationError>,
{
    if code.is_empty() {
        return Ok(());
    }
    let analyzers = create_analyzers(rules)?;
    let lines: Vec<CodeLine> = split_lines(code)
        .into_iter()
        .enumerate()
        .map(|(index, text)| CodeLine {
            line_number: index + 1,
            text: text.to_string(),
        })
        .collect();
    let context = AnalysisContext { language, syntax };
    let invalid: Vec<InvalidCodeLine> = analyzers
        .iter()
        .flat_map(|analyzer| analyzer.analyze(&lines, &context))
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    Err(ValidationError::InvalidCode(format_report(&lines, &invalid)))
}

/// Every line marked ✅ or ❌, each error on its own indented line.
fn format_report(lines: &[CodeLine], invalid: &[InvalidCodeLine]) -> String {
    let mut report = vec!["Errors with the code.".to_string()];
    for line in lines {
        let errors: Vec<&InvalidCodeLine> = invalid
            .iter()
            .filter(|i| i.line_number == line.line_number)
            .collect();
        let mark = if errors.is_empty() { "✅" } else { "❌" };
        report.push(format!("[{}] {} {}", line.line_number, mark, line.text));
        report.extend(errors.iter().map(|e| format!("\t⟶ {}", e.error)));
    }
    report.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_empty_code_is_valid() {
        assert_eq!(
            validate_code("", ScriptLanguage::Batchfile, &[CodeValidationRule::NoEmptyLines]),
            Ok(())
        );
    }

    #[test]
    fn test_valid_code_passes() {
        let result = validate_code(
            "echo a\necho b",
            ScriptLanguage::Shellscript,
            &[
                CodeValidationRule::NoEmptyLines,
                CodeValidationRule::NoDuplicatedLines,
            ],
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_report_lists_every_line() {
        let err = validate_code(
            "echo a\n\necho a",
            ScriptLanguage::Shellscript,
            &[
                CodeValidationRule::NoEmptyLines,
                CodeValidationRule::NoDuplicatedLines,
            ],
        )
        .unwrap_err();
        let expected = [
            "Errors with the code.",
            "[1] ❌ echo a",
            "\t⟶ Line is duplicated at line numbers 1,3.",
            "[2] ❌ ",
            "\t⟶ Empty line",
            "[3] ❌ echo a",
            "\t⟶ Line is duplicated at line numbers 1,3.",
        ]
        .join("\n");
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_rule_factory_errors() {
        assert_eq!(
            create_validation_analyzers(&[]).err(),
            Some(ValidationError::MissingRules)
        );
        let err = create_validation_analyzers(&[
            CodeValidationRule::NoEmptyLines,
            CodeValidationRule::NoTooLongLines,
            CodeValidationRule::NoEmptyLines,
            CodeValidationRule::NoTooLongLines,
            CodeValidationRule::NoTooLongLines,
        ])
        .err()
        .unwrap();
        assert_eq!(
            err.to_string(),
            "Duplicate rules are not allowed. Duplicates found: NoEmptyLines (2 times), NoTooLongLines (3 times)"
        );
    }

    struct Recorder(Rc<RefCell<Vec<CodeLine>>>);

    impl CodeAnalyzer for Recorder {
        fn analyze(&self, lines: &[CodeLine], _: &AnalysisContext<'_>) -> Vec<InvalidCodeLine> {
            self.0.borrow_mut().extend_from_slice(lines);
            Vec::new()
        }
    }

    #[test]
    fn test_analyzers_receive_numbered_lines() {
        let received: Rc<RefCell<Vec<CodeLine>>> = Rc::default();
        let sink = Rc::clone(&received);
        let factory = move |_: &[CodeValidationRule]| {
            Ok(vec![Box::new(Recorder(sink)) as Box<dyn CodeAnalyzer>])
        };
        let language = ScriptLanguage::Batchfile;
        validate_code_with(
            "a\r\nb\rc\nd",
            language,
            &language.syntax(),
            &[CodeValidationRule::NoEmptyLines],
            factory,
        )
        .unwrap();
        let numbers: Vec<_> = received
            .borrow()
            .iter()
            .map(|l| (l.line_number, l.text.clone()))
            .collect();
        assert_eq!(
            numbers,
            vec![
                (1, "a".to_string()),
                (2, "b".to_string()),
                (3, "c".to_string()),
                (4, "d".to_string()),
            ]
        );
    }
}
