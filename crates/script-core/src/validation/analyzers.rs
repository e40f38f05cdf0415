//! Line analyzers behind the validation rules

use std::collections::BTreeMap;

use crate::validation::syntax::{LanguageSyntax, ScriptLanguage};

/// One line of code, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub line_number: usize,
    pub text: String,
}

/// A problem found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCodeLine {
    pub line_number: usize,
    pub error: String,
}

impl InvalidCodeLine {
    pub fn new(line_number: usize, error: impl Into<String>) -> Self {
        Self {
            line_number,
            error: error.into(),
        }
    }
}

/// What an analyzer knows about the code besides its lines.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub language: ScriptLanguage,
    pub syntax: &'a LanguageSyntax,
}

/// Inspects all lines at once and reports the invalid ones.
pub trait CodeAnalyzer {
    fn analyze(&self, lines: &[CodeLine], context: &AnalysisContext<'_>) -> Vec<InvalidCodeLine>;
}

impl<F> CodeAnalyzer for F
where
    F: Fn(&[CodeLine], &AnalysisContext<'_>) -> Vec<InvalidCodeLine>,
{
    fn analyze(&self, lines: &[CodeLine], context: &AnalysisContext<'_>) -> Vec<InvalidCodeLine> {
        self(lines, context)
    }
}

pub fn analyze_empty_lines(lines: &[CodeLine], _: &AnalysisContext<'_>) -> Vec<InvalidCodeLine> {
    lines
        .iter()
        .filter(|line| line.text.trim().is_empty())
        .map(|line| {
            let error = if line.text.is_empty() {
                "Empty line".to_string()
            } else {
                format!("Empty line: \"{}\"", describe_whitespace(&line.text))
            };
            InvalidCodeLine::new(line.line_number, error)
        })
        .collect()
}

fn describe_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' ' => "{whitespace}".to_string(),
            '\t' => "{tab}".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Lines that repeat exactly, ignoring comments and lines made only of common code parts.
pub fn analyze_duplicate_lines(
    lines: &[CodeLine],
    context: &AnalysisContext<'_>,
) -> Vec<InvalidCodeLine> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for line in lines {
        if context.syntax.is_comment_line(&line.text)
            || context.syntax.is_common_code_only(&line.text)
        {
            continue;
        }
        groups.entry(&line.text).or_default().push(line.line_number);
    }

    let mut invalid: Vec<InvalidCodeLine> = groups
        .values()
        .filter(|numbers| numbers.len() > 1)
        .flat_map(|numbers| {
            let listed = numbers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            numbers.iter().map(move |&number| {
                InvalidCodeLine::new(
                    number,
                    format!("Line is duplicated at line numbers {}.", listed),
                )
            })
        })
        .collect();
    invalid.sort_by_key(|line| line.line_number);
    invalid
}

pub fn analyze_too_long_lines(
    lines: &[CodeLine],
    context: &AnalysisContext<'_>,
) -> Vec<InvalidCodeLine> {
    let max = context.language.max_line_length();
    lines
        .iter()
        .filter_map(|line| {
            let length = line.text.chars().count();
            (length > max).then(|| {
                InvalidCodeLine::new(
                    line.line_number,
                    format!(
                        "Line is too long ({}). It exceed maximum allowed length {} by {} characters.",
                        length,
                        max,
                        length - max
                    ),
                )
            })
        })
        .collect()
}

/// Flags every line when all of them are comments.
pub fn analyze_comment_only_code(
    lines: &[CodeLine],
    context: &AnalysisContext<'_>,
) -> Vec<InvalidCodeLine> {
    if !lines.iter().all(|line| context.syntax.is_comment_line(&line.text)) {
        return Vec::new();
    }
    lines
        .iter()
        .map(|line| InvalidCodeLine::new(line.line_number, "Code consists of comments only"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(texts: &[&str]) -> Vec<CodeLine> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| CodeLine {
                line_number: index + 1,
                text: text.to_string(),
            })
            .collect()
    }

    fn analyze<F>(analyzer: F, language: ScriptLanguage, texts: &[&str]) -> Vec<InvalidCodeLine>
    where
        F: CodeAnalyzer,
    {
        let syntax = language.syntax();
        let context = AnalysisContext {
            language,
            syntax: &syntax,
        };
        analyzer.analyze(&lines(texts), &context)
    }

    fn duplicated(numbers: &[usize]) -> Vec<InvalidCodeLine> {
        let listed = numbers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        numbers
            .iter()
            .map(|&n| InvalidCodeLine::new(n, format!("Line is duplicated at line numbers {}.", listed)))
            .collect()
    }

    #[test]
    fn test_empty_lines() {
        let found = analyze(
            analyze_empty_lines,
            ScriptLanguage::Batchfile,
            &["a", "", "b", " \t"],
        );
        assert_eq!(
            found,
            vec![
                InvalidCodeLine::new(2, "Empty line"),
                InvalidCodeLine::new(4, "Empty line: \"{whitespace}{tab}\""),
            ]
        );
    }

    #[test]
    fn test_duplicate_lines() {
        let found = analyze(
            analyze_duplicate_lines,
            ScriptLanguage::Batchfile,
            &["echo a", "echo a", "echo b", "echo a"],
        );
        assert_eq!(found, duplicated(&[1, 2, 4]));
    }

    #[test]
    fn test_duplicate_lines_skip_comments_and_common_parts() {
        let found = analyze(
            analyze_duplicate_lines,
            ScriptLanguage::Shellscript,
            &["# same", "# same", "fi", "fi", "done", "done", "x", "x"],
        );
        assert_eq!(found, duplicated(&[7, 8]));
    }

    #[test]
    fn test_duplicate_lines_with_unique_words() {
        let found = analyze(
            analyze_duplicate_lines,
            ScriptLanguage::Batchfile,
            &["( else", "( else", ") unique", ") unique"],
        );
        assert_eq!(found, duplicated(&[3, 4]));
    }

    #[test]
    fn test_too_long_lines() {
        let long = "x".repeat(8193);
        let found = analyze(
            analyze_too_long_lines,
            ScriptLanguage::Batchfile,
            &["short", &long],
        );
        assert_eq!(
            found,
            vec![InvalidCodeLine::new(
                2,
                "Line is too long (8193). It exceed maximum allowed length 8191 by 2 characters."
            )]
        );
        let found = analyze(analyze_too_long_lines, ScriptLanguage::Shellscript, &[&long]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_comment_only_code() {
        let found = analyze(
            analyze_comment_only_code,
            ScriptLanguage::Batchfile,
            &["REM a", ":: b"],
        );
        assert_eq!(
            found,
            vec![
                InvalidCodeLine::new(1, "Code consists of comments only"),
                InvalidCodeLine::new(2, "Code consists of comments only"),
            ]
        );
        let found = analyze(
            analyze_comment_only_code,
            ScriptLanguage::Batchfile,
            &["REM a", "echo b"],
        );
        assert!(found.is_empty());
    }
}
