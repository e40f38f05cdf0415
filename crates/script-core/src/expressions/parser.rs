//! Nom-based parser for `{{ ... }}` expressions
//!
//! Recognized statements:
//! - `{{ $name }}` / `{{ $name | pipe | pipe }}` parameter substitution
//! - `{{ with $name }}` ... `{{ end }}` optional blocks
//! - `{{ . }}` / `{{ . | pipe }}` the value of the enclosing `with`
//!
//! Other `{{ ... }}` text is left alone as script code, unless it starts like a
//! statement (`$`, `.`, `with`, `end`) and fails to parse.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, recognize, rest, value},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::ExpressionError;
use crate::expressions::expression::{ContextVariable, Evaluator, Expression};
use crate::expressions::position::ExpressionPosition;
use crate::functions::{FunctionParameter, ParameterCollection};

/// Finds expressions in template text.
pub trait ExpressionParser: Send + Sync {
    fn find_expressions(&self, code: &str) -> Result<Vec<Expression>, ExpressionError>;
}

// =============================================================================
// STATEMENT GRAMMAR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Statement<'a> {
    Substitution {
        name: &'a str,
        pipeline: Option<&'a str>,
    },
    WithStart {
        name: &'a str,
    },
    End,
    ContextVariable {
        pipeline: Option<&'a str>,
    },
}

/// A statement with its span in the template.
#[derive(Debug, Clone)]
struct Located<'a> {
    start: usize,
    end: usize,
    statement: Statement<'a>,
}

fn parameter_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '|' && c != '}' && !c.is_whitespace())(input)
}

/// `| a | b`, including the leading pipe.
fn pipeline(input: &str) -> IResult<&str, &str> {
    map(recognize(preceded(char('|'), rest)), str::trim_end)(input)
}

fn substitution(input: &str) -> IResult<&str, Statement<'_>> {
    map(
        pair(
            preceded(char('$'), parameter_name),
            preceded(multispace0, opt(pipeline)),
        ),
        |(name, pipeline)| Statement::Substitution { name, pipeline },
    )(input)
}

fn with_start(input: &str) -> IResult<&str, Statement<'_>> {
    map(
        preceded(pair(tag("with"), multispace1), preceded(char('$'), parameter_name)),
        |name| Statement::WithStart { name },
    )(input)
}

fn end(input: &str) -> IResult<&str, Statement<'_>> {
    value(Statement::End, tag("end"))(input)
}

fn context_variable(input: &str) -> IResult<&str, Statement<'_>> {
    map(
        preceded(char('.'), preceded(multispace0, opt(pipeline))),
        |pipeline| Statement::ContextVariable { pipeline },
    )(input)
}

fn statement(body: &str) -> IResult<&str, Statement<'_>> {
    all_consuming(delimited(
        multispace0,
        alt((with_start, end, context_variable, substitution)),
        multispace0,
    ))(body)
}

fn until_open(input: &str) -> IResult<&str, &str> {
    take_until("{{")(input)
}

fn braced(input: &str) -> IResult<&str, &str> {
    delimited(tag("{{"), take_until("}}"), tag("}}"))(input)
}

fn looks_like_statement(text: &str) -> bool {
    let keyword = |word: &str| {
        text.strip_prefix(word)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    };
    text.starts_with('$') || text.starts_with('.') || keyword("with") || keyword("end")
}

fn classify(body: &str, position: usize) -> Result<Option<Statement<'_>>, ExpressionError> {
    match statement(body) {
        Ok((_, statement)) => Ok(Some(statement)),
        Err(_) if looks_like_statement(body.trim()) => Err(ExpressionError::Malformed {
            position,
            text: body.trim().to_string(),
        }),
        Err(_) => Ok(None),
    }
}

// =============================================================================
// SCANNER
// =============================================================================

/// All statements in order. A `with` start also covers the whitespace after it
/// and an `end` the whitespace before it, never reaching into a previous statement.
fn scan(code: &str) -> Result<Vec<Located<'_>>, ExpressionError> {
    let mut located = Vec::new();
    let mut remaining = code;
    let mut last_end = 0;

    while let Ok((from_open, _)) = until_open(remaining) {
        let start = code.len() - from_open.len();
        let Ok((after, body)) = braced(from_open) else {
            if looks_like_statement(from_open[2..].trim_start()) {
                return Err(ExpressionError::Unclosed(start));
            }
            break;
        };
        if body.contains("{{") {
            remaining = &from_open[2..];
            continue;
        }
        remaining = after;
        let end = code.len() - after.len();
        let Some(statement) = classify(body, start)? else {
            continue;
        };
        let (start, end) = match statement {
            Statement::WithStart { .. } => (start, end + (after.len() - after.trim_start().len())),
            Statement::End => {
                let before = &code[last_end..start];
                (start - (before.len() - before.trim_end().len()), end)
            }
            _ => (start, end),
        };
        last_end = end;
        located.push(Located {
            start,
            end,
            statement,
        });
    }
    Ok(located)
}

fn single_parameter(name: &str, is_optional: bool) -> Result<ParameterCollection, ExpressionError> {
    let mut parameters = ParameterCollection::new();
    parameters.add(FunctionParameter::new(name, is_optional)?)?;
    Ok(parameters)
}

// =============================================================================
// PARSERS
// =============================================================================

/// `{{ $name | pipeline }}` substitutions; the parameter is required.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParameterSubstitutionParser;

impl ExpressionParser for ParameterSubstitutionParser {
    fn find_expressions(&self, code: &str) -> Result<Vec<Expression>, ExpressionError> {
        let mut expressions = Vec::new();
        for located in scan(code)? {
            if let Statement::Substitution { name, pipeline } = located.statement {
                expressions.push(Expression::new(
                    ExpressionPosition::new(located.start, located.end)?,
                    Evaluator::Substitution {
                        parameter: name.to_string(),
                        pipeline: pipeline.map(str::to_string),
                    },
                    single_parameter(name, false)?,
                ));
            }
        }
        Ok(expressions)
    }
}

struct OpenBlock<'a> {
    name: &'a str,
    start: usize,
    scope_start: usize,
    variables: Vec<ContextVariable>,
}

/// `{{ with $name }}` blocks; the parameter is optional and the block renders
/// nothing when it has no value.
#[derive(Debug, Default, Clone, Copy)]
pub struct WithParser;

impl ExpressionParser for WithParser {
    fn find_expressions(&self, code: &str) -> Result<Vec<Expression>, ExpressionError> {
        let mut expressions = Vec::new();
        let mut open: Vec<OpenBlock<'_>> = Vec::new();

        for located in scan(code)? {
            match located.statement {
                Statement::WithStart { name } => open.push(OpenBlock {
                    name,
                    start: located.start,
                    scope_start: located.end,
                    variables: Vec::new(),
                }),
                Statement::ContextVariable { pipeline } => {
                    let block = open.last_mut().ok_or(ExpressionError::ContextVariableOutsideWith {
                        position: located.start,
                    })?;
                    block.variables.push(ContextVariable {
                        offset: located.start - block.scope_start,
                        len: located.end - located.start,
                        pipeline: pipeline.map(str::to_string),
                    });
                }
                Statement::End => {
                    let block = open.pop().ok_or(ExpressionError::RedundantEnd {
                        position: located.start,
                    })?;
                    expressions.push(Expression::new(
                        ExpressionPosition::new(block.start, located.end)?,
                        Evaluator::WithBlock {
                            parameter: block.name.to_string(),
                            scope: code[block.scope_start..located.start].to_string(),
                            variables: block.variables,
                        },
                        single_parameter(block.name, true)?,
                    ));
                }
                Statement::Substitution { .. } => {}
            }
        }

        if let Some(block) = open.last() {
            return Err(ExpressionError::MissingEnd {
                position: block.start,
            });
        }
        expressions.sort_by_key(|e| e.position().start());
        Ok(expressions)
    }
}

/// Runs every parser and merges their findings.
pub struct CompositeExpressionParser {
    parsers: Vec<Box<dyn ExpressionParser>>,
}

impl CompositeExpressionParser {
    pub fn new(parsers: Vec<Box<dyn ExpressionParser>>) -> Self {
        Self { parsers }
    }
}

impl Default for CompositeExpressionParser {
    fn default() -> Self {
        Self::new(vec![Box::new(ParameterSubstitutionParser), Box::new(WithParser)])
    }
}

impl ExpressionParser for CompositeExpressionParser {
    fn find_expressions(&self, code: &str) -> Result<Vec<Expression>, ExpressionError> {
        let mut expressions = Vec::new();
        for parser in &self.parsers {
            expressions.extend(parser.find_expressions(code)?);
        }
        Ok(expressions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(expressions: &[Expression]) -> Vec<(usize, usize)> {
        expressions
            .iter()
            .map(|e| (e.position().start(), e.position().end()))
            .collect()
    }

    #[test]
    fn test_substitution_positions() {
        let code = "a {{ $first }} b {{$second|escapeDoubleQuotes}}";
        let found = ParameterSubstitutionParser.find_expressions(code).unwrap();
        assert_eq!(spans(&found), vec![(2, 14), (17, 47)]);
        assert_eq!(
            found[1].evaluator(),
            &Evaluator::Substitution {
                parameter: "second".into(),
                pipeline: Some("|escapeDoubleQuotes".into()),
            }
        );
    }

    #[test]
    fn test_pipeline_is_trimmed_at_end() {
        let found = ParameterSubstitutionParser
            .find_expressions("{{ $p | a | b   }}")
            .unwrap();
        assert_eq!(
            found[0].evaluator(),
            &Evaluator::Substitution {
                parameter: "p".into(),
                pipeline: Some("| a | b".into()),
            }
        );
    }

    #[test]
    fn test_unrelated_braces_are_code() {
        let found = CompositeExpressionParser::default()
            .find_expressions("echo {{ not ours }} and {{")
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_malformed_substitution_rejected() {
        let err = ParameterSubstitutionParser
            .find_expressions("x {{ $a b }}")
            .unwrap_err();
        assert_eq!(
            err,
            ExpressionError::Malformed {
                position: 2,
                text: "$a b".into()
            }
        );
    }

    #[test]
    fn test_unclosed_statement_rejected() {
        let err = ParameterSubstitutionParser
            .find_expressions("x {{ $a")
            .unwrap_err();
        assert_eq!(err, ExpressionError::Unclosed(2));
    }

    #[test]
    fn test_invalid_parameter_name() {
        let err = ParameterSubstitutionParser
            .find_expressions("{{ $my-name }}")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter name must be alphanumeric but it was \"my-name\""
        );
    }

    #[test]
    fn test_with_block_consumes_inner_whitespace() {
        let code = "start {{ with $x }}\n  value {{ . }}\n{{ end }} done";
        let found = WithParser.find_expressions(code).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(spans(&found), vec![(6, code.len() - 5)]);
        match found[0].evaluator() {
            Evaluator::WithBlock {
                parameter,
                scope,
                variables,
            } => {
                assert_eq!(parameter, "x");
                assert_eq!(scope, "value {{ . }}");
                assert_eq!(variables.len(), 1);
                assert_eq!(variables[0].offset, 6);
                assert_eq!(variables[0].len, 7);
            }
            other => panic!("unexpected evaluator {:?}", other),
        }
        assert!(found[0].parameters().get("x").unwrap().is_optional());
    }

    #[test]
    fn test_with_block_errors() {
        assert_eq!(
            WithParser.find_expressions("{{ . }}").unwrap_err().to_string(),
            "Context variable before `with` statement."
        );
        assert_eq!(
            WithParser.find_expressions("{{ end }}").unwrap_err().to_string(),
            "Redundant `end` statement, missing `with`?"
        );
        assert_eq!(
            WithParser
                .find_expressions("{{ with $a }} x")
                .unwrap_err()
                .to_string(),
            "Missing `end` statement, forgot `{{ end }}`?"
        );
    }

    #[test]
    fn test_nested_with_blocks() {
        let code = "{{ with $a }}{{ with $b }}{{ . }}{{ end }}{{ end }}";
        let found = WithParser.find_expressions(code).unwrap();
        assert_eq!(spans(&found), vec![(0, code.len()), (13, code.len() - 9)]);
    }

    #[test]
    fn test_composite_finds_both_kinds() {
        let code = "{{ with $a }}{{ $b }}{{ end }}";
        let found = CompositeExpressionParser::default()
            .find_expressions(code)
            .unwrap();
        let mut found = spans(&found);
        found.sort();
        assert_eq!(found, vec![(0, code.len()), (13, 21)]);
    }
}
