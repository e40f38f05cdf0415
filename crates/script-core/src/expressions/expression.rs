//! Parsed expressions and their evaluation

use crate::error::ExpressionError;
use crate::expressions::pipes::PipelineCompiler;
use crate::expressions::position::ExpressionPosition;
use crate::functions::{FunctionCallArgumentCollection, ParameterCollection};

/// A `{{ . }}` occurrence inside a `with` block, offset relative to the block scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextVariable {
    pub offset: usize,
    pub len: usize,
    pub pipeline: Option<String>,
}

/// How an expression turns arguments into replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluator {
    /// `{{ $name | pipes }}`
    Substitution {
        parameter: String,
        pipeline: Option<String>,
    },
    /// `{{ with $name }} scope {{ end }}`
    WithBlock {
        parameter: String,
        scope: String,
        variables: Vec<ContextVariable>,
    },
}

/// A located expression with the parameters it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    position: ExpressionPosition,
    parameters: ParameterCollection,
    evaluator: Evaluator,
}

impl Expression {
    pub fn new(
        position: ExpressionPosition,
        evaluator: Evaluator,
        parameters: ParameterCollection,
    ) -> Self {
        Self {
            position,
            parameters,
            evaluator,
        }
    }

    pub fn position(&self) -> ExpressionPosition {
        self.position
    }

    pub fn parameters(&self) -> &ParameterCollection {
        &self.parameters
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Fails when a required parameter has no argument. The evaluator only sees
    /// arguments for parameters this expression declares.
    pub fn evaluate(
        &self,
        args: &FunctionCallArgumentCollection,
        pipelines: &PipelineCompiler,
    ) -> Result<String, ExpressionError> {
        let missing: Vec<String> = self
            .parameters
            .required()
            .filter(|p| !args.has(p.name()))
            .map(|p| p.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ExpressionError::MissingRequiredArguments(missing));
        }
        let scoped = args.restricted_to(&self.parameters);
        self.evaluator.evaluate(&scoped, pipelines)
    }
}

impl Evaluator {
    fn evaluate(
        &self,
        args: &FunctionCallArgumentCollection,
        pipelines: &PipelineCompiler,
    ) -> Result<String, ExpressionError> {
        match self {
            Evaluator::Substitution {
                parameter,
                pipeline,
            } => {
                let value = args.get(parameter)?.value();
                apply_pipeline(value, pipeline.as_deref(), pipelines)
            }
            Evaluator::WithBlock {
                parameter,
                scope,
                variables,
            } => match args.value(parameter) {
                Some(value) if !value.is_empty() => {
                    render_scope(scope, variables, value, pipelines)
                }
                _ => Ok(String::new()),
            },
        }
    }
}

fn apply_pipeline(
    value: &str,
    pipeline: Option<&str>,
    pipelines: &PipelineCompiler,
) -> Result<String, ExpressionError> {
    match pipeline {
        Some(pipeline) => pipelines.compile(value, pipeline),
        None => Ok(value.to_string()),
    }
}

fn render_scope(
    scope: &str,
    variables: &[ContextVariable],
    value: &str,
    pipelines: &PipelineCompiler,
) -> Result<String, ExpressionError> {
    let mut rendered = scope.to_string();
    let mut ordered: Vec<&ContextVariable> = variables.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));
    for variable in ordered {
        let replacement = apply_pipeline(value, variable.pipeline.as_deref(), pipelines)?;
        rendered.replace_range(variable.offset..variable.offset + variable.len, &replacement);
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionParameter;

    fn params(name: &str, optional: bool) -> ParameterCollection {
        ParameterCollection::try_from(vec![FunctionParameter::new(name, optional).unwrap()])
            .unwrap()
    }

    #[test]
    fn test_missing_required_argument() {
        let expression = Expression::new(
            ExpressionPosition::new(0, 5).unwrap(),
            Evaluator::Substitution {
                parameter: "name".into(),
                pipeline: None,
            },
            params("name", false),
        );
        let err = expression
            .evaluate(
                &FunctionCallArgumentCollection::new(),
                &PipelineCompiler::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ExpressionError::MissingRequiredArguments(vec!["name".into()])
        );
    }

    #[test]
    fn test_substitution_with_pipe() {
        let expression = Expression::new(
            ExpressionPosition::new(0, 5).unwrap(),
            Evaluator::Substitution {
                parameter: "v".into(),
                pipeline: Some("| escapeDoubleQuotes".into()),
            },
            params("v", false),
        );
        let args = FunctionCallArgumentCollection::from_pairs([("v", "say \"hi\"")]).unwrap();
        let result = expression
            .evaluate(&args, &PipelineCompiler::default())
            .unwrap();
        assert_eq!(result, "say \"^\"\"hi\"^\"\"");
    }

    #[test]
    fn test_with_block_renders_empty_without_value() {
        let expression = Expression::new(
            ExpressionPosition::new(0, 30).unwrap(),
            Evaluator::WithBlock {
                parameter: "x".into(),
                scope: "value: {{ . }}".into(),
                variables: vec![ContextVariable {
                    offset: 7,
                    len: 7,
                    pipeline: None,
                }],
            },
            params("x", true),
        );
        let pipelines = PipelineCompiler::default();
        let empty = expression
            .evaluate(&FunctionCallArgumentCollection::new(), &pipelines)
            .unwrap();
        assert_eq!(empty, "");
        let args = FunctionCallArgumentCollection::from_pairs([("x", "7")]).unwrap();
        assert_eq!(expression.evaluate(&args, &pipelines).unwrap(), "value: 7");
    }
}
