//! Expressions compiler
//!
//! Replaces every top-level expression in a template with its evaluated text,
//! then compiles the result again so nested and produced expressions resolve.

use tracing::trace;

use crate::error::ExpressionError;
use crate::expressions::expression::Expression;
use crate::expressions::parser::{CompositeExpressionParser, ExpressionParser};
use crate::expressions::pipes::PipelineCompiler;
use crate::expressions::position::ExpressionPosition;
use crate::functions::FunctionCallArgumentCollection;

/// Upper bound on recompilation passes over one template.
pub const MAX_COMPILE_PASSES: usize = 64;

pub struct ExpressionsCompiler {
    parser: Box<dyn ExpressionParser>,
    pipelines: PipelineCompiler,
}

impl Default for ExpressionsCompiler {
    fn default() -> Self {
        Self::new(
            Box::new(CompositeExpressionParser::default()),
            PipelineCompiler::default(),
        )
    }
}

impl std::fmt::Debug for ExpressionsCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionsCompiler")
            .field("pipelines", &self.pipelines)
            .finish_non_exhaustive()
    }
}

impl ExpressionsCompiler {
    pub fn new(parser: Box<dyn ExpressionParser>, pipelines: PipelineCompiler) -> Self {
        Self { parser, pipelines }
    }

    /// Compile `code` against `args`. Code without expressions comes back unchanged.
    pub fn compile_expressions(
        &self,
        code: &str,
        args: &FunctionCallArgumentCollection,
    ) -> Result<String, ExpressionError> {
        let mut current = code.to_string();
        for pass in 0..MAX_COMPILE_PASSES {
            if current.is_empty() {
                return Ok(current);
            }
            let expressions = self.parser.find_expressions(&current)?;
            if expressions.is_empty() {
                return Ok(current);
            }
            trace!(pass, expressions = expressions.len(), "compiling expressions");
            current = self.compile_pass(&current, &expressions, args)?;
        }
        Err(ExpressionError::TooManyPasses(MAX_COMPILE_PASSES))
    }

    fn compile_pass(
        &self,
        code: &str,
        expressions: &[Expression],
        args: &FunctionCallArgumentCollection,
    ) -> Result<String, ExpressionError> {
        ensure_valid_positions(expressions, code.len())?;
        let mut all: Vec<&Expression> = expressions.iter().collect();
        all.sort_by_key(|e| e.position().start());
        ensure_parameters_provided(&all, args)?;

        let mut outer = top_level(expressions);
        outer.sort_by_key(|e| e.position().start());

        let mut edits = Vec::with_capacity(outer.len());
        for expression in outer.iter().rev() {
            edits.push((
                expression.position(),
                expression.evaluate(args, &self.pipelines)?,
            ));
        }
        Ok(apply_edits(code, edits))
    }
}

/// Expressions not nested inside any other expression.
fn top_level(expressions: &[Expression]) -> Vec<&Expression> {
    expressions
        .iter()
        .filter(|e| {
            !expressions
                .iter()
                .any(|other| e.position().is_inside(&other.position()))
        })
        .collect()
}

fn describe(positions: &[ExpressionPosition]) -> String {
    positions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn ensure_valid_positions(
    expressions: &[Expression],
    code_length: usize,
) -> Result<(), ExpressionError> {
    let out_of_range: Vec<_> = expressions
        .iter()
        .map(Expression::position)
        .filter(|p| p.end() > code_length)
        .collect();
    if !out_of_range.is_empty() {
        return Err(ExpressionError::OutOfRange(format!(
            "{} (code length: {})",
            describe(&out_of_range),
            code_length
        )));
    }

    let mut same = Vec::new();
    let mut intersecting = Vec::new();
    for (index, first) in expressions.iter().enumerate() {
        for second in &expressions[index + 1..] {
            let (a, b) = (first.position(), second.position());
            if a.is_same(&b) {
                same.push(a);
            } else if a.is_intersecting(&b) && !a.is_inside(&b) && !b.is_inside(&a) {
                intersecting.extend([a, b]);
            }
        }
    }
    if !same.is_empty() {
        return Err(ExpressionError::SamePosition(describe(&same)));
    }
    if !intersecting.is_empty() {
        return Err(ExpressionError::Intersecting(describe(&intersecting)));
    }
    Ok(())
}

/// Every required parameter used anywhere in the code, `with` bodies
/// included, must have an argument.
fn ensure_parameters_provided(
    expressions: &[&Expression],
    args: &FunctionCallArgumentCollection,
) -> Result<(), ExpressionError> {
    let mut missing: Vec<String> = Vec::new();
    for parameter in expressions.iter().flat_map(|e| e.parameters().required()) {
        if !args.has(parameter.name()) && !missing.iter().any(|m| m == parameter.name()) {
            missing.push(parameter.name().to_string());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ExpressionError::ParametersNotProvided(missing))
    }
}

/// Apply non-overlapping replacements given in descending start order.
fn apply_edits(code: &str, edits: Vec<(ExpressionPosition, String)>) -> String {
    let mut compiled = code.to_string();
    for (position, replacement) in edits {
        compiled.replace_range(position.start()..position.end(), &replacement);
    }
    compiled
}
