//! Pipes and the pipeline compiler
//!
//! A pipeline is text such as `| inlinePowerShell | escapeDoubleQuotes` that
//! transforms a value left to right. A pipe may take an argument written as
//! `name: argument`; the built-in pipes accept none.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ExpressionError;
use crate::text::{has_line_breaks, split_lines};

/// A named text transformation.
pub trait Pipe: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, input: &str, argument: Option<&str>) -> Result<String, ExpressionError>;
}

// =============================================================================
// REGISTRY
// =============================================================================

static PIPE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").unwrap());

/// Pipes by unique name.
pub struct PipeRegistry {
    pipes: HashMap<String, Box<dyn Pipe>>,
}

impl PipeRegistry {
    pub fn new(pipes: Vec<Box<dyn Pipe>>) -> Result<Self, ExpressionError> {
        if pipes.is_empty() {
            return Err(ExpressionError::MissingPipes);
        }
        let mut registry = HashMap::new();
        for pipe in pipes {
            let name = pipe.name().to_string();
            if !PIPE_NAME_RE.is_match(&name) {
                return Err(ExpressionError::InvalidPipeName(name));
            }
            if registry.contains_key(&name) {
                return Err(ExpressionError::DuplicatePipe(name));
            }
            registry.insert(name, pipe);
        }
        Ok(Self { pipes: registry })
    }

    /// Registry holding `inlinePowerShell` and `escapeDoubleQuotes`.
    pub fn builtin() -> Self {
        let builtins: [Box<dyn Pipe>; 2] = [Box::new(InlinePowerShell), Box::new(EscapeDoubleQuotes)];
        Self {
            pipes: builtins
                .into_iter()
                .map(|pipe| (pipe.name().to_string(), pipe))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn Pipe, ExpressionError> {
        self.pipes
            .get(name)
            .map(|pipe| pipe.as_ref())
            .ok_or_else(|| ExpressionError::UnknownPipe(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pipes.keys().map(String::as_str)
    }
}

impl Default for PipeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for PipeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("PipeRegistry").field("pipes", &names).finish()
    }
}

// =============================================================================
// PIPELINE COMPILER
// =============================================================================

/// Applies a `| a | b` pipeline to a value.
#[derive(Debug, Default)]
pub struct PipelineCompiler {
    registry: PipeRegistry,
}

impl PipelineCompiler {
    pub fn new(registry: PipeRegistry) -> Self {
        Self { registry }
    }

    pub fn compile(&self, value: &str, pipeline: &str) -> Result<String, ExpressionError> {
        if value.is_empty() {
            return Err(ExpressionError::MissingPipelineValue);
        }
        if pipeline.is_empty() {
            return Err(ExpressionError::MissingPipeline);
        }
        let Some(body) = pipeline.strip_prefix('|') else {
            return Err(ExpressionError::PipelineWithoutPipe);
        };
        let mut current = value.to_string();
        for segment in body.split('|') {
            let (name, argument) = match segment.split_once(':') {
                Some((name, argument)) => (name.trim(), Some(argument.trim())),
                None => (segment.trim(), None),
            };
            let pipe = self.registry.get(name)?;
            current = pipe.apply(&current, argument)?;
        }
        Ok(current)
    }
}

fn reject_argument(pipe: &dyn Pipe, argument: Option<&str>) -> Result<(), ExpressionError> {
    match argument {
        Some(_) => Err(ExpressionError::UnexpectedPipeArgument(pipe.name().to_string())),
        None => Ok(()),
    }
}

// =============================================================================
// BUILT-IN PIPES
// =============================================================================

/// Escapes `"` for use inside a batch-quoted string.
pub struct EscapeDoubleQuotes;

impl Pipe for EscapeDoubleQuotes {
    fn name(&self) -> &str {
        "escapeDoubleQuotes"
    }

    fn apply(&self, input: &str, argument: Option<&str>) -> Result<String, ExpressionError> {
        reject_argument(self, argument)?;
        Ok(input.replace('"', "\"^\"\""))
    }
}

static INLINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<#[^\r\n]*?#>|#([^\r\n]*)").unwrap());

static BACKTICK_CONTINUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +`\s*(?:\r\n|\r|\n)\s*").unwrap());

static SINGLE_QUOTED_HERE_STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@'\s*(?:\r\n|\r|\n)((?s:.)+?)(?:\r\n|\r|\n)'@").unwrap()
});

static DOUBLE_QUOTED_HERE_STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@"\s*(?:\r\n|\r|\n)((?s:.)+?)(?:\r\n|\r|\n)"@"#).unwrap()
});

/// Collapses multi-line PowerShell into a single line.
pub struct InlinePowerShell;

impl Pipe for InlinePowerShell {
    fn name(&self) -> &str {
        "inlinePowerShell"
    }

    fn apply(&self, input: &str, argument: Option<&str>) -> Result<String, ExpressionError> {
        reject_argument(self, argument)?;
        if !has_line_breaks(input) {
            return Ok(input.to_string());
        }
        let code = inline_comments(input);
        let code = merge_backtick_continuations(&code);
        let code = merge_here_strings(&code);
        Ok(merge_new_lines(&code))
    }
}

fn inline_comments(code: &str) -> String {
    INLINE_COMMENT_RE
        .replace_all(code, |caps: &Captures| match caps.get(1) {
            None => caps[0].to_string(),
            Some(comment) => {
                let comment = comment.as_str().trim();
                if comment.is_empty() {
                    "<##>".to_string()
                } else {
                    format!("<# {} #>", comment)
                }
            }
        })
        .into_owned()
}

fn merge_backtick_continuations(code: &str) -> String {
    BACKTICK_CONTINUATION_RE.replace_all(code, " ").into_owned()
}

struct HereStringQuoting {
    quote: &'static str,
    escaped_quote: &'static str,
    separator: &'static str,
}

const SINGLE_QUOTED: HereStringQuoting = HereStringQuoting {
    quote: "'",
    escaped_quote: "''",
    separator: "'+\"`r`n\"+'",
};

const DOUBLE_QUOTED: HereStringQuoting = HereStringQuoting {
    quote: "\"",
    escaped_quote: "`\"",
    separator: "`r`n",
};

fn merge_here_strings(code: &str) -> String {
    let code = replace_here_strings(&SINGLE_QUOTED_HERE_STRING_RE, code, &SINGLE_QUOTED);
    replace_here_strings(&DOUBLE_QUOTED_HERE_STRING_RE, &code, &DOUBLE_QUOTED)
}

fn replace_here_strings(re: &Regex, code: &str, quoting: &HereStringQuoting) -> String {
    re.replace_all(code, |caps: &Captures| {
        let escaped = caps[1].replace(quoting.quote, quoting.escaped_quote);
        let joined = split_lines(&escaped).join(quoting.separator);
        format!("{}{}{}", quoting.quote, joined, quoting.quote)
    })
    .into_owned()
}

fn merge_new_lines(code: &str) -> String {
    split_lines(code)
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
