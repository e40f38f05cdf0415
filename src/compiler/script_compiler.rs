//! Compiles catalog scripts into [`ScriptCode`]
//!
//! A script carries either literal `code`/`revertCode`, used as written, or
//! a `call` declaration resolved against the collection's shared functions.

use tracing::debug;

use script_core::{
    parse_function_calls, parse_shared_functions, validate_code, CodeValidationRule,
    ExpressionsCompiler, ScriptCode, ScriptLanguage, SharedFunctionCollection,
    SharedFunctionResolver,
};

use crate::catalog::data::ScriptData;
use crate::catalog::FunctionData;
use crate::error::ScriptError;

const LITERAL_CODE_RULES: &[CodeValidationRule] = &[
    CodeValidationRule::NoEmptyLines,
    CodeValidationRule::NoDuplicatedLines,
];

const RESOLVED_CODE_RULES: &[CodeValidationRule] = &[CodeValidationRule::NoEmptyLines];

#[derive(Debug)]
pub struct ScriptCompiler {
    language: ScriptLanguage,
    functions: SharedFunctionCollection,
    expressions: ExpressionsCompiler,
}

impl ScriptCompiler {
    pub fn new(functions: &[FunctionData], language: ScriptLanguage) -> Result<Self, ScriptError> {
        let functions = parse_shared_functions(functions, language)?;
        Ok(Self {
            language,
            functions,
            expressions: ExpressionsCompiler::default(),
        })
    }

    pub fn language(&self) -> ScriptLanguage {
        self.language
    }

    pub fn functions(&self) -> &SharedFunctionCollection {
        &self.functions
    }

    pub fn compile(&self, script: &ScriptData) -> Result<ScriptCode, ScriptError> {
        debug!(script = %script.name, "compiling script");
        self.compile_script(script)
            .map_err(|e| e.in_script(&script.name))
    }

    fn compile_script(&self, script: &ScriptData) -> Result<ScriptCode, ScriptError> {
        match (&script.code, &script.call) {
            (Some(_), Some(_)) => Err(ScriptError::BothCodeAndCall(script.name.clone())),
            (Some(code), None) => self.compile_literal(code, script.revert_code.as_deref()),
            (None, Some(call)) => self.compile_calls(call),
            (None, None) if script.revert_code.is_some() => {
                Err(ScriptError::RevertWithoutCode(script.name.clone()))
            }
            (None, None) => Err(ScriptError::NoCode(script.name.clone())),
        }
    }

    fn compile_literal(&self, code: &str, revert: Option<&str>) -> Result<ScriptCode, ScriptError> {
        for text in std::iter::once(code).chain(revert) {
            validate_code(text, self.language, LITERAL_CODE_RULES)?;
        }
        Ok(ScriptCode::new(code, revert)?)
    }

    fn compile_calls(&self, call: &serde_yaml::Value) -> Result<ScriptCode, ScriptError> {
        let calls = parse_function_calls(call)?;
        let resolver = SharedFunctionResolver::new(&self.functions, &self.expressions);
        let code = resolver.resolve(&calls)?;
        for text in std::iter::once(code.execute()).chain(code.revert()) {
            validate_code(text, self.language, RESOLVED_CODE_RULES)?;
        }
        Ok(code)
    }
}
