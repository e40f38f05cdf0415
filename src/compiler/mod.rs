//! Script compilation

pub mod script_compiler;

pub use script_compiler::ScriptCompiler;
