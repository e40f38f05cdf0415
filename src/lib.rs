//! scriptforge: catalog-driven batch and shell script generator
//!
//! Collections (YAML) declare shared functions and categorized scripts. This
//! crate loads them, compiles every script through `script-core`, and builds
//! one combined script for a selection of scripts while tracking where each
//! script sits in the output.
//!
//! - `catalog`: collection data model, loader and compiled collections
//! - `compiler`: per-script compilation (literal code or function calls)
//! - `application`: code builder, script generator and selection aggregation

pub mod application;
pub mod catalog;
pub mod compiler;
pub mod error;

pub use application::{
    ApplicationCode, CodeBuilder, CodeChangedEvent, CodePosition, SelectedScript, UserScript,
    UserScriptGenerator,
};
pub use catalog::{
    CategoryData, CollectionData, CollectionLoader, ExecutableData, Script, ScriptCollection,
    ScriptData, ScriptMetadata, ScriptingData,
};
pub use compiler::ScriptCompiler;
pub use error::ScriptError;

pub use script_core::{ScriptCode, ScriptLanguage};
