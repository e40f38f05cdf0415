//! Collections: YAML data model, loading and compilation

pub mod collection;
pub mod data;
pub mod loader;

pub use collection::{Script, ScriptCollection, ScriptMetadata};
pub use data::{
    CategoryData, CollectionData, ExecutableData, FunctionData, ParameterDefinitionData,
    ScriptData, ScriptingData,
};
pub use loader::{CollectionLoader, COLLECTIONS_DIR_ENV};
