//! Compiled collections
//!
//! A [`ScriptCollection`] is the result of compiling every script of a
//! [`CollectionData`] against its shared functions. Scripts are flattened out
//! of their category tree, keeping the name of the category they were found in.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use script_core::{ScriptCode, ScriptLanguage};

use super::data::{CategoryData, CollectionData, ExecutableData};
use crate::compiler::ScriptCompiler;
use crate::error::ScriptError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    pub id: String,
    pub name: String,
    pub category: String,
    pub code: ScriptCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommend: Option<String>,
}

impl Script {
    pub fn can_revert(&self) -> bool {
        self.code.revert().is_some()
    }
}

/// Collection-wide scripting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptMetadata {
    pub language: ScriptLanguage,
    pub start_code: String,
    pub end_code: String,
}

#[derive(Debug, Clone)]
pub struct ScriptCollection {
    os: String,
    metadata: ScriptMetadata,
    scripts: Vec<Arc<Script>>,
}

impl ScriptCollection {
    pub fn from_data(data: &CollectionData) -> Result<Self, ScriptError> {
        let language = data.scripting.language;
        let compiler = ScriptCompiler::new(&data.functions, language)?;

        let mut scripts = Vec::new();
        for category in &data.actions {
            collect_category(category, &compiler, &mut scripts)?;
        }

        let mut seen: Vec<&str> = Vec::with_capacity(scripts.len());
        for script in &scripts {
            if seen.contains(&script.id.as_str()) {
                return Err(ScriptError::DuplicateScript(script.id.clone()));
            }
            seen.push(&script.id);
        }

        info!(
            os = %data.os,
            language = %language,
            scripts = scripts.len(),
            "compiled collection"
        );

        Ok(Self {
            os: data.os.clone(),
            metadata: ScriptMetadata {
                language,
                start_code: data.scripting.start_code.clone().unwrap_or_default(),
                end_code: data.scripting.end_code.clone().unwrap_or_default(),
            },
            scripts: scripts.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn metadata(&self) -> &ScriptMetadata {
        &self.metadata
    }

    pub fn language(&self) -> ScriptLanguage {
        self.metadata.language
    }

    pub fn scripts(&self) -> &[Arc<Script>] {
        &self.scripts
    }

    pub fn script(&self, id: &str) -> Result<Arc<Script>, ScriptError> {
        self.scripts
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ScriptError::UnknownScript(id.to_string()))
    }

    /// Scripts carrying the given recommendation level, in collection order.
    pub fn recommended(&self, level: &str) -> Vec<Arc<Script>> {
        self.scripts
            .iter()
            .filter(|s| s.recommend.as_deref() == Some(level))
            .cloned()
            .collect()
    }
}

fn collect_category(
    category: &CategoryData,
    compiler: &ScriptCompiler,
    scripts: &mut Vec<Script>,
) -> Result<(), ScriptError> {
    if category.children.is_empty() {
        return Err(ScriptError::EmptyCategory(category.category.clone()));
    }
    debug!(category = %category.category, children = category.children.len(), "collecting category");

    for child in &category.children {
        match child {
            ExecutableData::Category(nested) => collect_category(nested, compiler, scripts)?,
            ExecutableData::Script(data) => {
                let code = compiler.compile(data)?;
                scripts.push(Script {
                    id: data.id().to_string(),
                    name: data.name.clone(),
                    category: category.category.clone(),
                    code,
                    recommend: data.recommend.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collection(yaml: &str) -> Result<ScriptCollection, ScriptError> {
        let data: CollectionData = serde_yaml::from_str(yaml).unwrap();
        ScriptCollection::from_data(&data)
    }

    #[test]
    fn test_flattens_nested_categories() {
        let collection = collection(
            r##"
os: linux
scripting:
  language: shellscript
  startCode: "#!/usr/bin/env bash"
actions:
  - category: Privacy
    children:
      - name: Disable tracking
        code: tracker disable
        revertCode: tracker enable
        recommend: standard
      - category: Browsers
        children:
          - name: Clear history
            id: clear-history
            call:
              function: Remove
              parameters:
                path: ~/.history
functions:
  - name: Remove
    parameters:
      - name: path
    code: rm -rf "{{ $path }}"
"##,
        )
        .unwrap();

        let ids: Vec<_> = collection.scripts().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["Disable tracking", "clear-history"]);

        let clear = collection.script("clear-history").unwrap();
        assert_eq!(clear.category, "Browsers");
        assert_eq!(clear.code.execute(), "rm -rf \"~/.history\"");
        assert!(!clear.can_revert());

        assert_eq!(collection.metadata().start_code, "#!/usr/bin/env bash");
        assert_eq!(collection.metadata().end_code, "");
        assert_eq!(collection.recommended("standard").len(), 1);
    }

    #[test]
    fn test_rejects_empty_category() {
        let err = collection(
            r#"
os: linux
scripting:
  language: shellscript
actions:
  - category: Empty
    children: []
"#,
        )
        .unwrap_err();
        assert_eq!(err, ScriptError::EmptyCategory("Empty".into()));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = collection(
            r#"
os: linux
scripting:
  language: shellscript
actions:
  - category: A
    children:
      - name: First
        id: same
        code: echo one
      - name: Second
        id: same
        code: echo two
"#,
        )
        .unwrap_err();
        assert_eq!(err, ScriptError::DuplicateScript("same".into()));
    }

    #[test]
    fn test_unknown_script_lookup() {
        let collection = collection(
            r#"
os: linux
scripting:
  language: shellscript
actions:
  - category: A
    children:
      - name: Only
        code: echo only
"#,
        )
        .unwrap();
        assert_eq!(
            collection.script("missing").unwrap_err(),
            ScriptError::UnknownScript("missing".into())
        );
    }
}
