//! Collection file data model
//!
//! ```yaml
//! os: windows
//! scripting:
//!   language: batchfile
//!   startCode: "@echo off"
//! actions:
//!   - category: Privacy
//!     children:
//!       - name: Disable telemetry
//!         call: { function: DisableService, parameters: { serviceName: DiagTrack } }
//! functions:
//!   - name: DisableService
//!     parameters: [{ name: serviceName }]
//!     code: sc config "{{ $serviceName }}" start=disabled
//! ```

use serde::{Deserialize, Serialize};

pub use script_core::{FunctionData, ParameterDefinitionData};
use script_core::ScriptLanguage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    pub os: String,
    pub scripting: ScriptingData,
    pub actions: Vec<CategoryData>,
    #[serde(default)]
    pub functions: Vec<FunctionData>,
}

impl CollectionData {
    /// Every script in the category tree, depth first.
    pub fn scripts(&self) -> Vec<&ScriptData> {
        let mut scripts = Vec::new();
        for category in &self.actions {
            category.collect_scripts(&mut scripts);
        }
        scripts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptingData {
    pub language: ScriptLanguage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    pub category: String,
    #[serde(default)]
    pub children: Vec<ExecutableData>,
}

impl CategoryData {
    fn collect_scripts<'a>(&'a self, scripts: &mut Vec<&'a ScriptData>) {
        for child in &self.children {
            match child {
                ExecutableData::Category(nested) => nested.collect_scripts(scripts),
                ExecutableData::Script(script) => scripts.push(script),
            }
        }
    }
}

/// A category child: a nested category or a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutableData {
    Category(CategoryData),
    Script(ScriptData),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptData {
    pub name: String,
    /// Defaults to the script name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommend: Option<String>,
}

impl ScriptData {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_distinguish_categories_and_scripts() {
        let category: CategoryData = serde_yaml::from_str(
            r#"
category: Root
children:
  - category: Nested
    children:
      - name: Inner
        code: echo inner
  - name: Outer
    id: outer-script
    call:
      function: Run
"#,
        )
        .unwrap();
        assert_eq!(category.children.len(), 2);
        let mut scripts = Vec::new();
        category.collect_scripts(&mut scripts);
        let names: Vec<_> = scripts.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Inner", "Outer"]);
        match &category.children[0] {
            ExecutableData::Category(nested) => assert_eq!(nested.category, "Nested"),
            other => panic!("expected category, got {:?}", other),
        }
        match &category.children[1] {
            ExecutableData::Script(script) => {
                assert_eq!(script.id(), "outer-script");
                assert!(script.call.is_some());
            }
            other => panic!("expected script, got {:?}", other),
        }
    }

    #[test]
    fn test_script_id_defaults_to_name() {
        let script = ScriptData {
            name: "Clear logs".into(),
            ..Default::default()
        };
        assert_eq!(script.id(), "Clear logs");
    }
}
