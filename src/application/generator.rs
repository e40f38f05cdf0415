//! Builds one script out of a selection

use tracing::debug;

use super::builder::CodeBuilder;
use super::position::CodePosition;
use super::selection::SelectedScript;
use crate::catalog::ScriptMetadata;
use crate::error::ScriptError;

/// Generated code plus where every selected script landed in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserScript {
    pub code: String,
    pub positions: Vec<(SelectedScript, CodePosition)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserScriptGenerator;

impl UserScriptGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        selection: &[SelectedScript],
        metadata: &ScriptMetadata,
    ) -> Result<UserScript, ScriptError> {
        if selection.is_empty() {
            return Ok(UserScript::default());
        }

        let mut builder = CodeBuilder::new(metadata.language);
        if !metadata.start_code.is_empty() {
            builder
                .append_line(Some(&metadata.start_code))
                .append_empty_line();
        }

        let mut positions = Vec::with_capacity(selection.len());
        for selected in selection {
            let position = append_selection(&mut builder, selected)?;
            positions.push((selected.clone(), position));
        }

        if !metadata.end_code.is_empty() {
            builder
                .append_empty_line()
                .append_line(Some(&metadata.end_code));
        }

        debug!(
            scripts = positions.len(),
            lines = builder.current_line(),
            "generated user script"
        );
        Ok(UserScript {
            code: builder.build(),
            positions,
        })
    }
}

fn append_selection(
    builder: &mut CodeBuilder,
    selected: &SelectedScript,
) -> Result<CodePosition, ScriptError> {
    let code = selected.code()?;
    let start = builder.current_line() + 1;
    builder
        .append_empty_line()
        .append_function(&selected.display_name(), code);
    let end = builder.current_line() - 1;
    builder.append_empty_line();
    CodePosition::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::selection::fixtures::selected;
    use pretty_assertions::assert_eq;
    use script_core::ScriptLanguage;

    fn metadata(start: &str, end: &str) -> ScriptMetadata {
        ScriptMetadata {
            language: ScriptLanguage::Shellscript,
            start_code: start.to_string(),
            end_code: end.to_string(),
        }
    }

    #[test]
    fn test_empty_selection_generates_nothing() {
        let script = UserScriptGenerator::new()
            .generate(&[], &metadata("#!/bin/sh", "exit 0"))
            .unwrap();
        assert_eq!(script, UserScript::default());
    }

    #[test]
    fn test_positions_cover_each_block() {
        let selection = vec![
            selected("first", "echo 1", None, false),
            selected("second", "echo on\necho more", Some("echo off"), true),
        ];
        let script = UserScriptGenerator::new()
            .generate(&selection, &metadata("#!/bin/sh", "exit 0"))
            .unwrap();
        let lines: Vec<&str> = script.code.split('\n').collect();

        assert_eq!(lines[0], "#!/bin/sh");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "");
        assert_eq!(lines[lines.len() - 1], "exit 0");

        let (first, first_position) = &script.positions[0];
        assert_eq!(first.id(), "first");
        assert_eq!(*first_position, CodePosition::new(3, 8).unwrap());
        assert!(lines[3].starts_with("# ---"));
        assert_eq!(lines[6], "echo '--- first'");
        assert_eq!(lines[7], "echo 1");
        assert!(lines[8].starts_with("# ---"));
        assert_eq!(lines[9], "");

        let (second, second_position) = &script.positions[1];
        assert!(second.is_reverted());
        assert_eq!(*second_position, CodePosition::new(11, 16).unwrap());
        assert_eq!(lines[14], "echo '--- second (revert)'");
        assert_eq!(lines[15], "echo off");
        assert_eq!(lines.len(), 20);
    }

    #[test]
    fn test_without_start_and_end_code() {
        let selection = vec![selected("only", "echo 1", None, false)];
        let script = UserScriptGenerator::new()
            .generate(&selection, &metadata("", ""))
            .unwrap();
        assert_eq!(script.positions[0].1, CodePosition::new(1, 6).unwrap());
        assert!(script.code.starts_with("\n# ---"));
        assert!(script.code.ends_with("\n"));
    }
}
