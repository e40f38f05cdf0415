//! Notification raised when the generated code changes

use script_core::text::split_lines;

use super::position::CodePosition;
use super::selection::SelectedScript;
use crate::catalog::Script;
use crate::error::ScriptError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChangedEvent {
    code: String,
    positions: Vec<(SelectedScript, CodePosition)>,
    added: Vec<SelectedScript>,
    removed: Vec<SelectedScript>,
    changed: Vec<SelectedScript>,
}

impl CodeChangedEvent {
    /// Diff `positions` against the previous selection. Every position must end
    /// within `code`.
    pub fn new(
        code: String,
        previous: &[SelectedScript],
        positions: Vec<(SelectedScript, CodePosition)>,
    ) -> Result<Self, ScriptError> {
        ensure_positions_in_range(&code, &positions)?;

        let current: Vec<&SelectedScript> = positions.iter().map(|(s, _)| s).collect();
        let added = current
            .iter()
            .filter(|s| !previous.iter().any(|old| old.id() == s.id()))
            .map(|s| (*s).clone())
            .collect();
        let removed = previous
            .iter()
            .filter(|old| !current.iter().any(|s| s.id() == old.id()))
            .cloned()
            .collect();
        let changed = current
            .iter()
            .filter(|s| {
                previous
                    .iter()
                    .any(|old| old.id() == s.id() && old.is_reverted() != s.is_reverted())
            })
            .map(|s| (*s).clone())
            .collect();

        Ok(Self {
            code,
            positions,
            added,
            removed,
            changed,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn positions(&self) -> &[(SelectedScript, CodePosition)] {
        &self.positions
    }

    pub fn added_scripts(&self) -> &[SelectedScript] {
        &self.added
    }

    pub fn removed_scripts(&self) -> &[SelectedScript] {
        &self.removed
    }

    /// Scripts still selected whose revert flag flipped.
    pub fn changed_scripts(&self) -> &[SelectedScript] {
        &self.changed
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn script_position(&self, script: &Script) -> Result<CodePosition, ScriptError> {
        position_by_id(&self.positions, &script.id)
    }
}

pub(crate) fn position_by_id(
    positions: &[(SelectedScript, CodePosition)],
    id: &str,
) -> Result<CodePosition, ScriptError> {
    positions
        .iter()
        .find(|(s, _)| s.id() == id)
        .map(|(_, position)| *position)
        .ok_or(ScriptError::UnknownScriptPosition)
}

fn ensure_positions_in_range(
    code: &str,
    positions: &[(SelectedScript, CodePosition)],
) -> Result<(), ScriptError> {
    let total = split_lines(code).len();
    let end_lines: Vec<usize> = positions
        .iter()
        .map(|(_, position)| position.end_line())
        .filter(|end| *end > total)
        .collect();
    if end_lines.is_empty() {
        return Ok(());
    }
    Err(ScriptError::PositionOutOfRange { end_lines, total })
}
