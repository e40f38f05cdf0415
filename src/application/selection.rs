use std::sync::Arc;

use crate::catalog::Script;
use crate::error::ScriptError;

/// A script picked by the user, run forwards or reverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedScript {
    script: Arc<Script>,
    revert: bool,
}

impl SelectedScript {
    pub fn new(script: Arc<Script>, revert: bool) -> Result<Self, ScriptError> {
        if revert && !script.can_revert() {
            return Err(ScriptError::MissingRevertCode);
        }
        Ok(Self { script, revert })
    }

    pub fn id(&self) -> &str {
        &self.script.id
    }

    pub fn script(&self) -> &Arc<Script> {
        &self.script
    }

    pub fn is_reverted(&self) -> bool {
        self.revert
    }

    /// Display name, suffixed with ` (revert)` when reverted.
    pub fn display_name(&self) -> String {
        if self.revert {
            format!("{} (revert)", self.script.name)
        } else {
            self.script.name.clone()
        }
    }

    /// The code this selection contributes.
    pub fn code(&self) -> Result<&str, ScriptError> {
        if self.revert {
            self.script.code.revert().ok_or(ScriptError::MissingRevertCode)
        } else {
            Ok(self.script.code.execute())
        }
    }
}
