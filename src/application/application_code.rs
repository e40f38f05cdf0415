//! Keeps the generated code in step with the current selection

use std::fmt;

use tracing::info;

use super::event::{position_by_id, CodeChangedEvent};
use super::generator::UserScriptGenerator;
use super::position::CodePosition;
use super::selection::SelectedScript;
use crate::catalog::{Script, ScriptMetadata};
use crate::error::ScriptError;

pub type CodeChangedListener = Box<dyn Fn(&CodeChangedEvent) + Send + Sync>;

pub struct ApplicationCode {
    metadata: ScriptMetadata,
    generator: UserScriptGenerator,
    current: String,
    positions: Vec<(SelectedScript, CodePosition)>,
    listeners: Vec<CodeChangedListener>,
}

impl ApplicationCode {
    pub fn new(metadata: ScriptMetadata) -> Self {
        Self {
            metadata,
            generator: UserScriptGenerator::new(),
            current: String::new(),
            positions: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Start from an initial selection.
    pub fn with_selection(
        metadata: ScriptMetadata,
        selection: &[SelectedScript],
    ) -> Result<Self, ScriptError> {
        let mut code = Self::new(metadata);
        code.set_selection(selection)?;
        Ok(code)
    }

    pub fn on_change<F>(&mut self, listener: F)
    where
        F: Fn(&CodeChangedEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Regenerate for `selection`, replacing whatever was generated before,
    /// and notify listeners. On error the current code is left untouched.
    pub fn set_selection(
        &mut self,
        selection: &[SelectedScript],
    ) -> Result<CodeChangedEvent, ScriptError> {
        let generated = self.generator.generate(selection, &self.metadata)?;
        let previous: Vec<SelectedScript> =
            self.positions.iter().map(|(s, _)| s.clone()).collect();
        let event = CodeChangedEvent::new(generated.code, &previous, generated.positions)?;

        self.current = event.code().to_string();
        self.positions = event.positions().to_vec();

        info!(
            selected = self.positions.len(),
            added = event.added_scripts().len(),
            removed = event.removed_scripts().len(),
            changed = event.changed_scripts().len(),
            "code changed"
        );
        for listener in &self.listeners {
            listener(&event);
        }
        Ok(event)
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn positions(&self) -> &[(SelectedScript, CodePosition)] {
        &self.positions
    }

    pub fn script_position(&self, script: &Script) -> Result<CodePosition, ScriptError> {
        position_by_id(&self.positions, &script.id)
    }
}

impl fmt::Debug for ApplicationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationCode")
            .field("metadata", &self.metadata)
            .field("current", &self.current)
            .field("positions", &self.positions)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
