//! Script generation for a selection of compiled scripts

pub mod application_code;
pub mod builder;
pub mod event;
pub mod generator;
pub mod position;
pub mod selection;

pub use application_code::{ApplicationCode, CodeChangedListener};
pub use builder::{CodeBuilder, TOTAL_SEPARATOR_HYPHENS};
pub use event::CodeChangedEvent;
pub use generator::{UserScript, UserScriptGenerator};
pub use position::CodePosition;
pub use selection::SelectedScript;
