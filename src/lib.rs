//! termgui (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so hosts depend on a single
//! package: `termgui::{core,input,term,types}`.

pub use termgui_core as core;
pub use termgui_input as input;
pub use termgui_term as term;
pub use termgui_types as types;

pub use termgui_core::{Diagnostics, Gui, GuiConfig, LogBuffer, System, SystemRequest};
