//! Terminal input module.
//!
//! This module is intentionally independent of the render loop. It maps
//! `crossterm` key events into [`crate::types::UiAction`], taking the current
//! [`crate::types::InputMode`] into account so that typing into the editor's
//! command line does not trigger single-key commands.

pub mod map;

pub use termgui_types as types;

pub use map::{map_key, should_quit};
