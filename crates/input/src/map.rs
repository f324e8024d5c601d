//! Key mapping from terminal events to UI actions.

use crate::types::{InputMode, UiAction};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map keyboard input to a UI action.
///
/// Release events never map to anything; repeats behave like presses.
pub fn map_key(key: KeyEvent, mode: InputMode) -> Option<UiAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if should_quit(key, mode) {
        return Some(UiAction::Quit);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::F(12) => Some(UiAction::ToggleEditor),
        KeyCode::F(2) => Some(UiAction::SwitchFocus),
        KeyCode::Tab | KeyCode::BackTab => Some(UiAction::NextTab),

        // Split
        KeyCode::Left if ctrl => Some(UiAction::GrowSplit),
        KeyCode::Right if ctrl => Some(UiAction::ShrinkSplit),

        // Navigation
        KeyCode::Up => Some(UiAction::MoveUp),
        KeyCode::Down => Some(UiAction::MoveDown),
        KeyCode::Enter => Some(UiAction::Activate),

        // Command line
        KeyCode::Backspace if mode == InputMode::TextEntry => Some(UiAction::Backspace),
        KeyCode::Char(c) if mode == InputMode::TextEntry && !ctrl => Some(UiAction::Input(c)),
        KeyCode::Char(' ') => Some(UiAction::Activate),

        _ => None,
    }
}

/// Check if key should leave the render loop.
///
/// Ctrl+C always quits. A plain `q` only quits while keys are commands, so it
/// can still be typed into the command line.
pub fn should_quit(key: KeyEvent, mode: InputMode) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    mode == InputMode::Navigate && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
}
