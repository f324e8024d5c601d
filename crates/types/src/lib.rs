//! Core types module - shared data structures and constants
//!
//! This module defines the plain data types used throughout the workspace.
//! Nothing here performs I/O, so the types are usable from the compositor,
//! the render loop, the editor and tests alike.
//!
//! # Style Bits
//!
//! Per-pixel style values travel as a `u8` bitmask:
//!
//! | Bit | Flag |
//! |-----|------|
//! | 0 | bold |
//! | 1 | faint |
//! | 2 | italic |
//! | 3 | underline |
//! | 4 | blink |
//! | 5 | reverse |
//! | 6 | strikethrough |
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_EDITOR_SPLIT` | 30 | Width of the editor's right panel |
//! | `MIN_PANEL_WIDTH` | 10 | Narrowest either editor panel may get |
//! | `DEFAULT_LOG_CAPACITY` | 256 | Captured diagnostic lines kept for the editor |
//! | `DEFAULT_MAX_EVENTS_PER_PUMP` | 64 | Queued events handled per loop iteration |
//! | `MAX_BATCH` | 1024 | Items or systems one creation request may produce |
//! | `GLYPH_CAPACITY` | 16 | Bytes of UTF-8 a single cell can hold |
//!
//! # Examples
//!
//! ```
//! use termgui_types::{Attrs, Rgb, UiAction};
//!
//! let attrs = Attrs::from_bits_truncate(0b0000_0101);
//! assert!(attrs.contains(Attrs::BOLD | Attrs::ITALIC));
//!
//! let red = Rgb::new(255, 0, 0);
//! assert_eq!(red.luma(), 76);
//!
//! assert_eq!(UiAction::from_str("toggleEditor"), Some(UiAction::ToggleEditor));
//! ```

pub mod image;

pub use image::{ColorPlane, Image, PixelImage};

use serde::{Deserialize, Serialize};

/// Width of the editor's right (hierarchy) panel in columns.
pub const DEFAULT_EDITOR_SPLIT: u16 = 30;

/// Neither editor panel is squeezed below this many columns.
pub const MIN_PANEL_WIDTH: u16 = 10;

/// Number of captured diagnostic lines retained for the editor's log tab.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Upper bound on queued surface events processed by a single pump.
pub const DEFAULT_MAX_EVENTS_PER_PUMP: usize = 64;

/// Largest `count` a single item or system creation request may ask for.
pub const MAX_BATCH: usize = 1024;

/// Maximum UTF-8 length of a cell glyph.
pub const GLYPH_CAPACITY: usize = 16;

/// Luma band that is pushed further from mid-gray when deriving a foreground.
pub const MID_GRAY_BAND: std::ops::RangeInclusive<u8> = 100..=156;

/// Amount subtracted from a derived foreground that lands in [`MID_GRAY_BAND`].
pub const MID_GRAY_SHIFT: u8 = 100;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Same value on all three channels.
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Perceptual brightness, `0.299R + 0.587G + 0.114B`, rounded to 0..=255.
    ///
    /// Computed in fixed point so that pure white maps to exactly 255.
    ///
    /// ```
    /// use termgui_types::Rgb;
    ///
    /// assert_eq!(Rgb::BLACK.luma(), 0);
    /// assert_eq!(Rgb::WHITE.luma(), 255);
    /// ```
    pub fn luma(self) -> u8 {
        let weighted = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        ((weighted + 500) / 1000) as u8
    }

    /// High-contrast gray for text drawn over `self`.
    ///
    /// The complement of the luma, moved out of the mid-gray band where it
    /// would be unreadable against a similar background.
    ///
    /// ```
    /// use termgui_types::Rgb;
    ///
    /// assert_eq!(Rgb::BLACK.contrast_gray(), Rgb::WHITE);
    /// assert_eq!(Rgb::WHITE.contrast_gray(), Rgb::BLACK);
    /// assert_eq!(Rgb::gray(128).contrast_gray(), Rgb::gray(27));
    /// ```
    pub fn contrast_gray(self) -> Rgb {
        let mut fg = 255 - self.luma();
        if MID_GRAY_BAND.contains(&fg) {
            fg -= MID_GRAY_SHIFT;
        }
        Rgb::gray(fg)
    }
}

bitflags::bitflags! {
    /// Text attributes of a cell, bit-compatible with the per-pixel style plane.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        const BOLD = 1 << 0;
        const FAINT = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const REVERSE = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
    }
}

/// How keyboard input should be interpreted.
///
/// - **Navigate**: single keys are commands (`q` quits)
/// - **TextEntry**: printable keys are typed into the editor's command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Navigate,
    TextEntry,
}

/// UI actions produced from terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Leave the render loop
    Quit,
    /// Show or hide the editor view
    ToggleEditor,
    /// Cycle the editor's left panel tab
    NextTab,
    /// Move keyboard focus between the left panel and the hierarchy
    SwitchFocus,
    MoveUp,
    MoveDown,
    /// Collapse/expand a row, or submit the command line
    Activate,
    Backspace,
    /// Widen the right panel
    GrowSplit,
    /// Narrow the right panel
    ShrinkSplit,
    /// A printable character for the command line
    Input(char),
}

impl UiAction {
    /// Parse a non-character action from its camelCase name.
    ///
    /// ```
    /// use termgui_types::UiAction;
    ///
    /// assert_eq!(UiAction::from_str("quit"), Some(UiAction::Quit));
    /// assert_eq!(UiAction::from_str("NEXTTAB"), Some(UiAction::NextTab));
    /// assert_eq!(UiAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quit" => Some(UiAction::Quit),
            "toggleeditor" => Some(UiAction::ToggleEditor),
            "nexttab" => Some(UiAction::NextTab),
            "switchfocus" => Some(UiAction::SwitchFocus),
            "moveup" => Some(UiAction::MoveUp),
            "movedown" => Some(UiAction::MoveDown),
            "activate" => Some(UiAction::Activate),
            "backspace" => Some(UiAction::Backspace),
            "growsplit" => Some(UiAction::GrowSplit),
            "shrinksplit" => Some(UiAction::ShrinkSplit),
            _ => None,
        }
    }

    /// Convert to camelCase string. Typed characters have no name.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            UiAction::Quit => Some("quit"),
            UiAction::ToggleEditor => Some("toggleEditor"),
            UiAction::NextTab => Some("nextTab"),
            UiAction::SwitchFocus => Some("switchFocus"),
            UiAction::MoveUp => Some("moveUp"),
            UiAction::MoveDown => Some("moveDown"),
            UiAction::Activate => Some("activate"),
            UiAction::Backspace => Some("backspace"),
            UiAction::GrowSplit => Some("growSplit"),
            UiAction::ShrinkSplit => Some("shrinkSplit"),
            UiAction::Input(_) => None,
        }
    }
}
