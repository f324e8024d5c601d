//! Terminal plumbing.
//!
//! A small rendering layer that avoids widget/layout frameworks and works on a
//! plain cell buffer that can be flushed to a terminal backend.
//!
//! - [`fb`]: the cell grid every other layer writes into
//! - [`renderer`]: encodes buffers into crossterm command streams (full or diff)
//! - [`surface`]: event input plus frame output, real or headless

pub mod fb;
pub mod renderer;
pub mod surface;

pub use termgui_types as types;

pub use fb::{display_columns, Cell, CellBuffer, CellStyle, Glyph};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use surface::{CrosstermSurface, EventSurface, HeadlessSurface, SurfaceEvent};
