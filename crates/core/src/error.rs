//! Error types.
//!
//! Only [`GuiError`] ever crosses the public API as an `Err`. The draw errors
//! are used internally to pick a fallback and end up as a `bool` for callers.

use thiserror::Error;

/// A system could not be brought up.
#[derive(Debug, Error)]
pub enum GuiError {
    #[error("failed to open event surface: {0:#}")]
    Surface(anyhow::Error),

    #[error("initial render pass failed: {0:#}")]
    InitialPump(anyhow::Error),

    #[error("requested {requested} systems, at most {max} per request")]
    BatchTooLarge { requested: usize, max: usize },
}

/// A present plane that cannot be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaneError {
    #[error("{plane} plane has {actual} entries, expected {expected}")]
    LengthMismatch {
        plane: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("glyph at pixel {index} is {len} bytes, a cell holds at most {capacity}")]
    GlyphTooLong {
        index: usize,
        len: usize,
        capacity: usize,
    },

    #[error("glyph at pixel {index} does not occupy exactly one cell ({})", describe_columns(.columns))]
    GlyphWidth {
        index: usize,
        columns: Option<usize>,
    },
}

fn describe_columns(columns: &Option<usize>) -> String {
    match columns {
        Some(n) => format!("{n} columns"),
        None => "control character".to_owned(),
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    #[error("image has no usable color plane")]
    NoUsablePlane,
}
