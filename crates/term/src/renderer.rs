//! TerminalRenderer: flushes a cell buffer to a real terminal.
//!
//! Frames are encoded into a reusable byte buffer (full redraw on the first
//! frame or after a size change, changed-run diffs otherwise) and written to
//! the output in one go.

use std::io::{self, Write};
use std::ops::Range;

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{Cell, CellBuffer, CellStyle};
use crate::types::{Attrs, Rgb};

pub struct TerminalRenderer<W: Write = io::Stdout> {
    out: W,
    last: Option<CellBuffer>,
    buf: Vec<u8>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for TerminalRenderer<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            last: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a frame, diffing against the previously drawn one.
    ///
    /// The previous frame is kept by copying into a retained buffer, so after
    /// the first frame of a given size no allocation happens here.
    pub fn draw(&mut self, frame: &CellBuffer) -> Result<()> {
        self.buf.clear();
        let mut drew_diff = false;
        if let Some(prev) = self.last.as_mut() {
            if prev.dimensions() == frame.dimensions() {
                encode_diff_into(prev, frame, &mut self.buf)?;
                prev.clone_from(frame);
                drew_diff = true;
            }
        }
        if !drew_diff {
            encode_full_into(frame, &mut self.buf)?;
            self.last = Some(frame.clone());
        }
        self.flush_buf()
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out`.
///
/// Every row is addressed absolutely, so a misbehaving terminal cannot shift
/// later rows. Nothing is written to the terminal here.
pub fn encode_full_into(fb: &CellBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let width = usize::from(fb.width());
    let mut writer = RunWriter::new(out);
    if width > 0 {
        for (y, row) in (0u16..).zip(fb.cells().chunks(width)) {
            writer.run(0, y, row)?;
        }
    }
    writer.finish()
}

/// Encode only the cells that differ between `prev` and `next`.
///
/// Identical frames encode to nothing. Frames of different size cannot be
/// diffed and get a full redraw instead.
pub fn encode_diff_into(prev: &CellBuffer, next: &CellBuffer, out: &mut Vec<u8>) -> Result<()> {
    if prev.dimensions() != next.dimensions() {
        return encode_full_into(next, out);
    }

    let width = usize::from(next.width());
    let mut writer = RunWriter::new(out);
    for run in ChangedRuns::new(prev.cells(), next.cells(), width) {
        // Run bounds come from a grid whose sides are u16, so both fit.
        let x = (run.start % width) as u16;
        let y = (run.start / width) as u16;
        writer.run(x, y, &next.cells()[run])?;
    }
    writer.finish()
}

/// Queues cell runs, re-emitting style sequences only when the style changes.
struct RunWriter<'a> {
    out: &'a mut Vec<u8>,
    style: Option<CellStyle>,
}

impl<'a> RunWriter<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, style: None }
    }

    fn run(&mut self, x: u16, y: u16, cells: &[Cell]) -> Result<()> {
        self.out.queue(cursor::MoveTo(x, y))?;
        for cell in cells {
            if self.style != Some(cell.style) {
                apply_style_into(self.out, cell.style)?;
                self.style = Some(cell.style);
            }
            // The cursor must advance exactly one column per cell.
            if cell.glyph.is_single_cell() {
                self.out.queue(Print(cell.glyph.as_str()))?;
            } else {
                self.out.queue(Print(' '))?;
            }
        }
        Ok(())
    }

    /// Leave the terminal in its default style if anything was drawn.
    fn finish(self) -> Result<()> {
        if self.style.is_some() {
            self.out.queue(ResetColor)?;
            self.out.queue(SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }
}

/// Index ranges of differing cells, split at row ends.
struct ChangedRuns<'a> {
    prev: &'a [Cell],
    next: &'a [Cell],
    width: usize,
    pos: usize,
}

impl<'a> ChangedRuns<'a> {
    fn new(prev: &'a [Cell], next: &'a [Cell], width: usize) -> Self {
        Self {
            prev,
            next,
            width,
            pos: 0,
        }
    }

    fn differs(&self, i: usize) -> bool {
        self.prev[i] != self.next[i]
    }
}

impl Iterator for ChangedRuns<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        let len = self.next.len().min(self.prev.len());
        while self.pos < len && !self.differs(self.pos) {
            self.pos += 1;
        }
        if self.pos >= len {
            return None;
        }
        let start = self.pos;
        let row_end = (start / self.width + 1) * self.width;
        let mut end = start + 1;
        while end < row_end.min(len) && self.differs(end) {
            end += 1;
        }
        self.pos = end;
        Some(start..end)
    }
}

fn apply_style_into(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
    out.queue(SetAttribute(Attribute::Reset))?;
    for attr in attributes(style.attrs) {
        out.queue(SetAttribute(attr))?;
    }
    Ok(())
}

/// Terminal attributes for a set of style flags, in bit order.
fn attributes(attrs: Attrs) -> impl Iterator<Item = Attribute> {
    const TABLE: [(Attrs, Attribute); 7] = [
        (Attrs::BOLD, Attribute::Bold),
        (Attrs::FAINT, Attribute::Dim),
        (Attrs::ITALIC, Attribute::Italic),
        (Attrs::UNDERLINE, Attribute::Underlined),
        (Attrs::BLINK, Attribute::SlowBlink),
        (Attrs::REVERSE, Attribute::Reverse),
        (Attrs::STRIKETHROUGH, Attribute::CrossedOut),
    ];
    TABLE
        .into_iter()
        .filter(move |(flag, _)| attrs.contains(*flag))
        .map(|(_, attr)| attr)
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
