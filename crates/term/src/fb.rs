//! Cell buffer and style types for terminal rendering.

use arrayvec::ArrayString;
use unicode_width::UnicodeWidthStr;

use crate::types::{Attrs, Rgb, GLYPH_CAPACITY};

/// Text occupying one terminal cell.
///
/// Stored inline so cells stay `Copy` and filling a buffer never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph(ArrayString<GLYPH_CAPACITY>);

impl Glyph {
    /// A single space.
    pub fn blank() -> Self {
        Self::from_char(' ')
    }

    pub fn from_char(ch: char) -> Self {
        let mut s = ArrayString::new();
        // A char is at most 4 bytes, always within capacity.
        let _ = s.try_push(ch);
        Self(s)
    }

    /// Returns `None` when `text` does not fit in a cell.
    pub fn try_from_str(text: &str) -> Option<Self> {
        ArrayString::from(text).ok().map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Terminal columns this glyph occupies, or `None` if it holds a control
    /// character and cannot be printed in place.
    pub fn columns(&self) -> Option<usize> {
        display_columns(self.as_str())
    }

    /// True when printing this glyph advances the cursor by exactly one column.
    pub fn is_single_cell(&self) -> bool {
        self.columns() == Some(1)
    }
}

/// Display width of `text` in terminal columns.
///
/// Control characters have no meaningful width (they move the cursor instead of
/// drawing), so any text containing one yields `None`.
pub fn display_columns(text: &str) -> Option<usize> {
    if text.chars().any(char::is_control) {
        return None;
    }
    Some(UnicodeWidthStr::width(text))
}

impl Default for Glyph {
    fn default() -> Self {
        Self::blank()
    }
}

/// Per-cell styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub attrs: Attrs,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            attrs: Attrs::empty(),
        }
    }
}

impl CellStyle {
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            attrs: Attrs::empty(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub glyph: Glyph,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(ch: char, style: CellStyle) -> Self {
        Self {
            glyph: Glyph::from_char(ch),
            style,
        }
    }
}

/// 2D buffer of styled character cells, row-major.
///
/// `cells().len() == width * height` holds after every operation.
#[derive(Debug, PartialEq, Eq)]
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Clone for CellBuffer {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }

    // Reuses the cell allocation; the renderer relies on this every frame.
    fn clone_from(&mut self, source: &Self) {
        self.width = source.width;
        self.height = source.height;
        self.cells.clone_from(&source.cells);
    }
}

impl CellBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Resize the buffer, resetting every cell to the default.
    ///
    /// A no-op when the dimensions are unchanged, so it is safe to call before
    /// every draw. The allocation is reused when it is large enough.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width as usize) * (height as usize);
        self.cells.clear();
        self.cells.resize(len, Cell::default());
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Unchecked (in release) cell access; the caller keeps `x < width`, `y < height`.
    #[inline(always)]
    pub fn at(&self, x: u16, y: u16) -> &Cell {
        debug_assert!(x < self.width && y < self.height, "cell ({x},{y}) out of range");
        &self.cells[(y as usize) * (self.width as usize) + (x as usize)]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, x: u16, y: u16) -> &mut Cell {
        debug_assert!(x < self.width && y < self.height, "cell ({x},{y}) out of range");
        let w = self.width as usize;
        &mut self.cells[(y as usize) * w + (x as usize)]
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn clear(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: CellStyle) {
        self.set(x, y, Cell::new(ch, style));
    }

    /// Write `s` one char per cell starting at `(x, y)`, clipped at `x + max_w`
    /// and at the buffer edge. Returns the column after the last written char.
    pub fn put_str_clipped(&mut self, x: u16, y: u16, s: &str, max_w: u16, style: CellStyle) -> u16 {
        let end = x.saturating_add(max_w).min(self.width);
        let mut cx = x;
        for ch in s.chars() {
            if cx >= end {
                break;
            }
            self.put_char(cx, y, ch, style);
            cx += 1;
        }
        cx
    }

    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) -> u16 {
        self.put_str_clipped(x, y, s, u16::MAX, style)
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: CellStyle) {
        for dy in 0..h {
            for dx in 0..w {
                self.put_char(x.saturating_add(dx), y.saturating_add(dy), ch, style);
            }
        }
    }

    /// Copy `src` into this buffer with its top-left at `(x, y)`, clipped.
    pub fn blit(&mut self, src: &CellBuffer, x: u16, y: u16) {
        let w = src.width.min(self.width.saturating_sub(x));
        let h = src.height.min(self.height.saturating_sub(y));
        if w == 0 || h == 0 {
            return;
        }
        for sy in 0..h {
            let from = (sy as usize) * (src.width as usize);
            let to = ((y + sy) as usize) * (self.width as usize) + (x as usize);
            self.cells[to..to + w as usize].copy_from_slice(&src.cells[from..from + w as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_resets_cells_and_keeps_len_invariant() {
        let mut fb = CellBuffer::new(2, 2);
        fb.put_char(1, 1, 'x', CellStyle::default());
        fb.resize(3, 1);
        assert_eq!(fb.cells().len(), 3);
        assert!(fb.cells().iter().all(|c| *c == Cell::default()));
    }

    #[test]
    fn resize_same_size_keeps_contents() {
        let mut fb = CellBuffer::new(2, 2);
        fb.put_char(1, 1, 'x', CellStyle::default());
        fb.resize(2, 2);
        assert_eq!(fb.at(1, 1).glyph.as_str(), "x");
    }

    #[test]
    fn glyph_capacity_is_enforced() {
        assert!(Glyph::try_from_str("ab").is_some());
        assert!(Glyph::try_from_str(&"x".repeat(GLYPH_CAPACITY)).is_some());
        assert!(Glyph::try_from_str(&"x".repeat(GLYPH_CAPACITY + 1)).is_none());
        assert_eq!(Glyph::default().as_str(), " ");
        assert!(Glyph::try_from_str("").unwrap().is_blank());
    }

    #[test]
    fn glyph_columns_follow_display_width() {
        assert_eq!(Glyph::from_char('a').columns(), Some(1));
        assert_eq!(Glyph::try_from_str("e\u{301}").unwrap().columns(), Some(1));
        assert_eq!(Glyph::from_char('漢').columns(), Some(2));
        assert_eq!(Glyph::try_from_str("ab").unwrap().columns(), Some(2));
        assert_eq!(Glyph::from_char('\n').columns(), None);
        assert_eq!(display_columns("\u{1b}[2J"), None);
        assert!(!Glyph::try_from_str("").unwrap().is_single_cell());
        assert!(Glyph::blank().is_single_cell());
    }

    #[test]
    fn put_str_clips_to_width() {
        let mut fb = CellBuffer::new(4, 1);
        let end = fb.put_str_clipped(1, 0, "hello", 2, CellStyle::default());
        assert_eq!(end, 3);
        assert_eq!(fb.at(1, 0).glyph.as_str(), "h");
        assert_eq!(fb.at(2, 0).glyph.as_str(), "e");
        assert_eq!(fb.at(3, 0).glyph.as_str(), " ");
    }

    #[test]
    fn blit_clips_at_destination_edge() {
        let mut src = CellBuffer::new(3, 2);
        src.fill_rect(0, 0, 3, 2, '#', CellStyle::default());
        let mut dst = CellBuffer::new(4, 3);
        dst.blit(&src, 2, 2);
        assert_eq!(dst.at(2, 2).glyph.as_str(), "#");
        assert_eq!(dst.at(3, 2).glyph.as_str(), "#");
        assert_eq!(dst.at(1, 2).glyph.as_str(), " ");
        assert_eq!(dst.at(2, 1).glyph.as_str(), " ");
    }
}
