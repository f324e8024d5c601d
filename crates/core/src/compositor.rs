//! Image-to-cell compositing.
//!
//! The compositor tries the richest representation the image supports and
//! degrades from there:
//!
//! 1. **Full fidelity**: all four planes present. Colors, glyph and style bits
//!    are copied verbatim.
//! 2. **Background luma**: only a background plane is usable. Cells get a blank
//!    glyph and a gray foreground contrasting with the background.
//! 3. Nothing usable: the buffer is left exactly as it was.
//!
//! Planes are validated before anything is written, so a representation that
//! turns out to be malformed simply hands over to the next one.

use crate::diagnostics::Diagnostics;
use crate::error::{DrawError, PlaneError};
use crate::term::{display_columns, CellBuffer, Glyph};
use crate::types::{Attrs, ColorPlane, Image, Rgb, GLYPH_CAPACITY};

/// Which representation a successful draw used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    FullFidelity,
    BackgroundLuma,
}

struct FullPlanes<'a> {
    fg: &'a [Rgb],
    bg: &'a [Rgb],
    glyphs: &'a [String],
    styles: &'a [u8],
}

pub struct Compositor {
    diag: Diagnostics,
}

impl Compositor {
    pub fn new(diag: Diagnostics) -> Self {
        Self { diag }
    }

    /// Draw `image` into `buffer`, reporting only success or failure.
    pub fn draw(&self, image: &dyn Image, buffer: &mut CellBuffer) -> bool {
        match self.composite(image, buffer) {
            Ok(rep) => {
                tracing::trace!(parent: self.diag.span(), ?rep, width = image.width(), height = image.height(), "image drawn");
                true
            }
            Err(err) => {
                tracing::debug!(parent: self.diag.span(), error = %err, "image not drawn");
                false
            }
        }
    }

    /// Draw `image` into `buffer` with the richest usable representation.
    pub fn composite(
        &self,
        image: &dyn Image,
        buffer: &mut CellBuffer,
    ) -> Result<Representation, DrawError> {
        match full_planes(image) {
            Ok(Some(planes)) => {
                buffer.resize(image.width(), image.height());
                write_full(&planes, buffer);
                return Ok(Representation::FullFidelity);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(parent: self.diag.span(), error = %err, "full-fidelity planes unusable, falling back");
            }
        }

        match background_plane(image) {
            Ok(Some(bg)) => {
                buffer.resize(image.width(), image.height());
                write_background(bg, buffer);
                return Ok(Representation::BackgroundLuma);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(parent: self.diag.span(), error = %err, "background plane unusable");
            }
        }

        Err(DrawError::NoUsablePlane)
    }
}

fn check_len(plane: &'static str, actual: usize, expected: usize) -> Result<(), PlaneError> {
    if actual != expected {
        return Err(PlaneError::LengthMismatch {
            plane,
            expected,
            actual,
        });
    }
    Ok(())
}

fn full_planes(image: &dyn Image) -> Result<Option<FullPlanes<'_>>, PlaneError> {
    let (Some(fg), Some(bg), Some(glyphs), Some(styles)) = (
        image.color_plane(ColorPlane::Foreground),
        image.color_plane(ColorPlane::Background),
        image.glyph_plane(),
        image.style_plane(),
    ) else {
        return Ok(None);
    };

    let n = image.pixel_count();
    check_len("foreground", fg.len(), n)?;
    check_len("background", bg.len(), n)?;
    check_len("glyph", glyphs.len(), n)?;
    check_len("style", styles.len(), n)?;

    if let Some((index, g)) = glyphs
        .iter()
        .enumerate()
        .find(|(_, g)| g.len() > GLYPH_CAPACITY)
    {
        return Err(PlaneError::GlyphTooLong {
            index,
            len: g.len(),
            capacity: GLYPH_CAPACITY,
        });
    }

    // An empty glyph paints as a blank; anything else must advance exactly one column.
    for (index, g) in glyphs.iter().enumerate() {
        let columns = display_columns(g);
        if !g.is_empty() && columns != Some(1) {
            return Err(PlaneError::GlyphWidth { index, columns });
        }
    }

    Ok(Some(FullPlanes {
        fg,
        bg,
        glyphs,
        styles,
    }))
}

fn background_plane(image: &dyn Image) -> Result<Option<&[Rgb]>, PlaneError> {
    let Some(bg) = image.color_plane(ColorPlane::Background) else {
        return Ok(None);
    };
    check_len("background", bg.len(), image.pixel_count())?;
    Ok(Some(bg))
}

fn write_full(planes: &FullPlanes<'_>, buffer: &mut CellBuffer) {
    let pixels = planes
        .fg
        .iter()
        .zip(planes.bg)
        .zip(planes.glyphs)
        .zip(planes.styles);
    for (cell, (((fg, bg), glyph), style)) in buffer.cells_mut().iter_mut().zip(pixels) {
        cell.style.bg = *bg;
        cell.glyph = Glyph::try_from_str(glyph).unwrap_or_default();
        cell.style.attrs = Attrs::from_bits_truncate(*style);
        cell.style.fg = *fg;
    }
}

fn write_background(bg: &[Rgb], buffer: &mut CellBuffer) {
    for (cell, bg) in buffer.cells_mut().iter_mut().zip(bg) {
        cell.style.bg = *bg;
        cell.glyph = Glyph::blank();
        cell.style.fg = bg.contrast_gray();
        cell.style.attrs = Attrs::empty();
    }
}
