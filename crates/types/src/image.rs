//! Pixel images handed to a surface for drawing.
//!
//! An image is a `width x height` grid described by independent planes. Any
//! plane may be missing; consumers decide how far they can get with what is
//! present.

use serde::{Deserialize, Serialize};

use crate::Rgb;

/// The two color planes an image may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorPlane {
    Foreground,
    Background,
}

/// Read-only view of a pixel image.
///
/// Planes are row-major and are expected to hold `width * height` entries.
/// Implementations are not required to enforce that; readers validate.
pub trait Image {
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    fn color_plane(&self, plane: ColorPlane) -> Option<&[Rgb]>;
    fn glyph_plane(&self) -> Option<&[String]>;
    fn style_plane(&self) -> Option<&[u8]>;

    /// Number of pixels the planes should cover.
    fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

/// Owned image with optional planes.
///
/// Deserializes from JSON such as
/// `{"width":2,"height":1,"background":[{"r":0,"g":0,"b":0},{"r":9,"g":9,"b":9}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelImage {
    pub width: u16,
    pub height: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Vec<Rgb>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Vec<Rgb>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<u8>>,
}

impl PixelImage {
    /// An image with no planes at all.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Background-only image of a single color.
    pub fn solid(width: u16, height: u16, bg: Rgb) -> Self {
        let len = width as usize * height as usize;
        Self::new(width, height).with_background(vec![bg; len])
    }

    pub fn with_foreground(mut self, plane: Vec<Rgb>) -> Self {
        self.foreground = Some(plane);
        self
    }

    pub fn with_background(mut self, plane: Vec<Rgb>) -> Self {
        self.background = Some(plane);
        self
    }

    pub fn with_glyphs<S: Into<String>>(mut self, plane: impl IntoIterator<Item = S>) -> Self {
        self.glyphs = Some(plane.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_styles(mut self, plane: Vec<u8>) -> Self {
        self.styles = Some(plane);
        self
    }
}

impl Image for PixelImage {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn color_plane(&self, plane: ColorPlane) -> Option<&[Rgb]> {
        match plane {
            ColorPlane::Foreground => self.foreground.as_deref(),
            ColorPlane::Background => self.background.as_deref(),
        }
    }

    fn glyph_plane(&self) -> Option<&[String]> {
        self.glyphs.as_deref()
    }

    fn style_plane(&self) -> Option<&[u8]> {
        self.styles.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_image_has_background_only() {
        let img = PixelImage::solid(3, 2, Rgb::new(255, 0, 0));
        assert_eq!(img.pixel_count(), 6);
        assert_eq!(img.color_plane(ColorPlane::Background).map(|p| p.len()), Some(6));
        assert!(img.color_plane(ColorPlane::Foreground).is_none());
        assert!(img.glyph_plane().is_none());
        assert!(img.style_plane().is_none());
    }

    #[test]
    fn deserializes_partial_planes_from_json() {
        let json = r#"{
            "width": 2,
            "height": 1,
            "background": [{"r":1,"g":2,"b":3},{"r":4,"g":5,"b":6}],
            "glyphs": ["a", "b"]
        }"#;
        let img: PixelImage = serde_json::from_str(json).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.glyph_plane().unwrap()[1], "b");
        assert_eq!(img.color_plane(ColorPlane::Background).unwrap()[1], Rgb::new(4, 5, 6));
        assert!(img.style_plane().is_none());
    }
}
