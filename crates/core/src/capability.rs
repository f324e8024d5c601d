//! Capabilities a system exposes to its host.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::time::Duration;

use crate::types::Image;

/// Accepts pixel images.
pub trait Drawable {
    /// Returns `false` when the image had nothing usable; the target is then unchanged.
    fn draw(&mut self, image: &dyn Image) -> bool;
}

/// Driven once per host tick.
pub trait Tickable {
    /// Returns `false` once the tickable is finished and should no longer be driven.
    fn update(&mut self, dt: Duration) -> bool;
}

pub trait WindowLike {
    /// Size in cells.
    fn size(&self) -> (u16, u16);

    fn is_minimized(&self) -> bool;

    /// Platform window handle, if the surface has one. Terminals never do.
    fn native_handle(&self) -> Option<NonNull<c_void>>;
}
