//! Terminal GUI core: compositing, the redraw loop and widget lifecycle.
//!
//! Nothing in here touches the terminal directly; every system runs on an
//! [`EventSurface`](term::EventSurface), so the whole stack is testable with
//! [`HeadlessSurface`](term::HeadlessSurface).
//!
//! # Module Structure
//!
//! - [`compositor`]: pixel images to cells, with graceful degradation
//! - [`render_loop`]: cooperative pump of input, paint and present
//! - [`factory`]: index-stable arena behind every registry
//! - [`item`]: widgets and fonts a system owns and ticks
//! - [`system`]: one window-like surface and what it owns
//! - [`module`]: the [`Gui`] that produces and drives systems
//! - [`editor`]: in-terminal log, command line and hierarchy inspector
//! - [`diagnostics`], [`config`], [`error`]: ambient plumbing
//!
//! # Ownership
//!
//! ```text
//! Gui ─ Factory<System>
//!         System ─ RenderLoop ─ EventSurface
//!                ─ Editor?
//!                ─ CellBuffer (canvas)
//!                ─ Items ─ Factory<Box<dyn Item>>
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use termgui_core::{Diagnostics, Gui, GuiConfig, SystemRequest};
//! use termgui_core::term::HeadlessSurface;
//! use termgui_core::types::{PixelImage, Rgb};
//!
//! let mut gui = Gui::with_opener(GuiConfig::default(), None, Diagnostics::detached(), || {
//!     Ok(HeadlessSurface::new(80, 24))
//! });
//! let ids = gui.create(&SystemRequest::default()).unwrap();
//!
//! let system = gui.system_mut(ids[0]).unwrap();
//! assert!(system.draw(&PixelImage::solid(3, 2, Rgb::new(255, 0, 0))));
//! assert_eq!(system.size(), (80, 24));
//!
//! assert!(gui.update(Duration::from_millis(16)));
//! ```

pub mod capability;
pub mod compositor;
pub mod config;
pub mod diagnostics;
pub mod editor;
pub mod error;
pub mod factory;
pub mod hierarchy;
pub mod item;
pub mod module;
pub mod render_loop;
pub mod system;

pub use termgui_input as input;
pub use termgui_term as term;
pub use termgui_types as types;

pub use capability::{Drawable, Tickable, WindowLike};
pub use compositor::{Compositor, Representation};
pub use config::GuiConfig;
pub use diagnostics::{Diagnostics, LogBuffer, LogCapture};
pub use editor::{Editor, Focus, RowKind, Tab, TreeRow};
pub use error::{DrawError, GuiError, PlaneError};
pub use factory::{Factory, Handle};
pub use hierarchy::{count_nodes, Hierarchy, Node, TraitEntry};
pub use item::{Font, Item, ItemId, ItemKind, ItemRequest, ItemState, Items, Widget};
pub use module::{Gui, SystemId, SystemRequest};
pub use render_loop::{LoopState, RenderLoop, Scene};
pub use system::System;
