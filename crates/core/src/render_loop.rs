//! The cooperative redraw loop.
//!
//! A loop never blocks: each [`RenderLoop::tick`] handles whatever input is
//! already queued, repaints the frame and presents it, then returns. Quitting
//! is a one-way transition that the *next* tick observes, so the frame
//! painted while the quit key was read still reaches the terminal.

use std::time::Duration;

use anyhow::Result;

use crate::diagnostics::Diagnostics;
use crate::error::GuiError;
use crate::input::map_key;
use crate::item::Items;
use crate::term::{Cell, CellBuffer, EventSurface, SurfaceEvent};
use crate::types::{InputMode, UiAction};

/// What a loop paints and who receives its input.
pub trait Scene {
    fn input_mode(&self) -> InputMode {
        InputMode::Navigate
    }

    fn on_action(&mut self, _action: UiAction) {}

    /// Paint into a cleared, surface-sized frame.
    fn paint(&mut self, frame: &mut CellBuffer);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Constructing,
    Running,
    Quit,
}

pub struct RenderLoop<S> {
    surface: S,
    frame: CellBuffer,
    state: LoopState,
    max_events: usize,
    pumps: u64,
    diag: Diagnostics,
}

impl<S: EventSurface> RenderLoop<S> {
    /// Build the loop and pump once so the frame matches the real surface size.
    pub fn new(
        surface: S,
        scene: &mut dyn Scene,
        max_events: usize,
        diag: Diagnostics,
    ) -> Result<Self, GuiError> {
        let mut this = Self {
            surface,
            frame: CellBuffer::new(1, 1),
            state: LoopState::Constructing,
            max_events: max_events.max(1),
            pumps: 0,
            diag,
        };
        if let Err(err) = this.pump(scene) {
            let error = format!("{err:#}");
            tracing::error!(parent: this.diag.span(), %error, "initial render pass failed");
            return Err(GuiError::InitialPump(err));
        }
        if this.state == LoopState::Constructing {
            this.state = LoopState::Running;
        }
        let (width, height) = this.frame.dimensions();
        tracing::debug!(parent: this.diag.span(), width, height, "render loop running");
        Ok(this)
    }

    /// One cooperative step. Returns `false` once the loop has quit; nothing
    /// is pumped from then on.
    pub fn tick(&mut self, dt: Duration, items: &mut Items, scene: &mut dyn Scene) -> bool {
        if self.state == LoopState::Quit {
            return false;
        }
        self.surface.post(SurfaceEvent::Refresh);
        items.tick(dt);
        if let Err(err) = self.pump(scene) {
            let error = format!("{err:#}");
            tracing::error!(parent: self.diag.span(), %error, "render pass failed, quitting");
            self.state = LoopState::Quit;
        }
        true
    }

    fn pump(&mut self, scene: &mut dyn Scene) -> Result<()> {
        for _ in 0..self.max_events {
            let Some(event) = self.surface.poll()? else {
                break;
            };
            match event {
                SurfaceEvent::Key(key) => match map_key(key, scene.input_mode()) {
                    Some(UiAction::Quit) => {
                        tracing::info!(parent: self.diag.span(), "quit requested");
                        self.state = LoopState::Quit;
                        break;
                    }
                    Some(action) => scene.on_action(action),
                    None => {}
                },
                SurfaceEvent::Resize(width, height) => {
                    tracing::debug!(parent: self.diag.span(), width, height, "surface resized");
                }
                SurfaceEvent::Refresh => {}
            }
        }

        let (width, height) = self.surface.size();
        self.frame.resize(width, height);
        self.frame.clear(Cell::default());
        scene.paint(&mut self.frame);
        self.surface.present(&self.frame)?;
        self.pumps += 1;
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn size(&self) -> (u16, u16) {
        self.surface.size()
    }

    /// Completed pumps, the construction pump included.
    pub fn pumps(&self) -> u64 {
        self.pumps
    }

    /// The last painted frame.
    pub fn frame(&self) -> &CellBuffer {
        &self.frame
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
