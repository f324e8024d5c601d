//! Event surfaces: where input comes from and where frames go.
//!
//! [`CrosstermSurface`] owns the real terminal (raw mode, alternate screen) for
//! as long as it lives. [`HeadlessSurface`] has a fixed size, a scripted event
//! queue and records what was presented; it backs tests, benches and hosts
//! without a TTY.

use std::collections::VecDeque;
use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::fb::CellBuffer;
use crate::renderer::{encode_diff_into, encode_full_into, TerminalRenderer};

/// Events delivered to the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Synthetic "repaint now" request.
    Refresh,
}

/// Input source and output sink for one render loop.
pub trait EventSurface {
    /// Current size in character cells.
    fn size(&self) -> (u16, u16);

    /// Queue an event ahead of real input; delivered by a later `poll`.
    fn post(&mut self, event: SurfaceEvent);

    /// Next pending event without blocking, if any.
    fn poll(&mut self) -> Result<Option<SurfaceEvent>>;

    /// Emit `frame` to the output.
    fn present(&mut self, frame: &CellBuffer) -> Result<()>;
}

/// The process terminal, driven through crossterm.
pub struct CrosstermSurface {
    renderer: TerminalRenderer,
    size: (u16, u16),
    pending: VecDeque<SurfaceEvent>,
    raw: bool,
}

impl CrosstermSurface {
    /// Take over the terminal.
    ///
    /// Fails when stdout is not an interactive terminal or raw mode cannot be
    /// enabled. Anything already switched on is switched back off on failure.
    pub fn open() -> Result<Self> {
        if !io::stdout().is_terminal() {
            bail!("stdout is not an interactive terminal");
        }
        let size = terminal::size()?;

        let mut surface = Self {
            renderer: TerminalRenderer::new(),
            size,
            pending: VecDeque::new(),
            raw: false,
        };
        terminal::enable_raw_mode()?;
        surface.raw = true;
        surface.renderer.enter()?;
        tracing::debug!(width = size.0, height = size.1, "terminal surface opened");
        Ok(surface)
    }

    fn translate(&mut self, ev: Event) -> Option<SurfaceEvent> {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => Some(SurfaceEvent::Key(key)),
            Event::Resize(w, h) => {
                self.size = (w, h);
                self.renderer.invalidate();
                Some(SurfaceEvent::Resize(w, h))
            }
            _ => None,
        }
    }
}

impl EventSurface for CrosstermSurface {
    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn post(&mut self, event: SurfaceEvent) {
        self.pending.push_back(event);
    }

    fn poll(&mut self) -> Result<Option<SurfaceEvent>> {
        if let Some(ev) = self.pending.pop_front() {
            return Ok(Some(ev));
        }
        while event::poll(Duration::ZERO)? {
            if let Some(ev) = self.translate(event::read()?) {
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    fn present(&mut self, frame: &CellBuffer) -> Result<()> {
        self.renderer.draw(frame)
    }
}

impl Drop for CrosstermSurface {
    fn drop(&mut self) {
        // Always try to restore terminal state.
        let _ = self.renderer.exit();
        if self.raw {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// In-memory surface with scripted input.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: (u16, u16),
    pending: VecDeque<SurfaceEvent>,
    last: Option<CellBuffer>,
    output: Vec<u8>,
    presents: usize,
    fail_present: bool,
}

impl HeadlessSurface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: (width, height),
            pending: VecDeque::new(),
            last: None,
            output: Vec::with_capacity(4 * 1024),
            presents: 0,
            fail_present: false,
        }
    }

    /// Queue a key press.
    pub fn press(&mut self, code: KeyCode) {
        self.press_with(code, KeyModifiers::NONE);
    }

    pub fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.pending
            .push_back(SurfaceEvent::Key(KeyEvent::new(code, modifiers)));
    }

    /// Queue a terminal resize; the surface reports the new size immediately.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.pending.push_back(SurfaceEvent::Resize(width, height));
    }

    /// Make every following `present` fail, as a vanished terminal would.
    pub fn fail_presents(&mut self) {
        self.fail_present = true;
    }

    /// Number of frames presented so far.
    pub fn presents(&self) -> usize {
        self.presents
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// The most recently presented frame.
    pub fn last_frame(&self) -> Option<&CellBuffer> {
        self.last.as_ref()
    }

    /// Terminal bytes the last `present` would have written.
    pub fn last_output(&self) -> &[u8] {
        &self.output
    }

    /// Row `y` of the last frame as the terminal would show it, one column per cell.
    pub fn row_text(&self, y: u16) -> String {
        let Some(frame) = self.last.as_ref() else {
            return String::new();
        };
        if y >= frame.height() {
            return String::new();
        }
        (0..frame.width())
            .map(|x| {
                let glyph = &frame.at(x, y).glyph;
                if glyph.is_single_cell() {
                    glyph.as_str()
                } else {
                    " "
                }
            })
            .collect()
    }
}

impl EventSurface for HeadlessSurface {
    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn post(&mut self, event: SurfaceEvent) {
        self.pending.push_back(event);
    }

    fn poll(&mut self) -> Result<Option<SurfaceEvent>> {
        Ok(self.pending.pop_front())
    }

    fn present(&mut self, frame: &CellBuffer) -> Result<()> {
        if self.fail_present {
            bail!("headless surface closed");
        }
        self.output.clear();
        let same_size = self
            .last
            .as_ref()
            .is_some_and(|prev| prev.dimensions() == frame.dimensions());
        if let (true, Some(prev)) = (same_size, self.last.as_mut()) {
            encode_diff_into(prev, frame, &mut self.output)?;
            prev.clone_from(frame);
        } else {
            encode_full_into(frame, &mut self.output)?;
            self.last = Some(frame.clone());
        }
        self.presents += 1;
        Ok(())
    }
}
