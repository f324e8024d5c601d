//! A system: one window-like surface and everything it owns.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::time::Duration;

use crate::capability::{Drawable, Tickable, WindowLike};
use crate::compositor::Compositor;
use crate::config::GuiConfig;
use crate::diagnostics::{Diagnostics, LogBuffer};
use crate::editor::Editor;
use crate::error::GuiError;
use crate::hierarchy::Hierarchy;
use crate::item::{ItemId, ItemRequest, Items};
use crate::render_loop::{RenderLoop, Scene};
use crate::term::{CellBuffer, EventSurface};
use crate::types::{Image, InputMode, UiAction};

/// What a system's loop paints: the canvas, with the editor over it when shown.
struct CanvasScene<'a> {
    canvas: &'a CellBuffer,
    editor: Option<&'a mut Editor>,
}

impl Scene for CanvasScene<'_> {
    fn input_mode(&self) -> InputMode {
        self.editor
            .as_deref()
            .map_or(InputMode::Navigate, Editor::input_mode)
    }

    fn on_action(&mut self, action: UiAction) {
        if let Some(editor) = self.editor.as_deref_mut() {
            editor.handle(action);
        }
    }

    fn paint(&mut self, frame: &mut CellBuffer) {
        frame.blit(self.canvas, 0, 0);
        if let Some(editor) = self.editor.as_deref_mut() {
            editor.paint(frame);
        }
    }
}

/// Couples a render loop, a canvas and an item registry into one surface.
///
/// Field order is drop order: the loop (and with it the terminal) goes before
/// the canvas it paints from. Items are torn down before either, in [`Drop`].
pub struct System<S: EventSurface> {
    render_loop: RenderLoop<S>,
    editor: Option<Editor>,
    canvas: CellBuffer,
    compositor: Compositor,
    items: Items,
    editor_split: u16,
    diag: Diagnostics,
}

impl<S: EventSurface> System<S> {
    /// Bring a system up on `surface`. The canvas starts 1x1.
    pub fn new(
        surface: S,
        config: &GuiConfig,
        logs: Option<LogBuffer>,
        diag: Diagnostics,
    ) -> Result<Self, GuiError> {
        let canvas = CellBuffer::new(1, 1);
        let mut editor = config
            .editor_on_start
            .then(|| Editor::new(config.editor_split, logs, diag.child("editor")));
        let mut scene = CanvasScene {
            canvas: &canvas,
            editor: editor.as_mut(),
        };
        let render_loop = RenderLoop::new(
            surface,
            &mut scene,
            config.max_events_per_pump,
            diag.child("render_loop"),
        )?;

        let (width, height) = render_loop.size();
        tracing::info!(parent: diag.span(), width, height, editor = editor.is_some(), "system up");
        Ok(Self {
            render_loop,
            editor,
            canvas,
            compositor: Compositor::new(diag.child("compositor")),
            items: Items::new(diag.child("items")),
            editor_split: config.editor_split,
            diag,
        })
    }

    /// Composite `image` into the canvas; shown from the next update on.
    pub fn draw(&mut self, image: &dyn Image) -> bool {
        self.compositor.draw(image, &mut self.canvas)
    }

    /// Tick items and pump the loop once. `false` once the user has quit.
    pub fn update(&mut self, dt: Duration) -> bool {
        let mut scene = CanvasScene {
            canvas: &self.canvas,
            editor: self.editor.as_mut(),
        };
        self.render_loop.tick(dt, &mut self.items, &mut scene)
    }

    /// Surface size in cells.
    pub fn size(&self) -> (u16, u16) {
        self.render_loop.size()
    }

    pub fn is_minimized(&self) -> bool {
        false
    }

    pub fn native_handle(&self) -> Option<NonNull<c_void>> {
        None
    }

    pub fn create(&mut self, request: &ItemRequest) -> Vec<ItemId> {
        self.items.create(request)
    }

    pub fn destroy(&mut self, id: ItemId) -> bool {
        self.items.destroy(id)
    }

    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    /// The host hierarchy changed.
    pub fn refresh(&mut self, env: &dyn Hierarchy) {
        if let Some(editor) = self.editor.as_mut() {
            editor.rebuild(env);
        }
        self.items.refresh(env);
    }

    /// Attach an editor, or show the attached one.
    pub fn open_editor(&mut self, logs: Option<LogBuffer>) -> &mut Editor {
        let editor = self
            .editor
            .get_or_insert_with(|| Editor::new(self.editor_split, logs, self.diag.child("editor")));
        editor.set_visible(true);
        editor
    }

    pub fn close_editor(&mut self) -> bool {
        self.editor.take().is_some()
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        self.editor.as_mut()
    }

    /// Command lines submitted in the editor since the last call.
    pub fn take_commands(&mut self) -> Vec<String> {
        self.editor
            .as_mut()
            .map(Editor::take_commands)
            .unwrap_or_default()
    }

    pub fn canvas(&self) -> &CellBuffer {
        &self.canvas
    }

    pub fn render_loop(&self) -> &RenderLoop<S> {
        &self.render_loop
    }

    pub fn surface(&self) -> &S {
        self.render_loop.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.render_loop.surface_mut()
    }
}

impl<S: EventSurface> Drop for System<S> {
    fn drop(&mut self) {
        let dropped = self.items.teardown();
        tracing::debug!(parent: self.diag.span(), dropped, "system released");
    }
}

impl<S: EventSurface> Drawable for System<S> {
    fn draw(&mut self, image: &dyn Image) -> bool {
        System::draw(self, image)
    }
}

impl<S: EventSurface> Tickable for System<S> {
    fn update(&mut self, dt: Duration) -> bool {
        System::update(self, dt)
    }
}

impl<S: EventSurface> WindowLike for System<S> {
    fn size(&self) -> (u16, u16) {
        System::size(self)
    }

    fn is_minimized(&self) -> bool {
        System::is_minimized(self)
    }

    fn native_handle(&self) -> Option<NonNull<c_void>> {
        System::native_handle(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Node;
    use crate::item::ItemKind;
    use crate::render_loop::LoopState;
    use crate::term::HeadlessSurface;
    use crate::types::{PixelImage, Rgb};
    use crossterm::event::KeyCode;

    fn system(config: &GuiConfig) -> System<HeadlessSurface> {
        System::new(HeadlessSurface::new(40, 10), config, None, Diagnostics::detached()).unwrap()
    }

    #[test]
    fn drawn_canvas_reaches_the_frame_on_update() {
        let mut sys = system(&GuiConfig::default());
        assert_eq!(sys.canvas().dimensions(), (1, 1));
        let img = PixelImage::solid(2, 1, Rgb::BLACK)
            .with_foreground(vec![Rgb::WHITE; 2])
            .with_glyphs(["o", "k"])
            .with_styles(vec![0, 0]);
        assert!(sys.draw(&img));
        assert!(sys.update(Duration::from_millis(16)));
        assert!(sys.surface().row_text(0).starts_with("ok"));
    }

    #[test]
    fn editor_keys_route_through_the_loop() {
        let config = GuiConfig {
            editor_on_start: true,
            ..GuiConfig::default()
        };
        let mut sys = system(&config);
        sys.refresh(&Node::new("world"));
        assert!(sys.surface().row_text(0).contains("Hierarchy:"));

        sys.surface_mut().press(KeyCode::Tab);
        for ch in ['q', 'u', 'i', 't'] {
            sys.surface_mut().press(KeyCode::Char(ch));
        }
        sys.surface_mut().press(KeyCode::Enter);
        assert!(sys.update(Duration::ZERO));
        assert_eq!(sys.render_loop().state(), LoopState::Running);
        assert_eq!(sys.take_commands(), vec!["quit".to_string()]);

        sys.surface_mut().press(KeyCode::F(12));
        sys.update(Duration::ZERO);
        assert!(!sys.surface().row_text(0).contains("Hierarchy:"));
    }

    #[test]
    fn open_and_close_editor() {
        let mut sys = system(&GuiConfig::default());
        assert!(sys.editor().is_none());
        sys.open_editor(None).set_visible(false);
        assert!(sys.open_editor(None).is_visible());
        assert!(sys.close_editor());
        assert!(!sys.close_editor());
        assert!(sys.take_commands().is_empty());
    }

    #[test]
    fn items_live_and_die_with_the_system() {
        let mut sys = system(&GuiConfig::default());
        let ids = sys.create(&ItemRequest::new(ItemKind::Widget).with_count(3));
        assert!(sys.destroy(ids[1]));
        assert!(!sys.destroy(ids[1]));
        assert_eq!(sys.items().len(), 2);
        assert_eq!(WindowLike::size(&sys), (40, 10));
        assert!(!WindowLike::is_minimized(&sys));
        assert!(WindowLike::native_handle(&sys).is_none());
    }
}
