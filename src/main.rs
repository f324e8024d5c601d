//! Interactive demo runner (default binary).
//!
//! Opens one system on the process terminal, draws a test card and drives it
//! at about 60 Hz until `q` or Ctrl+C. F12 shows the editor.
//!
//! Usage:
//!   termgui [IMAGE.json] [SCENE.json]
//!
//! `IMAGE.json` is a pixel image (`{"width":..,"height":..,"background":[..]}`),
//! `SCENE.json` a hierarchy node (`{"name":..,"children":[..]}`).

use std::fs::{self, File};
use std::io;
use std::panic;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, terminal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use termgui::core::{Font, ItemKind, ItemRequest, Node};
use termgui::term::CrosstermSurface;
use termgui::types::{Attrs, PixelImage, Rgb};
use termgui::{Diagnostics, Gui, GuiConfig, LogBuffer, System, SystemRequest};

const TICK: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let config = GuiConfig::from_env();
    let logs = LogBuffer::new(config.log_capacity);
    init_tracing(&config, &logs)?;

    let mut args = std::env::args().skip(1);
    let image = match args.next() {
        Some(path) => load_json::<PixelImage>(&path)?,
        None => test_card(64, 16),
    };
    let scene = match args.next() {
        Some(path) => load_json::<Node>(&path)?,
        None => demo_scene(),
    };

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        // Restore terminal before printing panic
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show);
        original_hook(info);
    }));

    let show_editor = config.editor_on_start;
    let mut gui = Gui::crossterm(config, Some(logs.clone()), Diagnostics::root());
    let ids = gui.create(&SystemRequest::default())?;
    for &id in &ids {
        if let Some(system) = gui.system_mut(id) {
            system.open_editor(Some(logs.clone())).set_visible(show_editor);
            system.refresh(&scene);
            system.draw(&image);
        }
    }

    run(&mut gui, &image);
    Ok(())
}

fn run(gui: &mut Gui<CrosstermSurface>, image: &PixelImage) {
    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        if !gui.update(now - last) {
            break;
        }
        last = now;

        for id in gui.ids() {
            let Some(system) = gui.system_mut(id) else {
                continue;
            };
            for command in system.take_commands() {
                run_command(system, &command, image);
            }
        }

        if let Some(rest) = TICK.checked_sub(now.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Commands typed into the editor's Flow tab.
fn run_command(system: &mut System<CrosstermSurface>, command: &str, image: &PixelImage) {
    let mut words = command.split_whitespace();
    match words.next() {
        Some("spawn") => {
            let count = words.next().and_then(|n| n.parse().ok()).unwrap_or(1);
            let ids = system.create(
                &ItemRequest::new(ItemKind::Widget)
                    .with_count(count)
                    .with_lifetime(Duration::from_secs(5)),
            );
            tracing::info!(spawned = ids.len(), alive = system.items().len(), "widgets spawned");
        }
        Some("font") => {
            // `font <family>` registers a host-chosen family, plain `font` the default.
            match words.next() {
                Some(family) => {
                    let id = system
                        .items_mut()
                        .adopt(Box::new(Font::new(family).with_family(family)));
                    tracing::info!(%id, family, "font adopted");
                }
                None => {
                    system.create(&ItemRequest::new(ItemKind::Font));
                }
            }
            tracing::info!(alive = system.items().len(), "font added");
        }
        Some("clear") => {
            let (w, h) = system.size();
            system.draw(&PixelImage::solid(w, h, Rgb::BLACK));
        }
        Some("card") => {
            system.draw(image);
        }
        Some("items") => {
            for (id, item) in system.items().iter() {
                tracing::info!(%id, kind = item.kind().as_str(), label = item.label(), age_ms = item.age().as_millis() as u64, "item");
            }
        }
        _ => tracing::warn!(command, "unknown command (try spawn [n], font [family], clear, card, items)"),
    }
}

fn init_tracing(config: &GuiConfig, logs: &LogBuffer) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = match &config.log_path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create log file {path}"))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(logs.layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {path}"))
}

/// Color gradient with a centered caption, using every image plane.
fn test_card(width: u16, height: u16) -> PixelImage {
    let n = width as usize * height as usize;
    let mut background = Vec::with_capacity(n);
    for y in 0..height {
        for x in 0..width {
            let r = (x as u32 * 255 / width.max(1) as u32) as u8;
            let g = (y as u32 * 255 / height.max(1) as u32) as u8;
            background.push(Rgb::new(r, g, 160));
        }
    }

    let caption = "termgui - q quits, F12 editor";
    let row = height / 2;
    let start = width.saturating_sub(caption.chars().count() as u16) / 2;
    let mut glyphs = vec![String::from(" "); n];
    let mut styles = vec![0u8; n];
    for (i, ch) in caption.chars().enumerate() {
        let x = start as usize + i;
        if x >= width as usize {
            break;
        }
        let at = row as usize * width as usize + x;
        glyphs[at] = ch.to_string();
        styles[at] = Attrs::BOLD.bits();
    }

    let foreground = background.iter().map(|bg| bg.contrast_gray()).collect();
    PixelImage::new(width, height)
        .with_background(background)
        .with_foreground(foreground)
        .with_glyphs(glyphs)
        .with_styles(styles)
}

fn demo_scene() -> Node {
    Node::new("world")
        .with_trait("gravity", "9.8")
        .with_component("Clock")
        .with_child(
            Node::new("camera")
                .with_trait("fov", "70")
                .with_component("Transform")
                .with_component("Camera"),
        )
        .with_child(
            Node::new("player")
                .with_component("Transform")
                .with_child(Node::new("sword").with_component("Mesh")),
        )
}
