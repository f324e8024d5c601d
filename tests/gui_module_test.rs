//! The module-level producer of systems.

use std::time::Duration;

use crossterm::event::KeyCode;
use pretty_assertions::assert_eq;

use termgui::core::{Diagnostics, Gui, GuiConfig, GuiError, LogBuffer, Node, SystemRequest, Tickable};
use termgui::term::HeadlessSurface;
use termgui::types::{PixelImage, Rgb};
use tracing_subscriber::layer::SubscriberExt;

fn gui(config: GuiConfig) -> Gui<HeadlessSurface> {
    Gui::with_opener(config, None, Diagnostics::detached(), || {
        Ok(HeadlessSurface::new(80, 24))
    })
}

#[test]
fn systems_tick_until_the_last_one_quits() {
    let mut gui = gui(GuiConfig::default());
    let request: SystemRequest = serde_json::from_str(r#"{"count": 3}"#).unwrap();
    let ids = gui.create(&request).unwrap();
    assert_eq!(gui.ids(), ids);

    for id in &ids {
        let system = gui.system_mut(*id).unwrap();
        assert!(system.draw(&PixelImage::solid(3, 2, Rgb::new(255, 0, 0))));
    }
    assert!(Tickable::update(&mut gui, Duration::from_millis(16)));

    for (n, id) in ids.iter().enumerate() {
        gui.system_mut(*id).unwrap().surface_mut().press(KeyCode::Char('q'));
        assert!(gui.update(Duration::from_millis(16)));
        let still_running = gui.update(Duration::from_millis(16));
        assert_eq!(gui.len(), ids.len() - n - 1);
        assert_eq!(still_running, n + 1 < ids.len());
    }
    assert!(!gui.update(Duration::from_millis(16)));
}

#[test]
fn request_editor_overrides_config() {
    let mut gui = gui(GuiConfig::default());
    let plain = gui.create(&SystemRequest::default()).unwrap()[0];
    let with_editor = gui
        .create(&SystemRequest {
            count: 1,
            editor: true,
        })
        .unwrap()[0];

    gui.refresh(&Node::new("world"));
    assert!(gui.system(plain).unwrap().editor().is_none());
    let editor = gui.system(with_editor).unwrap().editor().unwrap();
    assert_eq!(editor.rows().len(), 1);
}

#[test]
fn surface_errors_surface_as_gui_errors() {
    let mut gui: Gui<HeadlessSurface> = Gui::with_opener(GuiConfig::default(), None, Diagnostics::detached(), || {
        anyhow::bail!("stdout is not an interactive terminal")
    });
    let err = gui.create(&SystemRequest::default()).unwrap_err();
    assert!(matches!(err, GuiError::Surface(_)));
    assert_eq!(
        err.to_string(),
        "failed to open event surface: stdout is not an interactive terminal"
    );
    assert!(gui.is_empty());
    assert!(gui.update(Duration::ZERO));
}

#[test]
fn lifecycle_events_reach_the_log_capture() {
    let logs = LogBuffer::new(64);
    let subscriber = tracing_subscriber::registry().with(logs.layer());
    tracing::subscriber::with_default(subscriber, || {
        let mut gui = Gui::with_opener(GuiConfig::default(), Some(logs.clone()), Diagnostics::root(), || {
            Ok(HeadlessSurface::new(20, 5))
        });
        let ids = gui.create(&SystemRequest::default()).unwrap();
        gui.system_mut(ids[0]).unwrap().surface_mut().press(KeyCode::Char('q'));
        gui.update(Duration::ZERO);
        gui.update(Duration::ZERO);
    });

    let lines = logs.lines();
    assert!(lines.iter().any(|l| l.contains("systems created count=1")));
    assert!(lines.iter().any(|l| l.contains("quit requested")));
    assert!(lines.iter().any(|l| l.contains("system quit")));
}
