//! Editor driven by keys through a running system.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyModifiers};
use pretty_assertions::assert_eq;

use termgui::core::{Diagnostics, Focus, GuiConfig, LogBuffer, Node, RowKind, System, Tab};
use termgui::term::HeadlessSurface;
use termgui::types::{InputMode, MIN_PANEL_WIDTH};

fn scene() -> Node {
    serde_json::from_str(include_str!("fixtures/scene.json")).unwrap()
}

fn system_with_editor(logs: Option<LogBuffer>) -> System<HeadlessSurface> {
    let config = GuiConfig {
        editor_on_start: true,
        ..GuiConfig::default()
    };
    let mut sys = System::new(HeadlessSurface::new(80, 12), &config, logs, Diagnostics::detached()).unwrap();
    sys.refresh(&scene());
    sys
}

fn keys(sys: &mut System<HeadlessSurface>, codes: &[KeyCode]) {
    for code in codes {
        sys.surface_mut().press(*code);
    }
    sys.update(Duration::ZERO);
}

#[test]
fn hierarchy_tree_matches_the_scene() {
    let sys = system_with_editor(None);
    let editor = sys.editor().unwrap();
    let rows: Vec<(u16, RowKind, &str)> = editor
        .rows()
        .iter()
        .map(|r| (r.depth, r.kind, r.label.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (0, RowKind::Thing, "Thing world"),
            (1, RowKind::Group, "Traits"),
            (2, RowKind::Trait, "gravity = 9.8"),
            (2, RowKind::Trait, "paused"),
            (1, RowKind::Group, "Units"),
            (2, RowKind::Component, "Clock"),
            (1, RowKind::Group, "Children"),
            (2, RowKind::Thing, "Thing camera"),
            (3, RowKind::Group, "Units"),
            (4, RowKind::Component, "Transform"),
            (4, RowKind::Component, "Camera"),
            (2, RowKind::Thing, "Thing player"),
            (3, RowKind::Group, "Traits"),
            (4, RowKind::Trait, "health = 100"),
            (3, RowKind::Group, "Children"),
            (4, RowKind::Thing, "Thing sword"),
        ]
    );
}

#[test]
fn collapsing_a_child_hides_only_its_subtree() {
    let mut sys = system_with_editor(None);
    // focus the tree, walk down to "Thing camera" and collapse it
    keys(&mut sys, &[KeyCode::F(2)]);
    keys(&mut sys, &[KeyCode::Down; 7]);
    keys(&mut sys, &[KeyCode::Enter]);

    let editor = sys.editor().unwrap();
    assert_eq!(editor.focus(), Focus::Hierarchy);
    let labels: Vec<&str> = editor.visible_rows().iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        &labels[6..],
        &["Children", "Thing camera", "Thing player", "Traits", "health = 100", "Children", "Thing sword"]
    );
    assert!(sys.surface().row_text(9).contains("▸ Thing camera"));
}

#[test]
fn flow_commands_are_typed_submitted_and_drained() {
    let mut sys = system_with_editor(None);
    keys(&mut sys, &[KeyCode::Tab]);
    assert_eq!(sys.editor().unwrap().tab(), Tab::Flow);
    assert_eq!(sys.editor().unwrap().input_mode(), InputMode::TextEntry);

    let typed: Vec<KeyCode> = "spawn 3".chars().map(KeyCode::Char).collect();
    keys(&mut sys, &typed);
    assert!(sys.surface().row_text(11).starts_with("> spawn 3"));

    keys(&mut sys, &[KeyCode::Enter]);
    assert_eq!(sys.take_commands(), vec!["spawn 3".to_string()]);
    assert!(sys.take_commands().is_empty());
    assert!(sys.surface().row_text(2).starts_with("spawn 3"));

    // q is text here, Ctrl+C still quits
    keys(&mut sys, &[KeyCode::Char('q')]);
    assert_eq!(sys.editor().unwrap().input(), "q");
    sys.surface_mut().press_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(sys.update(Duration::ZERO));
    assert!(!sys.update(Duration::ZERO));
}

#[test]
fn log_tab_shows_captured_lines() {
    let logs = LogBuffer::new(16);
    for i in 0..3 {
        logs.push(format!(" INFO line {i}"));
    }
    let mut sys = system_with_editor(Some(logs));
    sys.update(Duration::ZERO);
    assert!(sys.surface().row_text(2).starts_with(" INFO line 0"));
    assert!(sys.surface().row_text(4).starts_with(" INFO line 2"));

    keys(&mut sys, &[KeyCode::Up]);
    assert!(sys.surface().row_text(2).starts_with(" INFO line 0"));
    assert!(sys.surface().row_text(3).starts_with(" INFO line 1"));
    assert!(!sys.surface().row_text(4).contains("line"));
}

#[test]
fn split_resizes_with_ctrl_arrows_and_is_clamped() {
    let mut sys = system_with_editor(None);
    let start = sys.editor().unwrap().split();
    sys.surface_mut().press_with(KeyCode::Left, KeyModifiers::CONTROL);
    sys.update(Duration::ZERO);
    assert_eq!(sys.editor().unwrap().split(), start + 1);

    for _ in 0..100 {
        sys.surface_mut().press_with(KeyCode::Right, KeyModifiers::CONTROL);
    }
    sys.update(Duration::ZERO);
    sys.update(Duration::ZERO);
    assert_eq!(sys.editor().unwrap().split(), MIN_PANEL_WIDTH);
    // separator sits MIN_PANEL_WIDTH + 1 columns from the right edge
    let row = sys.surface().row_text(0);
    assert_eq!(row.chars().nth(80 - MIN_PANEL_WIDTH as usize - 1), Some('│'));
}

#[test]
fn one_ctrl_right_after_overgrowing_moves_the_separator() {
    let mut sys = system_with_editor(None);
    for _ in 0..3 {
        for _ in 0..60 {
            sys.surface_mut().press_with(KeyCode::Left, KeyModifiers::CONTROL);
        }
        sys.update(Duration::ZERO);
    }
    let widest = 80 - 1 - MIN_PANEL_WIDTH;
    assert_eq!(sys.editor().unwrap().split(), widest);
    let separator = |sys: &System<HeadlessSurface>| sys.surface().row_text(0).chars().position(|c| c == '│');
    assert_eq!(separator(&sys), Some(usize::from(MIN_PANEL_WIDTH)));

    sys.surface_mut().press_with(KeyCode::Right, KeyModifiers::CONTROL);
    sys.update(Duration::ZERO);
    assert_eq!(sys.editor().unwrap().split(), widest - 1);
    assert_eq!(separator(&sys), Some(usize::from(MIN_PANEL_WIDTH) + 1));
}

#[test]
fn f12_hides_and_shows_the_editor() {
    let mut sys = system_with_editor(None);
    keys(&mut sys, &[KeyCode::F(12)]);
    assert!(!sys.editor().unwrap().is_visible());
    assert!(!sys.surface().row_text(0).contains("Hierarchy:"));
    keys(&mut sys, &[KeyCode::F(12)]);
    assert!(sys.surface().row_text(0).contains("Hierarchy:"));
}
