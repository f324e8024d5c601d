//! In-terminal inspector.
//!
//! When visible the editor covers the whole frame:
//!
//! ```text
//! | Log | Flow |           │Hierarchy:
//! ───────────────────────── │─────────────
//!  INFO system up           │▾ Thing world
//!  DEBUG items created      │  ▾ Traits
//!                           │      gravity = 9.8
//! ```
//!
//! The right panel width is the split, counted from the right edge.

use std::mem;

use crate::diagnostics::{Diagnostics, LogBuffer};
use crate::hierarchy::Hierarchy;
use crate::term::{CellBuffer, CellStyle};
use crate::types::{Attrs, InputMode, Rgb, UiAction, MIN_PANEL_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Log,
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Left,
    Hierarchy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Thing,
    Group,
    Trait,
    Component,
}

/// One line of the flattened hierarchy tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: u16,
    pub kind: RowKind,
    pub label: String,
    pub collapsed: bool,
}

const TEXT: CellStyle = CellStyle::new(Rgb::new(220, 220, 220), Rgb::BLACK);
const CHROME: CellStyle = CellStyle::new(Rgb::new(120, 120, 120), Rgb::BLACK);
const PROMPT: &str = "> ";

/// Left/right panel widths for a frame `width` columns wide. One column
/// between them is the separator.
pub fn panel_widths(split: u16, width: u16) -> (u16, u16) {
    let usable = width.saturating_sub(1);
    if usable < MIN_PANEL_WIDTH * 2 {
        let right = usable / 2;
        return (usable - right, right);
    }
    let right = split.clamp(MIN_PANEL_WIDTH, usable - MIN_PANEL_WIDTH);
    (usable - right, right)
}

#[derive(Debug)]
pub struct Editor {
    visible: bool,
    tab: Tab,
    focus: Focus,
    split: u16,
    /// Frame width seen by the last visible paint.
    painted_width: Option<u16>,
    rows: Vec<TreeRow>,
    selected: usize,
    log: Option<LogBuffer>,
    log_scroll: usize,
    history: Vec<String>,
    input: String,
    submitted: Vec<String>,
    diag: Diagnostics,
}

impl Editor {
    pub fn new(split: u16, log: Option<LogBuffer>, diag: Diagnostics) -> Self {
        Self {
            visible: true,
            tab: Tab::default(),
            focus: Focus::default(),
            split: split.max(MIN_PANEL_WIDTH),
            painted_width: None,
            rows: Vec::new(),
            selected: 0,
            log,
            log_scroll: 0,
            history: Vec::new(),
            input: String::new(),
            submitted: Vec::new(),
            diag,
        }
    }

    /// Replace the tree with a fresh walk of `env`. Everything starts expanded.
    pub fn rebuild(&mut self, env: &dyn Hierarchy) {
        self.rows.clear();
        flatten(env, 0, &mut self.rows);
        self.selected = self.selected.min(self.visible_count().saturating_sub(1));
        tracing::debug!(parent: self.diag.span(), rows = self.rows.len(), "hierarchy rebuilt");
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    fn visible_iter(&self) -> impl Iterator<Item = (usize, &TreeRow)> + '_ {
        let mut hide_below: Option<u16> = None;
        self.rows.iter().enumerate().filter(move |(_, row)| {
            if let Some(depth) = hide_below {
                if row.depth > depth {
                    return false;
                }
                hide_below = None;
            }
            if row.collapsed {
                hide_below = Some(row.depth);
            }
            true
        })
    }

    fn visible_count(&self) -> usize {
        self.visible_iter().count()
    }

    /// Rows not hidden by a collapsed ancestor.
    pub fn visible_rows(&self) -> Vec<&TreeRow> {
        self.visible_iter().map(|(_, row)| row).collect()
    }

    /// Collapse or expand the `nth` visible row.
    pub fn toggle_row(&mut self, nth: usize) -> bool {
        let Some(index) = self.visible_iter().nth(nth).map(|(i, _)| i) else {
            return false;
        };
        let row = &mut self.rows[index];
        row.collapsed = !row.collapsed;
        true
    }

    fn has_children(&self, index: usize) -> bool {
        match (self.rows.get(index), self.rows.get(index + 1)) {
            (Some(row), Some(next)) => next.depth > row.depth,
            _ => false,
        }
    }

    /// Apply a UI action. Returns whether the editor used it.
    pub fn handle(&mut self, action: UiAction) -> bool {
        if action == UiAction::ToggleEditor {
            self.visible = !self.visible;
            return true;
        }
        if !self.visible {
            return false;
        }

        let typing = self.input_mode() == InputMode::TextEntry;
        match action {
            UiAction::NextTab => {
                self.tab = match self.tab {
                    Tab::Log => Tab::Flow,
                    Tab::Flow => Tab::Log,
                };
            }
            UiAction::SwitchFocus => {
                self.focus = match self.focus {
                    Focus::Left => Focus::Hierarchy,
                    Focus::Hierarchy => Focus::Left,
                };
            }
            UiAction::GrowSplit => {
                if self.split < self.split_limit() {
                    self.split += 1;
                }
            }
            UiAction::ShrinkSplit => {
                self.split = self
                    .split
                    .min(self.split_limit())
                    .saturating_sub(1)
                    .max(MIN_PANEL_WIDTH);
            }
            UiAction::MoveUp | UiAction::MoveDown => self.move_cursor(action == UiAction::MoveUp),
            UiAction::Activate if self.focus == Focus::Hierarchy => {
                self.toggle_row(self.selected);
            }
            UiAction::Activate if typing => self.submit(),
            UiAction::Backspace if typing => {
                self.input.pop();
            }
            UiAction::Input(ch) if typing => self.input.push(ch),
            _ => return false,
        }
        true
    }

    fn move_cursor(&mut self, up: bool) {
        match (self.focus, self.tab) {
            (Focus::Hierarchy, _) => {
                let last = self.visible_count().saturating_sub(1);
                self.selected = if up {
                    self.selected.saturating_sub(1)
                } else {
                    (self.selected + 1).min(last)
                };
            }
            (Focus::Left, Tab::Log) => {
                let max = self.log.as_ref().map_or(0, |log| log.len().saturating_sub(1));
                self.log_scroll = if up {
                    (self.log_scroll + 1).min(max)
                } else {
                    self.log_scroll.saturating_sub(1)
                };
            }
            (Focus::Left, Tab::Flow) => {}
        }
    }

    fn submit(&mut self) {
        let command = self.input.trim().to_string();
        self.input.clear();
        if command.is_empty() {
            return;
        }
        tracing::info!(parent: self.diag.span(), %command, "command submitted");
        self.history.push(command.clone());
        self.submitted.push(command);
    }

    /// Printable keys go to the command line only while it has focus.
    pub fn input_mode(&self) -> InputMode {
        if self.visible && self.focus == Focus::Left && self.tab == Tab::Flow {
            InputMode::TextEntry
        } else {
            InputMode::Navigate
        }
    }

    /// Commands submitted since the last call, oldest first.
    pub fn take_commands(&mut self) -> Vec<String> {
        mem::take(&mut self.submitted)
    }

    /// Widest right panel the last painted frame can show. Unbounded until
    /// the first paint.
    fn split_limit(&self) -> u16 {
        match self.painted_width {
            Some(width) => panel_widths(u16::MAX, width).1.max(MIN_PANEL_WIDTH),
            None => u16::MAX,
        }
    }

    pub fn paint(&mut self, frame: &mut CellBuffer) {
        if !self.visible {
            return;
        }
        let (w, h) = frame.dimensions();
        self.painted_width = Some(w);
        if w == 0 || h == 0 {
            return;
        }
        let (left, right) = panel_widths(self.split, w);
        frame.fill_rect(0, 0, w, h, ' ', TEXT);
        for y in 0..h {
            frame.put_char(left, y, '│', CHROME);
        }
        self.paint_left(frame, left, h);
        self.paint_hierarchy(frame, left + 1, right, h);
    }

    fn paint_left(&self, frame: &mut CellBuffer, width: u16, height: u16) {
        let mut x = 0;
        for (tab, title) in [(Tab::Log, " Log "), (Tab::Flow, " Flow ")] {
            let style = if tab == self.tab {
                TEXT.with_attrs(Attrs::REVERSE)
            } else {
                CHROME
            };
            x = frame.put_str_clipped(x, 0, title, width.saturating_sub(x), style);
        }
        frame.fill_rect(0, 1, width, 1, '─', CHROME);

        let body = height.saturating_sub(2);
        match self.tab {
            Tab::Log => {
                let Some(log) = &self.log else {
                    frame.put_str_clipped(0, 2, "(no log capture)", width, CHROME);
                    return;
                };
                let mut y = 2;
                log.for_each_tail(body as usize, self.log_scroll, |line| {
                    frame.put_str_clipped(0, y, line, width, TEXT);
                    y += 1;
                });
            }
            Tab::Flow => {
                if body == 0 {
                    return;
                }
                let shown = (body - 1) as usize;
                let start = self.history.len().saturating_sub(shown);
                for (y, line) in (2..).zip(&self.history[start..]) {
                    frame.put_str_clipped(0, y, line, width, CHROME);
                }
                let input_row = height - 1;
                let x = frame.put_str_clipped(0, input_row, PROMPT, width, TEXT);
                let end = frame.put_str_clipped(x, input_row, &self.input, width.saturating_sub(x), TEXT);
                if self.input_mode() == InputMode::TextEntry && end < width {
                    frame.put_char(end, input_row, ' ', TEXT.with_attrs(Attrs::REVERSE));
                }
            }
        }
    }

    fn paint_hierarchy(&self, frame: &mut CellBuffer, x0: u16, width: u16, height: u16) {
        if width == 0 {
            return;
        }
        frame.put_str_clipped(x0, 0, "Hierarchy:", width, TEXT.with_attrs(Attrs::BOLD));
        frame.fill_rect(x0, 1, width, 1, '─', CHROME);

        let body = height.saturating_sub(2) as usize;
        let first = (self.selected + 1).saturating_sub(body);
        for (y, (nth, (index, row))) in (2..height).zip(self.visible_iter().enumerate().skip(first)) {
            let mut style = TEXT;
            if nth == self.selected {
                style.attrs = if self.focus == Focus::Hierarchy {
                    Attrs::REVERSE
                } else {
                    Attrs::UNDERLINE
                };
            }
            let indent = row.depth.saturating_mul(2);
            let marker = match (self.has_children(index), row.collapsed) {
                (false, _) => ' ',
                (true, false) => '▾',
                (true, true) => '▸',
            };
            let mut x = x0 + indent.min(width);
            let end = x0 + width;
            if x < end {
                frame.put_char(x, y, marker, style);
                x += 1;
            }
            if x < end {
                x = frame.put_str_clipped(x, y, " ", end - x, style);
                frame.put_str_clipped(x, y, &row.label, end - x, style);
            }
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn split(&self) -> u16 {
        self.split
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

fn push(rows: &mut Vec<TreeRow>, depth: u16, kind: RowKind, label: String) {
    rows.push(TreeRow {
        depth,
        kind,
        label,
        collapsed: false,
    });
}

fn flatten(node: &dyn Hierarchy, depth: u16, rows: &mut Vec<TreeRow>) {
    push(rows, depth, RowKind::Thing, format!("Thing {}", node.name()));

    let traits = node.traits();
    if !traits.is_empty() {
        push(rows, depth + 1, RowKind::Group, "Traits".to_string());
        for t in traits {
            let label = if t.value.is_empty() {
                t.name
            } else {
                format!("{} = {}", t.name, t.value)
            };
            push(rows, depth + 2, RowKind::Trait, label);
        }
    }

    let components = node.components();
    if !components.is_empty() {
        push(rows, depth + 1, RowKind::Group, "Units".to_string());
        for c in components {
            push(rows, depth + 2, RowKind::Component, c);
        }
    }

    let children = node.children();
    if !children.is_empty() {
        push(rows, depth + 1, RowKind::Group, "Children".to_string());
        for child in children {
            flatten(child, depth + 2, rows);
        }
    }
}
