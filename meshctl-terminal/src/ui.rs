/// Keyboard-driven immediate-mode widgets for the terminal control panel
///
/// Widgets are declared anew every frame, in order. Only interaction state
/// survives between frames: which widget has focus, an in-progress text
/// edit, and whether each collapsing header is open.
use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent};
use nalgebra::Vector3;

/// Something that lays out widgets whenever the menu panel is redrawn.
pub trait MenuPanel {
    fn draw_menu(&mut self, ui: &mut Ui);
}

/// A run of text within a panel line.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub focused: bool,
}

/// One laid-out row of the panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelLine {
    pub spans: Vec<Span>,
}

impl PanelLine {
    fn push(&mut self, text: impl Into<String>, focused: bool) {
        self.spans.push(Span {
            text: text.into(),
            focused,
        });
    }

    /// The row's text with focus markers dropped.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(|span| span.text.chars().count()).sum()
    }

    pub fn is_focused(&self) -> bool {
        self.spans.iter().any(|span| span.focused)
    }
}

#[derive(Debug)]
struct Edit {
    widget: usize,
    buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum WidgetKind {
    Header,
    Number,
    Button,
}

#[derive(Debug, Default)]
pub struct Ui {
    focus: usize,
    edit: Option<Edit>,
    /// Number keys are queued for the focused field but not yet applied
    typing: bool,
    open: HashMap<String, bool>,
    /// Keys in arrival order, tagged with the widget focused at the time
    pending: Vec<(usize, KeyCode)>,
    /// Widgets declared so far this frame
    widgets: Vec<WidgetKind>,
    /// Layout of the last finished frame, used to route incoming keys
    layout: Vec<WidgetKind>,
    indent: bool,
    lines: Vec<PanelLine>,
}

impl Ui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a key to the panel. Tab and Shift-Tab move focus at once;
    /// other keys wait for the widget that was focused when they arrived.
    /// Returns false for keys the panel has no use for.
    pub fn queue_key(&mut self, key: KeyEvent) -> bool {
        let focused_number = self.layout.get(self.focus) == Some(&WidgetKind::Number);
        match key.code {
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            // A half-typed number owns the keyboard until Enter or Esc
            code if self.typing => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                    self.typing = false;
                }
                self.pending.push((self.focus, code));
            }
            KeyCode::Char(c) if focused_number && is_numeric(c) => {
                self.typing = true;
                self.pending.push((self.focus, KeyCode::Char(c)));
            }
            KeyCode::Backspace if focused_number => {
                self.typing = true;
                self.pending.push((self.focus, KeyCode::Backspace));
            }
            code if is_activation(code) => self.pending.push((self.focus, code)),
            _ => return false,
        }
        true
    }

    /// Start laying out a frame.
    pub fn begin_frame(&mut self) {
        self.lines.clear();
        self.widgets.clear();
        self.indent = false;
    }

    /// Finish the frame and hand back the laid-out rows.
    pub fn end_frame(&mut self) -> Vec<PanelLine> {
        self.layout = std::mem::take(&mut self.widgets);
        self.focus = self.focus.min(self.layout.len().saturating_sub(1));
        if self.edit.as_ref().is_some_and(|e| e.widget != self.focus) {
            self.edit = None;
        }
        // Keys for a widget that was not declared this frame are dropped
        self.pending.clear();
        self.typing = self.edit.is_some();
        std::mem::take(&mut self.lines)
    }

    /// A number is being typed; every key belongs to the panel.
    pub fn is_editing(&self) -> bool {
        self.typing || self.edit.is_some()
    }

    pub fn focused_widget(&self) -> usize {
        self.focus
    }

    /// Non-interactive row.
    pub fn text(&mut self, text: impl Into<String>) {
        let mut line = self.line();
        line.push(text, false);
        self.lines.push(line);
    }

    /// Header that hides the widgets after it when closed. Enter or Space
    /// toggles it. Returns whether it is open.
    pub fn collapsing_header(&mut self, label: &str, default_open: bool) -> bool {
        let (id, focused) = self.widget(WidgetKind::Header);
        let mut open = self.open.get(label).copied().unwrap_or(default_open);
        for key in self.take_keys(id) {
            if is_activation(key) {
                open = !open;
            }
        }
        self.open.insert(label.to_owned(), open);

        self.indent = false;
        let mut line = PanelLine::default();
        line.push(format!("{} {label}", if open { 'v' } else { '>' }), focused);
        self.lines.push(line);
        self.indent = true;
        open
    }

    /// Returns true on the frame the button is activated.
    pub fn button(&mut self, label: &str) -> bool {
        let (id, focused) = self.widget(WidgetKind::Button);
        let pressed = self.take_keys(id).into_iter().any(is_activation);

        let mut line = self.line();
        line.push(format!("[ {label} ]"), focused);
        self.lines.push(line);
        pressed
    }

    /// Numeric field bound to `value`. Returns true when a committed edit
    /// changed the value.
    pub fn input_double(&mut self, label: &str, value: &mut f64) -> bool {
        let (id, focused) = self.widget(WidgetKind::Number);
        let changed = self.edit_scalar(id, value);

        let mut line = self.line();
        line.push(self.field(id, *value), focused);
        line.push(format!(" {label}"), false);
        self.lines.push(line);
        changed
    }

    /// Three numeric fields on one row, each separately focusable.
    pub fn input_double3(&mut self, label: &str, value: &mut Vector3<f64>) -> bool {
        let mut line = self.line();
        let mut changed = false;
        for component in value.iter_mut() {
            let (id, focused) = self.widget(WidgetKind::Number);
            changed |= self.edit_scalar(id, component);
            line.push(self.field(id, *component), focused);
            line.push(" ", false);
        }
        line.push(label.to_owned(), false);
        self.lines.push(line);
        changed
    }

    fn line(&self) -> PanelLine {
        let mut line = PanelLine::default();
        if self.indent {
            line.push("  ", false);
        }
        line
    }

    fn widget(&mut self, kind: WidgetKind) -> (usize, bool) {
        let id = self.widgets.len();
        self.widgets.push(kind);
        (id, id == self.focus)
    }

    /// Drain the keys that arrived while `id` had focus, in order.
    fn take_keys(&mut self, id: usize) -> Vec<KeyCode> {
        let (mine, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(widget, _)| *widget == id);
        self.pending = rest;
        mine.into_iter().map(|(_, key)| key).collect()
    }

    /// Leaving a field abandons whatever was typed into it without Enter.
    fn move_focus(&mut self, forward: bool) {
        self.edit = None;
        self.typing = false;
        let count = self.layout.len();
        if count == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
    }

    fn field(&self, id: usize, value: f64) -> String {
        match &self.edit {
            Some(edit) if edit.widget == id => format!("[{:>10}_]", edit.buffer),
            _ => format!("[{value:>11.4}]"),
        }
    }

    fn edit_scalar(&mut self, id: usize, value: &mut f64) -> bool {
        let mut changed = false;
        for key in self.take_keys(id) {
            match key {
                KeyCode::Char(c) if is_numeric(c) => self.buffer(id, None).push(c),
                KeyCode::Backspace => {
                    self.buffer(id, Some(*value)).pop();
                }
                KeyCode::Enter => {
                    // An unparsable buffer reverts to the bound value
                    if let Some(edit) = self.edit.take() {
                        match edit.buffer.trim().parse::<f64>() {
                            Ok(parsed) if parsed != *value => {
                                *value = parsed;
                                changed = true;
                            }
                            Ok(_) => {}
                            Err(_) => tracing::debug!(input = %edit.buffer, "discarding unparsable number"),
                        }
                    }
                }
                KeyCode::Esc => self.edit = None,
                _ => {}
            }
        }
        changed
    }

    /// The edit buffer for `id`, started from `seed` (or empty) if needed.
    fn buffer(&mut self, id: usize, seed: Option<f64>) -> &mut String {
        if self.edit.as_ref().is_some_and(|e| e.widget != id) {
            self.edit = None;
        }
        let edit = self.edit.get_or_insert_with(|| Edit {
            widget: id,
            buffer: seed.map(|v| v.to_string()).unwrap_or_default(),
        });
        &mut edit.buffer
    }
}

fn is_activation(key: KeyCode) -> bool {
    matches!(key, KeyCode::Enter | KeyCode::Char(' '))
}

fn is_numeric(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}
