use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::{draw_overlay_frame, input_line, overlay_rect, Anchor};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by the filter input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
  /// Query changed (emitted on each keystroke, empty string on cancel)
  Changed(String),
  /// Overlay closed, filter stays applied
  Submitted,
}

/// `/` filter over the visible tasks
#[derive(Debug, Clone, Default)]
pub struct FilterInput {
  input: TextInput,
  active: bool,
}

impl FilterInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Current query, whether or not the overlay is open
  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Whether `text` passes the current query (case-insensitive substring)
  pub fn matches(&self, text: &str) -> bool {
    let query = self.query().trim();
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
  }

  pub fn clear(&mut self) {
    self.active = false;
    self.input.clear();
  }

  /// Handle a key event. Also handles activation, so call it in any state.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FilterEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.active = true;
        self.input.clear();
        return KeyResult::Event(FilterEvent::Changed(String::new()));
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(FilterEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.clear();
        KeyResult::Event(FilterEvent::Changed(String::new()))
      }
      InputResult::Consumed => KeyResult::Event(FilterEvent::Changed(self.query().to_string())),
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60);
    let rect = overlay_rect(area, width, 3, Anchor::TopLeft);
    let inner = draw_overlay_frame(frame, rect, "Filter tasks", Color::Yellow);
    if inner.height == 0 {
      return;
    }

    let (before, after) = self.input.split_at_cursor();
    frame.render_widget(
      Paragraph::new(input_line("/", before, after, Color::Yellow)),
      inner,
    );
  }
}
