use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::{draw_overlay_frame, input_line, overlay_rect, Anchor};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
  Submitted(String),
  Cancelled,
}

/// Modal single-line text prompt (new list, new task, edit task)
#[derive(Debug, Clone, Default)]
pub struct TextPrompt {
  title: String,
  input: TextInput,
  active: bool,
}

impl TextPrompt {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the prompt, prefilled with `initial`
  pub fn show(&mut self, title: impl Into<String>, initial: &str) {
    self.title = title.into();
    self.input = TextInput::with_value(initial);
    self.active = true;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.input.clear();
  }

  /// Swallows every key while open
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PromptEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(value) => {
        self.hide();
        KeyResult::Event(PromptEvent::Submitted(value))
      }
      InputResult::Cancelled => {
        self.hide();
        KeyResult::Event(PromptEvent::Cancelled)
      }
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 70 / 100).clamp(30, 80);
    let rect = overlay_rect(area, width, 3, Anchor::Center);
    let inner = draw_overlay_frame(frame, rect, &self.title, Color::Yellow);
    if inner.height == 0 {
      return;
    }

    let (before, after) = self.input.split_at_cursor();
    frame.render_widget(
      Paragraph::new(input_line("> ", before, after, Color::Yellow)),
      inner,
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_prefilled_edit() {
    let mut prompt = TextPrompt::new();
    prompt.show("Edit task", "buy milk");
    prompt.handle_key(key(KeyCode::Char('!')));
    assert_eq!(
      prompt.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(PromptEvent::Submitted("buy milk!".to_string()))
    );
    assert!(!prompt.is_active());
  }

  #[test]
  fn test_cancel_and_swallow() {
    let mut prompt = TextPrompt::new();
    assert_eq!(prompt.handle_key(key(KeyCode::Char('q'))), KeyResult::NotHandled);

    prompt.show("New list", "");
    assert_eq!(prompt.handle_key(key(KeyCode::F(1))), KeyResult::Handled);
    assert_eq!(
      prompt.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(PromptEvent::Cancelled)
    );
  }
}
