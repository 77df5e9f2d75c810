use super::KeyResult;
use crate::ui::renderfns::{draw_overlay_frame, overlay_rect, Anchor};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
  Accepted,
  Declined,
}

/// Yes/no overlay in front of a destructive action
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  message: String,
  active: bool,
}

impl ConfirmDialog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn show(&mut self, message: impl Into<String>) {
    self.message = message.into();
    self.active = true;
  }

  /// `y`/Enter accepts, `n`/Esc declines, anything else is swallowed
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    let event = match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ConfirmEvent::Accepted,
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ConfirmEvent::Declined,
      _ => return KeyResult::Handled,
    };
    self.active = false;
    KeyResult::Event(event)
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (self.message.chars().count() as u16 + 4).clamp(30, 60);
    let rect = overlay_rect(area, width, 6, Anchor::Center);
    let inner = draw_overlay_frame(frame, rect, "Confirm", Color::Red);

    let text = vec![
      Line::from(self.message.as_str()),
      Line::raw(""),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" yes   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" no", Style::default().fg(Color::DarkGray)),
      ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_accept_and_decline() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("Are you sure about deleting this task?");
    assert_eq!(dialog.handle_key(key(KeyCode::Char('x'))), KeyResult::Handled);
    assert!(dialog.is_active());
    assert_eq!(
      dialog.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(ConfirmEvent::Accepted)
    );
    assert!(!dialog.is_active());

    dialog.show("again?");
    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmEvent::Declined)
    );
    assert_eq!(dialog.handle_key(key(KeyCode::Char('y'))), KeyResult::NotHandled);
  }
}
