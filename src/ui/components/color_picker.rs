use super::KeyResult;
use crate::theme::{self, PaletteEntry, LIGHT_PALETTE};
use crate::ui::renderfns::{css_color, draw_overlay_frame, overlay_rect, Anchor};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorPickerEvent {
  /// Chosen color in canonical (light palette) form
  Selected(String),
  Cancelled,
}

/// Palette overlay for a list's color. Swatches follow the active theme.
#[derive(Debug, Clone, Default)]
pub struct ColorPicker {
  active: bool,
  selected: usize,
  title: String,
}

impl ColorPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  /// Open with the entry matching `current` highlighted (first entry if none does)
  pub fn show(&mut self, title: impl Into<String>, current: &str) {
    let current = theme::canonical(current);
    self.selected = LIGHT_PALETTE
      .iter()
      .position(|e| e.value == current)
      .unwrap_or(0);
    self.title = title.into();
    self.active = true;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.selected = 0;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ColorPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    let count = LIGHT_PALETTE.len();
    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(ColorPickerEvent::Cancelled)
      }
      KeyCode::Enter | KeyCode::Char(' ') => {
        let value = LIGHT_PALETTE[self.selected].value.to_string();
        self.hide();
        KeyResult::Event(ColorPickerEvent::Selected(value))
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.selected = (self.selected + 1) % count;
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.selected = (self.selected + count - 1) % count;
        KeyResult::Handled
      }
      KeyCode::Char(c @ '1'..='8') => {
        self.selected = (c as usize) - ('1' as usize);
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, dark: bool) {
    if !self.active {
      return;
    }

    let entries: &[PaletteEntry] = theme::palette(dark);
    let width = (self.title.chars().count() as u16 + 6).max(24);
    let rect = overlay_rect(area, width, entries.len() as u16 + 2, Anchor::Center);
    let inner = draw_overlay_frame(frame, rect, &self.title, Color::Yellow);
    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = entries
      .iter()
      .enumerate()
      .map(|(i, entry)| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
          Span::styled("    ", Style::default().bg(css_color(entry.value))),
          Span::raw(" "),
          Span::styled(entry.name, Style::default().fg(Color::Cyan)),
        ]))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default().with_selected(Some(self.selected));
    frame.render_stateful_widget(list, inner, &mut state);
  }
}
