use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::app::Workspace;
use crate::commands::CommandKind;
use crate::store::KeyValueStore;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  None,
  Quit,
}

/// Trait for view behavior
///
/// Views own their overlays (prompts, pickers, dialogs) and mutate the
/// shared [`Workspace`]. App → View → Components.
pub trait View<S: KeyValueStore> {
  fn handle_key(&mut self, key: KeyEvent, workspace: &mut Workspace<S>) -> ViewAction;

  /// Run a `:` command the app does not handle itself
  fn run_command(&mut self, _command: CommandKind, _workspace: &mut Workspace<S>) -> ViewAction {
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, workspace: &Workspace<S>);

  /// Breadcrumb shown in the footer
  fn location(&self, workspace: &Workspace<S>) -> Vec<String>;

  /// True while an overlay owns the keyboard; the app then forwards every key
  fn captures_input(&self) -> bool {
    false
  }

  /// Called on each tick
  fn tick(&mut self, _workspace: &mut Workspace<S>) {}

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
