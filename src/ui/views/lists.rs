use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::collections::HashMap;

use crate::app::Workspace;
use crate::commands::CommandKind;
use crate::store::KeyValueStore;
use crate::todo::{Category, Task, TaskId, DELETE_TASK_PROMPT};
use crate::ui::components::{
  ColorPicker, ColorPickerEvent, ConfirmDialog, ConfirmEvent, FilterEvent, FilterInput, KeyResult,
  PromptEvent, TextPrompt,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{css_color, text_on, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

pub const EMPTY_LIST_TEXT: &str = "no item to show";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
  Lists,
  Tasks,
}

/// What the open text prompt will do on submit
#[derive(Debug, Clone, PartialEq)]
enum PromptTarget {
  NewList,
  NewTask { storage_key: String },
  EditTask { storage_key: String, id: TaskId },
}

/// What the open confirmation will delete
#[derive(Debug, Clone, PartialEq)]
enum DeleteTarget {
  List { id: String },
  Task { storage_key: String, id: TaskId },
}

/// Display colors per storage key for one theme version
#[derive(Debug, Default)]
struct DisplayColors {
  version: Option<u64>,
  colors: HashMap<String, String>,
}

/// Categories on the left, the selected category's tasks on the right
pub struct ListsView {
  focus: Pane,
  lists: ListState,
  tasks: ListState,
  filter: FilterInput,
  prompt: TextPrompt,
  prompt_target: Option<PromptTarget>,
  confirm: ConfirmDialog,
  delete_target: Option<DeleteTarget>,
  color_picker: ColorPicker,
  color_target: Option<String>,
  display: DisplayColors,
}

impl Default for ListsView {
  fn default() -> Self {
    Self::new()
  }
}

impl ListsView {
  pub fn new() -> Self {
    Self {
      focus: Pane::Lists,
      lists: ListState::default().with_selected(Some(0)),
      tasks: ListState::default(),
      filter: FilterInput::new(),
      prompt: TextPrompt::new(),
      prompt_target: None,
      confirm: ConfirmDialog::new(),
      delete_target: None,
      color_picker: ColorPicker::new(),
      color_target: None,
      display: DisplayColors::default(),
    }
  }

  pub fn focus(&self) -> Pane {
    self.focus
  }

  fn selected_category<'a, S: KeyValueStore>(&self, ws: &'a Workspace<S>) -> Option<&'a Category> {
    ws.todos.categories().get(self.lists.selected()?)
  }

  /// Tasks of the selected category that pass the filter
  fn visible_tasks<'a, S: KeyValueStore>(&self, ws: &'a Workspace<S>) -> Vec<&'a Task> {
    match self.selected_category(ws) {
      Some(category) => ws
        .todos
        .tasks(&category.storage_key)
        .iter()
        .filter(|t| self.filter.matches(&t.text))
        .collect(),
      None => Vec::new(),
    }
  }

  /// Storage key and id of the highlighted task
  fn selected_task<S: KeyValueStore>(&self, ws: &Workspace<S>) -> Option<(String, TaskId)> {
    let category = self.selected_category(ws)?;
    let task = self.visible_tasks(ws).get(self.tasks.selected()?).copied()?;
    Some((category.storage_key.clone(), task.id))
  }

  /// Recompute display colors when the theme moved or a color changed
  fn refresh_colors<S: KeyValueStore>(&mut self, ws: &Workspace<S>) {
    if self.display.version == Some(ws.theme.version()) {
      return;
    }
    self.display.colors = ws
      .todos
      .categories()
      .iter()
      .map(|c| {
        let color = ws.theme.display_color(ws.todos.color(&c.storage_key));
        (c.storage_key.clone(), color)
      })
      .collect();
    self.display.version = Some(ws.theme.version());
  }

  fn display_color(&self, storage_key: &str) -> &str {
    self
      .display
      .colors
      .get(storage_key)
      .map(String::as_str)
      .unwrap_or(crate::todo::DEFAULT_COLOR)
  }

  fn invalidate_colors(&mut self) {
    self.display.version = None;
  }

  fn move_selection<S: KeyValueStore>(&mut self, ws: &Workspace<S>, down: bool) {
    let (state, len) = match self.focus {
      Pane::Lists => (&mut self.lists, ws.todos.categories().len()),
      Pane::Tasks => {
        let len = self.visible_tasks(ws).len();
        (&mut self.tasks, len)
      }
    };
    if len == 0 {
      return;
    }
    let current = state.selected().unwrap_or(0);
    let next = if down {
      (current + 1) % len
    } else {
      (current + len - 1) % len
    };
    state.select(Some(next));

    if self.focus == Pane::Lists {
      self.tasks.select(Some(0));
    }
  }

  fn switch_pane(&mut self, pane: Pane) {
    self.focus = pane;
    if pane == Pane::Tasks && self.tasks.selected().is_none() {
      self.tasks.select(Some(0));
    }
  }

  fn open_new_list_prompt(&mut self) {
    self.prompt.show("New list", "");
    self.prompt_target = Some(PromptTarget::NewList);
  }

  fn open_add_prompt<S: KeyValueStore>(&mut self, ws: &Workspace<S>) {
    match (self.focus, self.selected_category(ws)) {
      (Pane::Tasks, Some(category)) => {
        self.prompt.show(format!("New task in {}", category.title), "");
        self.prompt_target = Some(PromptTarget::NewTask {
          storage_key: category.storage_key.clone(),
        });
      }
      _ => self.open_new_list_prompt(),
    }
  }

  fn open_edit_prompt<S: KeyValueStore>(&mut self, ws: &Workspace<S>) {
    let Some((storage_key, id)) = self.selected_task(ws) else {
      return;
    };
    let Some(task) = ws.todos.task(&storage_key, id) else {
      return;
    };
    self.prompt.show("Edit task", &task.text);
    self.prompt_target = Some(PromptTarget::EditTask { storage_key, id });
  }

  fn open_delete_confirm<S: KeyValueStore>(&mut self, ws: &Workspace<S>) {
    match self.focus {
      Pane::Lists => {
        let Some(category) = self.selected_category(ws) else {
          return;
        };
        if let Some(prompt) = ws.todos.category_delete_prompt(&category.id) {
          self.confirm.show(prompt);
          self.delete_target = Some(DeleteTarget::List {
            id: category.id.clone(),
          });
        }
      }
      Pane::Tasks => {
        if let Some((storage_key, id)) = self.selected_task(ws) {
          self.confirm.show(DELETE_TASK_PROMPT);
          self.delete_target = Some(DeleteTarget::Task { storage_key, id });
        }
      }
    }
  }

  fn open_color_picker<S: KeyValueStore>(&mut self, ws: &Workspace<S>) {
    if let Some(category) = self.selected_category(ws) {
      let current = ws.todos.color(&category.storage_key);
      self
        .color_picker
        .show(format!("Color of {}", category.title), current);
      self.color_target = Some(category.storage_key.clone());
    }
  }

  fn toggle_selected<S: KeyValueStore>(&mut self, ws: &mut Workspace<S>) {
    if let Some((storage_key, id)) = self.selected_task(ws) {
      let result = ws.todos.toggle_task(&storage_key, id);
      ws.report("Failed to save task", result);
    }
  }

  fn submit_prompt<S: KeyValueStore>(&mut self, value: String, ws: &mut Workspace<S>) {
    let Some(target) = self.prompt_target.take() else {
      return;
    };

    match target {
      PromptTarget::NewList => {
        let result = ws.todos.add_category(&value);
        if let Some(Some(category)) = ws.report("Failed to save lists", result) {
          let index = ws.todos.categories().len() - 1;
          self.lists.select(Some(index));
          self.tasks.select(Some(0));
          self.invalidate_colors();
          ws.info(format!("Added list {}", category.title));
        }
      }
      PromptTarget::NewTask { storage_key } => {
        let result = ws.todos.add_task(&storage_key, &value);
        if let Some(Some(_)) = ws.report("Failed to save task", result) {
          self.filter.clear();
          let last = ws.todos.tasks(&storage_key).len().saturating_sub(1);
          self.tasks.select(Some(last));
        }
      }
      PromptTarget::EditTask { storage_key, id } => {
        let result = ws.todos.edit_task(&storage_key, id, &value);
        ws.report("Failed to save task", result);
      }
    }
  }

  fn confirm_delete<S: KeyValueStore>(&mut self, ws: &mut Workspace<S>) {
    let Some(target) = self.delete_target.take() else {
      return;
    };
    // The dialog already asked
    let mut approve = |_: &str| true;

    match target {
      DeleteTarget::List { id } => {
        let result = ws.todos.remove_category(&id, &mut approve);
        if let Some(removal) = ws.report("Failed to delete list", result) {
          if removal.is_removed() {
            self.tasks.select(Some(0));
            self.invalidate_colors();
          }
        }
      }
      DeleteTarget::Task { storage_key, id } => {
        let result = ws.todos.remove_task(&storage_key, id, &mut approve);
        ws.report("Failed to delete task", result);
      }
    }
  }

  fn apply_color<S: KeyValueStore>(&mut self, color: String, ws: &mut Workspace<S>) {
    if let Some(storage_key) = self.color_target.take() {
      let result = ws.todos.set_color(&storage_key, &color);
      ws.report("Failed to save color", result);
      self.invalidate_colors();
    }
  }

  /// Give the open overlay (if any) the key. Returns whether it was consumed.
  fn handle_overlay_key<S: KeyValueStore>(&mut self, key: KeyEvent, ws: &mut Workspace<S>) -> bool {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Accepted) => {
        self.confirm_delete(ws);
        return true;
      }
      KeyResult::Event(ConfirmEvent::Declined) => {
        self.delete_target = None;
        return true;
      }
      KeyResult::Handled => return true,
      KeyResult::NotHandled => {}
    }

    match self.prompt.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(value)) => {
        self.submit_prompt(value, ws);
        return true;
      }
      KeyResult::Event(PromptEvent::Cancelled) => {
        self.prompt_target = None;
        return true;
      }
      KeyResult::Handled => return true,
      KeyResult::NotHandled => {}
    }

    match self.color_picker.handle_key(key) {
      KeyResult::Event(ColorPickerEvent::Selected(color)) => {
        self.apply_color(color, ws);
        return true;
      }
      KeyResult::Event(ColorPickerEvent::Cancelled) => {
        self.color_target = None;
        return true;
      }
      KeyResult::Handled => return true,
      KeyResult::NotHandled => {}
    }

    match self.filter.handle_key(key) {
      KeyResult::Event(FilterEvent::Changed(_)) => {
        self.focus = Pane::Tasks;
        self.tasks.select(Some(0));
        true
      }
      KeyResult::Event(FilterEvent::Submitted) | KeyResult::Handled => true,
      KeyResult::NotHandled => false,
    }
  }

  fn render_lists<S: KeyValueStore>(&mut self, frame: &mut Frame, area: Rect, ws: &Workspace<S>) {
    let categories = ws.todos.categories();
    ensure_valid_selection(&mut self.lists, categories.len());

    let block = Block::default()
      .title(format!(" Lists ({}) ", categories.len()))
      .borders(Borders::ALL)
      .border_style(pane_border(self.focus == Pane::Lists));

    if categories.is_empty() {
      let paragraph = Paragraph::new(EMPTY_LIST_TEXT)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let name_width = area.width.saturating_sub(14) as usize;
    let items: Vec<ListItem> = categories
      .iter()
      .map(|category| {
        let tasks = ws.todos.tasks(&category.storage_key);
        let done = tasks.iter().filter(|t| t.done).count();
        let color = self.display_color(&category.storage_key);

        ListItem::new(Line::from(vec![
          Span::styled("  ", Style::default().bg(css_color(color))),
          Span::raw(" "),
          Span::raw(truncate(&category.title, name_width)),
          Span::styled(
            format!(" {}/{}", done, tasks.len()),
            Style::default().fg(Color::DarkGray),
          ),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(highlight(self.focus == Pane::Lists))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.lists);
  }

  fn render_tasks<S: KeyValueStore>(&mut self, frame: &mut Frame, area: Rect, ws: &Workspace<S>) {
    let Some(category) = self.selected_category(ws) else {
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_border(false));
      frame.render_widget(Paragraph::new(EMPTY_LIST_TEXT).block(block), area);
      return;
    };

    let color = self.display_color(&category.storage_key).to_string();
    let mut title = format!(" {} ", category.title);
    if !self.filter.query().is_empty() {
      title.push_str(&format!("[/{}] ", self.filter.query()));
    }

    let focused = self.focus == Pane::Tasks;
    let block = Block::default()
      .title(Span::styled(
        title,
        Style::default().fg(text_on(&color)).bg(css_color(&color)).bold(),
      ))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(css_color(&color)))
      .border_type(if focused {
        ratatui::widgets::BorderType::Thick
      } else {
        ratatui::widgets::BorderType::Plain
      });

    let tasks = self.visible_tasks(ws);
    ensure_valid_selection(&mut self.tasks, tasks.len());

    if tasks.is_empty() {
      let paragraph = Paragraph::new(EMPTY_LIST_TEXT)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let text_width = area.width.saturating_sub(10) as usize;
    let items: Vec<ListItem> = tasks
      .iter()
      .map(|task| {
        let (mark, style) = if task.done {
          (
            "[x] ",
            Style::default()
              .fg(Color::DarkGray)
              .add_modifier(Modifier::CROSSED_OUT),
          )
        } else {
          ("[ ] ", Style::default())
        };
        ListItem::new(Line::from(vec![
          Span::styled(mark, Style::default().fg(Color::Cyan)),
          Span::styled(truncate(&task.text, text_width), style),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(highlight(focused))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.tasks);
  }
}

fn pane_border(focused: bool) -> Style {
  if focused {
    Style::default().fg(Color::Blue)
  } else {
    Style::default().fg(Color::DarkGray)
  }
}

fn highlight(focused: bool) -> Style {
  if focused {
    Style::default()
      .bg(Color::DarkGray)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().add_modifier(Modifier::BOLD)
  }
}

impl<S: KeyValueStore> View<S> for ListsView {
  fn handle_key(&mut self, key: KeyEvent, ws: &mut Workspace<S>) -> ViewAction {
    if self.handle_overlay_key(key, ws) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(ws, true),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(ws, false),
      KeyCode::Tab | KeyCode::BackTab => {
        let next = match self.focus {
          Pane::Lists => Pane::Tasks,
          Pane::Tasks => Pane::Lists,
        };
        self.switch_pane(next);
      }
      KeyCode::Char('h') | KeyCode::Left => self.switch_pane(Pane::Lists),
      KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => self.switch_pane(Pane::Tasks),
      KeyCode::Char('a') => self.open_add_prompt(ws),
      KeyCode::Char('e') if self.focus == Pane::Tasks => self.open_edit_prompt(ws),
      KeyCode::Char(' ') | KeyCode::Char('x') if self.focus == Pane::Tasks => {
        self.toggle_selected(ws)
      }
      KeyCode::Char('d') => self.open_delete_confirm(ws),
      KeyCode::Char('c') => self.open_color_picker(ws),
      KeyCode::Char('t') => ws.toggle_theme(),
      KeyCode::Esc => self.filter.clear(),
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn run_command(&mut self, command: CommandKind, _ws: &mut Workspace<S>) -> ViewAction {
    match command {
      CommandKind::Lists => {
        self.filter.clear();
        self.switch_pane(Pane::Lists);
      }
      CommandKind::AddList => self.open_new_list_prompt(),
      CommandKind::Theme | CommandKind::Quit => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, ws: &Workspace<S>) {
    self.refresh_colors(ws);

    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
      .split(area);

    self.render_lists(frame, chunks[0], ws);
    self.render_tasks(frame, chunks[1], ws);

    self.filter.render_overlay(frame, chunks[1]);
    self.color_picker.render_overlay(frame, area, ws.theme.is_dark());
    self.prompt.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn location(&self, ws: &Workspace<S>) -> Vec<String> {
    let mut parts = vec!["Lists".to_string()];
    if let Some(category) = self.selected_category(ws) {
      parts.push(category.title.clone());
    }
    parts
  }

  fn captures_input(&self) -> bool {
    self.confirm.is_active()
      || self.prompt.is_active()
      || self.color_picker.is_active()
      || self.filter.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("a", "add").with_priority(20),
      ShortcutInfo::new("d", "delete").with_priority(40),
      ShortcutInfo::new("c", "color").with_priority(50),
      ShortcutInfo::new("t", "theme").with_priority(60),
      ShortcutInfo::new("/", "filter").with_priority(70),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ];
    if self.focus == Pane::Tasks {
      shortcuts.push(ShortcutInfo::new("space", "done").with_priority(25));
      shortcuts.push(ShortcutInfo::new("e", "edit").with_priority(30));
    }
    shortcuts
  }
}
