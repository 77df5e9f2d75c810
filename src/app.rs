use color_eyre::{
  eyre::{eyre, Report},
  Result,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::commands::CommandKind;
use crate::event::{Event, EventHandler};
use crate::store::KeyValueStore;
use crate::theme::ThemeController;
use crate::todo::TodoStore;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::ListsView;

const INFO_TTL: Duration = Duration::from_secs(4);
const ERROR_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
  Info,
  Error,
}

/// One-line message in the footer
#[derive(Debug, Clone)]
pub struct StatusMessage {
  pub text: String,
  pub level: StatusLevel,
  shown_at: Instant,
}

impl StatusMessage {
  fn expired(&self, now: Instant) -> bool {
    let ttl = match self.level {
      StatusLevel::Info => INFO_TTL,
      StatusLevel::Error => ERROR_TTL,
    };
    now.duration_since(self.shown_at) >= ttl
  }
}

/// State shared by every view: the lists, the theme and the status line
pub struct Workspace<S: KeyValueStore> {
  pub todos: TodoStore<S>,
  pub theme: ThemeController,
  status: Option<StatusMessage>,
}

impl<S: KeyValueStore> Workspace<S> {
  pub fn new(kv: Arc<S>) -> Self {
    let theme = ThemeController::load(kv.as_ref());
    Self {
      todos: TodoStore::load(kv),
      theme,
      status: None,
    }
  }

  pub fn status(&self) -> Option<&StatusMessage> {
    self.status.as_ref()
  }

  pub fn info(&mut self, text: impl Into<String>) {
    self.set_status(text.into(), StatusLevel::Info);
  }

  pub fn error(&mut self, context: &str, err: &Report) {
    error!(error = %err, "{}", context);
    self.set_status(format!("{}: {}", context, err), StatusLevel::Error);
  }

  /// Unwrap `result`, or show and log the error under `context`
  pub fn report<T>(&mut self, context: &str, result: Result<T>) -> Option<T> {
    match result {
      Ok(value) => Some(value),
      Err(e) => {
        self.error(context, &e);
        None
      }
    }
  }

  pub fn toggle_theme(&mut self) {
    let result = self.theme.toggle(&mut self.todos);
    if self.report("Failed to save theme", result).is_some() {
      let label = if self.theme.is_dark() { "dark" } else { "light" };
      self.info(format!("Switched to {} theme", label));
    }
  }

  fn set_status(&mut self, text: String, level: StatusLevel) {
    self.status = Some(StatusMessage {
      text,
      level,
      shown_at: Instant::now(),
    });
  }

  fn expire_status(&mut self, now: Instant) {
    if self.status.as_ref().is_some_and(|s| s.expired(now)) {
      self.status = None;
    }
  }
}

/// Main application state
pub struct App<S: KeyValueStore + 'static> {
  workspace: Workspace<S>,
  view: Box<dyn View<S>>,
  command: CommandInput,
  tick_rate: Duration,
  should_quit: bool,
}

impl<S: KeyValueStore + 'static> App<S> {
  pub fn new(kv: Arc<S>, tick_rate: Duration) -> Self {
    Self {
      workspace: Workspace::new(kv),
      view: Box::new(ListsView::new()),
      command: CommandInput::new(),
      tick_rate,
      should_quit: false,
    }
  }

  pub fn workspace(&self) -> &Workspace<S> {
    &self.workspace
  }

  pub fn workspace_mut(&mut self) -> &mut Workspace<S> {
    &mut self.workspace
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode().map_err(|e| eyre!("Failed to enable raw mode: {}", e))?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(self.tick_rate);
    info!(lists = self.workspace.todos.categories().len(), "ui started");

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("ui stopped");
    Ok(())
  }

  pub fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize(..) => {}
      Event::Tick => {
        self.workspace.expire_status(Instant::now());
        self.view.tick(&mut self.workspace);
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if !self.view.captures_input() {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Run(cmd)) => {
          self.run_command(cmd.kind);
          return;
        }
        KeyResult::Event(CommandEvent::Unknown(input)) => {
          if !input.is_empty() {
            self
              .workspace
              .set_status(format!("Unknown command: {}", input), StatusLevel::Error);
          }
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = self.view.handle_key(key, &mut self.workspace);
    self.apply(action);
  }

  fn run_command(&mut self, command: CommandKind) {
    match command {
      CommandKind::Quit => self.should_quit = true,
      CommandKind::Theme => self.workspace.toggle_theme(),
      CommandKind::Lists | CommandKind::AddList => {
        let action = self.view.run_command(command, &mut self.workspace);
        self.apply(action);
      }
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Quit => self.should_quit = true,
    }
  }

  pub fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    draw_header(
      frame,
      chunks[0],
      self.workspace.theme.mode(),
      self.workspace.todos.categories().len(),
      &self.view.shortcuts(),
    );

    self.view.render(frame, chunks[1], &self.workspace);
    self.command.render_overlay(frame, chunks[1]);

    draw_footer(
      frame,
      chunks[2],
      &self.view.location(&self.workspace),
      self.workspace.status(),
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryKvStore;
  use crate::ui::views::EMPTY_LIST_TEXT;
  use ratatui::backend::TestBackend;

  fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
  }

  fn command(app: &mut App<MemoryKvStore>, name: &str) {
    app.handle_event(key(KeyCode::Char(':')));
    for c in name.chars() {
      app.handle_event(key(KeyCode::Char(c)));
    }
    app.handle_event(key(KeyCode::Enter));
  }

  fn screen(app: &mut App<MemoryKvStore>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer
      .content()
      .chunks(buffer.area.width as usize)
      .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  fn app() -> App<MemoryKvStore> {
    App::new(Arc::new(MemoryKvStore::new()), Duration::from_millis(250))
  }

  #[test]
  fn test_renders_default_lists() {
    let mut app = app();
    let screen = screen(&mut app);
    assert!(screen.contains("todolists"));
    assert!(screen.contains("2 lists"));
    assert!(screen.contains("Personal"));
    assert!(screen.contains("Work"));
    assert!(screen.contains(EMPTY_LIST_TEXT));
  }

  #[test]
  fn test_theme_command_persists() {
    let mut app = app();
    command(&mut app, "theme");
    assert!(app.workspace().theme.is_dark());
    assert!(screen(&mut app).contains("dark"));

    let kv = Arc::clone(app.workspace().todos.kv());
    assert_eq!(ThemeController::load(kv.as_ref()).mode(), app.workspace().theme.mode());
  }

  #[test]
  fn test_quit_command_and_key() {
    let mut app = app();
    command(&mut app, "q");
    assert!(app.should_quit());

    let mut app = self::app();
    app.handle_event(key(KeyCode::Char('q')));
    assert!(app.should_quit());
  }

  #[test]
  fn test_unknown_command_shows_error() {
    let mut app = app();
    command(&mut app, "zzz");
    let status = app.workspace().status().unwrap();
    assert_eq!(status.level, StatusLevel::Error);
    assert_eq!(status.text, "Unknown command: zzz");
  }

  #[test]
  fn test_colon_inside_prompt_is_text() {
    let mut app = app();
    command(&mut app, "add-list");
    for c in "Work: Q3".chars() {
      app.handle_event(key(KeyCode::Char(c)));
    }
    app.handle_event(key(KeyCode::Enter));

    let titles: Vec<String> = app
      .workspace()
      .todos
      .categories()
      .iter()
      .map(|c| c.title.clone())
      .collect();
    assert_eq!(titles, vec!["Personal", "Work", "Work: Q3"]);
  }

  #[test]
  fn test_status_expires() {
    let mut app = app();
    app.workspace.info("saved");
    let shown = app.workspace.status().unwrap().shown_at;

    app.workspace.expire_status(shown + Duration::from_secs(1));
    assert!(app.workspace.status().is_some());
    app.workspace.expire_status(shown + INFO_TTL);
    assert!(app.workspace.status().is_none());
  }
}
