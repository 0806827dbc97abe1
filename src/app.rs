use crate::catalog::MediaKind;
use crate::commands::CommandAction;
use crate::config::Config;
use crate::event::{Event, EventHandler, TICK_RATE};
use crate::session::Session;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::BrowseView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use tracing::info;

/// Where the root view starts
#[derive(Debug, Clone)]
pub struct StartupOptions {
  pub kind: MediaKind,
  pub query: String,
}

/// One-line message in the status bar
#[derive(Debug, Clone)]
pub struct StatusMessage {
  pub text: String,
  pub is_error: bool,
}

/// Main application state
pub struct App {
  config: Config,
  session: Session,

  /// Navigation stack - the browse view is always at index 0
  view_stack: Vec<Box<dyn View>>,

  command: CommandInput,
  status: Option<StatusMessage>,
  should_quit: bool,
}

impl App {
  /// Must be called from within the runtime; the root view starts fetching immediately.
  pub fn new(config: Config, options: StartupOptions) -> Result<Self> {
    let session = Session::new(&config)?;
    Ok(Self::with_session(config, session, options))
  }

  pub fn with_session(config: Config, session: Session, options: StartupOptions) -> Self {
    let root = BrowseView::new(session.clone(), options.kind, &options.query);
    Self {
      config,
      session,
      view_stack: vec![Box::new(root)],
      command: CommandInput::new(),
      status: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    info!(url = %self.config.catalog.url, "starting");
    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) | Some(Event::Resize) => {}
        None => break,
      }
      self.tick();
    }
    Ok(())
  }

  fn tick(&mut self) {
    for view in &mut self.view_stack {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let capturing = self.current_view().is_some_and(|v| v.captures_input());
    if !capturing || self.command.is_active() {
      match self.command.handle_key(key) {
        KeyResult::Handled => return,
        KeyResult::Event(CommandEvent::Submitted(Some(cmd), _)) => {
          self.status = None;
          self.execute(cmd.action);
          return;
        }
        KeyResult::Event(CommandEvent::Submitted(None, raw)) => {
          self.set_status(format!("Unknown command: {}", raw.trim()), true);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) => return,
        KeyResult::NotHandled => {}
      }
    }

    if !capturing && key.code == KeyCode::Char('q') {
      self.pop_or_quit();
      return;
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        self.status = None;
        self.view_stack.push(view);
      }
      ViewAction::Pop => self.pop_or_quit(),
    }
  }

  fn pop_or_quit(&mut self) {
    if self.view_stack.len() > 1 {
      self.view_stack.pop();
    } else {
      self.should_quit = true;
    }
  }

  fn execute(&mut self, action: CommandAction) {
    match action {
      CommandAction::Quit => self.should_quit = true,
      CommandAction::ClearCache => {
        let prefetch = self.session.prefetch();
        prefetch.cancel();
        let count = self.session.cache().len() + prefetch.store().len();
        self.session.cache().clear();
        prefetch.store().clear();
        self.set_status(format!("Cleared {} cached responses", count), false);
      }
      CommandAction::Mode(_) | CommandAction::Tab(_) => {
        self.view_stack.truncate(1);
        if let Some(root) = self.view_stack.first_mut() {
          root.apply_command(action);
        }
      }
      CommandAction::Refresh => {
        if let Some(view) = self.view_stack.last_mut() {
          view.apply_command(action);
        }
      }
    }
  }

  fn set_status(&mut self, text: String, is_error: bool) {
    self.status = Some(StatusMessage { text, is_error });
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn api_url(&self) -> &str {
    &self.config.catalog.url
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }

  pub fn status(&self) -> Option<&StatusMessage> {
    self.status.as_ref()
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::RequestKey;
  use crate::catalog::CatalogClient;
  use std::sync::Arc;

  fn app() -> App {
    let mut config = Config::default();
    config.catalog.url = "http://127.0.0.1:9/3".to_string();
    let client = CatalogClient::with_token(&config, "token".to_string()).unwrap();
    let session = Session::with_client(&config, client);
    App::with_session(
      config,
      session,
      StartupOptions {
        kind: MediaKind::Movie,
        query: String::new(),
      },
    )
  }

  fn press(app: &mut App, text: &str) {
    for c in text.chars() {
      app.handle_key(KeyEvent::from(KeyCode::Char(c)));
    }
  }

  #[tokio::test]
  async fn test_q_on_root_quits() {
    let mut app = app();
    press(&mut app, "q");
    assert!(app.should_quit());
  }

  #[tokio::test]
  async fn test_quit_command() {
    let mut app = app();
    press(&mut app, ":quit");
    app.handle_key(KeyEvent::from(KeyCode::Enter));
    assert!(app.should_quit());
  }

  #[tokio::test]
  async fn test_unknown_command_sets_error() {
    let mut app = app();
    press(&mut app, ":bogus");
    app.handle_key(KeyEvent::from(KeyCode::Enter));
    assert!(app.status().is_some_and(|s| s.is_error));
    assert!(!app.should_quit());
  }

  #[tokio::test]
  async fn test_clear_cache_command() {
    let mut app = app();
    app.session.cache().set(&RequestKey::entity("movie", 1), Arc::new(1u8));
    press(&mut app, ":clear-cache");
    app.handle_key(KeyEvent::from(KeyCode::Enter));
    assert!(app.session.cache().is_empty());
    assert!(app.status().is_some_and(|s| !s.is_error));
  }

  #[tokio::test]
  async fn test_clear_cache_drops_prefetched_payloads() {
    let mut app = app();
    app.session.prefetch().store().insert(9, Arc::new("stale".to_string()));
    press(&mut app, ":clear-cache");
    app.handle_key(KeyEvent::from(KeyCode::Enter));
    assert!(app.session.prefetch().store().is_empty());

    let mut loader = app.session.loader::<String>();
    loader.load(RequestKey::entity("movie", 9), || async { Ok("fresh".to_string()) });
    assert!(loader.is_loading());
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(loader.poll());
    assert_eq!(loader.data().map(|s| s.as_str()), Some("fresh"));
    assert!(app.session.cache().contains(&RequestKey::entity("movie", 9)));
  }

  #[tokio::test]
  async fn test_q_while_searching_is_text() {
    let mut app = app();
    press(&mut app, "/q");
    assert!(!app.should_quit());
    assert_eq!(app.breadcrumb(), vec!["Movies".to_string()]);
  }
}
