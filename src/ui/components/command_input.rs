use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Resolved command; `None` when the input matched nothing
  Submitted(Option<&'static Command>, String),
  Cancelled,
}

/// `:` command line with autocomplete, drawn in the status bar
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.active = true;
        self.input.clear();
        self.selected = 0;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.cycle(1);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.cycle(-1);
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(raw) => {
        self.active = false;
        let resolved = self.resolve();
        self.input.clear();
        KeyResult::Event(CommandEvent::Submitted(resolved, raw))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(CommandEvent::Cancelled)
      }
      InputResult::Consumed => {
        self.selected = 0;
        KeyResult::Handled
      }
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  fn cycle(&mut self, step: isize) {
    let count = self.suggestions().len();
    if count > 0 {
      self.selected = (self.selected as isize + step).rem_euclid(count as isize) as usize;
    }
  }

  /// Exact name or alias first, then the highlighted suggestion
  fn resolve(&self) -> Option<&'static Command> {
    commands::find(self.input.value()).or_else(|| self.suggestions().get(self.selected).copied())
  }

  /// Render the command line and inline suggestions into one row
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
      Span::styled(":", Style::default().fg(Color::Yellow)),
      Span::raw(self.input.value().to_string()),
      Span::styled("_  ", Style::default().fg(Color::Yellow)),
    ];
    for (i, cmd) in self.suggestions().iter().take(6).enumerate() {
      let style = if i == self.selected {
        Style::default().fg(Color::Black).bg(Color::Cyan)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      spans.push(Span::styled(format!(" {} ", cmd.name), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::ListKind;
  use crate::commands::CommandAction;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn submit(input: &mut CommandInput, text: &str) -> KeyResult<CommandEvent> {
    input.handle_key(key(KeyCode::Char(':')));
    for c in text.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
    input.handle_key(key(KeyCode::Enter))
  }

  #[test]
  fn test_prefix_resolves_to_best_suggestion() {
    let mut input = CommandInput::new();
    match submit(&mut input, "tre") {
      KeyResult::Event(CommandEvent::Submitted(Some(cmd), _)) => {
        assert_eq!(cmd.action, CommandAction::Tab(ListKind::Trending))
      }
      other => panic!("unexpected {:?}", other),
    }
    assert!(!input.is_active());
  }

  #[test]
  fn test_tab_cycles_selection() {
    let mut input = CommandInput::new();
    input.handle_key(key(KeyCode::Char(':')));
    input.handle_key(key(KeyCode::Tab));
    match input.handle_key(key(KeyCode::Enter)) {
      KeyResult::Event(CommandEvent::Submitted(Some(cmd), _)) => {
        assert_eq!(cmd.name, commands::COMMANDS[1].name)
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn test_unknown_command() {
    let mut input = CommandInput::new();
    assert_eq!(
      submit(&mut input, "zzz"),
      KeyResult::Event(CommandEvent::Submitted(None, "zzz".to_string()))
    );
  }
}
