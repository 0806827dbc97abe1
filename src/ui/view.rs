use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::commands::CommandAction;

/// A keyboard shortcut hint for the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
  pub key: &'static str,
  pub label: &'static str,
}

impl Shortcut {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self { key, label }
  }
}

/// Actions a view can request in response to user input
pub enum ViewAction {
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop the current view (go back)
  Pop,
}

/// Behaviour shared by every screen on the view stack.
///
/// Views poll their loaders in `tick()`; the app calls it on every event,
/// before drawing.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Label for this view in the breadcrumb
  fn breadcrumb_label(&self) -> String;

  fn tick(&mut self) {}

  /// True while the view is taking text input, so global keys pass through
  fn captures_input(&self) -> bool {
    false
  }

  /// Apply a `:` command. Returns `false` if the view has no use for it.
  fn apply_command(&mut self, _action: CommandAction) -> bool {
    false
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new(":", "command"), Shortcut::new("q", "back")]
  }
}
