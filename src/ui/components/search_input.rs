use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by the search bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Text changed (every keystroke; empty string when cleared)
  Changed(String),
  /// Enter pressed; search text stays in place
  Submitted(String),
}

/// Search bar that stays visible and keeps its text after editing ends
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_query(query: &str) -> Self {
    Self {
      input: TextInput::with_value(query),
      active: false,
    }
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Handle a key event. `/` starts editing; Esc clears the search.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.active = true;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(query) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted(query))
      }
      InputResult::Cancelled => {
        self.active = false;
        let had_text = !self.input.is_empty();
        self.input.clear();
        if had_text {
          KeyResult::Event(SearchEvent::Changed(String::new()))
        } else {
          KeyResult::Handled
        }
      }
      InputResult::Consumed => KeyResult::Event(SearchEvent::Changed(self.input.value().to_string())),
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Render as a single line; `pending` marks text not yet applied.
  pub fn render(&self, frame: &mut Frame, area: Rect, pending: bool) {
    let accent = if self.active { Color::Yellow } else { Color::DarkGray };
    let mut spans = vec![Span::styled(" / ", Style::default().fg(accent))];

    if self.input.is_empty() && !self.active {
      spans.push(Span::styled(
        "type / to search",
        Style::default().fg(Color::DarkGray),
      ));
    } else {
      spans.push(Span::raw(self.input.value().to_string()));
    }
    if self.active {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    if pending {
      spans.push(Span::styled("  …", Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
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
  fn test_inactive_ignores_text() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_typing_emits_changes() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert_eq!(
      search.handle_key(key(KeyCode::Char('a'))),
      KeyResult::Event(SearchEvent::Changed("a".to_string()))
    );
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted("a".to_string()))
    );
    assert!(!search.is_active());
    assert_eq!(search.query(), "a");
  }

  #[test]
  fn test_escape_clears() {
    let mut search = SearchInput::with_query("alien");
    search.handle_key(key(KeyCode::Char('/')));
    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Changed(String::new()))
    );
    assert_eq!(search.query(), "");
  }
}
