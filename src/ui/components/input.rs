use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in a text input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Buffer or cursor may have changed
  Consumed,
  Submitted(String),
  Cancelled,
  NotHandled,
}

/// Single-line text input.
///
/// The cursor counts characters, not bytes, so multi-byte titles edit safely.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_value(value: &str) -> Self {
    Self {
      buffer: value.to_string(),
      cursor: value.chars().count(),
    }
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  /// Cursor position in characters
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => return InputResult::Cancelled,
      KeyCode::Enter => return InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace if self.cursor > 0 => {
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.buffer.remove(at);
      }
      KeyCode::Delete if self.cursor < self.len() => {
        let at = self.byte_index(self.cursor);
        self.buffer.remove(at);
      }
      KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
      KeyCode::Home => self.cursor = 0,
      KeyCode::End => self.cursor = self.len(),
      KeyCode::Char('a') if ctrl => self.cursor = 0,
      KeyCode::Char('e') if ctrl => self.cursor = self.len(),
      KeyCode::Char('u') if ctrl => {
        let at = self.byte_index(self.cursor);
        self.buffer.replace_range(..at, "");
        self.cursor = 0;
      }
      KeyCode::Char('w') if ctrl => self.delete_word(),
      KeyCode::Char(_) if ctrl => return InputResult::NotHandled,
      KeyCode::Char(c) => {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
      }
      KeyCode::Backspace | KeyCode::Delete => {}
      _ => return InputResult::NotHandled,
    }
    InputResult::Consumed
  }

  fn len(&self) -> usize {
    self.buffer.chars().count()
  }

  fn byte_index(&self, chars: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(chars)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  /// Delete the word before the cursor, along with trailing spaces
  fn delete_word(&mut self) {
    let end = self.byte_index(self.cursor);
    let before = self.buffer[..end].trim_end();
    let start = before.rfind(' ').map(|i| i + 1).unwrap_or(0);
    let removed = self.buffer[start..end].chars().count();
    self.buffer.replace_range(start..end, "");
    self.cursor -= removed;
  }
}
