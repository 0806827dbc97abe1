pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{ListState, Paragraph};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let breadcrumb = app.breadcrumb();
  let shortcuts = app.current_view().map(|v| v.shortcuts()).unwrap_or_default();
  renderfns::draw_header(frame, chunks[0], app.api_url(), &breadcrumb, &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  draw_status_bar(frame, chunks[2], app);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  if app.command().is_active() {
    app.command().render(frame, area);
    return;
  }

  let (content, style) = match app.status() {
    Some(status) if status.is_error => (status.text.clone(), Style::default().fg(Color::Red)),
    Some(status) => (status.text.clone(), Style::default().fg(Color::Green)),
    None => (
      " j/k:nav  Enter:open  /:search  ::command  q:back  Ctrl-C:quit".to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  };
  frame.render_widget(Paragraph::new(content).style(style), area);
}

/// Clamp a list selection to `len` items, selecting the first when unset
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
