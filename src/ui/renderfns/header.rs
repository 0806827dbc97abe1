use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::view::Shortcut;

/// Header bar: name, API host, breadcrumb and the active view's shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  api_url: &str,
  breadcrumb: &[String],
  shortcuts: &[Shortcut],
) {
  let separator = || Span::styled("│", Style::default().fg(Color::DarkGray));

  let mut spans = vec![
    Span::styled(" cinedex ", Style::default().fg(Color::Cyan).bold()),
    separator(),
    Span::styled(format!(" {} ", host(api_url)), Style::default().fg(Color::White)),
    separator(),
    Span::styled(
      format!(" {} ", breadcrumb.join(" › ")),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::raw(" "),
  ];

  for shortcut in shortcuts {
    spans.push(Span::styled(
      format!(" <{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host part of a URL, falling back to the input
fn host(url: &str) -> String {
  url::Url::parse(url)
    .ok()
    .and_then(|u| u.host_str().map(str::to_string))
    .unwrap_or_else(|| url.to_string())
}
