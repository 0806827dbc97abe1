use ratatui::prelude::Color;

/// Truncate to at most `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    return s.to_string();
  }
  let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
  format!("{}...", kept)
}

/// Display color for an average vote on the 0-10 scale
pub fn rating_color(vote: Option<f64>) -> Color {
  match vote {
    Some(v) if v >= 7.5 => Color::Green,
    Some(v) if v >= 6.0 => Color::Yellow,
    Some(v) if v > 0.0 => Color::Red,
    _ => Color::DarkGray,
  }
}

/// "7.8" or "-" for unrated
pub fn format_rating(vote: Option<f64>) -> String {
  match vote {
    Some(v) if v > 0.0 => format!("{:.1}", v),
    _ => "-".to_string(),
  }
}

/// "2h 15m" from minutes
pub fn format_runtime(minutes: u32) -> String {
  match (minutes / 60, minutes % 60) {
    (0, m) => format!("{}m", m),
    (h, 0) => format!("{}h", h),
    (h, m) => format!("{}h {}m", h, m),
  }
}
