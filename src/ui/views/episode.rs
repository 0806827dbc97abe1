use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::catalog::{CastMember, CatalogQuery, EpisodeDetails, MediaKind};
use crate::commands::CommandAction;
use crate::loader::{LoadState, ResourceLoader};
use crate::session::Session;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_runtime, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::detail::{fact_line, placeholder, title_lines};
use crate::ui::views::DetailView;

/// A single episode with its guest stars
pub struct EpisodeView {
  session: Session,
  tv_id: u64,
  season: u32,
  episode: u32,
  label: String,
  loader: ResourceLoader<EpisodeDetails>,
  guests_state: ListState,
}

impl EpisodeView {
  pub fn new(session: Session, tv_id: u64, season: u32, episode: u32, label: &str) -> Self {
    let mut view = Self {
      loader: session.loader(),
      session,
      tv_id,
      season,
      episode,
      label: label.to_string(),
      guests_state: ListState::default(),
    };
    view.load();
    view
  }

  fn load(&mut self) {
    let (tv_id, season, episode) = (self.tv_id, self.season, self.episode);
    let key = CatalogQuery::Episode {
      tv_id,
      season,
      episode,
    }
    .request_key();
    let catalog = self.session.catalog().clone();
    self.loader.load(key, move || {
      let catalog = catalog.clone();
      async move {
        catalog
          .episode(tv_id, season, episode)
          .await
          .map_err(|e| e.to_string())
      }
    });
  }

  fn guests(&self) -> &[CastMember] {
    self
      .loader
      .data()
      .map(|episode| episode.guest_stars.as_slice())
      .unwrap_or_default()
  }

  fn info_lines(&self) -> Result<Vec<Line<'static>>, String> {
    let episode = match self.loader.state() {
      LoadState::Ready(episode) => episode,
      state => return placeholder(state),
    };

    let mut lines = title_lines(&episode.name, None, episode.vote_average);
    let mut facts = vec![format!(
      "Season {} · Episode {}",
      episode.season_number, episode.episode_number
    )];
    if let Some(date) = &episode.air_date {
      facts.push(date.clone());
    }
    if let Some(runtime) = episode.runtime {
      facts.push(format_runtime(runtime));
    }
    lines.push(fact_line(&facts.join(" · ")));
    if !episode.directors.is_empty() {
      lines.push(fact_line(&format!("Directed by {}", episode.directors.join(", "))));
    }
    lines.push(Line::raw(""));
    lines.push(Line::raw(episode.overview.clone()));
    lines.push(Line::raw(""));
    lines.push(fact_line(&self.session.images().still(episode.still_path.as_deref())));
    Ok(lines)
  }

  fn render_guests(&mut self, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = self
      .guests()
      .iter()
      .map(|guest| {
        let mut spans = vec![
          Span::styled("guest ", Style::default().fg(Color::Magenta)),
          Span::raw(truncate(&guest.name, 40)),
        ];
        if let Some(character) = &guest.character {
          spans.push(Span::styled(
            format!("  {}", truncate(character, 40)),
            Style::default().fg(Color::DarkGray),
          ));
        }
        ListItem::new(Line::from(spans))
      })
      .collect();
    let count = items.len();

    let block = Block::default()
      .title(format!(" Guest stars ({}) ", count))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    ensure_valid_selection(&mut self.guests_state, count);
    frame.render_stateful_widget(list, area, &mut self.guests_state);
  }
}

impl View for EpisodeView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.guests_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.guests_state.select_previous(),
      KeyCode::Char('r') => self.loader.reload(),
      KeyCode::Esc => return ViewAction::Pop,
      KeyCode::Enter => {
        let selected = self.guests_state.selected();
        if let Some(guest) = selected.and_then(|i| self.guests().get(i)) {
          let view = DetailView::new(self.session.clone(), MediaKind::Person, guest.id, &guest.name);
          return ViewAction::Push(Box::new(view));
        }
      }
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(8), Constraint::Percentage(35)])
      .split(area);

    let block = Block::default()
      .title(format!(" {} ", self.label))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let paragraph = match self.info_lines() {
      Ok(lines) => Paragraph::new(lines),
      Err(e) => Paragraph::new(format!("Failed to load: {}\nPress 'r' to retry.", e))
        .style(Style::default().fg(Color::Red)),
    };
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: true }), chunks[0]);

    self.render_guests(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    self.label.clone()
  }

  fn tick(&mut self) {
    self.loader.poll();
  }

  fn apply_command(&mut self, action: CommandAction) -> bool {
    if action == CommandAction::Refresh {
      self.loader.reload();
      return true;
    }
    false
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("enter", "open"),
      Shortcut::new("r", "reload"),
      Shortcut::new("q", "back"),
    ]
  }
}
