use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::catalog::{CatalogQuery, EpisodeSummary, ImageSize, SeasonDetails};
use crate::commands::CommandAction;
use crate::loader::{LoadState, ResourceLoader};
use crate::session::Session;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_rating, format_runtime, rating_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::detail::{fact_line, placeholder};
use crate::ui::views::EpisodeView;

/// One season of a series with its episode list
pub struct SeasonView {
  session: Session,
  tv_id: u64,
  season: u32,
  label: String,
  loader: ResourceLoader<SeasonDetails>,
  episodes_state: ListState,
}

impl SeasonView {
  pub fn new(session: Session, tv_id: u64, season: u32, label: &str) -> Self {
    let mut view = Self {
      loader: session.loader(),
      session,
      tv_id,
      season,
      label: label.to_string(),
      episodes_state: ListState::default(),
    };
    view.load();
    view
  }

  fn load(&mut self) {
    let (tv_id, season) = (self.tv_id, self.season);
    let catalog = self.session.catalog().clone();
    self
      .loader
      .load(CatalogQuery::Season { tv_id, season }.request_key(), move || {
        let catalog = catalog.clone();
        async move { catalog.season(tv_id, season).await.map_err(|e| e.to_string()) }
      });
  }

  fn episodes(&self) -> &[EpisodeSummary] {
    self
      .loader
      .data()
      .map(|season| season.episodes.as_slice())
      .unwrap_or_default()
  }

  fn info_lines(&self) -> Result<Vec<Line<'static>>, String> {
    let season = match self.loader.state() {
      LoadState::Ready(season) => season,
      state => return placeholder(state),
    };

    let mut lines = vec![Line::from(Span::styled(
      season.name.clone(),
      Style::default().fg(Color::Yellow).bold(),
    ))];
    let mut facts = vec![format!("{} episodes", season.episodes.len())];
    if let Some(date) = &season.air_date {
      facts.insert(0, date.clone());
    }
    lines.push(fact_line(&facts.join(" · ")));
    if !season.overview.is_empty() {
      lines.push(Line::raw(""));
      lines.push(Line::raw(season.overview.clone()));
    }
    lines.push(Line::raw(""));
    lines.push(fact_line(
      &self
        .session
        .images()
        .poster(season.poster_path.as_deref(), ImageSize::Medium),
    ));
    Ok(lines)
  }

  fn render_episodes(&mut self, frame: &mut Frame, area: Rect) {
    let episodes = self.episodes();
    let items: Vec<ListItem> = episodes.iter().map(episode_line).collect();
    let count = items.len();

    let title = if self.loader.is_loading() {
      " Episodes (loading...) ".to_string()
    } else {
      format!(" Episodes ({}) ", count)
    };
    let block = Block::default()
      .title(title)
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

    ensure_valid_selection(&mut self.episodes_state, count);
    frame.render_stateful_widget(list, area, &mut self.episodes_state);
  }
}

fn episode_line(episode: &EpisodeSummary) -> ListItem<'static> {
  let mut spans = vec![
    Span::styled(
      format!("E{:02} ", episode.episode_number),
      Style::default().fg(Color::Magenta),
    ),
    Span::raw(truncate(&episode.name, 40)),
    Span::styled(
      format!("  ★ {}", format_rating(episode.vote_average)),
      Style::default().fg(rating_color(episode.vote_average)),
    ),
  ];
  let mut facts = Vec::new();
  if let Some(date) = &episode.air_date {
    facts.push(date.clone());
  }
  if let Some(runtime) = episode.runtime {
    facts.push(format_runtime(runtime));
  }
  if !facts.is_empty() {
    spans.push(Span::styled(
      format!("  {}", facts.join(" · ")),
      Style::default().fg(Color::DarkGray),
    ));
  }
  ListItem::new(Line::from(spans))
}

impl View for SeasonView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.episodes_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.episodes_state.select_previous(),
      KeyCode::Char('r') => self.loader.reload(),
      KeyCode::Esc => return ViewAction::Pop,
      KeyCode::Enter => {
        let selected = self.episodes_state.selected();
        if let Some(episode) = selected.and_then(|i| self.episodes().get(i)) {
          let label = format!("S{:02}E{:02}", self.season, episode.episode_number);
          let view = EpisodeView::new(
            self.session.clone(),
            self.tv_id,
            self.season,
            episode.episode_number,
            &label,
          );
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
      .constraints([Constraint::Length(9), Constraint::Min(5)])
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

    self.render_episodes(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.label, 30)
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
      Shortcut::new("enter", "episode"),
      Shortcut::new("r", "reload"),
      Shortcut::new("q", "back"),
    ]
  }
}
