use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::catalog::{
  CatalogQuery, Credits, ImageSize, MediaKind, MediaSummary, MovieDetails, PersonCredits,
  PersonDetails, Reviews, TvDetails,
};
use crate::commands::CommandAction;
use crate::loader::{LoadState, ResourceLoader};
use crate::pagination::Page;
use crate::session::Session;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_rating, format_runtime, rating_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::SeasonView;

/// Reviews shown under the overview
const REVIEW_LIMIT: usize = 3;

/// Details payload for whichever kind this view shows
enum Details {
  Movie(ResourceLoader<MovieDetails>),
  Tv(ResourceLoader<TvDetails>),
  Person(ResourceLoader<PersonDetails>),
}

/// Where a link leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
  Entity { kind: MediaKind, id: u64 },
  Season { tv_id: u64, season: u32 },
}

/// Something reachable from the details: a season, cast member, credit or recommendation
struct Link {
  target: Target,
  label: String,
  note: Option<String>,
}

/// Details for a movie, series or person.
///
/// Titles also load cast, reviews and recommendations; series list their
/// seasons. People load their filmography.
pub struct DetailView {
  session: Session,
  kind: MediaKind,
  id: u64,
  label: String,
  details: Details,
  credits: Option<ResourceLoader<Credits>>,
  recommendations: Option<ResourceLoader<Page<MediaSummary>>>,
  reviews: Option<ResourceLoader<Reviews>>,
  filmography: Option<ResourceLoader<PersonCredits>>,
  links_state: ListState,
}

impl DetailView {
  pub fn new(session: Session, kind: MediaKind, id: u64, label: &str) -> Self {
    let details = match kind {
      MediaKind::Movie => Details::Movie(session.loader()),
      MediaKind::Tv => Details::Tv(session.loader()),
      MediaKind::Person => Details::Person(session.loader()),
    };
    let titled = kind != MediaKind::Person;

    let mut view = Self {
      kind,
      id,
      label: label.to_string(),
      details,
      credits: titled.then(|| session.loader()),
      recommendations: titled.then(|| session.loader()),
      reviews: titled.then(|| session.loader()),
      filmography: (!titled).then(|| session.loader()),
      links_state: ListState::default(),
      session,
    };
    view.load();
    view
  }

  fn load(&mut self) {
    let (kind, id) = (self.kind, self.id);
    let details_key = CatalogQuery::Details { kind, id }.request_key();

    let catalog = self.session.catalog().clone();
    match &mut self.details {
      Details::Movie(loader) => {
        loader.load(details_key, move || {
          let catalog = catalog.clone();
          async move { catalog.movie(id).await.map_err(|e| e.to_string()) }
        });
      }
      Details::Tv(loader) => {
        loader.load(details_key, move || {
          let catalog = catalog.clone();
          async move { catalog.tv(id).await.map_err(|e| e.to_string()) }
        });
      }
      Details::Person(loader) => {
        loader.load(details_key, move || {
          let catalog = catalog.clone();
          async move { catalog.person(id).await.map_err(|e| e.to_string()) }
        });
      }
    }

    if let Some(loader) = &mut self.credits {
      let catalog = self.session.catalog().clone();
      loader.load(CatalogQuery::Credits { kind, id }.request_key(), move || {
        let catalog = catalog.clone();
        async move { catalog.credits(kind, id).await.map_err(|e| e.to_string()) }
      });
    }

    if let Some(loader) = &mut self.recommendations {
      let catalog = self.session.catalog().clone();
      let query = CatalogQuery::Recommendations { kind, id };
      loader.load(query.request_key(), move || {
        let catalog = catalog.clone();
        let query = query.clone();
        async move { catalog.page(&query, 1).await.map_err(|e| e.to_string()) }
      });
    }

    if let Some(loader) = &mut self.reviews {
      let catalog = self.session.catalog().clone();
      loader.load(CatalogQuery::Reviews { kind, id }.request_key(), move || {
        let catalog = catalog.clone();
        async move { catalog.reviews(kind, id).await.map_err(|e| e.to_string()) }
      });
    }

    if let Some(loader) = &mut self.filmography {
      let catalog = self.session.catalog().clone();
      loader.load(CatalogQuery::PersonCredits { id }.request_key(), move || {
        let catalog = catalog.clone();
        async move { catalog.person_credits(id).await.map_err(|e| e.to_string()) }
      });
    }
  }

  fn reload(&mut self) {
    match &mut self.details {
      Details::Movie(loader) => loader.reload(),
      Details::Tv(loader) => loader.reload(),
      Details::Person(loader) => loader.reload(),
    }
    if let Some(loader) = &mut self.credits {
      loader.reload();
    }
    if let Some(loader) = &mut self.recommendations {
      loader.reload();
    }
    if let Some(loader) = &mut self.reviews {
      loader.reload();
    }
    if let Some(loader) = &mut self.filmography {
      loader.reload();
    }
  }

  /// Seasons, then cast, then recommendations; a person's known-for titles
  fn links(&self) -> Vec<Link> {
    let mut links = Vec::new();
    if let Details::Tv(loader) = &self.details {
      if let Some(tv) = loader.data() {
        links.extend(tv.seasons.iter().map(|season| Link {
          target: Target::Season {
            tv_id: tv.id,
            season: season.season_number,
          },
          label: season.name.clone(),
          note: season.episode_count.map(|n| format!("{} episodes", n)),
        }));
      }
    }
    if let Some(credits) = self.credits.as_ref().and_then(|l| l.data()) {
      links.extend(credits.cast.iter().take(20).map(|member| Link {
        target: Target::Entity {
          kind: MediaKind::Person,
          id: member.id,
        },
        label: member.name.clone(),
        note: member.character.clone(),
      }));
    }
    if let Some(page) = self.recommendations.as_ref().and_then(|l| l.data()) {
      links.extend(page.results.iter().take(20).map(|item| Link {
        target: Target::Entity {
          kind: item.kind,
          id: item.id,
        },
        label: item.title.clone(),
        note: item.year.clone(),
      }));
    }
    if let Some(filmography) = self.filmography.as_ref().and_then(|l| l.data()) {
      links.extend(filmography.cast.iter().take(40).map(|credit| {
        let note = match (&credit.year, &credit.character) {
          (Some(year), Some(character)) => Some(format!("{} as {}", year, character)),
          (Some(year), None) => Some(year.clone()),
          (None, character) => character.clone(),
        };
        Link {
          target: Target::Entity {
            kind: credit.kind,
            id: credit.id,
          },
          label: credit.title.clone(),
          note,
        }
      }));
    }
    links
  }

  fn open(&self, link: &Link) -> Box<dyn View> {
    match link.target {
      Target::Entity { kind, id } => {
        Box::new(DetailView::new(self.session.clone(), kind, id, &link.label))
      }
      Target::Season { tv_id, season } => {
        let label = format!("{} {}", truncate(&self.label, 20), link.label);
        Box::new(SeasonView::new(self.session.clone(), tv_id, season, &label))
      }
    }
  }

  fn review_lines(&self) -> Vec<Line<'static>> {
    let Some(reviews) = self.reviews.as_ref().and_then(|l| l.data()) else {
      return Vec::new();
    };
    if reviews.results.is_empty() {
      return Vec::new();
    }

    let total = reviews.total_results.unwrap_or(reviews.results.len() as u64);
    let mut lines = vec![
      Line::raw(""),
      Line::from(Span::styled(
        format!("Reviews ({})", total),
        Style::default().fg(Color::Yellow).bold(),
      )),
    ];
    for review in reviews.results.iter().take(REVIEW_LIMIT) {
      let mut header = vec![Span::styled(
        review.author.clone(),
        Style::default().fg(Color::Magenta),
      )];
      if let Some(rating) = review.rating {
        header.push(Span::styled(
          format!("  ★ {}", format_rating(Some(rating))),
          Style::default().fg(rating_color(Some(rating))),
        ));
      }
      if let Some(date) = &review.created_at {
        header.push(Span::styled(format!("  {}", date), Style::default().fg(Color::DarkGray)));
      }
      lines.push(Line::from(header));
      lines.push(Line::raw(truncate(&review.content.replace('\n', " "), 300)));
    }
    lines
  }

  fn info_lines(&self) -> Result<Vec<Line<'static>>, String> {
    let images = self.session.images();
    let lines = match &self.details {
      Details::Movie(loader) => match loader.state() {
        LoadState::Ready(movie) => {
          let mut facts = Vec::new();
          if let Some(date) = &movie.release_date {
            facts.push(date.clone());
          }
          if let Some(runtime) = movie.runtime.filter(|r| *r > 0) {
            facts.push(format_runtime(runtime));
          }
          if !movie.genres.is_empty() {
            facts.push(movie.genres.join(", "));
          }
          let mut lines = title_lines(&movie.title, movie.tagline.as_deref(), movie.vote_average);
          lines.push(fact_line(&facts.join(" · ")));
          if let Some(directors) = self.directors() {
            lines.push(fact_line(&format!("Directed by {}", directors)));
          }
          lines.push(Line::raw(""));
          lines.push(Line::raw(movie.overview.clone()));
          lines.push(Line::raw(""));
          lines.push(fact_line(&images.poster(movie.poster_path.as_deref(), ImageSize::Large)));
          lines.extend(self.review_lines());
          lines
        }
        state => return placeholder(state),
      },
      Details::Tv(loader) => match loader.state() {
        LoadState::Ready(tv) => {
          let mut facts = Vec::new();
          if let Some(first) = &tv.first_air_date {
            let last = tv.last_air_date.as_deref().unwrap_or("");
            facts.push(format!("{} – {}", first, last));
          }
          if let Some(seasons) = tv.number_of_seasons {
            facts.push(format!("{} seasons", seasons));
          }
          if let Some(episodes) = tv.number_of_episodes {
            facts.push(format!("{} episodes", episodes));
          }
          if let Some(status) = &tv.status {
            facts.push(status.clone());
          }
          let mut lines = title_lines(&tv.name, tv.tagline.as_deref(), tv.vote_average);
          lines.push(fact_line(&facts.join(" · ")));
          if !tv.genres.is_empty() {
            lines.push(fact_line(&tv.genres.join(", ")));
          }
          lines.push(Line::raw(""));
          lines.push(Line::raw(tv.overview.clone()));
          lines.push(Line::raw(""));
          lines.push(fact_line(&images.backdrop(tv.backdrop_path.as_deref(), ImageSize::Medium)));
          lines.extend(self.review_lines());
          lines
        }
        state => return placeholder(state),
      },
      Details::Person(loader) => match loader.state() {
        LoadState::Ready(person) => {
          let mut lines = vec![Line::from(Span::styled(
            person.name.clone(),
            Style::default().fg(Color::Yellow).bold(),
          ))];
          if let Some(department) = &person.known_for_department {
            lines.push(fact_line(department));
          }
          let lifespan = match (&person.birthday, &person.deathday) {
            (Some(born), Some(died)) => Some(format!("{} – {}", born, died)),
            (Some(born), None) => Some(format!("Born {}", born)),
            _ => None,
          };
          if let Some(lifespan) = lifespan {
            lines.push(fact_line(&lifespan));
          }
          if let Some(place) = &person.place_of_birth {
            lines.push(fact_line(place));
          }
          if let Some(filmography) = self.filmography.as_ref().and_then(|l| l.data()) {
            lines.push(fact_line(&format!(
              "{} acting credits · {} crew credits",
              filmography.cast.len(),
              filmography.crew_count
            )));
          }
          lines.push(Line::raw(""));
          lines.push(Line::raw(person.biography.clone()));
          lines.push(Line::raw(""));
          lines.push(fact_line(&images.profile(person.profile_path.as_deref())));
          lines
        }
        state => return placeholder(state),
      },
    };
    Ok(lines)
  }

  fn directors(&self) -> Option<String> {
    let credits = self.credits.as_ref()?.data()?;
    (!credits.directors.is_empty()).then(|| credits.directors.join(", "))
  }

  fn render_links(&mut self, frame: &mut Frame, area: Rect, links: &[Link]) {
    ensure_valid_selection(&mut self.links_state, links.len());

    let loading = self.credits.as_ref().is_some_and(|l| l.is_loading())
      || self.recommendations.as_ref().is_some_and(|l| l.is_loading())
      || self.filmography.as_ref().is_some_and(|l| l.is_loading());
    let heading = match self.kind {
      MediaKind::Person => "Known for",
      MediaKind::Tv => "Seasons & cast",
      MediaKind::Movie => "Cast & recommendations",
    };
    let title = if loading {
      format!(" {} (loading...) ", heading)
    } else {
      format!(" {} ({}) ", heading, links.len())
    };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let items: Vec<ListItem> = links
      .iter()
      .map(|link| {
        let tag = match link.target {
          Target::Season { .. } => "season",
          Target::Entity { kind: MediaKind::Person, .. } => "cast  ",
          Target::Entity { kind: MediaKind::Movie, .. } => "movie ",
          Target::Entity { kind: MediaKind::Tv, .. } => "tv    ",
        };
        let mut spans = vec![
          Span::styled(format!("{} ", tag), Style::default().fg(Color::Magenta)),
          Span::raw(truncate(&link.label, 40)),
        ];
        if let Some(note) = &link.note {
          spans.push(Span::styled(
            format!("  {}", truncate(note, 40)),
            Style::default().fg(Color::DarkGray),
          ));
        }
        ListItem::new(Line::from(spans))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.links_state);
  }
}

pub(super) fn title_lines(title: &str, tagline: Option<&str>, vote: Option<f64>) -> Vec<Line<'static>> {
  let mut lines = vec![Line::from(vec![
    Span::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
    Span::raw("  "),
    Span::styled(
      format!("★ {}", format_rating(vote)),
      Style::default().fg(rating_color(vote)),
    ),
  ])];
  if let Some(tagline) = tagline.filter(|t| !t.is_empty()) {
    lines.push(Line::from(Span::styled(
      tagline.to_string(),
      Style::default().add_modifier(Modifier::ITALIC),
    )));
  }
  lines
}

pub(super) fn fact_line(text: &str) -> Line<'static> {
  Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Cyan)))
}

pub(super) fn placeholder<T>(state: &LoadState<T>) -> Result<Vec<Line<'static>>, String> {
  match state {
    LoadState::Failed(e) => Err(e.clone()),
    _ => Ok(vec![Line::from(Span::styled(
      "Loading...",
      Style::default().fg(Color::DarkGray),
    ))]),
  }
}

impl View for DetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.links_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.links_state.select_previous(),
      KeyCode::Char('r') => self.reload(),
      KeyCode::Esc => return ViewAction::Pop,
      KeyCode::Enter => {
        let selected = self.links_state.selected();
        if let Some(link) = selected.and_then(|i| self.links().into_iter().nth(i)) {
          return ViewAction::Push(self.open(&link));
        }
      }
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let links = self.links();
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(8), Constraint::Percentage(40)])
      .split(area);
    self.render_links(frame, chunks[1], &links);
    let area = chunks[0];

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
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: true }), area);
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.label, 30)
  }

  fn tick(&mut self) {
    match &mut self.details {
      Details::Movie(loader) => loader.poll(),
      Details::Tv(loader) => loader.poll(),
      Details::Person(loader) => loader.poll(),
    };
    if let Some(loader) = &mut self.credits {
      loader.poll();
    }
    if let Some(loader) = &mut self.recommendations {
      loader.poll();
    }
    if let Some(loader) = &mut self.reviews {
      loader.poll();
    }
    if let Some(loader) = &mut self.filmography {
      loader.poll();
    }
  }

  fn apply_command(&mut self, action: CommandAction) -> bool {
    if action == CommandAction::Refresh {
      self.reload();
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

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{CastMember, CatalogClient, PersonCredit, Review, SeasonSummary};
  use crate::config::Config;
  use std::sync::Arc;

  fn session() -> Session {
    let mut config = Config::default();
    config.catalog.url = "http://127.0.0.1:9/3".to_string();
    let client = CatalogClient::with_token(&config, "token".to_string()).unwrap();
    Session::with_client(&config, client)
  }

  fn movie(id: u64) -> MovieDetails {
    MovieDetails {
      id,
      title: "Alien".to_string(),
      tagline: None,
      overview: String::new(),
      release_date: Some("1979-05-25".to_string()),
      runtime: Some(117),
      genres: vec!["Horror".to_string()],
      status: None,
      vote_average: Some(8.1),
      poster_path: None,
      backdrop_path: None,
    }
  }

  #[tokio::test]
  async fn test_cached_details_show_immediately() {
    let session = session();
    let key = CatalogQuery::Details {
      kind: MediaKind::Movie,
      id: 348,
    }
    .request_key();
    session.cache().set(&key, Arc::new(movie(348)));

    let view = DetailView::new(session, MediaKind::Movie, 348, "Alien");
    let lines = view.info_lines().unwrap();
    assert!(lines.len() > 2);
  }

  #[tokio::test]
  async fn test_cast_and_recommendations_become_links() {
    let session = session();
    session.cache().set(
      &CatalogQuery::Credits {
        kind: MediaKind::Movie,
        id: 348,
      }
      .request_key(),
      Arc::new(Credits {
        id: 348,
        cast: vec![CastMember {
          id: 10205,
          name: "Sigourney Weaver".to_string(),
          character: Some("Ripley".to_string()),
        }],
        directors: vec!["Ridley Scott".to_string()],
      }),
    );
    session.cache().set(
      &CatalogQuery::Recommendations {
        kind: MediaKind::Movie,
        id: 348,
      }
      .request_key(),
      Arc::new(Page::new(
        1,
        vec![MediaSummary {
          id: 679,
          kind: MediaKind::Movie,
          title: "Aliens".to_string(),
          year: Some("1986".to_string()),
          overview: String::new(),
          vote_average: None,
          image_path: None,
        }],
      )),
    );

    let view = DetailView::new(session, MediaKind::Movie, 348, "Alien");
    let links = view.links();
    assert_eq!(links.len(), 2);
    assert_eq!(
      links[0].target,
      Target::Entity {
        kind: MediaKind::Person,
        id: 10205
      }
    );
    assert_eq!(
      links[1].target,
      Target::Entity {
        kind: MediaKind::Movie,
        id: 679
      }
    );
    assert_eq!(view.directors().as_deref(), Some("Ridley Scott"));
  }

  #[tokio::test]
  async fn test_person_view_has_no_title_loaders() {
    let view = DetailView::new(session(), MediaKind::Person, 10205, "Sigourney Weaver");
    assert!(view.credits.is_none());
    assert!(view.recommendations.is_none());
    assert!(view.reviews.is_none());
    assert!(view.filmography.is_some());
    assert!(view.links().is_empty());
  }

  #[tokio::test]
  async fn test_person_filmography_links_to_titles() {
    let session = session();
    session.cache().set(
      &CatalogQuery::PersonCredits { id: 10205 }.request_key(),
      Arc::new(PersonCredits {
        id: 10205,
        cast: vec![
          PersonCredit {
            id: 348,
            kind: MediaKind::Movie,
            title: "Alien".to_string(),
            year: Some("1979".to_string()),
            character: Some("Ripley".to_string()),
            episode_count: None,
          },
          PersonCredit {
            id: 1668,
            kind: MediaKind::Tv,
            title: "Friends".to_string(),
            year: None,
            character: None,
            episode_count: Some(1),
          },
        ],
        crew_count: 0,
      }),
    );

    let mut view = DetailView::new(session, MediaKind::Person, 10205, "Sigourney Weaver");
    let links = view.links();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].note.as_deref(), Some("1979 as Ripley"));
    assert_eq!(
      links[1].target,
      Target::Entity {
        kind: MediaKind::Tv,
        id: 1668
      }
    );

    view.links_state.select(Some(0));
    let action = view.handle_key(KeyEvent::from(KeyCode::Enter));
    match action {
      ViewAction::Push(next) => assert_eq!(next.breadcrumb_label(), "Alien"),
      _ => panic!("expected the credit to open"),
    }
  }

  #[tokio::test]
  async fn test_series_lists_seasons_first() {
    let session = session();
    session.cache().set(
      &CatalogQuery::Details {
        kind: MediaKind::Tv,
        id: 1399,
      }
      .request_key(),
      Arc::new(TvDetails {
        id: 1399,
        name: "Game of Thrones".to_string(),
        tagline: None,
        overview: String::new(),
        first_air_date: None,
        last_air_date: None,
        number_of_seasons: Some(1),
        number_of_episodes: Some(10),
        genres: Vec::new(),
        status: None,
        vote_average: None,
        poster_path: None,
        backdrop_path: None,
        seasons: vec![SeasonSummary {
          season_number: 1,
          name: "Season 1".to_string(),
          air_date: None,
          episode_count: Some(10),
        }],
      }),
    );

    let mut view = DetailView::new(session, MediaKind::Tv, 1399, "Game of Thrones");
    let links = view.links();
    assert_eq!(
      links[0].target,
      Target::Season {
        tv_id: 1399,
        season: 1
      }
    );
    assert_eq!(links[0].note.as_deref(), Some("10 episodes"));

    view.links_state.select(Some(0));
    match view.handle_key(KeyEvent::from(KeyCode::Enter)) {
      ViewAction::Push(next) => assert_eq!(next.breadcrumb_label(), "Game of Thrones Season 1"),
      _ => panic!("expected the season to open"),
    }
  }

  #[tokio::test]
  async fn test_reviews_follow_overview() {
    let session = session();
    session.cache().set(
      &CatalogQuery::Details {
        kind: MediaKind::Movie,
        id: 348,
      }
      .request_key(),
      Arc::new(movie(348)),
    );
    session.cache().set(
      &CatalogQuery::Reviews {
        kind: MediaKind::Movie,
        id: 348,
      }
      .request_key(),
      Arc::new(Reviews {
        id: 348,
        results: (0..5)
          .map(|i| Review {
            author: format!("critic{}", i),
            rating: Some(8.0),
            content: "In space no one can hear you scream.".to_string(),
            created_at: None,
          })
          .collect(),
        total_results: Some(5),
      }),
    );

    let view = DetailView::new(session, MediaKind::Movie, 348, "Alien");
    let reviews = view.review_lines();
    // Blank line and heading, then author and text per shown review
    assert_eq!(reviews.len(), 2 + 2 * REVIEW_LIMIT);
    assert_eq!(reviews[1].to_string(), "Reviews (5)");
  }
}
