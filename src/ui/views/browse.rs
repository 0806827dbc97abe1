use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tokio::sync::mpsc;

use crate::catalog::{CatalogQuery, ListKind, MediaKind, MediaSummary, SearchScope};
use crate::commands::CommandAction;
use crate::debounce::DebounceGate;
use crate::pagination::{ListController, ListPhase};
use crate::sentinel::{ScrollSentinel, ViewportVisibility};
use crate::session::Session;
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_rating, rating_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::DetailView;

/// Root view: one list tab or search, scrolled incrementally
pub struct BrowseView {
  session: Session,
  kind: MediaKind,
  tab: ListKind,
  /// Search every media type instead of the current kind
  search_all: bool,
  search: SearchInput,
  query: DebounceGate<String>,
  list: ListController<MediaSummary>,
  list_state: ListState,
  sentinel: ScrollSentinel<ViewportVisibility>,
  near_end_tx: mpsc::UnboundedSender<()>,
  near_end_rx: mpsc::UnboundedReceiver<()>,
}

impl BrowseView {
  pub fn new(session: Session, kind: MediaKind, query: &str) -> Self {
    let delay = session.timing().search_debounce();
    let (near_end_tx, near_end_rx) = mpsc::unbounded_channel();

    let mut view = Self {
      session,
      kind,
      tab: ListKind::Popular,
      search_all: false,
      search: SearchInput::with_query(query),
      query: DebounceGate::new(query.trim().to_string(), delay),
      list: ListController::new(),
      list_state: ListState::default(),
      sentinel: ScrollSentinel::new(ViewportVisibility::new()),
      near_end_tx,
      near_end_rx,
    };
    view.apply_criteria();
    view
  }

  fn criteria(&self) -> CatalogQuery {
    let query = self.query.value();
    if self.search_all && !query.is_empty() {
      return CatalogQuery::Search {
        scope: SearchScope::Multi,
        query: query.clone(),
      };
    }
    CatalogQuery::browse(self.kind, self.tab, query)
  }

  /// Point the list at the current mode, tab and settled search text
  fn apply_criteria(&mut self) {
    let criteria = self.criteria();
    let key = criteria.request_key();
    if self.list.query_key() != Some(&key) {
      self.list_state = ListState::default();
    }

    let catalog = self.session.catalog().clone();
    self.list.reset(key, move |page| {
      let catalog = catalog.clone();
      let criteria = criteria.clone();
      async move { catalog.page(&criteria, page).await.map_err(|e| e.to_string()) }
    });
  }

  /// Keep the sentinel on the row after the last item while more pages exist
  fn sync_sentinel(&mut self) {
    let items = self.list.items().len();
    let wanted = (self.list.has_more() && items > 0).then_some(items);
    if self.sentinel.source_mut().marker() == wanted {
      return;
    }
    let tx = self.near_end_tx.clone();
    self.sentinel.attach(wanted.as_ref(), move || {
      let _ = tx.send(());
    });
  }

  fn move_selection(&mut self, delta: isize) {
    let len = self.list.items().len();
    if len == 0 {
      return;
    }
    let current = self.list_state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1) as usize;
    if self.list_state.selected() != Some(next) {
      self.list_state.select(Some(next));
      self.prefetch_selected();
    }
  }

  /// Put the cursor on the first row once a fresh list has items
  fn select_first_row(&mut self) {
    if self.list_state.selected().is_some() || self.list.items().is_empty() {
      return;
    }
    self.list_state.select(Some(0));
    self.prefetch_selected();
  }

  fn selected(&self) -> Option<&MediaSummary> {
    self.list.items().get(self.list_state.selected()?)
  }

  /// Prime the detail payload for the item under the cursor
  fn prefetch_selected(&self) {
    let Some(item) = self.selected() else {
      return;
    };
    let (kind, id) = (item.kind, item.id);
    let details = CatalogQuery::Details { kind, id }.request_key();
    if self.session.cache().contains(&details) {
      return;
    }

    let catalog = self.session.catalog().clone();
    let prefetch = self.session.prefetch();
    match kind {
      MediaKind::Movie => {
        prefetch.schedule(move || async move { catalog.movie(id).await.map_err(|e| e.to_string()) })
      }
      MediaKind::Tv => {
        prefetch.schedule(move || async move { catalog.tv(id).await.map_err(|e| e.to_string()) })
      }
      MediaKind::Person => {
        prefetch.schedule(move || async move { catalog.person(id).await.map_err(|e| e.to_string()) })
      }
    }
  }

  fn title(&self) -> String {
    let heading = match self.criteria() {
      CatalogQuery::Search { scope, query } => match scope {
        SearchScope::Multi => format!("Search \"{}\"", query),
        _ => format!("{} \"{}\"", kind_heading(self.kind), query),
      },
      _ => format!("{} {}", self.tab.label(self.kind), kind_heading(self.kind)),
    };

    let count = self.list.items().len();
    let status = match (self.list.phase(), self.list.error()) {
      (ListPhase::LoadingInitial, _) => "loading...".to_string(),
      (_, Some(e)) => format!("error: {}", truncate(e, 40)),
      (ListPhase::LoadingMore, _) => format!("{}, loading more...", count),
      _ => match self.list.total_results() {
        Some(total) => format!("{} of {}", count, total),
        None => count.to_string(),
      },
    };
    format!(" {} ({}) ", heading, status)
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.list.items().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = match self.list.phase() {
        ListPhase::LoadingInitial | ListPhase::Idle => "Loading...",
        _ if self.list.error().is_some() => "Request failed. Press 'r' to retry.",
        _ => "Nothing found.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let show_kind = self.search_all;
    let mut rows: Vec<ListItem> = self
      .list
      .items()
      .iter()
      .map(|item| ListItem::new(item_line(item, show_kind)))
      .collect();

    if self.list.has_more() {
      let label = if self.list.loading_more() {
        "  loading more..."
      } else {
        "  ..."
      };
      rows.push(ListItem::new(Span::styled(
        label,
        Style::default().fg(Color::DarkGray),
      )));
    }

    let inner_height = block.inner(area).height as usize;
    let list = List::new(rows)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);

    let offset = self.list_state.offset();
    self
      .sentinel
      .source_mut()
      .report_visible(offset..offset + inner_height);
  }
}

fn kind_heading(kind: MediaKind) -> &'static str {
  match kind {
    MediaKind::Movie => "Movies",
    MediaKind::Tv => "TV",
    MediaKind::Person => "People",
  }
}

fn item_line(item: &MediaSummary, show_kind: bool) -> Line<'static> {
  let mut spans = Vec::with_capacity(6);
  if show_kind {
    spans.push(Span::styled(
      format!("{:<7}", item.kind.as_str()),
      Style::default().fg(Color::Magenta),
    ));
  }
  spans.push(Span::styled(
    format!("{:<5}", item.year.as_deref().unwrap_or("")),
    Style::default().fg(Color::Cyan),
  ));
  spans.push(Span::raw(" "));
  spans.push(Span::styled(
    format!("{:>4}", format_rating(item.vote_average)),
    Style::default().fg(rating_color(item.vote_average)),
  ));
  spans.push(Span::raw("  "));
  spans.push(Span::raw(truncate(&item.title, 60)));
  Line::from(spans)
}

impl View for BrowseView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(SearchEvent::Changed(text)) => {
        self.query.set(text.trim().to_string());
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted(text)) => {
        self.query.set(text.trim().to_string());
        self.query.flush();
        self.apply_criteria();
        return ViewAction::None;
      }
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::PageDown => self.move_selection(10),
      KeyCode::PageUp => self.move_selection(-10),
      KeyCode::Char('g') | KeyCode::Home => self.move_selection(isize::MIN / 2),
      KeyCode::Char('G') | KeyCode::End => self.move_selection(isize::MAX / 2),
      KeyCode::Tab => {
        let at = ListKind::ALL.iter().position(|l| *l == self.tab).unwrap_or(0);
        self.tab = ListKind::ALL[(at + 1) % ListKind::ALL.len()];
        self.apply_criteria();
      }
      KeyCode::Char('m') => {
        self.kind = match self.kind {
          MediaKind::Movie => MediaKind::Tv,
          _ => MediaKind::Movie,
        };
        self.apply_criteria();
      }
      KeyCode::Char('a') => {
        self.search_all = !self.search_all;
        self.apply_criteria();
      }
      KeyCode::Char('r') => self.list.reload(),
      KeyCode::Enter => {
        if let Some(item) = self.selected() {
          self.session.prefetch().cancel();
          let view = DetailView::new(self.session.clone(), item.kind, item.id, &item.title);
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
      .constraints([Constraint::Length(1), Constraint::Min(3)])
      .split(area);

    self.search.render(frame, chunks[0], self.query.is_pending());
    self.render_list(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    kind_heading(self.kind).to_string()
  }

  fn tick(&mut self) {
    if self.query.poll().is_some() {
      self.apply_criteria();
    }

    if self.list.poll() {
      self.select_first_row();
    }

    while self.near_end_rx.try_recv().is_ok() {
      self.list.advance();
    }

    self.sync_sentinel();
  }

  fn captures_input(&self) -> bool {
    self.search.is_active()
  }

  fn apply_command(&mut self, action: CommandAction) -> bool {
    match action {
      CommandAction::Mode(kind) => self.kind = kind,
      CommandAction::Tab(tab) => self.tab = tab,
      CommandAction::Refresh => {
        self.list.reload();
        return true;
      }
      CommandAction::ClearCache | CommandAction::Quit => return false,
    }
    self.apply_criteria();
    true
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("/", "search"),
      Shortcut::new("tab", "list"),
      Shortcut::new("m", "movies/tv"),
      Shortcut::new("a", if self.search_all { "search kind" } else { "search all" }),
      Shortcut::new("r", "reload"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::RequestKey;
  use crate::catalog::CatalogClient;
  use crate::config::Config;
  use crate::pagination::Page;
  use ratatui::backend::TestBackend;
  use ratatui::Terminal;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  fn session() -> Session {
    let mut config = Config::default();
    // Unroutable, so any request fails fast without leaving the machine
    config.catalog.url = "http://127.0.0.1:9/3".to_string();
    let client = CatalogClient::with_token(&config, "token".to_string()).unwrap();
    Session::with_client(&config, client)
  }

  fn summary(id: u64) -> MediaSummary {
    MediaSummary {
      id,
      kind: MediaKind::Movie,
      title: format!("Movie {}", id),
      year: None,
      overview: String::new(),
      vote_average: None,
      image_path: None,
    }
  }

  /// Swap the view's list onto canned pages of three items; records requested page numbers
  fn serve_pages(view: &mut BrowseView) -> Arc<Mutex<Vec<u32>>> {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let log = requested.clone();
    view.list_state = ListState::default();
    view.list.reset(RequestKey::new(["canned"]), move |page| {
      log.lock().unwrap().push(page);
      let first = u64::from(page - 1) * 3 + 1;
      async move { Ok(Page::new(page, (first..first + 3).map(summary).collect())) }
    });
    requested
  }

  fn draw(terminal: &mut Terminal<TestBackend>, view: &mut BrowseView) {
    terminal.draw(|frame| view.render(frame, frame.area())).unwrap();
  }

  #[tokio::test(start_paused = true)]
  async fn test_first_row_is_selected_and_prefetched() {
    let mut view = BrowseView::new(session(), MediaKind::Movie, "");
    serve_pages(&mut view);
    assert!(!view.session.prefetch().is_armed());

    tokio::time::sleep(Duration::from_millis(1)).await;
    view.tick();

    assert_eq!(view.list_state.selected(), Some(0));
    assert_eq!(view.selected().map(|item| item.id), Some(1));
    assert!(view.session.prefetch().is_armed());
  }

  #[tokio::test(start_paused = true)]
  async fn test_visible_marker_fetches_next_page_once() {
    let mut view = BrowseView::new(session(), MediaKind::Movie, "");
    let requested = serve_pages(&mut view);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

    tokio::time::sleep(Duration::from_millis(1)).await;
    view.tick();
    assert_eq!(view.list.phase(), ListPhase::Ready);
    assert_eq!(view.sentinel.source_mut().marker(), Some(3));

    // Two frames with the marker row on screen before the next tick
    draw(&mut terminal, &mut view);
    draw(&mut terminal, &mut view);
    view.tick();

    assert_eq!(*requested.lock().unwrap(), vec![1, 2]);
    assert_eq!(view.list.phase(), ListPhase::LoadingMore);

    tokio::time::sleep(Duration::from_millis(1)).await;
    view.tick();
    assert_eq!(view.list.items().len(), 6);
    assert_eq!(view.sentinel.source_mut().marker(), Some(6));
  }

  #[tokio::test]
  async fn test_starts_on_popular_list() {
    let view = BrowseView::new(session(), MediaKind::Movie, "");
    assert_eq!(
      view.criteria(),
      CatalogQuery::List {
        kind: MediaKind::Movie,
        list: ListKind::Popular
      }
    );
    assert_eq!(view.list.phase(), ListPhase::LoadingInitial);
  }

  #[tokio::test]
  async fn test_search_all_uses_multi_scope() {
    let mut view = BrowseView::new(session(), MediaKind::Tv, "lost");
    assert_eq!(
      view.criteria(),
      CatalogQuery::Search {
        scope: SearchScope::Tv,
        query: "lost".to_string()
      }
    );
    view.search_all = true;
    assert_eq!(
      view.criteria(),
      CatalogQuery::Search {
        scope: SearchScope::Multi,
        query: "lost".to_string()
      }
    );
  }

  #[tokio::test]
  async fn test_commands_switch_criteria() {
    let mut view = BrowseView::new(session(), MediaKind::Movie, "");
    assert!(view.apply_command(CommandAction::Tab(ListKind::NowPlaying)));
    assert!(view.apply_command(CommandAction::Mode(MediaKind::Tv)));
    assert_eq!(
      view.list.query_key(),
      Some(
        &CatalogQuery::List {
          kind: MediaKind::Tv,
          list: ListKind::NowPlaying
        }
        .request_key()
      )
    );
    assert!(!view.apply_command(CommandAction::Quit));
  }

  #[tokio::test(start_paused = true)]
  async fn test_typing_waits_for_debounce() {
    let mut view = BrowseView::new(session(), MediaKind::Movie, "");
    let popular = view.list.query_key().cloned();

    view.handle_key(KeyEvent::from(KeyCode::Char('/')));
    for c in "dune".chars() {
      view.handle_key(KeyEvent::from(KeyCode::Char(c)));
    }
    view.tick();
    assert_eq!(view.list.query_key().cloned(), popular);

    tokio::time::advance(std::time::Duration::from_millis(400)).await;
    view.tick();
    assert_eq!(
      view.list.query_key(),
      Some(
        &CatalogQuery::Search {
          scope: SearchScope::Movie,
          query: "dune".to_string()
        }
        .request_key()
      )
    );
  }
}
