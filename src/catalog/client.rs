use color_eyre::{eyre::eyre, Result};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::api_types::{
  ApiCombinedCredits, ApiCredits, ApiEpisode, ApiMovie, ApiPagedResponse, ApiPerson, ApiReviews,
  ApiSeason, ApiTv,
};
use crate::catalog::cache::CatalogQuery;
use crate::catalog::types::{
  Credits, EpisodeDetails, ListKind, MediaKind, MediaSummary, MovieDetails, PersonCredits,
  PersonDetails, Reviews, SearchScope, SeasonDetails, TvDetails,
};
use crate::config::Config;
use crate::pagination::Page;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog API client
#[derive(Clone)]
pub struct CatalogClient {
  http: reqwest::Client,
  base: String,
  token: String,
  language: Option<String>,
}

impl CatalogClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    Self::with_token(config, token)
  }

  pub fn with_token(config: &Config, token: String) -> Result<Self> {
    let base = config.catalog.url.trim_end_matches('/').to_string();
    Url::parse(&base).map_err(|e| eyre!("Invalid catalog url {}: {}", base, e))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("cinedex/", env!("CARGO_PKG_VERSION")))
      .connect_timeout(CONNECT_TIMEOUT)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      token,
      language: config.catalog.language.clone(),
    })
  }

  /// Fetch one page of a curated list
  pub async fn list(&self, kind: MediaKind, list: ListKind, page: u32) -> Result<Page<MediaSummary>> {
    let path = list_path(kind, list);
    let url = self.url(&path, &[("page", page.to_string())])?;
    self.get_page(url, page, kind).await
  }

  /// Fetch one page of search results
  pub async fn search(&self, scope: SearchScope, query: &str, page: u32) -> Result<Page<MediaSummary>> {
    let path = format!("/search/{}", scope.as_str());
    let url = self.url(
      &path,
      &[("query", query.trim().to_string()), ("page", page.to_string())],
    )?;
    self.get_page(url, page, scope.default_kind()).await
  }

  pub async fn movie(&self, id: u64) -> Result<MovieDetails> {
    let url = self.url(&format!("/movie/{}", id), &[])?;
    let movie: ApiMovie = self.get_json(url).await?;
    Ok(movie.into())
  }

  pub async fn tv(&self, id: u64) -> Result<TvDetails> {
    let url = self.url(&format!("/tv/{}", id), &[])?;
    let tv: ApiTv = self.get_json(url).await?;
    Ok(tv.into())
  }

  pub async fn person(&self, id: u64) -> Result<PersonDetails> {
    let url = self.url(&format!("/person/{}", id), &[])?;
    let person: ApiPerson = self.get_json(url).await?;
    Ok(person.into())
  }

  /// Cast and directors for a movie or series
  pub async fn credits(&self, kind: MediaKind, id: u64) -> Result<Credits> {
    let url = self.url(&format!("/{}/{}/credits", title_segment(kind)?, id), &[])?;
    let credits: ApiCredits = self.get_json(url).await?;
    let mut credits: Credits = credits.into();
    if credits.id == 0 {
      credits.id = id;
    }
    Ok(credits)
  }

  /// Movie and series acting credits for a person
  pub async fn person_credits(&self, id: u64) -> Result<PersonCredits> {
    let url = self.url(&format!("/person/{}/combined_credits", id), &[])?;
    let credits: ApiCombinedCredits = self.get_json(url).await?;
    let mut credits: PersonCredits = credits.into();
    if credits.id == 0 {
      credits.id = id;
    }
    Ok(credits)
  }

  pub async fn season(&self, tv_id: u64, season: u32) -> Result<SeasonDetails> {
    let url = self.url(&format!("/tv/{}/season/{}", tv_id, season), &[])?;
    let season: ApiSeason = self.get_json(url).await?;
    Ok(season.into_details(tv_id))
  }

  pub async fn episode(&self, tv_id: u64, season: u32, episode: u32) -> Result<EpisodeDetails> {
    let path = format!("/tv/{}/season/{}/episode/{}", tv_id, season, episode);
    let url = self.url(&path, &[])?;
    let episode: ApiEpisode = self.get_json(url).await?;
    Ok(episode.into_details(tv_id))
  }

  /// First page of user reviews for a movie or series
  pub async fn reviews(&self, kind: MediaKind, id: u64) -> Result<Reviews> {
    let url = self.url(&format!("/{}/{}/reviews", title_segment(kind)?, id), &[])?;
    let reviews: ApiReviews = self.get_json(url).await?;
    let mut reviews: Reviews = reviews.into();
    if reviews.id == 0 {
      reviews.id = id;
    }
    Ok(reviews)
  }

  /// Titles recommended from a movie or series
  pub async fn recommendations(&self, kind: MediaKind, id: u64, page: u32) -> Result<Page<MediaSummary>> {
    let path = format!("/{}/{}/recommendations", title_segment(kind)?, id);
    let url = self.url(&path, &[("page", page.to_string())])?;
    self.get_page(url, page, kind).await
  }

  /// Fetch one page for any paged query
  pub async fn page(&self, query: &CatalogQuery, page: u32) -> Result<Page<MediaSummary>> {
    match query {
      CatalogQuery::List { kind, list } => self.list(*kind, *list, page).await,
      CatalogQuery::Search { scope, query } => self.search(*scope, query, page).await,
      CatalogQuery::Recommendations { kind, id } => self.recommendations(*kind, *id, page).await,
      CatalogQuery::Details { .. }
      | CatalogQuery::Credits { .. }
      | CatalogQuery::PersonCredits { .. }
      | CatalogQuery::Season { .. }
      | CatalogQuery::Episode { .. }
      | CatalogQuery::Reviews { .. } => Err(eyre!("{} is not a paged query", query.description())),
    }
  }

  fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", self.base, path))
      .map_err(|e| eyre!("Invalid request url {}{}: {}", self.base, path, e))?;
    {
      let mut pairs = url.query_pairs_mut();
      for (name, value) in params {
        pairs.append_pair(name, value);
      }
      if let Some(language) = &self.language {
        pairs.append_pair("language", language);
      }
    }
    // An empty query string still leaves a trailing '?'
    if url.query() == Some("") {
      url.set_query(None);
    }
    Ok(url)
  }

  async fn get_body(&self, url: Url) -> Result<String> {
    debug!(%url, "catalog request");
    let response = self
      .http
      .get(url.clone())
      .bearer_auth(&self.token)
      .header(ACCEPT, "application/json")
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url.path(), e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Request to {} failed with status {}", url.path(), status));
    }

    response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read response from {}: {}", url.path(), e))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    let path = url.path().to_string();
    let body = self.get_body(url).await?;
    serde_json::from_str(&body).map_err(|e| eyre!("Failed to parse response from {}: {}", path, e))
  }

  async fn get_page(&self, url: Url, page: u32, fallback: MediaKind) -> Result<Page<MediaSummary>> {
    let body = self.get_body(url).await?;
    Ok(parse_page(&body, page, fallback))
  }
}

/// Decode a list body. A body that does not parse counts as an empty page.
pub fn parse_page(body: &str, page: u32, fallback: MediaKind) -> Page<MediaSummary> {
  match serde_json::from_str::<ApiPagedResponse>(body) {
    Ok(response) => Page {
      page: response.page.unwrap_or(page),
      results: response
        .results
        .into_iter()
        .map(|item| item.into_summary(fallback))
        .collect(),
      total_pages: response.total_pages,
      total_results: response.total_results,
    },
    Err(e) => {
      warn!(page, error = %e, "malformed list response, treating as empty");
      Page::empty(page)
    }
  }
}

fn list_path(kind: MediaKind, list: ListKind) -> String {
  let kind = kind.as_str();
  match list {
    ListKind::Popular => format!("/{}/popular", kind),
    ListKind::TopRated => format!("/{}/top_rated", kind),
    ListKind::Trending => format!("/trending/{}/week", kind),
    ListKind::NowPlaying if kind == "tv" => "/tv/on_the_air".to_string(),
    ListKind::NowPlaying => format!("/{}/now_playing", kind),
  }
}

fn title_segment(kind: MediaKind) -> Result<&'static str> {
  match kind {
    MediaKind::Movie | MediaKind::Tv => Ok(kind.as_str()),
    MediaKind::Person => Err(eyre!("People have no title endpoints")),
  }
}
