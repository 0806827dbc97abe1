//! Serde-deserializable types matching catalog API responses.
//!
//! Everything is defaulted so a sparse or partial body still parses; the
//! conversions normalize movie/series naming differences.

use serde::de::IgnoredAny;
use serde::Deserialize;

use super::types::{
  CastMember, Credits, EpisodeDetails, EpisodeSummary, MediaKind, MediaSummary, MovieDetails,
  PersonCredit, PersonCredits, PersonDetails, Review, Reviews, SeasonDetails, SeasonSummary,
  TvDetails,
};

// ============================================================================
// Paged list responses
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ApiPagedResponse {
  #[serde(default)]
  pub page: Option<u32>,
  #[serde(default)]
  pub results: Vec<ApiMediaItem>,
  #[serde(default)]
  pub total_pages: Option<u32>,
  #[serde(default)]
  pub total_results: Option<u64>,
}

/// List item; movies carry `title`/`release_date`, series and people `name`/`first_air_date`
#[derive(Debug, Default, Deserialize)]
pub struct ApiMediaItem {
  #[serde(default)]
  pub id: u64,
  pub media_type: Option<String>,
  pub title: Option<String>,
  pub name: Option<String>,
  pub release_date: Option<String>,
  pub first_air_date: Option<String>,
  #[serde(default)]
  pub overview: String,
  pub vote_average: Option<f64>,
  pub poster_path: Option<String>,
  pub profile_path: Option<String>,
}

impl ApiMediaItem {
  /// Convert to a summary; `fallback` is used when the item has no `media_type`.
  pub fn into_summary(self, fallback: MediaKind) -> MediaSummary {
    let kind = self
      .media_type
      .as_deref()
      .and_then(MediaKind::parse)
      .unwrap_or(fallback);
    let date = self.release_date.or(self.first_air_date);
    MediaSummary {
      id: self.id,
      kind,
      title: self.title.or(self.name).unwrap_or_default(),
      year: date.as_deref().and_then(year_of),
      overview: self.overview,
      vote_average: self.vote_average,
      image_path: self.poster_path.or(self.profile_path),
    }
  }
}

/// Year prefix of a `YYYY-MM-DD` date; empty strings yield `None`.
pub fn year_of(date: &str) -> Option<String> {
  let year = date.split('-').next()?;
  (!year.is_empty()).then(|| year.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

// ============================================================================
// Detail responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiGenre {
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiMovie {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  pub tagline: Option<String>,
  #[serde(default)]
  pub overview: String,
  pub release_date: Option<String>,
  pub runtime: Option<u32>,
  #[serde(default)]
  pub genres: Vec<ApiGenre>,
  pub status: Option<String>,
  pub vote_average: Option<f64>,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
}

impl From<ApiMovie> for MovieDetails {
  fn from(api: ApiMovie) -> Self {
    Self {
      id: api.id,
      title: api.title,
      tagline: non_empty(api.tagline),
      overview: api.overview,
      release_date: non_empty(api.release_date),
      runtime: api.runtime.filter(|r| *r > 0),
      genres: api.genres.into_iter().map(|g| g.name).collect(),
      status: api.status,
      vote_average: api.vote_average,
      poster_path: api.poster_path,
      backdrop_path: api.backdrop_path,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiTv {
  pub id: u64,
  #[serde(default)]
  pub name: String,
  pub tagline: Option<String>,
  #[serde(default)]
  pub overview: String,
  pub first_air_date: Option<String>,
  pub last_air_date: Option<String>,
  pub number_of_seasons: Option<u32>,
  pub number_of_episodes: Option<u32>,
  #[serde(default)]
  pub genres: Vec<ApiGenre>,
  pub status: Option<String>,
  pub vote_average: Option<f64>,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
  #[serde(default)]
  pub seasons: Vec<ApiSeasonSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSeasonSummary {
  #[serde(default)]
  pub season_number: u32,
  #[serde(default)]
  pub name: String,
  pub air_date: Option<String>,
  pub episode_count: Option<u32>,
}

impl From<ApiTv> for TvDetails {
  fn from(api: ApiTv) -> Self {
    Self {
      id: api.id,
      name: api.name,
      tagline: non_empty(api.tagline),
      overview: api.overview,
      first_air_date: non_empty(api.first_air_date),
      last_air_date: non_empty(api.last_air_date),
      number_of_seasons: api.number_of_seasons,
      number_of_episodes: api.number_of_episodes,
      genres: api.genres.into_iter().map(|g| g.name).collect(),
      status: api.status,
      vote_average: api.vote_average,
      poster_path: api.poster_path,
      backdrop_path: api.backdrop_path,
      seasons: api
        .seasons
        .into_iter()
        .map(|season| SeasonSummary {
          season_number: season.season_number,
          name: season.name,
          air_date: non_empty(season.air_date),
          episode_count: season.episode_count,
        })
        .collect(),
    }
  }
}

// ============================================================================
// Seasons and episodes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiSeason {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub season_number: u32,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub overview: String,
  pub air_date: Option<String>,
  pub poster_path: Option<String>,
  #[serde(default)]
  pub episodes: Vec<ApiEpisode>,
}

impl ApiSeason {
  /// Season bodies do not name their series, so the caller supplies it.
  pub fn into_details(self, tv_id: u64) -> SeasonDetails {
    let mut episodes = self.episodes;
    episodes.sort_by_key(|e| e.episode_number);
    SeasonDetails {
      id: self.id,
      tv_id,
      season_number: self.season_number,
      name: self.name,
      overview: self.overview,
      air_date: non_empty(self.air_date),
      poster_path: self.poster_path,
      episodes: episodes
        .into_iter()
        .map(|e| EpisodeSummary {
          episode_number: e.episode_number,
          name: e.name,
          air_date: non_empty(e.air_date),
          runtime: e.runtime.filter(|r| *r > 0),
          vote_average: e.vote_average,
        })
        .collect(),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiEpisode {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub season_number: u32,
  #[serde(default)]
  pub episode_number: u32,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub overview: String,
  pub air_date: Option<String>,
  pub runtime: Option<u32>,
  pub vote_average: Option<f64>,
  pub still_path: Option<String>,
  #[serde(default)]
  pub guest_stars: Vec<ApiCastMember>,
  #[serde(default)]
  pub crew: Vec<ApiCrewMember>,
}

impl ApiEpisode {
  pub fn into_details(self, tv_id: u64) -> EpisodeDetails {
    let mut guests = self.guest_stars;
    guests.sort_by_key(|c| c.order.unwrap_or(u32::MAX));
    EpisodeDetails {
      id: self.id,
      tv_id,
      season_number: self.season_number,
      episode_number: self.episode_number,
      name: self.name,
      overview: self.overview,
      air_date: non_empty(self.air_date),
      runtime: self.runtime.filter(|r| *r > 0),
      vote_average: self.vote_average,
      still_path: self.still_path,
      guest_stars: guests.into_iter().map(cast_member).collect(),
      directors: directors(self.crew),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiPerson {
  pub id: u64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub biography: String,
  pub birthday: Option<String>,
  pub deathday: Option<String>,
  pub place_of_birth: Option<String>,
  pub known_for_department: Option<String>,
  pub profile_path: Option<String>,
}

impl From<ApiPerson> for PersonDetails {
  fn from(api: ApiPerson) -> Self {
    Self {
      id: api.id,
      name: api.name,
      biography: api.biography,
      birthday: non_empty(api.birthday),
      deathday: non_empty(api.deathday),
      place_of_birth: non_empty(api.place_of_birth),
      known_for_department: api.known_for_department,
      profile_path: api.profile_path,
    }
  }
}

// ============================================================================
// Credits
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiCastMember {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub name: String,
  pub character: Option<String>,
  pub order: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCrewMember {
  #[serde(default)]
  pub name: String,
  pub job: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiCredits {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub cast: Vec<ApiCastMember>,
  #[serde(default)]
  pub crew: Vec<ApiCrewMember>,
}

impl From<ApiCredits> for Credits {
  fn from(api: ApiCredits) -> Self {
    let mut cast = api.cast;
    cast.sort_by_key(|c| c.order.unwrap_or(u32::MAX));
    Self {
      id: api.id,
      cast: cast.into_iter().map(cast_member).collect(),
      directors: directors(api.crew),
    }
  }
}

fn cast_member(api: ApiCastMember) -> CastMember {
  CastMember {
    id: api.id,
    name: api.name,
    character: non_empty(api.character),
  }
}

fn directors(crew: Vec<ApiCrewMember>) -> Vec<String> {
  crew
    .into_iter()
    .filter(|c| c.job.as_deref() == Some("Director"))
    .map(|c| c.name)
    .collect()
}

// ============================================================================
// Person filmography
// ============================================================================

/// Combined-credits entry; movies carry `title`/`release_date`, series `name`/`first_air_date`
#[derive(Debug, Deserialize)]
pub struct ApiCreditEntry {
  #[serde(default)]
  pub id: u64,
  pub media_type: Option<String>,
  pub title: Option<String>,
  pub name: Option<String>,
  pub release_date: Option<String>,
  pub first_air_date: Option<String>,
  pub character: Option<String>,
  pub episode_count: Option<u32>,
  pub popularity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiCombinedCredits {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub cast: Vec<ApiCreditEntry>,
  #[serde(default)]
  pub crew: Vec<IgnoredAny>,
}

impl From<ApiCombinedCredits> for PersonCredits {
  fn from(api: ApiCombinedCredits) -> Self {
    let mut entries = api.cast;
    entries.sort_by(|a, b| {
      let (a, b) = (a.popularity.unwrap_or(0.0), b.popularity.unwrap_or(0.0));
      b.total_cmp(&a)
    });

    // A series shows up once per character played
    let mut cast: Vec<PersonCredit> = Vec::with_capacity(entries.len());
    for entry in entries {
      let Some(kind) = entry.media_type.as_deref().and_then(MediaKind::parse) else {
        continue;
      };
      if kind == MediaKind::Person || entry.id == 0 {
        continue;
      }
      if cast.iter().any(|c| c.kind == kind && c.id == entry.id) {
        continue;
      }
      let date = entry.release_date.or(entry.first_air_date);
      cast.push(PersonCredit {
        id: entry.id,
        kind,
        title: entry.title.or(entry.name).unwrap_or_default(),
        year: date.as_deref().and_then(year_of),
        character: non_empty(entry.character),
        episode_count: entry.episode_count,
      });
    }

    Self {
      id: api.id,
      cast,
      crew_count: api.crew.len(),
    }
  }
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ApiAuthorDetails {
  pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiReview {
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub author_details: ApiAuthorDetails,
  #[serde(default)]
  pub content: String,
  pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiReviews {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub results: Vec<ApiReview>,
  pub total_results: Option<u64>,
}

impl From<ApiReviews> for Reviews {
  fn from(api: ApiReviews) -> Self {
    Self {
      id: api.id,
      results: api
        .results
        .into_iter()
        .map(|r| Review {
          author: r.author,
          rating: r.author_details.rating,
          content: r.content.trim().to_string(),
          // `2021-06-23T15:58:21.925Z` -> `2021-06-23`
          created_at: r
            .created_at
            .and_then(|at| at.split('T').next().map(str::to_string))
            .filter(|d| !d.is_empty()),
        })
        .collect(),
      total_results: api.total_results,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_movie_item_uses_title_and_release_year() {
    let item: ApiMediaItem = serde_json::from_str(
      r#"{"id": 268, "title": "Batman", "release_date": "1989-06-23", "overview": "x", "poster_path": "/p.jpg"}"#,
    )
    .unwrap();
    let summary = item.into_summary(MediaKind::Movie);
    assert_eq!(summary.title, "Batman");
    assert_eq!(summary.year.as_deref(), Some("1989"));
    assert_eq!(summary.kind, MediaKind::Movie);
    assert_eq!(summary.image_path.as_deref(), Some("/p.jpg"));
  }

  #[test]
  fn test_multi_item_uses_media_type_and_name() {
    let item: ApiMediaItem = serde_json::from_str(
      r#"{"id": 3, "media_type": "person", "name": "Michael Keaton", "profile_path": "/k.jpg"}"#,
    )
    .unwrap();
    let summary = item.into_summary(MediaKind::Movie);
    assert_eq!(summary.kind, MediaKind::Person);
    assert_eq!(summary.title, "Michael Keaton");
    assert_eq!(summary.year, None);
    assert_eq!(summary.image_path.as_deref(), Some("/k.jpg"));
  }

  #[test]
  fn test_missing_results_is_empty_page() {
    let page: ApiPagedResponse = serde_json::from_str(r#"{"page": 1}"#).unwrap();
    assert!(page.results.is_empty());
    let page: ApiPagedResponse = serde_json::from_str("{}").unwrap();
    assert!(page.results.is_empty());
  }

  #[test]
  fn test_year_of_empty_date() {
    assert_eq!(year_of(""), None);
    assert_eq!(year_of("2008-07-16").as_deref(), Some("2008"));
  }

  #[test]
  fn test_credits_sorted_by_billing_with_directors() {
    let api: ApiCredits = serde_json::from_str(
      r#"{
        "id": 155,
        "cast": [
          {"id": 2, "name": "Heath Ledger", "character": "Joker", "order": 1},
          {"id": 1, "name": "Christian Bale", "character": "Bruce Wayne", "order": 0}
        ],
        "crew": [
          {"name": "Christopher Nolan", "job": "Director"},
          {"name": "Hans Zimmer", "job": "Original Music Composer"}
        ]
      }"#,
    )
    .unwrap();
    let credits = Credits::from(api);
    assert_eq!(credits.cast[0].name, "Christian Bale");
    assert_eq!(credits.cast[1].character.as_deref(), Some("Joker"));
    assert_eq!(credits.directors, vec!["Christopher Nolan".to_string()]);
  }

  #[test]
  fn test_movie_details_blank_fields_become_none() {
    let api: ApiMovie = serde_json::from_str(
      r#"{"id": 1, "title": "Short", "tagline": "", "release_date": "", "runtime": 0, "genres": [{"id": 18, "name": "Drama"}]}"#,
    )
    .unwrap();
    let movie = MovieDetails::from(api);
    assert_eq!(movie.tagline, None);
    assert_eq!(movie.release_date, None);
    assert_eq!(movie.runtime, None);
    assert_eq!(movie.genres, vec!["Drama".to_string()]);
  }

  #[test]
  fn test_combined_credits_popular_first_and_deduplicated() {
    let api: ApiCombinedCredits = serde_json::from_str(
      r#"{
        "id": 10205,
        "cast": [
          {"id": 348, "media_type": "movie", "title": "Alien", "release_date": "1979-05-25", "character": "Ripley", "popularity": 40.5},
          {"id": 1668, "media_type": "tv", "name": "Friends", "first_air_date": "1994-09-22", "character": "Guest", "episode_count": 1, "popularity": 90.0},
          {"id": 1668, "media_type": "tv", "name": "Friends", "character": "Herself", "popularity": 90.0},
          {"id": 679, "media_type": "movie", "title": "Aliens", "release_date": ""}
        ],
        "crew": [{"id": 1, "job": "Producer"}]
      }"#,
    )
    .unwrap();
    let credits = PersonCredits::from(api);
    let titles: Vec<&str> = credits.cast.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Friends", "Alien", "Aliens"]);
    assert_eq!(credits.cast[0].kind, MediaKind::Tv);
    assert_eq!(credits.cast[0].episode_count, Some(1));
    assert_eq!(credits.cast[1].year.as_deref(), Some("1979"));
    assert_eq!(credits.cast[2].year, None);
    assert_eq!(credits.crew_count, 1);
  }

  #[test]
  fn test_tv_details_carry_seasons() {
    let api: ApiTv = serde_json::from_str(
      r#"{"id": 1399, "name": "Game of Thrones", "seasons": [
        {"season_number": 0, "name": "Specials", "episode_count": 12, "air_date": ""},
        {"season_number": 1, "name": "Season 1", "episode_count": 10, "air_date": "2011-04-17"}
      ]}"#,
    )
    .unwrap();
    let tv = TvDetails::from(api);
    assert_eq!(tv.seasons.len(), 2);
    assert_eq!(tv.seasons[0].air_date, None);
    assert_eq!(tv.seasons[1].episode_count, Some(10));
  }

  #[test]
  fn test_season_episodes_in_order() {
    let api: ApiSeason = serde_json::from_str(
      r#"{"id": 3624, "season_number": 1, "name": "Season 1", "episodes": [
        {"episode_number": 2, "name": "The Kingsroad", "runtime": 56},
        {"episode_number": 1, "name": "Winter Is Coming", "runtime": 0}
      ]}"#,
    )
    .unwrap();
    let season = api.into_details(1399);
    assert_eq!(season.tv_id, 1399);
    assert_eq!(season.episodes[0].name, "Winter Is Coming");
    assert_eq!(season.episodes[0].runtime, None);
    assert_eq!(season.episodes[1].runtime, Some(56));
  }

  #[test]
  fn test_episode_guests_and_directors() {
    let api: ApiEpisode = serde_json::from_str(
      r#"{"id": 63056, "season_number": 1, "episode_number": 1, "name": "Winter Is Coming",
        "still_path": "/s.jpg",
        "guest_stars": [{"id": 7, "name": "Guest B", "order": 2}, {"id": 6, "name": "Guest A", "order": 1}],
        "crew": [{"name": "Tim Van Patten", "job": "Director"}, {"name": "D. B. Weiss", "job": "Writer"}]}"#,
    )
    .unwrap();
    let episode = api.into_details(1399);
    assert_eq!(episode.guest_stars[0].name, "Guest A");
    assert_eq!(episode.directors, vec!["Tim Van Patten".to_string()]);
    assert_eq!(episode.still_path.as_deref(), Some("/s.jpg"));
  }

  #[test]
  fn test_reviews_keep_author_rating_and_date() {
    let api: ApiReviews = serde_json::from_str(
      r#"{"id": 348, "results": [
        {"author": "Ana", "author_details": {"rating": 9.0}, "content": "  Still terrifying.\n", "created_at": "2021-06-23T15:58:21.925Z"},
        {"author": "Ben", "content": "Fine."}
      ], "total_results": 2}"#,
    )
    .unwrap();
    let reviews = Reviews::from(api);
    assert_eq!(reviews.results[0].rating, Some(9.0));
    assert_eq!(reviews.results[0].content, "Still terrifying.");
    assert_eq!(reviews.results[0].created_at.as_deref(), Some("2021-06-23"));
    assert_eq!(reviews.results[1].rating, None);
    assert_eq!(reviews.total_results, Some(2));
  }
}
