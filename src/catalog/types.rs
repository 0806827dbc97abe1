use std::fmt;

/// Kind of catalog entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
  Movie,
  Tv,
  Person,
}

impl MediaKind {
  /// Path segment and key component for this kind
  pub fn as_str(&self) -> &'static str {
    match self {
      MediaKind::Movie => "movie",
      MediaKind::Tv => "tv",
      MediaKind::Person => "person",
    }
  }

  pub fn parse(value: &str) -> Option<Self> {
    match value {
      "movie" => Some(MediaKind::Movie),
      "tv" => Some(MediaKind::Tv),
      "person" => Some(MediaKind::Person),
      _ => None,
    }
  }
}

impl fmt::Display for MediaKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Curated list tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
  Popular,
  TopRated,
  Trending,
  /// "Now playing" for movies, "on the air" for series
  NowPlaying,
}

impl ListKind {
  pub const ALL: [ListKind; 4] = [
    ListKind::Popular,
    ListKind::TopRated,
    ListKind::Trending,
    ListKind::NowPlaying,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ListKind::Popular => "popular",
      ListKind::TopRated => "top_rated",
      ListKind::Trending => "trending",
      ListKind::NowPlaying => "now_playing",
    }
  }

  pub fn label(&self, kind: MediaKind) -> &'static str {
    match (self, kind) {
      (ListKind::Popular, _) => "Popular",
      (ListKind::TopRated, _) => "Top Rated",
      (ListKind::Trending, _) => "Trending",
      (ListKind::NowPlaying, MediaKind::Tv) => "On The Air",
      (ListKind::NowPlaying, _) => "Now Playing",
    }
  }
}

/// A row in any list or search result
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSummary {
  pub id: u64,
  pub kind: MediaKind,
  /// `title` for movies, `name` for series and people
  pub title: String,
  /// Release or first-air year
  pub year: Option<String>,
  pub overview: String,
  pub vote_average: Option<f64>,
  /// Poster for titles, profile picture for people
  pub image_path: Option<String>,
}

/// Full movie details
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
  pub id: u64,
  pub title: String,
  pub tagline: Option<String>,
  pub overview: String,
  pub release_date: Option<String>,
  pub runtime: Option<u32>,
  pub genres: Vec<String>,
  pub status: Option<String>,
  pub vote_average: Option<f64>,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
}

/// Full series details
#[derive(Debug, Clone, PartialEq)]
pub struct TvDetails {
  pub id: u64,
  pub name: String,
  pub tagline: Option<String>,
  pub overview: String,
  pub first_air_date: Option<String>,
  pub last_air_date: Option<String>,
  pub number_of_seasons: Option<u32>,
  pub number_of_episodes: Option<u32>,
  pub genres: Vec<String>,
  pub status: Option<String>,
  pub vote_average: Option<f64>,
  pub poster_path: Option<String>,
  pub backdrop_path: Option<String>,
  pub seasons: Vec<SeasonSummary>,
}

/// Season entry on a series
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonSummary {
  pub season_number: u32,
  pub name: String,
  pub air_date: Option<String>,
  pub episode_count: Option<u32>,
}

/// A season with its episode list
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonDetails {
  pub id: u64,
  pub tv_id: u64,
  pub season_number: u32,
  pub name: String,
  pub overview: String,
  pub air_date: Option<String>,
  pub poster_path: Option<String>,
  pub episodes: Vec<EpisodeSummary>,
}

/// Episode row in a season
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
  pub episode_number: u32,
  pub name: String,
  pub air_date: Option<String>,
  pub runtime: Option<u32>,
  pub vote_average: Option<f64>,
}

/// A single episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeDetails {
  pub id: u64,
  pub tv_id: u64,
  pub season_number: u32,
  pub episode_number: u32,
  pub name: String,
  pub overview: String,
  pub air_date: Option<String>,
  pub runtime: Option<u32>,
  pub vote_average: Option<f64>,
  pub still_path: Option<String>,
  pub guest_stars: Vec<CastMember>,
  pub directors: Vec<String>,
}

/// Person details
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDetails {
  pub id: u64,
  pub name: String,
  pub biography: String,
  pub birthday: Option<String>,
  pub deathday: Option<String>,
  pub place_of_birth: Option<String>,
  pub known_for_department: Option<String>,
  pub profile_path: Option<String>,
}

/// Billed cast member
#[derive(Debug, Clone, PartialEq)]
pub struct CastMember {
  pub id: u64,
  pub name: String,
  pub character: Option<String>,
}

/// Cast and crew for a title, cast in billing order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Credits {
  pub id: u64,
  pub cast: Vec<CastMember>,
  pub directors: Vec<String>,
}

/// A title in a person's filmography
#[derive(Debug, Clone, PartialEq)]
pub struct PersonCredit {
  pub id: u64,
  pub kind: MediaKind,
  pub title: String,
  pub year: Option<String>,
  pub character: Option<String>,
  pub episode_count: Option<u32>,
}

/// Acting credits across movies and series, most popular first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonCredits {
  pub id: u64,
  pub cast: Vec<PersonCredit>,
  pub crew_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
  pub author: String,
  /// Author's own score out of 10
  pub rating: Option<f64>,
  pub content: String,
  pub created_at: Option<String>,
}

/// First page of user reviews for a title
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reviews {
  pub id: u64,
  pub results: Vec<Review>,
  pub total_results: Option<u64>,
}

/// Which search endpoint to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchScope {
  Movie,
  Tv,
  /// Movies, series and people in one result set
  Multi,
}

impl SearchScope {
  pub fn as_str(&self) -> &'static str {
    match self {
      SearchScope::Movie => "movie",
      SearchScope::Tv => "tv",
      SearchScope::Multi => "multi",
    }
  }

  /// Kind assumed for results that do not carry a `media_type`
  pub fn default_kind(&self) -> MediaKind {
    match self {
      SearchScope::Tv => MediaKind::Tv,
      SearchScope::Movie | SearchScope::Multi => MediaKind::Movie,
    }
  }
}

impl From<MediaKind> for SearchScope {
  fn from(kind: MediaKind) -> Self {
    match kind {
      MediaKind::Movie => SearchScope::Movie,
      MediaKind::Tv => SearchScope::Tv,
      MediaKind::Person => SearchScope::Multi,
    }
  }
}
