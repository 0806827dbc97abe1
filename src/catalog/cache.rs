//! Caching implementations for catalog types.

use serde_json::Value;

use crate::cache::{nonzero_id, CatalogEntity, RequestKey};

use super::types::{
  Credits, EpisodeDetails, ListKind, MediaKind, MediaSummary, MovieDetails, PersonCredits,
  PersonDetails, Reviews, SearchScope, SeasonDetails, TvDetails,
};

// ============================================================================
// CatalogEntity implementations
// ============================================================================

impl CatalogEntity for MediaSummary {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "summary"
  }
}

impl CatalogEntity for MovieDetails {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "movie"
  }
}

impl CatalogEntity for TvDetails {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "tv"
  }
}

impl CatalogEntity for PersonDetails {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "person"
  }
}

impl CatalogEntity for Credits {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "credits"
  }
}

impl CatalogEntity for PersonCredits {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "person_credits"
  }
}

impl CatalogEntity for SeasonDetails {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "season"
  }
}

impl CatalogEntity for EpisodeDetails {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "episode"
  }
}

impl CatalogEntity for Reviews {
  fn entity_id(&self) -> Option<u64> {
    nonzero_id(self.id)
  }

  fn entity_type() -> &'static str {
    "reviews"
  }
}

// ============================================================================
// Query key types
// ============================================================================

/// Query key types for catalog API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogQuery {
  /// Curated list for movies or series
  List { kind: MediaKind, list: ListKind },
  /// Free-text search
  Search { scope: SearchScope, query: String },
  /// Single entity details
  Details { kind: MediaKind, id: u64 },
  /// Cast and crew for a title
  Credits { kind: MediaKind, id: u64 },
  /// Titles recommended from a title
  Recommendations { kind: MediaKind, id: u64 },
  /// A person's movie and series credits
  PersonCredits { id: u64 },
  /// One season of a series, with its episodes
  Season { tv_id: u64, season: u32 },
  /// One episode of a series
  Episode { tv_id: u64, season: u32, episode: u32 },
  /// First page of user reviews for a title
  Reviews { kind: MediaKind, id: u64 },
}

impl CatalogQuery {
  /// Browse query for a view: search when there is text, the list tab otherwise.
  pub fn browse(kind: MediaKind, list: ListKind, query: &str) -> Self {
    if query.trim().is_empty() {
      CatalogQuery::List { kind, list }
    } else {
      CatalogQuery::Search {
        scope: kind.into(),
        query: query.to_string(),
      }
    }
  }

  /// Cache key for this query. Detail keys remember their entity id.
  pub fn request_key(&self) -> RequestKey {
    match self {
      Self::List { kind, list } => RequestKey::new(["list", kind.as_str(), list.as_str()]),
      Self::Search { scope, query } => RequestKey::new([
        Value::from("search"),
        Value::from(scope.as_str()),
        Value::from(normalize_query(query)),
      ]),
      Self::Details { kind, id } => RequestKey::entity(kind.as_str(), *id),
      Self::Credits { kind, id } => RequestKey::new([
        Value::from("credits"),
        Value::from(kind.as_str()),
        Value::from(*id),
      ]),
      Self::Recommendations { kind, id } => RequestKey::new([
        Value::from("recommendations"),
        Value::from(kind.as_str()),
        Value::from(*id),
      ]),
      Self::PersonCredits { id } => {
        RequestKey::new([Value::from("person_credits"), Value::from(*id)])
      }
      Self::Season { tv_id, season } => RequestKey::new([
        Value::from("season"),
        Value::from(*tv_id),
        Value::from(*season),
      ]),
      Self::Episode {
        tv_id,
        season,
        episode,
      } => RequestKey::new([
        Value::from("episode"),
        Value::from(*tv_id),
        Value::from(*season),
        Value::from(*episode),
      ]),
      Self::Reviews { kind, id } => RequestKey::new([
        Value::from("reviews"),
        Value::from(kind.as_str()),
        Value::from(*id),
      ]),
    }
  }

  pub fn description(&self) -> String {
    match self {
      Self::List { kind, list } => format!("{} {}", list.label(*kind), kind_plural(*kind)),
      Self::Search { scope, query } => format!("{} search: {}", scope.as_str(), query.trim()),
      Self::Details { kind, id } => format!("{} {}", kind, id),
      Self::Credits { kind, id } => format!("credits for {} {}", kind, id),
      Self::Recommendations { kind, id } => format!("recommendations for {} {}", kind, id),
      Self::PersonCredits { id } => format!("credits for person {}", id),
      Self::Season { tv_id, season } => format!("season {} of tv {}", season, tv_id),
      Self::Episode {
        tv_id,
        season,
        episode,
      } => format!("episode S{:02}E{:02} of tv {}", season, episode, tv_id),
      Self::Reviews { kind, id } => format!("reviews for {} {}", kind, id),
    }
  }
}

fn kind_plural(kind: MediaKind) -> &'static str {
  match kind {
    MediaKind::Movie => "movies",
    MediaKind::Tv => "series",
    MediaKind::Person => "people",
  }
}

/// Normalize search text for consistent keys.
/// Trims whitespace and lowercases; catalog search is case-insensitive.
fn normalize_query(query: &str) -> String {
  query.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_details_key_is_entity_key() {
    let key = CatalogQuery::Details {
      kind: MediaKind::Movie,
      id: 42,
    }
    .request_key();
    assert_eq!(key.as_str(), r#"["movie",42]"#);
    assert_eq!(key.entity_id(), Some(42));
  }

  #[test]
  fn test_search_keys_are_normalized() {
    let a = CatalogQuery::Search {
      scope: SearchScope::Movie,
      query: "  Batman ".to_string(),
    };
    let b = CatalogQuery::Search {
      scope: SearchScope::Movie,
      query: "batman".to_string(),
    };
    assert_eq!(a.request_key(), b.request_key());
    assert_eq!(a.request_key().as_str(), r#"["search","movie","batman"]"#);
  }

  #[test]
  fn test_browse_picks_search_for_text() {
    assert_eq!(
      CatalogQuery::browse(MediaKind::Tv, ListKind::Popular, "   "),
      CatalogQuery::List {
        kind: MediaKind::Tv,
        list: ListKind::Popular
      }
    );
    assert_eq!(
      CatalogQuery::browse(MediaKind::Tv, ListKind::Popular, "lost"),
      CatalogQuery::Search {
        scope: SearchScope::Tv,
        query: "lost".to_string()
      }
    );
  }

  #[test]
  fn test_distinct_resources_get_distinct_keys() {
    let details = CatalogQuery::Details {
      kind: MediaKind::Tv,
      id: 1399,
    };
    let credits = CatalogQuery::Credits {
      kind: MediaKind::Tv,
      id: 1399,
    };
    let movie = CatalogQuery::Details {
      kind: MediaKind::Movie,
      id: 1399,
    };
    assert_ne!(details.request_key(), credits.request_key());
    assert_ne!(details.request_key(), movie.request_key());
  }

  #[test]
  fn test_description() {
    let query = CatalogQuery::List {
      kind: MediaKind::Tv,
      list: ListKind::NowPlaying,
    };
    assert_eq!(query.description(), "On The Air series");
  }

  #[test]
  fn test_season_and_episode_keys() {
    let season = CatalogQuery::Season {
      tv_id: 1399,
      season: 1,
    };
    let episode = CatalogQuery::Episode {
      tv_id: 1399,
      season: 1,
      episode: 1,
    };
    assert_eq!(season.request_key().as_str(), r#"["season",1399,1]"#);
    assert_eq!(episode.request_key().as_str(), r#"["episode",1399,1,1]"#);
    assert_eq!(episode.description(), "episode S01E01 of tv 1399");
    // Only plain entity keys consult the prefetch tier
    assert_eq!(season.request_key().entity_id(), None);
  }

  #[test]
  fn test_person_credits_key_differs_from_person() {
    let credits = CatalogQuery::PersonCredits { id: 10205 };
    let person = CatalogQuery::Details {
      kind: MediaKind::Person,
      id: 10205,
    };
    assert_ne!(credits.request_key(), person.request_key());
    assert_eq!(credits.request_key().as_str(), r#"["person_credits",10205]"#);
  }
}
