//! `:` commands and their autocomplete.

use crate::catalog::{ListKind, MediaKind};

/// What a command does once resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  /// Switch between movies and series
  Mode(MediaKind),
  /// Switch the list tab
  Tab(ListKind),
  /// Refetch the current view
  Refresh,
  /// Drop every cached response
  ClearCache,
  Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "movies",
    aliases: &["m", "movie"],
    description: "Browse movies",
    action: CommandAction::Mode(MediaKind::Movie),
  },
  Command {
    name: "tv",
    aliases: &["series", "shows"],
    description: "Browse TV series",
    action: CommandAction::Mode(MediaKind::Tv),
  },
  Command {
    name: "popular",
    aliases: &["p", "pop"],
    description: "Popular titles",
    action: CommandAction::Tab(ListKind::Popular),
  },
  Command {
    name: "top",
    aliases: &["top_rated", "rated"],
    description: "Top rated titles",
    action: CommandAction::Tab(ListKind::TopRated),
  },
  Command {
    name: "trending",
    aliases: &["t", "week"],
    description: "Trending this week",
    action: CommandAction::Tab(ListKind::Trending),
  },
  Command {
    name: "now",
    aliases: &["now_playing", "on_the_air", "airing"],
    description: "Now playing / on the air",
    action: CommandAction::Tab(ListKind::NowPlaying),
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Refetch the current view",
    action: CommandAction::Refresh,
  },
  Command {
    name: "clear-cache",
    aliases: &["cc"],
    description: "Forget cached responses",
    action: CommandAction::ClearCache,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit cinedex",
    action: CommandAction::Quit,
  },
];

/// Look up a command by exact name or alias
pub fn find(input: &str) -> Option<&'static Command> {
  let input = input.trim().to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == input || cmd.aliases.contains(&input.as_str()))
}

/// Autocomplete suggestions, best match first
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u8)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_rank(cmd, &input).map(|rank| (cmd, rank)))
    .collect();
  // Stable sort keeps declaration order within a rank
  matches.sort_by_key(|(_, rank)| *rank);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Lower is better: exact, then prefix, then substring; names before aliases.
fn match_rank(cmd: &Command, input: &str) -> Option<u8> {
  let aliases = || cmd.aliases.iter();
  if cmd.name == input {
    Some(0)
  } else if aliases().any(|a| *a == input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if aliases().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if aliases().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}
