use cinedex::app::{App, StartupOptions};
use cinedex::catalog::MediaKind;
use cinedex::{config, logging};

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cinedex")]
#[command(about = "A terminal browser for the TMDB movie and TV catalog")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/cinedex/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Start in TV mode instead of movies
  #[arg(long)]
  tv: bool,

  /// Initial search text
  #[arg(short, long)]
  query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Keep the guard alive so buffered log lines are flushed on exit
  let _log_guard = logging::init()?;

  let config = config::Config::load(args.config.as_deref())?;

  let options = StartupOptions {
    kind: if args.tv { MediaKind::Tv } else { MediaKind::Movie },
    query: args.query.unwrap_or_default(),
  };

  let mut app = App::new(config, options)?;
  app.run().await?;

  Ok(())
}
