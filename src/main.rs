mod app;
mod event;
mod logging;
mod ui;

use clap::Parser;
use color_eyre::Result;
use deliverable::config::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "deliverable")]
#[command(about = "A terminal browser for paginated delivery orders")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/deliverable/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the delivery API
  #[arg(long)]
  api_url: Option<String>,

  /// Number of orders per page
  #[arg(short = 'n', long)]
  page_size: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Command line wins over file and environment
  if let Some(url) = args.api_url {
    config.api.base_url = url;
  }
  if let Some(size) = args.page_size {
    config.pagination.items_per_page = size;
  }
  config.validate()?;

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
