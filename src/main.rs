#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::io::{self, stdout};
use std::sync::Arc;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use carform::api::{CarApi, HttpCarApi};
use carform::config::AppConfig;
use carform::form::SubmitPolicy;
use carform::logging;
use carform::tui::{App, AppError};

#[derive(Parser)]
#[command(name = "carform")]
#[command(about = "Create or edit car records from the terminal", long_about = None)]
struct Cli {
    /// Open the dialog on an existing car instead of a blank one
    #[arg(short, long, value_name = "ID")]
    edit: Option<String>,

    /// Car API base URL (overrides CARFORM_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Reset the form after every submit and keep it open on success
    #[arg(long)]
    legacy_reset: bool,
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().map_err(AppError::from)?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let log_path = logging::init().map_err(AppError::from)?;
    tracing::info!(api_url = %config.api_url, log = %log_path.display(), "starting carform");

    let policy = if cli.legacy_reset {
        SubmitPolicy::legacy()
    } else {
        config.submit_policy()
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let api = HttpCarApi::new(config.api_url.clone(), config.request_timeout())
        .map_err(AppError::from)?;
    let target = match &cli.edit {
        Some(id) => Some(runtime.block_on(api.get(id)).map_err(AppError::from)?),
        None => None,
    };

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(Arc::new(api), runtime.handle().clone(), policy);
    app.open_dialog(target);
    let result = app.run(&mut terminal);

    let restore_result = restore_terminal();
    match result {
        Err(e) => Err(e.into()),
        Ok(()) => restore_result.map_err(Into::into),
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn restore_terminal() -> Result<(), io::Error> {
    let raw_result = disable_raw_mode();
    let screen_result = execute!(stdout(), LeaveAlternateScreen);
    raw_result.and(screen_result)
}
