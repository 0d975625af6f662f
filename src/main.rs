use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use itkdb_browser::{
    browser_tui::App,
    cli::Cli,
    config::Config,
    itkdb::{Authenticator, HttpAuthenticator},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", Cli::version_line());
        return Ok(());
    }

    let mut config = Config::from_env()?;
    if let Some(path) = cli.log_file {
        config = config.with_log_file(path);
    }
    config.validate()?;

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "itkdb_browser=info");
    }

    // The terminal belongs to the UI, so logs only go to the file
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
    let (log_dir, log_name) = config.log_file_parts();
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    info!("Starting {}", Cli::version_line());

    let authenticator: Arc<dyn Authenticator> = Arc::new(
        HttpAuthenticator::new(config.clone()).context("Failed to build the HTTP client")?,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, authenticator);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            info!("itkdb-browser exited successfully");
        }
        Err(e) => {
            error!("itkdb-browser encountered an error: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
