use clap::Parser;
use color_eyre::Result;
use crossterm::event::{self, Event as CEvent};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use optix::config::Config;
use optix::logging::{self, LogLevel};
use optix::tui::App;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Terminal dashboard for asking questions about an inventory CSV
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Write the log here instead of ./optix.log
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Upload this CSV on startup
    #[arg(long = "load", value_name = "CSV")]
    load: Option<PathBuf>,
    /// Backend base URL (overrides the config file)
    #[arg(long = "backend-url", value_name = "URL")]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let log_path = logging::init_with(args.log_file.as_deref(), args.logging)?;
    info!("Logging to {}", log_path.display());

    let mut config = Config::from_path(args.config.as_deref())?;
    if let Some(url) = args.backend_url {
        config.backend.base_url = url;
    }
    info!("Using backend at {}", config.backend.base_url);

    let mut app = App::new(&config)?;
    if let Some(path) = &args.load {
        app.upload_file(path);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // App loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    if let Err(e) = &res {
        error!("Error: {e}");
    }
    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.drain_events();
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(100))?
            && let CEvent::Key(key_event) = event::read()?
            && let Err(e) = app.handle_key_event(key_event)
        {
            error!("Error handling key event: {e}");
            app.session_mut().notice(format!("Error: {e}"));
        }

        if app.should_quit() {
            break;
        }
    }
    Ok(())
}
