use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use linecore::Session;
use linesift::{
    app::{App, FileOutcome},
    cli::Cli,
    config::Config,
    file_manager::{display_name, FileManager},
    status_manager::StatusManager,
    ui,
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    widgets::Paragraph,
    Terminal,
};
use std::{env, fs::OpenOptions, io, path::PathBuf, time::Duration};

enum FileReport {
    Done(FileOutcome),
    Skipped(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = init_logger(cli.debug);
    let config = Config::load().await?;
    let file_manager = FileManager::new(config.large_file_warning_bytes);

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    if let Err(e) = enable_raw_mode() {
        eprintln!("Failed to initialize the terminal: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        eprintln!("Failed to set up the terminal: {}", e);
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let total = cli.files.len();
    let mut reports = Vec::with_capacity(total);
    let mut fatal = None;
    for (index, raw) in cli.files.iter().enumerate() {
        let label = format!("[{}/{}]", index + 1, total);
        match sift_file(&mut terminal, &file_manager, &config, raw, &label, cli.debug).await {
            Ok(report) => reports.push((raw.as_str(), report)),
            Err(e) => {
                log::error!("Stopping after {}: {}", raw, e);
                fatal = Some(e);
                break;
            }
        }
    }

    restore_terminal()?;

    let mut failures = 0;
    for (raw, report) in &reports {
        match report {
            FileReport::Done(outcome) => {
                if outcome.is_failure() {
                    failures += 1;
                }
                println!("{}: {}", raw, outcome);
            }
            FileReport::Skipped(reason) => println!("{}: skipped ({})", raw, reason),
        }
    }
    if let Some(path) = log_path {
        if cli.debug {
            println!("log: {}", path.display());
        }
    }

    if let Some(err) = fatal {
        eprintln!("linesift stopped: {}", err);
        if let Some(source) = err.source() {
            eprintln!("caused by: {}", source);
        }
        return Err(err);
    }
    if failures > 0 {
        return Err(anyhow::anyhow!("{} file(s) could not be processed", failures));
    }
    Ok(())
}

/// Logs go to a file since the terminal belongs to the TUI. Returns the log path.
fn init_logger(debug: bool) -> Option<PathBuf> {
    let mut logger = env_logger::Builder::from_default_env();
    if env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        if debug {
            logger.filter_module("linesift", LevelFilter::Debug);
            logger.filter_module("linecore", LevelFilter::Debug);
        }
    }

    let log_path = log_file_path();
    let opened = log_path.as_ref().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });
    let log_path = match opened {
        Some(file) => {
            logger.target(env_logger::Target::Pipe(Box::new(file)));
            log_path
        }
        None => {
            // stderr would scribble over the TUI; keep only what matters
            logger.filter_level(LevelFilter::Error);
            None
        }
    };
    logger.init();
    log_path
}

fn log_file_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("LINESIFT_LOG_FILE") {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("com", "linesift", "linesift").map(|dirs| dirs.data_dir().join("linesift.log"))
}

async fn sift_file<B: Backend>(
    terminal: &mut Terminal<B>,
    file_manager: &FileManager,
    config: &Config,
    raw: &str,
    label: &str,
    dry_run: bool,
) -> Result<FileReport> {
    let resolved = match file_manager.resolve(raw).await {
        Ok(resolved) => resolved,
        Err(e) => {
            log::warn!("Skipping {}: {}", raw, e);
            return Ok(FileReport::Skipped(e.to_string()));
        }
    };

    let name = display_name(&resolved.path);
    let notice = if file_manager.is_large(&resolved) {
        format!("{} indexing {} ({} bytes), this may take a while...", label, name, resolved.size)
    } else {
        format!("{} indexing {}...", label, name)
    };
    terminal.draw(|f| {
        let area = f.size();
        f.render_widget(Paragraph::new(notice.as_str()), area);
    })?;

    let options = config.session_options();
    let path = resolved.path.clone();
    let opened = tokio::task::spawn_blocking(move || Session::open(&path, &options)).await?;
    let session = match opened {
        Ok(session) => session,
        Err(e) if e.is_skippable() => {
            log::warn!("Skipping {}: {}", resolved.path.display(), e);
            return Ok(FileReport::Skipped(e.to_string()));
        }
        Err(e) => {
            log::error!("Failed to open {}: {}", resolved.path.display(), e);
            return Ok(FileReport::Done(FileOutcome::Failed(e.to_string())));
        }
    };
    log::info!(
        "Session opened for {} ({} lines)",
        resolved.path.display(),
        session.line_count()
    );

    let status = StatusManager::new(format!("{} {}", label, name));
    let app = App::new(session, config.clone(), status, dry_run);
    let outcome = run_app(terminal, app).await?;
    Ok(FileReport::Done(outcome))
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<FileOutcome> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &app)) {
            log::error!("Terminal draw error: {}", e);
        }

        app.update_status();

        if app.should_quit() {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Resize(width, height) => {
                    log::debug!("Terminal resized to {}x{}", width, height);
                }
                _ => {}
            }
        }
    }

    Ok(app.into_outcome())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
