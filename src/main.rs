mod app;
mod config;
mod contacts;
mod gesture;
mod pyramid;
mod share;
mod store;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use pyramid::PyramidState;
use share::desktop::SystemDesktop;
use store::{FileStore, KeyValueStore};

#[derive(Parser, Debug)]
#[command(name = "tennis-pyramid")]
#[command(version = "0.1.0")]
#[command(about = "Rank tennis players in a pyramid and share it on WhatsApp")]
struct Args {
    /// Directory holding the saved pyramid and contacts
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print the saved pyramid as JSON
    #[arg(short, long)]
    print: bool,

    /// Write the pyramid image to a PNG file
    #[arg(short, long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Move the player at FROM to position TO
    #[arg(short, long = "move", num_args = 2, value_names = ["FROM", "TO"])]
    move_slots: Option<Vec<usize>>,

    /// Restore the default pyramid
    #[arg(long)]
    reset: bool,
}

impl Args {
    fn is_cli(&self) -> bool {
        self.print || self.export.is_some() || self.move_slots.is_some() || self.reset
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load()?;

    let data_dir = match args.data_dir.clone().or_else(|| config.data_dir.clone()) {
        Some(dir) => dir,
        None => FileStore::default_dir()?,
    };
    let store = FileStore::new(&data_dir);

    init_logging(&args, store.dir())?;

    // Handle CLI-only commands
    if args.reset {
        return reset_pyramid(store);
    }

    if let Some(slots) = &args.move_slots {
        return move_slot(store, slots[0], slots[1]);
    }

    if let Some(path) = &args.export {
        return export_pyramid(store, &config, path);
    }

    if args.print {
        return print_state(store);
    }

    // Run TUI
    run_tui(config, store, data_dir).await
}

/// The TUI owns the screen, so it logs to a file; CLI modes log to stderr
fn init_logging(args: &Args, data_dir: &Path) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if args.is_cli() {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Could not create {}", data_dir.display()))?;
    let log_path = data_dir.join("tennis-pyramid.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Could not open {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .init();
    Ok(())
}

fn print_state(mut store: FileStore) -> Result<()> {
    let state = store::load_pyramid(&mut store);

    let rows: Vec<Vec<serde_json::Value>> = state
        .rows()
        .map(|positions| {
            positions
                .map(|position| {
                    serde_json::json!({
                        "position": position,
                        "label": state.label(position).unwrap_or_default(),
                    })
                })
                .collect()
        })
        .collect();

    let output = serde_json::json!({
        "rowCount": state.row_count,
        "totalPositions": state.total(),
        "rows": rows,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn export_pyramid(mut store: FileStore, config: &AppConfig, path: &Path) -> Result<()> {
    let state = store::load_pyramid(&mut store);
    share::export(&state, &config.capture_options(), path)
        .with_context(|| format!("Could not export to {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn move_slot(mut store: FileStore, from: usize, to: usize) -> Result<()> {
    let mut state = store::load_pyramid(&mut store);
    let label = state.label(from).unwrap_or_default().to_string();

    match state.reposition(from, to)? {
        Some(range) => {
            store::save_pyramid(&mut store, &state)?;
            println!(
                "Moved {} from #{} to #{} ({} players shifted)",
                label,
                from,
                to,
                range.count() - 1
            );
        }
        None => println!("{} is already at #{}", label, to),
    }
    Ok(())
}

fn reset_pyramid(mut store: FileStore) -> Result<()> {
    let state = PyramidState::default();
    store::save_pyramid(&mut store, &state)?;
    tracing::info!("Pyramid reset");
    println!("Reset to {} rows of default players", state.row_count);
    Ok(())
}

async fn run_tui(config: AppConfig, store: FileStore, data_dir: PathBuf) -> Result<()> {
    ui::init_theme(theme::Theme::load(&config.theme));

    let desktop = SystemDesktop::new(config.notifications);
    let store: Box<dyn KeyValueStore> = Box::new(store);
    let mut app = App::new(config, store, Box::new(desktop), data_dir);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            app.viewport = f.area();
            ui::draw(f, app);
        })?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    _ => {
                        // Handle key and catch any errors to prevent crashes
                        if let Err(e) = app.handle_key(key).await {
                            tracing::error!("Key handling failed: {}", e);
                            app.status_message = Some(format!("Error: {}", e));
                            app.status_message_time = Some(std::time::Instant::now());
                        }
                    }
                },
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        // Periodic refresh
        app.tick();
    }
}
