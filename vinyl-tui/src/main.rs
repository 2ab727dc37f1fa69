use std::{io, time::Duration};

use anyhow::Context;
use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};
use vinyl_core::{Player, media::RodioHandle};

mod app;
mod ui;

use app::App;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    log::info!("starting vinyl");

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: vinyl-tui <audio files...>");
        return Ok(());
    }

    let mut player = Player::new();
    match RodioHandle::try_default() {
        Ok(handle) => player.attach(handle),
        // Keep running detached; transport keys become no-ops.
        Err(e) => log::warn!("no audio output, running detached: {e:#}"),
    }

    let mut app = App::new(player);
    app.load_paths(&paths);

    run_tui(&mut app)
}

/// Log to a file; the terminal belongs to ratatui.
fn init_logging() -> anyhow::Result<()> {
    let file = std::fs::File::create("vinyl.log").context("cannot create vinyl.log")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_tui(app: &mut App) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    loop {
        // The poll timeout doubles as the progress tick cadence.
        app.poll_progress();
        app.drain_events();

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                    break;
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
