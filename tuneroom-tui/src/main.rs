use std::io;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::Receiver;
use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};
use tuneroom_core::{
    commands::PlayerCommand,
    engine::AudioEngine,
    media::MediaElement,
    presence::{NoPresence, PresenceChannel, PresenceSink, socket},
    song,
    store::PlayerStore,
};

mod config;
mod handle;
mod player;
mod router;
mod routes;
mod state;
mod ui;

use config::{Config, USAGE};
use handle::{AppCommand, PlayerHandle};
use player::Player;
use router::{RouteAction, Router, route_for_name};
use state::AppState;

fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    // Initialize tui_logger for TUI log display
    tui_logger::init_logger(log::LevelFilter::Debug).context("Failed to init tui_logger")?;
    tui_logger::set_default_level(log::LevelFilter::Debug);

    log::info!("Starting tuneroom");

    let (presence, presence_label) = start_presence(&config)?;
    let mut store = PlayerStore::new(presence);
    if config.shuffle {
        store.toggle_shuffle();
    }
    while store.repeat() != config.repeat {
        store.toggle_repeat();
    }

    let songs = song::collect_songs(&config.paths);
    log::info!("Queueing {} songs from the command line", songs.len());
    if config.play {
        store.play_album(songs, 0);
    } else {
        store.initialize_queue(songs);
    }

    let engine = AudioEngine::try_new_default()?;
    let player = Player::new(store, engine);

    run_tui(player, presence_label)
}

/// Wire the store to the presence socket when one is configured
fn start_presence(config: &Config) -> anyhow::Result<(Box<dyn PresenceSink>, String)> {
    let Some(url) = config.presence_url.clone() else {
        return Ok((Box::new(NoPresence), "presence off".to_string()));
    };

    let session = config.session();
    let label = match session.user_id() {
        Some(user) => format!("sharing as {}", user),
        None => {
            log::warn!("No user id configured, activity will not be shared");
            "not signed in".to_string()
        }
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    socket::spawn_forwarder(url, rx).context("Failed to start presence forwarder")?;

    Ok((Box::new(PresenceChannel::new(session, tx)), label))
}

fn run_tui<E: MediaElement>(mut player: Player<E>, presence_label: String) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut state = AppState::new(presence_label);
    let mut router = Router::new(route_for_name("Playback"));
    let (handle, cmd_rx) = PlayerHandle::new();

    let result = event_loop(&mut terminal, &mut player, &mut state, &mut router, &handle, &cmd_rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

type Terminal = ratatui::Terminal<CrosstermBackend<io::Stdout>>;

fn event_loop<E: MediaElement>(
    terminal: &mut Terminal,
    player: &mut Player<E>,
    state: &mut AppState,
    router: &mut Router,
    handle: &PlayerHandle,
    cmd_rx: &Receiver<AppCommand>,
) -> anyhow::Result<()> {
    loop {
        player.tick(cmd_rx);
        state.refresh(player.store.snapshot(), player.position(), player.volume());
        if let Some(error) = player.take_error() {
            state.status_message = error;
        }

        // Draw UI
        terminal.draw(|f| ui::draw(f, state, router))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let should_quit = handle_global_keys(key.code, state, handle, router)?;
                    if should_quit {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Handle global keys and delegate route-specific input to router
fn handle_global_keys(
    key: KeyCode,
    state: &mut AppState,
    handle: &PlayerHandle,
    router: &mut Router,
) -> anyhow::Result<bool> {
    let action = match key {
        KeyCode::Char('q') => RouteAction::Quit,
        KeyCode::Char(' ') => {
            handle.send(PlayerCommand::TogglePlay)?;
            return Ok(false);
        }
        KeyCode::Char('n') => {
            handle.send(PlayerCommand::Next)?;
            return Ok(false);
        }
        KeyCode::Char('p') => {
            handle.send(PlayerCommand::Previous)?;
            return Ok(false);
        }
        KeyCode::Char('s') => {
            handle.send(PlayerCommand::ToggleShuffle)?;
            return Ok(false);
        }
        KeyCode::Char('r') => {
            handle.send(PlayerCommand::ToggleRepeat)?;
            return Ok(false);
        }
        KeyCode::Tab => {
            router.next_tab(state)?;
            return Ok(false);
        }
        // Delegate to the current route's input handler
        _ => router.current_mut().handle_input(key, state, handle)?,
    };

    router.execute_action(action, state)
}
