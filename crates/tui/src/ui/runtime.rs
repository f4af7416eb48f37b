//! Terminal lifecycle and the main event loop.
//!
//! Input is read on a dedicated blocking task and forwarded over a channel,
//! with mouse-move events throttled so hover tracking cannot flood the loop.
//! Background fetches run as spawned tasks collected in a `FuturesUnordered`;
//! their results come back as [`Msg`]s. Rendering is driven by a dirty flag,
//! and the tick rate drops to an idle crawl when nothing is animating.

use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use haixin_types::{Effect, Msg};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

use crate::app::App;
use crate::cmd;
use crate::ui::components::component::Component;
use crate::ui::main_component::MainComponent;

/// Tick cadence while something animates or a deadline is pending.
const FAST_TICK: Duration = Duration::from_millis(100);
/// Tick cadence when the UI is fully idle.
const IDLE_TICK: Duration = Duration::from_secs(5);
/// Minimum spacing between forwarded mouse-move events.
const MOUSE_MOVE_THROTTLE: Duration = Duration::from_millis(16);

/// Runs the application to completion, restoring the terminal on the way out
/// even when the loop errors.
pub async fn run(app: &mut App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(app, &mut terminal).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")
}

/// Reads crossterm events on a blocking task. Mouse moves are coalesced to
/// at most one per throttle window; everything else passes through.
fn spawn_input_task(shutdown: Arc<AtomicBool>) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        let mut last_mouse_move = Instant::now() - MOUSE_MOVE_THROTTLE;
        while !shutdown.load(Ordering::Relaxed) {
            match event::poll(Duration::from_millis(50)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if let Event::Mouse(mouse) = &ev {
                            if mouse.kind == MouseEventKind::Moved {
                                let now = Instant::now();
                                if now.duration_since(last_mouse_move) < MOUSE_MOVE_THROTTLE {
                                    continue;
                                }
                                last_mouse_move = now;
                            }
                        }
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        error!(%error, "input read failed");
                        break;
                    }
                },
                Ok(false) => {}
                Err(error) => {
                    error!(%error, "input poll failed");
                    break;
                }
            }
        }
    });
    rx
}

async fn event_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut input = spawn_input_task(Arc::clone(&shutdown));
    let mut tasks: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();
    let mut main = MainComponent::new();

    // Startup work: the menu document plus the initial view's data.
    let menu_client = Arc::clone(&app.ctx.client);
    tasks.push(tokio::spawn(async move {
        Msg::MenusLoaded(menu_client.fetch_menus().await)
    }));
    let initial = app.switch_to(app.route);
    apply_effects(app, initial, &mut tasks);

    loop {
        if app.dirty {
            terminal
                .draw(|frame| main.render(frame, frame.area(), app))
                .context("draw frame")?;
            app.dirty = false;
        }

        let tick = if app.is_busy() || app.nav.hide_pending() || app.status.visible().is_some() {
            FAST_TICK
        } else {
            IDLE_TICK
        };

        tokio::select! {
            maybe_event = input.recv() => {
                let Some(ev) = maybe_event else { break };
                let effects = handle_event(app, &mut main, ev);
                apply_effects(app, effects, &mut tasks);
            }
            Some(joined) = tasks.next(), if !tasks.is_empty() => {
                match joined {
                    Ok(msg) => {
                        let effects = app.update(msg);
                        apply_effects(app, effects, &mut tasks);
                    }
                    Err(error) => {
                        error!(%error, "background task failed");
                        app.status_error("Background task failed");
                    }
                }
            }
            _ = tokio::time::sleep(tick) => {
                let effects = app.update(Msg::Tick);
                apply_effects(app, effects, &mut tasks);
            }
            _ = tokio::signal::ctrl_c() => {
                app.should_quit = true;
            }
        }

        if app.should_quit {
            break;
        }
    }

    shutdown.store(true, Ordering::Relaxed);
    Ok(())
}

fn handle_event(app: &mut App, main: &mut MainComponent, event: Event) -> Vec<Effect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return vec![Effect::Quit];
            }
            app.mark_dirty();
            main.handle_key_events(app, key)
        }
        Event::Mouse(mouse) => {
            let dropdown_was_shown = app.nav.is_shown();
            let effects = main.handle_mouse_events(app, mouse);
            // Bare hovers only redraw when they changed dropdown visibility.
            if !matches!(mouse.kind, MouseEventKind::Moved)
                || app.nav.is_shown() != dropdown_was_shown
            {
                app.mark_dirty();
            }
            effects
        }
        Event::Resize(width, height) => {
            let _ = app.update(Msg::Resize(width, height));
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Drains effects, expanding navigation effects in place and pushing fetch
/// effects onto the task set.
fn apply_effects(
    app: &mut App,
    effects: Vec<Effect>,
    tasks: &mut FuturesUnordered<JoinHandle<Msg>>,
) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Quit => app.should_quit = true,
            Effect::SwitchTo(route) => queue.extend(app.switch_to(route)),
            Effect::NavigateSameTool(path) => queue.extend(app.apply_navigation(path)),
            Effect::OpenExternal(href) => cmd::open_external(app, &href),
            fetch => {
                let page = (app.history.limit, app.history.offset);
                if let Some(handle) = cmd::spawn_effect(&app.ctx.client, fetch, page) {
                    tasks.push(handle);
                }
            }
        }
    }
}
