//! Async event handler for the TUI editor.

use std::io;

use anyhow::Result;
use is_terminal::IsTerminal;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use futures_util::StreamExt;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::{
    catalog,
    config::Settings,
    orchestrator::Orchestrator,
    piston::PistonClient,
    state::Action,
};
use super::{
    app::{App, Focus},
    events::TuiEvent,
    ui::render_ui,
};

/// Run the interactive editor until the user quits
pub async fn run_tui(settings: &Settings, initial: Option<String>) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("the editor requires a proper terminal environment"));
    }

    let client = PistonClient::from_settings(settings)?;
    let orchestrator = Orchestrator::new(client.clone());
    let mut app = App::new(settings, initial);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // Catalog is fetched once at mount
    spawn_catalog_load(client.clone(), event_tx.clone());

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &client, &orchestrator, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.state.is_loading {
        tracing::info!(
            dispatch = app.state.latest_dispatch().0,
            "quitting with an execution request still in flight"
        );
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<'_>,
    client: &PistonClient,
    orchestrator: &Orchestrator,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    let mut input = EventStream::new();

    loop {
        // Render UI
        terminal.draw(|frame| render_ui(frame, app))?;

        let tui_event = tokio::select! {
            Some(ev) = event_rx.recv() => ev,
            maybe = input.next() => match maybe {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => TuiEvent::Key(key),
                Some(Ok(Event::Paste(text))) => TuiEvent::Paste(text),
                Some(Ok(Event::Resize(_, _))) => TuiEvent::Resize,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        };

        match tui_event {
            TuiEvent::Key(key) => {
                if handle_key_event(app, key, client, orchestrator, &event_tx) {
                    break; // Quit requested
                }
            }
            TuiEvent::Paste(text) => {
                if app.focus == Focus::Editor {
                    app.editor.insert_str(text);
                }
            }
            TuiEvent::Action(action) => app.apply(action),
            TuiEvent::Resize => {}
        }
    }

    Ok(())
}

/// Handle keyboard events; returns true when the user asked to quit
fn handle_key_event(
    app: &mut App<'_>,
    key: KeyEvent,
    client: &PistonClient,
    orchestrator: &Orchestrator,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> bool {
    // Any key closes the help overlay
    if app.show_help {
        app.toggle_help();
        return false;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => return true,
        KeyCode::F(1) => {
            app.toggle_help();
            return false;
        }
        KeyCode::F(5) => {
            execute(app, orchestrator, event_tx);
            return false;
        }
        KeyCode::Char('e') if ctrl => {
            execute(app, orchestrator, event_tx);
            return false;
        }
        KeyCode::F(2) => {
            toggle_picker(app);
            return false;
        }
        KeyCode::Char('l') if ctrl => {
            toggle_picker(app);
            return false;
        }
        KeyCode::F(3) => {
            app.apply(Action::CatalogRequested);
            spawn_catalog_load(client.clone(), event_tx.clone());
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Picker => match key.code {
            KeyCode::Up => app.picker_prev(),
            KeyCode::Down => app.picker_next(),
            KeyCode::Enter => app.confirm_picker(),
            KeyCode::Esc => app.close_picker(),
            _ => {}
        },
        Focus::Editor => {
            app.editor.input(key);
        }
    }

    false
}

fn toggle_picker(app: &mut App<'_>) {
    match app.focus {
        Focus::Editor => app.open_picker(),
        Focus::Picker => app.close_picker(),
    }
}

/// Start one dispatch of the current buffer; no-op while a request is in flight
fn execute(app: &mut App<'_>, orchestrator: &Orchestrator, event_tx: &mpsc::UnboundedSender<TuiEvent>) {
    if !app.can_execute() {
        return;
    }
    let dispatch = app.state.begin_execute();
    let request = Orchestrator::prepare(&*app, &app.state.selection);

    let orchestrator = orchestrator.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let action = orchestrator.dispatch(dispatch, request).await;
        // Channel closed means the editor is gone; the result is abandoned
        let _ = tx.send(TuiEvent::Action(action));
    });
}

fn spawn_catalog_load(client: PistonClient, event_tx: mpsc::UnboundedSender<TuiEvent>) {
    tokio::spawn(async move {
        let action = match catalog::load(&client).await {
            Ok(catalog) => Action::CatalogLoaded(catalog),
            Err(e) => Action::CatalogFailed(e.to_string()),
        };
        let _ = event_tx.send(TuiEvent::Action(action));
    });
}
