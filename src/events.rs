//! Event handling functions for user input and application state updates.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::{
    grid::Direction,
    types::{EndMenuItem, MainMenuItem, Screen},
    App,
};

/// Handles input events and updates the application state accordingly.
///
/// This function waits at most `timeout` for a keyboard event and dispatches it to
/// [`handle_key`]. The timeout is the time left until the next game frame, so the loop keeps its
/// pace whether or not keys are pressed.
///
/// # Errors
///
/// This function may return errors if polling or reading the terminal fails.
pub(crate) fn handle_events(app: &mut App, timeout: Duration) -> Result<()> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key.code);
            }
        }
    }

    Ok(())
}

/// Applies a single key press to the application state.
///
/// `q` quits from anywhere. In menus `j`/`k` (or the arrow keys) move the cursor and `l` (or enter)
/// selects. In game the same keys steer the player and escape returns to the main menu.
pub(crate) fn handle_key(app: &mut App, code: KeyCode) {
    if code == KeyCode::Char('q') {
        app.exit = true;
        return;
    }

    match app.screen {
        Screen::InGame => handle_game_key(app, code),
        Screen::MainMenu(item) => match code {
            KeyCode::Char('j' | 'k') | KeyCode::Down | KeyCode::Up => {
                app.screen = Screen::MainMenu(match item {
                    MainMenuItem::StartGame => MainMenuItem::Quit,
                    MainMenuItem::Quit => MainMenuItem::StartGame,
                });
            }
            KeyCode::Char('l') | KeyCode::Enter => match item {
                MainMenuItem::StartGame => app.screen = Screen::Generating,
                MainMenuItem::Quit => app.exit = true,
            },
            _ => {}
        },
        Screen::GameEnd(item) => match code {
            KeyCode::Char('j' | 'k') | KeyCode::Down | KeyCode::Up => {
                app.screen = Screen::GameEnd(match item {
                    EndMenuItem::Restart => EndMenuItem::Quit,
                    EndMenuItem::Quit => EndMenuItem::Restart,
                });
            }
            KeyCode::Char('l') | KeyCode::Enter => match item {
                EndMenuItem::Restart => app.screen = Screen::Generating,
                EndMenuItem::Quit => app.exit = true,
            },
            _ => {}
        },
        Screen::Generating => {}
    }
}

/// Handles key presses while a game is running.
///
/// Movement keys store a single-step intent that the next frame consumes; a later key press before
/// that frame replaces it.
fn handle_game_key(app: &mut App, code: KeyCode) {
    let direction = match code {
        KeyCode::Char('h') | KeyCode::Left => Direction::West,
        KeyCode::Char('j') | KeyCode::Down => Direction::South,
        KeyCode::Char('k') | KeyCode::Up => Direction::North,
        KeyCode::Char('l') | KeyCode::Right => Direction::East,
        KeyCode::Esc => {
            app.game = None;
            app.intent = None;
            app.screen = Screen::MainMenu(MainMenuItem::StartGame);
            return;
        }
        _ => return,
    };

    app.intent = Some(direction);
}
