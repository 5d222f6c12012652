//! Application state and main loop.

use std::time::Instant;

use color_eyre::eyre::Result;
use ratatui::DefaultTerminal;
use tracing::trace;

use crate::{
    config::Config,
    events,
    game::{Game, GameStatus},
    grid::Direction,
    types::{EndMenuItem, MainMenuItem, Screen},
    ui,
};

/// Main application state container.
///
/// This structure holds the complete state of the application: the screen being shown, the
/// configuration new games are created from, and the game in progress if there is one.
#[derive(Debug)]
pub struct App {
    /// Flag indicating whether the application should exit.
    ///
    /// When set to true, the main application loop will terminate and the application will exit
    /// cleanly.
    pub(crate) exit: bool,
    /// Current screen being displayed to the user.
    ///
    /// This field determines which UI screen is rendered and how user input is handled. It
    /// controls the overall navigation state of the application.
    pub(crate) screen: Screen,
    /// Configuration every new game is built from.
    pub(crate) config: Config,
    /// Game in progress.
    ///
    /// This is `None` until the first maze has been generated and again after the user leaves a
    /// game for the main menu.
    pub(crate) game: Option<Game>,
    /// Direction the player asked for since the last frame, if any.
    pub(crate) intent: Option<Direction>,
    /// Instant the last frame was played.
    last_frame: Instant,
}

impl App {
    /// Creates a new application instance showing the main menu.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            exit: false,
            screen: Screen::MainMenu(MainMenuItem::StartGame),
            config,
            game: None,
            intent: None,
            last_frame: Instant::now(),
        }
    }

    /// Runs the main application loop until the user exits.
    ///
    /// This function continuously renders the UI, handles user input events, and plays game frames
    /// at the configured rate until the exit flag is set.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - Terminal drawing operations fail
    /// - Event handling encounters an error
    /// - Maze generation fails
    /// - A game frame reports an illegal move
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let _ = terminal
                .try_draw(|frame| ui::draw(self, frame).map_err(std::io::Error::other))?;

            if self.screen == Screen::Generating {
                self.start_game()?;
                continue;
            }

            let timeout = self
                .config
                .frame_duration()
                .saturating_sub(self.last_frame.elapsed());
            events::handle_events(self, timeout)?;
            self.play_frame()?;
        }

        Ok(())
    }

    /// Generates a new maze and switches to the in-game screen.
    ///
    /// # Errors
    ///
    /// This function may return errors if the game cannot be set up from the configuration.
    pub(crate) fn start_game(&mut self) -> Result<()> {
        self.game = Some(Game::new(&self.config)?);
        self.intent = None;
        self.last_frame = Instant::now();
        self.screen = Screen::InGame;

        Ok(())
    }

    /// Plays one frame of the game when one is due.
    ///
    /// Frames only run on the in-game screen. Once the game is decided the end screen takes over.
    ///
    /// # Errors
    ///
    /// This function may return errors if a pursuer or the player attempts an illegal move.
    fn play_frame(&mut self) -> Result<()> {
        if self.screen != Screen::InGame || self.last_frame.elapsed() < self.config.frame_duration()
        {
            return Ok(());
        }
        self.last_frame = Instant::now();

        let Some(game) = self.game.as_mut() else {
            return Ok(());
        };
        let signals = game.tick(self.intent.take())?;
        if !signals.is_empty() {
            trace!(frame = game.frame(), ?signals, "frame played");
        }
        if game.status() != GameStatus::Playing {
            self.screen = Screen::GameEnd(EndMenuItem::Restart);
        }

        Ok(())
    }
}
