//! Game tick engine.
//!
//! This module ties the core together. A [`Game`] owns the maze, the player, the pursuers and the
//! single seeded random source, and advances them one frame per [`Game::tick`]:
//!
//! 1. The frame counter advances.
//! 2. The player's intent, if any, goes through the move gate.
//! 3. An elapsed power window ends, calming every pursuer.
//! 4. Every pursuer re-evaluates whether it is scared.
//! 5. If the player moved, a collision check runs against the refreshed scared flags.
//! 6. On every `tick_divisor`-th frame the pursuers decide in roster order, each followed by a
//!    collision check. A lost life stops the remaining pursuers for this frame.
//!
//! Everything the presentation layer needs comes back as [`Signal`]s plus read-only accessors.

use color_eyre::eyre::Result;
use rand::{rngs::StdRng, SeedableRng as _};
use tracing::{debug, info};

use crate::{
    collision::{Collision, CollisionResolver},
    config::Config,
    grid::{Direction, MoveError},
    maze::Maze,
    player::{MoveOutcome, Player},
    pursuer::{self, Pursuer},
};

/// Timing rules of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Pursuers decide once every this many frames.
    pub tick_divisor: u64,
    /// Power window length in frames.
    pub power_frames: u64,
}

impl Rules {
    /// Extracts the timing rules from a configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_divisor: u64::from(config.tick_divisor),
            power_frames: config.power_frames(),
        }
    }
}

/// Whether the game is still running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Frames are being played.
    Playing,
    /// The player cleared the board.
    Won,
    /// The player ran out of lives.
    GameOver,
}

/// Discrete outcome surfaced to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The player moved.
    Moved,
    /// The player's intent hit a wall.
    Blocked,
    /// The player picked up a power pellet.
    Power,
    /// The player cleared the board.
    Win,
    /// The power window ended.
    PowerExpired,
    /// The player ate a scared pursuer.
    PursuerEaten {
        /// Name of the eaten pursuer.
        pursuer: &'static str,
    },
    /// A pursuer caught the player and the round was reset.
    LifeLost {
        /// Lives the player has left.
        lives_left: u32,
    },
    /// A pursuer caught the player on their last life.
    GameOver,
}

impl From<MoveOutcome> for Signal {
    fn from(outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Moved => Self::Moved,
            MoveOutcome::Blocked => Self::Blocked,
            MoveOutcome::Power => Self::Power,
            MoveOutcome::Win => Self::Win,
        }
    }
}

impl From<Collision> for Signal {
    fn from(collision: Collision) -> Self {
        match collision {
            Collision::Eaten { pursuer } => Self::PursuerEaten { pursuer },
            Collision::LifeLost { lives_left } => Self::LifeLost { lives_left },
            Collision::GameOver => Self::GameOver,
        }
    }
}

/// One game from maze load to win or game over.
#[derive(Clone, Debug)]
pub struct Game {
    /// Grid and remaining pellets.
    maze: Maze,
    /// The player.
    player: Player,
    /// The pursuers in roster order.
    pursuers: Vec<Pursuer>,
    /// Timing rules.
    rules: Rules,
    /// Frames played so far.
    frame: u64,
    /// Running state.
    status: GameStatus,
    /// Seed the random source was created from.
    seed: u64,
    /// Random source for pursuer fallbacks.
    rng: StdRng,
}

impl Game {
    /// Generates a maze and places the player and the pursuers on it.
    ///
    /// The seed comes from the configuration or, when absent, from the thread random source; it is
    /// logged so a game can be replayed.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - The configuration is invalid
    /// - The maze has too few cells to spawn every pursuer
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, rows = config.rows, cols = config.cols, "starting a new game");

        let mut rng = StdRng::seed_from_u64(seed);
        let maze = Maze::generate(&config.generator(), config.power_pellets, &mut rng)?;
        let pursuers = pursuer::roster(maze.grid(), config.bfs_depth, &mut rng)?;
        let player = Player::new(maze.grid().start(), config.lives);

        let mut game = Self::from_parts(maze, player, pursuers, Rules::from_config(config), seed);
        game.rng = rng;

        Ok(game)
    }

    /// Assembles a game from prepared parts.
    ///
    /// The random source is seeded from `seed`.
    #[must_use]
    pub fn from_parts(
        maze: Maze,
        player: Player,
        pursuers: Vec<Pursuer>,
        rules: Rules,
        seed: u64,
    ) -> Self {
        Self {
            maze,
            player,
            pursuers,
            rules,
            frame: 0,
            status: GameStatus::Playing,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Grid and remaining pellets.
    #[must_use]
    pub const fn maze(&self) -> &Maze {
        &self.maze
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// The pursuers in roster order.
    #[must_use]
    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    /// Frames played so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Running state.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Seed of this game.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Frames left in the player's power window.
    #[must_use]
    pub fn power_frames_left(&self) -> u64 {
        self.player.power_frames_left(self.frame)
    }

    /// Advances the game by one frame with an optional movement intent.
    ///
    /// Does nothing once the game is won or lost.
    ///
    /// # Errors
    ///
    /// This function returns the move gate's error if a pursuer decision is rejected, which means a
    /// simulation invariant was broken and the game cannot continue.
    pub fn tick(&mut self, intent: Option<Direction>) -> Result<Vec<Signal>, MoveError> {
        let mut signals = Vec::new();
        if self.status != GameStatus::Playing {
            return Ok(signals);
        }
        self.frame += 1;

        if let Some(direction) = intent {
            let outcome = self.player.attempt_move(
                direction,
                &mut self.maze,
                self.frame,
                self.rules.power_frames,
            );
            signals.push(outcome.into());

            match outcome {
                MoveOutcome::Win => {
                    self.finish(GameStatus::Won);
                    return Ok(signals);
                }
                MoveOutcome::Power => {
                    for pursuer in &mut self.pursuers {
                        pursuer.reset_power_window();
                    }
                }
                MoveOutcome::Moved | MoveOutcome::Blocked => {}
            }
        }

        if self.player.expire_power(self.frame) {
            for pursuer in &mut self.pursuers {
                pursuer.expire_power();
            }
            signals.push(Signal::PowerExpired);
        }

        let powered_up = self.player.is_powered_up();
        for pursuer in &mut self.pursuers {
            pursuer.update_scared_state(powered_up);
        }

        if intent.is_some() && self.resolve_collisions(&mut signals) {
            return Ok(signals);
        }

        if self.frame.checked_rem(self.rules.tick_divisor) == Some(0) {
            let target = self.player.position();
            for index in 0..self.pursuers.len() {
                let Some(pursuer) = self.pursuers.get_mut(index) else {
                    break;
                };
                let _ = pursuer.take_turn(self.maze.grid(), target, &mut self.rng)?;

                if self.resolve_collisions(&mut signals) {
                    break;
                }
            }
        }

        Ok(signals)
    }

    /// Runs the collision resolver and records its outcome.
    ///
    /// Returns whether the round was reset or the game ended.
    fn resolve_collisions(&mut self, signals: &mut Vec<Signal>) -> bool {
        let collisions = CollisionResolver.resolve(&mut self.player, &mut self.pursuers);
        let ends_round = collisions.iter().any(|collision| collision.ends_round());
        signals.extend(collisions.iter().copied().map(Signal::from));

        if collisions.contains(&Collision::GameOver) {
            self.finish(GameStatus::GameOver);
        }

        ends_round
    }

    /// Stops the game with a final status.
    fn finish(&mut self, status: GameStatus) {
        debug!(?status, frame = self.frame, score = self.player.score(), "game finished");
        self.status = status;
    }
}
