//! Player state module.
//!
//! The player walks the maze one cell per accepted intent, eats pellets and, after a power pellet,
//! holds a power window measured in frames.

use tracing::{debug, trace};

use crate::{
    grid::{Direction, Position},
    maze::{Consumed, Maze},
};

/// Points for a regular pellet.
pub const PELLET_SCORE: u32 = 10;

/// Points for a power pellet.
pub const POWER_PELLET_SCORE: u32 = 50;

/// Result of a movement intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The player stepped onto the target cell.
    Moved,
    /// The target cell was a wall or outside the grid; nothing changed.
    Blocked,
    /// The player picked up a power pellet and more pellets remain.
    Power,
    /// The player ate the last pellet.
    Win,
}

/// The player-controlled agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    /// Current cell.
    position: Position,
    /// Fixed start cell every round begins on.
    start: Position,
    /// Accumulated score.
    score: u32,
    /// Remaining lives.
    lives: u32,
    /// Frame at which the current power window ends, if any.
    power_until: Option<u64>,
}

impl Player {
    /// Places a fresh player on `start`.
    #[must_use]
    pub const fn new(start: Position, lives: u32) -> Self {
        Self {
            position: start,
            start,
            score: 0,
            lives,
            power_until: None,
        }
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Whether a power window is running.
    #[must_use]
    pub const fn is_powered_up(&self) -> bool {
        self.power_until.is_some()
    }

    /// Frames left in the current power window at frame `now`.
    #[must_use]
    pub fn power_frames_left(&self, now: u64) -> u64 {
        self.power_until
            .map_or(0, |deadline| deadline.saturating_sub(now))
    }

    /// Tries to walk one cell in `direction` at frame `now`.
    ///
    /// The move goes through the grid's gate; a rejected move reports [`MoveOutcome::Blocked`] and
    /// changes nothing. An accepted move eats whatever pellet lies on the target. A power pellet
    /// starts a power window of `power_frames` frames. Clearing the board reports
    /// [`MoveOutcome::Win`] even when the last pellet was a power pellet.
    pub fn attempt_move(
        &mut self,
        direction: Direction,
        maze: &mut Maze,
        now: u64,
        power_frames: u64,
    ) -> MoveOutcome {
        let target = match maze.grid().step(self.position, direction) {
            Ok(target) => target,
            Err(error) => {
                trace!(%error, "player move blocked");
                return MoveOutcome::Blocked;
            }
        };
        self.position = target;

        let consumed = maze.consume(target);
        match consumed {
            Consumed::Nothing => {}
            Consumed::Pellet => self.score += PELLET_SCORE,
            Consumed::PowerPellet => {
                self.score += POWER_PELLET_SCORE;
                self.power_until = Some(now + power_frames);
                debug!(until = now + power_frames, "power window started");
            }
        }

        if maze.is_cleared() {
            MoveOutcome::Win
        } else if consumed == Consumed::PowerPellet {
            MoveOutcome::Power
        } else {
            MoveOutcome::Moved
        }
    }

    /// Ends the power window once frame `now` reaches its deadline.
    ///
    /// Returns whether a window ended.
    pub fn expire_power(&mut self, now: u64) -> bool {
        match self.power_until {
            Some(deadline) if now >= deadline => {
                self.power_until = None;
                debug!(frame = now, "power window ended");
                true
            }
            _ => false,
        }
    }

    /// Adds bonus points.
    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    /// Takes one life away and returns how many are left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Puts the player back on the start cell without power.
    pub fn reset_for_round(&mut self) {
        self.position = self.start;
        self.power_until = None;
    }

    /// Teleports the player, bypassing the move gate.
    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
