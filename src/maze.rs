//! Maze and pellet module.
//!
//! This module holds the accepted grid of a round together with the two pellet layers placed on top
//! of it. The grid never changes once a maze exists; only the pellet sets shrink as the player eats
//! them.

use std::collections::BTreeSet;

use color_eyre::eyre::{bail, Result};
use rand::{seq::IteratorRandom as _, Rng};
use tracing::{debug, info, warn};

use crate::{
    connectivity,
    generator::{GeneratorConfig, MazeGenerator},
    grid::{Grid, Position},
};

/// Upper bound on the number of generation runs [`Maze::generate`] tries before settling.
pub const MAX_ATTEMPTS: usize = 8;

/// What the player found on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consumed {
    /// Nothing was left on the cell.
    Nothing,
    /// A regular pellet.
    Pellet,
    /// A power pellet.
    PowerPellet,
}

/// The two pellet layers of a maze.
///
/// Both sets only ever contain open cells reachable from the start, and they never overlap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pellets {
    /// Positions of the regular pellets.
    pub regular: BTreeSet<Position>,
    /// Positions of the power pellets.
    pub power: BTreeSet<Position>,
}

impl Pellets {
    /// Whether both layers are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.power.is_empty()
    }

    /// Number of pellets of both kinds still on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regular.len() + self.power.len()
    }
}

/// Accepted grid plus its pellets.
#[derive(Clone, Debug)]
pub struct Maze {
    /// The immutable grid.
    grid: Grid,
    /// Pellets still on the board.
    pellets: Pellets,
}

impl Maze {
    /// Lays pellets on an accepted grid.
    ///
    /// Every open cell reachable from the start except the start itself receives a regular pellet.
    /// Up to `power_count` of those cells are then picked at random and carry a power pellet
    /// instead.
    pub fn new<R: Rng + ?Sized>(grid: Grid, power_count: usize, rng: &mut R) -> Self {
        let start = grid.start();
        let mut regular = connectivity::reachable(&grid, start);
        let _ = regular.remove(&start);

        let power: BTreeSet<Position> = regular
            .iter()
            .copied()
            .choose_multiple(rng, power_count)
            .into_iter()
            .collect();
        regular.retain(|pos| !power.contains(pos));

        debug!(
            regular = regular.len(),
            power = power.len(),
            "pellets placed"
        );

        Self {
            grid,
            pellets: Pellets { regular, power },
        }
    }

    /// Runs the generator until the start's reachable region covers at least half of the grid and
    /// lays pellets on the result.
    ///
    /// After [`MAX_ATTEMPTS`] unsuccessful runs the attempt with the largest region is used.
    ///
    /// # Errors
    ///
    /// This function may return errors if the generator configuration is invalid.
    pub fn generate<R: Rng + ?Sized>(
        config: &GeneratorConfig,
        power_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let generator = MazeGenerator::new(config.clone())?;
        let needed = config.rows * config.cols / 2;

        let mut best: Option<(Grid, usize)> = None;
        for attempt in 1..=MAX_ATTEMPTS {
            let grid = generator.generate(rng);
            let area = connectivity::reachable(&grid, grid.start()).len();
            info!(attempt, area, needed, "maze candidate accepted by generator");

            if area >= needed {
                return Ok(Self::new(grid, power_count, rng));
            }
            match best {
                Some((_, best_area)) if best_area >= area => {}
                _ => best = Some((grid, area)),
            }
        }

        let Some((grid, area)) = best else {
            bail!("maze generation produced no candidate");
        };
        warn!(area, needed, "no maze reached the minimum playable area, using the largest");

        Ok(Self::new(grid, power_count, rng))
    }

    /// The immutable grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Pellets still on the board.
    #[must_use]
    pub const fn pellets(&self) -> &Pellets {
        &self.pellets
    }

    /// Removes whatever pellet lies on `pos` and reports what it was.
    pub fn consume(&mut self, pos: Position) -> Consumed {
        if self.pellets.regular.remove(&pos) {
            Consumed::Pellet
        } else if self.pellets.power.remove(&pos) {
            Consumed::PowerPellet
        } else {
            Consumed::Nothing
        }
    }

    /// Whether every pellet has been eaten.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.pellets.is_empty()
    }

    /// Builds a maze with hand-placed pellets.
    #[cfg(test)]
    pub(crate) const fn with_pellets(grid: Grid, pellets: Pellets) -> Self {
        Self { grid, pellets }
    }
}
