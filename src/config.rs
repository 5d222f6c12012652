//! Command line configuration.
//!
//! Every tunable constant of the game is a flag with a default, so a bare invocation plays the
//! standard 24x24 game.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre::{bail, Result};

use crate::generator::GeneratorConfig;

/// Terminal maze chase with evolved mazes and four pathfinding pursuers.
#[derive(Clone, Debug, Parser, PartialEq)]
#[command(version, about)]
pub struct Config {
    /// Grid height in cells, border included.
    #[arg(long, default_value_t = 24)]
    pub rows: usize,

    /// Grid width in cells, border included.
    #[arg(long, default_value_t = 24)]
    pub cols: usize,

    /// Seed for maze generation and pursuer randomness; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frames per second of the game loop.
    #[arg(long, default_value_t = 10)]
    pub fps: u32,

    /// Pursuers decide once every this many frames.
    #[arg(long, default_value_t = 3)]
    pub tick_divisor: u32,

    /// Length of the power window in seconds.
    #[arg(long, default_value_t = 10)]
    pub power_seconds: u32,

    /// Lives at the start of a game.
    #[arg(long, default_value_t = 3)]
    pub lives: u32,

    /// Candidate mazes per generation.
    #[arg(long, default_value_t = 30)]
    pub population: usize,

    /// Candidates kept unchanged between generations.
    #[arg(long, default_value_t = 10)]
    pub elites: usize,

    /// Number of generations of the maze search.
    #[arg(long, default_value_t = 100)]
    pub generations: usize,

    /// Fresh random candidates injected per generation.
    #[arg(long, default_value_t = 2)]
    pub fresh: usize,

    /// Probability that an interior cell of a random candidate is a wall.
    #[arg(long, default_value_t = 0.4)]
    pub wall_probability: f64,

    /// Probability that a single interior cell flips during mutation.
    #[arg(long, default_value_t = 0.03)]
    pub mutation_rate: f64,

    /// Probability that a crossover uses two row cuts instead of one.
    #[arg(long, default_value_t = 0.5)]
    pub two_point_rate: f64,

    /// Fitness weight of openness; path length gets the rest.
    #[arg(long, default_value_t = 0.9)]
    pub openness_weight: f64,

    /// Dequeue bound of the breadth-first pursuer.
    #[arg(long, default_value_t = 10)]
    pub bfs_depth: usize,

    /// Power pellets placed per maze.
    #[arg(long, default_value_t = 4)]
    pub power_pellets: usize,

    /// Directory the log file is written to.
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from([env!("CARGO_PKG_NAME")])
    }
}

impl Config {
    /// Rejects parameter combinations the game cannot run with.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - The generator parameters are invalid
    /// - The frame rate, tick divisor, lives or BFS bound is zero
    pub fn validate(&self) -> Result<()> {
        self.generator().validate()?;
        for (name, value) in [
            ("frame rate", self.fps),
            ("tick divisor", self.tick_divisor),
            ("lives", self.lives),
        ] {
            if value == 0 {
                bail!("{name} must be at least one");
            }
        }
        if self.bfs_depth == 0 {
            bail!("the BFS bound must be at least one");
        }

        Ok(())
    }

    /// Generator-only subset of the configuration.
    #[must_use]
    pub fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            rows: self.rows,
            cols: self.cols,
            population: self.population,
            elites: self.elites,
            generations: self.generations,
            fresh: self.fresh,
            wall_probability: self.wall_probability,
            mutation_rate: self.mutation_rate,
            two_point_rate: self.two_point_rate,
            openness_weight: self.openness_weight,
        }
    }

    /// Power window length in frames.
    #[must_use]
    pub fn power_frames(&self) -> u64 {
        u64::from(self.power_seconds) * u64::from(self.fps)
    }

    /// Wall-clock length of one frame.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}
