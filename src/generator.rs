//! Evolutionary maze generation.
//!
//! The generator searches the space of wall/open grids with a small genetic algorithm: a fixed
//! population of random candidates is scored, the best ones survive unchanged, and the population
//! is refilled with fresh random candidates and with mutated row-band crossovers of the survivors.
//!
//! Fitness is `w * openness + (1 - w) * path`, where `openness` is the share of interior cells that
//! are open and `path` is the mean breadth-first distance from the start to the three far corners
//! divided by `rows + cols` and clamped to `[0, 1]`. Candidates that are not fully connected from
//! the start score [`DISCONNECTED`] and can never beat a connected one.
//!
//! Evolution alone does not guarantee a connected result, so the accepted grid goes through a
//! repair pass that carves corridors from every unreachable pocket to the nearest reachable cell.

use std::cmp::Ordering;

use color_eyre::eyre::{bail, Result};
use rand::{seq::SliceRandom as _, Rng};
use tracing::{debug, info, warn};

use crate::{
    connectivity::{self, DistanceField},
    grid::{Cell, Grid, Position},
};

/// Fitness sentinel of a candidate that is not fully connected from the start cell.
pub const DISCONNECTED: f64 = -1.0;

/// Tunable parameters of the genetic search.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Grid height in cells, border included.
    pub rows: usize,
    /// Grid width in cells, border included.
    pub cols: usize,
    /// Candidates per generation.
    pub population: usize,
    /// Survivors kept unchanged from one generation to the next.
    pub elites: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// Fresh random candidates injected into every new generation.
    pub fresh: usize,
    /// Probability that an interior cell of a random candidate starts as a wall.
    pub wall_probability: f64,
    /// Probability that a single interior cell of a child flips.
    pub mutation_rate: f64,
    /// Probability that a crossover splices at two row boundaries instead of one.
    pub two_point_rate: f64,
    /// Weight of openness in the fitness; the path term gets the rest.
    pub openness_weight: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 24,
            population: 30,
            elites: 10,
            generations: 100,
            fresh: 2,
            wall_probability: 0.4,
            mutation_rate: 0.03,
            two_point_rate: 0.5,
            openness_weight: 0.9,
        }
    }
}

impl GeneratorConfig {
    /// Checks that the parameters describe a search that can run.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - The grid is smaller than 5x5
    /// - The elite count is zero or larger than the population
    /// - Elites plus fresh candidates exceed the population
    /// - A probability or the openness weight falls outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.rows < 5 || self.cols < 5 {
            bail!("the grid must be at least 5x5, got {}x{}", self.rows, self.cols);
        }
        if self.elites == 0 || self.elites > self.population {
            bail!(
                "elite count {} must be between 1 and the population size {}",
                self.elites,
                self.population
            );
        }
        if self.elites + self.fresh > self.population {
            bail!(
                "{} elites and {} fresh candidates do not fit in a population of {}",
                self.elites,
                self.fresh,
                self.population
            );
        }
        for (name, value) in [
            ("wall probability", self.wall_probability),
            ("mutation rate", self.mutation_rate),
            ("two-point crossover rate", self.two_point_rate),
            ("openness weight", self.openness_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must lie in [0, 1], got {value}");
            }
        }

        Ok(())
    }
}

/// Candidate grid together with its fitness.
#[derive(Clone, Debug)]
struct Scored {
    /// The candidate.
    grid: Grid,
    /// Its fitness.
    fitness: f64,
}

/// Genetic maze generator.
#[derive(Clone, Debug, Default)]
pub struct MazeGenerator {
    /// Search parameters.
    config: GeneratorConfig,
}

impl MazeGenerator {
    /// Builds a generator after checking its configuration.
    ///
    /// # Errors
    ///
    /// This function may return errors if the configuration fails [`GeneratorConfig::validate`].
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    /// Search parameters of this generator.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs the full genetic search and returns the accepted grid.
    ///
    /// The result always has a wall border, an open start cell and open far corners, and every
    /// open cell is reachable from the start. The output depends only on the state of `rng`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let mut population: Vec<Grid> = (0..self.config.population)
            .map(|_| self.random_candidate(rng))
            .collect();

        for generation in 0..self.config.generations {
            let ranked = self.rank(population);
            let connected = ranked
                .iter()
                .filter(|scored| scored.fitness > DISCONNECTED)
                .count();
            debug!(
                generation,
                best = ranked.first().map_or(DISCONNECTED, |scored| scored.fitness),
                connected,
                "generation scored"
            );

            population = self.breed(&ranked, rng);
        }

        let ranked = self.rank(population);
        let (mut best, fitness) = match ranked.into_iter().next() {
            Some(scored) => (scored.grid, scored.fitness),
            None => (self.random_candidate(rng), DISCONNECTED),
        };
        info!(
            fitness,
            generations = self.config.generations,
            "genetic search finished"
        );

        best.enforce_border();
        best.open_landmarks();
        let carved = repair(&mut best);
        if carved > 0 {
            warn!(carved, "best candidate was disconnected, carved corridors to connect it");
        }

        best
    }

    /// Scores a candidate.
    ///
    /// Returns [`DISCONNECTED`] when some open cell cannot be reached from the start, otherwise a
    /// value in `[0, 1]`.
    #[must_use]
    pub fn fitness(&self, grid: &Grid) -> f64 {
        let start = grid.start();
        if !grid.is_open(start) || !connectivity::is_fully_connected(grid, start) {
            return DISCONNECTED;
        }

        let interior = grid.interior().count();
        let open_interior = grid.interior().filter(|pos| grid.is_open(*pos)).count();
        let openness = ratio(open_interior, interior);

        let field = DistanceField::new(grid, start);
        let unreachable = grid.rows() + grid.cols();
        let corners = grid.corners();
        let total: usize = corners
            .iter()
            .map(|corner| field.get(*corner).unwrap_or(unreachable))
            .sum();
        let path = ratio(total, corners.len() * unreachable).clamp(0.0, 1.0);

        let weight = self.config.openness_weight;
        weight.mul_add(openness, (1.0 - weight) * path)
    }

    /// Builds a random candidate with a wall border and open landmarks.
    fn random_candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let mut grid = Grid::filled(self.config.rows, self.config.cols, Cell::Wall);
        let interior: Vec<Position> = grid.interior().collect();
        for pos in interior {
            if !rng.gen_bool(self.config.wall_probability) {
                grid.set(pos, Cell::Open);
            }
        }
        grid.open_landmarks();

        grid
    }

    /// Scores a population and sorts it best first.
    ///
    /// The sort is stable, so disqualified candidates keep their relative order.
    fn rank(&self, population: Vec<Grid>) -> Vec<Scored> {
        let mut ranked: Vec<Scored> = population
            .into_iter()
            .map(|grid| Scored {
                fitness: self.fitness(&grid),
                grid,
            })
            .collect();
        ranked.sort_by(|left, right| right.fitness.total_cmp(&left.fitness));

        ranked
    }

    /// Produces the next generation from a ranked one: elites, then fresh candidates, then
    /// mutated children of random elite pairs.
    fn breed<R: Rng + ?Sized>(&self, ranked: &[Scored], rng: &mut R) -> Vec<Grid> {
        let elites: Vec<&Grid> = ranked
            .iter()
            .take(self.config.elites)
            .map(|scored| &scored.grid)
            .collect();

        let mut next: Vec<Grid> = elites.iter().map(|grid| (*grid).clone()).collect();
        for _ in 0..self.config.fresh {
            if next.len() >= self.config.population {
                break;
            }
            next.push(self.random_candidate(rng));
        }

        while next.len() < self.config.population {
            let parents: Vec<&&Grid> = elites.choose_multiple(rng, 2).collect();
            let child = match parents.as_slice() {
                [first, second] => self.crossover(first, second, rng),
                [only] => Grid::clone(only),
                _ => self.random_candidate(rng),
            };
            next.push(self.mutate(child, rng));
        }

        next
    }

    /// Splices two parents at one or two random row boundaries.
    ///
    /// With one cut the child takes the rows above the cut from `first` and the rest from
    /// `second`. With two cuts the middle band comes from `second` and both outer bands from
    /// `first`.
    fn crossover<R: Rng + ?Sized>(&self, first: &Grid, second: &Grid, rng: &mut R) -> Grid {
        let rows = first.rows();
        let mut child = first.clone();

        let cut = rng.gen_range(1..rows - 1);
        if rng.gen_bool(self.config.two_point_rate) {
            let end = rng.gen_range(cut + 1..rows);
            child.copy_rows_from(second, cut..end);
        } else {
            child.copy_rows_from(second, cut..rows);
        }

        child
    }

    /// Flips every interior cell independently with the mutation rate, then reopens the
    /// landmarks.
    fn mutate<R: Rng + ?Sized>(&self, mut grid: Grid, rng: &mut R) -> Grid {
        let interior: Vec<Position> = grid.interior().collect();
        for pos in interior {
            if rng.gen_bool(self.config.mutation_rate) {
                if let Some(cell) = grid.get(pos) {
                    grid.set(pos, cell.flipped());
                }
            }
        }
        grid.open_landmarks();

        grid
    }
}

/// Opens corridors until every open cell is reachable from the start, returning the number of
/// corridors carved.
///
/// Each pass takes the first unreachable open cell in row-major order and carves an L-shaped
/// corridor (horizontal leg first) to the closest reachable cell, which merges at least one pocket
/// into the reachable region.
pub fn repair(grid: &mut Grid) -> usize {
    let start = grid.start();
    grid.set(start, Cell::Open);
    let mut carved = 0;

    loop {
        let region = connectivity::reachable(grid, start);
        let Some(pocket) = grid.open_cells().find(|pos| !region.contains(pos)) else {
            return carved;
        };
        let Some(anchor) = region
            .iter()
            .copied()
            .min_by(|left, right| compare_distance(pocket, *left, *right))
        else {
            return carved;
        };

        carve_corridor(grid, pocket, anchor);
        carved += 1;
    }
}

/// Orders two candidate anchors by Manhattan distance to `target`.
fn compare_distance(target: Position, left: Position, right: Position) -> Ordering {
    target.manhattan(left).cmp(&target.manhattan(right))
}

/// Opens every cell on the L-shaped path from `from` to `to`, horizontal leg first.
fn carve_corridor(grid: &mut Grid, from: Position, to: Position) {
    let (low_x, high_x) = (from.x.min(to.x), from.x.max(to.x));
    for x in low_x..=high_x {
        grid.set(Position::new(x, from.y), Cell::Open);
    }
    let (low_y, high_y) = (from.y.min(to.y), from.y.max(to.y));
    for y in low_y..=high_y {
        grid.set(Position::new(to.x, y), Cell::Open);
    }
}

/// Floating-point ratio of two counts.
#[expect(
    clippy::cast_precision_loss,
    reason = "Cell counts of a terminal-sized grid are far below 2^52."
)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng as _};

    use super::*;

    /// Small configuration that keeps the tests fast.
    fn create_test_config() -> GeneratorConfig {
        GeneratorConfig {
            rows: 12,
            cols: 12,
            generations: 20,
            ..GeneratorConfig::default()
        }
    }

    /// Asserts every invariant an accepted grid must satisfy.
    fn assert_accepted(grid: &Grid) {
        assert!(
            grid.positions()
                .filter(|pos| grid.is_border(*pos))
                .all(|pos| grid.get(pos) == Some(Cell::Wall)),
            "border cells must be walls"
        );
        assert!(
            grid.landmarks().iter().all(|pos| grid.is_open(*pos)),
            "start and corners must be open"
        );
        assert!(
            connectivity::is_fully_connected(grid, grid.start()),
            "every open cell must be reachable from the start"
        );
    }

    #[test]
    fn test_generate_satisfies_invariants() {
        let generator = MazeGenerator::new(create_test_config()).expect("test config is valid");
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generator.generate(&mut rng);

            assert_eq!(grid.rows(), 12, "row count should follow the configuration");
            assert_eq!(grid.cols(), 12, "column count should follow the configuration");
            assert_accepted(&grid);
        }
    }

    #[test]
    fn test_generate_default_size() {
        let generator = MazeGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let grid = generator.generate(&mut rng);

        assert_eq!(grid.rows(), 24, "default grid is 24 rows high");
        assert_eq!(grid.cols(), 24, "default grid is 24 columns wide");
        assert_accepted(&grid);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let tiny = GeneratorConfig {
            rows: 2,
            cols: 2,
            ..GeneratorConfig::default()
        };
        assert!(MazeGenerator::new(tiny).is_err(), "grids below 5x5 are rejected");

        let bad_rate = GeneratorConfig {
            mutation_rate: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(MazeGenerator::new(bad_rate).is_err(), "rates above one are rejected");

        let nan_rate = GeneratorConfig {
            wall_probability: f64::NAN,
            ..GeneratorConfig::default()
        };
        assert!(MazeGenerator::new(nan_rate).is_err(), "NaN rates are rejected");

        assert!(
            MazeGenerator::new(create_test_config()).is_ok(),
            "a valid configuration is accepted"
        );
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let generator = MazeGenerator::new(create_test_config()).expect("test config is valid");
        let first = generator.generate(&mut StdRng::seed_from_u64(42));
        let second = generator.generate(&mut StdRng::seed_from_u64(42));

        assert_eq!(first, second, "the same seed must produce the same maze");
    }

    #[test]
    fn test_fitness_disqualifies_disconnected() {
        let generator = MazeGenerator::default();
        let grid = Grid::from_rows(&[
            "#######", //
            "#.....#", //
            "#.###.#", //
            "#.#.#.#", //
            "#.###.#", //
            "#.....#", //
            "#######",
        ])
        .expect("fixture grid should parse");

        let fitness = generator.fitness(&grid);
        assert!(
            fitness.total_cmp(&DISCONNECTED).is_eq(),
            "a sealed pocket must score the sentinel"
        );
    }

    #[test]
    fn test_fitness_prefers_openness() {
        let generator = MazeGenerator::default();
        let mut open = Grid::filled(7, 7, Cell::Open);
        open.enforce_border();
        let sparse = Grid::from_rows(&[
            "#######", //
            "#.....#", //
            "#####.#", //
            "#.....#", //
            "#.#####", //
            "#.....#", //
            "#######",
        ])
        .expect("fixture grid should parse");

        let open_fitness = generator.fitness(&open);
        let sparse_fitness = generator.fitness(&sparse);
        assert!(
            (0.0..=1.0).contains(&open_fitness),
            "connected fitness must be normalised"
        );
        assert!(
            open_fitness > sparse_fitness,
            "a fully open maze should outscore a winding one under the default weighting"
        );
    }

    #[test]
    fn test_crossover_inherits_row_bands() {
        let config = GeneratorConfig {
            rows: 8,
            cols: 6,
            ..GeneratorConfig::default()
        };
        let generator = MazeGenerator::new(config).expect("test config is valid");
        let walls = Grid::filled(8, 6, Cell::Wall);
        let opens = Grid::filled(8, 6, Cell::Open);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..20 {
            let child = generator.crossover(&walls, &opens, &mut rng);
            for y in 0..8 {
                let row: Vec<Cell> = (0..6)
                    .filter_map(|x| child.get(Position::new(x, y)))
                    .collect();
                assert!(
                    row.iter().all(|cell| *cell == Cell::Wall)
                        || row.iter().all(|cell| *cell == Cell::Open),
                    "each child row must come whole from one parent"
                );
            }
            assert_eq!(
                child.get(Position::new(0, 0)),
                Some(Cell::Wall),
                "the first row always comes from the first parent"
            );
        }
    }

    #[test]
    fn test_mutate_keeps_border_and_landmarks() {
        let config = GeneratorConfig {
            rows: 10,
            cols: 10,
            mutation_rate: 1.0,
            ..GeneratorConfig::default()
        };
        let generator = MazeGenerator::new(config).expect("test config is valid");
        let mut grid = Grid::filled(10, 10, Cell::Wall);
        grid.open_landmarks();
        let mut rng = StdRng::seed_from_u64(9);

        let mutated = generator.mutate(grid, &mut rng);
        assert!(
            mutated
                .positions()
                .filter(|pos| mutated.is_border(*pos))
                .all(|pos| mutated.get(pos) == Some(Cell::Wall)),
            "mutation must never touch the border"
        );
        assert!(
            mutated.landmarks().iter().all(|pos| mutated.is_open(*pos)),
            "landmarks are reopened after mutation"
        );
        assert!(
            mutated.is_open(Position::new(4, 4)),
            "a full-rate mutation flips interior walls open"
        );
    }

    #[test]
    fn test_repair_connects_pockets() {
        let mut grid = Grid::from_rows(&[
            "#########", //
            "#..######", //
            "#..######", //
            "#########", //
            "#####.###", //
            "#########", //
            "######..#", //
            "######..#", //
            "#########",
        ])
        .expect("fixture grid should parse");

        let carved = repair(&mut grid);
        assert_eq!(carved, 2, "two pockets need two corridors");
        assert!(
            connectivity::is_fully_connected(&grid, grid.start()),
            "the repaired grid must be connected"
        );
    }

    #[test]
    fn test_repair_leaves_connected_grid_alone() {
        let mut grid = Grid::filled(6, 6, Cell::Open);
        grid.enforce_border();
        let before = grid.clone();

        assert_eq!(repair(&mut grid), 0, "nothing to carve");
        assert_eq!(grid, before, "a connected grid must not change");
    }

    #[test]
    fn test_validate() {
        assert!(GeneratorConfig::default().validate().is_ok(), "defaults are valid");

        let too_many_elites = GeneratorConfig {
            elites: 31,
            ..GeneratorConfig::default()
        };
        assert!(too_many_elites.validate().is_err(), "elites cannot exceed the population");

        let tiny = GeneratorConfig {
            rows: 4,
            ..GeneratorConfig::default()
        };
        assert!(tiny.validate().is_err(), "grids under 5x5 are rejected");

        let bad_rate = GeneratorConfig {
            mutation_rate: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(bad_rate.validate().is_err(), "rates above one are rejected");
    }
}
