//! Pursuer agent module.
//!
//! This module contains the AI-controlled adversaries. Each pursuer wraps one route algorithm with a
//! small state machine: it hunts the player with its algorithm, flees while the player is powered
//! up, and ignores the power window for one decision right after it has been eaten.
//!
//! All position changes go through the grid's move gate. A pursuer never remembers more than the cell
//! it came from, which it avoids stepping back onto unless it has no other choice.

use color_eyre::eyre::{bail, Result};
use rand::{
    seq::{IteratorRandom as _, SliceRandom as _},
    Rng,
};
use tracing::{debug, trace};

use crate::{
    connectivity,
    grid::{Grid, MoveError, Position},
    pathfinding::{DepthBoundedBfs, Pathfinder as _, Strategy},
};

/// Names of the four pursuers, in turn order.
pub const ROSTER: [&str; 4] = ["Blinky", "Inky", "Pinky", "Clyde"];

/// Behavioural state of a pursuer for the current decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PursuerState {
    /// Hunting the player.
    Normal,
    /// Fleeing from a powered-up player.
    Scared,
    /// Hunting right after being eaten, whatever the power state.
    JustRespawned,
}

/// An AI-controlled adversary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pursuer {
    /// Display name.
    name: &'static str,
    /// Route algorithm used while hunting.
    strategy: Strategy,
    /// Current cell.
    position: Position,
    /// Cell chosen at maze load; every reset returns here.
    spawn: Position,
    /// Whether the pursuer flees this decision.
    scared: bool,
    /// Whether the pursuer was eaten since its last decision.
    just_respawned: bool,
    /// Whether the pursuer has already been eaten during the current power window.
    ate_during_power: bool,
    /// Cell the pursuer occupied before its last move.
    previous: Option<Position>,
}

impl Pursuer {
    /// Places a new pursuer on its spawn cell.
    #[must_use]
    pub const fn new(name: &'static str, strategy: Strategy, spawn: Position) -> Self {
        Self {
            name,
            strategy,
            position: spawn,
            spawn,
            scared: false,
            just_respawned: false,
            ate_during_power: false,
            previous: None,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Route algorithm used while hunting.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Spawn cell.
    #[must_use]
    pub const fn spawn(&self) -> Position {
        self.spawn
    }

    /// Whether the pursuer flees this decision.
    #[must_use]
    pub const fn is_scared(&self) -> bool {
        self.scared
    }

    /// Whether the pursuer was eaten since its last decision.
    #[must_use]
    pub const fn just_respawned(&self) -> bool {
        self.just_respawned
    }

    /// Whether the pursuer was already eaten during the current power window.
    #[must_use]
    pub const fn ate_during_power(&self) -> bool {
        self.ate_during_power
    }

    /// Cell the pursuer occupied before its last move.
    #[must_use]
    pub const fn previous(&self) -> Option<Position> {
        self.previous
    }

    /// Current behavioural state.
    #[must_use]
    pub const fn state(&self) -> PursuerState {
        if self.just_respawned {
            PursuerState::JustRespawned
        } else if self.scared {
            PursuerState::Scared
        } else {
            PursuerState::Normal
        }
    }

    /// Whether touching the player would get this pursuer eaten rather than cost a life.
    #[must_use]
    pub const fn is_edible(&self) -> bool {
        self.scared && !self.ate_during_power
    }

    /// Whether the pursuer should be drawn as scared.
    #[must_use]
    pub const fn appears_scared(&self) -> bool {
        self.scared && !self.just_respawned
    }

    /// Re-evaluates the scared flag for the coming decision.
    ///
    /// A pursuer that was just eaten is never scared; otherwise it is scared exactly while the
    /// player is powered up and it has not been eaten yet during this power window.
    pub fn update_scared_state(&mut self, powered_up: bool) {
        self.scared = !self.just_respawned && powered_up && !self.ate_during_power;
    }

    /// Makes one decision and moves accordingly.
    ///
    /// A scared pursuer flees from `target`, any other one hunts it with its route algorithm. The
    /// just-respawned flag is cleared once the move is done. Returns the cell the pursuer ends on.
    ///
    /// # Errors
    ///
    /// This function returns the move gate's error if the decision would put the pursuer on a wall
    /// or move it by more than one cell per leg. This never happens on a well-formed grid and is
    /// treated as fatal by the caller.
    pub fn take_turn<R: Rng + ?Sized>(
        &mut self,
        grid: &Grid,
        target: Position,
        rng: &mut R,
    ) -> Result<Position, MoveError> {
        if self.scared {
            self.flee(grid, target)?;
        } else {
            self.hunt(grid, target, rng)?;
        }
        self.just_respawned = false;

        Ok(self.position)
    }

    /// Steps to the neighbour farthest from `target`.
    ///
    /// The cell the pursuer came from is only considered when it is the sole open neighbour. Ties
    /// go to the first neighbour in `+x`, `-x`, `+y`, `-y` order. Without any open neighbour the
    /// pursuer stays put.
    fn flee(&mut self, grid: &Grid, target: Position) -> Result<(), MoveError> {
        let mut farthest: Option<(usize, Position)> = None;
        for next in self.legal_moves(grid) {
            let distance = next.manhattan(target);
            match farthest {
                Some((best, _)) if best >= distance => {}
                _ => farthest = Some((distance, next)),
            }
        }

        if let Some((distance, next)) = farthest {
            trace!(pursuer = self.name, %next, distance, "fleeing");
            self.walk(grid, &[next])?;
        }

        Ok(())
    }

    /// Takes one step along the route towards `target`.
    ///
    /// When the first step would lead straight back and the route continues, the pursuer walks on
    /// to the second step within the same decision. An empty route falls back to a random legal
    /// move.
    fn hunt<R: Rng + ?Sized>(
        &mut self,
        grid: &Grid,
        target: Position,
        rng: &mut R,
    ) -> Result<(), MoveError> {
        let route = self.strategy.find_route(self.position, target, grid);

        match route.as_slice() {
            [] => {
                let choice = self.legal_moves(grid).choose(rng).copied();
                if let Some(next) = choice {
                    trace!(pursuer = self.name, %next, "no route, wandering");
                    self.walk(grid, &[next])?;
                }
            }
            [first, second, ..] if Some(*first) == self.previous => {
                trace!(pursuer = self.name, %second, "skipping backtrack");
                self.walk(grid, &[*first, *second])?;
            }
            [first, ..] => {
                trace!(pursuer = self.name, next = %first, "hunting");
                self.walk(grid, &[*first])?;
            }
        }

        Ok(())
    }

    /// Open neighbours excluding the previous cell, unless that leaves nothing.
    fn legal_moves(&self, grid: &Grid) -> Vec<Position> {
        let open: Vec<Position> = grid.open_neighbors(self.position).collect();
        let forward: Vec<Position> = open
            .iter()
            .copied()
            .filter(|next| Some(*next) != self.previous)
            .collect();

        if forward.is_empty() {
            open
        } else {
            forward
        }
    }

    /// Moves through `steps` one gated leg at a time and remembers the starting cell.
    fn walk(&mut self, grid: &Grid, steps: &[Position]) -> Result<(), MoveError> {
        let origin = self.position;
        let mut current = origin;
        for step in steps {
            current = grid.advance(current, *step)?;
        }

        self.previous = Some(origin);
        self.position = current;

        Ok(())
    }

    /// Sends an eaten pursuer back to its spawn.
    ///
    /// It stops being scared, ignores the power window for its next decision and cannot be eaten
    /// again until the window ends.
    pub fn respawn(&mut self) {
        self.position = self.spawn;
        self.previous = None;
        self.scared = false;
        self.just_respawned = true;
        self.ate_during_power = true;
    }

    /// Sends the pursuer back to its spawn and clears every transient flag, as after a lost life.
    pub fn reset_for_round(&mut self) {
        self.position = self.spawn;
        self.previous = None;
        self.scared = false;
        self.just_respawned = false;
        self.ate_during_power = false;
    }

    /// Starts a new power window in which the pursuer may be eaten again.
    pub fn reset_power_window(&mut self) {
        self.ate_during_power = false;
    }

    /// Ends the power window.
    pub fn expire_power(&mut self) {
        self.scared = false;
        self.ate_during_power = false;
    }

    /// Teleports the pursuer, bypassing the move gate.
    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Forces the scared flag.
    #[cfg(test)]
    pub(crate) fn set_scared(&mut self, scared: bool) {
        self.scared = scared;
    }
}

/// Cells a pursuer may spawn on.
///
/// These are the cells reachable from `start`, except `start` itself, that have at least one open
/// neighbour, in row-major order.
#[must_use]
pub fn spawn_cells(grid: &Grid, start: Position) -> Vec<Position> {
    connectivity::reachable(grid, start)
        .into_iter()
        .filter(|pos| *pos != start && grid.open_neighbors(*pos).next().is_some())
        .collect()
}

/// Builds the four pursuers on distinct random spawn cells.
///
/// Blinky uses A*, Inky uniform-cost search, Pinky a BFS bounded to `bfs_depth` dequeues and Clyde
/// the greedy lookahead.
///
/// # Errors
///
/// This function may return errors if the maze has fewer spawn cells than pursuers.
pub fn roster<R: Rng + ?Sized>(grid: &Grid, bfs_depth: usize, rng: &mut R) -> Result<Vec<Pursuer>> {
    let strategies = [
        Strategy::AStar,
        Strategy::UniformCost,
        Strategy::DepthBoundedBfs(DepthBoundedBfs {
            max_expansions: bfs_depth,
        }),
        Strategy::Greedy,
    ];

    let cells = spawn_cells(grid, grid.start());
    let mut spawns = cells.into_iter().choose_multiple(rng, ROSTER.len());
    if spawns.len() < ROSTER.len() {
        bail!(
            "the maze has {} spawn cells but {} pursuers need one each",
            spawns.len(),
            ROSTER.len()
        );
    }
    // Sampling does not guarantee a random order.
    spawns.shuffle(rng);

    let pursuers: Vec<Pursuer> = ROSTER
        .into_iter()
        .zip(strategies)
        .zip(spawns)
        .map(|((name, strategy), spawn)| Pursuer::new(name, strategy, spawn))
        .collect();
    for pursuer in &pursuers {
        debug!(
            pursuer = pursuer.name(),
            strategy = %pursuer.strategy(),
            spawn = %pursuer.spawn(),
            "pursuer spawned"
        );
    }

    Ok(pursuers)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::{rngs::StdRng, SeedableRng as _};

    use super::*;
    use crate::grid::Cell;

    /// Single horizontal corridor from (1, 1) to (5, 1).
    fn create_corridor() -> Grid {
        Grid::from_rows(&[
            "#######", //
            "#.....#", //
            "#######",
        ])
        .expect("fixture grid should parse")
    }

    /// Open 7x7 room.
    fn create_room() -> Grid {
        let mut grid = Grid::filled(7, 7, Cell::Open);
        grid.enforce_border();
        grid
    }

    #[test]
    fn test_state_transitions() {
        let mut pursuer = Pursuer::new("Blinky", Strategy::AStar, Position::new(3, 3));
        assert_eq!(pursuer.state(), PursuerState::Normal, "pursuers start hunting");

        pursuer.update_scared_state(true);
        assert_eq!(pursuer.state(), PursuerState::Scared, "power scares the pursuer");
        assert!(pursuer.is_edible(), "a scared pursuer can be eaten");

        pursuer.respawn();
        pursuer.update_scared_state(true);
        assert_eq!(
            pursuer.state(),
            PursuerState::JustRespawned,
            "an eaten pursuer hunts on its next decision"
        );
        assert!(!pursuer.is_scared(), "a respawned pursuer is not scared");
        assert!(!pursuer.appears_scared(), "a respawned pursuer is drawn normally");

        let grid = create_room();
        let mut rng = StdRng::seed_from_u64(0);
        let _ = pursuer
            .take_turn(&grid, Position::new(1, 1), &mut rng)
            .expect("moves in an open room are legal");
        pursuer.update_scared_state(true);
        assert_eq!(
            pursuer.state(),
            PursuerState::Normal,
            "an eaten pursuer stays unscared for the rest of the window"
        );

        pursuer.expire_power();
        pursuer.update_scared_state(true);
        assert_eq!(pursuer.state(), PursuerState::Scared, "a new window scares it again");

        pursuer.update_scared_state(false);
        assert_eq!(pursuer.state(), PursuerState::Normal, "no power, no fear");
    }

    #[test]
    fn test_hunt_steps_along_route() {
        let grid = create_corridor();
        let mut pursuer = Pursuer::new("Blinky", Strategy::AStar, Position::new(2, 1));
        let mut rng = StdRng::seed_from_u64(0);

        let moved = pursuer
            .take_turn(&grid, Position::new(5, 1), &mut rng)
            .expect("corridor moves are legal");
        assert_eq!(moved, Position::new(3, 1), "one step towards the player");
        assert_eq!(pursuer.previous(), Some(Position::new(2, 1)), "previous cell is remembered");
    }

    #[test]
    fn test_hunt_skips_backtrack() {
        let grid = create_corridor();
        let mut pursuer = Pursuer::new("Blinky", Strategy::AStar, Position::new(2, 1));
        let mut rng = StdRng::seed_from_u64(0);
        let _ = pursuer
            .take_turn(&grid, Position::new(5, 1), &mut rng)
            .expect("corridor moves are legal");

        let moved = pursuer
            .take_turn(&grid, Position::new(1, 1), &mut rng)
            .expect("corridor moves are legal");
        assert_eq!(
            moved,
            Position::new(1, 1),
            "a backtracking first step is skipped in favour of the second"
        );
        assert_eq!(
            pursuer.previous(),
            Some(Position::new(3, 1)),
            "previous is the cell before the decision"
        );
    }

    #[test]
    fn test_hunt_backtracks_when_route_ends() {
        let grid = create_corridor();
        let mut pursuer = Pursuer::new("Blinky", Strategy::AStar, Position::new(2, 1));
        let mut rng = StdRng::seed_from_u64(0);
        let _ = pursuer
            .take_turn(&grid, Position::new(5, 1), &mut rng)
            .expect("corridor moves are legal");

        let moved = pursuer
            .take_turn(&grid, Position::new(2, 1), &mut rng)
            .expect("corridor moves are legal");
        assert_eq!(moved, Position::new(2, 1), "a one-step route is taken even if it backtracks");
    }

    #[test]
    fn test_empty_route_falls_back_to_random_move() {
        let grid = create_room();
        let strategy = Strategy::DepthBoundedBfs(DepthBoundedBfs { max_expansions: 0 });
        let start = Position::new(3, 3);

        for seed in 0..8 {
            let mut pursuer = Pursuer::new("Pinky", strategy, start);
            let mut rng = StdRng::seed_from_u64(seed);
            let moved = pursuer
                .take_turn(&grid, Position::new(5, 5), &mut rng)
                .expect("random moves are legal");

            assert!(start.is_adjacent(moved), "the fallback moves exactly one cell");
            assert!(grid.is_open(moved), "the fallback lands on an open cell");
        }
    }

    #[test]
    fn test_flee_maximises_distance() {
        let grid = create_room();
        let mut pursuer = Pursuer::new("Inky", Strategy::UniformCost, Position::new(3, 3));
        pursuer.set_scared(true);
        let mut rng = StdRng::seed_from_u64(0);

        let moved = pursuer
            .take_turn(&grid, Position::new(1, 3), &mut rng)
            .expect("flight moves are legal");
        assert_eq!(moved, Position::new(4, 3), "flee away from a player on the left");

        let moved = pursuer
            .take_turn(&grid, Position::new(5, 3), &mut rng)
            .expect("flight moves are legal");
        assert_eq!(
            moved,
            Position::new(4, 4),
            "the previous cell is excluded, leaving the first of the tied side steps"
        );
    }

    #[test]
    fn test_flee_backtracks_out_of_dead_end() {
        let grid = create_corridor();
        let mut pursuer = Pursuer::new("Inky", Strategy::UniformCost, Position::new(4, 1));
        pursuer.set_scared(true);
        let mut rng = StdRng::seed_from_u64(0);

        let moved = pursuer
            .take_turn(&grid, Position::new(1, 1), &mut rng)
            .expect("flight moves are legal");
        assert_eq!(moved, Position::new(5, 1), "flee into the dead end");

        let moved = pursuer
            .take_turn(&grid, Position::new(1, 1), &mut rng)
            .expect("flight moves are legal");
        assert_eq!(moved, Position::new(4, 1), "the only way out is back");
    }

    #[test]
    fn test_enclosed_pursuer_stays() {
        let grid = Grid::from_rows(&["###", "#.#", "###"]).expect("fixture grid should parse");
        let mut rng = StdRng::seed_from_u64(0);

        for scared in [false, true] {
            let mut pursuer = Pursuer::new("Clyde", Strategy::Greedy, Position::new(1, 1));
            pursuer.set_scared(scared);
            let moved = pursuer
                .take_turn(&grid, Position::new(1, 1), &mut rng)
                .expect("staying put is legal");

            assert_eq!(moved, Position::new(1, 1), "nowhere to go");
            assert_eq!(pursuer.previous(), None, "staying is not a move");
        }
    }

    #[test]
    fn test_illegal_walk_is_rejected() {
        let grid = create_corridor();
        let mut pursuer = Pursuer::new("Clyde", Strategy::Greedy, Position::new(4, 1));

        assert_eq!(
            pursuer.walk(&grid, &[Position::new(4, 0)]),
            Err(MoveError::Wall {
                to: Position::new(4, 0)
            }),
            "walking into a wall is rejected by the gate"
        );
        assert_eq!(
            pursuer.walk(&grid, &[Position::new(2, 1)]),
            Err(MoveError::NotAdjacent {
                from: Position::new(4, 1),
                to: Position::new(2, 1)
            }),
            "jumping is rejected by the gate"
        );
        assert_eq!(pursuer.position(), Position::new(4, 1), "a rejected walk changes nothing");
        assert_eq!(pursuer.previous(), None, "a rejected walk is not remembered");

        pursuer.set_position(Position::new(1, 1));
        assert_eq!(
            pursuer.walk(&grid, &[Position::new(2, 1), Position::new(3, 1)]),
            Ok(()),
            "two adjacent legs pass the gate"
        );
        assert_eq!(pursuer.position(), Position::new(3, 1), "both legs are walked");
    }

    #[test]
    fn test_respawn_and_round_reset() {
        let grid = create_room();
        let spawn = Position::new(3, 3);
        let mut pursuer = Pursuer::new("Blinky", Strategy::AStar, spawn);
        let mut rng = StdRng::seed_from_u64(0);
        let _ = pursuer
            .take_turn(&grid, Position::new(1, 1), &mut rng)
            .expect("moves in an open room are legal");
        pursuer.set_scared(true);

        pursuer.respawn();
        assert_eq!(pursuer.position(), spawn, "eaten pursuers return to their spawn");
        assert!(pursuer.ate_during_power(), "it cannot be eaten twice in a window");
        assert!(pursuer.just_respawned(), "it is marked as respawned");
        assert_eq!(pursuer.previous(), None, "its move memory is cleared");

        pursuer.reset_for_round();
        assert_eq!(
            pursuer,
            Pursuer::new("Blinky", Strategy::AStar, spawn),
            "a round reset restores the initial state"
        );
    }

    #[test]
    fn test_spawn_cells() {
        let grid = Grid::from_rows(&[
            "#######", //
            "#...#.#", //
            "#######",
        ])
        .expect("fixture grid should parse");

        assert_eq!(
            spawn_cells(&grid, grid.start()),
            vec![Position::new(2, 1), Position::new(3, 1)],
            "spawns are reachable, not the start and not isolated"
        );
    }

    #[test]
    fn test_roster() {
        let grid = create_room();
        let mut rng = StdRng::seed_from_u64(5);
        let pursuers = roster(&grid, 10, &mut rng).expect("the room has enough spawn cells");

        let names: Vec<&str> = pursuers.iter().map(Pursuer::name).collect();
        assert_eq!(names, ROSTER, "pursuers come in roster order");
        assert_eq!(
            pursuers.iter().map(Pursuer::strategy).collect::<Vec<_>>(),
            vec![
                Strategy::AStar,
                Strategy::UniformCost,
                Strategy::DepthBoundedBfs(DepthBoundedBfs { max_expansions: 10 }),
                Strategy::Greedy,
            ],
            "each pursuer has its own algorithm"
        );

        let spawns: BTreeSet<Position> = pursuers.iter().map(Pursuer::spawn).collect();
        assert_eq!(spawns.len(), 4, "spawn cells are distinct");
        assert!(!spawns.contains(&grid.start()), "nobody spawns on the player");
        assert!(
            spawns.iter().all(|pos| grid.is_open(*pos)),
            "spawn cells are open"
        );
    }

    #[test]
    fn test_roster_needs_room() {
        let grid = Grid::from_rows(&["#####", "#...#", "#####"]).expect("fixture grid should parse");
        let mut rng = StdRng::seed_from_u64(0);

        assert!(roster(&grid, 10, &mut rng).is_err(), "two spawn cells cannot host four pursuers");
    }
}
