//! Flood-fill reachability over the grid.
//!
//! The generator uses these helpers to disqualify disconnected candidates and to score path
//! length, the maze uses them to prune unreachable pellets and the pursuer roster uses them to
//! pick spawn cells.

use std::collections::{BTreeSet, VecDeque};

use crate::grid::{Grid, Position};

/// Set of every position reachable from `source` through 4-connected open cells.
///
/// The source itself is part of the set. When the source is a wall or out of bounds the set is
/// empty. Iteration order is the row-major order of [`Position`]'s `Ord` implementation, which
/// keeps seeded runs reproducible.
#[must_use]
pub fn reachable(grid: &Grid, source: Position) -> BTreeSet<Position> {
    let mut seen = BTreeSet::new();
    if !grid.is_open(source) {
        return seen;
    }

    let mut queue = VecDeque::from([source]);
    let _ = seen.insert(source);

    while let Some(current) = queue.pop_front() {
        for next in grid.open_neighbors(current) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen
}

/// Whether every open cell of the grid is reachable from `source`.
///
/// A wall source is only "connected" on a grid without any open cell.
#[must_use]
pub fn is_fully_connected(grid: &Grid, source: Position) -> bool {
    reachable(grid, source).len() == grid.open_count()
}

/// Breadth-first step distances from a single source to every cell of a grid.
#[derive(Clone, Debug)]
pub struct DistanceField {
    /// Width of the grid the field was computed on.
    cols: usize,
    /// Row-major distances; `None` marks walls and unreachable cells.
    distances: Vec<Option<usize>>,
}

impl DistanceField {
    /// Runs a breadth-first search from `source` over the open cells of `grid`.
    #[must_use]
    pub fn new(grid: &Grid, source: Position) -> Self {
        let cols = grid.cols();
        let mut distances = vec![None; grid.rows() * cols];

        if grid.is_open(source) {
            if let Some(slot) = distances.get_mut(source.y * cols + source.x) {
                *slot = Some(0);
            }
            let mut queue = VecDeque::from([(source, 0_usize)]);

            while let Some((current, depth)) = queue.pop_front() {
                for next in grid.open_neighbors(current) {
                    let Some(slot) = distances.get_mut(next.y * cols + next.x) else {
                        continue;
                    };
                    if slot.is_none() {
                        *slot = Some(depth + 1);
                        queue.push_back((next, depth + 1));
                    }
                }
            }
        }

        Self { cols, distances }
    }

    /// Distance to `target`, or `None` when it is a wall, unreachable or outside the grid.
    #[must_use]
    pub fn get(&self, target: Position) -> Option<usize> {
        if target.x >= self.cols {
            return None;
        }

        self.distances
            .get(target.y * self.cols + target.x)
            .copied()
            .flatten()
    }
}
