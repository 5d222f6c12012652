//! Pursuer route algorithms.
//!
//! This module contains the four route searches a pursuer can be configured with. All of them share
//! the [`Pathfinder`] capability and are selected through the closed [`Strategy`] enumeration rather
//! than by name.
//!
//! A route never contains the start cell: its first element is the next cell to step onto, and
//! every following element is adjacent to the one before it. Walls and cells outside the grid are
//! impassable for every algorithm, and no search expands the same cell twice.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque},
    fmt,
};

use crate::grid::{Grid, Position};

/// Sequence of cells leading away from a start cell, start excluded.
pub type Route = Vec<Position>;

/// Shared route-computing capability of every search.
pub trait Pathfinder {
    /// Computes a route from `start` towards `goal` on `grid`.
    ///
    /// An empty route means no route was found, or that there is nowhere to go.
    fn find_route(&self, start: Position, goal: Position, grid: &Grid) -> Route;
}

/// Best-first search on `cost-so-far + Manhattan distance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AStar;

/// Best-first search on cost-so-far alone.
///
/// With unit step costs this is Dijkstra's algorithm and returns shortest routes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UniformCost;

/// Breadth-first search that gives up after a fixed number of dequeues.
///
/// When the bound is hit before the goal is dequeued, the route stored with the cell at the head
/// of the queue is returned. That cell is simply the oldest unexpanded one, not the one closest to
/// the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthBoundedBfs {
    /// Maximum number of dequeue operations.
    pub max_expansions: usize,
}

/// One-step lookahead on Manhattan distance.
///
/// Only the four neighbours of the start are inspected; the first open one with the smallest
/// distance to the goal, in `+x`, `-x`, `+y`, `-y` order, becomes a single-step route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Greedy;

/// Closed set of route algorithms a pursuer can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// See [`AStar`].
    AStar,
    /// See [`UniformCost`].
    UniformCost,
    /// See [`DepthBoundedBfs`].
    DepthBoundedBfs(DepthBoundedBfs),
    /// See [`Greedy`].
    Greedy,
}

impl Strategy {
    /// Human readable name of the algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AStar => "A*",
            Self::UniformCost => "uniform-cost",
            Self::DepthBoundedBfs(_) => "depth-bounded BFS",
            Self::Greedy => "greedy",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl Pathfinder for Strategy {
    fn find_route(&self, start: Position, goal: Position, grid: &Grid) -> Route {
        match *self {
            Self::AStar => AStar.find_route(start, goal, grid),
            Self::UniformCost => UniformCost.find_route(start, goal, grid),
            Self::DepthBoundedBfs(bfs) => bfs.find_route(start, goal, grid),
            Self::Greedy => Greedy.find_route(start, goal, grid),
        }
    }
}

impl Pathfinder for AStar {
    fn find_route(&self, start: Position, goal: Position, grid: &Grid) -> Route {
        best_first(start, goal, grid, |pos| pos.manhattan(goal))
    }
}

impl Pathfinder for UniformCost {
    fn find_route(&self, start: Position, goal: Position, grid: &Grid) -> Route {
        best_first(start, goal, grid, |_| 0)
    }
}

impl Pathfinder for DepthBoundedBfs {
    fn find_route(&self, start: Position, goal: Position, grid: &Grid) -> Route {
        if !grid.is_open(start) {
            return Route::new();
        }

        let mut queue = VecDeque::from([(start, Route::new())]);
        let mut visited = BTreeSet::from([start]);
        let mut expansions = 0;

        while expansions < self.max_expansions {
            let Some((current, route)) = queue.pop_front() else {
                return Route::new();
            };
            expansions += 1;

            if current == goal {
                return route;
            }
            for next in grid.open_neighbors(current) {
                if visited.insert(next) {
                    let mut extended = route.clone();
                    extended.push(next);
                    queue.push_back((next, extended));
                }
            }
        }

        queue
            .front()
            .map(|(_, route)| route.clone())
            .unwrap_or_default()
    }
}

impl Pathfinder for Greedy {
    fn find_route(&self, start: Position, goal: Position, grid: &Grid) -> Route {
        let mut best: Option<(usize, Position)> = None;
        for next in grid.open_neighbors(start) {
            let distance = next.manhattan(goal);
            match best {
                Some((closest, _)) if closest <= distance => {}
                _ => best = Some((distance, next)),
            }
        }

        best.map(|(_, next)| vec![next]).unwrap_or_default()
    }
}

/// Entry of the open set of a best-first search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    /// Priority: cost so far plus heuristic.
    priority: usize,
    /// Insertion counter; earlier entries win ties.
    sequence: u64,
    /// Cost so far.
    cost: usize,
    /// Cell of this entry.
    position: Position,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest entry first.
        (other.priority, other.sequence).cmp(&(self.priority, self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shared skeleton of A* and uniform-cost search.
///
/// Every step costs one. Cells are closed when popped and never expanded again; stale heap entries
/// of closed cells are skipped.
fn best_first<H>(start: Position, goal: Position, grid: &Grid, heuristic: H) -> Route
where
    H: Fn(Position) -> usize,
{
    if start == goal || !grid.is_open(start) || !grid.is_open(goal) {
        return Route::new();
    }

    let mut open = BinaryHeap::new();
    let mut closed = BTreeSet::new();
    let mut came_from: BTreeMap<Position, Position> = BTreeMap::new();
    let mut best_cost = BTreeMap::from([(start, 0_usize)]);
    let mut sequence = 0_u64;

    open.push(OpenNode {
        priority: heuristic(start),
        sequence,
        cost: 0,
        position: start,
    });

    while let Some(node) = open.pop() {
        if !closed.insert(node.position) {
            continue;
        }
        if node.position == goal {
            return reconstruct(&came_from, start, goal);
        }

        for next in grid.open_neighbors(node.position) {
            if closed.contains(&next) {
                continue;
            }
            let cost = node.cost + 1;
            if best_cost.get(&next).is_some_and(|known| *known <= cost) {
                continue;
            }

            let _ = best_cost.insert(next, cost);
            let _ = came_from.insert(next, node.position);
            sequence += 1;
            open.push(OpenNode {
                priority: cost + heuristic(next),
                sequence,
                cost,
                position: next,
            });
        }
    }

    Route::new()
}

/// Walks the predecessor map back from `goal` and returns the route without `start`.
fn reconstruct(came_from: &BTreeMap<Position, Position>, start: Position, goal: Position) -> Route {
    let mut route = vec![goal];
    let mut current = goal;

    while let Some(previous) = came_from.get(&current).copied() {
        if previous == start {
            break;
        }
        route.push(previous);
        current = previous;
    }
    route.reverse();

    route
}
