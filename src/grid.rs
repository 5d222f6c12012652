//! Grid geometry module.
//!
//! This module contains the binary wall/open grid the whole game is played on, together with the
//! coordinate and direction types and the single move gate through which every position change in
//! the simulation has to pass. Nothing outside this module writes an agent position without first
//! asking [`Grid::step`] or [`Grid::advance`] whether the target is legal.

use std::{fmt, ops::Range};

use color_eyre::eyre::{bail, Result};
use thiserror::Error;

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Impassable cell.
    Wall,
    /// Walkable cell.
    Open,
}

impl Cell {
    /// Returns the other kind of cell.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Wall => Self::Open,
            Self::Open => Self::Wall,
        }
    }
}

/// Integer coordinate on the grid.
///
/// `x` is the column and `y` is the row, both counted from the top-left corner. Adjacency is
/// 4-connected only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl Position {
    /// Builds a position from a column and a row.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two positions.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the neighbouring position in the given direction, or `None` when it would fall
    /// below zero on either axis.
    #[must_use]
    pub fn offset(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();

        Some(Self {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Whether the two positions share an edge.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "({}, {})", self.x, self.y)
    }
}

/// One of the four grid directions.
///
/// The declaration order is the fixed neighbour iteration order used everywhere tie-breaking
/// matters: `+x`, `-x`, `+y`, `-y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards increasing `x`.
    East,
    /// Towards decreasing `x`.
    West,
    /// Towards increasing `y`.
    South,
    /// Towards decreasing `y`.
    North,
}

impl Direction {
    /// All directions in neighbour iteration order.
    pub const ALL: [Self; 4] = [Self::East, Self::West, Self::South, Self::North];

    /// Displacement of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::South => (0, 1),
            Self::North => (0, -1),
        }
    }

    /// Converts a movement intent `(dx, dy)` into a direction.
    ///
    /// Returns `None` for the idle intent `(0, 0)` and for anything that is not a single
    /// orthogonal step.
    #[must_use]
    pub const fn from_delta(dx: isize, dy: isize) -> Option<Self> {
        match (dx, dy) {
            (1, 0) => Some(Self::East),
            (-1, 0) => Some(Self::West),
            (0, 1) => Some(Self::South),
            (0, -1) => Some(Self::North),
            _ => None,
        }
    }
}

/// Rejection reasons of the move gate.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    /// The target lies outside the grid.
    #[error("moving {direction:?} from {from} leaves the grid")]
    OutOfBounds {
        /// Cell the move started from.
        from: Position,
        /// Requested direction.
        direction: Direction,
    },
    /// The target is a wall.
    #[error("{to} is a wall")]
    Wall {
        /// Rejected target cell.
        to: Position,
    },
    /// The target does not share an edge with the origin.
    #[error("{from} and {to} are not adjacent")]
    NotAdjacent {
        /// Cell the move started from.
        from: Position,
        /// Rejected target cell.
        to: Position,
    },
}

/// Rectangular grid of wall and open cells.
///
/// The cells are stored row-major. Once a maze is accepted the grid is never mutated again; pellet
/// state lives on top of it in [`crate::maze::Maze`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row-major cell storage of length `rows * cols`.
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid where every cell has the same contents.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, cell: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![cell; rows * cols],
        }
    }

    /// Parses a grid from text rows where `#` is a wall and `.` is open.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - There are no rows or the first row is empty
    /// - Rows have different lengths
    /// - A character other than `#` or `.` appears
    pub fn from_rows(lines: &[&str]) -> Result<Self> {
        let Some(first) = lines.first() else {
            bail!("a grid needs at least one row");
        };
        let cols = first.len();
        if cols == 0 {
            bail!("a grid needs at least one column");
        }

        let mut cells = Vec::with_capacity(lines.len() * cols);
        for (row, line) in lines.iter().enumerate() {
            if line.len() != cols {
                bail!("row {row} has {} cells, expected {cols}", line.len());
            }
            for byte in line.bytes() {
                cells.push(match byte {
                    b'#' => Cell::Wall,
                    b'.' => Cell::Open,
                    other => bail!("unexpected cell character {:?} in row {row}", char::from(other)),
                });
            }
        }

        Ok(Self {
            rows: lines.len(),
            cols,
            cells,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Fixed start cell of the player.
    #[must_use]
    pub const fn start(&self) -> Position {
        Position::new(1, 1)
    }

    /// The three far corners the generator measures path length to: bottom-left, top-right and
    /// bottom-right interior corners.
    #[must_use]
    pub const fn corners(&self) -> [Position; 3] {
        let right = self.cols.saturating_sub(2);
        let bottom = self.rows.saturating_sub(2);

        [
            Position::new(1, bottom),
            Position::new(right, 1),
            Position::new(right, bottom),
        ]
    }

    /// Start cell followed by the three far corners; all four must be open in an accepted maze.
    #[must_use]
    pub const fn landmarks(&self) -> [Position; 4] {
        let [bottom_left, top_right, bottom_right] = self.corners();

        [self.start(), bottom_left, top_right, bottom_right]
    }

    /// Row-major index of a position, or `None` when out of bounds.
    const fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < self.cols && pos.y < self.rows {
            Some(pos.y * self.cols + pos.x)
        } else {
            None
        }
    }

    /// Contents of a cell, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx))
            .copied()
    }

    /// Overwrites a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(slot) = self.index(pos).and_then(|idx| self.cells.get_mut(idx)) {
            *slot = cell;
        }
    }

    /// Whether the cell exists and is open. Out-of-bounds cells count as walls.
    #[must_use]
    pub fn is_open(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Open)
    }

    /// Whether the cell lies on the outer ring of the grid.
    #[must_use]
    pub const fn is_border(&self, pos: Position) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x + 1 == self.cols || pos.y + 1 == self.rows
    }

    /// Every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Position::new(x, y)))
    }

    /// Every interior (non-border) position in row-major order.
    pub fn interior(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |pos| !self.is_border(*pos))
    }

    /// Every open position in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |pos| self.is_open(*pos))
    }

    /// Number of open cells.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Open).count()
    }

    /// Open neighbours of a cell in neighbour iteration order (`+x`, `-x`, `+y`, `-y`).
    pub fn open_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(pos, direction).ok())
    }

    /// The move gate for a directional step.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfBounds`] when the step leaves the grid and [`MoveError::Wall`]
    /// when the target is a wall.
    pub fn step(&self, from: Position, direction: Direction) -> Result<Position, MoveError> {
        let to = from
            .offset(direction)
            .filter(|to| self.index(*to).is_some())
            .ok_or(MoveError::OutOfBounds { from, direction })?;

        if self.is_open(to) {
            Ok(to)
        } else {
            Err(MoveError::Wall { to })
        }
    }

    /// The move gate for a step to an explicit target cell.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::NotAdjacent`] when the cells do not share an edge and
    /// [`MoveError::Wall`] when the target is a wall or outside the grid.
    pub fn advance(&self, from: Position, to: Position) -> Result<Position, MoveError> {
        if !from.is_adjacent(to) {
            return Err(MoveError::NotAdjacent { from, to });
        }
        if self.is_open(to) {
            Ok(to)
        } else {
            Err(MoveError::Wall { to })
        }
    }

    /// Turns every border cell into a wall.
    pub fn enforce_border(&mut self) {
        let border: Vec<Position> = self
            .positions()
            .filter(|pos| self.is_border(*pos))
            .collect();
        for pos in border {
            self.set(pos, Cell::Wall);
        }
    }

    /// Opens the start cell and the three far corners.
    pub fn open_landmarks(&mut self) {
        for pos in self.landmarks() {
            self.set(pos, Cell::Open);
        }
    }

    /// Replaces the given band of rows with the same rows taken from `other`.
    ///
    /// Both grids must have the same dimensions; rows past the end are ignored.
    pub fn copy_rows_from(&mut self, other: &Self, rows: Range<usize>) {
        let start = rows.start.min(self.rows) * self.cols;
        let end = rows.end.min(self.rows) * self.cols;

        if let (Some(target), Some(source)) =
            (self.cells.get_mut(start..end), other.cells.get(start..end))
        {
            target.copy_from_slice(source);
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.cells.chunks(self.cols.max(1)).enumerate() {
            if idx > 0 {
                writeln!(formatter)?;
            }
            for cell in row {
                formatter.write_str(match cell {
                    Cell::Wall => "#",
                    Cell::Open => ".",
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small fixture with a single interior wall.
    fn create_test_grid() -> Grid {
        Grid::from_rows(&["#####", "#...#", "#.#.#", "#...#", "#####"])
            .expect("fixture grid should parse")
    }

    #[test]
    fn test_from_rows_and_display_agree() {
        let grid = create_test_grid();

        assert_eq!(grid.rows(), 5, "grid should have five rows");
        assert_eq!(grid.cols(), 5, "grid should have five columns");
        assert_eq!(
            grid.to_string(),
            "#####\n#...#\n#.#.#\n#...#\n#####",
            "display should reproduce the fixture"
        );
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert!(Grid::from_rows(&[]).is_err(), "empty input must fail");
        assert!(
            Grid::from_rows(&["###", "##"]).is_err(),
            "ragged rows must fail"
        );
        assert!(
            Grid::from_rows(&["#x#"]).is_err(),
            "unknown characters must fail"
        );
    }

    #[test]
    fn test_step_gate() {
        let grid = create_test_grid();
        let origin = Position::new(1, 1);

        assert_eq!(
            grid.step(origin, Direction::East),
            Ok(Position::new(2, 1)),
            "open neighbour should be accepted"
        );
        assert_eq!(
            grid.step(origin, Direction::North),
            Err(MoveError::Wall {
                to: Position::new(1, 0)
            }),
            "border wall should be rejected"
        );
        assert_eq!(
            grid.step(Position::new(0, 0), Direction::West),
            Err(MoveError::OutOfBounds {
                from: Position::new(0, 0),
                direction: Direction::West
            }),
            "negative coordinates should be rejected"
        );
        assert!(
            grid.step(Position::new(4, 2), Direction::East).is_err(),
            "stepping past the last column should be rejected"
        );
    }

    #[test]
    fn test_advance_gate() {
        let grid = create_test_grid();

        assert!(
            grid.advance(Position::new(1, 1), Position::new(1, 2)).is_ok(),
            "adjacent open target should be accepted"
        );
        assert_eq!(
            grid.advance(Position::new(1, 1), Position::new(3, 1)),
            Err(MoveError::NotAdjacent {
                from: Position::new(1, 1),
                to: Position::new(3, 1)
            }),
            "jumps should be rejected"
        );
        assert_eq!(
            grid.advance(Position::new(2, 1), Position::new(2, 2)),
            Err(MoveError::Wall {
                to: Position::new(2, 2)
            }),
            "interior wall should be rejected"
        );
    }

    #[test]
    fn test_open_neighbors_order() {
        let grid = create_test_grid();
        let neighbors: Vec<Position> = grid.open_neighbors(Position::new(2, 1)).collect();

        assert_eq!(
            neighbors,
            vec![Position::new(3, 1), Position::new(1, 1)],
            "neighbours should come in +x, -x, +y, -y order"
        );
    }

    #[test]
    fn test_landmarks_and_border() {
        let mut grid = Grid::filled(6, 7, Cell::Open);
        grid.enforce_border();
        grid.set(Position::new(1, 1), Cell::Wall);
        grid.open_landmarks();

        assert!(
            grid.positions()
                .filter(|pos| grid.is_border(*pos))
                .all(|pos| grid.get(pos) == Some(Cell::Wall)),
            "all border cells should be walls"
        );
        assert_eq!(
            grid.landmarks(),
            [
                Position::new(1, 1),
                Position::new(1, 4),
                Position::new(5, 1),
                Position::new(5, 4)
            ],
            "landmarks should be the start and the interior corners"
        );
        assert!(
            grid.landmarks().iter().all(|pos| grid.is_open(*pos)),
            "landmarks should be open"
        );
    }

    #[test]
    fn test_copy_rows_from() {
        let mut target = Grid::filled(4, 3, Cell::Wall);
        let source = Grid::filled(4, 3, Cell::Open);
        target.copy_rows_from(&source, 1..3);

        assert_eq!(
            target.to_string(),
            "###\n...\n...\n###",
            "only the requested band should be copied"
        );
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(0, 0), None, "idle intent has no direction");
        assert_eq!(Direction::from_delta(1, 1), None, "diagonals are not allowed");
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            assert_eq!(
                Direction::from_delta(dx, dy),
                Some(direction),
                "delta should round trip"
            );
        }
    }

    #[test]
    fn test_cell_flipped() {
        assert_eq!(Cell::Wall.flipped(), Cell::Open, "wall flips to open");
        assert_eq!(Cell::Open.flipped(), Cell::Wall, "open flips to wall");
    }
}
