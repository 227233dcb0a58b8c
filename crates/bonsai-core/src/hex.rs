//! Hex coordinate system for a player's tree.
//!
//! Trees grow on an offset hex grid of pointy-top cells:
//! - `x` increases going right, `y` increases going up
//! - odd rows are shifted half a cell to the right
//! - the bud sits at `(0, 0)` on top of the pot
//!
//! The pot covers a fixed set of cells around and below the bud. Those cells
//! can never hold a tile and never count as neighbours.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a neighbouring cell. The discriminant doubles as a tile rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction {
    /// All directions in clockwise order starting from TopRight
    pub const ALL: [Direction; 6] = [
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// Rotation index of this direction (0-5)
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Direction for a rotation index, if in range
    pub fn from_index(index: u8) -> Option<Direction> {
        Self::ALL.get(index as usize).copied()
    }

    /// The next direction clockwise
    pub fn clockwise(self) -> Direction {
        Self::ALL[(self as usize + 1) % 6]
    }

    /// The direction pointing back at us from the neighbour
    pub fn opposite(self) -> Direction {
        Self::ALL[(self as usize + 3) % 6]
    }
}

/// A cell on the tree grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Coord {
    /// Column (increases going right)
    pub x: i32,
    /// Row (increases going up)
    pub y: i32,
}

/// Cells covered by the pot, as `(x, y)` pairs.
pub const POT_CELLS: [(i32, i32); 11] = [
    (-2, 0),
    (-1, 0),
    (1, 0),
    (2, 0),
    (-2, -1),
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, -2),
    (0, -2),
    (1, -2),
];

/// Leftmost pot column, in half-cell units (see [`Coord::half_column`]).
pub const POT_LEFT_EDGE: i32 = -4;

/// Rightmost pot column, in half-cell units.
pub const POT_RIGHT_EDGE: i32 = 4;

/// Largest `|x|` or `|y|` a tile may sit at. Far below `i32::MAX / 2` so
/// stepping and half-column arithmetic cannot overflow.
pub const GRID_LIMIT: i32 = 1 << 16;

impl Coord {
    /// The bud every tree starts from
    pub const ORIGIN: Coord = Coord::new(0, 0);

    /// Create a new coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Canonical map key for this cell, e.g. `"-1,3"`
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Parse a key produced by [`Coord::key`]
    pub fn from_key(key: &str) -> Option<Coord> {
        let (x, y) = key.split_once(',')?;
        Some(Coord::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
    }

    /// Whether the cell lies within [`GRID_LIMIT`] on both axes
    pub fn is_on_grid(&self) -> bool {
        let range = -GRID_LIMIT..=GRID_LIMIT;
        range.contains(&self.x) && range.contains(&self.y)
    }

    /// Whether the row is shifted half a cell to the right
    pub const fn is_odd_row(&self) -> bool {
        self.y.rem_euclid(2) == 1
    }

    /// Horizontal position in half-cell units, comparable across rows
    pub const fn half_column(&self) -> i32 {
        2 * self.x + if self.is_odd_row() { 1 } else { 0 }
    }

    /// Whether this cell is part of the pot
    pub fn is_pot(&self) -> bool {
        POT_CELLS.contains(&(self.x, self.y))
    }

    /// Whether the cell sticks out past the left edge of the pot
    pub const fn protrudes_left(&self) -> bool {
        self.half_column() < POT_LEFT_EDGE
    }

    /// Whether the cell sticks out past the right edge of the pot
    pub const fn protrudes_right(&self) -> bool {
        self.half_column() > POT_RIGHT_EDGE
    }

    /// Whether the cell is higher than the pot rim
    pub const fn is_above_pot(&self) -> bool {
        self.y > 0
    }

    /// Whether the cell hangs lower than the pot rim
    pub const fn is_below_pot(&self) -> bool {
        self.y < 0
    }

    /// The cell in a given direction, ignoring the pot
    pub const fn step(&self, direction: Direction) -> Coord {
        let (x, y) = (self.x, self.y);
        if self.is_odd_row() {
            match direction {
                Direction::TopRight => Coord::new(x + 1, y + 1),
                Direction::Right => Coord::new(x + 1, y),
                Direction::BottomRight => Coord::new(x + 1, y - 1),
                Direction::BottomLeft => Coord::new(x, y - 1),
                Direction::Left => Coord::new(x - 1, y),
                Direction::TopLeft => Coord::new(x, y + 1),
            }
        } else {
            match direction {
                Direction::TopRight => Coord::new(x, y + 1),
                Direction::Right => Coord::new(x + 1, y),
                Direction::BottomRight => Coord::new(x, y - 1),
                Direction::BottomLeft => Coord::new(x - 1, y - 1),
                Direction::Left => Coord::new(x - 1, y),
                Direction::TopLeft => Coord::new(x - 1, y + 1),
            }
        }
    }

    /// The neighbouring cell in a direction, or `None` if it lies in the pot
    pub fn neighbor(&self, direction: Direction) -> Option<Coord> {
        let cell = self.step(direction);
        (!cell.is_pot()).then_some(cell)
    }

    /// Neighbouring cells in [`Direction::ALL`] order, skipping pot cells
    pub fn neighbors(&self) -> Vec<(Direction, Coord)> {
        Direction::ALL
            .iter()
            .filter_map(|&dir| self.neighbor(dir).map(|cell| (dir, cell)))
            .collect()
    }

    /// Whether two cells share a side
    pub fn is_adjacent(&self, other: &Coord) -> bool {
        Direction::ALL.iter().any(|&dir| self.step(dir) == *other)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Neighbours of `(x, y)` keyed by direction, skipping pot cells
pub fn neighbors(coord: Coord) -> Vec<(Direction, Coord)> {
    coord.neighbors()
}
