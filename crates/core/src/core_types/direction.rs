//! Lattice directions
//!
//! Cells index their incident links by a fixed four-way direction. The y
//! axis grows southward (row order), so `South` is `(0, +1)`.

use serde::{Deserialize, Serialize};

/// One of the four lattice directions, usable as an index into a per-cell
/// neighbor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
}

impl Direction {
    /// All four directions, in index order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Grid offset of one step in this direction
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// The direction pointing back along this one
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Index into a `[Option<LinkId>; 4]` neighbor table
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_cancel() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen = [false; 4];
        for dir in Direction::ALL {
            assert!(!seen[dir.index()]);
            seen[dir.index()] = true;
        }
    }
}
