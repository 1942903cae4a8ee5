//! Airborne spark markers
//!
//! An ember is a weak positional reference to one cell. Each step it may
//! hop to a neighboring cell through an existing link, carried by the local
//! oxygen momentum. Embers never mutate cell state themselves; what happens
//! when one lands (ignition, visualization) is policy owned by the caller.

use crate::core_types::cell::Vec2;
use crate::core_types::direction::Direction;
use serde::{Deserialize, Serialize};

/// A mobile spark marker referencing one lattice position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ember {
    pub(crate) x: usize,
    pub(crate) y: usize,
}

impl Ember {
    pub(crate) fn new(x: usize, y: usize) -> Self {
        Ember { x, y }
    }

    /// Lattice coordinates of the cell this ember currently rides on
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}

/// Pick the hop direction for an ember sitting on a cell with the given
/// momentum.
///
/// The x axis is chosen with probability `|mx| / (|mx| + |my|)` using the
/// caller's uniform `roll` in `[0, 1)`; the direction along the chosen axis
/// follows the sign of that component. Returns `None` when the cell has no
/// momentum at all.
pub(crate) fn drift_direction(momentum: Vec2, roll: f32) -> Option<Direction> {
    let abs_x = momentum.x.abs();
    let abs_y = momentum.y.abs();
    let total = abs_x + abs_y;
    if total <= 0.0 {
        return None;
    }

    Some(if roll < abs_x / total {
        if momentum.x >= 0.0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if momentum.y >= 0.0 {
        Direction::South
    } else {
        Direction::North
    })
}
