//! Directed conduits between adjacent cells
//!
//! A link connects exactly two cells for the lifetime of the lattice and
//! carries one signed oxygen flow and one signed heat flow per step,
//! positive in the fixed `a -> b` reference direction. Flows are recomputed
//! from a consistent snapshot, scaled down by the endpoints' adjustment
//! pass, then fully consumed when the link sends.

use crate::core_types::cell::{Cell, Vec2};
use crate::core_types::config::SimConfig;
use serde::{Deserialize, Serialize};

/// Index of a cell within the lattice's row-major cell array
pub type CellId = usize;

/// Index of a link within the lattice's link array
pub type LinkId = usize;

/// Guard on the average temperature in the pressure-difference law. Two
/// cells at absolute-zero average would otherwise divide by zero.
const MIN_AVG_TEMP: f32 = 1e-3;

/// A conduit between two adjacent cells.
///
/// The endpoint pair is unordered and fixed; by construction `a < b`
/// (east and south neighbors have the larger index). `oxygen_flow` and
/// `heat_flow` are transient working values, zeroed after every transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub(crate) a: CellId,
    pub(crate) b: CellId,
    /// Unit vector from `a` to `b` in lattice space; orients momentum
    /// accumulation when oxygen moves
    pub(crate) orientation: Vec2,
    /// Scheduled oxygen transfer, positive `a -> b`
    pub(crate) oxygen_flow: f32,
    /// Scheduled heat transfer, positive `a -> b`
    pub(crate) heat_flow: f32,
}

impl Link {
    pub(crate) fn new(a: CellId, b: CellId, orientation: Vec2) -> Self {
        debug_assert!(a < b, "links are built with the smaller endpoint first");
        Link {
            a,
            b,
            orientation,
            oxygen_flow: 0.0,
            heat_flow: 0.0,
        }
    }

    /// The endpoint on the far side from `cell`
    pub fn other(&self, cell: CellId) -> CellId {
        if cell == self.a {
            self.b
        } else {
            self.a
        }
    }

    /// Is `cell` the endpoint the scheduled oxygen flow leaves from?
    pub(crate) fn is_oxygen_source(&self, cell: CellId) -> bool {
        (cell == self.a && self.oxygen_flow > 0.0) || (cell == self.b && self.oxygen_flow < 0.0)
    }

    /// Is `cell` the endpoint the scheduled heat flow leaves from?
    pub(crate) fn is_heat_source(&self, cell: CellId) -> bool {
        (cell == self.a && self.heat_flow > 0.0) || (cell == self.b && self.heat_flow < 0.0)
    }

    /// Compute candidate flows from the endpoints' current state.
    ///
    /// Oxygen follows a square-root law in the pressure difference, which
    /// caps growth for large differentials and avoids runaway transfer;
    /// heat conducts linearly with the temperature difference. Identical
    /// endpoints produce exactly zero flow.
    pub(crate) fn compute(&mut self, a: &Cell, b: &Cell, config: &SimConfig) {
        let temp_a = a.temperature(config);
        let temp_b = b.temperature(config);
        let avg_temp = ((temp_a + temp_b) / 2.0).max(MIN_AVG_TEMP);

        let pressure_delta = a.pressure(config) - b.pressure(config);
        self.oxygen_flow = config.oxygen_diffusion_rate
            * pressure_delta.signum()
            * (pressure_delta.abs() / avg_temp).sqrt();
        self.heat_flow = config.heat_transfer_rate * (temp_a - temp_b);
    }

    /// Move the (possibly scaled) flows from source to destination and
    /// reset the working fields.
    ///
    /// The oxygen flow is clamped once more against the supplying cell's
    /// actual store, then the moving gas's latent heat (at the source
    /// temperature) is added on top of the conductive flow and the total is
    /// re-clamped against the supplier's heat. Both endpoints accumulate
    /// the transported oxygen into their momentum.
    pub(crate) fn send(&mut self, a: &mut Cell, b: &mut Cell, config: &SimConfig) {
        // Don't send more than the source contains.
        if self.oxygen_flow > a.oxygen {
            self.oxygen_flow = a.oxygen;
        } else if -self.oxygen_flow > b.oxygen {
            self.oxygen_flow = -b.oxygen;
        }

        // Note that oxygen carries heat with it.
        let mut carried_heat =
            self.oxygen_flow * config.oxygen_unit_mass * config.oxygen_heat_capacity;
        carried_heat *= if self.oxygen_flow > 0.0 {
            a.temperature(config)
        } else {
            b.temperature(config)
        };
        self.heat_flow += carried_heat;

        if self.heat_flow > a.heat {
            self.heat_flow = a.heat;
        } else if -self.heat_flow > b.heat {
            self.heat_flow = -b.heat;
        }

        // Send the stuff, clamping rounding drift to exactly zero.
        a.oxygen = (a.oxygen - self.oxygen_flow).max(0.0);
        b.oxygen = (b.oxygen + self.oxygen_flow).max(0.0);
        a.heat = (a.heat - self.heat_flow).max(0.0);
        b.heat = (b.heat + self.heat_flow).max(0.0);

        let transported = self.orientation * self.oxygen_flow;
        a.momentum += transported;
        b.momentum += transported;

        self.oxygen_flow = 0.0;
        self.heat_flow = 0.0;
    }

    /// Scheduled oxygen flow, positive from `a` to `b`
    pub fn oxygen_flow(&self) -> f32 {
        self.oxygen_flow
    }

    /// Scheduled heat flow, positive from `a` to `b`
    pub fn heat_flow(&self) -> f32 {
        self.heat_flow
    }

    /// Endpoint pair `(a, b)`
    pub fn endpoints(&self) -> (CellId, CellId) {
        (self.a, self.b)
    }
}
