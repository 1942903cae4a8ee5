//! A single lattice cell
//!
//! Cells are pure state plus local derived quantities. All cross-cell
//! interaction goes through links, orchestrated by the lattice; a cell never
//! reaches into a neighbor on its own.

use crate::core_types::config::SimConfig;
use crate::core_types::link::LinkId;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub type Vec2 = Vector2<f32>;

/// Floor on the derived heat capacity.
///
/// A cell stripped of all mass has an undefined temperature (heat divided by
/// zero capacity). Clamping the divisor keeps temperature finite so it can
/// feed back into combustion and pressure without producing NaN.
pub(crate) const MIN_HEAT_CAPACITY: f32 = 1e-6;

/// Combustible and atmospheric state of one lattice position.
///
/// All stores are kept non-negative at the end of every step; combustion
/// converts fuel and oxygen to inert mass with the total mass conserved
/// exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Remaining combustible quantity (abstract units)
    pub(crate) fuel: f32,
    /// Remaining oxidizer quantity (abstract units)
    pub(crate) oxygen: f32,
    /// Non-reactive mass; combustion byproducts accumulate here
    pub(crate) inert_mass: f32,
    /// Total thermal energy stored in the cell
    pub(crate) heat: f32,
    /// Hysteretic combustion state
    pub(crate) burning: bool,
    /// Net directional oxygen transport seen this step; drives embers and
    /// visualization only, reset at the top of every step
    pub(crate) momentum: Vec2,
    /// Incident links indexed by [`Direction`](crate::Direction); boundary
    /// cells have fewer than four
    pub(crate) links: [Option<LinkId>; 4],
}

impl Cell {
    /// Create a cell at the given temperature with the given stores.
    pub fn new(temperature: f32, fuel: f32, oxygen: f32, inert_mass: f32, config: &SimConfig) -> Self {
        let mut cell = Cell {
            fuel,
            oxygen,
            inert_mass,
            heat: 0.0,
            burning: false,
            momentum: Vec2::zeros(),
            links: [None; 4],
        };
        cell.heat = temperature * cell.heat_capacity(config);
        cell
    }

    /// Mass bound in fuel
    pub fn fuel_mass(&self, config: &SimConfig) -> f32 {
        self.fuel * config.fuel_unit_mass
    }

    /// Mass bound in oxygen
    pub fn oxygen_mass(&self, config: &SimConfig) -> f32 {
        self.oxygen * config.oxygen_unit_mass
    }

    /// Total mass of the cell. Conserved by everything the lattice does
    /// except nothing: combustion shifts mass between the fuel, oxygen and
    /// inert partitions but keeps the sum exact.
    pub fn mass(&self, config: &SimConfig) -> f32 {
        self.fuel_mass(config) + self.oxygen_mass(config) + self.inert_mass
    }

    /// Heat capacity derived from the current mass partition, floored at a
    /// small epsilon so temperature stays finite for an empty cell.
    pub fn heat_capacity(&self, config: &SimConfig) -> f32 {
        let capacity = self.fuel_mass(config) * config.fuel_heat_capacity
            + self.oxygen_mass(config) * config.oxygen_heat_capacity
            + self.inert_mass * config.inert_heat_capacity;
        capacity.max(MIN_HEAT_CAPACITY)
    }

    /// Current temperature (°)
    pub fn temperature(&self, config: &SimConfig) -> f32 {
        self.heat / self.heat_capacity(config)
    }

    /// Force the cell to a temperature by rewriting its stored heat.
    /// The one externally settable quantity after construction; ignition
    /// triggers and pointer interaction both come through here.
    pub fn set_temperature(&mut self, temperature: f32, config: &SimConfig) {
        self.heat = (temperature * self.heat_capacity(config)).max(0.0);
    }

    /// Gas pressure of the cell: hot, oxygen-rich cells push outward.
    /// Monotone increasing in both temperature and oxygen mass.
    pub fn pressure(&self, config: &SimConfig) -> f32 {
        (config.pressure_coefficient * (self.temperature(config) - 1.0) + 1.0)
            * self.oxygen_mass(config)
    }

    /// Run one combustion step on this cell alone.
    ///
    /// Ignition and extinction are hysteretic: a cell ignites at
    /// `fuel_ignition_temp` but keeps burning down to `fuel_sustain_temp`,
    /// so it does not flicker at the ignition boundary. While burning, fuel
    /// consumption is capped by the burn rate and by the available oxygen
    /// divided by the stoichiometric ratio.
    pub(crate) fn burn(&mut self, config: &SimConfig) {
        if self.burning {
            if self.fuel <= 0.0
                || self.oxygen <= 0.0
                || self.temperature(config) < config.fuel_sustain_temp
            {
                self.burning = false;
            }
        } else if self.temperature(config) >= config.fuel_ignition_temp
            && self.fuel > 0.0
            && self.oxygen > 0.0
        {
            self.burning = true;
        }

        if self.burning {
            let burned_fuel = self
                .fuel
                .min(config.fuel_burn_rate)
                .min(self.oxygen / config.burn_oxygen_fuel_ratio);

            self.oxygen = (self.oxygen - burned_fuel * config.burn_oxygen_fuel_ratio).max(0.0);
            self.fuel = (self.fuel - burned_fuel).max(0.0);
            // Byproduct mass equals the consumed fuel and oxygen mass exactly
            self.inert_mass += burned_fuel
                * (config.burn_oxygen_fuel_ratio * config.oxygen_unit_mass
                    + config.fuel_unit_mass);
            self.heat += burned_fuel * config.fuel_potential_heat;
        }
    }

    // Public accessor methods for renderers and external drivers

    /// Remaining fuel units
    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    /// Remaining oxygen units
    pub fn oxygen(&self) -> f32 {
        self.oxygen
    }

    /// Accumulated inert mass
    pub fn inert_mass(&self) -> f32 {
        self.inert_mass
    }

    /// Stored thermal energy
    pub fn heat(&self) -> f32 {
        self.heat
    }

    /// Whether the cell is currently burning
    pub fn is_burning(&self) -> bool {
        self.burning
    }

    /// Net directional oxygen transport from the last step
    pub fn momentum(&self) -> Vec2 {
        self.momentum
    }

    /// Incident link in the given direction, if the cell has a neighbor there
    pub fn link(&self, direction: crate::Direction) -> Option<LinkId> {
        self.links[direction.index()]
    }
}
