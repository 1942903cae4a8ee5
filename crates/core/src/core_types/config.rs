//! Simulation tunables
//!
//! All physical constants of the simulation live in one immutable [`SimConfig`]
//! passed to the lattice at construction. Nothing reads process-wide mutable
//! state; two lattices built from different configs evolve independently.

use serde::{Deserialize, Serialize};

/// Immutable simulation parameters.
///
/// Defaults describe dry scrubland under still air: fuel ignites at 500°,
/// keeps burning down to 250°, and each burned fuel unit consumes twenty
/// oxygen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Temperature of the implicit infinite reservoir every cell leaks
    /// heat to (or draws heat from) each step (°)
    pub ambient_temperature: f32,
    /// Strength of the ambient exchange, as a multiple of the cell-to-cell
    /// heat transfer rate. Zero isolates the lattice completely.
    pub ambient_loss: f32,
    /// Conductive heat flow per degree of temperature difference
    pub heat_transfer_rate: f32,

    /// Heat released per burned fuel unit
    pub fuel_potential_heat: f32,
    /// Temperature at which an idle cell with fuel and oxygen ignites (°)
    pub fuel_ignition_temp: f32,
    /// Temperature below which a burning cell extinguishes (°).
    /// Must be below `fuel_ignition_temp`; the gap is the hysteresis band
    /// that keeps cells from flickering at the ignition boundary.
    pub fuel_sustain_temp: f32,
    /// Maximum fuel units burned per cell per step
    pub fuel_burn_rate: f32,
    /// Mass of one fuel unit
    pub fuel_unit_mass: f32,
    /// Heat capacity per unit of fuel mass
    pub fuel_heat_capacity: f32,

    /// Mass of one oxygen unit
    pub oxygen_unit_mass: f32,
    /// Heat capacity per unit of oxygen mass
    pub oxygen_heat_capacity: f32,
    /// Scale on the square-root pressure-difference law for oxygen flow
    pub oxygen_diffusion_rate: f32,

    /// Heat capacity per unit of inert mass
    pub inert_heat_capacity: f32,

    /// Oxygen units consumed per fuel unit burned (stoichiometric ratio)
    pub burn_oxygen_fuel_ratio: f32,

    /// Temperature sensitivity of cell pressure. A hot cell pushes its
    /// oxygen outward even against a concentration gradient.
    pub pressure_coefficient: f32,

    /// Per-step probability that an ember attempts to hop to a neighbor
    pub ember_move_chance: f32,

    /// Fuel units a freshly built cell starts with (before patchiness)
    pub start_fuel: f32,
    /// Oxygen units a freshly built cell starts with
    pub start_oxygen: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            ambient_temperature: 30.0,
            ambient_loss: 6.0,
            heat_transfer_rate: 1.0,
            fuel_potential_heat: 600_000.0,
            fuel_ignition_temp: 500.0,
            fuel_sustain_temp: 250.0,
            fuel_burn_rate: 1.0,
            fuel_unit_mass: 100.0,
            fuel_heat_capacity: 1.0,
            oxygen_unit_mass: 10.0,
            oxygen_heat_capacity: 0.4,
            oxygen_diffusion_rate: 10.0,
            inert_heat_capacity: 1.0,
            burn_oxygen_fuel_ratio: 20.0,
            pressure_coefficient: 0.5,
            ember_move_chance: 0.025,
            start_fuel: 1000.0,
            start_oxygen: 10_000.0,
        }
    }
}

impl SimConfig {
    /// Check construction-time contracts.
    ///
    /// # Panics
    ///
    /// Panics when a parameter combination can never produce a well-formed
    /// lattice. This is a caller contract violation, not a runtime error;
    /// `step()` itself never fails.
    pub fn validate(&self) {
        assert!(
            self.fuel_unit_mass > 0.0 && self.oxygen_unit_mass > 0.0,
            "unit masses must be positive"
        );
        assert!(
            self.fuel_heat_capacity > 0.0
                && self.oxygen_heat_capacity > 0.0
                && self.inert_heat_capacity > 0.0,
            "heat capacities must be positive"
        );
        assert!(
            self.fuel_sustain_temp < self.fuel_ignition_temp,
            "sustain temperature {} must be below ignition temperature {}",
            self.fuel_sustain_temp,
            self.fuel_ignition_temp
        );
        assert!(
            self.burn_oxygen_fuel_ratio > 0.0,
            "oxygen-to-fuel burn ratio must be positive"
        );
        assert!(
            (0.0..=1.0).contains(&self.ember_move_chance),
            "ember move chance must be a probability"
        );
        assert!(
            self.ambient_loss >= 0.0 && self.heat_transfer_rate >= 0.0,
            "transfer rates must be non-negative"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default().validate();
    }

    #[test]
    #[should_panic(expected = "sustain temperature")]
    fn inverted_hysteresis_band_is_rejected() {
        let config = SimConfig {
            fuel_sustain_temp: 600.0,
            ..SimConfig::default()
        };
        config.validate();
    }

    #[test]
    #[should_panic(expected = "unit masses")]
    fn zero_unit_mass_is_rejected() {
        let config = SimConfig {
            oxygen_unit_mass: 0.0,
            ..SimConfig::default()
        };
        config.validate();
    }
}
