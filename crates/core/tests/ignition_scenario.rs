//! Lattice-scale ignition behavior
//!
//! The 3x3 scenario: one center cell forced to 600° amid ambient
//! neighbors, stepped once. The center must ignite and burn at most one
//! burn-rate's worth of fuel, and its four edge neighbors must have
//! received heat, while the untouched diagonals stay exactly ambient.

use brushfire_core::{Lattice, SimConfig};

fn scenario_config() -> SimConfig {
    SimConfig {
        start_fuel: 1000.0,
        start_oxygen: 5000.0,
        ..SimConfig::default()
    }
}

#[test]
fn center_cell_ignites_and_heats_its_neighbors() {
    let config = scenario_config();
    let mut lattice = Lattice::new(3, 3, config, 0);
    lattice.set_temperature(1, 1, 600.0);

    let edge_neighbors = [(1, 0), (0, 1), (2, 1), (1, 2)];
    let diagonals = [(0, 0), (2, 0), (0, 2), (2, 2)];
    let neighbor_heat_before: Vec<f32> = edge_neighbors
        .iter()
        .map(|&(x, y)| lattice.cell_at(x, y).unwrap().heat())
        .collect();
    let diagonal_heat_before: Vec<f32> = diagonals
        .iter()
        .map(|&(x, y)| lattice.cell_at(x, y).unwrap().heat())
        .collect();

    lattice.step();

    let center = lattice.cell_at(1, 1).unwrap();
    assert!(center.is_burning(), "600° is above the 500° ignition point");

    let consumed = 1000.0 - center.fuel();
    assert!(consumed > 0.0, "burning consumes fuel");
    assert!(
        consumed <= config.fuel_burn_rate + 1e-4,
        "one step burns at most the burn rate: consumed {consumed}"
    );

    for (&(x, y), &before) in edge_neighbors.iter().zip(&neighbor_heat_before) {
        let after = lattice.cell_at(x, y).unwrap().heat();
        assert!(
            after > before,
            "neighbor ({x},{y}) received no heat: {before} -> {after}"
        );
    }

    // Diagonals share no link with the center; with every flow computed
    // from the pre-update snapshot they see nothing on the first step.
    for (&(x, y), &before) in diagonals.iter().zip(&diagonal_heat_before) {
        let after = lattice.cell_at(x, y).unwrap().heat();
        assert!(
            (after - before).abs() < before * 1e-5,
            "diagonal ({x},{y}) changed on the first step: {before} -> {after}"
        );
    }
}

#[test]
fn ignition_threshold_is_inclusive() {
    let config = scenario_config();
    let mut lattice = Lattice::new(3, 3, config, 0);
    lattice.set_temperature(1, 1, config.fuel_ignition_temp);

    lattice.step();

    assert!(
        lattice.cell_at(1, 1).unwrap().is_burning(),
        "a cell exactly at the ignition temperature ignites within one step"
    );
}

#[test]
fn burning_survives_the_hysteresis_band() {
    let config = scenario_config();
    let mut lattice = Lattice::new(3, 3, config, 0);
    lattice.set_temperature(1, 1, 600.0);
    lattice.step();
    assert!(lattice.cell_at(1, 1).unwrap().is_burning());

    // Drag the cell below ignition but above sustain: it must keep burning
    let band = (config.fuel_sustain_temp + config.fuel_ignition_temp) / 2.0;
    lattice.set_temperature(1, 1, band);
    lattice.step();
    assert!(
        lattice.cell_at(1, 1).unwrap().is_burning(),
        "burning persists between sustain and ignition temperatures"
    );

    // Below sustain it goes out
    lattice.set_temperature(1, 1, config.fuel_sustain_temp - 50.0);
    lattice.step();
    assert!(!lattice.cell_at(1, 1).unwrap().is_burning());
}

#[test]
fn fire_spreads_to_neighbors_over_time() {
    let config = scenario_config();
    let mut lattice = Lattice::new(5, 5, config, 0);
    lattice.set_temperature(2, 2, 700.0);

    let mut burning_cells = 0;
    for _ in 0..400 {
        lattice.step();
        burning_cells = lattice.cells().iter().filter(|c| c.is_burning()).count();
        if burning_cells > 1 {
            break;
        }
    }

    assert!(
        burning_cells > 1,
        "combustion heat should eventually ignite a neighbor"
    );
}
