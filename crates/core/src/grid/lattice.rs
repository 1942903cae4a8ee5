//! The 2D cell lattice and its fixed step pipeline
//!
//! The lattice owns every cell, link and ember for its lifetime. Topology
//! is built once (4-neighbor grid, no diagonals, one link per adjacent
//! pair) and never resized; every [`Lattice::step`] mutates state in place
//! through five strictly ordered phases, each completing over the whole
//! lattice before the next begins:
//!
//! 1. combustion on every cell (independent, parallel)
//! 2. flow computation on every link from the pre-update snapshot (parallel)
//! 3. per-cell flow adjustment (sequential, see below)
//! 4. flow application on every link
//! 5. ember advancement
//!
//! Phase 3 touches each link from both of its endpoints: a cell processed
//! later can see a flow already scaled by its neighbor, which only shrinks
//! it further. This sequential coupling is a documented approximation of
//! the rebalancing, kept deliberately; the iteration runs in cell index
//! order so results are reproducible.

use crate::core_types::cell::{Cell, Vec2};
use crate::core_types::config::SimConfig;
use crate::core_types::direction::Direction;
use crate::core_types::ember::{drift_direction, Ember};
use crate::core_types::link::{CellId, Link};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

/// A fixed-size lattice of cells joined to their 4-neighbors by links.
#[derive(Debug)]
pub struct Lattice {
    width: usize,
    height: usize,
    /// Cells in row-major order: `[y * width + x]`
    cells: Vec<Cell>,
    /// All links, east links first, then south links
    links: Vec<Link>,
    embers: Vec<Ember>,
    config: SimConfig,
    rng: StdRng,
    ticks: u64,
}

impl Lattice {
    /// Build a lattice with uniform initial fuel and oxygen at ambient
    /// temperature.
    ///
    /// # Panics
    ///
    /// Panics on zero dimensions or an invalid config; malformed
    /// construction is a contract violation, never a runtime error.
    pub fn new(width: usize, height: usize, config: SimConfig, seed: u64) -> Self {
        let fuel = vec![config.start_fuel; width * height];
        Self::from_fuel_map(width, height, config, seed, &fuel)
    }

    /// Build a lattice with the clumpy scrubland fuel distribution: random
    /// patches sampled through a triangle map, with odd rows and columns
    /// copying their even neighbor so patches span several cells.
    pub fn patchy(width: usize, height: usize, config: SimConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut fuel = vec![0.0_f32; width * height];
        for y in 0..height {
            for x in 0..width {
                fuel[y * width + x] = if y % 2 == 1 {
                    fuel[(y - 1) * width + x]
                } else if x % 2 == 1 {
                    fuel[y * width + (x - 1)]
                } else {
                    config.start_fuel * clump(rng.random::<f32>())
                };
            }
        }
        Self::from_fuel_map(width, height, config, seed, &fuel)
    }

    /// Build a lattice from an explicit per-cell fuel map in row-major
    /// order. Oxygen and temperature start uniform from the config.
    pub fn from_fuel_map(
        width: usize,
        height: usize,
        config: SimConfig,
        seed: u64,
        fuel: &[f32],
    ) -> Self {
        assert!(width > 0 && height > 0, "lattice dimensions must be positive");
        assert_eq!(fuel.len(), width * height, "fuel map does not match dimensions");
        config.validate();

        let mut cells: Vec<Cell> = fuel
            .iter()
            .map(|&fuel| {
                Cell::new(
                    config.ambient_temperature,
                    fuel,
                    config.start_oxygen,
                    0.0,
                    &config,
                )
            })
            .collect();

        // One link per adjacent pair: east links, then south links. The
        // lower index is always endpoint `a`, so positive flow points east
        // or south.
        let mut links = Vec::with_capacity(height * (width - 1) + width * (height - 1));
        for y in 0..height {
            for x in 0..width.saturating_sub(1) {
                let a = y * width + x;
                let b = a + 1;
                let id = links.len();
                links.push(Link::new(a, b, Vec2::new(1.0, 0.0)));
                cells[a].links[Direction::East.index()] = Some(id);
                cells[b].links[Direction::West.index()] = Some(id);
            }
        }
        for y in 0..height.saturating_sub(1) {
            for x in 0..width {
                let a = y * width + x;
                let b = a + width;
                let id = links.len();
                links.push(Link::new(a, b, Vec2::new(0.0, 1.0)));
                cells[a].links[Direction::South.index()] = Some(id);
                cells[b].links[Direction::North.index()] = Some(id);
            }
        }

        info!(width, height, links = links.len(), "lattice built");

        Lattice {
            width,
            height,
            cells,
            links,
            embers: Vec::new(),
            config,
            rng: StdRng::seed_from_u64(seed),
            ticks: 0,
        }
    }

    /// Advance the whole lattice by one discrete tick.
    ///
    /// Always succeeds on a well-formed lattice: arithmetic degeneracies
    /// (empty cells, drained stores) are guarded locally, not propagated.
    pub fn step(&mut self) {
        let config = self.config;

        // Phase 1: combustion, independent per cell. Momentum from the
        // previous step is consumed by then, so it resets here.
        self.cells.par_iter_mut().for_each(|cell| {
            cell.momentum = Vec2::zeros();
            cell.burn(&config);
        });

        // Phase 2: candidate flows, all reading the same snapshot.
        let cells = &self.cells;
        self.links.par_iter_mut().for_each(|link| {
            let (a, b) = link.endpoints();
            link.compute(&cells[a], &cells[b], &config);
        });

        // Phase 3: scale down whatever would overdraw a cell.
        for idx in 0..self.cells.len() {
            self.adjust_heat_flows(idx);
            self.adjust_oxygen_flows(idx);
        }

        // Phase 4: move the adjusted flows. Endpoint `a` is always the
        // smaller index, so splitting at `b` yields both cells.
        for id in 0..self.links.len() {
            let (a, b) = self.links[id].endpoints();
            let (head, tail) = self.cells.split_at_mut(b);
            self.links[id].send(&mut head[a], &mut tail[0], &config);
        }

        // Phase 5: embers ride the momentum field laid down in phase 4.
        self.advance_embers();

        self.ticks += 1;
        debug!(tick = self.ticks, "step complete");
    }

    /// Scale this cell's outgoing heat flows so they cannot overdraw its
    /// store once inflows are credited, and settle the exchange with the
    /// implicit ambient reservoir.
    fn adjust_heat_flows(&mut self, idx: CellId) {
        let config = self.config;
        let incident = self.cells[idx].links;

        let mut out_total = 0.0_f32;
        let mut in_total = 0.0_f32;
        for id in incident.into_iter().flatten() {
            let link = &self.links[id];
            if link.is_heat_source(idx) {
                out_total += link.heat_flow().abs();
            } else {
                in_total += link.heat_flow().abs();
            }
        }

        // The ambient reservoir joins the balance as one more inflow or
        // outflow before scaling.
        let mut ambient_exchange = config.ambient_loss
            * config.heat_transfer_rate
            * (config.ambient_temperature - self.cells[idx].temperature(&config));
        if ambient_exchange > 0.0 {
            in_total += ambient_exchange;
        } else {
            out_total += -ambient_exchange;
        }

        let available = self.cells[idx].heat;
        if out_total > available + in_total && out_total > 0.0 {
            let scale = (available + in_total) / out_total;
            if ambient_exchange < 0.0 {
                ambient_exchange *= scale;
            }
            for id in incident.into_iter().flatten() {
                if self.links[id].is_heat_source(idx) {
                    self.links[id].heat_flow *= scale;
                }
            }
        }

        // Link flows wait for the application phase; the reservoir has no
        // link, so its share lands on the cell immediately.
        self.cells[idx].heat = (available + ambient_exchange).max(0.0);
    }

    /// Scale this cell's outgoing oxygen flows by the same balance rule.
    fn adjust_oxygen_flows(&mut self, idx: CellId) {
        let incident = self.cells[idx].links;

        let mut out_total = 0.0_f32;
        let mut in_total = 0.0_f32;
        for id in incident.into_iter().flatten() {
            let link = &self.links[id];
            if link.is_oxygen_source(idx) {
                out_total += link.oxygen_flow().abs();
            } else {
                in_total += link.oxygen_flow().abs();
            }
        }

        let available = self.cells[idx].oxygen;
        if out_total > available + in_total && out_total > 0.0 {
            let scale = (available + in_total) / out_total;
            for id in incident.into_iter().flatten() {
                if self.links[id].is_oxygen_source(idx) {
                    self.links[id].oxygen_flow *= scale;
                }
            }
        }
    }

    /// Let each ember attempt one probabilistic hop along the local
    /// momentum. A missing link (lattice edge) or a drained cell means the
    /// ember stays put.
    fn advance_embers(&mut self) {
        let Lattice {
            width,
            cells,
            links,
            embers,
            config,
            rng,
            ..
        } = self;
        let width = *width;

        for ember in embers.iter_mut() {
            if !rng.random_bool(f64::from(config.ember_move_chance)) {
                continue;
            }
            let here = ember.y * width + ember.x;
            let cell = &cells[here];
            if cell.oxygen <= 0.0 {
                continue;
            }
            let Some(direction) = drift_direction(cell.momentum, rng.random::<f32>()) else {
                continue;
            };
            if let Some(id) = cell.links[direction.index()] {
                let target = links[id].other(here);
                ember.x = target % width;
                ember.y = target / width;
            }
        }
    }

    // Input/trigger surface

    /// Force one cell to the given temperature. The only externally
    /// settable quantity after construction; used to seed ignitions or
    /// cool a cell down.
    pub fn set_temperature(&mut self, x: usize, y: usize, temperature: f32) {
        let idx = self.index(x, y);
        let config = self.config;
        self.cells[idx].set_temperature(temperature, &config);
    }

    /// Drop a new ember on the given cell.
    pub fn spawn_ember(&mut self, x: usize, y: usize) {
        assert!(x < self.width && y < self.height, "ember spawned out of bounds");
        self.embers.push(Ember::new(x, y));
    }

    /// Keep only the embers the caller's policy still wants airborne.
    pub fn retain_embers(&mut self, keep: impl FnMut(&Ember) -> bool) {
        self.embers.retain(keep);
    }

    // Renderer surface

    /// Row-major index of `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> CellId {
        assert!(x < self.width && y < self.height, "cell index out of bounds");
        y * self.width + x
    }

    /// Cell at grid coordinates (bounds-checked)
    pub fn cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Temperature of the cell at `(x, y)` (°)
    pub fn temperature_at(&self, x: usize, y: usize) -> f32 {
        let idx = self.index(x, y);
        self.cells[idx].temperature(&self.config)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All links, east links first, then south links
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All live embers
    pub fn embers(&self) -> &[Ember] {
        &self.embers
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The immutable parameters this lattice was built with
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Completed step count
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // Diagnostics

    /// Total mass over all cells. Invariant across any number of steps;
    /// combustion only shifts the fuel/oxygen/inert partition.
    pub fn total_mass(&self) -> f64 {
        self.cells
            .iter()
            .map(|cell| f64::from(cell.mass(&self.config)))
            .sum()
    }

    /// Total stored heat over all cells. Constant when `ambient_loss` is
    /// zero and nothing burns.
    pub fn total_heat(&self) -> f64 {
        self.cells.iter().map(|cell| f64::from(cell.heat())).sum()
    }
}

/// Triangle map turning a uniform sample into a clumpy fuel multiplier
fn clump(u: f32) -> f32 {
    if u < 0.5 {
        2.0 * u
    } else {
        (1.75 - u) % 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_has_one_link_per_adjacent_pair() {
        let lattice = Lattice::new(4, 3, SimConfig::default(), 0);
        // east: 3 per row * 3 rows, south: 4 per row * 2 rows
        assert_eq!(lattice.links().len(), 3 * 3 + 4 * 2);

        // Corner cells have two links, edges three, interior four
        let link_count = |x: usize, y: usize| {
            let cell = lattice.cell_at(x, y).unwrap();
            Direction::ALL.iter().filter(|d| cell.link(**d).is_some()).count()
        };
        assert_eq!(link_count(0, 0), 2);
        assert_eq!(link_count(1, 0), 3);
        assert_eq!(link_count(1, 1), 4);
        assert_eq!(link_count(3, 2), 2);
    }

    #[test]
    fn neighbor_tables_agree_across_links() {
        let lattice = Lattice::new(3, 3, SimConfig::default(), 0);
        for y in 0..3 {
            for x in 0..3 {
                let here = lattice.index(x, y);
                let cell = lattice.cell_at(x, y).unwrap();
                for dir in Direction::ALL {
                    if let Some(id) = cell.link(dir) {
                        let link = &lattice.links()[id];
                        let there = link.other(here);
                        let (dx, dy) = dir.offset();
                        let expected = ((y as i32 + dy) * 3 + (x as i32 + dx)) as usize;
                        assert_eq!(there, expected, "link in {dir:?} from ({x},{y})");
                    }
                }
            }
        }
    }

    #[test]
    fn single_cell_lattice_steps_without_links() {
        let mut lattice = Lattice::new(1, 1, SimConfig::default(), 0);
        assert!(lattice.links().is_empty());
        lattice.set_temperature(0, 0, 600.0);
        for _ in 0..10 {
            lattice.step();
        }
        let cell = lattice.cell_at(0, 0).unwrap();
        assert!(cell.fuel() >= 0.0 && cell.oxygen() >= 0.0 && cell.heat() >= 0.0);
    }

    #[test]
    fn set_temperature_round_trips() {
        let mut lattice = Lattice::new(3, 3, SimConfig::default(), 0);
        lattice.set_temperature(1, 2, 600.0);
        assert!((lattice.temperature_at(1, 2) - 600.0).abs() < 1e-2);
    }

    #[test]
    fn same_seed_same_evolution() {
        let config = SimConfig::default();
        let mut first = Lattice::patchy(8, 8, config, 42);
        let mut second = Lattice::patchy(8, 8, config, 42);
        first.set_temperature(4, 4, 600.0);
        second.set_temperature(4, 4, 600.0);
        first.spawn_ember(4, 4);
        second.spawn_ember(4, 4);

        for _ in 0..50 {
            first.step();
            second.step();
        }

        for (a, b) in first.cells().iter().zip(second.cells()) {
            assert_eq!(a.fuel(), b.fuel());
            assert_eq!(a.oxygen(), b.oxygen());
            assert_eq!(a.heat(), b.heat());
        }
        assert_eq!(first.embers(), second.embers());
    }

    #[test]
    fn embers_stay_in_bounds() {
        let config = SimConfig {
            ember_move_chance: 1.0,
            ..SimConfig::default()
        };
        let mut lattice = Lattice::new(5, 5, config, 7);
        lattice.set_temperature(2, 2, 900.0);
        lattice.spawn_ember(2, 2);
        lattice.spawn_ember(0, 0);

        for _ in 0..200 {
            lattice.step();
            for ember in lattice.embers() {
                let (x, y) = ember.position();
                assert!(x < 5 && y < 5);
            }
        }
    }

    #[test]
    fn patchy_fuel_repeats_even_rows_and_columns() {
        let lattice = Lattice::patchy(6, 6, SimConfig::default(), 3);
        for y in (1..6).step_by(2) {
            for x in 0..6 {
                assert_eq!(
                    lattice.cell_at(x, y).unwrap().fuel(),
                    lattice.cell_at(x, y - 1).unwrap().fuel(),
                    "odd row {y} copies row {}",
                    y - 1
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "dimensions must be positive")]
    fn zero_dimensions_are_rejected() {
        let _ = Lattice::new(0, 3, SimConfig::default(), 0);
    }
}
