//! Brushfire Simulation Core Library
//!
//! A deterministic wildfire simulation on a 2D lattice of cells. Each cell
//! holds fuel, oxygen, heat and inert mass; adjacent cells exchange heat and
//! oxygen through directional links every step.
//!
//! ## Step pipeline
//!
//! Every call to [`Lattice::step`] runs a fixed five-phase pipeline:
//! - Combustion on every cell (hysteretic ignite/extinguish state machine)
//! - Flow computation on every link from a consistent pre-update snapshot
//! - Per-cell flow adjustment so no store can be overdrawn below zero
//! - Flow application, moving oxygen and its latent heat between cells
//! - Ember advancement along the local oxygen momentum

// Core types and utilities
pub mod core_types;

// Lattice topology and step orchestration
pub mod grid;

// Re-export core types
pub use core_types::{Cell, CellId, Direction, Ember, Link, LinkId, SimConfig, Vec2};

// Re-export lattice types
pub use grid::Lattice;
