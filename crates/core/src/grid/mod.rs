//! Lattice topology and step orchestration

pub mod lattice;

pub use lattice::Lattice;
