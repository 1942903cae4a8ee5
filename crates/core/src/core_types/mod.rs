//! Core types and utilities

pub mod cell;
pub mod config;
pub mod direction;
pub mod ember;
pub mod link;

pub use cell::{Cell, Vec2};
pub use config::SimConfig;
pub use direction::Direction;
pub use ember::Ember;
pub use link::{CellId, Link, LinkId};
