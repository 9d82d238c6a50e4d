//! Position lifecycle tracking

pub mod registry;

pub use registry::PositionRegistry;
