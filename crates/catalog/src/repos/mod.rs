//! Repository traits for catalog operations.

pub mod products;
pub mod spatial;

pub use products::{BatchSummary, ProductRepo, ProductStream, Registration};
pub use spatial::SpatialRepo;
