//! Common test utilities and fixtures.

pub mod catalog;
pub mod fixtures;

#[allow(unused_imports)]
pub use catalog::*;
#[allow(unused_imports)]
pub use fixtures::*;
