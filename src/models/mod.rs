//! Shared data types.

mod primitives;

pub use primitives::Environment;
