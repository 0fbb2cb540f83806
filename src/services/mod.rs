//! Seams to services outside the query layer.

pub mod infographics_cache;

pub use infographics_cache::{InfographicsCache, MemoryInfographicsCache};
