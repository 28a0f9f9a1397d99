//! Domain services: pure derivations over SDK models and the statistics
//! aggregator built on the repositories.

pub mod animals;
pub mod persons;
pub mod statistics;
