//! Animals Catalog SDK
//!
//! This crate provides the public API for the animals catalog:
//! - `AnimalsCatalogClientV1` trait
//! - Model types for animals, persons and aggregate statistics
//! - Error type (`CatalogError`)
//!
//! ## Usage
//!
//! ```ignore
//! use animals_catalog_sdk::{AnimalsCatalogClientV1, AnimalId};
//!
//! let animal = client.get_animal(AnimalId(42)).await?;
//! let page = client.list_animals(&query, 1, 10).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod models;

// Re-export main types at crate root for convenience
pub use client::AnimalsCatalogClientV1;
pub use errors::{CatalogError, RemoteErrorDetail};
pub use models::{
    Animal, AnimalId, AnimalSpeciesCount, AnimalsQuery, OrderBy, OwnerRef, OwnerWeightStats,
    OwnershipStats, PaginatedResponse, ParseOrderByError, Person, PersonId, PersonsQuery,
    SortDirection, SortField,
};
