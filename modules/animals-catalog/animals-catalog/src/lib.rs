//! Animals catalog data layer.
//!
//! Mediates between list/filter state of the catalog views and the remote
//! query service:
//! - `infra::graphql`: the query gateway (fixed operation catalog, HTTP transport)
//! - `infra::repositories`: one repository per entity, one gateway call per method
//! - `domain::cache`: the session-wide response cache with page merging
//! - `domain::service`: pure formatting/derivation helpers and the statistics aggregator
//! - `domain::list`: the paged list controller with client-side filters
//!
//! `AnimalsCatalog` wires everything from a [`CatalogConfig`].

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub mod domain;
pub mod infra;
pub mod local_client;
pub mod module;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{CatalogConfig, ConfigError};
pub use domain::cache::{CacheKey, Epoch, MergeOutcome, ResponseCache};
pub use domain::list::{
    ClientFilter, IgnoreReason, ListController, ListStatus, ListView, LoadOutcome, PageSource,
};
pub use domain::service::statistics::{StatisticsAggregator, StatisticsState};
pub use infra::graphql::{GraphQlClient, GraphQlClientBuilder, Operation, QueryExecutor};
pub use local_client::LocalCatalogClient;
pub use module::{AnimalList, AnimalsCatalog, PersonList};
