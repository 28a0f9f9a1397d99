//! Infinite-scroll lists over a paged source.
//!
//! Server-relevant parameters (sort, search) live in the source's query
//! type and select a cache entry; everything else is a [`ClientFilter`]
//! applied to the items fetched so far.

mod controller;
pub mod filters;

use animals_catalog_sdk::{CatalogError, PaginatedResponse};
use async_trait::async_trait;

pub use controller::{IgnoreReason, ListController, ListStatus, ListView, LoadOutcome};
pub use filters::{
    AgeRange, AnimalCountRange, AnimalFilter, ClientFilter, FilterParseError, NoFilter,
    PersonFilter, WeightRange,
};

use crate::domain::cache::CacheKey;

/// A paginated remote list.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;
    type Query: Clone + PartialEq + Send + Sync;

    /// Cache entry that every page of `query` accumulates into.
    fn cache_key(&self, query: &Self::Query) -> CacheKey;

    /// Fetch page `page` (1-based) of `take` items.
    async fn fetch_page(
        &self,
        query: &Self::Query,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Self::Item>, CatalogError>;
}
