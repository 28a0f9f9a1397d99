use std::sync::Arc;

use animals_catalog_sdk::AnimalsCatalogClientV1;
use tracing::info;

use crate::config::{CatalogConfig, ConfigError};
use crate::domain::cache::ResponseCache;
use crate::domain::list::ListController;
use crate::domain::service::statistics::StatisticsAggregator;
use crate::infra::graphql::{GraphQlClientBuilder, QueryExecutor};
use crate::infra::repositories::{AnimalsRepository, PersonsRepository};
use crate::local_client::LocalCatalogClient;

pub type AnimalList = ListController<AnimalsRepository>;
pub type PersonList = ListController<PersonsRepository>;

/// Composition root: one gateway, one response cache and the repositories
/// on top of them. Everything handed out shares the same cache.
#[derive(Clone)]
pub struct AnimalsCatalog {
    cache: Arc<ResponseCache>,
    animals: Arc<AnimalsRepository>,
    persons: Arc<PersonsRepository>,
    page_size: u32,
}

impl AnimalsCatalog {
    /// Build the HTTP gateway from `config` and wire the data layer on it.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = GraphQlClientBuilder::from_config(config)?.build()?;
        info!(endpoint = %client.endpoint(), page_size = config.page_size, "animals catalog initialized");
        Ok(Self::with_executor(Arc::new(client), config.page_size))
    }

    /// Wire the data layer on an arbitrary gateway.
    #[must_use]
    pub fn with_executor(executor: Arc<dyn QueryExecutor>, page_size: u32) -> Self {
        Self {
            cache: Arc::new(ResponseCache::new()),
            animals: Arc::new(AnimalsRepository::new(executor.clone())),
            persons: Arc::new(PersonsRepository::new(executor)),
            page_size,
        }
    }

    #[must_use]
    pub fn cache(&self) -> Arc<ResponseCache> {
        self.cache.clone()
    }

    #[must_use]
    pub fn animals(&self) -> Arc<AnimalsRepository> {
        self.animals.clone()
    }

    #[must_use]
    pub fn persons(&self) -> Arc<PersonsRepository> {
        self.persons.clone()
    }

    #[must_use]
    pub fn animal_list(&self) -> AnimalList {
        ListController::new(self.animals.clone(), self.cache.clone(), self.page_size)
    }

    #[must_use]
    pub fn person_list(&self) -> PersonList {
        ListController::new(self.persons.clone(), self.cache.clone(), self.page_size)
    }

    #[must_use]
    pub fn statistics(&self) -> StatisticsAggregator {
        StatisticsAggregator::new(self.animals.clone(), self.persons.clone(), self.cache.clone())
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn AnimalsCatalogClientV1> {
        Arc::new(LocalCatalogClient::new(
            self.animals.clone(),
            self.persons.clone(),
            self.cache.clone(),
        ))
    }
}
