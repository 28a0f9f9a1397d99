use std::sync::Arc;

use animals_catalog_sdk::{
    Animal, AnimalId, AnimalSpeciesCount, AnimalsQuery, CatalogError, PaginatedResponse,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::cache::CacheKey;
use crate::domain::list::PageSource;
use crate::infra::graphql::dto::{AnimalDto, PageDto, SpeciesCountDto};
use crate::infra::graphql::{
    Operation, QueryExecutor, animal_id_variables, animals_variables, fetch_field, no_variables,
};

/// Animal reads, one gateway call per method.
#[derive(Clone)]
pub struct AnimalsRepository {
    executor: Arc<dyn QueryExecutor>,
}

impl AnimalsRepository {
    #[must_use]
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Fetch one page (1-based) of animals.
    ///
    /// # Errors
    /// Any [`CatalogError`] from the gateway; a null list is invalid.
    #[instrument(skip(self, query))]
    pub async fn list_page(
        &self,
        query: &AnimalsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Animal>, CatalogError> {
        let dto: PageDto<AnimalDto> = fetch_field(
            self.executor.as_ref(),
            Operation::GetAnimals,
            animals_variables(query, page, take),
        )
        .await?
        .ok_or_else(|| CatalogError::invalid_response("animals list is null"))?;

        let page = dto.try_into_page::<Animal>()?;
        debug!(items = page.items.len(), total = page.total, has_more = page.has_more, "animals page fetched");
        Ok(page)
    }

    /// # Errors
    /// [`CatalogError::NotFound`] when the server has no such animal.
    #[instrument(skip(self), fields(animal_id = %id))]
    pub async fn get(&self, id: AnimalId) -> Result<Animal, CatalogError> {
        let dto: AnimalDto = fetch_field(
            self.executor.as_ref(),
            Operation::GetAnimal,
            animal_id_variables(id),
        )
        .await?
        .ok_or_else(|| CatalogError::not_found("Animal", id))?;
        Animal::try_from(dto)
    }

    /// Species counts, most common first.
    ///
    /// # Errors
    /// Any [`CatalogError`] from the gateway;
    /// [`CatalogError::InvalidResponse`] when the field is `null`.
    #[instrument(skip(self))]
    pub async fn most_common_species(&self) -> Result<Vec<AnimalSpeciesCount>, CatalogError> {
        let counts: Vec<SpeciesCountDto> = fetch_field(
            self.executor.as_ref(),
            Operation::GetMostCommonSpecies,
            no_variables(),
        )
        .await?
        .ok_or_else(|| CatalogError::invalid_response("mostCommonSpecies is null"))?;
        Ok(counts.into_iter().map(AnimalSpeciesCount::from).collect())
    }

    /// # Errors
    /// [`CatalogError::NotFound`] when the catalog is empty.
    #[instrument(skip(self))]
    pub async fn heaviest(&self) -> Result<Animal, CatalogError> {
        self.single_animal(Operation::GetHeaviestAnimal).await
    }

    /// # Errors
    /// [`CatalogError::NotFound`] when the catalog is empty.
    #[instrument(skip(self))]
    pub async fn oldest(&self) -> Result<Animal, CatalogError> {
        self.single_animal(Operation::GetOldestAnimal).await
    }

    async fn single_animal(&self, operation: Operation) -> Result<Animal, CatalogError> {
        let dto: AnimalDto = fetch_field(self.executor.as_ref(), operation, no_variables())
            .await?
            .ok_or_else(|| CatalogError::record_missing(operation.response_field()))?;
        Animal::try_from(dto)
    }
}

#[async_trait]
impl PageSource for AnimalsRepository {
    type Item = Animal;
    type Query = AnimalsQuery;

    fn cache_key(&self, query: &AnimalsQuery) -> CacheKey {
        CacheKey::new(Operation::GetAnimals, &animals_variables(query, 1, 0))
    }

    async fn fetch_page(
        &self,
        query: &AnimalsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Animal>, CatalogError> {
        self.list_page(query, page, take).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{FakeExecutor, animal_json, page_json};

    #[tokio::test]
    async fn list_page_sends_paging_variables() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(
            Operation::GetAnimals,
            json!({ "animals": page_json(vec![animal_json(1, "Rex", "Dog", 12_000)], 11, true) }),
        );
        let repo = AnimalsRepository::new(executor.clone());

        let page = repo
            .list_page(&AnimalsQuery::default().with_search("re"), 2, 5)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 11);
        assert!(page.has_more);
        let calls = executor.calls();
        assert_eq!(calls[0].0, Operation::GetAnimals);
        assert_eq!(calls[0].1, json!({ "page": 2, "take": 5, "search": "re" }));
    }

    #[tokio::test]
    async fn null_animal_is_not_found() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(Operation::GetAnimal, json!({ "animal": null }));
        let repo = AnimalsRepository::new(executor);

        let err = repo.get(AnimalId(404)).await.unwrap_err();
        assert_eq!(err, CatalogError::not_found("Animal", 404));
    }

    #[tokio::test]
    async fn null_species_counts_are_invalid() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(Operation::GetMostCommonSpecies, json!({ "mostCommonSpecies": null }));
        let repo = AnimalsRepository::new(executor);

        let err = repo.most_common_species().await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse { .. }), "{err}");
    }

    #[tokio::test]
    async fn remote_errors_pass_through() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_err(Operation::GetHeaviestAnimal, CatalogError::transport("down"));
        let repo = AnimalsRepository::new(executor);

        let err = repo.heaviest().await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport { .. }));
    }

    #[test]
    fn cache_key_ignores_paging() {
        let repo = AnimalsRepository::new(Arc::new(FakeExecutor::new()));
        let query = AnimalsQuery::default().with_search("rex");
        assert_eq!(
            repo.cache_key(&query),
            CacheKey::new(Operation::GetAnimals, &animals_variables(&query, 7, 50))
        );
        assert_ne!(repo.cache_key(&query), repo.cache_key(&AnimalsQuery::default()));
    }
}
