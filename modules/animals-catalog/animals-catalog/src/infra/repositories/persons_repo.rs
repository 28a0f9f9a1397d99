use std::sync::Arc;

use animals_catalog_sdk::{
    CatalogError, OwnerWeightStats, OwnershipStats, PaginatedResponse, Person, PersonId,
    PersonsQuery,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::cache::CacheKey;
use crate::domain::list::PageSource;
use crate::infra::graphql::dto::{OwnerWeightStatsDto, OwnershipStatsDto, PageDto, PersonDto};
use crate::infra::graphql::{
    Operation, QueryExecutor, fetch_field, no_variables, person_id_variables, persons_variables,
};

/// Person reads, one gateway call per method.
#[derive(Clone)]
pub struct PersonsRepository {
    executor: Arc<dyn QueryExecutor>,
}

impl PersonsRepository {
    #[must_use]
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Fetch one page (1-based) of persons.
    ///
    /// # Errors
    /// Any [`CatalogError`] from the gateway; a null list is invalid.
    #[instrument(skip(self, query))]
    pub async fn list_page(
        &self,
        query: &PersonsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Person>, CatalogError> {
        let dto: PageDto<PersonDto> = fetch_field(
            self.executor.as_ref(),
            Operation::GetPersons,
            persons_variables(query, page, take),
        )
        .await?
        .ok_or_else(|| CatalogError::invalid_response("persons list is null"))?;

        let page = dto.try_into_page::<Person>()?;
        debug!(items = page.items.len(), total = page.total, has_more = page.has_more, "persons page fetched");
        Ok(page)
    }

    /// # Errors
    /// [`CatalogError::NotFound`] when the server has no such person.
    #[instrument(skip(self), fields(person_id = %id))]
    pub async fn get(&self, id: PersonId) -> Result<Person, CatalogError> {
        let dto: PersonDto = fetch_field(
            self.executor.as_ref(),
            Operation::GetPerson,
            person_id_variables(id),
        )
        .await?
        .ok_or_else(|| CatalogError::not_found("Person", id))?;
        Person::try_from(dto)
    }

    /// # Errors
    /// [`CatalogError::NotFound`] when nobody owns an animal.
    #[instrument(skip(self))]
    pub async fn top_owner(&self) -> Result<OwnershipStats, CatalogError> {
        self.ownership(Operation::GetTopOwner).await
    }

    /// # Errors
    /// [`CatalogError::NotFound`] when nobody owns a cat.
    #[instrument(skip(self))]
    pub async fn top_cat_owner(&self) -> Result<OwnershipStats, CatalogError> {
        self.ownership(Operation::GetTopCatOwner).await
    }

    /// # Errors
    /// [`CatalogError::NotFound`] when nobody owns an animal.
    #[instrument(skip(self))]
    pub async fn owner_with_heaviest_pets(&self) -> Result<OwnerWeightStats, CatalogError> {
        let operation = Operation::GetOwnerWithHeaviestPets;
        let dto: OwnerWeightStatsDto = fetch_field(self.executor.as_ref(), operation, no_variables())
            .await?
            .ok_or_else(|| CatalogError::record_missing(operation.response_field()))?;
        OwnerWeightStats::try_from(dto)
    }

    async fn ownership(&self, operation: Operation) -> Result<OwnershipStats, CatalogError> {
        let dto: OwnershipStatsDto = fetch_field(self.executor.as_ref(), operation, no_variables())
            .await?
            .ok_or_else(|| CatalogError::record_missing(operation.response_field()))?;
        OwnershipStats::try_from(dto)
    }
}

#[async_trait]
impl PageSource for PersonsRepository {
    type Item = Person;
    type Query = PersonsQuery;

    fn cache_key(&self, query: &PersonsQuery) -> CacheKey {
        CacheKey::new(Operation::GetPersons, &persons_variables(query, 1, 0))
    }

    async fn fetch_page(
        &self,
        query: &PersonsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Person>, CatalogError> {
        self.list_page(query, page, take).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{FakeExecutor, person_json};

    #[tokio::test]
    async fn get_person_sends_id_and_maps_animals() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(
            Operation::GetPerson,
            json!({ "person": person_json(4, "Grace", "Hopper", 3) }),
        );
        let repo = PersonsRepository::new(executor.clone());

        let person = repo.get(PersonId(4)).await.unwrap();
        assert_eq!(person.last_name, "Hopper");
        assert_eq!(person.animals.len(), 3);
        assert_eq!(executor.calls()[0].1, json!({ "id": 4 }));
    }

    #[tokio::test]
    async fn heaviest_pets_owner_reads_total_weight() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(
            Operation::GetOwnerWithHeaviestPets,
            json!({ "ownerWithHeaviestPets": {
                "owner": person_json(1, "Ada", "Byron", 0),
                "animalCount": 4,
                "totalWeight": 87_300
            }}),
        );
        let repo = PersonsRepository::new(executor);

        let stats = repo.owner_with_heaviest_pets().await.unwrap();
        assert_eq!(stats.animal_count, 4);
        assert_eq!(stats.total_weight_grams, 87_300);
    }

    #[tokio::test]
    async fn null_aggregate_is_not_found() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(Operation::GetTopCatOwner, json!({ "topCatOwner": null }));
        let repo = PersonsRepository::new(executor);

        let err = repo.top_cat_owner().await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }
}
