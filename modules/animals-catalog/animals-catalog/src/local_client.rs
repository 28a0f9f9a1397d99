use std::sync::Arc;

use animals_catalog_sdk::{
    Animal, AnimalId, AnimalSpeciesCount, AnimalsCatalogClientV1, AnimalsQuery, CatalogError,
    OwnerWeightStats, OwnershipStats, PaginatedResponse, Person, PersonId, PersonsQuery,
};
use async_trait::async_trait;

use crate::domain::cache::{CacheKey, ResponseCache};
use crate::infra::graphql::{Operation, animal_id_variables, person_id_variables};
use crate::infra::repositories::{AnimalsRepository, PersonsRepository};

/// Local implementation of [`AnimalsCatalogClientV1`] over the repositories.
///
/// Detail lookups and aggregates go through the response cache; list pages
/// are passed straight through, list accumulation belongs to
/// [`ListController`](crate::ListController).
#[derive(Clone)]
pub struct LocalCatalogClient {
    animals: Arc<AnimalsRepository>,
    persons: Arc<PersonsRepository>,
    cache: Arc<ResponseCache>,
}

impl LocalCatalogClient {
    #[must_use]
    pub fn new(
        animals: Arc<AnimalsRepository>,
        persons: Arc<PersonsRepository>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            animals,
            persons,
            cache,
        }
    }
}

#[async_trait]
impl AnimalsCatalogClientV1 for LocalCatalogClient {
    async fn list_animals(
        &self,
        query: &AnimalsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Animal>, CatalogError> {
        self.animals.list_page(query, page, take).await
    }

    async fn get_animal(&self, id: AnimalId) -> Result<Animal, CatalogError> {
        let key = CacheKey::new(Operation::GetAnimal, &animal_id_variables(id));
        self.cache.get_or_fetch(key, self.animals.get(id)).await
    }

    async fn list_persons(
        &self,
        query: &PersonsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Person>, CatalogError> {
        self.persons.list_page(query, page, take).await
    }

    async fn get_person(&self, id: PersonId) -> Result<Person, CatalogError> {
        let key = CacheKey::new(Operation::GetPerson, &person_id_variables(id));
        self.cache.get_or_fetch(key, self.persons.get(id)).await
    }

    async fn most_common_species(&self) -> Result<Vec<AnimalSpeciesCount>, CatalogError> {
        self.cache
            .get_or_fetch(
                CacheKey::of(Operation::GetMostCommonSpecies),
                self.animals.most_common_species(),
            )
            .await
    }

    async fn top_owner(&self) -> Result<OwnershipStats, CatalogError> {
        self.cache
            .get_or_fetch(CacheKey::of(Operation::GetTopOwner), self.persons.top_owner())
            .await
    }

    async fn top_cat_owner(&self) -> Result<OwnershipStats, CatalogError> {
        self.cache
            .get_or_fetch(
                CacheKey::of(Operation::GetTopCatOwner),
                self.persons.top_cat_owner(),
            )
            .await
    }

    async fn owner_with_heaviest_pets(&self) -> Result<OwnerWeightStats, CatalogError> {
        self.cache
            .get_or_fetch(
                CacheKey::of(Operation::GetOwnerWithHeaviestPets),
                self.persons.owner_with_heaviest_pets(),
            )
            .await
    }

    async fn heaviest_animal(&self) -> Result<Animal, CatalogError> {
        self.cache
            .get_or_fetch(CacheKey::of(Operation::GetHeaviestAnimal), self.animals.heaviest())
            .await
    }

    async fn oldest_animal(&self) -> Result<Animal, CatalogError> {
        self.cache
            .get_or_fetch(CacheKey::of(Operation::GetOldestAnimal), self.animals.oldest())
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{FakeExecutor, animal_json};

    fn client(executor: &Arc<FakeExecutor>) -> LocalCatalogClient {
        LocalCatalogClient::new(
            Arc::new(AnimalsRepository::new(executor.clone())),
            Arc::new(PersonsRepository::new(executor.clone())),
            Arc::new(ResponseCache::new()),
        )
    }

    #[tokio::test]
    async fn detail_lookups_are_cached_per_id() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(Operation::GetAnimal, json!({ "animal": animal_json(1, "Rex", "Dog", 9_000) }));
        executor.push_ok(Operation::GetAnimal, json!({ "animal": animal_json(2, "Tom", "Cat", 4_000) }));
        let client = client(&executor);

        assert_eq!(client.get_animal(AnimalId(1)).await.unwrap().name, "Rex");
        assert_eq!(client.get_animal(AnimalId(1)).await.unwrap().name, "Rex");
        assert_eq!(client.get_animal(AnimalId(2)).await.unwrap().name, "Tom");
        assert_eq!(executor.call_count(Operation::GetAnimal), 2);
    }

    #[tokio::test]
    async fn not_found_is_not_cached() {
        let executor = Arc::new(FakeExecutor::new());
        executor.push_ok(Operation::GetPerson, json!({ "person": null }));
        executor.push_ok(Operation::GetPerson, json!({ "person": null }));
        let client = client(&executor);

        for _ in 0..2 {
            let err = client.get_person(PersonId(5)).await.unwrap_err();
            assert_eq!(err, CatalogError::not_found("Person", 5));
        }
        assert_eq!(executor.call_count(Operation::GetPerson), 2);
    }
}
