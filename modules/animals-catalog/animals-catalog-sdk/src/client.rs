//! `AnimalsCatalogClientV1` trait definition.
//!
//! This trait defines the read API of the animals catalog. Every method maps
//! to exactly one remote operation.

use async_trait::async_trait;

use crate::errors::CatalogError;
use crate::models::{
    Animal, AnimalId, AnimalSpeciesCount, AnimalsQuery, OwnerWeightStats, OwnershipStats,
    PaginatedResponse, Person, PersonId, PersonsQuery,
};

/// Public read API of the animals catalog.
///
/// ```ignore
/// let client: Arc<dyn AnimalsCatalogClientV1> = catalog.client();
/// let animal = client.get_animal(AnimalId(1)).await?;
/// ```
#[async_trait]
pub trait AnimalsCatalogClientV1: Send + Sync {
    /// Get one page of animals. `page` is 1-based.
    async fn list_animals(
        &self,
        query: &AnimalsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Animal>, CatalogError>;

    /// Get an animal by ID.
    async fn get_animal(&self, id: AnimalId) -> Result<Animal, CatalogError>;

    /// Get one page of persons. `page` is 1-based.
    async fn list_persons(
        &self,
        query: &PersonsQuery,
        page: u32,
        take: u32,
    ) -> Result<PaginatedResponse<Person>, CatalogError>;

    /// Get a person by ID, including their animals.
    async fn get_person(&self, id: PersonId) -> Result<Person, CatalogError>;

    /// Species ranked by number of animals.
    async fn most_common_species(&self) -> Result<Vec<AnimalSpeciesCount>, CatalogError>;

    /// Owner with the most animals.
    async fn top_owner(&self) -> Result<OwnershipStats, CatalogError>;

    /// Owner with the most cats.
    async fn top_cat_owner(&self) -> Result<OwnershipStats, CatalogError>;

    /// Owner whose animals weigh the most in total.
    async fn owner_with_heaviest_pets(&self) -> Result<OwnerWeightStats, CatalogError>;

    async fn heaviest_animal(&self) -> Result<Animal, CatalogError>;

    async fn oldest_animal(&self) -> Result<Animal, CatalogError>;
}
