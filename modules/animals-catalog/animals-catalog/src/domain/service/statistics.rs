//! Dashboard statistics: fans out the aggregate queries concurrently and
//! joins them into one record, failing as a whole if any of them fails.

use std::sync::Arc;

use animals_catalog_sdk::{
    Animal, AnimalSpeciesCount, CatalogError, OwnerWeightStats, OwnershipStats, PersonsQuery,
};
use arc_swap::ArcSwap;
use chrono::NaiveDate;
use futures::future::try_join5;
use tracing::{debug, info, instrument, warn};

use super::animals::{age, format_weight};
use super::persons::full_name;
use crate::domain::cache::{CacheKey, ResponseCache};
use crate::infra::graphql::Operation;
use crate::infra::repositories::{AnimalsRepository, PersonsRepository};

/// Joined result of the five aggregate queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalStatistics {
    pub species_distribution: Vec<AnimalSpeciesCount>,
    pub top_owner: OwnershipStats,
    pub owner_with_heaviest_pets: OwnerWeightStats,
    pub heaviest_animal: Animal,
    pub oldest_animal: Animal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaviestAnimalRecord {
    pub animal: Animal,
    pub formatted_weight: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OldestAnimalRecord {
    pub animal: Animal,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MostAnimalsRecord {
    pub owner_name: String,
    pub animal_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaviestGroupRecord {
    pub owner_name: String,
    pub animal_count: u64,
    pub formatted_total_weight: String,
}

/// Display-ready form of [`GlobalStatistics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsReport {
    pub species_distribution: Vec<AnimalSpeciesCount>,
    pub heaviest_animal: HeaviestAnimalRecord,
    pub oldest_animal: OldestAnimalRecord,
    pub most_animals: MostAnimalsRecord,
    pub heaviest_group: HeaviestGroupRecord,
}

impl GlobalStatistics {
    #[must_use]
    pub fn report(&self, as_of: NaiveDate) -> StatisticsReport {
        StatisticsReport {
            species_distribution: self.species_distribution.clone(),
            heaviest_animal: HeaviestAnimalRecord {
                animal: self.heaviest_animal.clone(),
                formatted_weight: format_weight(u64::from(self.heaviest_animal.weight_grams)),
            },
            oldest_animal: OldestAnimalRecord {
                animal: self.oldest_animal.clone(),
                age: age(self.oldest_animal.date_of_birth, as_of),
            },
            most_animals: MostAnimalsRecord {
                owner_name: full_name(&self.top_owner.owner),
                animal_count: self.top_owner.animal_count,
            },
            heaviest_group: HeaviestGroupRecord {
                owner_name: full_name(&self.owner_with_heaviest_pets.owner),
                animal_count: self.owner_with_heaviest_pets.animal_count,
                formatted_total_weight: format_weight(
                    self.owner_with_heaviest_pets.total_weight_grams,
                ),
            },
        }
    }

    /// Sum of the per-species counts.
    #[must_use]
    pub fn total_animals(&self) -> u64 {
        self.species_distribution.iter().map(|s| s.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesShare {
    pub species: String,
    pub count: u64,
    pub percentage: f64,
}

/// Each species' share of `total`, in percent. A zero total yields 0 %
/// for every entry.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn species_percentage(counts: &[AnimalSpeciesCount], total: u64) -> Vec<SpeciesShare> {
    counts
        .iter()
        .map(|s| SpeciesShare {
            species: s.species.clone(),
            count: s.count,
            percentage: if total == 0 {
                0.0
            } else {
                s.count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

/// Home page summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub total_animals: u64,
    pub total_owners: u64,
    pub most_common_species: Option<AnimalSpeciesCount>,
    pub oldest_animal_name: String,
    pub oldest_animal_age: u32,
    pub heaviest_animal_name: String,
    pub heaviest_animal_weight_grams: u32,
    pub top_owner_name: String,
    pub top_owner_animal_count: u64,
}

/// Progress of [`StatisticsAggregator::load`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatisticsState {
    #[default]
    Idle,
    Loading,
    Ready(Arc<GlobalStatistics>),
    Failed(CatalogError),
}

pub struct StatisticsAggregator {
    animals: Arc<AnimalsRepository>,
    persons: Arc<PersonsRepository>,
    cache: Arc<ResponseCache>,
    state: ArcSwap<StatisticsState>,
}

impl StatisticsAggregator {
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
            state: ArcSwap::from_pointee(StatisticsState::Idle),
        }
    }

    #[must_use]
    pub fn state(&self) -> Arc<StatisticsState> {
        self.state.load_full()
    }

    /// True from the start of [`load`](Self::load) until every query has
    /// resolved.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(**self.state.load(), StatisticsState::Loading)
    }

    /// Fetch the five aggregates concurrently and join them.
    ///
    /// Results already in the response cache are reused; successful
    /// results are written back.
    ///
    /// # Errors
    /// The first [`CatalogError`] any of the queries fails with. No partial
    /// statistics are produced.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Arc<GlobalStatistics>, CatalogError> {
        self.state.store(Arc::new(StatisticsState::Loading));

        let joined = try_join5(
            self.cached(Operation::GetMostCommonSpecies, self.animals.most_common_species()),
            self.cached(Operation::GetTopOwner, self.persons.top_owner()),
            self.cached(
                Operation::GetOwnerWithHeaviestPets,
                self.persons.owner_with_heaviest_pets(),
            ),
            self.cached(Operation::GetHeaviestAnimal, self.animals.heaviest()),
            self.cached(Operation::GetOldestAnimal, self.animals.oldest()),
        )
        .await;

        match joined {
            Ok((species_distribution, top_owner, owner_with_heaviest_pets, heaviest, oldest)) => {
                let stats = Arc::new(GlobalStatistics {
                    species_distribution,
                    top_owner,
                    owner_with_heaviest_pets,
                    heaviest_animal: heaviest,
                    oldest_animal: oldest,
                });
                info!(species = stats.species_distribution.len(), "statistics loaded");
                self.state
                    .store(Arc::new(StatisticsState::Ready(stats.clone())));
                Ok(stats)
            }
            Err(err) => {
                warn!(error = %err, "statistics failed");
                self.state
                    .store(Arc::new(StatisticsState::Failed(err.clone())));
                Err(err)
            }
        }
    }

    /// Home page summary: totals plus the record holders.
    ///
    /// # Errors
    /// The first [`CatalogError`] any of the underlying queries fails with.
    #[instrument(skip(self))]
    pub async fn load_overview(&self, as_of: NaiveDate) -> Result<Overview, CatalogError> {
        // Only the persons total matters, so one item is enough.
        let (species, oldest, heaviest, top_owner, owners) = try_join5(
            self.cached(Operation::GetMostCommonSpecies, self.animals.most_common_species()),
            self.cached(Operation::GetOldestAnimal, self.animals.oldest()),
            self.cached(Operation::GetHeaviestAnimal, self.animals.heaviest()),
            self.cached(Operation::GetTopOwner, self.persons.top_owner()),
            self.persons.list_page(&PersonsQuery::default(), 1, 1),
        )
        .await?;

        debug!(total_owners = owners.total, "overview loaded");
        Ok(Overview {
            total_animals: species.iter().map(|s| s.count).sum(),
            total_owners: owners.total,
            most_common_species: species.first().cloned(),
            oldest_animal_age: age(oldest.date_of_birth, as_of),
            oldest_animal_name: oldest.name,
            heaviest_animal_name: heaviest.name,
            heaviest_animal_weight_grams: heaviest.weight_grams,
            top_owner_name: full_name(&top_owner.owner),
            top_owner_animal_count: top_owner.animal_count,
        })
    }

    async fn cached<T, F>(&self, operation: Operation, fetch: F) -> Result<T, CatalogError>
    where
        T: Clone + Send + Sync + 'static,
        F: Future<Output = Result<T, CatalogError>>,
    {
        self.cache.get_or_fetch(CacheKey::of(operation), fetch).await
    }
}
