//! Entity repositories over the query gateway.

mod animals_repo;
mod persons_repo;

pub use animals_repo::AnimalsRepository;
pub use persons_repo::PersonsRepository;
