//! The fixed catalog of named query operations.
//!
//! Documents are static; only variables vary between calls.

use std::fmt;

use animals_catalog_sdk::{AnimalId, AnimalsQuery, OrderBy, PersonId, PersonsQuery};
use serde::Serialize;
use serde_json::Value;

/// Named query operation understood by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetAnimals,
    GetAnimal,
    GetPersons,
    GetPerson,
    GetMostCommonSpecies,
    GetTopOwner,
    GetTopCatOwner,
    GetHeaviestAnimal,
    GetOldestAnimal,
    GetOwnerWithHeaviestPets,
}

impl Operation {
    pub const ALL: [Self; 10] = [
        Self::GetAnimals,
        Self::GetAnimal,
        Self::GetPersons,
        Self::GetPerson,
        Self::GetMostCommonSpecies,
        Self::GetTopOwner,
        Self::GetTopCatOwner,
        Self::GetHeaviestAnimal,
        Self::GetOldestAnimal,
        Self::GetOwnerWithHeaviestPets,
    ];

    /// Operation name sent as `operationName`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetAnimals => "GetAnimals",
            Self::GetAnimal => "GetAnimal",
            Self::GetPersons => "GetPersons",
            Self::GetPerson => "GetPerson",
            Self::GetMostCommonSpecies => "GetMostCommonSpecies",
            Self::GetTopOwner => "GetTopOwner",
            Self::GetTopCatOwner => "GetTopCatOwner",
            Self::GetHeaviestAnimal => "GetHeaviestAnimal",
            Self::GetOldestAnimal => "GetOldestAnimal",
            Self::GetOwnerWithHeaviestPets => "GetOwnerWithHeaviestPets",
        }
    }

    /// Top-level field of `data` holding this operation's result.
    #[must_use]
    pub fn response_field(self) -> &'static str {
        match self {
            Self::GetAnimals => "animals",
            Self::GetAnimal => "animal",
            Self::GetPersons => "persons",
            Self::GetPerson => "person",
            Self::GetMostCommonSpecies => "mostCommonSpecies",
            Self::GetTopOwner => "topOwner",
            Self::GetTopCatOwner => "topCatOwner",
            Self::GetHeaviestAnimal => "heaviestAnimal",
            Self::GetOldestAnimal => "oldestAnimal",
            Self::GetOwnerWithHeaviestPets => "ownerWithHeaviestPets",
        }
    }

    /// Variables that identify a cache entry. `page` and `take` never do:
    /// pages of one sequence share an entry.
    #[must_use]
    pub fn key_args(self) -> &'static [&'static str] {
        match self {
            Self::GetAnimals => &["orderBy", "search"],
            Self::GetPersons => &["search"],
            Self::GetAnimal | Self::GetPerson => &["id"],
            Self::GetMostCommonSpecies
            | Self::GetTopOwner
            | Self::GetTopCatOwner
            | Self::GetHeaviestAnimal
            | Self::GetOldestAnimal
            | Self::GetOwnerWithHeaviestPets => &[],
        }
    }

    #[must_use]
    pub fn document(self) -> &'static str {
        match self {
            Self::GetAnimals => GET_ANIMALS,
            Self::GetAnimal => GET_ANIMAL,
            Self::GetPersons => GET_PERSONS,
            Self::GetPerson => GET_PERSON,
            Self::GetMostCommonSpecies => GET_MOST_COMMON_SPECIES,
            Self::GetTopOwner => GET_TOP_OWNER,
            Self::GetTopCatOwner => GET_TOP_CAT_OWNER,
            Self::GetHeaviestAnimal => GET_HEAVIEST_ANIMAL,
            Self::GetOldestAnimal => GET_OLDEST_ANIMAL,
            Self::GetOwnerWithHeaviestPets => GET_OWNER_WITH_HEAVIEST_PETS,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Serialize)]
struct OrderByInput {
    field: &'static str,
    direction: &'static str,
}

impl From<OrderBy> for OrderByInput {
    fn from(order_by: OrderBy) -> Self {
        Self {
            field: order_by.field.as_str(),
            direction: order_by.direction.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnimalsVariables<'a> {
    page: u32,
    take: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderByInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PersonsVariables<'a> {
    page: u32,
    take: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

/// Variables of `GetAnimals`.
#[must_use]
pub fn animals_variables(query: &AnimalsQuery, page: u32, take: u32) -> Value {
    json_object(&AnimalsVariables {
        page,
        take,
        order_by: query.order_by.map(OrderByInput::from),
        search: query.search.as_deref(),
    })
}

/// Variables of `GetPersons`.
#[must_use]
pub fn persons_variables(query: &PersonsQuery, page: u32, take: u32) -> Value {
    json_object(&PersonsVariables {
        page,
        take,
        search: query.search.as_deref(),
    })
}

#[must_use]
pub fn animal_id_variables(id: AnimalId) -> Value {
    serde_json::json!({ "id": id.0 })
}

#[must_use]
pub fn person_id_variables(id: PersonId) -> Value {
    serde_json::json!({ "id": id.0 })
}

/// Variables of the parameterless aggregate operations.
#[must_use]
pub fn no_variables() -> Value {
    Value::Object(serde_json::Map::new())
}

fn json_object<T: Serialize>(vars: &T) -> Value {
    // Plain structs of integers and strings always serialize.
    serde_json::to_value(vars).unwrap_or_else(|_| no_variables())
}

const GET_ANIMALS: &str = r"query GetAnimals($page: Int!, $take: Int!, $orderBy: OrderByInput, $search: String) {
  animals(page: $page, take: $take, orderBy: $orderBy, search: $search) {
    items {
      id
      name
      dateOfBirth
      species
      breed
      color
      weight
      owner {
        id
        firstName
        lastName
        email
        phoneNumber
      }
    }
    total
    hasMore
  }
}";

const GET_ANIMAL: &str = r"query GetAnimal($id: Int!) {
  animal(id: $id) {
    id
    name
    dateOfBirth
    species
    breed
    color
    weight
    owner {
      id
      firstName
      lastName
      email
      phoneNumber
    }
  }
}";

const GET_PERSONS: &str = r"query GetPersons($page: Int!, $take: Int!, $search: String) {
  persons(page: $page, take: $take, search: $search) {
    items {
      id
      firstName
      lastName
      email
      phoneNumber
      animals {
        id
        name
        dateOfBirth
        species
        breed
        color
        weight
      }
    }
    total
    hasMore
  }
}";

const GET_PERSON: &str = r"query GetPerson($id: Float!) {
  person(id: $id) {
    id
    firstName
    lastName
    email
    phoneNumber
    animals {
      id
      name
      dateOfBirth
      species
      breed
      color
      weight
    }
  }
}";

const GET_MOST_COMMON_SPECIES: &str = r"query GetMostCommonSpecies {
  mostCommonSpecies {
    species
    count
  }
}";

const GET_TOP_OWNER: &str = r"query GetTopOwner {
  topOwner {
    owner {
      id
      firstName
      lastName
      email
      phoneNumber
    }
    animalCount
  }
}";

const GET_TOP_CAT_OWNER: &str = r"query GetTopCatOwner {
  topCatOwner {
    owner {
      id
      firstName
      lastName
      email
      phoneNumber
    }
    animalCount
  }
}";

const GET_HEAVIEST_ANIMAL: &str = r"query GetHeaviestAnimal {
  heaviestAnimal {
    id
    name
    dateOfBirth
    species
    breed
    color
    weight
    owner {
      id
      firstName
      lastName
      email
      phoneNumber
    }
  }
}";

const GET_OLDEST_ANIMAL: &str = r"query GetOldestAnimal {
  oldestAnimal {
    id
    name
    dateOfBirth
    species
    breed
    color
    weight
    owner {
      id
      firstName
      lastName
      email
      phoneNumber
    }
  }
}";

const GET_OWNER_WITH_HEAVIEST_PETS: &str = r"query GetOwnerWithHeaviestPets {
  ownerWithHeaviestPets {
    owner {
      id
      firstName
      lastName
      email
      phoneNumber
    }
    animalCount
    totalWeight
  }
}";
