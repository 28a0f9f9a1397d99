//! Public models for the animals catalog.
//!
//! These are transport-agnostic data structures that define the contract
//! between the catalog data layer and its consumers. All of them are
//! read-only projections of remote state.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

/// Identity of an animal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimalId(pub i64);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a person (owner) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An animal entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animal {
    pub id: AnimalId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    /// Open enumeration as delivered by the server (e.g. `Dog`, `Cat`).
    pub species: String,
    pub breed: String,
    /// Hex-like colour without the `#` prefix.
    pub color: String,
    pub weight_grams: u32,
    /// `None` when the animal is nested inside its owner's record.
    pub owner: Option<OwnerRef>,
}

/// The owner side of an animal: either the embedded record or its id only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerRef {
    Person(Box<Person>),
    Id(PersonId),
}

impl OwnerRef {
    #[must_use]
    pub fn id(&self) -> PersonId {
        match self {
            Self::Person(person) => person.id,
            Self::Id(id) => *id,
        }
    }

    #[must_use]
    pub fn person(&self) -> Option<&Person> {
        match self {
            Self::Person(person) => Some(person),
            Self::Id(_) => None,
        }
    }
}

/// A person entity (animal owner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Free-form digit string.
    pub phone_number: Option<String>,
    /// Owned animals; order is whatever the server returned.
    pub animals: Vec<Animal>,
}

/// One page of a paginated list.
///
/// `items` holds the current page only; `total` counts all pages for the
/// current filter set and `has_more` is authoritative for paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, has_more: bool) -> Self {
        Self {
            items,
            total,
            has_more,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, false)
    }
}

/// Species label with the number of animals of that species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalSpeciesCount {
    pub species: String,
    pub count: u64,
}

/// Owner together with the number of animals they currently own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipStats {
    pub owner: Person,
    pub animal_count: u64,
}

/// Owner together with the count and summed weight of their animals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerWeightStats {
    pub owner: Person,
    pub animal_count: u64,
    pub total_weight_grams: u64,
}

/// Field the server sorts the animal list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Name,
    DateOfBirth,
    Species,
    Breed,
    Weight,
}

impl SortField {
    /// Field name as used by the remote schema.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DateOfBirth => "dateOfBirth",
            Self::Species => "species",
            Self::Breed => "breed",
            Self::Weight => "weight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Single-field sort specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub field: SortField,
    pub direction: SortDirection,
}

impl OrderBy {
    #[must_use]
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Error returned when a sort token such as `name_asc` cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort specification '{0}', expected <field>_<asc|desc>")]
pub struct ParseOrderByError(pub String);

impl FromStr for OrderBy {
    type Err = ParseOrderByError;

    /// Parses the `<field>_<direction>` tokens used by list filters,
    /// e.g. `name_asc` or `dateOfBirth_desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseOrderByError(s.to_owned());
        let (field, direction) = s.rsplit_once('_').ok_or_else(err)?;

        let field = match field {
            "name" => SortField::Name,
            "dateOfBirth" => SortField::DateOfBirth,
            "species" => SortField::Species,
            "breed" => SortField::Breed,
            "weight" => SortField::Weight,
            _ => return Err(err()),
        };
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(err()),
        };

        Ok(Self { field, direction })
    }
}

/// Server-relevant parameters of the animal list.
///
/// Changing any of these starts a fresh paged sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnimalsQuery {
    pub order_by: Option<OrderBy>,
    pub search: Option<String>,
}

impl AnimalsQuery {
    #[must_use]
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = normalize_search(search.into());
        self
    }
}

/// Server-relevant parameters of the person list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PersonsQuery {
    pub search: Option<String>,
}

impl PersonsQuery {
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = normalize_search(search.into());
        self
    }
}

fn normalize_search(search: String) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
