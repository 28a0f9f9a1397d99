//! Client-side filters over already fetched list items.
//!
//! These never reach the server: they narrow what has been loaded so far
//! and say nothing about records not fetched yet.

use std::fmt;
use std::str::FromStr;

use animals_catalog_sdk::{Animal, Person};
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::service::animals::{age, today};

pub trait ClientFilter<T> {
    fn matches(&self, item: &T) -> bool;

    /// Whether this filter can exclude anything at all.
    fn is_active(&self) -> bool {
        true
    }
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl<T> ClientFilter<T> for NoFilter {
    fn matches(&self, _item: &T) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    #[error("invalid range '{0}', expected <min>-<max> or <min>+")]
    InvalidRange(String),
    #[error("invalid animal count '{0}', expected one of 1, 2-3, 4-5, 6+")]
    InvalidAnimalCount(String),
}

/// Inclusive range with an optional upper bound, written `"3-5"` or `"11+"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min: u32,
    max: Option<u32>,
}

impl Bounds {
    fn contains(self, value: u32) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }
}

impl FromStr for Bounds {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FilterParseError::InvalidRange(s.to_owned());
        let s = s.trim();
        if let Some(min) = s.strip_suffix('+') {
            let min = min.trim().parse().map_err(|_| err())?;
            return Ok(Self { min, max: None });
        }
        let (min, max) = s.split_once('-').ok_or_else(err)?;
        let min: u32 = min.trim().parse().map_err(|_| err())?;
        let max: u32 = max.trim().parse().map_err(|_| err())?;
        if max < min {
            return Err(err());
        }
        Ok(Self {
            min,
            max: Some(max),
        })
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{max}", self.min),
            None => write!(f, "{}+", self.min),
        }
    }
}

/// Age range in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange(Bounds);

impl AgeRange {
    #[must_use]
    pub fn contains(self, years: u32) -> bool {
        self.0.contains(years)
    }
}

impl FromStr for AgeRange {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Weight range in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightRange(Bounds);

impl WeightRange {
    #[must_use]
    pub fn contains(self, grams: u32) -> bool {
        self.0.contains(grams)
    }
}

impl FromStr for WeightRange {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for WeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalFilter {
    /// Exact species, compared case-insensitively.
    pub species: Option<String>,
    pub age: Option<AgeRange>,
    pub weight: Option<WeightRange>,
    /// Reference date for ages; today when unset.
    pub as_of: Option<NaiveDate>,
}

impl ClientFilter<Animal> for AnimalFilter {
    fn matches(&self, animal: &Animal) -> bool {
        if let Some(species) = &self.species
            && !animal.species.eq_ignore_ascii_case(species)
        {
            return false;
        }
        if let Some(range) = self.age {
            let as_of = self.as_of.unwrap_or_else(today);
            if !range.contains(age(animal.date_of_birth, as_of)) {
                return false;
            }
        }
        self.weight
            .is_none_or(|range| range.contains(animal.weight_grams))
    }

    fn is_active(&self) -> bool {
        self.species.is_some() || self.age.is_some() || self.weight.is_some()
    }
}

/// Number-of-animals bucket of the person list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimalCountRange {
    One,
    TwoToThree,
    FourToFive,
    SixOrMore,
}

impl AnimalCountRange {
    #[must_use]
    pub fn contains(self, count: usize) -> bool {
        match self {
            Self::One => count == 1,
            Self::TwoToThree => (2..=3).contains(&count),
            Self::FourToFive => (4..=5).contains(&count),
            Self::SixOrMore => count >= 6,
        }
    }
}

impl FromStr for AnimalCountRange {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::One),
            "2-3" => Ok(Self::TwoToThree),
            "4-5" => Ok(Self::FourToFive),
            "6+" => Ok(Self::SixOrMore),
            other => Err(FilterParseError::InvalidAnimalCount(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub animal_count: Option<AnimalCountRange>,
    /// Keep persons owning at least one animal of this species.
    pub animal_species: Option<String>,
}

impl ClientFilter<Person> for PersonFilter {
    fn matches(&self, person: &Person) -> bool {
        if let Some(range) = self.animal_count
            && !range.contains(person.animals.len())
        {
            return false;
        }
        self.animal_species.as_ref().is_none_or(|species| {
            person
                .animals
                .iter()
                .any(|a| a.species.eq_ignore_ascii_case(species))
        })
    }

    fn is_active(&self) -> bool {
        self.animal_count.is_some() || self.animal_species.is_some()
    }
}
