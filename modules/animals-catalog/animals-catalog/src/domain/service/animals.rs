//! Animal derivations: age, weight formatting and dashboard distributions.

use animals_catalog_sdk::Animal;
use chrono::{Datelike, Local, NaiveDate};

/// Local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole years between `date_of_birth` and `as_of`; one less if the
/// anniversary has not been reached yet. Future birth dates yield 0.
#[must_use]
pub fn age(date_of_birth: NaiveDate, as_of: NaiveDate) -> u32 {
    let mut years = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

#[must_use]
pub fn age_today(date_of_birth: NaiveDate) -> u32 {
    age(date_of_birth, today())
}

/// `"<g> g"` below one kilogram, otherwise kilograms with one decimal.
///
/// ```
/// use animals_catalog::domain::service::animals::format_weight;
/// assert_eq!(format_weight(999), "999 g");
/// assert_eq!(format_weight(25_500), "25.5 kg");
/// ```
#[must_use]
#[allow(clippy::integer_division)]
pub fn format_weight(grams: u64) -> String {
    if grams < 1000 {
        return format!("{grams} g");
    }
    let tenths = (grams + 50) / 100;
    format!("{}.{} kg", tenths / 10, tenths % 10)
}

/// Mean weight in grams; 0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_weight_grams(animals: &[Animal]) -> f64 {
    if animals.is_empty() {
        return 0.0;
    }
    let total: u64 = animals.iter().map(|a| u64::from(a.weight_grams)).sum();
    total as f64 / animals.len() as f64
}

/// Mean age in years at `as_of`; 0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_age(animals: &[Animal], as_of: NaiveDate) -> f64 {
    if animals.is_empty() {
        return 0.0;
    }
    let total: u64 = animals
        .iter()
        .map(|a| u64::from(age(a.date_of_birth, as_of)))
        .sum();
    total as f64 / animals.len() as f64
}

/// Age bucket of the age distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeGroup {
    UpToTwo,
    ThreeToFive,
    SixToEight,
    NineToEleven,
    TwelvePlus,
}

impl AgeGroup {
    const ORDERED: [Self; 5] = [
        Self::UpToTwo,
        Self::ThreeToFive,
        Self::SixToEight,
        Self::NineToEleven,
        Self::TwelvePlus,
    ];

    #[must_use]
    pub fn for_age(age: u32) -> Self {
        match age {
            0..2 => Self::UpToTwo,
            2..5 => Self::ThreeToFive,
            5..8 => Self::SixToEight,
            8..11 => Self::NineToEleven,
            _ => Self::TwelvePlus,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UpToTwo => "0-2",
            Self::ThreeToFive => "3-5",
            Self::SixToEight => "6-8",
            Self::NineToEleven => "9-11",
            Self::TwelvePlus => "12+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBucket {
    pub group: AgeGroup,
    pub count: usize,
}

/// Count animals per age group, youngest group first. Empty groups are
/// omitted.
#[must_use]
pub fn age_distribution(animals: &[Animal], as_of: NaiveDate) -> Vec<AgeBucket> {
    let mut counts = [0_usize; AgeGroup::ORDERED.len()];
    for animal in animals {
        let group = AgeGroup::for_age(age(animal.date_of_birth, as_of));
        if let Some(slot) = AgeGroup::ORDERED
            .iter()
            .position(|g| *g == group)
            .and_then(|i| counts.get_mut(i))
        {
            *slot += 1;
        }
    }
    AgeGroup::ORDERED
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(group, count)| AgeBucket { group, count })
        .collect()
}

/// Plausible weight range in grams, inclusive.
#[must_use]
pub fn plausible_weight_range(species: &str) -> (u32, u32) {
    match species.to_ascii_lowercase().as_str() {
        "dog" => (1_000, 100_000),
        "cat" => (500, 15_000),
        "bird" => (10, 2_000),
        "hamster" => (20, 200),
        "rabbit" => (500, 10_000),
        _ => (10, 100_000),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightPoint {
    pub name: String,
    pub weight_grams: u32,
}

/// One species' scatter series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesWeights {
    pub species: String,
    pub points: Vec<WeightPoint>,
}

/// Group plausible weights by species, species in order of first
/// appearance. Implausible records (data entry errors) are skipped.
#[must_use]
pub fn weight_distribution(animals: &[Animal]) -> Vec<SpeciesWeights> {
    let mut series: Vec<SpeciesWeights> = Vec::new();
    for animal in animals {
        let (min, max) = plausible_weight_range(&animal.species);
        if !(min..=max).contains(&animal.weight_grams) {
            continue;
        }
        let point = WeightPoint {
            name: animal.name.clone(),
            weight_grams: animal.weight_grams,
        };
        match series.iter_mut().find(|s| s.species == animal.species) {
            Some(existing) => existing.points.push(point),
            None => series.push(SpeciesWeights {
                species: animal.species.clone(),
                points: vec![point],
            }),
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use animals_catalog_sdk::AnimalId;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn animal(name: &str, species: &str, grams: u32, born: NaiveDate) -> Animal {
        Animal {
            id: AnimalId(1),
            name: name.to_owned(),
            date_of_birth: born,
            species: species.to_owned(),
            breed: "Mixed".to_owned(),
            color: "000000".to_owned(),
            weight_grams: grams,
            owner: None,
        }
    }

    #[test]
    fn age_counts_completed_years() {
        let born = date(2015, 6, 15);
        assert_eq!(age(born, date(2025, 6, 14)), 9);
        assert_eq!(age(born, date(2025, 6, 15)), 10);
        assert_eq!(age(born, date(2025, 12, 31)), 10);
    }

    #[test]
    fn future_birth_date_is_age_zero() {
        assert_eq!(age(date(2030, 1, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn leap_day_birthday_counts_from_march_first() {
        let born = date(2020, 2, 29);
        assert_eq!(age(born, date(2021, 2, 28)), 0);
        assert_eq!(age(born, date(2021, 3, 1)), 1);
    }

    #[test]
    fn weight_formatting() {
        assert_eq!(format_weight(0), "0 g");
        assert_eq!(format_weight(999), "999 g");
        assert_eq!(format_weight(1000), "1.0 kg");
        assert_eq!(format_weight(25_500), "25.5 kg");
        assert_eq!(format_weight(1_049), "1.0 kg");
        assert_eq!(format_weight(1_050), "1.1 kg");
    }

    #[test]
    fn averages_of_empty_input_are_zero() {
        assert!(average_weight_grams(&[]).abs() < f64::EPSILON);
        assert!(average_age(&[], date(2025, 1, 1)).abs() < f64::EPSILON);
    }

    #[test]
    fn averages() {
        let as_of = date(2025, 1, 1);
        let animals = [
            animal("a", "Dog", 10_000, date(2020, 1, 1)),
            animal("b", "Dog", 20_000, date(2015, 1, 1)),
        ];
        assert!((average_weight_grams(&animals) - 15_000.0).abs() < f64::EPSILON);
        assert!((average_age(&animals, as_of) - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn age_distribution_orders_buckets_and_skips_empty_ones() {
        let as_of = date(2025, 1, 1);
        let animals = [
            animal("old", "Cat", 4_000, date(2010, 1, 1)),
            animal("pup", "Dog", 4_000, date(2024, 6, 1)),
            animal("kit", "Cat", 4_000, date(2024, 2, 1)),
            animal("mid", "Dog", 4_000, date(2019, 1, 1)),
        ];
        let buckets = age_distribution(&animals, as_of);
        let labels: Vec<_> = buckets.iter().map(|b| (b.group.label(), b.count)).collect();
        assert_eq!(labels, vec![("0-2", 2), ("6-8", 1), ("12+", 1)]);
    }

    #[test]
    fn weight_distribution_drops_implausible_records() {
        let born = date(2020, 1, 1);
        let animals = [
            animal("Rex", "Dog", 30_000, born),
            animal("Tom", "Cat", 90_000, born),
            animal("Kiwi", "Bird", 80, born),
            animal("Max", "Dog", 500, born),
            animal("Bo", "Dog", 12_000, born),
        ];
        let series = weight_distribution(&animals);
        let shape: Vec<_> = series
            .iter()
            .map(|s| (s.species.as_str(), s.points.len()))
            .collect();
        assert_eq!(shape, vec![("Dog", 2), ("Bird", 1)]);
    }
}
