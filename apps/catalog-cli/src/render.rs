//! Plain-text rendering of catalog records for the terminal.

use std::fmt::Write as _;

use animals_catalog::domain::service::animals::{
    age, age_distribution, average_age, average_weight_grams, format_weight, weight_distribution,
};
use animals_catalog::domain::service::persons::{animal_count, format_phone_number, full_name};
use animals_catalog::domain::service::statistics::{Overview, StatisticsReport, species_percentage};
use animals_catalog::{ListStatus, ListView};
use animals_catalog_sdk::{Animal, OwnerRef, Person};
use chrono::NaiveDate;

pub fn animal_line(animal: &Animal, as_of: NaiveDate) -> String {
    let owner = match &animal.owner {
        Some(OwnerRef::Person(person)) => full_name(person),
        Some(OwnerRef::Id(id)) => format!("#{id}"),
        None => "-".to_owned(),
    };
    format!(
        "#{:<5} {:<16} {:<10} {:<16} {:>3}y {:>9}  {owner}",
        animal.id.to_string(),
        animal.name,
        animal.species,
        animal.breed,
        age(animal.date_of_birth, as_of),
        format_weight(u64::from(animal.weight_grams)),
    )
}

pub fn person_line(person: &Person) -> String {
    let phone = person
        .phone_number
        .as_deref()
        .map_or_else(|| "-".to_owned(), format_phone_number);
    format!(
        "#{:<5} {:<24} {:<28} {:<16} {} animal(s)",
        person.id.to_string(),
        full_name(person),
        person.email,
        phone,
        animal_count(person),
    )
}

pub fn animal_detail(animal: &Animal, as_of: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", animal.name, animal.id);
    let _ = writeln!(out, "  species:   {}", animal.species);
    let _ = writeln!(out, "  breed:     {}", animal.breed);
    let _ = writeln!(out, "  color:     #{}", animal.color);
    let _ = writeln!(
        out,
        "  born:      {} ({} years)",
        animal.date_of_birth,
        age(animal.date_of_birth, as_of)
    );
    let _ = writeln!(out, "  weight:    {}", format_weight(u64::from(animal.weight_grams)));
    match &animal.owner {
        Some(OwnerRef::Person(person)) => {
            let _ = writeln!(out, "  owner:     {} (#{})", full_name(person), person.id);
        }
        Some(OwnerRef::Id(id)) => {
            let _ = writeln!(out, "  owner:     #{id}");
        }
        None => {}
    }
    out
}

pub fn person_detail(person: &Person, as_of: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", full_name(person), person.id);
    let _ = writeln!(out, "  email:     {}", person.email);
    if let Some(phone) = &person.phone_number {
        let _ = writeln!(out, "  phone:     {}", format_phone_number(phone));
    }
    let _ = writeln!(out, "  animals:   {}", animal_count(person));
    for animal in &person.animals {
        let _ = writeln!(out, "    {}", animal_line(animal, as_of));
    }
    out
}

/// Footer shown under a list: how much of the server total is loaded.
pub fn list_footer<T>(view: &ListView<T>, noun: &str) -> String {
    match &view.status {
        ListStatus::Empty => format!("No {noun} found."),
        ListStatus::FilteredOut => format!(
            "No {noun} match the filters ({} of {} loaded).",
            view.loaded, view.total
        ),
        ListStatus::Failed(message) => message.clone(),
        _ => {
            let mut footer = format!(
                "{} shown, {} of {} loaded",
                view.items.len(),
                view.loaded,
                view.total
            );
            if view.has_more {
                footer.push_str(", more available");
            }
            if let Some(err) = &view.error {
                let _ = write!(footer, " (next page failed: {})", err.user_message());
            }
            footer
        }
    }
}

pub fn animal_summary(animals: &[Animal], as_of: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "average weight {:.0} g, average age {:.1} years",
        average_weight_grams(animals),
        average_age(animals, as_of)
    );
    for bucket in age_distribution(animals, as_of) {
        let _ = writeln!(out, "  {:>5} years: {}", bucket.group.label(), bucket.count);
    }
    let _ = writeln!(out, "weights by species:");
    for series in weight_distribution(animals) {
        let weights = series.points.iter().map(|p| u64::from(p.weight_grams));
        let (Some(min), Some(max)) = (weights.clone().min(), weights.max()) else {
            continue;
        };
        let _ = writeln!(
            out,
            "  {:<12} {:>3} animal(s), {} to {}",
            series.species,
            series.points.len(),
            format_weight(min),
            format_weight(max)
        );
    }
    out
}

pub fn statistics(report: &StatisticsReport, total_animals: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Species distribution:");
    for share in species_percentage(&report.species_distribution, total_animals) {
        let _ = writeln!(
            out,
            "  {:<12} {:>5} ({:.1} %)",
            share.species, share.count, share.percentage
        );
    }
    let _ = writeln!(
        out,
        "Heaviest animal: {} ({}, {})",
        report.heaviest_animal.animal.name,
        report.heaviest_animal.animal.species,
        report.heaviest_animal.formatted_weight
    );
    let _ = writeln!(
        out,
        "Oldest animal:   {} ({}, {} years)",
        report.oldest_animal.animal.name,
        report.oldest_animal.animal.species,
        report.oldest_animal.age
    );
    let _ = writeln!(
        out,
        "Most animals:    {} ({} animals)",
        report.most_animals.owner_name, report.most_animals.animal_count
    );
    let _ = writeln!(
        out,
        "Heaviest group:  {} ({} animals, {})",
        report.heaviest_group.owner_name,
        report.heaviest_group.animal_count,
        report.heaviest_group.formatted_total_weight
    );
    out
}

pub fn overview(overview: &Overview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Animals:             {}", overview.total_animals);
    let _ = writeln!(out, "Owners:              {}", overview.total_owners);
    if let Some(species) = &overview.most_common_species {
        let _ = writeln!(
            out,
            "Most common species: {} ({})",
            species.species, species.count
        );
    }
    let _ = writeln!(
        out,
        "Oldest animal:       {} ({} years)",
        overview.oldest_animal_name, overview.oldest_animal_age
    );
    let _ = writeln!(
        out,
        "Heaviest animal:     {} ({})",
        overview.heaviest_animal_name,
        format_weight(u64::from(overview.heaviest_animal_weight_grams))
    );
    let _ = writeln!(
        out,
        "Top owner:           {} ({} animals)",
        overview.top_owner_name, overview.top_owner_animal_count
    );
    out
}
