//! Wire shapes of query results and their mapping into SDK models.
//!
//! Decoding is lenient about optional fields and strict about the
//! invariants the models carry (non-negative weights, parseable dates).

use animals_catalog_sdk::{
    Animal, AnimalId, AnimalSpeciesCount, CatalogError, OwnerRef, OwnerWeightStats,
    OwnershipStats, PaginatedResponse, Person, PersonId,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Record identifier; some servers encode numeric ids as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Int(i64),
    Str(String),
}

impl WireId {
    fn into_i64(self, entity: &str) -> Result<i64, CatalogError> {
        match self {
            Self::Int(id) => Ok(id),
            Self::Str(raw) => raw.trim().parse().map_err(|_| {
                CatalogError::invalid_response(format!("{entity} id '{raw}' is not numeric"))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnimalDto {
    pub id: WireId,
    pub name: String,
    pub date_of_birth: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub weight: i64,
    #[serde(default)]
    pub owner: Option<PersonDto>,
    #[serde(default)]
    pub owner_id: Option<WireId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersonDto {
    pub id: WireId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub animals: Option<Vec<AnimalDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageDto<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpeciesCountDto {
    pub species: String,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OwnershipStatsDto {
    pub owner: PersonDto,
    pub animal_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OwnerWeightStatsDto {
    pub owner: PersonDto,
    pub animal_count: u64,
    pub total_weight: u64,
}

impl TryFrom<AnimalDto> for Animal {
    type Error = CatalogError;

    fn try_from(dto: AnimalDto) -> Result<Self, Self::Error> {
        let id = AnimalId(dto.id.into_i64("animal")?);
        let weight_grams = u32::try_from(dto.weight).map_err(|_| {
            CatalogError::invalid_response(format!(
                "animal {id} has an out-of-range weight {}",
                dto.weight
            ))
        })?;
        let date_of_birth = parse_birth_date(&dto.date_of_birth).ok_or_else(|| {
            CatalogError::invalid_response(format!(
                "animal {id} has an unreadable date of birth '{}'",
                dto.date_of_birth
            ))
        })?;

        let owner = match (dto.owner, dto.owner_id) {
            (Some(owner), _) => Some(OwnerRef::Person(Box::new(Person::try_from(owner)?))),
            (None, Some(owner_id)) => Some(OwnerRef::Id(PersonId(owner_id.into_i64("owner")?))),
            (None, None) => None,
        };

        Ok(Self {
            id,
            name: dto.name,
            date_of_birth,
            species: dto.species,
            breed: dto.breed.unwrap_or_default(),
            color: dto.color.unwrap_or_default(),
            weight_grams,
            owner,
        })
    }
}

impl TryFrom<PersonDto> for Person {
    type Error = CatalogError;

    fn try_from(dto: PersonDto) -> Result<Self, Self::Error> {
        let animals = dto
            .animals
            .unwrap_or_default()
            .into_iter()
            .map(Animal::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: PersonId(dto.id.into_i64("person")?),
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email.unwrap_or_default(),
            phone_number: dto.phone_number.filter(|p| !p.trim().is_empty()),
            animals,
        })
    }
}

impl<D> PageDto<D> {
    pub(crate) fn try_into_page<T>(self) -> Result<PaginatedResponse<T>, CatalogError>
    where
        T: TryFrom<D, Error = CatalogError>,
    {
        let items = self
            .items
            .into_iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PaginatedResponse::new(items, self.total, self.has_more))
    }
}

impl From<SpeciesCountDto> for AnimalSpeciesCount {
    fn from(dto: SpeciesCountDto) -> Self {
        Self {
            species: dto.species,
            count: dto.count,
        }
    }
}

impl TryFrom<OwnershipStatsDto> for OwnershipStats {
    type Error = CatalogError;

    fn try_from(dto: OwnershipStatsDto) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: Person::try_from(dto.owner)?,
            animal_count: dto.animal_count,
        })
    }
}

impl TryFrom<OwnerWeightStatsDto> for OwnerWeightStats {
    type Error = CatalogError;

    fn try_from(dto: OwnerWeightStatsDto) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: Person::try_from(dto.owner)?,
            animal_count: dto.animal_count,
            total_weight_grams: dto.total_weight,
        })
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, naive timestamps and epoch
/// milliseconds (as a digit string).
fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let millis = raw.parse::<i64>().ok()?;
        return DateTime::from_timestamp_millis(millis).map(|ts| ts.date_naive());
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn animal(value: serde_json::Value) -> Result<Animal, CatalogError> {
        Animal::try_from(serde_json::from_value::<AnimalDto>(value).unwrap())
    }

    #[test]
    fn animal_with_embedded_owner_maps_to_model() {
        let animal = animal(json!({
            "id": "12",
            "name": "Rex",
            "dateOfBirth": "2019-04-01T00:00:00.000Z",
            "species": "Dog",
            "breed": "Beagle",
            "color": "A0522D",
            "weight": 12500,
            "owner": { "id": 3, "firstName": "Ada", "lastName": "Byron", "email": "ada@example.com" }
        }))
        .unwrap();

        assert_eq!(animal.id, AnimalId(12));
        assert_eq!(animal.date_of_birth, NaiveDate::from_ymd_opt(2019, 4, 1).unwrap());
        assert_eq!(animal.weight_grams, 12_500);
        let owner = animal.owner.as_ref().and_then(OwnerRef::person).unwrap();
        assert_eq!(owner.first_name, "Ada");
        assert_eq!(owner.phone_number, None);
    }

    #[test]
    fn owner_id_only_is_kept_as_reference() {
        let animal = animal(json!({
            "id": 1, "name": "Tom", "dateOfBirth": "2020-01-02", "species": "Cat",
            "breed": "Siamese", "color": "FFFFFF", "weight": 4000, "ownerId": 9
        }))
        .unwrap();
        assert_eq!(animal.owner, Some(OwnerRef::Id(PersonId(9))));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = animal(json!({
            "id": 1, "name": "Tom", "dateOfBirth": "2020-01-02", "species": "Cat",
            "breed": "Siamese", "color": "FFFFFF", "weight": -5
        }))
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse { .. }));
    }

    #[test]
    fn birth_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2015, 6, 30);
        assert_eq!(parse_birth_date("2015-06-30"), expected);
        assert_eq!(parse_birth_date("2015-06-30T10:00:00"), expected);
        assert_eq!(parse_birth_date("2015-06-30T10:00:00+02:00"), expected);
        assert_eq!(parse_birth_date("1435658400000"), expected);
        assert_eq!(parse_birth_date("last tuesday"), None);
    }

    #[test]
    fn person_page_maps_nested_animals() {
        let page: PageDto<PersonDto> = serde_json::from_value(json!({
            "items": [{
                "id": 1, "firstName": "Ada", "lastName": "Byron", "email": "a@b.c",
                "phoneNumber": "0612345678",
                "animals": [{
                    "id": 5, "name": "Rex", "dateOfBirth": "2019-01-01", "species": "Dog",
                    "breed": "Beagle", "color": "000000", "weight": 9000
                }]
            }],
            "total": 31,
            "hasMore": true
        }))
        .unwrap();

        let page = page.try_into_page::<Person>().unwrap();
        assert_eq!(page.total, 31);
        assert!(page.has_more);
        assert_eq!(page.items[0].animals.len(), 1);
        assert_eq!(page.items[0].animals[0].owner, None);
    }
}
