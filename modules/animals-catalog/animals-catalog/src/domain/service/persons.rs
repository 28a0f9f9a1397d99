//! Person display helpers.

use animals_catalog_sdk::Person;

#[must_use]
pub fn full_name(person: &Person) -> String {
    format!("{} {}", person.first_name, person.last_name)
}

/// Group digits in pairs separated by single spaces: a space follows every
/// two consecutive digits that are followed by another digit. Non-digits
/// are kept and break the pairing.
///
/// `"0612345678"` becomes `"06 12 34 56 78"`.
#[must_use]
pub fn format_phone_number(phone_number: &str) -> String {
    let chars: Vec<char> = phone_number.chars().collect();
    let mut formatted = String::with_capacity(phone_number.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let pair = chars
            .get(i..i + 2)
            .filter(|pair| pair.iter().all(char::is_ascii_digit));
        match pair {
            Some(pair) => {
                formatted.extend(pair);
                i += 2;
                if chars.get(i).is_some_and(char::is_ascii_digit) {
                    formatted.push(' ');
                }
            }
            None => {
                if let Some(c) = chars.get(i) {
                    formatted.push(*c);
                }
                i += 1;
            }
        }
    }
    formatted.trim().to_owned()
}

#[must_use]
pub fn animal_count(person: &Person) -> usize {
    person.animals.len()
}

#[cfg(test)]
mod tests {
    use animals_catalog_sdk::PersonId;

    use super::*;

    #[test]
    fn full_name_joins_first_and_last() {
        let person = Person {
            id: PersonId(1),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
            email: String::new(),
            phone_number: None,
            animals: Vec::new(),
        };
        assert_eq!(full_name(&person), "Grace Hopper");
        assert_eq!(animal_count(&person), 0);
    }

    #[test]
    fn phone_numbers_are_paired() {
        assert_eq!(format_phone_number("0612345678"), "06 12 34 56 78");
        assert_eq!(format_phone_number("061234567"), "06 12 34 56 7");
        assert_eq!(format_phone_number("+33612345678"), "+33 61 23 45 67 8");
        assert_eq!(format_phone_number("06"), "06");
        assert_eq!(format_phone_number(""), "");
    }

    #[test]
    fn separators_break_pairs() {
        assert_eq!(format_phone_number("06-1234"), "06-12 34");
    }
}
