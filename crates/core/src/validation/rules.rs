//! The account rule table.
//!
//! Each field carries an ordered list of rules with their messages. The
//! client-side step schemas, the full-record gate and the server-side
//! re-validation all evaluate this one table.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::account::Field;

/// Countries accepted for the address step.
pub const ALLOWED_COUNTRIES: &[&str] = &["IT", "ES", "DE", "PT", "FR"];

/// Minimum length for province and city names.
pub const PLACE_NAME_MIN_LENGTH: usize = 2;

/// Message shared by every failure path of the adult-age rule.
pub const ADULT_MESSAGE: &str =
    "You must be at least 18 years old and the date cannot be in the future";

/// Message for a well-formed fiscal code the registry does not recognise.
pub const FISCAL_CODE_REGISTRY_MESSAGE: &str =
    "The fiscal code needs to respect a valid italian format";

/// Regular expressions used by [`Rule::Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// ASCII letters and blank spaces only.
    Letters,
    /// ASCII digits only.
    Digits,
    /// The Italian codice fiscale layout.
    FiscalCode,
}

/// A single atomic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and not the empty string.
    Required,
    MinLength(usize),
    ExactLength(usize),
    Pattern(Pattern),
    /// A plausible email address.
    Email,
    /// `YYYY-MM-DD` or an ISO datetime.
    IsoDate,
    /// Coercible to an integer.
    Integer,
    /// Integer greater than or equal to the bound.
    AtLeast(i64),
    /// Coercible to a boolean flag.
    Flag,
    /// A real ISO 3166-1 alpha-2 code.
    CountryCode,
    /// Member of a fixed set.
    OneOf(&'static [&'static str]),
    /// Birthdate of someone at least 18, not in the future.
    Adult,
    /// Accepted by the fiscal code registry. Asynchronous.
    RegisteredFiscalCode,
}

/// A rule paired with the message reported when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub rule: Rule,
    pub message: &'static str,
}

/// The ordered rules for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    /// Optional fields pass when blank and skip their rules.
    pub optional: bool,
    pub rules: &'static [FieldRule],
}

const fn rule(rule: Rule, message: &'static str) -> FieldRule {
    FieldRule { rule, message }
}

const EMAIL_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The email cannot be empty"),
    rule(Rule::Email, "Please enter a valid email"),
];

const FIRST_NAME_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The first name cannot be empty"),
    rule(Rule::MinLength(2), "Please enter a first name longer than 2 characters"),
    rule(
        Rule::Pattern(Pattern::Letters),
        "The first name accepts only letters and blank spaces, no numbers or special characters",
    ),
];

const LAST_NAME_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The last name cannot be empty"),
    rule(Rule::MinLength(2), "Please enter a last name longer than 2 characters"),
    rule(
        Rule::Pattern(Pattern::Letters),
        "The last name accepts only letters and blank space, no numbers or special characters",
    ),
];

const DATE_OF_BIRTH_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The date of birth cannot be empty"),
    rule(Rule::IsoDate, "Invalid date format"),
    rule(Rule::Adult, ADULT_MESSAGE),
];

const FISCAL_CODE_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The fiscal code cannot be empty"),
    rule(Rule::ExactLength(16), "The fiscal code needs to be 16 characters long"),
    rule(
        Rule::Pattern(Pattern::FiscalCode),
        "The fiscal code needs to respect the correct format",
    ),
    rule(Rule::RegisteredFiscalCode, FISCAL_CODE_REGISTRY_MESSAGE),
];

const STREET_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The street name cannot be empty"),
    rule(Rule::MinLength(5), "Please enter a street name longer than 5 characters"),
    rule(
        Rule::Pattern(Pattern::Letters),
        "The street name accepts only letters and blank space, no numbers or special characters",
    ),
];

const NUMBER_ADDRESS_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The number of the address cannot be empty"),
    rule(Rule::Integer, "Number Address must be a valid number"),
    rule(Rule::AtLeast(1), "Number Address must be at least 1"),
];

const POSTAL_CODE_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The postal code cannot be empty"),
    rule(Rule::ExactLength(5), "The postal code needs to be 5 characters long"),
    rule(Rule::Pattern(Pattern::Digits), "The postal code accepts only digits"),
];

const PROVINCE_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The province name cannot be empty"),
    rule(
        Rule::MinLength(PLACE_NAME_MIN_LENGTH),
        "Please enter a province name longer than 2 characters",
    ),
    rule(
        Rule::Pattern(Pattern::Letters),
        "The province name accepts only letters and blank space, no numbers or special characters",
    ),
];

const CITY_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The city name cannot be empty"),
    rule(
        Rule::MinLength(PLACE_NAME_MIN_LENGTH),
        "Please enter a city name longer than 2 characters",
    ),
    rule(
        Rule::Pattern(Pattern::Letters),
        "The city name accepts only letters and blank space, no numbers or special characters",
    ),
];

const COUNTRY_RULES: &[FieldRule] = &[
    rule(Rule::Required, "The country name cannot be empty"),
    rule(
        Rule::ExactLength(2),
        "Country must be a valid ISO 3166-1 alpha-2 code (e.g., IT, ES, DE, PT, FR)",
    ),
    rule(
        Rule::CountryCode,
        "Country must be a valid ISO 3166-1 alpha-2 code (e.g., IT, ES, DE, PT, FR)",
    ),
    rule(Rule::OneOf(ALLOWED_COUNTRIES), "Country must be one of: IT, ES, DE, PT, FR"),
];

const IS_LIVING_HERE_RULES: &[FieldRule] =
    &[rule(Rule::Flag, "isLivingHere must be a boolean value")];

const IS_PEP_RULES: &[FieldRule] = &[rule(Rule::Flag, "isPEP must be a boolean value")];

/// The rule table, one entry per [`Field`], in field order.
pub const ACCOUNT_RULES: [FieldSpec; 13] = [
    FieldSpec { field: Field::Email, optional: false, rules: EMAIL_RULES },
    FieldSpec { field: Field::FirstName, optional: false, rules: FIRST_NAME_RULES },
    FieldSpec { field: Field::LastName, optional: false, rules: LAST_NAME_RULES },
    FieldSpec { field: Field::DateOfBirth, optional: false, rules: DATE_OF_BIRTH_RULES },
    FieldSpec { field: Field::FiscalCode, optional: false, rules: FISCAL_CODE_RULES },
    FieldSpec { field: Field::Street, optional: false, rules: STREET_RULES },
    FieldSpec { field: Field::NumberAddress, optional: false, rules: NUMBER_ADDRESS_RULES },
    FieldSpec { field: Field::PostalCode, optional: false, rules: POSTAL_CODE_RULES },
    FieldSpec { field: Field::Province, optional: false, rules: PROVINCE_RULES },
    FieldSpec { field: Field::City, optional: false, rules: CITY_RULES },
    FieldSpec { field: Field::Country, optional: false, rules: COUNTRY_RULES },
    FieldSpec { field: Field::IsLivingHere, optional: true, rules: IS_LIVING_HERE_RULES },
    FieldSpec { field: Field::IsPep, optional: true, rules: IS_PEP_RULES },
];

/// The rule list for one field.
pub fn spec_for(field: Field) -> &'static FieldSpec {
    // ACCOUNT_RULES is indexed in Field declaration order.
    &ACCOUNT_RULES[field as usize]
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One message per failing field, iterated in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. The first message recorded for a field is kept.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The failing field that comes first in field order.
    pub fn first(&self) -> Option<(Field, &str)> {
        self.0.iter().next().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// All messages in field order.
    pub fn messages(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }
}

impl IntoIterator for FieldErrors {
    type Item = (Field, String);
    type IntoIter = btree_map::IntoIter<Field, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_field() {
        for field in Field::ALL {
            assert_eq!(spec_for(field).field, field);
        }
    }

    #[test]
    fn every_mandatory_field_starts_with_required() {
        for spec in ACCOUNT_RULES.iter().filter(|s| !s.optional) {
            assert_eq!(spec.rules[0].rule, Rule::Required, "{}", spec.field);
        }
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::City, "first");
        errors.insert(Field::City, "second");
        assert_eq!(errors.get(Field::City), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn errors_iterate_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::Country, "c");
        errors.insert(Field::Email, "e");
        assert_eq!(errors.first(), Some((Field::Email, "e")));
        assert_eq!(errors.messages(), vec!["e".to_string(), "c".to_string()]);
    }

    #[test]
    fn errors_serialize_by_wire_name() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::IsPep, "bad");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["isPEP"], "bad");
    }
}
