//! Rule evaluator.
//!
//! Evaluates one field's ordered rules against its raw value, stopping at
//! the first failure. Evaluation is uniformly async: synchronous rules resolve
//! immediately, the registry lookup is awaited.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use validator::ValidateEmail;

use super::age::{has_iso_date_shape, is_adult};
use super::country::is_iso_alpha2;
use super::fiscal_code::FiscalCodeRegistry;
use super::rules::{FieldSpec, Pattern, Rule};
use crate::account::{coerce_flag, coerce_integer, coerce_text, is_blank, FieldKind};

static LETTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]*$").expect("valid regex"));

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*$").expect("valid regex"));

static FISCAL_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{6}[0-9]{2}[A-Z][0-9]{2}[A-Z][0-9]{3}[A-Z]$").expect("valid regex")
});

impl Pattern {
    pub fn regex(self) -> &'static Regex {
        match self {
            Self::Letters => &LETTERS_RE,
            Self::Digits => &DIGITS_RE,
            Self::FiscalCode => &FISCAL_CODE_RE,
        }
    }
}

/// What the rules need besides the value itself.
pub struct RuleContext<'a> {
    pub registry: &'a dyn FiscalCodeRegistry,
    /// Reference instant for age and future-date checks.
    pub now: DateTime<Utc>,
}

/// Result of evaluating one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// All rules passed. Carries the value coerced to the field's kind, or
    /// `None` for a blank optional field.
    Valid(Option<Value>),
    /// The message of the first failing rule.
    Invalid(&'static str),
}

/// Evaluate a field's rules in order; the first failing rule wins.
pub async fn evaluate_field(
    spec: &FieldSpec,
    value: Option<&Value>,
    ctx: &RuleContext<'_>,
) -> FieldOutcome {
    if spec.optional && is_blank(value) {
        return FieldOutcome::Valid(None);
    }

    for field_rule in spec.rules {
        let passed = match check_sync(field_rule.rule, value, ctx.now) {
            Some(passed) => passed,
            None => check_async(field_rule.rule, value, ctx).await,
        };
        if !passed {
            tracing::trace!(field = %spec.field, rule = ?field_rule.rule, "Rule failed");
            return FieldOutcome::Invalid(field_rule.message);
        }
    }

    FieldOutcome::Valid(value.and_then(|v| normalize(spec.field.kind(), v)))
}

/// Check a rule that needs nothing but the value. Returns `None` for rules
/// that must be awaited.
pub fn check_sync(rule: Rule, value: Option<&Value>, now: DateTime<Utc>) -> Option<bool> {
    let text = || value.and_then(coerce_text);
    let passed = match rule {
        Rule::Required => !is_blank(value),
        Rule::MinLength(min) => text().is_some_and(|s| s.chars().count() >= min),
        Rule::ExactLength(len) => text().is_some_and(|s| s.chars().count() == len),
        Rule::Pattern(pattern) => text().is_some_and(|s| pattern.regex().is_match(&s)),
        Rule::Email => text().is_some_and(|s| s.validate_email()),
        Rule::IsoDate => text().is_some_and(|s| has_iso_date_shape(&s)),
        Rule::Integer => value.and_then(coerce_integer).is_some(),
        Rule::AtLeast(min) => value.and_then(coerce_integer).is_some_and(|n| n >= min),
        Rule::Flag => value.and_then(coerce_flag).is_some(),
        Rule::CountryCode => text().is_some_and(|s| is_iso_alpha2(&s)),
        Rule::OneOf(allowed) => text().is_some_and(|s| allowed.contains(&s.as_str())),
        Rule::Adult => text().is_some_and(|s| is_adult(&s, now)),
        Rule::RegisteredFiscalCode => return None,
    };
    Some(passed)
}

async fn check_async(rule: Rule, value: Option<&Value>, ctx: &RuleContext<'_>) -> bool {
    match rule {
        Rule::RegisteredFiscalCode => match value.and_then(coerce_text) {
            Some(code) => ctx.registry.is_registered(&code).await,
            None => false,
        },
        other => check_sync(other, value, ctx.now).unwrap_or(false),
    }
}

/// Coerce a raw value to the JSON type its field is stored as.
pub fn normalize(kind: FieldKind, value: &Value) -> Option<Value> {
    if is_blank(Some(value)) {
        return None;
    }
    match kind {
        FieldKind::Text => coerce_text(value).map(Value::String),
        FieldKind::Integer => coerce_integer(value).map(Value::from),
        FieldKind::Flag => coerce_flag(value).map(Value::Bool),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::account::Field;
    use crate::validation::fiscal_code::SimulatedRegistry;
    use crate::validation::rules::spec_for;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    async fn eval(field: Field, value: Value) -> FieldOutcome {
        let registry = SimulatedRegistry::new(Duration::ZERO);
        let ctx = RuleContext { registry: &registry, now: now() };
        evaluate_field(spec_for(field), Some(&value), &ctx).await
    }

    async fn message(field: Field, value: Value) -> &'static str {
        match eval(field, value).await {
            FieldOutcome::Invalid(msg) => msg,
            FieldOutcome::Valid(v) => panic!("expected {field} to fail, got {v:?}"),
        }
    }

    #[test]
    fn patterns() {
        assert!(Pattern::Letters.regex().is_match("Mario De Rossi"));
        assert!(!Pattern::Letters.regex().is_match("Mario2"));
        assert!(Pattern::Digits.regex().is_match("20100"));
        assert!(!Pattern::Digits.regex().is_match("2010a"));
        assert!(Pattern::FiscalCode.regex().is_match("ABCDEF85S14F112Y"));
        assert!(!Pattern::FiscalCode.regex().is_match("abcdef85s14f112y"));
    }

    #[test]
    fn async_rules_are_deferred() {
        assert_eq!(check_sync(Rule::RegisteredFiscalCode, Some(&json!("X")), now()), None);
        assert_eq!(check_sync(Rule::Required, Some(&json!("X")), now()), Some(true));
    }

    #[tokio::test]
    async fn first_failing_rule_wins() {
        assert_eq!(message(Field::FirstName, json!("")).await, "The first name cannot be empty");
        assert_eq!(
            message(Field::FirstName, json!("A")).await,
            "Please enter a first name longer than 2 characters"
        );
        assert_eq!(
            message(Field::FirstName, json!("A1")).await,
            "The first name accepts only letters and blank spaces, no numbers or special characters"
        );
    }

    #[tokio::test]
    async fn missing_value_is_required_failure() {
        let registry = SimulatedRegistry::new(Duration::ZERO);
        let ctx = RuleContext { registry: &registry, now: now() };
        assert_eq!(
            evaluate_field(spec_for(Field::Email), None, &ctx).await,
            FieldOutcome::Invalid("The email cannot be empty")
        );
    }

    #[tokio::test]
    async fn email_shape() {
        assert_eq!(message(Field::Email, json!("not-an-email")).await, "Please enter a valid email");
        assert_eq!(
            eval(Field::Email, json!("mario.rossi@example.it")).await,
            FieldOutcome::Valid(Some(json!("mario.rossi@example.it")))
        );
    }

    #[tokio::test]
    async fn fiscal_code_length_is_checked_before_registry() {
        assert_eq!(
            message(Field::FiscalCode, json!("ABCDEF85S14F112")).await,
            "The fiscal code needs to be 16 characters long"
        );
        assert_eq!(
            message(Field::FiscalCode, json!("ABCDEF85S14F11YY")).await,
            "The fiscal code needs to respect the correct format"
        );
        assert_eq!(
            message(Field::FiscalCode, json!("XXXXXX85S14F112Y")).await,
            "The fiscal code needs to respect a valid italian format"
        );
        assert_eq!(
            eval(Field::FiscalCode, json!("ABCDEF85S14F112Y")).await,
            FieldOutcome::Valid(Some(json!("ABCDEF85S14F112Y")))
        );
    }

    #[tokio::test]
    async fn date_of_birth_rules() {
        assert_eq!(message(Field::DateOfBirth, json!("17/10/2000")).await, "Invalid date format");
        assert_eq!(
            message(Field::DateOfBirth, json!("2000-02-30")).await,
            "You must be at least 18 years old and the date cannot be in the future"
        );
        assert_eq!(
            eval(Field::DateOfBirth, json!("1985-11-14")).await,
            FieldOutcome::Valid(Some(json!("1985-11-14")))
        );
    }

    #[tokio::test]
    async fn number_address_is_coerced() {
        assert_eq!(eval(Field::NumberAddress, json!("12")).await, FieldOutcome::Valid(Some(json!(12))));
        assert_eq!(
            message(Field::NumberAddress, json!("abc")).await,
            "Number Address must be a valid number"
        );
        assert_eq!(
            message(Field::NumberAddress, json!("0")).await,
            "Number Address must be at least 1"
        );
        assert_eq!(
            message(Field::NumberAddress, json!("")).await,
            "The number of the address cannot be empty"
        );
    }

    #[tokio::test]
    async fn postal_code_rules() {
        assert_eq!(
            message(Field::PostalCode, json!("2010")).await,
            "The postal code needs to be 5 characters long"
        );
        assert_eq!(message(Field::PostalCode, json!("2010A")).await, "The postal code accepts only digits");
        assert_eq!(eval(Field::PostalCode, json!(20100)).await, FieldOutcome::Valid(Some(json!("20100"))));
    }

    #[tokio::test]
    async fn country_distinguishes_iso_from_allow_list() {
        assert_eq!(
            message(Field::Country, json!("US")).await,
            "Country must be one of: IT, ES, DE, PT, FR"
        );
        assert_eq!(
            message(Field::Country, json!("XX")).await,
            "Country must be a valid ISO 3166-1 alpha-2 code (e.g., IT, ES, DE, PT, FR)"
        );
        assert_eq!(
            message(Field::Country, json!("ITA")).await,
            "Country must be a valid ISO 3166-1 alpha-2 code (e.g., IT, ES, DE, PT, FR)"
        );
        assert_eq!(eval(Field::Country, json!("IT")).await, FieldOutcome::Valid(Some(json!("IT"))));
    }

    #[tokio::test]
    async fn place_names_accept_two_letters() {
        assert_eq!(eval(Field::Province, json!("MI")).await, FieldOutcome::Valid(Some(json!("MI"))));
        assert_eq!(eval(Field::City, json!("Roma")).await, FieldOutcome::Valid(Some(json!("Roma"))));
        assert_eq!(
            message(Field::City, json!("R")).await,
            "Please enter a city name longer than 2 characters"
        );
    }

    #[tokio::test]
    async fn optional_flags() {
        let registry = SimulatedRegistry::new(Duration::ZERO);
        let ctx = RuleContext { registry: &registry, now: now() };
        assert_eq!(
            evaluate_field(spec_for(Field::IsPep), None, &ctx).await,
            FieldOutcome::Valid(None)
        );
        assert_eq!(eval(Field::IsLivingHere, json!("on")).await, FieldOutcome::Valid(Some(json!(true))));
        assert_eq!(message(Field::IsPep, json!("perhaps")).await, "isPEP must be a boolean value");
    }
}
