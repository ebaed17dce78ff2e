//! Named schemas composed from the rule table.
//!
//! Every schema runs through [`SchemaValidator::validate`], which is async
//! for all of them so callers have a single code path whether or not the
//! schema includes the registry lookup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::evaluator::{evaluate_field, FieldOutcome, RuleContext};
use super::fiscal_code::FiscalCodeRegistry;
use super::rules::{spec_for, FieldErrors};
use crate::account::{coerce_integer, Field, FieldKind};
use crate::types::Record;

/// The schemas the wizard and the server validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Identity fields collected by step 1.
    StepOne,
    /// Address fields and flags collected by step 2.
    StepTwo,
    /// Every field; the gate before remote submission.
    Full,
    /// Every field optional, shape only. Used for persisted drafts.
    Draft,
}

impl Schema {
    /// The schema whose fields a 1-based step collects.
    pub fn for_step(step: u8) -> Option<Self> {
        match step {
            1 => Some(Self::StepOne),
            2 => Some(Self::StepTwo),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::StepOne => "step_one",
            Self::StepTwo => "step_two",
            Self::Full => "full",
            Self::Draft => "draft",
        }
    }

    /// The fields this schema covers, in field order.
    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| match self {
            Self::StepOne => f.step() == 1,
            Self::StepTwo => f.step() == 2,
            Self::Full | Self::Draft => true,
        })
    }
}

/// Source of the reference instant for age checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs schemas against raw records.
#[derive(Clone)]
pub struct SchemaValidator {
    registry: Arc<dyn FiscalCodeRegistry>,
    clock: Clock,
}

impl SchemaValidator {
    pub fn new(registry: Arc<dyn FiscalCodeRegistry>) -> Self {
        Self {
            registry,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, e.g. to pin "now" in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Validate `data` against `schema`.
    ///
    /// On success returns the schema's fields coerced to their stored types
    /// (blank optional fields are omitted; keys outside the schema are
    /// dropped). On failure returns one message per failing field.
    pub async fn validate(&self, schema: Schema, data: &Record) -> Result<Record, FieldErrors> {
        if schema == Schema::Draft {
            return validate_draft_shape(data);
        }

        let ctx = RuleContext {
            registry: self.registry.as_ref(),
            now: (self.clock)(),
        };
        let mut normalized = Record::new();
        let mut errors = FieldErrors::new();

        for field in schema.fields() {
            match evaluate_field(spec_for(field), data.get(field.as_str()), &ctx).await {
                FieldOutcome::Valid(Some(value)) => {
                    normalized.insert(field.as_str().to_string(), value);
                }
                FieldOutcome::Valid(None) => {}
                FieldOutcome::Invalid(message) => errors.insert(field, message),
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            tracing::debug!(schema = schema.name(), failures = errors.len(), "Schema validation failed");
            Err(errors)
        }
    }
}

/// Shape-only check: each present field must hold its kind. Text and flags
/// must already be JSON strings and booleans; the integer accepts numeric
/// strings.
fn validate_draft_shape(data: &Record) -> Result<Record, FieldErrors> {
    let mut normalized = Record::new();
    let mut errors = FieldErrors::new();

    for field in Field::ALL {
        let Some(value) = data.get(field.as_str()) else {
            continue;
        };
        let coerced = match (field.kind(), value) {
            (FieldKind::Text, Value::String(_)) | (FieldKind::Flag, Value::Bool(_)) => {
                Some(value.clone())
            }
            (FieldKind::Integer, _) => coerce_integer(value).map(Value::from),
            _ => None,
        };
        match coerced {
            Some(v) => {
                normalized.insert(field.as_str().to_string(), v);
            }
            None => errors.insert(field, format!("{field} has an invalid shape")),
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}
