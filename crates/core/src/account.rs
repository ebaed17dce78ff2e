//! Account record types shared by the wizard, the submission client and the
//! server.
//!
//! [`AccountDraft`] is the partial, persisted record the wizard edits one
//! field at a time. [`NewAccount`] is the complete record that passed the
//! full schema and is handed to the submission endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Record;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Every field of an account record, in display order.
///
/// The derived ordering is the declaration order, so a map keyed by `Field`
/// iterates identity fields before address fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "firstName")]
    FirstName,
    #[serde(rename = "lastName")]
    LastName,
    #[serde(rename = "dateOfBirth")]
    DateOfBirth,
    #[serde(rename = "fiscalCode")]
    FiscalCode,
    #[serde(rename = "street")]
    Street,
    #[serde(rename = "numberAddress")]
    NumberAddress,
    #[serde(rename = "postalCode")]
    PostalCode,
    #[serde(rename = "province")]
    Province,
    #[serde(rename = "city")]
    City,
    #[serde(rename = "country")]
    Country,
    #[serde(rename = "isLivingHere")]
    IsLivingHere,
    #[serde(rename = "isPEP")]
    IsPep,
}

/// The primitive shape a field's value takes once coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Flag,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Email,
        Field::FirstName,
        Field::LastName,
        Field::DateOfBirth,
        Field::FiscalCode,
        Field::Street,
        Field::NumberAddress,
        Field::PostalCode,
        Field::Province,
        Field::City,
        Field::Country,
        Field::IsLivingHere,
        Field::IsPep,
    ];

    /// The wire name used in form data, JSON bodies and persisted drafts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::DateOfBirth => "dateOfBirth",
            Self::FiscalCode => "fiscalCode",
            Self::Street => "street",
            Self::NumberAddress => "numberAddress",
            Self::PostalCode => "postalCode",
            Self::Province => "province",
            Self::City => "city",
            Self::Country => "country",
            Self::IsLivingHere => "isLivingHere",
            Self::IsPep => "isPEP",
        }
    }

    /// Look up a field by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::NumberAddress => FieldKind::Integer,
            Self::IsLivingHere | Self::IsPep => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    /// The 1-based wizard step whose form collects this field.
    pub fn step(self) -> u8 {
        match self {
            Self::Email | Self::FirstName | Self::LastName | Self::DateOfBirth | Self::FiscalCode => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Read a raw value as text. Numbers are read as their decimal rendering.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a raw value as an integer, accepting numeric strings.
///
/// Fractional values are rejected: the stored column is an integer.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Read a raw value as a boolean flag.
///
/// Accepts JSON booleans, `1`/`0`, and the strings `true/false`, `1/0`,
/// `yes/no`, `on/off` in any case.
pub fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Whether a raw value counts as "not provided".
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// The in-progress account record. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_address: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_living_here: Option<bool>,
    #[serde(default, rename = "isPEP", skip_serializing_if = "Option::is_none")]
    pub is_pep: Option<bool>,
}

impl AccountDraft {
    /// Set one field from a raw value, coercing it to the field's kind.
    ///
    /// A blank value clears the field. A value that cannot be coerced is
    /// rejected and the draft is left untouched.
    pub fn set(&mut self, field: Field, value: &Value) -> Result<(), CoreError> {
        if is_blank(Some(value)) {
            self.clear(field);
            return Ok(());
        }
        let rejected = || {
            CoreError::Validation(format!("{field} cannot hold the value {value}"))
        };
        match field.kind() {
            FieldKind::Text => {
                let text = coerce_text(value).ok_or_else(rejected)?;
                *self.text_slot(field) = Some(text);
            }
            FieldKind::Integer => {
                self.number_address = Some(coerce_integer(value).ok_or_else(rejected)?);
            }
            FieldKind::Flag => {
                let flag = coerce_flag(value).ok_or_else(rejected)?;
                match field {
                    Field::IsLivingHere => self.is_living_here = Some(flag),
                    _ => self.is_pep = Some(flag),
                }
            }
        }
        Ok(())
    }

    /// Copy every recognised field of a validated record into the draft.
    pub fn merge(&mut self, record: &Record) -> Result<(), CoreError> {
        for (name, value) in record {
            if let Some(field) = Field::from_name(name) {
                self.set(field, value)?;
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, field: Field) {
        match field.kind() {
            FieldKind::Text => *self.text_slot(field) = None,
            FieldKind::Integer => self.number_address = None,
            FieldKind::Flag => match field {
                Field::IsLivingHere => self.is_living_here = None,
                _ => self.is_pep = None,
            },
        }
    }

    /// The draft as a record, omitting unset fields.
    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Record::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn text_slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Email => &mut self.email,
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::FiscalCode => &mut self.fiscal_code,
            Field::Street => &mut self.street,
            Field::PostalCode => &mut self.postal_code,
            Field::Province => &mut self.province,
            Field::City => &mut self.city,
            _ => &mut self.country,
        }
    }
}

// ---------------------------------------------------------------------------
// Complete record
// ---------------------------------------------------------------------------

/// A complete account record that passed the full schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub fiscal_code: String,
    pub street: String,
    pub number_address: i64,
    pub postal_code: String,
    pub province: String,
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_living_here: Option<bool>,
    #[serde(default, rename = "isPEP", skip_serializing_if = "Option::is_none")]
    pub is_pep: Option<bool>,
}

impl NewAccount {
    /// Build the typed record from a record normalised by the full schema.
    ///
    /// Fails only if the record was not produced by a successful full-schema
    /// validation.
    pub fn from_record(record: Record) -> Result<Self, CoreError> {
        serde_json::from_value(Value::Object(record))
            .map_err(|e| CoreError::Internal(format!("Validated record is incomplete: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.as_str()), Some(field));
            assert_eq!(
                serde_json::to_value(field).unwrap(),
                json!(field.as_str())
            );
        }
        assert_eq!(Field::from_name("unknown"), None);
    }

    #[test]
    fn fields_are_owned_by_two_steps() {
        assert_eq!(Field::FiscalCode.step(), 1);
        assert_eq!(Field::Street.step(), 2);
        assert_eq!(Field::IsPep.step(), 2);
        assert!(Field::Email < Field::Street);
    }

    #[test]
    fn flag_coercion_accepts_common_spellings() {
        for raw in [json!(true), json!("true"), json!("1"), json!("YES"), json!("on"), json!(1)] {
            assert_eq!(coerce_flag(&raw), Some(true), "{raw}");
        }
        for raw in [json!(false), json!("false"), json!("0"), json!("no"), json!("Off"), json!(0)] {
            assert_eq!(coerce_flag(&raw), Some(false), "{raw}");
        }
        assert_eq!(coerce_flag(&json!("maybe")), None);
        assert_eq!(coerce_flag(&json!(2)), None);
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce_integer(&json!("12")), Some(12));
        assert_eq!(coerce_integer(&json!(" 7 ")), Some(7));
        assert_eq!(coerce_integer(&json!(3.0)), Some(3));
        assert_eq!(coerce_integer(&json!("3.5")), None);
        assert_eq!(coerce_integer(&json!("abc")), None);
        assert_eq!(coerce_integer(&json!(true)), None);
    }

    #[test]
    fn draft_set_and_clear() {
        let mut draft = AccountDraft::default();
        draft.set(Field::FirstName, &json!("Mario")).unwrap();
        draft.set(Field::NumberAddress, &json!("10")).unwrap();
        draft.set(Field::IsPep, &json!("no")).unwrap();
        assert_eq!(draft.first_name.as_deref(), Some("Mario"));
        assert_eq!(draft.number_address, Some(10));
        assert_eq!(draft.is_pep, Some(false));

        draft.set(Field::FirstName, &json!("")).unwrap();
        assert_eq!(draft.first_name, None);
    }

    #[test]
    fn draft_rejects_uncoercible_value() {
        let mut draft = AccountDraft::default();
        assert!(draft.set(Field::NumberAddress, &json!("twelve")).is_err());
        assert!(draft.set(Field::IsLivingHere, &json!("sometimes")).is_err());
        assert!(draft.is_empty());
    }

    #[test]
    fn draft_record_omits_unset_fields() {
        let mut draft = AccountDraft::default();
        draft.set(Field::IsPep, &json!(true)).unwrap();
        draft.set(Field::Country, &json!("IT")).unwrap();
        let record = draft.to_record();
        assert_eq!(record.len(), 2);
        assert_eq!(record["isPEP"], json!(true));
        assert_eq!(record["country"], json!("IT"));
    }

    #[test]
    fn merge_ignores_unknown_keys() {
        let mut draft = AccountDraft::default();
        let record = json!({ "city": "Milano", "favouriteColour": "red" });
        draft.merge(record.as_object().unwrap()).unwrap();
        assert_eq!(draft.city.as_deref(), Some("Milano"));
    }

    #[test]
    fn new_account_requires_every_mandatory_field() {
        let record = json!({ "email": "a@b.it" });
        assert!(NewAccount::from_record(record.as_object().unwrap().clone()).is_err());
    }
}
