//! Load/save boundary between the wizard state and its draft store.
//!
//! The state is stored as one JSON document `{ "draft": {..}, "step": n }`
//! under [`STORAGE_KEY`]. A stored document that does not parse, whose draft
//! fails the draft schema, or whose step is out of range is discarded whole.

use serde_json::Value;
use signup_core::account::AccountDraft;
use signup_core::validation::{Schema, SchemaValidator};
use signup_core::wizard::{is_valid_step, WizardState};

use crate::store::{DraftStore, StoreError};

/// Fixed key of the persisted wizard state.
pub const STORAGE_KEY: &str = "signup-newAccountData";

/// Serialize the state as the persisted unit.
pub fn encode(state: &WizardState) -> String {
    // WizardState holds only strings, integers and booleans.
    serde_json::to_string(state).unwrap_or_else(|_| String::from("{}"))
}

/// Why a stored document was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discarded {
    NotText,
    NotJson,
    NotAnObject,
    InvalidDraft,
    InvalidStep,
}

impl Discarded {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotText => "not_text",
            Self::NotJson => "not_json",
            Self::NotAnObject => "not_an_object",
            Self::InvalidDraft => "invalid_draft",
            Self::InvalidStep => "invalid_step",
        }
    }
}

/// Decode a stored document, checking it against the draft schema and the
/// step bounds.
pub async fn decode(
    raw: &str,
    validator: &SchemaValidator,
    step_count: usize,
) -> Result<WizardState, Discarded> {
    let value: Value = serde_json::from_str(raw).map_err(|_| Discarded::NotJson)?;
    let Value::Object(mut root) = value else {
        return Err(Discarded::NotAnObject);
    };

    let draft = match root.remove("draft") {
        Some(Value::Object(record)) => record,
        _ => return Err(Discarded::InvalidDraft),
    };
    let normalized = validator
        .validate(Schema::Draft, &draft)
        .await
        .map_err(|_| Discarded::InvalidDraft)?;
    let mut account = AccountDraft::default();
    account
        .merge(&normalized)
        .map_err(|_| Discarded::InvalidDraft)?;

    let step = root
        .get("step")
        .and_then(Value::as_u64)
        .and_then(|s| u8::try_from(s).ok())
        .filter(|s| is_valid_step(*s, step_count))
        .ok_or(Discarded::InvalidStep)?;

    Ok(WizardState { draft: account, step })
}

/// Read the stored state once, falling back to the default state (and
/// overwriting the store with it) when nothing usable is stored.
pub async fn load(
    store: &dyn DraftStore,
    validator: &SchemaValidator,
    step_count: usize,
) -> Result<WizardState, StoreError> {
    let decoded = match store.get(STORAGE_KEY).await {
        Ok(Some(raw)) => decode(&raw, validator, step_count).await,
        Ok(None) => {
            tracing::debug!("No stored wizard state, starting fresh");
            return Ok(WizardState::default());
        }
        Err(StoreError::Corrupt(_)) => Err(Discarded::NotText),
        Err(e) => return Err(e),
    };

    match decoded {
        Ok(state) => {
            tracing::debug!(step = state.step, "Restored wizard state");
            Ok(state)
        }
        Err(reason) => {
            tracing::warn!(reason = reason.as_str(), "Discarding stored wizard state");
            let fresh = WizardState::default();
            save(store, &fresh).await?;
            Ok(fresh)
        }
    }
}

/// Write the whole state under the fixed key. Last write wins.
pub async fn save(store: &dyn DraftStore, state: &WizardState) -> Result<(), StoreError> {
    store.set(STORAGE_KEY, &encode(state)).await
}
