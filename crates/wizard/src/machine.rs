//! The wizard state machine.
//!
//! [`WizardMachine`] owns the current [`WizardState`], applies the pure
//! reducer from `signup_core::wizard`, and writes the whole state to its
//! [`DraftStore`] after every change. Nothing may be read or mutated before
//! [`WizardMachine::rehydrate`] has reconciled the stored state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use signup_core::account::{Field, NewAccount};
use signup_core::types::Record;
use signup_core::validation::{FieldErrors, Schema, SchemaValidator, SimulatedRegistry};
use signup_core::wizard::{
    redirect_for, reduce, step_definitions, Redirect, StepDefinition, Transition, WizardState,
    WizardStep,
};

use crate::config::WizardConfig;
use crate::error::{SubmissionError, WizardError};
use crate::persist;
use crate::store::{DraftStore, FileDraftStore};
use crate::submission::{HttpSubmissionClient, SubmissionClient, SubmittedAccount};

/// Result of submitting a step or the full record.
#[derive(Debug)]
pub enum StepOutcome {
    /// The step passed and the wizard moved on.
    Advanced { step: u8 },
    /// The step failed; the wizard stays where it is.
    Invalid(FieldErrors),
    /// The stored record failed the full schema; the wizard jumped to the
    /// step owning the first failing field.
    Redirected(Redirect),
    /// The endpoint accepted the record; the wizard was reset.
    Submitted(SubmittedAccount),
    /// The endpoint refused the record or could not be reached. The draft
    /// and step are unchanged.
    Rejected(SubmissionError),
}

pub struct WizardMachine {
    steps: &'static [StepDefinition],
    validator: SchemaValidator,
    store: Arc<dyn DraftStore>,
    client: Arc<dyn SubmissionClient>,
    state: Mutex<WizardState>,
    loaded: AtomicBool,
    in_flight: AtomicBool,
}

impl WizardMachine {
    pub fn new(
        steps: &'static [StepDefinition],
        validator: SchemaValidator,
        store: Arc<dyn DraftStore>,
        client: Arc<dyn SubmissionClient>,
    ) -> Self {
        Self {
            steps,
            validator,
            store,
            client,
            state: Mutex::new(WizardState::default()),
            loaded: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Wire a machine from configuration: file-backed draft store, HTTP
    /// submission client and the simulated fiscal code registry.
    pub fn from_config(config: &WizardConfig) -> Result<Self, WizardError> {
        let registry = SimulatedRegistry::new(config.fiscal_code_latency);
        let client = HttpSubmissionClient::from_config(config)?;
        Ok(Self::new(
            step_definitions(config.include_review_step),
            SchemaValidator::new(Arc::new(registry)),
            Arc::new(FileDraftStore::new(config.store_dir.clone())),
            Arc::new(client),
        ))
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Read the stored state once and reconcile it. Later calls return the
    /// current state without touching the store.
    pub async fn rehydrate(&self) -> Result<WizardState, WizardError> {
        if let Some(state) = self.snapshot() {
            return Ok(state);
        }
        let state = persist::load(self.store.as_ref(), &self.validator, self.steps.len()).await?;
        *self.lock() = state.clone();
        self.loaded.store(true, Ordering::Release);
        Ok(state)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// The current state, or `None` until rehydration has finished.
    pub fn snapshot(&self) -> Option<WizardState> {
        self.is_loaded().then(|| self.lock().clone())
    }

    pub fn steps(&self) -> &'static [StepDefinition] {
        self.steps
    }

    /// Whether a step or full-record submission is running.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Store one field's value, coerced to the field's kind. A blank value
    /// clears the field.
    pub async fn set_field(&self, field: Field, value: &Value) -> Result<WizardState, WizardError> {
        self.ensure_loaded()?;
        let mut next = self.current();
        next.draft.set(field, value)?;
        self.commit(next).await
    }

    pub async fn advance(&self) -> Result<WizardState, WizardError> {
        self.transition(Transition::Advance).await
    }

    pub async fn retreat(&self) -> Result<WizardState, WizardError> {
        self.transition(Transition::Retreat).await
    }

    /// Move to `step`. Out-of-range targets leave the state unchanged.
    pub async fn jump_to(&self, step: u8) -> Result<WizardState, WizardError> {
        self.transition(Transition::JumpTo(step)).await
    }

    /// Back to an empty draft on step 1.
    pub async fn reset(&self) -> Result<WizardState, WizardError> {
        self.transition(Transition::Reset).await
    }

    async fn transition(&self, transition: Transition) -> Result<WizardState, WizardError> {
        self.ensure_loaded()?;
        let current = self.current();
        let next = reduce(&current, transition, self.steps.len());
        tracing::debug!(from = current.step, to = next.step, ?transition, "Wizard transition");
        self.commit(next).await
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Validate the current step's form data.
    ///
    /// On success the validated fields replace the step's fields in the
    /// draft and the wizard advances; on the last step (or on a step with no
    /// form) the full record is submitted instead.
    pub async fn submit_current_step(&self, form: &Record) -> Result<StepOutcome, WizardError> {
        self.ensure_loaded()?;
        let _guard = InFlight::acquire(&self.in_flight)?;

        let current = self.current();
        let Some(schema) = WizardStep::from_number(current.step)?.schema() else {
            return self.submit_full().await;
        };

        let normalized = match self.validator.validate(schema, form).await {
            Ok(normalized) => normalized,
            Err(errors) => {
                tracing::debug!(step = current.step, failures = errors.len(), "Step validation failed");
                return Ok(StepOutcome::Invalid(errors));
            }
        };

        let mut next = current.clone();
        for field in schema.fields() {
            next.draft.clear(field);
        }
        next.draft.merge(&normalized)?;

        if usize::from(current.step) >= self.steps.len() {
            self.commit(next).await?;
            return self.submit_full().await;
        }

        let next = reduce(&next, Transition::Advance, self.steps.len());
        let step = next.step;
        self.commit(next).await?;
        tracing::debug!(step, "Step submitted");
        Ok(StepOutcome::Advanced { step })
    }

    /// Re-validate the stored draft against the full schema and hand it to
    /// the submission endpoint.
    pub async fn submit_full_record(&self) -> Result<StepOutcome, WizardError> {
        self.ensure_loaded()?;
        let _guard = InFlight::acquire(&self.in_flight)?;
        self.submit_full().await
    }

    async fn submit_full(&self) -> Result<StepOutcome, WizardError> {
        let current = self.current();
        let record = match self.validator.validate(Schema::Full, &current.draft.to_record()).await {
            Ok(record) => record,
            Err(errors) => {
                let Some(redirect) = redirect_for(&errors) else {
                    return Ok(StepOutcome::Invalid(errors));
                };
                tracing::warn!(
                    step = redirect.step,
                    failures = errors.len(),
                    "Stored record failed full validation, redirecting"
                );
                let next = reduce(&current, Transition::JumpTo(redirect.step), self.steps.len());
                self.commit(next).await?;
                return Ok(StepOutcome::Redirected(redirect));
            }
        };

        let account = NewAccount::from_record(record)?;
        match self.client.submit(&account).await {
            Ok(created) => {
                tracing::info!(account_id = created.id, "Account submitted");
                if let Err(e) = self.commit(WizardState::default()).await {
                    tracing::error!(
                        account_id = created.id,
                        error = %e,
                        "Failed to persist the reset wizard after submission"
                    );
                    *self.lock() = WizardState::default();
                }
                Ok(StepOutcome::Submitted(created))
            }
            Err(e) => {
                tracing::error!(category = e.category().as_str(), error = %e, "Account submission failed");
                Ok(StepOutcome::Rejected(e))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn ensure_loaded(&self) -> Result<(), WizardError> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(WizardError::NotLoaded)
        }
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> WizardState {
        self.lock().clone()
    }

    /// Persist the state, then make it current. A failed write leaves the
    /// current state untouched.
    async fn commit(&self, next: WizardState) -> Result<WizardState, WizardError> {
        persist::save(self.store.as_ref(), &next).await?;
        *self.lock() = next.clone();
        Ok(next)
    }
}

/// Holds the in-flight flag for the lifetime of one submission.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, WizardError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WizardError::SubmissionInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_flag_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = InFlight::acquire(&flag).unwrap();
        assert!(matches!(InFlight::acquire(&flag), Err(WizardError::SubmissionInFlight)));
        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlight::acquire(&flag).is_ok());
    }

    #[tokio::test]
    async fn from_config_uses_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = WizardConfig {
            store_dir: dir.path().to_path_buf(),
            include_review_step: false,
            ..WizardConfig::default()
        };
        let machine = WizardMachine::from_config(&config).unwrap();
        assert_eq!(machine.steps().len(), 2);

        machine.rehydrate().await.unwrap();
        machine.advance().await.unwrap();
        let stored = std::fs::read_to_string(dir.path().join("signup-newAccountData.json")).unwrap();
        assert_eq!(stored, r#"{"draft":{},"step":2}"#);
    }

    #[tokio::test]
    async fn rehydrate_recovers_from_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signup-newAccountData.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
        let config = WizardConfig {
            store_dir: dir.path().to_path_buf(),
            ..WizardConfig::default()
        };
        let machine = WizardMachine::from_config(&config).unwrap();

        assert_eq!(machine.rehydrate().await.unwrap(), WizardState::default());
        assert!(machine.is_loaded());
        assert_eq!(machine.advance().await.unwrap().step, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"draft":{},"step":2}"#);
    }
}
