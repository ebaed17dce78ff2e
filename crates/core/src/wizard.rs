//! Signup wizard steps and the pure step reducer.
//!
//! Defines the step list, the persisted wizard state, bounded transitions and
//! the redirect policy applied when the full-record gate fails. The runtime
//! that persists state and talks to the submission endpoint lives in the
//! `signup-wizard` crate.

use serde::{Deserialize, Serialize};

use crate::account::AccountDraft;
use crate::error::CoreError;
use crate::validation::{FieldErrors, Schema};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The steps of the signup wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    AccountDetails,
    AddressDetails,
    Review,
}

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// A step as shown in the step navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDefinition {
    pub id: u8,
    pub title: &'static str,
}

const STEP_DEFINITIONS: [StepDefinition; 3] = [
    StepDefinition { id: 1, title: "Account details" },
    StepDefinition { id: 2, title: "Address details" },
    StepDefinition { id: 3, title: "Review" },
];

/// The ordered step list. The review step is environment-dependent.
pub fn step_definitions(include_review: bool) -> &'static [StepDefinition] {
    if include_review {
        &STEP_DEFINITIONS
    } else {
        &STEP_DEFINITIONS[..2]
    }
}

impl WizardStep {
    /// Convert a 1-based step number to a `WizardStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::AccountDetails),
            2 => Ok(Self::AddressDetails),
            3 => Ok(Self::Review),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and 3"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::AccountDetails => 1,
            Self::AddressDetails => 2,
            Self::Review => 3,
        }
    }

    /// The schema validating this step's form, if the step has one.
    pub fn schema(self) -> Option<Schema> {
        Schema::for_step(self.to_number())
    }
}

// ---------------------------------------------------------------------------
// State and transitions
// ---------------------------------------------------------------------------

/// The unit persisted after every mutation: the draft plus the step pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub draft: AccountDraft,
    pub step: u8,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            draft: AccountDraft::default(),
            step: MIN_STEP,
        }
    }
}

/// Step pointer changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance,
    Retreat,
    JumpTo(u8),
    /// Back to an empty draft on step 1.
    Reset,
}

/// Whether `step` lies within `[1, step_count]`.
pub fn is_valid_step(step: u8, step_count: usize) -> bool {
    step >= MIN_STEP && usize::from(step) <= step_count
}

/// Apply a transition. Every move is bounded to `[1, step_count]`; a move
/// that would leave that range returns the state unchanged.
pub fn reduce(state: &WizardState, transition: Transition, step_count: usize) -> WizardState {
    let target = match transition {
        Transition::Reset => return WizardState::default(),
        Transition::Advance => state.step.checked_add(1),
        Transition::Retreat => state.step.checked_sub(1),
        Transition::JumpTo(step) => Some(step),
    };

    match target {
        Some(step) if is_valid_step(step, step_count) => WizardState {
            draft: state.draft.clone(),
            step,
        },
        _ => state.clone(),
    }
}

// ---------------------------------------------------------------------------
// Redirect policy
// ---------------------------------------------------------------------------

/// Banner shown when the account details fail the full-record gate.
pub const ACCOUNT_DETAILS_ERROR: &str =
    "Please, there are some validation errors in the account details";

/// Banner shown when the address details fail the full-record gate.
pub const ADDRESS_DETAILS_ERROR: &str =
    "Please, there are some validation errors in the address details";

/// Where to send the user after a failed full-record validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub step: u8,
    pub message: &'static str,
}

/// The step owning the first failing field, with its step-level banner.
pub fn redirect_for(errors: &FieldErrors) -> Option<Redirect> {
    let (field, _) = errors.first()?;
    let redirect = match field.step() {
        1 => Redirect { step: 1, message: ACCOUNT_DETAILS_ERROR },
        _ => Redirect { step: 2, message: ADDRESS_DETAILS_ERROR },
    };
    Some(redirect)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
