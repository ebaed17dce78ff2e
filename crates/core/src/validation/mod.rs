//! Account validation engine.
//!
//! A single rule table ([`rules::ACCOUNT_RULES`]) drives every binding: the
//! wizard's step schemas, the full-record gate before submission, the
//! server-side re-validation and the shape check for persisted drafts.

pub mod age;
pub mod country;
pub mod evaluator;
pub mod fiscal_code;
pub mod rules;
pub mod schema;

pub use fiscal_code::{FiscalCodeRegistry, SimulatedRegistry};
pub use rules::FieldErrors;
pub use schema::{Schema, SchemaValidator};
