//! Domain core for the account signup wizard.
//!
//! Holds the account record types, the field rule table and its evaluator,
//! the cross-field rules (adult age, fiscal code registry lookup), the named
//! schemas built from them, and the pure wizard step reducer. Nothing here
//! touches storage or the network except through the pluggable
//! [`validation::fiscal_code::FiscalCodeRegistry`] trait.

pub mod account;
pub mod error;
pub mod types;
pub mod validation;
pub mod wizard;
