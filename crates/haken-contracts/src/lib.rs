//! Validation core for labor dispatch contracts (個別契約書).
//!
//! The [`contracts`] module holds the pure checkers (conflict date, employee overlap,
//! renewal lineage, statutory terms) and the service facade that wires them to a
//! [`contracts::ContractRepository`]. Configuration, telemetry, and the application error
//! type live alongside so the API service can share them.

pub mod config;
pub mod contracts;
pub mod error;
pub mod telemetry;
