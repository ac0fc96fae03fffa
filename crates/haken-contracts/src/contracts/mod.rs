//! Dispatch contract validation: conflict date, employee overlap, and renewal lineage.
//!
//! The checkers are pure functions over caller-supplied snapshots. [`ContractValidator`]
//! orders them, [`ContractService`] binds them to a [`ContractRepository`], and
//! [`contract_router`] exposes the service over HTTP.

pub mod audit;
pub mod conflict;
pub mod domain;
pub mod overlap;
pub(crate) mod policy;
pub mod renewal;
pub mod repository;
pub mod router;
pub mod service;
pub mod terms;
pub mod validation;
pub mod validator;

#[cfg(test)]
mod tests;

pub use audit::{AuditFinding, AuditReport, AuditSubject, ContractAudit, FactorySnapshot};
pub use conflict::ConflictDateChecker;
pub use domain::{
    ConflictCeiling, ContractDraft, ContractId, ContractSnapshot, ContractStatus, DateRange,
    EmployeeId, FactoryId, InvalidRangeError, LineId,
};
pub use overlap::OverlapDetector;
pub use policy::ValidationPolicy;
pub use renewal::{RenewalChainBuilder, RenewalError, RenewalErrorCode, RenewalLink};
pub use repository::{ContractRepository, RepositoryError};
pub use router::contract_router;
pub use service::{ContractService, ContractServiceError, NewContract, RenewalReceipt};
pub use terms::{ContactPerson, ContractTerms, LegalField, TermsChecker, TermsReport};
pub use validation::{Severity, ValidationResult, Violation, ViolationCode};
pub use validator::{ContractValidator, RenewalOutcome};
