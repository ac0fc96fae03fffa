use serde::Serialize;

use super::conflict::ConflictDateChecker;
use super::domain::{ConflictCeiling, ContractDraft, ContractSnapshot, DateRange};
use super::overlap::OverlapDetector;
use super::policy::ValidationPolicy;
use super::renewal::{RenewalChainBuilder, RenewalError};
use super::terms::{ContractTerms, TermsChecker, TermsReport};
use super::validation::ValidationResult;

/// Renewal draft together with the date checks it was run through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalOutcome {
    pub draft: ContractDraft,
    pub validation: ValidationResult,
}

impl RenewalOutcome {
    pub fn is_committable(&self) -> bool {
        self.validation.is_valid()
    }
}

/// Runs the date checks in order: conflict date first, then employee overlap.
///
/// A failing step short-circuits; the returned result carries every violation from the steps
/// that ran. The validator holds no state between calls and is safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct ContractValidator {
    conflict: ConflictDateChecker,
    overlap: OverlapDetector,
    renewal: RenewalChainBuilder,
    terms: TermsChecker,
}

impl ContractValidator {
    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self {
            terms: TermsChecker::with_policy(policy),
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        self.terms.policy()
    }

    pub fn renewal_builder(&self) -> &RenewalChainBuilder {
        &self.renewal
    }

    /// `existing` must come from one consistent read; staleness is the caller's concern.
    pub fn validate_creation(
        &self,
        candidate: &ContractSnapshot,
        ceiling: &ConflictCeiling,
        existing: &[ContractSnapshot],
    ) -> ValidationResult {
        let mut result = self.conflict.check(&candidate.date_range, ceiling);
        if !result.is_valid() {
            return result;
        }

        result.merge(self.overlap.detect(candidate, existing));
        result
    }

    /// Builds the renewal draft and re-validates it before it may be persisted.
    ///
    /// Structural failures (non-active predecessor, retroactive start) come back as
    /// `Err`; date violations of an otherwise well-formed draft come back inside the outcome.
    pub fn validate_renewal(
        &self,
        previous: &ContractSnapshot,
        new_range: DateRange,
        ceiling: &ConflictCeiling,
        existing: &[ContractSnapshot],
    ) -> Result<RenewalOutcome, RenewalError> {
        let draft = self.renewal.build_renewal(previous, new_range)?;
        let validation = self.validate_creation(&draft.as_candidate(), ceiling, existing);
        Ok(RenewalOutcome { draft, validation })
    }

    pub fn validate_terms(&self, terms: &ContractTerms) -> TermsReport {
        self.terms.check(terms)
    }
}
