use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::audit::{AuditReport, ContractAudit};
use super::domain::{
    ContractDraft, ContractId, ContractSnapshot, ContractStatus, DateRange, EmployeeId,
    FactoryId, LineId,
};
use super::renewal::{RenewalError, RenewalLink};
use super::repository::{ContractRepository, RepositoryError};
use super::validation::ValidationResult;
use super::validator::ContractValidator;

/// Request to register a new contract. New contracts always start as drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContract {
    pub factory_id: FactoryId,
    pub employee_ids: BTreeSet<EmployeeId>,
    #[serde(default)]
    pub line_id: Option<LineId>,
    pub date_range: DateRange,
}

impl NewContract {
    /// Unsaved view of the request, for dry-run validation.
    pub fn into_candidate(self) -> ContractSnapshot {
        self.into_draft().as_candidate()
    }

    fn into_draft(self) -> ContractDraft {
        ContractDraft {
            factory_id: self.factory_id,
            employee_ids: self.employee_ids,
            line_id: self.line_id,
            date_range: self.date_range,
            status: ContractStatus::Draft,
            previous_contract_id: None,
        }
    }
}

/// Result of a committed renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalReceipt {
    pub contract: ContractSnapshot,
    pub link: RenewalLink,
    pub validation: ValidationResult,
}

/// Facade composing the validator with a repository.
///
/// Reads and writes are not wrapped in a transaction here; a repository backed by a database
/// should serialise `create`/`renew`/`activate` per employee if concurrent writers are expected.
pub struct ContractService<R> {
    repository: Arc<R>,
    validator: Arc<ContractValidator>,
}

impl<R> ContractService<R>
where
    R: ContractRepository + 'static,
{
    pub fn new(repository: Arc<R>, validator: ContractValidator) -> Self {
        Self {
            repository,
            validator: Arc::new(validator),
        }
    }

    pub fn validator(&self) -> &ContractValidator {
        &self.validator
    }

    /// Validate and store a new draft contract.
    pub fn create(&self, request: NewContract) -> Result<ContractSnapshot, ContractServiceError> {
        let draft = request.into_draft();
        let ceiling = self.repository.ceiling_for(draft.factory_id)?;
        let existing = self
            .repository
            .contracts_for_employees(&draft.employee_ids)?;

        let result = self
            .validator
            .validate_creation(&draft.as_candidate(), &ceiling, &existing);
        if !result.is_valid() {
            warn!(
                factory = draft.factory_id.0,
                violations = result.violations().len(),
                "contract creation rejected"
            );
            return Err(ContractServiceError::Rejected(result));
        }

        let stored = self.repository.insert(draft)?;
        info!(contract = stored.id.0, range = %stored.date_range, "contract draft stored");
        Ok(stored)
    }

    /// Promote a draft to active after re-checking it against the current state.
    pub fn activate(&self, id: ContractId) -> Result<ContractSnapshot, ContractServiceError> {
        let mut contract = self.fetch_existing(id)?;
        if contract.status != ContractStatus::Draft {
            return Err(ContractServiceError::NotActivatable {
                id,
                status: contract.status,
            });
        }

        let ceiling = self.repository.ceiling_for(contract.factory_id)?;
        let existing = self
            .repository
            .contracts_for_employees(&contract.employee_ids)?;
        let result = self
            .validator
            .validate_creation(&contract, &ceiling, &existing);
        if !result.is_valid() {
            warn!(contract = id.0, "activation rejected");
            return Err(ContractServiceError::Rejected(result));
        }

        self.repository.set_status(id, ContractStatus::Active)?;
        contract.status = ContractStatus::Active;
        info!(contract = id.0, "contract activated");
        Ok(contract)
    }

    /// Renew an active contract: store the new draft and retire the predecessor.
    pub fn renew(
        &self,
        previous_id: ContractId,
        new_range: DateRange,
    ) -> Result<RenewalReceipt, ContractServiceError> {
        let previous = self.fetch_existing(previous_id)?;
        let ceiling = self.repository.ceiling_for(previous.factory_id)?;
        let existing = self
            .repository
            .contracts_for_employees(&previous.employee_ids)?;

        let outcome = self
            .validator
            .validate_renewal(&previous, new_range, &ceiling, &existing)?;
        if !outcome.is_committable() {
            warn!(
                contract = previous_id.0,
                violations = outcome.validation.violations().len(),
                "renewal rejected"
            );
            return Err(ContractServiceError::Rejected(outcome.validation));
        }

        let stored = self.repository.commit_renewal(outcome.draft, previous_id)?;
        let link = RenewalLink::between(&previous, &stored)?;

        info!(
            previous = previous_id.0,
            renewed = stored.id.0,
            range = %stored.date_range,
            "contract renewed"
        );

        Ok(RenewalReceipt {
            contract: stored,
            link,
            validation: outcome.validation,
        })
    }

    pub fn get(&self, id: ContractId) -> Result<ContractSnapshot, ContractServiceError> {
        self.fetch_existing(id)
    }

    /// Renewal chain of `id`, newest first.
    pub fn lineage(&self, id: ContractId) -> Result<Vec<ContractId>, ContractServiceError> {
        self.fetch_existing(id)?;
        let all = self.repository.all()?;
        Ok(self.validator.renewal_builder().lineage(id, &all))
    }

    pub fn audit(&self, as_of: NaiveDate) -> Result<AuditReport, ContractServiceError> {
        let factories = self.repository.factories()?;
        let contracts = self.repository.all()?;
        let audit = ContractAudit::with_policy(self.validator.policy().clone());
        Ok(audit.run(as_of, &factories, &contracts))
    }

    fn fetch_existing(&self, id: ContractId) -> Result<ContractSnapshot, ContractServiceError> {
        let contract = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(contract)
    }
}

/// Error raised by the contract service.
#[derive(Debug, thiserror::Error)]
pub enum ContractServiceError {
    #[error("contract rejected with {} violation(s)", .0.violations().len())]
    Rejected(ValidationResult),
    #[error("contract {id} is {}; only drafts can be activated", .status.label())]
    NotActivatable { id: ContractId, status: ContractStatus },
    #[error(transparent)]
    Renewal(#[from] RenewalError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
