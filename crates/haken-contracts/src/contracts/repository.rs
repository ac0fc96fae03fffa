use std::collections::BTreeSet;

use super::audit::FactorySnapshot;
use super::domain::{
    ConflictCeiling, ContractDraft, ContractId, ContractSnapshot, ContractStatus, EmployeeId,
    FactoryId,
};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations own id allocation: `insert` assigns the next id (never
/// [`ContractId::UNASSIGNED`]) and returns the stored snapshot.
pub trait ContractRepository: Send + Sync {
    fn fetch(&self, id: ContractId) -> Result<Option<ContractSnapshot>, RepositoryError>;
    fn ceiling_for(&self, factory_id: FactoryId) -> Result<ConflictCeiling, RepositoryError>;
    fn contracts_for_employees(
        &self,
        employees: &BTreeSet<EmployeeId>,
    ) -> Result<Vec<ContractSnapshot>, RepositoryError>;
    fn insert(&self, draft: ContractDraft) -> Result<ContractSnapshot, RepositoryError>;
    fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<(), RepositoryError>;
    /// Stores the renewal draft and marks `previous_id` as renewed in one step.
    ///
    /// Either both writes land or neither does; a failure must leave the predecessor untouched
    /// and no successor stored.
    fn commit_renewal(
        &self,
        draft: ContractDraft,
        previous_id: ContractId,
    ) -> Result<ContractSnapshot, RepositoryError>;
    fn all(&self) -> Result<Vec<ContractSnapshot>, RepositoryError>;
    fn factories(&self) -> Result<Vec<FactorySnapshot>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("contract id {0} is reserved for unsaved drafts")]
    ReservedId(ContractId),
    #[error("record not found")]
    NotFound,
    #[error("factory {0:?} is not registered")]
    UnknownFactory(FactoryId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
