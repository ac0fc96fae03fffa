use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::contracts::audit::FactorySnapshot;
use crate::contracts::domain::{
    ConflictCeiling, ContractDraft, ContractId, ContractSnapshot, ContractStatus, DateRange,
    EmployeeId, FactoryId,
};
use crate::contracts::repository::{ContractRepository, RepositoryError};
use crate::contracts::service::{ContractService, NewContract};
use crate::contracts::validator::ContractValidator;

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).expect("valid range")
}

pub(super) fn employees(ids: &[&str]) -> BTreeSet<EmployeeId> {
    ids.iter().map(|id| EmployeeId(id.to_string())).collect()
}

pub(super) fn snapshot(
    id: u64,
    ids: &[&str],
    dates: DateRange,
    status: ContractStatus,
) -> ContractSnapshot {
    ContractSnapshot {
        id: ContractId(id),
        factory_id: FactoryId(1),
        employee_ids: employees(ids),
        line_id: None,
        date_range: dates,
        status,
        previous_contract_id: None,
    }
}

pub(super) fn new_contract(ids: &[&str], dates: DateRange) -> NewContract {
    NewContract {
        factory_id: FactoryId(1),
        employee_ids: employees(ids),
        line_id: None,
        date_range: dates,
    }
}

#[derive(Default)]
struct MemoryState {
    contracts: BTreeMap<ContractId, ContractSnapshot>,
    factories: BTreeMap<FactoryId, FactorySnapshot>,
    next_id: u64,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub(super) fn with_factory(conflict_date: Option<NaiveDate>) -> Self {
        let repository = Self::default();
        repository.register_factory(FactorySnapshot {
            id: FactoryId(1),
            name: "岡崎工場".to_string(),
            ceiling: ConflictCeiling { conflict_date },
        });
        repository
    }

    pub(super) fn register_factory(&self, factory: FactorySnapshot) {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state.factories.insert(factory.id, factory);
    }

    /// Seeds a stored contract with a fixed id, bypassing validation.
    pub(super) fn seed(&self, contract: ContractSnapshot) {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state.next_id = state.next_id.max(contract.id.0);
        state.contracts.insert(contract.id, contract);
    }
}

impl ContractRepository for MemoryRepository {
    fn fetch(&self, id: ContractId) -> Result<Option<ContractSnapshot>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.contracts.get(&id).cloned())
    }

    fn ceiling_for(&self, factory_id: FactoryId) -> Result<ConflictCeiling, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        state
            .factories
            .get(&factory_id)
            .map(|factory| factory.ceiling)
            .ok_or(RepositoryError::UnknownFactory(factory_id))
    }

    fn contracts_for_employees(
        &self,
        employees: &BTreeSet<EmployeeId>,
    ) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state
            .contracts
            .values()
            .filter(|contract| !contract.employee_ids.is_disjoint(employees))
            .cloned()
            .collect())
    }

    fn insert(&self, draft: ContractDraft) -> Result<ContractSnapshot, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        state.next_id += 1;
        let stored = draft.into_snapshot(ContractId(state.next_id));
        state.contracts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let contract = state
            .contracts
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        contract.status = status;
        Ok(())
    }

    fn commit_renewal(
        &self,
        draft: ContractDraft,
        previous_id: ContractId,
    ) -> Result<ContractSnapshot, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let previous = state
            .contracts
            .get_mut(&previous_id)
            .ok_or(RepositoryError::NotFound)?;
        previous.status = ContractStatus::Renewed;
        state.next_id += 1;
        let stored = draft.into_snapshot(ContractId(state.next_id));
        state.contracts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn all(&self) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.contracts.values().cloned().collect())
    }

    fn factories(&self) -> Result<Vec<FactorySnapshot>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state.factories.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl ContractRepository for UnavailableRepository {
    fn fetch(&self, _id: ContractId) -> Result<Option<ContractSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn ceiling_for(&self, _factory_id: FactoryId) -> Result<ConflictCeiling, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn contracts_for_employees(
        &self,
        _employees: &BTreeSet<EmployeeId>,
    ) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _draft: ContractDraft) -> Result<ContractSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_status(&self, _id: ContractId, _status: ContractStatus) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit_renewal(
        &self,
        _draft: ContractDraft,
        _previous_id: ContractId,
    ) -> Result<ContractSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn factories(&self) -> Result<Vec<FactorySnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Memory repository whose next renewal commit fails without writing anything.
pub(super) struct FlakyCommitRepository {
    inner: MemoryRepository,
    fail_next_commit: AtomicBool,
}

impl FlakyCommitRepository {
    pub(super) fn failing_once(inner: MemoryRepository) -> Self {
        Self {
            inner,
            fail_next_commit: AtomicBool::new(true),
        }
    }
}

impl ContractRepository for FlakyCommitRepository {
    fn fetch(&self, id: ContractId) -> Result<Option<ContractSnapshot>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn ceiling_for(&self, factory_id: FactoryId) -> Result<ConflictCeiling, RepositoryError> {
        self.inner.ceiling_for(factory_id)
    }

    fn contracts_for_employees(
        &self,
        employees: &BTreeSet<EmployeeId>,
    ) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        self.inner.contracts_for_employees(employees)
    }

    fn insert(&self, draft: ContractDraft) -> Result<ContractSnapshot, RepositoryError> {
        self.inner.insert(draft)
    }

    fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<(), RepositoryError> {
        self.inner.set_status(id, status)
    }

    fn commit_renewal(
        &self,
        draft: ContractDraft,
        previous_id: ContractId,
    ) -> Result<ContractSnapshot, RepositoryError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner.commit_renewal(draft, previous_id)
    }

    fn all(&self) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        self.inner.all()
    }

    fn factories(&self) -> Result<Vec<FactorySnapshot>, RepositoryError> {
        self.inner.factories()
    }
}

pub(super) fn service(repository: MemoryRepository) -> ContractService<MemoryRepository> {
    ContractService::new(Arc::new(repository), ContractValidator::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
