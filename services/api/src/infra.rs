use chrono::NaiveDate;
use haken_contracts::contracts::{
    ConflictCeiling, ContractDraft, ContractId, ContractRepository, ContractSnapshot,
    ContractStatus, EmployeeId, FactoryId, FactorySnapshot, RepositoryError, ValidationPolicy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) policy: Arc<ValidationPolicy>,
}

/// Factories and contracts as exported by the dispatch back office.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContractBook {
    #[serde(default)]
    pub(crate) factories: Vec<FactorySnapshot>,
    #[serde(default)]
    pub(crate) contracts: Vec<ContractSnapshot>,
}

impl ContractBook {
    pub(crate) fn from_path(path: &Path) -> Result<Self, haken_contracts::error::AppError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Default)]
struct Ledger {
    contracts: BTreeMap<ContractId, ContractSnapshot>,
    factories: BTreeMap<FactoryId, FactorySnapshot>,
    last_id: u64,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryContractRepository {
    ledger: Arc<Mutex<Ledger>>,
}

impl InMemoryContractRepository {
    /// Loads a contract book, rejecting the draft placeholder id and repeated ids.
    pub(crate) fn from_book(book: ContractBook) -> Result<Self, RepositoryError> {
        let mut ledger = Ledger::default();
        for factory in book.factories {
            ledger.factories.insert(factory.id, factory);
        }
        for contract in book.contracts {
            if !contract.id.is_assigned() {
                return Err(RepositoryError::ReservedId(contract.id));
            }
            if ledger.contracts.contains_key(&contract.id) {
                return Err(RepositoryError::Conflict);
            }
            ledger.last_id = ledger.last_id.max(contract.id.0);
            ledger.contracts.insert(contract.id, contract);
        }
        Ok(Self {
            ledger: Arc::new(Mutex::new(ledger)),
        })
    }
}

impl ContractRepository for InMemoryContractRepository {
    fn fetch(&self, id: ContractId) -> Result<Option<ContractSnapshot>, RepositoryError> {
        let guard = self.ledger.lock().expect("repository mutex poisoned");
        Ok(guard.contracts.get(&id).cloned())
    }

    fn ceiling_for(&self, factory_id: FactoryId) -> Result<ConflictCeiling, RepositoryError> {
        let guard = self.ledger.lock().expect("repository mutex poisoned");
        guard
            .factories
            .get(&factory_id)
            .map(|factory| factory.ceiling)
            .ok_or(RepositoryError::UnknownFactory(factory_id))
    }

    fn contracts_for_employees(
        &self,
        employees: &BTreeSet<EmployeeId>,
    ) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        let guard = self.ledger.lock().expect("repository mutex poisoned");
        Ok(guard
            .contracts
            .values()
            .filter(|contract| !contract.employee_ids.is_disjoint(employees))
            .cloned()
            .collect())
    }

    fn insert(&self, draft: ContractDraft) -> Result<ContractSnapshot, RepositoryError> {
        let mut guard = self.ledger.lock().expect("repository mutex poisoned");
        guard.last_id += 1;
        let id = ContractId(guard.last_id);
        if guard.contracts.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        let stored = draft.into_snapshot(id);
        guard.contracts.insert(id, stored.clone());
        Ok(stored)
    }

    fn set_status(&self, id: ContractId, status: ContractStatus) -> Result<(), RepositoryError> {
        let mut guard = self.ledger.lock().expect("repository mutex poisoned");
        match guard.contracts.get_mut(&id) {
            Some(contract) => {
                contract.status = status;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn commit_renewal(
        &self,
        draft: ContractDraft,
        previous_id: ContractId,
    ) -> Result<ContractSnapshot, RepositoryError> {
        let mut guard = self.ledger.lock().expect("repository mutex poisoned");
        let id = ContractId(guard.last_id + 1);
        if guard.contracts.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        let previous = guard
            .contracts
            .get_mut(&previous_id)
            .ok_or(RepositoryError::NotFound)?;
        previous.status = ContractStatus::Renewed;
        guard.last_id = id.0;
        let stored = draft.into_snapshot(id);
        guard.contracts.insert(id, stored.clone());
        Ok(stored)
    }

    fn all(&self) -> Result<Vec<ContractSnapshot>, RepositoryError> {
        let guard = self.ledger.lock().expect("repository mutex poisoned");
        Ok(guard.contracts.values().cloned().collect())
    }

    fn factories(&self) -> Result<Vec<FactorySnapshot>, RepositoryError> {
        let guard = self.ledger.lock().expect("repository mutex poisoned");
        Ok(guard.factories.values().cloned().collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
