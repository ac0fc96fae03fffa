use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::domain::{ContractDraft, ContractId, ContractSnapshot, ContractStatus, DateRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenewalErrorCode {
    InvalidPreviousStatus,
    GapBeforePreviousEnd,
    BrokenLineage,
}

impl RenewalErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            RenewalErrorCode::InvalidPreviousStatus => "INVALID_PREVIOUS_STATUS",
            RenewalErrorCode::GapBeforePreviousEnd => "GAP_BEFORE_PREVIOUS_END",
            RenewalErrorCode::BrokenLineage => "BROKEN_LINEAGE",
        }
    }
}

/// Precondition failure while deriving or linking a renewal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {message}", .code.as_str())]
pub struct RenewalError {
    pub code: RenewalErrorCode,
    pub message: String,
}

impl RenewalError {
    fn new(code: RenewalErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Audit edge between a contract and the version that renewed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalLink {
    previous_id: ContractId,
    renewed_id: ContractId,
}

impl RenewalLink {
    pub fn between(
        previous: &ContractSnapshot,
        renewed: &ContractSnapshot,
    ) -> Result<Self, RenewalError> {
        if renewed.previous_contract_id != Some(previous.id) {
            return Err(RenewalError::new(
                RenewalErrorCode::BrokenLineage,
                format!(
                    "contract {} does not point back to contract {}",
                    renewed.id, previous.id
                ),
            ));
        }
        ensure_not_before(previous, &renewed.date_range)?;

        Ok(Self {
            previous_id: previous.id,
            renewed_id: renewed.id,
        })
    }

    pub fn previous_id(&self) -> ContractId {
        self.previous_id
    }

    pub fn renewed_id(&self) -> ContractId {
        self.renewed_id
    }
}

/// Derives the next contract version from an active predecessor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenewalChainBuilder;

impl RenewalChainBuilder {
    /// Does not touch `previous`; flipping it to `renewed` is left to the persistence layer.
    pub fn build_renewal(
        &self,
        previous: &ContractSnapshot,
        new_range: DateRange,
    ) -> Result<ContractDraft, RenewalError> {
        if previous.status != ContractStatus::Active {
            return Err(RenewalError::new(
                RenewalErrorCode::InvalidPreviousStatus,
                format!(
                    "contract {} is {} and only active contracts can be renewed",
                    previous.id,
                    previous.status.label()
                ),
            ));
        }
        ensure_not_before(previous, &new_range)?;

        Ok(ContractDraft {
            factory_id: previous.factory_id,
            employee_ids: previous.employee_ids.clone(),
            line_id: previous.line_id.clone(),
            date_range: new_range,
            status: ContractStatus::Draft,
            previous_contract_id: Some(previous.id),
        })
    }

    /// Ids from `contract_id` back to the oldest reachable ancestor, newest first.
    ///
    /// Stops at the first predecessor missing from `snapshots`. Ids are never revisited, so
    /// malformed input cannot loop.
    pub fn lineage(
        &self,
        contract_id: ContractId,
        snapshots: &[ContractSnapshot],
    ) -> Vec<ContractId> {
        let by_id: HashMap<ContractId, &ContractSnapshot> =
            snapshots.iter().map(|snapshot| (snapshot.id, snapshot)).collect();

        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut cursor = by_id.get(&contract_id).copied();

        while let Some(snapshot) = cursor {
            if !seen.insert(snapshot.id) {
                break;
            }
            chain.push(snapshot.id);
            cursor = snapshot
                .previous_contract_id
                .and_then(|previous| by_id.get(&previous).copied());
        }

        chain
    }
}

// Same-day hand-over is allowed; starting earlier would retroactively overlap.
fn ensure_not_before(previous: &ContractSnapshot, range: &DateRange) -> Result<(), RenewalError> {
    if range.start() < previous.date_range.end() {
        return Err(RenewalError::new(
            RenewalErrorCode::GapBeforePreviousEnd,
            format!(
                "renewal starting {} begins before contract {} ends on {}",
                range.start(),
                previous.id,
                previous.date_range.end()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::domain::{EmployeeId, FactoryId, LineId};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn previous(status: ContractStatus) -> ContractSnapshot {
        ContractSnapshot {
            id: ContractId(11),
            factory_id: FactoryId(3),
            employee_ids: [EmployeeId("E101".to_string())].into_iter().collect(),
            line_id: Some(LineId("press-2".to_string())),
            date_range: DateRange::new(date(2025, 1, 1), date(2025, 6, 30)).expect("valid"),
            status,
            previous_contract_id: None,
        }
    }

    #[test]
    fn renewal_carries_lineage_and_assignment() {
        let prior = previous(ContractStatus::Active);
        let new_range = DateRange::new(date(2025, 7, 1), date(2025, 12, 31)).expect("valid");

        let draft = RenewalChainBuilder
            .build_renewal(&prior, new_range)
            .expect("renewal succeeds");

        assert_eq!(draft.previous_contract_id, Some(ContractId(11)));
        assert_eq!(draft.status, ContractStatus::Draft);
        assert_eq!(draft.date_range, new_range);
        assert_eq!(draft.employee_ids, prior.employee_ids);
        assert_eq!(draft.line_id, prior.line_id);
        assert_eq!(prior.status, ContractStatus::Active);
    }

    #[test]
    fn same_day_hand_over_is_allowed() {
        let prior = previous(ContractStatus::Active);
        let new_range = DateRange::new(date(2025, 6, 30), date(2025, 9, 30)).expect("valid");
        assert!(RenewalChainBuilder.build_renewal(&prior, new_range).is_ok());
    }

    #[test]
    fn draft_predecessor_is_rejected() {
        let prior = previous(ContractStatus::Draft);
        let new_range = DateRange::new(date(2025, 7, 1), date(2025, 12, 31)).expect("valid");

        let err = RenewalChainBuilder
            .build_renewal(&prior, new_range)
            .unwrap_err();
        assert_eq!(err.code, RenewalErrorCode::InvalidPreviousStatus);
        assert!(err.to_string().starts_with("INVALID_PREVIOUS_STATUS"));
    }

    #[test]
    fn retroactive_start_is_rejected() {
        let prior = previous(ContractStatus::Active);
        let new_range = DateRange::new(date(2025, 6, 29), date(2025, 12, 31)).expect("valid");

        let err = RenewalChainBuilder
            .build_renewal(&prior, new_range)
            .unwrap_err();
        assert_eq!(err.code, RenewalErrorCode::GapBeforePreviousEnd);
    }

    #[test]
    fn link_requires_back_pointer() {
        let prior = previous(ContractStatus::Renewed);
        let mut renewed = previous(ContractStatus::Draft);
        renewed.id = ContractId(12);
        renewed.date_range = DateRange::new(date(2025, 7, 1), date(2025, 12, 31)).expect("valid");

        let err = RenewalLink::between(&prior, &renewed).unwrap_err();
        assert_eq!(err.code, RenewalErrorCode::BrokenLineage);

        renewed.previous_contract_id = Some(prior.id);
        let link = RenewalLink::between(&prior, &renewed).expect("linked");
        assert_eq!(link.previous_id(), ContractId(11));
        assert_eq!(link.renewed_id(), ContractId(12));
    }

    #[test]
    fn lineage_walks_back_and_stops_on_cycles() {
        let mut first = previous(ContractStatus::Renewed);
        first.id = ContractId(1);
        let mut second = previous(ContractStatus::Renewed);
        second.id = ContractId(2);
        second.previous_contract_id = Some(ContractId(1));
        let mut third = previous(ContractStatus::Active);
        third.id = ContractId(3);
        third.previous_contract_id = Some(ContractId(2));

        let snapshots = vec![first.clone(), second.clone(), third];
        assert_eq!(
            RenewalChainBuilder.lineage(ContractId(3), &snapshots),
            vec![ContractId(3), ContractId(2), ContractId(1)]
        );

        first.previous_contract_id = Some(ContractId(2));
        let looped = vec![first, second];
        assert_eq!(
            RenewalChainBuilder.lineage(ContractId(2), &looped),
            vec![ContractId(2), ContractId(1)]
        );
        assert!(RenewalChainBuilder
            .lineage(ContractId(99), &looped)
            .is_empty());
    }
}
