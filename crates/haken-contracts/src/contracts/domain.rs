use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persistence-assigned contract identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub u64);

impl ContractId {
    /// Placeholder carried by drafts that have not been persisted yet. Stored contracts start at 1.
    pub const UNASSIGNED: ContractId = ContractId(0);

    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactoryId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Production line inside a factory (配属ライン).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub String);

/// Raised when a date range is constructed with its end before its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("date range ends ({end}) before it starts ({start})")]
pub struct InvalidRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Inclusive calendar-day interval. `start <= end` holds for every value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = InvalidRangeError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRangeError> {
        if start > end {
            return Err(InvalidRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both bounds are inclusive: ranges sharing a single calendar day overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(DateRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Elapsed days between the bounds (a single-day range has zero).
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Statutory conflict date (抵触日) configured for a factory; `None` means no ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictCeiling {
    pub conflict_date: Option<NaiveDate>,
}

impl ConflictCeiling {
    pub const fn none() -> Self {
        Self {
            conflict_date: None,
        }
    }

    pub const fn at(date: NaiveDate) -> Self {
        Self {
            conflict_date: Some(date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Active,
    Expired,
    Renewed,
    Terminated,
}

impl ContractStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Active => "active",
            ContractStatus::Expired => "expired",
            ContractStatus::Renewed => "renewed",
            ContractStatus::Terminated => "terminated",
        }
    }

    /// Whether a contract in this state still holds its employees for the covered days.
    pub const fn blocks_assignment(self) -> bool {
        matches!(self, ContractStatus::Active | ContractStatus::Draft)
    }
}

/// Read-only projection of a stored contract, sufficient for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub id: ContractId,
    pub factory_id: FactoryId,
    pub employee_ids: BTreeSet<EmployeeId>,
    #[serde(default)]
    pub line_id: Option<LineId>,
    pub date_range: DateRange,
    pub status: ContractStatus,
    #[serde(default)]
    pub previous_contract_id: Option<ContractId>,
}

impl ContractSnapshot {
    pub fn shared_employees<'a>(&'a self, other: &'a ContractSnapshot) -> Vec<&'a EmployeeId> {
        self.employee_ids.intersection(&other.employee_ids).collect()
    }
}

/// Unpersisted contract version produced by a renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDraft {
    pub factory_id: FactoryId,
    pub employee_ids: BTreeSet<EmployeeId>,
    pub line_id: Option<LineId>,
    pub date_range: DateRange,
    pub status: ContractStatus,
    pub previous_contract_id: Option<ContractId>,
}

impl ContractDraft {
    /// Snapshot view used to run the draft back through the date checks before commit.
    pub fn as_candidate(&self) -> ContractSnapshot {
        self.clone().into_snapshot(ContractId::UNASSIGNED)
    }

    pub fn into_snapshot(self, id: ContractId) -> ContractSnapshot {
        ContractSnapshot {
            id,
            factory_id: self.factory_id,
            employee_ids: self.employee_ids,
            line_id: self.line_id,
            date_range: self.date_range,
            status: self.status,
            previous_contract_id: self.previous_contract_id,
        }
    }
}
