use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ConflictCeiling, ContractSnapshot, ContractStatus, FactoryId};
use super::policy::ValidationPolicy;
use super::validation::{Severity, Violation, ViolationCode};

/// Factory-level facts needed by the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorySnapshot {
    pub id: FactoryId,
    pub name: String,
    #[serde(default)]
    pub ceiling: ConflictCeiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum AuditSubject {
    Factory(u64),
    Contract(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFinding {
    pub subject: AuditSubject,
    #[serde(flatten)]
    pub violation: Violation,
    /// Signed distance from `as_of` to the relevant date; negative once it has passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub as_of: NaiveDate,
    pub contracts_audited: usize,
    pub factories_audited: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_compliant(&self) -> bool {
        self.findings
            .iter()
            .all(|finding| finding.violation.severity != Severity::Error)
    }

    pub fn count(&self, code: ViolationCode) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.violation.code == code)
            .count()
    }
}

/// Point-in-time sweep over stored contracts and factories.
///
/// Everything is measured against the caller-supplied `as_of` date; the audit never reads the
/// system clock.
#[derive(Debug, Clone, Default)]
pub struct ContractAudit {
    policy: ValidationPolicy,
}

impl ContractAudit {
    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn run(
        &self,
        as_of: NaiveDate,
        factories: &[FactorySnapshot],
        contracts: &[ContractSnapshot],
    ) -> AuditReport {
        let mut findings = Vec::new();

        for factory in factories {
            self.audit_factory(as_of, factory, &mut findings);
        }
        for contract in contracts {
            self.audit_contract(as_of, contract, &mut findings);
        }

        AuditReport {
            as_of,
            contracts_audited: contracts.len(),
            factories_audited: factories.len(),
            findings,
        }
    }

    fn audit_factory(
        &self,
        as_of: NaiveDate,
        factory: &FactorySnapshot,
        findings: &mut Vec<AuditFinding>,
    ) {
        let Some(conflict_date) = factory.ceiling.conflict_date else {
            return;
        };
        let days_until = (conflict_date - as_of).num_days();
        let subject = AuditSubject::Factory(factory.id.0);

        if days_until < 0 {
            findings.push(AuditFinding {
                subject,
                violation: Violation::error(
                    ViolationCode::ConflictDatePassed,
                    format!(
                        "{}: conflict date {conflict_date} has passed; end the dispatch or set a new conflict date",
                        factory.name
                    ),
                ),
                days_remaining: Some(days_until),
            });
        } else if days_until <= self.policy.horizon_days() {
            findings.push(AuditFinding {
                subject,
                violation: Violation::warning(
                    ViolationCode::ConflictDateApproaching,
                    format!(
                        "{}: conflict date {conflict_date} is {days_until} day(s) away",
                        factory.name
                    ),
                ),
                days_remaining: Some(days_until),
            });
        }
    }

    fn audit_contract(
        &self,
        as_of: NaiveDate,
        contract: &ContractSnapshot,
        findings: &mut Vec<AuditFinding>,
    ) {
        if contract.status != ContractStatus::Active {
            return;
        }
        let subject = AuditSubject::Contract(contract.id.0);
        let end = contract.date_range.end();
        let days_until = (end - as_of).num_days();

        if days_until < 0 {
            findings.push(AuditFinding {
                subject,
                violation: Violation::error(
                    ViolationCode::ExpiredContractActive,
                    format!(
                        "contract {} ended on {end} but is still active; renew it or mark it expired",
                        contract.id
                    ),
                ),
                days_remaining: Some(days_until),
            });
        } else if days_until <= self.policy.horizon_days() {
            findings.push(AuditFinding {
                subject,
                violation: Violation::warning(
                    ViolationCode::ContractExpiring,
                    format!(
                        "contract {} ends on {end}, {days_until} day(s) from {as_of}",
                        contract.id
                    ),
                ),
                days_remaining: Some(days_until),
            });
        }

        let span = contract.date_range.duration_days();
        if span > self.policy.dispatch_cap_days() {
            findings.push(AuditFinding {
                subject,
                violation: Violation::error(
                    ViolationCode::DurationExceedsLimit,
                    format!(
                        "contract {} spans {span} days, above the {} day limit",
                        contract.id, self.policy.max_dispatch_days
                    ),
                ),
                days_remaining: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::domain::{ContractId, DateRange, EmployeeId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn contract(id: u64, start: NaiveDate, end: NaiveDate, status: ContractStatus) -> ContractSnapshot {
        ContractSnapshot {
            id: ContractId(id),
            factory_id: FactoryId(1),
            employee_ids: [EmployeeId(format!("E{id}"))].into_iter().collect(),
            line_id: None,
            date_range: DateRange::new(start, end).expect("valid range"),
            status,
            previous_contract_id: None,
        }
    }

    fn factory(id: u64, conflict_date: Option<NaiveDate>) -> FactorySnapshot {
        FactorySnapshot {
            id: FactoryId(id),
            name: format!("Plant {id}"),
            ceiling: ConflictCeiling { conflict_date },
        }
    }

    #[test]
    fn flags_expired_and_expiring_contracts_relative_to_as_of() {
        let as_of = date(2025, 6, 1);
        let contracts = vec![
            contract(1, date(2025, 1, 1), date(2025, 5, 31), ContractStatus::Active),
            contract(2, date(2025, 1, 1), date(2025, 6, 20), ContractStatus::Active),
            contract(3, date(2025, 1, 1), date(2025, 12, 31), ContractStatus::Active),
            contract(4, date(2025, 1, 1), date(2025, 5, 1), ContractStatus::Expired),
        ];

        let report = ContractAudit::default().run(as_of, &[], &contracts);

        assert_eq!(report.contracts_audited, 4);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].subject, AuditSubject::Contract(1));
        assert_eq!(report.findings[0].violation.code, ViolationCode::ExpiredContractActive);
        assert_eq!(report.findings[0].days_remaining, Some(-1));
        assert_eq!(report.findings[1].violation.code, ViolationCode::ContractExpiring);
        assert_eq!(report.findings[1].days_remaining, Some(19));
        assert!(!report.is_compliant());
    }

    #[test]
    fn flags_factory_conflict_dates() {
        let as_of = date(2025, 6, 1);
        let factories = vec![
            factory(1, Some(date(2025, 5, 1))),
            factory(2, Some(date(2025, 6, 15))),
            factory(3, Some(date(2026, 1, 1))),
            factory(4, None),
        ];

        let report = ContractAudit::default().run(as_of, &factories, &[]);

        assert_eq!(report.count(ViolationCode::ConflictDatePassed), 1);
        assert_eq!(report.count(ViolationCode::ConflictDateApproaching), 1);
        assert_eq!(report.findings[0].subject, AuditSubject::Factory(1));
        assert_eq!(report.findings[1].days_remaining, Some(14));
    }

    #[test]
    fn reports_depend_only_on_as_of() {
        let contracts = vec![contract(1, date(2025, 1, 1), date(2025, 6, 30), ContractStatus::Active)];
        let audit = ContractAudit::default();

        let early = audit.run(date(2025, 1, 15), &[], &contracts);
        let late = audit.run(date(2025, 7, 15), &[], &contracts);

        assert!(early.is_compliant());
        assert!(early.findings.is_empty());
        assert_eq!(late.count(ViolationCode::ExpiredContractActive), 1);
        assert_eq!(audit.run(date(2025, 7, 15), &[], &contracts), late);
    }

    #[test]
    fn serializes_subject_and_flattened_violation() {
        let report = ContractAudit::default().run(
            date(2025, 6, 1),
            &[factory(9, Some(date(2025, 5, 1)))],
            &[],
        );
        let json = serde_json::to_value(&report).expect("serializes");
        let finding = &json["findings"][0];
        assert_eq!(finding["subject"]["entity"], "factory");
        assert_eq!(finding["subject"]["id"], 9);
        assert_eq!(finding["code"], "CONFLICT_DATE_PASSED");
        assert_eq!(finding["severity"], "error");
    }
}
