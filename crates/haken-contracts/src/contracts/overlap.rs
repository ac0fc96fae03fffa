use super::domain::ContractSnapshot;
use super::validation::{ValidationResult, Violation, ViolationCode};

/// Flags employees that would be dispatched under two live contracts on the same day.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapDetector;

impl OverlapDetector {
    /// Emits one violation per conflicting contract, in the order `existing` was supplied.
    pub fn detect(
        &self,
        candidate: &ContractSnapshot,
        existing: &[ContractSnapshot],
    ) -> ValidationResult {
        let mut result = ValidationResult::passed();

        for other in existing {
            if !self.is_comparable(candidate, other) {
                continue;
            }

            let shared = candidate.shared_employees(other);
            if shared.is_empty() {
                continue;
            }

            let Some(window) = candidate.date_range.intersection(&other.date_range) else {
                continue;
            };

            let employees = shared
                .iter()
                .map(|employee| employee.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            result.push(Violation::error(
                ViolationCode::EmployeeDoubleBooked,
                format!(
                    "contract {} ({}) already dispatches employee(s) {} during {}",
                    other.id,
                    other.status.label(),
                    employees,
                    window
                ),
            ));
        }

        result
    }

    fn is_comparable(&self, candidate: &ContractSnapshot, other: &ContractSnapshot) -> bool {
        if !other.status.blocks_assignment() {
            return false;
        }
        // A renewal may share its hand-over day with the predecessor.
        if candidate.previous_contract_id == Some(other.id) {
            return false;
        }
        // Re-validating a stored contract must not collide with its own row.
        !(candidate.id.is_assigned() && candidate.id == other.id)
    }
}
