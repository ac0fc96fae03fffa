use chrono::NaiveDate;

use super::domain::{ConflictCeiling, DateRange, InvalidRangeError};
use super::validation::{ValidationResult, Violation, ViolationCode};

/// Checks a proposed dispatch period against the factory's conflict date (抵触日).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDateChecker;

impl ConflictDateChecker {
    pub fn check(&self, proposed: &DateRange, ceiling: &ConflictCeiling) -> ValidationResult {
        let mut result = ValidationResult::passed();

        let Some(conflict_date) = ceiling.conflict_date else {
            return result;
        };

        // The conflict date itself is still a lawful last day of dispatch.
        if proposed.end() > conflict_date {
            result.push(Violation::error(
                ViolationCode::ExceedsConflictDate,
                format!(
                    "dispatch end date {} is after the factory conflict date {}",
                    proposed.end(),
                    conflict_date
                ),
            ));
        }

        result
    }

    /// Entry point for callers holding unvalidated dates.
    pub fn check_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        ceiling: &ConflictCeiling,
    ) -> Result<ValidationResult, InvalidRangeError> {
        let proposed = DateRange::new(start, end)?;
        Ok(self.check(&proposed, ceiling))
    }
}
