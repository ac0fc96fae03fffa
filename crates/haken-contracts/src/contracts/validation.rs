use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Machine-readable violation codes, serialized in SCREAMING_SNAKE_CASE for API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    ExceedsConflictDate,
    EmployeeDoubleBooked,
    RequiredFieldMissing,
    FieldTooShort,
    OptionalFieldMissing,
    IncompleteContactInfo,
    InvalidValue,
    DurationExceedsLimit,
    LongDuration,
    HighDailyOvertime,
    ExceedsMonthlyOvertime,
    LowOvertimeRate,
    LowHourlyRate,
    ExpiredContractActive,
    ContractExpiring,
    ConflictDatePassed,
    ConflictDateApproaching,
}

impl ViolationCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ViolationCode::ExceedsConflictDate => "EXCEEDS_CONFLICT_DATE",
            ViolationCode::EmployeeDoubleBooked => "EMPLOYEE_DOUBLE_BOOKED",
            ViolationCode::RequiredFieldMissing => "REQUIRED_FIELD_MISSING",
            ViolationCode::FieldTooShort => "FIELD_TOO_SHORT",
            ViolationCode::OptionalFieldMissing => "OPTIONAL_FIELD_MISSING",
            ViolationCode::IncompleteContactInfo => "INCOMPLETE_CONTACT_INFO",
            ViolationCode::InvalidValue => "INVALID_VALUE",
            ViolationCode::DurationExceedsLimit => "DURATION_EXCEEDS_LIMIT",
            ViolationCode::LongDuration => "LONG_DURATION",
            ViolationCode::HighDailyOvertime => "HIGH_DAILY_OVERTIME",
            ViolationCode::ExceedsMonthlyOvertime => "EXCEEDS_MONTHLY_OVERTIME",
            ViolationCode::LowOvertimeRate => "LOW_OVERTIME_RATE",
            ViolationCode::LowHourlyRate => "LOW_HOURLY_RATE",
            ViolationCode::ExpiredContractActive => "EXPIRED_CONTRACT_ACTIVE",
            ViolationCode::ContractExpiring => "CONTRACT_EXPIRING",
            ViolationCode::ConflictDatePassed => "CONFLICT_DATE_PASSED",
            ViolationCode::ConflictDateApproaching => "CONFLICT_DATE_APPROACHING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
    pub severity: Severity,
}

impl Violation {
    pub fn error(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Ordered violations plus the derived verdict.
///
/// `valid` is recomputed on every insertion so it is false exactly when an error-severity
/// violation is present; warnings alone never invalidate a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    violations: Vec<Violation>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::passed()
    }
}

impl ValidationResult {
    pub fn passed() -> Self {
        Self {
            valid: true,
            violations: Vec::new(),
        }
    }

    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let mut result = Self::passed();
        for violation in violations {
            result.push(violation);
        }
        result
    }

    pub fn push(&mut self, violation: Violation) {
        if violation.is_error() {
            self.valid = false;
        }
        self.violations.push(violation);
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for violation in other.violations {
            self.push(violation);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|violation| violation.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.severity == Severity::Warning)
    }

    pub fn has_code(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|violation| violation.code == code)
    }

    /// Ten points per error and two per warning.
    pub fn penalty(&self) -> u32 {
        self.violations
            .iter()
            .map(|violation| match violation.severity {
                Severity::Error => 10,
                Severity::Warning => 2,
            })
            .sum()
    }

    /// Score from 0 to 100 with every penalty taken off a full score.
    pub fn compliance_score(&self) -> u8 {
        100u32.saturating_sub(self.penalty()) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_invalidate() {
        let mut result = ValidationResult::passed();
        result.push(Violation::warning(ViolationCode::LongDuration, "long"));
        assert!(result.is_valid());
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.compliance_score(), 98);
    }

    #[test]
    fn any_error_invalidates_even_after_merge() {
        let mut result = ValidationResult::passed();
        let other = ValidationResult::from_violations(vec![
            Violation::warning(ViolationCode::LowHourlyRate, "low"),
            Violation::error(ViolationCode::ExceedsConflictDate, "late"),
        ]);
        result.merge(other);

        assert!(!result.is_valid());
        assert_eq!(result.errors().count(), 1);
        assert!(result.has_code(ViolationCode::ExceedsConflictDate));
        assert_eq!(result.violations()[0].code, ViolationCode::LowHourlyRate);
    }

    #[test]
    fn codes_serialize_in_screaming_snake_case() {
        let violation = Violation::error(ViolationCode::EmployeeDoubleBooked, "double");
        let json = serde_json::to_value(&violation).expect("serializes");
        assert_eq!(json["code"], "EMPLOYEE_DOUBLE_BOOKED");
        assert_eq!(json["severity"], "error");
        assert_eq!(
            ViolationCode::EmployeeDoubleBooked.as_str(),
            json["code"].as_str().expect("string code")
        );
    }

    #[test]
    fn score_floors_at_zero() {
        let result = ValidationResult::from_violations(
            (0..12)
                .map(|_| Violation::error(ViolationCode::RequiredFieldMissing, "missing"))
                .collect(),
        );
        assert_eq!(result.compliance_score(), 0);
    }
}
