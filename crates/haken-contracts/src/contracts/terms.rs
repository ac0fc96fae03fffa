//! Statutory content checks for a 個別契約書.
//!
//! 労働者派遣法第26条 lists sixteen items every individual dispatch contract must state.
//! [`TermsChecker`] verifies each of them and layers the period, overtime, and rate limits
//! from [`ValidationPolicy`] on top.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::domain::DateRange;
use super::policy::ValidationPolicy;
use super::validation::{ValidationResult, Violation, ViolationCode};

const OVERTIME_PREMIUM: f64 = 1.25;

/// Responsible person or complaint desk named in the contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactPerson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactPerson {
    fn is_identifiable(&self) -> bool {
        has_text(&self.name) || has_text(&self.department)
    }
}

/// Contract body as entered by the dispatcher. Every field is optional so incomplete drafts
/// can be checked and reported on rather than rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractTerms {
    pub work_content: Option<String>,
    pub responsibility_level: Option<String>,
    pub worksite_name: Option<String>,
    pub worksite_address: Option<String>,
    pub supervisor_name: Option<String>,
    pub work_days: Vec<String>,
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,
    pub break_time_minutes: Option<i32>,
    pub safety_measures: Option<String>,
    pub dispatcher_complaint_contact: Option<ContactPerson>,
    pub client_complaint_contact: Option<ContactPerson>,
    pub termination_measures: Option<String>,
    pub dispatcher_manager: Option<ContactPerson>,
    pub client_manager: Option<ContactPerson>,
    /// Yen per hour.
    pub hourly_rate: Option<f64>,
    pub overtime_rate: Option<f64>,
    pub dispatch_period: Option<DateRange>,
    pub overtime_max_hours_day: Option<f64>,
    pub overtime_max_hours_month: Option<f64>,
}

/// The sixteen items mandated by 労働者派遣法第26条.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalField {
    WorkContent,
    ResponsibilityLevel,
    WorksiteName,
    WorksiteAddress,
    SupervisorName,
    WorkDays,
    WorkStartTime,
    WorkEndTime,
    BreakTimeMinutes,
    SafetyMeasures,
    DispatcherComplaintContact,
    ClientComplaintContact,
    TerminationMeasures,
    DispatcherManager,
    ClientManager,
    HourlyRate,
}

enum FieldCheck {
    Valid,
    Flagged(Violation),
}

impl LegalField {
    pub const ALL: [LegalField; 16] = [
        LegalField::WorkContent,
        LegalField::ResponsibilityLevel,
        LegalField::WorksiteName,
        LegalField::WorksiteAddress,
        LegalField::SupervisorName,
        LegalField::WorkDays,
        LegalField::WorkStartTime,
        LegalField::WorkEndTime,
        LegalField::BreakTimeMinutes,
        LegalField::SafetyMeasures,
        LegalField::DispatcherComplaintContact,
        LegalField::ClientComplaintContact,
        LegalField::TerminationMeasures,
        LegalField::DispatcherManager,
        LegalField::ClientManager,
        LegalField::HourlyRate,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LegalField::WorkContent => "業務の内容",
            LegalField::ResponsibilityLevel => "責任の程度",
            LegalField::WorksiteName => "派遣先事業所名",
            LegalField::WorksiteAddress => "事業所住所",
            LegalField::SupervisorName => "指揮命令者",
            LegalField::WorkDays => "就業日",
            LegalField::WorkStartTime => "始業時刻",
            LegalField::WorkEndTime => "終業時刻",
            LegalField::BreakTimeMinutes => "休憩時間",
            LegalField::SafetyMeasures => "安全衛生",
            LegalField::DispatcherComplaintContact => "派遣元苦情処理担当",
            LegalField::ClientComplaintContact => "派遣先苦情処理担当",
            LegalField::TerminationMeasures => "契約解除の措置",
            LegalField::DispatcherManager => "派遣元責任者",
            LegalField::ClientManager => "派遣先責任者",
            LegalField::HourlyRate => "派遣料金",
        }
    }

    const fn min_length(self) -> usize {
        match self {
            LegalField::WorkContent | LegalField::WorksiteAddress => 5,
            LegalField::ResponsibilityLevel
            | LegalField::WorksiteName
            | LegalField::SupervisorName => 2,
            _ => 0,
        }
    }

    fn inspect(self, terms: &ContractTerms) -> FieldCheck {
        match self {
            LegalField::WorkContent => self.required_text(&terms.work_content),
            LegalField::ResponsibilityLevel => self.required_text(&terms.responsibility_level),
            LegalField::WorksiteName => self.required_text(&terms.worksite_name),
            LegalField::WorksiteAddress => self.required_text(&terms.worksite_address),
            LegalField::SupervisorName => self.required_text(&terms.supervisor_name),
            LegalField::WorkDays => {
                if terms.work_days.iter().any(|day| !day.trim().is_empty()) {
                    FieldCheck::Valid
                } else {
                    self.missing()
                }
            }
            LegalField::WorkStartTime => self.present(terms.work_start_time.is_some()),
            LegalField::WorkEndTime => self.present(terms.work_end_time.is_some()),
            LegalField::BreakTimeMinutes => match terms.break_time_minutes {
                None => self.missing(),
                Some(minutes) if minutes < 0 => self.invalid(minutes),
                Some(_) => FieldCheck::Valid,
            },
            LegalField::SafetyMeasures => self.recommended_text(&terms.safety_measures),
            LegalField::TerminationMeasures => self.recommended_text(&terms.termination_measures),
            LegalField::DispatcherComplaintContact => {
                self.contact(&terms.dispatcher_complaint_contact)
            }
            LegalField::ClientComplaintContact => self.contact(&terms.client_complaint_contact),
            LegalField::DispatcherManager => self.contact(&terms.dispatcher_manager),
            LegalField::ClientManager => self.contact(&terms.client_manager),
            LegalField::HourlyRate => match terms.hourly_rate {
                None => self.missing(),
                Some(rate) if rate.is_nan() || rate <= 0.0 => self.invalid(rate),
                Some(_) => FieldCheck::Valid,
            },
        }
    }

    fn missing(self) -> FieldCheck {
        FieldCheck::Flagged(Violation::error(
            ViolationCode::RequiredFieldMissing,
            format!("{} is required (労働者派遣法第26条)", self.label()),
        ))
    }

    fn invalid(self, value: impl std::fmt::Display) -> FieldCheck {
        FieldCheck::Flagged(Violation::error(
            ViolationCode::InvalidValue,
            format!("{} must be a positive number, found {value}", self.label()),
        ))
    }

    fn present(self, present: bool) -> FieldCheck {
        if present {
            FieldCheck::Valid
        } else {
            self.missing()
        }
    }

    fn required_text(self, value: &Option<String>) -> FieldCheck {
        let Some(text) = value.as_deref().map(str::trim).filter(|text| !text.is_empty()) else {
            return self.missing();
        };

        let min_length = self.min_length();
        if text.chars().count() < min_length {
            return FieldCheck::Flagged(Violation::warning(
                ViolationCode::FieldTooShort,
                format!(
                    "{} is shorter than the recommended {min_length} characters",
                    self.label()
                ),
            ));
        }
        FieldCheck::Valid
    }

    fn recommended_text(self, value: &Option<String>) -> FieldCheck {
        if has_text(value) {
            FieldCheck::Valid
        } else {
            FieldCheck::Flagged(Violation::warning(
                ViolationCode::OptionalFieldMissing,
                format!("{} should be stated", self.label()),
            ))
        }
    }

    fn contact(self, value: &Option<ContactPerson>) -> FieldCheck {
        match value {
            None => self.missing(),
            Some(contact) if !contact.is_identifiable() => FieldCheck::Flagged(Violation::warning(
                ViolationCode::IncompleteContactInfo,
                format!("{} needs a name or department", self.label()),
            )),
            Some(_) => FieldCheck::Valid,
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|text| !text.trim().is_empty())
        .unwrap_or(false)
}

/// Outcome of a terms check, with per-field counters for the compliance dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermsReport {
    pub result: ValidationResult,
    pub fields_checked: u8,
    pub fields_valid: u8,
}

impl TermsReport {
    /// Share of valid statutory fields as a percentage, less the violation penalty.
    pub fn compliance_score(&self) -> u8 {
        if self.fields_checked == 0 {
            return 0;
        }
        let field_score = f64::from(self.fields_valid) / f64::from(self.fields_checked) * 100.0;
        (field_score - f64::from(self.result.penalty())).max(0.0) as u8
    }
}

#[derive(Debug, Clone)]
pub struct TermsChecker {
    policy: ValidationPolicy,
}

impl Default for TermsChecker {
    fn default() -> Self {
        Self::with_policy(ValidationPolicy::default())
    }
}

impl TermsChecker {
    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn check(&self, terms: &ContractTerms) -> TermsReport {
        let mut result = ValidationResult::passed();
        let mut fields_valid = 0;

        for field in LegalField::ALL {
            match field.inspect(terms) {
                FieldCheck::Valid => fields_valid += 1,
                FieldCheck::Flagged(violation) => result.push(violation),
            }
        }

        match &terms.dispatch_period {
            Some(period) => self.check_period(period, &mut result),
            None => result.push(Violation::error(
                ViolationCode::RequiredFieldMissing,
                "派遣期間 (dispatch period) is required",
            )),
        }
        self.check_overtime(terms, &mut result);
        self.check_rates(terms, &mut result);

        TermsReport {
            result,
            fields_checked: LegalField::ALL.len() as u8,
            fields_valid,
        }
    }

    /// Period length against 労働者派遣法第40条の2.
    pub fn check_period(&self, period: &DateRange, result: &mut ValidationResult) {
        let days = period.duration_days();
        if days > self.policy.dispatch_cap_days() {
            result.push(Violation::error(
                ViolationCode::DurationExceedsLimit,
                format!(
                    "dispatch period {period} spans {days} days, above the {} day limit (労働者派遣法第40条の2)",
                    self.policy.max_dispatch_days
                ),
            ));
        } else if days > 365 {
            result.push(Violation::warning(
                ViolationCode::LongDuration,
                format!("dispatch period {period} spans {days} days (about {} months)", days / 30),
            ));
        }
    }

    fn check_overtime(&self, terms: &ContractTerms, result: &mut ValidationResult) {
        if let Some(daily) = terms.overtime_max_hours_day {
            if daily > self.policy.daily_overtime_limit_hours {
                result.push(Violation::warning(
                    ViolationCode::HighDailyOvertime,
                    format!(
                        "daily overtime cap of {daily} hours exceeds the usual {} hours",
                        self.policy.daily_overtime_limit_hours
                    ),
                ));
            }
        }

        if let Some(monthly) = terms.overtime_max_hours_month {
            if monthly > self.policy.monthly_overtime_limit_hours {
                result.push(Violation::error(
                    ViolationCode::ExceedsMonthlyOvertime,
                    format!(
                        "monthly overtime cap of {monthly} hours exceeds the 36協定 limit of {} hours",
                        self.policy.monthly_overtime_limit_hours
                    ),
                ));
            }
        }
    }

    fn check_rates(&self, terms: &ContractTerms, result: &mut ValidationResult) {
        let Some(hourly) = terms.hourly_rate.filter(|rate| *rate > 0.0) else {
            return;
        };

        if let Some(overtime) = terms.overtime_rate {
            let minimum = hourly * OVERTIME_PREMIUM;
            if overtime < minimum {
                result.push(Violation::warning(
                    ViolationCode::LowOvertimeRate,
                    format!(
                        "overtime rate {overtime} yen is below 1.25x the hourly rate (at least {minimum:.0} yen)"
                    ),
                ));
            }
        }

        if hourly < f64::from(self.policy.minimum_hourly_rate) {
            result.push(Violation::warning(
                ViolationCode::LowHourlyRate,
                format!(
                    "hourly rate {hourly} yen may be below minimum wage ({} yen)",
                    self.policy.minimum_hourly_rate
                ),
            ));
        }
    }
}
