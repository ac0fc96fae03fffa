use crate::infra::{parse_date, ContractBook};
use chrono::{Local, NaiveDate};
use clap::Args;
use haken_contracts::config::AppConfig;
use haken_contracts::contracts::router::ValidateRequest;
use haken_contracts::contracts::{
    AuditReport, AuditSubject, ContractAudit, ContractValidator, Severity, ValidationResult,
};
use haken_contracts::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// JSON file holding `candidate`, `ceiling`, `existing` and optional `terms`
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// JSON contract book with `factories` and `contracts`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Audit date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.input)?;
    let request: ValidateRequest = serde_json::from_str(&raw)?;
    let validator = ContractValidator::with_policy(config.policy);

    let dates =
        validator.validate_creation(&request.candidate, &request.ceiling, &request.existing);
    println!(
        "Contract {} for factory {} ({})",
        request.candidate.id, request.candidate.factory_id.0, request.candidate.date_range
    );
    render_result("Date checks", &dates);

    if let Some(terms) = request.terms.as_ref() {
        let report = validator.validate_terms(terms);
        render_result("Statutory terms", &report.result);
        println!(
            "  fields valid: {}/{}  compliance score: {}",
            report.fields_valid,
            report.fields_checked,
            report.result.compliance_score()
        );
    }

    Ok(())
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let book = ContractBook::from_path(&args.input)?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let report = ContractAudit::with_policy(config.policy).run(as_of, &book.factories, &book.contracts);
    render_audit(&report);
    Ok(())
}

pub(crate) fn render_result(title: &str, result: &ValidationResult) {
    let verdict = if result.is_valid() { "PASS" } else { "FAIL" };
    println!("{title}: {verdict}");
    for violation in result.violations() {
        println!(
            "  [{}] {} {}",
            severity_tag(violation.severity),
            violation.code.as_str(),
            violation.message
        );
    }
}

pub(crate) fn render_audit(report: &AuditReport) {
    println!(
        "Compliance audit as of {} ({} factories, {} contracts)",
        report.as_of, report.factories_audited, report.contracts_audited
    );
    if report.findings.is_empty() {
        println!("  no findings");
        return;
    }
    for finding in &report.findings {
        let subject = match finding.subject {
            AuditSubject::Factory(id) => format!("factory {id}"),
            AuditSubject::Contract(id) => format!("contract #{id}"),
        };
        let days = finding
            .days_remaining
            .map(|days| format!(" ({days:+} days)"))
            .unwrap_or_default();
        println!(
            "  [{}] {subject}: {}{days}",
            severity_tag(finding.violation.severity),
            finding.violation.message
        );
    }
    let verdict = if report.is_compliant() {
        "compliant"
    } else {
        "action required"
    };
    println!("Result: {verdict}");
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warn",
    }
}
