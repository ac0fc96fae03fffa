use crate::infra::{parse_date, ContractBook, InMemoryContractRepository};
use crate::report::{render_audit, render_result};
use chrono::NaiveDate;
use clap::Args;
use haken_contracts::contracts::{
    ConflictCeiling, ContractId, ContractService, ContractServiceError, ContractValidator,
    DateRange, EmployeeId, FactoryId, FactorySnapshot, NewContract,
};
use haken_contracts::error::AppError;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Audit date for the closing compliance sweep (defaults to 2025-12-15).
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

const DEMO_FACTORY: FactoryId = FactoryId(1);

fn day(raw: &str) -> Result<NaiveDate, AppError> {
    Ok(raw.parse::<NaiveDate>()?)
}

fn window(start: &str, end: &str) -> Result<DateRange, AppError> {
    Ok(DateRange::new(day(start)?, day(end)?)?)
}

fn request(employees: &[&str], range: DateRange) -> NewContract {
    NewContract {
        factory_id: DEMO_FACTORY,
        employee_ids: employees
            .iter()
            .map(|id| EmployeeId(id.to_string()))
            .collect::<BTreeSet<_>>(),
        line_id: None,
        date_range: range,
    }
}

fn report_failure(step: &str, error: &ContractServiceError) {
    match error {
        ContractServiceError::Rejected(result) => render_result(step, result),
        other => println!("{step}: refused ({other})"),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = match args.as_of {
        Some(as_of) => as_of,
        None => day("2025-12-15")?,
    };

    let ceiling = ConflictCeiling::at(day("2026-03-31")?);
    let repository = Arc::new(InMemoryContractRepository::from_book(ContractBook {
        factories: vec![FactorySnapshot {
            id: DEMO_FACTORY,
            name: "岡崎工場 第二製造部".to_string(),
            ceiling,
        }],
        contracts: Vec::new(),
    })?);
    let service = ContractService::new(repository, ContractValidator::default());

    println!("Dispatch contract validation demo");
    println!("Factory conflict date (抵触日): 2026-03-31\n");

    println!("1. Conflict date ceiling");
    let on_ceiling = window("2026-01-01", "2026-03-31")?;
    let past_ceiling = window("2026-01-01", "2026-04-01")?;
    let checker = service.validator();
    render_result(
        &format!("  {on_ceiling}"),
        &checker.validate_creation(
            &request(&["E900"], on_ceiling).into_candidate(),
            &ceiling,
            &[],
        ),
    );
    render_result(
        &format!("  {past_ceiling}"),
        &checker.validate_creation(
            &request(&["E900"], past_ceiling).into_candidate(),
            &ceiling,
            &[],
        ),
    );

    println!("\n2. Employee double booking");
    let first = service
        .create(request(&["E101"], window("2025-03-01", "2025-08-31")?))
        .and_then(|stored| service.activate(stored.id));
    let first = match first {
        Ok(contract) => {
            println!("  stored and activated contract {} ({})", contract.id, contract.date_range);
            contract
        }
        Err(error) => {
            report_failure("  first contract", &error);
            return Ok(());
        }
    };
    match service.create(request(&["E101"], window("2025-08-31", "2025-12-31")?)) {
        Ok(contract) => println!("  unexpectedly stored contract {}", contract.id),
        Err(error) => report_failure("  overlapping candidate", &error),
    }

    println!("\n3. Renewal of an active contract");
    let renewed = match service.renew(first.id, window("2025-09-01", "2026-02-28")?) {
        Ok(receipt) => {
            println!(
                "  contract {} renews {} ({})",
                receipt.contract.id,
                receipt.link.previous_id(),
                receipt.contract.date_range
            );
            Some(receipt.contract.id)
        }
        Err(error) => {
            report_failure("  renewal", &error);
            None
        }
    };

    println!("\n4. Renewal of a draft");
    if let Some(draft_id) = renewed {
        match service.renew(draft_id, window("2026-03-01", "2026-03-31")?) {
            Ok(receipt) => println!("  unexpectedly renewed into {}", receipt.contract.id),
            Err(error) => report_failure("  renewal of draft", &error),
        }
        if let Ok(chain) = service.lineage(draft_id) {
            let chain = chain
                .iter()
                .map(ContractId::to_string)
                .collect::<Vec<_>>()
                .join(" <- ");
            println!("  lineage: {chain}");
        }
    }

    println!();
    match service.audit(as_of) {
        Ok(report) => render_audit(&report),
        Err(error) => report_failure("audit", &error),
    }

    Ok(())
}
