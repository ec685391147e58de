// Cashpoint CLI - reference binding over the core library
//
// Data directory layout (override with CASHPOINT_DATA):
//   cashpoint-data/config.json       operator configuration
//   cashpoint-data/transactions.csv  transaction ledger

use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use cashpoint::{
    Config, DeviceClient, ReconciliationEngine, SessionGate, TransactionLedger,
    TransactionRecord, WithdrawalRequest, ACCOUNT_CATEGORIES,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("login") => run_login(),
        Some("withdraw") => run_withdraw(&args[2..]),
        Some("refresh") => run_refresh(),
        Some("history") => run_history(),
        Some("status") => run_status(&args[2..]),
        Some("device") => run_device(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("cashpoint {}", cashpoint::VERSION);
    println!();
    println!("Usage:");
    println!("  cashpoint login");
    println!("  cashpoint withdraw <operator> <payee> <category> <amount>");
    println!("  cashpoint refresh");
    println!("  cashpoint history");
    println!("  cashpoint status <transaction-id>");
    println!("  cashpoint device <status|machine|cash|sensors|error-message <code>>");
    println!();
    println!("Categories: {}", ACCOUNT_CATEGORIES.join(", "));
}

fn data_dir() -> PathBuf {
    env::var("CASHPOINT_DATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cashpoint-data"))
}

fn setup() -> Result<(Config, ReconciliationEngine)> {
    let dir = data_dir();
    let config = Config::load_or_init(&dir.join("config.json"))?;
    let client = DeviceClient::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let ledger = TransactionLedger::new(dir.join("transactions.csv"));

    Ok((config, ReconciliationEngine::new(client, ledger)))
}

/// Open the gate with the configured credentials, or bail. Every CLI
/// invocation is a fresh process, so gated subcommands log in first.
fn authenticate(config: &Config, client: &DeviceClient) -> Result<SessionGate> {
    let mut gate = SessionGate::new();
    gate.login(
        client,
        &config.credentials.username,
        &config.credentials.password,
    )?;

    if !gate.is_authenticated() {
        bail!("not authenticated");
    }

    Ok(gate)
}

fn run_login() -> Result<()> {
    let (config, engine) = setup()?;
    authenticate(&config, engine.client())?;

    println!("✓ Logged in to {}", config.api_base_url);
    Ok(())
}

fn run_withdraw(args: &[String]) -> Result<()> {
    let [operator, payee, category, amount] = args else {
        bail!("usage: cashpoint withdraw <operator> <payee> <category> <amount>");
    };

    let (config, engine) = setup()?;
    authenticate(&config, engine.client())?;

    let record = engine.submit_withdrawal(&WithdrawalRequest {
        operator_name: operator.clone(),
        payee: payee.clone(),
        account_category: category.clone(),
        amount: amount.clone(),
    })?;

    println!("✓ Withdrawal submitted");
    print_records(std::slice::from_ref(&record));
    Ok(())
}

fn run_refresh() -> Result<()> {
    let (_, engine) = setup()?;
    let report = engine.reconcile_pending()?;

    println!("✓ Reconciled: {} updated", report.updated_count);
    if report.query_failures > 0 {
        println!("  {} status queries failed, will retry next refresh", report.query_failures);
    }
    print_records(&report.records);
    Ok(())
}

fn run_history() -> Result<()> {
    let (_, engine) = setup()?;
    let records = engine.ledger().scan()?;

    if records.is_empty() {
        println!("No transactions recorded.");
        return Ok(());
    }
    print_records(&records);
    Ok(())
}

fn run_status(args: &[String]) -> Result<()> {
    let [transaction_id] = args else {
        bail!("usage: cashpoint status <transaction-id>");
    };

    let (config, engine) = setup()?;
    authenticate(&config, engine.client())?;

    let record = engine.ledger().find(transaction_id)?;
    let remote = engine.client().query_status(transaction_id)?;

    print_records(std::slice::from_ref(&record));
    println!("Device reports: {remote}");
    Ok(())
}

fn run_device(args: &[String]) -> Result<()> {
    let (config, engine) = setup()?;
    authenticate(&config, engine.client())?;
    let client = engine.client();

    let data = match args.first().map(String::as_str) {
        Some("status") => client.system_status()?,
        Some("machine") => client.machine_info()?,
        Some("cash") => client.cash_info()?,
        Some("sensors") => client.sensor_status()?,
        Some("error-message") => {
            let Some(code) = args.get(1).and_then(|c| c.parse::<i64>().ok()) else {
                bail!("usage: cashpoint device error-message <code>");
            };
            client.error_message(code)?
        }
        _ => bail!("usage: cashpoint device <status|machine|cash|sensors|error-message <code>>"),
    };

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn print_records(records: &[TransactionRecord]) {
    println!(
        "{:<25} {:<12} {:<16} {:<14} {:>8}  {:<36} {}",
        "Timestamp", "Operator", "Payee", "Category", "Amount", "Transaction Id", "Status"
    );
    for r in records {
        println!(
            "{:<25} {:<12} {:<16} {:<14} {:>8}  {:<36} {}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.operator_name,
            r.payee,
            r.account_category,
            r.amount,
            r.transaction_id,
            r.status.as_str()
        );
    }
}
