//! Runs one script against an in-memory chain and prints the outcome as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use nexus_rs::config::{RuntimeSettings, FUEL_TOKEN_SYMBOL, LATEST_PROTOCOL_VERSION};
use nexus_rs::core::{Address, Timestamp, Transaction};
use nexus_rs::logging::{init_logging, LogConfig, LogFormat};
use nexus_rs::runtime::{
    ledger, ChainInfo, ExecutionEngine, ExecutionEnvironment, MemoryOracle, NativeRegistry,
};
use nexus_rs::storage::{MemoryStore, StorageChangeSet};
use nexus_rs::vm::ExecutionState;
use num_bigint::BigUint;
use serde_json::json;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nexus-exec", about = "Execute a Nexus script against an in-memory chain")]
struct Cli {
    /// Script bytes as hex.
    #[arg(value_name = "HEX")]
    script: String,

    /// TOML file with runtime settings. Defaults apply when omitted.
    #[arg(long, value_name = "PATH", env = "NEXUS_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the chain the script runs on.
    #[arg(long, default_value = "main")]
    chain: String,

    /// Run as if the genesis block did not exist yet (no gas metering).
    #[arg(long)]
    pre_genesis: bool,

    #[arg(long, default_value_t = LATEST_PROTOCOL_VERSION)]
    protocol_version: u32,

    /// Block time in seconds since the Unix epoch.
    #[arg(long, default_value_t = 0)]
    time: u32,

    /// Overrides the configured default gas limit.
    #[arg(long, value_name = "GAS")]
    gas_limit: Option<u64>,

    #[arg(long)]
    delay_payment: bool,

    #[arg(long)]
    read_only: bool,

    /// Public key (hex) of a transaction signer. Repeatable.
    #[arg(long = "signer", value_name = "HEX")]
    signers: Vec<String>,

    /// Genesis fuel allocation as `<public key hex>=<amount>`. Repeatable.
    #[arg(long = "fund", value_name = "KEY=AMOUNT")]
    funds: Vec<String>,

    /// Oracle entry as `<url>=<hex data>`. Repeatable.
    #[arg(long = "oracle", value_name = "URL=HEX")]
    oracle_entries: Vec<String>,

    #[arg(long, default_value = "warn", env = "NEXUS_LOG")]
    log_level: String,

    /// Log format (text, compact, json).
    #[arg(long, default_value = "text", value_parser = parse_log_format)]
    log_format: LogFormat,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    match value {
        "text" => Ok(LogFormat::Text),
        "compact" => Ok(LogFormat::Compact),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format {other}")),
    }
}

fn split_pair<'s>(value: &'s str, what: &str) -> Result<(&'s str, &'s str)> {
    value
        .split_once('=')
        .ok_or_else(|| anyhow!("{what} must look like <left>=<right>, got {value}"))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&LogConfig {
        level: cli.log_level.clone(),
        format: cli.log_format,
        ..LogConfig::default()
    })?;

    let settings = match &cli.config {
        Some(path) => RuntimeSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => RuntimeSettings::default(),
    };
    let script = hex::decode(cli.script.trim()).context("script is not valid hex")?;

    let chain = ChainInfo::new(cli.chain.clone())
        .with_genesis(!cli.pre_genesis)
        .with_protocol_version(cli.protocol_version);
    let oracle = MemoryOracle::new();
    for entry in &cli.oracle_entries {
        let (url, data) = split_pair(entry, "oracle entry")?;
        oracle.insert(url, hex::decode(data).context("oracle data is not valid hex")?);
    }
    let natives = NativeRegistry::with_defaults();
    let time = Timestamp::new(cli.time);

    let mut storage = StorageChangeSet::new(Arc::new(MemoryStore::new()));
    for fund in &cli.funds {
        let (key, amount) = split_pair(fund, "fund")?;
        let address = Address::from_key(&hex::decode(key).context("fund key is not valid hex")?);
        let amount: BigUint = amount.parse().context("fund amount is not a number")?;
        ledger::credit_genesis(&mut storage, FUEL_TOKEN_SYMBOL, &address, &amount)?;
    }

    let mut transaction = None;
    if !cli.signers.is_empty() {
        let mut tx = Transaction::new("nexus", cli.chain.clone(), script.clone(), time);
        for signer in &cli.signers {
            tx = tx.with_signer(Address::from_key(
                &hex::decode(signer).context("signer key is not valid hex")?,
            ));
        }
        transaction = Some(tx);
    }

    let mut env = ExecutionEnvironment::new(&chain, &oracle, &natives, &settings, time);
    if let Some(tx) = &transaction {
        env = env.with_transaction(tx);
    }
    let mut engine = ExecutionEngine::new(env, &mut storage, script)
        .with_delay_payment(cli.delay_payment)
        .with_read_only(cli.read_only);
    if let Some(limit) = cli.gas_limit {
        engine = engine.with_gas_limit(limit);
    }

    let state = engine.execute();
    let gas = engine.gas();
    let events: Vec<_> = engine
        .events()
        .iter()
        .map(|event| {
            json!({
                "kind": event.kind.to_string(),
                "address": event.address.to_string(),
                "contract": event.contract,
                "data": hex::encode(&event.data),
            })
        })
        .collect();
    let report = json!({
        "state": format!("{state:?}"),
        "fault": engine.fault().map(|err| err.to_string()),
        "gas": {
            "used": gas.used(),
            "paid": gas.paid(),
            "max": gas.max(),
            "price": gas.price(),
        },
        "result": engine.result_stack().iter().map(|item| item.to_string()).collect::<Vec<_>>(),
        "events": events,
    });
    drop(engine);

    if state == ExecutionState::Halt {
        storage.commit()?;
        info!("changes committed");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if state == ExecutionState::Halt {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
