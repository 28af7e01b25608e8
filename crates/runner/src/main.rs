use bourse_ports::Store;
use bourse_runner::{Engine, RunSummary, SimulationConfig};
use bourse_store::{InMemoryStore, JsonFileStore};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

/// Multi-agent stock market simulator
#[derive(Parser, Debug)]
#[command(name = "bourse", author, version, about)]
struct Args {
    /// JSON configuration file (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON store file to load from and persist to (in-memory when omitted)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Ticks to simulate
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// RNG seed, overrides the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final state as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    match &args.store {
        Some(path) => simulate(Engine::bootstrap(config, JsonFileStore::open(path)?)?, &args),
        None => simulate(Engine::bootstrap(config, InMemoryStore::new())?, &args),
    }
}

fn simulate<S: Store>(mut engine: Engine<S>, args: &Args) -> Result<(), Box<dyn Error>> {
    let summary = engine.run(args.ticks);
    engine.close();

    if args.json {
        let report = serde_json::json!({
            "summary": summary,
            "instruments": engine.instrument_table(),
            "accounts": engine.account_table(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&engine, &summary);
    }
    Ok(())
}

fn print_report<S: Store>(engine: &Engine<S>, summary: &RunSummary) {
    println!("{:<10} {:>14} {:>10} {:>8}", "CODE", "PRICE", "VOL", "HOLDERS");
    for row in engine.instrument_table() {
        println!(
            "{:<10} {:>14} {:>10} {:>8}",
            row.code.as_str(),
            row.price.round_dp(2).to_string(),
            row.volatility.to_string(),
            row.holders
        );
    }

    println!();
    println!("{:<18} {:>14} {:>14}  {}", "ACCOUNT", "BALANCE", "ASSETS", "STRATEGY");
    for row in engine.account_table() {
        let assets = engine
            .total_asset_value(row.id.as_str())
            .map(|v| v.round_dp(2).to_string())
            .unwrap_or_default();
        println!(
            "{:<18} {:>14} {:>14}  {}",
            row.id.as_str(),
            row.balance.round_dp(2).to_string(),
            assets,
            row.strategy
        );
    }

    println!();
    println!(
        "ticks {}/{} (clock {}), orders {} filled / {} declined",
        summary.ticks_executed,
        summary.requested,
        summary.tick,
        summary.orders_filled,
        summary.orders_declined
    );
    if let Some(id) = &summary.bankrupt {
        println!("halted: {} is bankrupt", id);
    }
}
