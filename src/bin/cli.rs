//! ts-value
//!
//! Values one option from a market snapshot on a given date.
//!
//! Usage:
//!   ts-value --snapshot market.json --option "SPX 5000 C" --date 2024-03-11 --greeks

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::info;

use ts_options::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineKind {
    /// Leisen-Reimer tree (European and American)
    Binomial,
    /// Black-Scholes closed form (European only)
    Analytic,
}

#[derive(Parser, Debug)]
#[command(name = "ts-value")]
#[command(about = "Value an equity option from a market snapshot")]
struct Args {
    /// Market snapshot (JSON)
    #[arg(long)]
    snapshot: PathBuf,

    /// Option name as it appears in the snapshot
    #[arg(long)]
    option: String,

    /// Evaluation date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Last date with market data (defaults to --date)
    #[arg(long)]
    base_date: Option<NaiveDate>,

    /// Volatility override
    #[arg(long)]
    vol: Option<f64>,

    /// Exercise type override (AMERICAN or EUROPEAN)
    #[arg(long)]
    exercise: Option<String>,

    /// Underlying spot override
    #[arg(long)]
    spot: Option<f64>,

    /// Dividend yield multiplier (e.g. 0.7 for a 30% withholding tax)
    #[arg(long, default_value = "1.0")]
    dvd_tax_adjust: f64,

    /// Print all Greeks, not just the price
    #[arg(long)]
    greeks: bool,

    /// Pricing engine
    #[arg(long, value_enum, default_value = "binomial")]
    engine: EngineKind,

    /// Directory where calibrated volatilities are loaded from and saved to
    #[arg(long)]
    save_vols: Option<PathBuf>,
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.6}", v))
}

fn run<E: PricingEngine>(
    option: &mut EquityOption<E>,
    store: &mut ProcessStore,
    args: &Args,
    valuation: &ValuationArgs,
) -> Result<()> {
    let vol_store = match &args.save_vols {
        Some(dir) => Some(DataStore::new(StoreConfig::at(dir))?),
        None => None,
    };
    if let Some(vol_store) = &vol_store {
        if let Some(cache) = vol_store.load_volatilities(option.name())? {
            info!("Restored {} calibrated volatilities", cache.len());
            option.restore_volatility_cache(cache);
        }
    }

    println!("{} on {} (base {})", option.name(), valuation.date, valuation.base_date);
    println!("  Engine: {}", option.engine().name());

    if args.greeks {
        let greeks = option.greeks(store, valuation)?;
        println!("  Price: {:.6}", greeks.price);
        println!("  Delta: {:.6}", greeks.delta);
        println!("  Gamma: {:.6}", greeks.gamma);
        println!("  Theta: {:.6}", greeks.theta);
        println!("  Vega:  {}", fmt_optional(greeks.vega));
        println!("  Rho:   {}", fmt_optional(greeks.rho));
    } else {
        println!("  Price: {:.6}", option.price(store, valuation)?);
    }

    let date = valuation.volatility_date();
    if let Some(vol) = option.volatility_cache().get(date) {
        println!("  Vol ({}): {:.4}%", date, vol * 100.0);
    }
    println!("  Notional: {:.2}", option.notional());

    if let Some(vol_store) = &vol_store {
        vol_store.save_volatilities(option.name(), option.volatility_cache())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(
            tracing::level_filters::LevelFilter::INFO.into(),
        ))
        .init();

    let args = Args::parse();

    let snapshot = MarketSnapshot::from_file(&args.snapshot)
        .with_context(|| format!("reading snapshot {:?}", args.snapshot))?;
    let mut store = snapshot.process_store()?;
    let option = snapshot.option(&args.option).map_err(|e| {
        let known: Vec<&str> = snapshot.option_names().collect();
        anyhow!("{} (options in snapshot: {})", e, known.join(", "))
    })?;

    let mut valuation = ValuationArgs::new(args.date, args.base_date.unwrap_or(args.date))
        .with_dvd_tax_adjust(args.dvd_tax_adjust);
    valuation.volatility = args.vol;
    valuation.exercise_ovrd = args.exercise.clone();
    valuation.underlying_price = args.spot;

    match args.engine {
        EngineKind::Binomial => {
            let mut option = option;
            run(&mut option, &mut store, &args, &valuation)
        }
        EngineKind::Analytic => {
            let mut option = option.with_engine(AnalyticEuropeanEngine);
            run(&mut option, &mut store, &args, &valuation)
        }
    }
}
