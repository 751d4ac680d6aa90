//! Example: valuing an equity option from time series
//!
//! Run with: cargo run --example basic_pricing

use chrono::NaiveDate;
use ts_options::core::{
    CALENDAR, DAY_COUNTER, EXERCISE_TYPE, MATURITY_DATE, OPTION_CONTRACT_SIZE, OPTION_TYPE, PX_MID,
    STRIKE_PRICE, UNDERLYING_INSTRUMENT,
};
use ts_options::prelude::*;

fn main() -> ValuationResult<()> {
    let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
    let maturity = "2024-06-21";

    // Underlying spot history and a flat 5% rate
    let spot = QuoteSeries::from_pairs([(date, 500.0)]);
    let dividend_yield = QuoteSeries::from_pairs([(date, 0.01)]);
    let mut store = ProcessStore::new()
        .with_underlying(EquityUnderlying::new("SPY", spot).with_dividend_yield(dividend_yield))
        .with_flat_rate(0.05);

    // Option record with a market mid of 11.50
    let record = TimeSeries::new("SPY 505 C")
        .with_attribute(OPTION_TYPE, "CALL")
        .with_attribute(STRIKE_PRICE, 505.0)
        .with_attribute(OPTION_CONTRACT_SIZE, 100)
        .with_attribute(MATURITY_DATE, maturity)
        .with_attribute(CALENDAR, "UNITED_STATES")
        .with_attribute(DAY_COUNTER, "ACTUAL365FIXED")
        .with_attribute(EXERCISE_TYPE, "AMERICAN")
        .with_attribute(UNDERLYING_INSTRUMENT, "SPY")
        .with_component(PX_MID, QuoteSeries::from_pairs([(date, 11.5)]));

    let mut option = EquityOption::from_timeseries(&record)?;
    let args = ValuationArgs::on(date);

    println!("=== {} on {} ===\n", option.name(), date);

    let greeks = option.greeks(&mut store, &args)?;
    let vol = option.volatility_cache().get(date).unwrap_or(f64::NAN);
    println!("Implied vol: {:.2}%", vol * 100.0);
    println!("Price:       {:.4}", greeks.price);
    println!("Delta:       {:.4}", greeks.delta);
    println!("Gamma:       {:.6}", greeks.gamma);
    println!("Theta:       {:.4} per year", greeks.theta);
    // American exercise: not applicable
    println!("Vega:        {:?}", greeks.vega);

    // Same calibration, European exercise for this call only
    let european = args.clone().with_exercise("EUROPEAN");
    let european_price = option.price(&mut store, &european)?;
    println!("\nEuropean price at the same vol: {:.4}", european_price);
    println!("Early exercise premium:         {:.4}", greeks.price - european_price);

    // Closed form for comparison
    let t = DayCounter::Actual365Fixed.year_fraction(date, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());
    let bs = bs_price(500.0, 505.0, 0.05, 0.01, vol, t, OptionType::Call);
    println!("Black-Scholes:                  {:.4}", bs);

    // Spot ladder with the calibrated vol
    println!("\n=== Spot ladder ===");
    for s in [480.0, 490.0, 500.0, 510.0, 520.0] {
        let price = option.price_underlying(&mut store, &args, s)?;
        println!("  S = {:>6.1}  price = {:>8.4}", s, price);
    }

    println!("\nTime value:  {:.4}", option.optionality(&mut store, &args)?);
    println!("Delta value: {:.2}", option.delta_value(&mut store, &args)?);

    Ok(())
}
