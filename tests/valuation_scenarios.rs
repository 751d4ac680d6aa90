//! End-to-end valuation scenarios across the process store, volatility
//! cache and instruments.

use std::cell::Cell;

use chrono::NaiveDate;
use ts_options::core::{
    BASE_CALENDAR, BASE_CURRENCY, CALENDAR, COUNTRY, CURRENCY, DAY_COUNTER, EXERCISE_TYPE,
    MATURITY_DATE, OPTION_CONTRACT_SIZE, OPTION_TYPE, PX_LAST, PX_MID, STRIKE_PRICE,
    UNDERLYING_INSTRUMENT,
};
use ts_options::prelude::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Binomial engine that counts implied volatility solves and can be told
/// to fail on given targets
struct CountingEngine {
    inner: BinomialEngine,
    solves: Cell<usize>,
    failing: Vec<f64>,
}

impl CountingEngine {
    fn new(failing: Vec<f64>) -> Self {
        Self {
            inner: BinomialEngine::new(101),
            solves: Cell::new(0),
            failing,
        }
    }
}

impl PricingEngine for CountingEngine {
    fn name(&self) -> &str {
        "counting"
    }

    fn evaluate(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
    ) -> ValuationResult<Valuation> {
        self.inner.evaluate(contract, process)
    }

    fn implied_volatility(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
        target: f64,
        settings: &SolverSettings,
    ) -> ValuationResult<f64> {
        self.solves.set(self.solves.get() + 1);
        if self.failing.contains(&target) {
            return Err(ValuationError::numerical("scripted failure"));
        }
        self.inner.implied_volatility(contract, process, target, settings)
    }
}

/// Calibrates with the binomial tree but fails every valuation
struct BrokenValuationEngine {
    inner: BinomialEngine,
}

impl PricingEngine for BrokenValuationEngine {
    fn name(&self) -> &str {
        "broken-valuation"
    }

    fn evaluate(
        &self,
        _contract: &VanillaContract,
        _process: &BlackScholesProcess,
    ) -> ValuationResult<Valuation> {
        Err(ValuationError::numerical("valuation unavailable"))
    }

    fn implied_volatility(
        &self,
        contract: &VanillaContract,
        process: &BlackScholesProcess,
        target: f64,
        settings: &SolverSettings,
    ) -> ValuationResult<f64> {
        self.inner.implied_volatility(contract, process, target, settings)
    }
}

fn call_record(exercise: &str) -> TimeSeries {
    TimeSeries::new("XYZ 100 C")
        .with_attribute(OPTION_TYPE, "CALL")
        .with_attribute(STRIKE_PRICE, 100.0)
        .with_attribute(OPTION_CONTRACT_SIZE, 100)
        .with_attribute(MATURITY_DATE, "2024-09-20")
        .with_attribute(CALENDAR, "UNITED_STATES")
        .with_attribute(DAY_COUNTER, "ACTUAL365FIXED")
        .with_attribute(EXERCISE_TYPE, exercise)
        .with_attribute(UNDERLYING_INSTRUMENT, "XYZ")
        .with_component(
            PX_MID,
            QuoteSeries::from_pairs([
                (d(2024, 3, 8), 13.2),
                (d(2024, 3, 11), 13.6),
                (d(2024, 3, 12), 13.9),
            ]),
        )
}

fn store() -> ProcessStore {
    let spot = QuoteSeries::from_pairs([
        (d(2024, 3, 8), 109.0),
        (d(2024, 3, 11), 110.0),
        (d(2024, 3, 12), 110.0),
        (d(2024, 9, 20), 110.0),
    ]);
    ProcessStore::new()
        .with_underlying(EquityUnderlying::new("XYZ", spot))
        .with_flat_rate(0.04)
}

fn option(exercise: &str) -> EquityOption {
    EquityOption::with_config(&call_record(exercise), ValuationConfig::fast()).unwrap()
}

#[test]
fn call_in_the_money_has_time_value_then_collapses_to_intrinsic() {
    let mut option = option("AMERICAN");
    let mut store = store();

    let live = option.price(&mut store, &ValuationArgs::on(d(2024, 3, 12))).unwrap();
    assert!(live > 10.0);

    let expiry = option.price(&mut store, &ValuationArgs::on(d(2024, 9, 20))).unwrap();
    assert_eq!(expiry, 10.0);
}

#[test]
fn expired_price_uses_spot_at_earlier_of_maturity_and_base_date() {
    let mut option = option("EUROPEAN");
    let mut store = store();

    // Base date before maturity: spot observed on the base date (109)
    let args = ValuationArgs::new(d(2024, 10, 1), d(2024, 3, 8));
    assert_eq!(option.price(&mut store, &args).unwrap(), 9.0);

    // Base date after maturity: spot observed at maturity (110)
    let args = ValuationArgs::new(d(2024, 10, 1), d(2024, 10, 1));
    assert_eq!(option.price(&mut store, &args).unwrap(), 10.0);
    assert_eq!(option.delta(&mut store, &args).unwrap(), 1.0);
    assert_eq!(option.theta(&mut store, &args).unwrap(), 0.0);
    assert_eq!(option.rho(&mut store, &args).unwrap(), Some(0.0));
}

#[test]
fn repeated_valuation_solves_once() {
    let mut option = option("AMERICAN").with_engine(CountingEngine::new(vec![]));
    let mut store = store();
    let args = ValuationArgs::on(d(2024, 3, 12));

    let first = option.price(&mut store, &args).unwrap();
    let second = option.price(&mut store, &args).unwrap();
    option.delta(&mut store, &args).unwrap();

    assert_eq!(first, second);
    assert_eq!(option.engine().solves.get(), 1);
}

#[test]
fn override_takes_precedence_over_calibration() {
    let mut option = option("EUROPEAN").with_engine(CountingEngine::new(vec![]));
    let mut store = store();
    let date = d(2024, 3, 12);

    let calibrated = option.price(&mut store, &ValuationArgs::on(date)).unwrap();
    let overridden = option
        .price(&mut store, &ValuationArgs::on(date).with_volatility(0.6))
        .unwrap();
    assert!(overridden > calibrated);

    let cached = option.volatility_cache().entry(date).unwrap();
    assert_eq!(cached.value, 0.6);
    assert_eq!(cached.source, VolatilitySource::Override);
    assert_eq!(store.process("XYZ").unwrap().volatility, 0.6);

    // the override sticks for later calls without one
    let again = option.price(&mut store, &ValuationArgs::on(date)).unwrap();
    assert_eq!(again, overridden);
    assert_eq!(option.engine().solves.get(), 1);
}

#[test]
fn failed_solve_retries_on_previous_business_day() {
    let mut option = option("EUROPEAN").with_engine(CountingEngine::new(vec![13.6]));
    let mut store = store();

    // Monday's mid fails, Friday's is used instead
    option.price(&mut store, &ValuationArgs::on(d(2024, 3, 11))).unwrap();
    assert_eq!(option.engine().solves.get(), 2);
    assert!(option.volatility_cache().contains(d(2024, 3, 11)));
}

#[test]
fn second_failure_is_a_numerical_error() {
    let mut option = option("EUROPEAN").with_engine(CountingEngine::new(vec![13.6, 13.2]));
    let mut store = store();

    let err = option
        .price(&mut store, &ValuationArgs::on(d(2024, 3, 11)))
        .unwrap_err();
    assert!(matches!(err, ValuationError::Numerical(_)));
    assert!(option.volatility_cache().is_empty());
}

#[test]
fn vega_is_not_applicable_for_american_and_zero_when_unavailable() {
    let mut american = option("AMERICAN");
    let mut store = store();
    let args = ValuationArgs::on(d(2024, 3, 12));

    assert_eq!(american.vega(&mut store, &args).unwrap(), None);
    let greeks = american.greeks(&mut store, &args).unwrap();
    assert_eq!(greeks.vega, None);
    assert_eq!(greeks.rho, None);

    // needs a product decision: the tree cannot produce vega, reported as 0
    let mut european = option("EUROPEAN");
    assert_eq!(european.vega(&mut store, &args).unwrap(), Some(0.0));

    let mut analytic = option("EUROPEAN").with_engine(AnalyticEuropeanEngine);
    assert!(analytic.vega(&mut store, &args).unwrap().unwrap() > 0.0);
}

#[test]
fn european_sensitivities_are_zero_when_the_engine_fails() {
    let mut option = option("EUROPEAN").with_engine(BrokenValuationEngine {
        inner: BinomialEngine::new(101),
    });
    let mut store = store();
    let args = ValuationArgs::on(d(2024, 3, 12));

    assert_eq!(option.vega(&mut store, &args).unwrap(), Some(0.0));
    assert_eq!(option.rho(&mut store, &args).unwrap(), Some(0.0));
    assert_eq!(option.volatility_cache().len(), 1);

    // the price itself has no fallback
    assert!(option.price(&mut store, &args).unwrap_err().is_numerical());
    assert!(option.greeks(&mut store, &args).unwrap_err().is_numerical());
}

#[test]
fn options_on_one_underlying_share_its_process() {
    let mut call = option("EUROPEAN");
    let mut other = option("EUROPEAN");
    let mut store = store();

    call.price(&mut store, &ValuationArgs::on(d(2024, 3, 12))).unwrap();
    other
        .price(&mut store, &ValuationArgs::on(d(2024, 3, 11)).with_volatility(0.5))
        .unwrap();

    // last writer wins
    let process = store.process("XYZ").unwrap();
    assert_eq!(process.evaluation_date, d(2024, 3, 11));
    assert_eq!(process.volatility, 0.5);
}

#[test]
fn currency_with_two_letter_code_is_nan() {
    let ts = TimeSeries::new("USDBRL Curncy")
        .with_attribute(CURRENCY, "BRL")
        .with_attribute(BASE_CURRENCY, "USD")
        .with_attribute(CALENDAR, "BRAZIL")
        .with_attribute(BASE_CALENDAR, "UNITED_STATES")
        .with_attribute(COUNTRY, "BR")
        .with_component(PX_LAST, QuoteSeries::from_pairs([(d(2024, 3, 11), 4.95)]));
    let spot = CurrencySpot::from_timeseries(&ts).unwrap();

    assert!(spot.value(d(2024, 3, 11), Some("US"), true).is_nan());
    assert_eq!(spot.value(d(2024, 3, 11), Some("BRL"), true), 4.95);
}
