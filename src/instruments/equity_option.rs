//! Equity options
//!
//! Valuation of a listed equity option from its time-series record. Every
//! call rebuilds the contract, refreshes the underlying's shared process for
//! the call's date, resolves volatility and evaluates the option's engine.
//! Calls on or after maturity bypass the engine and use intrinsic-value
//! rules instead.

use chrono::NaiveDate;

use crate::core::{
    Exercise, ExerciseStyle, Greeks, OptionRecord, QuoteSeries, TimeSeries, ValuationError,
    ValuationResult, VanillaContract, IVOL_MID, PX_MID,
};
use crate::models::{BinomialEngine, BlackScholesProcess, PricingEngine, Valuation};
use crate::pricing::{
    ProcessStore, ProcessUpdate, ValuationArgs, ValuationConfig, VolatilityCache, VolatilityInputs,
};

/// Contract and calibrated process ready for the engine
#[derive(Debug, Clone)]
struct Prepared {
    contract: VanillaContract,
    process: BlackScholesProcess,
}

#[derive(Debug, Clone)]
pub struct EquityOption<E = BinomialEngine> {
    record: OptionRecord,
    mid_prices: QuoteSeries,
    implied_vols: QuoteSeries,
    volatility_cache: VolatilityCache,
    engine: E,
    config: ValuationConfig,
}

impl EquityOption<BinomialEngine> {
    pub fn from_timeseries(ts: &TimeSeries) -> ValuationResult<Self> {
        Self::with_config(ts, ValuationConfig::default())
    }

    /// Option priced on a Leisen-Reimer tree sized by `config`
    pub fn with_config(ts: &TimeSeries, config: ValuationConfig) -> ValuationResult<Self> {
        Ok(Self {
            record: OptionRecord::from_timeseries(ts)?,
            mid_prices: ts.component_or_empty(PX_MID),
            implied_vols: ts.component_or_empty(IVOL_MID),
            volatility_cache: VolatilityCache::new(),
            engine: config.binomial_engine(),
            config,
        })
    }
}

impl<E: PricingEngine> EquityOption<E> {
    /// Same option valued by another engine; calibrated volatilities are dropped
    pub fn with_engine<F: PricingEngine>(self, engine: F) -> EquityOption<F> {
        EquityOption {
            record: self.record,
            mid_prices: self.mid_prices,
            implied_vols: self.implied_vols,
            volatility_cache: VolatilityCache::new(),
            engine,
            config: self.config,
        }
    }

    pub fn record(&self) -> &OptionRecord {
        &self.record
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    pub fn volatility_cache(&self) -> &VolatilityCache {
        &self.volatility_cache
    }

    /// Reuse volatilities calibrated in an earlier session
    pub fn restore_volatility_cache(&mut self, cache: VolatilityCache) {
        self.volatility_cache = cache;
    }

    pub fn is_expired(&self, date: NaiveDate) -> bool {
        date >= self.record.maturity
    }

    pub fn maturity(&self) -> NaiveDate {
        self.record.maturity
    }

    pub fn notional(&self) -> f64 {
        self.record.contract_size * self.record.strike
    }

    /// Contract for a valuation date.
    ///
    /// `exercise_ovrd` replaces the record's exercise type for this contract
    /// only.
    pub fn build_contract(
        &self,
        date: NaiveDate,
        exercise_ovrd: Option<&str>,
    ) -> ValuationResult<VanillaContract> {
        let style: ExerciseStyle = exercise_ovrd
            .unwrap_or(&self.record.exercise_type)
            .parse()?;
        Ok(VanillaContract::new(
            self.record.payoff(),
            Exercise::new(style, date, self.record.maturity),
        ))
    }

    pub fn ts_mid_price(&self, date: NaiveDate, last_available: bool) -> f64 {
        self.mid_prices.get_value(date, last_available, f64::NAN)
    }

    pub fn ts_implied_volatility(&self, date: NaiveDate, last_available: bool) -> f64 {
        self.implied_vols.get_value(date, last_available, f64::NAN)
    }

    fn spot_at(&self, store: &ProcessStore, date: NaiveDate) -> ValuationResult<f64> {
        let spot = store
            .underlying(&self.record.underlying)?
            .spot_price(date, true);
        if spot.is_nan() {
            return Err(ValuationError::data(format!(
                "{}: no spot price on or before {}",
                self.record.underlying, date
            )));
        }
        Ok(spot)
    }

    /// Payoff at the underlying's last spot on or before `date`
    fn payoff_at(&self, store: &ProcessStore, date: NaiveDate) -> ValuationResult<f64> {
        Ok(self.record.payoff().value(self.spot_at(store, date)?))
    }

    /// Intrinsic value on `date`; zero once the option has matured
    pub fn intrinsic(&self, store: &ProcessStore, date: NaiveDate) -> ValuationResult<f64> {
        if date > self.record.maturity {
            return Ok(0.0);
        }
        self.payoff_at(store, date)
    }

    /// Refresh the shared process and resolve volatility for `args`
    fn prepare(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<Prepared> {
        let contract = self.build_contract(args.date, args.exercise_ovrd.as_deref())?;

        let update = ProcessUpdate {
            underlying: &self.record.underlying,
            date: args.date,
            base_date: args.base_date,
            calendar: &self.record.calendar,
            day_counter: &self.record.day_counter,
            maturity: self.record.maturity,
            dvd_tax_adjust: args.dvd_tax_adjust,
            last_available: args.last_available,
            spot_override: args.underlying_price,
            initial_vol: self.config.initial_vol,
        };
        let process = store.update_process(&update)?.clone();

        let inputs = VolatilityInputs {
            key: args.volatility_date(),
            override_vol: args.volatility,
            contract: &contract,
            process: &process,
            calendar: &self.record.calendar,
            mid_prices: &self.mid_prices,
        };
        let vol = self
            .volatility_cache
            .resolve(&inputs, &self.engine, &self.config.solver())?;
        store.volatility_update(&self.record.underlying, vol)?;

        Ok(Prepared {
            process: process.with_volatility(vol),
            contract,
        })
    }

    fn evaluate(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<Valuation> {
        let prepared = self.prepare(store, args)?;
        self.engine.evaluate(&prepared.contract, &prepared.process)
    }

    /// Price on or after maturity: intrinsic value with the spot observed
    /// at the earlier of maturity and base date
    fn expired_price(&self, store: &ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        self.payoff_at(store, self.record.maturity.min(args.base_date))
    }

    fn expired_delta(&self, store: &ProcessStore) -> ValuationResult<f64> {
        Ok(if self.payoff_at(store, self.record.maturity)? > 0.0 {
            1.0
        } else {
            0.0
        })
    }

    /// Engine sensitivity that may be unavailable; missing or failing
    /// values count as zero
    fn optional_sensitivity(
        &self,
        prepared: &Prepared,
        greek: &str,
        pick: impl Fn(&Valuation) -> Option<f64>,
    ) -> f64 {
        match self.engine.evaluate(&prepared.contract, &prepared.process) {
            Ok(valuation) => pick(&valuation).unwrap_or_else(|| {
                tracing::warn!("{}: {} does not provide {}, using 0", self.record.name, self.engine.name(), greek);
                0.0
            }),
            Err(e) => {
                tracing::warn!("{}: {} failed ({}), using 0", self.record.name, greek, e);
                0.0
            }
        }
    }

    pub fn price(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return self.expired_price(store, args);
        }
        Ok(self.evaluate(store, args)?.npv)
    }

    /// Delta; on or after maturity 1 when the option finishes in the money
    pub fn delta(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return self.expired_delta(store);
        }
        Ok(self.evaluate(store, args)?.delta)
    }

    pub fn gamma(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return Ok(0.0);
        }
        Ok(self.evaluate(store, args)?.gamma)
    }

    /// Theta per year
    pub fn theta(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return Ok(0.0);
        }
        Ok(self.evaluate(store, args)?.theta)
    }

    /// Vega per unit of volatility.
    ///
    /// `None` for American exercise, where it is not applicable. A European
    /// vega the engine cannot produce is `Some(0.0)`.
    pub fn vega(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<Option<f64>> {
        if self.is_expired(args.date) {
            return Ok(Some(0.0));
        }
        let prepared = self.prepare(store, args)?;
        if prepared.contract.is_american() {
            return Ok(None);
        }
        Ok(Some(self.optional_sensitivity(&prepared, "vega", |v| v.vega)))
    }

    /// Rho per unit of rate; `None` for American exercise like [`Self::vega`]
    pub fn rho(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<Option<f64>> {
        if self.is_expired(args.date) {
            return Ok(Some(0.0));
        }
        let prepared = self.prepare(store, args)?;
        if prepared.contract.is_american() {
            return Ok(None);
        }
        Ok(Some(self.optional_sensitivity(&prepared, "rho", |v| v.rho)))
    }

    /// Price and all sensitivities from a single calibration.
    ///
    /// Missing European vega/rho are reported as 0 like [`Self::vega`], but
    /// an engine failure is returned as an error: the aggregate carries the
    /// price, which has no fallback value.
    pub fn greeks(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<Greeks> {
        if self.is_expired(args.date) {
            let mut greeks = Greeks::new(self.expired_price(store, args)?, self.expired_delta(store)?, 0.0, 0.0);
            greeks.vega = Some(0.0);
            greeks.rho = Some(0.0);
            return Ok(greeks);
        }

        let prepared = self.prepare(store, args)?;
        let valuation = self.engine.evaluate(&prepared.contract, &prepared.process)?;
        let mut greeks = Greeks::new(valuation.npv, valuation.delta, valuation.gamma, valuation.theta);
        if !prepared.contract.is_american() {
            greeks.vega = Some(valuation.vega.unwrap_or(0.0));
            greeks.rho = Some(valuation.rho.unwrap_or(0.0));
        }
        Ok(greeks)
    }

    /// Value of one contract: `quote` when given, else the model price,
    /// times the contract size
    pub fn value(
        &mut self,
        store: &mut ProcessStore,
        args: &ValuationArgs,
        quote: Option<f64>,
    ) -> ValuationResult<f64> {
        let unit = match quote {
            Some(q) => q,
            None => self.price(store, args)?,
        };
        Ok(unit * self.record.contract_size)
    }

    /// Return of the contract value from `start_date` to `args.date`.
    ///
    /// The start defaults to, and never precedes, the first date with an
    /// implied volatility quote. NaN when `args.date` is before the start.
    pub fn performance(
        &mut self,
        store: &mut ProcessStore,
        args: &ValuationArgs,
        start_date: Option<NaiveDate>,
        start_quote: Option<f64>,
        quote: Option<f64>,
    ) -> ValuationResult<f64> {
        let first = self.implied_vols.first_valid_date().ok_or_else(|| {
            ValuationError::data(format!("{}: no implied volatility history", self.record.name))
        })?;
        let start = start_date.map_or(first, |d| d.max(first));
        if args.date < start {
            return Ok(f64::NAN);
        }

        let start_args = ValuationArgs {
            date: start,
            ..args.clone()
        };
        let start_value = self.value(store, &start_args, start_quote)?;
        let value = self.value(store, args, quote)?;
        Ok(value / start_value - 1.0)
    }

    /// Time value: price minus intrinsic value (intrinsic at the base date
    /// for future dates); zero once matured
    pub fn optionality(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return Ok(0.0);
        }
        let price = self.evaluate(store, args)?.npv;
        let intrinsic = self.intrinsic(store, args.date.min(args.base_date))?;
        Ok(price - intrinsic)
    }

    /// Spot the shared process holds for this call; zero once matured
    pub fn underlying_price(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return Ok(0.0);
        }
        Ok(self.prepare(store, args)?.process.spot)
    }

    /// Delta exposure in underlying currency: delta × spot × contract size
    pub fn delta_value(&mut self, store: &mut ProcessStore, args: &ValuationArgs) -> ValuationResult<f64> {
        let delta = self.delta(store, args)?;
        let spot = match store.process(&self.record.underlying) {
            Some(process) if !self.is_expired(args.date) => process.spot,
            _ => self.spot_at(store, args.date)?,
        };
        Ok(delta * spot * self.record.contract_size)
    }

    /// Price with volatility calibrated at the market spot, re-evaluated
    /// with the underlying moved to `spot`
    pub fn price_underlying(
        &mut self,
        store: &mut ProcessStore,
        args: &ValuationArgs,
        spot: f64,
    ) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return Ok(self.record.payoff().value(spot));
        }
        Ok(self.evaluate_at_spot(store, args, spot)?.npv)
    }

    /// Delta counterpart of [`Self::price_underlying`]
    pub fn delta_underlying(
        &mut self,
        store: &mut ProcessStore,
        args: &ValuationArgs,
        spot: f64,
    ) -> ValuationResult<f64> {
        if self.is_expired(args.date) {
            return Ok(if self.record.payoff().value(spot) > 0.0 { 1.0 } else { 0.0 });
        }
        Ok(self.evaluate_at_spot(store, args, spot)?.delta)
    }

    fn evaluate_at_spot(
        &mut self,
        store: &mut ProcessStore,
        args: &ValuationArgs,
        spot: f64,
    ) -> ValuationResult<Valuation> {
        let market = ValuationArgs {
            underlying_price: None,
            ..args.clone()
        };
        let prepared = self.prepare(store, &market)?;
        store.spot_price_update(&self.record.underlying, spot)?;
        self.engine
            .evaluate(&prepared.contract, &prepared.process.with_spot(spot))
    }

    /// Volatility reproducing `target` on `args.date`, optionally at another
    /// spot. The calibration cache is neither read nor written.
    pub fn implied_vol(
        &self,
        store: &mut ProcessStore,
        args: &ValuationArgs,
        target: f64,
        spot: Option<f64>,
    ) -> ValuationResult<f64> {
        let contract = self.build_contract(args.date, args.exercise_ovrd.as_deref())?;
        let update = ProcessUpdate {
            underlying: &self.record.underlying,
            date: args.date,
            base_date: args.base_date,
            calendar: &self.record.calendar,
            day_counter: &self.record.day_counter,
            maturity: self.record.maturity,
            dvd_tax_adjust: args.dvd_tax_adjust,
            last_available: args.last_available,
            spot_override: spot.or(args.underlying_price),
            initial_vol: args.volatility.unwrap_or(self.config.initial_vol),
        };
        let process = store.update_process(&update)?.clone();
        self.engine
            .implied_volatility(&contract, &process, target, &self.config.solver())
    }
}
