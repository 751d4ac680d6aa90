//! Per-call valuation arguments

use chrono::NaiveDate;

/// Arguments shared by the valuation calls of an option.
///
/// `date` is the evaluation date, `base_date` the last date with observed
/// market data; evaluations after `base_date` reuse its volatility.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationArgs {
    pub date: NaiveDate,
    pub base_date: NaiveDate,
    /// Multiplier applied to the dividend yield (e.g. withholding tax)
    pub dvd_tax_adjust: f64,
    /// Fall back to the last observation when a date has no quote
    pub last_available: bool,
    /// Exercise type used instead of the record's for this call only
    pub exercise_ovrd: Option<String>,
    /// Volatility pinned for the effective date
    pub volatility: Option<f64>,
    /// Spot used instead of the underlying's quote
    pub underlying_price: Option<f64>,
}

impl ValuationArgs {
    pub fn new(date: NaiveDate, base_date: NaiveDate) -> Self {
        Self {
            date,
            base_date,
            dvd_tax_adjust: 1.0,
            last_available: true,
            exercise_ovrd: None,
            volatility: None,
            underlying_price: None,
        }
    }

    /// Valuation on the base date itself
    pub fn on(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    pub fn with_exercise(mut self, exercise: impl Into<String>) -> Self {
        self.exercise_ovrd = Some(exercise.into());
        self
    }

    pub fn with_underlying_price(mut self, spot: f64) -> Self {
        self.underlying_price = Some(spot);
        self
    }

    pub fn with_dvd_tax_adjust(mut self, adjust: f64) -> Self {
        self.dvd_tax_adjust = adjust;
        self
    }

    pub fn with_last_available(mut self, last_available: bool) -> Self {
        self.last_available = last_available;
        self
    }

    /// Date under which volatility is cached: future dates share the base date
    pub fn volatility_date(&self) -> NaiveDate {
        self.date.min(self.base_date)
    }
}
