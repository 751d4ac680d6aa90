//! Option contract definitions
//!
//! Payoff, exercise and the vanilla contract assembled from them. A
//! contract is rebuilt for every valuation call; nothing here is cached.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::ValuationError;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

impl FromStr for OptionType {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CALL" | "C" => Ok(OptionType::Call),
            "PUT" | "P" => Ok(OptionType::Put),
            _ => Err(ValuationError::configuration(format!(
                "Option type not supported: {}",
                s
            ))),
        }
    }
}

/// Exercise style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseStyle {
    European,
    American,
}

impl FromStr for ExerciseStyle {
    type Err = ValuationError;

    /// Only `AMERICAN` and `EUROPEAN` are accepted, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AMERICAN" => Ok(ExerciseStyle::American),
            "EUROPEAN" => Ok(ExerciseStyle::European),
            _ => Err(ValuationError::configuration(format!(
                "Exercise type not supported: {}",
                s
            ))),
        }
    }
}

/// Exercise schedule of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exercise {
    /// Exercisable on any date in `[earliest, maturity]`
    American {
        earliest: NaiveDate,
        maturity: NaiveDate,
    },
    /// Exercisable at maturity only
    European { maturity: NaiveDate },
}

impl Exercise {
    pub fn new(style: ExerciseStyle, date: NaiveDate, maturity: NaiveDate) -> Self {
        match style {
            ExerciseStyle::American => Exercise::American {
                earliest: date,
                maturity,
            },
            ExerciseStyle::European => Exercise::European { maturity },
        }
    }

    pub fn style(&self) -> ExerciseStyle {
        match self {
            Exercise::American { .. } => ExerciseStyle::American,
            Exercise::European { .. } => ExerciseStyle::European,
        }
    }

    pub fn maturity(&self) -> NaiveDate {
        match self {
            Exercise::American { maturity, .. } | Exercise::European { maturity } => *maturity,
        }
    }
}

/// Plain vanilla payoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlainVanillaPayoff {
    pub option_type: OptionType,
    pub strike: f64,
}

impl PlainVanillaPayoff {
    pub fn new(option_type: OptionType, strike: f64) -> Self {
        Self { option_type, strike }
    }

    pub fn value(&self, spot: f64) -> f64 {
        self.option_type.intrinsic(spot, self.strike)
    }
}

/// Vanilla option contract: payoff plus exercise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VanillaContract {
    pub payoff: PlainVanillaPayoff,
    pub exercise: Exercise,
}

impl VanillaContract {
    pub fn new(payoff: PlainVanillaPayoff, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type
    }

    pub fn strike(&self) -> f64 {
        self.payoff.strike
    }

    pub fn maturity(&self) -> NaiveDate {
        self.exercise.maturity()
    }

    pub fn is_american(&self) -> bool {
        self.exercise.style() == ExerciseStyle::American
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type() {
        assert_eq!(OptionType::Call.phi(), 1.0);
        assert_eq!(OptionType::Put.phi(), -1.0);

        assert_eq!(OptionType::Call.intrinsic(110.0, 100.0), 10.0);
        assert_eq!(OptionType::Put.intrinsic(90.0, 100.0), 10.0);
        assert_eq!(OptionType::Call.intrinsic(90.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic(110.0, 100.0), 0.0);

        assert_eq!("call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert!("STRADDLE".parse::<OptionType>().is_err());
    }

    #[test]
    fn test_exercise_style_parse() {
        assert_eq!("american".parse::<ExerciseStyle>().unwrap(), ExerciseStyle::American);
        assert_eq!("European".parse::<ExerciseStyle>().unwrap(), ExerciseStyle::European);

        let err = "BERMUDAN".parse::<ExerciseStyle>().unwrap_err();
        assert!(matches!(err, ValuationError::Configuration(_)));
    }

    #[test]
    fn test_exercise_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let maturity = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();

        let american = Exercise::new(ExerciseStyle::American, date, maturity);
        assert_eq!(american, Exercise::American { earliest: date, maturity });

        let european = Exercise::new(ExerciseStyle::European, date, maturity);
        assert_eq!(european.maturity(), maturity);
        assert_eq!(european.style(), ExerciseStyle::European);
    }
}
