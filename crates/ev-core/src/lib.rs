#![deny(warnings)]

//! Core domain models and invariants for the content EV simulator.
//!
//! This crate defines the serializable inputs of the portfolio economics
//! model together with validation helpers that guarantee its invariants:
//! - Model parameters and the outcome mix derived from them
//! - Revenue multipliers and the 70/30 contract terms
//! - Interactive control ranges and scenario files

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of productions in the reference cohort.
pub const DEFAULT_PORTFOLIO_SIZE: u32 = 10;

/// Largest cohort the model accepts.
pub const MAX_PORTFOLIO_SIZE: u32 = 1_000_000;

/// Largest per-show cost the model accepts, in currency units.
pub const MAX_COST: u64 = 1_000_000_000_000;

/// Largest revenue multiplier or contract share the model accepts.
pub const MAX_MULTIPLE: u64 = 100;

/// Names of the model inputs, used in errors and range checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    TvCost,
    PilotCost,
    FlopRate,
    HitRate,
    PortfolioSize,
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamField::TvCost => "tv_cost",
            ParamField::PilotCost => "pilot_cost",
            ParamField::FlopRate => "flop_rate",
            ParamField::HitRate => "hit_rate",
            ParamField::PortfolioSize => "portfolio_size",
        };
        f.write_str(name)
    }
}

/// Inputs of a single portfolio evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Legacy per-show production cost (currency units, > 0).
    pub tv_cost: Decimal,
    /// Per-show micro-pilot cost (currency units, > 0).
    pub pilot_cost: Decimal,
    /// Probability that a show flops, in [0,1].
    pub flop_rate: Decimal,
    /// Probability that a show is a hit, in [0,1].
    pub hit_rate: Decimal,
    /// Number of productions in the cohort (>= 1).
    pub portfolio_size: u32,
}

impl ModelParams {
    /// Reference instantiation: 50 / 2.0 / 60% flops / 10% hits / 10 shows.
    pub fn reference() -> Self {
        Self {
            tv_cost: dec!(50),
            pilot_cost: dec!(2.0),
            flop_rate: dec!(0.60),
            hit_rate: dec!(0.10),
            portfolio_size: DEFAULT_PORTFOLIO_SIZE,
        }
    }

    /// Portfolio size as a decimal factor.
    pub fn shows(&self) -> Decimal {
        Decimal::from(self.portfolio_size)
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::reference()
    }
}

/// Probabilities of the three exclusive outcome categories.
///
/// `average` is always derived as `1 - flop - hit` and is never negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMix {
    pub flop: Decimal,
    pub average: Decimal,
    pub hit: Decimal,
}

impl OutcomeMix {
    /// Derive the mix from flop and hit rates.
    ///
    /// Fails when either rate leaves [0,1] or when their sum exceeds one.
    /// A sum of exactly one is valid and yields an empty average bucket.
    pub fn from_rates(flop: Decimal, hit: Decimal) -> Result<Self, InvalidInputError> {
        check_rate(ParamField::FlopRate, flop)?;
        check_rate(ParamField::HitRate, hit)?;
        if flop + hit > Decimal::ONE {
            return Err(InvalidInputError::RatesExceedUnity { flop, hit });
        }
        Ok(Self {
            flop,
            average: Decimal::ONE - flop - hit,
            hit,
        })
    }
}

fn check_rate(field: ParamField, value: Decimal) -> Result<(), InvalidInputError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(InvalidInputError::RateOutOfRange { field, value });
    }
    Ok(())
}

/// Revenue per show by outcome, as multiples of the legacy production cost.
///
/// Only aired content earns revenue; payout scales with outcome quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueMultipliers {
    pub flop: Decimal,
    pub average: Decimal,
    pub hit: Decimal,
}

impl RevenueMultipliers {
    /// Flops recover 20% via ads, average shows 110%, hits 200%.
    pub fn standard() -> Self {
        Self {
            flop: dec!(0.2),
            average: dec!(1.1),
            hit: dec!(2.0),
        }
    }

    /// Absolute revenue per show for the given production cost.
    pub fn per_show(&self, tv_cost: Decimal) -> ShowRevenue {
        ShowRevenue {
            flop: self.flop * tv_cost,
            average: self.average * tv_cost,
            hit: self.hit * tv_cost,
        }
    }

    /// Every multiplier must lie in [0, `MAX_MULTIPLE`].
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        check_term("revenue.flop", self.flop)?;
        check_term("revenue.average", self.average)?;
        check_term("revenue.hit", self.hit)
    }
}

impl Default for RevenueMultipliers {
    fn default() -> Self {
        Self::standard()
    }
}

/// Revenue earned by one aired show of each outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRevenue {
    pub flop: Decimal,
    pub average: Decimal,
    pub hit: Decimal,
}

/// Variable producer contract: a fixed base plus an outcome-linked bonus,
/// all as fractions of the legacy production cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Guaranteed share of the standard cost.
    pub base_share: Decimal,
    /// Partial bonus paid on average outcomes.
    pub average_bonus: Decimal,
    /// Upside bonus paid on hits.
    pub hit_bonus: Decimal,
}

impl ContractTerms {
    /// The 70/30 contract: 70% base, +15% on average shows, +50% on hits.
    pub fn standard() -> Self {
        Self {
            base_share: dec!(0.70),
            average_bonus: dec!(0.15),
            hit_bonus: dec!(0.50),
        }
    }

    /// Production cost multiple for an average-outcome show (0.85 standard).
    pub fn average_multiple(&self) -> Decimal {
        self.base_share + self.average_bonus
    }

    /// Production cost multiple for a hit (1.20 standard).
    pub fn hit_multiple(&self) -> Decimal {
        self.base_share + self.hit_bonus
    }

    /// Every share must lie in [0, `MAX_MULTIPLE`].
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        check_term("contract.base_share", self.base_share)?;
        check_term("contract.average_bonus", self.average_bonus)?;
        check_term("contract.hit_bonus", self.hit_bonus)
    }
}

fn check_term(term: &'static str, value: Decimal) -> Result<(), InvalidInputError> {
    if value < Decimal::ZERO || value > Decimal::from(MAX_MULTIPLE) {
        return Err(InvalidInputError::TermOutOfRange { term, value });
    }
    Ok(())
}

impl Default for ContractTerms {
    fn default() -> Self {
        Self::standard()
    }
}

/// Errors for inputs the model must refuse to evaluate.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidInputError {
    /// Flop and hit rates together exceed the whole cohort.
    #[error("flop rate {flop} + hit rate {hit} exceeds 100%")]
    RatesExceedUnity { flop: Decimal, hit: Decimal },
    /// A probability outside [0,1].
    #[error("{field} must be within [0,1], got {value}")]
    RateOutOfRange { field: ParamField, value: Decimal },
    /// Costs must be strictly positive.
    #[error("{field} must be > 0, got {value}")]
    NonPositiveCost { field: ParamField, value: Decimal },
    /// The cohort must contain at least one production.
    #[error("portfolio_size must be at least 1")]
    EmptyPortfolio,
    /// Costs and cohort size are bounded so the arithmetic cannot overflow.
    #[error("{field} must be at most {limit}, got {value}")]
    ExceedsLimit {
        field: ParamField,
        value: Decimal,
        limit: Decimal,
    },
    /// A revenue multiplier or contract share outside [0, `MAX_MULTIPLE`].
    #[error("model term {term} must be within [0,{}], got {value}", MAX_MULTIPLE)]
    TermOutOfRange { term: &'static str, value: Decimal },
}

fn check_cost(field: ParamField, value: Decimal) -> Result<(), InvalidInputError> {
    if value <= Decimal::ZERO {
        return Err(InvalidInputError::NonPositiveCost { field, value });
    }
    let limit = Decimal::from(MAX_COST);
    if value > limit {
        return Err(InvalidInputError::ExceedsLimit {
            field,
            value,
            limit,
        });
    }
    Ok(())
}

/// Validate model parameters and derive the outcome mix.
pub fn validate_params(params: &ModelParams) -> Result<OutcomeMix, InvalidInputError> {
    check_cost(ParamField::TvCost, params.tv_cost)?;
    check_cost(ParamField::PilotCost, params.pilot_cost)?;
    if params.portfolio_size == 0 {
        return Err(InvalidInputError::EmptyPortfolio);
    }
    if params.portfolio_size > MAX_PORTFOLIO_SIZE {
        return Err(InvalidInputError::ExceedsLimit {
            field: ParamField::PortfolioSize,
            value: params.shows(),
            limit: Decimal::from(MAX_PORTFOLIO_SIZE),
        });
    }
    OutcomeMix::from_rates(params.flop_rate, params.hit_rate)
}

/// An interactive input control: inclusive bounds, step and default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRange {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
    pub default: Decimal,
}

impl ControlRange {
    /// Whether `value` lies between `min` and `max` inclusive.
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }

    /// Every stop on the control, from `min` to `max` inclusive.
    pub fn steps(&self) -> Vec<Decimal> {
        inclusive_steps(self.min, self.max, self.step)
    }
}

/// `start, start + step, ...` up to and including `end`.
///
/// A non-positive step yields `start` alone. Callers bound the count.
pub fn inclusive_steps(start: Decimal, end: Decimal, step: Decimal) -> Vec<Decimal> {
    if step <= Decimal::ZERO {
        return vec![start];
    }
    let mut out = Vec::new();
    let mut v = start;
    while v <= end {
        out.push(v);
        v += step;
    }
    out
}

/// Ranges of the controls a front end offers for the model inputs.
///
/// These bound the interface, not the model: values outside them are still
/// evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputControls {
    pub tv_cost: ControlRange,
    pub pilot_cost: ControlRange,
    pub flop_rate: ControlRange,
    pub hit_rate: ControlRange,
}

impl InputControls {
    /// Cost sliders 20–100 and 1.0–5.0, rate sliders 30–80% and 5–30%.
    pub fn standard() -> Self {
        Self {
            tv_cost: ControlRange {
                min: dec!(20),
                max: dec!(100),
                step: dec!(5),
                default: dec!(50),
            },
            pilot_cost: ControlRange {
                min: dec!(1.0),
                max: dec!(5.0),
                step: dec!(0.5),
                default: dec!(2.0),
            },
            flop_rate: ControlRange {
                min: dec!(0.30),
                max: dec!(0.80),
                step: dec!(0.05),
                default: dec!(0.60),
            },
            hit_rate: ControlRange {
                min: dec!(0.05),
                max: dec!(0.30),
                step: dec!(0.05),
                default: dec!(0.10),
            },
        }
    }

    /// Parameters at each control's default position.
    pub fn default_params(&self) -> ModelParams {
        ModelParams {
            tv_cost: self.tv_cost.default,
            pilot_cost: self.pilot_cost.default,
            flop_rate: self.flop_rate.default,
            hit_rate: self.hit_rate.default,
            portfolio_size: DEFAULT_PORTFOLIO_SIZE,
        }
    }

    /// Fields of `params` lying outside their control range.
    pub fn out_of_range(&self, params: &ModelParams) -> Vec<ParamField> {
        [
            (ParamField::TvCost, self.tv_cost, params.tv_cost),
            (ParamField::PilotCost, self.pilot_cost, params.pilot_cost),
            (ParamField::FlopRate, self.flop_rate, params.flop_rate),
            (ParamField::HitRate, self.hit_rate, params.hit_rate),
        ]
        .into_iter()
        .filter(|(_, range, value)| !range.contains(*value))
        .map(|(field, _, _)| field)
        .collect()
    }
}

impl Default for InputControls {
    fn default() -> Self {
        Self::standard()
    }
}

/// Scenario file: a named set of overrides on the reference parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: Option<String>,
    pub tv_cost: Option<Decimal>,
    pub pilot_cost: Option<Decimal>,
    pub flop_rate: Option<Decimal>,
    pub hit_rate: Option<Decimal>,
    pub portfolio_size: Option<u32>,
}

impl Scenario {
    /// Apply the overrides on top of `ModelParams::reference()`.
    pub fn into_params(self) -> ModelParams {
        self.apply(ModelParams::reference())
    }

    /// Apply the overrides on top of `base`.
    pub fn apply(self, base: ModelParams) -> ModelParams {
        ModelParams {
            tv_cost: self.tv_cost.unwrap_or(base.tv_cost),
            pilot_cost: self.pilot_cost.unwrap_or(base.pilot_cost),
            flop_rate: self.flop_rate.unwrap_or(base.flop_rate),
            hit_rate: self.hit_rate.unwrap_or(base.hit_rate),
            portfolio_size: self.portfolio_size.unwrap_or(base.portfolio_size),
        }
    }
}

/// Failures while reading a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Parse a scenario from YAML text.
pub fn parse_scenario(text: &str) -> Result<Scenario, ScenarioError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Read and parse a scenario YAML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenario(&text)
}
