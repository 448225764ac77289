#![deny(warnings)]

//! Sensitivity sweeps over the portfolio economics model.
//!
//! Every cell is an independent evaluation with no shared state, so grids
//! are evaluated in parallel.

use ev_core::{inclusive_steps, ControlRange, InvalidInputError, ModelParams};
use ev_model::{evaluate, Evaluation};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Most points a single axis may hold.
pub const MAX_AXIS_POINTS: u64 = 1_001;

#[derive(Debug, Error, PartialEq)]
pub enum SweepError {
    /// Axis bounds must lie in [0,1] with start <= end, and step must be > 0.
    #[error("invalid axis {start}..={end} step {step}")]
    InvalidAxis {
        start: Decimal,
        end: Decimal,
        step: Decimal,
    },
    /// The step is too fine for the range.
    #[error("axis {start}..={end} step {step} exceeds {limit} points")]
    TooManyPoints {
        start: Decimal,
        end: Decimal,
        step: Decimal,
        limit: u64,
    },
    /// Base parameters are invalid independently of the swept rates.
    #[error(transparent)]
    Input(#[from] InvalidInputError),
}

/// Inclusive grid of rate values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateAxis {
    pub start: Decimal,
    pub end: Decimal,
    pub step: Decimal,
}

impl RateAxis {
    pub fn new(start: Decimal, end: Decimal, step: Decimal) -> Result<Self, SweepError> {
        let in_unit = |v: Decimal| v >= Decimal::ZERO && v <= Decimal::ONE;
        if step <= Decimal::ZERO || start > end || !in_unit(start) || !in_unit(end) {
            return Err(SweepError::InvalidAxis { start, end, step });
        }
        let limit = MAX_AXIS_POINTS;
        let within = (end - start)
            .checked_div(step)
            .is_some_and(|intervals| intervals.floor() < Decimal::from(limit));
        if !within {
            return Err(SweepError::TooManyPoints {
                start,
                end,
                step,
                limit,
            });
        }
        Ok(Self { start, end, step })
    }

    /// Axis covering every stop of an input control.
    pub fn from_control(range: &ControlRange) -> Result<Self, SweepError> {
        Self::new(range.min, range.max, range.step)
    }

    pub fn points(&self) -> Vec<Decimal> {
        inclusive_steps(self.start, self.end, self.step)
    }
}

/// Headline figures of one feasible cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSummary {
    pub flop_rate: Decimal,
    pub hit_rate: Decimal,
    pub legacy_roi: Decimal,
    pub proposed_roi: Decimal,
    pub cash_freed: Decimal,
}

impl From<&Evaluation> for CellSummary {
    fn from(e: &Evaluation) -> Self {
        Self {
            flop_rate: e.params.flop_rate,
            hit_rate: e.params.hit_rate,
            legacy_roi: e.legacy.roi,
            proposed_roi: e.proposed.roi,
            cash_freed: e.cash_freed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepCell {
    Feasible(CellSummary),
    /// Flop and hit rates exceed the cohort; never evaluated.
    Infeasible { flop_rate: Decimal, hit_rate: Decimal },
}

impl SweepCell {
    pub fn rates(&self) -> (Decimal, Decimal) {
        match self {
            SweepCell::Feasible(s) => (s.flop_rate, s.hit_rate),
            SweepCell::Infeasible {
                flop_rate,
                hit_rate,
            } => (*flop_rate, *hit_rate),
        }
    }

    pub fn summary(&self) -> Option<&CellSummary> {
        match self {
            SweepCell::Feasible(s) => Some(s),
            SweepCell::Infeasible { .. } => None,
        }
    }
}

/// Grid of cells in row-major order: flop rate outer, hit rate inner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub base: ModelParams,
    pub flop_axis: RateAxis,
    pub hit_axis: RateAxis,
    pub cells: Vec<SweepCell>,
}

impl SweepReport {
    pub fn feasible(&self) -> impl Iterator<Item = &CellSummary> {
        self.cells.iter().filter_map(SweepCell::summary)
    }

    pub fn infeasible_count(&self) -> usize {
        self.cells.iter().filter(|c| c.summary().is_none()).count()
    }

    /// Feasible cell with the largest cash freed; ties keep the first.
    pub fn best(&self) -> Option<&CellSummary> {
        self.feasible().fold(None, |best: Option<&CellSummary>, c| match best {
            Some(b) if b.cash_freed >= c.cash_freed => Some(b),
            _ => Some(c),
        })
    }
}

/// Evaluate every (flop, hit) pair of the axes, holding costs and portfolio
/// size of `base` fixed.
pub fn sweep(
    base: &ModelParams,
    flop_axis: RateAxis,
    hit_axis: RateAxis,
) -> Result<SweepReport, SweepError> {
    let hits = hit_axis.points();
    let pairs: Vec<(Decimal, Decimal)> = flop_axis
        .points()
        .into_iter()
        .flat_map(|f| hits.iter().map(move |&h| (f, h)))
        .collect();

    let cells = pairs
        .par_iter()
        .map(|&(flop_rate, hit_rate)| {
            let params = ModelParams {
                flop_rate,
                hit_rate,
                ..base.clone()
            };
            match evaluate(&params) {
                Ok(e) => Ok(SweepCell::Feasible(CellSummary::from(&e))),
                Err(InvalidInputError::RatesExceedUnity { .. }) => Ok(SweepCell::Infeasible {
                    flop_rate,
                    hit_rate,
                }),
                Err(e) => Err(SweepError::from(e)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let report = SweepReport {
        base: base.clone(),
        flop_axis,
        hit_axis,
        cells,
    };
    info!(
        cells = report.cells.len(),
        infeasible = report.infeasible_count(),
        "sweep complete"
    );
    Ok(report)
}

/// Evaluate `base` at each pilot cost.
pub fn sweep_pilot_costs(
    base: &ModelParams,
    costs: &[Decimal],
) -> Result<Vec<Evaluation>, InvalidInputError> {
    costs
        .par_iter()
        .map(|&pilot_cost| {
            evaluate(&ModelParams {
                pilot_cost,
                ..base.clone()
            })
        })
        .collect()
}

/// Pilot cost at which the proposed strategy frees no cash.
///
/// Cash freed falls linearly with pilot cost: every show is piloted once and
/// every survivor carries the pilot again, a slope of `-N·(2 - f)`. Returns
/// `None` when the break-even would not be a positive cost.
pub fn break_even_pilot_cost(params: &ModelParams) -> Result<Option<Decimal>, InvalidInputError> {
    let e = evaluate(params)?;
    let slope = params.shows() * (Decimal::from(2) - e.mix.flop);
    let intercept = e.cash_freed + slope * params.pilot_cost;
    let cost = intercept / slope;
    Ok((cost > Decimal::ZERO).then_some(cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::InputControls;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn control_axes() -> (RateAxis, RateAxis) {
        let controls = InputControls::standard();
        (
            RateAxis::from_control(&controls.flop_rate).unwrap(),
            RateAxis::from_control(&controls.hit_rate).unwrap(),
        )
    }

    #[test]
    fn axis_rejects_bad_step() {
        assert!(RateAxis::new(dec!(0.1), dec!(0.5), Decimal::ZERO).is_err());
        assert!(RateAxis::new(dec!(0.5), dec!(0.1), dec!(0.1)).is_err());
        assert_eq!(
            RateAxis::new(dec!(0.1), dec!(0.1), dec!(0.1)).unwrap().points(),
            vec![dec!(0.1)]
        );
    }

    #[test]
    fn axis_bounds_must_be_probabilities() {
        assert!(matches!(
            RateAxis::new(dec!(0.3), dec!(1.5), dec!(0.1)),
            Err(SweepError::InvalidAxis { .. })
        ));
        assert!(matches!(
            RateAxis::new(dec!(-0.1), dec!(0.5), dec!(0.1)),
            Err(SweepError::InvalidAxis { .. })
        ));
        assert_eq!(
            RateAxis::new(Decimal::ZERO, Decimal::ONE, dec!(0.5)).unwrap().points(),
            vec![Decimal::ZERO, dec!(0.5), Decimal::ONE]
        );
    }

    #[test]
    fn fine_steps_are_capped() {
        assert!(matches!(
            RateAxis::new(dec!(0.3), dec!(0.3), dec!(0.0000001)),
            Ok(_)
        ));
        assert!(matches!(
            RateAxis::new(dec!(0.05), dec!(0.30), dec!(0.0000001)),
            Err(SweepError::TooManyPoints { limit: MAX_AXIS_POINTS, .. })
        ));
        assert!(matches!(
            RateAxis::new(Decimal::ZERO, Decimal::ONE, Decimal::new(1, 28)),
            Err(SweepError::TooManyPoints { .. })
        ));
        let widest = RateAxis::new(Decimal::ZERO, Decimal::ONE, dec!(0.001)).unwrap();
        assert_eq!(widest.points().len() as u64, MAX_AXIS_POINTS);
    }

    #[test]
    fn control_grid_marks_infeasible_cells() {
        let (f, h) = control_axes();
        let report = sweep(&ModelParams::reference(), f, h).unwrap();
        assert_eq!(report.cells.len(), 11 * 6);
        // (0.75, 0.30), (0.80, 0.25), (0.80, 0.30)
        assert_eq!(report.infeasible_count(), 3);
        for cell in &report.cells {
            let (flop, hit) = cell.rates();
            assert_eq!(cell.summary().is_none(), flop + hit > Decimal::ONE);
        }
    }

    #[test]
    fn cells_are_row_major() {
        let (f, h) = control_axes();
        let report = sweep(&ModelParams::reference(), f, h).unwrap();
        assert_eq!(report.cells[0].rates(), (dec!(0.30), dec!(0.05)));
        assert_eq!(report.cells[1].rates(), (dec!(0.30), dec!(0.10)));
        assert_eq!(report.cells[6].rates(), (dec!(0.35), dec!(0.05)));
    }

    #[test]
    fn sweep_cell_matches_single_evaluation() {
        let (f, h) = control_axes();
        let report = sweep(&ModelParams::reference(), f, h).unwrap();
        let cell = report
            .feasible()
            .find(|c| c.flop_rate == dec!(0.60) && c.hit_rate == dec!(0.10))
            .unwrap();
        assert_eq!(cell.cash_freed, dec!(224.5));
        assert_eq!(cell.proposed_roi, dec!(49.5));
    }

    #[test]
    fn best_cell_has_max_cash_freed() {
        let (f, h) = control_axes();
        let report = sweep(&ModelParams::reference(), f, h).unwrap();
        let best = report.best().unwrap();
        assert!(report.feasible().all(|c| c.cash_freed <= best.cash_freed));
    }

    #[test]
    fn invalid_base_costs_fail_the_sweep() {
        let mut base = ModelParams::reference();
        base.tv_cost = Decimal::ZERO;
        let (f, h) = control_axes();
        assert!(matches!(sweep(&base, f, h), Err(SweepError::Input(_))));
    }

    #[test]
    fn pilot_cost_sweep_declines() {
        let costs = InputControls::standard().pilot_cost.steps();
        let evals = sweep_pilot_costs(&ModelParams::reference(), &costs).unwrap();
        assert_eq!(evals.len(), costs.len());
        for pair in evals.windows(2) {
            assert!(pair[1].cash_freed < pair[0].cash_freed);
            assert_eq!(pair[1].legacy, pair[0].legacy);
        }
    }

    #[test]
    fn reference_break_even() {
        // 224.5 + 14 * 2 = 252.5 over a slope of 14
        let cost = break_even_pilot_cost(&ModelParams::reference())
            .unwrap()
            .unwrap();
        assert_eq!(cost, dec!(252.5) / dec!(14));
    }

    proptest! {
        #[test]
        fn break_even_zeroes_cash_freed(f in 30u32..=80, h in 5u32..=20, tv in 20i64..=100) {
            let p = ModelParams {
                tv_cost: Decimal::new(tv, 0),
                flop_rate: Decimal::new(f as i64, 2),
                hit_rate: Decimal::new(h as i64, 2),
                ..ModelParams::reference()
            };
            if let Some(cost) = break_even_pilot_cost(&p).unwrap() {
                let at = evaluate(&ModelParams { pilot_cost: cost, ..p }).unwrap();
                prop_assert!(at.cash_freed.abs() < dec!(0.000001));
            }
        }
    }
}
