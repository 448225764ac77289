#![deny(warnings)]

//! Portfolio economics model: legacy vs. micro-pilot gated production.
//!
//! A closed-form expected-value calculation over a cohort of productions:
//! - Legacy: every show is fully produced and aired
//! - Proposed: every show is piloted, flops are vaulted, survivors are
//!   produced under a variable 70/30 contract
//!
//! The ROI difference is decomposed into an ordered value bridge whose
//! running total reconciles exactly from the legacy to the proposed ROI.

use ev_core::{
    validate_params, ContractTerms, InvalidInputError, ModelParams, OutcomeMix,
    RevenueMultipliers,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cost, revenue and ROI of the direct-to-TV strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyOutcome {
    pub cost: Decimal,
    pub revenue: Decimal,
    pub roi: Decimal,
}

/// Cost, revenue and ROI of the pilot-gated strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedOutcome {
    /// Universal pilot spend across the cohort.
    pub pilot_spend: Decimal,
    /// Full production of surviving shows under the variable contract.
    pub production_cost: Decimal,
    /// `pilot_spend + production_cost`.
    pub cost: Decimal,
    /// Flops earn nothing: their IP is withheld from air.
    pub revenue: Decimal,
    pub roi: Decimal,
}

/// Expected number of shows per outcome in the cohort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortCounts {
    /// Shows stopped at the pilot gate.
    pub flops_killed: Decimal,
    pub average: Decimal,
    pub hits: Decimal,
}

/// Named contributions between the legacy and proposed ROI, in bridge order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeFactor {
    /// Legacy production cost avoided on shows that would have flopped.
    SavedTvProductionOnFlops,
    /// Universal pilot spend.
    MicroPilotCosts,
    /// Revenue legacy would have earned by airing its flops.
    LostSalvageRevenue,
    /// Whatever remains to reconcile to the proposed ROI.
    ContractImpact,
}

impl BridgeFactor {
    pub const ORDER: [BridgeFactor; 4] = [
        BridgeFactor::SavedTvProductionOnFlops,
        BridgeFactor::MicroPilotCosts,
        BridgeFactor::LostSalvageRevenue,
        BridgeFactor::ContractImpact,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BridgeFactor::SavedTvProductionOnFlops => "saved_tv_production_on_flops",
            BridgeFactor::MicroPilotCosts => "micro_pilot_costs",
            BridgeFactor::LostSalvageRevenue => "lost_salvage_revenue",
            BridgeFactor::ContractImpact => "contract_impact",
        }
    }
}

/// One signed step of the value bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStep {
    pub factor: BridgeFactor,
    pub delta: Decimal,
    /// Opening value plus every delta up to and including this one.
    pub running_total: Decimal,
}

/// Waterfall from `opening` (legacy ROI) to `closing` (proposed ROI).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueBridge {
    pub opening: Decimal,
    pub steps: Vec<BridgeStep>,
    pub closing: Decimal,
}

impl ValueBridge {
    /// Build the bridge; the contract step absorbs the residual so the
    /// running total lands on `closing` exactly.
    fn reconcile(
        opening: Decimal,
        closing: Decimal,
        saved: Decimal,
        pilots: Decimal,
        salvage: Decimal,
    ) -> Self {
        let contract = closing - opening - saved - pilots - salvage;
        let mut running_total = opening;
        let steps = BridgeFactor::ORDER
            .into_iter()
            .zip([saved, pilots, salvage, contract])
            .map(|(factor, delta)| {
                running_total += delta;
                BridgeStep {
                    factor,
                    delta,
                    running_total,
                }
            })
            .collect();
        Self {
            opening,
            steps,
            closing,
        }
    }

    /// Sum of every step's delta.
    pub fn total_delta(&self) -> Decimal {
        self.steps.iter().map(|s| s.delta).sum()
    }

    pub fn step(&self, factor: BridgeFactor) -> Option<&BridgeStep> {
        self.steps.iter().find(|s| s.factor == factor)
    }

    /// Whether the last running total equals the closing row.
    pub fn reconciles(&self) -> bool {
        let last = self.steps.last().map_or(self.opening, |s| s.running_total);
        last == self.closing
    }
}

/// Capital burned on outcomes that never monetize vs. the rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalAllocation {
    pub wasted_capital: Decimal,
    pub productive_capital: Decimal,
}

impl CapitalAllocation {
    fn from_total(total: Decimal, wasted_capital: Decimal) -> Self {
        Self {
            wasted_capital,
            productive_capital: total - wasted_capital,
        }
    }

    pub fn total(&self) -> Decimal {
        self.wasted_capital + self.productive_capital
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalSplit {
    pub legacy: CapitalAllocation,
    pub proposed: CapitalAllocation,
}

/// Full result set of one evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Inputs the result was computed from.
    pub params: ModelParams,
    pub mix: OutcomeMix,
    pub cohort: CohortCounts,
    pub legacy: LegacyOutcome,
    pub proposed: ProposedOutcome,
    /// `proposed.roi - legacy.roi`.
    pub cash_freed: Decimal,
    pub value_bridge: ValueBridge,
    pub capital_split: CapitalSplit,
}

impl Evaluation {
    /// Derived share of average-outcome shows.
    pub fn avg_rate(&self) -> Decimal {
        self.mix.average
    }
}

/// The model's assumptions: revenue multipliers and contract terms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub revenue: RevenueMultipliers,
    pub contract: ContractTerms,
}

impl Model {
    pub fn standard() -> Self {
        Self {
            revenue: RevenueMultipliers::standard(),
            contract: ContractTerms::standard(),
        }
    }

    /// Evaluate both strategies for `params`.
    ///
    /// Input is validated before anything is computed; on failure no partial
    /// result exists.
    pub fn evaluate(&self, params: &ModelParams) -> Result<Evaluation, InvalidInputError> {
        let mix = self
            .revenue
            .validate()
            .and_then(|_| self.contract.validate())
            .and_then(|_| validate_params(params))
            .map_err(|e| {
                warn!(error = %e, "rejected model input");
                e
            })?;

        let n = params.shows();
        let tv = params.tv_cost;
        let pilot = params.pilot_cost;
        let rev = self.revenue.per_show(tv);

        let cohort = CohortCounts {
            flops_killed: n * mix.flop,
            average: n * mix.average,
            hits: n * mix.hit,
        };

        // Legacy: everything is produced and aired.
        let legacy_cost = n * tv;
        let legacy_revenue =
            n * (mix.flop * rev.flop + mix.average * rev.average + mix.hit * rev.hit);
        let legacy = LegacyOutcome {
            cost: legacy_cost,
            revenue: legacy_revenue,
            roi: legacy_revenue - legacy_cost,
        };

        // Proposed: pilot all, produce survivors under the variable contract.
        let pilot_spend = n * pilot;
        let average_show_cost = pilot + self.contract.average_multiple() * tv;
        let hit_show_cost = pilot + self.contract.hit_multiple() * tv;
        let production_cost = cohort.average * average_show_cost + cohort.hits * hit_show_cost;
        let proposed_cost = pilot_spend + production_cost;
        let proposed_revenue = cohort.average * rev.average + cohort.hits * rev.hit;
        let proposed = ProposedOutcome {
            pilot_spend,
            production_cost,
            cost: proposed_cost,
            revenue: proposed_revenue,
            roi: proposed_revenue - proposed_cost,
        };

        let cash_freed = proposed.roi - legacy.roi;

        let value_bridge = ValueBridge::reconcile(
            legacy.roi,
            proposed.roi,
            cohort.flops_killed * tv,
            -pilot_spend,
            -(cohort.flops_killed * rev.flop),
        );

        let capital_split = CapitalSplit {
            legacy: CapitalAllocation::from_total(legacy.cost, cohort.flops_killed * tv),
            proposed: CapitalAllocation::from_total(proposed.cost, cohort.flops_killed * pilot),
        };

        debug!(
            legacy_roi = %legacy.roi,
            proposed_roi = %proposed.roi,
            %cash_freed,
            "evaluated portfolio"
        );

        Ok(Evaluation {
            params: params.clone(),
            mix,
            cohort,
            legacy,
            proposed,
            cash_freed,
            value_bridge,
            capital_split,
        })
    }
}

/// Evaluate `params` under the standard assumptions.
///
/// Example:
/// let eval = evaluate(&ModelParams::reference()).unwrap();
/// assert_eq!(eval.cash_freed, dec!(224.5));
pub fn evaluate(params: &ModelParams) -> Result<Evaluation, InvalidInputError> {
    Model::standard().evaluate(params)
}
