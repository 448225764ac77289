#![deny(warnings)]

//! Display-ready view of an evaluation for dashboards and terminals.
//!
//! Nothing here renders; it shapes model output into the cards, waterfall
//! bars and capital series a front end draws.

use ev_model::{BridgeFactor, Evaluation};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Sign-driven styling of a figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    pub fn of(value: Decimal) -> Self {
        if value < Decimal::ZERO {
            Tone::Negative
        } else {
            Tone::Positive
        }
    }
}

/// A headline metric.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineCard {
    pub label: String,
    pub value: Decimal,
    /// `value` formatted in crore.
    pub display: String,
    pub tone: Tone,
    pub caption: String,
}

impl HeadlineCard {
    fn new(label: &str, value: Decimal, caption: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            display: format_crore(value),
            tone: Tone::of(value),
            caption: caption.to_string(),
        }
    }
}

/// How a waterfall bar is drawn relative to the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Starts from zero.
    Absolute,
    /// Floats on the previous running total.
    Relative,
    /// Closing bar, drawn from zero in its own style.
    Total,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterfallBar {
    pub label: String,
    pub measure: Measure,
    pub value: Decimal,
    pub running_total: Decimal,
    /// Bar annotation; relative gains carry an explicit `+`.
    pub text: String,
}

/// Stacked capital bar for one strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalBar {
    pub model: String,
    /// Burned on flops.
    pub wasted: Decimal,
    /// Invested in hits and average shows.
    pub productive: Decimal,
}

impl CapitalBar {
    pub fn total(&self) -> Decimal {
        self.wasted + self.productive
    }
}

/// Everything a dashboard shows for one evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub cards: Vec<HeadlineCard>,
    pub waterfall: Vec<WaterfallBar>,
    pub capital: Vec<CapitalBar>,
}

/// Waterfall label of a bridge step.
pub fn factor_label(factor: BridgeFactor) -> &'static str {
    match factor {
        BridgeFactor::SavedTvProductionOnFlops => "Saved TV Prod (Flops)",
        BridgeFactor::MicroPilotCosts => "Micro-Pilot Costs",
        BridgeFactor::LostSalvageRevenue => "Lost Salvage Rev",
        BridgeFactor::ContractImpact => "70/30 Contract Impact",
    }
}

impl Dashboard {
    pub fn from_evaluation(e: &Evaluation) -> Self {
        let cards = vec![
            HeadlineCard::new(
                "Legacy Portfolio Net ROI",
                e.legacy.roi,
                "High capital burn on flops",
            ),
            HeadlineCard::new(
                "Proposed Portfolio Net ROI",
                e.proposed.roi,
                "Flops vaulted early + optimized contracts",
            ),
            HeadlineCard::new(
                "Free Cash Flow Generated",
                e.cash_freed,
                "+ Added directly to EBITDA",
            ),
        ];

        let bridge = &e.value_bridge;
        let mut waterfall = Vec::with_capacity(bridge.steps.len() + 2);
        waterfall.push(WaterfallBar {
            label: "Legacy ROI".to_string(),
            measure: Measure::Absolute,
            value: bridge.opening,
            running_total: bridge.opening,
            text: format_crore(bridge.opening),
        });
        waterfall.extend(bridge.steps.iter().map(|s| WaterfallBar {
            label: factor_label(s.factor).to_string(),
            measure: Measure::Relative,
            value: s.delta,
            running_total: s.running_total,
            text: format_signed_crore(s.delta),
        }));
        waterfall.push(WaterfallBar {
            label: "Proposed ROI".to_string(),
            measure: Measure::Total,
            value: bridge.closing,
            running_total: bridge.closing,
            text: format_crore(bridge.closing),
        });

        let split = &e.capital_split;
        let capital = vec![
            CapitalBar {
                model: "Legacy Model".to_string(),
                wasted: split.legacy.wasted_capital,
                productive: split.legacy.productive_capital,
            },
            CapitalBar {
                model: "Proposed Model".to_string(),
                wasted: split.proposed.wasted_capital,
                productive: split.proposed.productive_capital,
            },
        ];

        Self {
            cards,
            waterfall,
            capital,
        }
    }
}

/// Format an amount in crore: `₹ 1,234.5 Cr`, one decimal, half away from zero.
pub fn format_crore(value: Decimal) -> String {
    format!("₹ {} Cr", group_one_decimal(value))
}

/// Like [`format_crore`] with a leading `+` on positive amounts.
pub fn format_signed_crore(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", format_crore(value))
    } else {
        format_crore(value)
    }
}

fn group_one_decimal(value: Decimal) -> String {
    let tenths = (value * Decimal::TEN)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(raw) = tenths.abs().to_u128() else {
        return value.round_dp(1).to_string();
    };
    let digits = (raw / 10).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if tenths < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{}", raw % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::ModelParams;
    use ev_model::evaluate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn crore_formatting() {
        assert_eq!(format_crore(dec!(224.5)), "₹ 224.5 Cr");
        assert_eq!(format_crore(dec!(-175)), "₹ -175.0 Cr");
        assert_eq!(format_crore(dec!(1234.56)), "₹ 1,234.6 Cr");
        assert_eq!(format_crore(dec!(1234567)), "₹ 1,234,567.0 Cr");
        assert_eq!(format_crore(dec!(0.05)), "₹ 0.1 Cr");
        assert_eq!(format_crore(dec!(-0.04)), "₹ 0.0 Cr");
        assert_eq!(format_signed_crore(dec!(300)), "+₹ 300.0 Cr");
        assert_eq!(format_signed_crore(dec!(-20)), "₹ -20.0 Cr");
    }

    #[test]
    fn reference_dashboard() {
        let e = evaluate(&ModelParams::reference()).unwrap();
        let d = Dashboard::from_evaluation(&e);

        assert_eq!(d.cards.len(), 3);
        assert_eq!(d.cards[0].display, "₹ -175.0 Cr");
        assert_eq!(d.cards[0].tone, Tone::Negative);
        assert_eq!(d.cards[1].display, "₹ 49.5 Cr");
        assert_eq!(d.cards[2].display, "₹ 224.5 Cr");
        assert_eq!(d.cards[2].tone, Tone::Positive);

        let labels: Vec<&str> = d.waterfall.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Legacy ROI",
                "Saved TV Prod (Flops)",
                "Micro-Pilot Costs",
                "Lost Salvage Rev",
                "70/30 Contract Impact",
                "Proposed ROI",
            ]
        );
        assert_eq!(d.waterfall[0].measure, Measure::Absolute);
        assert_eq!(d.waterfall[5].measure, Measure::Total);
        assert_eq!(d.waterfall[1].text, "+₹ 300.0 Cr");

        assert_eq!(d.capital[0].total(), dec!(500));
        assert_eq!(d.capital[1].total(), dec!(215.5));
    }

    proptest! {
        #[test]
        fn waterfall_lands_on_total(f in 0u32..=60, h in 0u32..=40, tv in 20i64..=100) {
            let p = ModelParams {
                tv_cost: Decimal::new(tv, 0),
                flop_rate: Decimal::new(f as i64, 2),
                hit_rate: Decimal::new(h as i64, 2),
                ..ModelParams::reference()
            };
            let d = Dashboard::from_evaluation(&evaluate(&p).unwrap());
            let relative_end = d.waterfall[d.waterfall.len() - 2].running_total;
            let total = d.waterfall.last().unwrap();
            prop_assert_eq!(relative_end, total.value);
        }
    }
}
