//! Terminal and JSON rendering.

use anyhow::Result;
use ev_model::Evaluation;
use ev_report::{format_crore, Dashboard, Measure};
use ev_sweep::{SweepCell, SweepReport};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Serialize)]
pub struct EvaluateOutput<'a> {
    pub scenario: &'a str,
    pub evaluation: &'a Evaluation,
    pub dashboard: &'a Dashboard,
}

#[derive(Serialize)]
pub struct SweepOutput<'a> {
    pub scenario: &'a str,
    pub report: &'a SweepReport,
    pub break_even_pilot_cost: Option<Decimal>,
}

pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

#[derive(Tabled)]
struct WaterfallRow {
    #[tabled(rename = "Step")]
    label: String,
    #[tabled(rename = "Measure")]
    measure: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Running total")]
    running_total: String,
}

#[derive(Tabled)]
struct CapitalRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Wasted (flops)")]
    wasted: String,
    #[tabled(rename = "Productive")]
    productive: String,
    #[tabled(rename = "Total deployed")]
    total: String,
}

#[derive(Tabled)]
struct SweepRow {
    #[tabled(rename = "Flop")]
    flop: String,
    #[tabled(rename = "Hit")]
    hit: String,
    #[tabled(rename = "Legacy ROI")]
    legacy_roi: String,
    #[tabled(rename = "Proposed ROI")]
    proposed_roi: String,
    #[tabled(rename = "Cash freed")]
    cash_freed: String,
}

fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

fn measure_name(m: Measure) -> &'static str {
    match m {
        Measure::Absolute => "absolute",
        Measure::Relative => "relative",
        Measure::Total => "total",
    }
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn print_dashboard(name: &str, e: &Evaluation, d: &Dashboard) {
    let p = &e.params;
    println!(
        "Scenario: {} | shows: {} | TV cost: {} | pilot cost: {} | flop: {} | hit: {} | average: {}",
        name,
        p.portfolio_size,
        format_crore(p.tv_cost),
        format_crore(p.pilot_cost),
        percent(e.mix.flop),
        percent(e.mix.hit),
        percent(e.mix.average),
    );
    println!();
    for card in &d.cards {
        println!("{:<28} {:>16}   {}", card.label, card.display, card.caption);
    }

    println!();
    println!("Value bridge (legacy to proposed)");
    let rows = d
        .waterfall
        .iter()
        .map(|b| WaterfallRow {
            label: b.label.clone(),
            measure: measure_name(b.measure),
            value: b.text.clone(),
            running_total: format_crore(b.running_total),
        })
        .collect();
    println!("{}", table::<WaterfallRow>(rows));

    println!();
    println!("Capital deployment");
    let rows = d
        .capital
        .iter()
        .map(|c| CapitalRow {
            model: c.model.clone(),
            wasted: format_crore(c.wasted),
            productive: format_crore(c.productive),
            total: format_crore(c.total()),
        })
        .collect();
    println!("{}", table::<CapitalRow>(rows));
}

pub fn print_sweep(name: &str, report: &SweepReport, break_even: Option<Decimal>) {
    let p = &report.base;
    println!(
        "Scenario: {} | shows: {} | TV cost: {} | pilot cost: {}",
        name,
        p.portfolio_size,
        format_crore(p.tv_cost),
        format_crore(p.pilot_cost),
    );
    let rows = report
        .cells
        .iter()
        .map(|cell| match cell {
            SweepCell::Feasible(s) => SweepRow {
                flop: percent(s.flop_rate),
                hit: percent(s.hit_rate),
                legacy_roi: format_crore(s.legacy_roi),
                proposed_roi: format_crore(s.proposed_roi),
                cash_freed: format_crore(s.cash_freed),
            },
            SweepCell::Infeasible {
                flop_rate,
                hit_rate,
            } => SweepRow {
                flop: percent(*flop_rate),
                hit: percent(*hit_rate),
                legacy_roi: "-".to_string(),
                proposed_roi: "-".to_string(),
                cash_freed: "infeasible".to_string(),
            },
        })
        .collect();
    println!("{}", table::<SweepRow>(rows));

    println!(
        "cells: {} | infeasible: {}",
        report.cells.len(),
        report.infeasible_count()
    );
    if let Some(best) = report.best() {
        println!(
            "best: flop {} / hit {} frees {}",
            percent(best.flop_rate),
            percent(best.hit_rate),
            format_crore(best.cash_freed)
        );
    }
    match break_even {
        Some(cost) => println!("break-even pilot cost: {}", format_crore(cost)),
        None => println!("break-even pilot cost: none"),
    }
}
