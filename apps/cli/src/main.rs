#![deny(warnings)]

//! Headless CLI for evaluating and sweeping the content EV model.

mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ev_core::{load_scenario, ControlRange, InputControls, ModelParams, Scenario};
use ev_report::Dashboard;
use ev_sweep::RateAxis;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Compare legacy direct-to-TV production with micro-pilot gated production.
#[derive(Parser)]
#[command(name = "content-ev")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")"))]
#[command(long_about = None, propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate both strategies for one parameter set
    Evaluate(ParamArgs),
    /// Evaluate a grid of flop and hit rates
    Sweep(SweepArgs),
}

/// Model inputs. Flags override the scenario file, which overrides the
/// reference defaults.
#[derive(Args, Debug)]
struct ParamArgs {
    /// YAML scenario file with parameter overrides
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Legacy TV production cost per show (₹ Cr)
    #[arg(long)]
    tv_cost: Option<Decimal>,
    /// Micro-pilot cost per show (₹ Cr)
    #[arg(long)]
    pilot_cost: Option<Decimal>,
    /// Flop probability as a fraction, e.g. 0.6
    #[arg(long)]
    flop_rate: Option<Decimal>,
    /// Hit probability as a fraction, e.g. 0.1
    #[arg(long)]
    hit_rate: Option<Decimal>,
    /// Number of shows in the cohort
    #[arg(long)]
    portfolio_size: Option<u32>,
}

impl ParamArgs {
    fn resolve(&self) -> Result<(String, ModelParams)> {
        let scenario = match &self.scenario {
            Some(path) => load_scenario(path)
                .with_context(|| format!("cannot load scenario {}", path.display()))?,
            None => Scenario::default(),
        };
        let name = scenario
            .name
            .clone()
            .unwrap_or_else(|| "reference".to_string());
        let flags = Scenario {
            name: None,
            tv_cost: self.tv_cost,
            pilot_cost: self.pilot_cost,
            flop_rate: self.flop_rate,
            hit_rate: self.hit_rate,
            portfolio_size: self.portfolio_size,
        };
        let params = flags.apply(scenario.into_params());
        for field in InputControls::standard().out_of_range(&params) {
            warn!(%field, "input outside the interactive control range");
        }
        Ok((name, params))
    }
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[command(flatten)]
    params: ParamArgs,
    /// First flop rate of the grid
    #[arg(long)]
    flop_start: Option<Decimal>,
    /// Last flop rate of the grid
    #[arg(long)]
    flop_end: Option<Decimal>,
    #[arg(long)]
    flop_step: Option<Decimal>,
    /// First hit rate of the grid
    #[arg(long)]
    hit_start: Option<Decimal>,
    /// Last hit rate of the grid
    #[arg(long)]
    hit_end: Option<Decimal>,
    #[arg(long)]
    hit_step: Option<Decimal>,
}

fn axis(
    range: &ControlRange,
    start: Option<Decimal>,
    end: Option<Decimal>,
    step: Option<Decimal>,
) -> Result<RateAxis> {
    Ok(RateAxis::new(
        start.unwrap_or(range.min),
        end.unwrap_or(range.max),
        step.unwrap_or(range.step),
    )?)
}

fn run_evaluate(args: &ParamArgs, format: OutputFormat) -> Result<()> {
    let (name, params) = args.resolve()?;
    info!(scenario = %name, "evaluating portfolio");
    let evaluation = ev_model::evaluate(&params).context("cannot evaluate portfolio")?;
    let dashboard = Dashboard::from_evaluation(&evaluation);
    match format {
        OutputFormat::Table => output::print_dashboard(&name, &evaluation, &dashboard),
        OutputFormat::Json => output::print_json(&output::EvaluateOutput {
            scenario: &name,
            evaluation: &evaluation,
            dashboard: &dashboard,
        })?,
    }
    Ok(())
}

fn run_sweep(args: &SweepArgs, format: OutputFormat) -> Result<()> {
    let (name, params) = args.params.resolve()?;
    let controls = InputControls::standard();
    let flop_axis = axis(
        &controls.flop_rate,
        args.flop_start,
        args.flop_end,
        args.flop_step,
    )?;
    let hit_axis = axis(
        &controls.hit_rate,
        args.hit_start,
        args.hit_end,
        args.hit_step,
    )?;
    info!(scenario = %name, "sweeping flop and hit rates");
    let report =
        ev_sweep::sweep(&params, flop_axis, hit_axis).context("cannot sweep portfolio")?;
    let break_even = match ev_sweep::break_even_pilot_cost(&params) {
        Ok(cost) => cost,
        Err(e) => {
            warn!(error = %e, "no break-even for the base rates");
            None
        }
    };
    match format {
        OutputFormat::Table => output::print_sweep(&name, &report, break_even),
        OutputFormat::Json => output::print_json(&output::SweepOutput {
            scenario: &name,
            report: &report,
            break_even_pilot_cost: break_even,
        })?,
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging goes to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Evaluate(args) => run_evaluate(args, cli.format),
        Commands::Sweep(args) => run_sweep(args, cli.format),
    }
}
