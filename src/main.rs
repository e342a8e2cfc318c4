//! Mineral Eval CLI
//!
//! Evaluates one deal file at flat prices, under a named price scenario, or
//! across every scenario of a price deck.
//!
//! Usage:
//!   mineral-eval deal.json --type-curves tc_library.csv --curve APPA_113
//!   mineral-eval deal.json --price-deck price_deck.csv --scenario Gas_3.0_Oil_60 --year4-flat
//!   mineral-eval deal.json --price-deck price_deck.csv --all-scenarios --json

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use mineral_eval::deal::load_deal;
use mineral_eval::{DeckCache, EvaluationSummary, MineralEvaluation, PricePolicy, ScenarioRunner};

/// Monthly cash-flow valuation of a mineral or royalty interest
#[derive(Parser)]
#[command(name = "mineral-eval", version)]
struct Args {
    /// Deal file (JSON)
    deal: PathBuf,

    /// Type-curve library CSV supplying gross gas volumes
    #[arg(long)]
    type_curves: Option<PathBuf>,

    /// Type curve to use; defaults to the deal's type_curve_id
    #[arg(long, requires = "type_curves")]
    curve: Option<String>,

    /// Price-scenario deck CSV
    #[arg(long)]
    price_deck: Option<PathBuf>,

    /// Scenario name, e.g. Gas_3.0_Oil_60
    #[arg(long, requires = "price_deck")]
    scenario: Option<String>,

    /// Evaluate every scenario in the price deck
    #[arg(long, requires = "price_deck", conflicts_with = "scenario")]
    all_scenarios: bool,

    #[arg(long)]
    cap_gas: Option<f64>,

    #[arg(long)]
    floor_gas: Option<f64>,

    #[arg(long)]
    cap_oil: Option<f64>,

    #[arg(long)]
    floor_oil: Option<f64>,

    /// Hold the year-4 average price flat after month 48
    #[arg(long)]
    year4_flat: bool,

    /// Write monthly cash flows to this CSV
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn price_policy(&self) -> PricePolicy {
        PricePolicy {
            cap_gas: self.cap_gas,
            floor_gas: self.floor_gas,
            cap_oil: self.cap_oil,
            floor_oil: self.floor_oil,
            year4_flat: self.year4_flat,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut deal = load_deal(&args.deal)
        .with_context(|| format!("loading deal file {}", args.deal.display()))?;

    let mut cache = DeckCache::new();

    if let Some(path) = &args.type_curves {
        let library = cache
            .type_curves(path)
            .with_context(|| format!("loading type curves from {}", path.display()))?;
        let curve_id = args.curve.clone().unwrap_or_else(|| deal.type_curve_id.clone());
        let curve = library.curve(&curve_id)?;
        log::info!(
            "Using type curve {} ({} months, EUR {:.1}, bench {})",
            curve.name,
            curve.months(),
            curve.eur,
            curve.bench
        );
        deal.monthly_gross_gas_volumes = curve.monthly_volumes.clone();
        deal.type_curve_id = curve_id;
        deal.validate()?;
    }

    let policy = args.price_policy();
    policy.validate()?;
    let runner = ScenarioRunner::new(deal, policy);

    let Some(deck_path) = &args.price_deck else {
        let eval = runner.run_flat()?;
        return report(&args, &eval);
    };

    let deck = cache
        .price_deck(deck_path)
        .with_context(|| format!("loading price deck from {}", deck_path.display()))?;

    if args.all_scenarios {
        let results = runner.run_scenarios(&deck)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            print_scenario_table(&results);
        }
        return Ok(());
    }

    let Some(name) = &args.scenario else {
        bail!(
            "--price-deck needs --scenario or --all-scenarios; available: {}",
            deck.scenario_names().join(", ")
        );
    };
    let eval = runner.run_named(&deck, name)?;
    report(&args, &eval)
}

fn report(args: &Args, eval: &MineralEvaluation) -> Result<()> {
    if let Some(path) = &args.output {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        for row in eval.cash_flows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!("Monthly cash flows written to: {}", path.display());
    }

    let summary = eval.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &EvaluationSummary) {
    println!("Deal: {}", summary.deal_name);
    println!("  Total NRI: {:.6}", summary.total_nri);
    println!("  Horizon: {} months", summary.horizon_months);
    println!("  IRR: {}", fmt_pct(summary.irr));
    println!("  MoM: {}", summary.mom.map_or("n/a".to_string(), |m| format!("{:.2}x", m)));
    println!(
        "  Payback: {}",
        summary.payback_month.map_or("n/a".to_string(), |m| format!("month {}", m))
    );
    println!();
    println!("  Total Revenue: {:.4}", summary.total_revenue);
    println!("  Total Opex: {:.4}", summary.total_opex);
    println!("  Total GP&T: {:.4}", summary.total_gpt);
    println!("  Total Tax: {:.4}", summary.total_tax);
    println!("  Total Capex: {:.4}", summary.total_capex);
    println!("  Total Investment: {:.4}", summary.total_investment);
    println!("  Cumulative Cash Flow: {:.4}", summary.cumulative_cash_flow);
    println!();
    println!("{:>8} {:>14}", "Rate", "NPV");
    println!("{}", "-".repeat(23));
    for entry in &summary.npv_by_rate {
        println!("{:>7.1}% {:>14.4}", entry.rate * 100.0, entry.npv);
    }
}

fn print_scenario_table(results: &[(String, EvaluationSummary)]) {
    println!("{:<20} {:>10} {:>8} {:>8} {:>14}", "Scenario", "IRR", "MoM", "Payback", "NPV10");
    println!("{}", "-".repeat(64));
    for (name, summary) in results {
        let npv10 = summary
            .npv_by_rate
            .iter()
            .find(|e| (e.rate - 0.10).abs() < 1e-12)
            .map_or("n/a".to_string(), |e| format!("{:.4}", e.npv));
        println!(
            "{:<20} {:>10} {:>8} {:>8} {:>14}",
            name,
            fmt_pct(summary.irr),
            summary.mom.map_or("n/a".to_string(), |m| format!("{:.2}x", m)),
            summary.payback_month.map_or("n/a".to_string(), |m| m.to_string()),
            npv10
        );
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or("n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}
