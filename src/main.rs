//! Interest Engine CLI
//!
//! Compare banks for a single deposit, search deposit splits, or list the
//! loaded rate table. The table is read from --rates, then RATES_PATH, and
//! falls back to the table compiled into the binary.
//! Optimizer settings can be overridden via OPTIMIZER_INCREMENT,
//! OPTIMIZER_TOLERANCE and OPTIMIZER_TOP_K.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use interest_engine::evaluator::Evaluation;
use interest_engine::optimizer::{
    optimize_with_spend, DepositOptimizer, LogProgress, OptimizerConfig, PlannedSolution,
};
use interest_engine::requirements::{format_amount, parse_amount};
use interest_engine::schedule::{load_schedules, BankSchedules};
use interest_engine::{compare_banks, Bank, RequirementProfile};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "interest_engine", version, about = "Tiered bank interest calculator")]
struct Cli {
    /// Rate table CSV (default: RATES_PATH, else the built-in table)
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interest at every bank for one deposit
    Compare {
        /// Deposit amount, e.g. 50000 or "$50,000"
        amount: String,
        #[command(flatten)]
        requirements: RequirementArgs,
    },
    /// Best ways to split a deposit (and card spend) across banks
    Optimize {
        /// Total deposit amount
        amount: String,
        /// Monthly card spend to route across the chosen banks
        #[arg(long, default_value = "0")]
        total_spend: String,
        #[command(flatten)]
        requirements: RequirementArgs,
    },
    /// Print the loaded rate table
    Rates,
}

#[derive(Args)]
struct RequirementArgs {
    /// Monthly salary credited (omit if none)
    #[arg(long)]
    salary: Option<String>,
    /// Monthly card spend
    #[arg(long, default_value = "0")]
    spend: String,
    /// GIRO / bill payments per month
    #[arg(long, default_value_t = 0)]
    giro: u32,
    #[arg(long)]
    insurance: bool,
    #[arg(long)]
    investments: bool,
    /// Average daily balance increased month on month
    #[arg(long)]
    increased_balance: bool,
    #[arg(long)]
    grew_wealth: bool,
}

impl RequirementArgs {
    fn profile(&self) -> Result<RequirementProfile> {
        let salary_amount = match &self.salary {
            Some(raw) => parse_amount("salary_amount", raw)?,
            None => 0.0,
        };
        Ok(RequirementProfile {
            has_salary: self.salary.is_some(),
            salary_amount,
            spend_amount: parse_amount("spend_amount", &self.spend)?,
            giro_count: self.giro,
            has_insurance: self.insurance,
            has_investments: self.investments,
            increased_balance: self.increased_balance,
            grew_wealth: self.grew_wealth,
        })
    }
}

fn load_rates(path: Option<PathBuf>) -> Result<BankSchedules> {
    let path = path.or_else(|| std::env::var_os("RATES_PATH").map(PathBuf::from));
    match path {
        Some(path) => {
            load_schedules(&path).with_context(|| format!("loading rate table {}", path.display()))
        }
        None => BankSchedules::published().context("loading built-in rate table"),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let schedules = load_rates(cli.rates)?;

    match cli.command {
        Command::Compare { amount, requirements } => {
            let deposit = parse_amount("deposit_amount", &amount)?;
            let comparison = compare_banks(deposit, &schedules, &requirements.profile()?);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
                return Ok(());
            }

            println!("Interest for {} deposit", format_amount(deposit));
            println!("=================================\n");
            for (rank, quote) in comparison.ranked.iter().enumerate() {
                println!(
                    "{}. {:<15} ${:>10.2}/yr  ${:>8.2}/mo",
                    rank + 1,
                    quote.bank.as_str(),
                    quote.annual_interest(),
                    quote.monthly_interest()
                );
                print_breakdown(&quote.evaluation);
            }
            for failure in &comparison.failures {
                println!("   {:<15} failed: {}", failure.bank.as_str(), failure.error);
            }
        }

        Command::Optimize {
            amount,
            total_spend,
            requirements,
        } => {
            let total = parse_amount("total_amount", &amount)?;
            let total_spend = parse_amount("total_spend", &total_spend)?;
            let profile = requirements.profile()?;

            let config = OptimizerConfig::from_env().context("reading optimizer settings")?;
            let optimizer = DepositOptimizer::new(config);

            let start = Instant::now();
            let plans = optimize_with_spend(
                &optimizer,
                total,
                total_spend,
                &schedules,
                &profile,
                &LogProgress,
            )?;
            let elapsed = start.elapsed();

            if cli.json {
                let output = OptimizeOutput { total, plans: &plans };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            println!("Best splits of {}", format_amount(total));
            println!("=================================\n");
            if plans.is_empty() {
                println!(
                    "No split found: {} is below one {} increment",
                    format_amount(total),
                    format_amount(optimizer.config().increment)
                );
            }
            for (rank, plan) in plans.iter().enumerate() {
                print_plan(rank + 1, plan);
            }
            println!("Search took {:?}", elapsed);
        }

        Command::Rates => {
            if cli.json {
                let tiers: Vec<_> = schedules
                    .iter()
                    .flat_map(|s| s.tiers.iter().map(move |t| RateRow { bank: s.bank, tier: t }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&tiers)?);
                return Ok(());
            }

            for schedule in schedules.iter() {
                println!("{} ({})", schedule.bank, schedule.policy.name());
                for tier in &schedule.tiers {
                    println!(
                        "  {:<12} {:<14} {:>6.2}%  {:<20} {}",
                        tier.tier_type,
                        tier.balance_tier,
                        tier.interest_rate * 100.0,
                        tier.requirement_type,
                        tier.remarks
                    );
                }
                println!();
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct OptimizeOutput<'a> {
    total: f64,
    plans: &'a [PlannedSolution],
}

#[derive(Serialize)]
struct RateRow<'a> {
    bank: Bank,
    #[serde(flatten)]
    tier: &'a interest_engine::RateTier,
}

fn print_breakdown(evaluation: &Evaluation) {
    for entry in evaluation.breakdown() {
        println!(
            "     {:<40} {:>12} @ {:>5.2}% = ${:.2}",
            entry.description,
            format_amount(entry.amount_in_tier),
            entry.tier_rate * 100.0,
            entry.tier_interest
        );
    }
}

fn print_plan(rank: usize, plan: &PlannedSolution) {
    let solution = &plan.solution;
    println!(
        "{}. ${:.2}/yr  ${:.2}/mo",
        rank,
        solution.total_interest,
        solution.monthly_interest()
    );
    if let Some(bank) = solution.salary_bank {
        println!("   Salary credited to {}", bank);
    }
    for (bank, amount) in &solution.distribution {
        println!("   {:<15} {:>12}", bank.as_str(), format_amount(*amount));
        if let Some(evaluation) = solution.breakdown.get(bank) {
            print_breakdown(evaluation);
        }
    }

    if let Some(spend) = &plan.spend_plan {
        println!("   Card spend:");
        for (bank, amount) in &spend.allocation {
            println!("     {:<15} {:>12}", bank.as_str(), format_amount(*amount));
        }
        if spend.unallocated > 0.0 {
            println!("     {:<15} {:>12}", "unallocated", format_amount(spend.unallocated));
        }
        println!("   With spend routed: ${:.2}/yr", spend.total_interest);
    }
    println!();
}
