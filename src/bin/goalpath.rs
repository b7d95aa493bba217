//! Goalpath CLI - exercise the local goal pipeline from a shell
//!
//! Commands:
//! - validate: Check goal form fields without estimating
//! - estimate: Derive a custom timeline from goal fields
//! - classify: Report the difficulty tier for a weekly rate

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use goalpath::estimator::{estimate_from, RatePolicy};
use goalpath::validator::{validate, RawGoalFields};
use goalpath::ENGINE_VERSION;

/// Goalpath - On-device goal and timeline customization engine
#[derive(Parser)]
#[command(name = "goalpath")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Derive and inspect weight-goal timelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check goal form fields without estimating
    Validate(GoalArgs),

    /// Derive a custom timeline from goal fields
    Estimate(GoalArgs),

    /// Report the difficulty tier for a weekly rate (lbs/week)
    Classify {
        rate: f64,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Args)]
struct GoalArgs {
    /// Current weight in lbs
    #[arg(long)]
    current_weight: String,

    /// Target weight in lbs
    #[arg(long)]
    target_weight: String,

    /// Goal direction: lose, gain, or maintain
    #[arg(long)]
    goal: String,

    /// Explicit timeline length in weeks
    #[arg(long)]
    weeks: Option<String>,

    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Args)]
struct PolicyArgs {
    /// Assumed sustainable rate when no timeline is given (lbs/week)
    #[arg(long, default_value = "1.5")]
    default_rate: f64,

    /// Rates strictly above this are at least moderate (lbs/week)
    #[arg(long, default_value = "1.0")]
    moderate_floor: f64,

    /// Rates strictly above this are aggressive (lbs/week)
    #[arg(long, default_value = "2.0")]
    aggressive_floor: f64,
}

impl PolicyArgs {
    fn to_policy(&self) -> RatePolicy {
        RatePolicy {
            default_weekly_rate_lbs: self.default_rate,
            moderate_floor_lbs: self.moderate_floor,
            aggressive_floor_lbs: self.aggressive_floor,
        }
    }
}

impl GoalArgs {
    fn to_fields(&self) -> RawGoalFields {
        RawGoalFields {
            current_weight: Some(self.current_weight.clone()),
            target_weight: Some(self.target_weight.clone()),
            weeks: self.weeks.clone(),
            weight_goal: Some(self.goal.clone()),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => match validate(&args.to_fields()) {
            Ok(validated) => {
                println!(
                    "ok: {} {} -> {} lbs{}",
                    validated.weight_goal.as_str(),
                    validated.current_weight_lbs,
                    validated.target_weight_lbs,
                    match validated.weeks_hint {
                        Some(weeks) => format!(" over {weeks} weeks"),
                        None => String::new(),
                    }
                );
                ExitCode::SUCCESS
            }
            Err(reason) => {
                eprintln!("invalid: {reason}");
                ExitCode::FAILURE
            }
        },

        Commands::Estimate(args) => {
            let validated = match validate(&args.to_fields()) {
                Ok(validated) => validated,
                Err(reason) => {
                    eprintln!("invalid: {reason}");
                    return ExitCode::FAILURE;
                }
            };
            let timeline = estimate_from(
                &validated,
                &args.policy.to_policy(),
                chrono::Utc::now().date_naive(),
            );
            match serde_json::to_string_pretty(&timeline) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Classify { rate, policy } => {
            let tier = policy.to_policy().classify(rate);
            println!("{}", tier.as_str());
            ExitCode::SUCCESS
        }
    }
}
