use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod api;
mod insight;
mod models;
mod report;
mod summary;

use api::HealthApi;
use models::{Metric, TimeRange};

#[derive(Parser)]
#[command(name = "health-report")]
#[command(about = "Health metrics client and report builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save one metric reading
    Log {
        #[arg(long, value_enum)]
        metric: Metric,
        #[arg(long)]
        user: String,
        /// Metric-specific JSON payload, passed through as-is
        #[arg(long)]
        data: String,
    },
    /// List all records of one metric for a user
    History {
        #[arg(long, value_enum)]
        metric: Metric,
        #[arg(long)]
        user: String,
    },
    /// Print insights for a time window
    Insights {
        #[arg(long)]
        user: String,
        #[arg(long, value_enum, default_value_t = TimeRange::Weekly)]
        range: TimeRange,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        user: String,
        #[arg(long, value_enum, default_value_t = TimeRange::Weekly)]
        range: TimeRange,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let base_url = std::env::var("HEALTH_API_URL")
        .context("HEALTH_API_URL must be set to the health API base URL")?;
    let api = HealthApi::new(base_url)?;

    match cli.command {
        Commands::Log { metric, user, data } => {
            let payload: serde_json::Value =
                serde_json::from_str(&data).context("--data must be valid JSON")?;
            let response = api.save(metric, &user, &payload).await?;
            println!("{response}");
        }
        Commands::History { metric, user } => {
            let records = api.history_raw(metric, &user).await?;
            if records.is_empty() {
                println!("No {metric} records for this user.");
            } else {
                for record in records {
                    println!("{record}");
                }
            }
        }
        Commands::Insights { user, range } => {
            let built = report::build_report(&api, &user, range).await?;
            let summary = summary::summarize(&built);
            let insights = insight::generate_insights(&summary);

            if insights.is_empty() {
                println!("Not enough data to generate insights.");
                return Ok(());
            }
            for item in insights {
                println!("- [{}] {}", item.kind, item.message);
            }
        }
        Commands::Report { user, range, out } => {
            let built = report::build_report(&api, &user, range).await?;
            let summary = summary::summarize(&built);
            let insights = insight::generate_insights(&summary);
            let rendered = report::render_markdown(&user, &built, &summary, &insights);
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
