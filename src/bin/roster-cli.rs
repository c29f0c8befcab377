#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roster_core::{
    io, pipeline,
    solver::SolverConfig,
    ScheduleInputs,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Care-facility staff roster scheduler
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Enable logging (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and solve a roster for one horizon
    Solve {
        #[arg(long)]
        template: String,
        #[arg(long)]
        workers: String,
        #[arg(long)]
        horizon_weeks: u32,
        #[arg(long)]
        reference_date: String,
        #[arg(long)]
        prior_assignments: Option<String>,
        #[arg(long)]
        constant_schedule: Option<String>,
        #[arg(long)]
        unavailability: Option<String>,
        #[arg(long, default_value_t = 60)]
        time_limit_secs: u64,
        #[arg(long)]
        out_csv: String,
        #[arg(long)]
        out_report: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Solve {
            template,
            workers,
            horizon_weeks,
            reference_date,
            prior_assignments,
            constant_schedule,
            unavailability,
            time_limit_secs,
            out_csv,
            out_report,
        } => {
            let template = io::import_template_csv(&template)?;
            let raw_workers = io::import_workers_csv(&workers)?;
            let reference_date = parse_date(&reference_date)?;
            let raw_prior = match prior_assignments {
                Some(path) => io::import_prior_assignments_csv(path)?,
                None => Vec::new(),
            };
            let constant_rows = match constant_schedule {
                Some(path) => io::import_constant_schedule_csv(path)?,
                None => Vec::new(),
            };
            let unavail = match unavailability {
                Some(path) => io::import_unavailability_csv(path)?,
                None => Vec::new(),
            };

            let inputs = ScheduleInputs {
                template: &template,
                horizon_weeks,
                reference_date,
                raw_prior_assignments: &raw_prior,
                raw_workers: &raw_workers,
                constant_schedule_rows: &constant_rows,
                unavailability: &unavail,
                solver_config: SolverConfig {
                    time_limit: std::time::Duration::from_secs(time_limit_secs),
                    ..SolverConfig::default()
                },
            };

            let output = pipeline::schedule(inputs).context("scheduling pipeline failed")?;
            io::export_assignments_csv(&out_csv, &output.result.assignments, &output.calendar)?;
            if let Some(path) = &out_report {
                io::export_report_json(path, &output.result.report, &output.violations)?;
            }

            println!(
                "{:?}: objective {:?}, {} iteration(s), {} uncovered shift(s), {} validator finding(s)",
                output.result.report.status,
                output.result.report.objective_value,
                output.result.report.iterations,
                output.result.uncovered.len(),
                output.violations.len(),
            );
            for v in &output.violations {
                eprintln!("VIOLATION: {v}");
            }

            if output.result.report.status.is_success() {
                0
            } else {
                1
            }
        }
    };

    std::process::exit(code);
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("invalid date (expected YYYY-MM-DD): {value}"))
}
