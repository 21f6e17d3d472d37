mod config;

use crate::cnf::{ADMIN_SECRET_ENV, DEFAULT_CONFIG_FILE, ENDPOINT_ENV, PKG_NAME, PKG_VERSION};
use crate::config::Configuration;
use crate::err::Error;
use crate::telemetry::{self, DEFAULT_LOG_LEVEL};
use crate::tracker::{RunReport, Tracker};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

const INFO: &str = "\
Track the tables, views, functions and foreign key relationships of a Postgres \
schema in Hasura, and generate views flattening JSON columns into typed columns.";

#[derive(Parser, Debug)]
#[command(name = PKG_NAME, bin_name = PKG_NAME)]
#[command(version = PKG_VERSION, about = INFO)]
pub struct Cli {
	#[arg(help = "Path to the JSON configuration file, used when present")]
	#[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
	config: PathBuf,
	#[arg(help = "The Hasura endpoint, e.g. http://localhost:8080/v1/query")]
	#[arg(long = "hasuraEndpoint", alias = "hasura-endpoint", env = ENDPOINT_ENV)]
	hasura_endpoint: Option<String>,
	#[arg(help = "The Hasura admin secret, overriding the one in the configuration file")]
	#[arg(long = "hasuraAdminSecret", alias = "hasura-admin-secret", env = ADMIN_SECRET_ENV)]
	#[arg(hide_env_values = true)]
	hasura_admin_secret: Option<String>,
	#[arg(help = "The Postgres schema to track when no configuration file is present")]
	#[arg(long = "targetSchema", alias = "target-schema", default_value = crate::cnf::DEFAULT_TARGET_SCHEMA)]
	target_schema: String,
	#[arg(help = "Don't print logs as the tool runs")]
	#[arg(short, long)]
	silent: bool,
	#[arg(help = "The logging level, or a tracing filter directive")]
	#[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "HASURA_AUTO_TRACKER_LOG")]
	log: String,
}

#[tokio::main]
pub async fn init() -> ExitCode {
	let args = Cli::parse();
	let level = if args.silent {
		"off"
	} else {
		args.log.as_str()
	};
	// Initialize logging
	if let Err(e) = telemetry::builder().with_log_level(level).init() {
		eprintln!("{e}");
		return ExitCode::FAILURE;
	}
	let config = match config::resolve(&args).await {
		Ok(Some(config)) => config,
		Ok(None) => {
			// Nothing to run against
			if let Err(e) = Cli::command().print_help() {
				eprintln!("{e}");
			}
			return ExitCode::FAILURE;
		}
		Err(e) => return fail(args.silent, e),
	};
	match run(config).await {
		Ok(report) => {
			if report.is_clean() {
				info!("Hasura metadata is in sync");
			} else {
				warn!("Some items could not be reconciled, see the errors above");
			}
			ExitCode::SUCCESS
		}
		Err(e) => fail(args.silent, e),
	}
}

fn fail(silent: bool, e: Error) -> ExitCode {
	if silent {
		eprintln!("{e}");
	} else {
		error!("{e}");
	}
	ExitCode::FAILURE
}

async fn run(config: Configuration) -> Result<RunReport, Error> {
	let tracker = Tracker::new(config)?;
	info!(
		"{PKG_NAME} {PKG_VERSION} will run with the following configuration:\n{}",
		serde_json::to_string_pretty(&tracker.config().redacted())?
	);
	let report = tracker.run().await?;
	for (phase, summary) in report.phases() {
		info!("{phase}: {summary}");
		for failure in &summary.failures {
			warn!("{phase}: {} failed: {}", failure.target, failure.message);
		}
	}
	Ok(report)
}
