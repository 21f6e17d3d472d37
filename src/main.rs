use std::process::ExitCode;

fn main() -> ExitCode {
	// Initiate the command line
	hasura_auto_tracker::cli::init()
}
