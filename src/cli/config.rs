use super::Cli;
use crate::config::Configuration;
use crate::err::Error;
use std::io::ErrorKind;

/// The configuration of this run.
///
/// The configuration file wins when it exists. Otherwise a configuration is
/// synthesized from the endpoint and schema flags. Without either there is
/// nothing to run, and `None` is returned.
pub(super) async fn resolve(args: &Cli) -> Result<Option<Configuration>, Error> {
	let mut config = match tokio::fs::read_to_string(&args.config).await {
		Ok(json) => {
			let mut config = Configuration::from_json(&json).map_err(|source| Error::ConfigParse {
				path: args.config.clone(),
				source,
			})?;
			if config.hasura_endpoint.trim().is_empty() {
				if let Some(endpoint) = &args.hasura_endpoint {
					config.hasura_endpoint = endpoint.clone();
				}
			}
			config
		}
		Err(e) if e.kind() == ErrorKind::NotFound => match &args.hasura_endpoint {
			Some(endpoint) => {
				let mut config = Configuration::new(endpoint.clone());
				config.target_schema = args.target_schema.clone();
				config
			}
			None => return Ok(None),
		},
		Err(source) => {
			return Err(Error::ConfigRead {
				path: args.config.clone(),
				source,
			});
		}
	};
	if let Some(secret) = &args.hasura_admin_secret {
		config.hasura_admin_secret = Some(secret.clone());
	}
	Ok(Some(config))
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;
	use std::io::Write;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("hasura-auto-tracker").chain(args.iter().copied()))
			.unwrap()
	}

	#[tokio::test]
	async fn the_configuration_file_wins() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"{{ "hasuraEndpoint": "http://hasura:8080/v1/query", "targetSchema": "app", "hasuraAdminSecret": "from-file" }}"#
		)
		.unwrap();
		let path = file.path().to_str().unwrap();
		let args = parse(&[
			"--config",
			path,
			"--hasuraEndpoint",
			"http://other/v1/query",
			"--targetSchema",
			"ignored",
			"--hasuraAdminSecret",
			"from-flag",
		]);
		let config = resolve(&args).await.unwrap().unwrap();
		assert_eq!(config.hasura_endpoint, "http://hasura:8080/v1/query");
		assert_eq!(config.target_schema, "app");
		assert_eq!(config.hasura_admin_secret.as_deref(), Some("from-flag"));
	}

	#[tokio::test]
	async fn flags_synthesize_a_configuration() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("missing.json");
		let args = parse(&[
			"--config",
			missing.to_str().unwrap(),
			"--hasuraEndpoint",
			"http://localhost:8080/v1/query",
			"--targetSchema",
			"app",
		]);
		let config = resolve(&args).await.unwrap().unwrap();
		assert_eq!(config.hasura_endpoint, "http://localhost:8080/v1/query");
		assert_eq!(config.target_schema, "app");
		assert!(config.views.is_empty() && config.relationships.is_empty());
		assert!(config.operations.untrack && !config.operations.track_functions);
	}

	#[tokio::test]
	async fn nothing_to_run() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("missing.json");
		let mut args = parse(&["--config", missing.to_str().unwrap()]);
		// the endpoint may also come from the environment
		args.hasura_endpoint = None;
		assert!(resolve(&args).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn malformed_files_are_reported() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{{ not json").unwrap();
		let args = parse(&["--config", file.path().to_str().unwrap()]);
		assert!(matches!(resolve(&args).await, Err(Error::ConfigParse { .. })));
	}

	#[test]
	fn flag_spellings() {
		let args = parse(&["--hasura-endpoint", "http://h", "--silent", "--log", "debug"]);
		assert_eq!(args.hasura_endpoint.as_deref(), Some("http://h"));
		assert!(args.silent);
		assert_eq!(args.log, "debug");
		assert_eq!(args.config.to_str(), Some(crate::cnf::DEFAULT_CONFIG_FILE));
	}
}
