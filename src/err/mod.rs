use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	#[error("A Hasura endpoint is required, set `hasuraEndpoint` in the configuration or pass --hasuraEndpoint")]
	MissingEndpoint,

	#[error("Unable to read the configuration file `{path}`: {source}")]
	ConfigRead {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("Unable to parse the configuration file `{path}`: {source}")]
	ConfigParse {
		path: PathBuf,
		source: serde_json::Error,
	},

	#[error("The schema `{0}` does not exist in the database")]
	SchemaNotFound(String),

	#[error(
		"`primaryKeySuffix` is empty and no relationship naming policy was supplied, relationship names cannot be derived"
	)]
	NamingUnderspecified,

	#[error("Unable to read the SQL script `{path}`: {source}")]
	ScriptRead {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("Hasura rejected the {operation} request with status {status}: {message}")]
	Remote {
		operation: String,
		status: u16,
		code: Option<String>,
		message: String,
		body: serde_json::Value,
	},

	#[error("The SQL query failed: {message}")]
	Sql {
		message: String,
	},

	#[error("Unexpected response from Hasura: {0}")]
	UnexpectedResponse(String),

	#[error("There was an error calling the Hasura endpoint: {0}")]
	Http(#[from] reqwest::Error),

	#[error("There was a problem with JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("There was an I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Invalid log filter: {0}")]
	LogFilter(#[from] tracing_subscriber::filter::ParseError),

	#[error("Unable to install the log subscriber: {0}")]
	Telemetry(#[from] tracing_subscriber::util::TryInitError),
}

impl Error {
	/// The message reported by the metadata service, if this is a remote failure
	pub fn remote_message(&self) -> Option<&str> {
		match self {
			Error::Remote {
				message,
				..
			} => Some(message),
			Error::Sql {
				message,
			} => Some(message),
			_ => None,
		}
	}

	/// Whether the metadata service reported the target as already being in
	/// the requested state.
	///
	/// Hasura does not return stable codes for these conditions, so this matches
	/// on the wording of the message. A change of wording upstream turns these
	/// into ordinary failures.
	pub fn is_already(&self, marker: &str) -> bool {
		self.remote_message().is_some_and(|m| m.contains(marker))
	}

	/// Whether a function was rejected because it does not return a composite type
	pub fn is_not_composite(&self) -> bool {
		self.remote_message().is_some_and(|m| m.to_ascii_lowercase().contains("composite"))
	}
}
