mod logs;

use crate::err::Error;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

/// The log level used when none is given
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Default, Debug)]
pub struct Builder {
	log_level: Option<String>,
}

pub fn builder() -> Builder {
	Builder::default()
}

impl Builder {
	/// Set the log level on the builder
	pub fn with_log_level(mut self, log_level: &str) -> Self {
		self.log_level = Some(log_level.to_string());
		self
	}

	/// Turn off all output
	pub fn silent(self) -> Self {
		self.with_log_level("off")
	}

	fn filter(&self) -> Result<EnvFilter, Error> {
		let level = self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
		Ok(EnvFilter::try_new(level)?)
	}

	/// Build a subscriber writing formatted logs to stdout and stderr
	pub fn build(self) -> Result<Box<dyn Subscriber + Send + Sync + 'static>, Error> {
		let filter = self.filter()?;
		let registry = tracing_subscriber::registry().with(logs::new(filter));
		Ok(Box::new(registry))
	}

	/// Install the subscriber globally
	pub fn init(self) -> Result<(), Error> {
		self.build()?.try_init()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn log_levels_are_parsed() {
		assert!(builder().with_log_level("debug").build().is_ok());
		assert!(builder().with_log_level("hasura_auto_tracker=trace,warn").build().is_ok());
		assert!(builder().silent().build().is_ok());
	}

	#[test]
	fn invalid_log_levels_are_rejected() {
		let err = builder().with_log_level("hasura_auto_tracker=loud").build().err();
		assert!(matches!(err, Some(Error::LogFilter(_))));
	}

	#[test]
	fn scoped_subscribers_capture_events() {
		let _guard = builder().with_log_level("trace").build().unwrap().set_default();
		info!("scoped subscriber installed");
	}
}
