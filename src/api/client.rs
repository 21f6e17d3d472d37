use super::{MetadataClient, Operation};
use crate::cnf::ADMIN_SECRET_HEADER;
use crate::err::Error;
use reqwest::Client;
use serde_json::Value;

/// A metadata client posting JSON over HTTP with `reqwest`
#[derive(Clone, Debug)]
pub struct HttpClient {
	client: Client,
	endpoint: String,
	admin_secret: Option<String>,
}

impl HttpClient {
	pub fn new(endpoint: impl Into<String>, admin_secret: Option<String>) -> Result<Self, Error> {
		// No timeout is configured, a hung call hangs the run
		let client = Client::builder().build()?;
		Ok(Self {
			client,
			endpoint: endpoint.into(),
			admin_secret: admin_secret.filter(|s| !s.is_empty()),
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

impl MetadataClient for HttpClient {
	async fn post_operation(&self, operation: &Operation) -> Result<Value, Error> {
		let mut request = self.client.post(&self.endpoint).json(operation.body());
		if let Some(secret) = &self.admin_secret {
			request = request.header(ADMIN_SECRET_HEADER, secret);
		}
		let response = request.send().await?;
		let status = response.status();
		let text = response.text().await?;
		if status.is_success() {
			return serde_json::from_str(&text).map_err(|e| {
				Error::UnexpectedResponse(format!("{} returned invalid JSON: {e}", operation.kind()))
			});
		}
		// Hasura reports failures as `{ "path", "error", "code" }`
		let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text.clone()));
		let message = body
			.get("error")
			.and_then(Value::as_str)
			.map(str::to_owned)
			.unwrap_or_else(|| text.clone());
		let code = body.get("code").and_then(Value::as_str).map(str::to_owned);
		Err(Error::Remote {
			operation: operation.kind().to_owned(),
			status: status.as_u16(),
			code,
			message,
			body,
		})
	}
}
