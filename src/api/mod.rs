//! Calls to the Hasura metadata API.
//!
//! Every call is a single `POST` of a `{ "type": ..., "args": ... }` envelope
//! to the configured endpoint.

mod client;
pub mod operation;

pub use client::HttpClient;
pub use operation::Operation;

use crate::err::Error;
use serde::Deserialize;
use serde_json::Value;

/// Rows returned by `run_sql`, header row included. Hasura returns every value
/// as text, and SQL `NULL` as `null`.
pub type Rows = Vec<Vec<Option<String>>>;

#[allow(async_fn_in_trait)]
pub trait MetadataClient {
	/// Post one operation and return the response body
	async fn post_operation(&self, operation: &Operation) -> Result<Value, Error>;
}

impl<C: MetadataClient> MetadataClient for &C {
	async fn post_operation(&self, operation: &Operation) -> Result<Value, Error> {
		(**self).post_operation(operation).await
	}
}

#[derive(Deserialize)]
struct SqlResponse {
	#[serde(default)]
	result: Option<Rows>,
}

/// Run a SQL statement through the `run_sql` operation and return its rows.
///
/// Statements which do not return tuples (DDL, comments) produce no rows.
pub async fn run_sql<C: MetadataClient>(client: &C, sql: &str) -> Result<Rows, Error> {
	let operation = Operation::run_sql(sql);
	let body = client.post_operation(&operation).await.map_err(|e| match e {
		Error::Remote {
			message,
			..
		} => Error::Sql {
			message,
		},
		e => e,
	})?;
	let response: SqlResponse = serde_json::from_value(body)
		.map_err(|e| Error::UnexpectedResponse(format!("run_sql returned an invalid body: {e}")))?;
	Ok(response.result.unwrap_or_default())
}
