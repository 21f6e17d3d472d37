//! Convergence of the metadata layer with the discovered schema.
//!
//! Every item is one idempotent call. A call either applies, finds its target
//! already in the requested state, or fails. Failures are logged with the
//! payload that caused them and collected into a [`PhaseReport`]; they never
//! stop the remaining items.

mod functions;
mod relationships;
mod tables;

pub use functions::{track_functions, untrack_functions};
pub use relationships::{RelationshipSpec, build_specs, track_relationships};
pub use tables::{track_entities, untrack_entities};

use crate::api::{MetadataClient, Operation};
use crate::err::Error;
use futures::future::join_all;
use std::fmt;

pub const ALREADY_TRACKED: &str = "already tracked";
pub const ALREADY_UNTRACKED: &str = "already untracked";
pub const ALREADY_EXISTS: &str = "already exists";

/// The result of one reconciliation call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
	Applied,
	/// The metadata layer was already in the requested state
	Unchanged,
	Failed(Failure),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
	/// What the call was about, e.g. `orders` or `create_array_relationship customer_orders`
	pub target: String,
	pub kind: FailureKind,
	pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
	Rejected,
	/// A function was rejected because it does not return a composite type
	NotComposite,
}

/// The outcomes of one phase
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseReport {
	pub applied: usize,
	pub unchanged: usize,
	pub failures: Vec<Failure>,
}

impl PhaseReport {
	pub fn record(&mut self, outcome: Outcome) {
		match outcome {
			Outcome::Applied => self.applied += 1,
			Outcome::Unchanged => self.unchanged += 1,
			Outcome::Failed(failure) => self.failures.push(failure),
		}
	}

	pub fn total(&self) -> usize {
		self.applied + self.unchanged + self.failures.len()
	}

	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

impl FromIterator<Outcome> for PhaseReport {
	fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
		let mut report = PhaseReport::default();
		for outcome in iter {
			report.record(outcome);
		}
		report
	}
}

impl fmt::Display for PhaseReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} applied, {} unchanged, {} failed",
			self.applied,
			self.unchanged,
			self.failures.len()
		)
	}
}

/// Classify the result of a call, treating `already` as success
pub(crate) fn classify(
	target: &str,
	operation: &Operation,
	result: Result<serde_json::Value, Error>,
	already: &str,
) -> Outcome {
	match result {
		Ok(_) => Outcome::Applied,
		Err(e) if e.is_already(already) => {
			debug!("{} {target}: {already}", operation.kind());
			Outcome::Unchanged
		}
		Err(e) => {
			error!(
				"Hasura query failed to execute - {} {target}\n  payload: {}\n  error: {e}",
				operation.kind(),
				operation.body()
			);
			let kind = if operation.kind() == "track_function" && e.is_not_composite() {
				FailureKind::NotComposite
			} else {
				FailureKind::Rejected
			};
			Outcome::Failed(Failure {
				target: target.to_owned(),
				kind,
				message: e.to_string(),
			})
		}
	}
}

/// Post every operation concurrently and wait for all of them
pub(crate) async fn post_all<C: MetadataClient>(
	client: &C,
	items: &[(String, Operation)],
	already: &str,
) -> Vec<Outcome> {
	join_all(items.iter().map(|(target, operation)| async move {
		let result = client.post_operation(operation).await;
		classify(target, operation, result, already)
	}))
	.await
}
