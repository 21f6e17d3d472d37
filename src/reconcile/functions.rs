use super::{ALREADY_TRACKED, ALREADY_UNTRACKED, Failure, FailureKind, Outcome, PhaseReport, post_all};
use crate::api::{MetadataClient, Operation};

pub async fn track_functions<C: MetadataClient>(
	client: &C,
	schema: &str,
	functions: &[String],
) -> PhaseReport {
	let items: Vec<_> = functions
		.iter()
		.map(|name| {
			info!("Tracking function - {name}");
			(name.clone(), Operation::track_function(schema, name))
		})
		.collect();
	let outcomes = post_all(client, &items, ALREADY_TRACKED).await;
	for outcome in &outcomes {
		if let Outcome::Failed(
			failure @ Failure {
				kind: FailureKind::NotComposite,
				..
			},
		) = outcome
		{
			warn!(
				"The function {} was not tracked: Hasura only tracks functions returning a table or composite type (RETURNS SETOF <table> or RETURNS <table>)",
				failure.target
			);
		}
	}
	outcomes.into_iter().collect()
}

pub async fn untrack_functions<C: MetadataClient>(
	client: &C,
	schema: &str,
	functions: &[String],
) -> PhaseReport {
	let items: Vec<_> = functions
		.iter()
		.map(|name| {
			info!("Untracking function - {name}");
			(name.clone(), Operation::untrack_function(schema, name))
		})
		.collect();
	post_all(client, &items, ALREADY_UNTRACKED).await.into_iter().collect()
}
