use super::{ALREADY_TRACKED, ALREADY_UNTRACKED, PhaseReport, post_all};
use crate::api::{MetadataClient, Operation};

/// Track every table and view so it is exposed in the GraphQL schema
pub async fn track_entities<C: MetadataClient>(
	client: &C,
	schema: &str,
	entities: &[String],
) -> PhaseReport {
	let items: Vec<_> = entities
		.iter()
		.map(|name| {
			info!("Tracking - {name}");
			(name.clone(), Operation::track_table(schema, name))
		})
		.collect();
	post_all(client, &items, ALREADY_TRACKED).await.into_iter().collect()
}

/// Untrack every table and view, cascading to the metadata depending on it
pub async fn untrack_entities<C: MetadataClient>(
	client: &C,
	schema: &str,
	entities: &[String],
) -> PhaseReport {
	let items: Vec<_> = entities
		.iter()
		.map(|name| {
			info!("Untracking - {name}");
			(name.clone(), Operation::untrack_table(schema, name))
		})
		.collect();
	post_all(client, &items, ALREADY_UNTRACKED).await.into_iter().collect()
}
