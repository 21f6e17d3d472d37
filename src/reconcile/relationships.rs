use super::{ALREADY_EXISTS, PhaseReport, post_all};
use crate::api::{MetadataClient, Operation};
use crate::config::RelationshipKind;
use crate::discovery::ForeignKeyFact;
use crate::naming::{NamingContext, NamingPolicy};

/// A relationship as created in the metadata layer, from `src_table` towards `dest_table`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipSpec {
	pub kind: RelationshipKind,
	pub name: String,
	pub src_table: String,
	pub src_key: String,
	pub dest_table: String,
	pub dest_key: String,
}

/// The relationships implied by one fact.
///
/// The array relationship sits on the referenced table (`table2`) and points
/// at the rows holding the key; the object relationship sits on the table
/// holding the key (`table1`) and points at the referenced row.
pub fn build_specs(
	fact: &ForeignKeyFact,
	policy: &dyn NamingPolicy,
	ctx: &NamingContext<'_>,
) -> Vec<RelationshipSpec> {
	let mut specs = Vec::with_capacity(2);
	if fact.add_array_relationship {
		specs.push(RelationshipSpec {
			kind: RelationshipKind::Array,
			name: fact.name.clone().unwrap_or_else(|| policy.array_name(ctx, fact)),
			src_table: fact.table2.clone(),
			src_key: fact.key2.clone(),
			dest_table: fact.table1.clone(),
			dest_key: fact.key1.clone(),
		});
	}
	if fact.add_object_relationship {
		specs.push(RelationshipSpec {
			kind: RelationshipKind::Object,
			name: fact.name.clone().unwrap_or_else(|| policy.object_name(ctx, fact)),
			src_table: fact.table1.clone(),
			src_key: fact.key1.clone(),
			dest_table: fact.table2.clone(),
			dest_key: fact.key2.clone(),
		});
	}
	specs
}

/// Create both directions of every fact, tolerating relationships which already exist
pub async fn track_relationships<C: MetadataClient>(
	client: &C,
	facts: &[ForeignKeyFact],
	policy: &dyn NamingPolicy,
	ctx: &NamingContext<'_>,
) -> PhaseReport {
	let items: Vec<_> = facts
		.iter()
		.flat_map(|fact| build_specs(fact, policy, ctx))
		.map(|spec| {
			let target = format!("{} {}", spec.kind.operation(), spec.name);
			info!("Tracking relationship - {target} on {}", spec.src_table);
			(target, Operation::create_relationship(ctx.schema, &spec))
		})
		.collect();
	post_all(client, &items, ALREADY_EXISTS).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::mock::{RecordingClient, remote_error};
	use crate::naming::{CompactNaming, DefaultNaming, FnNaming};
	use serde_json::json;

	const CTX: NamingContext<'static> = NamingContext {
		schema: "public",
		primary_key_suffix: "_id",
	};

	fn orders() -> ForeignKeyFact {
		ForeignKeyFact::catalog("orders", "customer_id", "customers", "id")
	}

	#[test]
	fn directions_are_never_swapped() {
		let facts = [
			orders(),
			ForeignKeyFact::catalog("order_items", "order_id", "orders", "order_id"),
			ForeignKeyFact::catalog("employees", "manager_id", "employees", "id"),
		];
		for fact in &facts {
			let specs = build_specs(fact, &DefaultNaming, &CTX);
			assert_eq!(specs.len(), 2);
			let array = &specs[0];
			assert_eq!(array.kind, RelationshipKind::Array);
			assert_eq!((array.src_table.as_str(), array.src_key.as_str()), (fact.table2.as_str(), fact.key2.as_str()));
			assert_eq!((array.dest_table.as_str(), array.dest_key.as_str()), (fact.table1.as_str(), fact.key1.as_str()));
			let object = &specs[1];
			assert_eq!(object.kind, RelationshipKind::Object);
			assert_eq!((object.src_table.as_str(), object.src_key.as_str()), (fact.table1.as_str(), fact.key1.as_str()));
			assert_eq!((object.dest_table.as_str(), object.dest_key.as_str()), (fact.table2.as_str(), fact.key2.as_str()));
		}
	}

	#[test]
	fn default_names_for_a_foreign_key() {
		let specs = build_specs(&orders(), &DefaultNaming, &CTX);
		assert_eq!(specs[0].name, "customer_orders");
		assert_eq!(specs[1].name, "orders_customer");
	}

	#[test]
	fn explicit_names_bypass_every_policy() {
		let mut fact = orders();
		fact.name = Some("purchases".to_owned());
		let panicking = FnNaming::new(
			|_: &ForeignKeyFact| -> String { panic!("array naming must not be called") },
			|_: &ForeignKeyFact| -> String { panic!("object naming must not be called") },
		);
		let specs = build_specs(&fact, &panicking, &CTX);
		assert!(specs.iter().all(|spec| spec.name == "purchases"));
		let specs = build_specs(&fact, &CompactNaming::default(), &CTX);
		assert!(specs.iter().all(|spec| spec.name == "purchases"));
	}

	#[test]
	fn declared_directions_are_respected() {
		let mut fact = orders();
		fact.add_object_relationship = false;
		let specs = build_specs(&fact, &DefaultNaming, &CTX);
		assert_eq!(specs.len(), 1);
		assert_eq!(specs[0].kind, RelationshipKind::Array);
	}

	#[tokio::test]
	async fn existing_relationships_are_unchanged() {
		let client = RecordingClient::new(|op| match op.kind() {
			"create_array_relationship" => Err(remote_error(op, "field with name \"customer_orders\" already exists")),
			_ => Ok(json!({ "message": "success" })),
		});
		let report = track_relationships(&client, &[orders()], &DefaultNaming, &CTX).await;
		assert_eq!(report.applied, 1);
		assert_eq!(report.unchanged, 1);
		assert!(report.is_clean());
	}

	#[tokio::test]
	async fn failed_relationships_are_collected() {
		let client = RecordingClient::new(|op| match op.kind() {
			"create_object_relationship" => Err(remote_error(op, "table \"orders\" does not exist")),
			_ => Ok(json!({ "message": "success" })),
		});
		let facts = [orders(), ForeignKeyFact::catalog("payments", "order_id", "orders", "id")];
		let report = track_relationships(&client, &facts, &DefaultNaming, &CTX).await;
		assert_eq!(report.applied, 2);
		assert_eq!(report.failures.len(), 2);
		assert_eq!(report.failures[0].target, "create_object_relationship orders_customer");
		assert_eq!(client.calls().len(), 4);
	}
}
