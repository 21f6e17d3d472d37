use crate::api::{HttpClient, MetadataClient};
use crate::config::Configuration;
use crate::discovery::{self, ForeignKeyFact};
use crate::err::Error;
use crate::naming::{self, NamingContext, NamingPolicy};
use crate::reconcile::{self, PhaseReport};
use crate::views;

/// The outcome of every phase of a run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
	pub untracked: Option<PhaseReport>,
	pub views: Option<PhaseReport>,
	pub functions: Option<PhaseReport>,
	pub tables: Option<PhaseReport>,
	pub relationships: Option<PhaseReport>,
}

impl RunReport {
	/// The phases which ran, by name
	pub fn phases(&self) -> impl Iterator<Item = (&'static str, &PhaseReport)> {
		[
			("untrack", &self.untracked),
			("views", &self.views),
			("functions", &self.functions),
			("tables", &self.tables),
			("relationships", &self.relationships),
		]
		.into_iter()
		.filter_map(|(name, report)| report.as_ref().map(|report| (name, report)))
	}

	/// Whether every item of every phase converged
	pub fn is_clean(&self) -> bool {
		self.phases().all(|(_, report)| report.is_clean())
	}
}

/// Runs the phases of a configuration against a metadata client
pub struct Tracker<C> {
	config: Configuration,
	client: C,
	naming: Option<Box<dyn NamingPolicy>>,
}

impl Tracker<HttpClient> {
	/// A tracker posting to the configured endpoint
	pub fn new(config: Configuration) -> Result<Self, Error> {
		config.validate()?;
		let client = HttpClient::new(&config.hasura_endpoint, config.hasura_admin_secret.clone())?;
		debug!("Posting metadata operations to {}", client.endpoint());
		Ok(Self::with_client(config, client))
	}
}

impl<C: MetadataClient> Tracker<C> {
	pub fn with_client(config: Configuration, client: C) -> Self {
		Self {
			config,
			client,
			naming: None,
		}
	}

	/// Name relationships with a caller-supplied policy instead of the configured one
	pub fn with_naming_policy(mut self, policy: impl NamingPolicy + 'static) -> Self {
		self.naming = Some(Box::new(policy));
		self
	}

	pub fn config(&self) -> &Configuration {
		&self.config
	}

	/// Run every enabled phase in order.
	///
	/// Per-item failures are reported but do not fail the run. Catalog query
	/// failures, a missing schema, or an unusable naming configuration do.
	pub async fn run(&self) -> Result<RunReport, Error> {
		let config = &self.config;
		let ops = config.operations;
		let schema = config.target_schema.as_str();
		config.validate()?;
		if ops.track_relationships && !config.has_primary_key_suffix() && self.naming.is_none() {
			return Err(Error::NamingUnderspecified);
		}

		info!("Schema : '{schema}'");
		info!("Hasura endpoint : '{}'", config.hasura_endpoint);
		info!("Primary key suffix : '{}'", config.primary_key_suffix);

		if !discovery::schema_exists(&self.client, schema).await? {
			return Err(Error::SchemaNotFound(schema.to_owned()));
		}

		let mut report = RunReport::default();

		if ops.untrack {
			info!("Untrack tables, views and functions");
			let entities = discovery::list_trackable_entities(&self.client, schema).await?;
			let mut phase = reconcile::untrack_entities(&self.client, schema, &entities).await;
			if ops.track_functions {
				let functions = discovery::list_functions(
					&self.client,
					schema,
					config.function_and_clause.as_deref(),
				)
				.await?;
				let functions = reconcile::untrack_functions(&self.client, schema, &functions).await;
				phase.applied += functions.applied;
				phase.unchanged += functions.unchanged;
				phase.failures.extend(functions.failures);
			}
			report.untracked = Some(phase);
		}

		let mut declared = config.relationships.clone();
		let has_scripts =
			!config.scripts.before_views.is_empty() || !config.scripts.after_views.is_empty();
		if !config.views.is_empty() || has_scripts {
			info!("Create SQL views for message payloads");
			let output = views::generate_views(
				&self.client,
				schema,
				&config.views,
				&config.scripts.before_views,
				&config.scripts.after_views,
			)
			.await?;
			declared.extend(output.relationships);
			report.views = Some(output.report);
		}

		if ops.track_functions {
			info!("Track functions");
			let functions = discovery::list_functions(
				&self.client,
				schema,
				config.function_and_clause.as_deref(),
			)
			.await?;
			report.functions =
				Some(reconcile::track_functions(&self.client, schema, &functions).await);
		}

		if ops.track_tables {
			info!("Track tables and views");
			let entities = discovery::list_trackable_entities(&self.client, schema).await?;
			report.tables = Some(reconcile::track_entities(&self.client, schema, &entities).await);
		}

		if ops.track_relationships {
			info!("Track relationships");
			let mut facts = discovery::list_foreign_keys(&self.client, schema).await?;
			facts.extend(declared.iter().map(ForeignKeyFact::from));
			let configured;
			let policy: &dyn NamingPolicy = match &self.naming {
				Some(policy) => policy.as_ref(),
				None => {
					configured = naming::from_config(config);
					configured.as_ref()
				}
			};
			let ctx = NamingContext::new(config);
			report.relationships =
				Some(reconcile::track_relationships(&self.client, &facts, policy, &ctx).await);
		}

		Ok(report)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::Operation;
	use crate::api::mock::{RecordingClient, remote_error};
	use crate::config::{Operations, ViewDeclaration, ViewQuery, VirtualRelationship};
	use crate::naming::FnNaming;
	use serde_json::{Value, json};

	/// Answers catalog queries from a small fake schema and accepts every other call
	fn catalog(op: &Operation) -> Result<Value, Error> {
		if op.kind() != "run_sql" {
			return Ok(json!({ "message": "success" }));
		}
		let sql = op.args()["sql"].as_str().unwrap_or_default();
		let result = if sql.contains("information_schema.schemata") {
			json!([["schema_name"], ["public"]])
		} else if sql.contains("information_schema.routines") {
			json!([["routine_name"], ["search_orders"]])
		} else if sql.contains("FOREIGN KEY") {
			json!([
				["table_name", "column_name", "foreign_table_name", "foreign_column_name"],
				["orders", "customer_id", "customers", "id"]
			])
		} else if sql.contains("information_schema.tables") {
			json!([["table_name"], ["customers"], ["orders"]])
		} else {
			Value::Null
		};
		Ok(json!({ "result_type": "TuplesOk", "result": result }))
	}

	fn all_operations() -> Configuration {
		let mut config = Configuration::new("http://localhost:8080/v1/query");
		config.operations = Operations {
			untrack: true,
			track_tables: true,
			track_relationships: true,
			track_functions: true,
		};
		config
	}

	fn kinds(client: &RecordingClient) -> Vec<&'static str> {
		client.calls().iter().map(Operation::kind).collect()
	}

	#[tokio::test]
	async fn phases_run_in_order() {
		let client = RecordingClient::new(catalog);
		let tracker = Tracker::with_client(all_operations(), &client);
		assert_eq!(tracker.config().target_schema, "public");
		let report = tracker.run().await.unwrap();
		assert!(report.is_clean());

		let kinds = kinds(&client);
		let first = |kind: &str| kinds.iter().position(|k| *k == kind).unwrap();
		let last = |kind: &str| kinds.iter().rposition(|k| *k == kind).unwrap();
		assert!(last("untrack_table") < first("track_function"));
		assert!(last("untrack_function") < first("track_function"));
		assert!(last("track_function") < first("track_table"));
		assert!(last("track_table") < first("create_array_relationship"));
		assert_eq!(report.tables.unwrap().applied, 2);
		assert_eq!(report.relationships.unwrap().applied, 2);
	}

	#[test]
	fn http_trackers_require_an_endpoint() {
		let tracker = Tracker::new(Configuration::new("http://localhost:8080/v1/query")).unwrap();
		assert_eq!(tracker.config().hasura_endpoint, "http://localhost:8080/v1/query");
		assert!(matches!(Tracker::new(Configuration::new("")), Err(Error::MissingEndpoint)));
	}

	#[tokio::test]
	async fn disabled_operations_are_skipped() {
		let client = RecordingClient::new(catalog);
		let mut config = all_operations();
		config.operations = Operations {
			untrack: false,
			track_tables: true,
			track_relationships: false,
			track_functions: false,
		};
		let report = Tracker::with_client(config, &client).run().await.unwrap();
		assert!(report.untracked.is_none());
		assert!(report.relationships.is_none());
		assert!(!kinds(&client).contains(&"untrack_table"));
		assert_eq!(report.phases().count(), 1);
	}

	#[tokio::test]
	async fn a_missing_schema_stops_the_run() {
		let client = RecordingClient::new(|_| Ok(json!({ "result": [["schema_name"]] })));
		let mut config = all_operations();
		config.target_schema = "missing".to_owned();
		let err = Tracker::with_client(config, &client).run().await.unwrap_err();
		assert!(matches!(err, Error::SchemaNotFound(ref s) if s == "missing"));
		assert_eq!(client.calls().len(), 1);
	}

	#[tokio::test]
	async fn naming_must_be_derivable() {
		let client = RecordingClient::new(catalog);
		let mut config = all_operations();
		config.primary_key_suffix = String::new();
		let err = Tracker::with_client(config.clone(), &client).run().await.unwrap_err();
		assert!(matches!(err, Error::NamingUnderspecified));
		assert!(client.calls().is_empty());

		let naming = FnNaming::new(
			|fact: &ForeignKeyFact| format!("{}_list", fact.table1),
			|fact: &ForeignKeyFact| fact.table2.clone(),
		);
		let report = Tracker::with_client(config, &client).with_naming_policy(naming).run().await.unwrap();
		assert!(report.is_clean());
		let names: Vec<String> = client
			.calls()
			.iter()
			.filter(|op| op.kind().starts_with("create_"))
			.map(|op| op.args()["name"].as_str().unwrap().to_owned())
			.collect();
		assert_eq!(names, vec!["orders_list", "customers"]);
	}

	#[tokio::test]
	async fn view_relationships_reach_relationship_tracking() {
		let client = RecordingClient::new(catalog);
		let mut config = all_operations();
		config.views = vec![ViewDeclaration {
			name: "order_view".to_owned(),
			description: String::new(),
			query: ViewQuery {
				select: "SELECT *".to_owned(),
				from: "FROM orders".to_owned(),
				..Default::default()
			},
			columns: None,
			relationships: vec![VirtualRelationship {
				kind: Some(crate::config::RelationshipKind::Object),
				name: Some("buyer".to_owned()),
				src_table: String::new(),
				src_key: "customer_id".to_owned(),
				dest_table: "customers".to_owned(),
				dest_key: "id".to_owned(),
			}],
		}];
		let report = Tracker::with_client(config, &client).run().await.unwrap();
		assert_eq!(report.views.unwrap().applied, 1);
		let buyer = client
			.calls()
			.into_iter()
			.find(|op| op.args()["name"] == json!("buyer"))
			.expect("the view relationship was created");
		assert_eq!(buyer.kind(), "create_object_relationship");
		assert_eq!(buyer.args()["table"]["name"], json!("order_view"));
	}

	#[tokio::test]
	async fn item_failures_do_not_fail_the_run() {
		let client = RecordingClient::new(|op| match op.kind() {
			"track_table" => Err(remote_error(op, "permission denied")),
			_ => catalog(op),
		});
		let report = Tracker::with_client(all_operations(), &client).run().await.unwrap();
		assert!(!report.is_clean());
		assert_eq!(report.tables.unwrap().failures.len(), 2);
		assert_eq!(report.relationships.unwrap().applied, 2);
	}

	#[tokio::test]
	async fn catalog_failures_abort_the_run() {
		let client = RecordingClient::new(|op| {
			let sql = op.args()["sql"].as_str().unwrap_or_default();
			if sql.contains("FOREIGN KEY") {
				Err(remote_error(op, "permission denied for schema information_schema"))
			} else {
				catalog(op)
			}
		});
		let err = Tracker::with_client(all_operations(), &client).run().await.unwrap_err();
		assert!(matches!(err, Error::Sql { .. }));
	}
}
