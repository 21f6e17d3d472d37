use crate::reconcile::RelationshipSpec;
use serde::Serialize;
use serde_json::{Value, json};

/// A typed metadata API envelope
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Operation {
	#[serde(skip)]
	kind: &'static str,
	body: Value,
}

impl Operation {
	fn new(kind: &'static str, args: Value) -> Self {
		Self {
			kind,
			body: json!({ "type": kind, "args": args }),
		}
	}

	pub fn run_sql(sql: &str) -> Self {
		Self::new("run_sql", json!({ "sql": sql }))
	}

	pub fn track_table(schema: &str, name: &str) -> Self {
		Self::new("track_table", json!({ "schema": schema, "name": name }))
	}

	/// Untrack a table or view, dropping the metadata which depends on it
	pub fn untrack_table(schema: &str, name: &str) -> Self {
		Self::new(
			"untrack_table",
			json!({ "table": { "schema": schema, "name": name }, "cascade": true }),
		)
	}

	pub fn track_function(schema: &str, name: &str) -> Self {
		Self::new("track_function", json!({ "schema": schema, "name": name }))
	}

	pub fn untrack_function(schema: &str, name: &str) -> Self {
		Self::new("untrack_function", json!({ "schema": schema, "name": name }))
	}

	/// Create a manually configured relationship between two tables of the schema
	pub fn create_relationship(schema: &str, spec: &RelationshipSpec) -> Self {
		let mut column_mapping = serde_json::Map::new();
		column_mapping.insert(spec.src_key.clone(), Value::String(spec.dest_key.clone()));
		Self::new(
			spec.kind.operation(),
			json!({
				"table": { "name": spec.src_table, "schema": schema },
				"name": spec.name,
				"using": {
					"manual_configuration": {
						"remote_table": { "name": spec.dest_table, "schema": schema },
						"column_mapping": column_mapping,
					}
				}
			}),
		)
	}

	/// The operation type, e.g. `track_table`
	pub fn kind(&self) -> &'static str {
		self.kind
	}

	/// The JSON body posted to the endpoint
	pub fn body(&self) -> &Value {
		&self.body
	}

	/// The `args` object of the envelope
	pub fn args(&self) -> &Value {
		&self.body["args"]
	}
}
