//! The configuration of a tracker run.
//!
//! A configuration is read from a JSON document (see [`Configuration::from_json`])
//! or synthesized from command-line flags, validated once, and then passed by
//! reference through every phase of the run.

use crate::cnf::{DEFAULT_PRIMARY_KEY_SUFFIX, DEFAULT_TARGET_SCHEMA};
use crate::err::Error;
use crate::naming::BuiltinProcessor;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
	/// The Hasura metadata endpoint, e.g. `http://localhost:8080/v1/query`
	#[serde(default)]
	pub hasura_endpoint: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hasura_admin_secret: Option<String>,
	#[serde(default = "default_target_schema")]
	pub target_schema: String,
	#[serde(default = "default_primary_key_suffix")]
	pub primary_key_suffix: String,
	/// A raw SQL fragment appended to the function listing query, e.g.
	/// `AND routine_name LIKE 'fn_%'`. It is not escaped.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub function_and_clause: Option<String>,
	#[serde(default)]
	pub operations: Operations,
	#[serde(default)]
	pub views: Vec<ViewDeclaration>,
	#[serde(default)]
	pub relationships: Vec<VirtualRelationship>,
	#[serde(default)]
	pub scripts: Scripts,
	#[serde(default)]
	pub relationship_naming: NamingStyle,
	#[serde(default)]
	pub name_processors: Vec<BuiltinProcessor>,
}

fn default_target_schema() -> String {
	DEFAULT_TARGET_SCHEMA.to_owned()
}

fn default_primary_key_suffix() -> String {
	DEFAULT_PRIMARY_KEY_SUFFIX.to_owned()
}

impl Configuration {
	/// A configuration for the given endpoint with every other option defaulted
	pub fn new(hasura_endpoint: impl Into<String>) -> Self {
		Self {
			hasura_endpoint: hasura_endpoint.into(),
			hasura_admin_secret: None,
			target_schema: default_target_schema(),
			primary_key_suffix: default_primary_key_suffix(),
			function_and_clause: None,
			operations: Operations::default(),
			views: Vec::new(),
			relationships: Vec::new(),
			scripts: Scripts::default(),
			relationship_naming: NamingStyle::default(),
			name_processors: Vec::new(),
		}
	}

	/// Parse a configuration document
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Check the preconditions which make a run impossible
	pub fn validate(&self) -> Result<(), Error> {
		if self.hasura_endpoint.trim().is_empty() {
			return Err(Error::MissingEndpoint);
		}
		Ok(())
	}

	/// Whether relationship names can be derived without a caller-supplied policy
	pub fn has_primary_key_suffix(&self) -> bool {
		!self.primary_key_suffix.trim().is_empty()
	}

	/// A copy of this configuration which is safe to print
	pub fn redacted(&self) -> Self {
		let mut copy = self.clone();
		if copy.hasura_admin_secret.is_some() {
			copy.hasura_admin_secret = Some("********".to_owned());
		}
		copy
	}
}

/// Which phases of the run are enabled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operations {
	#[serde(default)]
	pub untrack: bool,
	#[serde(default)]
	pub track_tables: bool,
	#[serde(default)]
	pub track_relationships: bool,
	#[serde(default)]
	pub track_functions: bool,
}

impl Default for Operations {
	fn default() -> Self {
		Self {
			untrack: true,
			track_tables: true,
			track_relationships: true,
			track_functions: false,
		}
	}
}

/// The built-in relationship naming policy selected by the configuration file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStyle {
	#[default]
	Default,
	Compact,
}

/// The kind of relationship created in the metadata layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
	#[serde(rename = "create_array_relationship")]
	Array,
	#[serde(rename = "create_object_relationship")]
	Object,
}

impl RelationshipKind {
	/// The metadata API operation creating this kind of relationship
	pub fn operation(self) -> &'static str {
		match self {
			RelationshipKind::Array => "create_array_relationship",
			RelationshipKind::Object => "create_object_relationship",
		}
	}
}

/// A relationship declared in the configuration rather than discovered from a
/// foreign key.
///
/// Declarations are written from the point of view of the table holding the
/// key: `srcTable.srcKey` refers to `destTable.destKey`. Without a `type` both
/// directions are created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRelationship {
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<RelationshipKind>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default)]
	pub src_table: String,
	pub src_key: String,
	pub dest_table: String,
	pub dest_key: String,
}

/// A view flattening JSON payloads into typed SQL columns
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDeclaration {
	pub name: String,
	#[serde(default)]
	pub description: String,
	pub query: ViewQuery,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub columns: Option<ViewColumns>,
	#[serde(default)]
	pub relationships: Vec<VirtualRelationship>,
}

/// The clauses of a view's query, each a SQL fragment including its keyword
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
	pub select: String,
	#[serde(default)]
	pub from: String,
	#[serde(default)]
	pub join: String,
	#[serde(default, rename = "where")]
	pub filter: String,
	#[serde(default)]
	pub order_by: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewColumns {
	/// The JSON column the values are extracted from
	pub json_column: String,
	#[serde(default)]
	pub json_values: Vec<JsonValue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonValue {
	pub json_name: String,
	pub sql_type: String,
	pub sql_name: String,
}

/// SQL scripts executed around view generation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scripts {
	#[serde(default)]
	pub before_views: Vec<ScriptSource>,
	#[serde(default)]
	pub after_views: Vec<ScriptSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSource {
	pub source: PathBuf,
}
