//! Catalog queries.
//!
//! Each query runs through `run_sql`, and its rows, header included, are
//! projected into names or foreign key facts. Nothing here writes to the
//! database.

use crate::api::{self, MetadataClient, Rows};
use crate::config::{RelationshipKind, VirtualRelationship};
use crate::err::Error;

/// A directed foreign key: `table1.key1` references `table2.key2`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKeyFact {
	pub table1: String,
	pub key1: String,
	pub table2: String,
	pub key2: String,
	/// Overrides every naming policy when set
	pub name: Option<String>,
	pub add_array_relationship: bool,
	pub add_object_relationship: bool,
}

impl ForeignKeyFact {
	/// A fact read from the catalog, which implies both directions
	pub fn catalog(table1: &str, key1: &str, table2: &str, key2: &str) -> Self {
		Self {
			table1: table1.to_owned(),
			key1: key1.to_owned(),
			table2: table2.to_owned(),
			key2: key2.to_owned(),
			name: None,
			add_array_relationship: true,
			add_object_relationship: true,
		}
	}
}

impl From<&VirtualRelationship> for ForeignKeyFact {
	fn from(rel: &VirtualRelationship) -> Self {
		Self {
			table1: rel.src_table.clone(),
			key1: rel.src_key.clone(),
			table2: rel.dest_table.clone(),
			key2: rel.dest_key.clone(),
			name: rel.name.clone(),
			add_array_relationship: rel.kind != Some(RelationshipKind::Object),
			add_object_relationship: rel.kind != Some(RelationshipKind::Array),
		}
	}
}

/// Quote a value as a SQL string literal
pub(crate) fn literal(value: &str) -> String {
	format!("'{}'", value.replace('\'', "''"))
}

/// The first column of every row after the header
fn first_column(rows: Rows) -> Vec<String> {
	rows.into_iter().skip(1).filter_map(|row| row.into_iter().next().flatten()).collect()
}

fn tables_sql(schema: &str) -> String {
	let schema = literal(schema);
	format!(
		"SELECT table_name FROM information_schema.tables WHERE table_schema = {schema} \
		UNION \
		SELECT table_name FROM information_schema.views WHERE table_schema = {schema} \
		ORDER BY table_name;"
	)
}

fn foreign_keys_sql(schema: &str) -> String {
	format!(
		"SELECT tc.table_name, kcu.column_name, ccu.table_name AS foreign_table_name, ccu.column_name AS foreign_column_name \
		FROM information_schema.table_constraints AS tc \
		JOIN information_schema.key_column_usage AS kcu ON tc.constraint_name = kcu.constraint_name \
		JOIN information_schema.constraint_column_usage AS ccu ON ccu.constraint_name = tc.constraint_name \
		WHERE tc.constraint_type = 'FOREIGN KEY' \
		AND tc.constraint_schema = {};",
		literal(schema)
	)
}

fn functions_sql(schema: &str, extra_filter: Option<&str>) -> String {
	format!(
		"SELECT routine_name FROM information_schema.routines \
		WHERE routine_type = 'FUNCTION' AND routine_schema = {} {} \
		ORDER BY routine_name;",
		literal(schema),
		extra_filter.unwrap_or_default()
	)
}

fn schema_sql(schema: &str) -> String {
	format!(
		"SELECT schema_name FROM information_schema.schemata WHERE schema_name = {};",
		literal(schema)
	)
}

/// Every base table and view in the schema, in alphabetical order
pub async fn list_trackable_entities<C: MetadataClient>(
	client: &C,
	schema: &str,
) -> Result<Vec<String>, Error> {
	let rows = api::run_sql(client, &tables_sql(schema)).await?;
	Ok(first_column(rows))
}

/// Every foreign key constraint declared in the schema
pub async fn list_foreign_keys<C: MetadataClient>(
	client: &C,
	schema: &str,
) -> Result<Vec<ForeignKeyFact>, Error> {
	let rows = api::run_sql(client, &foreign_keys_sql(schema)).await?;
	let mut facts = Vec::with_capacity(rows.len().saturating_sub(1));
	for row in rows.into_iter().skip(1) {
		match row.as_slice() {
			[Some(t1), Some(k1), Some(t2), Some(k2), ..] => {
				facts.push(ForeignKeyFact::catalog(t1, k1, t2, k2));
			}
			_ => {
				return Err(Error::UnexpectedResponse(format!(
					"foreign key query returned an incomplete row: {row:?}"
				)));
			}
		}
	}
	Ok(facts)
}

/// Every function in the schema matching the filter, in alphabetical order.
///
/// The filter is appended to the `WHERE` clause as written, e.g.
/// `AND routine_name LIKE 'fn_%'`. It comes from the operator's own
/// configuration and is not escaped.
pub async fn list_functions<C: MetadataClient>(
	client: &C,
	schema: &str,
	extra_filter: Option<&str>,
) -> Result<Vec<String>, Error> {
	let rows = api::run_sql(client, &functions_sql(schema, extra_filter)).await?;
	let mut names = first_column(rows);
	// overloaded functions are listed once per signature
	names.dedup();
	Ok(names)
}

pub async fn schema_exists<C: MetadataClient>(client: &C, schema: &str) -> Result<bool, Error> {
	let rows = api::run_sql(client, &schema_sql(schema)).await?;
	Ok(rows.len() > 1)
}
