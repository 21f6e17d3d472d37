//! Views flattening JSON payloads into typed columns.
//!
//! Each view is dropped and recreated from its declared clauses, with one
//! `CAST(<column> ->> '<key>' AS <type>)` projection per declared JSON value.
//! Unlike the tracking phases, this writes to the database.

use crate::api::{self, MetadataClient};
use crate::config::{ScriptSource, ViewDeclaration, VirtualRelationship};
use crate::err::Error;
use crate::reconcile::{Failure, FailureKind, Outcome, PhaseReport};

/// What the view phase produced
#[derive(Debug, Default)]
pub struct ViewsOutput {
	pub report: PhaseReport,
	/// Relationships declared by the views, bound to the view they belong to
	pub relationships: Vec<VirtualRelationship>,
}

/// The relationships declared by a view, with the source table rebound to the view
pub fn view_relationships(view: &ViewDeclaration) -> impl Iterator<Item = VirtualRelationship> + '_ {
	view.relationships.iter().map(|rel| VirtualRelationship {
		src_table: view.name.clone(),
		..rel.clone()
	})
}

fn strip_trailing_commas(fragment: &str) -> &str {
	fragment.trim().trim_end_matches(|c: char| c == ',' || c.is_whitespace())
}

/// The full SQL script (drop, create, comment) for one view
pub fn view_sql(schema: &str, view: &ViewDeclaration) -> String {
	let target = format!("\"{schema}\".\"{}\"", view.name);
	let mut projections = Vec::new();
	let select = strip_trailing_commas(&view.query.select);
	if !select.is_empty() {
		projections.push(select.to_owned());
	}
	if let Some(columns) = &view.columns {
		projections.extend(columns.json_values.iter().map(|value| {
			format!(
				"CAST({} ->> '{}' AS {}) AS \"{}\"",
				columns.json_column, value.json_name, value.sql_type, value.sql_name
			)
		}));
	}
	let clauses = [&view.query.from, &view.query.join, &view.query.filter, &view.query.order_by]
		.into_iter()
		.map(|clause| clause.trim())
		.filter(|clause| !clause.is_empty())
		.collect::<Vec<_>>()
		.join("\n");
	format!(
		"DROP VIEW IF EXISTS {target};\n\
		CREATE VIEW {target} AS\n\
		{}\n\
		{clauses};\n\
		COMMENT ON VIEW {target} IS '{}';",
		projections.join(",\n"),
		view.description.replace('\'', "''"),
	)
}

async fn run_scripts<C: MetadataClient>(client: &C, scripts: &[ScriptSource]) -> Result<(), Error> {
	for script in scripts {
		info!("Running SQL script - {}", script.source.display());
		let sql = tokio::fs::read_to_string(&script.source).await.map_err(|source| {
			Error::ScriptRead {
				path: script.source.clone(),
				source,
			}
		})?;
		api::run_sql(client, &sql).await?;
	}
	Ok(())
}

/// Run the before scripts, recreate every view, then run the after scripts.
///
/// A failing view is logged and the others are still created. A failing
/// script aborts the phase.
pub async fn generate_views<C: MetadataClient>(
	client: &C,
	schema: &str,
	views: &[ViewDeclaration],
	before: &[ScriptSource],
	after: &[ScriptSource],
) -> Result<ViewsOutput, Error> {
	run_scripts(client, before).await?;
	let mut output = ViewsOutput::default();
	for view in views {
		info!("Create view - {}", view.name);
		output.relationships.extend(view_relationships(view));
		let sql = view_sql(schema, view);
		let outcome = match api::run_sql(client, &sql).await {
			Ok(_) => {
				debug!("Created {}", view.name);
				Outcome::Applied
			}
			Err(e) => {
				error!("SQL query failed to execute - view {}\n{sql}\n  error: {e}", view.name);
				Outcome::Failed(Failure {
					target: view.name.clone(),
					kind: FailureKind::Rejected,
					message: e.to_string(),
				})
			}
		};
		output.report.record(outcome);
	}
	run_scripts(client, after).await?;
	Ok(output)
}
