//! Keeps the Hasura metadata of a Postgres schema in sync with the schema itself.
//!
//! A [`Tracker`](tracker::Tracker) reads the catalog through Hasura's `run_sql`
//! operation, then untracks, generates views, and tracks functions, tables and
//! relationships, in that order. Every metadata call is idempotent, so a run can
//! be repeated safely.

#[macro_use]
extern crate tracing;

pub mod api;
pub mod cli;
pub mod cnf;
pub mod config;
pub mod discovery;
pub mod err;
pub mod naming;
pub mod reconcile;
pub mod telemetry;
pub mod tracker;
pub mod views;

pub use config::Configuration;
pub use err::Error;
pub use tracker::{RunReport, Tracker};
