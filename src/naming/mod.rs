//! Relationship naming.
//!
//! Every foreign key fact can produce an array relationship (on the referenced
//! table) and an object relationship (on the table holding the key). A
//! [`NamingPolicy`] decides the name of each. An explicit name on the fact
//! always wins and never reaches the policy.

mod processors;

pub use processors::{BuiltinProcessor, ProcessorChain, ProcessorFn, camel_case, singularize};

use crate::config::{Configuration, NamingStyle};
use crate::discovery::ForeignKeyFact;

/// What a naming policy can see besides the fact itself
#[derive(Clone, Copy, Debug)]
pub struct NamingContext<'a> {
	pub schema: &'a str,
	pub primary_key_suffix: &'a str,
}

impl<'a> NamingContext<'a> {
	pub fn new(config: &'a Configuration) -> Self {
		Self {
			schema: &config.target_schema,
			primary_key_suffix: &config.primary_key_suffix,
		}
	}

	/// The key column with the first occurrence of the primary key suffix removed
	pub fn strip_suffix<'k>(&self, key: &'k str) -> std::borrow::Cow<'k, str> {
		if self.primary_key_suffix.is_empty() || !key.contains(self.primary_key_suffix) {
			std::borrow::Cow::Borrowed(key)
		} else {
			std::borrow::Cow::Owned(key.replacen(self.primary_key_suffix, "", 1))
		}
	}
}

pub trait NamingPolicy: Send + Sync {
	/// Name of the to-many relationship from `table2` towards `table1`
	fn array_name(&self, ctx: &NamingContext<'_>, fact: &ForeignKeyFact) -> String;
	/// Name of the to-one relationship from `table1` towards `table2`
	fn object_name(&self, ctx: &NamingContext<'_>, fact: &ForeignKeyFact) -> String;
}

/// `<key1 without suffix>_<table1>` for arrays, `<table1>_<key1 without suffix>` for objects.
///
/// With `orders.customer_id -> customers.customer_id` the array relationship on
/// `customers` is `customer_orders` and the object relationship on `orders` is
/// `orders_customer`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNaming;

impl NamingPolicy for DefaultNaming {
	fn array_name(&self, ctx: &NamingContext<'_>, fact: &ForeignKeyFact) -> String {
		format!("{}_{}", ctx.strip_suffix(&fact.key1), fact.table1)
	}

	fn object_name(&self, ctx: &NamingContext<'_>, fact: &ForeignKeyFact) -> String {
		format!("{}_{}", fact.table1, ctx.strip_suffix(&fact.key1))
	}
}

/// Names a relationship after the table on the other side when the key columns
/// share a name, falling back to [`DefaultNaming`] otherwise. The result is then
/// passed through the processor chain; object names are processed in the
/// singular context.
#[derive(Clone, Default)]
pub struct CompactNaming {
	processors: ProcessorChain,
}

impl CompactNaming {
	pub fn new(processors: ProcessorChain) -> Self {
		Self {
			processors,
		}
	}
}

impl NamingPolicy for CompactNaming {
	fn array_name(&self, ctx: &NamingContext<'_>, fact: &ForeignKeyFact) -> String {
		let name = if fact.key1 == fact.key2 {
			fact.table1.clone()
		} else {
			DefaultNaming.array_name(ctx, fact)
		};
		self.processors.apply(&name, false)
	}

	fn object_name(&self, ctx: &NamingContext<'_>, fact: &ForeignKeyFact) -> String {
		let name = if fact.key1 == fact.key2 {
			fact.table2.clone()
		} else {
			DefaultNaming.object_name(ctx, fact)
		};
		self.processors.apply(&name, true)
	}
}

/// A policy built from two caller-supplied functions
pub struct FnNaming<A, O> {
	array: A,
	object: O,
}

impl<A, O> FnNaming<A, O>
where
	A: Fn(&ForeignKeyFact) -> String + Send + Sync,
	O: Fn(&ForeignKeyFact) -> String + Send + Sync,
{
	pub fn new(array: A, object: O) -> Self {
		Self {
			array,
			object,
		}
	}
}

impl<A, O> NamingPolicy for FnNaming<A, O>
where
	A: Fn(&ForeignKeyFact) -> String + Send + Sync,
	O: Fn(&ForeignKeyFact) -> String + Send + Sync,
{
	fn array_name(&self, _: &NamingContext<'_>, fact: &ForeignKeyFact) -> String {
		(self.array)(fact)
	}

	fn object_name(&self, _: &NamingContext<'_>, fact: &ForeignKeyFact) -> String {
		(self.object)(fact)
	}
}

/// The built-in policy selected by the configuration file
pub fn from_config(config: &Configuration) -> Box<dyn NamingPolicy> {
	match config.relationship_naming {
		NamingStyle::Default => Box::new(DefaultNaming),
		NamingStyle::Compact => {
			Box::new(CompactNaming::new(ProcessorChain::from_builtins(&config.name_processors)))
		}
	}
}
