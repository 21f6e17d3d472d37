use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A name transform. The flag is set when the name denotes the "one" side of a
/// relationship.
pub type ProcessorFn = Arc<dyn Fn(&str, bool) -> String + Send + Sync>;

/// Transforms which can be selected from the configuration file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuiltinProcessor {
	/// Lowercase the name and turn hyphens into underscores
	Lowercase,
	/// Turn a plural into a singular, only in the singular context
	Singular,
	/// Join words on `_` and `-` boundaries into camelCase
	CamelCase,
}

impl BuiltinProcessor {
	pub fn apply(self, name: &str, singular: bool) -> String {
		match self {
			BuiltinProcessor::Lowercase => name.to_lowercase().replace('-', "_"),
			BuiltinProcessor::Singular if singular => singularize(name),
			BuiltinProcessor::Singular => name.to_owned(),
			BuiltinProcessor::CamelCase => camel_case(name),
		}
	}
}

/// An ordered list of transforms, applied left to right
#[derive(Clone, Default)]
pub struct ProcessorChain {
	processors: Vec<ProcessorFn>,
}

impl ProcessorChain {
	pub fn from_builtins(builtins: &[BuiltinProcessor]) -> Self {
		let processors = builtins
			.iter()
			.map(|&builtin| Arc::new(move |name: &str, singular: bool| builtin.apply(name, singular)) as ProcessorFn)
			.collect();
		Self {
			processors,
		}
	}

	/// Append a transform to the end of the chain
	pub fn with(mut self, processor: impl Fn(&str, bool) -> String + Send + Sync + 'static) -> Self {
		self.processors.push(Arc::new(processor));
		self
	}

	pub fn is_empty(&self) -> bool {
		self.processors.is_empty()
	}

	pub fn apply(&self, name: &str, singular: bool) -> String {
		self.processors.iter().fold(name.to_owned(), |name, processor| processor(&name, singular))
	}
}

impl fmt::Debug for ProcessorChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProcessorChain").field("len", &self.processors.len()).finish()
	}
}

/// Turn a plural word into its singular.
///
/// `ies` becomes `y`, `sses` becomes `ss`, and a trailing `s` is dropped unless
/// the word ends in `us` or `ss`. This is a heuristic: `boxes` becomes `boxe`.
pub fn singularize(word: &str) -> String {
	if let Some(stem) = word.strip_suffix("ies") {
		format!("{stem}y")
	} else if let Some(stem) = word.strip_suffix("sses") {
		format!("{stem}ss")
	} else if word.ends_with("us") || word.ends_with("ss") {
		word.to_owned()
	} else if let Some(stem) = word.strip_suffix('s') {
		stem.to_owned()
	} else {
		word.to_owned()
	}
}

/// Join the words of a `snake_case` or `kebab-case` name into `camelCase`
pub fn camel_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	for (i, word) in name.split(['_', '-']).filter(|w| !w.is_empty()).enumerate() {
		let mut chars = word.chars();
		if let Some(first) = chars.next() {
			if i == 0 {
				out.extend(first.to_lowercase());
			} else {
				out.extend(first.to_uppercase());
			}
			out.push_str(chars.as_str());
		}
	}
	out
}
