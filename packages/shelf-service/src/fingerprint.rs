//! Cache keys for resolved id lists.
//!
//! A fingerprint is `"{namespace}:{blake3}"`, the digest taken over a canonical JSON document of
//! the namespace and its parameters. Parameters live in a sorted map and set-valued parameters are
//! sorted and deduplicated, so the key never depends on the order a caller supplied them in.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use time::Date;

use shelf_domain::langs::LangFilter;

const FINGERPRINT_KIND: &str = "catalog_ids";
const FINGERPRINT_SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, Value>);
impl QueryParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn text(mut self, name: &str, value: &str) -> Self {
		self.0.insert(name.to_string(), Value::String(value.trim().to_string()));

		self
	}

	pub fn set<I, S>(mut self, name: &str, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let sorted = values.into_iter().map(|v| v.as_ref().to_string()).collect::<BTreeSet<_>>();

		self.0.insert(name.to_string(), Value::from(sorted.into_iter().collect::<Vec<_>>()));

		self
	}

	pub fn int(mut self, name: &str, value: Option<i64>) -> Self {
		self.0.insert(name.to_string(), value.map(Value::from).unwrap_or(Value::Null));

		self
	}

	pub fn flag(mut self, name: &str, value: Option<bool>) -> Self {
		self.0.insert(name.to_string(), value.map(Value::Bool).unwrap_or(Value::Null));

		self
	}

	pub fn date(mut self, name: &str, value: Option<Date>) -> Self {
		self.0.insert(
			name.to_string(),
			value.map(|date| Value::String(date.to_string())).unwrap_or(Value::Null),
		);

		self
	}

	/// `null` stands for every language, distinct from an empty set.
	pub fn langs(self, langs: &LangFilter) -> Self {
		match langs {
			LangFilter::All => self.raw("langs", Value::Null),
			LangFilter::Only(set) => self.set("langs", set),
		}
	}

	fn raw(mut self, name: &str, value: Value) -> Self {
		self.0.insert(name.to_string(), value);

		self
	}

	fn to_value(&self) -> Value {
		Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}
}

pub fn fingerprint(namespace: &str, params: &QueryParams) -> String {
	let payload = serde_json::json!({
		"kind": FINGERPRINT_KIND,
		"schema_version": FINGERPRINT_SCHEMA_VERSION,
		"namespace": namespace,
		"params": params.to_value(),
	});
	// `Value`'s `Display` writes compact JSON with object keys in map order, which is sorted here.
	let digest = blake3::hash(payload.to_string().as_bytes());

	format!("{namespace}:{}", digest.to_hex())
}

pub fn active_key(fingerprint: &str) -> String {
	format!("{fingerprint}:active")
}

pub(crate) fn key_prefix(key: &str) -> &str {
	let len = key.len().min(24);

	key.get(..len).unwrap_or(key)
}
