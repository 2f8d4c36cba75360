//! Meilisearch `/indexes/{index}/search` client restricted to id retrieval.

use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHitsRequest {
	pub index: String,
	pub query: String,
	/// Filter expressions, joined with AND by the index.
	pub filter: Vec<String>,
	pub offset: u64,
	pub limit: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchHits {
	pub estimated_total: u64,
	pub ids: Vec<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
	q: &'a str,
	filter: &'a [String],
	offset: u64,
	limit: u64,
	attributes_to_retrieve: [&'static str; 1],
}

pub async fn search(cfg: &shelf_config::SearchIndex, req: &SearchHitsRequest) -> Result<SearchHits> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/indexes/{}/search", cfg.api_base, req.index);
	let body = SearchBody {
		q: &req.query,
		filter: &req.filter,
		offset: req.offset,
		limit: req.limit,
		attributes_to_retrieve: ["id"],
	};
	let res =
		client.post(url).headers(crate::auth_headers(&cfg.api_key)?).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

fn parse_search_response(json: Value) -> Result<SearchHits> {
	let hits = json
		.get("hits")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Search response is missing hits array."))?;
	let mut ids = Vec::with_capacity(hits.len());

	for hit in hits {
		let id = hit
			.get("id")
			.and_then(|v| v.as_i64())
			.ok_or_else(|| eyre::eyre!("Search hit is missing a numeric id."))?;

		ids.push(i32::try_from(id).map_err(|_| eyre::eyre!("Search hit id {id} is out of range."))?);
	}

	let estimated_total = json
		.get("estimatedTotalHits")
		.or_else(|| json.get("totalHits"))
		.and_then(|v| v.as_u64())
		.unwrap_or(ids.len() as u64);

	Ok(SearchHits { estimated_total, ids })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_hit_order_and_estimate() {
		let json = serde_json::json!({
			"hits": [{ "id": 7 }, { "id": 2 }, { "id": 9 }],
			"estimatedTotalHits": 120,
			"processingTimeMs": 1
		});
		let hits = parse_search_response(json).expect("parse failed");

		assert_eq!(hits, SearchHits { estimated_total: 120, ids: vec![7, 2, 9] });
	}

	#[test]
	fn falls_back_to_hit_count_without_estimate() {
		let json = serde_json::json!({ "hits": [{ "id": 1 }] });

		assert_eq!(parse_search_response(json).expect("parse failed").estimated_total, 1);
	}

	#[test]
	fn rejects_hits_without_ids() {
		let json = serde_json::json!({ "hits": [{ "title": "x" }] });

		assert!(parse_search_response(json).is_err());
		assert!(parse_search_response(serde_json::json!({})).is_err());
	}

	#[test]
	fn body_uses_index_field_names() {
		let filter = vec!["lang IN [ru, be]".to_string()];
		let body = SearchBody {
			q: "tolstoy",
			filter: &filter,
			offset: 50,
			limit: 50,
			attributes_to_retrieve: ["id"],
		};
		let value = serde_json::to_value(&body).expect("serialize failed");

		assert_eq!(
			value,
			serde_json::json!({
				"q": "tolstoy",
				"filter": ["lang IN [ru, be]"],
				"offset": 50,
				"limit": 50,
				"attributesToRetrieve": ["id"]
			})
		);
	}
}
