use reqwest::Method;
use serde_json::{Map, Value};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hit {
	/// Backend document id (`_id`), distinct from the catalog `id` inside the source.
	pub id: String,
	pub source: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
	pub total_hits: u64,
	pub hits: Vec<Hit>,
	pub aggregations: Option<Value>,
}

pub async fn search(cfg: &cat_config::Backend, index: &str, body: &Value) -> Result<SearchHits> {
	tracing::debug!(index = %index, "Dispatching search request.");

	let client = crate::client(cfg)?;
	let res = crate::request(&client, cfg, Method::POST, &format!("{index}/_search"))
		.json(body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

pub async fn count(cfg: &cat_config::Backend, index: &str, query: &Value) -> Result<u64> {
	let client = crate::client(cfg)?;
	let body = serde_json::json!({ "query": query });
	let res = crate::request(&client, cfg, Method::POST, &format!("{index}/_count"))
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_count_response(&json)
}

pub async fn create_doc(cfg: &cat_config::Backend, index: &str, body: &Value) -> Result<()> {
	let client = crate::client(cfg)?;
	let res = crate::request(&client, cfg, Method::POST, &format!("{index}/_doc"))
		.json(body)
		.send()
		.await?;

	res.error_for_status()?;

	Ok(())
}

pub async fn update_doc(
	cfg: &cat_config::Backend,
	index: &str,
	doc_id: &str,
	body: &Value,
) -> Result<()> {
	let client = crate::client(cfg)?;
	let res = crate::request(&client, cfg, Method::PUT, &format!("{index}/_doc/{doc_id}"))
		.json(body)
		.send()
		.await?;

	res.error_for_status()?;

	Ok(())
}

pub async fn delete_doc(cfg: &cat_config::Backend, index: &str, doc_id: &str) -> Result<()> {
	let client = crate::client(cfg)?;
	let res = crate::request(&client, cfg, Method::DELETE, &format!("{index}/_doc/{doc_id}"))
		.send()
		.await?;

	res.error_for_status()?;

	Ok(())
}

pub fn parse_search_response(json: Value) -> Result<SearchHits> {
	let hits = json.get("hits").ok_or_else(|| Error::InvalidResponse {
		message: "Search response is missing hits.".to_string(),
	})?;
	let total_hits = hits
		.get("total")
		.and_then(|total| total.get("value").or(Some(total)))
		.and_then(Value::as_u64)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Search response is missing hits.total.value.".to_string(),
		})?;
	let raw_hits = hits.get("hits").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
	let mut parsed = Vec::with_capacity(raw_hits.len());

	for raw in raw_hits {
		let id = raw.get("_id").and_then(Value::as_str).unwrap_or_default().to_string();
		let source = match raw.get("_source") {
			Some(Value::Object(source)) => source.clone(),
			Some(_) =>
				return Err(Error::InvalidResponse {
					message: "Search hit _source must be an object.".to_string(),
				}),
			None => Map::new(),
		};

		parsed.push(Hit { id, source });
	}

	let aggregations = json.get("aggregations").cloned();

	Ok(SearchHits { total_hits, hits: parsed, aggregations })
}

fn parse_count_response(json: &Value) -> Result<u64> {
	json.get("count").and_then(Value::as_u64).ok_or_else(|| Error::InvalidResponse {
		message: "Count response is missing count.".to_string(),
	})
}
