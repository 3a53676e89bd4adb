//! Reshapes raw backend hits into result payloads.

mod dataset;

use serde_json::{Map, Value};

use cat_providers::SearchHits;

use crate::{Error, Result};

pub const SUMMARY_FIELD: &str = "_summary";
pub const WORD_VECTOR_FIELD: &str = "_word_vector";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
	/// Hit bodies without internal computed fields.
	SourceOnly,
	/// Backend document ids.
	DocIdsOnly,
	/// `{ _source, _id }` pairs.
	SourceAndId,
	/// Keys of the `results` bucket aggregation.
	AggregationOnly,
	/// `{ id, totalRatings, averageRating }` per bucket.
	RatingAggregation,
	/// One composite dataset object.
	Dataset,
	/// Distinct provider count plus the matching sources.
	ProviderAggregation,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
	pub total_hits: u64,
	pub results: Vec<Value>,
}

pub fn normalize(hits: SearchHits, shape: ResponseShape) -> Result<Normalized> {
	let total_hits = hits.total_hits;

	if total_hits == 0 {
		return Ok(Normalized { total_hits, results: Vec::new() });
	}

	let results = match shape {
		ResponseShape::SourceOnly =>
			hits.hits.into_iter().map(|hit| Value::Object(strip_internal(hit.source))).collect(),
		ResponseShape::DocIdsOnly => hits.hits.into_iter().map(|hit| Value::String(hit.id)).collect(),
		ResponseShape::SourceAndId => hits
			.hits
			.into_iter()
			.map(|hit| serde_json::json!({ "_source": hit.source, "_id": hit.id }))
			.collect(),
		ResponseShape::AggregationOnly => buckets(hits.aggregations.as_ref())?
			.iter()
			.filter_map(|bucket| bucket.get("key").cloned())
			.collect(),
		ResponseShape::RatingAggregation => buckets(hits.aggregations.as_ref())?
			.iter()
			.map(rating_summary)
			.collect::<Result<Vec<_>>>()?,
		ResponseShape::Dataset => vec![dataset::assemble(hits.hits)?],
		ResponseShape::ProviderAggregation => vec![provider_aggregation(hits)],
	};

	Ok(Normalized { total_hits, results })
}

pub fn strip_internal(mut source: Map<String, Value>) -> Map<String, Value> {
	source.remove(SUMMARY_FIELD);
	source.remove(WORD_VECTOR_FIELD);

	source
}

fn buckets(aggregations: Option<&Value>) -> Result<&[Value]> {
	aggregations
		.and_then(|aggs| aggs.get("results"))
		.and_then(|results| results.get("buckets"))
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.ok_or_else(|| Error::Backend {
			message: "Aggregation response is missing results.buckets.".to_string(),
		})
}

fn rating_summary(bucket: &Value) -> Result<Value> {
	let Some(id) = bucket.get("key").and_then(Value::as_str) else {
		return Err(Error::Backend { message: "Rating bucket is missing key.".to_string() });
	};
	let total_ratings = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
	let average_rating = bucket
		.get("average_rating")
		.and_then(|avg| avg.get("value"))
		.cloned()
		.unwrap_or(Value::Null);

	Ok(serde_json::json!({
		"id": id,
		"totalRatings": total_ratings,
		"averageRating": average_rating,
	}))
}

fn provider_aggregation(hits: SearchHits) -> Value {
	let provider_count = hits
		.aggregations
		.as_ref()
		.and_then(|aggs| aggs.get("provider_count"))
		.and_then(|count| count.get("value"))
		.cloned();
	let sources: Vec<Value> =
		hits.hits.into_iter().map(|hit| Value::Object(strip_internal(hit.source))).collect();
	let mut result = Map::new();

	if let Some(count) = provider_count {
		result.insert("providerCount".to_string(), count);
	}

	result.insert("resourceGroupAndProvider".to_string(), Value::Array(sources));

	Value::Object(result)
}
