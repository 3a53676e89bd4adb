use serde::{Deserialize, Serialize};
use serde_json::Value;

use cat_domain::{Aggregation, BoolQuery, Query, SearchRequest, SourceFilter};

use crate::{CatalogService, Envelope, Error, Result, executor, normalizer::ResponseShape};

const APPROVED: &str = "approved";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageRatingRequest {
	pub id: String,
}

impl CatalogService {
	/// Average approved rating of an item and, for a resource group, each of its resources.
	pub async fn average_rating(&self, req: AverageRatingRequest) -> Envelope {
		crate::respond("average_rating", self.average_rating_inner(&req).await)
	}

	async fn average_rating_inner(&self, req: &AverageRatingRequest) -> Result<Envelope> {
		let id = req.id.trim();

		if id.is_empty() {
			return Err(Error::InvalidSyntax { detail: "id not found".to_string() });
		}

		let ids = self.associated_ids(id).await?;
		let request = average_rating_request(&ids);
		let normalized = executor::execute(
			self.backend.as_ref(),
			&self.cfg.indices.rating,
			&request,
			ResponseShape::RatingAggregation,
		)
		.await?;

		Ok(Envelope::success(normalized.total_hits, normalized.results))
	}

	/// The item itself plus every resource filed under it.
	async fn associated_ids(&self, id: &str) -> Result<Vec<String>> {
		let query = BoolQuery::default()
			.should(Query::term("id.keyword", id))
			.should(Query::term("resourceGroup.keyword", id))
			.minimum_should_match(1);
		let request = SearchRequest::new(query.into())
			.source(SourceFilter::includes(vec!["id".to_string()]))
			.window(self.page_size(), 0);
		let hits = self.backend.search(self.catalogue_index(), &request).await?;
		let ids: Vec<String> = hits
			.hits
			.into_iter()
			.filter_map(|hit| hit.source.get("id").and_then(Value::as_str).map(str::to_string))
			.collect();

		if ids.is_empty() {
			return Err(Error::ItemNotFound { detail: "Item id given is not present".to_string() });
		}

		Ok(ids)
	}
}

fn average_rating_request(ids: &[String]) -> SearchRequest {
	let query = ids
		.iter()
		.fold(BoolQuery::default(), |query, id| query.should(Query::matches("id.keyword", id)))
		.minimum_should_match(1)
		.must(Query::matches("status", APPROVED));
	let per_item = Aggregation::Terms {
		field: "id.keyword".to_string(),
		size: None,
		nested: vec![("average_rating".to_string(), Aggregation::Avg { field: "rating".to_string() })],
	};

	SearchRequest::new(query.into()).window(0, 0).aggregation("results", per_item)
}
