use serde::{Deserialize, Serialize};

use cat_domain::{Aggregation, BoolQuery, ItemType, Query, SearchRequest};

use crate::{CatalogService, Envelope, Error, Result, decoder, executor, normalizer::ResponseShape};

const ITEM_TYPE_TAGS: &str = "tags";
const PROVIDER_SUMMARY_FIELDS: [&str; 9] = [
	"id",
	"description",
	"type",
	"resourceGroup",
	"accessPolicy",
	"provider",
	"itemCreatedAt",
	"instance",
	"label",
];

/// Lists distinct ids of one item type, or distinct tags when `item_type` is `tags`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsRequest {
	pub item_type: String,
	#[serde(rename = "type")]
	pub type_tag: Option<String>,
	pub instance: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSummaryRequest {
	pub instance: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

impl CatalogService {
	pub async fn list_items(&self, req: ListItemsRequest) -> Envelope {
		crate::respond("list_items", self.list_items_inner(&req).await)
	}

	pub async fn provider_summary(&self, req: ProviderSummaryRequest) -> Envelope {
		crate::respond("provider_summary", self.provider_summary_inner(&req).await)
	}

	async fn list_items_inner(&self, req: &ListItemsRequest) -> Result<Envelope> {
		let request = list_items_request(req, self.page_size())?;
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::AggregationOnly,
		)
		.await?;

		Ok(Envelope::success(normalized.total_hits, normalized.results))
	}

	async fn provider_summary_inner(&self, req: &ProviderSummaryRequest) -> Result<Envelope> {
		let mut query = BoolQuery::default()
			.should(Query::term("type.keyword", ItemType::Provider.as_str()))
			.should(Query::term("type.keyword", ItemType::ResourceGroup.as_str()))
			.minimum_should_match(1);

		if let Some(instance) = req.instance.as_deref().filter(|instance| !instance.is_empty()) {
			query = query.must(Query::term("instance.keyword", instance));
		}

		let request = decoder::finish(
			query.into(),
			req.limit,
			req.offset,
			None,
			&PROVIDER_SUMMARY_FIELDS,
			self.page_size(),
		)
		.aggregation("provider_count", Aggregation::Cardinality {
			field: "provider.keyword".to_string(),
		});
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::ProviderAggregation,
		)
		.await?;

		Ok(Envelope::success(normalized.total_hits, normalized.results))
	}
}

fn list_items_request(req: &ListItemsRequest, page_size: u32) -> Result<SearchRequest> {
	let item_type = req.item_type.trim();

	if item_type.is_empty() {
		return Err(Error::InvalidSyntax { detail: "Invalid Syntax".to_string() });
	}

	let (size, _) = decoder::window(req.limit, req.offset, page_size);
	let instance = req.instance.as_deref().filter(|instance| !instance.is_empty());

	if item_type.eq_ignore_ascii_case(ITEM_TYPE_TAGS) {
		let query = match instance {
			Some(instance) => Query::term("instance.keyword", instance),
			None => Query::MatchAll,
		};

		return Ok(SearchRequest::new(query)
			.window(0, 0)
			.aggregation("results", Aggregation::terms("tags.keyword", Some(size))));
	}

	let Some(type_tag) = req.type_tag.as_deref().filter(|tag| !tag.is_empty()) else {
		return Err(Error::InvalidSyntax { detail: "Invalid Syntax".to_string() });
	};
	let mut query = BoolQuery::default().filter(Query::matches("type", type_tag));

	if let Some(instance) = instance {
		query = query.filter(Query::term("instance.keyword", instance));
	}

	Ok(SearchRequest::new(query.into())
		.window(0, 0)
		.aggregation("results", Aggregation::terms("id.keyword", Some(size))))
}
