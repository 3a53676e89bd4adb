use serde::{Deserialize, Serialize};
use serde_json::Value;

use cat_domain::{BoolQuery, ItemType, ParentLink, Query, SearchRequest, SourceFilter};

use crate::{CatalogService, Envelope, Error, Result, executor, normalizer::ResponseShape};

const DATASET_FIELDS: [&str; 18] = [
	"resourceServer",
	"id",
	"type",
	"apdURL",
	"label",
	"description",
	"instance",
	"accessPolicy",
	"cosURL",
	"dataSample",
	"dataDescriptor",
	"@context",
	"dataQualityFile",
	"dataSampleFile",
	"resourceType",
	"resourceServerRegURL",
	"location",
	"iudxResourceAPIs",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRequest {
	pub id: String,
}

impl CatalogService {
	/// One resource group with its provider, resources and COS folded into a single object.
	pub async fn dataset(&self, req: DatasetRequest) -> Envelope {
		crate::respond("dataset", self.dataset_inner(&req).await)
	}

	async fn dataset_inner(&self, req: &DatasetRequest) -> Result<Envelope> {
		let id = req.id.trim();

		if id.is_empty() {
			return Err(Error::InvalidSyntax { detail: "id not found".to_string() });
		}

		let lookup = SearchRequest::new(Query::term("id.keyword", id))
			.source(SourceFilter::includes(vec!["provider".to_string(), "cos".to_string()]))
			.window(self.page_size(), 0);
		let hits = self.backend.search(self.catalogue_index(), &lookup).await?;
		let Some(group) = hits.hits.into_iter().next() else {
			return Err(Error::ItemNotFound {
				detail: "dataset belonging to Id requested is not present".to_string(),
			});
		};
		let provider = group.source.get(ParentLink::Provider.field()).and_then(Value::as_str);
		let cos = group.source.get(ParentLink::Cos.field()).and_then(Value::as_str);
		let request = dataset_request(id, provider, cos, self.page_size());
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::Dataset,
		)
		.await?;

		Ok(Envelope::success(normalized.total_hits, normalized.results))
	}
}

fn dataset_request(
	group_id: &str,
	provider: Option<&str>,
	cos: Option<&str>,
	page_size: u32,
) -> SearchRequest {
	let typed = |field: &str, value: &str, item_type: ItemType| -> Query {
		BoolQuery::default()
			.must(Query::matches(field, value))
			.must(Query::matches("type.keyword", item_type.as_str()))
			.into()
	};
	let mut query = BoolQuery::default()
		.should(typed("id.keyword", group_id, ItemType::ResourceGroup))
		.should(typed(&ParentLink::ResourceGroup.keyword_field(), group_id, ItemType::Resource));

	if let Some(provider) = provider {
		query = query.should(typed("id.keyword", provider, ItemType::Provider));
	}
	if let Some(cos) = cos {
		query = query.should(typed("id.keyword", cos, ItemType::Cos));
	}

	SearchRequest::new(query.into())
		.source(SourceFilter::includes(DATASET_FIELDS.iter().map(|f| f.to_string()).collect()))
		.window(page_size, 0)
}
