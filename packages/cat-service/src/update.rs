use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cat_domain::{BoolQuery, Query, SearchRequest, SourceFilter};

use crate::{
	CatalogService, Envelope, Error, Result, Urn,
	create::{self, STATUS_FAILED, STATUS_SUCCESS},
	executor,
	normalizer::ResponseShape,
};

const METHOD_UPDATE: &str = "update";
const DETAIL_MISSING: &str = "Fail: Doc doesn't exist, can't update";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateItemRequest {
	pub doc: Map<String, Value>,
}

impl CatalogService {
	/// Replaces an existing document matched by id and primary type.
	pub async fn update_item(&self, req: UpdateItemRequest) -> Envelope {
		crate::respond("update_item", self.update_item_inner(req).await)
	}

	async fn update_item_inner(&self, req: UpdateItemRequest) -> Result<Envelope> {
		let doc = req.doc;
		let id = create::document_id(&doc)?;
		let Some(primary_type) = doc
			.get("type")
			.and_then(Value::as_array)
			.and_then(|tags| tags.first())
			.and_then(Value::as_str)
		else {
			return Err(Error::InvalidSyntax { detail: "type not found".to_string() });
		};
		let check = BoolQuery::default()
			.must(Query::term("id.keyword", id.as_str()))
			.must(Query::term("type.keyword", primary_type));
		let request = SearchRequest::new(check.into())
			.source(SourceFilter::includes(vec!["id".to_string()]))
			.window(self.page_size(), 0);

		self.await_visibility().await;

		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::DocIdsOnly,
		)
		.await?;
		let doc_id = match normalized.results.as_slice() {
			[Value::String(doc_id)] if normalized.total_hits == 1 => doc_id.clone(),
			_ => {
				tracing::debug!(
					id = %id,
					total_hits = normalized.total_hits,
					"Update target not unique."
				);

				return Ok(Envelope::builder(Urn::ItemNotFound)
					.with_detail(DETAIL_MISSING)
					.with_result_status_detail(&id, METHOD_UPDATE, STATUS_FAILED, DETAIL_MISSING)
					.build());
			},
		};

		self.backend.update(self.catalogue_index(), &doc_id, &Value::Object(doc)).await?;

		tracing::info!(id = %id, "Catalogue item updated.");

		Ok(Envelope::builder(Urn::Success)
			.with_detail("Success: Item updated successfully")
			.with_result_status(&id, METHOD_UPDATE, STATUS_SUCCESS)
			.build())
	}
}
