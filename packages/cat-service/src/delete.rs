use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use cat_domain::{BoolQuery, ParentLink, Query, SearchRequest};

use crate::{
	CatalogService, Envelope, Error, Result, Urn, create::STATUS_SUCCESS, executor,
	normalizer::ResponseShape,
};

const METHOD_DELETE: &str = "delete";
const DETAIL_HAS_CHILDREN: &str = "Fail: Can't delete, doc has associated item";
const DETAIL_MISSING: &str = "Fail: Doc doesn't exist, can't delete";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteItemRequest {
	pub id: String,
}

impl CatalogService {
	/// Deletes a leaf item. Items that anything else still references are kept.
	pub async fn delete_item(&self, req: DeleteItemRequest) -> Envelope {
		crate::respond("delete_item", self.delete_item_inner(&req).await)
	}

	async fn delete_item_inner(&self, req: &DeleteItemRequest) -> Result<Envelope> {
		let id = req.id.trim();

		if id.is_empty() {
			return Err(Error::InvalidSyntax { detail: "id not found".to_string() });
		}
		if Uuid::parse_str(id).is_err() {
			return Err(Error::InvalidUuid { detail: "Invalid id".to_string() });
		}

		self.await_visibility().await;

		let request = associated_items_request(id, self.page_size());
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::DocIdsOnly,
		)
		.await?;

		if normalized.total_hits > 1 {
			tracing::debug!(
				id = %id,
				total_hits = normalized.total_hits,
				"Item still has associated items."
			);

			return Ok(Envelope::builder(Urn::OperationNotAllowed)
				.with_detail(DETAIL_HAS_CHILDREN)
				.with_result_detail(id, DETAIL_HAS_CHILDREN)
				.build());
		}

		let Some(Value::String(doc_id)) = normalized.results.first() else {
			return Ok(Envelope::builder(Urn::ItemNotFound)
				.with_detail(DETAIL_MISSING)
				.with_result_detail(id, DETAIL_MISSING)
				.build());
		};

		self.backend.delete(self.catalogue_index(), doc_id).await?;

		tracing::info!(id = %id, "Catalogue item deleted.");

		Ok(Envelope::builder(Urn::Success)
			.with_detail("Success: Item deleted successfully")
			.with_result_status(id, METHOD_DELETE, STATUS_SUCCESS)
			.build())
	}
}

/// Matches the item itself and every item pointing at it through a parent link.
fn associated_items_request(id: &str, page_size: u32) -> SearchRequest {
	let query = [
		ParentLink::ResourceGroup,
		ParentLink::Provider,
		ParentLink::ResourceServer,
		ParentLink::Cos,
	]
	.into_iter()
	.fold(BoolQuery::default().should(Query::term("id.keyword", id)), |query, link| {
		query.should(Query::term(link.keyword_field(), id))
	});

	SearchRequest::new(query.into()).window(page_size, 0)
}
