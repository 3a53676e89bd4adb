use serde::{Deserialize, Serialize};

use cat_domain::{Query, SearchRequest};

use crate::{
	CatalogService, Envelope, Error, Result, Urn,
	decoder::{self, DecodeMode, QueryIntent},
	executor,
	normalizer::ResponseShape,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetItemRequest {
	pub id: String,
}

impl CatalogService {
	pub async fn search(&self, intent: QueryIntent) -> Envelope {
		crate::respond("search", self.search_inner(&intent).await)
	}

	pub async fn count(&self, intent: QueryIntent) -> Envelope {
		crate::respond("count", self.count_inner(&intent).await)
	}

	pub async fn get_item(&self, req: GetItemRequest) -> Envelope {
		crate::respond("get_item", self.get_item_inner(&req).await)
	}

	async fn search_inner(&self, intent: &QueryIntent) -> Result<Envelope> {
		let request = decoder::decode(intent, DecodeMode::Listing, self.page_size())?;
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::SourceOnly,
		)
		.await?;

		Ok(Envelope::success(normalized.total_hits, normalized.results))
	}

	async fn count_inner(&self, intent: &QueryIntent) -> Result<Envelope> {
		let request = decoder::decode(intent, DecodeMode::Counting, self.page_size())?;
		let total_hits = self.backend.count(self.catalogue_index(), &request.query).await?;

		tracing::debug!(total_hits, "Count executed.");

		Ok(Envelope::success(total_hits, Vec::new()))
	}

	async fn get_item_inner(&self, req: &GetItemRequest) -> Result<Envelope> {
		let id = req.id.trim();

		if id.is_empty() {
			return Err(Error::InvalidSyntax { detail: "id not found".to_string() });
		}

		let request =
			SearchRequest::new(Query::term("id.keyword", id)).window(self.page_size(), 0);
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::SourceOnly,
		)
		.await?;

		Ok(Envelope::builder(Urn::Success)
			.with_detail("Success: Item fetched Successfully")
			.with_total_hits(normalized.total_hits)
			.with_results(normalized.results)
			.build())
	}
}
