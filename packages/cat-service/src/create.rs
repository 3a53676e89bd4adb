use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use cat_domain::{Query, SearchRequest, summarizer};

use crate::{CatalogService, Envelope, Error, Result, Urn, normalizer::SUMMARY_FIELD};

pub(crate) const METHOD_INSERT: &str = "insert";
pub(crate) const STATUS_SUCCESS: &str = "success";
pub(crate) const STATUS_FAILED: &str = "failed";

/// A catalogue document as submitted for indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreateItemRequest {
	pub doc: Map<String, Value>,
}

impl CatalogService {
	pub async fn create_item(&self, req: CreateItemRequest) -> Envelope {
		crate::respond("create_item", self.create_item_inner(req).await)
	}

	async fn create_item_inner(&self, req: CreateItemRequest) -> Result<Envelope> {
		let mut doc = req.doc;
		let id = document_id(&doc)?;
		let existing = SearchRequest::new(Query::term("id.keyword", id.as_str()))
			.window(self.page_size(), 0);
		let hits = self.backend.search(self.catalogue_index(), &existing).await?;

		if hits.total_hits != 0 {
			return Err(Error::AlreadyExists { id, detail: "Fail: Doc Exists".to_string() });
		}

		let summary = summarizer::summarize(&Value::Object(doc.clone()));

		doc.insert(SUMMARY_FIELD.to_string(), Value::String(summary));

		self.await_visibility().await;
		self.backend.create(self.catalogue_index(), &Value::Object(doc)).await?;

		tracing::info!(id = %id, "Catalogue item created.");

		Ok(Envelope::builder(Urn::Success)
			.with_detail("Success: Item created")
			.with_result_status(&id, METHOD_INSERT, STATUS_SUCCESS)
			.build())
	}
}

/// The document's `id`, which must be present and a UUID.
pub(crate) fn document_id(doc: &Map<String, Value>) -> Result<String> {
	let Some(id) = doc.get("id").and_then(Value::as_str).map(str::trim).filter(|id| !id.is_empty())
	else {
		return Err(Error::InvalidSyntax { detail: "id not found".to_string() });
	};

	if Uuid::parse_str(id).is_err() {
		return Err(Error::InvalidUuid { detail: "Invalid id".to_string() });
	}

	Ok(id.to_string())
}
