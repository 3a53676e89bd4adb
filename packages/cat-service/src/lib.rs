pub mod create;
pub mod dataset;
pub mod decoder;
pub mod delete;
pub mod envelope;
pub mod list;
pub mod nlp;
pub mod normalizer;
pub mod rating;
pub mod relationship;
pub mod search;
pub mod update;

mod error;
mod executor;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use serde_json::Value;

pub use cat_domain::{Query, SearchRequest};
pub use cat_providers::{Hit, SearchHits};
pub use create::CreateItemRequest;
pub use dataset::DatasetRequest;
pub use decoder::{DecodeMode, QueryIntent};
pub use delete::DeleteItemRequest;
pub use envelope::{Envelope, EnvelopeBuilder, Urn};
pub use error::{DETAIL_INTERNAL_SERVER_ERROR, Error, Result};
pub use list::{ListItemsRequest, ProviderSummaryRequest};
pub use nlp::{LocationCandidate, NlpLocationRequest, NlpSearchRequest};
pub use normalizer::{Normalized, ResponseShape};
pub use rating::AverageRatingRequest;
pub use relationship::RelationshipRequest;
pub use search::GetItemRequest;
pub use update::UpdateItemRequest;

use cat_config::Config;
use cat_providers::elastic;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The single document-store capability the catalogue core depends on.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		index: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchHits>>;

	fn count<'a>(&'a self, index: &'a str, query: &'a Query) -> BoxFuture<'a, Result<u64>>;

	fn create<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<()>>;

	fn update<'a>(
		&'a self,
		index: &'a str,
		doc_id: &'a str,
		body: &'a Value,
	) -> BoxFuture<'a, Result<()>>;

	fn delete<'a>(&'a self, index: &'a str, doc_id: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Elasticsearch over its REST API.
pub struct ElasticBackend {
	cfg: cat_config::Backend,
}
impl ElasticBackend {
	pub fn new(cfg: cat_config::Backend) -> Self {
		Self { cfg }
	}
}
impl SearchBackend for ElasticBackend {
	fn search<'a>(
		&'a self,
		index: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchHits>> {
		Box::pin(async move { Ok(elastic::search(&self.cfg, index, &request.to_value()).await?) })
	}

	fn count<'a>(&'a self, index: &'a str, query: &'a Query) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move { Ok(elastic::count(&self.cfg, index, &query.to_value()).await?) })
	}

	fn create<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(elastic::create_doc(&self.cfg, index, body).await?) })
	}

	fn update<'a>(
		&'a self,
		index: &'a str,
		doc_id: &'a str,
		body: &'a Value,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(elastic::update_doc(&self.cfg, index, doc_id, body).await?) })
	}

	fn delete<'a>(&'a self, index: &'a str, doc_id: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(elastic::delete_doc(&self.cfg, index, doc_id).await?) })
	}
}

pub struct CatalogService {
	pub cfg: Config,
	pub backend: Arc<dyn SearchBackend>,
}
impl CatalogService {
	pub fn new(cfg: Config) -> Self {
		let backend = Arc::new(ElasticBackend::new(cfg.backend.clone()));

		Self { cfg, backend }
	}

	pub fn with_backend(cfg: Config, backend: Arc<dyn SearchBackend>) -> Self {
		Self { cfg, backend }
	}

	pub(crate) fn page_size(&self) -> u32 {
		self.cfg.search.page_size
	}

	pub(crate) fn catalogue_index(&self) -> &str {
		&self.cfg.indices.catalogue
	}

	/// Fixed wait letting earlier writes become searchable before a write-path check.
	pub(crate) async fn await_visibility(&self) {
		let delay_ms = self.cfg.search.visibility_delay_ms;

		if delay_ms == 0 {
			return;
		}

		tracing::debug!(delay_ms, "Waiting for index visibility.");

		tokio::time::sleep(Duration::from_millis(delay_ms)).await;
	}
}

/// Folds an operation outcome into its envelope.
///
/// Backend failures are logged here and leave as a generic internal error.
pub(crate) fn respond(operation: &'static str, result: Result<Envelope>) -> Envelope {
	match result {
		Ok(envelope) => envelope,
		Err(err) => {
			if let Error::Backend { message } = &err {
				tracing::error!(error = %message, operation, "Search backend request failed.");
			} else {
				tracing::debug!(error = %err, operation, "Request rejected.");
			}

			err.to_envelope()
		},
	}
}
