use cat_domain::SearchRequest;

use crate::{
	Result, SearchBackend,
	normalizer::{self, Normalized, ResponseShape},
};

/// Runs one search against `index` and reshapes the hits.
pub(crate) async fn execute(
	backend: &dyn SearchBackend,
	index: &str,
	request: &SearchRequest,
	shape: ResponseShape,
) -> Result<Normalized> {
	let hits = backend.search(index, request).await?;

	tracing::debug!(index = %index, total_hits = hits.total_hits, ?shape, "Search executed.");

	normalizer::normalize(hits, shape)
}
