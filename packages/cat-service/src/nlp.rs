//! Embedding-ranked search, optionally narrowed to geocoded place candidates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use cat_domain::{BoolQuery, GeoRelation, GeoShape, Query, SearchRequest, SourceFilter};

use crate::{
	CatalogService, Envelope, Error, Result, executor,
	normalizer::{ResponseShape, WORD_VECTOR_FIELD},
};

const GEOCODED_PREFIX: &str = "_geosummary._geocoded.results";
const LOCATION_GEOMETRY: &str = "location.geometry";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NlpSearchRequest {
	pub embedding: Vec<f32>,
}

/// One geocoder answer for the place named in a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
	pub borough: Option<String>,
	pub locality: Option<String>,
	pub county: Option<String>,
	pub region: Option<String>,
	pub country: Option<String>,
	/// `[min_lon, min_lat, max_lon, max_lat]`.
	pub bbox: Vec<f64>,
}
impl LocationCandidate {
	fn place_names(&self) -> [(&'static str, Option<&str>); 5] {
		[
			("borough", self.borough.as_deref()),
			("locality", self.locality.as_deref()),
			("county", self.county.as_deref()),
			("region", self.region.as_deref()),
			("country", self.country.as_deref()),
		]
	}

	/// Upper-left then lower-right corner of the bounding box.
	fn envelope(&self) -> Result<GeoShape> {
		let [min_lon, min_lat, max_lon, max_lat] = self.bbox.as_slice() else {
			return Err(Error::InvalidGeoParameter {
				detail: "Missing/Invalid geo parameters".to_string(),
			});
		};

		Ok(GeoShape::Envelope([[*min_lon, *max_lat], [*max_lon, *min_lat]]))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NlpLocationRequest {
	pub embedding: Vec<f32>,
	pub candidates: Vec<LocationCandidate>,
}

impl CatalogService {
	pub async fn nlp_search(&self, req: NlpSearchRequest) -> Envelope {
		crate::respond("nlp_search", self.nlp_search_inner(req).await)
	}

	/// Runs one ranked search per candidate concurrently and unions the hits.
	///
	/// Any failed candidate search fails the whole call.
	pub async fn nlp_location_search(&self, req: NlpLocationRequest) -> Envelope {
		crate::respond("nlp_location_search", self.nlp_location_search_inner(req).await)
	}

	async fn nlp_search_inner(&self, req: NlpSearchRequest) -> Result<Envelope> {
		let request = ranked(Query::MatchAll, req.embedding);
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::SourceOnly,
		)
		.await?;

		Ok(Envelope::success(normalized.total_hits, normalized.results))
	}

	async fn nlp_location_search_inner(&self, req: NlpLocationRequest) -> Result<Envelope> {
		let max_fanout = self.cfg.search.max_location_fanout;

		if req.candidates.len() > max_fanout {
			return Err(Error::InvalidSyntax {
				detail: format!("At most {max_fanout} location candidates are accepted"),
			});
		}

		let requests = req
			.candidates
			.iter()
			.map(|candidate| location_request(candidate, &req.embedding))
			.collect::<Result<Vec<_>>>()?;
		let mut batches = vec![Vec::new(); requests.len()];
		let mut tasks = JoinSet::new();

		for (slot, request) in requests.into_iter().enumerate() {
			let backend = Arc::clone(&self.backend);
			let index = self.catalogue_index().to_string();

			tasks.spawn(async move {
				let normalized =
					executor::execute(backend.as_ref(), &index, &request, ResponseShape::SourceOnly)
						.await;

				(slot, normalized)
			});
		}

		while let Some(joined) = tasks.join_next().await {
			let (slot, normalized) =
				joined.map_err(|err| Error::Backend { message: err.to_string() })?;

			if let Some(batch) = batches.get_mut(slot) {
				*batch = normalized?.results;
			}
		}

		let results: Vec<_> = batches.into_iter().flatten().collect();

		tracing::debug!(results = results.len(), "Location candidates searched.");

		if results.is_empty() {
			return Err(Error::ItemNotFound { detail: "NLP Search Failed".to_string() });
		}

		Ok(Envelope::success(results.len() as u64, results))
	}
}

fn ranked(query: Query, embedding: Vec<f32>) -> SearchRequest {
	SearchRequest::new(Query::ScriptScore { query: Box::new(query), vector: embedding })
		.source(SourceFilter::excludes(vec![WORD_VECTOR_FIELD.to_string()]))
}

fn location_request(candidate: &LocationCandidate, embedding: &[f32]) -> Result<SearchRequest> {
	let query = candidate
		.place_names()
		.into_iter()
		.filter_map(|(field, name)| name.map(|name| (field, name)))
		.fold(BoolQuery::default(), |query, (field, name)| {
			query.should(Query::matches(format!("{GEOCODED_PREFIX}.{field}"), name))
		})
		.minimum_should_match(1)
		.filter(Query::GeoShape {
			field: LOCATION_GEOMETRY.to_string(),
			shape: candidate.envelope()?,
			relation: GeoRelation::Intersects,
		});

	Ok(ranked(query.into(), embedding.to_vec()))
}
