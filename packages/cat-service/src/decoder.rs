//! Turns a declarative search intent into a [`SearchRequest`].
//!
//! Every validation runs before a request is returned, so a malformed intent never reaches the
//! backend.

mod attribute;
mod geo;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cat_domain::{BoolQuery, Query, SearchRequest, SourceFilter};

use crate::{Error, Result};

pub const SEARCH_TYPE_GEO: &str = "geoSearch";
pub const SEARCH_TYPE_TEXT: &str = "textSearch";
pub const SEARCH_TYPE_ATTRIBUTE: &str = "attributeSearch";
pub const SEARCH_TYPE_RESPONSE_FILTER: &str = "responseFilter";
pub const SEARCH_TYPE_PARENT_INFO: &str = "getParentObjectInfo";

const PARENT_INFO_FIELDS: [&str; 8] = [
	"type",
	"provider",
	"ownerUserId",
	"resourceGroup",
	"resourceServer",
	"resourceServerRegURL",
	"cos",
	"cos_admin",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryIntent {
	pub search_type: Option<String>,
	pub geometry: Option<String>,
	#[serde(alias = "georel")]
	pub georelation: Option<String>,
	pub coordinates: Option<Value>,
	pub max_distance: Option<u64>,
	pub geoproperty: Option<String>,
	pub q: Option<String>,
	pub property: Option<Vec<String>>,
	pub value: Option<Vec<Vec<String>>>,
	pub instance: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
	pub filter: Option<Vec<String>>,
	pub attrs: Option<Vec<String>>,
	pub id: Option<String>,
}

/// Listing returns hits and accepts projections. Counting returns only a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
	Listing,
	Counting,
}

pub fn decode(intent: &QueryIntent, mode: DecodeMode, page_size: u32) -> Result<SearchRequest> {
	let Some(search_type) = intent.search_type.as_deref().map(str::trim).filter(|s| !s.is_empty())
	else {
		return Err(Error::NoSearchType { detail: "No searchType found".to_string() });
	};

	if search_type.eq_ignore_ascii_case(SEARCH_TYPE_PARENT_INFO) {
		return parent_info(intent, page_size);
	}

	let mut bool_query = BoolQuery::default();
	let mut matched = false;

	if search_type.contains(SEARCH_TYPE_GEO) {
		tracing::debug!(search_type = %search_type, "Decoding geo clause.");

		bool_query = bool_query.filter(geo::build(intent)?);
		matched = true;
	}
	if search_type.contains(SEARCH_TYPE_TEXT) {
		tracing::debug!(search_type = %search_type, "Decoding text clause.");

		bool_query = bool_query.filter(text_clause(intent)?);
		matched = true;
	}
	if search_type.contains(SEARCH_TYPE_ATTRIBUTE) {
		tracing::debug!(search_type = %search_type, "Decoding attribute clause.");

		bool_query = bool_query.filter(attribute::build(intent)?);
		matched = true;
	}
	if let Some(instance) = intent.instance.as_deref() {
		bool_query = bool_query.must(Query::term("instance", instance));
	}

	let mut source = SourceFilter::default();

	if search_type.contains(SEARCH_TYPE_RESPONSE_FILTER) {
		matched = true;

		if mode == DecodeMode::Counting {
			return Err(Error::OperationNotAllowed { detail: "operation not allowed".to_string() });
		}

		let Some(fields) = [intent.attrs.as_ref(), intent.filter.as_ref()]
			.into_iter()
			.flatten()
			.find(|fields| !fields.is_empty())
		else {
			return Err(Error::BadFilter { detail: "bad filters applied".to_string() });
		};

		source = SourceFilter::includes(fields.clone());
	}
	if !matched {
		return Err(Error::InvalidSyntax { detail: "Invalid Syntax".to_string() });
	}

	let request = SearchRequest::new(Query::Bool(bool_query)).source(source);

	match mode {
		DecodeMode::Listing => Ok(apply_window(request, intent.limit, intent.offset, page_size)),
		DecodeMode::Counting => Ok(request),
	}
}

/// `(size, from)` for a pagination window.
///
/// Without an explicit limit the window runs to the end of the page: `page_size - offset`.
pub fn window(limit: Option<u32>, offset: Option<u32>, page_size: u32) -> (u32, u32) {
	let from = offset.unwrap_or(0);
	let size = limit.unwrap_or_else(|| page_size.saturating_sub(from));

	(size, from)
}

pub fn apply_window(
	request: SearchRequest,
	limit: Option<u32>,
	offset: Option<u32>,
	page_size: u32,
) -> SearchRequest {
	let (size, from) = window(limit, offset, page_size);

	request.window(size, from)
}

/// Applies pagination and projection uniformly to a finished query.
///
/// An explicit `filter` list always replaces the default includes.
pub fn finish(
	query: Query,
	limit: Option<u32>,
	offset: Option<u32>,
	filter: Option<&[String]>,
	default_includes: &[&str],
	page_size: u32,
) -> SearchRequest {
	let includes = match filter {
		Some(fields) if !fields.is_empty() => fields.to_vec(),
		_ => default_includes.iter().map(|field| field.to_string()).collect(),
	};
	let request = SearchRequest::new(query).source(SourceFilter::includes(includes));

	apply_window(request, limit, offset, page_size)
}

fn text_clause(intent: &QueryIntent) -> Result<Query> {
	match intent.q.as_deref().map(str::trim) {
		Some(q) if !q.is_empty() => Ok(Query::QueryString { query: q.to_string() }),
		_ => Err(Error::BadTextQuery { detail: "bad text query values".to_string() }),
	}
}

fn parent_info(intent: &QueryIntent, page_size: u32) -> Result<SearchRequest> {
	let Some(id) = intent.id.as_deref().filter(|id| !id.trim().is_empty()) else {
		return Err(Error::InvalidSyntax { detail: "id not found".to_string() });
	};

	Ok(finish(
		Query::term("id.keyword", id),
		intent.limit,
		intent.offset,
		None,
		&PARENT_INFO_FIELDS,
		page_size,
	))
}
