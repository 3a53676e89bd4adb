//! Backend-agnostic query tree.
//!
//! The tree is built per request and serialized to Elasticsearch JSON exactly once, at the
//! adapter boundary, through [`SearchRequest::to_value`].

use serde_json::{Map, Value};

/// Cosine similarity over the stored word vector, shifted so scores stay non-negative.
pub const WORD_VECTOR_SCRIPT: &str =
	"doc['_word_vector'].size() == 0 ? 0 : cosineSimilarity(params.query_vector, '_word_vector') + 1.0";

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
	Bool(BoolQuery),
	Term { field: String, value: String },
	Terms { field: String, values: Vec<String> },
	Match { field: String, query: String },
	QueryString { query: String },
	GeoShape { field: String, shape: GeoShape, relation: GeoRelation },
	MatchAll,
	ScriptScore { query: Box<Query>, vector: Vec<f32> },
}
impl Query {
	pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Term { field: field.into(), value: value.into() }
	}

	pub fn terms(field: impl Into<String>, values: Vec<String>) -> Self {
		Self::Terms { field: field.into(), values }
	}

	pub fn matches(field: impl Into<String>, query: impl Into<String>) -> Self {
		Self::Match { field: field.into(), query: query.into() }
	}

	/// `field.keyword == value` scoped to one catalog type.
	pub fn typed_term(field: &str, value: impl Into<String>, item_type: &str) -> Self {
		Self::Bool(
			BoolQuery::default()
				.must(Self::term(format!("{field}.keyword"), value))
				.must(Self::term("type.keyword", item_type)),
		)
	}

	pub fn as_bool(&self) -> Option<&BoolQuery> {
		match self {
			Self::Bool(inner) => Some(inner),
			_ => None,
		}
	}

	pub fn to_value(&self) -> Value {
		match self {
			Self::Bool(inner) => serde_json::json!({ "bool": inner.to_value() }),
			Self::Term { field, value } => serde_json::json!({ "term": { field: { "value": value } } }),
			Self::Terms { field, values } => serde_json::json!({ "terms": { field: values } }),
			Self::Match { field, query } => serde_json::json!({ "match": { field: { "query": query } } }),
			Self::QueryString { query } => serde_json::json!({ "query_string": { "query": query } }),
			Self::GeoShape { field, shape, relation } => serde_json::json!({
				"geo_shape": {
					field: { "shape": shape.to_value(), "relation": relation.as_str() }
				}
			}),
			Self::MatchAll => serde_json::json!({ "match_all": {} }),
			Self::ScriptScore { query, vector } => serde_json::json!({
				"script_score": {
					"query": query.to_value(),
					"script": {
						"source": WORD_VECTOR_SCRIPT,
						"lang": "painless",
						"params": { "query_vector": vector }
					}
				}
			}),
		}
	}
}

impl From<BoolQuery> for Query {
	fn from(query: BoolQuery) -> Self {
		Self::Bool(query)
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
	pub must: Vec<Query>,
	pub should: Vec<Query>,
	pub filter: Vec<Query>,
	pub minimum_should_match: Option<u32>,
}
impl BoolQuery {
	pub fn must(mut self, query: Query) -> Self {
		self.must.push(query);

		self
	}

	pub fn should(mut self, query: Query) -> Self {
		self.should.push(query);

		self
	}

	pub fn filter(mut self, query: Query) -> Self {
		self.filter.push(query);

		self
	}

	pub fn minimum_should_match(mut self, count: u32) -> Self {
		self.minimum_should_match = Some(count);

		self
	}

	fn to_value(&self) -> Value {
		let mut out = Map::new();

		for (key, clauses) in [
			("filter", &self.filter),
			("must", &self.must),
			("should", &self.should),
		] {
			if !clauses.is_empty() {
				out.insert(
					key.to_string(),
					Value::Array(clauses.iter().map(Query::to_value).collect()),
				);
			}
		}

		if let Some(count) = self.minimum_should_match {
			out.insert("minimum_should_match".to_string(), Value::from(count.to_string()));
		}

		Value::Object(out)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeoShape {
	Circle { center: [f64; 2], radius_m: u64 },
	Polygon(Vec<Vec<[f64; 2]>>),
	LineString(Vec<[f64; 2]>),
	/// Upper-left then lower-right corner.
	Envelope([[f64; 2]; 2]),
}
impl GeoShape {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Circle { .. } => "circle",
			Self::Polygon(_) => "polygon",
			Self::LineString(_) => "linestring",
			Self::Envelope(_) => "envelope",
		}
	}

	fn to_value(&self) -> Value {
		match self {
			Self::Circle { center, radius_m } => serde_json::json!({
				"type": self.kind(),
				"coordinates": center,
				"radius": format!("{radius_m}m"),
			}),
			Self::Polygon(rings) => serde_json::json!({ "type": self.kind(), "coordinates": rings }),
			Self::LineString(points) =>
				serde_json::json!({ "type": self.kind(), "coordinates": points }),
			Self::Envelope(corners) =>
				serde_json::json!({ "type": self.kind(), "coordinates": corners }),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoRelation {
	Within,
	Intersects,
	Disjoint,
	Contains,
}
impl GeoRelation {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.to_ascii_lowercase().as_str() {
			"within" => Some(Self::Within),
			"intersects" => Some(Self::Intersects),
			"disjoint" => Some(Self::Disjoint),
			"contains" => Some(Self::Contains),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Within => "within",
			Self::Intersects => "intersects",
			Self::Disjoint => "disjoint",
			Self::Contains => "contains",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
	Terms { field: String, size: Option<u32>, nested: Vec<(String, Aggregation)> },
	Avg { field: String },
	Cardinality { field: String },
}
impl Aggregation {
	pub fn terms(field: impl Into<String>, size: Option<u32>) -> Self {
		Self::Terms { field: field.into(), size, nested: Vec::new() }
	}

	fn to_value(&self) -> Value {
		match self {
			Self::Terms { field, size, nested } => {
				let mut terms = Map::new();

				terms.insert("field".to_string(), Value::from(field.as_str()));

				if let Some(size) = size {
					terms.insert("size".to_string(), Value::from(*size));
				}

				let mut out = Map::new();

				out.insert("terms".to_string(), Value::Object(terms));

				if !nested.is_empty() {
					out.insert("aggs".to_string(), aggregations_value(nested));
				}

				Value::Object(out)
			},
			Self::Avg { field } => serde_json::json!({ "avg": { "field": field } }),
			Self::Cardinality { field } => serde_json::json!({ "cardinality": { "field": field } }),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFilter {
	pub includes: Vec<String>,
	pub excludes: Vec<String>,
}
impl SourceFilter {
	pub fn includes(fields: Vec<String>) -> Self {
		Self { includes: fields, excludes: Vec::new() }
	}

	pub fn excludes(fields: Vec<String>) -> Self {
		Self { includes: Vec::new(), excludes: fields }
	}

	pub fn is_empty(&self) -> bool {
		self.includes.is_empty() && self.excludes.is_empty()
	}
}

/// One backend round trip: the query plus its window, projection and aggregations.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
	pub query: Query,
	pub size: Option<u32>,
	pub from: Option<u32>,
	pub source: SourceFilter,
	pub aggregations: Vec<(String, Aggregation)>,
}
impl SearchRequest {
	pub fn new(query: Query) -> Self {
		Self { query, size: None, from: None, source: SourceFilter::default(), aggregations: Vec::new() }
	}

	pub fn window(mut self, size: u32, from: u32) -> Self {
		self.size = Some(size);
		self.from = Some(from);

		self
	}

	pub fn source(mut self, source: SourceFilter) -> Self {
		self.source = source;

		self
	}

	pub fn aggregation(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
		self.aggregations.push((name.into(), aggregation));

		self
	}

	pub fn to_value(&self) -> Value {
		let mut body = Map::new();

		body.insert("query".to_string(), self.query.to_value());

		if let Some(size) = self.size {
			body.insert("size".to_string(), Value::from(size));
		}
		if let Some(from) = self.from {
			body.insert("from".to_string(), Value::from(from));
		}
		if !self.source.is_empty() {
			let mut source = Map::new();

			if !self.source.includes.is_empty() {
				source.insert("includes".to_string(), Value::from(self.source.includes.clone()));
			}
			if !self.source.excludes.is_empty() {
				source.insert("excludes".to_string(), Value::from(self.source.excludes.clone()));
			}

			body.insert("_source".to_string(), Value::Object(source));
		}
		if !self.aggregations.is_empty() {
			body.insert("aggs".to_string(), aggregations_value(&self.aggregations));
		}

		Value::Object(body)
	}
}

fn aggregations_value(aggregations: &[(String, Aggregation)]) -> Value {
	Value::Object(
		aggregations.iter().map(|(name, aggregation)| (name.clone(), aggregation.to_value())).collect(),
	)
}
