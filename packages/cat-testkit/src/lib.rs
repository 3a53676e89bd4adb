//! Scripted in-memory search backend for service tests.

use std::{
	collections::VecDeque,
	env,
	sync::{Arc, Mutex},
};

use serde_json::{Map, Value};
use uuid::Uuid;

use cat_config::{Backend, Config, Indices, Search, Service};
use cat_domain::{Query, SearchRequest};
use cat_providers::{Hit, SearchHits};
use cat_service::{BoxFuture, CatalogService, Error, Result, SearchBackend};

/// One backend interaction, in the order the service issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	Search { index: String, request: SearchRequest },
	Count { index: String, query: Query },
	Create { index: String, body: Value },
	Update { index: String, doc_id: String, body: Value },
	Delete { index: String, doc_id: String },
}

#[derive(Debug, Clone)]
enum Reply<T> {
	Ok(T),
	Fail(String),
}

#[derive(Default)]
struct State {
	searches: VecDeque<Reply<SearchHits>>,
	counts: VecDeque<Reply<u64>>,
	calls: Vec<Call>,
}

/// Answers searches and counts from FIFO scripts and records every call.
///
/// An exhausted search script answers with zero hits. Writes always succeed.
#[derive(Clone, Default)]
pub struct RecordingBackend {
	state: Arc<Mutex<State>>,
}
impl RecordingBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_hits(&self, hits: SearchHits) -> &Self {
		self.with_state(|state| state.searches.push_back(Reply::Ok(hits)));

		self
	}

	pub fn push_search_failure(&self, message: &str) -> &Self {
		self.with_state(|state| state.searches.push_back(Reply::Fail(message.to_string())));

		self
	}

	pub fn push_count(&self, count: u64) -> &Self {
		self.with_state(|state| state.counts.push_back(Reply::Ok(count)));

		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.with_state(|state| state.calls.clone())
	}

	/// Requests of every search call, in issue order.
	pub fn searches(&self) -> Vec<SearchRequest> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				Call::Search { request, .. } => Some(request),
				_ => None,
			})
			.collect()
	}

	fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
		let mut state = self.state.lock().unwrap_or_else(|err| err.into_inner());

		f(&mut state)
	}

	fn record(&self, call: Call) {
		self.with_state(|state| state.calls.push(call));
	}
}
impl SearchBackend for RecordingBackend {
	fn search<'a>(
		&'a self,
		index: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchHits>> {
		self.record(Call::Search { index: index.to_string(), request: request.clone() });

		let reply = self.with_state(|state| state.searches.pop_front());

		Box::pin(async move {
			match reply {
				Some(Reply::Ok(hits)) => Ok(hits),
				Some(Reply::Fail(message)) => Err(Error::Backend { message }),
				None => Ok(SearchHits::default()),
			}
		})
	}

	fn count<'a>(&'a self, index: &'a str, query: &'a Query) -> BoxFuture<'a, Result<u64>> {
		self.record(Call::Count { index: index.to_string(), query: query.clone() });

		let reply = self.with_state(|state| state.counts.pop_front());

		Box::pin(async move {
			match reply {
				Some(Reply::Ok(count)) => Ok(count),
				Some(Reply::Fail(message)) => Err(Error::Backend { message }),
				None => Ok(0),
			}
		})
	}

	fn create<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<()>> {
		self.record(Call::Create { index: index.to_string(), body: body.clone() });

		Box::pin(async move { Ok(()) })
	}

	fn update<'a>(
		&'a self,
		index: &'a str,
		doc_id: &'a str,
		body: &'a Value,
	) -> BoxFuture<'a, Result<()>> {
		self.record(Call::Update {
			index: index.to_string(),
			doc_id: doc_id.to_string(),
			body: body.clone(),
		});

		Box::pin(async move { Ok(()) })
	}

	fn delete<'a>(&'a self, index: &'a str, doc_id: &'a str) -> BoxFuture<'a, Result<()>> {
		self.record(Call::Delete { index: index.to_string(), doc_id: doc_id.to_string() });

		Box::pin(async move { Ok(()) })
	}
}

/// A valid configuration with no write-path delay.
pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "debug".to_string() },
		backend: Backend {
			url: env_es_url().unwrap_or_else(|| "http://127.0.0.1:9200".to_string()),
			timeout_ms: 5_000,
			username: String::new(),
			password: String::new(),
		},
		indices: Indices { catalogue: "cat".to_string(), rating: "rating".to_string() },
		search: Search { page_size: 10_000, visibility_delay_ms: 0, max_location_fanout: 4 },
	}
}

/// A service wired to `backend` through [`test_config`].
pub fn service_with(backend: &RecordingBackend) -> CatalogService {
	CatalogService::with_backend(test_config(), Arc::new(backend.clone()))
}

pub fn env_es_url() -> Option<String> {
	env::var("CAT_ES_URL").ok()
}

pub fn new_item_id() -> String {
	Uuid::new_v4().to_string()
}

/// A hit whose backend document id is `doc_id`.
pub fn hit(doc_id: &str, source: Value) -> Hit {
	let source = match source {
		Value::Object(source) => source,
		_ => Map::new(),
	};

	Hit { id: doc_id.to_string(), source }
}

/// Hits with `total_hits` equal to their count.
pub fn hits(hits: Vec<Hit>) -> SearchHits {
	SearchHits { total_hits: hits.len() as u64, hits, aggregations: None }
}
