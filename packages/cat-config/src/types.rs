use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	pub indices: Indices,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	pub url: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Optional. Basic auth is sent only when both fields are non-empty.
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indices {
	pub catalogue: String,
	pub rating: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Upper bound of the pagination window. Size defaults to `page_size - offset`.
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	/// Fixed wait before write-path existence checks, covering the backend refresh interval.
	/// This is a timer, not a visibility poll, so it can race under heavy indexing load.
	#[serde(default = "default_visibility_delay_ms")]
	pub visibility_delay_ms: u64,
	#[serde(default = "default_max_location_fanout")]
	pub max_location_fanout: usize,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			page_size: default_page_size(),
			visibility_delay_ms: default_visibility_delay_ms(),
			max_location_fanout: default_max_location_fanout(),
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_timeout_ms() -> u64 {
	10_000
}

fn default_page_size() -> u32 {
	10_000
}

fn default_visibility_delay_ms() -> u64 {
	1_000
}

fn default_max_location_fanout() -> usize {
	16
}
