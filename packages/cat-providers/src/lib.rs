pub mod elastic;

mod error;

pub use elastic::{Hit, SearchHits};
pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};

pub fn client(cfg: &cat_config::Backend) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

/// Starts a request against `{backend.url}/{path}` with basic auth applied when configured.
pub fn request(
	client: &Client,
	cfg: &cat_config::Backend,
	method: Method,
	path: &str,
) -> RequestBuilder {
	let url = format!("{}/{}", cfg.url, path.trim_start_matches('/'));
	let builder = client.request(method, url);

	if cfg.username.is_empty() {
		return builder;
	}

	builder.basic_auth(&cfg.username, Some(&cfg.password))
}
