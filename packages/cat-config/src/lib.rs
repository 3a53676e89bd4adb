mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, Indices, Search, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.backend.url.is_empty() {
		return Err(Error::Validation { message: "backend.url must be non-empty.".to_string() });
	}
	if !cfg.backend.url.starts_with("http://") && !cfg.backend.url.starts_with("https://") {
		return Err(Error::Validation {
			message: "backend.url must start with http:// or https://.".to_string(),
		});
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backend.username.is_empty() != cfg.backend.password.is_empty() {
		return Err(Error::Validation {
			message: "backend.username and backend.password must be set together.".to_string(),
		});
	}
	if cfg.indices.catalogue.is_empty() {
		return Err(Error::Validation {
			message: "indices.catalogue must be non-empty.".to_string(),
		});
	}
	if cfg.indices.rating.is_empty() {
		return Err(Error::Validation { message: "indices.rating must be non-empty.".to_string() });
	}
	if cfg.search.page_size == 0 {
		return Err(Error::Validation {
			message: "search.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_location_fanout == 0 {
		return Err(Error::Validation {
			message: "search.max_location_fanout must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.backend.url = cfg.backend.url.trim().trim_end_matches('/').to_string();
	cfg.backend.username = cfg.backend.username.trim().to_string();
	cfg.indices.catalogue = cfg.indices.catalogue.trim().to_string();
	cfg.indices.rating = cfg.indices.rating.trim().to_string();
}
