use crate::envelope::{Envelope, Urn};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub const DETAIL_INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No search type: {detail}")]
	NoSearchType { detail: String },
	#[error("Invalid syntax: {detail}")]
	InvalidSyntax { detail: String },
	#[error("Invalid geo parameter: {detail}")]
	InvalidGeoParameter { detail: String },
	#[error("Invalid geo value: {detail}")]
	InvalidGeoValue { detail: String },
	#[error("Bad text query: {detail}")]
	BadTextQuery { detail: String },
	#[error("Invalid property value: {detail}")]
	InvalidPropertyValue { detail: String },
	#[error("Bad filter: {detail}")]
	BadFilter { detail: String },
	#[error("Operation not allowed: {detail}")]
	OperationNotAllowed { detail: String },
	#[error("Invalid search: {detail}")]
	InvalidSearch { detail: String },
	#[error("Item not found: {detail}")]
	ItemNotFound { detail: String },
	#[error("Already exists: {id}")]
	AlreadyExists { id: String, detail: String },
	#[error("Invalid UUID: {detail}")]
	InvalidUuid { detail: String },
	#[error("Internal server error: {detail}")]
	InternalServerError { detail: String },
	#[error("Backend error: {message}")]
	Backend { message: String },
}
impl Error {
	pub fn urn(&self) -> Urn {
		match self {
			Self::NoSearchType { .. } | Self::InvalidSyntax { .. } => Urn::InvalidSyntax,
			Self::InvalidGeoParameter { .. } => Urn::InvalidGeoParameter,
			Self::InvalidGeoValue { .. } => Urn::InvalidGeoValue,
			Self::BadTextQuery { .. } => Urn::BadTextQuery,
			Self::InvalidPropertyValue { .. } => Urn::InvalidPropertyValue,
			Self::BadFilter { .. } => Urn::BadFilter,
			Self::OperationNotAllowed { .. } => Urn::OperationNotAllowed,
			Self::InvalidSearch { .. } => Urn::InvalidSearch,
			Self::ItemNotFound { .. } => Urn::ItemNotFound,
			Self::AlreadyExists { .. } => Urn::AlreadyExists,
			Self::InvalidUuid { .. } => Urn::InvalidUuid,
			Self::InternalServerError { .. } | Self::Backend { .. } => Urn::InternalServerError,
		}
	}

	/// Client-facing detail. Backend failures never leak their root cause.
	pub fn detail(&self) -> &str {
		match self {
			Self::NoSearchType { detail }
			| Self::InvalidSyntax { detail }
			| Self::InvalidGeoParameter { detail }
			| Self::InvalidGeoValue { detail }
			| Self::BadTextQuery { detail }
			| Self::InvalidPropertyValue { detail }
			| Self::BadFilter { detail }
			| Self::OperationNotAllowed { detail }
			| Self::InvalidSearch { detail }
			| Self::ItemNotFound { detail }
			| Self::AlreadyExists { detail, .. }
			| Self::InvalidUuid { detail }
			| Self::InternalServerError { detail } => detail,
			Self::Backend { .. } => DETAIL_INTERNAL_SERVER_ERROR,
		}
	}

	pub fn to_envelope(&self) -> Envelope {
		let builder = Envelope::builder(self.urn()).with_detail(self.detail());

		match self {
			Self::AlreadyExists { id, detail } =>
				builder.with_result_status_detail(id, "insert", "failed", detail).build(),
			_ => builder.build(),
		}
	}
}

impl From<cat_providers::Error> for Error {
	fn from(err: cat_providers::Error) -> Self {
		Self::Backend { message: err.to_string() }
	}
}
