//! Uniform response body shared by success and failure paths.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urn {
	Success,
	InvalidSyntax,
	InvalidGeoParameter,
	InvalidGeoValue,
	BadTextQuery,
	InvalidPropertyValue,
	BadFilter,
	OperationNotAllowed,
	InvalidSearch,
	ItemNotFound,
	AlreadyExists,
	InvalidUuid,
	InternalServerError,
	/// Fallback for codes this service does not know about.
	YetNotImplemented,
}
impl Urn {
	const ALL: [Self; 14] = [
		Self::Success,
		Self::InvalidSyntax,
		Self::InvalidGeoParameter,
		Self::InvalidGeoValue,
		Self::BadTextQuery,
		Self::InvalidPropertyValue,
		Self::BadFilter,
		Self::OperationNotAllowed,
		Self::InvalidSearch,
		Self::ItemNotFound,
		Self::AlreadyExists,
		Self::InvalidUuid,
		Self::InternalServerError,
		Self::YetNotImplemented,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Success => "urn:dx:cat:Success",
			Self::InvalidSyntax => "urn:dx:cat:InvalidSyntax",
			Self::InvalidGeoParameter => "urn:dx:cat:InvalidGeoParam",
			Self::InvalidGeoValue => "urn:dx:cat:InvalidGeoValue",
			Self::BadTextQuery => "urn:dx:cat:BadTextQuery",
			Self::InvalidPropertyValue => "urn:dx:cat:InvalidPropertyValue",
			Self::BadFilter => "urn:dx:cat:BadFilter",
			Self::OperationNotAllowed => "urn:dx:cat:OperationNotAllowed",
			Self::InvalidSearch => "urn:dx:cat:InvalidRelationSearch",
			Self::ItemNotFound => "urn:dx:cat:ItemNotFound",
			Self::AlreadyExists => "urn:dx:cat:AlreadyExists",
			Self::InvalidUuid => "urn:dx:cat:InvalidUUID",
			Self::InternalServerError => "urn:dx:cat:InternalError",
			Self::YetNotImplemented => "urn:dx:cat:general",
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			Self::Success => "Success",
			Self::InvalidSyntax => "Invalid Syntax",
			Self::InvalidGeoParameter => "Invalid Geo Parameter",
			Self::InvalidGeoValue => "Invalid Geo Value",
			Self::BadTextQuery => "Bad Text Query",
			Self::InvalidPropertyValue => "Invalid Property Value",
			Self::BadFilter => "Bad Filter",
			Self::OperationNotAllowed => "Operation Not Allowed",
			Self::InvalidSearch => "Invalid Search",
			Self::ItemNotFound => "Item is not found",
			Self::AlreadyExists => "Item already exists",
			Self::InvalidUuid => "Invalid UUID",
			Self::InternalServerError => "Internal Server Error",
			Self::YetNotImplemented => "urn yet not implemented in backend verticle.",
		}
	}

	/// Case-insensitive lookup. Unknown codes collapse to [`Urn::YetNotImplemented`].
	pub fn from_code(code: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|urn| urn.as_str().eq_ignore_ascii_case(code))
			.unwrap_or(Self::YetNotImplemented)
	}
}
impl Serialize for Urn {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for Urn {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Ok(Self::from_code(&raw))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
	#[serde(rename = "type")]
	pub urn: Urn,
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_hits: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub results: Option<Vec<Value>>,
}
impl Envelope {
	pub fn builder(urn: Urn) -> EnvelopeBuilder {
		EnvelopeBuilder::new(urn)
	}

	/// Success envelope for a hit list. `results` is present even when empty.
	pub fn success(total_hits: u64, results: Vec<Value>) -> Self {
		Self::builder(Urn::Success).with_total_hits(total_hits).with_results(results).build()
	}

	pub fn is_success(&self) -> bool {
		self.urn == Urn::Success
	}

	pub fn results(&self) -> &[Value] {
		self.results.as_deref().unwrap_or(&[])
	}
}

#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
	urn: Urn,
	title: String,
	detail: Option<String>,
	total_hits: Option<u64>,
	results: Option<Vec<Value>>,
}
impl EnvelopeBuilder {
	pub fn new(urn: Urn) -> Self {
		Self { urn, title: urn.title().to_string(), detail: None, total_hits: None, results: None }
	}

	/// Replaces the urn. The title follows unless it was overridden.
	pub fn with_type(mut self, urn: Urn) -> Self {
		if self.title == self.urn.title() {
			self.title = urn.title().to_string();
		}

		self.urn = urn;

		self
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();

		self
	}

	pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
		self.detail = Some(detail.into());

		self
	}

	pub fn with_total_hits(mut self, total_hits: u64) -> Self {
		self.total_hits = Some(total_hits);

		self
	}

	pub fn with_result_id(self, id: &str) -> Self {
		self.push_result(serde_json::json!({ "id": id }))
	}

	pub fn with_result_detail(self, id: &str, detail: &str) -> Self {
		self.push_result(serde_json::json!({ "id": id, "detail": detail }))
	}

	pub fn with_result_status(self, id: &str, method: &str, status: &str) -> Self {
		self.push_result(serde_json::json!({ "id": id, "method": method, "status": status }))
	}

	pub fn with_result_status_detail(
		self,
		id: &str,
		method: &str,
		status: &str,
		detail: &str,
	) -> Self {
		self.push_result(serde_json::json!({
			"id": id,
			"method": method,
			"status": status,
			"detail": detail,
		}))
	}

	pub fn with_results(mut self, results: Vec<Value>) -> Self {
		self.results = Some(results);

		self
	}

	pub fn with_result_object(self, object: Map<String, Value>) -> Self {
		self.push_result(Value::Object(object))
	}

	pub fn build(self) -> Envelope {
		Envelope {
			urn: self.urn,
			title: self.title,
			detail: self.detail,
			total_hits: self.total_hits,
			results: self.results,
		}
	}

	fn push_result(mut self, result: Value) -> Self {
		self.results.get_or_insert_with(Vec::new).push(result);

		self
	}
}
