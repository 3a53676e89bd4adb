use cat_domain::{BoolQuery, Query};

use super::QueryIntent;
use crate::{Error, Result};

const KEYWORD_SUFFIX: &str = ".keyword";

/// One `must` per property, each holding a `should` per accepted value.
pub(super) fn build(intent: &QueryIntent) -> Result<Query> {
	let (Some(properties), Some(values)) = (intent.property.as_ref(), intent.value.as_ref()) else {
		return Err(invalid_property_value());
	};

	if properties.is_empty() || properties.len() != values.len() {
		return Err(invalid_property_value());
	}

	let mut outer = BoolQuery::default();

	for (property, accepted) in properties.iter().zip(values) {
		if accepted.is_empty() {
			return Err(invalid_property_value());
		}

		let field = match_field(property);
		let inner = accepted
			.iter()
			.fold(BoolQuery::default(), |inner, value| inner.should(Query::matches(&field, value)));

		outer = outer.must(Query::Bool(inner));
	}

	Ok(Query::Bool(outer))
}

/// Free-text fields match analyzed text. Everything else matches the exact keyword.
fn match_field(property: &str) -> String {
	if property == "tags" || property == "description" || property.starts_with("location") {
		return property.to_string();
	}
	if property.ends_with(KEYWORD_SUFFIX) {
		return property.to_string();
	}

	format!("{property}{KEYWORD_SUFFIX}")
}

fn invalid_property_value() -> Error {
	Error::InvalidPropertyValue { detail: "Invalid Property Value".to_string() }
}
