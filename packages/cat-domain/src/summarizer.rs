use regex::Regex;
use serde_json::Value;

const JSON_ARTIFACTS: &str = r#"[\n:{},"\[\]]"#;
const WHITESPACE_RUNS: &str = r"\s+";

/// Flattens the human-readable parts of a catalog document into one blob for full-text search.
pub fn summarize(doc: &Value) -> String {
	let mut out = String::new();

	for key in ["name", "label"] {
		if let Some(text) = doc.get(key).and_then(Value::as_str) {
			out.push_str(text);
			out.push(' ');
		}
	}

	if let Some(tags) = doc.get("tags").and_then(Value::as_array) {
		for tag in tags.iter().filter_map(Value::as_str) {
			out.push_str(tag);
			out.push(' ');
		}
	}
	if let Some(description) = doc.get("description").and_then(Value::as_str) {
		out.push_str(description);
		out.push(' ');
	}
	if let Some(descriptor) = doc.get("descriptor").filter(|value| value.is_object()) {
		out.push_str(&flatten_descriptor(&descriptor.to_string()));
		out.push(' ');
	}

	out
}

fn flatten_descriptor(raw: &str) -> String {
	let stripped = replace_all(JSON_ARTIFACTS, raw);

	replace_all(WHITESPACE_RUNS, &stripped)
}

fn replace_all(pattern: &str, text: &str) -> String {
	Regex::new(pattern)
		.map(|re| re.replace_all(text, " ").into_owned())
		.unwrap_or_else(|_| text.to_string())
}
