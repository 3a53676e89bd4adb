use serde_json::{Map, Value};

use cat_domain::ItemType;
use cat_providers::Hit;

use crate::{Error, Result};

/// Resource-group fields copied into the dataset only when present.
const OPTIONAL_GROUP_FIELDS: [&str; 9] = [
	"label",
	"accessPolicy",
	"instance",
	"dataSample",
	"dataSampleFile",
	"dataQualityFile",
	"dataDescriptor",
	"resourceType",
	"location",
];

/// Folds the provider, resource group, resources and COS of one dataset into a single object.
pub(super) fn assemble(hits: Vec<Hit>) -> Result<Value> {
	let mut dataset = Map::new();
	let mut resources = Vec::new();

	for hit in hits {
		let mut record = hit.source;
		let item_type = record_type(&record)?;

		match item_type {
			ItemType::Provider => {
				dataset.insert(
					"resourceServerRegURL".to_string(),
					record.get("resourceServerRegURL").cloned().unwrap_or(Value::Null),
				);
				dataset.insert(
					"provider".to_string(),
					serde_json::json!({
						"id": record.get("id").cloned().unwrap_or(Value::Null),
						"description": record.get("description").cloned().unwrap_or(Value::Null),
					}),
				);
			},
			ItemType::Resource => {
				if let Some(schema) = schema_of(&record) {
					record.insert("schema".to_string(), Value::String(schema));
				}

				record.remove("type");

				if let Some(id) = record.remove("id") {
					record.insert("resourceId".to_string(), id);
				}

				resources.push(Value::Object(record));
			},
			ItemType::ResourceGroup => {
				for key in ["id", "description"] {
					dataset.insert(key.to_string(), record.get(key).cloned().unwrap_or(Value::Null));
				}

				if let Some(schema) = schema_of(&record) {
					dataset.insert("schema".to_string(), Value::String(schema));
				}

				for key in OPTIONAL_GROUP_FIELDS {
					if let Some(value) = record.get(key) {
						dataset.insert(key.to_string(), value.clone());
					}
				}
			},
			ItemType::Cos => {
				dataset.insert(
					"cosURL".to_string(),
					record.get("cosURL").cloned().unwrap_or(Value::Null),
				);
			},
			ItemType::ResourceServer | ItemType::Owner => {},
		}
	}

	dataset.insert("totalResources".to_string(), Value::from(resources.len()));

	Ok(serde_json::json!({ "dataset": dataset, "resource": resources }))
}

fn record_type(record: &Map<String, Value>) -> Result<ItemType> {
	let tags: Vec<&str> = record
		.get("type")
		.and_then(Value::as_array)
		.map(|tags| tags.iter().filter_map(Value::as_str).collect())
		.unwrap_or_default();

	ItemType::from_tags(tags.as_slice()).ok_or_else(|| Error::Backend {
		message: "Dataset record carries no catalog item type.".to_string(),
	})
}

/// Vocabulary context joined with the secondary type tag, minus its `iudx:` prefix.
fn schema_of(record: &Map<String, Value>) -> Option<String> {
	let context = record.get("@context").and_then(Value::as_str)?;
	let secondary = record.get("type").and_then(Value::as_array)?.get(1)?.as_str()?;
	let class = secondary.get(5..)?;

	Some(format!("{context}{class}"))
}
