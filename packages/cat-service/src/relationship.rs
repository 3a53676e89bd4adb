//! Walks the catalogue hierarchy from one item to its related items.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use cat_domain::{BoolQuery, ItemType, ParentLink, Query, Relationship, SearchRequest, SourceFilter};

use crate::{CatalogService, Envelope, Error, Result, decoder, executor, normalizer::ResponseShape};

const TARGET_FIELDS: [&str; 6] =
	["cos", "resourceServer", "type", "provider", "resourceGroup", "id"];
const TYPE_FIELDS: [&str; 1] = ["type"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRequest {
	pub id: String,
	pub relationship: String,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
	pub filter: Option<Vec<String>>,
}

/// The item a relationship starts from, with whatever parent links its record carries.
#[derive(Debug, Clone)]
struct Target {
	id: String,
	item_type: ItemType,
	record: Map<String, Value>,
}
impl Target {
	fn link(&self, link: ParentLink) -> Option<&str> {
		self.record.get(link.field()).and_then(Value::as_str).filter(|value| !value.is_empty())
	}

	fn require_link(&self, link: ParentLink) -> Result<&str> {
		self.link(link).ok_or_else(|| Error::ItemNotFound {
			detail: format!("{} for given item not found", link.field()),
		})
	}
}

impl CatalogService {
	pub async fn list_relationship(&self, req: RelationshipRequest) -> Envelope {
		crate::respond("list_relationship", self.list_relationship_inner(&req).await)
	}

	/// Resolves the final query of a relationship lookup.
	///
	/// Intermediate hops are awaited before the final query is built, so the returned request
	/// already carries every id it depends on.
	pub async fn resolve_relationship(&self, req: &RelationshipRequest) -> Result<SearchRequest> {
		let Some(relationship) = Relationship::parse(req.relationship.trim()) else {
			return Err(invalid_search());
		};

		if Uuid::parse_str(req.id.trim()).is_err() {
			return Err(Error::InvalidUuid { detail: "Invalid id".to_string() });
		}

		let mut target = self.lookup_target(req.id.trim()).await?;

		if !relationship.is_allowed_on(target.item_type) {
			tracing::debug!(
				relationship = %relationship,
				item_type = %target.item_type,
				"Relationship rejected for item type."
			);

			return Err(invalid_search());
		}

		let query = match (relationship, target.item_type) {
			(Relationship::ResourceServer | Relationship::All, ItemType::ResourceGroup) => {
				self.merge_provider(&mut target).await?;

				direct_query(relationship, &target)?
			},
			(Relationship::ResourceGroup, ItemType::ResourceServer) => {
				let provider_ids = self.providers_of_server(&target.id).await?;

				provider_ids
					.into_iter()
					.fold(BoolQuery::default(), |query, id| {
						query.should(Query::matches(ParentLink::Provider.keyword_field(), id))
					})
					.minimum_should_match(1)
					.must(Query::term("type.keyword", ItemType::ResourceGroup.as_str()))
					.into()
			},
			_ => direct_query(relationship, &target)?,
		};
		let defaults: &[&str] = if relationship == Relationship::Type { &TYPE_FIELDS } else { &[] };

		Ok(decoder::finish(
			query,
			req.limit,
			req.offset,
			req.filter.as_deref(),
			defaults,
			self.page_size(),
		))
	}

	async fn list_relationship_inner(&self, req: &RelationshipRequest) -> Result<Envelope> {
		let request = self.resolve_relationship(req).await?;
		let normalized = executor::execute(
			self.backend.as_ref(),
			self.catalogue_index(),
			&request,
			ResponseShape::SourceOnly,
		)
		.await?;

		Ok(Envelope::success(normalized.total_hits, normalized.results))
	}

	async fn lookup_target(&self, id: &str) -> Result<Target> {
		let request = SearchRequest::new(Query::term("id.keyword", id))
			.source(target_fields());
		let hits = self.backend.search(self.catalogue_index(), &request).await?;
		let Some(hit) = hits.hits.into_iter().next() else {
			return Err(Error::ItemNotFound { detail: "Item id given is not present".to_string() });
		};
		let tags: Vec<&str> = hit
			.source
			.get("type")
			.and_then(Value::as_array)
			.map(|tags| tags.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default();
		let Some(item_type) = ItemType::from_tags(tags.as_slice()) else {
			return Err(invalid_search());
		};

		Ok(Target { id: id.to_string(), item_type, record: hit.source })
	}

	/// Pulls the owning provider's record under a resource group, keeping the group's own fields.
	async fn merge_provider(&self, target: &mut Target) -> Result<()> {
		let provider = target.require_link(ParentLink::Provider)?.to_string();
		let request = SearchRequest::new(Query::Bool(
			BoolQuery::default().filter(Query::terms("id.keyword", vec![provider])),
		))
		.source(target_fields())
		.window(self.page_size(), 0);
		let hits = self.backend.search(self.catalogue_index(), &request).await?;
		let Some(hit) = hits.hits.into_iter().next() else {
			return Err(Error::ItemNotFound {
				detail: "Provider for given resource group not found".to_string(),
			});
		};

		for (key, value) in hit.source {
			target.record.entry(key).or_insert(value);
		}

		Ok(())
	}

	async fn providers_of_server(&self, server_id: &str) -> Result<Vec<String>> {
		let query = BoolQuery::default()
			.must(Query::matches(ParentLink::ResourceServer.keyword_field(), server_id))
			.must(Query::term("type.keyword", ItemType::Provider.as_str()));
		let request = SearchRequest::new(Query::Bool(query))
			.source(SourceFilter::includes(vec!["id".to_string()]))
			.window(self.page_size(), 0);
		let hits = self.backend.search(self.catalogue_index(), &request).await?;
		let ids: Vec<String> = hits
			.hits
			.into_iter()
			.filter_map(|hit| hit.source.get("id").and_then(Value::as_str).map(str::to_string))
			.collect();

		if ids.is_empty() {
			return Err(Error::ItemNotFound {
				detail: "Provider for given resource server not found".to_string(),
			});
		}

		Ok(ids)
	}
}

/// One-level lookups, answered from the target record alone.
fn direct_query(relationship: Relationship, target: &Target) -> Result<Query> {
	let id = target.id.as_str();
	let query = match (relationship, target.item_type) {
		(Relationship::Type, _) => Query::term("id.keyword", id),
		(Relationship::Cos, _) => Query::term("id.keyword", target.require_link(ParentLink::Cos)?),
		(_, ItemType::Cos) => {
			let Some(related) = relationship.target_type() else {
				return Err(invalid_search());
			};

			BoolQuery::default()
				.must(Query::term(ParentLink::Cos.keyword_field(), id))
				.must(Query::term("type.keyword", related.as_str()))
				.into()
		},
		(Relationship::Resource, item_type) => {
			let Some(link) = item_type.as_parent_link() else {
				return Err(invalid_search());
			};

			Query::typed_term(link.field(), id, ItemType::Resource.as_str())
		},
		(Relationship::ResourceGroup, ItemType::Resource) => Query::typed_term(
			"id",
			target.require_link(ParentLink::ResourceGroup)?,
			ItemType::ResourceGroup.as_str(),
		),
		(Relationship::ResourceGroup, ItemType::Provider) =>
			Query::typed_term(ParentLink::Provider.field(), id, ItemType::ResourceGroup.as_str()),
		(Relationship::Provider, ItemType::ResourceServer) =>
			Query::typed_term(ParentLink::ResourceServer.field(), id, ItemType::Provider.as_str()),
		(Relationship::Provider, _) => Query::typed_term(
			"id",
			target.require_link(ParentLink::Provider)?,
			ItemType::Provider.as_str(),
		),
		(Relationship::ResourceServer, _) => BoolQuery::default()
			.must(Query::matches("id.keyword", target.require_link(ParentLink::ResourceServer)?))
			.must(Query::term("type.keyword", ItemType::ResourceServer.as_str()))
			.into(),
		(Relationship::All, item_type) => item_type
			.parent_links()
			.iter()
			.filter(|link| **link != ParentLink::Owner)
			.filter_map(|link| target.link(*link))
			.fold(BoolQuery::default().should(Query::matches("id.keyword", id)), |query, linked| {
				query.should(Query::matches("id.keyword", linked))
			})
			.into(),
		_ => return Err(invalid_search()),
	};

	Ok(query)
}

fn target_fields() -> SourceFilter {
	SourceFilter::includes(TARGET_FIELDS.iter().map(|field| field.to_string()).collect())
}

fn invalid_search() -> Error {
	Error::InvalidSearch { detail: "Invalid search request".to_string() }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn target(item_type: ItemType, record: Value) -> Target {
		let Value::Object(record) = record else {
			panic!("Test record must be an object.");
		};

		Target { id: "self".to_string(), item_type, record }
	}

	#[test]
	fn resources_of_a_provider_use_the_provider_link() {
		let provider = target(ItemType::Provider, serde_json::json!({}));
		let query = direct_query(Relationship::Resource, &provider).expect("direct_query failed");

		assert_eq!(query, Query::typed_term("provider", "self", "iudx:Resource"));
	}

	#[test]
	fn related_items_of_a_cos_are_scoped_by_type() {
		let cos = target(ItemType::Cos, serde_json::json!({}));
		let query = direct_query(Relationship::ResourceServer, &cos).expect("direct_query failed");
		let bool_query = query.as_bool().expect("Expected bool query.");

		assert_eq!(
			bool_query.must,
			vec![
				Query::term("cos.keyword", "self"),
				Query::term("type.keyword", "iudx:ResourceServer"),
			]
		);
	}

	#[test]
	fn resource_group_of_a_resource_follows_its_link() {
		let resource = target(ItemType::Resource, serde_json::json!({ "resourceGroup": "rg1" }));
		let query =
			direct_query(Relationship::ResourceGroup, &resource).expect("direct_query failed");

		assert_eq!(query, Query::typed_term("id", "rg1", "iudx:ResourceGroup"));
	}

	#[test]
	fn missing_link_is_item_not_found() {
		let resource = target(ItemType::Resource, serde_json::json!({}));
		let err = direct_query(Relationship::Cos, &resource).expect_err("Expected missing link.");

		assert!(matches!(err, Error::ItemNotFound { .. }));
		assert_eq!(err.detail(), "cos for given item not found");
	}

	#[test]
	fn all_collects_self_and_present_links() {
		let resource = target(
			ItemType::Resource,
			serde_json::json!({ "resourceGroup": "rg1", "provider": "p1", "cos": "c1" }),
		);
		let query = direct_query(Relationship::All, &resource).expect("direct_query failed");
		let bool_query = query.as_bool().expect("Expected bool query.");

		assert_eq!(
			bool_query.should,
			vec![
				Query::matches("id.keyword", "self"),
				Query::matches("id.keyword", "rg1"),
				Query::matches("id.keyword", "p1"),
				Query::matches("id.keyword", "c1"),
			]
		);
	}

	#[test]
	fn type_relationship_targets_the_item_itself() {
		let server = target(ItemType::ResourceServer, serde_json::json!({}));

		assert_eq!(
			direct_query(Relationship::Type, &server).expect("direct_query failed"),
			Query::term("id.keyword", "self")
		);
	}

	#[test]
	fn type_relationship_on_a_cos_targets_the_cos_itself() {
		let cos = target(ItemType::Cos, serde_json::json!({}));

		assert_eq!(
			direct_query(Relationship::Type, &cos).expect("direct_query failed"),
			Query::term("id.keyword", "self")
		);
	}
}
