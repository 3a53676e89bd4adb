use serde_json::Value;

use cat_domain::{BoolQuery, Query};
use cat_service::{
	AverageRatingRequest, CreateItemRequest, DatasetRequest, DeleteItemRequest, GetItemRequest,
	ListItemsRequest, LocationCandidate, NlpLocationRequest, NlpSearchRequest,
	ProviderSummaryRequest, QueryIntent, RelationshipRequest, UpdateItemRequest, Urn,
};
use cat_testkit::{Call, RecordingBackend, hit, hits, new_item_id, service_with};

fn object(value: Value) -> serde_json::Map<String, Value> {
	let Value::Object(map) = value else {
		panic!("Test value must be an object.");
	};

	map
}

fn relationship(id: &str, relationship: &str) -> RelationshipRequest {
	RelationshipRequest {
		id: id.to_string(),
		relationship: relationship.to_string(),
		..Default::default()
	}
}

#[tokio::test]
async fn zero_hit_search_returns_empty_results() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let intent = QueryIntent {
		search_type: Some("textSearch_".to_string()),
		q: Some("flood".to_string()),
		..Default::default()
	};
	let envelope = service.search(intent).await;
	let body = serde_json::to_value(&envelope).expect("serialize failed");

	assert_eq!(body["type"], "urn:dx:cat:Success");
	assert_eq!(body["totalHits"], 0);
	assert_eq!(body["results"], serde_json::json!([]));
}

#[tokio::test]
async fn invalid_intent_never_reaches_the_backend() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let intent = QueryIntent {
		search_type: Some("geoSearch_".to_string()),
		geometry: Some("polygon".to_string()),
		georelation: Some("within".to_string()),
		coordinates: Some(serde_json::json!([[[75.9, 14.5], [72, 13], [73, 20]]])),
		..Default::default()
	};
	let envelope = service.search(intent).await;

	assert_eq!(envelope.urn, Urn::InvalidGeoValue);
	assert_eq!(envelope.detail.as_deref(), Some("Coordinate mismatch (Polygon)"));
	assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn count_reports_total_without_results() {
	let backend = RecordingBackend::new();

	backend.push_count(42);

	let service = service_with(&backend);
	let intent = QueryIntent {
		search_type: Some("attributeSearch_".to_string()),
		property: Some(vec!["tags".to_string()]),
		value: Some(vec![vec!["flood".to_string()]]),
		..Default::default()
	};
	let envelope = service.count(intent).await;

	assert!(envelope.is_success());
	assert_eq!(envelope.total_hits, Some(42));
	assert!(envelope.results().is_empty());
	assert!(matches!(backend.calls().as_slice(), [Call::Count { .. }]));
}

#[tokio::test]
async fn backend_failure_becomes_generic_internal_error() {
	let backend = RecordingBackend::new();

	backend.push_search_failure("connection refused by 10.0.0.7:9200");

	let service = service_with(&backend);
	let intent = QueryIntent {
		search_type: Some("textSearch_".to_string()),
		q: Some("flood".to_string()),
		..Default::default()
	};
	let envelope = service.search(intent).await;

	assert_eq!(envelope.urn, Urn::InternalServerError);
	assert_eq!(envelope.detail.as_deref(), Some("Internal server error"));
}

#[tokio::test]
async fn resource_groups_of_a_server_wait_for_provider_hop() {
	let server_id = new_item_id();
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![hit(
			"d-rs",
			serde_json::json!({ "id": server_id, "type": ["iudx:ResourceServer"] }),
		)]))
		.push_hits(hits(vec![
			hit("d-p1", serde_json::json!({ "id": "p1" })),
			hit("d-p2", serde_json::json!({ "id": "p2" })),
		]))
		.push_hits(hits(vec![hit("d-rg", serde_json::json!({ "id": "rg1" }))]));

	let service = service_with(&backend);
	let envelope = service.list_relationship(relationship(&server_id, "resourceGroup")).await;

	assert!(envelope.is_success());
	assert_eq!(envelope.results(), &[serde_json::json!({ "id": "rg1" })]);

	let searches = backend.searches();

	assert_eq!(searches.len(), 3);
	assert_eq!(searches[0].query, Query::term("id.keyword", server_id.as_str()));

	let final_query = searches[2].query.as_bool().expect("Expected bool query.");

	assert_eq!(final_query.should, vec![
		Query::matches("provider.keyword", "p1"),
		Query::matches("provider.keyword", "p2"),
	]);
	assert_eq!(final_query.minimum_should_match, Some(1));
}

#[tokio::test]
async fn empty_intermediate_hop_is_item_not_found() {
	let server_id = new_item_id();
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![hit(
		"d-rs",
		serde_json::json!({ "id": server_id, "type": ["iudx:ResourceServer"] }),
	)]));

	let service = service_with(&backend);
	let envelope = service.list_relationship(relationship(&server_id, "resourceGroup")).await;

	assert_eq!(envelope.urn, Urn::ItemNotFound);
	assert_eq!(envelope.detail.as_deref(), Some("Provider for given resource server not found"));
	assert_eq!(backend.searches().len(), 2);
}

#[tokio::test]
async fn resource_relationship_on_a_resource_is_rejected() {
	let resource_id = new_item_id();
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![hit(
		"d-r",
		serde_json::json!({ "id": resource_id, "type": ["iudx:Resource", "iudx:EnvAQM"] }),
	)]));

	let service = service_with(&backend);
	let envelope = service.list_relationship(relationship(&resource_id, "resource")).await;

	assert_eq!(envelope.urn, Urn::InvalidSearch);
	assert_eq!(backend.searches().len(), 1);
}

#[tokio::test]
async fn missing_target_is_item_not_found() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let envelope = service.list_relationship(relationship(&new_item_id(), "all")).await;

	assert_eq!(envelope.urn, Urn::ItemNotFound);
	assert_eq!(envelope.detail.as_deref(), Some("Item id given is not present"));
}

#[tokio::test]
async fn resource_server_of_a_group_reads_the_provider_record() {
	let group_id = new_item_id();
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![hit(
			"d-rg",
			serde_json::json!({ "id": group_id, "type": ["iudx:ResourceGroup"], "provider": "p1" }),
		)]))
		.push_hits(hits(vec![hit(
			"d-p1",
			serde_json::json!({ "id": "p1", "type": ["iudx:Provider"], "resourceServer": "rs1" }),
		)]))
		.push_hits(hits(vec![hit("d-rs1", serde_json::json!({ "id": "rs1" }))]));

	let service = service_with(&backend);
	let envelope = service.list_relationship(relationship(&group_id, "resourceServer")).await;

	assert!(envelope.is_success());

	let searches = backend.searches();
	let expected = BoolQuery::default()
		.must(Query::matches("id.keyword", "rs1"))
		.must(Query::term("type.keyword", "iudx:ResourceServer"));

	assert_eq!(searches[2].query, Query::Bool(expected));
}

#[tokio::test]
async fn all_of_a_group_adds_the_provider_server_and_keeps_group_links() {
	let group_id = new_item_id();
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![hit(
			"d-rg",
			serde_json::json!({
				"id": group_id,
				"type": ["iudx:ResourceGroup"],
				"provider": "p1",
				"cos": "c1",
			}),
		)]))
		.push_hits(hits(vec![hit(
			"d-p1",
			serde_json::json!({
				"id": "p1",
				"type": ["iudx:Provider"],
				"resourceServer": "rs1",
				"cos": "c-other",
			}),
		)]))
		.push_hits(hits(vec![hit("d-rs1", serde_json::json!({ "id": "rs1" }))]));

	let service = service_with(&backend);
	let envelope = service.list_relationship(relationship(&group_id, "all")).await;

	assert!(envelope.is_success());

	let searches = backend.searches();

	assert_eq!(searches.len(), 3);
	assert_eq!(searches[0].query, Query::term("id.keyword", group_id.as_str()));
	assert_eq!(
		searches[1].query,
		Query::Bool(BoolQuery::default().filter(Query::terms("id.keyword", vec!["p1".to_string()])))
	);
	assert!(searches[1].source.includes.contains(&"resourceServer".to_string()));
	assert_eq!((searches[1].size, searches[1].from), (Some(10_000), Some(0)));

	let final_query = searches[2].query.as_bool().expect("Expected bool query.");

	assert_eq!(final_query.should, vec![
		Query::matches("id.keyword", group_id.as_str()),
		Query::matches("id.keyword", "p1"),
		Query::matches("id.keyword", "rs1"),
		Query::matches("id.keyword", "c1"),
	]);
}

#[tokio::test]
async fn type_relationship_on_a_cos_returns_its_own_record() {
	let cos_id = new_item_id();
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![hit("d-c", serde_json::json!({ "id": cos_id, "type": ["iudx:COS"] }))]))
		.push_hits(hits(vec![hit("d-c", serde_json::json!({ "type": ["iudx:COS"] }))]));

	let service = service_with(&backend);
	let envelope = service.list_relationship(relationship(&cos_id, "type")).await;

	assert!(envelope.is_success());
	assert_eq!(envelope.results(), &[serde_json::json!({ "type": ["iudx:COS"] })]);

	let searches = backend.searches();

	assert_eq!(searches[1].query, Query::term("id.keyword", cos_id.as_str()));
	assert_eq!(searches[1].source.includes, vec!["type".to_string()]);
}

#[tokio::test]
async fn type_relationship_projects_only_type() {
	let item_id = new_item_id();
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![hit(
		"d-p",
		serde_json::json!({ "id": item_id, "type": ["iudx:Provider"] }),
	)]));

	let service = service_with(&backend);
	let request = service
		.resolve_relationship(&relationship(&item_id, "type"))
		.await
		.expect("resolve_relationship failed");

	assert_eq!(request.query, Query::term("id.keyword", item_id.as_str()));
	assert_eq!(request.source.includes, vec!["type".to_string()]);
	assert_eq!((request.size, request.from), (Some(10_000), Some(0)));
}

#[tokio::test]
async fn get_item_hides_computed_fields() {
	let backend = RecordingBackend::new();
	let item_id = new_item_id();

	backend.push_hits(hits(vec![hit(
		"d1",
		serde_json::json!({ "id": item_id, "name": "aqm-sensor", "_summary": "aqm-sensor " }),
	)]));

	let service = service_with(&backend);
	let envelope = service.get_item(GetItemRequest { id: item_id.clone() }).await;

	assert!(envelope.is_success());
	assert_eq!(envelope.detail.as_deref(), Some("Success: Item fetched Successfully"));
	assert_eq!(envelope.results(), &[serde_json::json!({ "id": item_id, "name": "aqm-sensor" })]);
}

#[tokio::test]
async fn get_item_without_id_is_invalid_syntax() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let envelope = service.get_item(GetItemRequest { id: "  ".to_string() }).await;

	assert_eq!(envelope.urn, Urn::InvalidSyntax);
	assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn list_items_returns_bucket_keys() {
	let backend = RecordingBackend::new();

	backend.push_hits(cat_providers::SearchHits {
		total_hits: 5,
		hits: Vec::new(),
		aggregations: Some(serde_json::json!({
			"results": { "buckets": [{ "key": "flood", "doc_count": 2 }, { "key": "aqm", "doc_count": 3 }] }
		})),
	});

	let service = service_with(&backend);
	let envelope = service
		.list_items(ListItemsRequest { item_type: "tags".to_string(), ..Default::default() })
		.await;

	assert!(envelope.is_success());
	assert_eq!(envelope.results(), &[Value::from("flood"), Value::from("aqm")]);

	let searches = backend.searches();

	assert_eq!((searches[0].size, searches[0].from), (Some(0), Some(0)));
}

#[tokio::test]
async fn provider_summary_counts_distinct_providers() {
	let backend = RecordingBackend::new();

	backend.push_hits(cat_providers::SearchHits {
		total_hits: 2,
		hits: vec![
			hit("d1", serde_json::json!({ "id": "p1" })),
			hit("d2", serde_json::json!({ "id": "rg1", "provider": "p1" })),
		],
		aggregations: Some(serde_json::json!({ "provider_count": { "value": 1 } })),
	});

	let service = service_with(&backend);
	let envelope = service.provider_summary(ProviderSummaryRequest::default()).await;

	assert_eq!(envelope.results(), &[serde_json::json!({
		"providerCount": 1,
		"resourceGroupAndProvider": [{ "id": "p1" }, { "id": "rg1", "provider": "p1" }],
	})]);
}

#[tokio::test]
async fn nlp_search_scores_every_item_by_embedding() {
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![hit("d1", serde_json::json!({ "id": "a" }))]));

	let service = service_with(&backend);
	let envelope = service.nlp_search(NlpSearchRequest { embedding: vec![0.1, 0.2] }).await;

	assert!(envelope.is_success());

	let searches = backend.searches();

	assert_eq!(searches[0].query, Query::ScriptScore {
		query: Box::new(Query::MatchAll),
		vector: vec![0.1, 0.2],
	});
	assert_eq!(searches[0].source.excludes, vec!["_word_vector".to_string()]);
}

#[tokio::test]
async fn average_rating_queries_rating_index_after_id_hop() {
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![
			hit("d-rg", serde_json::json!({ "id": "rg1" })),
			hit("d-r", serde_json::json!({ "id": "r1" })),
		]))
		.push_hits(cat_providers::SearchHits {
			total_hits: 3,
			hits: Vec::new(),
			aggregations: Some(serde_json::json!({
				"results": { "buckets": [
					{ "key": "r1", "doc_count": 3, "average_rating": { "value": 4.0 } }
				] }
			})),
		});

	let service = service_with(&backend);
	let envelope = service.average_rating(AverageRatingRequest { id: "rg1".to_string() }).await;

	assert_eq!(envelope.results(), &[serde_json::json!({
		"id": "r1",
		"totalRatings": 3,
		"averageRating": 4.0,
	})]);

	let calls = backend.calls();

	assert!(matches!(&calls[1], Call::Search { index, .. } if index == "rating"));
}

#[tokio::test]
async fn dataset_without_group_is_item_not_found() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let envelope = service.dataset(DatasetRequest { id: "rg1".to_string() }).await;

	assert_eq!(envelope.urn, Urn::ItemNotFound);
	assert_eq!(backend.searches().len(), 1);
}

#[tokio::test]
async fn dataset_folds_group_provider_resources_and_cos() {
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![hit("d-rg", serde_json::json!({ "provider": "p1", "cos": "c1" }))]))
		.push_hits(hits(vec![
			hit(
				"d-rg",
				serde_json::json!({
					"id": "rg1",
					"type": ["iudx:ResourceGroup"],
					"description": "air quality",
				}),
			),
			hit(
				"d-p1",
				serde_json::json!({ "id": "p1", "type": ["iudx:Provider"], "description": "pmc" }),
			),
			hit("d-r1", serde_json::json!({ "id": "r1", "type": ["iudx:Resource"] })),
			hit(
				"d-c1",
				serde_json::json!({ "id": "c1", "type": ["iudx:COS"], "cosURL": "cos.iudx.org" }),
			),
		]));

	let service = service_with(&backend);
	let envelope = service.dataset(DatasetRequest { id: "rg1".to_string() }).await;

	assert!(envelope.is_success());

	let result = &envelope.results()[0];

	assert_eq!(result["dataset"]["id"], "rg1");
	assert_eq!(result["dataset"]["provider"]["id"], "p1");
	assert_eq!(result["dataset"]["cosURL"], "cos.iudx.org");
	assert_eq!(result["dataset"]["totalResources"], 1);
	assert_eq!(result["resource"], serde_json::json!([{ "resourceId": "r1" }]));

	let searches = backend.searches();

	assert_eq!(searches.len(), 2);
	assert_eq!(searches[1].query.as_bool().expect("Expected bool query.").should.len(), 4);
}

#[tokio::test]
async fn location_search_unions_candidate_hits() {
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![hit("d1", serde_json::json!({ "id": "a", "_word_vector": [0.1] }))]))
		.push_hits(hits(vec![hit("d2", serde_json::json!({ "id": "b" }))]));

	let service = service_with(&backend);
	let candidate = LocationCandidate {
		locality: Some("Pune".to_string()),
		bbox: vec![73.7, 18.4, 74.0, 18.6],
		..Default::default()
	};
	let envelope = service
		.nlp_location_search(NlpLocationRequest {
			embedding: vec![0.1, 0.2],
			candidates: vec![candidate.clone(), candidate],
		})
		.await;

	assert!(envelope.is_success());
	assert_eq!(envelope.total_hits, Some(2));

	let mut ids: Vec<&str> =
		envelope.results().iter().filter_map(|result| result["id"].as_str()).collect();

	ids.sort_unstable();

	assert_eq!(ids, vec!["a", "b"]);
	assert!(envelope.results().iter().all(|result| result.get("_word_vector").is_none()));
}

#[tokio::test]
async fn one_failed_candidate_fails_location_search() {
	let backend = RecordingBackend::new();

	backend
		.push_hits(hits(vec![hit("d1", serde_json::json!({ "id": "a" }))]))
		.push_search_failure("shard failure");

	let service = service_with(&backend);
	let candidate = LocationCandidate {
		region: Some("Maharashtra".to_string()),
		bbox: vec![72.0, 15.0, 80.0, 22.0],
		..Default::default()
	};
	let envelope = service
		.nlp_location_search(NlpLocationRequest {
			embedding: vec![0.1],
			candidates: vec![candidate.clone(), candidate],
		})
		.await;

	assert_eq!(envelope.urn, Urn::InternalServerError);
}

#[tokio::test]
async fn empty_location_union_is_item_not_found() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let candidate = LocationCandidate {
		country: Some("India".to_string()),
		bbox: vec![68.0, 6.0, 97.0, 37.0],
		..Default::default()
	};
	let envelope = service
		.nlp_location_search(NlpLocationRequest {
			embedding: vec![0.1],
			candidates: vec![candidate],
		})
		.await;

	assert_eq!(envelope.urn, Urn::ItemNotFound);
	assert_eq!(envelope.detail.as_deref(), Some("NLP Search Failed"));
}

#[tokio::test]
async fn too_many_location_candidates_are_rejected_up_front() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let candidate = LocationCandidate { bbox: vec![1.0, 2.0, 3.0, 4.0], ..Default::default() };
	let envelope = service
		.nlp_location_search(NlpLocationRequest {
			embedding: vec![0.1],
			candidates: vec![candidate; 5],
		})
		.await;

	assert_eq!(envelope.urn, Urn::InvalidSyntax);
	assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn create_indexes_summary_after_existence_check() {
	let item_id = new_item_id();
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let doc = object(serde_json::json!({
		"id": item_id,
		"type": ["iudx:Resource"],
		"name": "aqm-sensor",
		"tags": ["air", "quality"],
	}));
	let envelope = service.create_item(CreateItemRequest { doc }).await;

	assert!(envelope.is_success());
	assert_eq!(envelope.results(), &[serde_json::json!({
		"id": item_id,
		"method": "insert",
		"status": "success",
	})]);

	let calls = backend.calls();
	let [Call::Search { .. }, Call::Create { body, .. }] = calls.as_slice() else {
		panic!("Expected existence check then create, got {calls:?}.");
	};

	assert_eq!(body["_summary"], "aqm-sensor air quality ");
}

#[tokio::test]
async fn create_of_existing_item_reports_already_exists() {
	let item_id = new_item_id();
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![hit("d1", serde_json::json!({ "id": item_id }))]));

	let service = service_with(&backend);
	let doc = object(serde_json::json!({ "id": item_id }));
	let envelope = service.create_item(CreateItemRequest { doc }).await;
	let body = serde_json::to_value(&envelope).expect("serialize failed");

	assert_eq!(body["type"], "urn:dx:cat:AlreadyExists");
	assert_eq!(body["results"][0], serde_json::json!({
		"id": item_id,
		"method": "insert",
		"status": "failed",
		"detail": "Fail: Doc Exists",
	}));
	assert!(!backend.calls().iter().any(|call| matches!(call, Call::Create { .. })));
}

#[tokio::test]
async fn create_rejects_non_uuid_id() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let doc = object(serde_json::json!({ "id": "abc" }));
	let envelope = service.create_item(CreateItemRequest { doc }).await;

	assert_eq!(envelope.urn, Urn::InvalidUuid);
	assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn update_targets_the_backend_document_id() {
	let item_id = new_item_id();
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![hit("es-doc-7", serde_json::json!({ "id": item_id }))]));

	let service = service_with(&backend);
	let doc = object(serde_json::json!({ "id": item_id, "type": ["iudx:Provider"] }));
	let envelope = service.update_item(UpdateItemRequest { doc }).await;

	assert!(envelope.is_success());
	assert!(
		backend
			.calls()
			.iter()
			.any(|call| matches!(call, Call::Update { doc_id, .. } if doc_id == "es-doc-7"))
	);
}

#[tokio::test]
async fn update_of_missing_item_is_item_not_found() {
	let item_id = new_item_id();
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let doc = object(serde_json::json!({ "id": item_id, "type": ["iudx:Provider"] }));
	let envelope = service.update_item(UpdateItemRequest { doc }).await;

	assert_eq!(envelope.urn, Urn::ItemNotFound);
	assert_eq!(envelope.results()[0]["method"], "update");
	assert_eq!(envelope.results()[0]["status"], "failed");
}

#[tokio::test]
async fn delete_with_associated_items_is_not_allowed() {
	let item_id = new_item_id();
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![
		hit("d1", serde_json::json!({ "id": item_id })),
		hit("d2", serde_json::json!({ "id": "child", "resourceGroup": item_id })),
	]));

	let service = service_with(&backend);
	let envelope = service.delete_item(DeleteItemRequest { id: item_id.clone() }).await;

	assert_eq!(envelope.urn, Urn::OperationNotAllowed);
	assert_eq!(envelope.results()[0], serde_json::json!({
		"id": item_id,
		"detail": "Fail: Can't delete, doc has associated item",
	}));
	assert!(!backend.calls().iter().any(|call| matches!(call, Call::Delete { .. })));
}

#[tokio::test]
async fn delete_of_leaf_item_removes_its_document() {
	let item_id = new_item_id();
	let backend = RecordingBackend::new();

	backend.push_hits(hits(vec![hit("es-doc-9", serde_json::json!({ "id": item_id }))]));

	let service = service_with(&backend);
	let envelope = service.delete_item(DeleteItemRequest { id: item_id }).await;

	assert!(envelope.is_success());
	assert!(
		backend
			.calls()
			.iter()
			.any(|call| matches!(call, Call::Delete { doc_id, .. } if doc_id == "es-doc-9"))
	);
}

#[tokio::test]
async fn delete_of_missing_item_is_item_not_found() {
	let backend = RecordingBackend::new();
	let service = service_with(&backend);
	let envelope = service.delete_item(DeleteItemRequest { id: new_item_id() }).await;

	assert_eq!(envelope.urn, Urn::ItemNotFound);
	assert_eq!(envelope.detail.as_deref(), Some("Fail: Doc doesn't exist, can't delete"));
}
