use std::sync::Arc;

use formation::records::{
    CollectionKind, Fields, InMemoryRecordRepository, RecordRepository, RecordService,
    RecordServiceError,
};
use serde_json::{json, Value};

fn body(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn draft_lifecycle_from_creation_to_deletion() {
    let repository = Arc::new(InMemoryRecordRepository::default());
    let service = RecordService::new(repository.clone());

    let draft = service
        .create(
            CollectionKind::Drafts,
            body(json!({ "companyName": "Acme Ltd", "step": 1 })),
        )
        .expect("draft created");
    let id = draft["id"].as_i64().expect("numeric id").to_string();

    let updated = service
        .update(CollectionKind::Drafts, &id, body(json!({ "step": 2 })))
        .expect("draft updated");
    assert_eq!(updated["step"], json!(2));
    assert_eq!(updated["companyName"], json!("Acme Ltd"));
    assert_eq!(updated["status"], json!("draft"));

    let company = service
        .create(
            CollectionKind::Companies,
            body(json!({ "companyName": updated["companyName"].clone() })),
        )
        .expect("company created");
    assert_eq!(company["status"], json!("submitted"));
    assert_ne!(company["id"], updated["id"]);

    service
        .delete(CollectionKind::Drafts, &id)
        .expect("draft deleted");
    assert!(matches!(
        service.get(CollectionKind::Drafts, &id),
        Err(RecordServiceError::NotFound(CollectionKind::Drafts))
    ));

    assert_eq!(repository.list(CollectionKind::Companies).unwrap().len(), 1);
    assert!(repository.list(CollectionKind::Drafts).unwrap().is_empty());
    assert!(repository
        .list(CollectionKind::Submissions)
        .unwrap()
        .is_empty());
}

#[test]
fn records_serialize_as_plain_json_objects() {
    let service = RecordService::new(Arc::new(InMemoryRecordRepository::default()));
    let submission = service
        .create(CollectionKind::Submissions, body(json!({ "ref": "S-1" })))
        .expect("submission created");

    let encoded = serde_json::to_value(&submission).expect("serializes");
    let object = encoded.as_object().expect("object");
    assert_eq!(object["ref"], json!("S-1"));
    assert!(object["submittedAt"].is_string());
}
