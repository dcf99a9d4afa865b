/// Status store tests
///
/// Get/set of current status documents, data key escaping and entity
/// lifecycle ops.
/// Run with: cargo test --test status_tests

mod common;

use common::{create_entity, new_state};
use serde_json::json;
use statusdb::core::has_reserved_keys;
use statusdb::prelude::*;
use statusdb::{Op, Precondition};

#[tokio::test]
async fn test_set_then_get_round_trips_data() {
    let state = new_state();
    let key = GlobalKey::unit("mysql/0");
    create_entity(&state, &key).await;

    let data = status_data_from_json(json!({
        "disk.usage": {"/var/lib$": 0.75},
        "$ref": "volume-1",
        "ports": [80, 443]
    }));
    state
        .set_status(
            SetStatusParams::new(&key, "unit", Status::Active)
                .message("serving")
                .data(data.clone()),
        )
        .await
        .unwrap();

    let info = state.get_status(&key, "unit").await.unwrap();
    assert_eq!(info.status, Status::Active);
    assert_eq!(info.message, "serving");
    assert_eq!(info.data, data);
    let since = info.since.expect("set_status stamps the time");
    assert_eq!(since.timestamp_subsec_nanos(), 0);
}

#[tokio::test]
async fn test_stored_data_keys_are_escaped() {
    let state = new_state();
    create_entity(&state, "m#0").await;

    state
        .set_status(
            SetStatusParams::new("m#0", "machine", Status::Error)
                .data(status_data_from_json(json!({"a.b": {"c$": 1}}))),
        )
        .await
        .unwrap();

    let id = state.statuses().doc_id("m#0");
    let stored = state.store().find_status(&id).await.unwrap().unwrap();
    assert!(!has_reserved_keys(&stored.doc.status_data));
    assert!(stored.doc.status_data.contains_key("a\u{ff0e}b"));
}

#[tokio::test]
async fn test_get_missing_status_uses_badge() {
    let state = new_state();

    let err = state.get_status("u#ghost/0", "unit").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.badge(), Some("unit"));
    assert_eq!(err.to_string(), "cannot get status: unit not found");
}

#[tokio::test]
async fn test_set_missing_status_is_not_found() {
    let state = new_state();

    let err = state
        .set_status(SetStatusParams::new("u#ghost/0", "unit", Status::Active))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "cannot set status: unit not found");
    assert!(state.get_status("u#ghost/0", "unit").await.is_err());
}

#[tokio::test]
async fn test_removed_entity_status_is_not_found() {
    let state = new_state();
    create_entity(&state, "u#wordpress/1").await;
    state
        .set_status(SetStatusParams::new("u#wordpress/1", "unit", Status::Active))
        .await
        .unwrap();

    state
        .run_transaction(state.remove_status_op("u#wordpress/1"))
        .await
        .unwrap();

    let err = state.get_status("u#wordpress/1", "wordpress/1").await.unwrap_err();
    assert_eq!(err.badge(), Some("wordpress/1"));
    assert!(err.to_string().contains("wordpress/1 not found"));
}

#[tokio::test]
async fn test_insert_op_is_insert_if_absent() {
    let state = new_state();
    create_entity(&state, "a#mysql").await;

    let again = state
        .insert_status_op("a#mysql", StatusDoc::new(Status::Unknown, ""))
        .await;
    assert!(matches!(again.preconditions(), [Precondition::DocMissing { .. }]));
    assert!(matches!(again.ops(), [Op::Insert { .. }]));

    let err = state.run_transaction(again).await.unwrap_err();
    assert!(matches!(err, StatusError::Store { .. }));

    let info = state.get_status("a#mysql", "application").await.unwrap();
    assert_eq!(info.status, Status::Pending);
}

#[tokio::test]
async fn test_insert_op_combines_with_caller_transaction() {
    let state = new_state();

    let request = state
        .insert_status_op("m#1", StatusDoc::new(Status::Pending, ""))
        .await
        .with(state.insert_status_op("m#1/lxd/0", StatusDoc::new(Status::Pending, "")).await);
    state.run_transaction(request).await.unwrap();

    assert!(state.get_status("m#1", "machine").await.is_ok());
    assert!(state.get_status("m#1/lxd/0", "container").await.is_ok());
}

#[tokio::test]
async fn test_never_set_cleared_by_first_write() {
    let state = new_state();
    let op = state
        .insert_status_op("a#wordpress", StatusDoc::new(Status::Unknown, "").never_set())
        .await;
    state.run_transaction(op).await.unwrap();

    let doc = state.get_status_doc("a#wordpress", "application").await.unwrap();
    assert!(doc.never_set);
    assert_eq!(doc.env_uuid, "env-test");

    state
        .set_status(SetStatusParams::new("a#wordpress", "application", Status::Active))
        .await
        .unwrap();

    let doc = state.get_status_doc("a#wordpress", "application").await.unwrap();
    assert!(!doc.never_set);
}

#[tokio::test]
async fn test_environments_sharing_a_store_are_isolated() {
    let store: std::sync::Arc<dyn DocumentStore> = std::sync::Arc::new(InMemoryStore::new());
    let first = State::with_store(StatusConfig::new("env-a"), store.clone()).unwrap();
    let second = State::with_store(StatusConfig::new("env-b"), store).unwrap();

    create_entity(&first, "m#0").await;

    assert!(first.get_status("m#0", "machine").await.is_ok());
    assert!(second.get_status("m#0", "machine").await.unwrap_err().is_not_found());
    assert!(second.status_history("m#0", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_environments_with_own_history_counters_keep_their_history() {
    let store: std::sync::Arc<dyn DocumentStore> = std::sync::Arc::new(InMemoryStore::new());
    let first = State::with_store(
        StatusConfig::new("env-a").history_sequence("hist-a"),
        store.clone(),
    )
    .unwrap();
    let second = State::with_store(
        StatusConfig::new("env-b").history_sequence("hist-b"),
        store,
    )
    .unwrap();

    create_entity(&first, "m#0").await;
    create_entity(&second, "m#0").await;
    second
        .set_status(SetStatusParams::new("m#0", "machine", Status::Started).message("up"))
        .await
        .unwrap();

    let history = second.status_history("m#0", 0).await.unwrap();
    let messages: Vec<&str> = history.iter().map(|info| info.message.as_str()).collect();
    assert_eq!(messages, vec!["up", "waiting for machine"]);
    assert_eq!(first.status_history("m#0", 0).await.unwrap().len(), 1);

    second.prune_status_history(1).await.unwrap();
    assert_eq!(first.status_history("m#0", 0).await.unwrap().len(), 1);
    assert_eq!(second.status_history("m#0", 0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let result = State::open(StatusConfig::new("env").max_history_per_entity(0));
    assert!(matches!(result, Err(StatusError::InvalidArgument(_))));
}
