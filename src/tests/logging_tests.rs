use serde_json::json;

use crate::core::errors::LedgerError;
use crate::core::models::Role;
use crate::infrastructure::logging::{LogEvent, LoggingService, in_memory::InMemoryLogging};
use crate::tests::{create_test_group, create_test_service, equal_split, new_expense};

fn event<'a>(action: &'a str, member_id: &'a str) -> LogEvent<'a> {
    LogEvent {
        action,
        group_id: Some("g1"),
        member_id: Some(member_id),
        details: json!({ "group_id": "g1" }),
    }
}

#[tokio::test]
async fn test_record_returns_stored_entry() {
    let logging = InMemoryLogging::new();
    let entry = logging.record(event("EXPENSE_ADDED", "alice")).await.unwrap();
    assert_eq!(entry.group_id.as_deref(), Some("g1"));
    assert_eq!(entry.details["group_id"], "g1");

    let logs = logging.logs_for_member("alice").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, entry.id);
}

#[tokio::test]
async fn test_oldest_entries_dropped_at_capacity() {
    let logging = InMemoryLogging::with_capacity(2);
    for action in ["FIRST", "SECOND", "THIRD"] {
        logging.record(event(action, "alice")).await.unwrap();
    }
    let actions: Vec<String> = logging
        .logs_for_member("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.action)
        .collect();
    assert_eq!(actions, vec!["SECOND", "THIRD"]);
}

#[tokio::test]
async fn test_details_must_be_an_object() {
    let logging = InMemoryLogging::new();
    let result = logging
        .record(LogEvent {
            action: "GROUP_CREATED",
            group_id: None,
            member_id: None,
            details: json!(["not", "an", "object"]),
        })
        .await;
    assert!(matches!(result, Err(LedgerError::LoggingError(_))));
}

#[tokio::test]
async fn test_app_logs_follow_the_actor_across_groups() {
    let service = create_test_service();
    let trip = create_test_group(&service, "alice", &[("bob", Role::Member)]).await;
    let flat = create_test_group(&service, "bob", &[]).await;
    service
        .add_expense(&trip.id, new_expense("bob", 100, equal_split(&["alice", "bob"])), "bob")
        .await
        .unwrap();

    let bob_logs = service.get_app_logs("bob").await.unwrap();
    let groups: Vec<&str> = bob_logs.iter().filter_map(|l| l.group_id.as_deref()).collect();
    assert_eq!(groups, vec![flat.id.as_str(), trip.id.as_str()]);
    assert!(bob_logs.iter().all(|l| l.member_id.as_deref() == Some("bob")));

    assert_eq!(service.get_app_logs("alice").await.unwrap().len(), 1);
}
