use entity_store::Entity;
use serde_json::json;

use super::{STATUS_MENTIONS_REPLY, assert_idempotent, fixture};
use crate::{Normalize, Notification};

#[test]
fn test_empty_notification_defaults() {
    let notification = Notification::normalize(&json!({}));
    assert_eq!(notification.id, "");
    assert_eq!(notification.kind, "");
    assert!(notification.account.is_none());
    assert!(notification.target.is_none());
    assert!(notification.status.is_none());
}

#[test]
fn test_mention_notification() {
    let status = fixture(STATUS_MENTIONS_REPLY);
    let notification = Notification::normalize(&json!({
        "id": "n1",
        "type": "mention",
        "created_at": "2021-05-30T19:55:41.000Z",
        "account": status["account"].clone(),
        "status": status,
    }));
    assert!(notification.is_known_kind());
    assert_eq!(notification.account.as_ref().unwrap().acct, "alex");
    assert_eq!(notification.status.as_ref().unwrap().mentions.len(), 4);
    // account, status, plus the status' own author
    let related = notification.related();
    assert_eq!(related.len(), 2);
    assert_eq!(related[1].related().len(), 1);
}

#[test]
fn test_unknown_kind_is_kept() {
    let notification = Notification::normalize(&json!({ "id": "n2", "type": "ditto:zap" }));
    assert_eq!(notification.kind, "ditto:zap");
    assert!(!notification.is_known_kind());
}

#[test]
fn test_notification_normalization_is_idempotent() {
    assert_idempotent::<Notification>(&json!({}));
    assert_idempotent::<Notification>(&json!({
        "id": "n3",
        "type": "pleroma:emoji_reaction",
        "emoji": "🔥",
        "account": { "id": "1" },
        "status": { "id": "2", "account": { "id": "1" } },
    }));
}
