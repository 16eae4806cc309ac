use entity_store::{Entities, Entity};
use serde_json::json;

use super::{STATUS_MENTIONS_REPLY, assert_idempotent, fixture};
use crate::{AVATAR_MISSING, Account, HEADER_MISSING, Mention, Normalize, Relationship};

#[test]
fn test_empty_account_defaults() {
    let account = Account::normalize(&json!({}));
    assert_eq!(account.avatar, AVATAR_MISSING);
    assert_eq!(account.avatar_static, AVATAR_MISSING);
    assert_eq!(account.header, HEADER_MISSING);
    assert_eq!(account.header_static, HEADER_MISSING);
    assert!(account.fields.is_empty());
    assert!(account.relationship.is_none());
    assert!(!account.admin);
    assert!(account.local);
}

#[test]
fn test_display_name_falls_back_to_username() {
    let account = Account::normalize(&json!({ "id": "1", "username": "alex", "display_name": "  " }));
    assert_eq!(account.display_name, "alex");
    assert_eq!(account.display_name_html, "alex");
}

#[test]
fn test_display_name_html_is_escaped_and_emojified() {
    let status = fixture(STATUS_MENTIONS_REPLY);
    let account = Account::normalize(&status["account"]);
    assert!(account.display_name_html.starts_with("Alex Gleason <img"));

    let escaped = Account::normalize(&json!({ "display_name": "<script>" }));
    assert_eq!(escaped.display_name_html, "&lt;script&gt;");
}

#[test]
fn test_static_images_fall_back_to_main_images() {
    let account = Account::normalize(&json!({
        "avatar": "https://x.test/a.gif",
        "header": "https://x.test/h.gif",
    }));
    assert_eq!(account.avatar_static, "https://x.test/a.gif");
    assert_eq!(account.header_static, "https://x.test/h.gif");
}

#[test]
fn test_pleroma_extension_is_folded() {
    let account = Account::normalize(&json!({
        "id": "1",
        "acct": "alex@gleasonator.com",
        "pleroma": {
            "is_admin": true,
            "is_local": false,
            "deactivated": true,
            "tags": ["verified"],
            "relationship": { "id": "1", "following": true },
        },
    }));
    assert!(account.admin);
    assert!(account.staff);
    assert!(!account.moderator);
    assert!(!account.local);
    assert!(account.suspended);
    assert!(account.verified);
    assert_eq!(account.fqn, "alex@gleasonator.com");
    assert_eq!(account.domain, "gleasonator.com");
    assert!(account.relationship.as_ref().unwrap().following);
    assert!(!account.pleroma.contains_key("relationship"));
}

#[test]
fn test_embedded_relationship_is_related() {
    let account = Account::normalize(&json!({
        "id": "1",
        "pleroma": { "relationship": { "id": "1", "blocking": true } },
    }));
    let related = account.related();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].entity(), Entities::Relationships);
}

#[test]
fn test_fields_are_derived() {
    let account = Account::normalize(&json!({
        "fields": [
            { "name": "Site :blob:", "value": "<a href=\"https://x.test\">x.test</a>", "verified_at": "soon" },
            "bogus",
        ],
        "emojis": [{ "shortcode": "blob", "url": "https://x.test/blob.png" }],
    }));
    assert_eq!(account.fields.len(), 1);
    let field = &account.fields[0];
    assert!(field.name_emojified.starts_with("Site <img"));
    assert_eq!(field.value_plain, "x.test");
    assert!(field.verified_at.is_none());
}

#[test]
fn test_relationship_defaults() {
    let relationship = Relationship::normalize(&json!({ "id": "1", "following": "yes" }));
    assert!(!relationship.following);
    assert!(!relationship.blocking);
    assert_eq!(relationship.note, "");
}

#[test]
fn test_mention_username_from_acct() {
    let mention: Mention = serde_json::from_value(json!({ "acct": "alex@gleasonator.com" })).unwrap();
    assert_eq!(mention.username, "alex");
    assert_eq!(mention.id, "");
    assert_eq!(mention.url, "");
}

#[test]
fn test_account_normalization_is_idempotent() {
    let status = fixture(STATUS_MENTIONS_REPLY);
    assert_idempotent::<Account>(&status["account"]);
    assert_idempotent::<Account>(&json!({}));
    assert_idempotent::<Account>(&json!({
        "id": "1",
        "acct": "a@b.c",
        "moved": { "id": "2", "acct": "a@d.e" },
        "source": { "pleroma": { "discoverable": true } },
    }));
}
