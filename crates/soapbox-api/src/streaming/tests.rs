use entity_store::{Entities, EntityStore, ListImport};
use serde_json::json;
use soapbox_schema::{Announcement, Chat, Normalize, Status};

use super::*;

fn frame(event: &str, stream: &[&str], payload: Value) -> String {
    let payload = match payload {
        Value::Object(_) => Value::String(payload.to_string()),
        other => other,
    };
    json!({ "event": event, "stream": stream, "payload": payload }).to_string()
}

fn status(id: &str) -> Value {
    json!({ "id": id, "content": "<p>hi</p>", "account": { "id": "a1", "acct": "alex" } })
}

#[test]
fn parse_update_decodes_string_payload() {
    let message = StreamMessage::parse(&frame("update", &["user"], status("5"))).unwrap();
    assert_eq!(message.stream, ["user"]);
    match message.event {
        StreamEvent::Update(payload) => assert_eq!(payload["id"], "5"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn parse_delete_keeps_numeric_looking_id_as_string() {
    let message = StreamMessage::parse(&frame("delete", &["public"], json!("109"))).unwrap();
    assert_eq!(message.event, StreamEvent::Delete("109".into()));
}

#[test]
fn parse_announcement_reaction() {
    let payload = json!({ "name": "blobcat", "count": 3, "announcement_id": "8" });
    let message = StreamMessage::parse(&frame("announcement.reaction", &["user"], payload)).unwrap();
    assert_eq!(
        message.event,
        StreamEvent::AnnouncementReaction {
            announcement_id: "8".into(),
            name: "blobcat".into(),
            count: 3,
        }
    );
}

#[test]
fn parse_pleroma_chat_update_and_unknown_events() {
    let chat = json!({ "id": "c1", "account": { "id": "a2" } });
    let message = StreamMessage::parse(&frame("pleroma:chat_update", &["user"], chat)).unwrap();
    assert!(matches!(message.event, StreamEvent::ChatUpdate(_)));

    let message = StreamMessage::parse(&frame("filters_changed", &["user"], Value::Null)).unwrap();
    assert_eq!(message.event.name(), "filters_changed");
}

#[test]
fn parse_rejects_malformed_frames() {
    assert!(StreamMessage::parse("not json").is_err());
    assert!(StreamMessage::parse(&frame("delete", &["user"], Value::Null)).is_err());
    assert!(StreamMessage::parse(&frame("update", &["user"], json!("{broken"))).is_err());
}

#[test]
fn timeline_keys_match_fetched_list_keys() {
    let key = |stream: &[&str]| {
        let stream: Vec<String> = stream.iter().map(|s| s.to_string()).collect();
        timeline_key(&stream)
    };
    assert_eq!(key(&["user"]).as_deref(), Some("home"));
    assert_eq!(key(&["public"]).as_deref(), Some("public"));
    assert_eq!(key(&["public:local"]).as_deref(), Some("public:local"));
    assert_eq!(key(&["hashtag", "Rust"]).as_deref(), Some("hashtag:rust"));
    assert_eq!(key(&["list", "12"]).as_deref(), Some("list:12"));
    assert_eq!(key(&["direct"]), None);
    assert_eq!(key(&[]), None);
}

#[test]
fn streamed_status_goes_to_the_head_of_an_observed_timeline() {
    let store = EntityStore::new();
    store
        .import_list("home", vec![Status::normalize(&status("1"))], ListImport::Replace)
        .unwrap();
    let importer = StreamImporter::new(store.clone());

    let message = StreamMessage::parse(&frame("update", &["user"], status("2"))).unwrap();
    assert!(importer.apply(&message).unwrap());
    assert_eq!(store.list_ids(Entities::Statuses, "home").unwrap(), ["2", "1"]);

    // Same status again keeps its position.
    importer.apply(&message).unwrap();
    assert_eq!(store.list_ids(Entities::Statuses, "home").unwrap(), ["2", "1"]);
}

#[test]
fn streamed_status_does_not_create_unobserved_lists() {
    let store = EntityStore::new();
    let importer = StreamImporter::new(store.clone());
    let message = StreamMessage::parse(&frame("update", &["public"], status("3"))).unwrap();
    importer.apply(&message).unwrap();
    assert!(store.get::<Status>("3").unwrap().is_some());
    assert_eq!(store.list_state(Entities::Statuses, "public").unwrap(), None);
}

#[test]
fn delete_removes_status_from_every_list() {
    let store = EntityStore::new();
    let records = vec![Status::normalize(&status("1")), Status::normalize(&status("2"))];
    store.import_list("home", records.clone(), ListImport::Replace).unwrap();
    store.import_list("public", records, ListImport::Replace).unwrap();
    let importer = StreamImporter::new(store.clone());

    let message = StreamMessage::parse(&frame("delete", &["user"], json!("1"))).unwrap();
    assert!(importer.apply(&message).unwrap());
    assert_eq!(store.list_ids(Entities::Statuses, "home").unwrap(), ["2"]);
    assert_eq!(store.list_ids(Entities::Statuses, "public").unwrap(), ["2"]);
}

#[test]
fn invalid_streamed_record_is_dropped() {
    let store = EntityStore::new();
    let importer = StreamImporter::new(store.clone());
    let message = StreamMessage::parse(&frame("update", &["user"], json!({ "content": "x" }))).unwrap();
    assert!(!importer.apply(&message).unwrap());
    assert_eq!(store.count(Entities::Statuses).unwrap(), 0);
}

#[test]
fn reaction_updates_stored_announcement() {
    let store = EntityStore::new();
    store
        .import(Announcement::normalize(&json!({
            "id": "8",
            "content": "<p>hello</p>",
            "reactions": [{ "name": "👍", "count": 1, "me": true }]
        })))
        .unwrap();
    let importer = StreamImporter::new(store.clone());

    let event = |name: &str, count: u64| StreamMessage {
        stream: vec!["user".into()],
        event: StreamEvent::AnnouncementReaction {
            announcement_id: "8".into(),
            name: name.into(),
            count,
        },
    };
    assert!(importer.apply(&event("👍", 4)).unwrap());
    assert!(importer.apply(&event("🎉", 1)).unwrap());
    let announcement = store.get::<Announcement>("8").unwrap().unwrap();
    let reactions: Vec<(&str, u64, bool)> = announcement
        .reactions
        .iter()
        .map(|r| (r.name.as_str(), r.count, r.me))
        .collect();
    assert_eq!(reactions, [("👍", 4, true), ("🎉", 1, false)]);

    let missing = StreamMessage {
        stream: vec![],
        event: StreamEvent::AnnouncementReaction {
            announcement_id: "404".into(),
            name: "👍".into(),
            count: 1,
        },
    };
    assert!(!importer.apply(&missing).unwrap());
}

#[test]
fn chat_update_appends_last_message_to_the_chat_log() {
    let store = EntityStore::new();
    store
        .import_list::<soapbox_schema::ChatMessage>("chat:c1", vec![], ListImport::Replace)
        .unwrap();
    store.import_list::<Chat>("chats", vec![], ListImport::Replace).unwrap();
    let importer = StreamImporter::new(store.clone());

    let chat = json!({
        "id": "c1",
        "account": { "id": "a2", "acct": "bob" },
        "last_message": { "id": "m9", "chat_id": "c1", "account_id": "a2", "content": "yo" }
    });
    let message = StreamMessage::parse(&frame("chat_update", &["user"], chat)).unwrap();
    assert!(importer.apply(&message).unwrap());
    assert_eq!(store.list_ids(Entities::Chats, "chats").unwrap(), ["c1"]);
    assert_eq!(store.list_ids(Entities::ChatMessages, "chat:c1").unwrap(), ["m9"]);
}

#[test]
fn subscribe_frames_carry_stream_parameters() {
    assert_eq!(
        subscribe_frame("hashtag:rust"),
        json!({ "type": "subscribe", "stream": "hashtag", "tag": "rust" })
    );
    assert_eq!(
        subscribe_frame("list:12"),
        json!({ "type": "subscribe", "stream": "list", "list": "12" })
    );
    assert_eq!(
        subscribe_frame("public:local"),
        json!({ "type": "subscribe", "stream": "public:local" })
    );
}

#[test]
fn streaming_url_follows_base_scheme_and_hides_token() {
    let base = Url::parse("https://example.com/").unwrap();
    let config = StreamingConfig::new(&base, Some("secret".into()), vec!["user".into()]).unwrap();
    assert_eq!(config.streaming_url.as_str(), "wss://example.com/api/v1/streaming");
    assert_eq!(
        config.socket_url().as_str(),
        "wss://example.com/api/v1/streaming?access_token=secret"
    );

    let local = Url::parse("http://localhost:4000").unwrap();
    let config = StreamingConfig::new(&local, Some(String::new()), vec![]).unwrap();
    assert_eq!(config.socket_url().as_str(), "ws://localhost:4000/api/v1/streaming");
}

#[test]
fn advertised_streaming_host_wins() {
    let instance = Instance::normalize(&json!({
        "uri": "example.com",
        "urls": { "streaming_api": "wss://streaming.example.com" }
    }));
    let base = Url::parse("https://example.com").unwrap();
    let config = StreamingConfig::for_instance(&instance, &base, None, vec![]).unwrap();
    assert_eq!(
        config.streaming_url.as_str(),
        "wss://streaming.example.com/api/v1/streaming"
    );
}

#[test]
fn reconnect_delay_doubles_up_to_the_cap() {
    let mut reconnect = Reconnect::default();
    let delays: Vec<Option<Duration>> = (0..MAX_ATTEMPTS)
        .map(|_| reconnect.after_failure(Duration::ZERO))
        .collect();
    assert_eq!(delays[0], Some(Duration::from_secs(2)));
    assert_eq!(delays[1], Some(Duration::from_secs(4)));
    assert_eq!(delays[3], Some(Duration::from_secs(16)));
    assert_eq!(delays[6], Some(MAX_BACKOFF));
    assert_eq!(delays[7], None);
}

#[test]
fn stable_connection_resets_reconnect_attempts() {
    let mut reconnect = Reconnect::default();
    for _ in 0..5 {
        reconnect.after_failure(Duration::from_secs(1));
    }
    assert_eq!(reconnect.attempts, 5);
    assert_eq!(
        reconnect.after_failure(STABLE_CONNECTION),
        Some(Duration::from_secs(2))
    );
    assert_eq!(reconnect.attempts, 1);
}

#[test]
fn auth_failures_stop_reconnecting() {
    assert!(StreamingClient::is_auth_error(&ApiError::Status {
        status: 401,
        message: String::new(),
    }));
    assert!(!StreamingClient::is_auth_error(&ApiError::Timeout));
}

#[tokio::test]
async fn connect_requires_at_least_one_stream() {
    let base = Url::parse("https://example.com").unwrap();
    let config = StreamingConfig::new(&base, None, vec![]).unwrap();
    assert!(StreamingClient::connect(config).await.is_err());
}
