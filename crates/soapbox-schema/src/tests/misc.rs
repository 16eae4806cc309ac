use serde_json::json;

use super::{MITRA_ATTACHMENTS, assert_idempotent, fixture};
use crate::{
    Announcement, Attachment, AttachmentType, Card, CardType, Chat, ChatMessage, Group, GroupMember,
    GroupRole, Normalize, Tag,
};

#[test]
fn test_mitra_attachments() {
    let raw = fixture(MITRA_ATTACHMENTS);
    let attachments: Vec<Attachment> = raw
        .as_array()
        .unwrap()
        .iter()
        .map(Attachment::normalize)
        .collect();

    assert_eq!(attachments[0].kind, AttachmentType::Image);
    assert_eq!(attachments[0].preview_url, attachments[0].url);
    assert!(attachments[0].remote_url.is_none());

    assert_eq!(attachments[1].kind, AttachmentType::Unknown);
    assert_eq!(attachments[1].url, "https://mitra.social/media/4d5e6f.pdf");

    // Pleroma metadata is left alone.
    assert!(attachments[2].meta.is_empty());
    assert_eq!(attachments[2].mime_type(), Some("application/x-nes-rom"));
}

#[test]
fn test_attachment_url_falls_back_to_remote_url() {
    let attachment = Attachment::normalize(&json!({
        "id": "1",
        "type": "video",
        "url": "",
        "remote_url": "https://remote.test/v.mp4",
    }));
    assert_eq!(attachment.url, "https://remote.test/v.mp4");
    assert_eq!(attachment.preview_url, "https://remote.test/v.mp4");
    assert_eq!(attachment.kind, AttachmentType::Video);
}

#[test]
fn test_attachment_normalization_is_idempotent() {
    for raw in fixture(MITRA_ATTACHMENTS).as_array().unwrap() {
        assert_idempotent::<Attachment>(raw);
    }
}

#[test]
fn test_card_provider_url_from_origin() {
    let card = Card::normalize(&json!({
        "url": "https://soapbox.pub/blog/mostr-fediverse-nostr-bridge/",
        "title": "Bridging Nostr and the Fediverse",
        "type": "article",
    }));
    assert_eq!(card.provider_url, "https://soapbox.pub");
    assert_eq!(card.kind, CardType::Link);
    assert!(card.image.is_none());

    let card = Card::normalize(&json!({ "url": "not a url" }));
    assert_eq!(card.provider_url, "");
}

#[test]
fn test_group_defaults_and_truthsocial_quirks() {
    let group = Group::normalize(&json!({
        "id": "g1",
        "display_name": "Rustaceans :ferris:",
        "note": "<p></p>",
        "group_visibility": "members_only",
        "emojis": [{ "shortcode": "ferris", "url": "https://x.test/ferris.png" }],
    }));
    assert_eq!(group.note, "");
    assert_eq!(group.note_plain, "");
    assert!(group.locked);
    assert_eq!(group.statuses_visibility, "public");
    assert!(group.display_name_html.starts_with("Rustaceans <img"));

    let open = Group::normalize(&json!({ "id": "g2" }));
    assert!(!open.locked);
    assert_eq!(open.group_visibility, "everyone");
}

#[test]
fn test_group_member_role_defaults_to_user() {
    let member = GroupMember::normalize(&json!({ "id": "m1", "account": { "id": "a1" }, "role": "emperor" }));
    assert_eq!(member.role, GroupRole::User);
    assert_eq!(member.account.id, "a1");
}

#[test]
fn test_group_normalization_is_idempotent() {
    assert_idempotent::<Group>(&json!({
        "id": "g1",
        "note": "<p>About us</p>",
        "tags": [{ "id": "t1", "name": "rust" }],
        "relationship": { "id": "g1", "member": true, "role": "owner" },
    }));
}

#[test]
fn test_chat_defaults() {
    let chat = Chat::normalize(&json!({
        "id": "c1",
        "account": { "id": "a1" },
        "updated_at": "2022-01-01T00:00:00.000Z",
    }));
    assert_eq!(chat.unread, 0);
    assert!(chat.accepted);
    assert_eq!(chat.chat_type, "direct");
    assert_eq!(chat.created_at, "2022-01-01T00:00:00.000Z");
    assert!(chat.last_message.is_none());
}

#[test]
fn test_chat_message_attachment_and_html() {
    let message = ChatMessage::normalize(&json!({
        "id": "m1",
        "chat_id": "c1",
        "account_id": 5,
        "content": "hello :wave:",
        "emojis": [{ "shortcode": "wave", "url": "https://x.test/wave.png" }],
        "media_attachments": [{ "id": "a1", "type": "image", "url": "https://x.test/1.png" }],
    }));
    assert_eq!(message.account_id, "5");
    assert!(message.content_html.starts_with("hello <img"));
    assert_eq!(message.attachment.as_ref().unwrap().id, "a1");
    assert!(message.card.is_none());
    assert_idempotent::<ChatMessage>(&serde_json::to_value(&message).unwrap());
}

#[test]
fn test_tag_history() {
    let tag = Tag::normalize(&json!({
        "name": "rust",
        "url": "https://x.test/tags/rust",
        "history": [
            { "day": "1574553600", "uses": "9", "accounts": "4" },
            { "day": "1574467200", "uses": "3", "accounts": "2" },
        ],
    }));
    assert_eq!(tag.uses(), 12);
    assert!(!tag.following);

    let bare = Tag::normalize(&json!({ "name": "rust", "history": "bogus" }));
    assert!(bare.history.is_none());
    assert!(Tag::parse(&json!({ "url": "x" })).is_err());
}

#[test]
fn test_announcement_reactions_get_emoji_urls() {
    let mut announcement = Announcement::normalize(&json!({
        "id": "1",
        "content": "<p>Maintenance tonight :soapbox:</p>",
        "published_at": "2022-01-01T00:00:00.000Z",
        "reactions": [{ "name": "soapbox", "count": 2, "me": true }, { "name": "👍", "count": 1 }],
        "emojis": [{ "shortcode": "soapbox", "url": "https://x.test/soapbox.png" }],
    }));
    assert!(announcement.content_html.contains("<img"));
    assert_eq!(announcement.reactions[0].url.as_deref(), Some("https://x.test/soapbox.png"));
    assert!(announcement.reactions[1].url.is_none());

    announcement.update_reaction("👍", 0);
    announcement.update_reaction("soapbox", 5);
    announcement.update_reaction("🎉", 1);
    let counts: Vec<(&str, u64)> = announcement
        .reactions
        .iter()
        .map(|r| (r.name.as_str(), r.count))
        .collect();
    assert_eq!(counts, vec![("soapbox", 5), ("🎉", 1)]);
    assert!(announcement.reactions[0].me);
}
