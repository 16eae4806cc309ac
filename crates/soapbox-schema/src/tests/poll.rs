use serde_json::json;

use super::assert_idempotent;
use crate::{Normalize, Poll};

#[test]
fn test_logged_out_poll_defaults() {
    let poll = Poll::normalize(&json!({
        "id": "p1",
        "options": [{ "title": "Apples" }, { "title": "Oranges" }],
    }));
    assert!(!poll.voted);
    assert!(poll.own_votes.is_none());
    assert_eq!(poll.voters_count, 0);
    assert_eq!(poll.votes_count, 0);
    assert!(!poll.expired);
    assert!(!poll.multiple);
    assert!(poll.options.iter().all(|option| option.votes_count == 0));
}

#[test]
fn test_empty_own_votes_reads_as_null() {
    let poll = Poll::normalize(&json!({ "id": "p1", "voted": true, "own_votes": [] }));
    assert!(poll.own_votes.is_none());
    let poll = Poll::normalize(&json!({ "id": "p1", "voted": true, "own_votes": [1] }));
    assert_eq!(poll.own_votes, Some(vec![1]));
}

#[test]
fn test_option_titles_are_emojified() {
    let poll = Poll::normalize(&json!({
        "id": "p1",
        "options": [{ "title": "Team :soapbox: & co", "votes_count": 3 }],
        "emojis": [{ "shortcode": "soapbox", "url": "https://x.test/soapbox.png" }],
    }));
    let option = &poll.options[0];
    assert_eq!(option.votes_count, 3);
    assert!(option.title_emojified.starts_with("Team <img"));
    assert!(option.title_emojified.ends_with(" &amp; co"));
}

#[test]
fn test_poll_normalization_is_idempotent() {
    assert_idempotent::<Poll>(&json!({
        "id": "p1",
        "expires_at": "2022-03-01T00:00:00.000Z",
        "options": [{ "title": ":soapbox:" }],
        "emojis": [{ "shortcode": "soapbox", "url": "https://x.test/soapbox.png" }],
    }));
}
