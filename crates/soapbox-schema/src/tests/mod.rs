use serde::Serialize;
use serde_json::Value;

use crate::Normalize;

mod account;
mod misc;
mod notification;
mod poll;

pub(crate) const STATUS_MENTIONS_REPLY: &str = include_str!("fixtures/status-mentions-reply.json");
pub(crate) const PLEROMA_QUOTE_POST: &str = include_str!("fixtures/pleroma-quote-post.json");
pub(crate) const MITRA_ATTACHMENTS: &str = include_str!("fixtures/mitra-attachments.json");

pub(crate) fn fixture(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

/// Normalize, serialize and normalize again; both passes must agree.
pub(crate) fn assert_idempotent<T>(raw: &Value)
where
    T: Normalize + Serialize + PartialEq + std::fmt::Debug,
{
    let once = T::normalize(raw);
    let serialized = serde_json::to_value(&once).unwrap();
    let twice = T::normalize(&serialized);
    assert_eq!(once, twice);
}
