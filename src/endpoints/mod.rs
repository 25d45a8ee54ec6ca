//! Endpoint catalog
//!
//! Each method maps one action to an endpoint path and parameter set and makes
//! a single request. Writes are signed POSTs carrying the default
//! `{_uuid, _uid, _csrftoken}` triple; reads are GETs. Paginated reads take a
//! `max_id` cursor where `""` is the first page.

pub mod accounts;
pub mod direct;
pub mod feed;
pub mod friendships;
pub mod media;
pub mod totals;
pub mod users;

pub use accounts::ProfileEdit;

use urlencoding::encode;

/// Percent-encode a value placed in a path segment or query string
pub(crate) fn q(value: &str) -> std::borrow::Cow<'_, str> {
    encode(value)
}
