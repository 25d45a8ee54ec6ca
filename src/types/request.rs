//! Request type definitions
//!
//! Request bodies, signed payloads and the typed parameters of the
//! endpoints that dispatch on a kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Body of a POST request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Parameters that are signed before sending
    Signed(Map<String, Value>),
    /// Form string sent verbatim
    Form(String),
}

/// A signed request body, ready to be POSTed
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    /// Endpoint path relative to the API base
    pub endpoint: String,
    /// Parameters that were signed
    pub body_params: Map<String, Value>,
    /// Canonical JSON text of `body_params`
    pub payload: String,
    /// Hex HMAC-SHA256 of `payload`
    pub signature: String,
    /// Wire body: `ig_sig_key_version=<v>&signed_body=<signature>.<urlencoded payload>`
    pub body: String,
}

/// Which side of the social graph to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowListKind {
    Followers,
    Followings,
}

impl FollowListKind {
    /// Counter field of `users/<id>/info/` holding the list size
    pub fn count_key(self) -> &'static str {
        match self {
            Self::Followers => "follower_count",
            Self::Followings => "following_count",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Followings => "followings",
        }
    }
}

impl FromStr for FollowListKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "followers" => Ok(Self::Followers),
            "followings" => Ok(Self::Followings),
            other => Err(crate::Error::internal(format!(
                "unknown follow list kind '{}', expected 'followers' or 'followings'",
                other
            ))),
        }
    }
}

/// Item sent through direct messages
#[derive(Debug, Clone, PartialEq)]
pub enum DirectItem {
    /// Text with links
    Links { text: String, urls: Vec<String> },
    /// Plain text
    Message { text: String },
    /// Share of an existing post
    MediaShare {
        media_type: String,
        text: String,
        media_id: String,
    },
    /// A heart
    Like,
    /// Share of a hashtag page
    Hashtag { text: String, hashtag: String },
    /// Share of a profile
    Profile {
        profile_user_id: String,
        text: String,
    },
}

impl DirectItem {
    /// Plain text message
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    /// Share a photo post with an optional comment
    pub fn media_share(media_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::MediaShare {
            media_type: "photo".to_string(),
            text: text.into(),
            media_id: media_id.into(),
        }
    }

    /// Wire tag of this item kind
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Links { .. } => "links",
            Self::Message { .. } => "message",
            Self::MediaShare { .. } => "media_share",
            Self::Like => "like",
            Self::Hashtag { .. } => "hashtag",
            Self::Profile { .. } => "profile",
        }
    }

    /// Broadcast endpoint for this item kind
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Links { .. } => "direct_v2/threads/broadcast/link/",
            Self::Message { .. } => "direct_v2/threads/broadcast/text/",
            Self::MediaShare { .. } => "direct_v2/threads/broadcast/media_share/",
            Self::Like => "direct_v2/threads/broadcast/like/",
            Self::Hashtag { .. } => "direct_v2/threads/broadcast/hashtag/",
            Self::Profile { .. } => "direct_v2/threads/broadcast/profile/",
        }
    }

    /// Write the item specific fields into `data`
    pub fn write_fields(&self, data: &mut Map<String, Value>) -> crate::Result<()> {
        match self {
            Self::Links { text, urls } => {
                data.insert("link_text".into(), text.clone().into());
                data.insert("link_urls".into(), serde_json::to_string(urls)?.into());
            }
            Self::Message { text } => {
                data.insert("text".into(), text.clone().into());
            }
            Self::MediaShare {
                media_type,
                text,
                media_id,
            } => {
                data.insert("media_type".into(), media_type.clone().into());
                data.insert("text".into(), text.clone().into());
                data.insert("media_id".into(), media_id.clone().into());
            }
            Self::Like => {}
            Self::Hashtag { text, hashtag } => {
                data.insert("text".into(), text.clone().into());
                data.insert("hashtag".into(), hashtag.clone().into());
            }
            Self::Profile {
                profile_user_id,
                text,
            } => {
                data.insert("profile_user_id".into(), profile_user_id.clone().into());
                data.insert("text".into(), text.clone().into());
            }
        }
        Ok(())
    }
}

/// Existing thread a direct item is posted into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTarget {
    pub id: String,
    /// Render as `["id"]` instead of `[id]`
    pub quoted: bool,
}

impl ThreadTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quoted: false,
        }
    }

    pub fn quoted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quoted: true,
        }
    }

    fn render(&self) -> String {
        if self.quoted {
            format!("[\"{}\"]", self.id)
        } else {
            format!("[{}]", self.id)
        }
    }
}

/// Recipient fields of a direct item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients {
    /// `[[id1,id2]]`
    pub users: String,
    /// `[id]` or `["id"]`
    pub thread: Option<String>,
}

impl Recipients {
    /// Render the recipient list, keeping the caller's order
    pub fn prepare<S: AsRef<str>>(
        users: &[S],
        thread: Option<&ThreadTarget>,
    ) -> crate::Result<Self> {
        if users.is_empty() {
            return Err(crate::Error::invalid_recipients(
                "at least one recipient user id is required",
            ));
        }
        if let Some(bad) = users.iter().map(AsRef::as_ref).find(|u| u.trim().is_empty()) {
            return Err(crate::Error::invalid_recipients(format!(
                "empty user id in recipient list: {:?}",
                bad
            )));
        }

        let joined = users
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");

        Ok(Self {
            users: format!("[[{}]]", joined),
            thread: thread.map(ThreadTarget::render),
        })
    }
}
