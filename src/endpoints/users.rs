//! User lookup and search endpoints

use super::q;
use crate::api::{InstagramApiGeneric, backoff::Sleeper};
use crate::types::ResponseEnvelope;
use crate::Result;

impl<S: Sleeper> InstagramApiGeneric<S> {
    /// Profile of a user by id
    pub async fn get_username_info(&self, user_id: &str) -> Result<ResponseEnvelope> {
        self.get(&format!("users/{}/info/", user_id)).await
    }

    /// Profile of the logged-in account
    pub async fn get_self_username_info(&self) -> Result<ResponseEnvelope> {
        let user_id = self.user_id().await;
        self.get_username_info(&user_id).await
    }

    /// Profile lookup by username
    pub async fn search_username(&self, username: &str) -> Result<ResponseEnvelope> {
        self.get(&format!("users/{}/usernameinfo/", q(username))).await
    }

    /// Search users by name
    pub async fn search_users(&self, query: &str) -> Result<ResponseEnvelope> {
        let url = format!(
            "users/search/?ig_sig_key_version={}&is_typeahead=true&query={}&rank_token={}",
            self.settings().api.sig_key_version,
            q(query),
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// Blended search over users, tags and places
    pub async fn fb_user_search(&self, query: &str) -> Result<ResponseEnvelope> {
        let url = format!(
            "fbsearch/topsearch/?context=blended&query={}&rank_token={}",
            q(query),
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// Search hashtags
    pub async fn search_tags(&self, query: &str) -> Result<ResponseEnvelope> {
        let url = format!(
            "tags/search/?is_typeahead=true&q={}&rank_token={}",
            q(query),
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// Place search, optionally near a coordinate
    pub async fn search_location(
        &self,
        query: &str,
        coordinates: Option<(f64, f64)>,
    ) -> Result<ResponseEnvelope> {
        let mut url = format!(
            "fbsearch/places/?rank_token={}&query={}",
            self.rank_token().await,
            q(query)
        );
        if let Some((lat, lng)) = coordinates {
            url.push_str(&format!("&lat={}&lng={}", lat, lng));
        }
        self.get(&url).await
    }
}
