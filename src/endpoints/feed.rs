//! Feed, activity and discovery endpoints

use super::q;
use crate::api::{InstagramApiGeneric, backoff::Sleeper};
use crate::types::ResponseEnvelope;
use crate::Result;

/// `feed/user/{id}/` query; `min_timestamp` is left out when unset
fn user_feed_path(
    user_id: &str,
    max_id: &str,
    min_timestamp: Option<i64>,
    rank_token: &str,
) -> String {
    let min_timestamp = min_timestamp
        .map(|ts| format!("&min_timestamp={}", ts))
        .unwrap_or_default();
    format!(
        "feed/user/{}/?max_id={}{}&rank_token={}&ranked_content=true",
        user_id,
        q(max_id),
        min_timestamp,
        rank_token
    )
}

impl<S: Sleeper> InstagramApiGeneric<S> {
    /// Unranked timeline
    pub async fn get_timeline_feed(&self) -> Result<ResponseEnvelope> {
        self.get("feed/timeline/").await
    }

    /// Ranked timeline
    pub async fn get_timeline(&self) -> Result<ResponseEnvelope> {
        let url = format!(
            "feed/timeline/?rank_token={}&ranked_content=true&",
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// Archived posts of the logged-in account
    pub async fn get_archive_feed(&self) -> Result<ResponseEnvelope> {
        let url = format!(
            "feed/only_me_feed/?rank_token={}&ranked_content=true&",
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// One page of a user's posts
    pub async fn get_user_feed(
        &self,
        user_id: &str,
        max_id: &str,
        min_timestamp: Option<i64>,
    ) -> Result<ResponseEnvelope> {
        let url = user_feed_path(user_id, max_id, min_timestamp, &self.rank_token().await);
        self.get(&url).await
    }

    /// One page of the logged-in account's posts
    pub async fn get_self_user_feed(
        &self,
        max_id: &str,
        min_timestamp: Option<i64>,
    ) -> Result<ResponseEnvelope> {
        let user_id = self.user_id().await;
        self.get_user_feed(&user_id, max_id, min_timestamp).await
    }

    /// One page of posts under `hashtag`
    pub async fn get_hashtag_feed(&self, hashtag: &str, max_id: &str) -> Result<ResponseEnvelope> {
        let url = format!(
            "feed/tag/{}/?max_id={}&rank_token={}&ranked_content=true&",
            q(hashtag),
            q(max_id),
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// First page of a tag feed
    pub async fn tag_feed(&self, tag: &str) -> Result<ResponseEnvelope> {
        let url = format!(
            "feed/tag/{}/?rank_token={}&ranked_content=true&",
            q(tag),
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// One page of posts at a location
    pub async fn get_location_feed(
        &self,
        location_id: &str,
        max_id: &str,
    ) -> Result<ResponseEnvelope> {
        let url = format!(
            "feed/location/{}/?max_id={}&rank_token={}&ranked_content=true&",
            location_id,
            q(max_id),
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// Popular posts
    pub async fn get_popular_feed(&self) -> Result<ResponseEnvelope> {
        let url = format!(
            "feed/popular/?people_teaser_supported=1&rank_token={}&ranked_content=true&",
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// One page of posts the account liked
    pub async fn get_liked_media(&self, max_id: &str) -> Result<ResponseEnvelope> {
        self.get(&format!("feed/liked/?max_id={}", q(max_id))).await
    }

    /// Media the user is tagged in
    pub async fn get_user_tags(&self, user_id: &str) -> Result<ResponseEnvelope> {
        let url = format!(
            "usertags/{}/feed/?rank_token={}&ranked_content=true&",
            user_id,
            self.rank_token().await
        );
        self.get(&url).await
    }

    /// Posts the logged-in account is tagged in
    pub async fn get_self_user_tags(&self) -> Result<ResponseEnvelope> {
        let user_id = self.user_id().await;
        self.get_user_tags(&user_id).await
    }

    /// Geotagged posts of a user
    pub async fn get_geo_media(&self, user_id: &str) -> Result<ResponseEnvelope> {
        self.get(&format!("maps/user/{}/", user_id)).await
    }

    /// Geotagged posts of the logged-in account
    pub async fn get_self_geo_media(&self) -> Result<ResponseEnvelope> {
        let user_id = self.user_id().await;
        self.get_geo_media(&user_id).await
    }

    /// Explore feed
    pub async fn explore(&self) -> Result<ResponseEnvelope> {
        self.get("discover/explore/").await
    }

    /// Activity on the account's own posts
    pub async fn get_recent_activity(&self) -> Result<ResponseEnvelope> {
        self.get("news/inbox/?").await
    }

    /// Activity of followed accounts
    pub async fn get_following_recent_activity(&self) -> Result<ResponseEnvelope> {
        self.get("news/?").await
    }

    /// Megaphone log
    pub async fn get_megaphone_log(&self) -> Result<ResponseEnvelope> {
        self.get("megaphone/log/").await
    }

    /// Autocomplete user list for mentions
    pub async fn auto_complete_user_list(&self) -> Result<ResponseEnvelope> {
        self.get("friendships/autocomplete_user_list/").await
    }
}
