//! Follow graph endpoints

use super::q;
use crate::api::{InstagramApiGeneric, backoff::Sleeper};
use crate::types::{FollowListKind, ResponseEnvelope};
use crate::Result;
use serde_json::json;

/// `friendships/{id}/followers/`; the cursor is appended only when non-empty
fn followers_path(user_id: &str, max_id: &str, rank_token: &str) -> String {
    let mut url = format!("friendships/{}/followers/?rank_token={}", user_id, rank_token);
    if !max_id.is_empty() {
        url.push_str(&format!("&max_id={}", q(max_id)));
    }
    url
}

fn followings_path(user_id: &str, max_id: &str, key_version: &str, rank_token: &str) -> String {
    format!(
        "friendships/{}/following/?max_id={}&ig_sig_key_version={}&rank_token={}",
        user_id,
        q(max_id),
        key_version,
        rank_token
    )
}

impl<S: Sleeper> InstagramApiGeneric<S> {
    async fn friendship_action(&self, action: &str, user_id: &str) -> Result<ResponseEnvelope> {
        let data = json!({"user_id": user_id});
        self.post(&format!("friendships/{}/{}/", action, user_id), data).await
    }

    /// Follow a user
    pub async fn follow(&self, user_id: &str) -> Result<ResponseEnvelope> {
        self.friendship_action("create", user_id).await
    }

    /// Unfollow a user
    pub async fn unfollow(&self, user_id: &str) -> Result<ResponseEnvelope> {
        self.friendship_action("destroy", user_id).await
    }

    /// Block a user
    pub async fn block(&self, user_id: &str) -> Result<ResponseEnvelope> {
        self.friendship_action("block", user_id).await
    }

    /// Unblock a user
    pub async fn unblock(&self, user_id: &str) -> Result<ResponseEnvelope> {
        self.friendship_action("unblock", user_id).await
    }

    /// Relationship between the session user and `user_id`
    pub async fn user_friendship(&self, user_id: &str) -> Result<ResponseEnvelope> {
        self.friendship_action("show", user_id).await
    }

    /// One page of followers
    pub async fn get_user_followers(
        &self,
        user_id: &str,
        max_id: &str,
    ) -> Result<ResponseEnvelope> {
        let url = followers_path(user_id, max_id, &self.rank_token().await);
        self.get(&url).await
    }

    /// One page of followed accounts
    pub async fn get_user_followings(
        &self,
        user_id: &str,
        max_id: &str,
    ) -> Result<ResponseEnvelope> {
        let url = followings_path(
            user_id,
            max_id,
            &self.settings().api.sig_key_version,
            &self.rank_token().await,
        );
        self.get(&url).await
    }

    /// One page of followers or followings of a user
    pub async fn get_follow_list(
        &self,
        kind: FollowListKind,
        user_id: &str,
        max_id: &str,
    ) -> Result<ResponseEnvelope> {
        match kind {
            FollowListKind::Followers => self.get_user_followers(user_id, max_id).await,
            FollowListKind::Followings => self.get_user_followings(user_id, max_id).await,
        }
    }

    /// First page of the logged-in account's followers
    pub async fn get_self_user_followers(&self) -> Result<ResponseEnvelope> {
        let user_id = self.user_id().await;
        self.get_user_followers(&user_id, "").await
    }

    /// First page of accounts the logged-in account follows
    pub async fn get_self_users_following(&self) -> Result<ResponseEnvelope> {
        let user_id = self.user_id().await;
        self.get_user_followings(&user_id, "").await
    }
}
