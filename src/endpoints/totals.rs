//! Aggregates that walk every page of a list

use crate::api::{
    InstagramApiGeneric,
    backoff::Sleeper,
    pagination::PageSpec,
};
use crate::types::FollowListKind;
use crate::{Error, Result};
use serde_json::Value;
use tracing::{info, warn};

/// Lists above this size get a warning before the walk starts
const LARGE_LIST_THRESHOLD: u64 = 200_000;

/// Hashtag items collected when no amount is given
pub const DEFAULT_HASHTAG_AMOUNT: usize = 100;

impl<S: Sleeper> InstagramApiGeneric<S> {
    /// Every follower or followed account of `user_id`, up to `amount`.
    ///
    /// Without `amount` the target is the count reported by the profile.
    pub async fn get_total_followers_or_followings(
        &self,
        user_id: &str,
        amount: Option<usize>,
        kind: FollowListKind,
    ) -> Result<Vec<Value>> {
        let info = self.get_username_info(user_id).await?;
        let Some(user) = info.json.get("user") else {
            return Err(Error::malformed(format!("no 'user' object in info for {}", user_id)));
        };

        let total = match amount {
            Some(amount) => amount,
            None => {
                let count = user
                    .get(kind.count_key())
                    .and_then(Value::as_u64)
                    .ok_or_else(|| {
                        Error::malformed(format!("no '{}' for {}", kind.count_key(), user_id))
                    })?;
                if count > LARGE_LIST_THRESHOLD {
                    warn!(
                        "Consider temporarily saving the result of this big operation. \
                         This will take a while."
                    );
                }
                usize::try_from(count).unwrap_or(usize::MAX)
            }
        };

        info!("Getting {} of {} (up to {})", kind.as_str(), user_id, total);
        self.paginator()
            .collect(PageSpec::USERS, Some(total), |cursor| async move {
                self.get_follow_list(kind, user_id, &cursor).await
            })
            .await
    }

    /// All followers of a user, or the first `amount`
    pub async fn get_total_followers(
        &self,
        user_id: &str,
        amount: Option<usize>,
    ) -> Result<Vec<Value>> {
        self.get_total_followers_or_followings(user_id, amount, FollowListKind::Followers)
            .await
    }

    /// All accounts a user follows, or the first `amount`
    pub async fn get_total_followings(
        &self,
        user_id: &str,
        amount: Option<usize>,
    ) -> Result<Vec<Value>> {
        self.get_total_followers_or_followings(user_id, amount, FollowListKind::Followings)
            .await
    }

    /// All followers of the logged-in account
    pub async fn get_total_self_followers(&self) -> Result<Vec<Value>> {
        let user_id = self.user_id().await;
        self.get_total_followers(&user_id, None).await
    }

    /// All accounts the logged-in account follows
    pub async fn get_total_self_followings(&self) -> Result<Vec<Value>> {
        let user_id = self.user_id().await;
        self.get_total_followings(&user_id, None).await
    }

    /// Every post of `user_id`. A private profile yields an empty list.
    pub async fn get_total_user_feed(
        &self,
        user_id: &str,
        min_timestamp: Option<i64>,
    ) -> Result<Vec<Value>> {
        self.paginator()
            .collect(PageSpec::FEED, None, |cursor| async move {
                self.get_user_feed(user_id, &cursor, min_timestamp).await
            })
            .await
    }

    /// Every post of the logged-in account
    pub async fn get_total_self_user_feed(&self, min_timestamp: Option<i64>) -> Result<Vec<Value>> {
        let user_id = self.user_id().await;
        self.get_total_user_feed(&user_id, min_timestamp).await
    }

    /// Up to `amount` posts of a hashtag feed, [`DEFAULT_HASHTAG_AMOUNT`] by default
    pub async fn get_total_hashtag_feed(
        &self,
        hashtag: &str,
        amount: Option<usize>,
    ) -> Result<Vec<Value>> {
        let amount = amount.unwrap_or(DEFAULT_HASHTAG_AMOUNT);
        self.paginator()
            .collect(PageSpec::ITEMS, Some(amount), |cursor| async move {
                self.get_hashtag_feed(hashtag, &cursor).await
            })
            .await
    }

    /// Liked posts from the first `scan_rate` pages
    pub async fn get_total_liked_media(&self, scan_rate: usize) -> Result<Vec<Value>> {
        self.paginator()
            .collect(PageSpec::ITEMS.with_max_pages(scan_rate), None, |cursor| async move {
                self.get_liked_media(&cursor).await
            })
            .await
    }
}
