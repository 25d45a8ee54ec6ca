//! Client-mode CLI logic
//!
//! Each subcommand is one API call made between a login and a logout. The
//! result is returned as JSON for the binary to print.

use crate::{
    InstagramApiGeneric, Result,
    api::backoff::Sleeper,
    types::{DirectItem, ThreadTarget},
};
use clap::Subcommand;
use serde_json::Value;

/// Actions the `instabot` binary can run
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Log in and print the session
    Login {
        /// Re-run the handshake even when a session exists
        #[arg(long)]
        force: bool,
    },
    /// Follow a user
    Follow { user_id: String },
    /// Unfollow a user
    Unfollow { user_id: String },
    /// Like a post
    Like { media_id: String },
    /// Comment on a post
    Comment { media_id: String, text: String },
    /// List every follower of a user (the logged-in user by default)
    Followers {
        user_id: Option<String>,
        /// Stop after this many users
        #[arg(long)]
        amount: Option<usize>,
    },
    /// List every account a user follows (the logged-in user by default)
    Followings {
        user_id: Option<String>,
        #[arg(long)]
        amount: Option<usize>,
    },
    /// List every post of a user (the logged-in user by default)
    UserFeed {
        user_id: Option<String>,
        /// Only posts newer than this unix timestamp
        #[arg(long)]
        min_timestamp: Option<i64>,
    },
    /// List posts of a hashtag
    Hashtag {
        tag: String,
        #[arg(long, default_value_t = 100)]
        amount: usize,
    },
    /// Send a direct text message
    SendMessage {
        text: String,
        /// Comma-separated recipient user ids
        #[arg(long, required = true, value_delimiter = ',')]
        to: Vec<String>,
        /// Post into this existing thread
        #[arg(long)]
        thread: Option<String>,
    },
    /// Search users by name
    SearchUsers { query: String },
}

impl Command {
    /// Whether the login before this command must re-run the handshake
    pub fn force_login(&self) -> bool {
        matches!(self, Self::Login { force: true })
    }
}

/// Run one command on a logged-in client
pub async fn run_command<S: Sleeper>(
    api: &InstagramApiGeneric<S>,
    command: &Command,
) -> Result<Value> {
    let value = match command {
        Command::Login { .. } => serde_json::to_value(api.session().await)?,
        Command::Follow { user_id } => api.follow(user_id).await?.json,
        Command::Unfollow { user_id } => api.unfollow(user_id).await?.json,
        Command::Like { media_id } => api.like(media_id).await?.json,
        Command::Comment { media_id, text } => api.comment(media_id, text).await?.json,
        Command::Followers { user_id, amount } => {
            let user_id = resolve_user(api, user_id.as_deref()).await;
            Value::Array(api.get_total_followers(&user_id, *amount).await?)
        }
        Command::Followings { user_id, amount } => {
            let user_id = resolve_user(api, user_id.as_deref()).await;
            Value::Array(api.get_total_followings(&user_id, *amount).await?)
        }
        Command::UserFeed {
            user_id,
            min_timestamp,
        } => {
            let user_id = resolve_user(api, user_id.as_deref()).await;
            Value::Array(api.get_total_user_feed(&user_id, *min_timestamp).await?)
        }
        Command::Hashtag { tag, amount } => {
            Value::Array(api.get_total_hashtag_feed(tag, Some(*amount)).await?)
        }
        Command::SendMessage { text, to, thread } => {
            let thread = thread.as_deref().map(ThreadTarget::new);
            let item = DirectItem::message(text.as_str());
            api.send_direct_item(&item, to.as_slice(), thread.as_ref())
                .await?
                .json
        }
        Command::SearchUsers { query } => api.search_users(query).await?.json,
    };
    Ok(value)
}

async fn resolve_user<S: Sleeper>(api: &InstagramApiGeneric<S>, user_id: Option<&str>) -> String {
    match user_id {
        Some(id) => id.to_string(),
        None => api.session().await.user_id,
    }
}
