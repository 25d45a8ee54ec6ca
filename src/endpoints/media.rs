//! Media, like and comment endpoints

use crate::api::{InstagramApiGeneric, backoff::Sleeper};
use crate::types::ResponseEnvelope;
use crate::Result;
use serde_json::{Value, json};

impl<S: Sleeper> InstagramApiGeneric<S> {
    /// Replace the caption of a post
    pub async fn edit_media(&self, media_id: &str, caption: &str) -> Result<ResponseEnvelope> {
        let data = json!({"caption_text": caption});
        self.post(&format!("media/{}/edit_media/", media_id), data).await
    }

    /// Remove the account's tag from a post
    pub async fn remove_self_tag(&self, media_id: &str) -> Result<ResponseEnvelope> {
        self.post(&format!("media/{}/remove/", media_id), Value::Null).await
    }

    /// Details of one post
    pub async fn media_info(&self, media_id: &str) -> Result<ResponseEnvelope> {
        let data = json!({"media_id": media_id});
        self.post(&format!("media/{}/info/", media_id), data).await
    }

    /// Hide a post from the profile, or bring it back with `undo`
    pub async fn archive_media(
        &self,
        media_id: &str,
        media_type: u8,
        undo: bool,
    ) -> Result<ResponseEnvelope> {
        let action = if undo { "undo_only_me" } else { "only_me" };
        let data = json!({"media_id": media_id});
        let url = format!("media/{}/{}/?media_type={}", media_id, action, media_type);
        self.post(&url, data).await
    }

    /// Delete a post
    pub async fn delete_media(&self, media_id: &str) -> Result<ResponseEnvelope> {
        let data = json!({"media_id": media_id});
        self.post(&format!("media/{}/delete/", media_id), data).await
    }

    /// Like a post
    pub async fn like(&self, media_id: &str) -> Result<ResponseEnvelope> {
        let data = json!({"media_id": media_id});
        self.post(&format!("media/{}/like/", media_id), data).await
    }

    /// Remove a like
    pub async fn unlike(&self, media_id: &str) -> Result<ResponseEnvelope> {
        let data = json!({"media_id": media_id});
        self.post(&format!("media/{}/unlike/", media_id), data).await
    }

    /// Comment on a post
    pub async fn comment(&self, media_id: &str, text: &str) -> Result<ResponseEnvelope> {
        let data = json!({"comment_text": text});
        self.post(&format!("media/{}/comment/", media_id), data).await
    }

    /// Delete a comment
    pub async fn delete_comment(
        &self,
        media_id: &str,
        comment_id: &str,
    ) -> Result<ResponseEnvelope> {
        let url = format!("media/{}/comment/{}/delete/", media_id, comment_id);
        self.post(&url, Value::Null).await
    }

    /// Users who liked a post
    pub async fn get_media_likers(&self, media_id: &str) -> Result<ResponseEnvelope> {
        self.get(&format!("media/{}/likers/?", media_id)).await
    }

    /// Comments on a post
    pub async fn get_media_comments(&self, media_id: &str) -> Result<ResponseEnvelope> {
        self.get(&format!("media/{}/comments/?", media_id)).await
    }
}
