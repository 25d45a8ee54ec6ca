//! Direct message endpoints

use crate::api::{InstagramApiGeneric, backoff::Sleeper, signer};
use crate::types::{DirectItem, Recipients, ResponseEnvelope, ThreadTarget};
use crate::Result;
use serde_json::{Map, Value};
use tracing::debug;

impl<S: Sleeper> InstagramApiGeneric<S> {
    /// Direct inbox threads
    pub async fn get_v2_inbox(&self) -> Result<ResponseEnvelope> {
        self.get("direct_v2/inbox/?").await
    }

    /// Pending direct shares
    pub async fn get_direct_share(&self) -> Result<ResponseEnvelope> {
        self.get("direct_share/inbox/?").await
    }

    /// Send `item` to `users`, optionally into an existing thread.
    ///
    /// An empty or blank recipient list fails with
    /// [`crate::Error::InvalidRecipients`] before anything is sent.
    pub async fn send_direct_item<U: AsRef<str>>(
        &self,
        item: &DirectItem,
        users: &[U],
        thread: Option<&ThreadTarget>,
    ) -> Result<ResponseEnvelope> {
        let recipients = Recipients::prepare(users, thread)?;

        let mut data = Map::new();
        data.insert("client_context".into(), signer::new_request_id(true).into());
        data.insert("action".into(), "send_item".into());
        item.write_fields(&mut data)?;
        data.insert("recipient_users".into(), recipients.users.into());
        if let Some(thread) = recipients.thread {
            data.insert("thread_ids".into(), thread.into());
        }

        debug!("Sending direct {} to {} recipient(s)", item.tag(), users.len());
        self.post(item.endpoint(), Value::Object(data)).await
    }
}
