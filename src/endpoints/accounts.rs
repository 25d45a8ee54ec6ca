//! Account settings and profile endpoints

use crate::api::{InstagramApiGeneric, backoff::Sleeper};
use crate::types::{RequestBody, ResponseEnvelope};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Fields accepted by `accounts/edit_profile/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileEdit {
    pub external_url: String,
    pub phone_number: String,
    pub full_name: String,
    pub biography: String,
    pub email: String,
    /// 1 male, 2 female, 3 unspecified
    pub gender: u8,
}

impl<S: Sleeper> InstagramApiGeneric<S> {
    /// Sync the experiments list with the server
    pub async fn sync_features(&self) -> Result<ResponseEnvelope> {
        let data = json!({
            "id": self.user_id().await,
            "experiments": self.settings().api.experiments,
        });
        self.post("qe/sync/", data).await
    }

    /// Report the exposed experiment
    pub async fn expose(&self) -> Result<ResponseEnvelope> {
        let data = json!({
            "id": self.user_id().await,
            "experiment": "ig_android_profile_contextual_feed",
        });
        self.post("qe/expose/", data).await
    }

    /// Change the password; the current one comes from the session
    pub async fn change_password(&self, new_password: &str) -> Result<ResponseEnvelope> {
        let old_password = self.session_field(|s| s.password.clone()).await;
        let data = json!({
            "old_password": old_password,
            "new_password1": new_password,
            "new_password2": new_password,
        });
        self.post("accounts/change_password/", data).await
    }

    /// Remove the profile picture
    pub async fn remove_profile_picture(&self) -> Result<ResponseEnvelope> {
        self.post("accounts/remove_profile_picture/", Value::Null).await
    }

    /// Make the account private
    pub async fn set_private_account(&self) -> Result<ResponseEnvelope> {
        self.post("accounts/set_private/", Value::Null).await
    }

    /// Make the account public
    pub async fn set_public_account(&self) -> Result<ResponseEnvelope> {
        self.post("accounts/set_public/", Value::Null).await
    }

    /// Update the display name and phone number
    pub async fn set_name_and_phone(&self, name: &str, phone: &str) -> Result<ResponseEnvelope> {
        let data = json!({"first_name": name, "phone_number": phone});
        self.post("accounts/set_phone_and_name/", data).await
    }

    /// Current profile as shown in the edit form
    pub async fn get_profile_data(&self) -> Result<ResponseEnvelope> {
        self.post("accounts/current_user/?edit=true", Value::Null).await
    }

    /// Overwrite the editable profile fields; the username stays the session's
    pub async fn edit_profile(&self, profile: &ProfileEdit) -> Result<ResponseEnvelope> {
        let username = self.session_field(|s| s.username.clone()).await;
        let mut data = serde_json::to_value(profile)?;
        data["username"] = Value::String(username);
        self.post("accounts/edit_profile/", data).await
    }

    /// Link address book contacts. The body is a plain form, not signed.
    pub async fn sync_from_address_book(&self, contacts: &Value) -> Result<ResponseEnvelope> {
        let body = format!(
            "contacts={}",
            urlencoding::encode(&serde_json::to_string(contacts)?)
        );
        self.send_request(
            "address_book/link/?include=extra_display_name,thumbnails",
            Some(RequestBody::Form(body)),
            false,
        )
        .await
    }
}
