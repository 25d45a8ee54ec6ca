//! Request signing and device identity
//!
//! Signed bodies carry an HMAC-SHA256 of the canonical JSON payload, keyed with
//! the app's signature key. Device ids are derived from the credentials so the
//! same account always presents the same device.

use crate::types::SignedRequest;
use crate::{Error, Result};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use serde_json::{Map, Value};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Salt mixed into the device id digest
const DEVICE_ID_SALT: &str = "12345";
/// Platform tag every device id starts with
pub const DEVICE_ID_PREFIX: &str = "android-";
/// Hex characters kept from the device id digest
const DEVICE_ID_HEX_LEN: usize = 16;

/// Signs request bodies with a fixed key
#[derive(Clone)]
pub struct Signer {
    key: String,
    key_version: String,
}

impl Signer {
    pub fn new(key: impl Into<String>, key_version: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            key_version: key_version.into(),
        }
    }

    pub fn key_version(&self) -> &str {
        &self.key_version
    }

    /// Sign `params` for `endpoint`.
    ///
    /// The payload is the canonical JSON text of `params` (object keys sorted),
    /// and the wire body is
    /// `ig_sig_key_version=<v>&signed_body=<hex hmac>.<urlencoded payload>`.
    pub fn sign(&self, endpoint: &str, params: &Map<String, Value>) -> Result<SignedRequest> {
        let sorted: BTreeMap<&String, &Value> = params.iter().collect();
        let payload = serde_json::to_string(&sorted)?;
        let signature = self.digest(&payload)?;
        let body = format!(
            "ig_sig_key_version={}&signed_body={}.{}",
            self.key_version,
            signature,
            urlencoding::encode(&payload)
        );

        Ok(SignedRequest {
            endpoint: endpoint.to_string(),
            body_params: params.clone(),
            payload,
            signature,
            body,
        })
    }

    /// Hex HMAC-SHA256 of `payload`
    pub fn digest(&self, payload: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .map_err(|e| Error::internal(format!("invalid signature key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("key_version", &self.key_version)
            .finish_non_exhaustive()
    }
}

/// MD5 hex of `username + password`, the seed of [`derive_device_id`]
pub fn username_hash(username: &str, password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(username.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Device id for a credential hash: `android-` plus 16 hex chars
pub fn derive_device_id(seed: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(seed.as_bytes());
    hasher.update(DEVICE_ID_SALT.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}{}", DEVICE_ID_PREFIX, &digest[..DEVICE_ID_HEX_LEN])
}

/// Random request id.
///
/// Both forms appear on the wire: the dashed form for `_uuid`, `phone_id` and
/// `client_context`, the bare hex form for the handshake `guid`.
pub fn new_request_id(dashed: bool) -> String {
    let id = uuid::Uuid::new_v4();
    if dashed {
        id.hyphenated().to_string()
    } else {
        id.simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn signer() -> Signer {
        Signer::new("test-signature-key", "4")
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_device_id_is_deterministic() {
        let a = derive_device_id(&username_hash("alice", "secret"));
        let b = derive_device_id(&username_hash("alice", "secret"));
        let c = derive_device_id(&username_hash("alice", "other"));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_device_id_shape() {
        for (user, pass) in [("alice", "secret"), ("", ""), ("bob", "p@ss wörd")] {
            let id = derive_device_id(&username_hash(user, pass));
            assert!(id.starts_with(DEVICE_ID_PREFIX));
            assert_eq!(id.len(), DEVICE_ID_PREFIX.len() + 16);
            assert!(id[DEVICE_ID_PREFIX.len()..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_username_hash_is_md5_hex() {
        // md5("") is well known
        assert_eq!(username_hash("", ""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(username_hash("ab", "c"), username_hash("a", "bc"));
    }

    #[test]
    fn test_sign_wire_format() {
        let signed = signer()
            .sign("friendships/create/123/", &params(json!({"user_id": "123", "_uid": "42"})))
            .unwrap();

        let (version, rest) = signed.body.split_once("&signed_body=").unwrap();
        assert_eq!(version, "ig_sig_key_version=4");

        let (hex_part, encoded) = rest.split_once('.').unwrap();
        assert_eq!(hex_part.len(), 64);
        assert_eq!(hex_part, signed.signature);

        let decoded = urlencoding::decode(encoded).unwrap();
        assert_eq!(decoded, signed.payload);
        let reparsed: Value = serde_json::from_str(&decoded).unwrap();
        assert_eq!(reparsed, json!({"user_id": "123", "_uid": "42"}));

        // Independent recomputation of the signature
        let mut mac = HmacSha256::new_from_slice(b"test-signature-key").unwrap();
        mac.update(decoded.as_bytes());
        assert_eq!(hex::encode(mac.finalize().into_bytes()), hex_part);
    }

    #[test]
    fn test_sign_is_canonical() {
        let mut first = Map::new();
        first.insert("b".into(), json!("2"));
        first.insert("a".into(), json!("1"));
        let mut second = Map::new();
        second.insert("a".into(), json!("1"));
        second.insert("b".into(), json!("2"));

        let s1 = signer().sign("x/", &first).unwrap();
        let s2 = signer().sign("x/", &second).unwrap();
        assert_eq!(s1.body, s2.body);
        assert_eq!(s1.payload, r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_sign_escapes_special_characters() {
        let signed = signer()
            .sign("media/1/comment/", &params(json!({"comment_text": "a&b=c d"})))
            .unwrap();
        let encoded = signed.body.split_once('.').unwrap().1;
        assert!(!encoded.contains('&'));
        assert!(!encoded.contains(' '));
        assert_eq!(urlencoding::decode(encoded).unwrap(), signed.payload);
    }

    #[test]
    fn test_request_id_forms() {
        let dashed = new_request_id(true);
        let bare = new_request_id(false);

        assert_eq!(dashed.len(), 36);
        assert_eq!(dashed.matches('-').count(), 4);
        assert_eq!(bare.len(), 32);
        assert!(!bare.contains('-'));
        assert_ne!(new_request_id(true), dashed);
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", signer());
        assert!(!debug.contains("test-signature-key"));
    }
}
