//! HMAC-SHA256 verification of platform init data.
//!
//! The platform signs the init-data fields with a key derived from the bot
//! token: `signing_key = HMAC_SHA256("WebAppData", bot_token)`, then
//! `hash = HMAC_SHA256(signing_key, check_string)` where the check string is
//! every field except `hash`, sorted by key and joined as `key=value` lines.
//!
//! # Security Properties
//!
//! - Uses constant-time comparison to prevent timing attacks
//! - The identity is taken from the verified token's own `user` field,
//!   never from anything the client claims separately

use std::collections::btree_map::{BTreeMap, Entry};

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use spree_core::Identity;
use subtle::ConstantTimeEq;
use url::form_urlencoded;

use crate::error::TokenRejected;

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation constant used to derive the signing key
const KEY_DOMAIN: &[u8] = b"WebAppData";

/// Field carrying the received signature
const SIGNATURE_FIELD: &str = "hash";

/// Field carrying the signed user object (JSON)
const USER_FIELD: &str = "user";

/// The `user` field as the platform serializes it. Unknown fields are
/// ignored; only the id and the public handle matter here.
#[derive(Debug, Deserialize)]
struct TokenUser {
    id: i64,
    #[serde(default)]
    username: Option<String>,
}

/// Verifier for the platform's signed init-data blobs.
///
/// The signing key is derived once from the bot token; verification itself
/// is a pure function of the input string.
#[derive(Clone)]
pub struct InitDataVerifier {
    signing_key: [u8; 32],
}

impl InitDataVerifier {
    /// Creates a verifier for the given bot token.
    pub fn new(bot_token: &str) -> Self {
        let mut mac = HmacSha256::new_from_slice(KEY_DOMAIN)
            .expect("HMAC can take key of any size");
        mac.update(bot_token.as_bytes());
        Self {
            signing_key: mac.finalize().into_bytes().into(),
        }
    }

    /// Verifies an init-data blob and extracts the identity it vouches for.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRejected`] when the signature is missing, malformed or
    /// does not match, or when the verified token carries no usable `user`
    /// field. Callers treat every rejection as "unauthenticated".
    pub fn verify(&self, init_data: &str) -> Result<Identity, TokenRejected> {
        let mut fields = parse_init_data(init_data);

        let received_hex = fields
            .remove(SIGNATURE_FIELD)
            .ok_or(TokenRejected::MissingSignature)?;
        let received =
            hex::decode(&received_hex).map_err(|_| TokenRejected::MalformedSignature)?;

        let check_string = fields
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .expect("HMAC can take key of any size");
        mac.update(check_string.as_bytes());
        let expected = mac.finalize().into_bytes();

        if !bool::from(expected.as_slice().ct_eq(&received)) {
            tracing::warn!("init data signature verification failed");
            return Err(TokenRejected::SignatureMismatch);
        }

        let user = fields.get(USER_FIELD).ok_or(TokenRejected::MissingUser)?;
        let user: TokenUser =
            serde_json::from_str(user).map_err(|_| TokenRejected::MalformedUser)?;
        if user.id <= 0 {
            return Err(TokenRejected::MalformedUser);
        }

        Ok(Identity::new(user.id, user.username))
    }
}

/// Decode the URL-encoded blob into a key-sorted field map.
///
/// Repeated keys are not expected from the platform, but are normalized by
/// joining their values with `,` so verification stays deterministic.
fn parse_init_data(init_data: &str) -> BTreeMap<String, String> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(init_data.as_bytes()) {
        match fields.entry(key.into_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
            Entry::Occupied(mut slot) => {
                let joined = slot.get_mut();
                joined.push(',');
                joined.push_str(&value);
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "12345:test-bot-token";
    const USER_JSON: &str = r#"{"id":7,"username":"alice","first_name":"Alice"}"#;

    fn compute_hash(bot_token: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = fields.to_vec();
        sorted.sort_by_key(|(key, _)| *key);
        let check_string = sorted
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut key_mac = HmacSha256::new_from_slice(KEY_DOMAIN).unwrap();
        key_mac.update(bot_token.as_bytes());
        let signing_key = key_mac.finalize().into_bytes();

        let mut mac = HmacSha256::new_from_slice(&signing_key).unwrap();
        mac.update(check_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn encode(fields: &[(&str, &str)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in fields {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    fn signed_init_data(bot_token: &str, fields: &[(&str, &str)]) -> String {
        let hash = compute_hash(bot_token, fields);
        let mut all: Vec<(&str, &str)> = fields.to_vec();
        all.push(("hash", &hash));
        encode(&all)
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        let init_data = signed_init_data(
            BOT_TOKEN,
            &[("auth_date", "1700000000"), ("user", USER_JSON)],
        );

        let identity = verifier.verify(&init_data).unwrap();
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        // Signed over sorted fields, transmitted in reverse order.
        let hash = compute_hash(
            BOT_TOKEN,
            &[("auth_date", "1700000000"), ("user", USER_JSON)],
        );
        let init_data = encode(&[
            ("user", USER_JSON),
            ("hash", &hash),
            ("auth_date", "1700000000"),
        ]);

        assert!(verifier.verify(&init_data).is_ok());
    }

    #[test]
    fn test_altered_field_rejected() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        let hash = compute_hash(
            BOT_TOKEN,
            &[("auth_date", "1700000000"), ("user", USER_JSON)],
        );
        // auth_date changed after signing
        let init_data = encode(&[
            ("auth_date", "1700009999"),
            ("user", USER_JSON),
            ("hash", &hash),
        ]);

        assert_eq!(
            verifier.verify(&init_data),
            Err(TokenRejected::SignatureMismatch)
        );
    }

    #[test]
    fn test_missing_hash_rejected() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        let init_data = encode(&[("auth_date", "1700000000"), ("user", USER_JSON)]);

        assert_eq!(
            verifier.verify(&init_data),
            Err(TokenRejected::MissingSignature)
        );
    }

    #[test]
    fn test_garbage_hash_rejected() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        let init_data = encode(&[
            ("auth_date", "1700000000"),
            ("user", USER_JSON),
            ("hash", "not-hex!!"),
        ]);

        assert_eq!(
            verifier.verify(&init_data),
            Err(TokenRejected::MalformedSignature)
        );
    }

    #[test]
    fn test_wrong_bot_token_rejected() {
        let verifier = InitDataVerifier::new("other:token");
        let init_data = signed_init_data(
            BOT_TOKEN,
            &[("auth_date", "1700000000"), ("user", USER_JSON)],
        );

        assert_eq!(
            verifier.verify(&init_data),
            Err(TokenRejected::SignatureMismatch)
        );
    }

    #[test]
    fn test_empty_input_rejected() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        assert_eq!(verifier.verify(""), Err(TokenRejected::MissingSignature));
    }

    #[test]
    fn test_valid_signature_without_user_rejected() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        let init_data = signed_init_data(BOT_TOKEN, &[("auth_date", "1700000000")]);

        assert_eq!(verifier.verify(&init_data), Err(TokenRejected::MissingUser));
    }

    #[test]
    fn test_non_positive_user_id_rejected() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        let init_data = signed_init_data(
            BOT_TOKEN,
            &[("auth_date", "1700000000"), ("user", r#"{"id":0}"#)],
        );

        assert_eq!(
            verifier.verify(&init_data),
            Err(TokenRejected::MalformedUser)
        );
    }

    #[test]
    fn test_unparsable_user_rejected() {
        let verifier = InitDataVerifier::new(BOT_TOKEN);
        let init_data = signed_init_data(
            BOT_TOKEN,
            &[("auth_date", "1700000000"), ("user", "not json")],
        );

        assert_eq!(
            verifier.verify(&init_data),
            Err(TokenRejected::MalformedUser)
        );
    }
}
