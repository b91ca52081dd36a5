//! Local decoding of bearer tokens.
//!
//! Tokens are JWT-shaped (`header.payload.signature`). Only the payload is
//! read; the signature is never checked on the client.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AuthError, Result};

/// Claims embedded in a token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(map: Map<String, Value>) -> Self {
        Claims(map)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// User identifier, taken from `id`, `_id` or `sub` in that order.
    pub fn id(&self) -> Option<String> {
        ["id", "_id", "sub"]
            .iter()
            .filter_map(|name| self.0.get(*name))
            .find_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.0.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }

    /// Tokens without an `exp` claim never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

pub fn decode_claims(token: &str) -> Result<Claims> {
    let payload = token
        .trim()
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("missing payload segment".to_string()))?;
    let payload = payload.trim_end_matches('=');

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|e| AuthError::InvalidToken(format!("payload is not base64: {e}")))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(Claims(map)),
        Ok(_) => Err(AuthError::InvalidToken(
            "payload is not a JSON object".to_string(),
        )),
        Err(e) => Err(AuthError::InvalidToken(format!(
            "payload is not valid JSON: {e}"
        ))),
    }
}

#[cfg(test)]
pub(crate) fn encode_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
