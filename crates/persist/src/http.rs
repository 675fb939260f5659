//! Key-value store behind an authenticated HTTP endpoint.
//!
//! `POST {base}/kv/get` with `{"key"}` answers `{"value"}`;
//! `POST {base}/kv/set` with `{"key","value"}` stores it. Every request
//! carries `Authorization: Bearer <key>`.

use std::time::Duration;

use serde_json::{Value, json};

use crate::kv::{KvError, KvStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpKvStore {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpKvStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpKvStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{}/kv/{op}", self.base_url.trim_end_matches('/'))
    }

    fn post(&self, op: &str, body: Value) -> Result<ureq::Response, KvError> {
        let url = self.endpoint(op);
        tracing::debug!(%url, "kv request");
        match self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body)
        {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => Err(KvError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(e) => Err(KvError::Transport(e.to_string())),
        }
    }
}

fn get_body(key: &str) -> Value {
    json!({ "key": key })
}

fn set_body(key: &str, value: Value) -> Value {
    json!({ "key": key, "value": value })
}

/// Pull the stored value out of a `/kv/get` response.
fn parse_get_response(mut body: Value) -> Option<Value> {
    match body.get_mut("value").map(Value::take) {
        Some(Value::Null) | None => None,
        Some(v) => Some(v),
    }
}

impl KvStore for HttpKvStore {
    fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        let body: Value = self.post("get", get_body(key))?.into_json()?;
        Ok(parse_get_response(body))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), KvError> {
        self.post("set", set_body(key, value))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly() {
        let a = HttpKvStore::new("https://kv.example.org/functions/v1/server", "anon");
        let b = HttpKvStore::new("https://kv.example.org/functions/v1/server/", "anon");
        assert_eq!(a.endpoint("get"), "https://kv.example.org/functions/v1/server/kv/get");
        assert_eq!(a.endpoint("set"), b.endpoint("set"));
    }

    #[test]
    fn request_bodies() {
        assert_eq!(get_body("club-config"), json!({"key": "club-config"}));
        assert_eq!(
            set_body("club-config", json!({"currentBookTitle": "Dune"})),
            json!({"key": "club-config", "value": {"currentBookTitle": "Dune"}})
        );
    }

    #[test]
    fn null_or_missing_value_is_none() {
        assert_eq!(parse_get_response(json!({"value": null})), None);
        assert_eq!(parse_get_response(json!({})), None);
        assert_eq!(
            parse_get_response(json!({"value": {"a": 1}})),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn debug_hides_key() {
        let s = format!("{:?}", HttpKvStore::new("http://x", "secret-anon-key"));
        assert!(!s.contains("secret-anon-key"));
    }
}
