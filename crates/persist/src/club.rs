//! The admin-editable club configuration shown on the room's notice board.

use readingroom_common::constants::CLUB_CONFIG_KEY;
use serde::{Deserialize, Serialize};

use crate::kv::{KvError, KvStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubConfig {
    /// Local date-time, `YYYY-MM-DDTHH:MM`.
    pub next_meeting_date: String,
    pub current_book_title: String,
    pub current_book_image: String,
}

impl Default for ClubConfig {
    fn default() -> Self {
        Self {
            next_meeting_date: "2023-12-15T18:00".into(),
            current_book_title: "Cien Años de Soledad".into(),
            current_book_image: "https://images.unsplash.com/photo-1544947950-fa07a98d237f?auto=format&fit=crop&q=80&w=800".into(),
        }
    }
}

/// Load the club configuration, falling back to the default on a missing
/// key, a backend failure or an unreadable record.
pub fn load_club_config(store: &dyn KvStore) -> ClubConfig {
    match store.get(CLUB_CONFIG_KEY) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("error loading config: {e}");
                ClubConfig::default()
            }
        },
        Ok(None) => {
            tracing::debug!("no stored club config; using default");
            ClubConfig::default()
        }
        Err(e) => {
            tracing::error!("error loading config: {e}");
            ClubConfig::default()
        }
    }
}

/// Store the club configuration. Failures are logged and returned; the
/// caller is expected to carry on with the new value regardless.
pub fn save_club_config(store: &mut dyn KvStore, config: &ClubConfig) -> Result<(), KvError> {
    let result = serde_json::to_value(config)
        .map_err(KvError::from)
        .and_then(|value| store.set(CLUB_CONFIG_KEY, value));
    match &result {
        Ok(()) => tracing::info!(book = %config.current_book_title, "club config saved"),
        Err(e) => tracing::error!("error saving config: {e}"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use serde_json::{Value, json};

    struct Broken;

    impl KvStore for Broken {
        fn get(&self, _key: &str) -> Result<Option<Value>, KvError> {
            Err(KvError::Transport("connection refused".into()))
        }
        fn set(&mut self, _key: &str, _value: Value) -> Result<(), KvError> {
            Err(KvError::Status {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    #[test]
    fn null_value_keeps_default() {
        let mut kv = MemoryKvStore::new();
        assert_eq!(load_club_config(&kv), ClubConfig::default());
        kv.set(CLUB_CONFIG_KEY, Value::Null).unwrap();
        assert_eq!(load_club_config(&kv), ClubConfig::default());
    }

    #[test]
    fn backend_failure_keeps_default() {
        assert_eq!(load_club_config(&Broken), ClubConfig::default());
    }

    #[test]
    fn unreadable_record_keeps_default() {
        let mut kv = MemoryKvStore::new();
        kv.set(CLUB_CONFIG_KEY, json!({"unexpected": true})).unwrap();
        assert_eq!(load_club_config(&kv), ClubConfig::default());
    }

    #[test]
    fn saved_config_loads_back_with_camel_case_keys() {
        let mut kv = MemoryKvStore::new();
        let config = ClubConfig {
            next_meeting_date: "2024-03-01T19:30".into(),
            current_book_title: "Rayuela".into(),
            current_book_image: "https://example.org/rayuela.jpg".into(),
        };
        save_club_config(&mut kv, &config).unwrap();
        let raw = kv.get(CLUB_CONFIG_KEY).unwrap().unwrap();
        assert_eq!(raw["currentBookTitle"], "Rayuela");
        assert_eq!(raw["nextMeetingDate"], "2024-03-01T19:30");
        assert_eq!(load_club_config(&kv), config);
    }

    #[test]
    fn save_failure_is_reported() {
        let err = save_club_config(&mut Broken, &ClubConfig::default()).unwrap_err();
        assert!(matches!(err, KvError::Status { status: 500, .. }));
    }

    #[test]
    fn default_matches_documented_values() {
        let d = ClubConfig::default();
        assert_eq!(d.next_meeting_date, "2023-12-15T18:00");
        assert_eq!(d.current_book_title, "Cien Años de Soledad");
        assert!(d.current_book_image.starts_with("https://images.unsplash.com/"));
    }
}
