//! Persisted user record
//!
//! The signed-in user lives in LocalStorage under `currentUser`, mirrored
//! by id into the `users` list. A finished single-player run raises the
//! stored high score and level, never lowers them. Fields this game does
//! not know about are carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("malformed user record: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("storage access failed: {0}")]
    Storage(String),
    #[error("local storage unavailable")]
    NoStorage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Value,
    #[serde(default)]
    pub high_score: u64,
    #[serde(default)]
    pub level: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Raise high score and level to at least the given values.
    /// Returns true if anything changed.
    pub fn apply_result(&mut self, score: u64, level: u32) -> bool {
        let mut changed = false;
        if score > self.high_score {
            self.high_score = score;
            changed = true;
        }
        if level > self.level {
            self.level = level;
            changed = true;
        }
        changed
    }
}

/// Updated storage values after a run
#[derive(Debug, Clone, PartialEq)]
pub struct StatsUpdate {
    pub current_user: String,
    /// `None` when the user is not in the list (list left untouched)
    pub users: Option<String>,
}

/// Apply a result to the stored JSON. Returns `Ok(None)` when nobody is
/// signed in.
pub fn update_user_json(
    current_user: Option<&str>,
    users: Option<&str>,
    score: u64,
    level: u32,
) -> Result<Option<StatsUpdate>, StatsError> {
    let Some(current_user) = current_user else {
        return Ok(None);
    };

    let mut record: UserRecord = serde_json::from_str(current_user)?;
    record.apply_result(score, level);
    let current_user = serde_json::to_string(&record)?;

    let mut list: Vec<UserRecord> = match users {
        Some(json) => serde_json::from_str::<Option<Vec<UserRecord>>>(json)?.unwrap_or_default(),
        None => Vec::new(),
    };
    let users = match list.iter_mut().find(|u| u.id == record.id) {
        Some(entry) => {
            entry.high_score = record.high_score;
            entry.level = record.level;
            Some(serde_json::to_string(&list)?)
        }
        None => None,
    };

    Ok(Some(StatsUpdate {
        current_user,
        users,
    }))
}

/// LocalStorage keys (used only in wasm32)
#[allow(dead_code)]
const CURRENT_USER_KEY: &str = "currentUser";
#[allow(dead_code)]
const USERS_KEY: &str = "users";

/// Record a finished single-player run for the signed-in user (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn record_result(score: u64, level: u32) -> Result<(), StatsError> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(StatsError::NoStorage)?;

    let read = |key: &str| {
        storage
            .get_item(key)
            .map_err(|e| StatsError::Storage(format!("{e:?}")))
    };
    let current = read(CURRENT_USER_KEY)?;
    let users = read(USERS_KEY)?;

    let Some(update) = update_user_json(current.as_deref(), users.as_deref(), score, level)? else {
        log::info!("No signed-in user; stats not recorded");
        return Ok(());
    };

    let write = |key: &str, value: &str| {
        storage
            .set_item(key, value)
            .map_err(|e| StatsError::Storage(format!("{e:?}")))
    };
    write(CURRENT_USER_KEY, &update.current_user)?;
    if let Some(users) = &update.users {
        write(USERS_KEY, users)?;
    }
    log::info!("User stats updated (score {score}, level {level})");
    Ok(())
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
pub fn record_result(score: u64, level: u32) -> Result<(), StatsError> {
    log::debug!("Stats not persisted natively (score {score}, level {level})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_user_signed_in() {
        assert!(update_user_json(None, None, 100, 2).unwrap().is_none());
    }

    #[test]
    fn test_max_semantics_and_mirror() {
        let current = r#"{"id":7,"username":"ada","highScore":300,"level":4}"#;
        let users = r#"[{"id":3,"highScore":10,"level":1},{"id":7,"username":"ada","highScore":300,"level":4}]"#;

        let update = update_user_json(Some(current), Some(users), 450, 2)
            .unwrap()
            .unwrap();
        let record: UserRecord = serde_json::from_str(&update.current_user).unwrap();
        assert_eq!(record.high_score, 450);
        assert_eq!(record.level, 4);
        assert_eq!(record.extra["username"], "ada");

        let list: Vec<UserRecord> = serde_json::from_str(&update.users.unwrap()).unwrap();
        assert_eq!(list[0].high_score, 10);
        assert_eq!(list[1].high_score, 450);
        assert_eq!(list[1].level, 4);
    }

    #[test]
    fn test_user_missing_from_list_leaves_list_alone() {
        let current = r#"{"id":"u1","highScore":0,"level":1}"#;
        let update = update_user_json(Some(current), Some("[]"), 50, 3)
            .unwrap()
            .unwrap();
        assert!(update.users.is_none());
        assert!(update.current_user.contains("\"highScore\":50"));
    }

    #[test]
    fn test_null_users_list() {
        let current = r#"{"id":1}"#;
        let update = update_user_json(Some(current), Some("null"), 5, 1)
            .unwrap()
            .unwrap();
        assert!(update.users.is_none());
    }

    #[test]
    fn test_malformed_record_is_an_error() {
        let err = update_user_json(Some("{not json"), None, 1, 1).unwrap_err();
        assert!(matches!(err, StatsError::Parse(_)));
    }

    #[test]
    fn test_apply_result_never_lowers() {
        let mut record: UserRecord = serde_json::from_str(r#"{"id":1,"highScore":90,"level":3}"#).unwrap();
        assert!(!record.apply_result(10, 1));
        assert!(record.apply_result(91, 1));
        assert_eq!((record.high_score, record.level), (91, 3));
    }
}
