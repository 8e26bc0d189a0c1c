//! # User Store
//!
//! Loads the static user file and exposes typed profiles to the handlers.
//! Validation happens here, at the collaborator boundary: the scorer only
//! ever sees an explicit `Option` distinguishing structurally missing
//! psychometric data from a present-but-empty profile.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A user record from the static user file.
///
/// `psychometrics: None` means the record carries no psychometric data at
/// all; `Some(vec![])` means the field exists but is empty. The scorer
/// treats those differently, so the distinction is preserved through serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,

    /// Optional display name, unused by scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Psychometric trait scores on unspecified axes, not normalized at rest
    #[serde(default)]
    pub psychometrics: Option<Vec<f64>>,
}

/// In-memory user lookup keyed by user id. Loaded once at startup; the file
/// is the only persistence in this service.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, UserProfile>,
}

impl UserStore {
    /// Load the user store from a JSON array of user records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read user file {}", path.display()))?;
        let store = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse user file {}", path.display()))?;

        tracing::info!(users = store.len(), file = %path.display(), "User store loaded");
        Ok(store)
    }

    /// Parse a user store from raw JSON. Duplicate ids keep the last record,
    /// matching plain map insertion semantics.
    pub fn from_json(contents: &str) -> Result<Self> {
        let records: Vec<UserProfile> =
            serde_json::from_str(contents).context("User file must be a JSON array of users")?;

        let users = records
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Ok(Self { users })
    }

    pub fn get(&self, id: &str) -> Option<&UserProfile> {
        self.users.get(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_parses_records() {
        let store = UserStore::from_json(
            r#"[
                {"id": "u1", "name": "Ada", "psychometrics": [0.2, 0.8, 0.5]},
                {"id": "u2", "psychometrics": []},
                {"id": "u3"}
            ]"#,
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(
            store.get("u1").unwrap().psychometrics,
            Some(vec![0.2, 0.8, 0.5])
        );
        // Present-but-empty and structurally missing stay distinguishable
        assert_eq!(store.get("u2").unwrap().psychometrics, Some(vec![]));
        assert_eq!(store.get("u3").unwrap().psychometrics, None);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(UserStore::from_json(r#"{"id": "u1"}"#).is_err());
    }

    #[test]
    fn test_unknown_id_is_none() {
        let store = UserStore::from_json(r#"[{"id": "u1"}]"#).unwrap();
        assert!(store.get("nobody").is_none());
    }
}
