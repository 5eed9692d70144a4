use super::{StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory credential store.
///
/// Backs the test bench and single-process deployments. Create-if-absent
/// runs under one write lock, so concurrent creates of the same id behave
/// exactly like the Postgres primary-key constraint: one winner, the rest
/// observe [`StoreError::AlreadyExists`].
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(StoreError::AlreadyExists(user.id.clone()));
        }

        users.insert(user.id.clone(), user.clone());

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<UserRecord, StoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    fn user(id: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            password_hash: "hash".to_string(),
            profile: json!({ "firstName": "Ada" }),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() -> Result<()> {
        let store = MemoryUserStore::new();
        store.create(&user("alice")).await?;

        let found = store.get("alice").await?;
        assert_eq!(found, user("alice"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_twice_is_already_exists() -> Result<()> {
        let store = MemoryUserStore::new();
        store.create(&user("alice")).await?;

        let result = store.create(&user("alice")).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(id)) if id == "alice"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let store = MemoryUserStore::new();
        let result = store.get("nobody").await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "nobody"));
    }

    #[tokio::test]
    async fn test_concurrent_creates_have_one_winner() -> Result<()> {
        let store = Arc::new(MemoryUserStore::new());
        let mut tasks = JoinSet::new();

        for _ in 0..16 {
            let store = store.clone();
            tasks.spawn(async move { store.create(&user("alice")).await });
        }

        let mut created = 0;
        let mut exists = 0;
        while let Some(result) = tasks.join_next().await {
            match result? {
                Ok(()) => created += 1,
                Err(StoreError::AlreadyExists(_)) => exists += 1,
                Err(err) => return Err(err.into()),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(exists, 15);
        Ok(())
    }
}
