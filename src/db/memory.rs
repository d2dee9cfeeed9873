use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Account, Rating},
};

use super::Store;

/// In-memory store used by the integration tests
///
/// Mirrors the PostgreSQL store's semantics: newest-first rating order,
/// single-use invites, symmetric friend edges.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
    /// Newest first
    ratings: Vec<Rating>,
    /// code -> (owner, used)
    invites: HashMap<String, (String, bool)>,
    friends: HashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_account(&self, account: Account) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(&account.username) {
            return Err(AppError::Conflict(
                "Username already exists. Try logging in.".to_string(),
            ));
        }
        inner.accounts.insert(account.username.clone(), account);
        Ok(())
    }

    async fn find_account(&self, username: &str) -> AppResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(username).cloned())
    }

    async fn create_session(&self, username: &str) -> AppResult<String> {
        let token = Uuid::new_v4().to_string();
        let mut inner = self.inner.write().await;
        inner.sessions.insert(token.clone(), username.to_string());
        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Option<String>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(token).cloned())
    }

    async fn revoke_session(&self, token: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.sessions.remove(token);
        Ok(())
    }

    async fn insert_rating(&self, rating: Rating) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;
        inner.ratings.insert(0, rating.clone());
        Ok(rating)
    }

    async fn recent_ratings(&self, limit: i64) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner.ratings.iter().take(limit as usize).cloned().collect())
    }

    async fn ratings_for(&self, owner: &str) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect())
    }

    async fn find_rating(&self, id: Uuid) -> AppResult<Option<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner.ratings.iter().find(|r| r.id == id).cloned())
    }

    async fn update_comment(&self, id: Uuid, comment: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(rating) = inner.ratings.iter_mut().find(|r| r.id == id) {
            rating.comment = comment.to_string();
        }
        Ok(())
    }

    async fn delete_rating(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.ratings.retain(|r| r.id != id);
        Ok(())
    }

    async fn create_invite(&self, owner: &str) -> AppResult<String> {
        let code = Uuid::new_v4().simple().to_string()[..8].to_string();
        let mut inner = self.inner.write().await;
        inner
            .invites
            .insert(code.clone(), (owner.to_string(), false));
        Ok(code)
    }

    async fn take_invite(&self, code: &str) -> AppResult<Option<String>> {
        let mut inner = self.inner.write().await;
        match inner.invites.get_mut(code) {
            Some((owner, used)) if !*used => {
                *used = true;
                Ok(Some(owner.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn add_friend_edge(&self, a: &str, b: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        for (from, to) in [(a, b), (b, a)] {
            let edges = inner.friends.entry(from.to_string()).or_default();
            if !edges.iter().any(|f| f == to) {
                edges.push(to.to_string());
            }
        }
        Ok(())
    }

    async fn friends_of(&self, username: &str) -> AppResult<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner.friends.get(username).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;

    fn rating(owner: &str, title: &str) -> Rating {
        Rating::new(
            owner.to_string(),
            title.to_string(),
            MediaType::Movie,
            4.0,
            String::new(),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_ratings_newest_first() {
        let store = MemoryStore::new();
        store.insert_rating(rating("alice", "First")).await.unwrap();
        store.insert_rating(rating("alice", "Second")).await.unwrap();

        let all = store.recent_ratings(100).await.unwrap();
        assert_eq!(all[0].title, "Second");
        assert_eq!(all[1].title, "First");
    }

    #[tokio::test]
    async fn test_invite_single_use() {
        let store = MemoryStore::new();
        let code = store.create_invite("alice").await.unwrap();

        assert_eq!(
            store.take_invite(&code).await.unwrap(),
            Some("alice".to_string())
        );
        assert_eq!(store.take_invite(&code).await.unwrap(), None);
        assert_eq!(store.take_invite("bogus").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_friend_edge_symmetric_and_deduplicated() {
        let store = MemoryStore::new();
        store.add_friend_edge("alice", "bob").await.unwrap();
        store.add_friend_edge("bob", "alice").await.unwrap();

        assert_eq!(store.friends_of("alice").await.unwrap(), vec!["bob"]);
        assert_eq!(store.friends_of("bob").await.unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_duplicate_account_conflict() {
        let store = MemoryStore::new();
        let account = Account::new("alice".to_string(), "hash".to_string());
        store.create_account(account.clone()).await.unwrap();

        let result = store.create_account(account).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
