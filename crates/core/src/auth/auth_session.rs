use std::sync::Arc;

use crate::constants::{AUTH_TOKEN_KEY, AUTH_USER_KEY};
use crate::errors::Result;
use crate::store::KeyValueStoreTrait;
use crate::users::User;

/// Remote session token and current user, kept in the key-value store.
pub struct AuthSession {
    kv: Arc<dyn KeyValueStoreTrait>,
}

impl AuthSession {
    pub fn new(kv: Arc<dyn KeyValueStoreTrait>) -> Self {
        Self { kv }
    }

    pub async fn set_session(&self, token: &str, user: &User) -> Result<()> {
        self.kv.set_value(AUTH_TOKEN_KEY, token).await?;
        self.kv
            .set_value(AUTH_USER_KEY, &serde_json::to_string(user)?)
            .await
    }

    pub async fn token(&self) -> Result<Option<String>> {
        self.kv.get_value(AUTH_TOKEN_KEY).await
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token().await?.is_some_and(|t| !t.is_empty()))
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        match self.kv.get_value(AUTH_USER_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.kv.remove_value(AUTH_TOKEN_KEY).await?;
        self.kv.remove_value(AUTH_USER_KEY).await
    }
}
