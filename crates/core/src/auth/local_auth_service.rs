use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher,
};
use log::{debug, info, warn};
use rand::rngs::OsRng;
use std::sync::Arc;

use crate::constants::DEFAULT_LOCALE;
use crate::errors::{Error, Result, ValidationError};
use crate::store::{IndexValue, LocalStoreExt, LocalStoreTrait};
use crate::users::User;

/// Lets a user who logged in online sign in again while offline.
pub struct LocalAuthService {
    store: Arc<dyn LocalStoreTrait>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Auth(format!("Failed to hash password: {e}")))
}

fn verify_password(candidate: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| Error::Auth(format!("Invalid stored password hash: {e}")))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(other) => Err(Error::Auth(format!("Password verification failed: {other}"))),
    }
}

impl LocalAuthService {
    pub fn new(store: Arc<dyn LocalStoreTrait>) -> Self {
        Self { store }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users: Vec<User> = self
            .store
            .find_typed("email", IndexValue::from(normalize_email(email)))
            .await?;
        Ok(users.into_iter().next())
    }

    /// Stores a salted hash of `password`, creating the user if needed.
    pub async fn save_local_user(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ValidationError::MissingField("email".to_string()).into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password".to_string()).into());
        }
        let password_hash = hash_password(password)?;

        match self.find_by_email(&email).await? {
            Some(mut user) => {
                user.password_hash = password_hash;
                let saved = self.store.save_typed(user).await?;
                debug!("Updated local credentials for {}", email);
                Ok(saved)
            }
            None => {
                let created = self
                    .store
                    .insert_typed(User::new(email.clone(), password_hash, DEFAULT_LOCALE))
                    .await?;
                info!("Saved local user {}", email);
                Ok(created)
            }
        }
    }

    /// Returns the user when it exists, is active, and the password matches.
    pub async fn check_local_user(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if !user.is_active() {
            warn!("Offline login refused for inactive user {}", user.email);
            return Ok(None);
        }
        if user.password_hash.is_empty() {
            return Ok(None);
        }
        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLocalStore;
    use crate::users::UserStatus;

    fn service() -> (LocalAuthService, Arc<MemoryLocalStore>) {
        let store = Arc::new(MemoryLocalStore::new());
        (LocalAuthService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn saved_user_can_log_in_offline() {
        let (auth, _) = service();
        let user = auth.save_local_user("Marie@Example.com ", "s3cret").await.unwrap();
        assert_eq!(user.email, "marie@example.com");
        assert_eq!(user.locale, "fr");
        assert!(user.is_active());
        assert!(user.password_hash.starts_with("$argon2"));

        let found = auth.check_local_user("marie@example.com", "s3cret").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(auth
            .check_local_user("marie@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(auth.check_local_user("nobody@example.com", "s3cret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saving_again_replaces_the_hash() {
        let (auth, store) = service();
        let first = auth.save_local_user("a@b.fr", "old").await.unwrap();
        let second = auth.save_local_user("a@b.fr", "new").await.unwrap();

        assert_eq!(first.id, second.id);
        let users: Vec<User> = store.all_typed().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(auth.check_local_user("a@b.fr", "old").await.unwrap().is_none());
        assert!(auth.check_local_user("a@b.fr", "new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn inactive_users_are_refused() {
        let (auth, store) = service();
        let mut user = auth.save_local_user("c@d.fr", "pw").await.unwrap();
        user.status = UserStatus::Inactive;
        store.save_typed(user).await.unwrap();

        assert!(auth.check_local_user("c@d.fr", "pw").await.unwrap().is_none());
    }
}
