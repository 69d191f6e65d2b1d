//! Registration and login.
//!
//! Passwords are bcrypt-hashed before they reach the store; a successful
//! login is answered with a signed bearer token (see [`crate::auth`]).

use std::sync::Arc;

use crate::auth::Tokens;
use crate::error::{AppError, Result};
use crate::models::NewUser;
use crate::service::TxManager;
use crate::store::Store;

pub struct AuthService<S: Store> {
    store: Arc<S>,
    tx: TxManager<S>,
    tokens: Tokens,
}

impl<S: Store> Clone for AuthService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tx: self.tx.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

/// Successful login: the bearer token plus the display name for the UI.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub username: String,
}

impl<S: Store> AuthService<S> {
    pub fn new(store: Arc<S>, tx: TxManager<S>, tokens: Tokens) -> Self {
        Self { store, tx, tokens }
    }

    /// Create an account. The existence check and the insert share one
    /// transaction; the unique email index backstops the check against a
    /// concurrent registration of the same address.
    pub async fn register(&self, name: String, email: String, password: String) -> Result<i64> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let user = NewUser {
            name,
            email,
            password_hash,
        };

        let id = self
            .tx
            .read_committed(|mut tx| async move {
                let result = async {
                    if self
                        .store
                        .user_by_email(&mut tx, &user.email)
                        .await?
                        .is_some()
                    {
                        return Err(AppError::UserAlreadyExists);
                    }
                    self.store.insert_user(&mut tx, &user).await
                }
                .await;
                (tx, result)
            })
            .await?;

        tracing::info!(user_id = id, "user registered");
        Ok(id)
    }

    /// Verify credentials and issue a token. Unknown email and wrong
    /// password are deliberately indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let user = self
            .tx
            .read_committed(|mut tx| async move {
                let result = self.store.user_by_email(&mut tx, email).await;
                (tx, result)
            })
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        Ok(LoginOutcome {
            token,
            username: user.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> AuthService<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let tx = TxManager::new(Arc::clone(&store));
        AuthService::new(store, tx, Tokens::new("test-secret", 3600))
    }

    #[tokio::test]
    async fn register_then_login() {
        let service = service();
        let id = service
            .register(
                "lifter".to_string(),
                "a@b.c".to_string(),
                "hunter2hunter2".to_string(),
            )
            .await
            .unwrap();
        assert!(id > 0);

        let outcome = service.login("a@b.c", "hunter2hunter2").await.unwrap();
        assert_eq!(outcome.username, "lifter");
        assert!(!outcome.token.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let service = service();
        service
            .register("a".to_string(), "a@b.c".to_string(), "hunter2hunter2".to_string())
            .await
            .unwrap();
        let err = service
            .register("b".to_string(), "a@b.c".to_string(), "hunter2hunter2".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let service = service();
        service
            .register("a".to_string(), "a@b.c".to_string(), "hunter2hunter2".to_string())
            .await
            .unwrap();

        let wrong_password = service.login("a@b.c", "nope").await.unwrap_err();
        let unknown_email = service.login("ghost@b.c", "nope").await.unwrap_err();
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
    }
}
