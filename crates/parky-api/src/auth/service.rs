//! Authenticator
//!
//! Registers users and exchanges credentials for signed tokens. Each call
//! is independent; the only shared state is the credential store.

use super::error::AuthError;
use super::jwt::{IssuedToken, TokenValidator};
use super::models::{Credentials, NewUser, Role, User};
use super::password::{hash_password, verify_password, PasswordConfig, PasswordError};
use super::repository::UserRepository;
use parky_core::BootstrapAdmin;
use std::sync::Arc;

const DUMMY_PASSWORD: &str = "parky-dummy-password";

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenValidator>,
    password_config: PasswordConfig,
    /// Verified against when the username is unknown, so a miss costs as
    /// much as a wrong password
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenValidator>,
        password_config: PasswordConfig,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hash_password(DUMMY_PASSWORD, &password_config)?;

        Ok(Self {
            users,
            tokens,
            password_config,
            dummy_hash,
        })
    }

    /// Register a new account with the `User` role
    pub async fn register(&self, credentials: &Credentials) -> Result<User, AuthError> {
        self.register_with_role(credentials, Role::User).await
    }

    /// Register a new account with an explicit role
    ///
    /// The early uniqueness check only saves a hash computation; the store's
    /// own constraint decides when two registrations race.
    pub async fn register_with_role(
        &self,
        credentials: &Credentials,
        role: Role,
    ) -> Result<User, AuthError> {
        let username = credentials.username.trim();
        if username.is_empty() || credentials.password.is_empty() {
            return Err(AuthError::RegistrationFailed(
                "username and password are required".to_string(),
            ));
        }

        if !self.users.is_unique_username(username).await? {
            return Err(AuthError::DuplicateUser);
        }

        let password = credentials.password.clone();
        let config = self.password_config.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .map_err(|e| AuthError::RegistrationFailed(e.to_string()))?
            .map_err(|e| AuthError::RegistrationFailed(e.to_string()))?;

        let user = self
            .users
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await?;

        tracing::debug!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a token
    ///
    /// An unknown username and a wrong password fail identically.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<IssuedToken, AuthError> {
        let user = self
            .users
            .find_by_username(credentials.username.trim())
            .await?;

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password = credentials.password.clone();

        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let matched = match verified {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be verified");
                false
            }
        };

        match user {
            Some(user) if matched => self
                .tokens
                .issue(&user)
                .map_err(|e| AuthError::Internal(e.to_string())),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Create the configured admin account if it does not exist yet
    ///
    /// Returns `true` when an account was created.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<bool, AuthError> {
        let credentials = Credentials::new(admin.username.clone(), admin.password.clone());
        match self.register_with_role(&credentials, Role::Admin).await {
            Ok(user) => {
                tracing::info!(username = %user.username, "bootstrap admin created");
                Ok(true)
            }
            Err(AuthError::DuplicateUser) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{JwtConfig, TokenError};
    use crate::auth::repository::{InMemoryUserRepository, RepositoryError};
    use async_trait::async_trait;

    fn light() -> PasswordConfig {
        PasswordConfig {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        }
    }

    fn tokens() -> Arc<TokenValidator> {
        Arc::new(TokenValidator::new(JwtConfig::default()))
    }

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(InMemoryUserRepository::new()), tokens(), light()).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let auth = authenticator();
        let user = auth
            .register(&Credentials::new("alice", "correct"))
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "correct");

        let issued = auth
            .authenticate(&Credentials::new("alice", "correct"))
            .await
            .unwrap();
        assert_eq!(issued.username, "alice");
        assert_eq!(issued.user_id, user.id);

        let claims = tokens().validate(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let auth = authenticator();
        auth.register(&Credentials::new("alice", "correct"))
            .await
            .unwrap();

        let result = auth
            .authenticate(&Credentials::new("alice", "wrongpassword"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        assert!(auth
            .authenticate(&Credentials::new("alice", "correct"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_credentials() {
        let auth = authenticator();
        let result = auth
            .authenticate(&Credentials::new("nobody", DUMMY_PASSWORD))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails_regardless_of_password() {
        let auth = authenticator();
        auth.register(&Credentials::new("alice", "one"))
            .await
            .unwrap();

        for password in ["one", "two", "something else entirely"] {
            let result = auth.register(&Credentials::new("alice", password)).await;
            assert!(
                matches!(result, Err(AuthError::DuplicateUser)),
                "password {password:?} was accepted"
            );
        }
    }

    #[tokio::test]
    async fn test_concurrent_registrations_admit_exactly_one() {
        let auth = Arc::new(authenticator());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let auth = auth.clone();
                tokio::spawn(async move {
                    auth.register(&Credentials::new("racer", format!("pw{i}")))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AuthError::DuplicateUser) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_blank_registration_fails() {
        let auth = authenticator();
        let result = auth.register(&Credentials::new("  ", "pw")).await;
        assert!(matches!(result, Err(AuthError::RegistrationFailed(_))));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let auth = authenticator();
        let admin = BootstrapAdmin {
            username: "root".to_string(),
            password: "hunter2".to_string(),
        };

        assert!(auth.ensure_admin(&admin).await.unwrap());
        assert!(!auth.ensure_admin(&admin).await.unwrap());

        let issued = auth
            .authenticate(&Credentials::new("root", "hunter2"))
            .await
            .unwrap();
        assert_eq!(issued.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_issued_token_expires() {
        let auth = authenticator();
        auth.register(&Credentials::new("alice", "correct"))
            .await
            .unwrap();
        let issued = auth
            .authenticate(&Credentials::new("alice", "correct"))
            .await
            .unwrap();

        let result = tokens().validate_at(&issued.token, issued.expires_at);
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    struct RacingRepository;

    #[async_trait]
    impl UserRepository for RacingRepository {
        async fn find_by_username(&self, _: &str) -> Result<Option<User>, RepositoryError> {
            Ok(None)
        }

        async fn create_user(&self, _: NewUser) -> Result<User, RepositoryError> {
            Err(RepositoryError::UsernameTaken)
        }

        async fn is_unique_username(&self, _: &str) -> Result<bool, RepositoryError> {
            Ok(true)
        }

        async fn health_check(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_level_conflict_is_duplicate_user() {
        let auth = Authenticator::new(Arc::new(RacingRepository), tokens(), light()).unwrap();
        let result = auth.register(&Credentials::new("alice", "correct")).await;
        assert!(matches!(result, Err(AuthError::DuplicateUser)));
    }

    struct DownRepository;

    #[async_trait]
    impl UserRepository for DownRepository {
        async fn find_by_username(&self, _: &str) -> Result<Option<User>, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".into()))
        }

        async fn create_user(&self, _: NewUser) -> Result<User, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".into()))
        }

        async fn is_unique_username(&self, _: &str) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".into()))
        }

        async fn health_check(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_store_outage_propagates() {
        let auth = Authenticator::new(Arc::new(DownRepository), tokens(), light()).unwrap();

        let result = auth.authenticate(&Credentials::new("alice", "x")).await;
        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));

        let result = auth.register(&Credentials::new("alice", "x")).await;
        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    }
}
