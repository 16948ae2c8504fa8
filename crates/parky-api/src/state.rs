//! Application state management

use crate::auth::{
    default_policy, AccessPolicy, Authenticator, InMemoryUserRepository, JwtConfig,
    PasswordConfig, PasswordError, TokenValidator, UserRepository,
};
use parky_core::{AppConfig, MemoryStore, ParkRepository};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
///
/// Built once at startup from an explicit [`AppConfig`]; nothing in here is
/// read from the environment afterwards.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Credential store
    pub users: Arc<dyn UserRepository>,
    /// National park and trail store
    pub parks: Arc<dyn ParkRepository>,
    /// Registers users and issues tokens
    pub authenticator: Authenticator,
    /// Verifies tokens on protected routes
    pub tokens: Arc<TokenValidator>,
    /// Route to role table
    pub policy: AccessPolicy,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        parks: Arc<dyn ParkRepository>,
    ) -> Result<Self, PasswordError> {
        let tokens = Arc::new(TokenValidator::new(JwtConfig::from(&config.auth)));
        let authenticator = Authenticator::new(
            users.clone(),
            tokens.clone(),
            PasswordConfig::from(&config.auth),
        )?;

        Ok(Self {
            config,
            users,
            parks,
            authenticator,
            tokens,
            policy: default_policy(),
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }

    /// State backed entirely by in-process stores
    pub fn in_memory(config: AppConfig) -> Result<Self, PasswordError> {
        Self::new(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Replace the access policy
    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
