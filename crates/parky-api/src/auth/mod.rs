//! Authentication and authorization module
//!
//! - Token issuance and validation (HS256 JWT)
//! - Password hashing with Argon2id
//! - The credential store trait and its PostgreSQL / in-memory implementations
//! - The Authenticator, which registers users and issues tokens
//! - The access policy and the middleware that enforces it

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod service;

pub use error::AuthError;
pub use jwt::{Claims, IssuedToken, JwtConfig, TokenError, TokenValidator};
pub use middleware::{auth_middleware, extract_bearer_token};
pub use models::{AuthenticatedUser, Credentials, NewUser, RegisteredUser, Role, User};
pub use password::{hash_password, verify_password, PasswordConfig, PasswordError};
pub use policy::{default_policy, AccessPolicy};
pub use repository::{InMemoryUserRepository, PgUserRepository, RepositoryError, UserRepository};
pub use service::Authenticator;
