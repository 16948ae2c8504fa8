//! Parky Client - typed HTTP access to the Parky API
//!
//! Registers and authenticates users, keeps the issued bearer token, and
//! attaches it to every park and trail call.

use chrono::{DateTime, Utc};
use parky_core::{NationalParkDto, TrailCreateDto, TrailDto, TrailUpdateDto};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Client error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Not authenticated: log in or supply a token first")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Account returned by registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

/// Token returned by authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Parky API client
#[derive(Debug, Clone)]
pub struct ParkyClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ParkyClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Use an already issued token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<RegisteredUser> {
        let request = self
            .request(Method::POST, "/api/v1/users/register")
            .json(&CredentialsBody { username, password });
        self.send_json(request).await
    }

    /// Authenticate and keep the issued token for later calls
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<TokenResponse> {
        let request = self
            .request(Method::POST, "/api/v1/users/authenticate")
            .json(&CredentialsBody { username, password });
        let issued: TokenResponse = self.send_json(request).await?;
        tracing::debug!(username = %issued.username, expires_at = %issued.expires_at, "authenticated");
        self.token = Some(issued.token.clone());
        Ok(issued)
    }

    // =========================================================================
    // National parks
    // =========================================================================

    pub async fn list_national_parks(&self) -> Result<Vec<NationalParkDto>> {
        let request = self.authorized(Method::GET, "/api/v1/nationalparks")?;
        self.send_json(request).await
    }

    pub async fn get_national_park(&self, id: i32) -> Result<NationalParkDto> {
        let request = self.authorized(Method::GET, &format!("/api/v1/nationalparks/{id}"))?;
        self.send_json(request).await
    }

    pub async fn create_national_park(&self, park: &NationalParkDto) -> Result<NationalParkDto> {
        let request = self
            .authorized(Method::POST, "/api/v1/nationalparks")?
            .json(park);
        self.send_json(request).await
    }

    /// Update the park identified by `park.id`
    pub async fn update_national_park(&self, park: &NationalParkDto) -> Result<()> {
        let request = self
            .authorized(Method::PATCH, &format!("/api/v1/nationalparks/{}", park.id))?
            .json(park);
        self.send_empty(request).await
    }

    pub async fn delete_national_park(&self, id: i32) -> Result<()> {
        let request = self.authorized(Method::DELETE, &format!("/api/v1/nationalparks/{id}"))?;
        self.send_empty(request).await
    }

    // =========================================================================
    // Trails
    // =========================================================================

    pub async fn list_trails(&self) -> Result<Vec<TrailDto>> {
        let request = self.authorized(Method::GET, "/api/v1/trails")?;
        self.send_json(request).await
    }

    pub async fn get_trail(&self, id: i32) -> Result<TrailDto> {
        let request = self.authorized(Method::GET, &format!("/api/v1/trails/{id}"))?;
        self.send_json(request).await
    }

    pub async fn trails_in_national_park(&self, national_park_id: i32) -> Result<Vec<TrailDto>> {
        let request = self.authorized(
            Method::GET,
            &format!("/api/v1/trails/in-national-park/{national_park_id}"),
        )?;
        self.send_json(request).await
    }

    pub async fn create_trail(&self, trail: &TrailCreateDto) -> Result<TrailDto> {
        let request = self.authorized(Method::POST, "/api/v1/trails")?.json(trail);
        self.send_json(request).await
    }

    pub async fn update_trail(&self, trail: &TrailUpdateDto) -> Result<()> {
        let request = self
            .authorized(Method::PATCH, &format!("/api/v1/trails/{}", trail.id))?
            .json(trail);
        self.send_empty(request).await
    }

    pub async fn delete_trail(&self, id: i32) -> Result<()> {
        let request = self.authorized(Method::DELETE, &format!("/api/v1/trails/{id}"))?;
        self.send_empty(request).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        check(request.send().await?).await?;
        Ok(())
    }
}

/// Turn non-success statuses into `ClientError::Api`
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if text.is_empty() => status.canonical_reason().unwrap_or("error").to_string(),
        Err(_) => text,
    };
    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body() -> serde_json::Value {
        json!({
            "token": "abc.def.ghi",
            "token_type": "Bearer",
            "expires_in": 10800,
            "expires_at": "2030-01-01T00:00:00Z",
            "user_id": "6f0e1f5c-34a4-4b41-9a2e-0a3b3c1d2e4f",
            "username": "alice",
            "role": "User"
        })
    }

    #[tokio::test]
    async fn test_authenticate_stores_token_for_later_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/users/authenticate"))
            .and(body_json(json!({ "username": "alice", "password": "correct" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/nationalparks"))
            .and(header("authorization", "Bearer abc.def.ghi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "name": "Zion",
                "state": "Utah",
                "established": "1919-11-19T00:00:00Z"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ParkyClient::new(server.uri());
        let issued = client.authenticate("alice", "correct").await.unwrap();
        assert_eq!(issued.username, "alice");
        assert_eq!(client.token(), Some("abc.def.ghi"));

        let parks = client.list_national_parks().await.unwrap();
        assert_eq!(parks.len(), 1);
        assert_eq!(parks[0].name, "Zion");
    }

    #[tokio::test]
    async fn test_protected_call_without_token() {
        let client = ParkyClient::new("http://127.0.0.1:9");

        let err = client.list_trails().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/users/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "DUPLICATE_USER",
                "message": "Username already exists"
            })))
            .mount(&server)
            .await;

        let client = ParkyClient::new(server.uri());
        match client.register("alice", "correct").await.unwrap_err() {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Username already exists");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/trails/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ParkyClient::new(format!("{}/", server.uri())).with_token("t");
        client.delete_trail(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_error_body_uses_status_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/trails/3"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = ParkyClient::new(server.uri()).with_token("t");
        match client.get_trail(3).await.unwrap_err() {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "Forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
