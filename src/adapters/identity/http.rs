//! HTTP adapter for the identity toolkit REST API.
//!
//! Implements the `IdentityProvider` port against the hosted identity
//! service. Every operation is a JSON POST to an `accounts:<op>` endpoint
//! with the project API key in the query string:
//!
//! 1. `accounts:signUp` / `accounts:signInWithPassword` - credential flows
//! 2. `accounts:signInWithIdp` - federated credential exchange
//! 3. `accounts:update` / `accounts:signOut` - session-scoped operations
//! 4. `accounts:lookup` - startup session restore from a stored token
//!
//! Provider error codes are mapped onto the domain `AuthError` taxonomy;
//! password material never appears in logs.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::watch;

use crate::config::IdentityConfig;
use crate::domain::{AuthError, Identity, ProfileUpdate, UserId};
use crate::ports::{FederatedTokenSource, IdentityProvider, SessionSignal};

/// Identity toolkit client.
///
/// Holds the active session's ID token internally; operations that need a
/// session fail with `NotAuthenticated` when none is held.
pub struct HttpIdentityProvider {
    config: IdentityConfig,
    http: reqwest::Client,
    federated: Arc<dyn FederatedTokenSource>,
    id_token: RwLock<Option<SecretString>>,
    signal: watch::Sender<SessionSignal>,
}

impl HttpIdentityProvider {
    /// Creates the client. The session signal starts initializing; call
    /// [`restore_session`](Self::restore_session) once at startup to
    /// resolve it.
    pub fn new(config: IdentityConfig, federated: Arc<dyn FederatedTokenSource>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");
        let (signal, _) = watch::channel(SessionSignal::Initializing);

        Self {
            config,
            http,
            federated,
            id_token: RwLock::new(None),
            signal,
        }
    }

    /// Resolves the startup signal: verifies a stored token via
    /// `accounts:lookup` if one was configured, otherwise resolves signed
    /// out. A failed lookup also resolves signed out - a stale token must
    /// not hold route decisions in the pending state forever.
    pub async fn restore_session(&self) {
        let stored = self.config.stored_id_token.clone();
        let Some(token) = stored else {
            self.publish(None);
            return;
        };

        match self.lookup(&token).await {
            Ok(identity) => {
                *self.id_token.write().expect("token lock poisoned") = Some(token);
                tracing::debug!(uid = %identity.uid, "restored session from stored token");
                self.publish(Some(identity));
            }
            Err(err) => {
                tracing::warn!(error = %err, "session restore failed; starting signed out");
                self.publish(None);
            }
        }
    }

    fn endpoint(&self, op: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.endpoint.trim_end_matches('/'),
            op,
            self.config.api_key.expose_secret()
        )
    }

    async fn post_account(&self, op: &str, body: serde_json::Value) -> Result<AuthResponse, AuthError> {
        tracing::debug!(op, "identity toolkit request");

        let response = self
            .http
            .post(self.endpoint(op))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(map_error_body(status.as_u16(), &text));
        }

        response
            .json::<AuthResponse>()
            .await
            .map_err(|e| AuthError::network(format!("malformed provider response: {e}")))
    }

    async fn lookup(&self, token: &SecretString) -> Result<Identity, AuthError> {
        let response = self
            .post_account(
                "lookup",
                serde_json::json!({ "idToken": token.expose_secret() }),
            )
            .await?;
        response.account.into_identity()
    }

    fn current_token(&self) -> Result<SecretString, AuthError> {
        self.id_token
            .read()
            .expect("token lock poisoned")
            .clone()
            .ok_or(AuthError::NotAuthenticated)
    }

    fn store_token(&self, token: &str) {
        *self.id_token.write().expect("token lock poisoned") =
            Some(SecretString::new(token.to_string()));
    }

    fn publish(&self, identity: Option<Identity>) {
        self.signal.send_replace(SessionSignal::Resolved(identity));
    }

    async fn complete_sign_in(&self, op: &str, body: serde_json::Value) -> Result<Identity, AuthError> {
        let response = self.post_account(op, body).await?;
        let identity = response.account.into_identity()?;
        self.store_token(&response.id_token);
        self.publish(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        self.complete_sign_in(
            "signUp",
            serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        self.complete_sign_in(
            "signInWithPassword",
            serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn sign_in_federated(&self) -> Result<Identity, AuthError> {
        let credential = self.federated.acquire().await?;
        self.complete_sign_in(
            "signInWithIdp",
            serde_json::json!({
                "postBody": format!(
                    "id_token={}&providerId={}",
                    credential.id_token.expose_secret(),
                    credential.provider_id,
                ),
                "requestUri": credential.request_uri,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Ok(token) = self.current_token() else {
            // No provider-side session to end; just confirm signed out.
            self.publish(None);
            return Ok(());
        };

        self.post_account(
            "signOut",
            serde_json::json!({ "idToken": token.expose_secret() }),
        )
        .await?;

        *self.id_token.write().expect("token lock poisoned") = None;
        self.publish(None);
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), AuthError> {
        let token = self.current_token()?;

        let mut body = serde_json::json!({ "idToken": token.expose_secret() });
        if let Some(name) = &update.display_name {
            body["displayName"] = serde_json::Value::String(name.clone());
        }
        if let Some(url) = &update.photo_url {
            body["photoUrl"] = serde_json::Value::String(url.clone());
        }

        self.post_account("update", body).await?;
        Ok(())
    }

    fn session_signal(&self) -> watch::Receiver<SessionSignal> {
        self.signal.subscribe()
    }
}

impl std::fmt::Debug for HttpIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityProvider")
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

/// Successful response from an `accounts:<op>` call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    id_token: String,
    account: AccountDto,
}

/// Provider-side account record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDto {
    uid: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
    created_at: DateTime<Utc>,
    last_sign_in_at: DateTime<Utc>,
}

impl AccountDto {
    fn into_identity(self) -> Result<Identity, AuthError> {
        // An empty uid means the provider response is unusable; bucket it
        // with transport failures rather than inventing a new variant.
        let uid = UserId::new(self.uid)
            .map_err(|e| AuthError::network(format!("malformed provider response: {e}")))?;
        Ok(Identity {
            uid,
            email: self.email,
            display_name: self.display_name,
            photo_url: self.photo_url,
            email_verified: self.email_verified,
            created_at: self.created_at,
            last_sign_in_at: self.last_sign_in_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Maps a non-success response body onto the domain taxonomy.
fn map_error_body(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => map_provider_code(&parsed.error.message),
        Err(_) => AuthError::network(format!("provider returned {status}: {body}")),
    }
}

/// Maps the provider's error codes onto `AuthError`.
///
/// Codes may carry a trailing detail segment (`WEAK_PASSWORD : ...`), so
/// matching is on the leading token.
fn map_provider_code(message: &str) -> AuthError {
    let code = message.split_whitespace().next().unwrap_or("");
    match code {
        "EMAIL_EXISTS" => AuthError::AccountExists,
        "EMAIL_NOT_FOUND" => AuthError::AccountNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "WEAK_PASSWORD" => {
            AuthError::InvalidCredentials
        }
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" => AuthError::NotAuthenticated,
        _ => AuthError::network(format!("provider error: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FederatedCredential;
    use secrecy::SecretString;

    struct StaticCredentialSource;

    #[async_trait]
    impl FederatedTokenSource for StaticCredentialSource {
        async fn acquire(&self) -> Result<FederatedCredential, AuthError> {
            Ok(FederatedCredential {
                provider_id: "google.com".to_string(),
                id_token: SecretString::new("oauth-id-token".to_string()),
                request_uri: "https://app.example.com/auth".to_string(),
            })
        }
    }

    fn test_config() -> IdentityConfig {
        IdentityConfig {
            endpoint: "https://identity.example.com/".to_string(),
            api_key: SecretString::new("test-key".to_string()),
            stored_id_token: None,
            request_timeout_secs: 10,
        }
    }

    fn test_provider() -> HttpIdentityProvider {
        HttpIdentityProvider::new(test_config(), Arc::new(StaticCredentialSource))
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let provider = test_provider();
        assert_eq!(
            provider.endpoint("signUp"),
            "https://identity.example.com/v1/accounts:signUp?key=test-key"
        );
    }

    #[test]
    fn maps_known_provider_codes() {
        assert!(matches!(map_provider_code("EMAIL_EXISTS"), AuthError::AccountExists));
        assert!(matches!(
            map_provider_code("EMAIL_NOT_FOUND"),
            AuthError::AccountNotFound
        ));
        assert!(matches!(
            map_provider_code("INVALID_PASSWORD"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_provider_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_provider_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_provider_code("TOKEN_EXPIRED"),
            AuthError::NotAuthenticated
        ));
    }

    #[test]
    fn unknown_provider_code_becomes_network_error() {
        let err = map_provider_code("QUOTA_EXCEEDED");
        assert!(err.is_transient());
    }

    #[test]
    fn unparseable_error_body_becomes_network_error() {
        let err = map_error_body(502, "<html>bad gateway</html>");
        assert!(err.is_transient());
    }

    #[test]
    fn error_body_with_code_is_mapped() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#;
        assert!(matches!(map_error_body(400, body), AuthError::AccountExists));
    }

    #[test]
    fn account_dto_parses_and_converts() {
        let json = r#"{
            "uid": "u-42",
            "email": "ada@example.com",
            "displayName": "Ada",
            "emailVerified": true,
            "createdAt": "2026-01-10T09:00:00Z",
            "lastSignInAt": "2026-08-01T12:30:00Z"
        }"#;
        let dto: AccountDto = serde_json::from_str(json).unwrap();
        let identity = dto.into_identity().unwrap();

        assert_eq!(identity.uid.as_str(), "u-42");
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert!(identity.photo_url.is_none());
        assert!(identity.email_verified);
    }

    #[test]
    fn account_dto_with_empty_uid_is_rejected() {
        let json = r#"{
            "uid": "",
            "createdAt": "2026-01-10T09:00:00Z",
            "lastSignInAt": "2026-08-01T12:30:00Z"
        }"#;
        let dto: AccountDto = serde_json::from_str(json).unwrap();
        assert!(dto.into_identity().is_err());
    }

    #[tokio::test]
    async fn operations_without_session_fail_not_authenticated() {
        let provider = test_provider();
        let result = provider
            .update_profile(&ProfileUpdate::new().display_name("X"))
            .await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn sign_out_without_session_resolves_signed_out() {
        let provider = test_provider();
        provider.sign_out().await.unwrap();
        assert_eq!(
            *provider.session_signal().borrow(),
            SessionSignal::Resolved(None)
        );
    }

    #[tokio::test]
    async fn restore_session_without_stored_token_resolves_signed_out() {
        let provider = test_provider();
        assert_eq!(*provider.session_signal().borrow(), SessionSignal::Initializing);

        provider.restore_session().await;
        assert_eq!(
            *provider.session_signal().borrow(),
            SessionSignal::Resolved(None)
        );
    }

    #[test]
    fn http_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpIdentityProvider>();
    }

    #[tokio::test]
    #[ignore = "Requires a live identity toolkit deployment"]
    async fn integration_sign_in_round_trip() {
        // Set LEARNSPHERE__IDENTITY__ENDPOINT and LEARNSPHERE__IDENTITY__API_KEY
        // plus TEST_IDENTITY_EMAIL / TEST_IDENTITY_PASSWORD to run.
        let config = crate::config::AppConfig::load().expect("config");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
            .try_init();
        let provider = HttpIdentityProvider::new(config.identity, Arc::new(StaticCredentialSource));

        let email = std::env::var("TEST_IDENTITY_EMAIL").expect("TEST_IDENTITY_EMAIL");
        let password =
            SecretString::new(std::env::var("TEST_IDENTITY_PASSWORD").expect("TEST_IDENTITY_PASSWORD"));

        let identity = provider.sign_in(&email, &password).await.expect("sign in");
        assert_eq!(identity.email, email);
        provider.sign_out().await.expect("sign out");
    }
}
