//! Session manager: login, logout, startup check and expiry handling.

use std::sync::{Arc, Weak};

use adboard_client::{ApiClient, ApiError, AuthEvent, RegisterRequest, Result, User};
use adboard_login::clear_session_credentials;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::{SessionState, SessionStatus};

/// Holds the session state and drives its transitions.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    client: ApiClient,
    state: watch::Sender<SessionState>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner { client, state }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    fn set_state(&self, next: SessionState) {
        self.inner.state.send_modify(|state| {
            if state.status != next.status {
                debug!(from = %state.status, to = %next.status, "Session transition");
            }
            *state = next;
        });
    }

    fn clear_access_token(&self) {
        if let Err(e) = self.inner.client.credentials().clear_access_token() {
            warn!(error = %e, "Failed to remove stored access token");
        }
    }

    /// Restore the session from a stored token.
    ///
    /// Never fails: a rejected or unverifiable token leaves the session
    /// anonymous. The token itself is left in place.
    pub async fn initialize(&self) {
        if !self.inner.client.credentials().has_access_token() {
            debug!("No stored access token");
            self.set_state(SessionState::anonymous());
            return;
        }

        self.set_state(SessionState {
            user: None,
            status: SessionStatus::Checking,
            loading: true,
        });

        match self.inner.client.current_user().await {
            Ok(user) => {
                info!(user_id = user.id, "Restored session");
                self.set_state(SessionState::authenticated(user));
            }
            Err(e) => {
                warn!(error = %e, "Could not verify stored access token");
                // An expiry notice raised meanwhile takes precedence.
                self.inner.state.send_if_modified(|state| {
                    if state.status == SessionStatus::Checking {
                        *state = SessionState::anonymous();
                        true
                    } else {
                        false
                    }
                });
            }
        }
    }

    /// Log in with email and password.
    ///
    /// Rejected credentials return [`ApiError::Authentication`] with nothing
    /// stored and the state untouched.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User> {
        let token = self
            .inner
            .client
            .exchange_credentials(email, password)
            .await?;

        self.inner
            .client
            .credentials()
            .set_access_token(token.access_token)
            .map_err(|e| ApiError::Storage(format!("{e:#}")))?;
        self.dismiss_expired();

        let user = self.inner.client.current_user().await?;
        info!(user_id = user.id, role = %user.role, "Logged in");
        self.set_state(SessionState::authenticated(user.clone()));
        Ok(user)
    }

    /// Create an account, then log in with the same credentials.
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        company_name: Option<&str>,
    ) -> Result<User> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
            company_name: company_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        };
        self.inner.client.register(&request).await?;
        self.login(email, password).await
    }

    /// End the session.
    ///
    /// The server-side revoke is best effort; local credentials are always
    /// removed.
    pub async fn logout(&self) {
        if let Err(e) = self.inner.client.revoke_session().await {
            warn!(error = %e, "Failed to revoke session on server");
        }
        clear_session_credentials(self.inner.client.credentials().as_ref());
        info!("Logged out");
        self.set_state(SessionState::anonymous());
    }

    /// Tear the session down after a failed token refresh.
    pub fn handle_session_expired(&self) {
        warn!("Session expired");
        self.clear_access_token();
        self.set_state(SessionState::expired());
    }

    /// Hide the expiry notice without doing anything else.
    pub fn dismiss_expired(&self) {
        self.inner.state.send_if_modified(|state| {
            if state.status == SessionStatus::Expired {
                debug!("Expiry notice dismissed");
                state.status = SessionStatus::Anonymous;
                true
            } else {
                false
            }
        });
    }

    /// Acknowledge the expiry notice and return to a clean logged-out state.
    pub fn acknowledge_expired(&self) {
        self.clear_access_token();
        self.set_state(SessionState::anonymous());
    }

    /// Run [`handle_session_expired`](Self::handle_session_expired) for every
    /// expiry broadcast by the client.
    ///
    /// The subscription is taken before the task starts, so no event sent
    /// after this call returns is missed. The task ends when the client is
    /// dropped or the session manager goes away.
    pub fn spawn_expiry_listener(&self) -> JoinHandle<()> {
        let events = self.inner.client.subscribe();
        let session = Arc::downgrade(&self.inner);
        tokio::spawn(listen_for_expiry(events, session))
    }
}

async fn listen_for_expiry(mut events: broadcast::Receiver<AuthEvent>, session: Weak<Inner>) {
    loop {
        match events.recv().await {
            Ok(AuthEvent::SessionExpired) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Expiry listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
        let Some(inner) = session.upgrade() else {
            break;
        };
        SessionManager { inner }.handle_session_expired();
    }
    debug!("Expiry listener stopped");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use adboard_client::{ClientConfig, REFRESH_PATH, Role};
    use adboard_login::{
        CredentialStore, ExposeSecret, MemoryCredentialStore, REFRESH_TOKEN_KEY,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn session_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> SessionManager {
        let config = ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        };
        SessionManager::new(ApiClient::new(config, store).unwrap())
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn viewer() -> User {
        User {
            id: 1,
            email: "a@b.com".to_string(),
            role: Role::Viewer,
            company_id: None,
            is_active: true,
        }
    }

    fn stored_token(store: &MemoryCredentialStore) -> Option<String> {
        store
            .access_token()
            .map(|token| token.expose_secret().to_string())
    }

    async fn mount_me(server: &MockServer, token: &str) {
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 1, "email": "a@b.com", "role": "viewer"})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_initialize_without_token_skips_network() {
        let server = MockServer::start().await;
        let session = session_for(&server, Arc::new(MemoryCredentialStore::new()));

        session.initialize().await;

        assert_eq!(session.state(), SessionState::anonymous());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_restores_user() {
        let server = MockServer::start().await;
        mount_me(&server, "T1").await;
        let session = session_for(
            &server,
            Arc::new(MemoryCredentialStore::with_access_token("T1")),
        );

        session.initialize().await;

        assert_eq!(session.state(), SessionState::authenticated(viewer()));
    }

    #[tokio::test]
    async fn test_initialize_failure_keeps_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::with_access_token("T1"));
        let session = session_for(&server, store.clone());

        session.initialize().await;

        let state = session.state();
        assert_eq!(state.status, SessionStatus::Anonymous);
        assert!(state.user.is_none());
        assert!(!state.loading);
        assert_eq!(stored_token(&store).as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_initialize_expiry_wins_over_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::with_access_token("STALE"));
        let session = session_for(&server, store.clone());
        let listener = session.spawn_expiry_listener();

        session.initialize().await;

        let mut states = session.subscribe();
        tokio::time::timeout(
            Duration::from_secs(2),
            states.wait_for(|state| state.session_expired()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(session.state(), SessionState::expired());
        assert!(stored_token(&store).is_none());

        listener.abort();
    }

    #[tokio::test]
    async fn test_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("username=a%40b.com"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "T1", "token_type": "bearer"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_me(&server, "T1").await;

        let store = Arc::new(MemoryCredentialStore::new());
        let session = session_for(&server, store.clone());
        session.initialize().await;

        let user = session.login("a@b.com", &secret("pw")).await.unwrap();

        assert_eq!(user, viewer());
        assert_eq!(session.state(), SessionState::authenticated(viewer()));
        assert!(!session.state().session_expired());
        assert_eq!(stored_token(&store).as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_invalid_login_changes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Incorrect username or password"})),
            )
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        let session = session_for(&server, store.clone());
        session.initialize().await;
        let before = session.state();

        let err = session.login("a@b.com", &secret("bad")).await.unwrap_err();

        assert!(matches!(err, ApiError::Authentication(_)));
        assert_eq!(session.state(), before);
        assert!(stored_token(&store).is_none());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "email": "a@b.com", "role": "viewer", "is_active": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "T1", "token_type": "bearer"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_me(&server, "T1").await;

        let session = session_for(&server, Arc::new(MemoryCredentialStore::new()));
        let user = session
            .register("a@b.com", &secret("pw"), Some("  "))
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert!(session.state().is_authenticated());
    }

    #[tokio::test]
    async fn test_register_rejected_does_not_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_for(&server, Arc::new(MemoryCredentialStore::new()));
        let err = session
            .register("a@b.com", &secret("pw"), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation("Email already registered".to_string())
        );
    }

    #[tokio::test]
    async fn test_logout_survives_failing_revoke() {
        let server = MockServer::start().await;
        mount_me(&server, "T1").await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_access_token("T1"));
        store.save(REFRESH_TOKEN_KEY, secret("rt-1")).unwrap();
        let session = session_for(&server, store.clone());
        session.initialize().await;
        assert!(session.state().is_authenticated());

        session.logout().await;

        assert_eq!(session.state(), SessionState::anonymous());
        assert!(stored_token(&store).is_none());
        assert!(store.refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_expiry_dismiss_and_acknowledge() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryCredentialStore::with_access_token("T1"));
        let session = session_for(&server, store.clone());

        session.handle_session_expired();
        assert_eq!(session.state(), SessionState::expired());
        assert!(stored_token(&store).is_none());

        session.dismiss_expired();
        assert_eq!(session.state(), SessionState::anonymous());

        // Dismissing outside the expired state is a no-op.
        session.dismiss_expired();
        assert_eq!(session.state(), SessionState::anonymous());

        store.set_access_token(secret("T2")).unwrap();
        session.handle_session_expired();
        session.acknowledge_expired();
        assert_eq!(session.state(), SessionState::anonymous());
        assert!(stored_token(&store).is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_expires_session() {
        let server = MockServer::start().await;
        mount_me(&server, "OLD").await;
        Mock::given(method("GET"))
            .and(path("/campaigns/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid refresh token"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_access_token("OLD"));
        let session = session_for(&server, store.clone());
        let listener = session.spawn_expiry_listener();
        session.initialize().await;
        assert!(session.state().is_authenticated());

        let mut states = session.subscribe();
        let err = session
            .client()
            .list_campaigns(&Default::default())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        tokio::time::timeout(
            Duration::from_secs(2),
            states.wait_for(|state| state.session_expired()),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(stored_token(&store).is_none());
        assert!(session.state().user.is_none());

        // Logging in again clears the notice.
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "NEW", "token_type": "bearer"})),
            )
            .mount(&server)
            .await;
        mount_me(&server, "NEW").await;
        session.login("a@b.com", &secret("pw")).await.unwrap();
        assert_eq!(session.state(), SessionState::authenticated(viewer()));

        listener.abort();
    }

    #[tokio::test]
    async fn test_listener_stops_when_client_dropped() {
        let server = MockServer::start().await;
        let session = session_for(&server, Arc::new(MemoryCredentialStore::new()));
        let listener = session.spawn_expiry_listener();

        drop(session);

        tokio::time::timeout(Duration::from_secs(2), listener)
            .await
            .unwrap()
            .unwrap();
    }
}
