//! Client-side session manager.
//!
//! Holds the bearer token for one signed-in principal, attaches it to API
//! calls and mirrors the server's inactivity rule with an owned timer. The
//! server-side idle check stays authoritative; the timer only lets the
//! embedding UI return to the login screen without waiting for a 401.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use url::Url;

use super::timer::InactivityTimer;
use super::ClientError;
use crate::auth::PrincipalKind;

/// Default administrator idle period, matching the server.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent string for API calls.
const USER_AGENT: &str = "academy-client/0.1";

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session, or the user logged out.
    LoggedOut,
    /// A session is held for the given principal kind.
    Active(PrincipalKind),
    /// The session ended through inactivity or a rejected token.
    Expired,
}

/// Administrator profile returned at login.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// Student profile returned at login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub course: String,
    pub batch: String,
}

#[derive(Deserialize)]
struct AdminLoginBody {
    token: String,
    admin: AdminProfile,
}

#[derive(Deserialize)]
struct StudentLoginBody {
    token: String,
    student: StudentProfile,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

struct Session {
    generation: u64,
    token: String,
    kind: PrincipalKind,
    timer: Option<InactivityTimer>,
}

struct Shared {
    session: Mutex<Option<Session>>,
    generation: Mutex<u64>,
    state: watch::Sender<SessionState>,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        *generation
    }

    /// End the session and publish `state`.
    ///
    /// With `only` set, a session from a later login is left alone.
    fn end(&self, state: SessionState, only: Option<u64>) {
        let ended = {
            let mut session = self.session();
            let stale = matches!(
                (session.as_ref(), only),
                (Some(current), Some(generation)) if current.generation != generation
            );
            if stale {
                return;
            }
            session.take()
        };
        if ended.is_some() || state == SessionState::LoggedOut {
            self.state.send_replace(state);
        }
    }
}

/// Session manager for the academy API.
pub struct AuthManager {
    http: Client,
    base: Url,
    admin_idle: Duration,
    student_idle: Option<Duration>,
    shared: Arc<Shared>,
}

impl AuthManager {
    /// Create a manager for the API at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        let (state, _) = watch::channel(SessionState::LoggedOut);

        Ok(Self {
            http,
            base: Url::parse(base_url)?,
            admin_idle: DEFAULT_IDLE_TIMEOUT,
            student_idle: None,
            shared: Arc::new(Shared {
                session: Mutex::new(None),
                generation: Mutex::new(0),
                state,
            }),
        })
    }

    /// Set the administrator idle period.
    pub fn with_idle_timeout(mut self, idle: Duration) -> Self {
        self.admin_idle = idle;
        self
    }

    /// Enable a client-side idle period for student sessions.
    pub fn with_student_idle_timeout(mut self, idle: Option<Duration>) -> Self {
        self.student_idle = idle;
        self
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.shared.state.borrow()
    }

    /// Current bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.shared.session().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.session().is_some()
    }

    /// Sign in as an administrator.
    pub async fn login_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminProfile, ClientError> {
        let body: AdminLoginBody = self
            .request(
                Method::POST,
                "/api/auth/login",
                Some(&json!({ "email": email, "password": password })),
                None,
            )
            .await?;

        self.begin_session(body.token, PrincipalKind::Admin);
        tracing::info!(admin_id = body.admin.id, "Admin signed in");
        Ok(body.admin)
    }

    /// Sign in as a student.
    pub async fn login_student(
        &self,
        student_id: &str,
        password: &str,
    ) -> Result<StudentProfile, ClientError> {
        let body: StudentLoginBody = self
            .request(
                Method::POST,
                "/api/students/login",
                Some(&json!({ "studentId": student_id, "password": password })),
                None,
            )
            .await?;

        self.begin_session(body.token, PrincipalKind::Student);
        tracing::info!(student_id = body.student.id, "Student signed in");
        Ok(body.student)
    }

    /// Record user activity, restarting the idle countdown.
    pub fn record_activity(&self) {
        if let Some(timer) = self.shared.session().as_ref().and_then(|s| s.timer.as_ref()) {
            timer.reset();
        }
    }

    /// Check the administrator session with the server.
    ///
    /// Returns false and ends the session if the server rejects the token.
    /// Student sessions have no verify endpoint and report local state.
    pub async fn verify(&self) -> Result<bool, ClientError> {
        match self.current_kind() {
            None => Ok(false),
            Some(PrincipalKind::Student) => Ok(true),
            Some(PrincipalKind::Admin) => {
                match self
                    .authorized::<serde_json::Value, ()>(Method::POST, "/api/auth/verify", None)
                    .await
                {
                    Ok(_) => Ok(true),
                    Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED.as_u16()) => Ok(false),
                    Err(ClientError::NotLoggedIn) => Ok(false),
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Sign out, cancelling the idle timer.
    ///
    /// The server call is best effort; the local session always ends.
    pub async fn logout(&self) {
        if self.current_kind() == Some(PrincipalKind::Admin) {
            if let Err(e) = self
                .authorized::<serde_json::Value, ()>(Method::POST, "/api/auth/logout", None)
                .await
            {
                tracing::debug!("Logout request failed: {}", e);
            }
        }
        self.shared.end(SessionState::LoggedOut, None);
    }

    /// GET an API path with the session token.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.authorized::<T, ()>(Method::GET, path, None).await
    }

    /// POST a JSON body with the session token.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.authorized(Method::POST, path, Some(body)).await
    }

    /// PUT a JSON body with the session token.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.authorized(Method::PUT, path, Some(body)).await
    }

    fn current_kind(&self) -> Option<PrincipalKind> {
        self.shared.session().as_ref().map(|s| s.kind)
    }

    fn begin_session(&self, token: String, kind: PrincipalKind) {
        let generation = self.shared.next_generation();
        let idle = match kind {
            PrincipalKind::Admin => Some(self.admin_idle),
            PrincipalKind::Student => self.student_idle,
        };

        let timer = idle.map(|idle| {
            let weak: Weak<Shared> = Arc::downgrade(&self.shared);
            InactivityTimer::start(idle, move || {
                if let Some(shared) = weak.upgrade() {
                    tracing::info!("Session expired due to inactivity");
                    shared.end(SessionState::Expired, Some(generation));
                }
            })
        });

        let previous = self.shared.session().replace(Session {
            generation,
            token,
            kind,
            timer,
        });
        drop(previous);
        self.shared.state.send_replace(SessionState::Active(kind));
    }

    async fn authorized<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (token, generation) = self
            .shared
            .session()
            .as_ref()
            .map(|s| (s.token.clone(), s.generation))
            .ok_or(ClientError::NotLoggedIn)?;

        match self.request(method, path, body, Some(&token)).await {
            Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED.as_u16()) => {
                tracing::info!("Server rejected session token, signing out");
                self.shared.end(SessionState::Expired, Some(generation));
                Err(e)
            }
            Ok(value) => {
                self.record_activity();
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.base.join(path)?;
        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("base", &self.base.as_str())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(30 * 60);

    fn manager() -> AuthManager {
        AuthManager::new("http://127.0.0.1:9").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires() {
        let auth = manager();
        let mut states = auth.subscribe();

        auth.begin_session("token".to_string(), PrincipalKind::Admin);
        assert_eq!(auth.state(), SessionState::Active(PrincipalKind::Admin));
        assert_eq!(auth.token().as_deref(), Some("token"));

        tokio::time::sleep(IDLE + Duration::from_secs(60)).await;

        states
            .wait_for(|s| *s == SessionState::Expired)
            .await
            .unwrap();
        assert!(auth.token().is_none());
        assert!(!auth.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_keeps_session() {
        let auth = manager();
        auth.begin_session("token".to_string(), PrincipalKind::Admin);

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_secs(20 * 60)).await;
            auth.record_activity();
        }

        assert_eq!(auth.state(), SessionState::Active(PrincipalKind::Admin));
        assert!(auth.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_cancels_timer() {
        let auth = manager();
        auth.begin_session("token".to_string(), PrincipalKind::Student);
        auth.logout().await;
        assert_eq!(auth.state(), SessionState::LoggedOut);

        tokio::time::sleep(IDLE * 2).await;
        assert_eq!(auth.state(), SessionState::LoggedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_student_sessions_have_no_timer_by_default() {
        let auth = manager();
        auth.begin_session("token".to_string(), PrincipalKind::Student);

        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(auth.state(), SessionState::Active(PrincipalKind::Student));
    }

    #[tokio::test(start_paused = true)]
    async fn test_relogin_ignores_stale_timer() {
        let auth = manager().with_idle_timeout(Duration::from_secs(60));
        auth.begin_session("first".to_string(), PrincipalKind::Admin);
        tokio::time::sleep(Duration::from_secs(50)).await;

        auth.begin_session("second".to_string(), PrincipalKind::Admin);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(auth.token().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_verify_without_session() {
        let auth = manager();
        assert!(!auth.verify().await.unwrap());
        assert!(matches!(
            auth.get::<serde_json::Value>("/api/admin/students").await,
            Err(ClientError::NotLoggedIn)
        ));
    }
}
