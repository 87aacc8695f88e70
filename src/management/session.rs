use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{error::DashboardError, spotify, types::Token, warning};

/// Holds the single credential pair for the dashboard session and implements
/// the refresh guard around provider calls.
///
/// The session is an explicit object passed through request context (an
/// axum `Extension`) rather than global mutable state. It is initialized by
/// the OAuth callback, mutated only by the refresh guard, and torn down at
/// logout. At most one bearer token and one refresh credential are held at
/// a time.
#[derive(Clone)]
pub struct SessionManager {
    token: Arc<Mutex<Option<Token>>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager {
            token: Arc::new(Mutex::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Installs a freshly exchanged token pair, replacing any previous one.
    pub async fn install(&self, token: Token) {
        let mut lock = self.token.lock().await;
        *lock = Some(token);
    }

    /// Clears both credentials. Used by logout and by the guard when
    /// recovery is impossible.
    pub async fn clear(&self) {
        let mut lock = self.token.lock().await;
        *lock = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Returns the current bearer token, or `Unauthorized` when no session
    /// is established.
    pub async fn bearer(&self) -> Result<String, DashboardError> {
        let lock = self.token.lock().await;
        lock.as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(DashboardError::Unauthorized)
    }

    async fn refresh_credential(&self) -> Option<String> {
        let lock = self.token.lock().await;
        lock.as_ref().and_then(|t| t.refresh_token.clone())
    }

    async fn is_expired(&self) -> bool {
        let lock = self.token.lock().await;
        lock.as_ref().map(|t| t.is_expired()).unwrap_or(false)
    }

    /// Installs a refreshed token, keeping the previous refresh credential
    /// when the provider did not rotate it.
    async fn install_refreshed(&self, mut token: Token) {
        let mut lock = self.token.lock().await;
        if token.refresh_token.is_none() {
            token.refresh_token = lock.as_ref().and_then(|t| t.refresh_token.clone());
        }
        *lock = Some(token);
    }

    /// Runs a provider call under the session refresh guard.
    ///
    /// On an authorization failure the stored refresh credential is
    /// exchanged for a new bearer token (one network round trip), the new
    /// pair is persisted, and the call is retried exactly once. A missing
    /// refresh credential or a failed exchange clears all credentials and
    /// surfaces [`DashboardError::ReauthRequired`]. A second consecutive
    /// authorization failure propagates without another exchange. This is
    /// the only retry policy in the system.
    ///
    /// Concurrent guarded calls over the same session share one exchange:
    /// the exchange is serialized, and a caller that finds a fresh token
    /// installed by an earlier one retries with it instead of presenting
    /// the already-consumed refresh credential again.
    pub async fn with_refresh<T, C, Fut>(&self, call: C) -> Result<T, DashboardError>
    where
        C: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, DashboardError>>,
    {
        self.with_refresh_via(call, spotify::auth::refresh_token).await
    }

    /// Guard core with an injectable refresh exchange, shared by
    /// [`with_refresh`](Self::with_refresh) and the tests.
    pub async fn with_refresh_via<T, C, Fut, R>(
        &self,
        call: C,
        exchange: R,
    ) -> Result<T, DashboardError>
    where
        C: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, DashboardError>>,
        R: for<'a> AsyncFnOnce(&'a str) -> Result<Token, DashboardError>,
    {
        let bearer = self.bearer().await?;

        // A token already inside the expiry buffer fails the provider call
        // anyway, so skip the doomed round trip and go straight to the
        // refresh. Either way at most one exchange happens.
        if !self.is_expired().await {
            match call(bearer.clone()).await {
                Err(DashboardError::Unauthorized) => {}
                other => return other,
            }
        }

        // Serialize the exchange: concurrent calls that hit expiry together
        // line up here, and every one after the first finds a fresh token
        // already installed.
        let guard = self.refresh_lock.lock().await;

        let current = match self.bearer().await {
            Ok(current) => current,
            // An earlier caller's exchange failed and cleared the session.
            Err(_) => return Err(DashboardError::ReauthRequired),
        };
        if current != bearer {
            drop(guard);
            return call(current).await;
        }

        let Some(refresh) = self.refresh_credential().await else {
            self.clear().await;
            return Err(DashboardError::ReauthRequired);
        };

        let token = match exchange(refresh.as_str()).await {
            Ok(token) => token,
            Err(e) => {
                warning!("Token refresh failed: {}", e);
                self.clear().await;
                return Err(DashboardError::ReauthRequired);
            }
        };

        self.install_refreshed(token).await;
        drop(guard);

        let bearer = self.bearer().await?;
        call(bearer).await
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
