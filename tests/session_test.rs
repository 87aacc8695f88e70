use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use chrono::Utc;
use spotidash::{error::DashboardError, management::SessionManager, types::Token};

// Helper to create a token that is comfortably inside its validity window
fn fresh_token(access: &str, refresh: Option<&str>) -> Token {
    Token {
        access_token: access.to_string(),
        refresh_token: refresh.map(|s| s.to_string()),
        scope: None,
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

// Helper to create a token that is already past the expiry buffer
fn expired_token(access: &str, refresh: Option<&str>) -> Token {
    Token {
        access_token: access.to_string(),
        refresh_token: refresh.map(|s| s.to_string()),
        scope: None,
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64 - 7200,
    }
}

#[tokio::test]
async fn test_guard_passes_through_success_without_exchange() {
    let session = SessionManager::new();
    session.install(fresh_token("bearer-1", Some("refresh-1"))).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let exchanges = Arc::new(AtomicUsize::new(0));

    let calls_in = Arc::clone(&calls);
    let exchanges_in = Arc::clone(&exchanges);
    let result = session
        .with_refresh_via(
            move |token: String| {
                let calls = Arc::clone(&calls_in);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(token)
                }
            },
            async move |_refresh: &str| {
                exchanges_in.fetch_add(1, Ordering::SeqCst);
                Ok(fresh_token("unused", None))
            },
        )
        .await;

    assert_eq!(result.unwrap(), "bearer-1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(exchanges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_guard_refreshes_once_and_retries_once() {
    let session = SessionManager::new();
    session.install(fresh_token("stale", Some("refresh-1"))).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let exchanges = Arc::new(AtomicUsize::new(0));

    let calls_in = Arc::clone(&calls);
    let exchanges_in = Arc::clone(&exchanges);
    let result = session
        .with_refresh_via(
            move |token: String| {
                let calls = Arc::clone(&calls_in);
                async move {
                    // First attempt is rejected, the retry succeeds
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(DashboardError::Unauthorized)
                    } else {
                        Ok(token)
                    }
                }
            },
            async move |refresh: &str| {
                exchanges_in.fetch_add(1, Ordering::SeqCst);
                assert_eq!(refresh, "refresh-1");
                Ok(fresh_token("minted", Some("refresh-2")))
            },
        )
        .await;

    // The retry ran with the freshly minted bearer token
    assert_eq!(result.unwrap(), "minted");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
    assert_eq!(session.bearer().await.unwrap(), "minted");
}

#[tokio::test]
async fn test_guard_propagates_second_unauthorized_without_second_exchange() {
    let session = SessionManager::new();
    session.install(fresh_token("stale", Some("refresh-1"))).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let exchanges = Arc::new(AtomicUsize::new(0));

    let calls_in = Arc::clone(&calls);
    let exchanges_in = Arc::clone(&exchanges);
    let result: Result<String, _> = session
        .with_refresh_via(
            move |_token: String| {
                let calls = Arc::clone(&calls_in);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(DashboardError::Unauthorized)
                }
            },
            async move |_refresh: &str| {
                exchanges_in.fetch_add(1, Ordering::SeqCst);
                Ok(fresh_token("minted", None))
            },
        )
        .await;

    assert!(matches!(result, Err(DashboardError::Unauthorized)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    // Exactly one exchange even though the retry failed again
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_guard_without_refresh_credential_clears_session() {
    let session = SessionManager::new();
    session.install(fresh_token("stale", None)).await;

    let exchanges = Arc::new(AtomicUsize::new(0));
    let exchanges_in = Arc::clone(&exchanges);
    let result: Result<String, _> = session
        .with_refresh_via(
            |_token: String| async move { Err(DashboardError::Unauthorized) },
            async move |_refresh: &str| {
                exchanges_in.fetch_add(1, Ordering::SeqCst);
                Ok(fresh_token("minted", None))
            },
        )
        .await;

    assert!(matches!(result, Err(DashboardError::ReauthRequired)));
    assert_eq!(exchanges.load(Ordering::SeqCst), 0);
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_guard_failed_exchange_clears_session() {
    let session = SessionManager::new();
    session.install(fresh_token("stale", Some("refresh-1"))).await;

    let result: Result<String, _> = session
        .with_refresh_via(
            |_token: String| async move { Err(DashboardError::Unauthorized) },
            async |_refresh: &str| {
                Err(DashboardError::TokenExchange("revoked".to_string()))
            },
        )
        .await;

    assert!(matches!(result, Err(DashboardError::ReauthRequired)));
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_guard_without_session_is_unauthorized() {
    let session = SessionManager::new();

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in = Arc::clone(&calls);
    let result: Result<String, _> = session
        .with_refresh_via(
            move |token: String| {
                let calls = Arc::clone(&calls_in);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(token)
                }
            },
            async |_refresh: &str| Ok(fresh_token("unused", None)),
        )
        .await;

    assert!(matches!(result, Err(DashboardError::Unauthorized)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_guard_skips_doomed_call_for_expired_token() {
    let session = SessionManager::new();
    session.install(expired_token("stale", Some("refresh-1"))).await;

    let seen = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
    let seen_in = Arc::clone(&seen);
    let result = session
        .with_refresh_via(
            move |token: String| {
                let seen = Arc::clone(&seen_in);
                async move {
                    seen.lock().unwrap().push(token.clone());
                    Ok(token)
                }
            },
            async |_refresh: &str| Ok(fresh_token("minted", None)),
        )
        .await;

    assert_eq!(result.unwrap(), "minted");
    // The expired bearer never reached the provider
    assert_eq!(*seen.lock().unwrap(), vec!["minted".to_string()]);
}

#[tokio::test]
async fn test_concurrent_guarded_calls_share_one_exchange() {
    let session = SessionManager::new();
    session.install(expired_token("stale", Some("refresh-1"))).await;

    let exchanges = Arc::new(AtomicUsize::new(0));

    // Seven concurrent calls over one expired session, the shape of a
    // dashboard page load. Only the first may present the refresh
    // credential; the rest must reuse the freshly minted token.
    let mut handles = Vec::new();
    for _ in 0..7 {
        let session = session.clone();
        let exchanges = Arc::clone(&exchanges);
        handles.push(tokio::spawn(async move {
            session
                .with_refresh_via(
                    |token: String| async move { Ok(token) },
                    async move |refresh: &str| {
                        // A rotating provider consumes the credential on
                        // first use; a second presentation would fail.
                        assert_eq!(refresh, "refresh-1");
                        exchanges.fetch_add(1, Ordering::SeqCst);
                        Ok(fresh_token("minted", Some("refresh-2")))
                    },
                )
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "minted");
    }
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_guard_keeps_refresh_credential_when_not_rotated() {
    let session = SessionManager::new();
    session.install(fresh_token("stale", Some("refresh-1"))).await;

    // First cycle: provider refreshes the bearer but does not rotate the
    // refresh credential
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in = Arc::clone(&calls);
    session
        .with_refresh_via(
            move |token: String| {
                let calls = Arc::clone(&calls_in);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(DashboardError::Unauthorized)
                    } else {
                        Ok(token)
                    }
                }
            },
            async |_refresh: &str| Ok(fresh_token("minted", None)),
        )
        .await
        .unwrap();

    // Second cycle: the original credential must still be presented
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in = Arc::clone(&calls);
    session
        .with_refresh_via(
            move |token: String| {
                let calls = Arc::clone(&calls_in);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(DashboardError::Unauthorized)
                    } else {
                        Ok(token)
                    }
                }
            },
            async |refresh: &str| {
                assert_eq!(refresh, "refresh-1");
                Ok(fresh_token("minted-again", None))
            },
        )
        .await
        .unwrap();

    assert_eq!(session.bearer().await.unwrap(), "minted-again");
}
