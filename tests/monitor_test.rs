use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use spotidash::{
    management::{PlaybackMonitor, reconcile},
    types::{PlaybackState, RepeatState, Track},
};

fn snapshot(track_id: &str, is_playing: bool, progress_ms: u64) -> PlaybackState {
    PlaybackState {
        is_playing,
        item: Some(Track {
            id: track_id.to_string(),
            name: format!("Track {}", track_id),
            artists: Vec::new(),
            album: None,
            external_urls: Default::default(),
            duration_ms: Some(200_000),
        }),
        progress_ms: Some(progress_ms),
        device: None,
        shuffle_state: false,
        repeat_state: RepeatState::Off,
    }
}

#[test]
fn test_reconcile_preserves_identity_for_identical_snapshots() {
    let prev = Some(Arc::new(snapshot("a", true, 1000)));

    // Same track, same flag, only progress moved: previous Arc kept
    let merged = reconcile(&prev, Some(snapshot("a", true, 2000)));
    assert!(Arc::ptr_eq(prev.as_ref().unwrap(), merged.as_ref().unwrap()));
}

#[test]
fn test_reconcile_replaces_on_track_change() {
    let prev = Some(Arc::new(snapshot("a", true, 1000)));

    let merged = reconcile(&prev, Some(snapshot("b", true, 0)));
    assert!(!Arc::ptr_eq(prev.as_ref().unwrap(), merged.as_ref().unwrap()));
    assert_eq!(merged.unwrap().item.as_ref().unwrap().id, "b");
}

#[test]
fn test_reconcile_replaces_on_playing_flag_change() {
    let prev = Some(Arc::new(snapshot("a", true, 1000)));

    let merged = reconcile(&prev, Some(snapshot("a", false, 1000)));
    assert!(!Arc::ptr_eq(prev.as_ref().unwrap(), merged.as_ref().unwrap()));
    assert!(!merged.unwrap().is_playing);
}

#[test]
fn test_reconcile_handles_playback_start_and_stop() {
    // Nothing -> something
    let merged = reconcile(&None, Some(snapshot("a", true, 0)));
    assert!(merged.is_some());

    // Something -> nothing
    let prev = Some(Arc::new(snapshot("a", true, 0)));
    let merged = reconcile(&prev, None);
    assert!(merged.is_none());

    // Nothing -> nothing
    assert!(reconcile(&None, None).is_none());
}

#[tokio::test]
async fn test_monitor_publishes_only_changed_snapshots() {
    // The fetcher walks a fixed sequence: track a twice (second tick only
    // moves progress), then track b forever.
    let tick = Arc::new(AtomicUsize::new(0));
    let tick_in = Arc::clone(&tick);
    let monitor = PlaybackMonitor::spawn(Duration::from_millis(10), move || {
        let tick = Arc::clone(&tick_in);
        async move {
            let n = tick.fetch_add(1, Ordering::SeqCst);
            Ok(match n {
                0 => Some(snapshot("a", true, 0)),
                1 => Some(snapshot("a", true, 1000)),
                _ => Some(snapshot("b", true, 0)),
            })
        }
    });

    let mut rx = monitor.subscribe();

    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("first update")
        .unwrap();
    let first = rx.borrow_and_update().clone().unwrap();
    assert_eq!(first.item.as_ref().unwrap().id, "a");

    // The identical second snapshot must not wake subscribers; the next
    // update is already track b.
    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("second update")
        .unwrap();
    let second = rx.borrow_and_update().clone().unwrap();
    assert_eq!(second.item.as_ref().unwrap().id, "b");
}

#[tokio::test]
async fn test_monitor_skips_failed_ticks() {
    use spotidash::error::DashboardError;

    let tick = Arc::new(AtomicUsize::new(0));
    let tick_in = Arc::clone(&tick);
    let monitor = PlaybackMonitor::spawn(Duration::from_millis(10), move || {
        let tick = Arc::clone(&tick_in);
        async move {
            // First two ticks fail, then playback appears
            if tick.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DashboardError::NoActivePlayback)
            } else {
                Ok(Some(snapshot("a", true, 0)))
            }
        }
    });

    let mut rx = monitor.subscribe();
    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("update after failed ticks")
        .unwrap();
    let state = rx.borrow_and_update().clone().unwrap();
    assert_eq!(state.item.as_ref().unwrap().id, "a");
}

#[tokio::test]
async fn test_dropping_the_monitor_cancels_polling() {
    let tick = Arc::new(AtomicUsize::new(0));
    let tick_in = Arc::clone(&tick);
    let monitor = PlaybackMonitor::spawn(Duration::from_millis(10), move || {
        let tick = Arc::clone(&tick_in);
        async move {
            tick.fetch_add(1, Ordering::SeqCst);
            Ok(Some(snapshot("a", true, 0)))
        }
    });

    let mut rx = monitor.subscribe();
    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("first update")
        .unwrap();

    drop(monitor);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let count_after_drop = tick.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;

    // No further fetches once the view is gone
    assert_eq!(tick.load(Ordering::SeqCst), count_after_drop);
}

#[tokio::test]
async fn test_stop_cancels_polling() {
    let tick = Arc::new(AtomicUsize::new(0));
    let tick_in = Arc::clone(&tick);
    let monitor = PlaybackMonitor::spawn(Duration::from_millis(10), move || {
        let tick = Arc::clone(&tick_in);
        async move {
            tick.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    monitor.stop();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let count_after_stop = tick.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(tick.load(Ordering::SeqCst), count_after_stop);
}
