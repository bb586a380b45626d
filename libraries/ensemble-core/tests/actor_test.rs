//! Coordinator actor round-trips
//!
//! Drives a spawned coordinator through its handle: commands and audio
//! notifications share one mailbox, so everything observed here happened in
//! submission order.

mod common;

use common::{drain_events, playable_backend};
use ensemble_core::{spawn, AudioEvent, CoreConfig, CoreError, CoreEvent, PlaybackState};

#[tokio::test]
async fn full_play_flow_through_the_handle() {
    common::init_tracing();
    let (backend, _, tracks) = playable_backend("dummy", 2);
    let (handle, _task) = spawn(&CoreConfig::default(), vec![backend], None).unwrap();
    let mut rx = handle.subscribe();

    let added = handle
        .tracklist_add(Some(tracks), None, None)
        .await
        .unwrap();
    assert_eq!(added.len(), 2);

    handle.playback_play(None).await.unwrap();
    handle
        .deliver_audio_event(AudioEvent::StreamChanged { uri: None })
        .await
        .unwrap();

    assert_eq!(handle.playback_get_state().await.unwrap(), PlaybackState::Playing);
    assert_eq!(handle.playback_get_current_tlid().await.unwrap(), Some(1));
    assert_eq!(handle.history_get_length().await.unwrap(), 1);

    let events = drain_events(&mut rx);
    assert!(events
        .iter()
        .any(|event| matches!(event, CoreEvent::TrackPlaybackStarted { tl_track } if tl_track.tlid == 1)));
}

#[tokio::test]
async fn cloned_handles_talk_to_the_same_coordinator() {
    common::init_tracing();
    let (backend, _, tracks) = playable_backend("dummy", 3);
    let (handle, _task) = spawn(&CoreConfig::default(), vec![backend], None).unwrap();

    let writer = handle.clone();
    writer.tracklist_add(Some(tracks), None, None).await.unwrap();

    assert_eq!(handle.tracklist_get_length().await.unwrap(), 3);
    assert_eq!(handle.tracklist_get_version().await.unwrap(), 1);
}

#[tokio::test]
async fn mode_changes_announce_options_changed() {
    common::init_tracing();
    let (backend, _, _) = playable_backend("dummy", 1);
    let (handle, _task) = spawn(&CoreConfig::default(), vec![backend], None).unwrap();
    let mut rx = handle.subscribe();

    handle.tracklist_set_repeat(true).await.unwrap();
    // Setting the same value again announces nothing
    handle.tracklist_set_repeat(true).await.unwrap();
    assert!(handle.tracklist_get_repeat().await.unwrap());

    let announcements = drain_events(&mut rx)
        .into_iter()
        .filter(|event| *event == CoreEvent::OptionsChanged)
        .count();
    assert_eq!(announcements, 1);
}

#[tokio::test]
async fn uris_resolve_through_the_library_on_add() {
    common::init_tracing();
    let (backend, _, _) = playable_backend("dummy", 3);
    let (handle, _task) = spawn(&CoreConfig::default(), vec![backend], None).unwrap();

    let added = handle
        .tracklist_add(
            None,
            Some(vec![
                "dummy:track:2".to_string(),
                "dummy:track:1".to_string(),
            ]),
            None,
        )
        .await
        .unwrap();

    // Input order wins, not catalogue order
    let uris: Vec<&str> = added.iter().map(|tl| tl.track.uri.as_str()).collect();
    assert_eq!(uris, vec!["dummy:track:2", "dummy:track:1"]);
}

#[tokio::test]
async fn add_with_both_tracks_and_uris_is_rejected() {
    common::init_tracing();
    let (backend, _, tracks) = playable_backend("dummy", 1);
    let (handle, _task) = spawn(&CoreConfig::default(), vec![backend], None).unwrap();

    let outcome = handle
        .tracklist_add(Some(tracks), Some(vec!["dummy:track:1".to_string()]), None)
        .await;
    assert!(matches!(outcome, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn shutdown_ends_the_task_and_closes_the_mailbox() {
    common::init_tracing();
    let (backend, _, _) = playable_backend("dummy", 1);
    let (handle, task) = spawn(&CoreConfig::default(), vec![backend], None).unwrap();

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    assert!(matches!(
        handle.tracklist_get_length().await,
        Err(CoreError::Shutdown)
    ));
    assert!(matches!(
        handle
            .deliver_audio_event(AudioEvent::EndOfStream)
            .await,
        Err(CoreError::Shutdown)
    ));
}

#[tokio::test]
async fn dropping_every_handle_stops_the_coordinator() {
    common::init_tracing();
    let (backend, _, _) = playable_backend("dummy", 1);
    let (handle, task) = spawn(&CoreConfig::default(), vec![backend], None).unwrap();

    drop(handle);
    task.await.unwrap();
}
