//! Audio focus interplay with a competing producer in the same registry.

mod common;

use bridge_traits::{AudioSystem, PlaybackState};
use common::{Harness, SilentListener};
use core_playback::{FocusResumePolicy, PlayRequest, PlaybackError, PlayerConfig};
use std::sync::Arc;

const TRACK: &str = "https://cdn.example.com/a.mp3";

#[tokio::test]
async fn focus_loss_pauses_and_gain_resumes() {
    let h = Harness::created(PlayerConfig::default()).await;
    h.player.play(PlayRequest::url(TRACK)).await.unwrap();
    assert!(h.audio.holds_focus());

    let other = h.registry.client();
    other.request_focus(Arc::new(SilentListener)).await.unwrap();

    let snapshot = h.player.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.state, PlaybackState::Paused);
    assert!(snapshot.auto_resume_on_focus_regain);
    assert!(!snapshot.engine_held);

    other.abandon_focus().await.unwrap();

    let snapshot = h.player.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert!(!snapshot.auto_resume_on_focus_regain);
    assert_eq!(h.engines.created(), 2);
    assert!(h.audio.holds_focus());
}

#[tokio::test]
async fn explicit_pause_does_not_auto_resume() {
    let h = Harness::created(PlayerConfig::default()).await;
    h.player.play(PlayRequest::url(TRACK)).await.unwrap();
    h.player.pause().await.unwrap();

    let other = h.registry.client();
    other.request_focus(Arc::new(SilentListener)).await.unwrap();
    other.abandon_focus().await.unwrap();

    let snapshot = h.player.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.state, PlaybackState::Paused);
    assert!(!snapshot.auto_resume_on_focus_regain);
    assert_eq!(h.engines.created(), 1);
}

#[tokio::test]
async fn pause_after_focus_loss_keeps_player_paused_on_regain() {
    let h = Harness::created(PlayerConfig::default()).await;
    h.player.play(PlayRequest::url(TRACK)).await.unwrap();

    let other = h.registry.client();
    other.request_focus(Arc::new(SilentListener)).await.unwrap();
    assert!(h.player.snapshot().await.unwrap().unwrap().auto_resume_on_focus_regain);

    h.player.pause().await.unwrap();
    let snapshot = h.player.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.state, PlaybackState::Paused);
    assert!(!snapshot.auto_resume_on_focus_regain);

    other.abandon_focus().await.unwrap();
    assert_eq!(h.state().await, PlaybackState::Paused);
    assert_eq!(h.engines.created(), 1);
}

#[tokio::test]
async fn user_action_clears_auto_resume() {
    let h = Harness::created(PlayerConfig::default()).await;
    h.player.play(PlayRequest::url(TRACK)).await.unwrap();

    let other = h.registry.client();
    other.request_focus(Arc::new(SilentListener)).await.unwrap();
    h.player.stop().await.unwrap();
    other.abandon_focus().await.unwrap();

    let snapshot = h.player.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.state, PlaybackState::Stopped);
    assert!(!snapshot.auto_resume_on_focus_regain);
}

#[tokio::test]
async fn transient_only_policy_stays_paused_after_permanent_loss() {
    let config = PlayerConfig::default().with_focus_resume_policy(FocusResumePolicy::TransientOnly);
    let h = Harness::created(config).await;
    h.player.play(PlayRequest::url(TRACK)).await.unwrap();

    let other = h.registry.client();
    other.request_focus(Arc::new(SilentListener)).await.unwrap();
    assert_eq!(h.state().await, PlaybackState::Paused);

    other.abandon_focus().await.unwrap();
    let snapshot = h.player.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.state, PlaybackState::Paused);
    assert!(!snapshot.auto_resume_on_focus_regain);
}

#[tokio::test]
async fn denied_focus_fails_the_command_and_keeps_state() {
    let h = Harness::created(PlayerConfig::default()).await;
    h.registry.set_deny_requests(true);

    let err = h.player.play(PlayRequest::url(TRACK)).await.unwrap_err();
    assert!(matches!(err, PlaybackError::FocusDenied));
    assert_eq!(h.state().await, PlaybackState::Initial);
    assert_eq!(h.engines.created(), 0);

    h.registry.set_deny_requests(false);
    h.player.play(PlayRequest::url(TRACK)).await.unwrap();
    h.player.pause().await.unwrap();

    h.registry.set_deny_requests(true);
    let err = h.player.resume().await.unwrap_err();
    assert!(matches!(err, PlaybackError::FocusDenied));
    assert_eq!(h.state().await, PlaybackState::Paused);
}

#[tokio::test]
async fn disabled_focus_never_touches_the_registry() {
    let h = Harness::created(PlayerConfig::default().with_audio_focus(false)).await;
    h.registry.set_deny_requests(true);

    h.player.play(PlayRequest::url(TRACK)).await.unwrap();
    assert_eq!(h.state().await, PlaybackState::Playing);
    assert_eq!(h.registry.registration_count(), 0);

    h.player.destroy().await.unwrap();
    assert_eq!(h.registry.registration_count(), 0);
}

#[tokio::test]
async fn destroy_abandons_focus_for_the_next_producer() {
    let h = Harness::created(PlayerConfig::default()).await;
    let other = h.registry.client();
    other.request_focus(Arc::new(SilentListener)).await.unwrap();

    h.player.play(PlayRequest::url(TRACK)).await.unwrap();
    assert!(h.audio.holds_focus());

    h.player.destroy().await.unwrap();
    assert!(other.holds_focus());
    assert_eq!(h.registry.registration_count(), 1);
}
