//! Swipe strategy and swipe orchestrator tests.

mod common;

use std::time::Duration;

use common::{controller, wide_view, DriftingView, InjectorBehavior, JitterSynchronizer, RecordingInjector};

use tapwright_core::action::{GestureOutcome, PerformCause, ViewAction};
use tapwright_core::element::{Point, Rect};
use tapwright_core::event::{MotionAction, Precision};
use tapwright_core::gestures;
use tapwright_core::location::GeneralLocation;
use tapwright_core::press::Press;
use tapwright_core::swipe::Swipe;
use tapwright_core::swipe_action::GeneralSwipeAction;

const FINGER: Precision = Precision::new(16.0, 16.0);

#[tokio::test(start_paused = true)]
async fn test_swipe_is_one_sequence_of_steps_plus_two() {
    let injector = RecordingInjector::accepting();
    let ui = controller(injector.clone(), JitterSynchronizer::punctual());

    let outcome = Swipe::Linear { duration_ms: 150, steps: 10 }
        .send_swipe(&ui, Point::new(10.0, 100.0), Point::new(400.0, 100.0), FINGER)
        .await;

    assert_eq!(outcome, GestureOutcome::Success);
    assert!(injector.motion_events().is_empty());
    let sequences = injector.sequences();
    assert_eq!(sequences.len(), 1);

    let events = &sequences[0];
    assert_eq!(events.len(), 12);
    assert_eq!(events[0].action, MotionAction::Down);
    assert_eq!(events[0].position(), Point::new(10.0, 100.0));
    assert!((events[1].x - 42.5).abs() < 1e-3, "first step at {}", events[1].x);
    assert_eq!(events[11].action, MotionAction::Up);
    assert_eq!(events[11].position(), Point::new(400.0, 100.0));
    assert!(events.iter().all(|e| e.y == 100.0));
    assert!(events.windows(2).all(|w| w[0].event_time < w[1].event_time));
    assert!(events.windows(2).all(|w| w[0].x < w[1].x));
}

#[tokio::test(start_paused = true)]
async fn test_fast_swipe_spans_its_duration() {
    let injector = RecordingInjector::accepting();
    let ui = controller(injector.clone(), JitterSynchronizer::punctual());

    Swipe::Fast
        .send_swipe(&ui, Point::new(0.0, 0.0), Point::new(0.0, 500.0), FINGER)
        .await;

    let events = &injector.sequences()[0];
    assert_eq!(events.len(), 12);
    let span = events[11].event_time - events[0].event_time;
    assert!((100..=120).contains(&span), "swipe took {} ms", span);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_sequence_is_a_failure() {
    let injector = RecordingInjector::scripted(vec![InjectorBehavior::Reject]);
    let ui = controller(injector, JitterSynchronizer::punctual());

    let outcome = Swipe::Fast
        .send_swipe(&ui, Point::new(0.0, 0.0), Point::new(100.0, 0.0), FINGER)
        .await;

    assert_eq!(outcome, GestureOutcome::Failure);
}

#[tokio::test(start_paused = true)]
async fn test_sequence_error_is_a_failure() {
    let injector = RecordingInjector::scripted(vec![InjectorBehavior::Deny]);
    let ui = controller(injector, JitterSynchronizer::punctual());

    let outcome = Swipe::Slow
        .send_swipe(&ui, Point::new(0.0, 0.0), Point::new(100.0, 0.0), FINGER)
        .await;

    assert_eq!(outcome, GestureOutcome::Failure);
}

#[tokio::test(start_paused = true)]
async fn test_swipe_action_retries_until_delivered() {
    let injector = RecordingInjector::scripted(vec![InjectorBehavior::Reject, InjectorBehavior::Fail]);
    let sync = JitterSynchronizer::punctual();
    let ui = controller(injector.clone(), sync.clone());

    let action = GeneralSwipeAction::new(
        Swipe::Fast,
        GeneralLocation::CenterLeft,
        GeneralLocation::CenterRight,
        Press::Finger,
    );
    let outcome = action.perform(&ui, &wide_view()).await.unwrap();

    assert_eq!(outcome, GestureOutcome::Success);
    assert_eq!(injector.sequences().len(), 3);
    // Pressed-state hold after every attempt.
    assert_eq!(sync.timed_calls(), vec![Duration::from_millis(64); 3]);
}

#[tokio::test(start_paused = true)]
async fn test_swipe_action_gives_up_after_three_tries() {
    let injector = RecordingInjector::scripted(vec![InjectorBehavior::Reject; 5]);
    let ui = controller(injector.clone(), JitterSynchronizer::punctual());

    let err = gestures::swipe_right().perform(&ui, &wide_view()).await.unwrap_err();

    assert_eq!(injector.sequences().len(), 3);
    assert!(matches!(err.cause, PerformCause::SwipeExhausted { attempts: 3, .. }));
    assert!(err.to_string().contains("Tried 3 times"));
    assert_eq!(err.action, "fast swipe");
}

#[tokio::test(start_paused = true)]
async fn test_canned_swipes_start_inside_the_view() {
    let injector = RecordingInjector::accepting();
    let ui = controller(injector.clone(), JitterSynchronizer::punctual());
    let view = wide_view();

    gestures::swipe_left().perform(&ui, &view).await.unwrap();
    gestures::swipe_up().perform(&ui, &view).await.unwrap();

    let sequences = injector.sequences();
    let left = &sequences[0];
    assert!((left[0].x - 916.0).abs() < 1e-3);
    assert_eq!(left[11].x, 0.0);

    let up = &sequences[1];
    // Bottom edge is y = 199; the start is 8.3% of the height above it.
    assert!((up[0].y - (199.0 - 16.6)).abs() < 1e-3);
    assert_eq!(up[11].y, 0.0);
    assert!(up.windows(2).all(|w| w[0].y > w[1].y));
}

#[tokio::test(start_paused = true)]
async fn test_swipe_action_follows_the_view_between_tries() {
    let injector = RecordingInjector::scripted(vec![InjectorBehavior::Reject; 3]);
    let ui = controller(injector.clone(), JitterSynchronizer::punctual());
    let view = DriftingView::new(Rect::new(0, 0, 400, 100), 100);

    let action = GeneralSwipeAction::new(
        Swipe::Fast,
        GeneralLocation::CenterLeft,
        GeneralLocation::CenterRight,
        Press::Finger,
    );
    let err = action.perform(&ui, &view).await.unwrap_err();

    let starts: Vec<f32> = injector.sequences().iter().map(|seq| seq[0].x).collect();
    assert_eq!(starts.len(), 3);
    assert!(starts.windows(2).all(|w| w[0] < w[1]), "starts: {:?}", starts);
    match &err.cause {
        PerformCause::SwipeExhausted { start, .. } => assert_eq!(start.x, starts[2]),
        other => panic!("unexpected cause: {:?}", other),
    }
}
