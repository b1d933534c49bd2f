//! Shared test helpers for tapwright-core integration tests.
//!
//! This module provides a scriptable injector that records everything it is
//! asked to deliver, a synchronizer that can oversleep on demand, and a few
//! fixtures for building controllers and views.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;

use tapwright_core::config::TimingConfig;
use tapwright_core::driver::{EventInjector, IdleSynchronizer, InjectionError, UiController};
use tapwright_core::element::{Rect, TargetView, ViewElement};
use tapwright_core::event::{KeyEvent, MotionAction, MotionEvent};

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

static TRACING: Once = Once::new();

/// Installs an env-filtered fmt subscriber once per test binary.
///
/// Set `RUST_LOG=tapwright_core=debug` to see gesture logs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Programmable injector
// ---------------------------------------------------------------------------

/// How the mock injector answers a single injection.
#[derive(Debug, Clone)]
pub enum InjectorBehavior {
    /// Deliver the event (`Ok(true)`).
    Accept,
    /// Refuse the event (`Ok(false)`).
    Reject,
    /// Raise a security denial.
    Deny,
    /// Raise a generic injection failure.
    Fail,
}

impl InjectorBehavior {
    fn answer(&self) -> Result<bool, InjectionError> {
        match self {
            InjectorBehavior::Accept => Ok(true),
            InjectorBehavior::Reject => Ok(false),
            InjectorBehavior::Deny => Err(InjectionError::SecurityDenied("foreign window".to_string())),
            InjectorBehavior::Fail => Err(InjectionError::Failed("device went away".to_string())),
        }
    }
}

/// Everything the injector was asked to deliver, in call order.
#[derive(Debug, Clone)]
pub enum Injected {
    Motion(MotionEvent),
    Sequence(Vec<MotionEvent>),
    Key(KeyEvent),
    Text(String),
}

/// An [`EventInjector`] whose answers are scripted.
///
/// Each injection first consumes the next scripted behavior, if any. With
/// the script exhausted, motion events whose action has a standing rule
/// (see [`on_action`](Self::on_action)) use that rule; everything else is
/// accepted.
#[derive(Default)]
pub struct RecordingInjector {
    script: Mutex<VecDeque<InjectorBehavior>>,
    action_rules: Mutex<Vec<(MotionAction, InjectorBehavior)>>,
    log: Mutex<Vec<Injected>>,
}

impl RecordingInjector {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers the next injections in order with `behaviors`.
    pub fn scripted(behaviors: Vec<InjectorBehavior>) -> Arc<Self> {
        let injector = Self::default();
        *injector.script.lock().unwrap() = behaviors.into();
        Arc::new(injector)
    }

    /// Always answers motion events of kind `action` with `behavior`.
    pub fn on_action(self: Arc<Self>, action: MotionAction, behavior: InjectorBehavior) -> Arc<Self> {
        self.action_rules.lock().unwrap().push((action, behavior));
        self
    }

    fn next_answer(&self, action: Option<MotionAction>) -> Result<bool, InjectionError> {
        if let Some(behavior) = self.script.lock().unwrap().pop_front() {
            return behavior.answer();
        }
        if let Some(action) = action {
            let rules = self.action_rules.lock().unwrap();
            if let Some((_, behavior)) = rules.iter().find(|(a, _)| *a == action) {
                return behavior.answer();
            }
        }
        Ok(true)
    }

    pub fn log(&self) -> Vec<Injected> {
        self.log.lock().unwrap().clone()
    }

    /// Total number of injection calls of any kind.
    pub fn injection_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn motion_events(&self) -> Vec<MotionEvent> {
        self.log()
            .into_iter()
            .filter_map(|i| match i {
                Injected::Motion(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn motion_actions(&self) -> Vec<MotionAction> {
        self.motion_events().iter().map(|e| e.action).collect()
    }

    pub fn sequences(&self) -> Vec<Vec<MotionEvent>> {
        self.log()
            .into_iter()
            .filter_map(|i| match i {
                Injected::Sequence(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn key_events(&self) -> Vec<KeyEvent> {
        self.log()
            .into_iter()
            .filter_map(|i| match i {
                Injected::Key(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|i| match i {
                Injected::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EventInjector for RecordingInjector {
    async fn inject_motion_event(&self, event: &MotionEvent) -> Result<bool, InjectionError> {
        self.log.lock().unwrap().push(Injected::Motion(event.clone()));
        self.next_answer(Some(event.action))
    }

    async fn inject_motion_event_sequence(
        &self,
        events: &[MotionEvent],
    ) -> Result<bool, InjectionError> {
        self.log.lock().unwrap().push(Injected::Sequence(events.to_vec()));
        self.next_answer(None)
    }

    async fn inject_key_event(&self, event: &KeyEvent) -> Result<bool, InjectionError> {
        self.log.lock().unwrap().push(Injected::Key(event.clone()));
        self.next_answer(None)
    }

    async fn inject_string(&self, text: &str) -> Result<bool, InjectionError> {
        self.log.lock().unwrap().push(Injected::Text(text.to_string()));
        self.next_answer(None)
    }
}

// ---------------------------------------------------------------------------
// Jittering synchronizer
// ---------------------------------------------------------------------------

/// An [`IdleSynchronizer`] that sleeps for the requested time plus a
/// scripted overshoot, simulating a busy main thread.
#[derive(Default)]
pub struct JitterSynchronizer {
    overshoot: Mutex<VecDeque<Duration>>,
    timed_calls: Mutex<Vec<Duration>>,
    idle_calls: Mutex<usize>,
}

impl JitterSynchronizer {
    pub fn punctual() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The next timed loops overshoot by `extra`, in order.
    pub fn oversleeping(extra: Vec<Duration>) -> Arc<Self> {
        let sync = Self::default();
        *sync.overshoot.lock().unwrap() = extra.into();
        Arc::new(sync)
    }

    /// Durations requested from `loop_for_at_least`, in order.
    pub fn timed_calls(&self) -> Vec<Duration> {
        self.timed_calls.lock().unwrap().clone()
    }

    pub fn idle_calls(&self) -> usize {
        *self.idle_calls.lock().unwrap()
    }
}

#[async_trait]
impl IdleSynchronizer for JitterSynchronizer {
    async fn loop_until_idle(&self) {
        *self.idle_calls.lock().unwrap() += 1;
        tokio::task::yield_now().await;
    }

    async fn loop_for_at_least(&self, duration: Duration) {
        self.timed_calls.lock().unwrap().push(duration);
        let extra = self.overshoot.lock().unwrap().pop_front().unwrap_or_default();
        tokio::time::sleep(duration + extra).await;
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A controller with default timing.
pub fn controller(injector: Arc<RecordingInjector>, sync: Arc<JitterSynchronizer>) -> UiController {
    init_tracing();
    UiController::new(injector, sync, TimingConfig::default())
}

/// A controller with explicit timing.
pub fn controller_with_timing(
    injector: Arc<RecordingInjector>,
    sync: Arc<JitterSynchronizer>,
    timing: TimingConfig,
) -> UiController {
    init_tracing();
    UiController::new(injector, sync, timing)
}

/// A fully visible 101x101 view at the origin; its center is (50, 50).
pub fn square_view() -> ViewElement {
    ViewElement::with_frame(Rect::new(0, 0, 101, 101)).identified("square")
}

/// A fully visible wide view, as used for swipes.
pub fn wide_view() -> ViewElement {
    ViewElement::with_frame(Rect::new(0, 0, 1000, 200)).identified("pager")
}

/// A view that moves right by `step` pixels every time its frame is read.
pub struct DriftingView {
    base: Rect,
    step: i32,
    reads: AtomicI32,
}

impl DriftingView {
    pub fn new(base: Rect, step: i32) -> Self {
        Self {
            base,
            step,
            reads: AtomicI32::new(0),
        }
    }

    fn current(&self) -> Rect {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        Rect::new(self.base.x + n * self.step, self.base.y, self.base.width, self.base.height)
    }
}

impl TargetView for DriftingView {
    fn description(&self) -> String {
        "DriftingView{id=drifter}".to_string()
    }

    fn frame(&self) -> Rect {
        self.current()
    }

    fn visible_rect(&self) -> Option<Rect> {
        Some(self.current())
    }
}
