//! # tapwright-core
//!
//! Gesture synthesis for instrumentation-driven UI tests.
//!
//! This crate turns high-level interactions (click, long-press, double-tap,
//! swipe, key presses, keyboard dismissal) into timed streams of low-level
//! pointer and key events, injects them through a host-provided
//! [`EventInjector`](driver::EventInjector), and waits on an
//! [`IdleSynchronizer`](driver::IdleSynchronizer) so the application has
//! processed each gesture before the next one starts.
//!
//! ## Modules
//!
//! - [`event`] - Pointer and key events, and the event clock
//! - [`config`] - Gesture timing constants and persistent settings
//! - [`driver`] - Injection and idle-synchronization boundaries
//! - [`element`] - View geometry consumed by actions
//! - [`motion`] - Down, move, up and cancel primitives
//! - [`tap`] / [`swipe`] - Tap and swipe strategies
//! - [`location`] / [`press`] - Where to touch, and how precisely
//! - [`action`] - The action abstraction, outcomes and errors
//! - [`click_action`] / [`swipe_action`] - Retrying gesture orchestrators
//! - [`keyboard`] / [`adapter`] / [`key`] - Auxiliary actions
//! - [`gestures`] - Ready-made actions
//! - [`executor`] - Constraint checks, pre-action hooks and logging
//! - [`session`] - Action history with event broadcasting
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tapwright_core::config::{NoPlatformTimings, TapwrightConfig};
//! use tapwright_core::driver::{EventInjector, SleepingSynchronizer, UiController};
//! use tapwright_core::element::{Rect, ViewElement};
//! use tapwright_core::executor::InteractionExecutor;
//! use tapwright_core::gestures;
//!
//! # fn host_injector() -> Arc<dyn EventInjector> { unimplemented!() }
//! #[tokio::main]
//! async fn main() {
//!     let timing = TapwrightConfig::load().timing_for(&NoPlatformTimings);
//!     let controller = UiController::new(host_injector(), Arc::new(SleepingSynchronizer), timing);
//!     let executor = InteractionExecutor::new(controller);
//!
//!     let list = ViewElement::with_frame(Rect::new(0, 200, 1080, 1400));
//!     executor.perform(&gestures::swipe_up(), &list).await.expect("swipe failed");
//! }
//! ```

pub mod action;
pub mod adapter;
pub mod click_action;
pub mod config;
pub mod driver;
pub mod element;
pub mod event;
pub mod executor;
pub mod gestures;
pub mod key;
pub mod keyboard;
pub mod location;
pub mod motion;
pub mod press;
pub mod session;
pub mod swipe;
pub mod swipe_action;
pub mod tap;
