//! Running actions against views.
//!
//! This module provides the [`InteractionExecutor`], the single entry point
//! through which actions reach a view. For every action it:
//!
//! 1. checks the action's [`Constraints`](crate::action::Constraints)
//!    against the view,
//! 2. runs the registered [`PreActionHook`]s,
//! 3. performs the action inside a tracing span,
//! 4. records the result in the attached [`Session`], if any.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tapwright_core::config::TimingConfig;
//! use tapwright_core::driver::{EventInjector, SleepingSynchronizer, UiController};
//! use tapwright_core::element::{Rect, ViewElement};
//! use tapwright_core::executor::InteractionExecutor;
//! use tapwright_core::gestures;
//!
//! # fn host_injector() -> Arc<dyn EventInjector> { unimplemented!() }
//! #[tokio::main]
//! async fn main() {
//!     let controller = UiController::new(
//!         host_injector(),
//!         Arc::new(SleepingSynchronizer),
//!         TimingConfig::default(),
//!     );
//!     let executor = InteractionExecutor::new(controller);
//!     let button = ViewElement::with_frame(Rect::new(0, 0, 200, 80));
//!
//!     match executor.perform(&gestures::click(), &button).await {
//!         Ok(outcome) => println!("clicked: {}", outcome),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info_span, Instrument};

use crate::action::{ActionResult, GestureOutcome, PerformCause, PerformError, PreActionHook, ViewAction};
use crate::driver::UiController;
use crate::element::{displayed_percent, TargetView};
use crate::session::Session;

/// Performs actions on views, enforcing constraints and pre-action hooks.
pub struct InteractionExecutor {
    controller: UiController,
    hooks: Vec<PreActionHook>,
    session: Option<Arc<Session>>,
}

impl InteractionExecutor {
    /// Creates an executor with no hooks and no session.
    pub fn new(controller: UiController) -> Self {
        Self {
            controller,
            hooks: Vec::new(),
            session: None,
        }
    }

    /// Adds a check that runs before every action, after constraints.
    pub fn with_hook(mut self, hook: PreActionHook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Records every performed action in `session`.
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn controller(&self) -> &UiController {
        &self.controller
    }

    pub fn hooks(&self) -> &[PreActionHook] {
        &self.hooks
    }

    /// Performs `action` on `view`.
    ///
    /// Constraint and hook failures are reported before any event is
    /// injected.
    pub async fn perform(
        &self,
        action: &dyn ViewAction,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        let description = action.description();
        let span = info_span!("perform_action", action = %description);
        async {
            let start = Instant::now();
            let result = self.perform_inner(action, view).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(outcome) => debug!(elapsed_ms, %outcome, "action complete"),
                Err(e) => debug!(elapsed_ms, error = %e, "action failed"),
            }

            if let Some(session) = &self.session {
                let logged = match &result {
                    Ok(outcome) => ActionResult::from(*outcome),
                    Err(e) => ActionResult::Failure(e.to_string()),
                };
                session
                    .log_action(description.clone(), view.description(), logged, Some(elapsed_ms))
                    .await;
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn perform_inner(
        &self,
        action: &dyn ViewAction,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        let constraints = action.constraints();
        if let Some(required) = constraints.min_visible_percent {
            let shown = displayed_percent(view);
            if shown < required {
                return Err(PerformError::new(
                    action.description(),
                    view,
                    PerformCause::ConstraintNotMet(format!(
                        "{} (displayed: {}%)",
                        constraints, shown
                    )),
                ));
            }
        }

        for hook in &self.hooks {
            hook.check(view)
                .map_err(|cause| PerformError::new(action.description(), view, cause))?;
        }

        action.perform(&self.controller, view).await
    }
}

impl std::fmt::Debug for InteractionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionExecutor")
            .field("hooks", &self.hooks)
            .field("session", &self.session.as_ref().map(|s| s.id))
            .finish_non_exhaustive()
    }
}
