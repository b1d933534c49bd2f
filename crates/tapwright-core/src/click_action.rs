//! The click orchestrator.
//!
//! [`GeneralClickAction`] turns a [`Tap`] strategy into an action on a view:
//! it resolves where and how precisely to tap, retries failed taps, rolls
//! back accidental long-presses, and waits for the pressed state to clear.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::action::{Constraints, GestureOutcome, PerformCause, PerformError, ViewAction};
use crate::config::DEFAULT_VISIBILITY_PERCENT;
use crate::driver::UiController;
use crate::element::{Point, TargetView};
use crate::event::{ButtonState, InputSource, Precision};
use crate::location::CoordinatesProvider;
use crate::press::PrecisionDescriber;
use crate::tap::Tap;

/// Number of tap attempts before a click is reported as failed.
pub const MAX_CLICK_ATTEMPTS: u32 = 3;

/// Performs a tap on a view, retrying failures.
///
/// Created with [`GeneralClickAction::new`] and customised with the
/// builder methods:
///
/// ```
/// use tapwright_core::click_action::GeneralClickAction;
/// use tapwright_core::location::GeneralLocation;
/// use tapwright_core::press::Press;
/// use tapwright_core::tap::Tap;
///
/// let action = GeneralClickAction::new(Tap::Double, GeneralLocation::Center, Press::Thumb)
///     .with_visibility_threshold(75);
/// ```
#[derive(Clone)]
pub struct GeneralClickAction {
    tapper: Tap,
    coordinates: Arc<dyn CoordinatesProvider>,
    precision: Arc<dyn PrecisionDescriber>,
    input_source: InputSource,
    button_state: ButtonState,
    rollback: Option<Arc<dyn ViewAction>>,
    visibility_threshold: u8,
}

impl GeneralClickAction {
    pub fn new(
        tapper: Tap,
        coordinates: impl CoordinatesProvider + 'static,
        precision: impl PrecisionDescriber + 'static,
    ) -> Self {
        Self {
            tapper,
            coordinates: Arc::new(coordinates),
            precision: Arc::new(precision),
            input_source: InputSource::Unknown,
            button_state: ButtonState::NONE,
            rollback: None,
            visibility_threshold: DEFAULT_VISIBILITY_PERCENT,
        }
    }

    /// Sets the device and button the events claim to come from.
    pub fn with_input(mut self, source: InputSource, button_state: ButtonState) -> Self {
        self.input_source = source;
        self.button_state = button_state;
        self
    }

    /// Action run when a tap was read as a long-press, before retrying.
    pub fn with_rollback(mut self, rollback: impl ViewAction + 'static) -> Self {
        self.rollback = Some(Arc::new(rollback));
        self
    }

    /// Minimum visible share of the view, in percent (default 90).
    pub fn with_visibility_threshold(mut self, percent: u8) -> Self {
        self.visibility_threshold = percent.min(100);
        self
    }

    pub fn tapper(&self) -> Tap {
        self.tapper
    }

    fn located_description(&self, coordinates: Point, precision: Precision) -> String {
        format!(
            "{} - At Coordinates: {} and precision: {}",
            self.description(),
            coordinates,
            precision
        )
    }
}

impl std::fmt::Debug for GeneralClickAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralClickAction")
            .field("tapper", &self.tapper)
            .field("coordinates", &self.coordinates)
            .field("precision", &self.precision)
            .field("input_source", &self.input_source)
            .field("button_state", &self.button_state)
            .field("rollback", &self.rollback.as_ref().map(|r| r.description()))
            .field("visibility_threshold", &self.visibility_threshold)
            .finish()
    }
}

#[async_trait]
impl ViewAction for GeneralClickAction {
    fn constraints(&self) -> Constraints {
        let own = Constraints::displaying_at_least(self.visibility_threshold);
        match &self.rollback {
            Some(rollback) => own.and(rollback.constraints()),
            None => own,
        }
    }

    fn description(&self) -> String {
        format!("{} click", self.tapper)
    }

    async fn perform(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        let pressed_state = controller.timing().pressed_state_duration();
        let mut status = GestureOutcome::Failure;
        let mut attempts = 0;
        let mut coordinates = Point::default();
        let mut precision = Precision::default();

        while status != GestureOutcome::Success && attempts < MAX_CLICK_ATTEMPTS {
            attempts += 1;
            coordinates = self.coordinates.calculate_coordinates(view);
            precision = self.precision.describe_precision();

            debug!(x = coordinates.x, y = coordinates.y, attempt = attempts, tapper = %self.tapper, "sending tap");
            status = self
                .tapper
                .send_tap(
                    controller,
                    coordinates,
                    precision,
                    self.input_source,
                    self.button_state,
                )
                .await
                .map_err(|e| {
                    PerformError::new(self.located_description(coordinates, precision), view, e)
                })?;

            // Let the view leave its pressed state before anything else touches it.
            if !pressed_state.is_zero() {
                controller.loop_for_at_least(pressed_state).await;
            }

            if status == GestureOutcome::Warning {
                match &self.rollback {
                    Some(rollback) => {
                        debug!(rollback = %rollback.description(), "tap read as long press, rolling back");
                        rollback.perform(controller, view).await?;
                    }
                    None => break,
                }
            }
        }

        if status == GestureOutcome::Failure {
            warn!(attempts, tapper = %self.tapper, "click failed on every attempt");
            return Err(PerformError::new(
                self.description(),
                view,
                PerformCause::ClickExhausted {
                    coordinates,
                    precision,
                    tapper: self.tapper.to_string(),
                    provider: format!("{:?}", self.coordinates),
                    describer: format!("{:?}", self.precision),
                    attempts,
                    rollback: self.rollback.is_some(),
                },
            ));
        }

        if self.tapper == Tap::Single && view.is_web_view() {
            // Web content delays single taps until it has ruled out a double tap.
            let double_tap_timeout = controller.timing().double_tap_timeout();
            if !double_tap_timeout.is_zero() {
                controller.loop_for_at_least(double_tap_timeout).await;
            }
        }

        Ok(status)
    }
}
