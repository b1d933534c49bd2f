//! The swipe orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::action::{Constraints, GestureOutcome, PerformCause, PerformError, ViewAction};
use crate::config::DEFAULT_VISIBILITY_PERCENT;
use crate::driver::UiController;
use crate::element::{Point, TargetView};
use crate::event::Precision;
use crate::location::CoordinatesProvider;
use crate::press::PrecisionDescriber;
use crate::swipe::Swipe;

/// Number of swipe attempts before the action fails.
pub const MAX_SWIPE_TRIES: u32 = 3;

/// Swipes between two points of a view, retrying until delivered.
#[derive(Clone)]
pub struct GeneralSwipeAction {
    swiper: Swipe,
    start: Arc<dyn CoordinatesProvider>,
    end: Arc<dyn CoordinatesProvider>,
    precision: Arc<dyn PrecisionDescriber>,
}

impl GeneralSwipeAction {
    pub fn new(
        swiper: Swipe,
        start: impl CoordinatesProvider + 'static,
        end: impl CoordinatesProvider + 'static,
        precision: impl PrecisionDescriber + 'static,
    ) -> Self {
        Self {
            swiper,
            start: Arc::new(start),
            end: Arc::new(end),
            precision: Arc::new(precision),
        }
    }

    pub fn swiper(&self) -> Swipe {
        self.swiper
    }
}

impl std::fmt::Debug for GeneralSwipeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralSwipeAction")
            .field("swiper", &self.swiper)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("precision", &self.precision)
            .finish()
    }
}

#[async_trait]
impl ViewAction for GeneralSwipeAction {
    fn constraints(&self) -> Constraints {
        Constraints::displaying_at_least(DEFAULT_VISIBILITY_PERCENT)
    }

    fn description(&self) -> String {
        format!("{} swipe", self.swiper)
    }

    async fn perform(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        let pressed_state = controller.timing().pressed_state_duration();
        let mut status = GestureOutcome::Failure;
        let mut tries = 0;
        let mut start = Point::default();
        let mut end = Point::default();
        let mut precision = Precision::default();

        while tries < MAX_SWIPE_TRIES && status != GestureOutcome::Success {
            tries += 1;
            start = self.start.calculate_coordinates(view);
            end = self.end.calculate_coordinates(view);
            precision = self.precision.describe_precision();

            debug!(from = %start, to = %end, attempt = tries, swiper = %self.swiper, "sending swipe");
            status = self.swiper.send_swipe(controller, start, end, precision).await;

            if !pressed_state.is_zero() {
                controller.loop_for_at_least(pressed_state).await;
            }
        }

        if status == GestureOutcome::Failure {
            warn!(tries, swiper = %self.swiper, "swipe failed on every attempt");
            return Err(self.exhausted(view, start, end, precision, tries));
        }
        Ok(status)
    }
}

impl GeneralSwipeAction {
    fn exhausted(
        &self,
        view: &dyn TargetView,
        start: Point,
        end: Point,
        precision: Precision,
        attempts: u32,
    ) -> PerformError {
        PerformError::new(
            self.description(),
            view,
            PerformCause::SwipeExhausted {
                start,
                end,
                precision,
                swiper: self.swiper.to_string(),
                provider: format!("{:?}", self.start),
                describer: format!("{:?}", self.precision),
                attempts,
            },
        )
    }
}
