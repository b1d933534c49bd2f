//! Loading data items into adapter-backed list views.
//!
//! List views only create child views for the rows on screen. Before an
//! item can be tapped, [`AdapterDataLoaderAction`] finds it in the view's
//! data and asks the view to scroll until the item is rendered.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::action::{Constraints, GestureOutcome, PerformCause, PerformError, ViewAction};
use crate::config::DEFAULT_MAX_RENDER_REQUESTS;
use crate::driver::UiController;
use crate::element::TargetView;

/// Wait between checks of whether the data is rendered.
pub const RENDER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Every this many polls the view is invalidated and asked again.
pub const RENDER_REQUEST_EVERY: u32 = 50;

/// One item of an adapter view's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptedData {
    /// The item as the adapter exposes it.
    pub data: Value,
    /// The item's position in the adapter.
    pub position: usize,
}

impl AdaptedData {
    pub fn new(data: Value, position: usize) -> Self {
        Self { data, position }
    }
}

impl fmt::Display for AdaptedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data: {} (position {})", self.data, self.position)
    }
}

/// How the engine talks to a particular kind of adapter view.
pub trait AdapterViewProtocol: Send + Sync {
    /// All data items the adapter currently holds.
    fn data_in_adapter_view(&self, view: &dyn TargetView) -> Vec<AdaptedData>;

    /// Asks the view to bring `data` on screen, typically by scrolling.
    fn make_data_rendered(&self, view: &dyn TargetView, data: &AdaptedData);

    /// True once `data` has a child view on screen.
    fn is_data_rendered(&self, view: &dyn TargetView, data: &AdaptedData) -> bool;

    /// Forces a relayout. Unsticks views whose scroll was swallowed by
    /// another event.
    fn invalidate(&self, view: &dyn TargetView);
}

/// A described predicate over adapter data.
#[derive(Clone)]
pub struct DataMatcher {
    description: String,
    predicate: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl DataMatcher {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Matches data equal to `expected`.
    pub fn equal_to(expected: Value) -> Self {
        let description = format!("is <{}>", expected);
        Self::new(description, move |data| *data == expected)
    }

    pub fn matches(&self, data: &Value) -> bool {
        (self.predicate)(data)
    }
}

impl fmt::Display for DataMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl fmt::Debug for DataMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataMatcher")
            .field("description", &self.description)
            .finish()
    }
}

#[derive(Debug, Default)]
struct LoaderState {
    performed: bool,
    data: Option<AdaptedData>,
}

/// Selects one adapter item and waits until it is rendered.
///
/// An action instance loads data once; the selected item is available
/// from [`adapted_data`](Self::adapted_data) afterwards.
pub struct AdapterDataLoaderAction {
    matcher: DataMatcher,
    at_position: Option<usize>,
    protocol: Arc<dyn AdapterViewProtocol>,
    max_render_requests: u32,
    state: Mutex<LoaderState>,
}

impl AdapterDataLoaderAction {
    pub fn new(matcher: DataMatcher, protocol: Arc<dyn AdapterViewProtocol>) -> Self {
        Self {
            matcher,
            at_position: None,
            protocol,
            max_render_requests: DEFAULT_MAX_RENDER_REQUESTS,
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// Picks the `position`-th matching item instead of requiring a unique
    /// match.
    pub fn at_position(mut self, position: usize) -> Self {
        self.at_position = Some(position);
        self
    }

    /// Maximum number of render polls before giving up.
    pub fn with_max_render_requests(mut self, requests: u32) -> Self {
        self.max_render_requests = requests;
        self
    }

    /// The item selected by [`perform`](ViewAction::perform), if it has run.
    pub async fn adapted_data(&self) -> Option<AdaptedData> {
        self.state.lock().await.data.clone()
    }

    fn select(&self, mut matched: Vec<AdaptedData>) -> Result<AdaptedData, String> {
        match self.at_position {
            Some(position) => {
                let count = matched.len();
                matched.into_iter().nth(position).ok_or_else(|| {
                    format!(
                        "There are only {} elements that matched but requested element {}.",
                        count, position
                    )
                })
            }
            None if matched.len() == 1 => Ok(matched.remove(0)),
            None => {
                let elements: Vec<String> = matched.iter().map(ToString::to_string).collect();
                Err(format!(
                    "Multiple data elements matched: {}. Elements: [{}]",
                    self.matcher,
                    elements.join(", ")
                ))
            }
        }
    }

    fn error(&self, view: &dyn TargetView, cause: PerformCause) -> PerformError {
        PerformError::new(self.description(), view, cause)
    }
}

impl fmt::Debug for AdapterDataLoaderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterDataLoaderAction")
            .field("matcher", &self.matcher)
            .field("at_position", &self.at_position)
            .field("max_render_requests", &self.max_render_requests)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ViewAction for AdapterDataLoaderAction {
    fn constraints(&self) -> Constraints {
        Constraints::displayed()
    }

    fn description(&self) -> String {
        "load adapter data".to_string()
    }

    async fn perform(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        let all = self.protocol.data_in_adapter_view(view);
        let matched: Vec<AdaptedData> = all
            .iter()
            .filter(|item| self.matcher.matches(&item.data))
            .cloned()
            .collect();

        if matched.is_empty() {
            let values: Vec<String> = all.iter().map(|item| item.data.to_string()).collect();
            return Err(self.error(
                view,
                PerformCause::AdapterData(format!(
                    "No data found matching: {} contained values: [{}]",
                    self.matcher,
                    values.join(", ")
                )),
            ));
        }

        let data = {
            let mut state = self.state.lock().await;
            if state.performed {
                return Err(self.error(
                    view,
                    PerformCause::AdapterData("perform called 2x!".to_string()),
                ));
            }
            state.performed = true;
            let data = self
                .select(matched)
                .map_err(|message| self.error(view, PerformCause::AdapterData(message)))?;
            state.data = Some(data.clone());
            data
        };

        let mut request_count = 0;
        while !self.protocol.is_data_rendered(view, &data) {
            if request_count >= self.max_render_requests {
                warn!(requests = request_count, data = %data, "adapter data never rendered");
                return Err(self.error(
                    view,
                    PerformCause::AdapterRenderTimeout {
                        requests: request_count,
                    },
                ));
            }
            if request_count > 1 {
                if request_count % RENDER_REQUEST_EVERY == 0 {
                    self.protocol.invalidate(view);
                    self.protocol.make_data_rendered(view, &data);
                }
            } else {
                self.protocol.make_data_rendered(view, &data);
            }
            controller.loop_for_at_least(RENDER_POLL_INTERVAL).await;
            request_count += 1;
        }

        debug!(data = %data, polls = request_count, "adapter data rendered");
        Ok(GestureOutcome::Success)
    }
}
