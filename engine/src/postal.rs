//! Debounced postal-code validation.
//!
//! Each keystroke restarts a quiet period; only input that survives it
//! triggers a service-area lookup. A newer keystroke supersedes a lookup
//! still waiting out its quiet period. A lookup whose request is already
//! on the wire is not cancelled, and its reply overwrites whatever state
//! arrived in between; callers that need a settled answer use
//! [`PostalValidator::validate_now`].

use std::sync::Arc;
use std::time::Duration;

use tidybook_core::backend::BookingBackend;
use tidybook_core::postal::{PostalMatch, match_postal_code};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// What the validator currently knows about the input
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PostalValidation {
    /// The raw input the verdict refers to
    pub input: String,
    /// The verdict itself
    pub result: PostalMatch,
    /// True while a scheduled lookup has not answered yet
    pub pending: bool,
}

struct PostalState {
    epoch: u64,
    current: PostalValidation,
    task: Option<JoinHandle<()>>,
}

/// Debounced service-area checker for the postal input field
#[derive(Clone)]
pub struct PostalValidator {
    backend: Arc<dyn BookingBackend>,
    debounce: Duration,
    state: Arc<Mutex<PostalState>>,
}

impl PostalValidator {
    /// A validator with the given quiet period
    #[must_use]
    pub fn new(backend: Arc<dyn BookingBackend>, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            state: Arc::new(Mutex::new(PostalState {
                epoch: 0,
                current: PostalValidation::default(),
                task: None,
            })),
        }
    }

    /// Records a keystroke and schedules a lookup after the quiet period.
    ///
    /// The stored verdict drops back to [`PostalMatch::Unchecked`] right
    /// away. Whitespace-only input never reaches the backend.
    pub async fn input_changed(&self, raw: &str) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        let epoch = state.epoch;
        state.current.input = raw.to_string();
        state.current.result = PostalMatch::Unchecked;
        if raw.trim().is_empty() {
            state.current.pending = false;
            return;
        }
        state.current.pending = true;

        let validator = self.clone();
        let input = raw.to_string();
        state.task = Some(tokio::spawn(async move {
            tokio::time::sleep(validator.debounce).await;
            {
                let state = validator.state.lock().await;
                if state.epoch != epoch {
                    // superseded while waiting out the quiet period
                    return;
                }
            }
            let result = validator.lookup(&input).await;
            let mut state = validator.state.lock().await;
            // a reply already on the wire lands even when the input has
            // moved on since the request went out
            state.current.result = result;
            state.current.pending = false;
        }));
    }

    /// The latest input, verdict and pending flag
    pub async fn current(&self) -> PostalValidation {
        self.state.lock().await.current.clone()
    }

    /// Looks the input up immediately, skipping the quiet period.
    ///
    /// Supersedes any lookup still waiting; stores and returns the
    /// verdict.
    pub async fn validate_now(&self, raw: &str) -> PostalMatch {
        {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.current.input = raw.to_string();
            state.current.result = PostalMatch::Unchecked;
            state.current.pending = !raw.trim().is_empty();
        }
        if raw.trim().is_empty() {
            return PostalMatch::Unchecked;
        }
        let result = self.lookup(raw).await;
        let mut state = self.state.lock().await;
        state.current.result = result.clone();
        state.current.pending = false;
        result
    }

    /// Stops the scheduled lookup, if any
    pub async fn dispose(&self) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.current.pending = false;
        if let Some(task) = state.task.take() {
            task.abort();
        }
    }

    async fn lookup(&self, input: &str) -> PostalMatch {
        match self.backend.service_areas().await {
            Ok(areas) => match_postal_code(input, &areas),
            Err(err) => {
                tracing::warn!(error = %err, "postal lookup failed, leaving the code unchecked");
                PostalMatch::Unchecked
            }
        }
    }
}
