//! Remote mutation wrapper
//!
//! [`Mutation`] wraps an async call with loading/success/error bookkeeping.
//! Each call to [`Mutation::mutate`]:
//!
//! 1. sets `is_loading`
//! 2. awaits the wrapped function
//! 3. on success stores `data`, sets `is_success`, clears `error`, runs `on_success`
//! 4. on failure reports the raw [`Failure`], stores a [`MutationError`],
//!    sets `is_failed`, runs `on_error`
//! 5. clears `is_loading`
//!
//! Failures never propagate as `Err`; callers look at the returned
//! [`MutationOutcome`] or at [`Mutation::state`]. There is no retry and no
//! de-duplication: concurrent calls each run to completion and the last one
//! to resolve wins.
//!
//! Every mutation carries a [`CancellationToken`]. Once it is cancelled
//! (directly, through a parent token, or by dropping the mutation) in-flight
//! calls resolve to [`MutationOutcome::Cancelled`] without recording a
//! result or running callbacks.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::ApiError;
use crate::capabilities::{ErrorReporter, Noop};

/// Message used when a failure carries no usable text
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// What a wrapped function can fail with
#[derive(Debug, Clone)]
pub enum Failure {
    /// A proper error value
    Error(Arc<dyn std::error::Error + Send + Sync>),
    /// A bare message
    Message(String),
    /// Anything else; kept only for the error reporter
    Opaque(serde_json::Value),
}

impl Failure {
    /// Wrap an error value
    pub fn error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Failure::Error(Arc::new(error))
    }

    /// Wrap a value that is neither an error nor a message
    pub fn opaque(value: serde_json::Value) -> Self {
        Failure::Opaque(value)
    }
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Failure::error(error)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Message(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::Message(message.to_string())
    }
}

/// Normalized error stored on a failed mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MutationError {
    message: String,
}

impl MutationError {
    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_failure(failure: &Failure) -> Self {
        let message = match failure {
            Failure::Error(e) => e.to_string(),
            Failure::Message(m) if !m.is_empty() => m.clone(),
            Failure::Message(_) | Failure::Opaque(_) => UNKNOWN_ERROR.to_string(),
        };
        Self { message }
    }
}

/// Observable state of a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationState<D> {
    /// A call is in flight
    pub is_loading: bool,
    /// The last resolved call succeeded
    pub is_success: bool,
    /// The last resolved call failed
    pub is_failed: bool,
    /// Data from the last successful call
    pub data: Option<D>,
    /// Error from the last failed call
    pub error: Option<MutationError>,
}

impl<D> Default for MutationState<D> {
    fn default() -> Self {
        Self {
            is_loading: false,
            is_success: false,
            is_failed: false,
            data: None,
            error: None,
        }
    }
}

/// How a single `mutate` call ended
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<D> {
    /// The call resolved with data
    Success(D),
    /// The call failed
    Failed(MutationError),
    /// The mutation was cancelled before the call resolved
    Cancelled,
}

impl<D> MutationOutcome<D> {
    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success(_))
    }
}

type MutationFn<A, D> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<D, Failure>> + Send + Sync>;
type SuccessCallback<D> = Arc<dyn Fn(&D) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&MutationError) + Send + Sync>;

/// Async call with loading/success/error bookkeeping
pub struct Mutation<A, D> {
    name: String,
    func: MutationFn<A, D>,
    on_success: Option<SuccessCallback<D>>,
    on_error: Option<ErrorCallback>,
    reporter: Arc<dyn ErrorReporter>,
    state: watch::Sender<MutationState<D>>,
    cancel: CancellationToken,
}

impl<A, D> Mutation<A, D>
where
    A: Send + 'static,
    D: Clone + Send + Sync + 'static,
{
    /// Wrap `f`; `name` identifies the mutation in logs and error reports
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<D, Failure>> + Send + 'static,
    {
        let func: MutationFn<A, D> = Arc::new(move |args| f(args).boxed());
        let (state, _) = watch::channel(MutationState::default());
        Self {
            name: name.into(),
            func,
            on_success: None,
            on_error: None,
            reporter: Arc::new(Noop),
            state,
            cancel: CancellationToken::new(),
        }
    }

    /// Run `callback` with the data of every successful call
    pub fn on_success(mut self, callback: impl Fn(&D) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Run `callback` with the error of every failed call
    pub fn on_error(mut self, callback: impl Fn(&MutationError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Forward raw failures to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Tie this mutation's lifetime to `parent`
    pub fn with_parent_token(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Mutation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current state
    pub fn state(&self) -> MutationState<D> {
        self.state.borrow().clone()
    }

    /// Whether a call is in flight
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<MutationState<D>> {
        self.state.subscribe()
    }

    /// Run the wrapped function once
    pub async fn mutate(&self, args: A) -> MutationOutcome<D> {
        if self.cancel.is_cancelled() {
            tracing::debug!(mutation = %self.name, "mutation cancelled, not starting");
            return MutationOutcome::Cancelled;
        }

        self.state.send_modify(|s| s.is_loading = true);
        let call = (self.func)(args);

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = call => Some(result),
        };

        let outcome = match result {
            None => {
                tracing::debug!(mutation = %self.name, "mutation cancelled in flight");
                MutationOutcome::Cancelled
            }
            Some(Ok(data)) => {
                tracing::debug!(mutation = %self.name, "mutation succeeded");
                self.state.send_modify(|s| {
                    s.data = Some(data.clone());
                    s.is_success = true;
                    s.is_failed = false;
                    s.error = None;
                });
                if let Some(callback) = &self.on_success {
                    callback(&data);
                }
                MutationOutcome::Success(data)
            }
            Some(Err(failure)) => {
                self.reporter.report(&self.name, &failure);
                let error = MutationError::from_failure(&failure);
                tracing::warn!(mutation = %self.name, "mutation failed: {}", error);
                self.state.send_modify(|s| {
                    s.error = Some(error.clone());
                    s.is_failed = true;
                    s.is_success = false;
                });
                if let Some(callback) = &self.on_error {
                    callback(&error);
                }
                MutationOutcome::Failed(error)
            }
        };

        self.state.send_modify(|s| s.is_loading = false);
        outcome
    }

    /// Restore the initial state without calling the wrapped function
    pub fn reset(&self) {
        self.state.send_replace(MutationState::default());
    }

    /// Abort in-flight calls and refuse new ones
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether this mutation has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<A, D> Drop for Mutation<A, D> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
