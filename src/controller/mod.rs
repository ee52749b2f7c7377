//! Debounced repagination.
//!
//! Editors produce a burst of changes; only the last one in a quiet window is
//! worth paginating. [`Repaginator`] is a clock-driven state machine holding at
//! most one pending request. [`DebounceWorker`] runs it on a background thread,
//! and with the `async` feature `run_debounced` drives it from tokio.

#[cfg(feature = "async")]
mod async_driver;
mod worker;

#[cfg(feature = "async")]
pub use async_driver::run_debounced;
pub use worker::DebounceWorker;

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::error::Result;
use crate::layout::MeasurementProvider;
use crate::model::PublicationMetadata;
use crate::pipeline::{self, PaginateOptions};
use crate::render::PaginationResult;

/// Default quiet period before a request is paginated.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A request to paginate one version of the document.
#[derive(Debug, Clone)]
pub struct PaginationRequest {
    /// Monotonic request number; outcomes carry it back
    pub generation: u64,

    /// Article body markup
    pub markup: String,

    /// Publication metadata
    pub metadata: PublicationMetadata,
}

impl PaginationRequest {
    /// Create a new request.
    pub fn new(generation: u64, markup: impl Into<String>, metadata: PublicationMetadata) -> Self {
        Self {
            generation,
            markup: markup.into(),
            metadata,
        }
    }
}

/// The result of a completed run, tagged with the request it answers.
#[derive(Debug)]
pub struct PaginationOutcome {
    /// Generation of the request that was paginated
    pub generation: u64,

    /// Pages and statistics, or the error that aborted the run
    pub result: Result<PaginationResult>,
}

struct Pending {
    request: PaginationRequest,
    deadline: Instant,
}

/// Debounced repagination state machine.
///
/// The clock is always passed in, so behaviour is fully determined by the
/// sequence of `request` and `poll` calls.
pub struct Repaginator<M> {
    measurer: M,
    options: PaginateOptions,
    debounce: Duration,
    pending: Option<Pending>,
    next_generation: u64,
    runs: u64,
}

impl<M: MeasurementProvider> Repaginator<M> {
    /// Create a repaginator owning a measurer.
    ///
    /// Fails with [`Error::InvalidLayoutConfig`](crate::Error::InvalidLayoutConfig)
    /// if the options are unusable.
    pub fn new(measurer: M, options: PaginateOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            measurer,
            options,
            debounce: DEFAULT_DEBOUNCE,
            pending: None,
            next_generation: 0,
            runs: 0,
        })
    }

    /// Set the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Get the debounce window.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Get the pagination options.
    pub fn options(&self) -> &PaginateOptions {
        &self.options
    }

    /// Get the measurer.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Give back the measurer.
    pub fn into_measurer(self) -> M {
        self.measurer
    }

    /// Number of completed pagination runs.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Record a new document version, replacing any pending one.
    ///
    /// Returns the generation assigned to the request.
    pub fn request(
        &mut self,
        markup: impl Into<String>,
        metadata: PublicationMetadata,
        now: Instant,
    ) -> u64 {
        let generation = self.next_generation;
        self.enqueue(PaginationRequest::new(generation, markup, metadata), now);
        generation
    }

    /// Record a request that already carries a generation.
    pub fn enqueue(&mut self, request: PaginationRequest, now: Instant) {
        self.next_generation = self.next_generation.max(request.generation + 1);
        if let Some(previous) = self.pending.take() {
            trace!(
                "generation {} superseded by {}",
                previous.request.generation,
                request.generation
            );
        }
        self.pending = Some(Pending {
            request,
            deadline: now + self.debounce,
        });
    }

    /// Check if a request is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending request becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Run the pending request if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<PaginationOutcome> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Run the pending request immediately, ignoring the deadline.
    pub fn flush(&mut self) -> Option<PaginationOutcome> {
        let Pending { request, .. } = self.pending.take()?;
        debug!("paginating generation {}", request.generation);

        let result = pipeline::run(
            &request.markup,
            &request.metadata,
            &self.options,
            &mut self.measurer,
        );
        self.runs += 1;

        Some(PaginationOutcome {
            generation: request.generation,
            result,
        })
    }
}
