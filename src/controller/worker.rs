//! Background repagination thread.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, trace};

use super::{PaginationOutcome, PaginationRequest, Repaginator};
use crate::error::{Error, Result};
use crate::layout::MeasurementProvider;
use crate::model::PublicationMetadata;
use crate::pipeline::PaginateOptions;

enum Command {
    Request(PaginationRequest),
    Flush,
}

/// Runs a [`Repaginator`] on its own thread.
///
/// The thread owns the measurer, so runs are strictly sequential. Requests
/// arriving during a run are debounced once the run has finished. Dropping
/// the worker paginates any pending request, then stops the thread.
pub struct DebounceWorker {
    commands: Option<Sender<Command>>,
    outcomes: Receiver<PaginationOutcome>,
    handle: Option<JoinHandle<()>>,
    next_generation: u64,
}

impl DebounceWorker {
    /// Start a worker.
    pub fn spawn<M>(measurer: M, options: PaginateOptions, debounce: Duration) -> Result<Self>
    where
        M: MeasurementProvider + Send + 'static,
    {
        let repaginator = Repaginator::new(measurer, options)?.with_debounce(debounce);
        let (command_tx, command_rx) = unbounded();
        let (outcome_tx, outcome_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("pressflow-repaginate".to_string())
            .spawn(move || run_loop(repaginator, command_rx, outcome_tx))?;

        Ok(Self {
            commands: Some(command_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
            next_generation: 0,
        })
    }

    /// Submit a new document version. Returns its generation.
    pub fn request(&mut self, markup: impl Into<String>, metadata: PublicationMetadata) -> Result<u64> {
        let generation = self.next_generation;
        self.send(Command::Request(PaginationRequest::new(generation, markup, metadata)))?;
        self.next_generation += 1;
        Ok(generation)
    }

    /// Paginate the pending request now.
    pub fn flush(&self) -> Result<()> {
        self.send(Command::Flush)
    }

    /// Channel delivering completed runs in order.
    pub fn outcomes(&self) -> &Receiver<PaginationOutcome> {
        &self.outcomes
    }

    /// Wait up to `timeout` for the next completed run.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PaginationOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }

    /// Stop the worker and wait for it to finish.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .as_ref()
            .ok_or_else(|| Error::Other("repagination worker has stopped".to_string()))?
            .send(command)
            .map_err(|_| Error::Other("repagination worker has stopped".to_string()))
    }

    fn stop(&mut self) -> Result<()> {
        self.commands.take();
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| Error::Other("repagination worker panicked".to_string()))?;
        }
        Ok(())
    }
}

impl Drop for DebounceWorker {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn run_loop<M: MeasurementProvider>(
    mut repaginator: Repaginator<M>,
    commands: Receiver<Command>,
    outcomes: Sender<PaginationOutcome>,
) {
    loop {
        let command = match repaginator.next_deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match commands.recv_timeout(timeout) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        let outcome = match command {
            Some(Command::Request(request)) => {
                repaginator.enqueue(request, Instant::now());
                None
            }
            Some(Command::Flush) => repaginator.flush(),
            None => repaginator.poll(Instant::now()),
        };

        if let Some(outcome) = outcome {
            if outcomes.send(outcome).is_err() {
                trace!("outcome receiver dropped");
                return;
            }
        }
    }

    if let Some(outcome) = repaginator.flush() {
        debug!("paginating pending generation {} on shutdown", outcome.generation);
        let _ = outcomes.send(outcome);
    }
}
