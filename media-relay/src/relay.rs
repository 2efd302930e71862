//! Background-task progress relay.
//!
//! One background tokio task runs an [`ExtractionJob`]. Progress ticks
//! flow through an unbounded FIFO events channel; exactly one
//! [`OperationOutcome`] flows through a oneshot result channel, sent
//! only after the job has fully returned. The foreground consumer
//! never blocks on the task: it drains both channels non-blockingly on
//! a fixed polling interval.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::{
    error::Error,
    types::{MediaInfo, OperationOutcome, ProgressEvent},
};

/// Producer side of the events channel. Emitting never blocks and
/// never fails; events sent after the consumer is gone are dropped.
#[derive(Clone)]
pub struct ProgressSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSink {
    pub fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// A long-running external operation driven on the background task.
#[async_trait]
pub trait ExtractionJob: Send + 'static {
    async fn run(self: Box<Self>, progress: ProgressSink) -> Result<MediaInfo, Error>;
}

/// Consumer side of one spawned operation.
pub struct RelayHandle {
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    outcome: oneshot::Receiver<OperationOutcome>,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// Drain every event queued so far without blocking. Order of the
    /// returned events matches emission order.
    pub fn drain_events(&mut self) -> Vec<ProgressEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Put a job on a background task and hand back the consumer side.
pub fn spawn_relay(job: Box<dyn ExtractionJob>) -> RelayHandle {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let sink = ProgressSink { tx: event_tx };

    let task = tokio::spawn(async move {
        let outcome = match job.run(sink).await {
            Ok(info) => {
                debug!("Extraction finished: {:?}", info.title);
                OperationOutcome::Finished(info)
            }
            Err(e) => {
                error!("Extraction failed: {}", e);
                OperationOutcome::Error {
                    message: e.to_string(),
                }
            }
        };
        // The consumer may already be gone; nothing to do then.
        let _ = outcome_tx.send(outcome);
    });

    RelayHandle {
        events: event_rx,
        outcome: outcome_rx,
        task,
    }
}

/// Fixed-interval drain cycle. Every queued event is handed to the
/// observer before the outcome is returned. A background task that
/// died without reporting yields an error outcome instead of a hang.
pub async fn poll_to_completion<F>(
    mut handle: RelayHandle,
    interval: Duration,
    mut observe: F,
) -> OperationOutcome
where
    F: FnMut(&ProgressEvent),
{
    loop {
        for event in handle.drain_events() {
            observe(&event);
        }

        match handle.outcome.try_recv() {
            Ok(outcome) => {
                // The producer enqueues the outcome last, so anything
                // still queued predates it; deliver before returning.
                for event in handle.drain_events() {
                    observe(&event);
                }
                return outcome;
            }
            Err(TryRecvError::Closed) => {
                for event in handle.drain_events() {
                    observe(&event);
                }
                error!("Background operation ended without reporting a result");
                return OperationOutcome::Error {
                    message: "background operation ended without reporting a result".to_string(),
                };
            }
            Err(TryRecvError::Empty) => {}
        }

        tokio::time::sleep(interval).await;
    }
}

/// Tracks at most one in-flight operation. Starting a second one while
/// the first is still running is rejected rather than letting two
/// producers race over shared display state.
#[derive(Default)]
pub struct Relay {
    current: Option<RelayHandle>,
}

impl Relay {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn start(&mut self, job: Box<dyn ExtractionJob>) -> Result<(), Error> {
        if let Some(handle) = &self.current {
            if handle.is_running() {
                return Err(Error::Busy);
            }
        }
        self.current = Some(spawn_relay(job));
        Ok(())
    }

    /// Poll the in-flight operation to completion, handing every
    /// progress event to the observer.
    pub async fn wait<F>(&mut self, interval: Duration, observe: F) -> Result<OperationOutcome, Error>
    where
        F: FnMut(&ProgressEvent),
    {
        let handle = self.current.take().ok_or(Error::NotStarted)?;
        Ok(poll_to_completion(handle, interval, observe).await)
    }
}
