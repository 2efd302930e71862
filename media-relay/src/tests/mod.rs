use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::Error,
    relay::{poll_to_completion, spawn_relay, ExtractionJob, ProgressSink, Relay},
    types::{MediaInfo, OperationOutcome, ProgressEvent},
};

/// Simulated operation emitting a fixed number of progress ticks, with
/// an optional pause between them to vary producer timing.
struct FakeJob {
    ticks: u64,
    pause: Duration,
}

impl FakeJob {
    fn new(ticks: u64, pause: Duration) -> Self {
        Self { ticks, pause }
    }
}

#[async_trait]
impl ExtractionJob for FakeJob {
    async fn run(self: Box<Self>, progress: ProgressSink) -> Result<MediaInfo, Error> {
        for i in 0..self.ticks {
            progress.emit(ProgressEvent::Downloading {
                downloaded_bytes: i,
                total_bytes: Some(self.ticks),
                filename: Some("fake.mp4".to_string()),
            });
            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }
        progress.emit(ProgressEvent::Finished {
            filename: Some("fake.mp4".to_string()),
        });
        Ok(MediaInfo {
            title: "fake".to_string(),
            ext: "mp4".to_string(),
            output_path: None,
        })
    }
}

/// Simulated crash: the task dies before any outcome is produced.
struct CrashingJob;

#[async_trait]
impl ExtractionJob for CrashingJob {
    async fn run(self: Box<Self>, progress: ProgressSink) -> Result<MediaInfo, Error> {
        progress.emit(ProgressEvent::Downloading {
            downloaded_bytes: 1,
            total_bytes: None,
            filename: None,
        });
        panic!("simulated worker crash");
    }
}

struct FailingJob;

#[async_trait]
impl ExtractionJob for FailingJob {
    async fn run(self: Box<Self>, _progress: ProgressSink) -> Result<MediaInfo, Error> {
        Err(Error::Extraction("unresolvable url".to_string()))
    }
}

fn downloaded_bytes(event: &ProgressEvent) -> Option<u64> {
    match event {
        ProgressEvent::Downloading {
            downloaded_bytes, ..
        } => Some(*downloaded_bytes),
        _ => None,
    }
}

#[tokio::test]
async fn events_are_observed_in_emission_order_before_outcome() {
    let handle = spawn_relay(Box::new(FakeJob::new(50, Duration::ZERO)));

    let mut seen = Vec::new();
    let outcome = poll_to_completion(handle, Duration::from_millis(5), |event| {
        seen.push(event.clone());
    })
    .await;

    assert!(matches!(outcome, OperationOutcome::Finished(_)));
    assert_eq!(seen.len(), 51);
    for (i, event) in seen.iter().take(50).enumerate() {
        assert_eq!(downloaded_bytes(event), Some(i as u64));
    }
    assert!(matches!(seen.last(), Some(ProgressEvent::Finished { .. })));
}

#[tokio::test]
async fn slow_producer_still_delivers_every_event_in_order() {
    let handle = spawn_relay(Box::new(FakeJob::new(10, Duration::from_millis(15))));

    let mut seen = Vec::new();
    let outcome = poll_to_completion(handle, Duration::from_millis(5), |event| {
        seen.push(event.clone());
    })
    .await;

    assert!(matches!(outcome, OperationOutcome::Finished(_)));
    assert_eq!(seen.len(), 11);
    for (i, event) in seen.iter().take(10).enumerate() {
        assert_eq!(downloaded_bytes(event), Some(i as u64));
    }
}

#[tokio::test]
async fn crashed_worker_surfaces_an_error_outcome_instead_of_hanging() {
    let handle = spawn_relay(Box::new(CrashingJob));

    let mut seen = Vec::new();
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        poll_to_completion(handle, Duration::from_millis(5), |event| {
            seen.push(event.clone());
        }),
    )
    .await
    .expect("polling loop must not hang on a dead worker");

    assert!(outcome.is_error());
    // Events emitted before the crash are still delivered.
    assert_eq!(seen.len(), 1);
}

#[tokio::test]
async fn job_errors_become_error_outcomes() {
    let handle = spawn_relay(Box::new(FailingJob));

    let outcome = poll_to_completion(handle, Duration::from_millis(5), |_| {}).await;
    match outcome {
        OperationOutcome::Error { message } => assert!(message.contains("unresolvable url")),
        other => panic!("expected error outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_trigger_is_rejected_while_running() {
    let mut relay = Relay::new();
    relay
        .start(Box::new(FakeJob::new(5, Duration::from_millis(50))))
        .unwrap();

    // Second trigger while the first operation is in flight.
    let second = relay.start(Box::new(FakeJob::new(1, Duration::ZERO)));
    assert!(matches!(second, Err(Error::Busy)));

    let outcome = relay.wait(Duration::from_millis(5), |_| {}).await.unwrap();
    assert!(matches!(outcome, OperationOutcome::Finished(_)));

    // Once drained, a new operation may start.
    relay
        .start(Box::new(FakeJob::new(1, Duration::ZERO)))
        .unwrap();
    let outcome = relay.wait(Duration::from_millis(5), |_| {}).await.unwrap();
    assert!(matches!(outcome, OperationOutcome::Finished(_)));
}

#[tokio::test]
async fn waiting_without_a_start_is_an_error() {
    let mut relay = Relay::new();
    let result = relay.wait(Duration::from_millis(5), |_| {}).await;
    assert!(matches!(result, Err(Error::NotStarted)));
}
