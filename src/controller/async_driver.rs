//! Tokio driver for the repagination state machine.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::{PaginationOutcome, PaginationRequest, Repaginator};
use crate::layout::MeasurementProvider;

/// Drive a [`Repaginator`] from a request channel until it closes.
///
/// Outcomes are sent as runs complete. When the request channel closes, a
/// pending request is paginated immediately. The repaginator is returned so
/// its measurer (and cache) can be reused.
pub async fn run_debounced<M: MeasurementProvider>(
    mut repaginator: Repaginator<M>,
    mut requests: mpsc::Receiver<PaginationRequest>,
    outcomes: mpsc::Sender<PaginationOutcome>,
) -> Repaginator<M> {
    loop {
        let deadline = repaginator.next_deadline();
        let wake = deadline.map(Instant::from_std).unwrap_or_else(Instant::now);

        tokio::select! {
            request = requests.recv() => match request {
                Some(request) => repaginator.enqueue(request, Instant::now().into_std()),
                None => break,
            },
            _ = sleep_until(wake), if deadline.is_some() => {
                if let Some(outcome) = repaginator.poll(Instant::now().into_std()) {
                    if outcomes.send(outcome).await.is_err() {
                        return repaginator;
                    }
                }
            }
        }
    }

    if let Some(outcome) = repaginator.flush() {
        let _ = outcomes.send(outcome).await;
    }
    repaginator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FixedHeightMeasurer, Typography};
    use crate::model::PublicationMetadata;
    use crate::pipeline::PaginateOptions;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_debounce_with_paused_clock() {
        let measurer = FixedHeightMeasurer::new(|_: &str, _: f32, _: &Typography| 10.0);
        let repaginator = Repaginator::new(measurer, PaginateOptions::default()).unwrap();

        let (request_tx, request_rx) = mpsc::channel(8);
        let (outcome_tx, mut outcome_rx) = mpsc::channel(8);
        let driver = tokio::spawn(run_debounced(repaginator, request_rx, outcome_tx));

        let start = Instant::now();
        for (generation, body) in ["<p>a</p>", "<p>b</p>", "<p>c</p>"].into_iter().enumerate() {
            request_tx
                .send(PaginationRequest::new(generation as u64, body, PublicationMetadata::default()))
                .await
                .unwrap();
            sleep(Duration::from_millis(100)).await;
        }

        let outcome = outcome_rx.recv().await.unwrap();
        assert_eq!(outcome.generation, 2);
        assert!(start.elapsed() >= Duration::from_millis(700));

        drop(request_tx);
        let repaginator = driver.await.unwrap();
        assert_eq!(repaginator.runs(), 1);
        assert!(outcome_rx.recv().await.is_none());
    }
}
