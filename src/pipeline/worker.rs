use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::{future::join_all, FutureExt};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    errors::FetcherError,
    fetcher::BlockSource,
    types::{FetchOutcome, HeightRange},
};

pub(crate) type TaskReceiver = Arc<Mutex<mpsc::Receiver<u64>>>;

/// Sends every height of `range` into the task channel, then closes it by dropping the sender.
pub(crate) fn spawn_producer(
    range: HeightRange,
    tasks: mpsc::Sender<u64>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for height in range {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(height, "producer cancelled");
                    return;
                }
                sent = tasks.send(height) => {
                    // Every worker is gone.
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    })
}

pub(crate) fn spawn_worker<S>(
    worker: usize,
    source: Arc<S>,
    tasks: TaskReceiver,
    outcomes: mpsc::Sender<FetchOutcome>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    S: BlockSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        run_worker(worker, source.as_ref(), &tasks, &outcomes, &cancel).await;
        debug!(worker, "worker finished");
    })
}

async fn run_worker<S>(
    worker: usize,
    source: &S,
    tasks: &Mutex<mpsc::Receiver<u64>>,
    outcomes: &mpsc::Sender<FetchOutcome>,
    cancel: &CancellationToken,
) where
    S: BlockSource + Send + Sync,
{
    loop {
        if cancel.is_cancelled() {
            return;
        }

        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            height = async { tasks.lock().await.recv().await } => height,
        };
        let Some(height) = next else {
            return;
        };

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(worker, height, "abandoning block after cancellation");
                return;
            }
            fetched = AssertUnwindSafe(source.fetch_block(height)).catch_unwind() => fetched,
        };

        let outcome = match fetched {
            Ok(Ok(block)) => FetchOutcome::Success(block),
            Ok(Err(error)) => FetchOutcome::Failure { height, error },
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(worker, height, panic = %message, "worker panicked while fetching block");
                FetchOutcome::Failure {
                    height,
                    error: FetcherError::worker_panicked(worker, message),
                }
            }
        };

        let failed = matches!(outcome, FetchOutcome::Failure { .. });
        if failed {
            warn!(worker, height, "worker stopping after failed block");
        }

        // Collector gone: nobody is listening anymore.
        if outcomes.send(outcome).await.is_err() || failed {
            return;
        }
    }
}

/// Joins every worker and the producer. Dropping `outcomes` afterwards closes the
/// outcome channel once the last worker sender is gone too.
pub(crate) fn spawn_supervisor(
    workers: Vec<JoinHandle<()>>,
    producer: JoinHandle<()>,
    outcomes: mpsc::Sender<FetchOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for (worker, joined) in join_all(workers).await.into_iter().enumerate() {
            if let Err(e) = joined {
                error!(worker, "worker task failed to join: {}", e);
            }
        }

        if let Err(e) = producer.await {
            error!("producer task failed to join: {}", e);
        }

        drop(outcomes);
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
