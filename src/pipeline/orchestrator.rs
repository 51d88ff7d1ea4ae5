use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    errors::{FetcherError, Result},
    fetcher::BlockSource,
    pipeline::worker::{spawn_producer, spawn_supervisor, spawn_worker},
    types::{BlockMetadata, ChainId, FetchOutcome, HeightRange, Output},
};

// Upper bound on the up-front allocation for collected blocks.
const MAX_PREALLOCATED_BLOCKS: usize = 100_000;
const PROGRESS_LOG_INTERVAL: usize = 1_000;

/// Drives a bounded worker pool over a height range and aggregates the results.
pub struct Orchestrator<S> {
    source: Arc<S>,
    range: HeightRange,
    parallelism: usize,
    shutdown: CancellationToken,
}

impl<S> Orchestrator<S>
where
    S: BlockSource + Send + Sync + 'static,
{
    /// `shutdown` lets the caller abort the run from outside (e.g. on Ctrl+C).
    pub fn new(
        source: Arc<S>,
        range: HeightRange,
        parallelism: usize,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        if parallelism == 0 {
            return Err(FetcherError::configuration(
                "parallelism",
                "Parallelism must be greater than 0",
            ));
        }

        Ok(Self {
            source,
            range,
            parallelism,
            shutdown,
        })
    }

    /// Fetches every height in the range. Either all of them succeed and the
    /// aggregate is returned, or the first failure is returned and nothing else.
    pub async fn run(&self) -> Result<Output> {
        if self.shutdown.is_cancelled() {
            return Err(FetcherError::Cancelled);
        }

        let chain_id = self.resolve_chain_id().await?;
        info!(
            chain_id = %chain_id,
            range = %self.range,
            parallelism = self.parallelism,
            "Fetching blocks"
        );

        // Child token: a failed run must not cancel the caller's token.
        let run_token = self.shutdown.child_token();

        let (task_tx, task_rx) = mpsc::channel::<u64>(self.parallelism);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<FetchOutcome>(self.parallelism);

        let producer = spawn_producer(self.range, task_tx, run_token.clone());

        let task_rx = Arc::new(Mutex::new(task_rx));
        let workers = (0..self.parallelism)
            .map(|worker| {
                spawn_worker(
                    worker,
                    self.source.clone(),
                    task_rx.clone(),
                    outcome_tx.clone(),
                    run_token.clone(),
                )
            })
            .collect();
        drop(task_rx);

        let supervisor = spawn_supervisor(workers, producer, outcome_tx);

        let collected = self.collect(&mut outcome_rx, &run_token).await;

        // Wind the pool down before returning so no request outlives the run.
        run_token.cancel();
        drop(outcome_rx);
        if let Err(e) = supervisor.await {
            error!("supervisor task failed to join: {}", e);
        }

        let blocks = collected?;
        info!(
            chain_id = %chain_id,
            blocks = blocks.len(),
            "Fetched all blocks in range {}",
            self.range
        );
        Ok(Output::new(chain_id, blocks))
    }

    async fn resolve_chain_id(&self) -> Result<ChainId> {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(FetcherError::Cancelled),
            chain_id = self.source.chain_id() => {
                chain_id.map_err(|e| {
                    error!("Failed to resolve chain ID: {}", e);
                    FetcherError::chain_id_unavailable(e)
                })
            }
        }
    }

    async fn collect(
        &self,
        outcomes: &mut mpsc::Receiver<FetchOutcome>,
        run_token: &CancellationToken,
    ) -> Result<Vec<BlockMetadata>> {
        let expected = usize::try_from(self.range.len()).unwrap_or(usize::MAX);
        let mut blocks = Vec::with_capacity(expected.min(MAX_PREALLOCATED_BLOCKS));

        while let Some(outcome) = outcomes.recv().await {
            match outcome {
                FetchOutcome::Success(block) => {
                    debug!(height = block.height, num_txs = block.num_txs, "collected block");
                    blocks.push(block);
                    if blocks.len() % PROGRESS_LOG_INTERVAL == 0 {
                        info!("Collected {}/{} blocks", blocks.len(), expected);
                    }
                }
                FetchOutcome::Failure { height, error } => {
                    error!(height, "Block fetch failed: {}", error);
                    run_token.cancel();
                    warn!(
                        "Discarding {} collected blocks after failure at height {}",
                        blocks.len(),
                        height
                    );
                    return Err(FetcherError::block_fetch_failed(height, error));
                }
            }
        }

        // Only an outside cancellation closes the channel early without a failure.
        if blocks.len() != expected {
            warn!("Run stopped after {}/{} blocks", blocks.len(), expected);
            return Err(FetcherError::Cancelled);
        }

        Ok(blocks)
    }
}
