//! Fixed-size worker pool for column-parallel clustering.
//!
//! The scheduler owns the slot table, the column cursor and the aggregation
//! buffer. Each dispatched column runs on the blocking pool with its own
//! isolated column copy and algorithm instance, and reports back on a single
//! completion channel. Every sweep waits a bounded time for completions,
//! frees finished slots, backfills idle slots and then yields so a
//! cancellation request can be observed.

use std::time::Duration;

use common::CancelFlag;
use strum_macros::Display;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::aggregate::ClusterAggregator;
use crate::cluster::ClusterGeometry;
use crate::config::POLL_BUDGET_MS;
use crate::context::{execute_isolated, SearchContext};
use crate::dataset::ColumnarData;
use crate::error::{AlgorithmResult, SearchError, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SlotState {
    Idle,
    Running,
}

#[derive(Debug, Default)]
struct WorkerSlot {
    /// 0-based column owned by the running task.
    column: Option<usize>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerSlot {
    fn state(&self) -> SlotState {
        if self.handle.is_some() {
            SlotState::Running
        } else {
            SlotState::Idle
        }
    }
}

#[derive(Debug)]
struct Completion {
    slot: usize,
    column: usize,
    result: AlgorithmResult<Vec<ClusterGeometry>>,
}

#[derive(Debug)]
pub(crate) struct WorkerPool {
    slots: Vec<WorkerSlot>,
    poll_slice: Duration,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        assert!(worker_count > 1, "WorkerPool needs at least two slots");

        let (tx, rx) = unbounded_channel();
        Self {
            slots: (0..worker_count).map(|_| WorkerSlot::default()).collect(),
            poll_slice: Duration::from_millis(POLL_BUDGET_MS) / worker_count as u32,
            tx,
            rx,
        }
    }

    pub fn slot_states(&self) -> Vec<SlotState> {
        self.slots.iter().map(WorkerSlot::state).collect()
    }

    fn running_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state() == SlotState::Running)
            .count()
    }

    /// Clusters every column of `columns`, adding results to `aggregator`.
    ///
    /// The first failure stops dispatching; slots that are already running
    /// are drained before the error is returned.
    pub async fn run(
        &mut self,
        ctx: &SearchContext<'_>,
        dataset: &ColumnarData,
        columns: &[usize],
        cancel: &CancelFlag,
        aggregator: &mut ClusterAggregator,
    ) -> SearchResult<()> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let mut pending = columns.iter().copied().peekable();
        let mut dispatched = 0usize;
        let mut failure: Option<SearchError> = None;

        loop {
            for completion in self.poll().await {
                self.drain(ctx, completion, aggregator, &mut failure).await;
            }

            if failure.is_none() {
                for slot in 0..self.slots.len() {
                    if self.slots[slot].state() != SlotState::Idle {
                        continue;
                    }
                    let Some(column) = pending.next() else {
                        break;
                    };

                    dispatched += 1;
                    ctx.report_progress(dispatched);
                    if let Err(err) = self.dispatch(ctx, dataset, slot, column) {
                        failure = Some(err);
                        break;
                    }
                }
            }

            let out_of_work = failure.is_some() || pending.peek().is_none();
            if out_of_work && self.running_count() == 0 {
                break;
            }

            tokio::task::yield_now().await;

            if failure.is_none() && cancel.is_cancelled() {
                warn!(
                    running = self.running_count(),
                    "Cluster search cancelled, draining running slots"
                );
                failure = Some(SearchError::Cancelled);
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn dispatch(
        &mut self,
        ctx: &SearchContext<'_>,
        dataset: &ColumnarData,
        slot: usize,
        column: usize,
    ) -> SearchResult<()> {
        let instance = ctx.instantiate(dataset, column)?;
        let tx = self.tx.clone();

        let handle = tokio::task::spawn_blocking(move || {
            // the instance and its column copy are dropped before completion is reported
            let result = execute_isolated(column, instance);
            let _ = tx.send(Completion {
                slot,
                column,
                result,
            });
        });

        debug!(slot, column, "Started worker slot");
        self.slots[slot] = WorkerSlot {
            column: Some(column),
            handle: Some(handle),
        };
        Ok(())
    }

    /// Waits up to one poll slice per running slot for the first completion,
    /// then collects whatever else already finished.
    async fn poll(&mut self) -> Vec<Completion> {
        let running = self.running_count();
        if running == 0 {
            return Vec::new();
        }

        let mut completions = Vec::new();
        let wait = self.poll_slice * running as u32;
        match tokio::time::timeout(wait, self.rx.recv()).await {
            Ok(Some(completion)) => completions.push(completion),
            // the pool holds a sender, the channel cannot close
            Ok(None) => return completions,
            Err(_elapsed) => return completions,
        }
        while let Ok(completion) = self.rx.try_recv() {
            completions.push(completion);
        }
        completions
    }

    async fn drain(
        &mut self,
        ctx: &SearchContext<'_>,
        completion: Completion,
        aggregator: &mut ClusterAggregator,
        failure: &mut Option<SearchError>,
    ) {
        let slot = &mut self.slots[completion.slot];
        debug_assert_eq!(slot.column, Some(completion.column));

        if let Some(handle) = slot.handle.take() {
            if let Err(err) = handle.await {
                error!(slot = completion.slot, "Worker task failed to join: {err}");
            }
        }
        slot.column = None;

        match completion.result {
            Ok(geometries) if failure.is_none() => {
                debug!(
                    slot = completion.slot,
                    column = completion.column,
                    clusters = geometries.len(),
                    "Worker slot finished"
                );
                aggregator.add_column(
                    completion.column + 1,
                    ctx.finish_column(completion.column, geometries),
                );
            }
            // results arriving after an abort are discarded
            Ok(_) => {}
            Err(err) => {
                error!("{err}");
                if failure.is_none() {
                    *failure = Some(err.into());
                }
            }
        }
    }
}
