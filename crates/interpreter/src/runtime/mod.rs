//! Breadth-first execution of prepared operations.
//!
//! Fields are executed as far as they can go without syncing a lazy value. Lazy values are
//! queued and synced together, one wave at a time: every lazy value produced while completing
//! a wave belongs to the next one. Syncing a whole wave after the dataloader fetched every
//! pending key is what lets sibling fields, and sibling queries, share a single batch fetch.

mod complete;
mod query;

use graphql_dataloader::Dataloader;

use crate::{response::Response, ExecutionError};
pub(crate) use query::QueryRun;

/// Runs queries sharing one dataloader until all of them are done.
///
/// Each round starts the next step of every query, a single one for queries and one per root
/// field for mutations, then drains the lazy values. `on_finished` gets the response of a query
/// as soon as it has no step left.
pub(crate) fn run<'a>(
    runs: Vec<QueryRun<'a>>,
    dataloader: &Dataloader,
    mut on_finished: impl FnMut(usize, Response),
) -> Result<(), ExecutionError> {
    let mut runs: Vec<Option<QueryRun<'a>>> = runs.into_iter().map(Some).collect();

    while runs.iter().any(Option::is_some) {
        for run in runs.iter_mut().flatten() {
            run.start_next_step()?;
        }
        drain(&mut runs, dataloader)?;

        for slot in &mut runs {
            if slot.as_ref().is_some_and(|run| !run.has_steps()) {
                if let Some(run) = slot.take() {
                    tracing::debug!(query = run.index, "Query finished");
                    on_finished(run.index, run.into_response());
                }
            }
        }
    }
    Ok(())
}

fn drain<'a>(runs: &mut [Option<QueryRun<'a>>], dataloader: &Dataloader) -> Result<(), ExecutionError> {
    loop {
        let mut wave = Vec::new();
        for (slot, run) in runs.iter_mut().enumerate() {
            if let Some(run) = run {
                wave.extend(run.queue.drain(..).map(|pending| (slot, pending)));
            }
        }
        if wave.is_empty() {
            return Ok(());
        }
        tracing::debug!(size = wave.len(), "Syncing lazy wave");

        dataloader.fulfill_pending();
        let synced = wave
            .into_iter()
            .map(|(slot, pending)| (slot, pending.target, pending.after, pending.lazy.sync()))
            .collect::<Vec<_>>();

        for (slot, target, after, result) in synced {
            if let Some(run) = runs.get_mut(slot).and_then(Option::as_mut) {
                run.complete_resolved(target, result, after)?;
            }
        }
    }
}
