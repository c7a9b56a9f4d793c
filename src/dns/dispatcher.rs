//! Measurement dispatcher.
//!
//! Spawns one worker task per provider. Workers share nothing but the
//! sending half of a bounded channel; the returned [`Dispatch`] owns the
//! receiving half and is handed to the reporter.
//!
//! There is no run-wide cancellation. A worker stuck on a lookup is only
//! released by that lookup's own timeout.

use crate::dns::resolver::Lookup;
use crate::dns::types::{ProbeRequest, ProbeResult, Provider};
use crate::dns::worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Observer notified of cosmetic progress events.
///
/// Never consulted by the measurement itself.
pub trait ProgressObserver: Send + Sync {
    /// A worker was spawned for `provider`.
    fn on_dispatch(&self, _provider: &Provider, _index: usize, _total: usize) {}

    /// The reporter received a result.
    fn on_result(&self, _result: &ProbeResult, _received: usize, _total: usize) {}

    /// The reporter stopped receiving.
    fn on_finish(&self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Parameters shared by every worker of a run.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Hostnames each worker resolves
    pub domains: Vec<String>,
    /// Lookups per domain
    pub repetitions: usize,
    /// Budget for each lookup
    pub timeout: Duration,
}

/// A dispatched run.
///
/// Holds the only receiver of the result channel and the number of results
/// the reporter must collect.
pub struct Dispatch {
    rx: mpsc::Receiver<ProbeResult>,
    expected: usize,
    handles: Vec<JoinHandle<()>>,
    observer: Arc<dyn ProgressObserver>,
}

impl Dispatch {
    /// Number of results that will arrive.
    #[must_use]
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Receive the next result, `None` once every worker has finished.
    pub async fn recv(&mut self) -> Option<ProbeResult> {
        self.rx.recv().await
    }

    /// The observer attached to this run.
    #[must_use]
    pub fn observer(&self) -> &dyn ProgressObserver {
        self.observer.as_ref()
    }

    /// Wait for every worker task to exit and count the ones that panicked.
    pub async fn join(self) -> usize {
        let outcomes = futures::future::join_all(self.handles).await;
        let panicked = outcomes.iter().filter(|o| o.is_err()).count();
        if panicked > 0 {
            tracing::warn!("{panicked} worker(s) exited abnormally");
        }
        panicked
    }
}

/// Spawn one worker per provider.
///
/// With no providers or no domains nothing is spawned and the returned
/// dispatch expects zero results.
pub fn dispatch(
    providers: &[Provider],
    plan: &Plan,
    lookup: Arc<dyn Lookup>,
    observer: Arc<dyn ProgressObserver>,
) -> Dispatch {
    let total = if plan.domains.is_empty() {
        0
    } else {
        providers.len()
    };

    let (tx, rx) = mpsc::channel(total.max(1));
    let mut handles = Vec::with_capacity(total);

    for (idx, provider) in providers.iter().take(total).enumerate() {
        let request = ProbeRequest {
            timeout: plan.timeout,
            domains: plan.domains.clone(),
            repetitions: plan.repetitions,
            provider: provider.clone(),
        };
        let lookup = Arc::clone(&lookup);
        let tx = tx.clone();

        observer.on_dispatch(provider, idx, total);
        tracing::debug!("dispatching worker for {provider}");

        handles.push(tokio::spawn(async move {
            worker::run(request, lookup.as_ref(), tx).await;
        }));
    }

    // Workers hold the remaining senders; the channel closes when the last one exits.
    drop(tx);

    Dispatch {
        rx,
        expected: total,
        handles,
        observer,
    }
}
