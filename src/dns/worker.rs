//! Per-provider measurement worker.
//!
//! A worker resolves every domain `repetitions` times in order, stops at the
//! first failing lookup and reports one [`ProbeResult`].

use crate::dns::resolver::Lookup;
use crate::dns::types::{FailureReason, ProbeRequest, ProbeResult};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

/// Measure one provider and send its result.
///
/// Exactly one value is sent on `tx` whatever the outcome. A closed channel
/// means nobody is waiting for the result any more and is only logged.
pub async fn run(request: ProbeRequest, lookup: &dyn Lookup, tx: mpsc::Sender<ProbeResult>) {
    let result = measure(&request, lookup).await;
    if tx.send(result).await.is_err() {
        tracing::debug!("result channel closed before {} reported", request.provider);
    }
}

/// Measure one provider.
///
/// Every lookup is bounded by `request.timeout`. Elapsed time runs from
/// issuing the lookup until it answers. On success the average is the total
/// elapsed time divided by `repetitions × domains.len()`.
pub async fn measure(request: &ProbeRequest, lookup: &dyn Lookup) -> ProbeResult {
    let provider = &request.provider;
    let mut total = Duration::ZERO;

    for domain in &request.domains {
        for attempt in 0..request.repetitions {
            let start = Instant::now();
            let outcome = timeout(request.timeout, lookup.lookup(provider, domain)).await;
            let elapsed = start.elapsed();

            let reason = match outcome {
                Ok(Ok(count)) => {
                    tracing::trace!(
                        "{provider}: {domain} #{attempt} -> {count} addrs in {elapsed:?}"
                    );
                    total += elapsed;
                    continue;
                }
                Ok(Err(e)) if e.is_timeout() => FailureReason::Timeout {
                    domain: domain.clone(),
                },
                Ok(Err(e)) => FailureReason::Resolve {
                    domain: domain.clone(),
                    message: e.to_string(),
                },
                Err(_) => FailureReason::Timeout {
                    domain: domain.clone(),
                },
            };

            tracing::debug!("{provider}: abandoning measurement, {reason}");
            return ProbeResult::failure(provider.clone(), reason, request.timeout);
        }
    }

    let lookups = request.total_lookups();
    let average = mean(total, lookups);
    tracing::debug!("{provider}: average {average:?} over {lookups} lookups");
    ProbeResult::success(provider.clone(), average)
}

/// Mean of `lookups` samples summing to `total`, zero when there are none.
fn mean(total: Duration, lookups: usize) -> Duration {
    if lookups == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / lookups as u128;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dns::resolver::LookupError;
    use crate::dns::types::Provider;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// What the fake resolver does for a domain.
    #[derive(Debug, Clone)]
    pub(crate) enum Behavior {
        Answer(Duration),
        Fail(Duration, &'static str),
        Hang,
    }

    /// Resolver that panics for one provider and answers instantly for the rest.
    #[derive(Debug)]
    pub(crate) struct PanicFor(pub(crate) &'static str);

    #[async_trait]
    impl Lookup for PanicFor {
        async fn lookup(
            &self,
            provider: &Provider,
            _domain: &str,
        ) -> std::result::Result<usize, LookupError> {
            assert_ne!(provider.name, self.0, "resolver crashed");
            Ok(1)
        }
    }

    /// Deterministic resolver: sleeps on tokio's clock and counts calls.
    #[derive(Debug, Default)]
    pub(crate) struct FakeLookup {
        behaviors: HashMap<String, Behavior>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeLookup {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with(mut self, domain: &str, behavior: Behavior) -> Self {
            self.behaviors.insert(domain.to_string(), behavior);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Lookup for FakeLookup {
        async fn lookup(
            &self,
            _provider: &Provider,
            domain: &str,
        ) -> std::result::Result<usize, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self
                .behaviors
                .get(domain)
                .cloned()
                .unwrap_or(Behavior::Answer(Duration::ZERO))
            {
                Behavior::Answer(latency) => {
                    tokio::time::sleep(latency).await;
                    Ok(1)
                }
                Behavior::Fail(latency, msg) => {
                    tokio::time::sleep(latency).await;
                    Err(LookupError::other(msg))
                }
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    Ok(0)
                }
            }
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn request(domains: &[&str], repetitions: usize) -> ProbeRequest {
        ProbeRequest {
            timeout: ms(1000),
            domains: domains.iter().map(|d| (*d).to_string()).collect(),
            repetitions,
            provider: Provider::new("Test", "8.8.8.8"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_average_is_exact_mean() {
        let lookup = FakeLookup::new()
            .with("a.com", Behavior::Answer(ms(10)))
            .with("b.com", Behavior::Answer(ms(30)))
            .with("c.com", Behavior::Answer(ms(50)));

        let result = measure(&request(&["a.com", "b.com", "c.com"], 4), &lookup).await;

        assert_eq!(result, ProbeResult::success(Provider::new("Test", "8.8.8.8"), ms(30)));
        assert_eq!(lookup.calls(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_lookup_average() {
        let lookup = FakeLookup::new().with("a.com", Behavior::Answer(ms(42)));
        let result = measure(&request(&["a.com"], 1), &lookup).await;
        assert_eq!(result.average(), Some(ms(42)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_abandons_remaining_domains() {
        let lookup = FakeLookup::new()
            .with("a.com", Behavior::Answer(ms(5)))
            .with("b.com", Behavior::Hang)
            .with("c.com", Behavior::Answer(ms(5)));

        let started = Instant::now();
        let result = measure(&request(&["a.com", "b.com", "c.com"], 3), &lookup).await;

        // 3 lookups of a.com, then the first of b.com hangs
        assert_eq!(lookup.calls(), 4);
        assert_eq!(
            result,
            ProbeResult::failure(
                Provider::new("Test", "8.8.8.8"),
                FailureReason::Timeout {
                    domain: "b.com".into()
                },
                ms(1000),
            )
        );
        assert_eq!(started.elapsed(), ms(15) + ms(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_answer_counts_as_timeout() {
        let lookup = FakeLookup::new().with("a.com", Behavior::Answer(ms(1500)));
        let result = measure(&request(&["a.com"], 5), &lookup).await;

        assert_eq!(lookup.calls(), 1);
        assert!(result.reason().is_some_and(FailureReason::is_timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_error_keeps_message() {
        let lookup = FakeLookup::new()
            .with("a.com", Behavior::Answer(ms(1)))
            .with("nx.invalid", Behavior::Fail(ms(2), "no record found"));

        let result = measure(&request(&["a.com", "nx.invalid", "a.com"], 2), &lookup).await;

        assert_eq!(lookup.calls(), 3);
        match result {
            ProbeResult::Failure {
                reason,
                latency_at_timeout,
                ..
            } => {
                assert_eq!(
                    reason,
                    FailureReason::Resolve {
                        domain: "nx.invalid".into(),
                        message: "no record found".into(),
                    }
                );
                assert_eq!(latency_at_timeout, ms(1000));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_mean_beyond_u32_lookups() {
        let lookups = 5_000_000_000usize;
        assert_eq!(mean(Duration::from_secs(10_000), lookups), Duration::from_nanos(2000));
        assert_eq!(mean(ms(90), 3), ms(30));
        assert_eq!(mean(ms(90), 0), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_domains_is_zero_average() {
        let lookup = FakeLookup::new();
        let result = measure(&request(&[], 5), &lookup).await;
        assert_eq!(result.average(), Some(Duration::ZERO));
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sends_exactly_once() {
        let lookup = FakeLookup::new().with("a.com", Behavior::Hang);
        let (tx, mut rx) = mpsc::channel(4);

        run(request(&["a.com"], 2), &lookup, tx).await;

        assert!(rx.recv().await.is_some_and(|r| !r.is_success()));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_closed_channel() {
        let lookup = FakeLookup::new();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        run(request(&["a.com"], 1), &lookup, tx).await;
    }
}
