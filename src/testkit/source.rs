//! Market source doubles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::market::RawMarketRecord;
use crate::error::FetchError;
use crate::port::outbound::source::MarketSource;

type FetchResult = Result<Vec<RawMarketRecord>, FetchError>;

/// Deterministic test double for the market source.
///
/// Returns queued responses in order, then repeats the last one. An optional
/// delay makes each fetch slow, and concurrent fetches are tracked so tests
/// can assert that cycles never overlap.
#[derive(Debug)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<FetchResult>>,
    last: Mutex<FetchResult>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started_at: Mutex<Vec<Instant>>,
}

impl ScriptedSource {
    /// Source that always returns `records`.
    pub fn always(records: Vec<RawMarketRecord>) -> Self {
        Self::sequence(vec![Ok(records)])
    }

    /// Source that returns each response once, then repeats the last.
    pub fn sequence(responses: Vec<FetchResult>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(Ok(Vec::new())),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            started_at: Mutex::new(Vec::new()),
        }
    }

    /// Source whose every fetch fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self::sequence(vec![Err(error)])
    }

    /// Make every fetch take `delay` before returning.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Instant each fetch started, in call order.
    pub fn started_at(&self) -> Vec<Instant> {
        self.started_at.lock().expect("lock fetch starts").clone()
    }

    fn next_response(&self) -> FetchResult {
        let mut responses = self.responses.lock().expect("lock scripted responses");
        let mut last = self.last.lock().expect("lock last response");
        if let Some(response) = responses.pop_front() {
            *last = response;
        }
        last.clone()
    }
}

#[async_trait]
impl MarketSource for ScriptedSource {
    async fn fetch(&self) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started_at
            .lock()
            .expect("lock fetch starts")
            .push(Instant::now());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.next_response();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
