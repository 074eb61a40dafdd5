//! Debounced, race-free search.
//!
//! [`SearchMachine`] is the transition function: it owns the
//! [`SearchState`] and a generation counter that advances every time a new
//! request is issued or the query is cleared. A response is applied only if
//! it carries the current generation, so whatever order the network completes
//! in, only the most recently issued query can show up in the state.
//!
//! [`QueryController`] runs the machine on a tokio task. Input changes are
//! coalesced until they have been stable for the debounce period; every
//! change restarts the timer. When a new request is issued the previous one is
//! aborted, and its result would be discarded by generation anyway.
//!
//! ```text
//! Idle ──debounced query──▶ Loading ──≥1 result──▶ Success
//!   ▲                          │ └────0 results──▶ Empty
//!   └──── blank query ─────────┤
//!                              └────failure─────▶ Error ──retry──▶ Loading
//! ```

use crate::types::{SearchResponse, SearchResult};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Search lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    /// No query.
    #[default]
    Idle,
    /// A request for the current query is in flight.
    Loading,
    /// The current query returned at least one result.
    Success,
    /// The current query returned no results.
    Empty,
    /// The request for the current query failed.
    Error,
}

/// Everything the result view needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    /// Current status.
    pub status: SearchStatus,
    /// Trimmed query the state belongs to.
    pub query: String,
    /// Results in server rank order.
    pub results: Vec<SearchResult>,
    /// Server-reported total.
    pub total: u64,
    /// Human-readable failure, set only in [`SearchStatus::Error`].
    pub error: Option<String>,
}

/// Remote search capability used by the controller.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search.
    async fn search(&self, query: &str) -> Result<SearchResponse>;
}

/// A request the machine wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Generation the response must carry to be applied.
    pub generation: u64,
    /// Query to send.
    pub query: String,
}

/// Pure search state machine.
#[derive(Debug, Default)]
pub struct SearchMachine {
    state: SearchState,
    generation: u64,
}

impl SearchMachine {
    /// Start in [`SearchStatus::Idle`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    /// Current generation.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply a debounced input value.
    ///
    /// A blank value resets to Idle and invalidates anything in flight. A
    /// value equal to the current query is ignored in every non-Idle status;
    /// after a failure only [`retry`](Self::retry) re-issues it. Anything else
    /// returns the request to issue.
    pub fn submit(&mut self, input: &str) -> Option<Ticket> {
        let query = input.trim();
        if query.is_empty() {
            self.generation += 1;
            self.state = SearchState::default();
            return None;
        }

        let unchanged = query == self.state.query
            && matches!(
                self.state.status,
                SearchStatus::Loading
                    | SearchStatus::Success
                    | SearchStatus::Empty
                    | SearchStatus::Error
            );
        if unchanged {
            return None;
        }

        Some(self.issue(query.to_string()))
    }

    /// Re-issue the current query after a failure. Ignored in any other state.
    pub fn retry(&mut self) -> Option<Ticket> {
        if self.state.status != SearchStatus::Error {
            return None;
        }
        Some(self.issue(self.state.query.clone()))
    }

    /// Invalidate anything in flight without touching the visible state.
    pub const fn cancel(&mut self) {
        self.generation += 1;
    }

    fn issue(&mut self, query: String) -> Ticket {
        self.generation += 1;
        self.state.status = SearchStatus::Loading;
        self.state.query.clone_from(&query);
        self.state.error = None;
        Ticket {
            generation: self.generation,
            query,
        }
    }

    /// Apply the outcome of the request issued as `generation`.
    ///
    /// Returns `false` and leaves the state untouched when the request has
    /// been superseded or the outcome is a cancellation.
    pub fn resolve(&mut self, generation: u64, outcome: Result<SearchResponse>) -> bool {
        if generation != self.generation || self.state.status != SearchStatus::Loading {
            debug!(
                generation,
                current = self.generation,
                "discarding superseded search response"
            );
            return false;
        }

        match outcome {
            Ok(response) => {
                self.state.status = if response.results.is_empty() {
                    SearchStatus::Empty
                } else {
                    SearchStatus::Success
                };
                self.state.results = response.results;
                self.state.total = response.total;
                self.state.error = None;
            },
            Err(e) if e.is_cancellation() => {
                debug!(generation, "search cancelled");
                return false;
            },
            Err(e) => {
                warn!(category = e.category(), "search failed: {e}");
                self.state.status = SearchStatus::Error;
                self.state.results.clear();
                self.state.total = 0;
                self.state.error = Some(e.to_string());
            },
        }
        true
    }
}

enum Command {
    Input { value: String, seq: u64 },
    Retry { seq: u64 },
    Shutdown,
}

struct Completion {
    generation: u64,
    outcome: Result<SearchResponse>,
}

struct Pending {
    value: String,
    deadline: Instant,
}

struct InFlight {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Handle to a running search controller.
///
/// Dropping the handle stops the controller and cancels the in-flight request.
pub struct QueryController {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SearchState>,
    applied: watch::Receiver<u64>,
    sent: AtomicU64,
    driver: JoinHandle<()>,
}

impl QueryController {
    /// Spawn a controller on the current tokio runtime.
    pub fn spawn(backend: Arc<dyn SearchBackend>, debounce: Duration) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(SearchState::default());
        let (applied_tx, applied) = watch::channel(0);

        let driver = Driver {
            backend,
            debounce,
            machine: SearchMachine::new(),
            commands: command_rx,
            completion_tx,
            completions: completion_rx,
            state_tx,
            applied_tx,
            pending: None,
            in_flight: None,
            latest_seq: 0,
        };

        Self {
            commands,
            state,
            applied,
            sent: AtomicU64::new(0),
            driver: tokio::spawn(driver.run()),
        }
    }

    /// Report the latest raw input value.
    pub fn set_query(&self, value: impl Into<String>) {
        let seq = self.next_seq();
        self.send(Command::Input {
            value: value.into(),
            seq,
        });
    }

    /// Retry the current query if the last request failed.
    pub fn retry(&self) {
        let seq = self.next_seq();
        self.send(Command::Retry { seq });
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Wait until every input sent so far has gone through the debounce and
    /// the resulting request, if any, has resolved.
    pub async fn settled(&self) -> SearchState {
        let target = self.sent.load(Ordering::SeqCst);
        let mut applied = self.applied.clone();
        if applied.wait_for(|seq| *seq >= target).await.is_err() {
            return self.state();
        }

        let mut state = self.state.clone();
        match state
            .wait_for(|s| s.status != SearchStatus::Loading)
            .await
        {
            Ok(settled) => (*settled).clone(),
            Err(_) => self.state(),
        }
    }

    /// Stop the controller, cancelling the in-flight request.
    pub async fn shutdown(self) {
        let Self {
            commands, driver, ..
        } = self;
        if commands.send(Command::Shutdown).is_ok() {
            if let Err(e) = driver.await {
                warn!("search controller task failed: {e}");
            }
        }
    }

    fn next_seq(&self) -> u64 {
        self.sent.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("search controller is no longer running");
        }
    }
}

struct Driver {
    backend: Arc<dyn SearchBackend>,
    debounce: Duration,
    machine: SearchMachine,
    commands: mpsc::UnboundedReceiver<Command>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    state_tx: watch::Sender<SearchState>,
    applied_tx: watch::Sender<u64>,
    pending: Option<Pending>,
    in_flight: Option<InFlight>,
    latest_seq: u64,
}

impl Driver {
    async fn run(mut self) {
        loop {
            let deadline = self.pending.as_ref().map(|p| p.deadline);

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Input { value, seq }) => {
                        self.latest_seq = seq;
                        self.pending = Some(Pending {
                            value,
                            deadline: Instant::now() + self.debounce,
                        });
                    },
                    Some(Command::Retry { seq }) => {
                        self.latest_seq = seq;
                        if let Some(ticket) = self.machine.retry() {
                            debug!(generation = ticket.generation, "retrying search");
                            self.issue(ticket);
                        }
                        self.publish();
                    },
                    Some(Command::Shutdown) | None => break,
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(pending) = self.pending.take() {
                        debug!(query = %pending.value, "debounce elapsed");
                        if let Some(ticket) = self.machine.submit(&pending.value) {
                            self.issue(ticket);
                        }
                        self.reap_stale();
                        self.publish();
                    }
                },
                Some(done) = self.completions.recv() => {
                    let current = self
                        .in_flight
                        .as_ref()
                        .is_some_and(|f| f.generation == done.generation);
                    if current {
                        self.in_flight = None;
                    }
                    if self.machine.resolve(done.generation, done.outcome) {
                        self.publish();
                    }
                },
            }
        }

        self.machine.cancel();
        self.reap_stale();
        debug!("search controller stopped");
    }

    fn issue(&mut self, ticket: Ticket) {
        self.reap_stale();

        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        let Ticket { generation, query } = ticket;
        debug!(generation, %query, "issuing search");

        let handle = tokio::spawn(async move {
            let outcome = backend.search(&query).await;
            // The driver may already be gone; nothing left to update then.
            let _ = tx.send(Completion {
                generation,
                outcome,
            });
        });
        self.in_flight = Some(InFlight { generation, handle });
    }

    /// Abort the in-flight request if the machine has moved past it.
    fn reap_stale(&mut self) {
        let stale = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation != self.machine.generation());
        if stale {
            if let Some(f) = self.in_flight.take() {
                debug!(generation = f.generation, "cancelling superseded search");
                f.handle.abort();
            }
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.machine.state().clone());
        if self.pending.is_none() {
            self.applied_tx.send_replace(self.latest_seq);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::Error;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Clone)]
    enum Outcome {
        Hits(Vec<&'static str>),
        Fail(u16),
    }

    #[derive(Default)]
    struct MockBackend {
        calls: Mutex<Vec<String>>,
        delays: HashMap<&'static str, Duration>,
        script: Mutex<HashMap<&'static str, VecDeque<Outcome>>>,
    }

    impl MockBackend {
        fn with_delay(mut self, query: &'static str, millis: u64) -> Self {
            self.delays.insert(query, Duration::from_millis(millis));
            self
        }

        fn with_outcomes(self, query: &'static str, outcomes: Vec<Outcome>) -> Self {
            self.script
                .lock()
                .unwrap()
                .insert(query, outcomes.into_iter().collect());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn next_outcome(&self, query: &str) -> Outcome {
            let mut script = self.script.lock().unwrap();
            match script.get_mut(query) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().cloned().unwrap(),
                None => Outcome::Hits(vec!["default.md"]),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn search(&self, query: &str) -> Result<SearchResponse> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = self
                .delays
                .get(query)
                .copied()
                .unwrap_or(Duration::from_millis(10));
            sleep(delay).await;

            match self.next_outcome(query) {
                Outcome::Hits(files) => Ok(response(query, &files)),
                Outcome::Fail(status) => Err(Error::HttpStatus {
                    status,
                    message: "Internal Server Error".into(),
                }),
            }
        }
    }

    fn response(query: &str, files: &[&str]) -> SearchResponse {
        SearchResponse {
            total: files.len() as u64,
            results: files
                .iter()
                .map(|f| SearchResult {
                    filename: (*f).to_string(),
                    content: format!("content for {query}"),
                    score: 1.0,
                    highlight: None,
                })
                .collect(),
        }
    }

    fn controller(backend: &Arc<MockBackend>) -> QueryController {
        let backend: Arc<dyn SearchBackend> = backend.clone();
        QueryController::spawn(backend, Duration::from_millis(300))
    }

    // --- pure machine ---

    #[test]
    fn stale_response_is_discarded() {
        // Given: "cat" issued, then superseded by "dog"
        let mut machine = SearchMachine::new();
        let cat = machine.submit("cat").unwrap();
        let dog = machine.submit("dog").unwrap();

        // When: dog resolves first and cat arrives late
        assert!(machine.resolve(dog.generation, Ok(response("dog", &["dog.md"]))));
        assert!(!machine.resolve(cat.generation, Ok(response("cat", &["cat.md"]))));

        // Then: only dog is visible
        let state = machine.state();
        assert_eq!(state.query, "dog");
        assert_eq!(state.results[0].filename, "dog.md");
        assert_eq!(state.status, SearchStatus::Success);
    }

    #[test]
    fn stale_failure_is_discarded() {
        let mut machine = SearchMachine::new();
        let cat = machine.submit("cat").unwrap();
        let dog = machine.submit("dog").unwrap();
        assert!(!machine.resolve(cat.generation, Err(Error::MalformedResponse("x".into()))));
        assert_eq!(machine.state().status, SearchStatus::Loading);
        assert!(machine.resolve(dog.generation, Ok(response("dog", &[]))));
        assert_eq!(machine.state().status, SearchStatus::Empty);
    }

    #[test]
    fn cancellation_is_silent() {
        let mut machine = SearchMachine::new();
        let ticket = machine.submit("cat").unwrap();
        assert!(!machine.resolve(ticket.generation, Err(Error::Cancelled)));
        assert_eq!(machine.state().status, SearchStatus::Loading);
        assert!(machine.state().error.is_none());
    }

    #[test]
    fn blank_query_resets_to_idle_and_invalidates() {
        let mut machine = SearchMachine::new();
        let ticket = machine.submit("cat").unwrap();
        assert!(machine.submit("   ").is_none());
        assert_eq!(*machine.state(), SearchState::default());
        assert!(!machine.resolve(ticket.generation, Ok(response("cat", &["cat.md"]))));
        assert_eq!(machine.state().status, SearchStatus::Idle);
    }

    #[test]
    fn failure_then_retry() {
        let mut machine = SearchMachine::new();
        assert!(machine.retry().is_none(), "retry only applies to errors");

        let ticket = machine.submit(" boom ").unwrap();
        assert_eq!(ticket.query, "boom");
        machine.resolve(
            ticket.generation,
            Err(Error::HttpStatus {
                status: 500,
                message: "Internal Server Error".into(),
            }),
        );
        assert_eq!(machine.state().status, SearchStatus::Error);
        assert!(machine.state().error.as_deref().unwrap().contains("500"));

        let again = machine.retry().unwrap();
        assert_eq!(again.query, "boom");
        assert!(again.generation > ticket.generation);
        assert_eq!(machine.state().status, SearchStatus::Loading);
        assert!(machine.state().error.is_none());
    }

    #[test]
    fn unchanged_query_is_not_reissued() {
        let mut machine = SearchMachine::new();
        let ticket = machine.submit("cat").unwrap();
        assert!(machine.submit("cat ").is_none());
        machine.resolve(ticket.generation, Ok(response("cat", &["a.md"])));
        assert!(machine.submit("cat").is_none());
        assert!(machine.submit("cats").is_some());
    }

    #[test]
    fn failed_query_waits_for_retry() {
        // Given: "cat" failed
        let mut machine = SearchMachine::new();
        let ticket = machine.submit("cat").unwrap();
        machine.resolve(
            ticket.generation,
            Err(Error::HttpStatus {
                status: 500,
                message: "Internal Server Error".into(),
            }),
        );

        // When: the same value comes through the debounce again
        let resubmitted = machine.submit("cat");

        // Then: nothing is issued and the error stays visible
        assert!(resubmitted.is_none());
        assert_eq!(machine.state().status, SearchStatus::Error);
        assert_eq!(machine.generation(), ticket.generation);
        assert!(machine.retry().is_some());
    }

    // --- controller runtime ---

    #[tokio::test(start_paused = true)]
    async fn rapid_input_issues_one_request() {
        // Given: "a" then "ab" typed 100ms apart
        let backend = Arc::new(MockBackend::default());
        let ctl = controller(&backend);
        ctl.set_query("a");
        sleep(Duration::from_millis(100)).await;
        ctl.set_query("ab");

        // When: the input settles
        let state = ctl.settled().await;

        // Then: a single request for "ab" was made
        assert_eq!(backend.calls(), vec!["ab"]);
        assert_eq!(state.status, SearchStatus::Success);
        assert_eq!(state.query, "ab");
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_sent_before_the_quiet_period() {
        let backend = Arc::new(MockBackend::default());
        let ctl = controller(&backend);
        ctl.set_query("docs");
        sleep(Duration::from_millis(299)).await;
        assert!(backend.calls().is_empty());
        assert_eq!(ctl.state().status, SearchStatus::Idle);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(backend.calls(), vec!["docs"]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_for_old_query_never_lands() {
        // Given: "cat" is slow and "dog" is fast
        let backend = Arc::new(
            MockBackend::default()
                .with_delay("cat", 500)
                .with_delay("dog", 50)
                .with_outcomes("cat", vec![Outcome::Hits(vec!["cat.md"])])
                .with_outcomes("dog", vec![Outcome::Hits(vec!["dog.md"])]),
        );
        let ctl = controller(&backend);

        // When: "cat" is in flight when the query changes to "dog"
        ctl.set_query("cat");
        sleep(Duration::from_millis(350)).await;
        assert_eq!(ctl.state().status, SearchStatus::Loading);
        ctl.set_query("dog");
        let state = ctl.settled().await;

        // Then: dog's outcome is final, even after cat's deadline passes
        assert_eq!(state.results[0].filename, "dog.md");
        sleep(Duration::from_secs(1)).await;
        let state = ctl.state();
        assert_eq!(state.query, "dog");
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].filename, "dog.md");
        assert_eq!(backend.calls(), vec!["cat", "dog"]);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_the_query_cancels_and_goes_idle() {
        let backend = Arc::new(MockBackend::default().with_delay("cat", 500));
        let ctl = controller(&backend);
        ctl.set_query("cat");
        sleep(Duration::from_millis(400)).await;
        assert_eq!(ctl.state().status, SearchStatus::Loading);

        ctl.set_query("  ");
        let state = ctl.settled().await;
        assert_eq!(state.status, SearchStatus::Idle);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(ctl.state(), SearchState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_results_is_empty() {
        let backend =
            Arc::new(MockBackend::default().with_outcomes("zzz", vec![Outcome::Hits(vec![])]));
        let ctl = controller(&backend);
        ctl.set_query("zzz");
        let state = ctl.settled().await;
        assert_eq!(state.status, SearchStatus::Empty);
        assert_eq!(state.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn error_is_recoverable_with_retry() {
        // Given: the first request fails and the second succeeds
        let backend = Arc::new(MockBackend::default().with_outcomes(
            "boom",
            vec![Outcome::Fail(500), Outcome::Hits(vec!["ok.md"])],
        ));
        let ctl = controller(&backend);

        ctl.set_query("boom");
        let state = ctl.settled().await;
        assert_eq!(state.status, SearchStatus::Error);
        assert!(state.error.is_some());

        // When: the user retries
        ctl.retry();
        let state = ctl.settled().await;

        // Then: the same query is re-issued and succeeds
        assert_eq!(state.status, SearchStatus::Success);
        assert_eq!(backend.calls(), vec!["boom", "boom"]);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_loading_then_success() {
        let backend = Arc::new(MockBackend::default().with_delay("x", 100));
        let ctl = controller(&backend);
        let mut rx = ctl.subscribe();

        ctl.set_query("x");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status, SearchStatus::Loading);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status, SearchStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_in_flight_work() {
        let backend = Arc::new(MockBackend::default().with_delay("slow", 1000));
        let ctl = controller(&backend);
        let rx = ctl.subscribe();
        ctl.set_query("slow");
        sleep(Duration::from_millis(400)).await;

        ctl.shutdown().await;
        sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.borrow().status, SearchStatus::Loading);
    }
}
