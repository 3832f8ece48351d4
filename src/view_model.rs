//! Polling view-models over the ledger reader.
//!
//! A view-model reads once when mounted, then again on every tick of a fixed
//! timer, without waiting for earlier reads to finish. Every read is numbered;
//! a result is applied only when it is newer than the last applied result, so a
//! slow early read can never overwrite data from a faster later one.
//!
//! Teardown stops the timer and any scheduled refresh. Reads still in flight
//! are left to finish and their results are dropped.

use crate::error::TipJarError;
use crate::gateway::LedgerReader;
use crate::types::{Tip, TipLedgerSnapshot};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Something a view-model can poll.
#[async_trait]
pub trait PollSource: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Self::Output, TipJarError>;
}

pub struct SnapshotSource(pub Arc<dyn LedgerReader>);

#[async_trait]
impl PollSource for SnapshotSource {
    type Output = TipLedgerSnapshot;

    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch(&self) -> Result<TipLedgerSnapshot, TipJarError> {
        self.0.fetch_snapshot().await
    }
}

pub struct HistorySource(pub Arc<dyn LedgerReader>);

#[async_trait]
impl PollSource for HistorySource {
    type Output = Vec<Tip>;

    fn name(&self) -> &'static str {
        "tip history"
    }

    async fn fetch(&self) -> Result<Vec<Tip>, TipJarError> {
        self.0.fetch_tip_history().await
    }
}

/// What presentation should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    /// No read has resolved yet
    Loading,
    Ready(T),
    /// Reads have failed and there is no earlier data to fall back on
    Unavailable,
}

impl<T> LoadState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Called after every state change (e.g. to request a repaint).
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

struct Shared<T> {
    state: LoadState<T>,
    last_applied: u64,
    last_error: Option<TipJarError>,
    torn_down: bool,
    pending_refreshes: Vec<JoinHandle<()>>,
}

struct Inner<S: PollSource> {
    source: S,
    shared: Mutex<Shared<S::Output>>,
    next_seq: AtomicU64,
    listener: Option<ChangeListener>,
    runtime: Handle,
}

impl<S: PollSource> Inner<S> {
    fn spawn_read(self: &Arc<Self>) {
        if self.shared.lock().torn_down {
            return;
        }
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            tracing::debug!("Polling {} (read #{})", inner.source.name(), seq);
            let result = inner.source.fetch().await;
            inner.apply(seq, result);
        });
    }

    fn apply(&self, seq: u64, result: Result<S::Output, TipJarError>) {
        {
            let mut shared = self.shared.lock();
            if shared.torn_down {
                tracing::debug!("Dropping {} read #{} after teardown", self.source.name(), seq);
                return;
            }
            match result {
                Ok(data) => {
                    if seq <= shared.last_applied {
                        tracing::debug!(
                            "Dropping stale {} read #{} (have #{})",
                            self.source.name(),
                            seq,
                            shared.last_applied
                        );
                        return;
                    }
                    shared.last_applied = seq;
                    shared.last_error = None;
                    shared.state = LoadState::Ready(data);
                }
                Err(e) => {
                    if seq <= shared.last_applied {
                        tracing::debug!(
                            "Dropping stale {} failure #{} (have #{})",
                            self.source.name(),
                            seq,
                            shared.last_applied
                        );
                        return;
                    }
                    tracing::error!("Error loading {}: {}", self.source.name(), e);
                    shared.last_error = Some(e);
                    if !matches!(shared.state, LoadState::Ready(_)) {
                        shared.state = LoadState::Unavailable;
                    }
                }
            }
        }
        if let Some(listener) = &self.listener {
            listener();
        }
    }
}

/// Cheap handle that lets other components ask a view-model for one extra read.
#[derive(Clone)]
pub struct Refresher {
    target: Arc<dyn RefreshTarget>,
}

impl Refresher {
    /// Schedule exactly one read after `delay`. Ignored once the view-model is torn down.
    pub fn refresh_after(&self, delay: Duration) {
        Arc::clone(&self.target).schedule_refresh(delay);
    }
}

trait RefreshTarget: Send + Sync {
    fn schedule_refresh(self: Arc<Self>, delay: Duration);
}

impl<S: PollSource> RefreshTarget for Inner<S> {
    fn schedule_refresh(self: Arc<Self>, delay: Duration) {
        let mut shared = self.shared.lock();
        if shared.torn_down {
            return;
        }
        shared.pending_refreshes.retain(|h| !h.is_finished());
        // the delay counts from the request, not from when the task first runs
        let deadline = tokio::time::Instant::now() + delay;
        let inner = Arc::clone(&self);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            inner.spawn_read();
        });
        shared.pending_refreshes.push(handle);
    }
}

pub struct PollingViewModel<S: PollSource> {
    inner: Arc<Inner<S>>,
    timer: Option<JoinHandle<()>>,
}

impl<S: PollSource> PollingViewModel<S> {
    /// Mount the view-model: read now, then every `interval`.
    pub fn mount(source: S, interval: Duration, runtime: Handle, listener: Option<ChangeListener>) -> Self {
        let inner = Arc::new(Inner {
            source,
            shared: Mutex::new(Shared {
                state: LoadState::Loading,
                last_applied: 0,
                last_error: None,
                torn_down: false,
                pending_refreshes: Vec::new(),
            }),
            next_seq: AtomicU64::new(0),
            listener,
            runtime: runtime.clone(),
        });

        let ticking = Arc::clone(&inner);
        let start = tokio::time::Instant::now();
        let timer = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // first tick fires immediately: that is the mount read
                ticker.tick().await;
                ticking.spawn_read();
            }
        });

        Self {
            inner,
            timer: Some(timer),
        }
    }

    pub fn state(&self) -> LoadState<S::Output> {
        self.inner.shared.lock().state.clone()
    }

    pub fn last_error(&self) -> Option<TipJarError> {
        self.inner.shared.lock().last_error.clone()
    }

    pub fn refresher(&self) -> Refresher {
        Refresher {
            target: self.inner.clone() as Arc<dyn RefreshTarget>,
        }
    }

    /// Schedule one extra read after `delay`.
    pub fn refresh_after(&self, delay: Duration) {
        self.refresher().refresh_after(delay);
    }

    /// Stop polling. Results of reads already in flight are ignored.
    pub fn shutdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let mut shared = self.inner.shared.lock();
        if !shared.torn_down {
            tracing::debug!("Tearing down {} view-model", self.inner.source.name());
        }
        shared.torn_down = true;
        for pending in shared.pending_refreshes.drain(..) {
            pending.abort();
        }
    }
}

impl<S: PollSource> Drop for PollingViewModel<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    /// Scripted ledger reader: each read pops the next (delay, result) pair,
    /// repeating the last one when the script runs out.
    pub(crate) struct ScriptedReader {
        pub(crate) calls: AtomicUsize,
        script: Mutex<VecDeque<(Duration, Result<TipLedgerSnapshot, TipJarError>)>>,
    }

    impl ScriptedReader {
        pub(crate) fn new(script: Vec<(Duration, Result<TipLedgerSnapshot, TipJarError>)>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
            })
        }

        pub(crate) fn always(result: Result<TipLedgerSnapshot, TipJarError>) -> Arc<Self> {
            Self::new(vec![(Duration::ZERO, result)])
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerReader for ScriptedReader {
        async fn fetch_snapshot(&self) -> Result<TipLedgerSnapshot, TipJarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, result) = {
                let mut script = self.script.lock();
                if script.len() > 1 {
                    script.pop_front()
                } else {
                    script.front().cloned()
                }
            }
            .unwrap_or((Duration::ZERO, Err(TipJarError::InvalidObjectData)));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }

        async fn fetch_tip_history(&self) -> Result<Vec<Tip>, TipJarError> {
            Ok(Vec::new())
        }
    }

    pub(crate) fn snapshot(total: u64) -> TipLedgerSnapshot {
        TipLedgerSnapshot {
            total_tips_received: total,
            total_tippers: 1,
            tip_count: 1,
            creator: "0xc0ffee".into(),
        }
    }

    /// Let spawned tasks run to their next await point.
    pub(crate) async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn mount(reader: Arc<ScriptedReader>) -> PollingViewModel<SnapshotSource> {
        PollingViewModel::mount(
            SnapshotSource(reader),
            Duration::from_secs(10),
            Handle::current(),
            None,
        )
    }

    // ==================== state machine tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_loading_until_first_response() {
        let reader = ScriptedReader::new(vec![(Duration::from_secs(1), Ok(snapshot(5)))]);
        let vm = mount(reader.clone());
        settle().await;
        assert_eq!(reader.call_count(), 1);
        assert!(vm.state().is_loading());

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(vm.state(), LoadState::Ready(snapshot(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_is_unavailable() {
        let reader = ScriptedReader::always(Err(TipJarError::InvalidObjectData));
        let vm = mount(reader);
        settle().await;
        assert_eq!(vm.state(), LoadState::Unavailable);
        assert_eq!(vm.last_error(), Some(TipJarError::InvalidObjectData));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_prior_data() {
        let reader = ScriptedReader::new(vec![
            (Duration::ZERO, Ok(snapshot(7))),
            (Duration::ZERO, Err(TipJarError::Rpc("connection reset".into()))),
        ]);
        let vm = mount(reader.clone());
        settle().await;
        assert_eq!(vm.state(), LoadState::Ready(snapshot(7)));

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(reader.call_count(), 2);
        assert_eq!(vm.state(), LoadState::Ready(snapshot(7)));
        assert!(vm.last_error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_replaces_data() {
        let reader = ScriptedReader::new(vec![
            (Duration::ZERO, Ok(snapshot(1))),
            (Duration::ZERO, Ok(snapshot(2))),
        ]);
        let vm = mount(reader);
        settle().await;
        assert_eq!(vm.state().data().map(|s| s.total_tips_received), Some(1));

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(vm.state().data().map(|s| s.total_tips_received), Some(2));
        assert_eq!(vm.last_error(), None);
    }

    // ==================== timer tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_polls_every_interval() {
        let reader = ScriptedReader::always(Ok(snapshot(1)));
        let _vm = mount(reader.clone());
        settle().await;
        assert_eq!(reader.call_count(), 1);

        tokio::time::advance(Duration::from_millis(9_999)).await;
        settle().await;
        assert_eq!(reader.call_count(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(reader.call_count(), 2);

        for _ in 0..2 {
            tokio::time::advance(Duration::from_secs(10)).await;
            settle().await;
        }
        assert_eq!(reader.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_overlap_without_dedup() {
        // every read takes 25s, longer than the 10s interval
        let reader = ScriptedReader::new(vec![(Duration::from_secs(25), Ok(snapshot(1)))]);
        let vm = mount(reader.clone());
        settle().await;

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(reader.call_count(), 3);
        assert!(vm.state().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_reads() {
        let reader = ScriptedReader::always(Ok(snapshot(1)));
        let mut vm = mount(reader.clone());
        settle().await;
        assert_eq!(reader.call_count(), 1);

        vm.shutdown();
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(reader.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_teardown_ignored() {
        let reader = ScriptedReader::new(vec![(Duration::from_secs(3), Ok(snapshot(9)))]);
        let mut vm = mount(reader.clone());
        settle().await;
        vm.shutdown();

        tokio::time::advance(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(reader.call_count(), 1);
        assert!(vm.state().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let reader = ScriptedReader::always(Ok(snapshot(1)));
        let vm = mount(reader.clone());
        settle().await;
        drop(vm);

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(reader.call_count(), 1);
    }

    // ==================== ordering tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_stale_read_discarded() {
        // read #1 is slow and resolves after read #2
        let reader = ScriptedReader::new(vec![
            (Duration::from_secs(5), Ok(snapshot(100))),
            (Duration::ZERO, Ok(snapshot(200))),
        ]);
        let vm = mount(reader.clone());
        settle().await;

        vm.refresh_after(Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(reader.call_count(), 2);
        assert_eq!(vm.state(), LoadState::Ready(snapshot(200)));

        tokio::time::advance(Duration::from_secs(4)).await;
        settle().await;
        assert_eq!(vm.state(), LoadState::Ready(snapshot(200)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_failure_discarded() {
        // read #1 fails slowly, after read #2 already succeeded
        let reader = ScriptedReader::new(vec![
            (Duration::from_secs(5), Err(TipJarError::Rpc("timeout".into()))),
            (Duration::ZERO, Ok(snapshot(200))),
        ]);
        let vm = mount(reader.clone());
        settle().await;

        vm.refresh_after(Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(vm.state(), LoadState::Ready(snapshot(200)));

        tokio::time::advance(Duration::from_secs(4)).await;
        settle().await;
        assert_eq!(reader.call_count(), 2);
        assert_eq!(vm.state(), LoadState::Ready(snapshot(200)));
        assert_eq!(vm.last_error(), None);
    }

    // ==================== refresh tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_reads_once() {
        let reader = ScriptedReader::always(Ok(snapshot(1)));
        let vm = mount(reader.clone());
        settle().await;

        vm.refresher().refresh_after(Duration::from_secs(2));
        tokio::time::advance(Duration::from_millis(1_999)).await;
        settle().await;
        assert_eq!(reader.call_count(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(reader.call_count(), 2);

        tokio::time::advance(Duration::from_millis(7_999)).await;
        settle().await;
        assert_eq!(reader.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_delay_counts_from_request() {
        let reader = ScriptedReader::always(Ok(snapshot(1)));
        let vm = mount(reader.clone());
        settle().await;

        // no yield between the request and the clock moving
        vm.refresh_after(Duration::from_secs(2));
        tokio::time::advance(Duration::from_millis(2_000)).await;
        settle().await;
        assert_eq!(reader.call_count(), 2);

        vm.refresh_after(Duration::from_secs(2));
        tokio::time::advance(Duration::from_millis(2_000)).await;
        settle().await;
        assert_eq!(reader.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_cancelled_by_teardown() {
        let reader = ScriptedReader::always(Ok(snapshot(1)));
        let mut vm = mount(reader.clone());
        settle().await;
        let refresher = vm.refresher();
        refresher.refresh_after(Duration::from_secs(2));
        vm.shutdown();
        refresher.refresh_after(Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(reader.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_notified() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let reader = ScriptedReader::always(Ok(snapshot(1)));
        let _vm = PollingViewModel::mount(
            SnapshotSource(reader),
            Duration::from_secs(10),
            Handle::current(),
            Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
