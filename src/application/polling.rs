// Polling hook - Fetch with retry/backoff and optional periodic re-invocation
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;
type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

pub struct PollingOptions<T> {
    pub initial_data: Option<T>,
    /// `None` or zero disables polling.
    pub poll_interval: Option<Duration>,
    pub retry_attempts: u32,
    /// Attempt `n` waits `retry_delay * n`.
    pub retry_delay: Duration,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for PollingOptions<T> {
    fn default() -> Self {
        Self {
            initial_data: None,
            poll_interval: None,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> PollingOptions<T> {
    pub fn with_initial_data(mut self, data: T) -> Self {
        self.initial_data = Some(data);
        self
    }

    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollingState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetch: Option<DateTime<Utc>>,
    pub is_retrying: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    Idle,
    Loading,
    RetryPending,
    Success,
    Failed,
}

impl<T> PollingState<T> {
    pub fn phase(&self) -> PollPhase {
        if self.is_retrying {
            PollPhase::RetryPending
        } else if self.loading {
            PollPhase::Loading
        } else if self.error.is_some() {
            PollPhase::Failed
        } else if self.last_fetch.is_some() {
            PollPhase::Success
        } else {
            PollPhase::Idle
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Shared<T> {
    name: String,
    fetcher: Fetcher<T>,
    retry_attempts: u32,
    retry_delay: Duration,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
    state: watch::Sender<PollingState<T>>,
    mounted: AtomicBool,
    retry_count: AtomicU32,
    /// Bumped by `refresh`; cycles and retries of an older generation are
    /// dropped without committing.
    generation: AtomicU64,
    retry_timer: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Apply `update` unless unmounted or superseded. Both are read under
    /// the watch lock, which `unmount` and `refresh` also take, so nothing
    /// lands after either.
    fn commit(&self, generation: u64, update: impl FnOnce(&mut PollingState<T>)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            update(state);
            true
        })
    }

    fn run_cycle(self: Arc<Self>, is_retry: bool, generation: u64) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if !self.is_current(generation) {
                return;
            }

            if !is_retry {
                self.commit(generation, |s| {
                    s.loading = true;
                    s.error = None;
                });
            }

            match (self.fetcher)().await {
                Ok(data) => {
                    let fetched = data.clone();
                    let applied = self.commit(generation, |s| {
                        s.data = Some(fetched);
                        s.error = None;
                        s.loading = false;
                        s.is_retrying = false;
                        s.last_fetch = Some(Utc::now());
                        self.retry_count.store(0, Ordering::SeqCst);
                    });
                    if !applied {
                        return;
                    }
                    tracing::debug!(hook = %self.name, "Fetch succeeded");
                    if let Some(callback) = &self.on_success {
                        callback(&data);
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    let attempt = self.retry_count.load(Ordering::SeqCst);

                    if attempt < self.retry_attempts {
                        let attempt = attempt + 1;
                        let applied = self.commit(generation, |s| {
                            s.is_retrying = true;
                            self.retry_count.store(attempt, Ordering::SeqCst);
                        });
                        if !applied {
                            return;
                        }
                        let delay = self.retry_delay * attempt;
                        tracing::debug!(
                            hook = %self.name,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Fetch failed, retrying: {}",
                            message
                        );
                        self.schedule_retry(delay, generation);
                    } else {
                        let applied = self.commit(generation, |s| {
                            s.error = Some(message.clone());
                            s.loading = false;
                            s.is_retrying = false;
                        });
                        if !applied {
                            return;
                        }
                        tracing::warn!(
                            hook = %self.name,
                            "Fetch failed after {} retries: {}",
                            attempt,
                            message
                        );
                        if let Some(callback) = &self.on_error {
                            callback(&message);
                        }
                    }
                }
            }
        })
    }

    fn schedule_retry(self: &Arc<Self>, delay: Duration, generation: u64) {
        let mut slot = lock(&self.retry_timer);
        if !self.is_current(generation) {
            return;
        }

        let shared = Arc::clone(self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if shared.is_current(generation) {
                tokio::spawn(Arc::clone(&shared).run_cycle(true, generation));
            }
        });

        if let Some(previous) = slot.replace(timer) {
            previous.abort();
        }
    }
}

impl<T> Shared<T> {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.is_mounted() && self.current_generation() == generation
    }

    /// Start a new generation under the watch lock, superseding every
    /// cycle and retry already in flight.
    fn supersede(&self) -> u64 {
        let mut next = 0;
        self.state.send_if_modified(|_| {
            next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.retry_count.store(0, Ordering::SeqCst);
            false
        });
        self.cancel_retry();
        next
    }

    /// Clear the mounted flag under the watch lock.
    fn deactivate(&self) {
        self.state.send_if_modified(|_| {
            self.mounted.store(false, Ordering::SeqCst);
            false
        });
        self.cancel_retry();
    }

    fn cancel_retry(&self) {
        if let Some(timer) = lock(&self.retry_timer).take() {
            timer.abort();
        }
    }
}

fn spawn_poller<T>(shared: Arc<Shared<T>>, period: Duration) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !shared.is_mounted() {
                break;
            }
            let generation = shared.current_generation();
            tokio::spawn(Arc::clone(&shared).run_cycle(false, generation));
        }
    })
}

/// A mounted fetch loop. Dropping it unmounts.
pub struct PollingHook<T> {
    shared: Arc<Shared<T>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> PollingHook<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start the first fetch immediately and, if configured, the poll timer.
    /// Must be called from within a tokio runtime.
    pub fn mount<F, Fut>(name: impl Into<String>, fetch: F, options: PollingOptions<T>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetch().boxed());
        let (state, _) = watch::channel(PollingState {
            data: options.initial_data,
            loading: false,
            error: None,
            last_fetch: None,
            is_retrying: false,
        });

        let shared = Arc::new(Shared {
            name: name.into(),
            fetcher,
            retry_attempts: options.retry_attempts,
            retry_delay: options.retry_delay,
            on_success: options.on_success,
            on_error: options.on_error,
            state,
            mounted: AtomicBool::new(true),
            retry_count: AtomicU32::new(0),
            generation: AtomicU64::new(0),
            retry_timer: Mutex::new(None),
        });

        let hook = Self {
            shared,
            poll_task: Mutex::new(None),
        };

        tokio::spawn(Arc::clone(&hook.shared).run_cycle(false, 0));
        hook.set_poll_interval(options.poll_interval);
        hook
    }

    pub fn state(&self) -> PollingState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollingState<T>> {
        self.shared.state.subscribe()
    }

    /// Immediate non-retry cycle with the retry counter reset. Pending and
    /// in-flight retries of earlier cycles are discarded. The returned
    /// handle completes when this attempt settles (retries run separately).
    pub fn refresh(&self) -> JoinHandle<()> {
        let generation = self.shared.supersede();
        tokio::spawn(Arc::clone(&self.shared).run_cycle(false, generation))
    }

    /// Replace the poll timer; `None` or zero stops polling.
    pub fn set_poll_interval(&self, interval: Option<Duration>) {
        let mut task = lock(&self.poll_task);
        if let Some(previous) = task.take() {
            previous.abort();
        }

        if !self.is_mounted() {
            return;
        }

        if let Some(period) = interval.filter(|p| !p.is_zero()) {
            tracing::debug!(
                hook = %self.shared.name,
                period_secs = period.as_secs(),
                "Polling enabled"
            );
            *task = Some(spawn_poller(Arc::clone(&self.shared), period));
        }
    }
}

impl<T> PollingHook<T> {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.is_mounted()
    }

    /// Stop all timers; in-flight fetches finish but are discarded.
    pub fn unmount(&self) {
        self.shared.deactivate();
        if let Some(task) = lock(&self.poll_task).take() {
            task.abort();
        }
    }
}

impl<T> Drop for PollingHook<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    type Calls = Arc<Mutex<Vec<Instant>>>;

    /// Fetcher that fails its first `failures` calls, then returns the call number.
    fn flaky(
        calls: Calls,
        failures: usize,
    ) -> impl Fn() -> BoxFuture<'static, anyhow::Result<usize>> + Send + Sync {
        move || {
            let calls = calls.clone();
            Box::pin(async move {
                let n = {
                    let mut calls = calls.lock().unwrap();
                    calls.push(Instant::now());
                    calls.len()
                };
                if n <= failures {
                    anyhow::bail!("attempt {} failed", n);
                }
                Ok(n)
            })
        }
    }

    fn gaps(calls: &Calls) -> Vec<Duration> {
        let calls = calls.lock().unwrap();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let calls: Calls = Arc::default();
        let successes = Arc::new(AtomicUsize::new(0));
        let counter = successes.clone();

        let options = PollingOptions::default()
            .with_retry(3, Duration::from_millis(1000))
            .on_success(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let hook = PollingHook::mount("flaky", flaky(calls.clone(), 2), options);

        let mut rx = hook.subscribe();
        rx.wait_for(|s| s.last_fetch.is_some()).await.unwrap();

        let state = hook.state();
        assert_eq!(state.phase(), PollPhase::Success);
        assert_eq!(state.data, Some(3));
        assert!(!state.is_retrying);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(
            gaps(&calls),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
        assert_eq!(successes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fail_once() {
        let calls: Calls = Arc::default();
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = errors.clone();

        let options = PollingOptions::default()
            .with_retry(3, Duration::from_millis(500))
            .on_error(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let hook = PollingHook::mount("broken", flaky(calls.clone(), usize::MAX), options);

        let mut rx = hook.subscribe();
        rx.wait_for(|s| s.error.is_some()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        let state = hook.state();
        assert_eq!(state.phase(), PollPhase::Failed);
        assert_eq!(state.error.as_deref(), Some("attempt 4 failed"));
        assert!(!state.is_retrying);
        assert!(!state.loading);
        assert_eq!(calls.lock().unwrap().len(), 4);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(
            gaps(&calls),
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(1500)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_mid_retry_stops_updates() {
        let calls: Calls = Arc::default();
        let hook = PollingHook::mount(
            "unmounted",
            flaky(calls.clone(), usize::MAX),
            PollingOptions::default(),
        );

        let mut rx = hook.subscribe();
        rx.wait_for(|s| s.is_retrying).await.unwrap();
        hook.unmount();
        let _ = rx.borrow_and_update();

        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(!hook.is_mounted());
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(!rx.has_changed().unwrap());
        assert!(hook.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_discarded_after_unmount() {
        let gate = Arc::new(Notify::new());
        let successes = Arc::new(AtomicUsize::new(0));
        let counter = successes.clone();
        let fetch_gate = gate.clone();

        let options = PollingOptions::default()
            .with_initial_data(0)
            .on_success(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let hook = PollingHook::mount(
            "slow",
            move || {
                let gate = fetch_gate.clone();
                async move {
                    gate.notified().await;
                    Ok::<_, anyhow::Error>(7)
                }
            },
            options,
        );

        let mut rx = hook.subscribe();
        rx.wait_for(|s| s.loading).await.unwrap();
        assert_eq!(hook.state().data, Some(0));

        hook.unmount();
        let _ = rx.borrow_and_update();
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!rx.has_changed().unwrap());
        assert_eq!(hook.state().data, Some(0));
        assert_eq!(successes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_poll_timer() {
        let calls: Calls = Arc::default();
        let options = PollingOptions::default().with_poll_interval(Some(Duration::from_secs(30)));
        let hook = PollingHook::mount("polled", flaky(calls.clone(), 0), options);

        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(calls.lock().unwrap().len(), 3);

        let mut rx = hook.subscribe();
        hook.unmount();
        let _ = rx.borrow_and_update();

        tokio::time::sleep(Duration::from_secs(300)).await;

        assert_eq!(calls.lock().unwrap().len(), 3);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_supersedes_in_flight_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let counter = errors.clone();
        let fetch_calls = calls.clone();
        let fetch_gate = gate.clone();

        let options = PollingOptions::default()
            .with_retry(1, Duration::from_millis(100))
            .on_error(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let hook = PollingHook::mount(
            "superseded",
            move || {
                let n = fetch_calls.fetch_add(1, Ordering::SeqCst) + 1;
                let gate = fetch_gate.clone();
                async move {
                    // The first retry hangs until released.
                    if n == 2 {
                        gate.notified().await;
                    }
                    Err::<usize, _>(anyhow::anyhow!("attempt {} failed", n))
                }
            },
            options,
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        hook.refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        gate.notify_one();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let state = hook.state();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(state.error.as_deref(), Some("attempt 4 failed"));
        assert!(!state.is_retrying);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_interval_and_change() {
        let calls: Calls = Arc::default();
        let options = PollingOptions::default().with_poll_interval(Some(Duration::from_secs(30)));
        let hook = PollingHook::mount("poller", flaky(calls.clone(), 0), options);

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(calls.lock().unwrap().len(), 4);

        hook.set_poll_interval(None);
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(calls.lock().unwrap().len(), 4);

        hook.set_poll_interval(Some(Duration::from_secs(10)));
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.lock().unwrap().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_recovers_after_failure() {
        let healthy = Arc::new(AtomicBool::new(false));
        let flag = healthy.clone();

        let options = PollingOptions::default().with_retry(1, Duration::from_millis(10));
        let hook = PollingHook::mount(
            "recovering",
            move || {
                let healthy = flag.load(Ordering::SeqCst);
                async move {
                    if healthy {
                        Ok::<_, anyhow::Error>("fresh")
                    } else {
                        anyhow::bail!("Service unavailable")
                    }
                }
            },
            options,
        );

        let mut rx = hook.subscribe();
        rx.wait_for(|s| s.error.is_some()).await.unwrap();
        assert_eq!(hook.state().phase(), PollPhase::Failed);

        healthy.store(true, Ordering::SeqCst);
        hook.refresh().await.unwrap();

        let state = hook.state();
        assert_eq!(state.phase(), PollPhase::Success);
        assert_eq!(state.data, Some("fresh"));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_phase_derivation() {
        let mut state: PollingState<u8> = PollingState {
            data: None,
            loading: false,
            error: None,
            last_fetch: None,
            is_retrying: false,
        };
        assert_eq!(state.phase(), PollPhase::Idle);
        state.loading = true;
        assert_eq!(state.phase(), PollPhase::Loading);
        state.is_retrying = true;
        assert_eq!(state.phase(), PollPhase::RetryPending);
    }
}
