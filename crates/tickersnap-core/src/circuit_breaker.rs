use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Upstream call gate: closed (normal), open (failing fast), half-open
/// (single probe allowed after the cooldown).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Breaker thresholds and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct BreakerWindow {
    state: BreakerState,
    failures: u32,
    opened_at: Option<Instant>,
}

impl Default for BreakerWindow {
    fn default() -> Self {
        Self {
            state: BreakerState::Closed,
            failures: 0,
            opened_at: None,
        }
    }
}

/// Thread-safe circuit breaker for adapter upstream calls.
///
/// The breaker never retries on its own; callers that are refused simply
/// fail, and the next probe is allowed once the cooldown elapses.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    window: Mutex<BreakerWindow>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            window: Mutex::new(BreakerWindow::default()),
        }
    }

    /// Whether an upstream call may proceed right now.
    pub fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().expect("breaker lock is not poisoned");
        match window.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let cooled_down = window
                    .opened_at
                    .map(|opened_at| opened_at.elapsed() >= self.config.cooldown)
                    .unwrap_or(false);

                if cooled_down {
                    window.state = BreakerState::HalfOpen;
                    window.opened_at = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn on_success(&self) {
        let mut window = self.window.lock().expect("breaker lock is not poisoned");
        window.state = BreakerState::Closed;
        window.failures = 0;
        window.opened_at = None;
    }

    pub fn on_failure(&self) {
        let mut window = self.window.lock().expect("breaker lock is not poisoned");
        window.failures = window.failures.saturating_add(1);

        if window.state == BreakerState::HalfOpen
            || window.failures >= self.config.failure_threshold
        {
            window.state = BreakerState::Open;
            window.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self) -> BreakerState {
        self.window
            .lock()
            .expect("breaker lock is not poisoned")
            .state
    }

    pub fn failures(&self) -> u32 {
        self.window
            .lock()
            .expect("breaker lock is not poisoned")
            .failures
    }
}
