//! Completion detection for package manager runs.
//!
//! A package manager is started out of process and its exit status is never
//! observed. Instead a [`WatchSession`] polls the project manifest until its
//! raw text satisfies an [`Expectation`] or the attempt ceiling is reached.
//!
//! # States
//!
//! ```text
//! Waiting ──(expectation holds)──────────────▶ Succeeded
//!    │
//!    └──(MAX_ATTEMPTS reached, final check fails)──▶ Failed
//! ```
//!
//! The observer registered with [`WatchSession::on_complete`] is called on the
//! single transition out of `Waiting` and never again.
//!
//! The watcher only observes. A package manager run that fails without
//! touching the manifest is indistinguishable from a slow one until the
//! session times out.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Delay between two polls of the manifest.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Number of polls before giving up. Together with [`POLL_INTERVAL`] this is
/// a 90 second ceiling.
pub const MAX_ATTEMPTS: u32 = 180;

/// Read access to the watched file.
pub trait ManifestSource {
    fn modified(&self) -> io::Result<SystemTime>;
    fn read(&self) -> io::Result<String>;
}

/// Source backed by a file on disk.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestSource for ManifestFile {
    fn modified(&self) -> io::Result<SystemTime> {
        std::fs::metadata(&self.path)?.modified()
    }

    fn read(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// What the manifest text must look like for the run to count as done.
///
/// Matching is a substring search for the quoted package name, so a name that
/// appears quoted anywhere else in the file also matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// The package has been added (install).
    Present(String),
    /// The package has been removed (uninstall).
    Absent(String),
}

impl Expectation {
    pub fn package(&self) -> &str {
        match self {
            Self::Present(name) | Self::Absent(name) => name,
        }
    }

    pub fn is_satisfied(&self, content: &str) -> bool {
        let needle = format!("\"{}\"", self.package());
        match self {
            Self::Present(_) => content.contains(&needle),
            Self::Absent(_) => !content.contains(&needle),
        }
    }
}

/// Polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Waiting,
    Succeeded,
    Failed,
}

impl WatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Final result delivered to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Satisfied { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl WatchOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Satisfied { attempts } | Self::TimedOut { attempts } => *attempts,
        }
    }
}

/// Manifest snapshot taken before the package manager starts.
#[derive(Debug, Clone, Copy)]
struct Baseline {
    /// `None` when the manifest could not be read at start.
    modified: Option<SystemTime>,
    /// Whether the expectation already held on the baseline content.
    satisfied: bool,
}

type Observer = Box<dyn FnOnce(WatchOutcome) + Send>;

/// One polling cycle awaiting a manifest change.
pub struct WatchSession<P: ManifestSource = ManifestFile> {
    source: P,
    expectation: Expectation,
    config: WatchConfig,
    attempts: u32,
    baseline: Baseline,
    state: WatchState,
    outcome: Option<WatchOutcome>,
    observer: Option<Observer>,
}

impl<P: ManifestSource> fmt::Debug for WatchSession<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSession")
            .field("expectation", &self.expectation)
            .field("config", &self.config)
            .field("attempts", &self.attempts)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<P: ManifestSource> WatchSession<P> {
    /// Record the baseline. Call before dispatching the package manager.
    pub fn start(source: P, expectation: Expectation, config: WatchConfig) -> Self {
        let modified = source.modified().ok();
        let satisfied = match source.read() {
            Ok(content) => expectation.is_satisfied(&content),
            Err(e) => {
                tracing::debug!("Could not read manifest baseline: {}", e);
                false
            }
        };
        tracing::debug!(
            package = expectation.package(),
            ?modified,
            satisfied,
            "Watch session started"
        );

        Self {
            source,
            expectation,
            config,
            attempts: 0,
            baseline: Baseline {
                modified,
                satisfied,
            },
            state: WatchState::Waiting,
            outcome: None,
            observer: None,
        }
    }

    /// Register the observer fired on completion.
    pub fn on_complete(mut self, observer: impl FnOnce(WatchOutcome) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn outcome(&self) -> Option<WatchOutcome> {
        self.outcome
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    /// Run one poll. No-op once the session has left `Waiting`.
    pub fn tick(&mut self) -> WatchState {
        if self.state != WatchState::Waiting {
            return self.state;
        }
        self.attempts += 1;
        tracing::debug!(attempt = self.attempts, "Polling manifest");

        match self.observe() {
            Ok(true) => {
                self.finish(WatchState::Succeeded);
                return self.state;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(attempt = self.attempts, "Manifest not readable yet: {}", e);
            }
        }

        if self.attempts >= self.config.max_attempts {
            let state = if self.final_check() {
                WatchState::Succeeded
            } else {
                WatchState::Failed
            };
            self.finish(state);
        }

        self.state
    }

    /// Tick every `config.interval` until the session completes. The first
    /// tick happens one interval after the call. Dropping the future cancels
    /// the session.
    pub async fn run(mut self) -> WatchOutcome {
        let mut ticker = interval_at(
            Instant::now() + self.config.interval,
            self.config.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick();
            if let Some(outcome) = self.outcome {
                return outcome;
            }
        }
    }

    /// Whether this tick sees a changed manifest that satisfies the expectation.
    fn observe(&self) -> io::Result<bool> {
        let modified = self.source.modified()?;
        if self.baseline.modified == Some(modified) {
            return Ok(false);
        }
        let content = self.source.read()?;
        Ok(self.expectation.is_satisfied(&content))
    }

    /// Last chance after the ceiling: the expectation must hold now. An
    /// install must also not have been satisfied at baseline; an uninstall
    /// whose package is gone counts as done either way.
    fn final_check(&self) -> bool {
        match self.source.read() {
            Ok(content) => {
                let satisfied = self.expectation.is_satisfied(&content);
                match self.expectation {
                    Expectation::Present(_) => satisfied && !self.baseline.satisfied,
                    Expectation::Absent(_) => satisfied,
                }
            }
            Err(e) => {
                tracing::debug!("Final manifest read failed: {}", e);
                false
            }
        }
    }

    fn finish(&mut self, state: WatchState) {
        let outcome = match state {
            WatchState::Succeeded => WatchOutcome::Satisfied {
                attempts: self.attempts,
            },
            _ => WatchOutcome::TimedOut {
                attempts: self.attempts,
            },
        };
        self.state = state;
        self.outcome = Some(outcome);

        match outcome {
            WatchOutcome::Satisfied { attempts } => tracing::info!(
                package = self.expectation.package(),
                attempts,
                "Manifest change detected"
            ),
            WatchOutcome::TimedOut { attempts } => tracing::warn!(
                package = self.expectation.package(),
                attempts,
                "Gave up waiting for manifest change"
            ),
        }

        if let Some(observer) = self.observer.take() {
            observer(outcome);
        }
    }
}
