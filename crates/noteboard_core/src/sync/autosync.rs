//! Debounced file sync for the aggregate export document.
//!
//! Poll-driven: the host calls `poll` with the current export payload on its
//! own cadence (UI tick, event loop turn). No timer thread is spawned.

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Quiet period after the last change before a write lands.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(5000);

/// How long "Synced" stays visible.
const SYNCED_DISPLAY: Duration = Duration::from_secs(2);
/// How long "Sync failed" stays visible.
const FAILED_DISPLAY: Duration = Duration::from_secs(3);

pub const STATUS_IDLE: &str = "";
pub const STATUS_SYNCING: &str = "Syncing...";
pub const STATUS_SYNCED: &str = "Synced";
pub const STATUS_FAILED: &str = "Sync failed";

/// Debounced auto-sync of the aggregate export to a file target.
///
/// Changes are reported via `mark_dirty`; each report restarts the quiet
/// period, so a write lands only once edits pause. Writes are skipped when
/// the payload is byte-identical to the last saved one. Failures never
/// propagate; they only set the transient status string.
pub struct AutoSync {
    target: PathBuf,
    quiet_period: Duration,
    enabled: bool,
    dirty_since: Option<Instant>,
    last_saved: Option<String>,
    status: &'static str,
    status_until: Option<Instant>,
}

impl AutoSync {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self::with_quiet_period(target, DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(target: impl Into<PathBuf>, quiet_period: Duration) -> Self {
        Self {
            target: target.into(),
            quiet_period,
            enabled: true,
            dirty_since: None,
            last_saved: None,
            status: STATUS_IDLE,
            status_until: None,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops any pending write.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.dirty_since = None;
        }
    }

    /// Reports a data change. Restarts the quiet period when one is already
    /// pending. No-op while disabled.
    pub fn mark_dirty(&mut self) {
        if self.enabled {
            self.dirty_since = Some(Instant::now());
        }
    }

    /// Transient status string; `STATUS_IDLE` outside a display window.
    pub fn status(&mut self) -> &'static str {
        self.expire_status(Instant::now());
        self.status
    }

    /// Drives the debounce. Call with the current export payload; writes it
    /// once the quiet period since the last `mark_dirty` has elapsed.
    /// Returns true when a write landed.
    pub fn poll(&mut self, payload: &str) -> bool {
        let now = Instant::now();
        self.expire_status(now);

        let due = match self.dirty_since {
            Some(since) if self.enabled => now.duration_since(since) >= self.quiet_period,
            _ => false,
        };
        if !due {
            return false;
        }
        self.dirty_since = None;

        if self.last_saved.as_deref() == Some(payload) {
            return false;
        }
        self.write(payload, now)
    }

    /// Immediate manual sync, bypassing the quiet period and the
    /// unchanged-payload skip.
    pub fn sync_now(&mut self, payload: &str) -> bool {
        let now = Instant::now();
        self.dirty_since = None;
        self.write(payload, now)
    }

    fn write(&mut self, payload: &str, now: Instant) -> bool {
        self.status = STATUS_SYNCING;
        self.status_until = None;
        match std::fs::write(&self.target, payload) {
            Ok(()) => {
                self.last_saved = Some(payload.to_string());
                self.status = STATUS_SYNCED;
                self.status_until = Some(now + SYNCED_DISPLAY);
                info!(
                    "event=autosync module=autosync status=ok target={} bytes={}",
                    self.target.display(),
                    payload.len()
                );
                true
            }
            Err(err) => {
                self.status = STATUS_FAILED;
                self.status_until = Some(now + FAILED_DISPLAY);
                warn!(
                    "event=autosync module=autosync status=error target={} error=\"{err}\"",
                    self.target.display()
                );
                false
            }
        }
    }

    fn expire_status(&mut self, now: Instant) {
        if let Some(until) = self.status_until {
            if now >= until {
                self.status = STATUS_IDLE;
                self.status_until = None;
            }
        }
    }
}
