//! Pure timing logic library with no platform dependencies.
//! Testable on host, usable from the browser build.

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

/// Elapsed time is always derived from absolute timestamps: the time banked
/// by finished segments plus `now - segment_start` for the live segment.
/// Nothing is ever summed tick by tick, so callback jitter cannot compound.
pub struct TimerCore {
    pub state: TimerState,
    accumulated_ms: u64,
    segment_start_ms: u64,
}

impl TimerCore {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            accumulated_ms: 0,
            segment_start_ms: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Returns false (and changes nothing) if already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state == TimerState::Running {
            return false;
        }
        self.segment_start_ms = now_ms;
        self.state = TimerState::Running;
        true
    }

    /// Returns false (and changes nothing) if not running.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.accumulated_ms += now_ms.saturating_sub(self.segment_start_ms);
        self.state = TimerState::Paused;
        true
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.segment_start_ms = 0;
        self.state = TimerState::Stopped;
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            TimerState::Running => {
                self.accumulated_ms + now_ms.saturating_sub(self.segment_start_ms)
            }
            _ => self.accumulated_ms,
        }
    }
}

impl Default for TimerCore {
    fn default() -> Self {
        Self::new()
    }
}

const MS_PER_HOUR: u64 = 3_600_000;

/// Format milliseconds as "MM:SS.CC", or "HH:MM:SS.CC" once an hour has passed.
/// Centiseconds are truncated, never rounded.
pub fn format_clock(ms: u64) -> String {
    let h = ms / MS_PER_HOUR;
    let m = (ms % MS_PER_HOUR) / 60_000;
    let s = (ms % 60_000) / 1000;
    let cs = (ms % 1000) / 10;
    if h > 0 {
        format!("{:02}:{:02}:{:02}.{:02}", h, m, s, cs)
    } else {
        format!("{:02}:{:02}.{:02}", m, s, cs)
    }
}
