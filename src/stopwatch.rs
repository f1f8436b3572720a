use timer_core::TimerCore;

/// Snapshot of a run taken at reset time, before its state is wiped.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedRun {
    pub total_ms: u64,
    pub laps: Vec<u64>,
}

pub struct StopwatchState {
    pub timer: TimerCore,
    /// Elapsed time at each lap, in recording order.
    pub laps: Vec<u64>,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self {
            timer: TimerCore::new(),
            laps: Vec::new(),
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.timer.elapsed_ms(now_ms)
    }

    /// Appends the current elapsed time. Ignored unless running.
    pub fn record_lap(&mut self, now_ms: u64) -> Option<u64> {
        if !self.timer.is_running() {
            return None;
        }
        let lap_time = self.timer.elapsed_ms(now_ms);
        self.laps.push(lap_time);
        Some(lap_time)
    }

    /// Clears the run. Returns what was on the clock if anything had elapsed.
    pub fn reset(&mut self, now_ms: u64) -> Option<FinishedRun> {
        let total_ms = self.timer.elapsed_ms(now_ms);
        let finished = (total_ms > 0).then(|| FinishedRun {
            total_ms,
            laps: std::mem::take(&mut self.laps),
        });
        self.timer.reset();
        self.laps.clear();
        finished
    }
}

impl Default for StopwatchState {
    fn default() -> Self {
        Self::new()
    }
}
