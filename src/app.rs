use chrono::Local;

use crate::clock::Clock;
use crate::config::StopwatchConfig;
use crate::pump::Pump;
use crate::session::{Session, SessionHistory};
use crate::stopwatch::{FinishedRun, StopwatchState};
use crate::storage::{KeyValueStore, SessionStore};
use crate::ui::{self, Controls, Screen, View};

/// Owns every piece of stopwatch state. UI events and pump ticks call in;
/// each call runs to completion and repaints through the [`View`].
pub struct StopwatchApp {
    config: StopwatchConfig,
    clock: Box<dyn Clock>,
    store: SessionStore,
    pump: Box<dyn Pump>,
    view: Box<dyn View>,

    stopwatch: StopwatchState,
    history: SessionHistory,
    // Parallel to `history`.
    expanded: Vec<bool>,

    pump_running: bool,
    confirm_clear: bool,
}

impl StopwatchApp {
    pub fn new(
        config: StopwatchConfig,
        clock: Box<dyn Clock>,
        backend: Box<dyn KeyValueStore>,
        pump: Box<dyn Pump>,
        view: Box<dyn View>,
    ) -> Self {
        let store = SessionStore::new(backend, config.storage_key.clone());
        Self {
            config,
            clock,
            store,
            pump,
            view,
            stopwatch: StopwatchState::new(),
            history: SessionHistory::new(),
            expanded: Vec::new(),
            pump_running: false,
            confirm_clear: false,
        }
    }

    /// Loads saved sessions and puts the controls in the ready state.
    pub fn init(&mut self) {
        self.load_history();
        self.reset();
    }

    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn is_running(&self) -> bool {
        self.stopwatch.timer.is_running()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.stopwatch.elapsed_ms(self.now_ms())
    }

    pub fn laps(&self) -> &[u64] {
        &self.stopwatch.laps
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn pump_running(&self) -> bool {
        self.pump_running
    }

    pub fn confirm_visible(&self) -> bool {
        self.confirm_clear
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    pub fn screen(&self) -> Screen {
        Screen {
            display: timer_core::format_clock(self.elapsed_ms()),
            laps: ui::lap_rows(&self.stopwatch.laps),
            sessions: ui::session_rows(&self.history, &self.expanded, &Local),
            controls: Controls::new(self.is_running(), !self.history.is_empty()),
            confirm_visible: self.confirm_clear,
        }
    }

    fn redraw(&mut self) {
        let screen = self.screen();
        self.view.draw(&screen);
    }

    fn start_pump(&mut self) {
        if !self.pump_running {
            self.pump_running = true;
            self.pump.start(self.config.tick_interval_ms);
        }
    }

    fn stop_pump(&mut self) {
        if self.pump_running {
            self.pump_running = false;
            self.pump.stop();
        }
    }

    pub fn start(&mut self) {
        let now = self.now_ms();
        if !self.stopwatch.timer.start(now) {
            log::debug!("start ignored, already running");
            return;
        }
        self.start_pump();
        self.redraw();
    }

    /// Freezes elapsed at the moment of the call rather than at the last tick.
    pub fn pause(&mut self) {
        let now = self.now_ms();
        if !self.stopwatch.timer.pause(now) {
            log::debug!("pause ignored, not running");
            return;
        }
        self.stop_pump();
        self.redraw();
    }

    /// Closes out the current run (saving it if any time elapsed) and
    /// returns to the ready state.
    pub fn reset(&mut self) {
        let now = self.now_ms();
        if let Some(run) = self.stopwatch.reset(now) {
            self.finalize_session(run);
        }
        self.stop_pump();
        self.redraw();
    }

    pub fn record_lap(&mut self) {
        let now = self.now_ms();
        match self.stopwatch.record_lap(now) {
            Some(_) => self.redraw(),
            None => log::debug!("lap ignored, not running"),
        }
    }

    pub fn handle_pump(&mut self) {
        if !self.is_running() {
            self.stop_pump();
            return;
        }
        let display = timer_core::format_clock(self.elapsed_ms());
        self.view.draw_clock(&display);
    }

    fn finalize_session(&mut self, run: FinishedRun) {
        let session = Session::from_run(run, self.clock.wall_now());
        log::info!(
            "session saved: {} with {} lap(s)",
            timer_core::format_clock(session.total_ms()),
            session.laps().len()
        );
        self.history.prepend(session);
        self.expanded.insert(0, false);
        if let Err(e) = self.store.save_history(&self.history) {
            log::error!("Failed to save session history: {}", e);
        }
    }

    pub fn load_history(&mut self) {
        self.history = self.store.load_history();
        self.expanded = vec![false; self.history.len()];
        log::info!("loaded {} saved session(s)", self.history.len());
        self.redraw();
    }

    pub fn toggle_session(&mut self, index: usize) {
        if let Some(expanded) = self.expanded.get_mut(index) {
            *expanded = !*expanded;
            self.redraw();
        }
    }

    /// Opens the confirm prompt. Nothing is deleted yet.
    pub fn request_clear_history(&mut self) {
        if self.history.is_empty() || self.confirm_clear {
            return;
        }
        self.confirm_clear = true;
        self.redraw();
    }

    pub fn confirm_clear_history(&mut self) {
        if !self.confirm_clear {
            return;
        }
        self.confirm_clear = false;
        self.clear_history();
    }

    pub fn cancel_clear_history(&mut self) {
        if !self.confirm_clear {
            return;
        }
        self.confirm_clear = false;
        self.redraw();
    }

    fn clear_history(&mut self) {
        self.history.clear();
        self.expanded.clear();
        if let Err(e) = self.store.clear_history() {
            log::error!("Failed to clear session history: {}", e);
        }
        log::info!("session history cleared");
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::pump::CountingPump;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::rc::Rc;

    const KEY: &str = "stopwatchSessions";

    #[derive(Clone, Default)]
    struct RecordingView {
        screens: Rc<RefCell<Vec<Screen>>>,
        clock_text: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingView {
        fn last(&self) -> Screen {
            self.screens.borrow().last().cloned().unwrap()
        }
    }

    impl View for RecordingView {
        fn draw(&mut self, screen: &Screen) {
            self.screens.borrow_mut().push(screen.clone());
        }

        fn draw_clock(&mut self, display: &str) {
            self.clock_text.borrow_mut().push(display.to_string());
        }
    }

    struct Harness {
        app: StopwatchApp,
        clock: ManualClock,
        mem: MemoryStore,
        pump: CountingPump,
        view: RecordingView,
    }

    fn harness_with(mem: MemoryStore) -> Harness {
        let clock = ManualClock::new(1_000_000);
        clock.set_wall(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let pump = CountingPump::default();
        let view = RecordingView::default();
        let mut app = StopwatchApp::new(
            StopwatchConfig::default(),
            Box::new(clock.clone()),
            Box::new(mem.clone()),
            Box::new(pump.clone()),
            Box::new(view.clone()),
        );
        app.init();
        Harness { app, clock, mem, pump, view }
    }

    fn harness() -> Harness {
        harness_with(MemoryStore::new())
    }

    fn run_for(h: &mut Harness, ms: u64) {
        h.app.start();
        h.clock.advance(ms);
        h.app.pause();
    }

    #[test]
    fn init_shows_ready_state() {
        let h = harness();
        let screen = h.view.last();
        assert_eq!(screen.display, "00:00.00");
        assert!(screen.laps.is_empty());
        assert!(screen.sessions.is_empty());
        assert_eq!(screen.controls, Controls::new(false, false));
        assert!(!screen.confirm_visible);
        assert!(!h.mem.contains(KEY));
    }

    #[test]
    fn start_twice_is_one_run_one_pump() {
        let mut h = harness();
        h.app.start();
        h.clock.advance(500);
        h.app.start();
        assert!(h.app.is_running());
        assert!(h.app.pump_running());
        assert_eq!(h.pump.starts(), 1);
        assert_eq!(h.pump.interval_ms(), 10);
        h.clock.advance(500);
        assert_eq!(h.app.elapsed_ms(), 1000);
    }

    #[test]
    fn pause_resume_does_not_count_pause() {
        let mut h = harness();
        run_for(&mut h, 1_500);
        let e1 = h.app.elapsed_ms();
        assert_eq!(e1, 1_500);
        h.clock.advance(10_000);
        assert_eq!(h.app.elapsed_ms(), e1);
        run_for(&mut h, 700);
        assert_eq!(h.app.elapsed_ms(), e1 + 700);
        assert_eq!(h.pump.starts(), 2);
        assert_eq!(h.pump.stops(), 2);
        assert!(!h.pump.active());
    }

    #[test]
    fn pause_while_paused_is_noop() {
        let mut h = harness();
        h.app.pause();
        assert_eq!(h.pump.stops(), 0);
        run_for(&mut h, 100);
        h.app.pause();
        assert_eq!(h.pump.stops(), 1);
    }

    #[test]
    fn tick_updates_only_clock() {
        let mut h = harness();
        h.app.start();
        let draws = h.view.screens.borrow().len();
        h.clock.advance(61_234);
        h.app.handle_pump();
        assert_eq!(h.view.clock_text.borrow().last().unwrap(), "01:01.23");
        assert_eq!(h.view.screens.borrow().len(), draws);
    }

    #[test]
    fn stale_tick_stops_pump() {
        let mut h = harness();
        h.app.start();
        h.app.pause();
        h.app.handle_pump();
        assert!(h.view.clock_text.borrow().is_empty());
        assert_eq!(h.pump.stops(), 1);
    }

    #[test]
    fn lap_ignored_when_stopped() {
        let mut h = harness();
        h.app.record_lap();
        run_for(&mut h, 300);
        h.app.record_lap();
        assert!(h.app.laps().is_empty());
    }

    #[test]
    fn laps_render_newest_first() {
        let mut h = harness();
        h.app.start();
        for step in [1000, 1500, 1500] {
            h.clock.advance(step);
            h.app.record_lap();
        }
        let lines: Vec<String> = h.view.last().laps.iter().map(|l| l.line()).collect();
        assert_eq!(lines, vec!["Lap 3: 00:04.00", "Lap 2: 00:02.50", "Lap 1: 00:01.00"]);
        assert!(h.view.last().controls.lap_enabled);
    }

    #[test]
    fn reset_finalizes_once() {
        let mut h = harness();
        h.app.start();
        h.clock.advance(1000);
        h.app.record_lap();
        h.clock.advance(1500);
        h.app.reset();

        assert_eq!(h.app.history().len(), 1);
        let session = h.app.history().get(0).unwrap();
        assert_eq!(session.total_ms(), 2500);
        assert_eq!(session.laps(), &[1000]);
        assert_eq!(
            session.recorded_at(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert!(!h.app.is_running());
        assert!(h.app.laps().is_empty());
        assert!(!h.pump.active());

        h.app.reset();
        assert_eq!(h.app.history().len(), 1);

        let screen = h.view.last();
        assert_eq!(screen.display, "00:00.00");
        assert!(!screen.controls.lap_enabled);
        assert!(screen.controls.clear_enabled);
        assert!(screen.controls.start_visible);
    }

    #[test]
    fn reset_while_paused_saves() {
        let mut h = harness();
        run_for(&mut h, 800);
        h.app.reset();
        assert_eq!(h.app.history().get(0).unwrap().total_ms(), 800);
        assert!(h.mem.contains(KEY));
    }

    #[test]
    fn history_round_trips_through_storage() {
        let mut h = harness();
        for ms in [1000, 61_234, 3_600_000] {
            h.app.start();
            h.clock.advance(ms / 2);
            h.app.record_lap();
            h.clock.advance(ms - ms / 2);
            h.app.reset();
        }
        let before = h.view.last().sessions;

        let reloaded = harness_with(h.mem.clone());
        let after = reloaded.view.last().sessions;
        assert_eq!(after, before);
        let totals: Vec<&str> = after.iter().map(|s| s.total.as_str()).collect();
        assert_eq!(totals, vec!["01:00:00.00", "01:01.23", "00:01.00"]);
    }

    #[test]
    fn malformed_storage_starts_empty() {
        let mut mem = MemoryStore::new();
        mem.set(KEY, "{oops").unwrap();
        let mut h = harness_with(mem);
        assert!(h.app.history().is_empty());
        assert!(!h.view.last().controls.clear_enabled);
        run_for(&mut h, 10);
        h.app.reset();
        assert_eq!(h.app.history().len(), 1);
    }

    #[test]
    fn clear_needs_confirmation() {
        let mut h = harness();
        run_for(&mut h, 1000);
        h.app.reset();
        let stored = h.mem.raw(KEY);

        h.app.request_clear_history();
        assert!(h.view.last().confirm_visible);
        assert_eq!(h.app.history().len(), 1);
        assert_eq!(h.mem.raw(KEY), stored);

        h.app.cancel_clear_history();
        assert!(!h.view.last().confirm_visible);
        assert_eq!(h.app.history().len(), 1);
        assert_eq!(h.mem.raw(KEY), stored);

        h.app.confirm_clear_history();
        assert_eq!(h.app.history().len(), 1);

        h.app.request_clear_history();
        h.app.confirm_clear_history();
        assert!(h.app.history().is_empty());
        assert!(!h.mem.contains(KEY));
        let screen = h.view.last();
        assert!(!screen.confirm_visible);
        assert!(!screen.controls.clear_enabled);
    }

    #[test]
    fn clear_request_ignored_when_empty() {
        let mut h = harness();
        h.app.request_clear_history();
        assert!(!h.app.confirm_visible());
    }

    #[test]
    fn expansion_is_per_session() {
        let mut h = harness();
        for _ in 0..2 {
            run_for(&mut h, 100);
            h.app.reset();
        }
        h.app.toggle_session(1);
        assert!(h.app.is_expanded(1));
        assert!(!h.app.is_expanded(0));

        run_for(&mut h, 100);
        h.app.reset();
        assert!(!h.app.is_expanded(0));
        assert!(h.app.is_expanded(2));

        h.app.toggle_session(2);
        assert!(!h.app.is_expanded(2));
        h.app.toggle_session(9);
        assert_eq!(h.view.last().sessions.len(), 3);
    }
}
