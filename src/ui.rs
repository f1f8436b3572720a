//! Presentation layer. Turns app state into a [`Screen`] that a [`View`]
//! backend paints; nothing in here touches the DOM.

use chrono::TimeZone;
use timer_core::format_clock;

use crate::session::SessionHistory;

pub const NO_LAPS: &str = "No laps yet.";
pub const NO_SESSIONS: &str = "No saved sessions.";
pub const CONFIRM_TITLE: &str = "Clear history?";
pub const CONFIRM_MESSAGE: &str =
    "Are you sure you want to clear all session history? This cannot be undone.";

#[derive(Clone, Debug, PartialEq)]
pub struct LapRow {
    /// 1-based position in recording order.
    pub number: usize,
    pub time: String,
}

impl LapRow {
    pub fn label(&self) -> String {
        format!("Lap {}", self.number)
    }

    pub fn line(&self) -> String {
        format!("Lap {}: {}", self.number, self.time)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionRow {
    pub index: usize,
    pub total: String,
    pub recorded: String,
    pub lap_count: usize,
    pub expanded: bool,
    /// Oldest first.
    pub laps: Vec<LapRow>,
}

impl SessionRow {
    pub fn lap_summary(&self) -> String {
        format!("{} lap(s)", self.lap_count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controls {
    pub start_visible: bool,
    pub pause_visible: bool,
    pub lap_enabled: bool,
    pub clear_enabled: bool,
}

impl Controls {
    pub fn new(running: bool, has_history: bool) -> Self {
        Self {
            start_visible: !running,
            pause_visible: running,
            lap_enabled: running,
            clear_enabled: has_history,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    pub display: String,
    /// Newest first. Empty means the placeholder is shown.
    pub laps: Vec<LapRow>,
    /// Newest first. Empty means the placeholder is shown.
    pub sessions: Vec<SessionRow>,
    pub controls: Controls,
    pub confirm_visible: bool,
}

pub trait View {
    /// Repaints everything.
    fn draw(&mut self, screen: &Screen);
    /// Repaints only the live time readout.
    fn draw_clock(&mut self, display: &str);
}

/// Laps newest first, each keeping its recording-order number.
pub fn lap_rows(laps: &[u64]) -> Vec<LapRow> {
    laps.iter()
        .enumerate()
        .rev()
        .map(|(i, &ms)| LapRow { number: i + 1, time: format_clock(ms) })
        .collect()
}

pub fn session_rows<Tz: TimeZone>(history: &SessionHistory, expanded: &[bool], tz: &Tz) -> Vec<SessionRow>
where
    Tz::Offset: std::fmt::Display,
{
    history
        .iter()
        .enumerate()
        .map(|(index, session)| SessionRow {
            index,
            total: format_clock(session.total_ms()),
            recorded: session.recorded_in(tz),
            lap_count: session.laps().len(),
            expanded: expanded.get(index).copied().unwrap_or(false),
            laps: session
                .laps()
                .iter()
                .enumerate()
                .map(|(i, &ms)| LapRow { number: i + 1, time: format_clock(ms) })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use chrono::{TimeZone, Utc};

    #[test]
    fn laps_newest_first() {
        let lines: Vec<String> = lap_rows(&[1000, 2500, 4000]).iter().map(LapRow::line).collect();
        assert_eq!(lines, vec!["Lap 3: 00:04.00", "Lap 2: 00:02.50", "Lap 1: 00:01.00"]);
    }

    #[test]
    fn no_laps() {
        assert!(lap_rows(&[]).is_empty());
    }

    #[test]
    fn session_rows_detail_oldest_first() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let history = SessionHistory::from_sessions(vec![
            Session::new(61_234, vec![1000, 2500], Some(at)),
            Session::new(500, vec![], None),
        ]);
        let rows = session_rows(&history, &[false, true], &Utc);
        assert_eq!(rows[0].total, "01:01.23");
        assert_eq!(rows[0].recorded, "2024-05-01 12:30:00");
        assert_eq!(rows[0].lap_summary(), "2 lap(s)");
        assert!(!rows[0].expanded);
        assert_eq!(rows[0].laps[0].line(), "Lap 1: 00:01.00");
        assert_eq!(rows[0].laps[1].line(), "Lap 2: 00:02.50");
        assert!(rows[1].expanded);
        assert_eq!(rows[1].lap_summary(), "0 lap(s)");
    }

    #[test]
    fn controls_follow_state() {
        let ready = Controls::new(false, false);
        assert!(ready.start_visible && !ready.pause_visible);
        assert!(!ready.lap_enabled && !ready.clear_enabled);
        let running = Controls::new(true, true);
        assert!(!running.start_visible && running.pause_visible);
        assert!(running.lap_enabled && running.clear_enabled);
    }
}
